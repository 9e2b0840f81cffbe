//! Failure taxonomy for the backend boundary.

use std::fmt;
use std::path::PathBuf;

/// Failures at the native backend boundary.
///
/// None of these reach the caller of `detect` as a hard error. They
/// are logged where they occur and carried as the optional diagnostic
/// on [`Detections`](crate::Detections), so a host can inspect them
/// without exception-style control flow.
#[derive(Clone, Debug, PartialEq)]
pub enum DetectError {
    /// Model path does not carry the extension the backend requires.
    /// Detected before any native call; fatal to initialization.
    UnsupportedFormat { path: PathBuf },
    /// The native interface module could not be loaded. The detector
    /// stays `NotReady`; the host process keeps running.
    BackendUnavailable { reason: String },
    /// The backend's own initialization call failed for this model.
    ModelInitFailed { path: PathBuf },
    /// Non-zero status from the submission call. Execution still
    /// proceeds to the inference call.
    SubmissionFailed { status: i32 },
    /// Non-zero status from the inference call. Decoding still runs
    /// over whatever the backend left in the buffer.
    InferenceFailed { status: i32 },
}

impl fmt::Display for DetectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectError::UnsupportedFormat { path } => {
                write!(f, "unknown model format {}", path.display())
            }
            DetectError::BackendUnavailable { reason } => {
                write!(f, "failed to load ADLA interface library: {}", reason)
            }
            DetectError::ModelInitFailed { path } => {
                write!(f, "failed to initialize NPU with model {}", path.display())
            }
            DetectError::SubmissionFailed { status } => {
                write!(f, "set_input returned status {}", status)
            }
            DetectError::InferenceFailed { status } => {
                write!(f, "run_network returned status {}", status)
            }
        }
    }
}

impl std::error::Error for DetectError {}
