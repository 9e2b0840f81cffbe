//! Detector facade: one tensor in, a fixed-shape detection table out.

use std::path::Path;
use std::time::Instant;

use crate::config::DetectorConfig;
use crate::decode::decode;
use crate::error::DetectError;
use crate::module::InferenceModule;
use crate::record::{DetectionTable, RawDetection, RESULT_CAPACITY};

/// Required on-disk extension for compiled ADLA model artifacts.
pub const MODEL_EXTENSION: &str = "adla";

/// Handle lifecycle state.
///
/// `Ready` is reached once on a successful open and holds for the
/// detector's lifetime. `NotReady` is the degraded resting state after
/// a failed load or model init; `detect` stays safe to call there and
/// returns the all-zero table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorState {
    NotReady,
    Ready,
}

/// Outcome of one `detect` call.
///
/// `table` always has `MAX_DETECTIONS` rows. `diagnostic` is the side
/// channel for backend failures; callers that only want the
/// best-effort list can ignore it.
#[derive(Clone, Debug)]
pub struct Detections {
    pub table: DetectionTable,
    pub diagnostic: Option<DetectError>,
}

impl Detections {
    fn degraded(diagnostic: Option<DetectError>) -> Self {
        Self {
            table: DetectionTable::empty(),
            diagnostic,
        }
    }
}

/// Object detector driving one NPU execution context.
///
/// Owns the injected backend module exclusively; the opaque native
/// handle never leaves the module. `detect` takes `&mut self`, which
/// serializes calls per detector, matching the backend's unknown (and
/// therefore assumed absent) thread safety.
pub struct NpuDetector {
    module: Box<dyn InferenceModule>,
    state: DetectorState,
    init_failure: Option<DetectError>,
    expected_len: usize,
    score_threshold: f32,
}

impl std::fmt::Debug for NpuDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NpuDetector")
            .field("state", &self.state)
            .field("init_failure", &self.init_failure)
            .field("expected_len", &self.expected_len)
            .field("score_threshold", &self.score_threshold)
            .finish_non_exhaustive()
    }
}

impl NpuDetector {
    /// Build a detector around an injected backend module.
    ///
    /// The model path must end in `.adla`; that is checked before any
    /// backend call and is the only hard failure here. Load and init
    /// failures are logged and produce a `NotReady` detector, so a
    /// serving host keeps running and can retry or surface the
    /// condition on its own terms.
    pub fn open(
        config: &DetectorConfig,
        mut module: Box<dyn InferenceModule>,
    ) -> Result<Self, DetectError> {
        let path = &config.model_path;
        if path.extension().and_then(|ext| ext.to_str()) != Some(MODEL_EXTENSION) {
            return Err(DetectError::UnsupportedFormat { path: path.clone() });
        }

        let init_failure = match Self::initialize(module.as_mut(), path) {
            Ok(()) => None,
            Err(err) => {
                log::error!("NPU detector not ready: {}", err);
                Some(err)
            }
        };
        let state = if init_failure.is_none() {
            DetectorState::Ready
        } else {
            DetectorState::NotReady
        };

        Ok(Self {
            module,
            state,
            init_failure,
            expected_len: config.tensor_len(),
            score_threshold: config.score_threshold,
        })
    }

    fn initialize(module: &mut dyn InferenceModule, path: &Path) -> Result<(), DetectError> {
        module.load()?;
        module.init_network(path)?;
        Ok(())
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == DetectorState::Ready
    }

    /// Run one detection pass over a dense HWC byte tensor.
    ///
    /// Total: never panics and never returns an error. A `NotReady`
    /// detector, a failed submission, or a failed inference call all
    /// degrade to a (possibly all-zero) table with the failure in
    /// `diagnostic` and in the log.
    ///
    /// Blocking: the calling thread is suspended for the native
    /// computation; bounded latency needs an external watchdog.
    pub fn detect(&mut self, tensor: &[u8]) -> Detections {
        if self.state != DetectorState::Ready {
            return Detections::degraded(self.init_failure.clone());
        }

        if tensor.len() != self.expected_len {
            log::warn!(
                "input tensor is {} bytes, model expects {}",
                tensor.len(),
                self.expected_len
            );
        }

        let mut diagnostic = None;

        let started = Instant::now();
        let status = self.module.set_input(tensor);
        log::debug!("set_input returned {} after {:?}", status, started.elapsed());
        if status != 0 {
            // Submission failure semantics are backend-defined; record
            // it and continue to the inference call.
            let err = DetectError::SubmissionFailed { status };
            log::warn!("{}", err);
            diagnostic = Some(err);
        }

        let mut count: u32 = 0;
        let mut records = [RawDetection::default(); RESULT_CAPACITY];
        let started = Instant::now();
        let status = self.module.run_network(&mut count, &mut records);
        log::debug!(
            "run_network returned {} with {} records after {:?}",
            status,
            count,
            started.elapsed()
        );
        if status != 0 {
            let err = DetectError::InferenceFailed { status };
            log::warn!("{}", err);
            diagnostic = Some(err);
        }

        // Decode whatever the backend left in the buffer; the count is
        // clamped inside `decode`, so an oversized report cannot read
        // past the array even after a failed run.
        let table = decode(&records, count, self.score_threshold);
        Detections { table, diagnostic }
    }
}

impl Drop for NpuDetector {
    fn drop(&mut self) {
        if self.state == DetectorState::Ready {
            self.module.release();
        }
    }
}
