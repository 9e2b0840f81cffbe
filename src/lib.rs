//! ADLA NPU object detection adapter.
//!
//! This crate drives a neural-processing-unit inference backend to run
//! object detection on a single input tensor and decode the backend's
//! fixed-capacity result buffer into a stable, fixed-shape detection
//! table.
//!
//! # Boundary contract
//!
//! The native interface is a four-call contract, abstracted behind
//! [`InferenceModule`] so tests can substitute a scripted stub:
//!
//! 1. `load` — bind the native interface module
//! 2. `init_network` — initialize the per-model execution context
//! 3. `set_input` — hand raw tensor bytes to the backend
//! 4. `run_network` — one synchronous inference pass filling a
//!    fixed-capacity array of [`RawDetection`] records plus a count
//!
//! The record layout is fixed by the backend: six 32-bit floats in the
//! order `ymin, xmin, ymax, xmax, score, object_class`.
//!
//! # Failure policy
//!
//! [`NpuDetector::detect`] is total. Backend failures never raise to
//! the caller: the detector degrades to the all-zero table, logs the
//! condition, and carries it as the optional diagnostic on
//! [`Detections`]. The only hard failure is opening a detector with a
//! model path that lacks the `.adla` extension.
//!
//! # Module structure
//!
//! - `record`: raw record layout, capacities, the detection table
//! - `module`: the injectable backend contract and the scripted stub
//! - `adla`: the native FFI module (feature `backend-adla`)
//! - `decode`: result-buffer decoding with clamping and truncation
//! - `detector`: the `NpuDetector` facade
//! - `config`: detector configuration (model path, input dimensions,
//!   score threshold; JSON file plus environment overrides)

pub mod config;
pub mod decode;
pub mod detector;
pub mod error;
pub mod module;
pub mod record;

#[cfg(feature = "backend-adla")]
pub mod adla;

pub use config::DetectorConfig;
pub use detector::{Detections, DetectorState, NpuDetector, MODEL_EXTENSION};
pub use error::DetectError;
pub use module::{InferenceModule, StubModule};
pub use record::{
    Detection, DetectionTable, RawDetection, MAX_DETECTIONS, RESULT_CAPACITY,
};

#[cfg(feature = "backend-adla")]
pub use adla::AdlaModule;
