//! Backend module contract and the scripted stub implementation.

use std::path::Path;

use crate::error::DetectError;
use crate::record::{RawDetection, RESULT_CAPACITY};

/// The four-call contract with the native inference module.
///
/// Implementations own the opaque per-model execution context and
/// never expose it. The module is injected into
/// [`NpuDetector`](crate::NpuDetector) at construction so tests can
/// substitute a scripted stub for the native library.
///
/// # Thread safety
///
/// The native backend must be treated as not thread-safe. The trait is
/// `Send` so a detector can move to a worker thread, but every method
/// takes `&mut self`: one context is driven by at most one thread at a
/// time, and the facade's `&mut self` API enforces that for callers.
pub trait InferenceModule: Send {
    /// Load or bind the native interface module.
    ///
    /// A failure here leaves the detector `NotReady`; it must not
    /// abort the host process.
    fn load(&mut self) -> Result<(), DetectError>;

    /// Initialize the execution context for the model at `path`.
    ///
    /// Called at most once, after `load` has succeeded. The path has
    /// already passed the extension check.
    fn init_network(&mut self, path: &Path) -> Result<(), DetectError>;

    /// Hand the raw tensor bytes to the backend ahead of inference.
    ///
    /// Returns the backend's status code; zero means success. The
    /// backend only reads the buffer during the call, so the caller
    /// may reuse it once this returns.
    fn set_input(&mut self, tensor: &[u8]) -> i32;

    /// Run one synchronous inference pass.
    ///
    /// The backend writes the number of valid records into `count` and
    /// fills `records` up to its own fixed limit. Returns the
    /// backend's status code. Blocking; no timeout or cancellation
    /// exists at this layer, so a hung backend hangs the caller.
    ///
    /// `count` is untrusted: the decoder clamps it to
    /// `RESULT_CAPACITY` before any indexed access.
    fn run_network(
        &mut self,
        count: &mut u32,
        records: &mut [RawDetection; RESULT_CAPACITY],
    ) -> i32;

    /// Optional teardown hook, invoked once when the detector drops.
    ///
    /// The ADLA interface is not known to expose a context release
    /// call, so the default is a no-op.
    fn release(&mut self) {}
}

/// Scripted stub module.
///
/// Used by the test suite and by hosts that run without the native
/// library present. Every backend behavior the facade has to survive
/// can be scripted: load/init failures, non-zero status codes, and
/// result counts that disagree with the buffer capacity.
#[derive(Default)]
pub struct StubModule {
    load_failure: Option<String>,
    fail_init: bool,
    records: Vec<RawDetection>,
    reported_count: Option<u32>,
    set_input_status: i32,
    run_status: i32,
    /// Call counters, readable by tests.
    pub init_calls: usize,
    pub set_input_calls: usize,
    pub run_calls: usize,
    pub released: bool,
    pub last_input_len: Option<usize>,
}

impl StubModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stub whose `load` fails, simulating a missing interface library.
    pub fn failing_load(reason: &str) -> Self {
        Self {
            load_failure: Some(reason.to_string()),
            ..Self::default()
        }
    }

    /// Stub whose `init_network` fails, simulating a bad model file.
    pub fn failing_init() -> Self {
        Self {
            fail_init: true,
            ..Self::default()
        }
    }

    /// Records `run_network` writes into the output buffer, in order.
    pub fn with_records(mut self, records: Vec<RawDetection>) -> Self {
        self.records = records;
        self
    }

    /// Report a count independent of the scripted records, including
    /// counts beyond `RESULT_CAPACITY`.
    pub fn with_reported_count(mut self, count: u32) -> Self {
        self.reported_count = Some(count);
        self
    }

    pub fn with_set_input_status(mut self, status: i32) -> Self {
        self.set_input_status = status;
        self
    }

    pub fn with_run_status(mut self, status: i32) -> Self {
        self.run_status = status;
        self
    }
}

impl InferenceModule for StubModule {
    fn load(&mut self) -> Result<(), DetectError> {
        match &self.load_failure {
            Some(reason) => Err(DetectError::BackendUnavailable {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn init_network(&mut self, path: &Path) -> Result<(), DetectError> {
        self.init_calls += 1;
        if self.fail_init {
            return Err(DetectError::ModelInitFailed {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn set_input(&mut self, tensor: &[u8]) -> i32 {
        self.set_input_calls += 1;
        self.last_input_len = Some(tensor.len());
        self.set_input_status
    }

    fn run_network(
        &mut self,
        count: &mut u32,
        records: &mut [RawDetection; RESULT_CAPACITY],
    ) -> i32 {
        self.run_calls += 1;
        for (slot, record) in records.iter_mut().zip(self.records.iter()) {
            *slot = *record;
        }
        *count = self
            .reported_count
            .unwrap_or(self.records.len() as u32);
        self.run_status
    }

    fn release(&mut self) {
        self.released = true;
    }
}
