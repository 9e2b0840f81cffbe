#![cfg(feature = "backend-adla")]

//! Native ADLA interface module.
//!
//! Links against the vendor's `libadla_interface.so`, assumed
//! pre-installed on the host. The extern declarations mirror the C
//! contract exactly; use [`AdlaModule`] instead of calling them
//! directly.

use std::ffi::{c_void, CString};
use std::os::raw::{c_char, c_int, c_uchar};
use std::path::Path;
use std::ptr::NonNull;

use crate::error::DetectError;
use crate::module::InferenceModule;
use crate::record::{RawDetection, RESULT_CAPACITY};

#[link(name = "adla_interface")]
extern "C" {
    // void *init_network_file(const char *mpath)
    fn init_network_file(mpath: *const c_char) -> *mut c_void;

    // int set_input(void *qcontext, const unsigned char *data, int size)
    fn set_input(qcontext: *mut c_void, data: *const c_uchar, size: c_int) -> c_int;

    // int run_network(void *qcontext, uint32_t *count, DetBox *boxes)
    fn run_network(qcontext: *mut c_void, count: *mut u32, boxes: *mut RawDetection) -> c_int;
}

/// Status returned when a native call is attempted without a context.
const STATUS_NO_CONTEXT: i32 = -1;

/// Safe wrapper over the native ADLA interface.
///
/// Owns the opaque execution context and never hands it out. Every
/// call path is guarded against a missing context, so a failed
/// initialization can never lead to a native call on a null handle.
#[derive(Default)]
pub struct AdlaModule {
    context: Option<NonNull<c_void>>,
}

// The context is driven through `&mut self` only, so moving the module
// to another thread is sound even though the pointer itself is not.
unsafe impl Send for AdlaModule {}

impl AdlaModule {
    pub fn new() -> Self {
        Self::default()
    }
}

impl InferenceModule for AdlaModule {
    fn load(&mut self) -> Result<(), DetectError> {
        // The interface library is bound at link time; a missing
        // library surfaces when the dynamic loader starts the process,
        // before this is reachable.
        Ok(())
    }

    fn init_network(&mut self, path: &Path) -> Result<(), DetectError> {
        let model_path = CString::new(path.to_string_lossy().as_bytes()).map_err(|_| {
            DetectError::ModelInitFailed {
                path: path.to_path_buf(),
            }
        })?;

        let context = unsafe { init_network_file(model_path.as_ptr()) };
        match NonNull::new(context) {
            Some(context) => {
                self.context = Some(context);
                Ok(())
            }
            None => Err(DetectError::ModelInitFailed {
                path: path.to_path_buf(),
            }),
        }
    }

    fn set_input(&mut self, tensor: &[u8]) -> i32 {
        let Some(context) = self.context else {
            return STATUS_NO_CONTEXT;
        };
        // The backend reads the buffer synchronously during the call
        // and takes no ownership of it.
        unsafe {
            set_input(
                context.as_ptr(),
                tensor.as_ptr(),
                tensor.len() as c_int,
            )
        }
    }

    fn run_network(
        &mut self,
        count: &mut u32,
        records: &mut [RawDetection; RESULT_CAPACITY],
    ) -> i32 {
        let Some(context) = self.context else {
            return STATUS_NO_CONTEXT;
        };
        // `records` is a fixed-capacity scratch buffer the backend
        // writes into; `count` is clamped by the decoder before use.
        unsafe { run_network(context.as_ptr(), count, records.as_mut_ptr()) }
    }

    // `release` stays the no-op default: the interface library exposes
    // no context release call. Context lifetime is process lifetime.
}
