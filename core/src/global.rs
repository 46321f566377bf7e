//! Process-wide libcurl initialization guard.
//!
//! # Design
//! libcurl requires `curl_global_init` before the first easy handle and
//! `curl_global_cleanup` after the last one, and neither call may run
//! concurrently with itself. `CurlGlobal` models that contract as a value:
//! construction initializes, drop cleans up, and an atomic flag rejects a
//! second live guard. Request builders borrow the guard, so the borrow
//! checker proves every `HttpRequest` is gone before cleanup runs.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::HttpError;

/// Set while a guard is live. `curl_global_init` is itself reference
/// counted, but the counting is not thread safe; a single guard per
/// process sidesteps the problem entirely.
static LIVE: AtomicBool = AtomicBool::new(false);

/// RAII guard for libcurl's process-global state.
///
/// Create exactly one, before any `HttpRequest`, and keep it alive until
/// the last builder is dropped. Deliberately not `Clone`: the guard stands
/// for a singleton resource.
#[derive(Debug)]
pub struct CurlGlobal {
    _private: (),
}

impl CurlGlobal {
    pub fn new() -> Result<Self, HttpError> {
        if LIVE.swap(true, Ordering::SeqCst) {
            return Err(HttpError::GlobalInit(
                "transport already initialized".to_string(),
            ));
        }
        let rc = unsafe { curl_sys::curl_global_init(curl_sys::CURL_GLOBAL_ALL) };
        if rc != curl_sys::CURLE_OK {
            LIVE.store(false, Ordering::SeqCst);
            return Err(HttpError::GlobalInit(format!(
                "curl_global_init returned {rc}"
            )));
        }
        Ok(Self { _private: () })
    }
}

impl Drop for CurlGlobal {
    fn drop(&mut self) {
        unsafe { curl_sys::curl_global_cleanup() };
        LIVE.store(false, Ordering::SeqCst);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_live_guard_is_rejected() {
        let _shared = testing::global();
        let err = CurlGlobal::new().unwrap_err();
        assert!(matches!(err, HttpError::GlobalInit(_)));
    }
}
