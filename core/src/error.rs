//! Error types for the transport veneer.
//!
//! # Design
//! One flat enum covers the whole taxonomy: global initialization, handle or
//! list allocation, configuration values the C side cannot accept, and the
//! transfer itself. `Transfer` carries libcurl's error-buffer text when the
//! library recorded any, because that is usually more specific than what
//! `curl_easy_strerror` produces for the same code.

use std::fmt;

/// Errors returned by `CurlGlobal` and `HttpRequest`.
#[derive(Debug)]
pub enum HttpError {
    /// `curl_global_init` failed, or a second live `CurlGlobal` was
    /// requested. No request objects are usable without the guard.
    GlobalInit(String),

    /// libcurl could not allocate the named resource.
    Alloc(&'static str),

    /// A configured value contains an embedded NUL byte and cannot be
    /// handed to the transport. Detected at execution time, before any
    /// network activity.
    InvalidConfig { field: &'static str },

    /// The transfer failed: connect, resolve, timeout, or any other
    /// transport-level error. No response is produced.
    Transfer { code: i32, message: String },
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpError::GlobalInit(msg) => {
                write!(f, "global transport init failed: {msg}")
            }
            HttpError::Alloc(what) => write!(f, "allocation of {what} failed"),
            HttpError::InvalidConfig { field } => {
                write!(f, "invalid {field}: embedded NUL byte")
            }
            HttpError::Transfer { code, message } => {
                write!(f, "transfer failed (curl error {code}): {message}")
            }
        }
    }
}

impl std::error::Error for HttpError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_display_includes_code_and_message() {
        let err = HttpError::Transfer {
            code: 7,
            message: "Connection refused".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains('7'));
        assert!(text.contains("Connection refused"));
    }

    #[test]
    fn invalid_config_names_the_field() {
        let err = HttpError::InvalidConfig { field: "url" };
        assert!(err.to_string().contains("url"));
    }
}
