//! Response data produced by an executed request.

use std::borrow::Cow;

/// Result of one completed HTTP exchange.
///
/// Fully populated only when the transfer succeeded; a failed transfer
/// yields an `HttpError` and no response value at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Final HTTP status code (after any followed redirects).
    pub status: u32,

    /// Raw response body bytes, in arrival order.
    pub body: Vec<u8>,

    /// Header lines exactly as received, one per entry, line terminators
    /// kept. The status line is included, and when redirects are followed
    /// the lines of every hop appear in receipt order.
    pub headers: Vec<String>,
}

impl HttpResponse {
    /// Body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_passes_utf8_through() {
        let response = HttpResponse {
            status: 200,
            body: b"plain text".to_vec(),
            headers: Vec::new(),
        };
        assert_eq!(response.text(), "plain text");
    }

    #[test]
    fn text_replaces_invalid_utf8() {
        let response = HttpResponse {
            status: 200,
            body: vec![0x66, 0xff, 0x6f],
            headers: Vec::new(),
        };
        assert_eq!(response.text(), "f\u{fffd}o");
    }
}
