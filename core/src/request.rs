//! Fluent, synchronous HTTP request builder over libcurl's easy interface.
//!
//! # Design
//! `HttpRequest` owns one `CURL` easy handle for its whole lifetime. The
//! setters only record plain Rust values; every C-side option is applied at
//! execution time, so a setter can never fail and each execution applies the
//! complete current configuration to the handle. Response bytes accumulate
//! into a heap-pinned `TransferState` whose address is registered with
//! libcurl once at construction, which keeps the callback userdata stable
//! when the (move-only) builder itself is moved.

use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::mem;
use std::os::raw::{c_char, c_long, c_void};
use std::ptr::{self, NonNull};
use std::slice;
use std::time::Duration;

use libc::size_t;

use crate::error::HttpError;
use crate::global::CurlGlobal;
use crate::http::HttpResponse;

// CURL_ERROR_SIZE
const ERROR_BUF_LEN: usize = 256;

const DEFAULT_USER_AGENT: &str = concat!("fetch-core/", env!("CARGO_PKG_VERSION"));
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Response accumulation buffers registered with libcurl.
///
/// Boxed by `HttpRequest` so the userdata and error-buffer pointers handed
/// to libcurl stay valid when the builder moves.
struct TransferState {
    body: Vec<u8>,
    headers: Vec<String>,
    errbuf: [u8; ERROR_BUF_LEN],
}

impl TransferState {
    fn new() -> Box<Self> {
        Box::new(Self {
            body: Vec::new(),
            headers: Vec::new(),
            errbuf: [0; ERROR_BUF_LEN],
        })
    }

    fn reset(&mut self) {
        self.body.clear();
        self.headers.clear();
        self.errbuf[0] = 0;
    }

    /// Text libcurl wrote into the error buffer during the last transfer.
    fn error_text(&self) -> Option<&str> {
        let end = self.errbuf.iter().position(|&b| b == 0).unwrap_or(0);
        if end == 0 {
            return None;
        }
        std::str::from_utf8(&self.errbuf[..end]).ok()
    }
}

extern "C" fn write_body_cb(
    ptr: *mut c_char,
    size: size_t,
    nmemb: size_t,
    userdata: *mut c_void,
) -> size_t {
    let state = unsafe { &mut *(userdata as *mut TransferState) };
    let len = size * nmemb;
    let chunk = unsafe { slice::from_raw_parts(ptr as *const u8, len) };
    state.body.extend_from_slice(chunk);
    len
}

/// libcurl delivers exactly one complete header line per invocation, CRLF
/// included; the line is recorded verbatim.
extern "C" fn write_header_cb(
    ptr: *mut c_char,
    size: size_t,
    nmemb: size_t,
    userdata: *mut c_void,
) -> size_t {
    let state = unsafe { &mut *(userdata as *mut TransferState) };
    let len = size * nmemb;
    let chunk = unsafe { slice::from_raw_parts(ptr as *const u8, len) };
    state.headers.push(String::from_utf8_lossy(chunk).into_owned());
    len
}

/// Owned `curl_slist`, freed when dropped.
struct HeaderList {
    raw: *mut curl_sys::curl_slist,
}

impl HeaderList {
    fn new() -> Self {
        Self {
            raw: ptr::null_mut(),
        }
    }

    fn append(&mut self, line: &str) -> Result<(), HttpError> {
        let line = CString::new(line).map_err(|_| HttpError::InvalidConfig { field: "header" })?;
        let next = unsafe { curl_sys::curl_slist_append(self.raw, line.as_ptr()) };
        if next.is_null() {
            return Err(HttpError::Alloc("header list"));
        }
        self.raw = next;
        Ok(())
    }

    /// Null when no line was appended, which libcurl treats as "no custom
    /// headers".
    fn as_ptr(&self) -> *mut curl_sys::curl_slist {
        self.raw
    }
}

impl Drop for HeaderList {
    fn drop(&mut self) {
        if !self.raw.is_null() {
            unsafe { curl_sys::curl_slist_free_all(self.raw) };
        }
    }
}

#[derive(Clone, Copy)]
enum Verb {
    Get,
    Post,
    Put,
    Delete,
}

/// Configurable one-shot request bound to a live `CurlGlobal`.
///
/// Configure through the chained setters in any order, then execute one of
/// the verb methods. The builder may be executed again afterwards; each
/// execution starts from cleared response buffers. Not `Clone` (the easy
/// handle is not duplicable) and not `Send`: confine each builder to one
/// thread for its whole configure-execute-read lifecycle.
pub struct HttpRequest<'g> {
    easy: NonNull<curl_sys::CURL>,
    transfer: Box<TransferState>,
    url: String,
    timeout: Duration,
    follow_redirects: bool,
    user_agent: String,
    headers: Vec<String>,
    body: Option<Vec<u8>>,
    _global: PhantomData<&'g CurlGlobal>,
}

impl<'g> HttpRequest<'g> {
    /// Allocate an easy handle and register the write/header callbacks and
    /// the error buffer against the heap-pinned transfer state.
    pub fn new(_global: &'g CurlGlobal) -> Result<Self, HttpError> {
        let easy = NonNull::new(unsafe { curl_sys::curl_easy_init() })
            .ok_or(HttpError::Alloc("easy handle"))?;
        let mut transfer = TransferState::new();
        let userdata = ptr::addr_of_mut!(*transfer) as *mut c_void;
        unsafe {
            curl_sys::curl_easy_setopt(
                easy.as_ptr(),
                curl_sys::CURLOPT_WRITEFUNCTION,
                write_body_cb as curl_sys::curl_write_callback,
            );
            curl_sys::curl_easy_setopt(easy.as_ptr(), curl_sys::CURLOPT_WRITEDATA, userdata);
            curl_sys::curl_easy_setopt(
                easy.as_ptr(),
                curl_sys::CURLOPT_HEADERFUNCTION,
                write_header_cb as curl_sys::curl_write_callback,
            );
            curl_sys::curl_easy_setopt(easy.as_ptr(), curl_sys::CURLOPT_HEADERDATA, userdata);
            curl_sys::curl_easy_setopt(
                easy.as_ptr(),
                curl_sys::CURLOPT_ERRORBUFFER,
                transfer.errbuf.as_mut_ptr() as *mut c_char,
            );
        }
        Ok(Self {
            easy,
            transfer,
            url: String::new(),
            timeout: Duration::ZERO,
            follow_redirects: true,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headers: Vec::new(),
            body: None,
            _global: PhantomData,
        })
    }

    /// Target URL of the exchange.
    pub fn url(&mut self, url: impl Into<String>) -> &mut Self {
        self.url = url.into();
        self
    }

    /// Overall transfer timeout. `Duration::ZERO` (the default) disables
    /// the timeout entirely.
    pub fn timeout(&mut self, timeout: Duration) -> &mut Self {
        self.timeout = timeout;
        self
    }

    /// Whether to follow `Location` redirects. Defaults to `true`.
    pub fn follow_redirects(&mut self, follow: bool) -> &mut Self {
        self.follow_redirects = follow;
        self
    }

    /// Replace the default `User-Agent`.
    pub fn user_agent(&mut self, user_agent: impl Into<String>) -> &mut Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Append one raw `"Name: Value"` header line. Lines are sent in the
    /// order they were added.
    pub fn header(&mut self, line: impl Into<String>) -> &mut Self {
        self.headers.push(line.into());
        self
    }

    /// Set the request body, used by `post` and `put`. Unless a content
    /// type was given through `body_with_type` or a raw `header` line, a
    /// `Content-Type: application/octet-stream` header is supplied at
    /// execution time.
    pub fn body(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    /// Set the request body together with its `Content-Type` header.
    pub fn body_with_type(
        &mut self,
        body: impl Into<Vec<u8>>,
        content_type: &str,
    ) -> &mut Self {
        self.body = Some(body.into());
        self.headers.push(format!("Content-Type: {content_type}"));
        self
    }

    /// Perform a GET against the configured URL.
    pub fn get(&mut self) -> Result<HttpResponse, HttpError> {
        self.execute(Verb::Get)
    }

    /// Perform a POST with the configured body (empty if none was set).
    pub fn post(&mut self) -> Result<HttpResponse, HttpError> {
        self.execute(Verb::Post)
    }

    /// Perform a PUT with the configured body (empty if none was set).
    pub fn put(&mut self) -> Result<HttpResponse, HttpError> {
        self.execute(Verb::Put)
    }

    /// Perform a DELETE against the configured URL.
    pub fn delete(&mut self) -> Result<HttpResponse, HttpError> {
        self.execute(Verb::Delete)
    }

    fn has_content_type(&self) -> bool {
        self.headers.iter().any(|line| {
            line.split(':')
                .next()
                .map_or(false, |name| name.trim().eq_ignore_ascii_case("content-type"))
        })
    }

    /// Apply the full configuration to the handle, perform one blocking
    /// exchange, and move the accumulated buffers into a response.
    fn execute(&mut self, verb: Verb) -> Result<HttpResponse, HttpError> {
        self.transfer.reset();

        let url = CString::new(self.url.as_str())
            .map_err(|_| HttpError::InvalidConfig { field: "url" })?;
        let user_agent = CString::new(self.user_agent.as_str())
            .map_err(|_| HttpError::InvalidConfig { field: "user_agent" })?;

        let mut list = HeaderList::new();
        for line in &self.headers {
            list.append(line)?;
        }
        let wants_body = matches!(verb, Verb::Post | Verb::Put);
        if wants_body && self.body.is_some() && !self.has_content_type() {
            list.append(&format!("Content-Type: {DEFAULT_CONTENT_TYPE}"))?;
        }

        let timeout_ms = self.timeout.as_millis().min(c_long::MAX as u128) as c_long;
        let easy = self.easy.as_ptr();
        unsafe {
            curl_sys::curl_easy_setopt(easy, curl_sys::CURLOPT_URL, url.as_ptr());
            curl_sys::curl_easy_setopt(easy, curl_sys::CURLOPT_TIMEOUT_MS, timeout_ms);
            curl_sys::curl_easy_setopt(
                easy,
                curl_sys::CURLOPT_FOLLOWLOCATION,
                self.follow_redirects as c_long,
            );
            curl_sys::curl_easy_setopt(easy, curl_sys::CURLOPT_USERAGENT, user_agent.as_ptr());
            curl_sys::curl_easy_setopt(easy, curl_sys::CURLOPT_HTTPHEADER, list.as_ptr());

            // CUSTOMREQUEST survives across transfers on a reused handle,
            // so it is cleared for the verbs that do not need it.
            match verb {
                Verb::Get => {
                    curl_sys::curl_easy_setopt(
                        easy,
                        curl_sys::CURLOPT_CUSTOMREQUEST,
                        ptr::null::<c_char>(),
                    );
                    curl_sys::curl_easy_setopt(easy, curl_sys::CURLOPT_HTTPGET, 1 as c_long);
                }
                Verb::Post => {
                    curl_sys::curl_easy_setopt(
                        easy,
                        curl_sys::CURLOPT_CUSTOMREQUEST,
                        ptr::null::<c_char>(),
                    );
                    curl_sys::curl_easy_setopt(easy, curl_sys::CURLOPT_POST, 1 as c_long);
                    self.apply_body(easy);
                }
                Verb::Put => {
                    curl_sys::curl_easy_setopt(
                        easy,
                        curl_sys::CURLOPT_CUSTOMREQUEST,
                        b"PUT\0".as_ptr() as *const c_char,
                    );
                    self.apply_body(easy);
                }
                Verb::Delete => {
                    curl_sys::curl_easy_setopt(easy, curl_sys::CURLOPT_HTTPGET, 1 as c_long);
                    curl_sys::curl_easy_setopt(
                        easy,
                        curl_sys::CURLOPT_CUSTOMREQUEST,
                        b"DELETE\0".as_ptr() as *const c_char,
                    );
                }
            }

            let rc = curl_sys::curl_easy_perform(easy);

            // The slist and the body buffer only have to outlive the
            // transfer; drop libcurl's references before they go away.
            curl_sys::curl_easy_setopt(
                easy,
                curl_sys::CURLOPT_HTTPHEADER,
                ptr::null_mut::<curl_sys::curl_slist>(),
            );
            curl_sys::curl_easy_setopt(
                easy,
                curl_sys::CURLOPT_POSTFIELDS,
                ptr::null::<c_char>(),
            );

            if rc != curl_sys::CURLE_OK {
                return Err(HttpError::Transfer {
                    code: rc as i32,
                    message: self.perform_error_text(rc),
                });
            }

            let mut status: c_long = 0;
            curl_sys::curl_easy_getinfo(
                easy,
                curl_sys::CURLINFO_RESPONSE_CODE,
                &mut status as *mut c_long,
            );
            Ok(HttpResponse {
                status: status as u32,
                body: mem::take(&mut self.transfer.body),
                headers: mem::take(&mut self.transfer.headers),
            })
        }
    }

    /// POSTFIELDS is not copied by libcurl; `self.body` stays alive until
    /// the pointer is cleared after the transfer.
    unsafe fn apply_body(&self, easy: *mut curl_sys::CURL) {
        const EMPTY_BODY: &[u8] = b"\0";
        let body: &[u8] = self.body.as_deref().unwrap_or(&[]);
        let data = if body.is_empty() {
            EMPTY_BODY.as_ptr()
        } else {
            body.as_ptr()
        };
        curl_sys::curl_easy_setopt(easy, curl_sys::CURLOPT_POSTFIELDS, data as *const c_char);
        curl_sys::curl_easy_setopt(
            easy,
            curl_sys::CURLOPT_POSTFIELDSIZE,
            body.len() as c_long,
        );
    }

    /// Error-buffer text when libcurl recorded any, else the generic
    /// description of the code.
    fn perform_error_text(&self, code: curl_sys::CURLcode) -> String {
        if let Some(text) = self.transfer.error_text() {
            return text.to_string();
        }
        let msg = unsafe { CStr::from_ptr(curl_sys::curl_easy_strerror(code)) };
        msg.to_string_lossy().into_owned()
    }
}

impl Drop for HttpRequest<'_> {
    fn drop(&mut self) {
        unsafe { curl_sys::curl_easy_cleanup(self.easy.as_ptr()) };
    }
}
