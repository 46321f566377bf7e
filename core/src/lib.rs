//! Synchronous HTTP client built directly on libcurl's easy interface.
//!
//! # Overview
//! A single fluent builder, `HttpRequest`, accumulates configuration through
//! chained setters and then performs exactly one blocking GET/POST/PUT/DELETE,
//! returning status code, body bytes, and raw header lines. `CurlGlobal`
//! scopes libcurl's process-wide init/cleanup around all builders.
//!
//! # Design
//! - Setters store plain Rust values and cannot fail; every libcurl option is
//!   applied at execution time, where invalid values surface as errors.
//! - A builder owns its easy handle for its whole lifetime and is reusable:
//!   each execution clears the previous response before performing.
//! - All failures are explicit `HttpError` values; a failed transfer never
//!   yields a partial response.
//! - The crate does no protocol parsing of its own — libcurl is the transport
//!   and this is a thin, safe veneer over it.

pub mod error;
pub mod global;
pub mod http;
pub mod request;

pub use error::HttpError;
pub use global::CurlGlobal;
pub use http::HttpResponse;
pub use request::HttpRequest;
