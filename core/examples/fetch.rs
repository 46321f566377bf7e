//! GET then POST against a running mock server.
//!
//! Start the server first (`cargo run -p mock-server`), then run this
//! example. A different base URL can be passed as the first argument.

use std::time::Duration;

use fetch_core::{CurlGlobal, HttpRequest};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let global = CurlGlobal::new()?;
    let base = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:3000".to_string());

    let mut req = HttpRequest::new(&global)?;
    let res = req
        .url(format!("{base}/get"))
        .timeout(Duration::from_secs(5))
        .get()?;
    println!("GET status: {}", res.status);
    println!("body size: {} bytes", res.body.len());

    let mut post = HttpRequest::new(&global)?;
    let res = post
        .url(format!("{base}/echo"))
        .timeout(Duration::from_secs(5))
        .body_with_type(r#"{"x":1}"#, "application/json")
        .post()?;
    println!("POST status: {}", res.status);
    println!("{}", res.text());

    Ok(())
}
