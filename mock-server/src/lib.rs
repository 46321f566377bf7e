//! Local HTTP test server with httpbin-style inspection endpoints.
//!
//! # Design
//! Stateless router: every endpoint reflects something about the request it
//! received (method, headers, body), so a client under test can verify what
//! actually went over the wire. Used by `fetch-core`'s integration tests
//! and runnable standalone for the demo example.

use std::time::Duration;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server saw on a plain request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestInfo {
    pub method: String,
    pub user_agent: Option<String>,
}

/// Reflection of an incoming body-carrying request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Echo {
    /// Every `Content-Type` value received, in order. More than one entry
    /// means the client duplicated the header.
    pub content_type: Vec<String>,
    pub body: String,
    pub len: usize,
}

pub fn app() -> Router {
    Router::new()
        .route("/get", get(request_info))
        .route("/echo", post(echo).put(echo))
        .route("/method", any(method_name))
        .route("/ordered", get(ordered_headers))
        .route("/first", get(first))
        .route("/second", get(second))
        .route("/redirect", get(redirect))
        .route("/delay/{ms}", get(delay))
        .route("/status/{code}", get(status))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn request_info(method: Method, headers: HeaderMap) -> Json<RequestInfo> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    Json(RequestInfo {
        method: method.to_string(),
        user_agent,
    })
}

async fn echo(headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let content_type = headers
        .get_all(header::CONTENT_TYPE)
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
        .collect();
    Json(Echo {
        content_type,
        body: String::from_utf8_lossy(&body).into_owned(),
        len: body.len(),
    })
}

async fn method_name(method: Method) -> String {
    method.to_string()
}

async fn ordered_headers() -> impl IntoResponse {
    (
        AppendHeaders([("x-one", "1"), ("x-two", "2"), ("x-three", "3")]),
        "ordered",
    )
}

async fn first() -> impl IntoResponse {
    (AppendHeaders([("x-payload", "first")]), "first payload")
}

async fn second() -> impl IntoResponse {
    (AppendHeaders([("x-payload", "second")]), "second payload")
}

async fn redirect() -> Redirect {
    Redirect::temporary("/get")
}

async fn delay(Path(ms): Path<u64>) -> &'static str {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    "done"
}

async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_to_json() {
        let echo = Echo {
            content_type: vec!["text/plain".to_string()],
            body: "hi".to_string(),
            len: 2,
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["content_type"][0], "text/plain");
        assert_eq!(json["body"], "hi");
        assert_eq!(json["len"], 2);
    }

    #[test]
    fn request_info_roundtrips_through_json() {
        let info = RequestInfo {
            method: "GET".to_string(),
            user_agent: Some("probe/0.1".to_string()),
        };
        let json = serde_json::to_string(&info).unwrap();
        let back: RequestInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back.method, "GET");
        assert_eq!(back.user_agent.as_deref(), Some("probe/0.1"));
    }
}
