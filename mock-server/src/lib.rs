//! Deterministic HTTP endpoints for exercising the request executor.
//!
//! - `ANY /echo` reflects method, query, headers and body as JSON.
//! - `GET /status/{code}` answers with that status and `{"error": <reason>}`.
//! - `GET /slow/{ms}` sleeps before answering.
//! - `GET /text` answers with a plain-text body.
//! - `GET /cookies` sends two `set-cookie` headers.
//! - `GET /loop` redirects to itself forever.

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, HeaderMap, Method, StatusCode},
    response::{AppendHeaders, IntoResponse, Redirect},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What `/echo` saw.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Echo {
    pub method: String,
    pub query: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/status/{code}", get(status))
        .route("/slow/{ms}", get(slow))
        .route("/text", get(text))
        .route("/cookies", get(cookies))
        .route("/loop", get(redirect_loop))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Serve `app()` on an ephemeral port from a background thread and return
/// its address. Meant for blocking tests.
pub fn spawn() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = TcpListener::from_std(std_listener).unwrap();
            run(listener).await
        })
        .unwrap();
    });

    addr
}

async fn echo(
    method: Method,
    Query(query): Query<BTreeMap<String, String>>,
    headers: HeaderMap,
    body: Bytes,
) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                String::from_utf8_lossy(v.as_bytes()).into_owned(),
            )
        })
        .collect();
    tracing::debug!(%method, "echo");
    Json(Echo {
        method: method.to_string(),
        query,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn status(Path(code): Path<u16>) -> impl IntoResponse {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    let reason = status
        .canonical_reason()
        .unwrap_or("unknown")
        .to_ascii_lowercase();
    (status, Json(serde_json::json!({ "error": reason })))
}

async fn slow(Path(ms): Path<u64>) -> Json<serde_json::Value> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(serde_json::json!({ "slept_ms": ms }))
}

async fn text() -> &'static str {
    "plain text, not json"
}

async fn cookies() -> impl IntoResponse {
    (
        AppendHeaders([(header::SET_COOKIE, "a=1"), (header::SET_COOKIE, "b=2")]),
        "ok",
    )
}

async fn redirect_loop() -> Redirect {
    Redirect::temporary("/loop")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_to_json() {
        let echo = Echo {
            method: "GET".to_string(),
            query: BTreeMap::from([("q".to_string(), "rust".to_string())]),
            headers: BTreeMap::new(),
            body: String::new(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["query"]["q"], "rust");
        assert_eq!(json["body"], "");
    }

    #[tokio::test]
    async fn status_uses_requested_code() {
        let resp = status(Path(404)).await.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
