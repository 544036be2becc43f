//! Local stand-in for the five httpbin endpoints the request screen calls.

use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;
use tracing::debug;

/// Reflection of the received request, shaped like httpbin's echo body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub args: BTreeMap<String, String>,
    pub headers: BTreeMap<String, String>,
    pub json: Option<Value>,
    pub data: String,
    pub method: String,
    pub url: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/get", get(echo))
        .route("/post", post(echo))
        .route("/put", put(echo))
        .route("/delete", delete(echo))
        .route("/status/{code}", any(status))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(args): Query<BTreeMap<String, String>>,
    body: Bytes,
) -> Json<Echo> {
    debug!(%method, %uri, body_len = body.len(), "echo");
    let data = String::from_utf8_lossy(&body).into_owned();
    let host = headers
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("localhost");
    Json(Echo {
        args,
        headers: header_map(&headers),
        json: serde_json::from_str(&data).ok(),
        url: format!("http://{host}{uri}"),
        method: method.to_string(),
        data,
    })
}

/// Empty body with the requested status; anything unparsable is a 400.
async fn status(Path(code): Path<String>) -> Response {
    debug!(%code, "status");
    match code.parse::<u16>().ok().and_then(|c| StatusCode::from_u16(c).ok()) {
        Some(status) => status.into_response(),
        None => (StatusCode::BAD_REQUEST, "Invalid status code").into_response(),
    }
}

fn header_map(headers: &HeaderMap) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}
