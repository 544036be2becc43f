//! Response decoding and the value the screen displays.
//!
//! # Design
//! Any response that arrives is shown. A body that parses as JSON is kept
//! verbatim as a `serde_json::Value`; anything else (HTML, plain text, an
//! empty body from `/status/204`) degrades to the status code and reason
//! phrase. Only a missing response or an unsupported operation produces the
//! generic error marker.

use serde_json::{json, Value};

use crate::http::HttpResponse;

/// Fixed text of the error marker. The cause is never shown.
pub const ERROR_MESSAGE: &str = "Erro ao chamar API";

/// What the response panel currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseState {
    /// Nothing yet, or a call is in flight.
    #[default]
    Absent,
    /// The body decoded as JSON, verbatim.
    Decoded(Value),
    /// The body was not JSON.
    Fallback { status: u16, status_text: String },
    /// Transport failure or unsupported operation.
    Failed,
}

impl ResponseState {
    pub fn is_absent(&self) -> bool {
        matches!(self, ResponseState::Absent)
    }

    /// The JSON value the panel renders, or `None` when there is nothing to show.
    pub fn to_json(&self) -> Option<Value> {
        match self {
            ResponseState::Absent => None,
            ResponseState::Decoded(value) => Some(value.clone()),
            ResponseState::Fallback {
                status,
                status_text,
            } => Some(json!({ "status": status, "statusText": status_text })),
            ResponseState::Failed => Some(json!({ "error": ERROR_MESSAGE })),
        }
    }

    /// Pretty-printed JSON with two-space indentation, as the panel shows it.
    pub fn render(&self) -> Option<String> {
        self.to_json()
            .and_then(|value| serde_json::to_string_pretty(&value).ok())
    }
}

/// Decode a received response. Never fails.
pub fn decode_response(response: &HttpResponse) -> ResponseState {
    match serde_json::from_str::<Value>(&response.body) {
        Ok(value) => ResponseState::Decoded(value),
        Err(_) => ResponseState::Fallback {
            status: response.status,
            status_text: response.reason.clone(),
        },
    }
}
