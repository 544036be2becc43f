//! Stateless HTTP request builder for the httpbin echo endpoints.
//!
//! # Design
//! `EchoClient` holds only a `base_url` and carries no mutable state between
//! calls. `build_request` maps one `Operation` plus the current form inputs to
//! exactly one `HttpRequest`; the caller executes the round-trip and hands the
//! response to `response::decode_response`.

use crate::error::DispatchError;
use crate::http::{HttpMethod, HttpRequest};
use crate::types::{EchoPayload, FormState, Operation};

/// Public echo service the screen talks to.
pub const DEFAULT_BASE_URL: &str = "https://httpbin.org";

/// Synchronous, stateless request builder for the echo service.
#[derive(Debug, Clone)]
pub struct EchoClient {
    base_url: String,
}

impl Default for EchoClient {
    fn default() -> Self {
        Self::new()
    }
}

impl EchoClient {
    /// Client bound to the fixed public host.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client bound to another host serving the same five endpoints, such as
    /// the local `mock-server`.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_request(
        &self,
        operation: Operation,
        form: &FormState,
    ) -> Result<HttpRequest, DispatchError> {
        match operation {
            Operation::Get => Ok(self.bodiless(HttpMethod::Get, "get")),
            Operation::Post => self.with_payload(HttpMethod::Post, "post", form),
            Operation::Put => self.with_payload(HttpMethod::Put, "put", form),
            Operation::Delete => Ok(self.bodiless(HttpMethod::Delete, "delete")),
            // Passed through untouched: "abc" or "4 04" end up in the path as typed.
            Operation::Status => Ok(self.bodiless(
                HttpMethod::Get,
                &format!("status/{}", form.status_code),
            )),
        }
    }

    fn bodiless(&self, method: HttpMethod, path: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}/{path}", self.base_url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn with_payload(
        &self,
        method: HttpMethod,
        path: &str,
        form: &FormState,
    ) -> Result<HttpRequest, DispatchError> {
        let payload = EchoPayload {
            name: form.name.clone(),
            message: form.message.clone(),
            kind: method.as_str().to_string(),
        };
        let body = serde_json::to_string(&payload)
            .map_err(|e| DispatchError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            url: format!("{}/{path}", self.base_url),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }
}
