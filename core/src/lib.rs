//! Request/response core for the httpbin request screen.
//!
//! # Overview
//! Builds `HttpRequest` values for the five screen operations and decodes
//! `HttpResponse` values into a `ResponseState` without touching the network
//! (host-does-IO pattern). The dispatcher crate and the C ABI both execute
//! the round-trip themselves and hand the response back here.
//!
//! # Design
//! - `EchoClient` is stateless — it holds only `base_url`.
//! - Each operation maps to exactly one method + URL pair; bodies and the
//!   JSON content type only appear on POST and PUT.
//! - Decoding never fails: a body that is not JSON degrades to a
//!   `{status, statusText}` fallback.

pub mod client;
pub mod error;
pub mod http;
pub mod response;
pub mod types;

pub use client::{EchoClient, DEFAULT_BASE_URL};
pub use error::{DispatchError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use response::{decode_response, ResponseState, ERROR_MESSAGE};
pub use types::{EchoPayload, FormState, Operation};

/// Text shown by the presentation layer while a call is in flight.
pub const LOADING_TEXT: &str = "Carregando...";

/// Screen title.
pub const SCREEN_TITLE: &str = "Requisições HTTP com Httpbin API";
