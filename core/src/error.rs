//! Error types for the request screen.
//!
//! # Design
//! Two tiers. A body that is not JSON is not an error at all (see
//! `response::decode_response`). Everything else — an operation outside the
//! fixed set, a payload that fails to serialize, or a transport failure —
//! is a `DispatchError`, and the screen collapses every variant into the same
//! generic error marker. The variants exist for logging, not for display.

use thiserror::Error;

/// Failure to complete one HTTP round-trip.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The host could not be reached (DNS, refused connection, TLS).
    #[error("connection failed: {0}")]
    Connect(String),

    /// The transport's own default timeout elapsed.
    #[error("request timed out")]
    Timeout,

    /// Any other transport failure, including reading the body.
    #[error("transport failure: {0}")]
    Other(String),
}

/// Errors raised while dispatching a screen operation.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The operation label or code is not one of the five screen operations.
    #[error("Método não suportado: {0}")]
    UnsupportedOperation(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
