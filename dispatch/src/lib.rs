//! Asynchronous request dispatcher for the httpbin request screen.
//!
//! # Overview
//! `Screen` owns the three pieces of screen state (form inputs, response
//! panel, loading flag) as observable values and turns a button press into
//! exactly one HTTP call through a `Transport`. Request building and response
//! decoding live in `echo-core`; this crate only sequences them around the
//! network await.
//!
//! # Design
//! - State lives in `tokio::sync::watch` channels so any presentation layer
//!   can subscribe and re-render on change.
//! - Dispatches are not serialized. By default the last call to complete
//!   wins the response panel; `ResultPolicy::LatestOnly` drops completions of
//!   superseded dispatches instead.
//! - Every failure collapses to `ResponseState::Failed`. The cause is logged
//!   and otherwise discarded.

pub mod screen;
pub mod transport;

pub use screen::{ResultPolicy, Screen};
pub use transport::{ReqwestTransport, Transport};
