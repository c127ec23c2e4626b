//! HTTP client module
//!
//! Thin wrapper over `reqwest` used for both the token exchange and the
//! sync API. Failures are classified into crate errors and surfaced to the
//! caller; the connector never retries on its own, since the scheduler
//! re-invokes with the last committed state.

mod client;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder, RequestConfig};
