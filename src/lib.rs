//! # OpenTable connector for Fivetran
//!
//! An incremental sync connector exposing the OpenTable guests and
//! reservations collections through the Fivetran function-connector
//! protocol.
//!
//! Fivetran invokes the endpoint repeatedly. Each invocation carries the
//! state returned by the previous one, does one bounded unit of work and
//! returns the records to upsert plus the next state.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fivetran_opentable::{ConnectorConfig, SyncEngine, SyncRequest};
//!
//! #[tokio::main]
//! async fn main() -> fivetran_opentable::Result<()> {
//!     let engine = SyncEngine::new(ConnectorConfig::default())?;
//!
//!     let request = SyncRequest::from_slice(br#"{
//!         "state": {},
//!         "secrets": { "clientId": "...", "clientSecret": "...", "rid": "12345" }
//!     }"#)?;
//!
//!     let response = engine.sync(&request).await?;
//!     println!("hasMore = {}", response.has_more);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │          HTTP endpoint (POST /, GET /_health)               │
//! └──────────────────────────────┬──────────────────────────────┘
//!                                │ SyncRequest / SyncResponse
//! ┌──────────────────────────────┴──────────────────────────────┐
//! │  SyncEngine: token check → fetch pages → assemble state     │
//! └──────────┬───────────────────┬──────────────────┬───────────┘
//!            │                   │                  │
//! ┌──────────┴───────┐ ┌─────────┴────────┐ ┌───────┴──────────┐
//! │ CredentialManager│ │   PageFetcher    │ │    Watermark     │
//! │ client creds     │ │ offset / limit   │ │ max + look-back  │
//! └──────────────────┘ └──────────────────┘ └──────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Connector configuration
pub mod config;

/// OAuth2 client-credentials token management
pub mod auth;

/// HTTP client
pub mod http;

/// Offset/limit page fetching
pub mod pagination;

/// Caller-persisted sync state
pub mod state;

/// Watermark and look-back computation
pub mod watermark;

/// Sync orchestration
pub mod engine;

/// Command-line interface and HTTP server
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::ConnectorConfig;
pub use engine::{ErrorResponse, SyncEngine, SyncRequest, SyncResponse};
pub use error::{Error, Result};
pub use state::SyncState;
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
