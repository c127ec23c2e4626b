//! Sync state
//!
//! The state object is owned by the caller: it arrives with every
//! invocation, is validated and read once, and the updated copy is handed
//! back in the response. Nothing is persisted by the connector itself.

mod types;

pub use types::SyncState;
