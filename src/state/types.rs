//! State types for tracking sync progress
//!
//! Serialized with camelCase keys, matching what Fivetran stores and sends
//! back on the next invocation.

use crate::error::{Error, Result};
use crate::watermark::parse_timestamp;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Caller-persisted state round-tripped through every invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    /// Confirmed watermark; records updated before it are synced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync_timestamp: Option<String>,

    /// Pagination cursor within the current sync window
    #[serde(default, deserialize_with = "deserialize_offset")]
    pub offset: u64,

    /// Cached bearer token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Expiry instant of `access_token`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expiration: Option<String>,
}

impl SyncState {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse state from the JSON value sent by the caller.
    ///
    /// `null` is treated as an empty state. Any shape problem is reported as
    /// [`Error::MalformedState`].
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        let mut state: Self =
            serde_json::from_value(value).map_err(|e| Error::malformed_state(e.to_string()))?;

        // Blank strings are what some callers store for "never synced"
        if state
            .last_sync_timestamp
            .as_deref()
            .is_some_and(|s| s.trim().is_empty())
        {
            state.last_sync_timestamp = None;
        }

        state.validate()?;
        Ok(state)
    }

    /// Check that timestamp fields parse
    pub fn validate(&self) -> Result<()> {
        self.last_synced_at()?;
        self.token_expires_at()?;
        Ok(())
    }

    /// Confirmed watermark as an instant
    pub fn last_synced_at(&self) -> Result<Option<DateTime<Utc>>> {
        parse_field("lastSyncTimestamp", self.last_sync_timestamp.as_deref())
    }

    /// Token expiry as an instant
    pub fn token_expires_at(&self) -> Result<Option<DateTime<Utc>>> {
        parse_field("tokenExpiration", self.token_expiration.as_deref())
    }
}

fn parse_field(field: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value
        .map(|raw| {
            parse_timestamp(raw).ok_or_else(|| {
                Error::malformed_state(format!("{field} is not an ISO-8601 timestamp: {raw:?}"))
            })
        })
        .transpose()
}

/// Accept a missing or `null` offset as 0
fn deserialize_offset<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}
