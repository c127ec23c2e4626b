//! Auth types
//!
//! Client credentials supplied by the caller and the token derived from
//! them.

use crate::error::{Error, Result};
use crate::state::SyncState;
use crate::watermark::format_timestamp;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Client credentials and restaurant scope (`secrets` in the request)
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// OAuth2 client ID
    pub client_id: String,
    /// OAuth2 client secret
    pub client_secret: String,
    /// Restaurant ID scoping every sync call
    pub rid: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        rid: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            rid: rid.into(),
        }
    }

    /// Reject blank fields
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("clientId", &self.client_id),
            ("clientSecret", &self.client_secret),
            ("rid", &self.rid),
        ] {
            if value.trim().is_empty() {
                return Err(Error::missing_field(field));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"***")
            .field("rid", &self.rid)
            .finish()
    }
}

/// Access token with its expiry
#[derive(Clone, PartialEq, Eq)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires; `None` means unknown
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    /// Create a token that expires `seconds` after `now`.
    ///
    /// A negative lifetime yields a token that is already expired at `now`.
    pub fn expires_in(
        token: impl Into<String>,
        now: DateTime<Utc>,
        seconds: i64,
    ) -> Result<Self> {
        let expires_at = chrono::Duration::try_seconds(seconds.max(0))
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| Error::decode(format!("expires_in out of range: {seconds}")))?;
        Ok(Self {
            token: token.into(),
            expires_at: Some(expires_at),
        })
    }

    /// Read the cached token out of the sync state
    pub fn from_state(state: &SyncState) -> Result<Option<Self>> {
        let expires_at = state.token_expires_at()?;
        Ok(state
            .access_token
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|token| Self::new(token.clone(), expires_at)))
    }

    /// Whether the token must be replaced at `now`.
    ///
    /// A token expiring exactly at `now` counts as expired, and so does one
    /// with no known expiry.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at,
            None => true,
        }
    }

    /// Expiry formatted for the state object
    pub fn expiration_string(&self) -> Option<String> {
        self.expires_at.map(format_timestamp)
    }
}

impl std::fmt::Debug for CachedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedToken")
            .field("token", &"***")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
