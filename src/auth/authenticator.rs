//! Credential manager implementation
//!
//! Decides whether the token carried in the sync state can be reused and
//! performs the client-credentials exchange when it cannot.

use super::types::{CachedToken, Credentials};
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::state::SyncState;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

/// Obtains access tokens for the sync API
#[derive(Debug, Clone)]
pub struct CredentialManager {
    /// Token endpoint URL
    token_url: String,
    /// HTTP client for token requests
    http_client: HttpClient,
}

impl CredentialManager {
    /// Create a credential manager for the given token endpoint
    pub fn new(token_url: impl Into<String>, http_client: HttpClient) -> Self {
        Self {
            token_url: token_url.into(),
            http_client,
        }
    }

    /// Return a token valid at `now`.
    ///
    /// Reuses the token cached in `state` when it has not expired, otherwise
    /// exchanges the client credentials for a new one. The state itself is
    /// not modified; the caller folds the result into the outgoing state.
    pub async fn ensure_token(
        &self,
        state: &SyncState,
        credentials: &Credentials,
        now: DateTime<Utc>,
    ) -> Result<CachedToken> {
        if let Some(cached) = CachedToken::from_state(state)? {
            if !cached.is_expired_at(now) {
                debug!("Reusing cached access token");
                return Ok(cached);
            }
        }

        info!("Refreshing access token");
        self.exchange(credentials, now)
            .await
            .map_err(Error::credential)
    }

    /// Fetch a new token using the client credentials flow
    async fn exchange(&self, credentials: &Credentials, now: DateTime<Utc>) -> Result<CachedToken> {
        let request = RequestConfig::new()
            .form_field("grant_type", "client_credentials")
            .basic_auth(&credentials.client_id, &credentials.client_secret);

        let response: TokenResponse = self
            .http_client
            .post_json_with_config(&self.token_url, request)
            .await?;

        if response.access_token.is_empty() {
            return Err(Error::decode("token response has an empty access_token"));
        }

        CachedToken::expires_in(response.access_token, now, response.expires_in)
    }
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    #[serde(default)]
    #[allow(dead_code)]
    token_type: Option<String>,
}
