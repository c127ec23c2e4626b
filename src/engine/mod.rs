//! Sync engine
//!
//! Drives one invocation end to end.
//!
//! # Overview
//!
//! Each call to [`SyncEngine::sync`] runs the same linear sequence:
//!
//! 1. **Token check**: reuse the token cached in the state or exchange the
//!    client credentials for a new one.
//! 2. **Fetching**: one page of every configured resource type, all at the
//!    shared offset and with the same `updated_after` lower bound.
//! 3. **Assembling**: merge the pages into the outgoing state. The offset
//!    advances while any resource has more pages and resets to 0 once all
//!    are drained; only then is the watermark moved forward.
//!
//! Any error aborts the invocation. The caller re-invokes with the last
//! state it received, so a failed invocation commits nothing.

mod types;

pub use types::{ErrorResponse, SyncRequest, SyncResponse};

use crate::auth::{CachedToken, CredentialManager};
use crate::config::ConnectorConfig;
use crate::error::Result;
use crate::http::{HttpClient, HttpClientConfig};
use crate::pagination::{FetchResult, PageFetcher, PageRequest};
use crate::state::SyncState;
use crate::types::ResourceType;
use crate::watermark::{self, Watermark};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Orchestrates a single sync invocation
#[derive(Debug, Clone)]
pub struct SyncEngine {
    /// Connector configuration
    config: ConnectorConfig,
    /// Token exchange
    credentials: CredentialManager,
    /// Page fetcher
    fetcher: PageFetcher,
}

impl SyncEngine {
    /// Create an engine with its own HTTP client
    pub fn new(config: ConnectorConfig) -> Result<Self> {
        config.validate()?;
        let http_config = HttpClientConfig::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build();
        let http_client = HttpClient::with_config(http_config)?;
        Ok(Self::with_client(config, http_client))
    }

    /// Create an engine sharing an existing HTTP client
    pub fn with_client(config: ConnectorConfig, http_client: HttpClient) -> Self {
        let credentials = CredentialManager::new(config.token_url.clone(), http_client.clone());
        let fetcher = PageFetcher::from_config(&config, http_client);
        Self {
            config,
            credentials,
            fetcher,
        }
    }

    /// Run one invocation against the current time
    pub async fn sync(&self, request: &SyncRequest) -> Result<SyncResponse> {
        self.sync_at(request, Utc::now()).await
    }

    /// Run one invocation, treating `now` as the current time for token
    /// expiry decisions
    pub async fn sync_at(
        &self,
        request: &SyncRequest,
        now: DateTime<Utc>,
    ) -> Result<SyncResponse> {
        let state = &request.state;

        let token = self
            .credentials
            .ensure_token(state, &request.secrets, now)
            .await?;

        let current = confirmed_watermark(state)?;
        let updated_after =
            watermark::look_back(current.as_ref().map(|w| w.at), self.config.look_back());

        info!(
            offset = state.offset,
            watermark = current.as_ref().map_or("-", |w| w.raw.as_str()),
            updated_after = updated_after.as_deref().unwrap_or("-"),
            "Starting sync invocation"
        );

        let requests: Vec<PageRequest> = self
            .config
            .resources
            .iter()
            .map(|resource| {
                PageRequest::new(
                    *resource,
                    request.secrets.rid.clone(),
                    self.config.page_limit,
                    state.offset,
                )
                .with_updated_after(updated_after.clone())
            })
            .collect();

        let pages = self.fetch_all(&token.token, &requests).await?;

        let response = assemble(state, current, &token, self.config.page_limit, pages);

        info!(
            records = response.record_count(),
            has_more = response.has_more,
            next_offset = response.state.offset,
            "Sync invocation complete"
        );

        Ok(response)
    }

    /// Fetch one page per request, concurrently unless configured otherwise.
    /// The first failure aborts the rest.
    async fn fetch_all(
        &self,
        token: &str,
        requests: &[PageRequest],
    ) -> Result<Vec<(ResourceType, FetchResult)>> {
        if self.config.concurrent_fetches {
            let pages = try_join_all(
                requests
                    .iter()
                    .map(|request| self.fetcher.fetch_page(token, request)),
            )
            .await?;
            return Ok(requests.iter().map(|r| r.resource).zip(pages).collect());
        }

        let mut pages = Vec::with_capacity(requests.len());
        for request in requests {
            let page = self.fetcher.fetch_page(token, request).await?;
            pages.push((request.resource, page));
        }
        Ok(pages)
    }
}

/// The watermark confirmed by previous invocations
fn confirmed_watermark(state: &SyncState) -> Result<Option<Watermark>> {
    let at = state.last_synced_at()?;
    Ok(at
        .zip(state.last_sync_timestamp.clone())
        .map(|(at, raw)| Watermark { at, raw }))
}

/// Build the response from the fetched pages
fn assemble(
    prior: &SyncState,
    current: Option<Watermark>,
    token: &CachedToken,
    limit: u32,
    pages: Vec<(ResourceType, FetchResult)>,
) -> SyncResponse {
    let has_more = pages.iter().any(|(_, page)| page.has_next_page);

    let mut insert = BTreeMap::new();
    let mut schema = BTreeMap::new();
    for (resource, page) in pages {
        debug!(
            resource = %resource,
            records = page.len(),
            has_next_page = page.has_next_page,
            "Page merged"
        );
        schema.insert(resource, resource.table_schema());
        insert.insert(resource, page.items);
    }

    let (offset, last_sync_timestamp) = if has_more {
        (
            prior.offset.saturating_add(u64::from(limit)),
            prior.last_sync_timestamp.clone(),
        )
    } else {
        let candidate = watermark::compute_watermark(&insert);
        (0, watermark::advance(current, candidate).map(|w| w.raw))
    };

    SyncResponse {
        state: SyncState {
            last_sync_timestamp,
            offset,
            access_token: Some(token.token.clone()),
            token_expiration: token.expiration_string(),
        },
        insert,
        schema,
        has_more,
    }
}
