//! Page fetcher
//!
//! Issues a single `GET {base}/{resource}` request per call.

use super::types::{FetchResult, PageRequest};
use crate::config::ConnectorConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, RequestConfig};
use crate::types::ResourceType;
use tracing::debug;

/// Fetches pages of resource collections from the sync API
#[derive(Debug, Clone)]
pub struct PageFetcher {
    /// Base URL; resource names are appended as path segments
    base_url: String,
    /// HTTP client
    http_client: HttpClient,
}

impl PageFetcher {
    /// Create a fetcher rooted at `base_url`
    pub fn new(base_url: impl Into<String>, http_client: HttpClient) -> Self {
        Self {
            base_url: base_url.into(),
            http_client,
        }
    }

    /// Create a fetcher from connector configuration
    pub fn from_config(config: &ConnectorConfig, http_client: HttpClient) -> Self {
        Self::new(config.api_base_url.clone(), http_client)
    }

    /// URL of a resource collection
    pub fn resource_url(&self, resource: ResourceType) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            resource.as_str()
        )
    }

    /// Fetch one page.
    ///
    /// Any failure is returned as [`Error::Fetch`] tagged with the resource.
    pub async fn fetch_page(&self, token: &str, request: &PageRequest) -> Result<FetchResult> {
        let url = self.resource_url(request.resource);

        let config = request
            .query_params()
            .into_iter()
            .fold(RequestConfig::new().bearer(token), |config, (key, value)| {
                config.query(key, value)
            });

        debug!(
            resource = %request.resource,
            offset = request.offset,
            limit = request.limit,
            updated_after = request.updated_after.as_deref().unwrap_or("-"),
            "Fetching page"
        );

        let result: FetchResult = self
            .http_client
            .get_json_with_config(&url, config)
            .await
            .map_err(|e| Error::fetch(request.resource, e))?;

        debug!(
            resource = %request.resource,
            records = result.len(),
            has_next_page = result.has_next_page,
            "Fetched page"
        );

        Ok(result)
    }
}
