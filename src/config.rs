//! Connector configuration
//!
//! Endpoints, paging and look-back settings. Every field has a default
//! matching the production OpenTable API, so an empty YAML document is a
//! valid configuration.

use crate::error::{Error, Result};
use crate::types::ResourceType;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Environment variable overriding the token endpoint
pub const ENV_TOKEN_URL: &str = "OPENTABLE_TOKEN_URL";

/// Environment variable overriding the sync API base URL
pub const ENV_API_BASE_URL: &str = "OPENTABLE_API_BASE_URL";

/// Runtime configuration for the connector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorConfig {
    /// OAuth2 token endpoint (client-credentials grant)
    pub token_url: String,

    /// Base URL of the sync API; resource paths are appended
    pub api_base_url: String,

    /// Records requested per page
    pub page_limit: u32,

    /// Days subtracted from the watermark before querying
    pub look_back_days: i64,

    /// Per-request timeout in seconds
    pub request_timeout_seconds: u64,

    /// User agent sent upstream
    pub user_agent: String,

    /// Resource types to sync
    pub resources: Vec<ResourceType>,

    /// Fetch resource types concurrently
    pub concurrent_fetches: bool,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            token_url: "https://oauth.opentable.com/api/v2/oauth/token".to_string(),
            api_base_url: "https://platform.opentable.com/sync/v2".to_string(),
            page_limit: 100,
            look_back_days: 2,
            request_timeout_seconds: 30,
            user_agent: format!("fivetran-opentable/{}", crate::VERSION),
            resources: ResourceType::ALL.to_vec(),
            concurrent_fetches: true,
        }
    }
}

impl ConnectorConfig {
    /// Parse configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document deserializes as null
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&contents)
    }

    /// Load configuration from an optional file, then apply environment
    /// overrides and validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_yaml_file(path)?,
            None => Self::default(),
        };
        let config = config.with_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply endpoint overrides from a variable lookup
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_TOKEN_URL).filter(|v| !v.is_empty()) {
            self.token_url = url;
        }
        if let Some(url) = lookup(ENV_API_BASE_URL).filter(|v| !v.is_empty()) {
            self.api_base_url = url;
        }
        self
    }

    /// Check the configuration for values the sync loop cannot work with
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.token_url)?;
        Url::parse(&self.api_base_url)?;

        if self.page_limit == 0 {
            return Err(Error::config("page_limit must be greater than 0"));
        }
        if self.look_back_days < 0 {
            return Err(Error::config("look_back_days must not be negative"));
        }
        if self.request_timeout_seconds == 0 {
            return Err(Error::config("request_timeout_seconds must be greater than 0"));
        }
        if self.resources.is_empty() {
            return Err(Error::config("at least one resource must be configured"));
        }
        for (i, resource) in self.resources.iter().enumerate() {
            if self.resources[..i].contains(resource) {
                return Err(Error::config(format!("resource '{resource}' listed twice")));
            }
        }
        Ok(())
    }

    /// Request timeout as a `Duration`
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Look-back window as a `chrono::Duration`
    pub fn look_back(&self) -> chrono::Duration {
        chrono::Duration::days(self.look_back_days)
    }

    /// Render the configuration as YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
