//! Pagination types
//!
//! Request parameters for one page and the decoded upstream response.

use crate::types::{Record, ResourceType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters for fetching one page of a resource collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Collection to read
    pub resource: ResourceType,
    /// Restaurant ID
    pub rid: String,
    /// Page size
    pub limit: u32,
    /// Number of records to skip
    pub offset: u64,
    /// Lower bound on `updated_at_utc`; omitted from the query when `None`
    pub updated_after: Option<String>,
}

impl PageRequest {
    /// Create a page request without an `updated_after` filter
    pub fn new(resource: ResourceType, rid: impl Into<String>, limit: u32, offset: u64) -> Self {
        Self {
            resource,
            rid: rid.into(),
            limit,
            offset,
            updated_after: None,
        }
    }

    /// Set the `updated_after` filter
    #[must_use]
    pub fn with_updated_after(mut self, updated_after: Option<String>) -> Self {
        self.updated_after = updated_after;
        self
    }

    /// Query parameters sent upstream
    pub fn query_params(&self) -> HashMap<String, String> {
        let mut params = HashMap::new();
        params.insert("rid".to_string(), self.rid.clone());
        params.insert("limit".to_string(), self.limit.to_string());
        params.insert("offset".to_string(), self.offset.to_string());
        if let Some(updated_after) = &self.updated_after {
            params.insert("updated_after".to_string(), updated_after.clone());
        }
        params
    }
}

/// One page of records as returned by the sync API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    /// Records in upstream order
    pub items: Vec<Record>,
    /// Whether a request at `offset + limit` would return more records
    #[serde(rename = "hasNextPage", default)]
    pub has_next_page: bool,
}

impl FetchResult {
    /// Create a fetch result
    pub fn new(items: Vec<Record>, has_next_page: bool) -> Self {
        Self {
            items,
            has_next_page,
        }
    }

    /// Number of records on the page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the page is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
