//! Common types used throughout the connector
//!
//! Resource types tracked on the OpenTable sync API and the schema
//! declaration reported back to Fivetran.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// A single upstream record, passed through to Fivetran unchanged
pub type Record = JsonValue;

// ============================================================================
// Resource Types
// ============================================================================

/// A named upstream collection on the sync API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Guest profiles
    Guests,
    /// Reservations
    Reservations,
}

impl ResourceType {
    /// All resource types, in the order they are synced by default
    pub const ALL: [ResourceType; 2] = [ResourceType::Guests, ResourceType::Reservations];

    /// Table / path name for the resource
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Guests => "guests",
            ResourceType::Reservations => "reservations",
        }
    }

    /// Primary key columns declared to the destination
    pub fn primary_key(&self) -> Vec<String> {
        vec!["id".to_string()]
    }

    /// Schema entry declared to the destination for this resource
    pub fn table_schema(&self) -> TableSchema {
        TableSchema {
            primary_key: self.primary_key(),
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Schema
// ============================================================================

/// Destination table declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    /// Primary key columns used by the destination upsert
    pub primary_key: Vec<String>,
}
