//! Engine types
//!
//! The Fivetran request/response contract.

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::state::SyncState;
use crate::types::{JsonValue, Record, ResourceType, TableSchema};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Inbound request sent by Fivetran on every invocation
#[derive(Debug, Clone)]
pub struct SyncRequest {
    /// State returned by the previous successful invocation
    pub state: SyncState,
    /// Client credentials and restaurant ID
    pub secrets: Credentials,
    /// Reserved; accepted and ignored
    pub custom_payload: Option<JsonValue>,
}

impl SyncRequest {
    /// Create a request
    pub fn new(state: SyncState, secrets: Credentials) -> Self {
        Self {
            state,
            secrets,
            custom_payload: None,
        }
    }

    /// Parse a raw request body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: JsonValue = serde_json::from_slice(body)
            .map_err(|e| Error::malformed_request(format!("body is not valid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Parse and validate a request.
    ///
    /// Shape problems in `state` are [`Error::MalformedState`]; everything
    /// else is [`Error::MalformedRequest`] or [`Error::MissingField`].
    pub fn from_value(value: JsonValue) -> Result<Self> {
        let JsonValue::Object(mut body) = value else {
            return Err(Error::malformed_request("body must be a JSON object"));
        };

        let state = SyncState::from_value(body.remove("state").unwrap_or(JsonValue::Null))?;

        let secrets = match body.remove("secrets") {
            None | Some(JsonValue::Null) => return Err(Error::missing_field("secrets")),
            Some(value) => serde_json::from_value::<Credentials>(value)
                .map_err(|e| Error::malformed_request(format!("invalid secrets: {e}")))?,
        };
        secrets.validate()?;

        let custom_payload = body.remove("customPayload").filter(|v| !v.is_null());

        Ok(Self {
            state,
            secrets,
            custom_payload,
        })
    }
}

/// Successful invocation result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncResponse {
    /// State to persist and send back next time
    pub state: SyncState,
    /// Records to upsert, per resource type
    pub insert: BTreeMap<ResourceType, Vec<Record>>,
    /// Primary key declaration, per resource type
    pub schema: BTreeMap<ResourceType, TableSchema>,
    /// Whether Fivetran should invoke again immediately
    #[serde(rename = "hasMore")]
    pub has_more: bool,
}

impl SyncResponse {
    /// Total records across all resource types
    pub fn record_count(&self) -> usize {
        self.insert.values().map(Vec::len).sum()
    }
}

/// Failed invocation result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Human-readable message including the upstream message
    pub error_message: String,
    /// Error kind tag
    pub error_type: String,
    /// Error cause chain
    pub stack_trace: String,
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        Self {
            error_message: err.to_string(),
            error_type: err.error_type().to_string(),
            stack_trace: err.chain(),
        }
    }
}
