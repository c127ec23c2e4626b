//! Error types for the OpenTable connector
//!
//! Every fallible operation in the crate returns `Result<T, Error>`.
//! Errors are converted to the Fivetran wire shape only at the outermost
//! response step (see [`crate::engine::ErrorResponse`]).

use crate::types::ResourceType;
use std::error::Error as StdError;
use thiserror::Error;

/// The main error type for the connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Invocation Errors
    // ============================================================================
    #[error("Failed to get access token: {source}")]
    Credential {
        #[source]
        source: Box<Error>,
    },

    #[error("Failed to fetch {resource} data: {source}")]
    Fetch {
        resource: ResourceType,
        #[source]
        source: Box<Error>,
    },

    #[error("Malformed state: {message}")]
    MalformedState { message: String },

    #[error("Malformed request: {message}")]
    MalformedRequest { message: String },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // HTTP Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Failed to serialize output: {0}")]
    Serialize(#[source] serde_json::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap an error raised during the token exchange
    pub fn credential(source: Error) -> Self {
        Self::Credential {
            source: Box::new(source),
        }
    }

    /// Wrap an error raised while fetching a resource page
    pub fn fetch(resource: ResourceType, source: Error) -> Self {
        Self::Fetch {
            resource,
            source: Box::new(source),
        }
    }

    /// Create a malformed state error
    pub fn malformed_state(message: impl Into<String>) -> Self {
        Self::MalformedState {
            message: message.into(),
        }
    }

    /// Create a malformed request error
    pub fn malformed_request(message: impl Into<String>) -> Self {
        Self::MalformedRequest {
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Error kind tag reported to Fivetran as `errorType`
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::Credential { .. } => "CredentialError",
            Error::Fetch { .. } => "FetchError",
            Error::MalformedState { .. } => "MalformedStateError",
            Error::MalformedRequest { .. } | Error::MissingField { .. } => "MalformedRequestError",
            Error::Config { .. } | Error::YamlParse(_) | Error::InvalidUrl(_) => "ConfigError",
            Error::Http(_) => "HttpError",
            Error::HttpStatus { .. } => "HttpStatusError",
            Error::Timeout { .. } => "TimeoutError",
            Error::Decode { .. } => "DecodeError",
            Error::Serialize(_) => "SerializeError",
            Error::Io(_) => "IoError",
        }
    }

    /// Resource type the error is tagged with, if any
    pub fn resource(&self) -> Option<ResourceType> {
        match self {
            Error::Fetch { resource, .. } => Some(*resource),
            _ => None,
        }
    }

    /// Render the error and its causes, one per line.
    ///
    /// Used as the diagnostic trace in error responses. Each line carries
    /// only its own context; a cause already quoted at the end of its
    /// parent's message is shown once, on its own line.
    pub fn chain(&self) -> String {
        let mut lines = Vec::new();
        let mut current: Option<&(dyn StdError + 'static)> = Some(self);
        while let Some(err) = current {
            let text = err.to_string();
            let cause = err.source();
            let own = cause
                .and_then(|c| text.strip_suffix(&format!(": {c}")).map(str::to_string))
                .unwrap_or(text);
            if lines.is_empty() {
                lines.push(format!("{}: {own}", self.error_type()));
            } else {
                lines.push(format!("  caused by: {own}"));
            }
            current = cause;
        }
        lines.join("\n")
    }
}

/// Result type alias for the connector
pub type Result<T> = std::result::Result<T, Error>;
