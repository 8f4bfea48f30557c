//! Error types for pagewise
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for pagewise
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Settings are invalid or inconsistent
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A required setting is empty
    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    /// YAML settings could not be parsed
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON could not be parsed or produced
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Base URL is not a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Session / HTTP Errors
    // ============================================================================
    /// A request was made without an open session
    #[error("Client is not connected")]
    NotConnected,

    /// Transport failure: connect, timeout, reset
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Response body is not JSON
    #[error("Invalid JSON response: {message}")]
    InvalidResponsePayload { message: String },

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    /// A continuation strategy failed
    #[error("Pagination error: {message}")]
    Pagination { message: String },

    // ============================================================================
    // Storage Errors
    // ============================================================================
    /// Database failure in a storage sink
    #[error("Storage error: {message}")]
    Storage { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    /// File or stream I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    /// Any other failure, usually carrying context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
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

    /// Create an invalid payload error
    pub fn invalid_payload(message: impl Into<String>) -> Self {
        Self::InvalidResponsePayload {
            message: message.into(),
        }
    }

    /// Create a pagination protocol error
    pub fn pagination(message: impl Into<String>) -> Self {
        Self::Pagination {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Check if this error belongs to the transient classification.
    ///
    /// Network failures, any non-2xx status and undecodable bodies are all
    /// transient. Everything else, `NotConnected` included, is not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::Network(_) | Error::HttpStatus { .. } | Error::InvalidResponsePayload { .. }
        )
    }

    /// Check if this is an HTTP 4xx status error
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::HttpStatus { status, .. } if (400..500).contains(status))
    }
}

impl From<duckdb::Error> for Error {
    fn from(err: duckdb::Error) -> Self {
        Self::storage(err.to_string())
    }
}

/// Result type alias for pagewise
pub type Result<T> = std::result::Result<T, Error>;

/// Say what was being attempted when an error happened
pub trait ResultExt<T> {
    /// Prefix the error with `what`, built only on failure
    fn with_context<F: FnOnce() -> String>(self, what: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F: FnOnce() -> String>(self, what: F) -> Result<T> {
        self.map_err(|e| Error::Other(format!("{}: {}", what(), e.into())))
    }
}
