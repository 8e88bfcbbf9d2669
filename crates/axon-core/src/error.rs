//! Error types for the Axon core.

use thiserror::Error;

/// Result type alias for Axon operations
pub type AxonResult<T> = Result<T, AxonError>;

/// Errors raised by the store gateway, the responder, and the sync handler.
///
/// Only [`AxonError::Validation`] carries a message meant for the caller; every other
/// variant is logged server-side and replaced by a generic message at the HTTP boundary.
#[derive(Error, Debug)]
pub enum AxonError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Log error: {0}")]
    Log(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("Sync error: {0}")]
    Sync(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AxonError {
    /// True when the error stems from missing or malformed caller input (HTTP 400).
    pub fn is_validation(&self) -> bool {
        matches!(self, AxonError::Validation(_))
    }
}

impl From<rusqlite::Error> for AxonError {
    fn from(err: rusqlite::Error) -> Self {
        AxonError::Query(err.to_string())
    }
}

impl From<serde_json::Error> for AxonError {
    fn from(err: serde_json::Error) -> Self {
        AxonError::Query(format!("tag column: {}", err))
    }
}

impl From<config::ConfigError> for AxonError {
    fn from(err: config::ConfigError) -> Self {
        AxonError::Config(err.to_string())
    }
}

impl From<reqwest::Error> for AxonError {
    fn from(err: reqwest::Error) -> Self {
        AxonError::Completion(err.to_string())
    }
}
