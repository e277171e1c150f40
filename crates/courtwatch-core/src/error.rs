//! Unified error types for CourtWatch.

use thiserror::Error;

/// Result type alias using CourtWatchError.
pub type Result<T> = std::result::Result<T, CourtWatchError>;

#[derive(Error, Debug)]
pub enum CourtWatchError {
    // Booking API errors
    #[error("API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(String),

    // Notification channel errors
    #[error("Channel error: {0}")]
    Channel(String),

    // Observation store errors
    #[error("State error: {0}")]
    State(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file not found: {0}")]
    ConfigNotFound(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    // General errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl CourtWatchError {
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Self::State(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
