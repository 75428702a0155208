//! Error types for the Morvo assistant engine.

use std::time::Duration;

/// Top-level error type for the assistant.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Chat service error: {0}")]
    Chat(#[from] ChatError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Persistence errors from the profile store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Journey not found for user {user_id}")]
    JourneyNotFound { user_id: String },

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the remote chat-completion service.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Chat request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Chat service rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Invalid response from chat service: {reason}")]
    InvalidResponse { reason: String },

    #[error("Chat service authentication failed")]
    AuthFailed,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from website analysis and strategy generation.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("Website analysis failed for {url}: {reason}")]
    WebsiteFailed { url: String, reason: String },

    #[error("Strategy generation failed: {reason}")]
    StrategyFailed { reason: String },

    #[error("Analysis timed out after {timeout:?}")]
    Timeout { timeout: Duration },
}

/// Result type alias for the assistant.
pub type Result<T> = std::result::Result<T, Error>;
