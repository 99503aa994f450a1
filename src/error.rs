//! Error types for feedrelay.

/// Top-level error type for the bot.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Failed to open database: {0}")]
    Open(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Feed API errors.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Feed API returned status {0}")]
    Status(u16),

    #[error("Failed to parse feed response: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Spam rule loading errors.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Failed to parse rule file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Posting sink errors.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Sink {sink} delivery failed: {reason}")]
    Delivery { sink: String, reason: String },

    #[error("Sink {sink} returned status {code}")]
    Status { sink: String, code: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for the bot.
pub type Result<T> = std::result::Result<T, Error>;
