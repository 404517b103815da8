//! Error types for the application.

use thiserror::Error;

use crate::store::{BillAction, BillStatus};

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {message}")]
    ParseError { message: String },

    #[error("Config validation failed: {message}")]
    ValidationError { message: String },
}

/// Errors from the ticket/bill lifecycle store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("A ticket is already open for channel {channel}")]
    DuplicateTicketChannel { channel: u64 },

    #[error("No active ticket for channel {channel}")]
    TicketNotFound { channel: u64 },

    #[error("No bill '{bill_id}' for user {owner}")]
    BillNotFound { owner: u64, bill_id: String },

    #[error("Cannot {action} a bill in state {from}")]
    InvalidTransition { from: BillStatus, action: BillAction },
}

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
