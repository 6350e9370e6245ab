//! Error handling for the settings synchronization engine
//!
//! Every failure that can reach an operation boundary is a [`SyncError`]:
//! - transport failures (no response, undecodable envelope)
//! - server failures (envelope code signals an error)
//! - configuration and registry errors raised at startup

pub mod types;

use thiserror::Error;
use tracing::{error, warn};

use crate::schema::GroupId;

/// Main error type with categorization by origin
#[derive(Error, Debug)]
pub enum SyncError {
    // Network errors
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Server rejected request (code {code}): {message}")]
    Server { code: i64, message: String },

    // Programming / wiring errors
    #[error("Unknown settings group: {0}")]
    UnknownGroup(GroupId),

    #[error("Field '{key}' is not a directory field")]
    NotADirectoryField { key: String },

    #[error("At least one settings group must be requested")]
    EmptyGroupSet,

    // Configuration errors
    #[error("Configuration validation failed: {message}")]
    Config { message: String, field: Option<String> },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String, line: Option<usize> },

    // Local errors
    #[error("IO operation failed: {operation} - {message}")]
    Io { operation: String, message: String },
}

impl SyncError {
    /// Create a new configuration validation error
    pub fn config(message: impl Into<String>, field: Option<impl Into<String>>) -> Self {
        Self::Config {
            message: message.into(),
            field: field.map(Into::into),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn server(code: i64, message: impl Into<String>) -> Self {
        Self::Server {
            code,
            message: message.into(),
        }
    }

    /// True when the request never produced a usable response
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server { .. })
    }

    /// Text shown to the operator through the notifier.
    ///
    /// Server messages are surfaced verbatim; transport failures get a generic
    /// message since their detail is rarely actionable for the operator.
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { message, .. } => message.clone(),
            Self::Transport { .. } => "Network error, please try again later".to_string(),
            other => other.to_string(),
        }
    }

    /// Log the error with a level matching its origin
    pub fn log(&self, operation: &str) {
        match self {
            Self::Transport { .. } | Self::Io { .. } => {
                error!(error = %self, operation, "Settings operation failed");
            }
            _ => {
                warn!(error = %self, operation, "Settings operation rejected");
            }
        }
    }
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, SyncError>;
