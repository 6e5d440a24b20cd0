//! Error types for the EmailBison node

use bison_types::UnsupportedOperation;
use thiserror::Error;

/// Main error type for all node operations
#[derive(Error, Debug)]
pub enum BisonError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Unsupported(#[from] UnsupportedOperation),

    #[error("EmailBison API error (status {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),
}

impl BisonError {
    pub fn validation(message: impl Into<String>) -> Self {
        BisonError::Validation(message.into())
    }

    /// Validation failures and unsupported operations are both input
    /// problems: fatal to the item and never worth retrying.
    pub fn is_validation(&self) -> bool {
        matches!(self, BisonError::Validation(_) | BisonError::Unsupported(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            BisonError::Upstream { status, .. } => Some(*status),
            BisonError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<::config::ConfigError> for BisonError {
    fn from(e: ::config::ConfigError) -> Self {
        BisonError::Config(e.to_string())
    }
}

/// Result type for node operations
pub type Result<T> = std::result::Result<T, BisonError>;
