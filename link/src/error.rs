//! Error types for streamsql-link.
//!
//! Gateway failures are split so callers can tell an expired or rejected
//! credential (fatal for an interactive session) from everything else.

use thiserror::Error;

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, LinkError>;

/// Errors returned by the statement gateway client
#[derive(Error, Debug)]
pub enum LinkError {
    /// Connection could not be established or was reset
    #[error("Network error: {0}")]
    Network(String),

    /// Credentials were missing, expired or rejected (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Client was configured incorrectly
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Request or statement wait exceeded its deadline
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Gateway answered with a non-success status
    #[error("Server error ({status_code}): {message}")]
    Server { status_code: u16, message: String },

    /// Response body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Statement reached the FAILED phase
    #[error("Statement '{name}' failed: {detail}")]
    StatementFailed { name: String, detail: String },
}

impl LinkError {
    /// True when the session must end instead of reporting and continuing.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            LinkError::Unauthorized(_) => true,
            LinkError::Server { status_code, .. } => *status_code == 401,
            _ => false,
        }
    }

    /// Build the error for an HTTP status, mapping 401 to [`LinkError::Unauthorized`].
    pub fn from_status(status_code: u16, message: String) -> Self {
        if status_code == 401 {
            LinkError::Unauthorized(message)
        } else {
            LinkError::Server {
                status_code,
                message,
            }
        }
    }
}

impl From<reqwest::Error> for LinkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LinkError::Timeout(err.to_string())
        } else if err.is_decode() {
            LinkError::Serialization(err.to_string())
        } else if let Some(status) = err.status() {
            LinkError::from_status(status.as_u16(), err.to_string())
        } else {
            LinkError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for LinkError {
    fn from(err: serde_json::Error) -> Self {
        LinkError::Serialization(err.to_string())
    }
}
