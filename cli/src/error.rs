//! Error types for streamsql-cli
//!
//! Provides user-friendly error messages for terminal failures and keeps
//! gateway authorization failures distinguishable, since they end the session.

use std::fmt;
use streamsql_link::{ConversionError, LinkError};

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CLIError>;

/// Errors that can occur in the CLI
#[derive(Debug)]
pub enum CLIError {
    /// Error from the gateway client
    LinkError(LinkError),

    /// Credentials rejected by the gateway; fatal for the session
    Unauthorized(String),

    /// A results page did not match the statement schema
    ConversionError(ConversionError),

    /// Configuration file error
    ConfigurationError(String),

    /// File I/O error
    FileError(String),

    /// Invalid command syntax
    ParseError(String),

    /// User cancelled operation
    Cancelled,

    /// Readline error
    ReadlineError(String),

    /// History file error
    HistoryError(String),

    /// Format error
    FormatError(String),
}

impl CLIError {
    /// True when the session has to end instead of reporting and continuing.
    pub fn is_fatal(&self) -> bool {
        match self {
            CLIError::Unauthorized(_) => true,
            CLIError::LinkError(err) => err.is_unauthorized(),
            _ => false,
        }
    }

    fn format_link_error(err: &LinkError) -> String {
        match err {
            LinkError::Network(msg) => Self::clean_nested_message(msg),
            LinkError::Unauthorized(msg) => format!("Unauthorized: {}", msg),
            LinkError::Configuration(msg) => msg.clone(),
            LinkError::Timeout(msg) => format!("Timed out: {}", msg),
            LinkError::Serialization(msg) => format!("Unexpected response: {}", msg),
            LinkError::Server {
                status_code,
                message,
            } => format!("Server error ({}): {}", status_code, message),
            LinkError::StatementFailed { detail, .. } => detail.clone(),
        }
    }

    fn clean_nested_message(message: &str) -> String {
        let mut cleaned = message.trim();
        let prefixes = [
            "Network error:",
            "network error:",
            "error sending request:",
        ];

        loop {
            let mut stripped = false;
            for prefix in &prefixes {
                if let Some(rest) = cleaned.strip_prefix(prefix) {
                    cleaned = rest.trim_start();
                    stripped = true;
                    break;
                }
            }

            if !stripped {
                break;
            }
        }

        cleaned.to_string()
    }
}

impl fmt::Display for CLIError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CLIError::LinkError(e) => write!(f, "{}", Self::format_link_error(e)),
            CLIError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            CLIError::ConversionError(e) => write!(f, "Invalid results page: {}", e),
            CLIError::ConfigurationError(msg) => write!(f, "Configuration error: {}", msg),
            CLIError::FileError(msg) => write!(f, "File error: {}", msg),
            CLIError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            CLIError::Cancelled => write!(f, "Operation cancelled"),
            CLIError::ReadlineError(msg) => write!(f, "Input error: {}", msg),
            CLIError::HistoryError(msg) => write!(f, "History error: {}", msg),
            CLIError::FormatError(msg) => write!(f, "Format error: {}", msg),
        }
    }
}

impl std::error::Error for CLIError {}

impl From<LinkError> for CLIError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::Unauthorized(msg) => CLIError::Unauthorized(msg),
            LinkError::Server {
                status_code: 401,
                message,
            } => CLIError::Unauthorized(message),
            other => CLIError::LinkError(other),
        }
    }
}

impl From<ConversionError> for CLIError {
    fn from(err: ConversionError) -> Self {
        CLIError::ConversionError(err)
    }
}

impl From<rustyline::error::ReadlineError> for CLIError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        match err {
            rustyline::error::ReadlineError::Interrupted => CLIError::Cancelled,
            rustyline::error::ReadlineError::Eof => CLIError::Cancelled,
            e => CLIError::ReadlineError(e.to_string()),
        }
    }
}

impl From<std::io::Error> for CLIError {
    fn from(err: std::io::Error) -> Self {
        CLIError::FileError(err.to_string())
    }
}

impl From<toml::de::Error> for CLIError {
    fn from(err: toml::de::Error) -> Self {
        CLIError::ConfigurationError(format!("TOML parse error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CLIError::ParseError("Invalid SQL".into());
        assert_eq!(err.to_string(), "Parse error: Invalid SQL");

        let err = CLIError::Cancelled;
        assert_eq!(err.to_string(), "Operation cancelled");
    }

    #[test]
    fn test_unauthorized_link_errors_become_fatal() {
        let err: CLIError = LinkError::Unauthorized("token expired".into()).into();
        assert!(matches!(err, CLIError::Unauthorized(_)));
        assert!(err.is_fatal());

        let err: CLIError = LinkError::from_status(401, "bad key".into()).into();
        assert!(err.is_fatal());

        let err: CLIError = LinkError::Server {
            status_code: 500,
            message: "oops".into(),
        }
        .into();
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "Server error (500): oops");
    }

    #[test]
    fn test_statement_failure_shows_detail() {
        let err: CLIError = LinkError::StatementFailed {
            name: "cli-1".into(),
            detail: "Object 'orders' not found".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Object 'orders' not found");
    }

    #[test]
    fn test_network_message_cleanup() {
        let err = CLIError::LinkError(LinkError::Network(
            "Network error: error sending request: connection refused".into(),
        ));
        assert_eq!(err.to_string(), "connection refused");
    }
}
