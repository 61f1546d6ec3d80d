//! Library entry point for streamsql-cli components.
//!
//! Exposes the result store, session and formatting modules so integration
//! tests can drive them without going through the binary entry point.

pub mod config;
pub mod error;
pub mod formatter;
pub mod history;
pub mod parser;
pub mod results_view;
pub mod session;
pub mod store;

pub use config::CLIConfiguration;
pub use error::{CLIError, Result};
pub use formatter::{OutputFormat, OutputFormatter};
pub use parser::{Command, CommandParser, ViewMode};
pub use session::{CLISession, CommandOutcome, SessionOptions, Surface};
pub use store::MaterializedResultStore;

/// CLI version reported by the banner and `\status`
pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
