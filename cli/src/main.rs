//! streamsql - terminal client for a streaming SQL gateway
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode
//! streamsql --url https://gateway.example.com --org org-1 --env env-1
//!
//! # Execute SQL file
//! streamsql --file queries.sql
//!
//! # CSV output of a single statement
//! streamsql --csv -c "SELECT * FROM orders"
//! ```

use clap::Parser;

use streamsql_cli::{CLIConfiguration, CLIError, Result};

mod args;
mod connect;

use args::Cli;
use connect::{apply_overrides, create_session};

/// Exit code when the gateway rejected the credentials
const EXIT_UNAUTHORIZED: i32 = 2;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = CLIConfiguration::load(&cli.config)?;
    apply_overrides(&cli, &mut config);

    let mut session = create_session(&cli, &config)?;

    match (&cli.file, &cli.command) {
        (Some(file), None) => {
            let sql = std::fs::read_to_string(file).map_err(|e| {
                CLIError::FileError(format!("Failed to read {}: {}", file.display(), e))
            })?;
            session.execute_batch(&sql).await
        },
        (None, Some(command)) => session.execute_batch(command).await,
        (None, None) => session.run_interactive().await,
        (Some(_), Some(_)) => Err(CLIError::ConfigurationError(
            "Cannot specify both --file and --command".into(),
        )),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Err(e) = run(cli).await {
        eprintln!("✗ {}", e);
        let code = if e.is_fatal() { EXIT_UNAUTHORIZED } else { 1 };
        std::process::exit(code);
    }
}
