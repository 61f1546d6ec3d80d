use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use streamsql_cli::OutputFormat;

// Macro to create the version string at compile time
macro_rules! version_string {
    () => {
        concat!(
            env!("CARGO_PKG_VERSION"),
            "\nCommit: ",
            env!("GIT_COMMIT_HASH"),
            " (",
            env!("GIT_BRANCH"),
            ")\nBuilt: ",
            env!("BUILD_DATE")
        )
    };
}

/// Results view shown first
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ViewArg {
    Table,
    Changelog,
}

/// streamsql - terminal client for a streaming SQL gateway
#[derive(Parser, Debug)]
#[command(name = "streamsql")]
#[command(version = version_string!())]
#[command(about = "Interactive terminal for streaming SQL statements", long_about = None)]
pub struct Cli {
    /// Gateway URL (e.g., https://gateway.example.com)
    #[arg(short = 'u', long = "url")]
    pub url: Option<String>,

    /// Organization that owns the statements
    #[arg(long = "org")]
    pub organization_id: Option<String>,

    /// Environment the statements run in
    #[arg(long = "env")]
    pub environment_id: Option<String>,

    /// Compute pool for new statements
    #[arg(long = "compute-pool")]
    pub compute_pool_id: Option<String>,

    /// API key (used together with --api-secret)
    #[arg(long = "api-key", env = "STREAMSQL_API_KEY")]
    pub api_key: Option<String>,

    /// API secret
    #[arg(long = "api-secret", env = "STREAMSQL_API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    /// Bearer token, used when no API key is given
    #[arg(long = "token", env = "STREAMSQL_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Execute SQL from file and exit
    #[arg(short = 'f', long = "file", conflicts_with = "command")]
    pub file: Option<PathBuf>,

    /// Execute SQL command and exit
    #[arg(short = 'c', long = "command")]
    pub command: Option<String>,

    /// Output format for -c / -f
    #[arg(long = "format")]
    pub format: Option<OutputFormat>,

    /// Enable JSON output (shorthand for --format=json)
    #[arg(long = "json", conflicts_with_all = ["format", "csv"])]
    pub json: bool,

    /// Enable CSV output (shorthand for --format=csv)
    #[arg(long = "csv", conflicts_with = "format")]
    pub csv: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Disable spinners/animations
    #[arg(long = "no-spinner")]
    pub no_spinner: bool,

    /// Configuration file path
    #[arg(long = "config", default_value = "~/.streamsql/config.toml")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// HTTP request timeout in seconds
    #[arg(long = "timeout", value_name = "SECONDS")]
    pub timeout: Option<u64>,

    /// Rows kept per statement (changelog entries and table rows)
    #[arg(long = "max-capacity", value_name = "ROWS")]
    pub max_capacity: Option<usize>,

    /// View shown first
    #[arg(long = "view", value_enum)]
    pub view: Option<ViewArg>,

    /// Pages fetched per statement with -c / -f
    #[arg(long = "max-pages", value_name = "PAGES")]
    pub max_pages: Option<usize>,

    /// Use fast timeout preset (gateway on localhost)
    #[arg(long = "fast-timeouts", conflicts_with = "relaxed_timeouts")]
    pub fast_timeouts: bool,

    /// Use relaxed timeout preset (high-latency networks)
    #[arg(long = "relaxed-timeouts")]
    pub relaxed_timeouts: bool,
}

impl Cli {
    /// Output format from --format / --json / --csv, if any was given.
    pub fn output_format(&self) -> Option<OutputFormat> {
        if self.json {
            Some(OutputFormat::Json)
        } else if self.csv {
            Some(OutputFormat::Csv)
        } else {
            self.format
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_format_shorthands() {
        let cli = Cli::try_parse_from(["streamsql", "--csv", "-c", "SELECT 1"]).unwrap();
        assert_eq!(cli.output_format(), Some(OutputFormat::Csv));

        let cli = Cli::try_parse_from(["streamsql", "--format", "json"]).unwrap();
        assert_eq!(cli.output_format(), Some(OutputFormat::Json));

        let cli = Cli::try_parse_from(["streamsql"]).unwrap();
        assert_eq!(cli.output_format(), None);
    }

    #[test]
    fn test_file_and_command_conflict() {
        assert!(Cli::try_parse_from(["streamsql", "-f", "a.sql", "-c", "SELECT 1"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "streamsql",
            "--url",
            "https://gw",
            "--org",
            "o1",
            "--env",
            "e1",
            "--max-capacity",
            "5",
            "--view",
            "changelog",
        ])
        .unwrap();
        assert_eq!(cli.url.as_deref(), Some("https://gw"));
        assert_eq!(cli.max_capacity, Some(5));
        assert_eq!(cli.view, Some(ViewArg::Changelog));
    }
}
