//! Configuration file management
//!
//! CLIConfiguration with TOML parsing for ~/.streamsql/config.toml
//!
//! # Configuration Format
//!
//! ```toml
//! [gateway]
//! url = "https://gateway.example.com"  # Statement gateway base URL
//! organization_id = "org-123"
//! environment_id = "env-abc"
//! compute_pool_id = "pool-1"           # Optional, gateway default when unset
//! timeout = 30                         # Request timeout in seconds
//! max_retries = 3
//!
//! [auth]
//! api_key = "KEY"
//! api_secret = "SECRET"
//! # token = "bearer-token"            # Alternative to the key pair
//!
//! [ui]
//! format = "table"           # table, json, csv
//! color = true
//! history_size = 1000
//!
//! [results]
//! max_capacity = 1000                  # Rows kept per statement (changelog and table)
//! default_view = "table"               # table or changelog
//! poll_interval_ms = 500               # Statement status polling
//! statement_ready_timeout_secs = 60
//! batch_max_pages = 10                 # Pages fetched per statement with -c / -f
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use streamsql_link::LinkTimeouts;

use crate::error::{CLIError, Result};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "~/.streamsql/config.toml";

/// CLI configuration loaded from TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CLIConfiguration {
    /// Gateway connection settings
    pub gateway: Option<GatewayConfig>,

    /// Authentication settings
    pub auth: Option<AuthConfig>,

    /// UI preferences
    pub ui: Option<UIConfig>,

    /// Result materialization settings
    pub results: Option<ResultsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Gateway URL (e.g., https://gateway.example.com)
    pub url: Option<String>,

    pub organization_id: Option<String>,

    pub environment_id: Option<String>,

    pub compute_pool_id: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Maximum retry attempts
    #[serde(default = "default_retries")]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    pub api_key: Option<String>,

    pub api_secret: Option<String>,

    /// Bearer token, used when no key pair is configured
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UIConfig {
    /// Output format: table, json, csv
    #[serde(default = "default_format")]
    pub format: String,

    /// Enable colored output
    #[serde(default = "default_color")]
    pub color: bool,

    /// Maximum history size
    #[serde(default = "default_history_size")]
    pub history_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsConfig {
    /// Bound on retained changelog entries (and so on table rows)
    #[serde(default = "default_max_capacity")]
    pub max_capacity: usize,

    /// View shown first: "table" or "changelog"
    #[serde(default = "default_view")]
    pub default_view: String,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    #[serde(default = "default_statement_ready_timeout_secs")]
    pub statement_ready_timeout_secs: u64,

    /// Upper bound of pages fetched per statement in non-interactive mode
    #[serde(default = "default_batch_max_pages")]
    pub batch_max_pages: usize,
}

fn default_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

fn default_format() -> String {
    "table".to_string()
}

fn default_color() -> bool {
    true
}

fn default_history_size() -> usize {
    1000
}

fn default_max_capacity() -> usize {
    1000
}

fn default_view() -> String {
    "table".to_string()
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_statement_ready_timeout_secs() -> u64 {
    60
}

fn default_batch_max_pages() -> usize {
    10
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: None,
            organization_id: None,
            environment_id: None,
            compute_pool_id: None,
            timeout: default_timeout(),
            max_retries: default_retries(),
        }
    }
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            color: default_color(),
            history_size: default_history_size(),
        }
    }
}

impl Default for ResultsConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            default_view: default_view(),
            poll_interval_ms: default_poll_interval_ms(),
            statement_ready_timeout_secs: default_statement_ready_timeout_secs(),
            batch_max_pages: default_batch_max_pages(),
        }
    }
}

impl Default for CLIConfiguration {
    fn default() -> Self {
        Self {
            gateway: Some(GatewayConfig::default()),
            auth: None,
            ui: Some(UIConfig::default()),
            results: Some(ResultsConfig::default()),
        }
    }
}

pub fn expand_config_path(path: &Path) -> PathBuf {
    let path_str = path.to_str().unwrap_or(DEFAULT_CONFIG_PATH);
    if let Some(rest) = path_str.strip_prefix("~/") {
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(rest);
        }
    }
    path.to_path_buf()
}

pub fn default_config_path() -> PathBuf {
    expand_config_path(Path::new(DEFAULT_CONFIG_PATH))
}

impl CLIConfiguration {
    /// Load configuration from file
    ///
    /// Returns default configuration if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        let expanded_path = expand_config_path(path);
        let path = &expanded_path;

        if !path.exists() {
            log::debug!("[CONFIG] {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            CLIError::ConfigurationError(format!("Failed to read config file: {}", e))
        })?;

        let config: CLIConfiguration = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let expanded_path = expand_config_path(path);
        let path = &expanded_path;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| CLIError::ConfigurationError(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// TOML rendering for `\config`, with credentials masked.
    pub fn to_display_string(&self) -> Result<String> {
        let mut redacted = self.clone();
        if let Some(auth) = redacted.auth.as_mut() {
            for secret in [&mut auth.api_secret, &mut auth.token] {
                if secret.is_some() {
                    *secret = Some("********".to_string());
                }
            }
        }
        toml::to_string_pretty(&redacted)
            .map_err(|e| CLIError::ConfigurationError(format!("Failed to serialize: {}", e)))
    }

    pub fn resolved_gateway(&self) -> GatewayConfig {
        self.gateway.clone().unwrap_or_default()
    }

    pub fn resolved_auth(&self) -> AuthConfig {
        self.auth.clone().unwrap_or_default()
    }

    pub fn resolved_ui(&self) -> UIConfig {
        self.ui.clone().unwrap_or_default()
    }

    pub fn resolved_results(&self) -> ResultsConfig {
        self.results.clone().unwrap_or_default()
    }

    /// Gateway timeouts derived from the `[gateway]` and `[results]` sections.
    pub fn to_timeouts(&self) -> LinkTimeouts {
        let gateway = self.resolved_gateway();
        let results = self.resolved_results();
        LinkTimeouts::builder()
            .receive_timeout_secs(gateway.timeout)
            .statement_ready_timeout_secs(results.statement_ready_timeout_secs)
            .poll_interval_ms(results.poll_interval_ms)
            .build()
    }
}

impl ResultsConfig {
    /// Whether the results view opens in table mode.
    pub fn starts_in_table_mode(&self) -> bool {
        !self.default_view.eq_ignore_ascii_case("changelog")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = CLIConfiguration::default();
        assert!(config.gateway.is_some());
        assert!(config.auth.is_none());

        let results = config.resolved_results();
        assert_eq!(results.max_capacity, 1000);
        assert_eq!(results.default_view, "table");
        assert_eq!(results.batch_max_pages, 10);
        assert!(results.starts_in_table_mode());
    }

    #[test]
    fn test_config_serialization() {
        let config = CLIConfiguration::default();
        let toml = toml::to_string(&config).unwrap();
        assert!(toml.contains("[gateway]"));
        assert!(toml.contains("[results]"));
        assert!(toml.contains("max_capacity"));
    }

    #[test]
    fn test_partial_sections_use_defaults() {
        let config: CLIConfiguration = toml::from_str(
            r#"
            [gateway]
            url = "https://gw.example.com"

            [results]
            max_capacity = 50
            default_view = "changelog"
            "#,
        )
        .unwrap();

        let gateway = config.resolved_gateway();
        assert_eq!(gateway.url.as_deref(), Some("https://gw.example.com"));
        assert_eq!(gateway.timeout, 30);

        let results = config.resolved_results();
        assert_eq!(results.max_capacity, 50);
        assert_eq!(results.poll_interval_ms, 500);
        assert!(!results.starts_in_table_mode());

        // Missing sections resolve to defaults
        assert_eq!(config.resolved_ui().format, "table");
    }

    #[test]
    fn test_to_timeouts() {
        let mut config = CLIConfiguration::default();
        config.results.as_mut().unwrap().poll_interval_ms = 250;
        config.results.as_mut().unwrap().statement_ready_timeout_secs = 5;

        let timeouts = config.to_timeouts();
        assert_eq!(timeouts.poll_interval, Duration::from_millis(250));
        assert_eq!(timeouts.statement_ready_timeout, Duration::from_secs(5));
        assert_eq!(timeouts.receive_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = CLIConfiguration::default();
        config.gateway.as_mut().unwrap().organization_id = Some("org-1".into());
        config.save(&path).unwrap();

        let loaded = CLIConfiguration::load(&path).unwrap();
        assert_eq!(
            loaded.resolved_gateway().organization_id.as_deref(),
            Some("org-1")
        );
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = CLIConfiguration::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.resolved_results().max_capacity, 1000);
    }

    #[test]
    fn test_invalid_toml_is_configuration_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[results\nmax_capacity = ").unwrap();
        assert!(matches!(
            CLIConfiguration::load(&path),
            Err(CLIError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_display_masks_secrets() {
        let mut config = CLIConfiguration::default();
        config.auth = Some(AuthConfig {
            api_key: Some("KEY".into()),
            api_secret: Some("hunter2".into()),
            token: None,
        });
        let shown = config.to_display_string().unwrap();
        assert!(shown.contains("KEY"));
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("********"));
    }
}
