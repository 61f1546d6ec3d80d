use crate::args::{Cli, ViewArg};
use std::sync::Arc;
use streamsql_cli::config::AuthConfig;
use streamsql_cli::history::CommandHistory;
use streamsql_cli::session::FetcherSettings;
use streamsql_cli::{CLIConfiguration, CLIError, CLISession, OutputFormat, Result, SessionOptions};
use streamsql_link::{AuthProvider, GatewayClient, LinkTimeouts};

/// Fold command-line overrides into the loaded configuration.
pub fn apply_overrides(cli: &Cli, config: &mut CLIConfiguration) {
    let gateway = config.gateway.get_or_insert_with(Default::default);
    if let Some(url) = &cli.url {
        gateway.url = Some(url.clone());
    }
    if let Some(org) = &cli.organization_id {
        gateway.organization_id = Some(org.clone());
    }
    if let Some(env) = &cli.environment_id {
        gateway.environment_id = Some(env.clone());
    }
    if let Some(pool) = &cli.compute_pool_id {
        gateway.compute_pool_id = Some(pool.clone());
    }
    if let Some(timeout) = cli.timeout {
        gateway.timeout = timeout;
    }

    if cli.api_key.is_some() || cli.api_secret.is_some() || cli.token.is_some() {
        let auth = config.auth.get_or_insert_with(AuthConfig::default);
        if cli.api_key.is_some() {
            auth.api_key = cli.api_key.clone();
        }
        if cli.api_secret.is_some() {
            auth.api_secret = cli.api_secret.clone();
        }
        if cli.token.is_some() {
            auth.token = cli.token.clone();
        }
    }

    let ui = config.ui.get_or_insert_with(Default::default);
    if let Some(format) = cli.output_format() {
        ui.format = format.as_str().to_string();
    }
    if cli.no_color {
        ui.color = false;
    }

    let results = config.results.get_or_insert_with(Default::default);
    if let Some(capacity) = cli.max_capacity {
        results.max_capacity = capacity;
    }
    if let Some(view) = cli.view {
        results.default_view = match view {
            ViewArg::Table => "table",
            ViewArg::Changelog => "changelog",
        }
        .to_string();
    }
    if let Some(pages) = cli.max_pages {
        results.batch_max_pages = pages;
    }
}

/// Authentication from the resolved config: key pair first, then token.
fn build_auth(auth: &AuthConfig) -> Result<AuthProvider> {
    match (&auth.api_key, &auth.api_secret, &auth.token) {
        (Some(key), Some(secret), _) => Ok(AuthProvider::api_key(key.clone(), secret.clone())),
        (Some(_), None, _) => Err(CLIError::ConfigurationError(
            "--api-key requires --api-secret".into(),
        )),
        (None, _, Some(token)) => Ok(AuthProvider::bearer_token(token.clone())),
        _ => Ok(AuthProvider::none()),
    }
}

fn build_timeouts(cli: &Cli, config: &CLIConfiguration) -> LinkTimeouts {
    if cli.fast_timeouts {
        return LinkTimeouts::fast();
    }
    if cli.relaxed_timeouts {
        return LinkTimeouts::relaxed();
    }
    config.to_timeouts()
}

pub fn create_session(cli: &Cli, config: &CLIConfiguration) -> Result<CLISession> {
    let gateway = config.resolved_gateway();
    let ui = config.resolved_ui();
    let results = config.resolved_results();
    let timeouts = build_timeouts(cli, config);

    let url = gateway.url.clone().ok_or_else(|| {
        CLIError::ConfigurationError(
            "No gateway URL; pass --url or set [gateway] url in the config file".into(),
        )
    })?;

    let mut builder = GatewayClient::builder()
        .base_url(url.clone())
        .compute_pool_id(gateway.compute_pool_id.clone())
        .auth(build_auth(&config.resolved_auth())?)
        .max_retries(gateway.max_retries)
        .timeouts(timeouts.clone());
    if let Some(org) = &gateway.organization_id {
        builder = builder.organization_id(org.clone());
    }
    if let Some(env) = &gateway.environment_id {
        builder = builder.environment_id(env.clone());
    }
    let client = builder.build()?;

    if !client.is_authenticated() {
        log::warn!("[CONNECT] No credentials configured for {}", url);
    }

    let format = OutputFormat::parse(&ui.format).ok_or_else(|| {
        CLIError::ConfigurationError(format!("Unknown output format '{}'", ui.format))
    })?;

    let options = SessionOptions {
        gateway_url: client.base_url().to_string(),
        format,
        color: ui.color,
        spinner: !cli.no_spinner,
        fetcher: FetcherSettings {
            max_capacity: results.max_capacity,
            table_mode: results.starts_in_table_mode(),
            timeouts,
        },
        batch_max_pages: results.batch_max_pages,
        history: CommandHistory::new(ui.history_size),
        config_display: config.to_display_string()?,
    };

    Ok(CLISession::new(Arc::new(client), options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "streamsql",
            "--url",
            "https://gw.example.com",
            "--max-capacity",
            "25",
            "--view",
            "changelog",
            "--json",
        ])
        .unwrap();
        let mut config = CLIConfiguration::default();
        config.gateway.as_mut().unwrap().url = Some("https://old".into());

        apply_overrides(&cli, &mut config);

        assert_eq!(
            config.resolved_gateway().url.as_deref(),
            Some("https://gw.example.com")
        );
        assert_eq!(config.resolved_results().max_capacity, 25);
        assert!(!config.resolved_results().starts_in_table_mode());
        assert_eq!(config.resolved_ui().format, "json");
    }

    #[test]
    fn test_auth_selection() {
        let key_pair = AuthConfig {
            api_key: Some("k".into()),
            api_secret: Some("s".into()),
            token: Some("t".into()),
        };
        assert!(matches!(build_auth(&key_pair), Ok(AuthProvider::ApiKey(_, _))));

        let token = AuthConfig {
            token: Some("t".into()),
            ..AuthConfig::default()
        };
        assert!(matches!(build_auth(&token), Ok(AuthProvider::BearerToken(_))));

        let half = AuthConfig {
            api_key: Some("k".into()),
            ..AuthConfig::default()
        };
        assert!(build_auth(&half).is_err());

        assert!(matches!(
            build_auth(&AuthConfig::default()),
            Ok(AuthProvider::None)
        ));
    }

    #[test]
    fn test_missing_url_is_configuration_error() {
        let cli = Cli::try_parse_from(["streamsql"]).unwrap();
        let config = CLIConfiguration::default();
        assert!(matches!(
            create_session(&cli, &config),
            Err(CLIError::ConfigurationError(_))
        ));
    }
}
