//! HTTP client for the statement gateway with builder pattern.
//!
//! Implements [`StatementGateway`] against the REST endpoints
//! `/sql/v1/organizations/{org}/environments/{env}/statements[/{name}[/results]]`.

use crate::{
    auth::AuthProvider,
    error::{LinkError, Result},
    gateway::{generate_statement_name, StatementGateway},
    models::{CreateStatementRequest, ErrorResponse, Statement, StatementResults, StatementSpec},
    timeouts::LinkTimeouts,
};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::{collections::HashMap, time::Duration, time::Instant};

/// Statement gateway HTTP client.
///
/// Use [`GatewayClientBuilder`] to construct instances.
///
/// # Examples
///
/// ```rust,no_run
/// use std::collections::HashMap;
/// use streamsql_link::{GatewayClient, StatementGateway};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GatewayClient::builder()
///     .base_url("https://gateway.example.com")
///     .organization_id("org-1")
///     .environment_id("env-1")
///     .api_key("KEY", "SECRET")
///     .build()?;
///
/// let statement = client.create_statement("SELECT 1;", &HashMap::new()).await?;
/// println!("Submitted: {}", statement.name);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct GatewayClient {
    base_url: String,
    organization_id: String,
    environment_id: String,
    compute_pool_id: Option<String>,
    http_client: reqwest::Client,
    auth: AuthProvider,
    max_retries: u32,
    timeouts: LinkTimeouts,
}

impl GatewayClient {
    /// Create a new builder for configuring the client
    pub fn builder() -> GatewayClientBuilder {
        GatewayClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the configured timeouts
    pub fn timeouts(&self) -> &LinkTimeouts {
        &self.timeouts
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    fn statements_url(&self) -> String {
        format!(
            "{}/sql/v1/organizations/{}/environments/{}/statements",
            self.base_url, self.organization_id, self.environment_id
        )
    }

    fn statement_url(&self, name: &str) -> String {
        format!("{}/{}", self.statements_url(), name)
    }

    /// Send a request, retrying connect failures and timeouts.
    ///
    /// The request is rebuilt on every attempt since builders with bodies
    /// cannot be cloned.
    async fn send<F>(&self, label: &str, build: F) -> Result<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut retries = 0;
        let overall_start = Instant::now();

        loop {
            let request = self.auth.apply_to_request(build());
            let attempt_start = Instant::now();
            debug!(
                "[GATEWAY_HTTP] {} (attempt {}/{})",
                label,
                retries + 1,
                self.max_retries + 1
            );

            match request.send().await {
                Ok(response) => {
                    debug!(
                        "[GATEWAY_HTTP] Response received: status={} duration_ms={}",
                        response.status(),
                        attempt_start.elapsed().as_millis()
                    );
                    return Ok(response);
                },
                Err(e) if retries < self.max_retries && Self::is_retriable(&e) => {
                    warn!(
                        "[GATEWAY_HTTP] Retriable error (attempt {}/{}): {} duration_ms={}",
                        retries + 1,
                        self.max_retries + 1,
                        e,
                        attempt_start.elapsed().as_millis()
                    );
                    retries += 1;
                    tokio::time::sleep(Duration::from_millis(100 * retries as u64)).await;
                },
                Err(e) => {
                    warn!(
                        "[GATEWAY_HTTP] Fatal error: {} total_ms={}",
                        e,
                        overall_start.elapsed().as_millis()
                    );
                    return Err(e.into());
                },
            }
        }
    }

    /// Decode a success body or turn the status and error body into a [`LinkError`].
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        Err(Self::error_from(status, response).await)
    }

    async fn error_from(status: StatusCode, response: reqwest::Response) -> LinkError {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = ErrorResponse::message_from_body(&body);
        warn!(
            "[GATEWAY_HTTP] Server error: status={} message=\"{}\"",
            status, message
        );
        LinkError::from_status(status.as_u16(), message)
    }

    fn is_retriable(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }
}

#[async_trait]
impl StatementGateway for GatewayClient {
    async fn create_statement(
        &self,
        sql: &str,
        properties: &HashMap<String, String>,
    ) -> Result<Statement> {
        let request = CreateStatementRequest {
            name: generate_statement_name("cli"),
            organization_id: Some(self.organization_id.clone()),
            environment_id: Some(self.environment_id.clone()),
            spec: StatementSpec {
                statement: sql.to_string(),
                properties: properties.clone(),
                compute_pool_id: self.compute_pool_id.clone(),
            },
        };

        let preview: String = sql.chars().take(80).collect();
        debug!(
            "[GATEWAY_HTTP] Creating statement '{}': \"{}\" (len={})",
            request.name,
            preview.replace('\n', " "),
            sql.len()
        );

        let url = self.statements_url();
        let response = self
            .send("POST statements", || self.http_client.post(&url).json(&request))
            .await?;
        Self::decode(response).await
    }

    async fn get_statement(&self, name: &str) -> Result<Statement> {
        let url = self.statement_url(name);
        let response = self
            .send("GET statement", || self.http_client.get(&url))
            .await?;
        Self::decode(response).await
    }

    async fn get_statement_results(
        &self,
        name: &str,
        page_token: Option<&str>,
    ) -> Result<StatementResults> {
        let url = format!("{}/results", self.statement_url(name));
        let response = self
            .send("GET results", || {
                let request = self.http_client.get(&url);
                match page_token {
                    Some(token) => request.query(&[("page_token", token)]),
                    None => request,
                }
            })
            .await?;
        Self::decode(response).await
    }

    async fn delete_statement(&self, name: &str) -> Result<()> {
        let url = self.statement_url(name);
        let response = self
            .send("DELETE statement", || self.http_client.delete(&url))
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == StatusCode::NOT_FOUND {
            debug!("[GATEWAY_HTTP] Statement '{}' already gone", name);
            return Ok(());
        }
        Err(Self::error_from(status, response).await)
    }
}

/// Builder for configuring [`GatewayClient`] instances.
pub struct GatewayClientBuilder {
    base_url: Option<String>,
    organization_id: Option<String>,
    environment_id: Option<String>,
    compute_pool_id: Option<String>,
    auth: AuthProvider,
    max_retries: u32,
    timeouts: LinkTimeouts,
}

impl GatewayClientBuilder {
    fn new() -> Self {
        Self {
            base_url: None,
            organization_id: None,
            environment_id: None,
            compute_pool_id: None,
            auth: AuthProvider::none(),
            max_retries: 3,
            timeouts: LinkTimeouts::default(),
        }
    }

    /// Set the gateway base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn organization_id(mut self, id: impl Into<String>) -> Self {
        self.organization_id = Some(id.into());
        self
    }

    pub fn environment_id(mut self, id: impl Into<String>) -> Self {
        self.environment_id = Some(id.into());
        self
    }

    /// Compute pool the statements run on; the gateway default is used when unset
    pub fn compute_pool_id(mut self, id: Option<String>) -> Self {
        self.compute_pool_id = id;
        self
    }

    /// Set API key authentication
    pub fn api_key(mut self, key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.auth = AuthProvider::api_key(key.into(), secret.into());
        self
    }

    /// Set bearer token authentication
    pub fn bearer_token(mut self, token: impl Into<String>) -> Self {
        self.auth = AuthProvider::bearer_token(token.into());
        self
    }

    /// Set authentication provider directly
    pub fn auth(mut self, auth: AuthProvider) -> Self {
        self.auth = auth;
        self
    }

    /// Set maximum number of retries for connect failures and timeouts
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set timeout configuration for all operations
    pub fn timeouts(mut self, timeouts: LinkTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<GatewayClient> {
        let base_url = self
            .base_url
            .map(|url| url.trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| LinkError::Configuration("gateway url is required".into()))?;
        let organization_id = self
            .organization_id
            .ok_or_else(|| LinkError::Configuration("organization_id is required".into()))?;
        let environment_id = self
            .environment_id
            .ok_or_else(|| LinkError::Configuration("environment_id is required".into()))?;

        let http_client = reqwest::Client::builder()
            .timeout(self.timeouts.receive_timeout)
            .connect_timeout(self.timeouts.connection_timeout)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| LinkError::Configuration(e.to_string()))?;

        debug!(
            "[GATEWAY_HTTP] Client ready: url={} org={} env={}",
            base_url, organization_id, environment_id
        );

        Ok(GatewayClient {
            base_url,
            organization_id,
            environment_id,
            compute_pool_id: self.compute_pool_id,
            http_client,
            auth: self.auth,
            max_retries: self.max_retries,
            timeouts: self.timeouts,
        })
    }
}
