//! Statement gateway interface.
//!
//! The shell only needs statement lifecycle calls and paged result
//! retrieval. [`crate::GatewayClient`] implements them over HTTP; tests
//! substitute an in-memory implementation.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Statement, StatementResults};

/// Remote SQL execution gateway
///
/// Any call may fail with [`crate::LinkError::Unauthorized`]; callers are
/// expected to end the session on it rather than retry.
#[async_trait]
pub trait StatementGateway: Send + Sync {
    /// Submit a statement. Returns the gateway's view of it, usually PENDING.
    async fn create_statement(
        &self,
        sql: &str,
        properties: &HashMap<String, String>,
    ) -> Result<Statement>;

    async fn get_statement(&self, name: &str) -> Result<Statement>;

    /// Fetch one page of results; `None` requests the first page.
    async fn get_statement_results(
        &self,
        name: &str,
        page_token: Option<&str>,
    ) -> Result<StatementResults>;

    async fn delete_statement(&self, name: &str) -> Result<()>;
}

/// Generate a statement name unique to this process run.
///
/// Gateway names must be lowercase alphanumerics and dashes.
pub fn generate_statement_name(prefix: &str) -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    format!("{}-{:x}", prefix, nanos)
}
