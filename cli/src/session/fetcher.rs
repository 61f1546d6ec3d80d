//! Statement result fetching
//!
//! A [`ResultFetcher`] owns everything that belongs to one submitted
//! statement: the gateway's view of it, the converter built from its schema,
//! the paging cursor and the materialized store. Pages are only requested
//! when the session asks for one, and rows are appended in arrival order.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};
use streamsql_link::{
    LinkError, LinkTimeouts, ResultSetConverter, Statement, StatementGateway, StatementPhase,
};

use super::watcher::{wait_until_ready, StatementWatcher};
use crate::error::Result;
use crate::store::MaterializedResultStore;

/// Store and polling settings for new statements
#[derive(Debug, Clone)]
pub struct FetcherSettings {
    pub max_capacity: usize,
    pub table_mode: bool,
    pub timeouts: LinkTimeouts,
}

impl Default for FetcherSettings {
    fn default() -> Self {
        Self {
            max_capacity: 1000,
            table_mode: true,
            timeouts: LinkTimeouts::default(),
        }
    }
}

/// Result of one page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOutcome {
    pub rows_appended: usize,
    pub has_more: bool,
}

/// State of one running statement
pub struct ResultFetcher {
    gateway: Arc<dyn StatementGateway>,
    statement: Statement,
    converter: ResultSetConverter,
    store: MaterializedResultStore,
    next_page_token: Option<String>,
    pages_fetched: usize,
    exhausted: bool,
    deleted: bool,
}

impl ResultFetcher {
    /// Submit `sql`, wait for the gateway to schedule it and fetch the first
    /// page of results.
    ///
    /// A statement that ends up FAILED is reported with the gateway's detail
    /// message. When anything after the create call fails, the statement is
    /// deleted again on a best-effort basis.
    pub async fn start(
        gateway: Arc<dyn StatementGateway>,
        sql: &str,
        properties: &HashMap<String, String>,
        settings: &FetcherSettings,
        watcher: &mut StatementWatcher,
    ) -> Result<Self> {
        let created = gateway.create_statement(sql, properties).await?;
        let name = created.name.clone();
        info!("[FETCHER] Created statement '{}' ({})", name, created.phase());

        let statement = if created.phase() == &StatementPhase::Pending {
            let mut rx = watcher.watch(Arc::clone(&gateway), created, &settings.timeouts);
            match wait_until_ready(&mut rx).await {
                Ok(statement) => statement,
                Err(e) => {
                    if !e.is_fatal() {
                        Self::discard(gateway.as_ref(), &name).await;
                    }
                    return Err(e);
                },
            }
        } else {
            created
        };

        if statement.phase() == &StatementPhase::Failed {
            let detail = match statement.detail() {
                "" => format!("Statement '{}' failed", name),
                detail => detail.to_string(),
            };
            warn!("[FETCHER] Statement '{}' failed: {}", name, detail);
            return Err(LinkError::StatementFailed { name, detail }.into());
        }

        let converter = ResultSetConverter::new(statement.columns());
        let mut store = MaterializedResultStore::new(converter.headers(), settings.max_capacity);
        store.set_table_mode(settings.table_mode);

        let mut fetcher = Self {
            exhausted: !statement.phase().has_results(),
            gateway,
            statement,
            converter,
            store,
            next_page_token: None,
            pages_fetched: 0,
            deleted: false,
        };

        if let Err(e) = fetcher.fetch_next_page().await {
            if !e.is_fatal() {
                fetcher.close().await;
            }
            return Err(e);
        }
        Ok(fetcher)
    }

    /// Fetch and materialize the next page.
    ///
    /// A page that does not match the schema is rejected as a whole and the
    /// cursor stays where it was, so the same page can be requested again.
    pub async fn fetch_next_page(&mut self) -> Result<PageOutcome> {
        if self.exhausted {
            debug!("[FETCHER] '{}' has no further pages", self.statement.name);
            return Ok(PageOutcome {
                rows_appended: 0,
                has_more: false,
            });
        }

        let page = self
            .gateway
            .get_statement_results(&self.statement.name, self.next_page_token.as_deref())
            .await?;
        let rows = self.converter.convert_rows(page.items())?;
        let rows_appended = rows.len();
        self.store.append_all(rows);

        self.next_page_token = page.next_page_token();
        self.exhausted = self.next_page_token.is_none();
        self.pages_fetched += 1;

        debug!(
            "[FETCHER] Page {} of '{}': {} rows, store size {}, more: {}",
            self.pages_fetched,
            self.statement.name,
            rows_appended,
            self.store.size(),
            !self.exhausted
        );

        Ok(PageOutcome {
            rows_appended,
            has_more: !self.exhausted,
        })
    }

    /// Re-read the statement status from the gateway.
    pub async fn refresh_status(&mut self) -> Result<&Statement> {
        self.statement = self.gateway.get_statement(&self.statement.name).await?;
        Ok(&self.statement)
    }

    /// Delete the statement on the gateway, keeping the rows fetched so far.
    pub async fn stop(&mut self) -> Result<()> {
        if self.deleted {
            return Ok(());
        }
        self.gateway.delete_statement(&self.statement.name).await?;
        info!("[FETCHER] Stopped statement '{}'", self.statement.name);
        self.deleted = true;
        self.exhausted = true;
        Ok(())
    }

    /// Release the statement on the gateway unless it already finished.
    ///
    /// Failures are logged only; the statement is abandoned either way.
    pub async fn close(&mut self) {
        if self.deleted || self.statement.phase().is_terminal() {
            return;
        }
        Self::discard(self.gateway.as_ref(), &self.statement.name).await;
        self.deleted = true;
    }

    async fn discard(gateway: &dyn StatementGateway, name: &str) {
        match gateway.delete_statement(name).await {
            Ok(()) => debug!("[FETCHER] Deleted statement '{}'", name),
            Err(e) => warn!("[FETCHER] Failed to delete statement '{}': {}", name, e),
        }
    }

    pub fn statement(&self) -> &Statement {
        &self.statement
    }

    pub fn store(&self) -> &MaterializedResultStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MaterializedResultStore {
        &mut self.store
    }

    pub fn has_more(&self) -> bool {
        !self.exhausted
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn is_stopped(&self) -> bool {
        self.deleted
    }

    /// Title-bar summary: name, phase and paging state.
    pub fn status_line(&self) -> String {
        format!(
            "{} | {} | page {}{}",
            self.statement.name,
            self.statement.phase(),
            self.pages_fetched,
            if self.exhausted { " (last)" } else { "" }
        )
    }
}
