//! Background statement watcher
//!
//! Polls a freshly created statement until the gateway moves it out of
//! PENDING. At most one watcher task exists per session; starting a new one
//! aborts the previous task. The task only publishes statement snapshots,
//! the result store stays with the foreground session.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};
use streamsql_link::{LinkError, LinkTimeouts, Statement, StatementGateway, StatementPhase};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::error::{CLIError, Result};

/// Latest state published by the watcher task
#[derive(Debug, Clone)]
pub enum WatchEvent {
    /// Still PENDING
    Pending(Statement),
    /// Left PENDING; any phase including FAILED
    Ready(Statement),
    /// `statement_ready_timeout` elapsed while still PENDING
    TimedOut { name: String, waited: Duration },
    /// A status poll failed
    Error { message: String, unauthorized: bool },
}

impl WatchEvent {
    fn is_final(&self) -> bool {
        !matches!(self, WatchEvent::Pending(_))
    }
}

/// Owner of the single background polling task
#[derive(Default)]
pub struct StatementWatcher {
    handle: Option<JoinHandle<()>>,
}

impl StatementWatcher {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Start watching `statement`, aborting any previous watcher.
    pub fn watch(
        &mut self,
        gateway: Arc<dyn StatementGateway>,
        statement: Statement,
        timeouts: &LinkTimeouts,
    ) -> watch::Receiver<WatchEvent> {
        self.stop();

        let poll_interval = timeouts.poll_interval;
        let ready_timeout = timeouts.statement_ready_timeout;
        let name = statement.name.clone();
        let (tx, rx) = watch::channel(WatchEvent::Pending(statement));

        debug!(
            "[WATCHER] Watching '{}' (poll every {:?}, timeout {:?})",
            name,
            poll_interval,
            ready_timeout
        );

        self.handle = Some(tokio::spawn(async move {
            let started = Instant::now();
            loop {
                tokio::time::sleep(poll_interval).await;

                let event = match gateway.get_statement(&name).await {
                    Ok(statement) if statement.phase() == &StatementPhase::Pending => {
                        if started.elapsed() >= ready_timeout {
                            WatchEvent::TimedOut {
                                name: name.clone(),
                                waited: started.elapsed(),
                            }
                        } else {
                            WatchEvent::Pending(statement)
                        }
                    },
                    Ok(statement) => {
                        debug!("[WATCHER] '{}' is {}", name, statement.phase());
                        WatchEvent::Ready(statement)
                    },
                    Err(e) => {
                        warn!("[WATCHER] Status poll for '{}' failed: {}", name, e);
                        match CLIError::from(e) {
                            CLIError::Unauthorized(message) => WatchEvent::Error {
                                message,
                                unauthorized: true,
                            },
                            other => WatchEvent::Error {
                                message: other.to_string(),
                                unauthorized: false,
                            },
                        }
                    },
                };

                let done = event.is_final();
                if tx.send(event).is_err() || done {
                    break;
                }
            }
        }));

        rx
    }

    /// Abort the running watcher task, if any.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if !handle.is_finished() {
                debug!("[WATCHER] Aborting previous watcher");
            }
            handle.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for StatementWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Wait until the watcher publishes a final event.
///
/// Returns the statement once it left PENDING. FAILED is returned as a
/// statement too; the caller decides how to report it.
pub async fn wait_until_ready(rx: &mut watch::Receiver<WatchEvent>) -> Result<Statement> {
    loop {
        let event = rx.borrow_and_update().clone();
        match event {
            WatchEvent::Ready(statement) => return Ok(statement),
            WatchEvent::TimedOut { name, waited } => {
                return Err(CLIError::LinkError(LinkError::Timeout(
                    format!("statement '{}' still PENDING after {:?}", name, waited),
                )))
            },
            WatchEvent::Error {
                message,
                unauthorized: true,
            } => return Err(CLIError::Unauthorized(message)),
            WatchEvent::Error { message, .. } => {
                return Err(CLIError::LinkError(LinkError::Network(message)))
            },
            WatchEvent::Pending(_) => {},
        }

        if rx.changed().await.is_err() {
            // Sender dropped without a final event: the watcher was aborted
            return Err(CLIError::Cancelled);
        }
    }
}
