use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::data_type::ColumnDetails;

/// Lifecycle phase of a statement tracked by the gateway
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum StatementPhase {
    Pending,
    Running,
    Completed,
    Deleting,
    Failed,
    Stopped,
    Unknown(String),
}

impl StatementPhase {
    /// The statement will not produce further results.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StatementPhase::Completed | StatementPhase::Failed | StatementPhase::Stopped
        )
    }

    /// Results may be paged in this phase.
    pub fn has_results(&self) -> bool {
        matches!(self, StatementPhase::Running | StatementPhase::Completed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            StatementPhase::Pending => "PENDING",
            StatementPhase::Running => "RUNNING",
            StatementPhase::Completed => "COMPLETED",
            StatementPhase::Deleting => "DELETING",
            StatementPhase::Failed => "FAILED",
            StatementPhase::Stopped => "STOPPED",
            StatementPhase::Unknown(phase) => phase.as_str(),
        }
    }
}

impl From<String> for StatementPhase {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PENDING" => StatementPhase::Pending,
            "RUNNING" => StatementPhase::Running,
            "COMPLETED" => StatementPhase::Completed,
            "DELETING" => StatementPhase::Deleting,
            "FAILED" => StatementPhase::Failed,
            "STOPPED" => StatementPhase::Stopped,
            _ => StatementPhase::Unknown(value),
        }
    }
}

impl From<StatementPhase> for String {
    fn from(value: StatementPhase) -> Self {
        match value {
            StatementPhase::Unknown(phase) => phase,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for StatementPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result schema of a statement
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSchema {
    #[serde(default)]
    pub columns: Vec<ColumnDetails>,
}

/// Properties the gateway derives from the planned query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementTraits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<ResultSchema>,

    /// Bounded statements eventually complete; unbounded ones stream forever.
    #[serde(default)]
    pub is_bounded: bool,

    /// Append-only statements never emit retractions.
    #[serde(default)]
    pub is_append_only: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upsert_columns: Option<Vec<u32>>,
}

/// Status block of a statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementStatus {
    pub phase: StatementPhase,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traits: Option<StatementTraits>,
}

/// Submitted SQL and its execution properties
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementSpec {
    pub statement: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub properties: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compute_pool_id: Option<String>,
}

/// A statement as returned by the gateway
///
/// # Example JSON
///
/// ```json
/// {
///   "name": "cli-2024-05-01-101500-3f2a",
///   "spec": {"statement": "SELECT * FROM orders;"},
///   "status": {
///     "phase": "RUNNING",
///     "traits": {
///       "is_bounded": false,
///       "schema": {"columns": [{"name": "id", "type": {"type": "INTEGER", "nullable": false}}]}
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub name: String,

    pub spec: StatementSpec,

    pub status: StatementStatus,
}

impl Statement {
    pub fn phase(&self) -> &StatementPhase {
        &self.status.phase
    }

    /// Result columns, empty for statements without a schema (DDL, SET, ...).
    pub fn columns(&self) -> &[ColumnDetails] {
        self.status
            .traits
            .as_ref()
            .and_then(|t| t.schema.as_ref())
            .map(|s| s.columns.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_bounded(&self) -> bool {
        self.status
            .traits
            .as_ref()
            .map(|t| t.is_bounded)
            .unwrap_or(true)
    }

    pub fn detail(&self) -> &str {
        self.status.detail.as_deref().unwrap_or("")
    }
}

/// Body of the create-statement request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateStatementRequest {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_id: Option<String>,

    pub spec: StatementSpec,
}
