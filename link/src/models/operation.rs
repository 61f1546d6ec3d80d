use serde::{Deserialize, Serialize};
use std::fmt;

/// Change kind of a result row
///
/// The gateway encodes it as an integer (`"op": 0..=3`). Insert kinds add a
/// row to the materialized table, retraction kinds remove one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Operation {
    /// New row
    Insert,

    /// Previous version of an updated row (retraction)
    UpdateBefore,

    /// New version of an updated row
    UpdateAfter,

    /// Removed row (retraction)
    Delete,
}

impl Operation {
    /// Insert and UpdateAfter add the row to the table view.
    pub fn is_insertion(self) -> bool {
        matches!(self, Operation::Insert | Operation::UpdateAfter)
    }

    /// Short changelog notation shown in the `Operation` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Insert => "+I",
            Operation::UpdateBefore => "-U",
            Operation::UpdateAfter => "+U",
            Operation::Delete => "-D",
        }
    }
}

impl TryFrom<u8> for Operation {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Operation::Insert),
            1 => Ok(Operation::UpdateBefore),
            2 => Ok(Operation::UpdateAfter),
            3 => Ok(Operation::Delete),
            other => Err(format!("unknown change kind {}", other)),
        }
    }
}

impl From<Operation> for u8 {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Insert => 0,
            Operation::UpdateBefore => 1,
            Operation::UpdateAfter => 2,
            Operation::Delete => 3,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
