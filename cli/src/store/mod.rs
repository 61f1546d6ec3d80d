//! Materialized view over a statement's result changelog.
//!
//! Rows are appended in arrival order. The store keeps two views over them:
//!
//! - the **changelog**: every appended row, oldest first, bounded by `max_capacity`
//! - the **table**: the current state, one row per key, in insertion order
//!
//! Both views are bounded by the same capacity. When the oldest changelog
//! entry is evicted, the table row it created goes with it.

pub mod arena;

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use log::{trace, warn};
use streamsql_link::{FieldType, Operation, RowKey, StatementResultField, StatementResultRow};

use self::arena::{LinkedArena, NodeHandle};

/// Header of the synthetic column shown in changelog mode
pub const OPERATION_HEADER: &str = "Operation";

#[derive(Debug)]
struct ChangelogEntry {
    row: Arc<StatementResultRow>,
    /// Table node this entry inserted, if any
    table_node: Option<NodeHandle>,
}

#[derive(Debug)]
struct TableEntry {
    key: RowKey,
    row: Arc<StatementResultRow>,
}

/// Bounded changelog plus deduplicated table of one statement's results
#[derive(Debug)]
pub struct MaterializedResultStore {
    headers: Vec<String>,
    max_capacity: usize,
    table_mode: bool,
    changelog: VecDeque<ChangelogEntry>,
    table: LinkedArena<TableEntry>,
    index: HashMap<RowKey, NodeHandle>,
}

impl MaterializedResultStore {
    /// Create a store in table mode. A capacity of 0 is raised to 1.
    pub fn new(headers: Vec<String>, max_capacity: usize) -> Self {
        let max_capacity = if max_capacity == 0 {
            warn!("[STORE] max_capacity of 0 is not usable, using 1");
            1
        } else {
            max_capacity
        };

        Self {
            headers,
            max_capacity,
            table_mode: true,
            changelog: VecDeque::new(),
            table: LinkedArena::new(),
            index: HashMap::new(),
        }
    }

    pub fn append(&mut self, row: StatementResultRow) {
        let row = Arc::new(row);
        let key = row.key();
        let mut table_node = None;

        if row.operation.is_insertion() {
            if let Some(previous) = self.index.remove(&key) {
                self.table.remove(previous);
            }
            let handle = self.table.push_back(TableEntry {
                key: key.clone(),
                row: Arc::clone(&row),
            });
            self.index.insert(key, handle);
            table_node = Some(handle);
        } else if let Some(handle) = self.index.remove(&key) {
            self.table.remove(handle);
        } else {
            trace!("[STORE] Retraction for a key not in the table, ignoring");
        }

        self.changelog.push_back(ChangelogEntry { row, table_node });

        if self.changelog.len() > self.max_capacity {
            if let Some(evicted) = self.changelog.pop_front() {
                self.evict(evicted);
            }
        }
    }

    pub fn append_all<I>(&mut self, rows: I)
    where
        I: IntoIterator<Item = StatementResultRow>,
    {
        for row in rows {
            self.append(row);
        }
    }

    /// Drop the table row an evicted changelog entry created, unless it has
    /// since been replaced or retracted.
    fn evict(&mut self, entry: ChangelogEntry) {
        let Some(handle) = entry.table_node else {
            return;
        };
        let Some(key) = self.table.get(handle).map(|e| e.key.clone()) else {
            return;
        };
        if self.index.get(&key) == Some(&handle) {
            self.index.remove(&key);
            self.table.remove(handle);
            trace!("[STORE] Evicted table row with its changelog entry");
        }
    }

    /// Iterate the active view.
    ///
    /// The iterator borrows the store, so it cannot outlive the next append.
    pub fn iter(&self) -> StoreIter<'_> {
        let inner = if self.table_mode {
            ViewIter::Table(self.table.iter())
        } else {
            ViewIter::Changelog(self.changelog.iter())
        };
        StoreIter { inner }
    }

    pub fn set_table_mode(&mut self, table_mode: bool) {
        self.table_mode = table_mode;
    }

    pub fn is_table_mode(&self) -> bool {
        self.table_mode
    }

    /// Row count of the active view.
    pub fn size(&self) -> usize {
        if self.table_mode {
            self.table.len()
        } else {
            self.changelog.len()
        }
    }

    /// Declared headers in table mode, prefixed with `Operation` in changelog mode.
    pub fn headers(&self) -> Vec<String> {
        if self.table_mode {
            self.headers.clone()
        } else {
            std::iter::once(OPERATION_HEADER.to_string())
                .chain(self.headers.iter().cloned())
                .collect()
        }
    }

    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    pub fn changelog_len(&self) -> usize {
        self.changelog.len()
    }

    pub fn table_len(&self) -> usize {
        self.table.len()
    }
}

/// Single-pass iterator over the active view of a [`MaterializedResultStore`]
///
/// In changelog mode every row starts with the synthetic operation field.
pub struct StoreIter<'a> {
    inner: ViewIter<'a>,
}

enum ViewIter<'a> {
    Table(arena::Iter<'a, TableEntry>),
    Changelog(std::collections::vec_deque::Iter<'a, ChangelogEntry>),
}

impl<'a> Iterator for StoreIter<'a> {
    type Item = Vec<StatementResultField>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            ViewIter::Table(iter) => iter.next().map(|entry| entry.row.fields.clone()),
            ViewIter::Changelog(iter) => iter.next().map(|entry| {
                let mut fields = Vec::with_capacity(entry.row.fields.len() + 1);
                fields.push(operation_field(entry.row.operation));
                fields.extend(entry.row.fields.iter().cloned());
                fields
            }),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            ViewIter::Table(iter) => iter.size_hint(),
            ViewIter::Changelog(iter) => iter.size_hint(),
        }
    }
}

impl<'a> ExactSizeIterator for StoreIter<'a> {}

fn operation_field(operation: Operation) -> StatementResultField {
    StatementResultField::atomic(FieldType::Varchar, operation.as_str())
}
