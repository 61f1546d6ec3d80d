//! Page-level conversion of raw result items into typed rows.

use log::debug;

use super::converter::FieldConverter;
use super::field::{StatementResultColumn, StatementResultField, StatementResultRow};
use crate::models::{ColumnDetails, FieldType, Operation, ResultItem};

/// Error raised when a page cannot be lined up with its schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("row {row} has {actual} values but the schema has {expected} columns")]
    ColumnCountMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// A converted page: one column per schema column plus the change kind of
/// every row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConvertedResultSet {
    pub columns: Vec<StatementResultColumn>,
    pub operations: Vec<Operation>,
}

impl ConvertedResultSet {
    pub fn row_count(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Transpose into rows, preserving the page order.
    pub fn into_rows(self) -> Vec<StatementResultRow> {
        let mut columns: Vec<_> = self.columns.into_iter().map(|c| c.fields.into_iter()).collect();
        self.operations
            .into_iter()
            .map(|operation| {
                let fields = columns
                    .iter_mut()
                    .map(|column| column.next().unwrap_or_else(StatementResultField::null))
                    .collect();
                StatementResultRow::new(operation, fields)
            })
            .collect()
    }
}

/// Column-wise converter for one statement schema
///
/// Build it once when the schema is known and reuse it for every page.
#[derive(Debug, Clone)]
pub struct ResultSetConverter {
    columns: Vec<(String, FieldType, FieldConverter)>,
}

impl ResultSetConverter {
    pub fn new(columns: &[ColumnDetails]) -> Self {
        Self {
            columns: columns
                .iter()
                .map(|c| {
                    (
                        c.name.clone(),
                        c.data_type.field_type.clone(),
                        FieldConverter::new(&c.data_type),
                    )
                })
                .collect(),
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|(name, _, _)| name.clone()).collect()
    }

    /// Convert a page. Every item must carry exactly one payload per column;
    /// the first item that does not rejects the whole page.
    pub fn convert(&self, items: &[ResultItem]) -> Result<ConvertedResultSet, ConversionError> {
        let expected = self.columns.len();
        if let Some((row, item)) = items.iter().enumerate().find(|(_, i)| i.row.len() != expected) {
            debug!(
                "[CONVERTER] Row {} has {} values, schema has {} columns",
                row,
                item.row.len(),
                expected
            );
            return Err(ConversionError::ColumnCountMismatch {
                row,
                expected,
                actual: item.row.len(),
            });
        }

        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, (name, field_type, converter))| StatementResultColumn {
                name: name.clone(),
                field_type: field_type.clone(),
                fields: items.iter().map(|item| converter.convert(&item.row[index])).collect(),
            })
            .collect();

        Ok(ConvertedResultSet {
            columns,
            operations: items.iter().map(|item| item.op).collect(),
        })
    }

    /// Convert a page straight into rows.
    pub fn convert_rows(
        &self,
        items: &[ResultItem],
    ) -> Result<Vec<StatementResultRow>, ConversionError> {
        self.convert(items).map(ConvertedResultSet::into_rows)
    }
}
