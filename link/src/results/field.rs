//! Internal representation of converted result values.

use std::fmt::{self, Write as _};

use crate::models::{FieldType, Operation, WireItem};

/// Text used for SQL NULL in the internal representation and on screen.
pub const NULL_STRING: &str = "NULL";

/// Key/value pair of a MAP (or element/multiplicity pair of a MULTISET)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MapEntry {
    pub key: StatementResultField,
    pub value: StatementResultField,
}

impl MapEntry {
    pub fn new(key: StatementResultField, value: StatementResultField) -> Self {
        Self { key, value }
    }
}

/// A converted result value, possibly nested
///
/// Values are immutable once built. Equality and hashing are structural,
/// which is what row identity in the materialized table relies on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatementResultField {
    Atomic {
        field_type: FieldType,
        value: String,
    },
    Array {
        element_type: FieldType,
        values: Vec<StatementResultField>,
    },
    Map {
        key_type: FieldType,
        value_type: FieldType,
        entries: Vec<MapEntry>,
    },
    Row {
        element_types: Vec<FieldType>,
        values: Vec<StatementResultField>,
    },
}

impl StatementResultField {
    /// The typed NULL every malformed or absent payload degrades to.
    pub fn null() -> Self {
        StatementResultField::Atomic {
            field_type: FieldType::Null,
            value: NULL_STRING.to_string(),
        }
    }

    pub fn atomic(field_type: FieldType, value: impl Into<String>) -> Self {
        StatementResultField::Atomic {
            field_type,
            value: value.into(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(
            self,
            StatementResultField::Atomic {
                field_type: FieldType::Null,
                ..
            }
        )
    }

    /// Type tag of the value itself. Multisets are stored as maps.
    pub fn field_type(&self) -> FieldType {
        match self {
            StatementResultField::Atomic { field_type, .. } => field_type.clone(),
            StatementResultField::Array { .. } => FieldType::Array,
            StatementResultField::Map { .. } => FieldType::Map,
            StatementResultField::Row { .. } => FieldType::Row,
        }
    }

    /// Rebuild the wire payload this value was converted from.
    pub fn to_wire(&self) -> WireItem {
        match self {
            StatementResultField::Atomic {
                field_type: FieldType::Null,
                ..
            } => WireItem::Null,
            StatementResultField::Atomic { value, .. } => WireItem::Scalar(value.clone()),
            StatementResultField::Array { values, .. }
            | StatementResultField::Row { values, .. } => {
                WireItem::List(values.iter().map(StatementResultField::to_wire).collect())
            },
            StatementResultField::Map { entries, .. } => WireItem::List(
                entries
                    .iter()
                    .map(|e| WireItem::List(vec![e.key.to_wire(), e.value.to_wire()]))
                    .collect(),
            ),
        }
    }

    /// Append the canonical key encoding of this value to `out`.
    ///
    /// Every node carries a tag and every variable-length part is length
    /// prefixed, so two encodings are equal only for structurally equal values.
    pub(crate) fn write_key(&self, out: &mut String) {
        match self {
            StatementResultField::Atomic {
                field_type: FieldType::Null,
                ..
            } => out.push('N'),
            StatementResultField::Atomic { field_type, value } => {
                let type_name = field_type.as_str();
                let _ = write!(
                    out,
                    "A{}:{}{}:{}",
                    type_name.len(),
                    type_name,
                    value.len(),
                    value
                );
            },
            StatementResultField::Array {
                element_type,
                values,
            } => {
                let type_name = element_type.as_str();
                let _ = write!(out, "[{}:{}{}:", type_name.len(), type_name, values.len());
                for value in values {
                    value.write_key(out);
                }
                out.push(']');
            },
            StatementResultField::Map {
                key_type,
                value_type,
                entries,
            } => {
                let (k, v) = (key_type.as_str(), value_type.as_str());
                let _ = write!(
                    out,
                    "{{{}:{}{}:{}{}:",
                    k.len(),
                    k,
                    v.len(),
                    v,
                    entries.len()
                );
                for entry in entries {
                    entry.key.write_key(out);
                    entry.value.write_key(out);
                }
                out.push('}');
            },
            StatementResultField::Row {
                element_types,
                values,
            } => {
                let _ = write!(out, "({}:", values.len());
                for element_type in element_types {
                    let type_name = element_type.as_str();
                    let _ = write!(out, "{}:{}", type_name.len(), type_name);
                }
                for value in values {
                    value.write_key(out);
                }
                out.push(')');
            },
        }
    }
}

impl fmt::Display for StatementResultField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementResultField::Atomic { value, .. } => f.write_str(value),
            StatementResultField::Array { values, .. } => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            },
            StatementResultField::Map { entries, .. } => {
                f.write_str("{")?;
                for (i, entry) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", entry.key, entry.value)?;
                }
                f.write_str("}")
            },
            StatementResultField::Row { values, .. } => {
                f.write_str("(")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str(")")
            },
        }
    }
}

/// Identity of a row in the materialized table view
///
/// Derived from the row's fields only (never the operation), so an
/// `UPDATE_BEFORE` carrying the same values as an earlier `INSERT`
/// resolves to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey(String);

impl RowKey {
    pub fn from_fields(fields: &[StatementResultField]) -> Self {
        let mut out = String::with_capacity(fields.len() * 16);
        out.push_str(&fields.len().to_string());
        out.push('|');
        for field in fields {
            field.write_key(&mut out);
        }
        RowKey(out)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One column of a converted page, in row order
#[derive(Debug, Clone, PartialEq)]
pub struct StatementResultColumn {
    pub name: String,
    pub field_type: FieldType,
    pub fields: Vec<StatementResultField>,
}

/// One converted row with its change kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementResultRow {
    pub operation: Operation,
    pub fields: Vec<StatementResultField>,
}

impl StatementResultRow {
    pub fn new(operation: Operation, fields: Vec<StatementResultField>) -> Self {
        Self { operation, fields }
    }

    pub fn key(&self) -> RowKey {
        RowKey::from_fields(&self.fields)
    }

    /// Field values rendered for display, in column order.
    pub fn display_values(&self) -> Vec<String> {
        self.fields.iter().map(|f| f.to_string()).collect()
    }
}
