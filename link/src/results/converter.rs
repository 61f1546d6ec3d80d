//! Per-column value converters built from type descriptors.
//!
//! A [`FieldConverter`] is built once per column and applied to every
//! payload of that column. Conversion is total: whenever a payload does not
//! match the descriptor's shape the affected field becomes NULL instead of
//! failing the page.

use log::trace;

use super::field::{MapEntry, StatementResultField};
use crate::models::{DataType, FieldType, TypeKind, WireItem};

/// Recursive converter for one type descriptor
#[derive(Debug, Clone, PartialEq)]
pub enum FieldConverter {
    Atomic(FieldType),
    Array {
        element_type: FieldType,
        element: Box<FieldConverter>,
    },
    /// MAP, and MULTISET seen as a map from element to its multiplicity
    Map {
        key_type: FieldType,
        value_type: FieldType,
        key: Box<FieldConverter>,
        value: Box<FieldConverter>,
    },
    Row {
        element_types: Vec<FieldType>,
        fields: Vec<FieldConverter>,
    },
    /// Composite descriptor without its child descriptors; yields NULL
    Unsupported,
}

impl FieldConverter {
    pub fn new(data_type: &DataType) -> Self {
        match data_type.kind() {
            TypeKind::Atomic => FieldConverter::Atomic(data_type.field_type.clone()),
            TypeKind::Array => match &data_type.element_type {
                Some(element) => FieldConverter::Array {
                    element_type: element.field_type.clone(),
                    element: Box::new(FieldConverter::new(element)),
                },
                None => FieldConverter::unsupported(data_type),
            },
            TypeKind::Multiset => match &data_type.element_type {
                Some(element) => FieldConverter::Map {
                    key_type: element.field_type.clone(),
                    value_type: FieldType::Integer,
                    key: Box::new(FieldConverter::new(element)),
                    value: Box::new(FieldConverter::Atomic(FieldType::Integer)),
                },
                None => FieldConverter::unsupported(data_type),
            },
            TypeKind::Map => match (&data_type.key_type, &data_type.value_type) {
                (Some(key), Some(value)) => FieldConverter::Map {
                    key_type: key.field_type.clone(),
                    value_type: value.field_type.clone(),
                    key: Box::new(FieldConverter::new(key)),
                    value: Box::new(FieldConverter::new(value)),
                },
                _ => FieldConverter::unsupported(data_type),
            },
            TypeKind::Row => match &data_type.fields {
                Some(fields) => FieldConverter::Row {
                    element_types: fields.iter().map(|f| f.field_type.field_type.clone()).collect(),
                    fields: fields.iter().map(|f| FieldConverter::new(&f.field_type)).collect(),
                },
                None => FieldConverter::unsupported(data_type),
            },
        }
    }

    fn unsupported(data_type: &DataType) -> Self {
        trace!("[CONVERTER] Descriptor {} has no child types", data_type.field_type);
        FieldConverter::Unsupported
    }

    /// Convert one wire payload. Never fails.
    pub fn convert(&self, item: &WireItem) -> StatementResultField {
        match (self, item) {
            (_, WireItem::Null) => StatementResultField::null(),
            // NULL-typed columns can only carry NULL
            (FieldConverter::Atomic(FieldType::Null), _) => StatementResultField::null(),
            (FieldConverter::Atomic(field_type), WireItem::Scalar(value)) => {
                StatementResultField::atomic(field_type.clone(), value.clone())
            },
            (
                FieldConverter::Array {
                    element_type,
                    element,
                },
                WireItem::List(items),
            ) => StatementResultField::Array {
                element_type: element_type.clone(),
                values: items.iter().map(|i| element.convert(i)).collect(),
            },
            (
                FieldConverter::Map {
                    key_type,
                    value_type,
                    key,
                    value,
                },
                WireItem::List(items),
            ) => {
                let mut entries = Vec::with_capacity(items.len());
                for entry in items {
                    match entry.as_list() {
                        Some([k, v]) => {
                            entries.push(MapEntry::new(key.convert(k), value.convert(v)))
                        },
                        _ => return StatementResultField::null(),
                    }
                }
                StatementResultField::Map {
                    key_type: key_type.clone(),
                    value_type: value_type.clone(),
                    entries,
                }
            },
            (
                FieldConverter::Row {
                    element_types,
                    fields,
                },
                WireItem::List(items),
            ) => {
                if items.len() != fields.len() {
                    return StatementResultField::null();
                }
                StatementResultField::Row {
                    element_types: element_types.clone(),
                    values: fields.iter().zip(items).map(|(c, i)| c.convert(i)).collect(),
                }
            },
            // Shape mismatch: list for an atomic, scalar for a composite
            _ => StatementResultField::null(),
        }
    }
}

/// Convenience for one-off conversions.
pub fn convert_field(data_type: &DataType, item: &WireItem) -> StatementResultField {
    FieldConverter::new(data_type).convert(item)
}
