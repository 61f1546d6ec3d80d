//! Property-based tests for value conversion and row identity.

use proptest::prelude::*;

use super::converter::FieldConverter;
use super::field::{RowKey, StatementResultField};
use super::result_set::{ConversionError, ResultSetConverter};
use crate::models::{
    ColumnDetails, DataType, FieldType, ResultItem, RowFieldType, TypeKind, WireItem,
};

fn arb_atomic_type() -> impl Strategy<Value = DataType> {
    prop_oneof![
        Just(FieldType::Varchar),
        Just(FieldType::Char),
        Just(FieldType::Integer),
        Just(FieldType::Bigint),
        Just(FieldType::Boolean),
        Just(FieldType::Double),
        Just(FieldType::Date),
        Just(FieldType::Other("GEOMETRY".to_string())),
    ]
    .prop_map(DataType::atomic)
}

fn arb_data_type() -> impl Strategy<Value = DataType> {
    arb_atomic_type().prop_recursive(3, 24, 3, |inner| {
        prop_oneof![
            inner.clone().prop_map(DataType::array),
            inner.clone().prop_map(DataType::multiset),
            (inner.clone(), inner.clone()).prop_map(|(k, v)| DataType::map(k, v)),
            prop::collection::vec(inner, 1..4).prop_map(|types| {
                DataType::row(
                    types
                        .into_iter()
                        .enumerate()
                        .map(|(i, t)| RowFieldType::new(format!("f{}", i), t))
                        .collect(),
                )
            }),
        ]
    })
}

fn arb_scalar() -> impl Strategy<Value = WireItem> {
    "[a-zA-Z0-9 ,=()\\[\\]]{0,8}".prop_map(WireItem::Scalar)
}

fn child_or_varchar(child: Option<&DataType>) -> DataType {
    child
        .cloned()
        .unwrap_or_else(|| DataType::atomic(FieldType::Varchar))
}

fn pairs_to_wire(pairs: Vec<(WireItem, WireItem)>) -> WireItem {
    WireItem::List(
        pairs
            .into_iter()
            .map(|(k, v)| WireItem::List(vec![k, v]))
            .collect(),
    )
}

/// Payloads shaped exactly as the descriptor expects, NULLs included.
fn arb_value_for(data_type: &DataType) -> BoxedStrategy<WireItem> {
    let shaped: BoxedStrategy<WireItem> = match data_type.kind() {
        TypeKind::Atomic => arb_scalar().boxed(),
        TypeKind::Array => {
            let element = child_or_varchar(data_type.element_type.as_deref());
            prop::collection::vec(arb_value_for(&element), 0..4)
                .prop_map(WireItem::List)
                .boxed()
        },
        TypeKind::Multiset => {
            let element = child_or_varchar(data_type.element_type.as_deref());
            let count = "[0-9]{1,3}".prop_map(WireItem::Scalar);
            prop::collection::vec((arb_value_for(&element), count), 0..4)
                .prop_map(pairs_to_wire)
                .boxed()
        },
        TypeKind::Map => {
            let key = child_or_varchar(data_type.key_type.as_deref());
            let value = child_or_varchar(data_type.value_type.as_deref());
            prop::collection::vec((arb_value_for(&key), arb_value_for(&value)), 0..4)
                .prop_map(pairs_to_wire)
                .boxed()
        },
        TypeKind::Row => {
            let fields: Vec<BoxedStrategy<WireItem>> = data_type
                .fields
                .iter()
                .flatten()
                .map(|f| arb_value_for(&f.field_type))
                .collect();
            fields.prop_map(WireItem::List).boxed()
        },
    };
    prop_oneof![1 => Just(WireItem::Null), 4 => shaped].boxed()
}

fn arb_typed_value() -> impl Strategy<Value = (DataType, WireItem)> {
    arb_data_type().prop_flat_map(|data_type| {
        let value = arb_value_for(&data_type);
        (Just(data_type), value)
    })
}

/// Any JSON-shaped payload, unrelated to a descriptor.
fn arb_wire_item() -> impl Strategy<Value = WireItem> {
    prop_oneof![Just(WireItem::Null), arb_scalar()].prop_recursive(3, 16, 4, |inner| {
        prop::collection::vec(inner, 0..4).prop_map(WireItem::List)
    })
}

proptest! {
    #[test]
    fn test_conforming_values_round_trip((data_type, value) in arb_typed_value()) {
        let field = FieldConverter::new(&data_type).convert(&value);
        prop_assert_eq!(field.to_wire(), value);
    }

    #[test]
    fn test_conversion_is_total(data_type in arb_data_type(), value in arb_wire_item()) {
        let field = FieldConverter::new(&data_type).convert(&value);
        let shape_matches = match data_type.kind() {
            TypeKind::Atomic => matches!(value, WireItem::Scalar(_)),
            _ => matches!(value, WireItem::List(_)),
        };
        if !shape_matches {
            prop_assert!(field.is_null());
        }
    }

    #[test]
    fn test_row_key_matches_value_equality(
        (data_type, a) in arb_typed_value(),
        b_seed in any::<prop::sample::Index>(),
    ) {
        let converter = FieldConverter::new(&data_type);
        let first = converter.convert(&a);
        // Compare against itself and against a NULL of the same column
        let candidates = [a.clone(), WireItem::Null];
        let b = &candidates[b_seed.index(candidates.len())];
        let second = converter.convert(b);

        let same_key = RowKey::from_fields(std::slice::from_ref(&first))
            == RowKey::from_fields(std::slice::from_ref(&second));
        prop_assert_eq!(same_key, first == second);
    }

    #[test]
    fn test_arity_mismatch_rejects_page(
        columns in 0usize..5,
        values in 0usize..5,
    ) {
        let schema: Vec<ColumnDetails> = (0..columns)
            .map(|i| {
                ColumnDetails::new(format!("c{}", i), DataType::atomic(FieldType::Varchar))
            })
            .collect();
        let row: Vec<WireItem> = (0..values).map(|i| WireItem::scalar(i.to_string())).collect();
        let item = ResultItem::insert(row);
        let result = ResultSetConverter::new(&schema).convert(&[item]);

        if columns == values {
            let converted = result.unwrap();
            prop_assert_eq!(converted.columns.len(), columns);
            prop_assert_eq!(converted.row_count(), 1);
        } else {
            prop_assert_eq!(
                result.unwrap_err(),
                ConversionError::ColumnCountMismatch {
                    row: 0,
                    expected: columns,
                    actual: values,
                }
            );
        }
    }
}

proptest! {
    #[test]
    fn test_distinct_rows_have_distinct_keys(
        left in prop::collection::vec("[a-c,|:]{0,3}", 1..4),
        right in prop::collection::vec("[a-c,|:]{0,3}", 1..4),
    ) {
        let to_fields = |values: &Vec<String>| -> Vec<_> {
            values
                .iter()
                .map(|v| StatementResultField::atomic(FieldType::Varchar, v.clone()))
                .collect()
        };
        let (l, r) = (to_fields(&left), to_fields(&right));
        prop_assert_eq!(RowKey::from_fields(&l) == RowKey::from_fields(&r), l == r);
    }
}
