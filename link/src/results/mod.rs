//! Conversion of gateway result pages into typed rows.
//!
//! - [`FieldConverter`]: one recursive converter per column type descriptor
//! - [`ResultSetConverter`]: arity check plus column-major page conversion
//! - [`StatementResultField`] / [`RowKey`]: internal values and row identity

pub mod converter;
pub mod field;
pub mod result_set;

#[cfg(test)]
mod property_tests;

pub use converter::{convert_field, FieldConverter};
pub use field::{
    MapEntry, RowKey, StatementResultColumn, StatementResultField, StatementResultRow, NULL_STRING,
};
pub use result_set::{ConversionError, ConvertedResultSet, ResultSetConverter};
