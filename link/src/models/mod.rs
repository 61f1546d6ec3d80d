//! Data models for streamsql-link.
//!
//! Request and response structures of the statement gateway: statement
//! lifecycle, result schemas, and paged result rows.

pub mod data_type;
pub mod error_detail;
pub mod operation;
pub mod statement;
pub mod statement_results;
pub mod wire_item;


pub use data_type::{ColumnDetails, DataType, FieldType, RowFieldType, TypeKind};
pub use error_detail::{ErrorDetail, ErrorResponse};
pub use operation::Operation;
pub use statement::{
    CreateStatementRequest, ResultSchema, Statement, StatementPhase, StatementSpec,
    StatementStatus, StatementTraits,
};
pub use statement_results::{
    extract_page_token, ResultData, ResultItem, ResultsMetadata, StatementResults,
};
pub use wire_item::WireItem;
