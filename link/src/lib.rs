//! # streamsql-link: Statement Gateway Client Library
//!
//! Client-side pieces of the streaming SQL shell that do not depend on a
//! terminal: gateway wire models, the gateway interface and its HTTP
//! implementation, and conversion of result pages into typed rows.
//!
//! ## Features
//!
//! - **Statement lifecycle**: create, poll, page through and delete statements
//! - **Nested types**: ARRAY, MULTISET, MAP and ROW values of any depth
//! - **Total conversion**: malformed payloads degrade to NULL fields
//! - **Authentication**: API key pairs and bearer tokens
//! - **Retries**: connect failures and timeouts are retried with backoff
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use streamsql_link::{GatewayClient, ResultSetConverter, StatementGateway};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = GatewayClient::builder()
//!         .base_url("https://gateway.example.com")
//!         .organization_id("org-1")
//!         .environment_id("env-1")
//!         .api_key("KEY", "SECRET")
//!         .build()?;
//!
//!     let statement = client.create_statement("SELECT * FROM orders;", &HashMap::new()).await?;
//!     let statement = client.get_statement(&statement.name).await?;
//!
//!     let converter = ResultSetConverter::new(statement.columns());
//!     let page = client.get_statement_results(&statement.name, None).await?;
//!     for row in converter.convert_rows(page.items())? {
//!         println!("{} {:?}", row.operation, row.display_values());
//!     }
//!
//!     client.delete_statement(&statement.name).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod gateway;
pub mod models;
pub mod results;
pub mod timeouts;

// Re-export main types for convenience
pub use auth::AuthProvider;
pub use client::{GatewayClient, GatewayClientBuilder};
pub use error::{LinkError, Result};
pub use gateway::{generate_statement_name, StatementGateway};
pub use models::{
    ColumnDetails, DataType, FieldType, Operation, ResultItem, Statement, StatementPhase,
    StatementResults, WireItem,
};
pub use results::{
    ConversionError, ConvertedResultSet, FieldConverter, RowKey, ResultSetConverter,
    StatementResultField, StatementResultRow,
};
pub use timeouts::LinkTimeouts;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
