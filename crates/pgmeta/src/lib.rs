//! # pgmeta
//!
//! Plain-text PostgreSQL statements for a table editor.
//!
//! ## Features
//!
//! - **One statement per intent**: count, select, insert, update, delete and
//!   truncate against a single schema-qualified table
//! - **Safe defaults**: DELETE and UPDATE require at least one filter, INSERT
//!   requires at least one row
//! - **Quoted and escaped**: every identifier goes through [`format::ident`],
//!   every value through [`format::literal`] or the filter value rules
//! - **Typed coercion by the database**: insert/update payloads travel as one
//!   JSON literal through `json(b)_populate_record(set)`
//! - **Grid listing**: [`table_rows_query`] pages through a relation with
//!   large text, JSON and array values truncated in the database
//! - **Structured output**: statements are a [`Statement`] tree, rendered to
//!   text only at the boundary
//!
//! ## Usage
//!
//! ```
//! use pgmeta::{DeleteOptions, FilterOperator};
//! use serde_json::json;
//!
//! let sql = pgmeta::table("public", "users")
//!     .select("id, name, email")
//!     .filter("id", FilterOperator::Gt, 10)
//!     .match_all([("active", json!(true))])
//!     .order_on("users", "name", true, false)
//!     .range(0, 9)
//!     .to_sql()?;
//! assert_eq!(
//!     sql,
//!     "select id, name, email from public.users where id > 10 and active = true order by users.name asc nulls last limit 10 offset 0;"
//! );
//!
//! let err = pgmeta::table("public", "users")
//!     .delete(DeleteOptions::new().returning())
//!     .to_sql()
//!     .unwrap_err();
//! assert!(err.is_missing_filter());
//! # Ok::<(), pgmeta::QueryError>(())
//! ```

pub mod assemble;
pub mod error;
pub mod filter;
pub mod format;
pub mod modifier;
pub mod options;
pub mod query;
pub mod statement;
pub mod table_rows;
pub mod trace;
pub mod types;

pub use assemble::{
    JsonRow, count_query, delete_query, insert_query, select_query, truncate_query, update_query,
};
pub use error::{QueryError, QueryResult};
pub use filter::QueryFilter;
pub use format::{Ident, ident, literal};
pub use modifier::{Action, QueryModifier};
pub use options::{
    CountOptions, DeleteOptions, InsertOptions, ReturningOptions, SelectOptions, TruncateOptions,
    UpdateOptions,
};
pub use query::{TableQuery, public_table, table};
pub use statement::Statement;
pub use table_rows::{
    ColumnMetadata, TableMetadata, TableRowsOptions, default_order_by_columns, table_rows_query,
};
pub use trace::StatementLog;
pub use types::{Filter, FilterColumn, FilterOperator, Pagination, QueryTable, Sort};
