//! Row listing for the table editor grid.
//!
//! The grid shows one page of a table, view or foreign table. Large values
//! are cut down in the database before they are sent: text and JSON columns
//! to a number of characters, arrays to their first few elements. The page
//! itself is selected by an inner `_base_query` so the truncation only runs
//! over the rows that are shown.
//!
//! When no sort is given the rows are ordered by the primary key, or by the
//! first orderable column when the relation has none, so that paging is
//! stable.
//!
//! # Example
//! ```
//! use pgmeta::table_rows::{ColumnMetadata, TableMetadata, TableRowsOptions, table_rows_query};
//!
//! let table = TableMetadata::new("public", "todos")
//!     .with_primary_keys(&["id"])
//!     .with_column(ColumnMetadata::new("id", "bigint", "int8"))
//!     .with_column(ColumnMetadata::new("done", "boolean", "bool"));
//!
//! let sql = table_rows_query(&table, &TableRowsOptions::new().with_page(2, 25))?;
//! assert_eq!(
//!     sql,
//!     "with _base_query as (select * from public.todos order by todos.id asc nulls last limit 25 offset 25) select id,done from _base_query;"
//! );
//! # Ok::<(), pgmeta::QueryError>(())
//! ```

use crate::assemble::{compile_filters, compile_sorts, table_ref};
use crate::error::QueryResult;
use crate::format::Ident;
use crate::statement::{ArrayElement, RowProjection, SelectStatement, Statement, TableRowsStatement};
use crate::types::{Filter, Pagination, QueryTable, Sort};
use serde::{Deserialize, Serialize};

/// Rows per page when none is given.
pub const DEFAULT_PAGE_SIZE: i64 = 100;

/// Longest text value, in bytes, sent before it is cut.
pub const DEFAULT_MAX_CHARACTERS: usize = 10240;

/// Elements kept from an oversized array.
pub const DEFAULT_MAX_ARRAY_SIZE: usize = 50;

/// Column types whose values are cut to `max_characters`.
const LARGE_TEXT_TYPES: &[&str] = &["text", "character varying", "json", "jsonb"];

/// Column types without a default sort order.
const UNORDERED_TYPES: &[&str] = &["json", "xml"];

/// A primary key column, as listed by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryKey {
    pub name: String,
}

/// One column of a relation, as listed by the catalog.
///
/// `data_type` is the `information_schema` type name (`text`, `ARRAY`,
/// `USER-DEFINED`, ...); `format` is the underlying type name, which for
/// arrays is the element type prefixed with `_` (`_text`, `_jsonb`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMetadata {
    pub name: String,
    #[serde(default)]
    pub data_type: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub ordinal_position: i32,
}

impl ColumnMetadata {
    pub fn new(
        name: impl Into<String>,
        data_type: impl Into<String>,
        format: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            format: format.into(),
            ordinal_position: 0,
        }
    }

    pub fn with_ordinal_position(mut self, position: i32) -> Self {
        self.ordinal_position = position;
        self
    }

    pub fn is_array(&self) -> bool {
        self.data_type.eq_ignore_ascii_case("array")
    }

    fn element_format(&self) -> &str {
        self.format.strip_prefix('_').unwrap_or(&self.format)
    }

    /// Whether rows can be ordered by this column.
    pub fn is_orderable(&self) -> bool {
        let ty = if self.is_array() {
            self.element_format()
        } else {
            self.data_type.as_str()
        };
        !UNORDERED_TYPES.contains(&ty)
    }

    fn projection(&self, options: &TableRowsOptions) -> QueryResult<RowProjection> {
        let column = Ident::new(self.name.as_str())?;
        if self.is_array() {
            let element = match self.element_format() {
                "jsonb" => ArrayElement::Jsonb,
                "json" => ArrayElement::Json,
                _ => ArrayElement::Text,
            };
            return Ok(RowProjection::Array {
                column,
                element,
                max_characters: options.max_characters,
                max_elements: options.max_array_size,
            });
        }
        if LARGE_TEXT_TYPES.contains(&self.data_type.as_str()) {
            return Ok(RowProjection::Text {
                column,
                max_characters: options.max_characters,
            });
        }
        Ok(RowProjection::Plain(column))
    }
}

/// A table, view, materialized view or foreign table with its columns.
///
/// Deserializes from the catalog listing; fields other than these are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMetadata {
    pub schema: String,
    pub name: String,
    #[serde(default)]
    pub primary_keys: Vec<PrimaryKey>,
    #[serde(default)]
    pub columns: Vec<ColumnMetadata>,
}

impl TableMetadata {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            primary_keys: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn with_primary_keys(mut self, names: &[&str]) -> Self {
        self.primary_keys = names
            .iter()
            .map(|name| PrimaryKey {
                name: name.to_string(),
            })
            .collect();
        self
    }

    /// Append a column. Its ordinal position is its place in the list unless
    /// one was set.
    pub fn with_column(mut self, column: ColumnMetadata) -> Self {
        let column = if column.ordinal_position == 0 {
            let position = i32::try_from(self.columns.len() + 1).unwrap_or(i32::MAX);
            column.with_ordinal_position(position)
        } else {
            column
        };
        self.columns.push(column);
        self
    }

    /// Columns in table order.
    pub fn columns_in_order(&self) -> Vec<&ColumnMetadata> {
        let mut columns: Vec<&ColumnMetadata> = self.columns.iter().collect();
        columns.sort_by_key(|c| c.ordinal_position);
        columns
    }
}

/// Options for [`table_rows_query`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableRowsOptions {
    /// Conditions, conjoined in order. Default: none.
    pub filters: Vec<Filter>,
    /// Sort items. Default: none, which orders by
    /// [`default_order_by_columns`].
    pub sorts: Vec<Sort>,
    /// 1-based page number. Default: `1`.
    pub page: i64,
    /// Rows per page. Default: [`DEFAULT_PAGE_SIZE`].
    pub limit: i64,
    /// Default: [`DEFAULT_MAX_CHARACTERS`].
    pub max_characters: usize,
    /// Default: [`DEFAULT_MAX_ARRAY_SIZE`].
    pub max_array_size: usize,
}

impl Default for TableRowsOptions {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            sorts: Vec::new(),
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            max_characters: DEFAULT_MAX_CHARACTERS,
            max_array_size: DEFAULT_MAX_ARRAY_SIZE,
        }
    }
}

impl TableRowsOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_sorts(mut self, sorts: Vec<Sort>) -> Self {
        self.sorts = sorts;
        self
    }

    pub fn with_page(mut self, page: i64, limit: i64) -> Self {
        self.page = page;
        self.limit = limit;
        self
    }

    pub fn with_max_characters(mut self, max_characters: usize) -> Self {
        self.max_characters = max_characters;
        self
    }

    pub fn with_max_array_size(mut self, max_array_size: usize) -> Self {
        self.max_array_size = max_array_size;
        self
    }
}

/// Columns to order by when the caller gave no sort.
///
/// The primary key columns, minus `excluded_columns`. If that leaves none,
/// the first orderable column in table order that is not excluded. Empty
/// when there is no such column.
pub fn default_order_by_columns(table: &TableMetadata, excluded_columns: &[&str]) -> Vec<String> {
    let is_excluded = |name: &str| excluded_columns.contains(&name);

    let keys: Vec<String> = table
        .primary_keys
        .iter()
        .filter(|pk| !is_excluded(pk.name.as_str()))
        .map(|pk| pk.name.clone())
        .collect();
    if !keys.is_empty() {
        return keys;
    }

    table
        .columns_in_order()
        .into_iter()
        .find(|c| !is_excluded(c.name.as_str()) && c.is_orderable())
        .map(|c| vec![c.name.clone()])
        .unwrap_or_default()
}

/// One page of rows with large values truncated:
///
/// `with _base_query as (select * from <table>[ where ...] order by ... limit n offset m) select <columns> from _base_query;`
pub fn table_rows_query(table: &TableMetadata, options: &TableRowsOptions) -> QueryResult<String> {
    Ok(table_rows_statement(table, options)?.to_sql())
}

pub fn table_rows_statement(
    table: &TableMetadata,
    options: &TableRowsOptions,
) -> QueryResult<Statement> {
    let default_sorts;
    let sorts = if options.sorts.is_empty() {
        default_sorts = default_order_by_columns(table, &[])
            .into_iter()
            .map(|column| Sort::on(table.name.as_str(), column, true, false))
            .collect::<Vec<_>>();
        &default_sorts
    } else {
        &options.sorts
    };

    let base = SelectStatement {
        table: table_ref(&QueryTable::new(table.schema.as_str(), table.name.as_str()))?,
        columns: "*".to_string(),
        where_clause: compile_filters(&options.filters)?,
        order: compile_sorts(sorts)?,
        pagination: Some(Pagination::from_page(options.page, options.limit)),
    };
    let projections = table
        .columns_in_order()
        .into_iter()
        .map(|column| column.projection(options))
        .collect::<QueryResult<Vec<_>>>()?;

    Ok(Statement::TableRows(TableRowsStatement { base, projections }))
}
