//! Structured statements.
//!
//! The assembler lowers editor intents into these clause types; text is only
//! produced by [`Statement::to_sql`]. Every identifier in the tree is already
//! validated and every value is already classified, so rendering cannot fail.

use crate::format::{Ident, write_literal, write_quoted};
use crate::types::{FilterOperator, Pagination};
use serde_json::{Number, Value};
use std::fmt;

/// `schema.table`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Ident,
    pub name: Ident,
}

impl TableRef {
    pub(crate) fn write_sql(&self, out: &mut String) {
        self.schema.write_sql(out);
        out.push('.');
        self.name.write_sql(out);
    }
}

/// A value on the right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Number(Number),
    Bool(bool),
    /// Escaped as a string constant.
    Text(String),
    /// An `ARRAY[...]` constructor written by the caller, emitted verbatim.
    ArrayExpr(String),
}

impl SqlValue {
    fn write_sql(&self, out: &mut String) {
        match self {
            Self::Null => out.push_str("NULL"),
            Self::Number(n) => out.push_str(&n.to_string()),
            Self::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Self::Text(s) => write_quoted(s, out),
            Self::ArrayExpr(s) => out.push_str(s),
        }
    }
}

/// Right-hand side of `is`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsTarget {
    Null,
    NotNull,
    True,
    NotTrue,
    False,
    NotFalse,
    Unknown,
    NotUnknown,
}

impl IsTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::NotNull => "not null",
            Self::True => "true",
            Self::NotTrue => "not true",
            Self::False => "false",
            Self::NotFalse => "not false",
            Self::Unknown => "unknown",
            Self::NotUnknown => "not unknown",
        }
    }

    /// Parse the editor's spelling, ignoring case and surrounding whitespace.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_ascii_lowercase();
        Some(match normalized.split_whitespace().collect::<Vec<_>>().join(" ").as_str() {
            "null" => Self::Null,
            "not null" => Self::NotNull,
            "true" => Self::True,
            "not true" => Self::NotTrue,
            "false" => Self::False,
            "not false" => Self::NotFalse,
            "unknown" => Self::Unknown,
            "not unknown" => Self::NotUnknown,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Is(IsTarget),
    Value(SqlValue),
    /// `(a,b,c)`
    List(Vec<SqlValue>),
    /// `(a, b)`
    Row(Vec<SqlValue>),
    /// `((a, b), (c, d))`
    Rows(Vec<Vec<SqlValue>>),
}

impl Operand {
    fn write_sql(&self, out: &mut String) {
        match self {
            Self::Is(target) => out.push_str(target.as_str()),
            Self::Value(value) => value.write_sql(out),
            Self::List(values) => write_values(values, ",", out),
            Self::Row(values) => write_values(values, ", ", out),
            Self::Rows(rows) => {
                out.push('(');
                for (i, row) in rows.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_values(row, ", ", out);
                }
                out.push(')');
            }
        }
    }
}

fn write_values(values: &[SqlValue], sep: &str, out: &mut String) {
    out.push('(');
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        value.write_sql(out);
    }
    out.push(')');
}

fn write_idents(idents: &[Ident], sep: &str, out: &mut String) {
    for (i, ident) in idents.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        ident.write_sql(out);
    }
}

/// Left-hand side of a predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredicateTarget {
    /// `col` or `col::text` for pattern matching.
    Column { column: Ident, as_text: bool },
    /// `(a, b)`
    Row(Vec<Ident>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    pub target: PredicateTarget,
    pub operator: FilterOperator,
    pub operand: Operand,
}

impl Predicate {
    pub(crate) fn write_sql(&self, out: &mut String) {
        match &self.target {
            PredicateTarget::Column { column, as_text } => {
                column.write_sql(out);
                if *as_text {
                    out.push_str("::text");
                }
            }
            PredicateTarget::Row(columns) => {
                out.push('(');
                write_idents(columns, ", ", out);
                out.push(')');
            }
        }
        out.push(' ');
        out.push_str(self.operator.as_str());
        out.push(' ');
        self.operand.write_sql(out);
    }
}

/// Conjoined predicates. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause(Vec<Predicate>);

impl WhereClause {
    /// `None` when there is nothing to filter on.
    pub fn new(predicates: Vec<Predicate>) -> Option<Self> {
        (!predicates.is_empty()).then_some(Self(predicates))
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.0
    }

    fn write_sql(&self, out: &mut String) {
        for (i, predicate) in self.0.iter().enumerate() {
            out.push_str(if i == 0 { " where " } else { " and " });
            predicate.write_sql(out);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItem {
    pub table: Option<Ident>,
    pub column: Ident,
    pub ascending: bool,
    pub nulls_first: bool,
}

/// Sort items applied left to right. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderClause(Vec<OrderItem>);

impl OrderClause {
    pub fn new(items: Vec<OrderItem>) -> Option<Self> {
        (!items.is_empty()).then_some(Self(items))
    }

    fn write_sql(&self, out: &mut String) {
        out.push_str(" order by ");
        for (i, item) in self.0.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if let Some(table) = &item.table {
                table.write_sql(out);
                out.push('.');
            }
            item.column.write_sql(out);
            out.push_str(if item.ascending { " asc" } else { " desc" });
            out.push_str(if item.nulls_first {
                " nulls first"
            } else {
                " nulls last"
            });
        }
    }
}

/// `returning *[, col::text[]]`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Returning {
    pub enum_array_columns: Vec<Ident>,
}

impl Returning {
    fn write_sql(&self, out: &mut String) {
        out.push_str(" returning *");
        for column in &self.enum_array_columns {
            out.push_str(", ");
            column.write_sql(out);
            out.push_str("::text[]");
        }
    }
}

fn write_returning(returning: &Option<Returning>, out: &mut String) {
    if let Some(returning) = returning {
        returning.write_sql(out);
    }
}

fn write_where(where_clause: &Option<WhereClause>, out: &mut String) {
    if let Some(where_clause) = where_clause {
        where_clause.write_sql(out);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CountStatement {
    pub table: TableRef,
    pub where_clause: Option<WhereClause>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncateStatement {
    pub table: TableRef,
    pub cascade: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: TableRef,
    pub where_clause: WhereClause,
    pub returning: Option<Returning>,
}

/// `insert ... select ... from jsonb_populate_recordset(...)`
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: TableRef,
    /// Empty means `select *` without a column list.
    pub columns: Vec<Ident>,
    /// JSON array of row objects.
    pub rows: Value,
    pub returning: Option<Returning>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub table: TableRef,
    /// Projection, emitted verbatim.
    pub columns: String,
    pub where_clause: Option<WhereClause>,
    pub order: Option<OrderClause>,
    pub pagination: Option<Pagination>,
}

impl SelectStatement {
    fn write_sql(&self, out: &mut String) {
        out.push_str("select ");
        out.push_str(&self.columns);
        out.push_str(" from ");
        self.table.write_sql(out);
        write_where(&self.where_clause, out);
        if let Some(order) = &self.order {
            order.write_sql(out);
        }
        if let Some(page) = &self.pagination {
            out.push_str(" limit ");
            write_literal(&Value::from(page.limit), out);
            out.push_str(" offset ");
            write_literal(&Value::from(page.offset), out);
        }
    }
}

/// Element type an oversized array is cast to when it is cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayElement {
    Text,
    Json,
    Jsonb,
}

impl ArrayElement {
    fn array_type(self) -> &'static str {
        match self {
            Self::Text => "text[]",
            Self::Json => "json[]",
            Self::Jsonb => "jsonb[]",
        }
    }

    /// Marker appended to a one-dimensional array that was cut short.
    fn marker(self) -> &'static str {
        match self {
            Self::Text => "'...'",
            Self::Json | Self::Jsonb => r#"'{"truncated": true}'::json"#,
        }
    }
}

/// One output column of a table-rows listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowProjection {
    /// Emitted as is.
    Plain(Ident),
    /// Text cut to `max_characters` with a `...` suffix when its text form is
    /// longer than that.
    Text { column: Ident, max_characters: usize },
    /// Array cut to its first `max_elements` entries when its text form is
    /// longer than `max_characters`.
    Array {
        column: Ident,
        element: ArrayElement,
        max_characters: usize,
        max_elements: usize,
    },
}

impl RowProjection {
    fn write_sql(&self, out: &mut String) {
        match self {
            Self::Plain(column) => column.write_sql(out),
            Self::Text {
                column,
                max_characters,
            } => {
                let col = column.to_sql();
                out.push_str(&format!(
                    "case when octet_length({col}::text) > {max_characters} \
                     then left({col}::text, {max_characters}) || '...' \
                     else {col}::text end as {col}"
                ));
            }
            Self::Array {
                column,
                element,
                max_characters,
                max_elements,
            } => {
                let col = column.to_sql();
                let ty = element.array_type();
                let marker = element.marker();
                out.push_str(&format!(
                    "case when octet_length({col}::text) > {max_characters} \
                     then case when array_ndims({col}) = 1 \
                     then (select array_cat({col}[1:{max_elements}]::{ty}, array[{marker}]::{ty}))::{ty} \
                     else {col}[1:{max_elements}]::{ty} end \
                     else {col}::{ty} end as {col}"
                ));
            }
        }
    }
}

/// `with _base_query as (select * ...) select <projections> from _base_query`
///
/// The page is cut by the inner select so that truncation only runs over the
/// rows actually shown.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRowsStatement {
    pub base: SelectStatement,
    /// Empty means `*`.
    pub projections: Vec<RowProjection>,
}

impl TableRowsStatement {
    fn write_sql(&self, out: &mut String) {
        out.push_str("with _base_query as (");
        self.base.write_sql(out);
        out.push_str(") select ");
        if self.projections.is_empty() {
            out.push('*');
        }
        for (i, projection) in self.projections.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            projection.write_sql(out);
        }
        out.push_str(" from _base_query");
    }
}

/// `update ... set (cols) = (select cols from json_populate_record(...))`
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: TableRef,
    /// Never empty.
    pub columns: Vec<Ident>,
    /// JSON object of new values.
    pub value: Value,
    pub where_clause: WhereClause,
    pub returning: Option<Returning>,
}

/// One complete statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Count(CountStatement),
    Truncate(TruncateStatement),
    Delete(DeleteStatement),
    Insert(InsertStatement),
    Select(SelectStatement),
    Update(UpdateStatement),
    TableRows(TableRowsStatement),
}

impl Statement {
    /// Action keyword, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Count(_) => "count",
            Self::Truncate(_) => "truncate",
            Self::Delete(_) => "delete",
            Self::Insert(_) => "insert",
            Self::Select(_) => "select",
            Self::Update(_) => "update",
            Self::TableRows(_) => "table_rows",
        }
    }

    /// Render the statement, terminated with `;`.
    pub fn to_sql(&self) -> String {
        let mut out = String::with_capacity(128);
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        match self {
            Self::Count(s) => {
                out.push_str("select count(*) from ");
                s.table.write_sql(out);
                write_where(&s.where_clause, out);
            }
            Self::Truncate(s) => {
                out.push_str("truncate ");
                s.table.write_sql(out);
                if s.cascade {
                    out.push_str(" cascade");
                }
            }
            Self::Delete(s) => {
                out.push_str("delete from ");
                s.table.write_sql(out);
                s.where_clause.write_sql(out);
                write_returning(&s.returning, out);
            }
            Self::Insert(s) => {
                out.push_str("insert into ");
                s.table.write_sql(out);
                if s.columns.is_empty() {
                    out.push_str(" select *");
                } else {
                    out.push_str(" (");
                    write_idents(&s.columns, ",", out);
                    out.push_str(") select ");
                    write_idents(&s.columns, ",", out);
                }
                out.push_str(" from jsonb_populate_recordset(null::");
                s.table.write_sql(out);
                out.push_str(", ");
                write_literal(&Value::String(s.rows.to_string()), out);
                out.push(')');
                write_returning(&s.returning, out);
            }
            Self::Select(s) => s.write_sql(out),
            Self::TableRows(s) => s.write_sql(out),
            Self::Update(s) => {
                out.push_str("update ");
                s.table.write_sql(out);
                out.push_str(" set (");
                write_idents(&s.columns, ",", out);
                out.push_str(") = (select ");
                write_idents(&s.columns, ",", out);
                out.push_str(" from json_populate_record(null::");
                s.table.write_sql(out);
                out.push_str(", ");
                write_literal(&Value::String(s.value.to_string()), out);
                out.push_str("))");
                s.where_clause.write_sql(out);
                write_returning(&s.returning, out);
            }
        }
        out.push(';');
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql())
    }
}
