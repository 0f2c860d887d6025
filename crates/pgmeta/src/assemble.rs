//! Statement assembler.
//!
//! One function per action. Each validates its input, lowers it into a
//! [`Statement`] and renders that with a trailing `;`. Validation always
//! completes before any text is produced.
//!
//! # Example
//! ```
//! use pgmeta::assemble::select_query;
//! use pgmeta::{Filter, FilterOperator, QueryTable, SelectOptions};
//!
//! let sql = select_query(
//!     &QueryTable::public("users"),
//!     None,
//!     &SelectOptions::new().with_filters(vec![Filter::new("id", FilterOperator::Eq, 5)]),
//! )?;
//! assert_eq!(sql, "select * from public.users where id = 5;");
//! # Ok::<(), pgmeta::QueryError>(())
//! ```

use crate::error::{QueryError, QueryResult};
use crate::format::Ident;
use crate::options::{
    CountOptions, DeleteOptions, InsertOptions, ReturningOptions, SelectOptions, TruncateOptions,
    UpdateOptions,
};
use crate::statement::{
    CountStatement, DeleteStatement, InsertStatement, IsTarget, Operand, OrderClause, OrderItem,
    Predicate, PredicateTarget, Returning, SelectStatement, SqlValue, Statement, TableRef,
    TruncateStatement, UpdateStatement, WhereClause,
};
use crate::types::{Filter, FilterColumn, FilterOperator, QueryTable, Sort};
use serde_json::{Map, Value};

/// One row of column values, keyed by column name in column order.
pub type JsonRow = Map<String, Value>;

/// `select count(*) from <table>[ where ...];`
pub fn count_query(table: &QueryTable, options: &CountOptions) -> QueryResult<String> {
    Ok(count_statement(table, options)?.to_sql())
}

pub fn count_statement(table: &QueryTable, options: &CountOptions) -> QueryResult<Statement> {
    Ok(Statement::Count(CountStatement {
        table: table_ref(table)?,
        where_clause: compile_filters(&options.filters)?,
    }))
}

/// `truncate <table>[ cascade];`
pub fn truncate_query(table: &QueryTable, options: &TruncateOptions) -> QueryResult<String> {
    Ok(truncate_statement(table, options)?.to_sql())
}

pub fn truncate_statement(table: &QueryTable, options: &TruncateOptions) -> QueryResult<Statement> {
    Ok(Statement::Truncate(TruncateStatement {
        table: table_ref(table)?,
        cascade: options.cascade,
    }))
}

/// `delete from <table> where ...[ returning ...];`
///
/// Fails with [`QueryError::MissingFilter`] when `filters` is empty.
pub fn delete_query(
    table: &QueryTable,
    filters: &[Filter],
    options: &DeleteOptions,
) -> QueryResult<String> {
    Ok(delete_statement(table, filters, options)?.to_sql())
}

pub fn delete_statement(
    table: &QueryTable,
    filters: &[Filter],
    options: &DeleteOptions,
) -> QueryResult<Statement> {
    let where_clause =
        compile_filters(filters)?.ok_or_else(|| QueryError::missing_filter("delete"))?;
    Ok(Statement::Delete(DeleteStatement {
        table: table_ref(table)?,
        where_clause,
        returning: compile_returning(&options.returning)?,
    }))
}

/// `insert into <table> (cols) select cols from jsonb_populate_recordset(...)`
///
/// The column list is taken from the first row. Values are not formatted one
/// by one: the rows travel as a single JSON literal and the database coerces
/// them to the table's column types. Fails with
/// [`QueryError::MissingPayload`] when `rows` is empty.
pub fn insert_query(
    table: &QueryTable,
    rows: &[JsonRow],
    options: &InsertOptions,
) -> QueryResult<String> {
    Ok(insert_statement(table, rows, options)?.to_sql())
}

pub fn insert_statement(
    table: &QueryTable,
    rows: &[JsonRow],
    options: &InsertOptions,
) -> QueryResult<Statement> {
    let first = rows
        .first()
        .ok_or_else(|| QueryError::missing_payload("insert"))?;
    let columns = first.keys().map(Ident::new).collect::<QueryResult<Vec<_>>>()?;
    Ok(Statement::Insert(InsertStatement {
        table: table_ref(table)?,
        columns,
        rows: Value::Array(rows.iter().cloned().map(Value::Object).collect()),
        returning: compile_returning(&options.returning)?,
    }))
}

/// `select <columns> from <table>[ where ...][ order by ...][ limit n offset m];`
///
/// `columns` is emitted verbatim; `None` or a blank string selects `*`.
pub fn select_query(
    table: &QueryTable,
    columns: Option<&str>,
    options: &SelectOptions,
) -> QueryResult<String> {
    Ok(select_statement(table, columns, options)?.to_sql())
}

pub fn select_statement(
    table: &QueryTable,
    columns: Option<&str>,
    options: &SelectOptions,
) -> QueryResult<Statement> {
    let columns = match columns.map(str::trim) {
        Some(cols) if !cols.is_empty() => cols.to_string(),
        _ => "*".to_string(),
    };
    Ok(Statement::Select(SelectStatement {
        table: table_ref(table)?,
        columns,
        where_clause: compile_filters(&options.filters)?,
        order: compile_sorts(&options.sorts)?,
        pagination: options.pagination,
    }))
}

/// `update <table> set (cols) = (select cols from json_populate_record(...)) where ...;`
///
/// Fails with [`QueryError::MissingFilter`] when there are no filters and
/// with [`QueryError::MissingPayload`] when `value` has no columns.
pub fn update_query(
    table: &QueryTable,
    value: &JsonRow,
    options: &UpdateOptions,
) -> QueryResult<String> {
    Ok(update_statement(table, value, options)?.to_sql())
}

pub fn update_statement(
    table: &QueryTable,
    value: &JsonRow,
    options: &UpdateOptions,
) -> QueryResult<Statement> {
    let where_clause =
        compile_filters(&options.filters)?.ok_or_else(|| QueryError::missing_filter("update"))?;
    if value.is_empty() {
        return Err(QueryError::missing_payload("update"));
    }
    let columns = value.keys().map(Ident::new).collect::<QueryResult<Vec<_>>>()?;
    Ok(Statement::Update(UpdateStatement {
        table: table_ref(table)?,
        columns,
        value: Value::Object(value.clone()),
        where_clause,
        returning: compile_returning(&options.returning)?,
    }))
}

pub(crate) fn table_ref(table: &QueryTable) -> QueryResult<TableRef> {
    Ok(TableRef {
        schema: Ident::new(table.schema.as_str())?,
        name: Ident::new(table.name.as_str())?,
    })
}

fn compile_returning(options: &ReturningOptions) -> QueryResult<Option<Returning>> {
    if !options.returning {
        return Ok(None);
    }
    let enum_array_columns = options
        .enum_array_columns
        .iter()
        .map(|c| Ident::new(c.as_str()))
        .collect::<QueryResult<Vec<_>>>()?;
    Ok(Some(Returning { enum_array_columns }))
}

/// Lower filters into a where clause; `None` when there are none.
pub(crate) fn compile_filters(filters: &[Filter]) -> QueryResult<Option<WhereClause>> {
    let predicates = filters
        .iter()
        .map(compile_filter)
        .collect::<QueryResult<Vec<_>>>()?;
    Ok(WhereClause::new(predicates))
}

fn compile_filter(filter: &Filter) -> QueryResult<Predicate> {
    let op = filter.operator;
    match &filter.column {
        FilterColumn::Single(column) => {
            let column = Ident::new(column.as_str())?;
            let operand = match op {
                FilterOperator::Is => Operand::Is(is_target(&filter.value)?),
                FilterOperator::In => Operand::List(in_list(&filter.value)?),
                _ => Operand::Value(filter_value(&filter.value)),
            };
            Ok(Predicate {
                target: PredicateTarget::Column {
                    column,
                    as_text: op.is_pattern(),
                },
                operator: op,
                operand,
            })
        }
        FilterColumn::Tuple(columns) => {
            if columns.is_empty() {
                return Err(QueryError::invalid_filter(
                    "Tuple filter requires at least one column",
                ));
            }
            if !op.allows_tuple() {
                return Err(QueryError::invalid_filter(format!(
                    "Operator {op} is not supported for tuple filters"
                )));
            }
            let idents = columns
                .iter()
                .map(|c| Ident::new(c.as_str()))
                .collect::<QueryResult<Vec<_>>>()?;
            let arity = idents.len();
            let operand = if op == FilterOperator::In {
                let Value::Array(members) = &filter.value else {
                    return Err(QueryError::invalid_filter("Tuple filter value must be an array"));
                };
                if members.is_empty() {
                    return Err(QueryError::invalid_filter(
                        "in filter requires at least one value",
                    ));
                }
                let rows = members
                    .iter()
                    .map(|member| tuple_row(member, arity))
                    .collect::<QueryResult<Vec<_>>>()?;
                Operand::Rows(rows)
            } else {
                Operand::Row(tuple_row(&filter.value, arity)?)
            };
            Ok(Predicate {
                target: PredicateTarget::Row(idents),
                operator: op,
                operand,
            })
        }
    }
}

/// One row of a tuple comparison: a JSON array, or a comma separated string.
fn tuple_row(value: &Value, arity: usize) -> QueryResult<Vec<SqlValue>> {
    let row: Vec<SqlValue> = match value {
        Value::Array(items) => items.iter().map(filter_value).collect(),
        Value::String(s) => split_list(s),
        _ => return Err(QueryError::invalid_filter("Tuple filter value must be an array")),
    };
    if row.len() != arity {
        return Err(QueryError::invalid_filter(
            "Tuple filter value must have the same length as the column array",
        ));
    }
    Ok(row)
}

fn in_list(value: &Value) -> QueryResult<Vec<SqlValue>> {
    let list = match value {
        Value::Array(items) => items.iter().map(filter_value).collect(),
        Value::String(s) => split_list(s),
        other => vec![filter_value(other)],
    };
    if list.is_empty() {
        return Err(QueryError::invalid_filter(
            "in filter requires at least one value",
        ));
    }
    Ok(list)
}

fn split_list(s: &str) -> Vec<SqlValue> {
    if s.trim().is_empty() {
        return Vec::new();
    }
    s.split(',')
        .map(|item| SqlValue::Text(item.trim().to_string()))
        .collect()
}

fn is_target(value: &Value) -> QueryResult<IsTarget> {
    match value {
        Value::Null => Ok(IsTarget::Null),
        Value::Bool(true) => Ok(IsTarget::True),
        Value::Bool(false) => Ok(IsTarget::False),
        Value::String(s) => IsTarget::parse(s).ok_or_else(|| {
            QueryError::invalid_filter(format!("Invalid value for is filter: {s}"))
        }),
        other => Err(QueryError::invalid_filter(format!(
            "Invalid value for is filter: {other}"
        ))),
    }
}

/// Classify a filter value. Numbers and booleans render bare; strings are
/// escaped.
///
/// A string starting with `ARRAY[` is the exception: it is emitted verbatim as
/// an array constructor and does not go through [`literal`](crate::literal).
/// Only pass such values from trusted code, never from unvalidated URL state.
fn filter_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Bool(*b),
        Value::Number(n) => SqlValue::Number(n.clone()),
        Value::String(s) if s.starts_with("ARRAY[") => SqlValue::ArrayExpr(s.clone()),
        Value::String(s) => SqlValue::Text(s.clone()),
        Value::Array(_) | Value::Object(_) => SqlValue::Text(value.to_string()),
    }
}

/// Lower sorts into an order clause, skipping sorts without a column.
pub(crate) fn compile_sorts(sorts: &[Sort]) -> QueryResult<Option<OrderClause>> {
    let mut items = Vec::with_capacity(sorts.len());
    for sort in sorts.iter().filter(|s| !s.column.is_empty()) {
        let table = match sort.table.as_deref() {
            Some(t) if !t.is_empty() => Some(Ident::new(t)?),
            _ => None,
        };
        items.push(OrderItem {
            table,
            column: Ident::new(sort.column.as_str())?,
            ascending: sort.ascending,
            nulls_first: sort.nulls_first,
        });
    }
    Ok(OrderClause::new(items))
}

#[cfg(test)]
mod tests;
