//! Chainable filter/sort builder.

use crate::error::QueryResult;
use crate::modifier::{Action, QueryModifier};
use crate::statement::Statement;
use crate::trace::StatementLog;
use crate::types::{Filter, FilterColumn, FilterOperator, QueryTable, Sort};
use serde_json::Value;

/// Builder returned by the action methods of [`TableQuery`](crate::TableQuery).
///
/// Calls may come in any order; nothing is rejected until
/// [`to_sql`](Self::to_sql). Sorts on a non-select builder are accepted and
/// ignored.
///
/// # Example
/// ```
/// use pgmeta::FilterOperator;
///
/// let sql = pgmeta::table("public", "users")
///     .select("id, name")
///     .filter("id", FilterOperator::Gt, 10)
///     .order("name", true, false)
///     .range(0, 9)
///     .to_sql()?;
/// assert_eq!(
///     sql,
///     "select id, name from public.users where id > 10 order by name asc nulls last limit 10 offset 0;"
/// );
/// # Ok::<(), pgmeta::QueryError>(())
/// ```
#[derive(Debug, Clone)]
pub struct QueryFilter {
    inner: QueryModifier,
}

impl QueryFilter {
    pub fn new(table: QueryTable, action: Action) -> Self {
        Self {
            inner: QueryModifier::new(table, action),
        }
    }

    pub(crate) fn from_modifier(inner: QueryModifier) -> Self {
        Self { inner }
    }

    /// Add `column operator value`.
    pub fn filter(
        mut self,
        column: impl Into<FilterColumn>,
        operator: FilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        self.inner.push_filter(Filter::new(column, operator, value));
        self
    }

    /// Add a row comparison, e.g. `(id, version) > (1, 2)`.
    pub fn filter_tuple(
        mut self,
        columns: &[&str],
        operator: FilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        self.inner.push_filter(Filter::new(columns, operator, value));
        self
    }

    /// Add an equality filter for every `(column, value)` pair, in order.
    ///
    /// This is `match` in the editor's vocabulary.
    pub fn match_all<K, V>(mut self, criteria: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        for (column, value) in criteria {
            let column: String = column.into();
            self.inner.push_filter(Filter::eq(column, value));
        }
        self
    }

    /// Add a pre-built filter.
    pub fn and_filter(mut self, filter: Filter) -> Self {
        self.inner.push_filter(filter);
        self
    }

    /// Sort by `column`.
    pub fn order(mut self, column: &str, ascending: bool, nulls_first: bool) -> Self {
        self.inner.push_sort(Sort::new(column, ascending, nulls_first));
        self
    }

    /// Sort by `table.column`.
    pub fn order_on(mut self, table: &str, column: &str, ascending: bool, nulls_first: bool) -> Self {
        self.inner
            .push_sort(Sort::on(table, column, ascending, nulls_first));
        self
    }

    /// Add a pre-built sort.
    pub fn and_sort(mut self, sort: Sort) -> Self {
        self.inner.push_sort(sort);
        self
    }

    /// Override how rendered statements are logged.
    pub fn with_log(mut self, log: StatementLog) -> Self {
        self.inner.set_log(log);
        self
    }

    /// Limit to the inclusive row range `from..=to`.
    pub fn range(self, from: i64, to: i64) -> QueryModifier {
        self.inner.range(from, to)
    }

    pub fn filters(&self) -> &[Filter] {
        self.inner.filters()
    }

    pub fn sorts(&self) -> &[Sort] {
        self.inner.sorts()
    }

    pub fn action(&self) -> &Action {
        self.inner.action()
    }

    pub fn statement(&self) -> QueryResult<Statement> {
        self.inner.statement()
    }

    pub fn to_sql(&self) -> QueryResult<String> {
        self.inner.to_sql()
    }

    /// Finish chaining without pagination.
    pub fn into_modifier(self) -> QueryModifier {
        self.inner
    }
}
