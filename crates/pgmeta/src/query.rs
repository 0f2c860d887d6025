//! Entry point: pick a table, then an action.

use crate::assemble::JsonRow;
use crate::filter::QueryFilter;
use crate::modifier::{Action, QueryModifier};
use crate::options::{DeleteOptions, InsertOptions, TruncateOptions, UpdateOptions};
use crate::trace::StatementLog;
use crate::types::QueryTable;
use serde::Serialize;
use serde_json::Value;

/// Start building a statement against `schema.name`.
///
/// # Example
/// ```
/// let sql = pgmeta::table("public", "users").count().to_sql()?;
/// assert_eq!(sql, "select count(*) from public.users;");
/// # Ok::<(), pgmeta::QueryError>(())
/// ```
pub fn table(schema: &str, name: &str) -> TableQuery {
    TableQuery::new(QueryTable::new(schema, name))
}

/// Start building a statement against `public.name`.
pub fn public_table(name: &str) -> TableQuery {
    TableQuery::new(QueryTable::public(name))
}

/// A table awaiting its action.
#[derive(Debug, Clone)]
pub struct TableQuery {
    table: QueryTable,
    log: StatementLog,
}

impl TableQuery {
    pub fn new(table: QueryTable) -> Self {
        Self {
            table,
            log: StatementLog::default(),
        }
    }

    pub fn table(&self) -> &QueryTable {
        &self.table
    }

    /// Override how statements built from this table are logged.
    pub fn with_log(mut self, log: StatementLog) -> Self {
        self.log = log;
        self
    }

    fn start(self, action: Action) -> QueryFilter {
        QueryFilter::new(self.table, action).with_log(self.log)
    }

    /// `select count(*)`
    pub fn count(self) -> QueryFilter {
        self.start(Action::Count)
    }

    /// `select <columns>`; the projection is emitted verbatim.
    pub fn select(self, columns: &str) -> QueryFilter {
        self.start(Action::Select {
            columns: Some(columns.to_string()),
        })
    }

    /// Insert `rows`. Each row must serialize to a JSON object; the column
    /// list is taken from the first row.
    pub fn insert<T: Serialize>(self, rows: &[T], options: InsertOptions) -> QueryFilter {
        let (rows, build_error) = match rows.iter().map(to_json_row).collect::<Result<Vec<_>, _>>() {
            Ok(rows) => (rows, None),
            Err(message) => (Vec::new(), Some(message)),
        };
        self.start_with_error(Action::Insert { rows, options }, build_error)
    }

    /// Update matching rows with the fields of `value`. Filters in `options`
    /// come before any chained ones.
    pub fn update<T: Serialize>(self, value: &T, options: UpdateOptions) -> QueryFilter {
        let (value, build_error) = match to_json_row(value) {
            Ok(value) => (value, None),
            Err(message) => (JsonRow::new(), Some(message)),
        };
        let UpdateOptions { filters, returning } = options;
        let modifier = QueryModifier::new(self.table, Action::Update { value, returning })
            .with_filters(filters)
            .with_log(self.log)
            .with_build_error(build_error);
        QueryFilter::from_modifier(modifier)
    }

    /// `delete from`; at least one filter must be chained before `to_sql`.
    pub fn delete(self, options: DeleteOptions) -> QueryFilter {
        self.start(Action::Delete { options })
    }

    /// `truncate`
    pub fn truncate(self, options: TruncateOptions) -> QueryFilter {
        self.start(Action::Truncate { options })
    }

    fn start_with_error(self, action: Action, build_error: Option<String>) -> QueryFilter {
        let modifier = QueryModifier::new(self.table, action)
            .with_log(self.log)
            .with_build_error(build_error);
        QueryFilter::from_modifier(modifier)
    }
}

fn to_json_row<T: Serialize>(value: &T) -> Result<JsonRow, String> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {other}")),
        Err(err) => Err(err.to_string()),
    }
}
