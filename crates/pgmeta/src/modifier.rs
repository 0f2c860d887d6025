//! Accumulated query state and its hand-off to the assembler.

use crate::assemble::{self, JsonRow};
use crate::error::{QueryError, QueryResult};
use crate::options::{
    CountOptions, DeleteOptions, InsertOptions, ReturningOptions, SelectOptions, TruncateOptions,
    UpdateOptions,
};
use crate::statement::Statement;
use crate::trace::StatementLog;
use crate::types::{Filter, Pagination, QueryTable, Sort};

/// What a builder will emit, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Count,
    /// Projection emitted verbatim; `None` selects `*`.
    Select { columns: Option<String> },
    Insert {
        rows: Vec<JsonRow>,
        options: InsertOptions,
    },
    Update {
        value: JsonRow,
        returning: ReturningOptions,
    },
    Delete { options: DeleteOptions },
    Truncate { options: TruncateOptions },
}

impl Action {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Count => "count",
            Self::Select { .. } => "select",
            Self::Insert { .. } => "insert",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Truncate { .. } => "truncate",
        }
    }
}

/// Filters, sorts and pagination bound to one table and action.
///
/// Nothing is cached: [`to_sql`](Self::to_sql) renders from the current state
/// every time, so two calls on an unmodified builder return the same text.
/// Sorts and pagination only affect `select`; other actions ignore them.
#[derive(Debug, Clone)]
pub struct QueryModifier {
    table: QueryTable,
    action: Action,
    filters: Vec<Filter>,
    sorts: Vec<Sort>,
    pagination: Option<Pagination>,
    log: StatementLog,
    /// Payload conversion error, reported by `to_sql`.
    build_error: Option<String>,
}

impl QueryModifier {
    pub fn new(table: QueryTable, action: Action) -> Self {
        Self {
            table,
            action,
            filters: Vec::new(),
            sorts: Vec::new(),
            pagination: None,
            log: StatementLog::default(),
            build_error: None,
        }
    }

    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_sorts(mut self, sorts: Vec<Sort>) -> Self {
        self.sorts = sorts;
        self
    }

    /// Override how rendered statements are logged.
    pub fn with_log(mut self, log: StatementLog) -> Self {
        self.log = log;
        self
    }

    pub(crate) fn with_build_error(mut self, build_error: Option<String>) -> Self {
        self.build_error = build_error;
        self
    }

    /// Limit to the inclusive row range `from..=to`.
    pub fn range(mut self, from: i64, to: i64) -> Self {
        self.pagination = Some(Pagination::from_range(from, to));
        self
    }

    pub fn table(&self) -> &QueryTable {
        &self.table
    }

    pub fn action(&self) -> &Action {
        &self.action
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn sorts(&self) -> &[Sort] {
        &self.sorts
    }

    pub fn pagination(&self) -> Option<Pagination> {
        self.pagination
    }

    pub(crate) fn push_filter(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub(crate) fn push_sort(&mut self, sort: Sort) {
        self.sorts.push(sort);
    }

    pub(crate) fn set_log(&mut self, log: StatementLog) {
        self.log = log;
    }

    /// Lower the accumulated state into a statement.
    pub fn statement(&self) -> QueryResult<Statement> {
        if let Some(message) = &self.build_error {
            return Err(QueryError::InvalidPayload(message.clone()));
        }
        let filters = self.filters.clone();
        match &self.action {
            Action::Count => {
                assemble::count_statement(&self.table, &CountOptions::new().with_filters(filters))
            }
            Action::Select { columns } => {
                let options = SelectOptions {
                    filters,
                    sorts: self.sorts.clone(),
                    pagination: self.pagination,
                };
                assemble::select_statement(&self.table, columns.as_deref(), &options)
            }
            Action::Insert { rows, options } => {
                assemble::insert_statement(&self.table, rows, options)
            }
            Action::Update { value, returning } => {
                let options = UpdateOptions {
                    filters,
                    returning: returning.clone(),
                };
                assemble::update_statement(&self.table, value, &options)
            }
            Action::Delete { options } => {
                assemble::delete_statement(&self.table, &filters, options)
            }
            Action::Truncate { options } => assemble::truncate_statement(&self.table, options),
        }
    }

    /// Render the statement. Assembler errors are returned unchanged.
    pub fn to_sql(&self) -> QueryResult<String> {
        match self.statement() {
            Ok(statement) => {
                let sql = statement.to_sql();
                self.log.statement(statement.kind(), &sql);
                Ok(sql)
            }
            Err(err) => {
                self.log.rejected(self.action.kind(), &err);
                Err(err)
            }
        }
    }
}
