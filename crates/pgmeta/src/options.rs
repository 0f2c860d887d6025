//! Per-action options.
//!
//! Every field has a documented default and every struct is `Default`, so a
//! caller only spells out what differs from a plain statement.

use crate::types::{Filter, Pagination, Sort};
use serde::{Deserialize, Serialize};

/// Options for `select count(*)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountOptions {
    /// Conditions, conjoined in order. Default: none.
    #[serde(default)]
    pub filters: Vec<Filter>,
}

impl CountOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }
}

/// Options for `select`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectOptions {
    /// Conditions, conjoined in order. Default: none.
    #[serde(default)]
    pub filters: Vec<Filter>,
    /// Sort items, applied left to right. Default: none.
    #[serde(default)]
    pub sorts: Vec<Sort>,
    /// Row window. Default: all rows.
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl SelectOptions {
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

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = Some(pagination);
        self
    }
}

/// Options shared by the mutating actions' `returning` clause.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturningOptions {
    /// Append `returning *`. Default: `false`.
    #[serde(default)]
    pub returning: bool,
    /// Enum-array columns to return as `text[]` as well. Only used with
    /// `returning`. Default: none.
    #[serde(default)]
    pub enum_array_columns: Vec<String>,
}

/// Options for `delete`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOptions {
    #[serde(flatten)]
    pub returning: ReturningOptions,
}

impl DeleteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `returning *`.
    pub fn returning(mut self) -> Self {
        self.returning.returning = true;
        self
    }

    /// Return the given enum-array columns cast to `text[]`.
    pub fn with_enum_array_columns(mut self, columns: &[&str]) -> Self {
        self.returning.enum_array_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }
}

/// Options for `insert`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertOptions {
    #[serde(flatten)]
    pub returning: ReturningOptions,
}

impl InsertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `returning *`.
    pub fn returning(mut self) -> Self {
        self.returning.returning = true;
        self
    }

    /// Return the given enum-array columns cast to `text[]`.
    pub fn with_enum_array_columns(mut self, columns: &[&str]) -> Self {
        self.returning.enum_array_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }
}

/// Options for `update`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateOptions {
    /// Conditions, conjoined in order. At least one is required.
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(flatten)]
    pub returning: ReturningOptions,
}

impl UpdateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filters(mut self, filters: Vec<Filter>) -> Self {
        self.filters = filters;
        self
    }

    /// Append `returning *`.
    pub fn returning(mut self) -> Self {
        self.returning.returning = true;
        self
    }

    /// Return the given enum-array columns cast to `text[]`.
    pub fn with_enum_array_columns(mut self, columns: &[&str]) -> Self {
        self.returning.enum_array_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }
}

/// Options for `truncate`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncateOptions {
    /// Also truncate tables referencing this one. Default: `false`.
    #[serde(default)]
    pub cascade: bool,
}

impl TruncateOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cascade(mut self) -> Self {
        self.cascade = true;
        self
    }
}
