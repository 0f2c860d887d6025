//! Editor-facing descriptors: tables, filters, sorts and pagination.
//!
//! These types (de)serialize in the same JSON shape the table editor keeps in
//! its URL state, e.g. `{"column":"id","operator":"=","value":1}`.

use crate::error::QueryError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A schema-qualified table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTable {
    pub schema: String,
    pub name: String,
}

impl QueryTable {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// A table in the `public` schema.
    pub fn public(name: impl Into<String>) -> Self {
        Self::new("public", name)
    }
}

/// Comparison operator of a [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterOperator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<>")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<=")]
    Lte,
    /// LIKE
    #[serde(rename = "~~")]
    Like,
    /// ILIKE
    #[serde(rename = "~~*")]
    Ilike,
    /// NOT LIKE
    #[serde(rename = "!~~")]
    NotLike,
    /// NOT ILIKE
    #[serde(rename = "!~~*")]
    NotIlike,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "is")]
    Is,
}

impl FilterOperator {
    /// SQL spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Lt => "<",
            Self::Gte => ">=",
            Self::Lte => "<=",
            Self::Like => "~~",
            Self::Ilike => "~~*",
            Self::NotLike => "!~~",
            Self::NotIlike => "!~~*",
            Self::In => "in",
            Self::Is => "is",
        }
    }

    /// Pattern operators compare the column's text representation.
    pub fn is_pattern(self) -> bool {
        matches!(
            self,
            Self::Like | Self::Ilike | Self::NotLike | Self::NotIlike
        )
    }

    /// Whether the operator can compare a row of columns.
    pub fn allows_tuple(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Gt | Self::Lt | Self::Gte | Self::Lte | Self::In
        )
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "=" => Self::Eq,
            "<>" => Self::Ne,
            ">" => Self::Gt,
            "<" => Self::Lt,
            ">=" => Self::Gte,
            "<=" => Self::Lte,
            "~~" => Self::Like,
            "~~*" => Self::Ilike,
            "!~~" => Self::NotLike,
            "!~~*" => Self::NotIlike,
            "in" => Self::In,
            "is" => Self::Is,
            other => {
                return Err(QueryError::invalid_filter(format!(
                    "Unknown filter operator: {other}"
                )));
            }
        })
    }
}

/// Left-hand side of a [`Filter`]: one column or a row of columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterColumn {
    Single(String),
    Tuple(Vec<String>),
}

impl From<&str> for FilterColumn {
    fn from(column: &str) -> Self {
        Self::Single(column.to_string())
    }
}

impl From<String> for FilterColumn {
    fn from(column: String) -> Self {
        Self::Single(column)
    }
}

impl From<Vec<String>> for FilterColumn {
    fn from(columns: Vec<String>) -> Self {
        Self::Tuple(columns)
    }
}

impl From<&[&str]> for FilterColumn {
    fn from(columns: &[&str]) -> Self {
        Self::Tuple(columns.iter().map(|c| c.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FilterColumn {
    fn from(columns: [&str; N]) -> Self {
        Self::Tuple(columns.iter().map(|c| c.to_string()).collect())
    }
}

/// A single `column operator value` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub column: FilterColumn,
    pub operator: FilterOperator,
    pub value: Value,
}

impl Filter {
    pub fn new(
        column: impl Into<FilterColumn>,
        operator: FilterOperator,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    /// Equality filter, as produced by `match_all`.
    pub fn eq(column: impl Into<FilterColumn>, value: impl Into<Value>) -> Self {
        Self::new(column, FilterOperator::Eq, value)
    }
}

fn default_ascending() -> bool {
    true
}

/// One `order by` item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    /// Optional table qualifier (`table.column`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    pub column: String,
    #[serde(default = "default_ascending")]
    pub ascending: bool,
    #[serde(default)]
    pub nulls_first: bool,
}

impl Sort {
    pub fn new(column: impl Into<String>, ascending: bool, nulls_first: bool) -> Self {
        Self {
            table: None,
            column: column.into(),
            ascending,
            nulls_first,
        }
    }

    /// Sort qualified by a table name.
    pub fn on(
        table: impl Into<String>,
        column: impl Into<String>,
        ascending: bool,
        nulls_first: bool,
    ) -> Self {
        Self {
            table: Some(table.into()),
            ..Self::new(column, ascending, nulls_first)
        }
    }

    /// Ascending, nulls last.
    pub fn asc(column: impl Into<String>) -> Self {
        Self::new(column, true, false)
    }

    /// Descending, nulls last.
    pub fn desc(column: impl Into<String>) -> Self {
        Self::new(column, false, false)
    }
}

/// Row window of a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub offset: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn new(offset: i64, limit: i64) -> Self {
        Self { offset, limit }
    }

    /// Window for the inclusive row range `from..=to`.
    ///
    /// `to < from - 1` yields a negative limit; it is passed through as is.
    /// Ranges wider than `i64::MAX` rows saturate at `i64::MAX`.
    pub fn from_range(from: i64, to: i64) -> Self {
        Self {
            offset: from,
            limit: to.saturating_sub(from).saturating_add(1),
        }
    }

    /// Window for 1-based page `page` of `limit` rows. Pages below 1 are
    /// treated as the first page.
    pub fn from_page(page: i64, limit: i64) -> Self {
        Self {
            offset: page.saturating_sub(1).max(0).saturating_mul(limit),
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operator_round_trips_through_str() {
        for op in [
            FilterOperator::Eq,
            FilterOperator::Ne,
            FilterOperator::Like,
            FilterOperator::NotIlike,
            FilterOperator::In,
            FilterOperator::Is,
        ] {
            assert_eq!(op.as_str().parse::<FilterOperator>().unwrap(), op);
        }
        assert!("==".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn filter_deserializes_editor_shape() {
        let filter: Filter =
            serde_json::from_value(json!({"column": "id", "operator": ">=", "value": 10}))
                .unwrap();
        assert_eq!(filter, Filter::new("id", FilterOperator::Gte, 10));

        let tuple: Filter = serde_json::from_value(
            json!({"column": ["id", "version"], "operator": "=", "value": [1, 2]}),
        )
        .unwrap();
        assert_eq!(
            tuple.column,
            FilterColumn::Tuple(vec!["id".into(), "version".into()])
        );
    }

    #[test]
    fn sort_deserializes_with_defaults() {
        let sort: Sort = serde_json::from_value(json!({"column": "name"})).unwrap();
        assert_eq!(sort, Sort::asc("name"));

        let sort: Sort = serde_json::from_value(
            json!({"table": "users", "column": "name", "ascending": false, "nullsFirst": true}),
        )
        .unwrap();
        assert_eq!(sort, Sort::on("users", "name", false, true));
    }

    #[test]
    fn pagination_from_inclusive_range() {
        assert_eq!(Pagination::from_range(5, 14), Pagination::new(5, 10));
        assert_eq!(Pagination::from_range(0, 0).limit, 1);
        assert_eq!(Pagination::from_range(3, 0).limit, -2);
    }

    #[test]
    fn pagination_from_page() {
        assert_eq!(Pagination::from_page(1, 10), Pagination::new(0, 10));
        assert_eq!(Pagination::from_page(2, 5), Pagination::new(5, 5));
        assert_eq!(Pagination::from_page(0, 5), Pagination::new(0, 5));
        assert_eq!(Pagination::from_page(i64::MAX, 100).offset, i64::MAX);
    }

    #[test]
    fn pagination_saturates_open_ended_ranges() {
        assert_eq!(
            Pagination::from_range(0, i64::MAX),
            Pagination::new(0, i64::MAX)
        );
        assert_eq!(
            Pagination::from_range(i64::MIN, 0),
            Pagination::new(i64::MIN, i64::MAX)
        );
        assert_eq!(
            Pagination::from_range(i64::MAX, i64::MIN).limit,
            i64::MIN + 1
        );
    }
}
