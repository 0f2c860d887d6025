//! Identifier quoting and literal escaping.
//!
//! Every name and value that ends up in a statement goes through one of the
//! two helpers in this module:
//!
//! - [`ident`] renders a schema/table/column name. Names made of lowercase
//!   letters, digits, `_` and `$` (not starting with a digit or `$`) that are
//!   not keywords PostgreSQL requires quoting for are emitted bare; anything
//!   else is wrapped in `"` with embedded `"` doubled.
//! - [`literal`] renders a JSON value as a SQL constant. Strings are single
//!   quoted with `'` doubled; a string containing `\` gets an `E` prefix and
//!   its backslashes doubled.
//!
//! # Example
//! ```
//! use pgmeta::format::{ident, literal};
//! use serde_json::json;
//!
//! assert_eq!(ident("users").unwrap(), "users");
//! assert_eq!(ident("camelCase").unwrap(), r#""camelCase""#);
//! assert_eq!(literal(&json!("O'Reilly")), "'O''Reilly'");
//! ```

use crate::error::{QueryError, QueryResult};
use serde_json::Value;

/// Keywords PostgreSQL only accepts as quoted names: reserved, type/function
/// name and column name keywords. Kept sorted for binary search.
const RESERVED_KEYWORDS: &[&str] = &[
    "all",
    "analyse",
    "analyze",
    "and",
    "any",
    "array",
    "as",
    "asc",
    "asymmetric",
    "authorization",
    "between",
    "bigint",
    "binary",
    "bit",
    "boolean",
    "both",
    "case",
    "cast",
    "char",
    "character",
    "check",
    "coalesce",
    "collate",
    "collation",
    "column",
    "concurrently",
    "constraint",
    "create",
    "cross",
    "current_catalog",
    "current_date",
    "current_role",
    "current_schema",
    "current_time",
    "current_timestamp",
    "current_user",
    "dec",
    "decimal",
    "default",
    "deferrable",
    "desc",
    "distinct",
    "do",
    "else",
    "end",
    "except",
    "exists",
    "extract",
    "false",
    "fetch",
    "float",
    "for",
    "foreign",
    "freeze",
    "from",
    "full",
    "grant",
    "greatest",
    "group",
    "grouping",
    "having",
    "ilike",
    "in",
    "initially",
    "inner",
    "inout",
    "int",
    "integer",
    "intersect",
    "interval",
    "into",
    "is",
    "isnull",
    "join",
    "json",
    "json_array",
    "json_arrayagg",
    "json_exists",
    "json_object",
    "json_objectagg",
    "json_query",
    "json_scalar",
    "json_serialize",
    "json_table",
    "json_value",
    "lateral",
    "leading",
    "least",
    "left",
    "like",
    "limit",
    "localtime",
    "localtimestamp",
    "merge_action",
    "national",
    "natural",
    "nchar",
    "none",
    "normalize",
    "not",
    "notnull",
    "null",
    "nullif",
    "numeric",
    "offset",
    "on",
    "only",
    "or",
    "order",
    "out",
    "outer",
    "overlaps",
    "overlay",
    "placing",
    "position",
    "precision",
    "primary",
    "real",
    "references",
    "returning",
    "right",
    "row",
    "select",
    "session_user",
    "setof",
    "similar",
    "smallint",
    "some",
    "substring",
    "symmetric",
    "system_user",
    "table",
    "tablesample",
    "then",
    "time",
    "timestamp",
    "to",
    "trailing",
    "treat",
    "trim",
    "true",
    "union",
    "unique",
    "user",
    "using",
    "values",
    "varchar",
    "variadic",
    "verbose",
    "when",
    "where",
    "window",
    "with",
    "xmlattributes",
    "xmlconcat",
    "xmlelement",
    "xmlexists",
    "xmlforest",
    "xmlnamespaces",
    "xmlparse",
    "xmlpi",
    "xmlroot",
    "xmlserialize",
    "xmltable",
];

/// A validated SQL identifier (one schema, table or column name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Ident(String);

impl Ident {
    /// Validate a raw name.
    ///
    /// Any character is allowed except NUL; the name must not be empty.
    pub fn new(name: impl Into<String>) -> QueryResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(QueryError::invalid_identifier("identifier cannot be empty"));
        }
        if name.contains('\0') {
            return Err(QueryError::invalid_identifier(
                "identifier cannot contain NUL character",
            ));
        }
        Ok(Self(name))
    }

    /// The raw, unquoted name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the name must be wrapped in double quotes.
    pub fn needs_quotes(&self) -> bool {
        let mut chars = self.0.chars();
        let starts_ok = matches!(chars.next(), Some(c) if c == '_' || c.is_ascii_lowercase());
        if !starts_ok {
            return true;
        }
        if !chars.all(|c| c == '_' || c == '$' || c.is_ascii_lowercase() || c.is_ascii_digit()) {
            return true;
        }
        RESERVED_KEYWORDS.binary_search(&self.0.as_str()).is_ok()
    }

    /// Render the identifier as SQL.
    pub fn to_sql(&self) -> String {
        let mut out = String::with_capacity(self.0.len() + 2);
        self.write_sql(&mut out);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String) {
        if !self.needs_quotes() {
            out.push_str(&self.0);
            return;
        }
        out.push('"');
        for ch in self.0.chars() {
            if ch == '"' {
                out.push_str("\"\"");
            } else {
                out.push(ch);
            }
        }
        out.push('"');
    }
}

impl std::fmt::Display for Ident {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_sql())
    }
}

/// Quote a single name for use as an identifier.
pub fn ident(name: &str) -> QueryResult<String> {
    Ok(Ident::new(name)?.to_sql())
}

/// Render a JSON value as a SQL literal.
pub fn literal(value: &Value) -> String {
    let mut out = String::new();
    write_literal(value, &mut out);
    out
}

pub(crate) fn write_literal(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("NULL"),
        Value::Bool(true) => out.push_str("'t'"),
        Value::Bool(false) => out.push_str("'f'"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_quoted(s, out),
        // Arrays and objects travel as their JSON text.
        Value::Array(_) | Value::Object(_) => write_quoted(&value.to_string(), out),
    }
}

/// Write `s` as a single-quoted string constant.
pub(crate) fn write_quoted(s: &str, out: &mut String) {
    if s.contains('\\') {
        out.push('E');
    }
    out.reserve(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        match ch {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            c => out.push(c),
        }
    }
    out.push('\'');
}
