//! Error types for pgmeta

use thiserror::Error;

/// Result type alias for statement building
pub type QueryResult<T> = Result<T, QueryError>;

/// Reasons a statement could not be built.
///
/// Every variant is raised before any SQL text is produced, so a caller never
/// sees a partial statement.
#[derive(Debug, Error)]
pub enum QueryError {
    /// DELETE/UPDATE without any filter
    #[error("no filters for this {action} query")]
    MissingFilter { action: &'static str },

    /// INSERT without rows, or UPDATE without values
    #[error("no value to {action}")]
    MissingPayload { action: &'static str },

    /// Payload that does not serialize to JSON objects
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Malformed filter (tuple arity, unsupported operator, ...)
    #[error("{0}")]
    InvalidFilter(String),

    /// Identifier that cannot be quoted
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),
}

impl QueryError {
    /// Create a missing-filter error for the given action
    pub fn missing_filter(action: &'static str) -> Self {
        Self::MissingFilter { action }
    }

    /// Create a missing-payload error for the given action
    pub fn missing_payload(action: &'static str) -> Self {
        Self::MissingPayload { action }
    }

    /// Create an invalid filter error
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter(message.into())
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier(message.into())
    }

    /// Check if this is a missing filter error
    pub fn is_missing_filter(&self) -> bool {
        matches!(self, Self::MissingFilter { .. })
    }

    /// Check if this is a missing payload error
    pub fn is_missing_payload(&self) -> bool {
        matches!(self, Self::MissingPayload { .. })
    }
}
