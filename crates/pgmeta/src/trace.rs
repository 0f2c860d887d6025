//! Statement logging.
//!
//! Builders report every statement they render, and every statement they
//! refuse to render, as a `tracing` event on the [`SQL_TARGET`] target.
//! [`StatementLog`] picks the level and how much of the SQL text is kept.

use crate::error::QueryError;
use tracing::Level;

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN => tracing::warn!($($field)*),
            Level::INFO => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            _ => tracing::trace!($($field)*),
        }
    };
}

/// Log target for rendered statements.
pub const SQL_TARGET: &str = "pgmeta.sql";

/// `tracing` settings for statements produced by a builder.
///
/// Every rendered statement is emitted on the `pgmeta.sql` target with its
/// action and text; rejected statements carry the error instead.
#[derive(Debug, Clone)]
pub struct StatementLog {
    /// Whether anything is emitted.
    pub enabled: bool,
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl Default for StatementLog {
    fn default() -> Self {
        Self {
            enabled: true,
            level: Level::DEBUG,
            max_sql_length: Some(200),
        }
    }
}

impl StatementLog {
    /// `DEBUG`, truncated to 200 bytes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit nothing.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Emit statement events at `level` instead of `DEBUG`.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Keep at most `len` bytes of each statement in the event.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Log statements in full, however long.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub(crate) fn truncate_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.max_sql_length {
            Some(max) if sql.len() > max => {
                format!("{}...", truncate_at_char_boundary(sql, max)).into()
            }
            _ => sql.into(),
        }
    }

    pub(crate) fn statement(&self, action: &str, sql: &str) {
        if !self.enabled {
            return;
        }
        let sql = self.truncate_sql(sql);
        emit_at_level!(self.level, target: SQL_TARGET, action, sql = %sql, "statement built");
    }

    pub(crate) fn rejected(&self, action: &str, err: &QueryError) {
        if !self.enabled {
            return;
        }
        emit_at_level!(self.level, target: SQL_TARGET, action, error = %err, "statement rejected");
    }
}

/// Longest prefix of `s` that is at most `max` bytes and ends on a char boundary.
fn truncate_at_char_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
