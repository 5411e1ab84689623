//! Errors raised while compiling, executing and decoding statements.
//!
//! Compilation failures ([`WeaveError::MissingClause`],
//! [`WeaveError::InvalidClause`]) are raised before anything reaches the
//! connection. Everything else comes back from the connection layer untouched
//! by the builder.

use thiserror::Error;
use tokio_postgres::error::SqlState;

pub type WeaveResult<T> = Result<T, WeaveError>;

#[derive(Debug, Error)]
pub enum WeaveError {
    /// Unknown driver name or settings `tokio-postgres` cannot use.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connecting failed, or the connection rejected a call.
    #[error("connection error: {0}")]
    Connection(String),

    /// The statement kind needs a clause that was never set.
    #[error("{kind} statement requires a {clause} clause")]
    MissingClause {
        kind: &'static str,
        clause: &'static str,
    },

    /// Clause data that cannot be rendered, e.g. rows with different columns.
    #[error("invalid {clause} clause: {message}")]
    InvalidClause {
        clause: &'static str,
        message: String,
    },

    /// Server-side failure with no more specific variant.
    #[error("query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    #[error("not found: {0}")]
    NotFound(String),

    /// SQLSTATE 23505. Carries `constraint: message`.
    #[error("unique constraint violation: {0}")]
    UniqueViolation(String),

    /// SQLSTATE 23503.
    #[error("foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// SQLSTATE 23514.
    #[error("check constraint violation: {0}")]
    CheckViolation(String),

    /// A column value could not be turned into a [`Value`](crate::Value) or
    /// the type a caller asked for.
    #[error("cannot decode column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Begin while a transaction is open, or commit/rollback without one.
    #[error("transaction error: {0}")]
    Transaction(String),
}

impl WeaveError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn invalid_clause(clause: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidClause {
            clause,
            message: message.into(),
        }
    }

    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// True for errors raised by `compile()`; no SQL was sent.
    pub fn is_compile_error(&self) -> bool {
        matches!(self, Self::MissingClause { .. } | Self::InvalidClause { .. })
    }

    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Classify a driver error by SQLSTATE.
    ///
    /// Integrity violations get their own variant; every other failure,
    /// including I/O errors without a server response, stays a `Query`.
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        let Some(db) = err.as_db_error() else {
            return Self::Query(err);
        };
        let wrap: fn(String) -> Self = match db.code() {
            c if *c == SqlState::UNIQUE_VIOLATION => Self::UniqueViolation,
            c if *c == SqlState::FOREIGN_KEY_VIOLATION => Self::ForeignKeyViolation,
            c if *c == SqlState::CHECK_VIOLATION => Self::CheckViolation,
            _ => return Self::Query(err),
        };
        let detail = match db.constraint() {
            Some(constraint) => format!("{constraint}: {}", db.message()),
            None => db.message().to_string(),
        };
        wrap(detail)
    }
}

#[cfg(test)]
mod tests {
    use super::WeaveError;

    #[test]
    fn test_compile_errors_are_flagged() {
        let missing = WeaveError::MissingClause {
            kind: "UPDATE",
            clause: "set",
        };
        assert!(missing.is_compile_error());
        assert_eq!(missing.to_string(), "UPDATE statement requires a set clause");

        let invalid = WeaveError::invalid_clause("limit", "out of range");
        assert!(invalid.is_compile_error());
        assert_eq!(invalid.to_string(), "invalid limit clause: out of range");

        assert!(!WeaveError::Transaction("x".into()).is_compile_error());
    }

    #[test]
    fn test_display_messages() {
        assert_eq!(
            WeaveError::decode("total", "bad digits").to_string(),
            "cannot decode column 'total': bad digits"
        );
        assert!(WeaveError::not_found("no rows").is_not_found());
        assert!(WeaveError::UniqueViolation("users_email_key: dup".into()).is_unique_violation());
    }
}
