//! Error types for pgcrud

use std::time::Duration;
use thiserror::Error;

/// Result type alias for pgcrud operations
pub type CrudResult<T> = Result<T, CrudError>;

/// Error types for catalog lookups, value binding, and statement execution
#[derive(Debug, Error)]
pub enum CrudError {
    /// Backend unreachable or credentials rejected
    #[error("Connection error: {0}")]
    Connection(String),

    /// Pool checkout failed
    #[error("Pool error: {0}")]
    Pool(String),

    /// A metadata lookup failed at the backend
    #[error("Catalog query error: {0}")]
    CatalogQuery(String),

    /// The named column is not part of the table
    #[error("Column '{column}' not found in {schema}.{table}")]
    ColumnNotFound {
        schema: String,
        table: String,
        column: String,
    },

    /// The declared SQL type has no codec mapping
    #[error("Unsupported data type: {0}")]
    UnsupportedType(String),

    /// Text input does not parse as the declared type
    #[error("Invalid {declared_type} value '{value}': {reason}")]
    Format {
        declared_type: String,
        value: String,
        reason: String,
    },

    /// A record already holds this column
    #[error("Duplicate column in record: {0}")]
    DuplicateColumn(String),

    /// Statement shape refused before execution
    #[error("Validation error: {0}")]
    Validation(String),

    /// SQL execution failed after binding
    #[error("Statement error: {0}")]
    StatementExecution(#[source] tokio_postgres::Error),

    /// Rolling back after a failure failed as well
    #[error("{error} (rollback failed: {rollback})")]
    RollbackFailed {
        error: Box<CrudError>,
        rollback: String,
    },

    /// Statement did not finish in time
    #[error("Statement timeout after {0:?}")]
    Timeout(Duration),

    /// The session gate could not be acquired in time
    #[error("Timed out after {0:?} waiting for the database session")]
    LockTimeout(Duration),
}

impl CrudError {
    /// Create a format error for a value of the given declared type
    pub fn format(
        declared_type: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Format {
            declared_type: declared_type.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a column-not-found error
    pub fn column_not_found(schema: &str, table: &str, column: &str) -> Self {
        Self::ColumnNotFound {
            schema: schema.to_string(),
            table: table.to_string(),
            column: column.to_string(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Wrap a backend error raised by a metadata lookup.
    pub fn catalog(err: tokio_postgres::Error) -> Self {
        Self::CatalogQuery(backend_message(&err))
    }

    /// Wrap a backend error raised while running a data statement.
    pub fn execution(err: tokio_postgres::Error) -> Self {
        Self::StatementExecution(err)
    }

    /// Turn a statement-level error into a catalog error.
    ///
    /// Timeouts and gate errors pass through unchanged.
    pub fn into_catalog(self) -> Self {
        match self {
            Self::StatementExecution(err) => Self::catalog(err),
            other => other,
        }
    }

    /// SQLSTATE reported by the backend, if any
    pub fn sqlstate(&self) -> Option<&str> {
        match self {
            Self::StatementExecution(err) => err.as_db_error().map(|db| db.code().code()),
            Self::RollbackFailed { error, .. } => error.sqlstate(),
            _ => None,
        }
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        self.sqlstate() == Some("23505")
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::LockTimeout(_))
    }

    /// Whether the failure happened before anything was sent to the backend.
    ///
    /// The console uses this to decide whether re-prompting makes sense.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedType(_)
                | Self::Format { .. }
                | Self::DuplicateColumn(_)
                | Self::ColumnNotFound { .. }
                | Self::Validation(_)
        )
    }
}

impl From<deadpool_postgres::PoolError> for CrudError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

fn backend_message(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db) => db.message().to_string(),
        None => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_error_names_type_and_value() {
        let err = CrudError::format("integer", "abc", "invalid digit found in string");
        assert_eq!(
            err.to_string(),
            "Invalid integer value 'abc': invalid digit found in string"
        );
        assert!(err.is_input_error());
    }

    #[test]
    fn column_not_found_message() {
        let err = CrudError::column_not_found("school", "student", "age");
        assert_eq!(err.to_string(), "Column 'age' not found in school.student");
        assert!(err.is_input_error());
    }

    #[test]
    fn rollback_failure_keeps_both_messages() {
        let err = CrudError::RollbackFailed {
            error: Box::new(CrudError::Timeout(Duration::from_secs(2))),
            rollback: "connection closed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Statement timeout after 2s (rollback failed: connection closed)"
        );
        assert_eq!(err.sqlstate(), None);
    }

    #[test]
    fn timeouts_are_flagged() {
        assert!(CrudError::Timeout(Duration::from_millis(10)).is_timeout());
        assert!(CrudError::LockTimeout(Duration::from_millis(10)).is_timeout());
        assert!(!CrudError::UnsupportedType("money".into()).is_timeout());
    }

    #[test]
    fn into_catalog_passes_non_statement_errors_through() {
        let err = CrudError::Timeout(Duration::from_secs(1)).into_catalog();
        assert!(matches!(err, CrudError::Timeout(_)));
    }
}
