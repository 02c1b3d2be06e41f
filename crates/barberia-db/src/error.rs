//! # Database Errors
//!
//! `DbError` is what every repository returns. The console turns it into
//! an `ApiError`; constraint failures keep their own variants so the
//! importer can skip duplicates and orphaned returns instead of failing.

use sqlx::error::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// No row matched, including guarded updates such as voiding a return
    /// that is no longer completed.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// An id or sale number that is already stored.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A return pointing at a sale that does not exist.
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A stored code that no domain type accepts (edited by hand, or
    /// written by a newer version).
    #[error("Invalid {column} value in {table}: '{value}'")]
    InvalidValue {
        table: &'static str,
        column: &'static str,
        value: String,
    },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Any other statement failure, CHECK constraints included.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn invalid_value(table: &'static str, column: &'static str, value: impl Into<String>) -> Self {
        DbError::InvalidValue {
            table,
            column,
            value: value.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

/// SQLite reports the offending column as `UNIQUE constraint failed: table.column`.
fn unique_column(message: &str) -> String {
    message
        .rsplit(": ")
        .next()
        .filter(|column| !column.is_empty() && *column != message)
        .unwrap_or("unknown")
        .to_string()
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => DbError::UniqueViolation {
                    field: unique_column(db_err.message()),
                    value: "unknown".to_string(),
                },
                ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation {
                    message: db_err.message().to_string(),
                },
                _ => DbError::QueryFailed(db_err.message().to_string()),
            },

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_column_from_sqlite_message() {
        assert_eq!(unique_column("UNIQUE constraint failed: sales.sale_number"), "sales.sale_number");
        assert_eq!(unique_column("constraint failed"), "unknown");
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        assert!(DbError::from(sqlx::Error::RowNotFound).is_not_found());
        assert!(matches!(DbError::from(sqlx::Error::PoolTimedOut), DbError::PoolExhausted));
    }
}
