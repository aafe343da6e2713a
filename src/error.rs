//! Error types for configuration and store access.

use thiserror::Error;

/// SQLSTATE for "relation does not exist".
pub const UNDEFINED_TABLE: &str = "42P01";

/// Failure of a single store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The target table has not been created yet.
    #[error("relation does not exist: {0}")]
    UndefinedTable(String),

    /// Any other driver or database failure.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// The store refused a value (e.g. it exceeds a column limit).
    #[error("value rejected: {0}")]
    Rejected(String),

    /// The store could not be reached.
    #[error("store unavailable")]
    Unavailable,
}

impl StoreError {
    pub fn is_undefined_table(&self) -> bool {
        matches!(self, StoreError::UndefinedTable(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let undefined = err
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| code == UNDEFINED_TABLE);

        if undefined {
            StoreError::UndefinedTable(err.to_string())
        } else {
            StoreError::Database(err)
        }
    }
}

/// Configuration loading error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid environment: {0}")]
    Env(#[from] envy::Error),

    #[error("invalid DATABASE_URL: {0}")]
    DatabaseUrl(#[source] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_undefined_table_is_flagged() {
        assert!(StoreError::UndefinedTable("appointments".into()).is_undefined_table());
        assert!(!StoreError::Unavailable.is_undefined_table());
        assert!(!StoreError::Rejected("too long".into()).is_undefined_table());
    }

    #[test]
    fn non_database_sqlx_errors_stay_generic() {
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, StoreError::Database(sqlx::Error::PoolTimedOut)));
    }
}
