//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  PostgreSQL error (sqlx::Error, SQLSTATE)                              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Classified by SQLSTATE / failure kind         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  anyhow::Error (demo binary) ← Fatal: logged, process exits            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Error Classes
//! ```text
//! ┌──────────────┬──────────────────────────────────────┬───────────┐
//! │ Class        │ Variants                             │ Retryable │
//! ├──────────────┼──────────────────────────────────────┼───────────┤
//! │ Connection   │ ConnectionFailed, PoolExhausted      │ yes       │
//! │ Migration    │ MigrationFailed                      │ no        │
//! │ Constraint   │ Unique/ForeignKey/NotNull/Check      │ no        │
//! │ NotFound     │ NotFound                             │ no        │
//! │ Query        │ QueryFailed, InvalidPredicate, ...   │ Transient │
//! └──────────────┴──────────────────────────────────────┴───────────┘
//! ```
//! Nothing in this crate retries; [`DbError::is_retryable`] is exposed for
//! callers that want to.

use thiserror::Error;
use warehouse_core::{CoreError, ValidationError};

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - Preloading a product whose id does not exist
    /// - `fetch_one` returns no rows
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (SQLSTATE 23505).
    #[error("Unique constraint {constraint} violated: {message}")]
    UniqueViolation { constraint: String, message: String },

    /// Foreign key constraint violation (SQLSTATE 23503).
    ///
    /// ## When This Occurs
    /// - Inserting a variant whose product_id does not exist
    #[error("Foreign key constraint {constraint} violated: {message}")]
    ForeignKeyViolation { constraint: String, message: String },

    /// NOT NULL violation (SQLSTATE 23502).
    #[error("Not-null violation: {message}")]
    NotNullViolation { message: String },

    /// CHECK constraint violation (SQLSTATE 23514).
    #[error("Check constraint {constraint} violated: {message}")]
    CheckViolation { constraint: String, message: String },

    /// Database unreachable or credentials rejected.
    ///
    /// ## When This Occurs
    /// - Host/port unreachable, TLS handshake failed
    /// - Password authentication failed (SQLSTATE 28P01)
    /// - Database does not exist (SQLSTATE 3D000)
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Schema reset failed (any DDL error).
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Serialization failure or deadlock; the statement may succeed if re-run.
    #[error("Transient query failure: {0}")]
    Transient(String),

    /// A filter could not be turned into SQL.
    #[error("Invalid predicate: {0}")]
    InvalidPredicate(String),

    /// Input rejected before reaching the database.
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// Bad connection configuration (malformed DSN, unknown sslmode, ...).
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Pool exhausted (acquire timed out).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Coarse error classes used for reporting and retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Connection,
    Migration,
    Constraint,
    NotFound,
    Query,
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Which class of failure this is.
    pub fn class(&self) -> ErrorClass {
        match self {
            DbError::ConnectionFailed(_) | DbError::PoolExhausted | DbError::Configuration(_) => {
                ErrorClass::Connection
            }
            DbError::MigrationFailed(_) => ErrorClass::Migration,
            DbError::UniqueViolation { .. }
            | DbError::ForeignKeyViolation { .. }
            | DbError::NotNullViolation { .. }
            | DbError::CheckViolation { .. } => ErrorClass::Constraint,
            DbError::NotFound { .. } => ErrorClass::NotFound,
            DbError::QueryFailed(_)
            | DbError::Transient(_)
            | DbError::InvalidPredicate(_)
            | DbError::InvalidInput(_)
            | DbError::Internal(_) => ErrorClass::Query,
        }
    }

    /// True for failures worth retrying with backoff.
    ///
    /// Configuration errors are in the connection class but will fail the
    /// same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DbError::ConnectionFailed(_) | DbError::PoolExhausted | DbError::Transient(_)
        )
    }

    /// True for constraint violations of any kind.
    pub fn is_constraint_violation(&self) -> bool {
        self.class() == ErrorClass::Constraint
    }

    /// Classifies a server error by its SQLSTATE code.
    ///
    /// ## SQLSTATE Mapping
    /// ```text
    /// 23505          → UniqueViolation
    /// 23503          → ForeignKeyViolation
    /// 23502          → NotNullViolation
    /// 23514          → CheckViolation
    /// 40001, 40P01   → Transient (serialization failure, deadlock)
    /// 08xxx          → ConnectionFailed (connection exception)
    /// 28xxx, 3D000   → ConnectionFailed (auth, unknown database)
    /// anything else  → QueryFailed
    /// ```
    pub fn from_sqlstate(code: Option<&str>, constraint: Option<&str>, message: &str) -> Self {
        let constraint = constraint.unwrap_or("unknown").to_string();
        let message = message.to_string();

        match code {
            Some("23505") => DbError::UniqueViolation {
                constraint,
                message,
            },
            Some("23503") => DbError::ForeignKeyViolation {
                constraint,
                message,
            },
            Some("23502") => DbError::NotNullViolation { message },
            Some("23514") => DbError::CheckViolation {
                constraint,
                message,
            },
            Some("40001") | Some("40P01") => DbError::Transient(message),
            Some("3D000") => DbError::ConnectionFailed(message),
            Some(c) if c.starts_with("08") || c.starts_with("28") => {
                DbError::ConnectionFailed(message)
            }
            _ => DbError::QueryFailed(message),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound     → DbError::NotFound
/// sqlx::Error::Database        → DbError::from_sqlstate
/// sqlx::Error::PoolTimedOut    → DbError::PoolExhausted
/// sqlx::Error::Io / Tls        → DbError::ConnectionFailed
/// sqlx::Error::Configuration   → DbError::Configuration
/// Other                        → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let code = db_err.code();
                DbError::from_sqlstate(code.as_deref(), db_err.constraint(), db_err.message())
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::Io(e) => DbError::ConnectionFailed(e.to_string()),

            sqlx::Error::Tls(e) => DbError::ConnectionFailed(e.to_string()),

            sqlx::Error::Configuration(e) => DbError::Configuration(e.to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<CoreError> for DbError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => DbError::InvalidInput(e),
            other => DbError::Internal(other.to_string()),
        }
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_constraint_codes() {
        let err = DbError::from_sqlstate(
            Some("23503"),
            Some("product_variant_product_id_fkey"),
            "insert or update violates foreign key constraint",
        );
        assert!(matches!(
            err,
            DbError::ForeignKeyViolation { ref constraint, .. }
                if constraint == "product_variant_product_id_fkey"
        ));
        assert!(err.is_constraint_violation());
        assert!(!err.is_retryable());

        assert!(matches!(
            DbError::from_sqlstate(Some("23505"), None, "dup"),
            DbError::UniqueViolation { ref constraint, .. } if constraint == "unknown"
        ));
        assert!(matches!(
            DbError::from_sqlstate(Some("23502"), None, "null"),
            DbError::NotNullViolation { .. }
        ));
        assert!(matches!(
            DbError::from_sqlstate(Some("23514"), Some("ck"), "check"),
            DbError::CheckViolation { .. }
        ));
    }

    #[test]
    fn test_connection_codes() {
        for code in ["28P01", "28000", "08006", "3D000"] {
            let err = DbError::from_sqlstate(Some(code), None, "nope");
            assert_eq!(err.class(), ErrorClass::Connection, "code {code}");
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn test_transient_and_generic_query_codes() {
        let deadlock = DbError::from_sqlstate(Some("40P01"), None, "deadlock detected");
        assert_eq!(deadlock.class(), ErrorClass::Query);
        assert!(deadlock.is_retryable());

        let syntax = DbError::from_sqlstate(Some("42601"), None, "syntax error");
        assert!(matches!(syntax, DbError::QueryFailed(_)));
        assert!(!syntax.is_retryable());

        assert!(matches!(
            DbError::from_sqlstate(None, None, "?"),
            DbError::QueryFailed(_)
        ));
    }

    #[test]
    fn test_sqlx_error_mapping() {
        assert!(matches!(
            DbError::from(sqlx::Error::RowNotFound),
            DbError::NotFound { .. }
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolExhausted
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
    }

    #[test]
    fn test_core_error_mapping() {
        let validation = CoreError::Validation(ValidationError::Required {
            field: "name".to_string(),
        });
        assert!(matches!(DbError::from(validation), DbError::InvalidInput(_)));

        let mismatch = CoreError::VariantOwnerMismatch {
            variant_id: Uuid::nil(),
            expected: Uuid::nil(),
            found: Uuid::nil(),
        };
        assert!(matches!(DbError::from(mismatch), DbError::Internal(_)));
    }

    #[test]
    fn test_classes() {
        assert_eq!(
            DbError::MigrationFailed("x".into()).class(),
            ErrorClass::Migration
        );
        assert_eq!(DbError::not_found("Product", Uuid::nil()).class(), ErrorClass::NotFound);
        assert!(!DbError::Configuration("bad".into()).is_retryable());
    }
}
