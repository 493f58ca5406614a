//! Error types for the document store boundary.

use thiserror::Error;

/// Faults surfaced by a document store backend.
#[derive(Debug, Error, Clone)]
pub enum StoreError {
    /// A write collided with a unique index. Recoverable by the caller.
    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    /// The backend could not complete the operation. Never retried here;
    /// callers apply their own retry policy.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A document could not be encoded or decoded.
    #[error("document codec error: {0}")]
    Codec(String),

    /// A collection or field name is not a valid identifier.
    #[error("invalid namespace: {0}")]
    InvalidNamespace(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => {
                if db_err.message().contains("UNIQUE constraint failed") {
                    StoreError::DuplicateKey(db_err.message().to_string())
                } else {
                    StoreError::Unavailable(db_err.message().to_string())
                }
            }
            _ => StoreError::Unavailable(err.to_string()),
        }
    }
}
