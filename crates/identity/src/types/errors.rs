//! Error taxonomy for the identity stores.
//!
//! Recoverable conflicts (`DuplicateIdentity`, `DuplicateToken`) are distinct
//! from fatal faults (`StorageUnavailable`), and absence is never an error:
//! lookups return `Ok(None)`. No operation flattens a storage fault into a
//! boolean.

use gatehouse_store::StoreError;
use thiserror::Error;

/// User store errors
#[derive(Debug, Error, Clone)]
pub enum UserError {
    /// A user with this email already exists. The caller can report
    /// "email taken" and retry with a different address.
    #[error("email already registered")]
    DuplicateIdentity,

    /// The caller supplied a disallowed value; detected before any storage
    /// call, so no partial side effect exists.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The storage engine could not complete the operation. Surfaced as-is
    /// for the caller's retry policy.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

/// Session store errors
#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// The bearer token is already bound to another session. Only reachable
    /// when the optional unique token index is provisioned.
    #[error("session token already in use")]
    DuplicateToken,

    /// The storage engine could not complete the operation.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

pub type UserResult<T> = Result<T, UserError>;
pub type SessionResult<T> = Result<T, SessionError>;

impl From<StoreError> for UserError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(_) => UserError::DuplicateIdentity,
            other => UserError::StorageUnavailable(other.to_string()),
        }
    }
}

impl From<StoreError> for SessionError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey(_) => SessionError::DuplicateToken,
            other => SessionError::StorageUnavailable(other.to_string()),
        }
    }
}
