//! Shared types for the identity stores.

pub mod errors;

pub use errors::{SessionError, SessionResult, UserError, UserResult};
