//! Domain entities stored by the identity system.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// User-settable key/value bag, replaced wholesale on update.
pub type Preferences = Map<String, Value>;

/// A durable user account record.
///
/// The email is the unique identifier, case-sensitive as stored and immutable
/// after creation. Name and password hash are opaque passthrough owned by the
/// registration flow; this layer never inspects or mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<Preferences>,
}

impl User {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
            password_hash: None,
            preferences: None,
        }
    }
}

/// An ephemeral authentication session.
///
/// `user_id` is an opaque user reference chosen by the composing auth
/// service; `jwt` is an opaque bearer token. At most one session document
/// exists per `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub jwt: String,
}
