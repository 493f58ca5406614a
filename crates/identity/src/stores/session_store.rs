//! Session store for bearer-token sessions.

use std::sync::Arc;

use tracing::{debug, warn};

use gatehouse_config::IdentityConfig;
use gatehouse_store::{
    from_document, to_document, DocumentStore, Filter, UpdateOptions, WriteConcern,
};

use crate::entities::Session;
use crate::types::{SessionError, SessionResult};

/// Store for authentication session documents.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl SessionStore {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn from_config(store: Arc<dyn DocumentStore>, config: &IdentityConfig) -> Self {
        Self::new(store, config.sessions_collection.clone())
    }

    /// Stores a session for `user_id`, replacing any existing one.
    ///
    /// A single atomic upsert keyed on `user_id` is what enforces at most one
    /// session per user: concurrent readers see either the old token or the
    /// new one, never zero or two sessions. A delete-then-insert would open
    /// exactly that window.
    pub async fn create_session(&self, user_id: &str, jwt: &str) -> SessionResult<()> {
        let session = Session {
            user_id: user_id.to_string(),
            jwt: jwt.to_string(),
        };
        let update = to_document(&session)?;

        self.store
            .update_one(
                &self.collection,
                &Filter::eq("user_id", user_id),
                update,
                UpdateOptions::upsert(),
                WriteConcern::Acknowledged,
            )
            .await
            .map_err(|err| {
                warn!(user_id, error = %err, "session upsert failed");
                SessionError::from(err)
            })?;
        debug!(user_id, "session stored");
        Ok(())
    }

    /// Returns the session for `user_id`, or `None`.
    ///
    /// A session whose user no longer resolves is a valid transient state
    /// (the delete-user cascade is not atomic); this lookup does not consult
    /// the users collection.
    pub async fn get_session(&self, user_id: &str) -> SessionResult<Option<Session>> {
        let document = self
            .store
            .find_one(&self.collection, &Filter::eq("user_id", user_id))
            .await?;
        match document {
            Some(document) => Ok(Some(from_document(document)?)),
            None => Ok(None),
        }
    }

    /// Revokes the session for `user_id`. Acknowledged even if none existed.
    pub async fn delete_sessions(&self, user_id: &str) -> SessionResult<()> {
        let outcome = self
            .store
            .delete_one(
                &self.collection,
                &Filter::eq("user_id", user_id),
                WriteConcern::Acknowledged,
            )
            .await?;
        debug!(user_id, deleted = outcome.deleted, "sessions revoked");
        Ok(())
    }
}
