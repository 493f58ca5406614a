//! Identity store for durable user records.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use gatehouse_config::IdentityConfig;
use gatehouse_store::{
    from_document, to_document, Document, DocumentStore, Filter, UpdateOptions, WriteConcern,
};

use crate::entities::{Preferences, User};
use crate::stores::session_store::SessionStore;
use crate::types::{SessionError, UserError, UserResult};

/// Store for user account records.
#[derive(Clone)]
pub struct UserStore {
    store: Arc<dyn DocumentStore>,
    collection: String,
}

impl UserStore {
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
        }
    }

    pub fn from_config(store: Arc<dyn DocumentStore>, config: &IdentityConfig) -> Self {
        Self::new(store, config.users_collection.clone())
    }

    /// Inserts a new user record.
    ///
    /// Email uniqueness is enforced by the storage-level unique index, never
    /// a read-then-write check, so concurrent registrations of the same
    /// address resolve to exactly one winner. Losing an acknowledged account
    /// creation is unacceptable, so the insert requests the strongest
    /// durability level the engine offers.
    pub async fn create_user(&self, user: &User) -> UserResult<()> {
        let document = to_document(user)?;
        self.store
            .insert_one(&self.collection, document, WriteConcern::Majority)
            .await?;
        debug!(email = %user.email, "user created");
        Ok(())
    }

    /// Returns the user with this email, or `None`. Absence is not an error.
    pub async fn find_user_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let document = self
            .store
            .find_one(&self.collection, &Filter::eq("email", email))
            .await?;
        match document {
            Some(document) => Ok(Some(from_document(document)?)),
            None => Ok(None),
        }
    }

    /// Replaces the stored preferences object wholesale.
    ///
    /// `None` is rejected before any storage call. Matching no document is
    /// still acknowledged: the update never upserts, so a caller racing with
    /// account deletion cannot resurrect a partial user record. Callers that
    /// need existence semantics check with [`find_user_by_email`] first.
    ///
    /// [`find_user_by_email`]: UserStore::find_user_by_email
    pub async fn update_user_preferences(
        &self,
        email: &str,
        preferences: Option<Preferences>,
    ) -> UserResult<()> {
        let Some(preferences) = preferences else {
            return Err(UserError::InvalidArgument(
                "preferences must not be null".to_string(),
            ));
        };

        let mut update = Document::new();
        update.insert("preferences".to_string(), Value::Object(preferences));

        let outcome = self
            .store
            .update_one(
                &self.collection,
                &Filter::eq("email", email),
                update,
                UpdateOptions::default(),
                WriteConcern::Acknowledged,
            )
            .await?;
        debug!(email, matched = outcome.matched, "preferences replaced");
        Ok(())
    }

    /// Removes the user record after revoking its sessions.
    ///
    /// The two deletes are not atomic as a pair. The session goes first: a
    /// crash between them leaves a dangling session pointing at a deleted
    /// user, which readers tolerate, rather than a user that appears logged
    /// out. Success is reported from the user-deletion outcome; the session
    /// delete acknowledging zero matches is normal. The cascade keys the
    /// session by the email, matching how the composing service mints them.
    pub async fn delete_user(&self, email: &str, sessions: &SessionStore) -> UserResult<()> {
        sessions
            .delete_sessions(email)
            .await
            .map_err(|err| match err {
                SessionError::StorageUnavailable(message) => {
                    UserError::StorageUnavailable(message)
                }
                other => UserError::StorageUnavailable(other.to_string()),
            })?;

        let outcome = self
            .store
            .delete_one(
                &self.collection,
                &Filter::eq("email", email),
                WriteConcern::Acknowledged,
            )
            .await?;
        debug!(email, deleted = outcome.deleted, "user deleted");
        Ok(())
    }
}
