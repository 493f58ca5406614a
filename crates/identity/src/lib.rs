//! # Gatehouse Identity Crate
//!
//! This crate provides the data-access layer for user accounts and
//! authentication sessions. It contains two independent stores over a shared
//! document store boundary:
//!
//! - [`UserStore`]: durable user records with storage-enforced email
//!   uniqueness and atomic preference replacement.
//! - [`SessionStore`]: ephemeral bearer-token sessions with at most one
//!   session document per user, enforced by an atomic upsert.
//!
//! Neither store holds mutable state of its own; correctness under concurrent
//! callers is delegated to the storage engine's per-document atomicity. The
//! HTTP surface, credential verification, and token issuance live in the
//! service composing these stores.

pub mod entities;
pub mod stores;
pub mod types;

pub use entities::{Preferences, Session, User};
pub use stores::{SessionStore, UserStore};
pub use types::{SessionError, SessionResult, UserError, UserResult};

use anyhow::Context;
use gatehouse_config::IdentityConfig;
use gatehouse_store::DocumentStore;
use tracing::info;

/// Provision the storage-level constraints the stores rely on. Idempotent;
/// called once at service start.
///
/// The unique index on user emails is what closes the race between concurrent
/// registrations of the same address. The session token index is optional and
/// only created when the configuration asks for globally unique tokens.
pub async fn provision(store: &dyn DocumentStore, config: &IdentityConfig) -> anyhow::Result<()> {
    store
        .ensure_unique_index(&config.users_collection, "email")
        .await
        .context("failed to provision the unique email index")?;

    if config.unique_session_tokens {
        store
            .ensure_unique_index(&config.sessions_collection, "jwt")
            .await
            .context("failed to provision the unique session token index")?;
    }

    info!(
        users = %config.users_collection,
        sessions = %config.sessions_collection,
        "identity collections provisioned"
    );
    Ok(())
}
