//! Data access layer for the identity system.
//!
//! Each store is a leaf over the shared [`DocumentStore`] boundary, injected
//! at construction. The stores do not depend on each other; the cascade in
//! [`UserStore::delete_user`] takes the session store per call so the
//! composing service stays in charge of wiring.
//!
//! [`DocumentStore`]: gatehouse_store::DocumentStore
//! [`UserStore::delete_user`]: user_store::UserStore::delete_user

pub mod session_store;
pub mod user_store;

pub use session_store::SessionStore;
pub use user_store::UserStore;
