//! Gatehouse Store Crate
//!
//! This crate defines the document store boundary consumed by the identity
//! stores: the [`DocumentStore`] trait, the document/filter/write-concern
//! vocabulary, and two backends. [`MemoryStore`] is an in-process backend used
//! for tests and fault injection; [`SqliteStore`] persists documents as JSON
//! rows in an embedded SQLite database.

pub mod client;
pub mod connection;
pub mod error;
pub mod memory;
pub mod migrations;
pub mod sqlite;
pub mod types;

pub use client::DocumentStore;
pub use connection::prepare_database;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use migrations::run_migrations;
pub use sqlite::SqliteStore;
pub use types::{
    from_document, to_document, DeleteOutcome, Document, Filter, UpdateOptions, UpdateOutcome,
    WriteConcern,
};

/// Re-export the SQLite pool type for callers managing connection lifecycle.
pub use sqlx::SqlitePool;
