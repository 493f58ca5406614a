//! The document store contract consumed by the identity stores.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::{DeleteOutcome, Document, Filter, UpdateOptions, UpdateOutcome, WriteConcern};

/// A document-oriented store reachable by collection name.
///
/// Every method is a single request/response round trip against the backend,
/// which is the sole serialization point: a single-document update or upsert
/// is atomic, and there are no multi-document transactions. Implementations
/// hold no per-call state, so the futures are cancel-safe; timeouts are the
/// caller's concern (wrap the call in `tokio::time::timeout`).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Returns the first document matching `filter`, or `None`.
    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>>;

    /// Inserts a document. Fails with [`StoreError::DuplicateKey`] when a
    /// unique index on the collection is violated.
    ///
    /// [`StoreError::DuplicateKey`]: crate::error::StoreError::DuplicateKey
    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
        concern: WriteConcern,
    ) -> StoreResult<()>;

    /// Atomically sets the update's top-level fields on the first document
    /// matching `filter`. With `options.upsert` the update is inserted as a
    /// fresh document when nothing matches; at no point are zero or two
    /// matching documents visible to concurrent readers.
    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: Document,
        options: UpdateOptions,
        concern: WriteConcern,
    ) -> StoreResult<UpdateOutcome>;

    /// Deletes the first document matching `filter`. Acknowledged with a zero
    /// count when nothing matched.
    async fn delete_one(
        &self,
        collection: &str,
        filter: &Filter,
        concern: WriteConcern,
    ) -> StoreResult<DeleteOutcome>;

    /// Idempotently creates a unique index over `field`. Fails when existing
    /// documents already collide on that field.
    async fn ensure_unique_index(&self, collection: &str, field: &str) -> StoreResult<()>;
}
