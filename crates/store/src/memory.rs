//! In-process document store backend.
//!
//! Backs the test suites of downstream crates: collections live behind a
//! single `RwLock`, so every operation is atomic against concurrent callers.
//! The store can also inject faults and records the write concern requested
//! per collection so callers' durability choices are observable.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::client::DocumentStore;
use crate::error::{StoreError, StoreResult};
use crate::types::{DeleteOutcome, Document, Filter, UpdateOptions, UpdateOutcome, WriteConcern};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    unavailable: AtomicBool,
}

#[derive(Default)]
struct Collection {
    documents: Vec<Document>,
    unique_fields: Vec<String>,
    last_write_concern: Option<WriteConcern>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// When set, every subsequent operation fails with
    /// [`StoreError::Unavailable`] until cleared.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// The write concern requested by the most recent write to `collection`.
    pub async fn last_write_concern(&self, collection: &str) -> Option<WriteConcern> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .and_then(|col| col.last_write_concern)
    }

    /// Snapshot of the documents currently matching `filter`.
    pub async fn documents_matching(&self, collection: &str, filter: &Filter) -> Vec<Document> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .map(|col| {
                col.documents
                    .iter()
                    .filter(|doc| matches(doc, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("injected storage fault".to_string()))
        } else {
            Ok(())
        }
    }
}

fn matches(document: &Document, filter: &Filter) -> bool {
    document.get(&filter.field) == Some(&filter.value)
}

/// Rejects `candidate` when it collides with another document on any unique
/// field. `skip` excludes the document being replaced from the scan.
fn check_unique(
    collection: &Collection,
    candidate: &Document,
    skip: Option<usize>,
) -> StoreResult<()> {
    for field in &collection.unique_fields {
        let Some(value) = candidate.get(field) else {
            continue;
        };
        for (index, document) in collection.documents.iter().enumerate() {
            if Some(index) == skip {
                continue;
            }
            if document.get(field) == Some(value) {
                return Err(StoreError::DuplicateKey(format!(
                    "unique index violated on field `{field}`"
                )));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        self.ensure_available()?;
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|col| {
            col.documents
                .iter()
                .find(|doc| matches(doc, filter))
                .cloned()
        }))
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
        concern: WriteConcern,
    ) -> StoreResult<()> {
        self.ensure_available()?;
        let mut collections = self.collections.write().await;
        let col = collections.entry(collection.to_string()).or_default();
        check_unique(col, &document, None)?;
        col.documents.push(document);
        col.last_write_concern = Some(concern);
        Ok(())
    }

    async fn update_one(
        &self,
        collection: &str,
        filter: &Filter,
        update: Document,
        options: UpdateOptions,
        concern: WriteConcern,
    ) -> StoreResult<UpdateOutcome> {
        self.ensure_available()?;
        let mut collections = self.collections.write().await;
        let col = collections.entry(collection.to_string()).or_default();
        let position = col.documents.iter().position(|doc| matches(doc, filter));

        let outcome = match position {
            Some(index) => {
                let mut candidate = col.documents[index].clone();
                for (field, value) in update {
                    candidate.insert(field, value);
                }
                check_unique(col, &candidate, Some(index))?;
                let modified = u64::from(candidate != col.documents[index]);
                col.documents[index] = candidate;
                UpdateOutcome {
                    matched: 1,
                    modified,
                    upserted: false,
                }
            }
            None if options.upsert => {
                check_unique(col, &update, None)?;
                col.documents.push(update);
                UpdateOutcome {
                    matched: 0,
                    modified: 0,
                    upserted: true,
                }
            }
            None => UpdateOutcome::default(),
        };

        col.last_write_concern = Some(concern);
        Ok(outcome)
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: &Filter,
        concern: WriteConcern,
    ) -> StoreResult<DeleteOutcome> {
        self.ensure_available()?;
        let mut collections = self.collections.write().await;
        let col = collections.entry(collection.to_string()).or_default();

        let deleted = match col.documents.iter().position(|doc| matches(doc, filter)) {
            Some(index) => {
                col.documents.remove(index);
                1
            }
            None => 0,
        };
        col.last_write_concern = Some(concern);
        Ok(DeleteOutcome { deleted })
    }

    async fn ensure_unique_index(&self, collection: &str, field: &str) -> StoreResult<()> {
        self.ensure_available()?;
        let mut collections = self.collections.write().await;
        let col = collections.entry(collection.to_string()).or_default();
        if col.unique_fields.iter().any(|existing| existing == field) {
            return Ok(());
        }

        // Existing collisions make the index impossible, same as a real engine.
        for (index, document) in col.documents.iter().enumerate() {
            let Some(value) = document.get(field) else {
                continue;
            };
            let collision = col.documents[index + 1..]
                .iter()
                .any(|other| other.get(field) == Some(value));
            if collision {
                return Err(StoreError::DuplicateKey(format!(
                    "cannot build unique index over field `{field}`"
                )));
            }
        }

        col.unique_fields.push(field.to_string());
        Ok(())
    }
}
