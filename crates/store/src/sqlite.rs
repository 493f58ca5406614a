//! SQLite-backed document store.
//!
//! Documents are stored as JSON text in a single `documents` table and
//! addressed with `json_extract`. Unique indexes become partial expression
//! indexes scoped to one collection, so duplicate-key faults come out of the
//! engine itself rather than a read-then-write check. A single SQLite node
//! acknowledges every committed write durably, so both write concern levels
//! behave the same here.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{Row, SqliteConnection, SqlitePool};
use tracing::debug;

use gatehouse_config::StorageConfig;

use crate::client::DocumentStore;
use crate::connection::prepare_database;
use crate::error::{StoreError, StoreResult};
use crate::migrations::run_migrations;
use crate::types::{DeleteOutcome, Document, Filter, UpdateOptions, UpdateOutcome, WriteConcern};

const FIND_ONE: &str = "SELECT id, doc FROM documents
    WHERE collection = ?1 AND json_extract(doc, ?2) = json_extract(?3, '$') LIMIT 1";

const INSERT_ONE: &str = "INSERT INTO documents (collection, doc) VALUES (?1, ?2)";

const UPDATE_BY_ID: &str = "UPDATE documents SET doc = ?1 WHERE id = ?2";

const DELETE_ONE: &str = "DELETE FROM documents WHERE id IN (
    SELECT id FROM documents
    WHERE collection = ?1 AND json_extract(doc, ?2) = json_extract(?3, '$') LIMIT 1)";

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open the database named by `config` and bring its schema up to date.
    pub async fn connect(config: &StorageConfig) -> anyhow::Result<Self> {
        let pool = prepare_database(config).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool, e.g. one shared with other subsystems.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the underlying pool. Called once at service shutdown.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

fn json_path(field: &str) -> String {
    format!("$.{field}")
}

fn parse_document(raw: &str) -> StoreResult<Document> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(StoreError::Codec(format!(
            "stored document is not a JSON object: {other}"
        ))),
        Err(err) => Err(StoreError::Codec(err.to_string())),
    }
}

/// The body of `update_one`, run against a connection already holding the
/// write lock. The caller commits or rolls back.
async fn apply_update(
    conn: &mut SqliteConnection,
    collection: &str,
    filter: &Filter,
    update: Document,
    options: UpdateOptions,
) -> StoreResult<UpdateOutcome> {
    let row = sqlx::query(FIND_ONE)
        .bind(collection)
        .bind(json_path(&filter.field))
        .bind(filter.value.to_string())
        .fetch_optional(&mut *conn)
        .await?;

    match row {
        Some(row) => {
            let id: i64 = row.try_get("id")?;
            let raw: String = row.try_get("doc")?;
            let mut document = parse_document(&raw)?;
            let before = document.clone();
            for (field, value) in update {
                document.insert(field, value);
            }

            let mut modified = 0;
            if document != before {
                sqlx::query(UPDATE_BY_ID)
                    .bind(Value::Object(document).to_string())
                    .bind(id)
                    .execute(&mut *conn)
                    .await?;
                modified = 1;
            }
            Ok(UpdateOutcome {
                matched: 1,
                modified,
                upserted: false,
            })
        }
        None if options.upsert => {
            sqlx::query(INSERT_ONE)
                .bind(collection)
                .bind(Value::Object(update).to_string())
                .execute(&mut *conn)
                .await?;
            Ok(UpdateOutcome {
                matched: 0,
                modified: 0,
                upserted: true,
            })
        }
        None => Ok(UpdateOutcome::default()),
    }
}

/// Collection and field names end up inside index DDL, so they must be plain
/// identifiers.
fn ensure_identifier(name: &str) -> StoreResult<()> {
    let valid = !name.is_empty()
        && !name.starts_with(|c: char| c.is_ascii_digit())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidNamespace(name.to_string()))
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn find_one(&self, collection: &str, filter: &Filter) -> StoreResult<Option<Document>> {
        let row = sqlx::query(FIND_ONE)
            .bind(collection)
            .bind(json_path(&filter.field))
            .bind(filter.value.to_string())
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let raw: String = row.try_get("doc")?;
                Ok(Some(parse_document(&raw)?))
            }
            None => Ok(None),
        }
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
        concern: WriteConcern,
    ) -> StoreResult<()> {
        sqlx::query(INSERT_ONE)
            .bind(collection)
            .bind(Value::Object(document).to_string())
            .execute(&self.pool)
            .await?;
        debug!(collection, ?concern, "document inserted");
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
        // The read-modify-write runs inside one transaction, so readers see
        // either the old or the new document and never an intermediate state.
        // The write lock is taken up front with BEGIN IMMEDIATE: a deferred
        // transaction snapshots at the first SELECT and the later lock
        // upgrade fails outright once a concurrent writer has committed,
        // where an immediate one just waits on the busy timeout.
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result = apply_update(&mut conn, collection, filter, update, options).await;
        match result {
            Ok(outcome) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                debug!(collection, ?concern, ?outcome, "document updated");
                Ok(outcome)
            }
            Err(err) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(err)
            }
        }
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: &Filter,
        concern: WriteConcern,
    ) -> StoreResult<DeleteOutcome> {
        let result = sqlx::query(DELETE_ONE)
            .bind(collection)
            .bind(json_path(&filter.field))
            .bind(filter.value.to_string())
            .execute(&self.pool)
            .await?;
        debug!(collection, ?concern, deleted = result.rows_affected(), "document deleted");
        Ok(DeleteOutcome {
            deleted: result.rows_affected(),
        })
    }

    async fn ensure_unique_index(&self, collection: &str, field: &str) -> StoreResult<()> {
        ensure_identifier(collection)?;
        ensure_identifier(field)?;

        let ddl = format!(
            "CREATE UNIQUE INDEX IF NOT EXISTS ux_{collection}_{field}
             ON documents (json_extract(doc, '$.{field}'))
             WHERE collection = '{collection}'"
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        debug!(collection, field, "unique index ensured");
        Ok(())
    }
}
