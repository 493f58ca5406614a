//! Storage schema migrations

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

const CREATE_DOCUMENTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    doc TEXT NOT NULL
)";

const CREATE_COLLECTION_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS ix_documents_collection ON documents (collection)";

/// Bring the document schema up to date. Idempotent.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(CREATE_DOCUMENTS_TABLE)
        .execute(pool)
        .await
        .context("failed to create documents table")?;

    sqlx::query(CREATE_COLLECTION_INDEX)
        .execute(pool)
        .await
        .context("failed to index documents by collection")?;

    info!("storage schema up to date");
    Ok(())
}
