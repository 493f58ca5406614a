//! Storage connection management

use anyhow::{Context, Result};
use gatehouse_config::StorageConfig;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tokio::fs;
use tracing::info;

/// Prepare and establish a storage connection
pub async fn prepare_database(config: &StorageConfig) -> Result<SqlitePool> {
    ensure_sqlite_path(&config.url).await?;

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .with_context(|| format!("failed to connect to storage {}", config.url))?;

    // Enable WAL mode for better concurrent read behaviour
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await
        .context("failed to enable WAL mode for sqlite")?;

    // Set busy timeout to prevent database locked errors
    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await
        .context("failed to set busy timeout for sqlite")?;

    info!(url = %config.url, "storage connection established");
    Ok(pool)
}

/// Ensure the SQLite database file and directory exist
async fn ensure_sqlite_path(url: &str) -> Result<()> {
    let Some(raw) = url.strip_prefix("sqlite:") else {
        return Ok(());
    };
    let sqlite_path = raw.trim_start_matches("//");

    if sqlite_path == ":memory:" || sqlite_path.is_empty() {
        return Ok(());
    }

    let path = Path::new(sqlite_path);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("failed to create sqlite directory {}", parent.display())
            })?;
        }
    }

    if fs::metadata(path).await.is_err() {
        fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(path)
            .await
            .with_context(|| format!("failed to create sqlite database file {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_connection_creation() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let config = StorageConfig {
            url: db_url,
            max_connections: 1,
        };

        let pool = prepare_database(&config).await.unwrap();
        sqlx::query("SELECT 1").fetch_one(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_in_memory_connection() {
        let config = StorageConfig {
            url: "sqlite://:memory:".to_string(),
            max_connections: 1,
        };

        let pool = prepare_database(&config).await.unwrap();
        sqlx::query("SELECT 1").fetch_one(&pool).await.unwrap();
    }
}
