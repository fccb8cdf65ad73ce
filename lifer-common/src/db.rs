//! Database initialization and state blob persistence
//!
//! Application state is persisted as named JSON blobs in a key-value table,
//! one row per blob. Corrupt or missing blobs degrade to `None` on load so a
//! damaged database never prevents startup.

use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{info, warn};

/// Initialize database connection pool, creating the database and the
/// `app_state` table if they do not exist.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePool::connect(&db_url).await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the state table (idempotent)
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS app_state (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Load a named state blob.
///
/// Returns `None` when the blob is missing. A blob that fails to deserialize
/// is discarded with a warning rather than propagated, so callers fall back
/// to their empty default.
pub async fn get_blob<T: DeserializeOwned>(db: &SqlitePool, key: &str) -> Result<Option<T>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM app_state WHERE key = ?")
        .bind(key)
        .fetch_optional(db)
        .await?;

    match value {
        Some(raw) => match serde_json::from_str::<T>(&raw) {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => {
                warn!(key, error = %e, "Discarding corrupt state blob");
                Ok(None)
            }
        },
        None => Ok(None),
    }
}

/// Store a named state blob, replacing any previous value.
pub async fn set_blob<T: Serialize>(db: &SqlitePool, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;

    sqlx::query(
        r#"
        INSERT INTO app_state (key, value)
        VALUES (?, ?)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value
        "#,
    )
    .bind(key)
    .bind(raw)
    .execute(db)
    .await?;

    Ok(())
}
