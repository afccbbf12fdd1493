//! Database initialization
//!
//! Opens (or creates) the SQLite store and creates the gallery and
//! exhibition tables. Every statement is idempotent, so this runs on each
//! startup.

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::Result;

/// Open the database file, creating it and its parent directory if needed
pub async fn init_database(db_path: &Path, max_connections: u32) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    // WAL lets readers proceed while the importer writes
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_millis(5000));

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    create_schema(&pool).await?;

    Ok(pool)
}

/// Private in-memory database with the full schema.
///
/// Every SQLite memory connection is its own database, so the pool is
/// pinned to a single connection that never expires.
pub async fn open_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_gallery_table(pool).await?;
    create_exhibition_table(pool).await?;
    Ok(())
}

/// Gallery ids are UUIDs, so ids compare case-insensitively
async fn create_gallery_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS gallery (
            id TEXT NOT NULL COLLATE NOCASE PRIMARY KEY,
            name TEXT NOT NULL DEFAULT '',
            meta TEXT NOT NULL DEFAULT '{}',
            about TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Exhibition rows are keyed by `_byteid` (date code ++ hash id).
///
/// `[date_start, date_end)` is the half-open date range. Identity is the
/// unique hash suffix `substr(_byteid, 5)`.
async fn create_exhibition_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS exhibition (
            id TEXT NOT NULL,
            _byteid BLOB NOT NULL CHECK (length(_byteid) = 32),
            gallery_id TEXT NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            date_start TEXT NOT NULL,
            date_end TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS exhibition_hash_id_idx ON exhibition (substr(_byteid, 5))",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS exhibition_date_range_idx ON exhibition (date_end, date_start)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
