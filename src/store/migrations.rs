//! Schema setup for the libSQL key-value backend.
//!
//! The schema version lives in SQLite's `user_version` pragma. An older file
//! gets the `kv_store` table and a version bump; a current one is left alone.

use libsql::Connection;
use tracing::info;

use crate::error::StoreError;

/// Version recorded once `kv_store` exists.
pub(crate) const SCHEMA_VERSION: i64 = 1;

const CREATE_KV_STORE: &str = "CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    updated_at TEXT NOT NULL
)";

fn migration_error(context: &'static str) -> impl FnOnce(libsql::Error) -> StoreError {
    move |e| StoreError::Migration(format!("{context}: {e}"))
}

/// Bring the connection's schema up to [`SCHEMA_VERSION`].
pub async fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    let version = schema_version(conn).await?;
    if version >= SCHEMA_VERSION {
        return Ok(());
    }

    conn.execute(CREATE_KV_STORE, ())
        .await
        .map_err(migration_error("Failed to create kv_store"))?;
    conn.execute(&format!("PRAGMA user_version = {SCHEMA_VERSION}"), ())
        .await
        .map_err(migration_error("Failed to record schema version"))?;

    info!(from = version, to = SCHEMA_VERSION, "Store schema upgraded");
    Ok(())
}

/// The recorded schema version; 0 for a fresh file.
pub(crate) async fn schema_version(conn: &Connection) -> Result<i64, StoreError> {
    let mut rows = conn
        .query("PRAGMA user_version", ())
        .await
        .map_err(migration_error("Failed to query schema version"))?;
    match rows
        .next()
        .await
        .map_err(migration_error("Failed to read schema version"))?
    {
        Some(row) => row
            .get::<i64>(0)
            .map_err(migration_error("Failed to parse schema version")),
        None => Ok(0),
    }
}
