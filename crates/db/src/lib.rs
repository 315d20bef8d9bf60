//! SQLite persistence for the game catalog and the serial→title map.
//!
//! The catalog lives on the removable device itself (`<root>/romen_ps2.db`)
//! so the library travels with the drive; it is reopened whenever the
//! active root changes. The title map is a local file under the app's data
//! directory. Both are single-table databases, so schema bootstrap is a
//! `CREATE TABLE IF NOT EXISTS` at open time rather than a migration
//! framework.

use std::path::Path;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

pub mod models;
pub mod repositories;
mod store;

pub use store::{LibraryStore, StoreError};

/// Catalog file created at the root of the storage device.
pub const CATALOG_FILE_NAME: &str = "romen_ps2.db";

/// Wait this long on a locked database before giving up. Removable media
/// is slow; concurrent pipeline jobs briefly contend on the catalog.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a SQLite database file, creating it if missing.
pub async fn open_database(path: &Path) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .busy_timeout(BUSY_TIMEOUT);
    SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
}

/// Create the catalog schema if it does not exist yet.
pub async fn ensure_library_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS library ( \
            serial TEXT PRIMARY KEY, \
            title TEXT NOT NULL, \
            filepath TEXT NOT NULL, \
            size INTEGER, \
            cover_url TEXT \
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Create the title-map schema if it does not exist yet.
pub async fn ensure_title_map_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS title_map ( \
            serial TEXT PRIMARY KEY, \
            title TEXT NOT NULL \
        )",
    )
    .execute(pool)
    .await?;
    Ok(())
}
