//! Repository for the `library` table.

use sqlx::SqlitePool;

use crate::models::library::LibraryEntry;

/// Column list for `library` queries.
const COLUMNS: &str = "serial, title, filepath, size, cover_url";

/// CRUD operations for the game catalog.
pub struct LibraryRepo;

impl LibraryRepo {
    /// Insert a row, replacing any existing row with the same serial.
    /// Re-ingesting a game updates its catalog entry in place.
    pub async fn upsert(pool: &SqlitePool, entry: &LibraryEntry) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT OR REPLACE INTO library (serial, title, filepath, size, cover_url) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&entry.serial)
        .bind(&entry.title)
        .bind(&entry.filepath)
        .bind(entry.size)
        .bind(&entry.cover_url)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Fetch a row by exact serial. No normalization happens here; callers
    /// pass the form used at write time.
    pub async fn find_by_serial(
        pool: &SqlitePool,
        serial: &str,
    ) -> Result<Option<LibraryEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM library WHERE serial = ?");
        sqlx::query_as::<_, LibraryEntry>(&query)
            .bind(serial)
            .fetch_optional(pool)
            .await
    }

    /// Every catalog row.
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<LibraryEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM library");
        sqlx::query_as::<_, LibraryEntry>(&query)
            .fetch_all(pool)
            .await
    }

    /// Delete a row by serial. Returns whether a row existed.
    pub async fn remove(pool: &SqlitePool, serial: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM library WHERE serial = ?")
            .bind(serial)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
