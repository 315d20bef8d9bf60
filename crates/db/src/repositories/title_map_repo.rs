//! Repository for the `title_map` table.

use sqlx::SqlitePool;

/// Operations on the serial→title cache.
pub struct TitleMapRepo;

impl TitleMapRepo {
    /// Replace the entire mapping in one transaction, so readers never
    /// observe a half-loaded catalog and a failed refresh leaves the
    /// previous contents intact.
    pub async fn replace_all(
        pool: &SqlitePool,
        entries: &[(String, String)],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM title_map").execute(&mut *tx).await?;
        for (serial, title) in entries {
            sqlx::query("INSERT OR REPLACE INTO title_map (serial, title) VALUES (?, ?)")
                .bind(serial)
                .bind(title)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(entries.len() as u64)
    }

    /// Title for an exact serial key, if mapped.
    pub async fn find_title(
        pool: &SqlitePool,
        serial: &str,
    ) -> Result<Option<String>, sqlx::Error> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT title FROM title_map WHERE serial = ?")
                .bind(serial)
                .fetch_optional(pool)
                .await?;
        Ok(row.map(|(title,)| title))
    }

    /// Number of cached mappings.
    pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM title_map")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
