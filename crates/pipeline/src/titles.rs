//! Serial→title resolution backed by a local SQLite cache of the GameDB
//! catalog.

use std::collections::HashMap;
use std::path::Path;

use sqlx::SqlitePool;

use romen_core::media::{canonical_serial, UNKNOWN_TITLE};
use romen_db::repositories::TitleMapRepo;
use romen_db::StoreError;

/// File name of the local cache under the app's data directory.
pub const TITLE_MAP_FILE_NAME: &str = "ps2_titlemap.db";

/// Remote catalog with every known PS2 serial→title pair.
pub const TITLE_CATALOG_URL: &str =
    "https://github.com/niemasd/GameDB-PS2/releases/latest/download/PS2.titles.json";

/// Read-mostly serial→title cache.
///
/// The cache is refreshed wholesale from the remote catalog; lookups hit
/// SQLite directly, so a refresh landing mid-run is picked up by the next
/// lookup.
pub struct TitleResolver {
    pool: SqlitePool,
    http: reqwest::Client,
    catalog_url: String,
}

impl TitleResolver {
    /// Open the local cache at `db_path`, creating the file and its parent
    /// directory if needed.
    pub async fn open(db_path: &Path, http: reqwest::Client) -> Result<Self, StoreError> {
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let pool = romen_db::open_database(db_path).await?;
        romen_db::ensure_title_map_schema(&pool).await?;
        Ok(Self {
            pool,
            http,
            catalog_url: TITLE_CATALOG_URL.to_string(),
        })
    }

    /// Point the resolver at a different catalog endpoint.
    pub fn with_catalog_url(mut self, url: impl Into<String>) -> Self {
        self.catalog_url = url.into();
        self
    }

    /// Replace the cache with the full remote catalog.
    ///
    /// Failures are logged and swallowed: ingestion must keep working
    /// offline, falling back to whatever the cache already holds.
    pub async fn refresh(&self) {
        match self.fetch_and_store().await {
            Ok(count) => tracing::info!(entries = count, "Title catalog refreshed"),
            Err(err) => tracing::warn!(
                error = %err,
                "Title catalog refresh failed; keeping previous cache"
            ),
        }
    }

    async fn fetch_and_store(&self) -> Result<u64, RefreshError> {
        let catalog: HashMap<String, String> = self
            .http
            .get(&self.catalog_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        let entries: Vec<(String, String)> = catalog.into_iter().collect();
        Ok(TitleMapRepo::replace_all(&self.pool, &entries).await?)
    }

    /// Display title for a serial, canonicalized before lookup. Falls back
    /// to [`UNKNOWN_TITLE`]; never errors.
    pub async fn lookup(&self, serial: &str) -> String {
        let key = canonical_serial(serial);
        match TitleMapRepo::find_title(&self.pool, &key).await {
            Ok(Some(title)) => title,
            Ok(None) => UNKNOWN_TITLE.to_string(),
            Err(err) => {
                tracing::warn!(serial = %key, error = %err, "Title lookup failed");
                UNKNOWN_TITLE.to_string()
            }
        }
    }

    /// Number of cached mappings.
    pub async fn cached_count(&self) -> i64 {
        TitleMapRepo::count(&self.pool).await.unwrap_or(0)
    }
}

#[derive(Debug, thiserror::Error)]
enum RefreshError {
    #[error("catalog download failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog store failed: {0}")]
    Db(#[from] sqlx::Error),
}
