//! Swappable catalog handle bound to the active storage root.

use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use crate::models::library::LibraryEntry;
use crate::repositories::LibraryRepo;

/// Errors from catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No storage root is configured, so the catalog has nowhere to live.
    #[error("no library path selected")]
    NoRoot,

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("failed to prepare catalog directory: {0}")]
    Io(#[from] std::io::Error),
}

struct ActiveCatalog {
    root: PathBuf,
    pool: sqlx::SqlitePool,
}

/// Catalog of ingested games on whichever storage device is active.
///
/// [`LibraryStore::initialize`] swaps the handle atomically: readers that
/// held the old pool finish against it, new operations land on the new
/// device. With no active root, writes fail with [`StoreError::NoRoot`]
/// and listings read as empty.
pub struct LibraryStore {
    active: RwLock<Option<ActiveCatalog>>,
}

impl LibraryStore {
    pub fn new() -> Self {
        Self {
            active: RwLock::new(None),
        }
    }

    /// Open (creating if needed) the catalog on `root` and make it active.
    /// The previous pool, if any, is closed after the swap.
    pub async fn initialize(&self, root: &Path) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(root).await?;
        let db_path = root.join(crate::CATALOG_FILE_NAME);
        let pool = crate::open_database(&db_path).await?;
        crate::ensure_library_schema(&pool).await?;
        tracing::info!(path = %db_path.display(), "Library catalog ready");

        let previous = {
            let mut guard = self.active.write().await;
            guard.replace(ActiveCatalog {
                root: root.to_path_buf(),
                pool,
            })
        };
        if let Some(old) = previous {
            old.pool.close().await;
        }
        Ok(())
    }

    /// Root the active catalog is bound to, if any.
    pub async fn active_root(&self) -> Option<PathBuf> {
        self.active.read().await.as_ref().map(|c| c.root.clone())
    }

    /// Path of the active catalog file, if any.
    pub async fn catalog_path(&self) -> Option<PathBuf> {
        self.active
            .read()
            .await
            .as_ref()
            .map(|c| c.root.join(crate::CATALOG_FILE_NAME))
    }

    pub async fn upsert(&self, entry: &LibraryEntry) -> Result<(), StoreError> {
        let guard = self.active.read().await;
        let catalog = guard.as_ref().ok_or(StoreError::NoRoot)?;
        LibraryRepo::upsert(&catalog.pool, entry).await?;
        Ok(())
    }

    pub async fn find_by_serial(&self, serial: &str) -> Result<Option<LibraryEntry>, StoreError> {
        let guard = self.active.read().await;
        let catalog = guard.as_ref().ok_or(StoreError::NoRoot)?;
        Ok(LibraryRepo::find_by_serial(&catalog.pool, serial).await?)
    }

    /// Every catalog row, or an empty list when no root is active. An
    /// unplugged device should read as an empty library, not an error.
    pub async fn list_all(&self) -> Result<Vec<LibraryEntry>, StoreError> {
        let guard = self.active.read().await;
        match guard.as_ref() {
            Some(catalog) => Ok(LibraryRepo::list_all(&catalog.pool).await?),
            None => {
                tracing::warn!("No library path set; returning empty library");
                Ok(Vec::new())
            }
        }
    }

    /// Delete a row by serial. Returns whether a row existed.
    pub async fn remove(&self, serial: &str) -> Result<bool, StoreError> {
        let guard = self.active.read().await;
        let catalog = guard.as_ref().ok_or(StoreError::NoRoot)?;
        Ok(LibraryRepo::remove(&catalog.pool, serial).await?)
    }
}

impl Default for LibraryStore {
    fn default() -> Self {
        Self::new()
    }
}
