//! Upload ingestion and library removal.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use romen_core::media;
use romen_core::settings::SettingsStore;
use romen_core::CoreError;

use romen_db::models::LibraryEntry;
use romen_db::{LibraryStore, StoreError};

use crate::covers::CoverFetcher;
use crate::jobs::{JobState, JobTracker};
use crate::titles::TitleResolver;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A pipeline failure. The display string is the terminal job message the
/// client sees when polling.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Upload failed: Temp file not found.")]
    StagedFileMissing,

    #[error("Game Lacks Valid Serial Number")]
    MissingSerial,

    #[error("No storage device selected.")]
    NoStorageRoot,

    #[error("Failed to transfer to USB: {0}")]
    Transfer(#[source] CoreError),

    #[error("Failed to update library catalog: {0}")]
    Catalog(#[source] StoreError),

    #[error("{0}")]
    Internal(String),
}

/// Result of a removal request.
#[derive(Debug)]
pub struct RemovalOutcome {
    /// Whether the game was in the catalog and its row is now gone.
    pub removed: bool,
    /// File-level sub-failures that did not block the removal.
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Orchestrates one background ingestion per accepted upload, plus the
/// mirror-image removal flow.
pub struct UploadController {
    jobs: Arc<JobTracker>,
    library: Arc<LibraryStore>,
    titles: Arc<TitleResolver>,
    settings: Arc<SettingsStore>,
    covers: CoverFetcher,
    /// Serializes pipelines that resolve to the same destination file, so
    /// two uploads of one title cannot interleave copy and verification.
    dest_locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl UploadController {
    pub fn new(
        jobs: Arc<JobTracker>,
        library: Arc<LibraryStore>,
        titles: Arc<TitleResolver>,
        settings: Arc<SettingsStore>,
        covers: CoverFetcher,
    ) -> Self {
        Self {
            jobs,
            library,
            titles,
            settings,
            covers,
            dest_locks: Mutex::new(HashMap::new()),
        }
    }

    /// Record a new job for the staged file and hand it to a background
    /// task. Returns the job id immediately; the outcome lands in the
    /// tracker.
    pub async fn accept(self: Arc<Self>, staged: PathBuf) -> Uuid {
        let id = self.jobs.start().await;
        let controller = Arc::clone(&self);
        tokio::spawn(async move {
            let state = match controller.run_pipeline(&staged).await {
                Ok(state) => state,
                Err(err) => {
                    tracing::error!(job = %id, error = %err, "Upload pipeline failed");
                    JobState::Error {
                        message: err.to_string(),
                    }
                }
            };
            controller.jobs.finish(id, state).await;
        });
        id
    }

    async fn run_pipeline(&self, staged: &Path) -> Result<JobState, IngestError> {
        let result = self.execute(staged).await;
        // The staging directory never accumulates: whatever went wrong,
        // the staged upload is gone afterwards.
        if result.is_err() {
            remove_quietly(staged).await;
        }
        result
    }

    async fn execute(&self, staged: &Path) -> Result<JobState, IngestError> {
        if !tokio::fs::try_exists(staged).await.unwrap_or(false) {
            return Err(IngestError::StagedFileMissing);
        }

        // Root and cover source are captured once; a device change mid-run
        // does not move the destination under this job.
        let root = self.settings.storage_root().ok_or(IngestError::NoStorageRoot)?;
        let covers_url = self.settings.covers_url();

        let serial = extract_serial_off_thread(staged).await?;
        let Some(serial) = serial else {
            return Err(IngestError::MissingSerial);
        };

        let title = self.titles.lookup(&serial).await;
        let clean_title = media::sanitize_title(&title);

        let size = tokio::fs::metadata(staged)
            .await
            .map_err(|e| IngestError::Transfer(CoreError::Io(e)))?
            .len();
        let dest_dir = root.join(media::media_subfolder(size));
        let dest_path = dest_dir.join(media::image_filename(&serial, &clean_title));

        tracing::info!(
            title = %clean_title,
            dest = %dest_path.display(),
            "Transferring image to storage device"
        );

        let lock = self.destination_lock(&dest_path).await;
        let _guard = lock.lock().await;

        if let Err(err) = self.transfer(staged, &dest_dir, &dest_path, size).await {
            remove_quietly(&dest_path).await;
            return Err(IngestError::Transfer(err));
        }

        let cover_url = media::cover_art_url(&covers_url, &serial);
        let entry = LibraryEntry {
            serial: media::canonical_serial(&serial),
            title: clean_title.clone(),
            filepath: dest_path.to_string_lossy().into_owned(),
            size: Some(size as i64),
            cover_url: Some(cover_url.clone()),
        };
        self.library.upsert(&entry).await.map_err(IngestError::Catalog)?;

        self.covers.fetch(&root, &covers_url, &serial).await;

        Ok(JobState::Completed {
            message: format!("{clean_title} Added To Library"),
            title: clean_title,
            cover_url,
        })
    }

    /// Copy, verify, and drop the staged source. Any error maps to the
    /// transfer failure branch; the caller removes the partial destination.
    async fn transfer(
        &self,
        staged: &Path,
        dest_dir: &Path,
        dest_path: &Path,
        expected_size: u64,
    ) -> Result<(), CoreError> {
        tokio::fs::create_dir_all(dest_dir).await?;

        if tokio::fs::try_exists(dest_path).await.unwrap_or(false) {
            tracing::warn!(path = %dest_path.display(), "Destination already exists; overwriting");
        }

        tokio::fs::copy(staged, dest_path).await?;

        let copied = tokio::fs::metadata(dest_path).await?.len();
        if copied != expected_size {
            return Err(CoreError::Integrity(
                "Copy validation failed: Destination size mismatch.".to_string(),
            ));
        }

        tokio::fs::remove_file(staged).await?;
        tracing::info!("Transfer complete; staged upload removed");
        Ok(())
    }

    async fn destination_lock(&self, dest: &Path) -> Arc<Mutex<()>> {
        let mut locks = self.dest_locks.lock().await;
        locks.entry(dest.to_path_buf()).or_default().clone()
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Remove a game: its image file, its cover art, and its catalog row,
    /// in that order. A serial with no catalog row is a failed removal and
    /// touches nothing on disk; file-level failures after that point are
    /// collected as warnings rather than aborting.
    pub async fn remove_game(&self, serial: &str) -> Result<RemovalOutcome, StoreError> {
        let Some(entry) = self.library.find_by_serial(serial).await? else {
            tracing::warn!(serial = %serial, "Cannot remove: not in library");
            return Ok(RemovalOutcome {
                removed: false,
                warnings: Vec::new(),
            });
        };

        let mut warnings = Vec::new();

        let image_path = PathBuf::from(&entry.filepath);
        match tokio::fs::remove_file(&image_path).await {
            Ok(()) => tracing::info!(path = %image_path.display(), "Deleted image"),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warnings.push(format!("Image file not found at {}", image_path.display()));
            }
            Err(err) => {
                warnings.push(format!("Failed to delete image file: {err}"));
            }
        }

        // Covers are stored under the active root's ART folder, mirroring
        // where ingest puts them. A cover that was never fetched is not a
        // warning.
        if let Some(root) = self.settings.storage_root() {
            let cover_path = root
                .join(media::ART_SUBFOLDER)
                .join(media::cover_filename(serial));
            match tokio::fs::remove_file(&cover_path).await {
                Ok(()) => tracing::info!(path = %cover_path.display(), "Deleted cover art"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    warnings.push(format!("Failed to delete cover art: {err}"));
                }
            }
        }

        if !self.library.remove(serial).await? {
            warnings.push("Catalog row was already gone".to_string());
        }

        Ok(RemovalOutcome {
            removed: true,
            warnings,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// ISO parsing is seek-heavy synchronous I/O; keep it off the async
/// workers.
async fn extract_serial_off_thread(path: &Path) -> Result<Option<String>, IngestError> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || romen_iso::extract_serial(&path))
        .await
        .map_err(|e| IngestError::Internal(format!("Serial extraction task failed: {e}")))
}

/// Best-effort delete; a missing file is not an event worth reporting.
async fn remove_quietly(path: &Path) {
    if let Err(err) = tokio::fs::remove_file(path).await {
        if err.kind() != std::io::ErrorKind::NotFound {
            tracing::debug!(path = %path.display(), error = %err, "Cleanup failed");
        }
    }
}
