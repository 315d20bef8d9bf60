//! Cover-art download.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use romen_core::media::{cover_art_url, cover_filename, ART_SUBFOLDER};

/// Streams box art into the device's ART folder.
///
/// Covers are cosmetic, so every failure (offline, unknown serial, full
/// disk) is logged and collapsed to `None`; the ingest that requested the
/// cover proceeds regardless.
pub struct CoverFetcher {
    http: reqwest::Client,
}

impl CoverFetcher {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Download `<covers_url>/<canonical serial>.jpg` to
    /// `<root>/ART/<canonical serial>_COV.jpg`, returning the saved path.
    pub async fn fetch(&self, root: &Path, covers_url: &str, serial: &str) -> Option<PathBuf> {
        match self.try_fetch(root, covers_url, serial).await {
            Ok(path) => {
                tracing::info!(path = %path.display(), "Cover art saved");
                Some(path)
            }
            Err(err) => {
                tracing::warn!(serial = %serial, error = %err, "Cover art download failed");
                None
            }
        }
    }

    async fn try_fetch(
        &self,
        root: &Path,
        covers_url: &str,
        serial: &str,
    ) -> Result<PathBuf, CoverError> {
        let art_dir = root.join(ART_SUBFOLDER);
        tokio::fs::create_dir_all(&art_dir).await?;
        let target = art_dir.join(cover_filename(serial));

        let url = cover_art_url(covers_url, serial);
        tracing::debug!(url = %url, "Downloading cover art");
        let mut response = self.http.get(&url).send().await?.error_for_status()?;

        let mut file = tokio::fs::File::create(&target).await?;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(target)
    }
}

#[derive(Debug, thiserror::Error)]
enum CoverError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}
