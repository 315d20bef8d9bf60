//! Storage-device detection and library-root verification.
//!
//! Answers two questions for the rest of the backend: which mounted volume
//! contains a given path (and what does it look like), and is a path
//! usable as the library root. All operations here are blocking; callers
//! on the async side run them inside `spawn_blocking`.

use std::path::Path;

use serde::Serialize;

use romen_core::CoreError;

pub mod label;
pub mod mounts;
mod usage;

use label::LabelProvider;

/// Filesystems OPL can read from USB. `fuseblk` is how the kernel reports
/// exFAT mounted through FUSE.
const ALLOWED_FILESYSTEMS: &[&str] = &["exfat", "fuseblk"];

/// Point-in-time description of the volume backing a path.
#[derive(Debug, Clone, Serialize)]
pub struct StorageDeviceSnapshot {
    pub label: String,
    pub file_system: String,
    pub space_free: u64,
    pub total_space: u64,
    /// The queried path, echoed back as given.
    pub path: String,
}

/// Mount inspection and label lookup behind a swappable label source.
pub struct DeviceManager {
    labels: Box<dyn LabelProvider>,
}

impl DeviceManager {
    pub fn new() -> Self {
        Self {
            labels: label::platform_provider(),
        }
    }

    /// Manager with a specific label source (tests, exotic platforms).
    pub fn with_provider(labels: Box<dyn LabelProvider>) -> Self {
        Self { labels }
    }

    /// Snapshot of the mounted volume containing `path`.
    ///
    /// The path is canonicalized before matching so symlinked locations
    /// resolve to the mount that actually holds the data.
    pub fn detect(&self, path: &Path) -> Result<StorageDeviceSnapshot, CoreError> {
        let real = std::fs::canonicalize(path)
            .map_err(|_| CoreError::Device("Storage device not detected.".to_string()))?;

        let mounts = mounts::list_mounts()
            .map_err(|e| CoreError::Device(format!("Failed to read mount table: {e}")))?;
        let entry = mounts::select_mount(&mounts, &real.to_string_lossy())
            .ok_or_else(|| CoreError::Device("Storage device not detected.".to_string()))?;

        let (space_free, total_space) = match (entry.free, entry.total) {
            (Some(free), Some(total)) => (free, total),
            _ => usage::disk_usage(&real)
                .map_err(|e| CoreError::Device(format!("Failed to read filesystem stats: {e}")))?,
        };

        Ok(StorageDeviceSnapshot {
            label: self.labels.volume_label(entry),
            file_system: entry.fs_type.clone(),
            space_free,
            total_space,
            path: path.to_string_lossy().into_owned(),
        })
    }

    /// Verify `path` is usable as a library root and materialize the
    /// expected folder layout on it.
    ///
    /// A filesystem outside the OPL-readable set is only warned about;
    /// people do use ext4-formatted drives with network loaders.
    pub fn verify(
        &self,
        path: &Path,
        required_dirs: &[String],
    ) -> Result<StorageDeviceSnapshot, CoreError> {
        if !path.is_dir() {
            return Err(CoreError::Validation("Directory does not exist.".to_string()));
        }

        let snapshot = self.detect(path)?;

        let fs = snapshot.file_system.to_lowercase();
        if !ALLOWED_FILESYSTEMS.iter().any(|allowed| fs.contains(allowed)) {
            tracing::warn!(
                file_system = %snapshot.file_system,
                "Filesystem is not exFAT; OPL may not read this device over USB"
            );
        }

        for dir in required_dirs {
            std::fs::create_dir_all(path.join(dir))?;
        }

        Ok(snapshot)
    }
}

impl Default for DeviceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mounts::MountEntry;

    struct FixedLabel(&'static str);

    impl LabelProvider for FixedLabel {
        fn volume_label(&self, _mount: &MountEntry) -> String {
            self.0.to_string()
        }
    }

    #[test]
    fn verify_rejects_missing_directory() {
        let manager = DeviceManager::with_provider(Box::new(FixedLabel("X")));
        let err = manager
            .verify(Path::new("/no/such/dir"), &["CD".to_string()])
            .unwrap_err();
        assert_eq!(err.to_string(), "Directory does not exist.");
    }

    #[test]
    fn detect_rejects_missing_path() {
        let manager = DeviceManager::with_provider(Box::new(FixedLabel("X")));
        let err = manager.detect(Path::new("/no/such/dir")).unwrap_err();
        assert_eq!(err.to_string(), "Storage device not detected.");
    }

    #[cfg(unix)]
    #[test]
    fn verify_creates_layout_and_reports_device() {
        let dir = tempfile::tempdir().unwrap();
        let manager = DeviceManager::with_provider(Box::new(FixedLabel("TESTVOL")));
        let layout = vec!["CD".to_string(), "DVD".to_string(), "ART".to_string()];

        let snapshot = manager.verify(dir.path(), &layout).unwrap();

        assert_eq!(snapshot.label, "TESTVOL");
        assert_eq!(snapshot.path, dir.path().to_string_lossy());
        assert!(snapshot.total_space > 0);
        for sub in &layout {
            assert!(dir.path().join(sub).is_dir());
        }
    }

    #[cfg(unix)]
    #[test]
    fn detect_reports_capacity_for_a_real_path() {
        let dir = tempfile::tempdir().unwrap();
        let manager = DeviceManager::with_provider(Box::new(FixedLabel("VOL")));

        let snapshot = manager.detect(dir.path()).unwrap();

        assert!(snapshot.space_free <= snapshot.total_space);
        assert!(!snapshot.file_system.is_empty());
    }
}
