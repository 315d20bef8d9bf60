//! Library settings file.
//!
//! A small JSON document, kept compatible with existing installs:
//!
//! ```json
//! {
//!   "paths": {
//!     "storage": "/media/usb",
//!     "uploads": "./uploads",
//!     "covers_url": "https://raw.githubusercontent.com/xlenore/ps2-covers/main/covers/default"
//!   },
//!   "structure": ["APPS", "ART", "CD", "CFG", "CHT", "DVD", "LNG", "THM", "VMC"]
//! }
//! ```
//!
//! [`SettingsStore`] owns the in-memory copy behind a lock so the active
//! storage root can be swapped at runtime while in-flight work keeps the
//! value it captured. The only mutating operation is
//! [`SettingsStore::set_storage_root`], which persists to disk before
//! swapping the in-memory value.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

/// Default staging directory for uploads in flight.
pub const DEFAULT_UPLOADS_DIR: &str = "./uploads";

/// Default cover art source.
pub const DEFAULT_COVERS_URL: &str =
    "https://raw.githubusercontent.com/xlenore/ps2-covers/main/covers/default";

/// Folder layout OPL expects at the root of the storage device.
pub const DEFAULT_STRUCTURE: [&str; 9] = [
    "APPS", "ART", "CD", "CFG", "CHT", "DVD", "LNG", "THM", "VMC",
];

fn default_uploads() -> String {
    DEFAULT_UPLOADS_DIR.to_string()
}

fn default_covers_url() -> String {
    DEFAULT_COVERS_URL.to_string()
}

fn default_structure() -> Vec<String> {
    DEFAULT_STRUCTURE.iter().map(|s| s.to_string()).collect()
}

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Path configuration section of the settings file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsPaths {
    /// Root of the storage device; empty until the user selects one.
    #[serde(default)]
    pub storage: String,

    /// Staging directory uploads are written to before transfer.
    #[serde(default = "default_uploads")]
    pub uploads: String,

    /// Base URL cover art is fetched from.
    #[serde(default = "default_covers_url")]
    pub covers_url: String,
}

impl Default for SettingsPaths {
    fn default() -> Self {
        Self {
            storage: String::new(),
            uploads: default_uploads(),
            covers_url: default_covers_url(),
        }
    }
}

/// Full settings document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub paths: SettingsPaths,

    /// Folders created at the storage root when a device is selected.
    #[serde(default = "default_structure")]
    pub structure: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            paths: SettingsPaths::default(),
            structure: default_structure(),
        }
    }
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Shared settings handle: a file path plus the current in-memory copy.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    inner: RwLock<Settings>,
}

impl SettingsStore {
    /// Load settings from `path`, writing the defaults first if the file
    /// does not exist yet.
    pub fn load_or_create(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();
        let settings = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)
                .map_err(|e| CoreError::Validation(format!("Invalid settings file: {e}")))?
        } else {
            let defaults = Settings::default();
            write_settings(&path, &defaults)?;
            tracing::info!(path = %path.display(), "Created default settings file");
            defaults
        };
        Ok(Self {
            path,
            inner: RwLock::new(settings),
        })
    }

    /// Copy of the current settings.
    pub fn snapshot(&self) -> Settings {
        self.read_guard().clone()
    }

    /// Active storage root, or `None` while no device has been selected.
    pub fn storage_root(&self) -> Option<PathBuf> {
        let storage = self.read_guard().paths.storage.clone();
        let trimmed = storage.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(PathBuf::from(trimmed))
        }
    }

    /// Staging directory uploads land in.
    pub fn uploads_dir(&self) -> PathBuf {
        PathBuf::from(&self.read_guard().paths.uploads)
    }

    /// Base URL cover art is fetched from.
    pub fn covers_url(&self) -> String {
        self.read_guard().paths.covers_url.clone()
    }

    /// Folder layout to materialize on the storage device.
    pub fn structure(&self) -> Vec<String> {
        self.read_guard().structure.clone()
    }

    /// Persist `root` as the storage root, then swap the in-memory value.
    ///
    /// The file is patched key-by-key so unknown keys written by other
    /// tools (or future versions) survive the rewrite. If persisting
    /// fails, the in-memory root is left unchanged.
    pub fn set_storage_root(&self, root: &Path) -> Result<(), CoreError> {
        let rendered = root.to_string_lossy().into_owned();

        let mut doc: serde_json::Value = match std::fs::read_to_string(&self.path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| CoreError::Validation(format!("Invalid settings file: {e}")))?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                serde_json::to_value(self.snapshot())
                    .map_err(|e| CoreError::Validation(format!("Settings not serializable: {e}")))?
            }
            Err(err) => return Err(CoreError::Io(err)),
        };

        let obj = doc.as_object_mut().ok_or_else(|| {
            CoreError::Validation("Settings file is not a JSON object".to_string())
        })?;
        let paths = obj
            .entry("paths")
            .or_insert_with(|| serde_json::json!({}));
        match paths.as_object_mut() {
            Some(paths) => {
                paths.insert(
                    "storage".to_string(),
                    serde_json::Value::String(rendered.clone()),
                );
            }
            None => {
                return Err(CoreError::Validation(
                    "Settings 'paths' is not an object".to_string(),
                ))
            }
        }
        write_document(&self.path, &doc)?;

        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        guard.paths.storage = rendered;
        Ok(())
    }

    fn read_guard(&self) -> std::sync::RwLockReadGuard<'_, Settings> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }
}

fn write_settings(path: &Path, settings: &Settings) -> Result<(), CoreError> {
    let doc = serde_json::to_value(settings)
        .map_err(|e| CoreError::Validation(format!("Settings not serializable: {e}")))?;
    write_document(path, &doc)
}

fn write_document(path: &Path, doc: &serde_json::Value) -> Result<(), CoreError> {
    let mut rendered = serde_json::to_string_pretty(doc)
        .map_err(|e| CoreError::Validation(format!("Settings not serializable: {e}")))?;
    rendered.push('\n');
    std::fs::write(path, rendered)?;
    Ok(())
}
