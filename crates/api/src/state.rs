use std::sync::Arc;

use romen_core::settings::SettingsStore;
use romen_db::LibraryStore;
use romen_device::DeviceManager;
use romen_pipeline::{JobTracker, UploadController};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (bind address, staging paths, CORS origins).
    pub config: Arc<ServerConfig>,
    /// User-editable settings file (storage root, folder layout).
    pub settings: Arc<SettingsStore>,
    /// Catalog of games on the active storage device.
    pub library: Arc<LibraryStore>,
    /// In-flight and finished upload job states.
    pub jobs: Arc<JobTracker>,
    /// Storage device detection and verification.
    pub device: Arc<DeviceManager>,
    /// Ingestion pipeline entry point.
    pub controller: Arc<UploadController>,
}
