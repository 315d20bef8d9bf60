//! Handlers for storage device detection and selection.
//!
//! Device probes read mount tables and call platform tools, so they run on
//! the blocking pool rather than the async workers.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use romen_core::error::CoreError;

use crate::response::ActionOutcome;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /device
// ---------------------------------------------------------------------------

/// Describe the currently selected storage device.
///
/// Failures are reported as an error outcome rather than an HTTP error; the
/// front end treats both "nothing selected" and "device unplugged" as the
/// same empty state.
pub async fn get_device(State(state): State<AppState>) -> Response {
    let Some(root) = state.settings.storage_root() else {
        return Json(ActionOutcome::error("Failed to get storage device")).into_response();
    };

    let device = state.device.clone();
    let probe = tokio::task::spawn_blocking(move || device.detect(&root)).await;

    match probe {
        Ok(Ok(snapshot)) => Json(snapshot).into_response(),
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "Storage device probe failed");
            Json(ActionOutcome::error("Failed to get storage device")).into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "Storage device probe panicked");
            Json(ActionOutcome::error("Failed to get storage device")).into_response()
        }
    }
}

// ---------------------------------------------------------------------------
// POST /set-device
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SetDeviceParams {
    pub path: String,
}

/// Select a storage device by path, verify it, and open its catalog.
///
/// The path is canonicalized and checked against the mount table, the
/// console folder layout is created, and the selection is persisted before
/// the catalog is opened on the device.
pub async fn set_device(
    State(state): State<AppState>,
    Query(params): Query<SetDeviceParams>,
) -> Json<ActionOutcome> {
    let device = state.device.clone();
    let settings = state.settings.clone();
    let structure = state.settings.structure();
    let requested = params.path.clone();

    let verified = tokio::task::spawn_blocking(move || {
        let real = std::fs::canonicalize(&requested)
            .map_err(|_| CoreError::Validation("Directory does not exist.".to_string()))?;
        device.verify(&real, &structure)?;
        settings.set_storage_root(&real)?;
        Ok::<_, CoreError>(real)
    })
    .await;

    let real = match verified {
        Ok(Ok(real)) => real,
        Ok(Err(err)) => {
            tracing::warn!(path = %params.path, error = %err, "Device selection rejected");
            return Json(ActionOutcome::error(err.to_string()));
        }
        Err(err) => {
            tracing::error!(path = %params.path, error = %err, "Device selection panicked");
            return Json(ActionOutcome::error("Failed to set storage device"));
        }
    };

    // Selection is already persisted; a catalog failure here leaves the root
    // set so a replug can recover without reselecting.
    if let Err(err) = state.library.initialize(&real).await {
        tracing::error!(root = %real.display(), error = %err, "Failed to open library catalog");
        return Json(ActionOutcome::error(err.to_string()));
    }

    tracing::info!(root = %real.display(), "Storage device selected");
    Json(
        ActionOutcome::success("Storage path updated successfully")
            .with_path(real.to_string_lossy().into_owned()),
    )
}
