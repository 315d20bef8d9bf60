pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the application route tree.
///
/// Route hierarchy:
///
/// ```text
/// /upload                   stage a disc image, queue ingestion (POST)
/// /job/{job_id}             poll an ingestion job (GET)
///
/// /library                  list catalogued games (GET)
/// /library/{serial}         remove a game (DELETE)
///
/// /device                   describe the selected storage device (GET)
/// /set-device               select and verify a storage device (POST)
/// ```
///
/// Paths are mounted at the root, matching what the bundled front end and
/// existing OPL companion tooling call.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            // Disc images run to several gigabytes; the default 2 MB body
            // cap cannot apply here.
            post(handlers::upload::upload_game).layer(DefaultBodyLimit::disable()),
        )
        .route("/job/{job_id}", get(handlers::upload::job_status))
        .route("/library", get(handlers::library::list_library))
        .route("/library/{serial}", delete(handlers::library::delete_game))
        .route("/device", get(handlers::device::get_device))
        .route("/set-device", post(handlers::device::set_device))
}
