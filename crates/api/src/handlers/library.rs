//! Handlers for the game library catalog.

use axum::extract::{Path, State};
use axum::Json;

use romen_db::models::LibraryEntry;

use crate::error::AppResult;
use crate::response::ActionOutcome;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET /library
// ---------------------------------------------------------------------------

/// List every game in the active catalog.
///
/// With no storage device selected this is an empty list, not an error; the
/// front end renders the same shelf either way.
pub async fn list_library(State(state): State<AppState>) -> AppResult<Json<Vec<LibraryEntry>>> {
    let entries = state.library.list_all().await?;
    Ok(Json(entries))
}

// ---------------------------------------------------------------------------
// DELETE /library/{serial}
// ---------------------------------------------------------------------------

/// Remove a game: its disc image, its cover art, and its catalog row.
///
/// File-level sub-failures do not abort the removal; they surface as
/// warnings on a success outcome.
pub async fn delete_game(
    State(state): State<AppState>,
    Path(serial): Path<String>,
) -> Json<ActionOutcome> {
    match state.controller.remove_game(&serial).await {
        Ok(outcome) if outcome.removed => {
            tracing::info!(%serial, "Game removed");
            Json(ActionOutcome::success("Game removed").with_warnings(outcome.warnings))
        }
        Ok(_) => Json(ActionOutcome::error("Failed to remove game")),
        Err(err) => {
            tracing::error!(%serial, error = %err, "Game removal failed");
            Json(ActionOutcome::error("Failed to remove game"))
        }
    }
}
