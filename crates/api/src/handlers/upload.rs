//! Handlers for disc image upload and job polling.
//!
//! Uploads are staged to the local uploads directory and handed to the
//! ingestion pipeline, which runs them in the background. The response
//! carries a job id the client polls for the outcome.

use std::path::{Path as FsPath, PathBuf};

use axum::extract::{Multipart, Path, State};
use axum::Json;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use romen_pipeline::JobState;

use crate::error::{AppError, AppResult};
use crate::response::JobAccepted;
use crate::state::AppState;

/// Multipart field name carrying the disc image.
const FILE_FIELD: &str = "file";

// ---------------------------------------------------------------------------
// POST /upload
// ---------------------------------------------------------------------------

/// Stage an uploaded disc image and queue it for ingestion.
///
/// Streams the `file` multipart field to the uploads directory under its
/// original basename, then returns the ingestion job id immediately.
pub async fn upload_game(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<JobAccepted>> {
    let uploads_dir = state.settings.uploads_dir();
    tokio::fs::create_dir_all(&uploads_dir)
        .await
        .map_err(|err| AppError::InternalError(format!("Failed to create uploads dir: {err}")))?;

    let mut staged: Option<PathBuf> = None;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("Malformed upload: {err}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .map(sanitize_upload_name)
            .unwrap_or_default();
        if file_name.is_empty() {
            return Err(AppError::BadRequest("Upload is missing a filename".into()));
        }

        let dest = uploads_dir.join(&file_name);
        tracing::info!(file = %file_name, "Receiving file");

        let mut out = tokio::fs::File::create(&dest).await.map_err(|err| {
            AppError::InternalError(format!("Failed to create staging file: {err}"))
        })?;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|err| AppError::BadRequest(format!("Upload interrupted: {err}")))?
        {
            out.write_all(&chunk).await.map_err(|err| {
                AppError::InternalError(format!("Failed to write staging file: {err}"))
            })?;
        }
        out.flush().await.map_err(|err| {
            AppError::InternalError(format!("Failed to write staging file: {err}"))
        })?;

        staged = Some(dest);
        break;
    }

    let staged = staged
        .ok_or_else(|| AppError::BadRequest(format!("Missing '{FILE_FIELD}' field in upload")))?;

    let job_id = state.controller.clone().accept(staged).await;
    Ok(Json(JobAccepted::new(job_id)))
}

// ---------------------------------------------------------------------------
// GET /job/{job_id}
// ---------------------------------------------------------------------------

/// Report the state of an ingestion job.
///
/// Unknown and malformed ids both read as still processing; the client keeps
/// polling and the job map stays free of speculative entries.
pub async fn job_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Json<JobState> {
    let state_for_id = match Uuid::parse_str(&job_id) {
        Ok(id) => state.jobs.status(id).await,
        Err(_) => JobState::Processing,
    };
    Json(state_for_id)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reduce a client-supplied filename to its basename.
///
/// Strips any directory components so a crafted filename cannot escape the
/// uploads directory.
fn sanitize_upload_name(raw: &str) -> String {
    FsPath::new(raw)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- sanitize_upload_name -----------------------------------------------

    #[test]
    fn plain_names_pass_through() {
        assert_eq!(sanitize_upload_name("game.iso"), "game.iso");
    }

    #[test]
    fn directory_components_are_stripped() {
        assert_eq!(sanitize_upload_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_upload_name("uploads/game.iso"), "game.iso");
    }

    #[test]
    fn bare_traversal_yields_empty() {
        assert_eq!(sanitize_upload_name(".."), "");
        assert_eq!(sanitize_upload_name(""), "");
    }
}
