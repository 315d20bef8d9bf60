//! Integration tests for the upload endpoint and job polling.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, multipart_named, multipart_upload, wait_for_job};
use romen_iso::testing;
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: a full upload round trip lands a game in the library
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn upload_roundtrip_registers_game() {
    let app = common::build_test_app().await;
    let image = testing::build_disc_image("SLUS_200.02");

    let request = multipart_upload("/upload", "upload.iso", &image);
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let accepted = body_json(response).await;
    let job_id = accepted["job_id"].as_str().expect("job id").to_string();

    let outcome = wait_for_job(&app, &job_id).await;
    assert_eq!(outcome["status"], "completed");
    assert_eq!(outcome["title"], "Unknown Game");
    assert_eq!(outcome["message"], "Unknown Game Added To Library");
    assert!(
        outcome["cover_url"]
            .as_str()
            .expect("cover url")
            .ends_with("/SLUS-20002.jpg"),
        "unexpected cover url: {}",
        outcome["cover_url"]
    );

    // The catalog now lists the game under its canonical serial.
    let listing = body_json(get(app.router.clone(), "/library").await).await;
    let rows = listing.as_array().expect("array");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["serial"], "SLUS-20002");
    assert_eq!(rows[0]["title"], "Unknown Game");

    // The image was placed in the CD bucket (well under the DVD threshold)
    // and the staging directory was drained.
    let dest = app
        .storage_root
        .join("CD")
        .join("SLUS_200.02.Unknown Game.iso");
    assert!(dest.is_file(), "missing {}", dest.display());
    assert_eq!(std::fs::read_dir(&app.uploads_dir).unwrap().count(), 0);
}

// ---------------------------------------------------------------------------
// Test: an image with no boot config fails the job and cleans staging
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn upload_without_serial_reports_job_error() {
    let app = common::build_test_app().await;

    let request = multipart_upload("/upload", "garbage.iso", b"not an iso at all");
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let accepted = body_json(response).await;
    let job_id = accepted["job_id"].as_str().expect("job id").to_string();

    let outcome = wait_for_job(&app, &job_id).await;
    assert_eq!(outcome["status"], "error");
    assert_eq!(outcome["message"], "Game Lacks Valid Serial Number");

    // Nothing was catalogued and the staged file is gone.
    let listing = body_json(get(app.router.clone(), "/library").await).await;
    assert_eq!(listing, serde_json::json!([]));
    assert_eq!(std::fs::read_dir(&app.uploads_dir).unwrap().count(), 0);
}

// ---------------------------------------------------------------------------
// Test: multipart without a `file` field is a 400
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn upload_without_file_field_is_rejected() {
    let app = common::build_test_app().await;

    let request = multipart_named("/upload", "attachment", "game.iso", b"bytes");
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
}

// ---------------------------------------------------------------------------
// Test: unknown and malformed job ids read as still processing
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn unknown_job_ids_read_as_processing() {
    let app = common::build_test_app().await;

    let uri = format!("/job/{}", uuid::Uuid::new_v4());
    let body = body_json(get(app.router.clone(), &uri).await).await;
    assert_eq!(body, serde_json::json!({"status": "processing"}));

    let body = body_json(get(app.router.clone(), "/job/not-a-uuid").await).await;
    assert_eq!(body, serde_json::json!({"status": "processing"}));
}
