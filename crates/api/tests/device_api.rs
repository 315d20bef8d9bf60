//! Integration tests for storage device detection and selection.
//!
//! Detection reads the live mount table, so the snapshot assertions are
//! Unix-only; the selection flow (canonicalize, layout, persist) is
//! platform-neutral.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post};

// ---------------------------------------------------------------------------
// Test: GET /device describes the selected root
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn get_device_returns_snapshot() {
    let app = common::build_test_app().await;
    let response = get(app.router.clone(), "/device").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    // The temp root always sits under some mounted filesystem.
    assert!(body["label"].is_string());
    assert!(body["file_system"].is_string());
    assert_eq!(
        body["path"],
        app.storage_root.to_string_lossy().into_owned()
    );
    let total = body["total_space"].as_u64().expect("total_space");
    let free = body["space_free"].as_u64().expect("space_free");
    assert!(total > 0);
    assert!(free <= total);
}

// ---------------------------------------------------------------------------
// Test: POST /set-device rejects a nonexistent directory
// ---------------------------------------------------------------------------

#[tokio::test(flavor = "multi_thread")]
async fn set_device_rejects_missing_directory() {
    let app = common::build_test_app().await;

    let response = post(
        app.router.clone(),
        "/set-device?path=/definitely/not/a/mounted/device",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Directory does not exist.");
}

// ---------------------------------------------------------------------------
// Test: POST /set-device builds the layout and persists the root
// ---------------------------------------------------------------------------

#[cfg(unix)]
#[tokio::test(flavor = "multi_thread")]
async fn set_device_updates_root_and_builds_layout() {
    let app = common::build_test_app().await;
    let new_root = app.storage_root.parent().unwrap().join("usb2");
    std::fs::create_dir_all(&new_root).unwrap();
    let real = std::fs::canonicalize(&new_root).unwrap();

    let uri = format!("/set-device?path={}", new_root.to_string_lossy());
    let response = post(app.router.clone(), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Storage path updated successfully");
    assert_eq!(body["path"], real.to_string_lossy().into_owned());

    // The console folder layout was materialized on the device.
    for sub in ["APPS", "ART", "CD", "CFG", "CHT", "DVD", "LNG", "THM", "VMC"] {
        assert!(new_root.join(sub).is_dir(), "missing {sub}/");
    }

    // The selection was persisted and the catalog opened on the new root.
    assert_eq!(app.state.settings.storage_root(), Some(real.clone()));
    assert!(real.join("romen_ps2.db").is_file());
}
