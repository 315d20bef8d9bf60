//! Shared fixture for API integration tests.
//!
//! Builds the full application against temporary directories, mirroring the
//! router construction in `main.rs` so integration tests exercise the same
//! middleware stack (CORS, request ID, tracing, panic recovery) that
//! production uses. No front-end build is wired in, so unmatched routes 404.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use romen_api::config::ServerConfig;
use romen_api::routes;
use romen_api::state::AppState;
use romen_core::settings::SettingsStore;
use romen_db::LibraryStore;
use romen_device::DeviceManager;
use romen_pipeline::{CoverFetcher, JobTracker, TitleResolver, UploadController};

/// CORS origin configured for tests (matching the dev default).
pub const TEST_ORIGIN: &str = "http://localhost:5173";

/// A fully wired application over throwaway directories.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    /// Storage device root, already selected and catalogued.
    pub storage_root: PathBuf,
    /// Staging directory for uploads.
    pub uploads_dir: PathBuf,
    _tmp: tempfile::TempDir,
}

/// Build the application with a pre-selected storage root.
///
/// The covers URL points at an unroutable local port so cover downloads
/// fail fast and soft, the way they do on an offline console setup.
pub async fn build_test_app() -> TestApp {
    let tmp = tempfile::tempdir().expect("tempdir");
    let storage_root = tmp.path().join("usb");
    let uploads_dir = tmp.path().join("uploads");
    std::fs::create_dir_all(&storage_root).expect("create storage root");
    std::fs::create_dir_all(&uploads_dir).expect("create uploads dir");

    let settings_path = tmp.path().join("settings.json");
    let doc = serde_json::json!({
        "paths": {
            "storage": storage_root.to_string_lossy(),
            "uploads": uploads_dir.to_string_lossy(),
            "covers_url": "http://127.0.0.1:9/covers",
        }
    });
    std::fs::write(&settings_path, doc.to_string()).expect("write settings");
    let settings =
        Arc::new(SettingsStore::load_or_create(&settings_path).expect("load settings"));

    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_millis(200))
        .build()
        .expect("http client");

    let titles = Arc::new(
        TitleResolver::open(&tmp.path().join("data").join("titles.db"), http.clone())
            .await
            .expect("title resolver"),
    );

    let library = Arc::new(LibraryStore::new());
    library
        .initialize(&storage_root)
        .await
        .expect("initialize catalog");

    let jobs = Arc::new(JobTracker::new());
    let device = Arc::new(DeviceManager::new());
    let controller = Arc::new(UploadController::new(
        Arc::clone(&jobs),
        Arc::clone(&library),
        titles,
        Arc::clone(&settings),
        CoverFetcher::new(http),
    ));

    let config = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec![TEST_ORIGIN.to_string()],
        settings_path,
        data_dir: tmp.path().join("data"),
        web_dist: tmp.path().join("no-dist"),
    };

    let state = AppState {
        config: Arc::new(config),
        settings,
        library,
        jobs,
        device,
        controller,
    };

    let cors = CorsLayer::new()
        .allow_origin([TEST_ORIGIN.parse().expect("origin")])
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600));

    let request_id_header = HeaderName::from_static("x-request-id");

    let router = Router::new()
        .merge(routes::health::router())
        .merge(routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .with_state(state.clone());

    TestApp {
        router,
        state,
        storage_root,
        uploads_dir,
        _tmp: tmp,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send a GET request and return the raw response.
pub async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    app.oneshot(request).await.expect("response")
}

/// Send a POST request with an empty body.
pub async fn post(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    app.oneshot(request).await.expect("response")
}

/// Send a DELETE request.
pub async fn delete(app: Router, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    app.oneshot(request).await.expect("response")
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("collect body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("JSON body")
}

// ---------------------------------------------------------------------------
// Multipart upload helpers
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "romen-test-boundary";

/// Build a multipart POST carrying `bytes` under the given field name.
pub fn multipart_named(uri: &str, field: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("multipart request")
}

/// Build a disc image upload request on the standard `file` field.
pub fn multipart_upload(uri: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    multipart_named(uri, "file", filename, bytes)
}

/// Poll `/job/{id}` until the job leaves the processing state.
pub async fn wait_for_job(app: &TestApp, job_id: &str) -> serde_json::Value {
    for _ in 0..600 {
        let response = get(app.router.clone(), &format!("/job/{job_id}")).await;
        let body = body_json(response).await;
        if body["status"] != "processing" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {job_id} did not reach a terminal state");
}
