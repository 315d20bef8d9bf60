use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, Method};
use axum::{Json, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use romen_api::config::ServerConfig;
use romen_api::{routes, state};
use romen_core::settings::SettingsStore;
use romen_db::LibraryStore;
use romen_device::DeviceManager;
use romen_pipeline::{CoverFetcher, JobTracker, TitleResolver, UploadController};

use state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "romen_api=debug,romen_pipeline=debug,romen_device=debug,romen_db=debug,tower_http=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Settings file ---
    let settings = Arc::new(
        SettingsStore::load_or_create(&config.settings_path).expect("Failed to load settings"),
    );
    tokio::fs::create_dir_all(settings.uploads_dir())
        .await
        .expect("Failed to create uploads directory");

    // --- HTTP client (title catalog, cover art) ---
    let http = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .expect("Failed to build HTTP client");

    // --- Title map ---
    let title_db = config.data_dir.join(romen_pipeline::titles::TITLE_MAP_FILE_NAME);
    let titles = Arc::new(
        TitleResolver::open(&title_db, http.clone())
            .await
            .expect("Failed to open title map database"),
    );
    titles.refresh().await;

    // --- Library catalog ---
    let library = Arc::new(LibraryStore::new());
    if let Some(root) = settings.storage_root() {
        if let Err(err) = library.initialize(&root).await {
            tracing::warn!(
                root = %root.display(),
                error = %err,
                "Library catalog unavailable; storage device may be unplugged"
            );
        }
    } else {
        tracing::info!("No storage device selected yet");
    }

    let catalog = match library.catalog_path().await {
        Some(path) => path.display().to_string(),
        None => "Not Set".to_string(),
    };
    tracing::info!(
        %catalog,
        cached_titles = titles.cached_count().await,
        "Store status"
    );

    // --- CORS ---
    let cors = build_cors_layer(&config);

    // --- Pipeline ---
    let jobs = Arc::new(JobTracker::new());
    let device = Arc::new(DeviceManager::new());
    let controller = Arc::new(UploadController::new(
        Arc::clone(&jobs),
        Arc::clone(&library),
        Arc::clone(&titles),
        Arc::clone(&settings),
        CoverFetcher::new(http),
    ));

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        settings,
        library,
        jobs,
        device,
        controller,
    };

    // --- Request ID header name ---
    let request_id_header = HeaderName::from_static("x-request-id");

    // --- Router ---
    let mut app = Router::new()
        .merge(routes::health::router())
        .merge(routes::api_routes());

    // Unmatched routes fall through to the built front end when one exists.
    if config.web_dist.is_dir() {
        let index = config.web_dist.join("index.html");
        tracing::info!(dist = %config.web_dist.display(), "Serving front end");
        app = app.fallback_service(
            ServeDir::new(&config.web_dist).not_found_service(ServeFile::new(index)),
        );
    } else {
        tracing::warn!(dist = %config.web_dist.display(), "Front end build not found");
        app = app.fallback(missing_frontend);
    }

    // -- Middleware stack (applied bottom-up) --
    // No request timeout layer: uploads run to several gigabytes and the
    // ingestion jobs they start have no deadline.
    let app = app
        // Panic recovery: catch panics and return 500.
        .layer(CatchPanicLayer::new())
        // Propagate request ID to response.
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        // Structured request/response tracing.
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Set request ID on incoming requests.
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        // CORS.
        .layer(cors)
        // Shared state.
        .with_state(state);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Fallback when no front-end build is available.
async fn missing_frontend() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "error": "Frontend build not found. Verify that build exists & is routed properly."
    }))
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix) so the server
/// shuts down cleanly whether stopped interactively or by a process
/// manager (e.g. systemd, Docker).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

/// Build the CORS middleware layer from server configuration.
///
/// Panics at startup if any configured origin is invalid, which is the
/// desired behaviour -- we want misconfiguration to fail fast.
fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<_> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}
