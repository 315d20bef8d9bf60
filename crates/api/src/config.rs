use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// Location of the user-editable settings file.
    pub settings_path: PathBuf,
    /// Directory for server-local data such as the title-map cache.
    pub data_dir: PathBuf,
    /// Built front-end assets, served as a static fallback when present.
    pub web_dist: PathBuf,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var         | Default                                       |
    /// |-----------------|-----------------------------------------------|
    /// | `HOST`          | `0.0.0.0`                                     |
    /// | `PORT`          | `8000`                                        |
    /// | `CORS_ORIGINS`  | `http://localhost:5173,http://127.0.0.1:5173` |
    /// | `SETTINGS_PATH` | `settings.json`                               |
    /// | `DATA_DIR`      | `./data`                                      |
    /// | `WEB_DIST`      | `../romen-ps2-front/dist`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let settings_path =
            PathBuf::from(std::env::var("SETTINGS_PATH").unwrap_or_else(|_| "settings.json".into()));

        let data_dir = PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".into()));

        let web_dist = PathBuf::from(
            std::env::var("WEB_DIST").unwrap_or_else(|_| "../romen-ps2-front/dist".into()),
        );

        Self {
            host,
            port,
            cors_origins,
            settings_path,
            data_dir,
            web_dist,
        }
    }
}
