use std::path::PathBuf;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub const DEFAULT_CONTENT_DIR: &str = "web/thesauruses";
pub const DEFAULT_PORT: u16 = 8000;

/// Runtime configuration loaded from environment variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Content root (from THESAURUS_CONTENT_DIR)
    pub content_dir: PathBuf,
    /// HTTP port (from THESAURUS_PORT)
    pub port: u16,
    /// Lookup log database (from THESAURUS_DB_PATH); the platform data
    /// directory when unset
    pub db_path: Option<PathBuf>,
    /// Allowed CORS origins (from THESAURUS_CORS_ORIGINS, comma-separated)
    pub cors_origins: Option<Vec<String>>,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let content_dir = var("THESAURUS_CONTENT_DIR")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTENT_DIR));

        let port = var("THESAURUS_PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let db_path = var("THESAURUS_DB_PATH")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let cors_origins = var("THESAURUS_CORS_ORIGINS").map(|s| {
            s.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        });

        Self {
            content_dir,
            port,
            db_path,
            cors_origins,
        }
    }

    /// Permissive unless origins are configured.
    pub fn cors_layer(&self) -> CorsLayer {
        match &self.cors_origins {
            None => CorsLayer::permissive(),
            Some(origins) => {
                let origins: Vec<HeaderValue> = origins
                    .iter()
                    .filter_map(|origin| match origin.parse() {
                        Ok(value) => Some(value),
                        Err(_) => {
                            tracing::warn!(%origin, "ignoring invalid CORS origin");
                            None
                        }
                    })
                    .collect();
                CorsLayer::new()
                    .allow_origin(AllowOrigin::list(origins))
                    .allow_methods([Method::GET])
            }
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
