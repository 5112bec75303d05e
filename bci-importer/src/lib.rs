//! bci-importer library interface
//!
//! Bulk CSV import pipeline: records → entities (create-or-update) →
//! scalar attributes + repeated group items, with remote files pulled in as
//! deduplicated assets. Exposed over HTTP by `build_router` and used directly
//! by the `import` CLI command and integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use crate::error::{ApiError, ApiResult, ImportError, ImportResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use bci_common::config::ImportConfig;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::ImportSettings;
use crate::store::NetworkFetcher;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Network fetcher used for remote assets
    pub fetcher: Arc<dyn NetworkFetcher>,
    /// TOML import defaults (database settings override per run)
    pub import_config: ImportConfig,
    /// Directory holding stored asset files
    pub asset_dir: PathBuf,
    /// Base URL stored assets are served under, fixed when the router is built
    pub asset_base_url: String,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last fatal import error, for diagnostics
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        fetcher: Arc<dyn NetworkFetcher>,
        import_config: ImportConfig,
        asset_dir: PathBuf,
    ) -> Self {
        let asset_base_url = import_config.asset_base_url.clone();
        Self {
            db,
            fetcher,
            import_config,
            asset_dir,
            asset_base_url,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Serve assets under the base URL in effect now (database → env → TOML)
    ///
    /// Locators are built per run from the same tiers; changing
    /// `import_asset_base_url` later takes a restart before new locators
    /// are served.
    pub async fn with_resolved_asset_base_url(mut self) -> bci_common::Result<Self> {
        let settings =
            ImportSettings::resolve(&self.db, &self.import_config, self.asset_dir.clone()).await?;
        self.asset_base_url = settings.asset_base_url;
        Ok(self)
    }
}

/// Mount point for stored assets, if the base URL is a local path
fn asset_mount_path(asset_base_url: &str) -> Option<String> {
    let path = asset_base_url.trim().trim_end_matches('/');
    if path.starts_with('/') && path.len() > 1 && !path.contains(['*', '{', '}', ':']) {
        Some(path.to_string())
    } else {
        None
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.import_config.max_upload_bytes;

    let mut router = Router::new()
        .merge(api::import_routes())
        .merge(api::health_routes());

    if let Some(mount) = asset_mount_path(&state.asset_base_url) {
        router = router.nest_service(&mount, ServeDir::new(&state.asset_dir));
    }

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_mount_path() {
        assert_eq!(asset_mount_path("/assets").as_deref(), Some("/assets"));
        assert_eq!(asset_mount_path("/media/files/").as_deref(), Some("/media/files"));
        assert_eq!(asset_mount_path("/"), None);
        assert_eq!(asset_mount_path("https://cdn.example.com/assets"), None);
    }
}
