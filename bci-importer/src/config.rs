//! Runtime import settings
//!
//! Each setting resolves from three tiers, highest priority first:
//! 1. Database `settings` table
//! 2. Environment variable
//! 3. TOML `[import]` table (which carries the built-in defaults)
//!
//! Settings are resolved per import run, so database changes apply to the
//! next upload without a restart.

use bci_common::config::ImportConfig;
use bci_common::db::settings::get_setting;
use bci_common::Result;
use sqlx::{Pool, Sqlite};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use crate::models::ImportProfile;

pub const FETCH_TIMEOUT_SETTING: &str = "import_fetch_timeout_secs";
pub const ASSET_BASE_URL_SETTING: &str = "import_asset_base_url";
pub const ENTITY_KIND_SETTING: &str = "import_entity_kind";

pub const FETCH_TIMEOUT_ENV: &str = "BCI_FETCH_TIMEOUT_SECS";
pub const ASSET_BASE_URL_ENV: &str = "BCI_ASSET_BASE_URL";

/// Everything one import run needs to know about its environment
#[derive(Debug, Clone)]
pub struct ImportSettings {
    pub fetch_timeout: Duration,
    pub asset_base_url: String,
    pub asset_dir: PathBuf,
    pub profile: ImportProfile,
}

impl ImportSettings {
    /// Settings from TOML defaults only
    pub fn from_config(config: &ImportConfig, asset_dir: PathBuf) -> Self {
        Self {
            fetch_timeout: Duration::from_secs(config.fetch_timeout_secs),
            asset_base_url: config.asset_base_url.clone(),
            asset_dir,
            profile: ImportProfile::default(),
        }
    }

    /// Resolve settings: Database → ENV → TOML
    pub async fn resolve(
        db: &Pool<Sqlite>,
        config: &ImportConfig,
        asset_dir: PathBuf,
    ) -> Result<Self> {
        let mut settings = Self::from_config(config, asset_dir);

        let env_timeout = match std::env::var(FETCH_TIMEOUT_ENV) {
            Ok(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) => Some(secs),
                Err(e) => {
                    warn!("Ignoring {}={}: {}", FETCH_TIMEOUT_ENV, raw, e);
                    None
                }
            },
            Err(_) => None,
        };
        let timeout_secs = match get_setting::<u64>(db, FETCH_TIMEOUT_SETTING).await? {
            Some(secs) => Some(secs),
            None => env_timeout,
        };
        if let Some(secs) = timeout_secs.filter(|secs| *secs > 0) {
            settings.fetch_timeout = Duration::from_secs(secs);
        }

        let env_base_url = std::env::var(ASSET_BASE_URL_ENV).ok();
        let base_url = match get_setting::<String>(db, ASSET_BASE_URL_SETTING).await? {
            Some(url) => Some(url),
            None => env_base_url,
        };
        if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
            settings.asset_base_url = url.trim().to_string();
        }

        if let Some(kind) = get_setting::<String>(db, ENTITY_KIND_SETTING).await? {
            if !kind.trim().is_empty() {
                settings.profile.entity_kind = kind.trim().to_string();
            }
        }

        debug!(
            fetch_timeout_secs = settings.fetch_timeout.as_secs(),
            asset_base_url = %settings.asset_base_url,
            entity_kind = %settings.profile.entity_kind,
            "Resolved import settings"
        );

        Ok(settings)
    }
}
