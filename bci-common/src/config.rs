//! Bootstrap configuration and root folder resolution
//!
//! Two tiers of configuration:
//! 1. **TOML bootstrap**: root folder, bind address, logging, import defaults
//! 2. **Database runtime**: import settings in the `settings` table (see `db::settings`)
//!
//! Root folder priority:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`BCI_ROOT_FOLDER`)
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file never aborts startup; defaults are used
//! and a warning is logged.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "BCI_ROOT_FOLDER";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "bci.db";

/// Asset directory name inside the root folder
pub const ASSET_DIR_NAME: &str = "assets";

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database and stored assets
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// HTTP bind address, e.g. `127.0.0.1:5780`
    #[serde(default)]
    pub bind_address: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Import pipeline defaults (optional)
    #[serde(default)]
    pub import: ImportConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Import pipeline defaults
///
/// Database settings override these at runtime.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Remote asset download timeout in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Public URL prefix under which stored assets are served
    #[serde(default = "default_asset_base_url")]
    pub asset_base_url: String,

    /// Largest accepted upload, in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: default_fetch_timeout_secs(),
            asset_base_url: default_asset_base_url(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    15
}

fn default_asset_base_url() -> String {
    "/assets".to_string()
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}

/// Default bind address for the HTTP service
pub fn default_bind_address() -> String {
    "127.0.0.1:5780".to_string()
}

/// OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("bci"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\bci"))
    } else {
        // ~/.local/share/bci on Linux, ~/Library/Application Support/bci on macOS
        dirs::data_local_dir()
            .map(|d| d.join("bci"))
            .unwrap_or_else(|| PathBuf::from("./bci_data"))
    }
}

/// Default TOML config path for a module: `<config_dir>/bci/<module>.toml`
pub fn default_config_path(module_name: &str) -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bci").join(format!("{}.toml", module_name)))
}

/// Load a TOML config file
///
/// Missing file yields defaults. A file that exists but cannot be parsed is
/// a configuration error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        debug!("TOML config not found at {}, using defaults", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
}

/// Root folder resolver
pub struct RootFolderResolver {
    module_name: String,
    cli_arg: Option<PathBuf>,
    toml_config: TomlConfig,
}

impl RootFolderResolver {
    /// Create resolver for a module, loading its default TOML config if present
    pub fn new(module_name: &str) -> Self {
        let toml_config = match default_config_path(module_name) {
            Some(path) => load_toml_config(&path).unwrap_or_else(|e| {
                warn!("Ignoring TOML config {}: {}", path.display(), e);
                TomlConfig::default()
            }),
            None => TomlConfig::default(),
        };

        Self {
            module_name: module_name.to_string(),
            cli_arg: None,
            toml_config,
        }
    }

    /// Replace the TOML config used for priority 3
    pub fn with_toml_config(mut self, toml_config: TomlConfig) -> Self {
        self.toml_config = toml_config;
        self
    }

    /// Set the command-line override (priority 1)
    pub fn with_cli_arg(mut self, cli_arg: Option<PathBuf>) -> Self {
        self.cli_arg = cli_arg;
        self
    }

    /// Resolve the root folder
    pub fn resolve(&self) -> PathBuf {
        if let Some(path) = &self.cli_arg {
            debug!(module = %self.module_name, "Root folder from command line");
            return path.clone();
        }

        if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
            if !path.trim().is_empty() {
                debug!(module = %self.module_name, "Root folder from {}", ROOT_FOLDER_ENV);
                return PathBuf::from(path);
            }
        }

        if let Some(path) = &self.toml_config.root_folder {
            debug!(module = %self.module_name, "Root folder from TOML config");
            return path.clone();
        }

        default_root_folder()
    }
}

/// Creates the root folder layout and hands out well-known paths
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create root folder and asset directory if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        std::fs::create_dir_all(self.asset_dir())?;
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    pub fn asset_dir(&self) -> PathBuf {
        self.root_folder.join(ASSET_DIR_NAME)
    }
}
