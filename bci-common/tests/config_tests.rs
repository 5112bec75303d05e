//! Unit tests for bootstrap configuration
//!
//! Covers root folder priority order, TOML defaults and the
//! root folder layout.
//!
//! Tests that manipulate BCI_ROOT_FOLDER are marked with #[serial]
//! so they never run in parallel with each other.

use bci_common::config::{
    default_root_folder, load_toml_config, ImportConfig, RootFolderInitializer, RootFolderResolver,
    TomlConfig, ROOT_FOLDER_ENV,
};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    env::remove_var(ROOT_FOLDER_ENV);

    let resolver = RootFolderResolver::new("test-module").with_toml_config(TomlConfig::default());
    let root_folder = resolver.resolve();

    assert!(!root_folder.as_os_str().is_empty());
    assert_eq!(root_folder, default_root_folder());
}

#[test]
#[serial]
fn test_resolver_env_var_beats_toml() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/bci-test-env-folder");

    let toml_config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/bci-test-toml-folder")),
        ..TomlConfig::default()
    };
    let resolver = RootFolderResolver::new("test-module").with_toml_config(toml_config);

    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/bci-test-env-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_cli_arg_has_highest_priority() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/bci-test-env-folder");

    let resolver = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/bci-test-cli-folder")));

    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/bci-test-cli-folder"));

    env::remove_var(ROOT_FOLDER_ENV);
}

#[test]
#[serial]
fn test_resolver_falls_back_to_toml_root_folder() {
    env::remove_var(ROOT_FOLDER_ENV);

    let toml_config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/bci-test-toml-folder")),
        ..TomlConfig::default()
    };
    let resolver = RootFolderResolver::new("test-module").with_toml_config(toml_config);

    assert_eq!(resolver.resolve(), PathBuf::from("/tmp/bci-test-toml-folder"));
}

#[test]
fn test_missing_toml_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let config = load_toml_config(&temp_dir.path().join("absent.toml")).unwrap();

    assert!(config.root_folder.is_none());
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.import.fetch_timeout_secs, 15);
    assert_eq!(config.import.asset_base_url, "/assets");
}

#[test]
fn test_partial_toml_fills_import_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bci-importer.toml");
    std::fs::write(
        &path,
        "bind_address = \"0.0.0.0:9000\"\n\n[import]\nfetch_timeout_secs = 5\n",
    )
    .unwrap();

    let config = load_toml_config(&path).unwrap();
    assert_eq!(config.bind_address.as_deref(), Some("0.0.0.0:9000"));
    assert_eq!(config.import.fetch_timeout_secs, 5);
    assert_eq!(config.import.asset_base_url, ImportConfig::default().asset_base_url);
}

#[test]
fn test_malformed_toml_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "root_folder = [unterminated").unwrap();

    assert!(matches!(
        load_toml_config(&path),
        Err(bci_common::Error::Config(_))
    ));
}

#[test]
fn test_full_toml_config_is_loaded() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bci-importer.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/bci"
bind_address = "0.0.0.0:8080"

[logging]
level = "debug"

[import]
fetch_timeout_secs = 20
asset_base_url = "/media"
max_upload_bytes = 1024
"#,
    )
    .unwrap();

    let loaded = load_toml_config(&path).unwrap();
    assert_eq!(loaded.root_folder, Some(PathBuf::from("/srv/bci")));
    assert_eq!(loaded.bind_address.as_deref(), Some("0.0.0.0:8080"));
    assert_eq!(loaded.logging.level, "debug");
    assert_eq!(loaded.import.fetch_timeout_secs, 20);
    assert_eq!(loaded.import.asset_base_url, "/media");
    assert_eq!(loaded.import.max_upload_bytes, 1024);
}

#[test]
fn test_initializer_creates_asset_dir() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("root");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();

    assert!(initializer.asset_dir().is_dir());
    assert_eq!(initializer.database_path(), root.join("bci.db"));
}
