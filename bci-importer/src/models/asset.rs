//! Stored asset types

use serde::Serialize;
use std::path::PathBuf;
use uuid::Uuid;

/// Reference to a stored asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetRef {
    pub id: Uuid,
    /// Normalized lookup name, unique across the store
    pub name: String,
}

/// Metadata registered together with the asset bytes
#[derive(Debug, Clone)]
pub struct AssetMetadata {
    pub name: String,
    pub title: String,
    pub file_path: PathBuf,
    pub locator: String,
    pub content_type: String,
}

/// Asset returned by the fetcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedAsset {
    pub asset: AssetRef,
    pub locator: String,
    /// True when an existing asset was returned without downloading
    pub reused: bool,
}
