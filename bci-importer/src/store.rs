//! Collaborator contracts consumed by the import pipeline
//!
//! The pipeline never touches SQLite, the filesystem layout of the store or
//! HTTP directly; it is handed implementations of these traits. Production
//! implementations live in `db` (entity/asset stores) and `services`
//! (HTTP fetcher, sanitizer).
//!
//! Find-then-create and read-modify-write sequences built on these traits are
//! not atomic. Two runs against the same store at once may duplicate an
//! entity or lose a group-list append.

use async_trait::async_trait;
use bci_common::Result;
use std::time::Duration;
use thiserror::Error;

use crate::models::{AssetMetadata, AssetRef, AttributeFilter, EntityId, NewEntity};

/// Entity persistence
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Ids of entities of `kind` matching every filter exactly, oldest first
    async fn find(&self, kind: &str, filter: &[AttributeFilter]) -> Result<Vec<EntityId>>;

    /// Create an entity together with its initial attributes
    async fn create(&self, entity: &NewEntity) -> Result<EntityId>;

    async fn get_attribute(&self, id: EntityId, key: &str) -> Result<Option<String>>;

    /// Insert or overwrite one attribute
    async fn set_attribute(&self, id: EntityId, key: &str, value: &str) -> Result<()>;
}

/// Asset persistence
#[async_trait]
pub trait AssetStore: Send + Sync {
    /// Asset registered under a normalized name
    async fn find(&self, name: &str) -> Result<Option<AssetRef>>;

    /// Register bytes already written to `metadata.file_path`
    async fn store(&self, bytes: &[u8], metadata: &AssetMetadata) -> Result<AssetRef>;

    /// Public URL/path of a stored asset
    async fn locator_of(&self, asset: &AssetRef) -> Result<String>;
}

/// Raw HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Connection-level failure (DNS, refused, timeout, TLS, ...)
#[derive(Debug, Error)]
#[error("Transport error: {0}")]
pub struct TransportError(pub String);

/// Network retrieval
#[async_trait]
pub trait NetworkFetcher: Send + Sync {
    async fn get(&self, url: &str, timeout: Duration)
        -> std::result::Result<FetchResponse, TransportError>;
}

/// Pure string sanitization applied before every store write
pub trait Sanitizer: Send + Sync {
    /// Attribute key: lowercase ASCII letters, digits, `-` and `_` only
    fn key(&self, raw: &str) -> String;

    /// Free text: markup and control characters removed, whitespace collapsed
    fn text(&self, raw: &str) -> String;

    /// Lookup slug: lowercase alphanumerics separated by single `-`
    fn slug(&self, raw: &str) -> String;

    /// File name safe to join onto a directory; empty if nothing usable remains
    fn file_name(&self, raw: &str) -> String;
}
