//! Import pipeline components
//!
//! Leaf-first: sanitizer, record reader, asset fetcher, entity resolver,
//! group accumulator, field classifier, orchestrator.

pub mod asset_fetcher;
pub mod entity_resolver;
pub mod field_classifier;
pub mod group_accumulator;
pub mod http_fetcher;
pub mod import_orchestrator;
pub mod record_reader;
pub mod sanitizer;

pub use asset_fetcher::AssetFetcher;
pub use entity_resolver::{EntityResolver, NaturalKey};
pub use field_classifier::{classify, FieldClass, FieldPersister, GroupSubField};
pub use group_accumulator::GroupAccumulator;
pub use http_fetcher::HttpFetcher;
pub use import_orchestrator::ImportOrchestrator;
pub use record_reader::RecordReader;
pub use sanitizer::TextSanitizer;

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::ImportSettings;
use crate::db::{SqliteAssetStore, SqliteEntityStore};
use crate::store::{AssetStore, EntityStore, NetworkFetcher, Sanitizer};

/// Wire the pipeline from explicit collaborators
pub fn build_orchestrator(
    entities: Arc<dyn EntityStore>,
    assets: Arc<dyn AssetStore>,
    network: Arc<dyn NetworkFetcher>,
    sanitizer: Arc<dyn Sanitizer>,
    settings: &ImportSettings,
) -> ImportOrchestrator {
    let resolver = EntityResolver::new(entities.clone(), sanitizer.clone(), settings.profile.clone());
    let asset_fetcher = AssetFetcher::new(
        assets,
        network,
        sanitizer.clone(),
        settings.asset_dir.clone(),
        settings.asset_base_url.clone(),
        settings.fetch_timeout,
    );
    let persister = FieldPersister::new(entities, sanitizer, asset_fetcher, settings.profile.clone());

    ImportOrchestrator::new(resolver, persister)
}

/// Wire the pipeline against the SQLite stores
pub fn sqlite_orchestrator(
    db: &SqlitePool,
    network: Arc<dyn NetworkFetcher>,
    settings: &ImportSettings,
) -> ImportOrchestrator {
    build_orchestrator(
        Arc::new(SqliteEntityStore::new(db.clone())),
        Arc::new(SqliteAssetStore::new(db.clone())),
        network,
        Arc::new(TextSanitizer::new()),
        settings,
    )
}
