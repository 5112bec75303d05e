//! Pipeline fixture: in-memory database, temp asset dir, scripted network

use async_trait::async_trait;
use bci_common::config::ImportConfig;
use bci_common::db::init::init_memory_database;
use bci_importer::config::ImportSettings;
use bci_importer::db::{SqliteAssetStore, SqliteEntityStore};
use bci_importer::models::{
    AssetMetadata, AssetRef, AttributeFilter, Entity, EntityId, GroupItem, ImportSummary, NewEntity,
    Upload,
};
use bci_importer::services::{self, GroupAccumulator, ImportOrchestrator, TextSanitizer};
use bci_importer::store::{AssetStore, EntityStore, NetworkFetcher};
use bci_importer::ImportResult;
use sqlx::SqlitePool;
use std::io::Cursor;
use std::sync::Arc;
use tempfile::TempDir;

use super::ScriptedFetcher;

pub const ROSTER_HEADER: &str =
    "student-first-name,student-last-name,group-number,group-upload-asset,group-course,group-batches";

pub struct TestPipeline {
    pub temp_dir: TempDir,
    pub db: SqlitePool,
    pub fetcher: Arc<ScriptedFetcher>,
    pub settings: ImportSettings,
}

impl TestPipeline {
    pub async fn new(fetcher: ScriptedFetcher) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let asset_dir = temp_dir.path().join("assets");
        std::fs::create_dir_all(&asset_dir).unwrap();

        let db = init_memory_database().await.unwrap();
        let settings = ImportSettings::from_config(&ImportConfig::default(), asset_dir);

        Self {
            temp_dir,
            db,
            fetcher: Arc::new(fetcher),
            settings,
        }
    }

    pub fn orchestrator(&self) -> ImportOrchestrator {
        services::sqlite_orchestrator(&self.db, self.fetcher.clone(), &self.settings)
    }

    /// Orchestrator over replacement stores
    pub fn orchestrator_with(
        &self,
        entities: Arc<dyn EntityStore>,
        assets: Arc<dyn AssetStore>,
    ) -> ImportOrchestrator {
        let network: Arc<dyn NetworkFetcher> = self.fetcher.clone();
        services::build_orchestrator(
            entities,
            assets,
            network,
            Arc::new(TextSanitizer::new()),
            &self.settings,
        )
    }

    pub async fn import_with(
        &self,
        entities: Arc<dyn EntityStore>,
        assets: Arc<dyn AssetStore>,
        csv: &str,
    ) -> ImportResult<ImportSummary> {
        self.orchestrator_with(entities, assets)
            .run(Upload::new("roster.csv", Cursor::new(csv.as_bytes().to_vec())))
            .await
    }

    pub async fn import(&self, csv: &str) -> ImportResult<ImportSummary> {
        self.orchestrator()
            .run(Upload::new("roster.csv", Cursor::new(csv.as_bytes().to_vec())))
            .await
    }

    pub fn entities(&self) -> SqliteEntityStore {
        SqliteEntityStore::new(self.db.clone())
    }

    pub fn assets(&self) -> SqliteAssetStore {
        SqliteAssetStore::new(self.db.clone())
    }

    pub async fn student_count(&self) -> i64 {
        self.entities().count("student").await.unwrap()
    }

    pub async fn find_student(&self, first: &str, last: &str) -> Option<Entity> {
        let store = self.entities();
        let ids = store
            .find(
                "student",
                &[
                    AttributeFilter::new("student-first-name", first),
                    AttributeFilter::new("student-last-name", last),
                ],
            )
            .await
            .unwrap();
        assert!(ids.len() <= 1, "natural key matched {} entities", ids.len());

        match ids.first() {
            Some(id) => store.load(*id).await.unwrap(),
            None => None,
        }
    }

    pub async fn group_list(&self, id: EntityId) -> Vec<GroupItem> {
        GroupAccumulator::new(Arc::new(self.entities()), "group")
            .load(id)
            .await
            .unwrap()
    }
}

/// Entity store failing lookups for one last name and writes to one key
pub struct FlakyEntityStore {
    inner: SqliteEntityStore,
    failing_last_name: Option<String>,
    failing_key: Option<String>,
}

impl FlakyEntityStore {
    pub fn new(inner: SqliteEntityStore) -> Self {
        Self {
            inner,
            failing_last_name: None,
            failing_key: None,
        }
    }

    pub fn fail_lookup_of(mut self, last_name: &str) -> Self {
        self.failing_last_name = Some(last_name.to_string());
        self
    }

    pub fn fail_writes_to(mut self, key: &str) -> Self {
        self.failing_key = Some(key.to_string());
        self
    }
}

#[async_trait]
impl EntityStore for FlakyEntityStore {
    async fn find(&self, kind: &str, filter: &[AttributeFilter]) -> bci_common::Result<Vec<EntityId>> {
        if filter.iter().any(|f| Some(&f.value) == self.failing_last_name.as_ref()) {
            return Err(bci_common::Error::Internal("database is locked".to_string()));
        }
        self.inner.find(kind, filter).await
    }

    async fn create(&self, entity: &NewEntity) -> bci_common::Result<EntityId> {
        self.inner.create(entity).await
    }

    async fn get_attribute(&self, id: EntityId, key: &str) -> bci_common::Result<Option<String>> {
        self.inner.get_attribute(id, key).await
    }

    async fn set_attribute(&self, id: EntityId, key: &str, value: &str) -> bci_common::Result<()> {
        if Some(key) == self.failing_key.as_deref() {
            return Err(bci_common::Error::Internal("disk I/O error".to_string()));
        }
        self.inner.set_attribute(id, key, value).await
    }
}

/// Asset store refusing to register one name
pub struct RejectingAssetStore {
    inner: SqliteAssetStore,
    rejected_name: String,
}

impl RejectingAssetStore {
    pub fn new(inner: SqliteAssetStore, rejected_name: &str) -> Self {
        Self {
            inner,
            rejected_name: rejected_name.to_string(),
        }
    }
}

#[async_trait]
impl AssetStore for RejectingAssetStore {
    async fn find(&self, name: &str) -> bci_common::Result<Option<AssetRef>> {
        self.inner.find(name).await
    }

    async fn store(&self, bytes: &[u8], metadata: &AssetMetadata) -> bci_common::Result<AssetRef> {
        if metadata.name == self.rejected_name {
            return Err(bci_common::Error::Internal("UNIQUE constraint failed".to_string()));
        }
        self.inner.store(bytes, metadata).await
    }

    async fn locator_of(&self, asset: &AssetRef) -> bci_common::Result<String> {
        self.inner.locator_of(asset).await
    }
}
