//! Asset store on SQLite
//!
//! One row per stored asset, unique by normalized name. The bytes themselves
//! live in the asset directory; the row records where, plus size and digest.

use async_trait::async_trait;
use bci_common::{Error, Result};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{AssetMetadata, AssetRef};
use crate::store::AssetStore;

/// SQLite implementation of [`AssetStore`]
#[derive(Clone)]
pub struct SqliteAssetStore {
    db: SqlitePool,
}

impl SqliteAssetStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Count stored assets
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM assets")
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl AssetStore for SqliteAssetStore {
    async fn find(&self, name: &str) -> Result<Option<AssetRef>> {
        let row: Option<(String, String)> =
            sqlx::query_as("SELECT guid, name FROM assets WHERE name = ? LIMIT 1")
                .bind(name)
                .fetch_optional(&self.db)
                .await?;

        match row {
            Some((guid, name)) => {
                let id = Uuid::parse_str(&guid)
                    .map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))?;
                Ok(Some(AssetRef { id, name }))
            }
            None => Ok(None),
        }
    }

    async fn store(&self, bytes: &[u8], metadata: &AssetMetadata) -> Result<AssetRef> {
        let id = Uuid::new_v4();
        let sha256 = format!("{:x}", Sha256::digest(bytes));

        sqlx::query(
            r#"
            INSERT INTO assets (guid, name, title, file_path, locator, content_type, byte_size, sha256, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
            "#,
        )
        .bind(id.to_string())
        .bind(&metadata.name)
        .bind(&metadata.title)
        .bind(metadata.file_path.to_string_lossy().to_string())
        .bind(&metadata.locator)
        .bind(&metadata.content_type)
        .bind(bytes.len() as i64)
        .bind(&sha256)
        .execute(&self.db)
        .await?;

        tracing::debug!(asset_id = %id, name = %metadata.name, sha256 = %sha256, "Registered asset");

        Ok(AssetRef {
            id,
            name: metadata.name.clone(),
        })
    }

    async fn locator_of(&self, asset: &AssetRef) -> Result<String> {
        let locator: Option<String> = sqlx::query_scalar("SELECT locator FROM assets WHERE guid = ?")
            .bind(asset.id.to_string())
            .fetch_optional(&self.db)
            .await?;

        locator.ok_or_else(|| Error::NotFound(format!("Asset {}", asset.id)))
    }
}
