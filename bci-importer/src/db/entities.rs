//! Entity store on SQLite
//!
//! Entities live in `entities`; their open-ended attribute map in
//! `entity_attributes`, one row per key.

use async_trait::async_trait;
use bci_common::{Error, Result};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::models::{AttributeFilter, Entity, EntityId, NewEntity};
use crate::store::EntityStore;

/// SQLite implementation of [`EntityStore`]
#[derive(Clone)]
pub struct SqliteEntityStore {
    db: SqlitePool,
}

impl SqliteEntityStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Load an entity with all of its attributes
    pub async fn load(&self, id: EntityId) -> Result<Option<Entity>> {
        let row = sqlx::query("SELECT guid, kind, title, status FROM entities WHERE guid = ?")
            .bind(id.to_string())
            .fetch_optional(&self.db)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let attributes: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM entity_attributes WHERE entity_guid = ?")
                .bind(id.to_string())
                .fetch_all(&self.db)
                .await?;

        Ok(Some(Entity {
            id,
            kind: row.get("kind"),
            title: row.get("title"),
            status: row.get("status"),
            attributes: attributes.into_iter().collect::<BTreeMap<_, _>>(),
        }))
    }

    /// Count entities of one kind
    pub async fn count(&self, kind: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM entities WHERE kind = ?")
            .bind(kind)
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }
}

fn parse_guid(guid: &str) -> Result<EntityId> {
    Uuid::parse_str(guid).map_err(|e| Error::Internal(format!("Invalid UUID in database: {}", e)))
}

#[async_trait]
impl EntityStore for SqliteEntityStore {
    async fn find(&self, kind: &str, filter: &[AttributeFilter]) -> Result<Vec<EntityId>> {
        let mut sql = String::from("SELECT e.guid FROM entities e WHERE e.kind = ?");
        for _ in filter {
            sql.push_str(
                " AND EXISTS (SELECT 1 FROM entity_attributes a \
                 WHERE a.entity_guid = e.guid AND a.key = ? AND a.value = ?)",
            );
        }
        sql.push_str(" ORDER BY e.created_at, e.rowid");

        let mut query = sqlx::query_scalar::<_, String>(&sql).bind(kind);
        for condition in filter {
            query = query.bind(&condition.key).bind(&condition.value);
        }

        let guids = query.fetch_all(&self.db).await?;
        guids.iter().map(|guid| parse_guid(guid)).collect()
    }

    async fn create(&self, entity: &NewEntity) -> Result<EntityId> {
        let id = Uuid::new_v4();
        let mut tx = self.db.begin().await?;

        sqlx::query(
            "INSERT INTO entities (guid, kind, title, status, created_at, updated_at)
             VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)",
        )
        .bind(id.to_string())
        .bind(&entity.kind)
        .bind(&entity.title)
        .bind(&entity.status)
        .execute(&mut *tx)
        .await?;

        for (key, value) in &entity.attributes {
            sqlx::query(
                "INSERT INTO entity_attributes (entity_guid, key, value) VALUES (?, ?, ?)
                 ON CONFLICT(entity_guid, key) DO UPDATE SET value = excluded.value",
            )
            .bind(id.to_string())
            .bind(key)
            .bind(value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(entity_id = %id, kind = %entity.kind, title = %entity.title, "Created entity");
        Ok(id)
    }

    async fn get_attribute(&self, id: EntityId, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(
            "SELECT value FROM entity_attributes WHERE entity_guid = ? AND key = ?",
        )
        .bind(id.to_string())
        .bind(key)
        .fetch_optional(&self.db)
        .await?;
        Ok(value)
    }

    async fn set_attribute(&self, id: EntityId, key: &str, value: &str) -> Result<()> {
        let updated = sqlx::query(
            "UPDATE entities SET updated_at = CURRENT_TIMESTAMP WHERE guid = ?",
        )
        .bind(id.to_string())
        .execute(&self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Entity {}", id)));
        }

        sqlx::query(
            "INSERT INTO entity_attributes (entity_guid, key, value, updated_at)
             VALUES (?, ?, ?, CURRENT_TIMESTAMP)
             ON CONFLICT(entity_guid, key) DO UPDATE SET
                value = excluded.value,
                updated_at = CURRENT_TIMESTAMP",
        )
        .bind(id.to_string())
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
