//! Repeated-Group Accumulator
//!
//! Appends one item to an entity's group-list, stored as a JSON array under
//! a single attribute. Read-modify-write: a concurrent writer appending to the
//! same entity between the read and the write loses its item.

use std::sync::Arc;

use crate::error::{ImportError, ImportResult};
use crate::models::{EntityId, GroupItem};
use crate::store::EntityStore;

pub struct GroupAccumulator {
    entities: Arc<dyn EntityStore>,
    list_key: String,
}

impl GroupAccumulator {
    pub fn new(entities: Arc<dyn EntityStore>, list_key: impl Into<String>) -> Self {
        Self {
            entities,
            list_key: list_key.into(),
        }
    }

    /// Current group-list; absent or unreadable values read as empty
    pub async fn load(&self, entity_id: EntityId) -> ImportResult<Vec<GroupItem>> {
        let stored = self.entities.get_attribute(entity_id, &self.list_key).await?;

        let Some(raw) = stored else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<GroupItem>>(&raw) {
            Ok(items) => Ok(items),
            Err(e) => {
                tracing::warn!(
                    entity_id = %entity_id,
                    key = %self.list_key,
                    error = %e,
                    "Stored group-list is not a list, starting a new one"
                );
                Ok(Vec::new())
            }
        }
    }

    /// Append `item` after all existing items and write the list back
    ///
    /// **Returns:** new length of the list
    pub async fn append(&self, entity_id: EntityId, item: GroupItem) -> ImportResult<usize> {
        let mut items = self.load(entity_id).await?;
        items.push(item);

        let serialized = serde_json::to_string(&items).map_err(|e| {
            ImportError::Store(bci_common::Error::Internal(format!(
                "Failed to serialize group-list: {}",
                e
            )))
        })?;
        self.entities
            .set_attribute(entity_id, &self.list_key, &serialized)
            .await?;

        tracing::debug!(entity_id = %entity_id, items = items.len(), "Appended group item");
        Ok(items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqliteEntityStore;
    use crate::models::NewEntity;
    use bci_common::db::init::init_memory_database;

    async fn accumulator_with_entity() -> (GroupAccumulator, Arc<SqliteEntityStore>, EntityId) {
        let store = Arc::new(SqliteEntityStore::new(init_memory_database().await.unwrap()));
        let id = store
            .create(&NewEntity {
                kind: "student".into(),
                title: "Ana Lee".into(),
                status: "publish".into(),
                attributes: Vec::new(),
            })
            .await
            .unwrap();
        (GroupAccumulator::new(store.clone(), "group"), store, id)
    }

    #[tokio::test]
    async fn test_append_preserves_order() {
        let (accumulator, _, id) = accumulator_with_entity().await;

        for n in ["1", "2", "3"] {
            let item = GroupItem {
                sequence_number: n.into(),
                ..GroupItem::default()
            };
            accumulator.append(id, item).await.unwrap();
        }

        let numbers: Vec<String> = accumulator
            .load(id)
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.sequence_number)
            .collect();
        assert_eq!(numbers, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn test_unreadable_list_restarts_empty() {
        let (accumulator, store, id) = accumulator_with_entity().await;
        store.set_attribute(id, "group", "not json").await.unwrap();

        let len = accumulator.append(id, GroupItem::default()).await.unwrap();

        assert_eq!(len, 1);
    }
}
