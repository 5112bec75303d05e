//! Entity Resolver
//!
//! Find-or-create on the natural key (first name + last name). Key values
//! go through the same sanitizer as stored attributes, so a value written by
//! one import matches the same value read by the next.
//!
//! Not atomic: a concurrent writer can create the same key between the
//! lookup and the insert.

use std::sync::Arc;

use crate::error::ImportResult;
use crate::models::{AttributeFilter, ImportProfile, NewEntity, Record, Resolution};
use crate::store::{EntityStore, Sanitizer};

/// Natural key of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NaturalKey {
    pub first_name: String,
    pub last_name: String,
}

impl NaturalKey {
    /// Display title; `default_title` when both parts are empty
    pub fn title(&self, default_title: &str) -> String {
        let joined = format!("{} {}", self.first_name, self.last_name);
        let joined = joined.trim();
        if joined.is_empty() {
            default_title.to_string()
        } else {
            joined.to_string()
        }
    }
}

pub struct EntityResolver {
    entities: Arc<dyn EntityStore>,
    sanitizer: Arc<dyn Sanitizer>,
    profile: ImportProfile,
}

impl EntityResolver {
    pub fn new(
        entities: Arc<dyn EntityStore>,
        sanitizer: Arc<dyn Sanitizer>,
        profile: ImportProfile,
    ) -> Self {
        Self {
            entities,
            sanitizer,
            profile,
        }
    }

    /// Natural key of a record; absent fields count as empty
    ///
    /// Values are compared in sanitized form, the same form written to the
    /// key attributes: leading, trailing and repeated whitespace and markup
    /// do not distinguish two keys (`" Ana "` matches `Ana`). Case does.
    pub fn natural_key(&self, record: &Record) -> NaturalKey {
        let value = |field: &str| self.sanitizer.text(record.get(field).unwrap_or_default());
        NaturalKey {
            first_name: value(&self.profile.first_name_field),
            last_name: value(&self.profile.last_name_field),
        }
    }

    fn key_filter(&self, key: &NaturalKey) -> Vec<AttributeFilter> {
        vec![
            AttributeFilter::new(
                self.sanitizer.key(&self.profile.first_name_field),
                key.first_name.clone(),
            ),
            AttributeFilter::new(
                self.sanitizer.key(&self.profile.last_name_field),
                key.last_name.clone(),
            ),
        ]
    }

    /// Resolve the entity a record belongs to, creating it if needed
    ///
    /// The created entity carries the natural-key attributes from the start,
    /// so later rows find it even if the rest of this row fails to persist.
    pub async fn resolve(&self, record: &Record) -> ImportResult<Resolution> {
        let key = self.natural_key(record);
        let filter = self.key_filter(&key);

        let existing = self.entities.find(&self.profile.entity_kind, &filter).await?;
        if let Some(id) = existing.first().copied() {
            if existing.len() > 1 {
                tracing::warn!(
                    line = record.line(),
                    matches = existing.len(),
                    entity_id = %id,
                    "Natural key matches several entities, using the oldest"
                );
            }
            tracing::debug!(line = record.line(), entity_id = %id, "Resolved existing entity");
            return Ok(Resolution { id, created: false });
        }

        if key.first_name.is_empty() && key.last_name.is_empty() {
            tracing::warn!(
                line = record.line(),
                title = %self.profile.default_title,
                "Row has no name, using default title"
            );
        }

        let entity = NewEntity {
            kind: self.profile.entity_kind.clone(),
            title: key.title(&self.profile.default_title),
            status: self.profile.published_status.clone(),
            attributes: filter.into_iter().map(|f| (f.key, f.value)).collect(),
        };
        let id = self.entities.create(&entity).await?;

        tracing::info!(line = record.line(), entity_id = %id, title = %entity.title, "Created entity");
        Ok(Resolution { id, created: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_falls_back_to_default() {
        let key = NaturalKey {
            first_name: String::new(),
            last_name: String::new(),
        };
        assert_eq!(key.title("Student"), "Student");

        let key = NaturalKey {
            first_name: "Ana".into(),
            last_name: String::new(),
        };
        assert_eq!(key.title("Student"), "Ana");

        let key = NaturalKey {
            first_name: "Ana".into(),
            last_name: "Lee".into(),
        };
        assert_eq!(key.title("Student"), "Ana Lee");
    }

    #[tokio::test]
    async fn test_key_ignores_surrounding_whitespace_but_not_case() {
        use crate::db::SqliteEntityStore;
        use crate::services::sanitizer::TextSanitizer;
        use bci_common::db::init::init_memory_database;

        let resolver = EntityResolver::new(
            Arc::new(SqliteEntityStore::new(init_memory_database().await.unwrap())),
            Arc::new(TextSanitizer::new()),
            ImportProfile::default(),
        );
        let record = |first: &str, last: &str| {
            Record::new(
                2,
                vec![
                    ("student-first-name".into(), Some(first.into())),
                    ("student-last-name".into(), Some(last.into())),
                ],
            )
        };

        assert_eq!(
            resolver.natural_key(&record(" Ana ", "Lee")),
            resolver.natural_key(&record("Ana", "Lee"))
        );
        assert_ne!(
            resolver.natural_key(&record("ana", "Lee")),
            resolver.natural_key(&record("Ana", "Lee"))
        );
    }
}
