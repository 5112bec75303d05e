//! Field Classifier & Persister
//!
//! Splits a record into scalar attributes and repeated-group sub-fields:
//! - `group-<name>` → [`FieldClass::GroupSubField`], collected into one
//!   [`GroupItem`] per record
//! - anything else → [`FieldClass::Scalar`], written straight to the entity
//!
//! Names and values are sanitized before classification and before every
//! write. The asset sub-field holds a URL; it is replaced by the stored
//! asset's locator, or dropped if the asset cannot be obtained.

use std::sync::Arc;

use crate::error::ImportResult;
use crate::models::{ApplyReport, AssetOutcome, EntityId, GroupItem, ImportProfile, Record};
use crate::services::asset_fetcher::AssetFetcher;
use crate::services::group_accumulator::GroupAccumulator;
use crate::store::{EntityStore, Sanitizer};

/// Sub-fields of a group item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSubField {
    Number,
    UploadAsset,
    Course,
    Batches,
    /// Not part of the item shape; ignored
    Other(String),
}

impl GroupSubField {
    fn from_name(name: &str, profile: &ImportProfile) -> Self {
        if name == profile.asset_sub_field {
            return GroupSubField::UploadAsset;
        }
        match name {
            "number" => GroupSubField::Number,
            "course" => GroupSubField::Course,
            "batches" => GroupSubField::Batches,
            other => GroupSubField::Other(other.to_string()),
        }
    }
}

/// Routing decision for one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldClass {
    /// Entity attribute under this sanitized key
    Scalar(String),
    GroupSubField(GroupSubField),
}

/// Classify a raw field name
///
/// **Returns:** None when nothing of the name survives sanitization
pub fn classify(raw_name: &str, sanitizer: &dyn Sanitizer, profile: &ImportProfile) -> Option<FieldClass> {
    let key = sanitizer.key(raw_name);
    if key.is_empty() {
        return None;
    }

    match key.strip_prefix(profile.group_prefix.as_str()) {
        Some(sub_field) => Some(FieldClass::GroupSubField(GroupSubField::from_name(
            sub_field, profile,
        ))),
        None => Some(FieldClass::Scalar(key)),
    }
}

/// Group sub-field values collected from one record
#[derive(Debug, Default)]
struct GroupItemBuilder {
    number: Option<String>,
    asset_reference: Option<String>,
    course: Option<String>,
    batches: Option<String>,
    /// Some known group sub-field carried a value
    present: bool,
}

impl GroupItemBuilder {
    fn build(self) -> GroupItem {
        GroupItem {
            sequence_number: self.number.unwrap_or_default(),
            asset_reference: self.asset_reference.unwrap_or_default(),
            course: self.course.unwrap_or_default(),
            batch: self.batches.unwrap_or_default(),
        }
    }
}

pub struct FieldPersister {
    entities: Arc<dyn EntityStore>,
    sanitizer: Arc<dyn Sanitizer>,
    asset_fetcher: AssetFetcher,
    accumulator: GroupAccumulator,
    profile: ImportProfile,
}

impl FieldPersister {
    pub fn new(
        entities: Arc<dyn EntityStore>,
        sanitizer: Arc<dyn Sanitizer>,
        asset_fetcher: AssetFetcher,
        profile: ImportProfile,
    ) -> Self {
        let accumulator = GroupAccumulator::new(entities.clone(), profile.group_list_key.clone());
        Self {
            entities,
            sanitizer,
            asset_fetcher,
            accumulator,
            profile,
        }
    }

    /// Persist one record onto its entity
    ///
    /// Scalar writes happen in field order; the group item (if any) is
    /// appended once, after all fields were seen. A store error stops the
    /// row; writes already made stay.
    pub async fn apply(&self, entity_id: EntityId, record: &Record) -> ImportResult<ApplyReport> {
        let mut report = ApplyReport::default();
        let mut group = GroupItemBuilder::default();

        for (name, value) in record.fields() {
            let Some(class) = classify(name, self.sanitizer.as_ref(), &self.profile) else {
                tracing::warn!(line = record.line(), field = %name, "Skipping field with unusable name");
                continue;
            };

            match class {
                FieldClass::Scalar(key) => {
                    let Some(value) = value else {
                        continue;
                    };
                    if key == self.profile.group_list_key {
                        tracing::warn!(
                            line = record.line(),
                            field = %name,
                            "Field name collides with the group-list attribute, skipping"
                        );
                        continue;
                    }

                    let value = self.sanitizer.text(value);
                    self.entities.set_attribute(entity_id, &key, &value).await?;
                    report.attributes_written += 1;
                }
                FieldClass::GroupSubField(sub_field) => {
                    let value = value.map(|v| self.sanitizer.text(v)).unwrap_or_default();
                    if value.is_empty() {
                        continue;
                    }
                    if let GroupSubField::Other(sub_name) = &sub_field {
                        tracing::debug!(line = record.line(), sub_field = %sub_name, "Ignoring unknown group sub-field");
                        continue;
                    }
                    group.present = true;

                    match sub_field {
                        GroupSubField::Number => group.number = Some(value),
                        GroupSubField::Course => group.course = Some(value),
                        GroupSubField::Batches => group.batches = Some(value),
                        GroupSubField::UploadAsset => {
                            match self.asset_fetcher.fetch_or_reuse(&value).await {
                                Ok(fetched) => {
                                    report.asset = Some(if fetched.reused {
                                        AssetOutcome::Reused
                                    } else {
                                        AssetOutcome::Stored
                                    });
                                    group.asset_reference = Some(fetched.locator);
                                }
                                Err(e) => {
                                    tracing::warn!(
                                        line = record.line(),
                                        entity_id = %entity_id,
                                        url = %value,
                                        error = %e,
                                        "Asset unavailable, continuing without it"
                                    );
                                    report.asset = Some(AssetOutcome::Dropped);
                                }
                            }
                        }
                        GroupSubField::Other(_) => {}
                    }
                }
            }
        }

        if group.present {
            self.accumulator.append(entity_id, group.build()).await?;
            report.group_appended = true;
        }

        Ok(report)
    }
}
