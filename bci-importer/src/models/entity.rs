//! Entity types

use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Entity identifier
pub type EntityId = Uuid;

/// Exact-match condition on one stored attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFilter {
    pub key: String,
    pub value: String,
}

impl AttributeFilter {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Entity to be created
#[derive(Debug, Clone)]
pub struct NewEntity {
    pub kind: String,
    pub title: String,
    pub status: String,
    /// Attributes written together with the entity
    pub attributes: Vec<(String, String)>,
}

/// Stored entity with its attribute map
#[derive(Debug, Clone, Serialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: String,
    pub title: String,
    pub status: String,
    pub attributes: BTreeMap<String, String>,
}

/// Result of find-or-create
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub id: EntityId,
    /// True when the entity did not exist before this row
    pub created: bool,
}
