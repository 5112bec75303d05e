//! Data models for bci-importer
//!
//! - Records parsed from the uploaded file
//! - Entities, group-items and assets written by the pipeline
//! - Per-row outcomes and the run summary

pub mod asset;
pub mod entity;
pub mod group_item;
pub mod import_summary;
pub mod profile;
pub mod record;
pub mod upload;

pub use asset::{AssetMetadata, AssetRef, FetchedAsset};
pub use entity::{AttributeFilter, Entity, EntityId, NewEntity, Resolution};
pub use group_item::GroupItem;
pub use import_summary::{ApplyReport, AssetOutcome, ImportSummary, RowError, RowOutcome};
pub use profile::ImportProfile;
pub use record::Record;
pub use upload::Upload;
