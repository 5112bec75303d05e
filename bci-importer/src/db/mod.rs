//! SQLite-backed collaborators and run history
//!
//! Schema lives in `bci_common::db::init`.

pub mod assets;
pub mod entities;
pub mod import_runs;

pub use assets::SqliteAssetStore;
pub use entities::SqliteEntityStore;
