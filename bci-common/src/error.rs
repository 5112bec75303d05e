//! Errors raised below the import pipeline
//!
//! Storage, bootstrap configuration and the settings table report through
//! this type; `bci-importer` wraps it as a store error.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// SQLite query or connection failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Root folder or asset directory could not be created
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unreadable TOML file or unparsable setting value
    #[error("Configuration error: {0}")]
    Config(String),

    /// Entity or asset id with no stored row
    #[error("Not found: {0}")]
    NotFound(String),

    /// Stored data that does not decode (ids, timestamps, JSON)
    #[error("Internal error: {0}")]
    Internal(String),
}
