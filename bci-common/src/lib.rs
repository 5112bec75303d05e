//! # BCI Common Library
//!
//! Shared code for the bulk CSV importer:
//! - Error type shared by all crates
//! - Bootstrap configuration (root folder, TOML file)
//! - Database initialization and schema
//! - Settings table accessors

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
