//! Database initialization and shared table accessors

pub mod init;
pub mod settings;

pub use init::*;
