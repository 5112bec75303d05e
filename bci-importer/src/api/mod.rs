//! HTTP API handlers for bci-importer
//!
//! - `POST /import`: multipart CSV upload, returns the run summary
//! - `GET /import/runs`: recent run history
//! - `GET /health`: database reachability, last run, uptime

pub mod health;
pub mod import;

pub use health::health_routes;
pub use import::import_routes;
