//! Test Helper Utilities
//!
//! Shared utilities for bci-importer integration tests

#![allow(dead_code)]

pub mod fetcher;
pub mod pipeline;

pub use fetcher::ScriptedFetcher;
pub use pipeline::{FlakyEntityStore, RejectingAssetStore, TestPipeline, ROSTER_HEADER};
