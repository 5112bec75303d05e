//! Per-row outcomes and the run summary
//!
//! Each processed row produces a `RowOutcome`; the orchestrator folds them
//! into one `ImportSummary`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ImportError;
use crate::models::EntityId;

/// What happened to the asset of one row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetOutcome {
    /// Downloaded and registered a new asset
    Stored,
    /// Existing asset with the same name returned
    Reused,
    /// Fetch/write/registration failed; the sub-field was dropped
    Dropped,
}

/// Side effects of applying one record to its entity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub attributes_written: usize,
    pub group_appended: bool,
    pub asset: Option<AssetOutcome>,
}

/// Result of processing one row
#[derive(Debug)]
pub enum RowOutcome {
    /// Entity resolved and every field persisted
    Imported {
        entity_id: EntityId,
        created: bool,
        report: ApplyReport,
    },
    /// Entity resolved but persisting the fields failed part-way
    ///
    /// Writes made before the failure stay in place.
    Incomplete {
        entity_id: EntityId,
        created: bool,
        error: ImportError,
    },
    /// Entity resolution failed; nothing was written
    Failed(ImportError),
}

impl RowOutcome {
    /// Rows that got as far as a resolved entity count as imported
    pub fn counts_as_imported(&self) -> bool {
        !matches!(self, RowOutcome::Failed(_))
    }
}

/// Row-local error kept in the summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub line: u64,
    pub code: String,
    pub message: String,
}

/// Final tally of one import run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub run_id: Uuid,
    pub file_name: String,
    /// Rows whose entity was created or resolved
    pub rows_imported: usize,
    /// Blank rows left out of processing
    pub rows_skipped: usize,
    /// Rows whose entity could not be resolved
    pub rows_failed: usize,
    /// Imported rows where some field failed to persist
    pub rows_incomplete: usize,
    pub entities_created: usize,
    pub assets_stored: usize,
    pub assets_reused: usize,
    pub assets_dropped: usize,
    pub errors: Vec<RowError>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl ImportSummary {
    pub fn begin(file_name: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            file_name: file_name.into(),
            rows_imported: 0,
            rows_skipped: 0,
            rows_failed: 0,
            rows_incomplete: 0,
            entities_created: 0,
            assets_stored: 0,
            assets_reused: 0,
            assets_dropped: 0,
            errors: Vec::new(),
            started_at: Utc::now(),
            ended_at: None,
        }
    }

    /// Fold one row outcome into the tally
    pub fn record(&mut self, line: u64, outcome: RowOutcome) {
        if outcome.counts_as_imported() {
            self.rows_imported += 1;
        }

        match outcome {
            RowOutcome::Imported {
                created, report, ..
            } => {
                if created {
                    self.entities_created += 1;
                }
                match report.asset {
                    Some(AssetOutcome::Stored) => self.assets_stored += 1,
                    Some(AssetOutcome::Reused) => self.assets_reused += 1,
                    Some(AssetOutcome::Dropped) => self.assets_dropped += 1,
                    None => {}
                }
            }
            RowOutcome::Incomplete { created, error, .. } => {
                if created {
                    self.entities_created += 1;
                }
                self.rows_incomplete += 1;
                self.push_error(line, &error);
            }
            RowOutcome::Failed(error) => {
                self.rows_failed += 1;
                self.push_error(line, &error);
            }
        }
    }

    fn push_error(&mut self, line: u64, error: &ImportError) {
        self.errors.push(RowError {
            line,
            code: error.code().to_string(),
            message: error.to_string(),
        });
    }

    pub fn finish(&mut self) {
        self.ended_at = Some(Utc::now());
    }

    /// Operator-facing one-liner
    pub fn message(&self) -> String {
        match self.rows_imported {
            1 => "1 row imported".to_string(),
            n => format!("{} rows imported", n),
        }
    }
}
