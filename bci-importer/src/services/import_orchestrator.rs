//! Import Orchestrator
//!
//! Drives one uploaded file through the pipeline:
//! validate → read header → for each record: resolve entity → apply fields.
//!
//! Rows are processed strictly in file order, one at a time. Only a bad
//! upload or an unreadable stream aborts the run; every other failure is
//! recorded against its row and the loop moves on.

use std::io::Read;

use crate::error::{ImportError, ImportResult};
use crate::models::{ImportSummary, Record, RowOutcome, Upload};
use crate::services::entity_resolver::EntityResolver;
use crate::services::field_classifier::FieldPersister;
use crate::services::record_reader::RecordReader;

/// Extension accepted as the tabular format
pub const EXPECTED_EXTENSION: &str = "csv";

pub struct ImportOrchestrator {
    resolver: EntityResolver,
    persister: FieldPersister,
}

/// Reject uploads that are not declared as CSV
pub fn validate_upload<R: Read>(upload: &Upload<R>) -> ImportResult<()> {
    if upload.file_name.trim().is_empty() {
        return Err(ImportError::Validation("No file uploaded.".to_string()));
    }

    match upload.extension() {
        Some(ext) if ext == EXPECTED_EXTENSION => Ok(()),
        _ => Err(ImportError::Validation(format!(
            "Invalid file type '{}'. Please upload a CSV file.",
            upload.file_name
        ))),
    }
}

impl ImportOrchestrator {
    pub fn new(resolver: EntityResolver, persister: FieldPersister) -> Self {
        Self {
            resolver,
            persister,
        }
    }

    /// Import every record of `upload`
    ///
    /// **Returns:** run summary; `rows_imported` counts rows whose entity was
    /// created or resolved, whether or not all of their fields persisted.
    ///
    /// **Errors:** fatal only (`Validation`, `Format`, `Io`).
    pub async fn run<R: Read + Send>(&self, upload: Upload<R>) -> ImportResult<ImportSummary> {
        validate_upload(&upload)?;

        tracing::info!(
            file_name = %upload.file_name,
            content_type = upload.content_type.as_deref().unwrap_or("unknown"),
            "Starting import"
        );

        let mut summary = ImportSummary::begin(upload.file_name.clone());
        let mut reader = RecordReader::new(upload.reader)?;

        for next in reader.by_ref() {
            let record = next?;
            let outcome = self.process_record(&record).await;
            summary.record(record.line(), outcome);
        }

        summary.rows_skipped = reader.blank_rows();
        summary.finish();

        tracing::info!(
            run_id = %summary.run_id,
            file_name = %summary.file_name,
            rows_imported = summary.rows_imported,
            rows_skipped = summary.rows_skipped,
            rows_failed = summary.rows_failed,
            rows_incomplete = summary.rows_incomplete,
            entities_created = summary.entities_created,
            assets_stored = summary.assets_stored,
            "Import finished"
        );

        Ok(summary)
    }

    async fn process_record(&self, record: &Record) -> RowOutcome {
        let resolution = match self.resolver.resolve(record).await {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::warn!(line = record.line(), error = %e, "Could not resolve entity, skipping row");
                return RowOutcome::Failed(e);
            }
        };

        match self.persister.apply(resolution.id, record).await {
            Ok(report) => RowOutcome::Imported {
                entity_id: resolution.id,
                created: resolution.created,
                report,
            },
            Err(e) => {
                tracing::warn!(
                    line = record.line(),
                    entity_id = %resolution.id,
                    error = %e,
                    "Row partially persisted"
                );
                RowOutcome::Incomplete {
                    entity_id: resolution.id,
                    created: resolution.created,
                    error: e,
                }
            }
        }
    }
}
