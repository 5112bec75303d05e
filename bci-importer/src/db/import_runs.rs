//! Import run history

use bci_common::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use crate::models::{ImportSummary, RowError};

/// Persisted import run
#[derive(Debug, Clone, Serialize)]
pub struct ImportRunRecord {
    pub run_id: String,
    pub file_name: String,
    pub rows_imported: i64,
    pub rows_skipped: i64,
    pub rows_failed: i64,
    pub rows_incomplete: i64,
    pub entities_created: i64,
    pub assets_stored: i64,
    pub errors: Vec<RowError>,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

/// Save a finished run
pub async fn save_run(pool: &SqlitePool, summary: &ImportSummary) -> Result<()> {
    let errors_json = serde_json::to_string(&summary.errors)
        .map_err(|e| Error::Internal(format!("Failed to serialize errors: {}", e)))?;
    let ended_at = summary.ended_at.unwrap_or_else(Utc::now);

    sqlx::query(
        r#"
        INSERT INTO import_runs (
            run_id, file_name, rows_imported, rows_skipped, rows_failed,
            rows_incomplete, entities_created, assets_stored, errors, started_at, ended_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(summary.run_id.to_string())
    .bind(&summary.file_name)
    .bind(summary.rows_imported as i64)
    .bind(summary.rows_skipped as i64)
    .bind(summary.rows_failed as i64)
    .bind(summary.rows_incomplete as i64)
    .bind(summary.entities_created as i64)
    .bind(summary.assets_stored as i64)
    .bind(errors_json)
    .bind(summary.started_at.to_rfc3339_opts(SecondsFormat::Micros, true))
    .bind(ended_at.to_rfc3339_opts(SecondsFormat::Micros, true))
    .execute(pool)
    .await?;

    tracing::debug!(run_id = %summary.run_id, "Saved import run");

    Ok(())
}

/// Most recent runs, newest first
pub async fn list_recent_runs(pool: &SqlitePool, limit: i64) -> Result<Vec<ImportRunRecord>> {
    let rows = sqlx::query(
        r#"
        SELECT run_id, file_name, rows_imported, rows_skipped, rows_failed,
               rows_incomplete, entities_created, assets_stored, errors, started_at, ended_at
        FROM import_runs
        ORDER BY started_at DESC, rowid DESC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let mut runs = Vec::with_capacity(rows.len());
    for row in rows {
        let run_id: String = row.get("run_id");
        let errors_json: String = row.get("errors");
        let errors = match serde_json::from_str::<Vec<RowError>>(&errors_json) {
            Ok(errors) => errors,
            Err(e) => {
                tracing::warn!(run_id = %run_id, error = %e, "Stored row errors are unreadable, listing none");
                Vec::new()
            }
        };

        runs.push(ImportRunRecord {
            run_id,
            file_name: row.get("file_name"),
            rows_imported: row.get("rows_imported"),
            rows_skipped: row.get("rows_skipped"),
            rows_failed: row.get("rows_failed"),
            rows_incomplete: row.get("rows_incomplete"),
            entities_created: row.get("entities_created"),
            assets_stored: row.get("assets_stored"),
            errors,
            started_at: parse_timestamp(row.get("started_at"))?,
            ended_at: parse_timestamp(row.get("ended_at"))?,
        });
    }

    Ok(runs)
}

fn parse_timestamp(value: String) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(&value)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Invalid timestamp in database: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bci_common::db::init::init_memory_database;
    use chrono::Duration;

    #[tokio::test]
    async fn test_save_and_list_newest_first() {
        let pool = init_memory_database().await.unwrap();

        let mut older = ImportSummary::begin("first.csv");
        older.started_at = Utc::now() - Duration::minutes(5);
        older.rows_imported = 3;
        older.rows_incomplete = 1;
        older.finish();

        let mut newer = ImportSummary::begin("second.csv");
        newer.errors.push(RowError {
            line: 4,
            code: "STORE_ERROR".to_string(),
            message: "locked".to_string(),
        });
        newer.finish();

        save_run(&pool, &older).await.unwrap();
        save_run(&pool, &newer).await.unwrap();

        let runs = list_recent_runs(&pool, 10).await.unwrap();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].file_name, "second.csv");
        assert_eq!(runs[0].errors.len(), 1);
        assert_eq!(runs[1].rows_imported, 3);
        assert_eq!(runs[1].rows_incomplete, 1);
    }

    #[tokio::test]
    async fn test_unreadable_errors_column_lists_run_without_errors() {
        let pool = init_memory_database().await.unwrap();

        let mut summary = ImportSummary::begin("roster.csv");
        summary.finish();
        save_run(&pool, &summary).await.unwrap();
        sqlx::query("UPDATE import_runs SET errors = 'not json'")
            .execute(&pool)
            .await
            .unwrap();

        let runs = list_recent_runs(&pool, 10).await.unwrap();
        assert_eq!(runs.len(), 1);
        assert!(runs[0].errors.is_empty());
    }
}
