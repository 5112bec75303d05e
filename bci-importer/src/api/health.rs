//! GET /health
//!
//! Reports whether the importer can reach its database, what the most
//! recent completed run did, and the last fatal import error.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::import_runs::list_recent_runs;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", or "degraded" when the database does not answer
    pub status: &'static str,
    pub module: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub database: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<LastRun>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Most recent completed import
#[derive(Debug, Serialize)]
pub struct LastRun {
    pub run_id: String,
    pub file_name: String,
    pub rows_imported: i64,
    pub rows_failed: i64,
    pub ended_at: DateTime<Utc>,
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let uptime_seconds = Utc::now()
        .signed_duration_since(state.startup_time)
        .num_seconds()
        .max(0) as u64;

    let (database_ok, last_run) = match list_recent_runs(&state.db, 1).await {
        Ok(runs) => (
            true,
            runs.into_iter().next().map(|run| LastRun {
                run_id: run.run_id,
                file_name: run.file_name,
                rows_imported: run.rows_imported,
                rows_failed: run.rows_failed,
                ended_at: run.ended_at,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not read import runs");
            (false, None)
        }
    };

    let status_code = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: if database_ok { "ok" } else { "degraded" },
        module: "bci-importer",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds,
        database: if database_ok { "ok" } else { "unreachable" },
        last_run,
        last_error: state.last_error.read().await.clone(),
    };

    (status_code, Json(response))
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
