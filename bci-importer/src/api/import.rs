//! Import API handlers
//!
//! POST /import, GET /import/runs

use axum::{
    body::Bytes,
    extract::{multipart::Multipart, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::io::Cursor;

use crate::config::ImportSettings;
use crate::db::import_runs::{list_recent_runs, ImportRunRecord};
use crate::error::{ApiError, ApiResult, ImportError};
use crate::models::{ImportSummary, Upload};
use crate::{services, AppState};

/// Multipart part carrying the file
pub const UPLOAD_FIELD: &str = "csv_file";

/// POST /import response
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// Operator message, e.g. "12 rows imported"
    pub message: String,
    pub summary: ImportSummary,
}

/// GET /import/runs query
#[derive(Debug, Deserialize)]
pub struct RunsQuery {
    #[serde(default = "default_runs_limit")]
    pub limit: i64,
}

fn default_runs_limit() -> i64 {
    20
}

struct UploadedPart {
    file_name: String,
    content_type: Option<String>,
    bytes: Bytes,
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::BadRequest(format!("Malformed upload: {}", e.body_text()))
    }
}

async fn read_upload_part(multipart: &mut Multipart) -> ApiResult<Option<UploadedPart>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        return Ok(Some(UploadedPart {
            file_name,
            content_type,
            bytes,
        }));
    }

    Ok(None)
}

/// POST /import
///
/// Runs the whole import synchronously and answers with the summary.
pub async fn import_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<ImportResponse>> {
    let Some(part) = read_upload_part(&mut multipart).await? else {
        return Err(ImportError::Validation("No file uploaded.".to_string()).into());
    };

    let settings =
        ImportSettings::resolve(&state.db, &state.import_config, state.asset_dir.clone()).await?;
    let orchestrator = services::sqlite_orchestrator(&state.db, state.fetcher.clone(), &settings);

    let upload = Upload::new(part.file_name, Cursor::new(part.bytes))
        .with_content_type(part.content_type);

    let summary = match orchestrator.run(upload).await {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "Import aborted");
            *state.last_error.write().await = Some(e.to_string());
            return Err(e.into());
        }
    };

    if let Err(e) = crate::db::import_runs::save_run(&state.db, &summary).await {
        tracing::warn!(run_id = %summary.run_id, error = %e, "Failed to record import run");
    }

    Ok(Json(ImportResponse {
        message: summary.message(),
        summary,
    }))
}

/// GET /import/runs
pub async fn list_runs(
    State(state): State<AppState>,
    Query(query): Query<RunsQuery>,
) -> ApiResult<Json<Vec<ImportRunRecord>>> {
    let limit = query.limit.clamp(1, 200);
    Ok(Json(list_recent_runs(&state.db, limit).await?))
}

/// Build import routes
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/import", post(import_upload))
        .route("/import/runs", get(list_runs))
}
