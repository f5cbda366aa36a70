//! Dataset handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use sift_core::models::{Dataset, UploadResult};
use sift_core::upload_transactions;

use crate::{AppError, AppState};

/// GET /api/datasets - List stored datasets
pub async fn list_datasets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Dataset>>, AppError> {
    Ok(Json(state.db.list_datasets()?))
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub csv_text: String,
    pub source_name: Option<String>,
}

/// POST /api/datasets - Ingest a CSV payload as a new dataset
pub async fn upload_dataset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<UploadRequest>,
) -> Result<Json<UploadResult>, AppError> {
    if request.csv_text.trim().is_empty() {
        return Err(AppError::bad_request("csv_text is required"));
    }

    let result = upload_transactions(
        &state.db,
        &request.csv_text,
        request.source_name.as_deref(),
    )?;

    info!(
        dataset_id = %result.dataset_id,
        rows = result.rows_ingested,
        warnings = result.warnings.len(),
        "Dataset uploaded"
    );

    Ok(Json(result))
}
