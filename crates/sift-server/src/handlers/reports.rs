//! Report handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use sift_core::models::{MonthlyReport, TopMerchantsReport};
use sift_core::{generate_monthly_report, generate_top_merchants};

use crate::{AppError, AppState};

const DEFAULT_MERCHANT_LIMIT: i64 = 5;
const MAX_MERCHANT_LIMIT: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    /// Optional month filter (YYYY-MM)
    pub month: Option<String>,
}

/// GET /api/datasets/:id/report - Monthly aggregate report
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(dataset_id): Path<String>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<MonthlyReport>, AppError> {
    let engine = state.engine();
    let report =
        generate_monthly_report(&state.db, &engine, &dataset_id, params.month.as_deref())?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
pub struct MerchantsQuery {
    /// Optional month filter (YYYY-MM)
    pub month: Option<String>,
    /// Maximum number of merchants to return (1..=50)
    pub limit: Option<i64>,
}

/// GET /api/datasets/:id/merchants - Merchant spend ranking
pub async fn get_merchants(
    State(state): State<Arc<AppState>>,
    Path(dataset_id): Path<String>,
    Query(params): Query<MerchantsQuery>,
) -> Result<Json<TopMerchantsReport>, AppError> {
    let limit = params.limit.unwrap_or(DEFAULT_MERCHANT_LIMIT);
    if !(1..=MAX_MERCHANT_LIMIT).contains(&limit) {
        return Err(AppError::bad_request(&format!(
            "limit must be between 1 and {}",
            MAX_MERCHANT_LIMIT
        )));
    }

    let report = generate_top_merchants(&state.db, &dataset_id, params.month.as_deref(), limit)?;
    Ok(Json(report))
}
