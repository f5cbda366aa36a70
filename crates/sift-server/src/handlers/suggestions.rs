//! Budget suggestion handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use sift_core::models::SuggestionSet;
use sift_core::{validate_month, Error, SuggestionGenerator, MIN_RECOMMENDATIONS};

use crate::{AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct SuggestionsQuery {
    /// Optional month filter (YYYY-MM)
    pub month: Option<String>,
    /// Number of suggestions to return (3..=7)
    pub count: Option<usize>,
    /// Whether to request the LLM executive summary (default true; only takes
    /// effect when a summary backend is configured)
    pub summary: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub dataset_id: String,
    #[serde(flatten)]
    pub set: SuggestionSet,
}

/// GET /api/datasets/:id/suggestions - Ranked budget suggestions
pub async fn get_suggestions(
    State(state): State<Arc<AppState>>,
    Path(dataset_id): Path<String>,
    Query(params): Query<SuggestionsQuery>,
) -> Result<Json<SuggestionsResponse>, AppError> {
    let month = params.month.as_deref();
    validate_month(month)?;
    if !state.db.dataset_exists(&dataset_id)? {
        return Err(AppError::from(Error::NotFound(format!(
            "Unknown dataset_id: {}",
            dataset_id
        ))));
    }

    let rows = state.db.fetch_transactions(&dataset_id, month)?;
    let count = params.count.unwrap_or(MIN_RECOMMENDATIONS);
    let summarizer = if params.summary.unwrap_or(true) {
        state.summarizer.as_ref()
    } else {
        None
    };

    let engine = state.engine();
    let set = SuggestionGenerator::new(&engine)
        .generate(&rows, month, count, summarizer)
        .await?;

    Ok(Json(SuggestionsResponse { dataset_id, set }))
}
