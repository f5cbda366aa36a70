//! Request handlers, organized by domain:
//! - `datasets` - Dataset listing and CSV upload
//! - `reports` - Monthly report and merchant ranking
//! - `suggestions` - Budget suggestions with anomalies

mod datasets;
mod reports;
mod suggestions;

pub use datasets::{list_datasets, upload_dataset};
pub use reports::{get_merchants, get_report};
pub use suggestions::get_suggestions;

use axum::Json;

/// GET /api/health - liveness probe
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
