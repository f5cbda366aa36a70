//! Sift Web Server
//!
//! Axum-based REST API over the Sift analytics pipeline:
//! - Upload CSV exports as immutable datasets
//! - Monthly reports and merchant rankings per dataset
//! - Budget suggestions with anomaly findings
//!
//! Validation errors map to 400, unknown datasets to 404; internal errors are
//! sanitized in responses and logged with full detail.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};

use sift_core::{CategorizationEngine, Database, SummaryClient};

mod handlers;


/// Shared application state
pub struct AppState {
    pub db: Database,
    /// Optional taxonomy file extending the built-in categorization rules.
    /// The rule set is reloaded per request; no mutable state crosses requests.
    pub taxonomy_path: Option<PathBuf>,
    /// Optional summary backend for suggestion enrichment
    pub summarizer: Option<SummaryClient>,
}

impl AppState {
    /// Load the categorization engine for one request
    pub fn engine(&self) -> CategorizationEngine {
        CategorizationEngine::from_taxonomy_path(self.taxonomy_path.as_deref())
    }
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/datasets",
            get(handlers::list_datasets).post(handlers::upload_dataset),
        )
        .route("/datasets/:id/report", get(handlers::get_report))
        .route("/datasets/:id/merchants", get(handlers::get_merchants))
        .route("/datasets/:id/suggestions", get(handlers::get_suggestions))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

// Upload payloads are bounded; a personal CSV export is a few MB at most.
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Run the server until shutdown
pub async fn serve(state: Arc<AppState>, host: &str, port: u16) -> anyhow::Result<()> {
    let app = router(state).layer(axum::extract::DefaultBodyLimit::max(MAX_UPLOAD_SIZE));

    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    info!("Listening on http://{}:{}", host, port);
    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<sift_core::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl From<sift_core::Error> for AppError {
    fn from(err: sift_core::Error) -> Self {
        use sift_core::Error;
        match err {
            Error::InvalidData(msg) | Error::Import(msg) => Self::bad_request(&msg),
            Error::NotFound(msg) => Self::not_found(&msg),
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                // Return generic message to client, keep full error for logging
                message: "An internal error occurred".to_string(),
                internal: Some(other),
            },
        }
    }
}
