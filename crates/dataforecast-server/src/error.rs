use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level errors that map directly to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    /// Nothing could be loaded for the dashboard: no credential resolved, or
    /// every upstream request failed.
    #[error("analytics data unavailable")]
    AnalyticsUnavailable,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, hint) = match &self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "not_found", "Not found", None),
            AppError::AnalyticsUnavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "analytics_unavailable",
                "Unable to load analytics data",
                Some("Check your DATAFAST_API_KEY and try again"),
            ),
        };

        (
            status,
            Json(json!({
                "error": {
                    "code": code,
                    "message": message,
                    "hint": hint,
                    "field": null
                }
            })),
        )
            .into_response()
    }
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
