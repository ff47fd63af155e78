use axum::{response::IntoResponse, Json};
use serde_json::json;

/// `GET /health`: liveness check.
///
/// Never calls upstream, so a bad or missing DataFa.st key does not make the
/// container unhealthy.
///
/// Response shape:
/// ```json
/// { "status": "ok", "version": "0.1.0" }
/// ```
#[tracing::instrument]
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
