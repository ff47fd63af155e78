use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use chrono::Utc;

use crate::{
    error::AppError,
    report::{build_report, WeatherReport},
    routes::analytics::load_payload,
    state::AppState,
};

/// `GET /weather`: the weather-report view model.
///
/// Partial data renders with zero defaults. When nothing at all could be
/// loaded the response is the static `analytics_unavailable` error (503).
#[tracing::instrument(skip(state, headers))]
pub async fn get_weather(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<WeatherReport>, AppError> {
    let payload = load_payload(&state, &headers).await;
    if payload.is_empty() {
        return Err(AppError::AnalyticsUnavailable);
    }
    Ok(Json(build_report(
        &payload,
        Utc::now(),
        state.config.forecast_days,
    )))
}
