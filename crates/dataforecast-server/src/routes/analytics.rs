use std::sync::Arc;

use axum::{extract::State, http::HeaderMap, Json};
use tracing::warn;

use dataforecast_core::analytics::DashboardPayload;

use crate::{credential::resolve_credential, dashboard::fetch_dashboard, state::AppState};

/// `GET /api/analytics`: every dashboard field, fetched concurrently.
///
/// Always `200 OK`. A field is `null` when its upstream request failed; with
/// no resolvable credential every field is `null` and upstream is not called.
#[tracing::instrument(skip(state, headers))]
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<DashboardPayload> {
    Json(load_payload(&state, &headers).await)
}

/// Shared by the JSON endpoint and the weather view.
pub(crate) async fn load_payload(state: &AppState, headers: &HeaderMap) -> DashboardPayload {
    let Some(credential) = resolve_credential(headers, state.config.default_api_key.as_deref())
    else {
        warn!("No DataFa.st API key configured; returning empty dashboard");
        return DashboardPayload::default();
    };

    fetch_dashboard(
        state.source.as_ref(),
        &credential,
        state.today(),
        &state.config.timezone,
    )
    .await
}
