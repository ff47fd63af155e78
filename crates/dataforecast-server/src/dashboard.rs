//! Dashboard fan-out: one inbound read, twelve concurrent upstream reads.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use tracing::{error, info};

use dataforecast_core::{
    analytics::{
        parse_envelope, AnalyticsSource, ApiKey, DashboardPayload, Endpoint, Envelope,
        QueryParams,
    },
    ranges::{
        daily_history_range, last_week_range, this_week_range, today_range, yesterday_range,
    },
};

/// Fields requested for both timeseries.
pub const TIMESERIES_FIELDS: &str = "visitors,sessions,revenue,conversion_rate,name";
/// Row limit for the top-N breakdowns.
pub const TOP_LIMIT: &str = "5";

/// Fetch every dashboard field concurrently and wait for all of them.
///
/// Each branch turns its own failure into `None` after logging it, so the
/// aggregate itself cannot fail.
pub async fn fetch_dashboard(
    source: &dyn AnalyticsSource,
    credential: &ApiKey,
    today: NaiveDate,
    timezone: &str,
) -> DashboardPayload {
    let tz = || ("timezone", timezone.to_string());

    let hourly: QueryParams = vec![
        ("fields", TIMESERIES_FIELDS.to_string()),
        ("interval", "hour".to_string()),
        tz(),
    ];
    let mut daily: QueryParams = vec![
        ("fields", TIMESERIES_FIELDS.to_string()),
        ("interval", "day".to_string()),
    ];
    daily.extend(daily_history_range(today, timezone).to_params());

    let overview_today = today_range(today, timezone).to_params();
    let overview_yesterday = yesterday_range(today, timezone).to_params();
    let overview_this_week = this_week_range(today, timezone).to_params();
    let overview_last_week = last_week_range(today, timezone).to_params();
    let top: QueryParams = vec![("limit", TOP_LIMIT.to_string()), tz()];
    let devices: QueryParams = vec![tz()];

    let (
        realtime,
        hourly_timeseries,
        daily_timeseries,
        overview_today,
        overview_yesterday,
        overview_this_week,
        overview_last_week,
        countries,
        referrers,
        pages,
        devices,
        browsers,
    ) = tokio::join!(
        fetch_field(source, credential, Endpoint::Realtime, &[]),
        fetch_field(source, credential, Endpoint::Timeseries, &hourly),
        fetch_field(source, credential, Endpoint::Timeseries, &daily),
        fetch_field(source, credential, Endpoint::Overview, &overview_today),
        fetch_field(source, credential, Endpoint::Overview, &overview_yesterday),
        fetch_field(source, credential, Endpoint::Overview, &overview_this_week),
        fetch_field(source, credential, Endpoint::Overview, &overview_last_week),
        fetch_field(source, credential, Endpoint::Countries, &top),
        fetch_field(source, credential, Endpoint::Referrers, &top),
        fetch_field(source, credential, Endpoint::Pages, &top),
        fetch_field(source, credential, Endpoint::Devices, &devices),
        fetch_field(source, credential, Endpoint::Browsers, &top),
    );

    let payload = DashboardPayload {
        realtime,
        hourly_timeseries,
        daily_timeseries,
        overview_today,
        overview_yesterday,
        overview_this_week,
        overview_last_week,
        countries,
        referrers,
        pages,
        devices,
        browsers,
    };
    info!(loaded = payload.loaded_count(), %today, "Dashboard aggregated");
    payload
}

async fn fetch_field<T>(
    source: &dyn AnalyticsSource,
    credential: &ApiKey,
    endpoint: Endpoint,
    params: &[(&'static str, String)],
) -> Option<Envelope<T>>
where
    T: DeserializeOwned,
{
    let parsed = match source.fetch(credential, endpoint, params).await {
        Ok(body) => parse_envelope(endpoint, body),
        Err(e) => Err(e),
    };
    match parsed {
        Ok(envelope) => Some(envelope),
        Err(e) => {
            error!(%endpoint, error = %e, "DataFa.st request failed");
            None
        }
    }
}
