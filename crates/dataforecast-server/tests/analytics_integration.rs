use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use dataforecast_datafast::DatafastClient;
use dataforecast_server::app::build_app;
use dataforecast_server::config::Config;
use dataforecast_server::state::AppState;

const PAYLOAD_FIELDS: [&str; 12] = [
    "realtime",
    "hourlyTimeseries",
    "dailyTimeseries",
    "overviewToday",
    "overviewYesterday",
    "overviewThisWeek",
    "overviewLastWeek",
    "countries",
    "referrers",
    "pages",
    "devices",
    "browsers",
];

struct Upstream {
    accepted_key: &'static str,
    failing: Vec<&'static str>,
    hits: AtomicUsize,
}

async fn analytics(
    State(upstream): State<Arc<Upstream>>,
    Path(endpoint): Path<String>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    upstream.hits.fetch_add(1, Ordering::SeqCst);
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if auth != format!("Bearer {}", upstream.accepted_key) {
        return Err(StatusCode::UNAUTHORIZED);
    }
    if upstream.failing.iter().any(|f| *f == endpoint) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let body = match endpoint.as_str() {
        "realtime" => json!({ "data": [{ "visitors": 3 }] }),
        "timeseries" if query.get("interval").map(String::as_str) == Some("hour") => json!({
            "currency": "$",
            "data": [
                { "name": "10", "timestamp": "2026-10-16T10:00:00Z", "visitors": 4 },
                { "name": "11", "timestamp": "2026-10-16T11:00:00Z", "visitors": "8" },
                { "name": "12", "timestamp": "2026-10-16T12:00:00Z", "visitors": null },
                { "name": "13", "timestamp": "2026-10-16T13:00:00Z", "visitors": 6 }
            ]
        }),
        "timeseries" => json!({
            "data": [
                { "name": "Wed", "timestamp": "2026-10-14T00:00:00Z", "visitors": 10, "revenue": 1 },
                { "name": "Thu", "timestamp": "2026-10-15T00:00:00Z", "visitors": 20, "revenue": 2 },
                { "name": "Fri", "timestamp": "2026-10-16T00:00:00Z", "visitors": 30, "revenue": 3 }
            ]
        }),
        "overview" => json!({
            "data": [{
                "visitors": 30, "sessions": 40, "bounce_rate": 55.5,
                "avg_session_duration": 45000, "revenue": "12.5",
                "revenue_per_visitor": 0.42, "conversion_rate": 1.2
            }]
        }),
        "countries" => json!({ "data": [{ "country": "Canada", "visitors": 9, "revenue": 0 }] }),
        "referrers" => json!({ "data": [{ "referrer": "news.ycombinator.com", "visitors": 7, "revenue": 5 }] }),
        "pages" => json!({ "data": [{ "hostname": "weather.example", "path": "/", "visitors": 6, "revenue": 0 }] }),
        "devices" => json!({ "data": [{ "device": "desktop", "visitors": 5, "revenue": 0 }] }),
        "browsers" => json!({ "data": [{ "browser": "Firefox", "visitors": 4, "revenue": 0 }] }),
        _ => return Err(StatusCode::NOT_FOUND),
    };
    Ok(Json(body))
}

async fn spawn_upstream(accepted_key: &'static str, failing: Vec<&'static str>) -> (String, Arc<Upstream>) {
    let upstream = Arc::new(Upstream {
        accepted_key,
        failing,
        hits: AtomicUsize::new(0),
    });
    let app = Router::new()
        .route("/api/v1/analytics/{endpoint}", get(analytics))
        .with_state(Arc::clone(&upstream));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}/api/v1/analytics"), upstream)
}

fn app_for(api_base: &str, default_api_key: Option<&str>) -> Router {
    let config = Config {
        port: 0,
        api_base: api_base.to_string(),
        default_api_key: default_api_key.map(str::to_string),
        cache_ttl_seconds: 0,
        ..Config::default()
    };
    let client = DatafastClient::new(api_base, Duration::ZERO).expect("client");
    let state = AppState::new(Arc::new(client), config).expect("state");
    build_app(Arc::new(state))
}

async fn get_json(app: Router, uri: &str, cookie: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header("cookie", cookie);
    }
    let request = builder.body(Body::empty()).expect("build request");
    let response = app.oneshot(request).await.expect("request");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes();
    (status, serde_json::from_slice(&bytes).expect("parse JSON"))
}

// ============================================================
// GET /api/analytics
// ============================================================

#[tokio::test]
async fn one_failing_endpoint_degrades_only_its_field() {
    let (base, _) = spawn_upstream("df_env", vec!["countries"]).await;
    let (status, json) = get_json(app_for(&base, Some("df_env")), "/api/analytics", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(json["countries"].is_null());
    for field in PAYLOAD_FIELDS.iter().filter(|f| **f != "countries") {
        assert!(json[*field].is_object(), "{field} should be populated");
    }
    assert_eq!(json["realtime"]["data"][0]["visitors"], 3);
    assert_eq!(json["hourlyTimeseries"]["currency"], "$");
}

#[tokio::test]
async fn malformed_metrics_are_defaulted_at_the_boundary() {
    let (base, _) = spawn_upstream("df_env", vec![]).await;
    let (_, json) = get_json(app_for(&base, Some("df_env")), "/api/analytics", None).await;

    let hours = &json["hourlyTimeseries"]["data"];
    assert_eq!(hours[1]["visitors"], 8);
    assert_eq!(hours[2]["visitors"], 0);
    assert_eq!(json["overviewToday"]["data"][0]["revenue"], 12.5);
}

#[tokio::test]
async fn missing_credential_returns_empty_payload_without_upstream_calls() {
    let (base, upstream) = spawn_upstream("df_env", vec![]).await;
    let (status, json) = get_json(app_for(&base, None), "/api/analytics", None).await;

    assert_eq!(status, StatusCode::OK);
    for field in PAYLOAD_FIELDS {
        assert!(json[field].is_null(), "{field} should be null");
    }
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn cookie_credential_takes_precedence() {
    let (base, upstream) = spawn_upstream("df_cookie", vec![]).await;

    let (_, json) = get_json(
        app_for(&base, Some("df_env")),
        "/api/analytics",
        Some("datafast-api-key=df_cookie"),
    )
    .await;
    assert!(json["realtime"].is_object());
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 12);

    // Without the cookie the server default is used, and upstream rejects it.
    let (status, json) = get_json(app_for(&base, Some("df_env")), "/api/analytics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["realtime"].is_null());
}

// ============================================================
// GET /weather
// ============================================================

#[tokio::test]
async fn weather_report_renders_from_live_data() {
    let (base, _) = spawn_upstream("df_env", vec!["browsers"]).await;
    let (status, json) = get_json(app_for(&base, Some("df_env")), "/weather", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["hero"]["site_name"], "weather.example");
    assert_eq!(json["hero"]["realtime_visitors"], 3);
    assert_eq!(json["hero"]["high"], 8);
    assert_eq!(json["hero"]["low"], 0);
    assert_eq!(json["hourly"]["hours"][0]["label"], "Now");
    assert_eq!(json["bounce_rate"]["label"], "Moderate");
    assert_eq!(json["duration"]["display"], "45s");
    assert_eq!(json["revenue"]["today_label"], "$12.5");
    assert_eq!(json["forecast"].as_array().map(Vec::len), Some(7));
    assert_eq!(json["forecast"][0]["visitors"], 40);
    assert_eq!(json["forecast"][0]["isForecast"], true);
    assert_eq!(json["ten_day"][2]["name"], "Today");
    assert_eq!(json["countries"]["rows"][0]["share_label"], "100.0");
    assert_eq!(json["browsers"], json!([]));
}

#[tokio::test]
async fn weather_is_unavailable_when_every_request_fails() {
    let (base, _) = spawn_upstream("df_other", vec![]).await;
    let (status, json) = get_json(app_for(&base, Some("df_env")), "/weather", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "analytics_unavailable");
    assert_eq!(json["error"]["message"], "Unable to load analytics data");
    assert_eq!(json["error"]["hint"], "Check your DATAFAST_API_KEY and try again");
}

#[tokio::test]
async fn weather_is_unavailable_without_credential() {
    let (base, upstream) = spawn_upstream("df_env", vec![]).await;
    let (status, json) = get_json(app_for(&base, None), "/weather", None).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json["error"]["code"], "analytics_unavailable");
    assert_eq!(upstream.hits.load(Ordering::SeqCst), 0);
}

// ============================================================
// Liveness and fallback
// ============================================================

#[tokio::test]
async fn health_is_ok_without_upstream() {
    let (status, json) = get_json(app_for("http://127.0.0.1:9", None), "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, json) = get_json(app_for("http://127.0.0.1:9", None), "/nope", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}
