//! Upstream analytics data model and the source abstraction.
//!
//! Everything the DataFa.st API returns is parsed into these types once,
//! right after the fetch. Numeric fields accept numbers, numeric strings or
//! `null` and fall back to zero, so nothing downstream ever sees a missing
//! metric.

use std::fmt;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::SourceError;

/// Bearer credential presented to the analytics provider.
///
/// `Debug` is redacted so the key never ends up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns `None` for blank input.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Realtime,
    Timeseries,
    Overview,
    Countries,
    Referrers,
    Pages,
    Devices,
    Browsers,
}

impl Endpoint {
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Realtime => "realtime",
            Endpoint::Timeseries => "timeseries",
            Endpoint::Overview => "overview",
            Endpoint::Countries => "countries",
            Endpoint::Referrers => "referrers",
            Endpoint::Pages => "pages",
            Endpoint::Devices => "devices",
            Endpoint::Browsers => "browsers",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Query-string pairs for one upstream request.
pub type QueryParams = Vec<(&'static str, String)>;

/// A read-only analytics provider.
///
/// Implementations return the raw JSON body of a successful response; typed
/// parsing happens at the caller so every source shares the same boundary.
#[async_trait::async_trait]
pub trait AnalyticsSource: Send + Sync + 'static {
    async fn fetch(
        &self,
        credential: &ApiKey,
        endpoint: Endpoint,
        params: &[(&'static str, String)],
    ) -> Result<Value, SourceError>;
}

/// Response envelope shared by every upstream endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Envelope<T> {
    /// `null`, a non-array, or rows that are not objects all degrade to
    /// fewer rows rather than a failed field.
    #[serde(default = "Vec::new", deserialize_with = "lenient_rows")]
    pub data: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl<T> Default for Envelope<T> {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            currency: None,
        }
    }
}

impl<T> Envelope<T> {
    pub fn first(&self) -> Option<&T> {
        self.data.first()
    }
}

/// One bucketed (hourly or daily) analytics sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TimeseriesPoint {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub timestamp: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub visitors: u64,
    #[serde(
        default,
        deserialize_with = "lenient_opt_count",
        skip_serializing_if = "Option::is_none"
    )]
    pub sessions: Option<u64>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub revenue: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_opt_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub conversion_rate: Option<f64>,
}

/// Synthetic future point produced by trend extrapolation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPoint {
    pub name: String,
    pub timestamp: String,
    pub visitors: u64,
    pub revenue: f64,
    pub is_forecast: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RealtimeRow {
    #[serde(default, deserialize_with = "lenient_count")]
    pub visitors: u64,
}

/// Aggregate metrics over one overview range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct OverviewRow {
    #[serde(default, deserialize_with = "lenient_count")]
    pub visitors: u64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub sessions: u64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub bounce_rate: f64,
    /// Milliseconds.
    #[serde(default, deserialize_with = "lenient_amount")]
    pub avg_session_duration: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub revenue: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub revenue_per_visitor: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub conversion_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CountryRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub visitors: u64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReferrerRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub referrer: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub visitors: u64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PageRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub path: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub visitors: u64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DeviceRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub device: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub visitors: u64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BrowserRow {
    #[serde(default, deserialize_with = "lenient_string")]
    pub browser: String,
    #[serde(default, deserialize_with = "lenient_count")]
    pub visitors: u64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub revenue: f64,
}

/// The combined result of one dashboard fan-out. A `None` field means that
/// sub-request failed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub realtime: Option<Envelope<RealtimeRow>>,
    pub hourly_timeseries: Option<Envelope<TimeseriesPoint>>,
    pub daily_timeseries: Option<Envelope<TimeseriesPoint>>,
    pub overview_today: Option<Envelope<OverviewRow>>,
    pub overview_yesterday: Option<Envelope<OverviewRow>>,
    pub overview_this_week: Option<Envelope<OverviewRow>>,
    pub overview_last_week: Option<Envelope<OverviewRow>>,
    pub countries: Option<Envelope<CountryRow>>,
    pub referrers: Option<Envelope<ReferrerRow>>,
    pub pages: Option<Envelope<PageRow>>,
    pub devices: Option<Envelope<DeviceRow>>,
    pub browsers: Option<Envelope<BrowserRow>>,
}

impl DashboardPayload {
    /// Number of sub-requests that produced data.
    pub fn loaded_count(&self) -> usize {
        [
            self.realtime.is_some(),
            self.hourly_timeseries.is_some(),
            self.daily_timeseries.is_some(),
            self.overview_today.is_some(),
            self.overview_yesterday.is_some(),
            self.overview_this_week.is_some(),
            self.overview_last_week.is_some(),
            self.countries.is_some(),
            self.referrers.is_some(),
            self.pages.is_some(),
            self.devices.is_some(),
            self.browsers.is_some(),
        ]
        .into_iter()
        .filter(|loaded| *loaded)
        .count()
    }

    pub fn is_empty(&self) -> bool {
        self.loaded_count() == 0
    }
}

/// Parse a raw upstream body into a typed envelope.
pub fn parse_envelope<T>(endpoint: Endpoint, body: Value) -> Result<Envelope<T>, SourceError>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(body).map_err(|e| SourceError::Decode {
        endpoint: endpoint.path(),
        message: e.to_string(),
    })
}

fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_amount(deserializer)?.unwrap_or(0.0))
}

fn lenient_opt_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(value_as_f64).map(|v| v.max(0.0)))
}

fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_count(deserializer)?.unwrap_or(0))
}

fn lenient_opt_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_opt_amount(deserializer)?.map(|v| v.round() as u64))
}

fn lenient_rows<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let rows = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(rows)) => rows,
        _ => return Ok(Vec::new()),
    };
    Ok(rows
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|row| serde_json::from_value(row).ok())
        .collect())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}
