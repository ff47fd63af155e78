//! Short-horizon trend extrapolation over daily history.
//!
//! Ordinary least squares with the index position as x. No seasonality,
//! confidence interval or outlier handling.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

use crate::analytics::{ForecastPoint, TimeseriesPoint};

/// Most recent daily observations fed into the fit.
pub const FORECAST_WINDOW: usize = 14;
pub const DEFAULT_FORECAST_DAYS: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Fit `y = intercept + slope * i` over `values[i]`.
///
/// With fewer than two observations the line is flat at the single value
/// (or zero when empty).
pub fn linear_regression(values: &[f64]) -> LinearFit {
    let n = values.len();
    if n < 2 {
        return LinearFit {
            slope: 0.0,
            intercept: values.first().copied().unwrap_or(0.0),
        };
    }

    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (i, y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let n = n as f64;
    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_xx - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / n;
    LinearFit { slope, intercept }
}

/// Project `days` future points from the last [`FORECAST_WINDOW`] days of
/// `daily`. Weekday names advance from the last observed timestamp, or from
/// `now` when there is no history.
pub fn generate_forecast(
    daily: &[TimeseriesPoint],
    days: u32,
    now: DateTime<Utc>,
) -> Vec<ForecastPoint> {
    let recent = &daily[daily.len().saturating_sub(FORECAST_WINDOW)..];

    let visitors: Vec<f64> = recent.iter().map(|p| p.visitors as f64).collect();
    let revenue: Vec<f64> = recent.iter().map(|p| p.revenue.unwrap_or(0.0)).collect();
    let visitor_fit = linear_regression(&visitors);
    let revenue_fit = linear_regression(&revenue);

    let last = recent
        .last()
        .and_then(|p| parse_timestamp(&p.timestamp))
        .unwrap_or(now);
    let n = recent.len() as f64;

    (1..=days)
        .map(|i| {
            let date = last + Duration::days(i64::from(i));
            let x = n + f64::from(i) - 1.0;
            ForecastPoint {
                name: date.format("%a").to_string(),
                timestamp: date.to_rfc3339_opts(SecondsFormat::Millis, true),
                visitors: project(visitor_fit, x) as u64,
                revenue: project(revenue_fit, x),
                is_forecast: true,
            }
        })
        .collect()
}

fn project(fit: LinearFit, x: f64) -> f64 {
    let value = fit.at(x).round();
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

/// Accepts RFC 3339, naive ISO datetimes and bare dates (taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
