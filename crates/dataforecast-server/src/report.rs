//! Weather-report view model.
//!
//! Turns a [`DashboardPayload`] into cards whose display strings are already
//! formatted. Layout, styling and icons belong to the client.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use dataforecast_core::{
    analytics::{DashboardPayload, Envelope, ForecastPoint, OverviewRow, TimeseriesPoint},
    forecast::generate_forecast,
    format::{format_currency, format_duration, format_number, to_fixed},
    weather::{hour_label, percent_change, traffic_status, BounceRateLabel, ConversionLabel, TrafficStatus},
};

const DEFAULT_CURRENCY: &str = "$";
const DEFAULT_SITE_NAME: &str = "Your Site";
const OBSERVED_DAYS: usize = 7;
const FORECAST_ROWS: usize = 3;
const LIST_ROWS: usize = 5;
const SHORT_LIST_ROWS: usize = 4;

#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub generated_at: String,
    pub currency: String,
    pub hero: Hero,
    pub hourly: HourlyStrip,
    pub ten_day: Vec<DayRow>,
    pub forecast: Vec<ForecastPoint>,
    pub bounce_rate: GaugeCard,
    pub countries: CountriesCard,
    pub traffic_sources: TrafficSourcesCard,
    pub conversion: GaugeCard,
    pub revenue: RevenueCard,
    pub revenue_per_visitor: NoteCard,
    pub sessions: SessionsCard,
    pub duration: NoteCard,
    pub top_pages: Vec<ShareRow>,
    pub devices: Vec<ShareRow>,
    pub browsers: Vec<ShareRow>,
    pub week_over_week: WeekOverWeek,
}

#[derive(Debug, Clone, Serialize)]
pub struct Hero {
    pub site_name: String,
    pub realtime_visitors: u64,
    pub realtime_label: String,
    pub status: TrafficStatus,
    pub status_label: String,
    pub high: u64,
    pub low: u64,
    /// `H:1.2K  L:40`
    pub high_low_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HourlyStrip {
    pub summary: String,
    pub hours: Vec<HourSlot>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HourSlot {
    pub label: String,
    pub timestamp: String,
    pub visitors: u64,
    /// Visitors relative to the busiest hour, `0.0..=1.0`.
    pub intensity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DayRow {
    pub name: String,
    pub low: u64,
    pub high: u64,
    pub low_label: String,
    pub high_label: String,
    pub is_forecast: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct GaugeCard {
    pub value: f64,
    pub display: String,
    pub label: String,
    /// Marker position along the gauge, `0.0..=1.0`.
    pub position: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareRow {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub visitors: u64,
    pub visitors_label: String,
    pub share_pct: f64,
    pub share_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CountriesCard {
    pub rows: Vec<ShareRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TopSource {
    pub referrer: String,
    pub visitors_label: String,
    pub revenue_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrafficSourcesCard {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top: Option<TopSource>,
    pub sources: Vec<ShareRow>,
    pub total_visitors: u64,
    pub total_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RevenueCard {
    pub today: f64,
    pub yesterday: f64,
    pub today_label: String,
    pub yesterday_label: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NoteCard {
    pub value: f64,
    pub display: String,
    pub note: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionsCard {
    pub sessions: u64,
    pub display: String,
    pub trend: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Comparison {
    pub this_week: f64,
    pub last_week: f64,
    pub this_week_label: String,
    pub last_week_label: String,
    /// `+12.5%` / `-3.0%`; absent when last week is zero.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_label: Option<String>,
    pub up: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct WeekOverWeek {
    pub visitors: Comparison,
    pub revenue: Comparison,
}

fn rows<T>(envelope: &Option<Envelope<T>>) -> &[T] {
    envelope.as_ref().map(|e| e.data.as_slice()).unwrap_or(&[])
}

fn overview(envelope: &Option<Envelope<OverviewRow>>) -> OverviewRow {
    envelope
        .as_ref()
        .and_then(Envelope::first)
        .cloned()
        .unwrap_or_default()
}

fn currency_of(payload: &DashboardPayload) -> String {
    [&payload.hourly_timeseries, &payload.daily_timeseries]
        .into_iter()
        .filter_map(|e| e.as_ref().and_then(|e| e.currency.clone()))
        .find(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

/// `12.3` share of `total`, `"0"` label when the total is zero.
fn share(visitors: u64, total: u64) -> (f64, String) {
    if total == 0 {
        return (0.0, "0".to_string());
    }
    let pct = visitors as f64 / total as f64 * 100.0;
    (pct, to_fixed(pct, 1))
}

fn share_row(name: &str, image: Option<String>, visitors: u64, total: u64) -> ShareRow {
    let (share_pct, share_label) = share(visitors, total);
    ShareRow {
        name: name.to_string(),
        image,
        visitors,
        visitors_label: format_number(visitors as f64),
        share_pct,
        share_label,
    }
}

fn comparison(this_week: f64, last_week: f64, label: impl Fn(f64) -> String) -> Comparison {
    let up = this_week >= last_week;
    let change_label = (last_week > 0.0).then(|| {
        let sign = if up { "+" } else { "" };
        format!("{sign}{}%", to_fixed(percent_change(this_week, last_week), 1))
    });
    Comparison {
        this_week,
        last_week,
        this_week_label: label(this_week),
        last_week_label: label(last_week),
        change_label,
        up,
    }
}

fn hero(payload: &DashboardPayload, hourly: &[TimeseriesPoint], status: TrafficStatus) -> Hero {
    let realtime_visitors = rows(&payload.realtime)
        .first()
        .map(|r| r.visitors)
        .unwrap_or(0);
    let high = hourly.iter().map(|p| p.visitors).max().unwrap_or(0);
    let low = hourly.iter().map(|p| p.visitors).min().unwrap_or(0);
    let site_name = rows(&payload.pages)
        .first()
        .and_then(|p| p.hostname.clone())
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SITE_NAME.to_string());

    Hero {
        site_name,
        realtime_visitors,
        realtime_label: format_number(realtime_visitors as f64),
        status,
        status_label: status.label().to_string(),
        high,
        low,
        high_low_label: format!(
            "H:{}  L:{}",
            format_number(high as f64),
            format_number(low as f64)
        ),
    }
}

fn hourly_strip(hourly: &[TimeseriesPoint], status: TrafficStatus) -> HourlyStrip {
    let busiest = hourly.iter().map(|p| p.visitors).max().unwrap_or(0).max(1) as f64;
    HourlyStrip {
        summary: status.summary().to_string(),
        hours: hourly
            .iter()
            .enumerate()
            .map(|(i, p)| HourSlot {
                label: hour_label(i, &p.timestamp),
                timestamp: p.timestamp.clone(),
                visitors: p.visitors,
                intensity: p.visitors as f64 / busiest,
            })
            .collect(),
    }
}

/// Last week of observations followed by the first forecast days. The most
/// recent observed day is labelled "Today".
fn ten_day(daily: &[TimeseriesPoint], forecast: &[ForecastPoint]) -> Vec<DayRow> {
    let observed = &daily[daily.len().saturating_sub(OBSERVED_DAYS)..];
    // Rows are oldest first, so "Today" goes on the last observed row, not row 0.
    let last_observed = observed.len().checked_sub(1);

    let day_row = |name: String, visitors: u64, is_forecast: bool| {
        let low = (visitors as f64 * 0.55).round() as u64;
        DayRow {
            name,
            low,
            high: visitors,
            low_label: format_number(low as f64),
            high_label: format_number(visitors as f64),
            is_forecast,
        }
    };

    observed
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let name = if Some(i) == last_observed {
                "Today".to_string()
            } else {
                p.name.clone()
            };
            day_row(name, p.visitors, false)
        })
        .chain(
            forecast
                .iter()
                .take(FORECAST_ROWS)
                .map(|p| day_row(p.name.clone(), p.visitors, true)),
        )
        .collect()
}

fn bounce_rate_card(rate: f64) -> GaugeCard {
    let display = format!("{}%", to_fixed(rate, 1));
    let verdict = if rate < 50.0 {
        "below average, visitors are engaged."
    } else {
        "above average, consider improving engagement."
    };
    GaugeCard {
        value: rate,
        note: Some(format!("Bounce rate is {display}, which is {verdict}")),
        display,
        label: BounceRateLabel::for_rate(rate).label().to_string(),
        position: (rate / 100.0).clamp(0.0, 1.0),
    }
}

fn conversion_card(rate: f64) -> GaugeCard {
    GaugeCard {
        value: rate,
        display: format!("{}%", to_fixed(rate, 2)),
        label: ConversionLabel::for_rate(rate).label().to_string(),
        position: (rate / 8.0).clamp(0.0, 1.0),
        note: None,
    }
}

fn countries_card(payload: &DashboardPayload) -> CountriesCard {
    let countries = rows(&payload.countries);
    let total = countries.iter().map(|c| c.visitors).sum();
    CountriesCard {
        rows: countries
            .iter()
            .take(LIST_ROWS)
            .map(|c| share_row(&c.country, c.image.clone(), c.visitors, total))
            .collect(),
        summary: countries.first().map(|top| {
            format!(
                "Most traffic comes from {} with {} visitors.",
                top.country,
                format_number(top.visitors as f64)
            )
        }),
    }
}

fn traffic_sources_card(payload: &DashboardPayload, currency: &str) -> TrafficSourcesCard {
    let referrers = rows(&payload.referrers);
    let total = referrers.iter().map(|r| r.visitors).sum();
    TrafficSourcesCard {
        top: referrers.first().map(|r| TopSource {
            referrer: r.referrer.clone(),
            visitors_label: format_number(r.visitors as f64),
            revenue_label: format_currency(r.revenue, currency),
        }),
        sources: referrers
            .iter()
            .take(LIST_ROWS)
            .map(|r| share_row(&r.referrer, None, r.visitors, total))
            .collect(),
        total_visitors: total,
        total_label: format_number(total as f64),
    }
}

fn sessions_card(today: u64, yesterday: u64) -> SessionsCard {
    let direction = if today >= yesterday { "Up" } else { "Down" };
    SessionsCard {
        sessions: today,
        display: format_number(today as f64),
        trend: format!(
            "{direction} from {} yesterday.",
            format_number(yesterday as f64)
        ),
    }
}

fn duration_card(ms: f64) -> NoteCard {
    let note = if ms > 180_000.0 {
        "Visitors are spending quality time on your site."
    } else {
        "Sessions are quick. Consider deeper content."
    };
    NoteCard {
        value: ms,
        display: format_duration(ms),
        note: note.to_string(),
    }
}

fn revenue_per_visitor_card(rpv: f64, currency: &str) -> NoteCard {
    let note = if rpv > 2.0 {
        "Visitors are converting well into revenue."
    } else {
        "Each visitor brings modest revenue on average."
    };
    NoteCard {
        value: rpv,
        display: format!("{currency}{}", to_fixed(rpv, 2)),
        note: note.to_string(),
    }
}

/// Derive every card from one aggregated payload.
pub fn build_report(
    payload: &DashboardPayload,
    now: DateTime<Utc>,
    forecast_days: u32,
) -> WeatherReport {
    let hourly = rows(&payload.hourly_timeseries);
    let daily = rows(&payload.daily_timeseries);
    let currency = currency_of(payload);

    let today = overview(&payload.overview_today);
    let yesterday = overview(&payload.overview_yesterday);
    let this_week = overview(&payload.overview_this_week);
    let last_week = overview(&payload.overview_last_week);

    let status = traffic_status(hourly);
    let forecast = generate_forecast(daily, forecast_days, now);

    let pages = rows(&payload.pages);
    let page_total = pages.iter().map(|p| p.visitors).sum();
    let devices = rows(&payload.devices);
    let device_total = devices.iter().map(|d| d.visitors).sum();
    let browsers = rows(&payload.browsers);
    let browser_total = browsers.iter().map(|b| b.visitors).sum();

    WeatherReport {
        generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        hero: hero(payload, hourly, status),
        hourly: hourly_strip(hourly, status),
        ten_day: ten_day(daily, &forecast),
        bounce_rate: bounce_rate_card(today.bounce_rate),
        countries: countries_card(payload),
        traffic_sources: traffic_sources_card(payload, &currency),
        conversion: conversion_card(today.conversion_rate),
        revenue: RevenueCard {
            today: today.revenue,
            yesterday: yesterday.revenue,
            today_label: format_currency(today.revenue, &currency),
            yesterday_label: format_currency(yesterday.revenue, &currency),
        },
        revenue_per_visitor: revenue_per_visitor_card(today.revenue_per_visitor, &currency),
        sessions: sessions_card(today.sessions, yesterday.sessions),
        duration: duration_card(today.avg_session_duration),
        top_pages: pages
            .iter()
            .take(SHORT_LIST_ROWS)
            .map(|p| share_row(&p.path, None, p.visitors, page_total))
            .collect(),
        devices: devices
            .iter()
            .map(|d| share_row(&d.device, None, d.visitors, device_total))
            .collect(),
        browsers: browsers
            .iter()
            .take(SHORT_LIST_ROWS)
            .map(|b| share_row(&b.browser, None, b.visitors, browser_total))
            .collect(),
        week_over_week: WeekOverWeek {
            visitors: comparison(this_week.visitors as f64, last_week.visitors as f64, format_number),
            revenue: comparison(this_week.revenue, last_week.revenue, |v| {
                format_currency(v, &currency)
            }),
        },
        forecast,
        currency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 15, 0, 0)
            .single()
            .expect("instant")
    }

    fn payload() -> DashboardPayload {
        serde_json::from_value(json!({
            "realtime": { "data": [{ "visitors": 42 }] },
            "hourlyTimeseries": {
                "currency": "€",
                "data": [
                    { "name": "10", "timestamp": "2026-10-16T10:00:00Z", "visitors": 10 },
                    { "name": "11", "timestamp": "2026-10-16T11:00:00Z", "visitors": 40 },
                    { "name": "12", "timestamp": "2026-10-16T12:00:00Z", "visitors": 20 },
                    { "name": "13", "timestamp": "2026-10-16T13:00:00Z", "visitors": 30 }
                ]
            },
            "dailyTimeseries": { "data": [
                { "name": "Tue", "timestamp": "2026-10-13T00:00:00Z", "visitors": 100, "revenue": 10 },
                { "name": "Wed", "timestamp": "2026-10-14T00:00:00Z", "visitors": 200, "revenue": 20 },
                { "name": "Thu", "timestamp": "2026-10-15T00:00:00Z", "visitors": 300, "revenue": 30 },
                { "name": "Fri", "timestamp": "2026-10-16T00:00:00Z", "visitors": 400, "revenue": 40 }
            ] },
            "overviewToday": { "data": [{
                "visitors": 400, "sessions": 520, "bounce_rate": 41.25,
                "avg_session_duration": 125000, "revenue": 1500,
                "revenue_per_visitor": 3.75, "conversion_rate": 2.5
            }] },
            "overviewYesterday": { "data": [{ "sessions": 600, "revenue": 900 }] },
            "overviewThisWeek": { "data": [{ "visitors": 1100, "revenue": 80 }] },
            "overviewLastWeek": { "data": [{ "visitors": 1000, "revenue": 100 }] },
            "countries": { "data": [
                { "country": "France", "image": "fr.png", "visitors": 75, "revenue": 0 },
                { "country": "Japan", "visitors": 25, "revenue": 0 }
            ] },
            "referrers": { "data": [
                { "referrer": "google.com", "visitors": 1500, "revenue": 12 },
                { "referrer": "x.com", "visitors": 500, "revenue": 0 }
            ] },
            "pages": { "data": [{ "hostname": "shop.example", "path": "/", "visitors": 90, "revenue": 0 }] },
            "devices": { "data": [
                { "device": "desktop", "visitors": 2, "revenue": 0 },
                { "device": "mobile", "visitors": 1, "revenue": 0 }
            ] },
            "browsers": null
        }))
        .expect("payload")
    }

    #[test]
    fn hero_and_hourly_strip() {
        let report = build_report(&payload(), now(), 7);
        assert_eq!(report.hero.site_name, "shop.example");
        assert_eq!(report.hero.realtime_label, "42");
        assert_eq!((report.hero.high, report.hero.low), (40, 10));
        assert_eq!(report.hero.status, TrafficStatus::Steady);
        assert_eq!(report.hero.high_low_label, "H:40  L:10");

        let labels: Vec<&str> = report.hourly.hours.iter().map(|h| h.label.as_str()).collect();
        assert_eq!(labels, vec!["Now", "11AM", "12PM", "1PM"]);
        assert_eq!(report.hourly.hours[1].intensity, 1.0);
        assert_eq!(report.hourly.hours[0].intensity, 0.25);
    }

    #[test]
    fn ten_day_joins_history_and_three_forecast_days() {
        let report = build_report(&payload(), now(), 7);
        assert_eq!(report.forecast.len(), 7);
        assert_eq!(report.ten_day.len(), 7);

        let names: Vec<&str> = report.ten_day.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Tue", "Wed", "Thu", "Today", "Sat", "Sun", "Mon"]);
        assert_eq!(report.ten_day[4].high, 500);
        assert_eq!(report.ten_day[4].low, 275);
        assert!(report.ten_day[4].is_forecast);
        assert!(!report.ten_day[3].is_forecast);
    }

    #[test]
    fn overview_cards_use_report_currency() {
        let report = build_report(&payload(), now(), 7);
        assert_eq!(report.currency, "€");
        assert_eq!(report.bounce_rate.display, "41.3%");
        assert_eq!(report.bounce_rate.label, "Good");
        assert_eq!(report.conversion.display, "2.50%");
        assert_eq!(report.conversion.label, "Good");
        assert_eq!(report.revenue.today_label, "€1.5K");
        assert_eq!(report.revenue.yesterday_label, "€900");
        assert_eq!(report.revenue_per_visitor.display, "€3.75");
        assert_eq!(report.sessions.trend, "Down from 600 yesterday.");
        assert_eq!(report.duration.display, "2m 5s");
        assert_eq!(report.traffic_sources.total_label, "2.0K");
        assert_eq!(
            report.traffic_sources.top.as_ref().map(|t| t.revenue_label.as_str()),
            Some("€12")
        );
    }

    #[test]
    fn breakdown_shares() {
        let report = build_report(&payload(), now(), 7);
        assert_eq!(report.countries.rows[0].share_label, "75.0");
        assert_eq!(report.countries.rows[0].image.as_deref(), Some("fr.png"));
        assert_eq!(
            report.countries.summary.as_deref(),
            Some("Most traffic comes from France with 75 visitors.")
        );
        assert_eq!(report.devices[0].share_label, "66.7");
        assert!(report.browsers.is_empty());
    }

    #[test]
    fn week_over_week_change() {
        let report = build_report(&payload(), now(), 7);
        let visitors = &report.week_over_week.visitors;
        assert!(visitors.up);
        assert_eq!(visitors.change_label.as_deref(), Some("+10.0%"));
        let revenue = &report.week_over_week.revenue;
        assert!(!revenue.up);
        assert_eq!(revenue.change_label.as_deref(), Some("-20.0%"));
        assert_eq!(revenue.last_week_label, "€100");
    }

    #[test]
    fn empty_payload_renders_zeroes() {
        let report = build_report(&DashboardPayload::default(), now(), 7);
        assert_eq!(report.currency, "$");
        assert_eq!(report.hero.site_name, "Your Site");
        assert_eq!(report.hero.status, TrafficStatus::GatheringData);
        assert_eq!(report.hero.realtime_visitors, 0);
        assert_eq!(report.bounce_rate.label, "Excellent");
        assert_eq!(report.sessions.trend, "Up from 0 yesterday.");
        assert!(report.week_over_week.visitors.change_label.is_none());
        assert!(report.countries.summary.is_none());
        assert_eq!(report.ten_day.len(), 3);
        assert!(report.ten_day.iter().all(|d| d.is_forecast));
    }
}
