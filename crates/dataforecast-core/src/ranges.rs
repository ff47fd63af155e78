//! Calendar-aligned overview ranges.
//!
//! Every calculator takes "today" as a plain calendar date so the math is
//! deterministic; [`local_today`] derives that date from an instant.
//! Weeks start on Monday regardless of locale.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;

/// Days of daily history requested for the forecast and ten-day card.
pub const DAILY_HISTORY_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start_at: NaiveDate,
    pub end_at: NaiveDate,
    pub timezone: String,
}

impl DateRange {
    fn new(start_at: NaiveDate, end_at: NaiveDate, timezone: &str) -> Self {
        Self {
            start_at,
            end_at,
            timezone: timezone.to_string(),
        }
    }

    /// Inclusive length in days.
    pub fn days(&self) -> i64 {
        (self.end_at - self.start_at).num_days() + 1
    }

    /// `startAt`/`endAt`/`timezone` query pairs, dates as `YYYY-MM-DD`.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("startAt", self.start_at.format("%Y-%m-%d").to_string()),
            ("endAt", self.end_at.format("%Y-%m-%d").to_string()),
            ("timezone", self.timezone.clone()),
        ]
    }
}

/// Calendar date of `now` in `tz`.
pub fn local_today<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    now.with_timezone(tz).date_naive()
}

/// Monday on or before `today`.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    today - Duration::days(i64::from(today.weekday().num_days_from_monday()))
}

pub fn today_range(today: NaiveDate, timezone: &str) -> DateRange {
    DateRange::new(today, today, timezone)
}

pub fn yesterday_range(today: NaiveDate, timezone: &str) -> DateRange {
    let yesterday = today - Duration::days(1);
    DateRange::new(yesterday, yesterday, timezone)
}

pub fn this_week_range(today: NaiveDate, timezone: &str) -> DateRange {
    DateRange::new(week_start(today), today, timezone)
}

/// The full Monday–Sunday week before the current one.
pub fn last_week_range(today: NaiveDate, timezone: &str) -> DateRange {
    let this_monday = week_start(today);
    DateRange::new(
        this_monday - Duration::days(7),
        this_monday - Duration::days(1),
        timezone,
    )
}

pub fn daily_history_range(today: NaiveDate, timezone: &str) -> DateRange {
    DateRange::new(today - Duration::days(DAILY_HISTORY_DAYS), today, timezone)
}
