//! Qualitative labels for the weather-report conceit.

use std::fmt;

use chrono::Timelike;
use serde::Serialize;

use crate::analytics::TimeseriesPoint;
use crate::forecast::parse_timestamp;

/// Hourly points required before a trend is reported.
pub const MIN_TREND_POINTS: usize = 4;
const TREND_WINDOW: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficStatus {
    GatheringData,
    Surging,
    TrendingUp,
    Steady,
    CoolingDown,
    LowActivity,
}

impl TrafficStatus {
    pub fn label(self) -> &'static str {
        match self {
            TrafficStatus::GatheringData => "Gathering Data",
            TrafficStatus::Surging => "Surging Traffic",
            TrafficStatus::TrendingUp => "Trending Up",
            TrafficStatus::Steady => "Steady Traffic",
            TrafficStatus::CoolingDown => "Cooling Down",
            TrafficStatus::LowActivity => "Low Activity",
        }
    }

    /// Sentence shown above the hourly strip.
    pub fn summary(self) -> &'static str {
        match self {
            TrafficStatus::Surging => {
                "Traffic is surging right now. Visitors are up significantly."
            }
            TrafficStatus::TrendingUp => {
                "Traffic is picking up. Expect more visitors throughout the day."
            }
            TrafficStatus::Steady => "Steady traffic throughout the day. Patterns look normal.",
            TrafficStatus::CoolingDown => "Traffic is slowing down compared to earlier.",
            TrafficStatus::GatheringData | TrafficStatus::LowActivity => {
                "Low activity period. Traffic may pick up soon."
            }
        }
    }

    fn from_change(change: f64) -> Self {
        if change > 0.20 {
            TrafficStatus::Surging
        } else if change > 0.05 {
            TrafficStatus::TrendingUp
        } else if change > -0.05 {
            TrafficStatus::Steady
        } else if change > -0.20 {
            TrafficStatus::CoolingDown
        } else {
            TrafficStatus::LowActivity
        }
    }
}

impl fmt::Display for TrafficStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Compare the mean of the last six hours to the six before them.
///
/// When there is no earlier window, or its mean is zero, the change is zero.
pub fn traffic_status(hourly: &[TimeseriesPoint]) -> TrafficStatus {
    let len = hourly.len();
    if len < MIN_TREND_POINTS {
        return TrafficStatus::GatheringData;
    }

    let recent = &hourly[len.saturating_sub(TREND_WINDOW)..];
    let earlier = &hourly[len.saturating_sub(2 * TREND_WINDOW)..len.saturating_sub(TREND_WINDOW)];

    let recent_avg = mean_visitors(recent);
    let earlier_avg = if earlier.is_empty() {
        recent_avg
    } else {
        mean_visitors(earlier)
    };

    let change = if earlier_avg > 0.0 {
        (recent_avg - earlier_avg) / earlier_avg
    } else {
        0.0
    };
    TrafficStatus::from_change(change)
}

fn mean_visitors(points: &[TimeseriesPoint]) -> f64 {
    let total: u64 = points.iter().map(|p| p.visitors).sum();
    total as f64 / points.len() as f64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BounceRateLabel {
    Excellent,
    Good,
    Moderate,
    High,
    VeryHigh,
}

impl BounceRateLabel {
    pub fn for_rate(rate: f64) -> Self {
        if rate < 30.0 {
            BounceRateLabel::Excellent
        } else if rate < 50.0 {
            BounceRateLabel::Good
        } else if rate < 65.0 {
            BounceRateLabel::Moderate
        } else if rate < 80.0 {
            BounceRateLabel::High
        } else {
            BounceRateLabel::VeryHigh
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BounceRateLabel::Excellent => "Excellent",
            BounceRateLabel::Good => "Good",
            BounceRateLabel::Moderate => "Moderate",
            BounceRateLabel::High => "High",
            BounceRateLabel::VeryHigh => "Very High",
        }
    }
}

impl fmt::Display for BounceRateLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionLabel {
    Exceptional,
    High,
    Good,
    Moderate,
    Low,
}

impl ConversionLabel {
    pub fn for_rate(rate: f64) -> Self {
        if rate >= 5.0 {
            ConversionLabel::Exceptional
        } else if rate >= 3.0 {
            ConversionLabel::High
        } else if rate >= 1.5 {
            ConversionLabel::Good
        } else if rate >= 0.5 {
            ConversionLabel::Moderate
        } else {
            ConversionLabel::Low
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ConversionLabel::Exceptional => "Exceptional",
            ConversionLabel::High => "High",
            ConversionLabel::Good => "Good",
            ConversionLabel::Moderate => "Moderate",
            ConversionLabel::Low => "Low",
        }
    }
}

impl fmt::Display for ConversionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Percentage change; a zero baseline reports 100 for any growth and 0
/// otherwise.
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    (current - previous) / previous * 100.0
}

/// `Now` for the first strip entry, then 12-hour labels from the UTC hour.
pub fn hour_label(index: usize, timestamp: &str) -> String {
    if index == 0 {
        return "Now".to_string();
    }
    let Some(hour) = parse_timestamp(timestamp).map(|t| t.hour()) else {
        return "--".to_string();
    };
    match hour {
        0 => "12AM".to_string(),
        1..=11 => format!("{hour}AM"),
        12 => "12PM".to_string(),
        _ => format!("{}PM", hour - 12),
    }
}
