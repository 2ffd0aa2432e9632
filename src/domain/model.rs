use chrono::{Datelike, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeekendPattern {
    FriSun,
    SatSun,
    FriSat,
}

impl WeekendPattern {
    pub fn start_weekday(self) -> Weekday {
        match self {
            WeekendPattern::FriSun | WeekendPattern::FriSat => Weekday::Fri,
            WeekendPattern::SatSun => Weekday::Sat,
        }
    }

    pub fn default_stay_nights(self) -> i64 {
        match self {
            WeekendPattern::FriSun => 2,
            WeekendPattern::SatSun | WeekendPattern::FriSat => 1,
        }
    }
}

impl fmt::Display for WeekendPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WeekendPattern::FriSun => "Fri-Sun",
            WeekendPattern::SatSun => "Sat-Sun",
            WeekendPattern::FriSat => "Fri-Sat",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeekendWindow {
    pub label: String,
    pub outbound_date: NaiveDate,
    pub inbound_date: NaiveDate,
    pub pattern: WeekendPattern,
}

impl WeekendWindow {
    pub fn new(outbound_date: NaiveDate, inbound_date: NaiveDate, pattern: WeekendPattern) -> Self {
        let label = format!(
            "{} {} → {} {} {}",
            outbound_date.weekday(),
            outbound_date.format("%d %b"),
            inbound_date.weekday(),
            inbound_date.format("%d %b"),
            inbound_date.year()
        );
        Self {
            label,
            outbound_date,
            inbound_date,
            pattern,
        }
    }
}

/// Inclusive hour-of-day range, both ends in `0..=23`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourRange {
    pub min: u32,
    pub max: u32,
}

impl HourRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, hour: u32) -> bool {
        hour >= self.min && hour <= self.max
    }
}

impl fmt::Display for HourRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}h-{:02}h", self.min, self.max)
    }
}

/// A named pair of time-of-day ranges. Scanning with several profiles issues
/// one query per profile for every destination and window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeProfile {
    pub name: String,
    pub outbound_hours: Option<HourRange>,
    pub inbound_hours: Option<HourRange>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    pub origin: String,
    pub destination: String,
    pub outbound_date: NaiveDate,
    pub inbound_date: NaiveDate,
    pub max_price: Option<f64>,
    pub nonstop_only: bool,
    pub outbound_hours: Option<HourRange>,
    pub inbound_hours: Option<HourRange>,
    pub currency: String,
    pub window: WeekendWindow,
    pub profile: Option<String>,
}

/// One leg segment as reported by a provider. Nothing here is trusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSegment {
    pub carrier: Option<String>,
    pub departure: Option<String>,
}

/// Provider record handed to the normalizer. Adapters map their wire format
/// into this loose shape; the price stays as whatever JSON value the provider
/// sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawOffer {
    pub price: serde_json::Value,
    pub currency: Option<String>,
    pub outbound: Vec<RawSegment>,
    pub inbound: Vec<RawSegment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    /// Late return, the whole Sunday (or Saturday) is usable.
    Premium,
    BudgetTiming,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub destination_code: String,
    pub destination_name: String,
    pub price: f64,
    pub currency: String,
    pub carrier: Option<String>,
    pub outbound_departure: NaiveDateTime,
    pub inbound_departure: NaiveDateTime,
    pub stops: u32,
    pub tier: Tier,
    pub source_window: WeekendWindow,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderResult {
    Success(Vec<RawOffer>),
    RateLimited,
    Failure(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaStatus {
    Known { remaining: u64 },
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Flat,
    ByWindow,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedReport {
    pub offers: Vec<Offer>,
    /// Every window of the cycle in chronological order, including those
    /// without offers.
    pub windows: Vec<WeekendWindow>,
    pub mode: RenderMode,
}

impl RankedReport {
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryStatus {
    Completed { kept: usize },
    RateLimited,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub destination: String,
    pub window_label: String,
    pub profile: Option<String>,
    pub status: QueryStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub queries: usize,
    pub completed: usize,
    pub rate_limited: usize,
    pub failed: usize,
    pub raw_records: usize,
    pub normalization_failures: usize,
    pub filtered_out: usize,
    pub accepted: usize,
}

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub report: RankedReport,
    pub outcomes: Vec<QueryOutcome>,
    pub stats: ScanStats,
    pub quota: QuotaStatus,
}

#[derive(Debug, Clone)]
pub struct CycleReport {
    pub outcome: ScanOutcome,
    pub rendered: String,
    /// `None` when nothing was sent, otherwise whether delivery succeeded.
    pub delivered: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_label_is_readable() {
        let w = WeekendWindow::new(
            NaiveDate::from_ymd_opt(2024, 6, 7).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 9).unwrap(),
            WeekendPattern::FriSun,
        );
        assert_eq!(w.label, "Fri 07 Jun → Sun 09 Jun 2024");
    }

    #[test]
    fn test_hour_range_is_inclusive() {
        let r = HourRange::new(15, 20);
        assert!(r.contains(15));
        assert!(r.contains(20));
        assert!(!r.contains(14));
        assert!(!r.contains(21));
    }
}
