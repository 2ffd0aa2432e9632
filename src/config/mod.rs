pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::domain::model::{HourRange, RenderMode, TimeProfile, WeekendPattern};
use crate::utils::error::{FareError, Result};
use crate::utils::validation::{
    validate_currency_code, validate_location_code, validate_positive_number, validate_range,
    Validate,
};
use chrono::NaiveDate;
use std::time::Duration;

pub use catalog::Catalog;

/// What a scan cycle searches for and how it paces itself. Built once at
/// cycle start and never changed while the cycle runs.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub origin: String,
    pub destinations: Vec<String>,
    /// `None` means "today" at the moment the cycle starts.
    pub start_date: Option<NaiveDate>,
    pub horizon_weeks: i64,
    pub patterns: Vec<WeekendPattern>,
    pub stay_nights: Option<i64>,
    pub include_today_if_match: bool,
    pub time_profiles: Vec<TimeProfile>,
    pub currency: String,
    pub pacing: Duration,
    pub rate_limit_backoff: Duration,
    pub top_n: usize,
    pub render_mode: RenderMode,
    pub per_window_top_k: usize,
    pub deliver_empty: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            origin: "MAD".to_string(),
            destinations: [
                "LON", "PAR", "ROM", "MIL", "BER", "LIS", "OPO", "BRU", "AMS", "DUB", "RAK", "VCE",
            ]
            .iter()
            .map(|c| c.to_string())
            .collect(),
            start_date: None,
            horizon_weeks: 4,
            patterns: vec![WeekendPattern::FriSun],
            stay_nights: None,
            include_today_if_match: false,
            time_profiles: Vec::new(),
            currency: "EUR".to_string(),
            pacing: Duration::from_secs(1),
            rate_limit_backoff: Duration::from_secs(5),
            top_n: 25,
            render_mode: RenderMode::Flat,
            per_window_top_k: 3,
            deliver_empty: false,
        }
    }
}

pub const MAX_HORIZON_WEEKS: i64 = 52;
pub const MAX_STAY_NIGHTS: i64 = 14;

impl Validate for ScanConfig {
    fn validate(&self) -> Result<()> {
        validate_location_code("scan.origin", &self.origin)?;

        if self.destinations.is_empty() {
            return Err(FareError::invalid_config(
                "scan.destinations",
                "[]",
                "At least one destination is required",
            ));
        }
        for destination in &self.destinations {
            validate_location_code("scan.destinations", destination)?;
        }

        validate_range("scan.horizon_weeks", self.horizon_weeks, 1, MAX_HORIZON_WEEKS)?;
        if let Some(stay) = self.stay_nights {
            validate_range("scan.stay_nights", stay, 1, MAX_STAY_NIGHTS)?;
        }
        if self.patterns.is_empty() {
            return Err(FareError::invalid_config(
                "scan.patterns",
                "[]",
                "At least one weekend pattern is required",
            ));
        }

        for profile in &self.time_profiles {
            validate_hour_range("scan.time_profiles.outbound_hours", profile.outbound_hours)?;
            validate_hour_range("scan.time_profiles.inbound_hours", profile.inbound_hours)?;
        }

        validate_currency_code("scan.currency", &self.currency)?;
        validate_positive_number("scan.top_n", self.top_n as i64, 1)?;
        validate_positive_number("scan.per_window_top_k", self.per_window_top_k as i64, 1)?;
        Ok(())
    }
}

/// Offer acceptance rules. Applied after the provider answers, whatever the
/// provider claims to have filtered already.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    pub max_price: Option<f64>,
    pub nonstop_only: bool,
    pub outbound_hours: Option<HourRange>,
    pub inbound_hours: Option<HourRange>,
    /// Inbound departures at or after this hour are classified as premium.
    pub premium_return_hour: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            max_price: Some(100.0),
            nonstop_only: true,
            outbound_hours: None,
            inbound_hours: None,
            premium_return_hour: 15,
        }
    }
}

impl Validate for FilterConfig {
    fn validate(&self) -> Result<()> {
        if let Some(max_price) = self.max_price {
            if !max_price.is_finite() || max_price < 0.0 {
                return Err(FareError::invalid_config(
                    "filter.max_price",
                    max_price,
                    "Price ceiling must be a non-negative amount",
                ));
            }
        }
        validate_hour_range("filter.outbound_hours", self.outbound_hours)?;
        validate_hour_range("filter.inbound_hours", self.inbound_hours)?;
        validate_range("filter.premium_return_hour", self.premium_return_hour, 0, 23)?;
        Ok(())
    }
}

fn validate_hour_range(field_name: &str, range: Option<HourRange>) -> Result<()> {
    let Some(range) = range else {
        return Ok(());
    };
    validate_range(field_name, range.min, 0, 23)?;
    validate_range(field_name, range.max, 0, 23)?;
    if range.min > range.max {
        return Err(FareError::invalid_config(
            field_name,
            range,
            "Range start must not be after its end",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ScanConfig::default().validate().is_ok());
        assert!(FilterConfig::default().validate().is_ok());
    }

    #[test]
    fn test_non_positive_horizon_is_rejected() {
        let config = ScanConfig {
            horizon_weeks: 0,
            ..ScanConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_horizon_and_stay_are_bounded() {
        let config = ScanConfig {
            horizon_weeks: MAX_HORIZON_WEEKS,
            stay_nights: Some(MAX_STAY_NIGHTS),
            ..ScanConfig::default()
        };
        assert!(config.validate().is_ok());

        let config = ScanConfig {
            horizon_weeks: i64::MAX,
            ..ScanConfig::default()
        };
        assert!(matches!(
            config.validate().unwrap_err(),
            FareError::InvalidConfiguration { ref field, .. } if field == "scan.horizon_weeks"
        ));

        let config = ScanConfig {
            stay_nights: Some(MAX_STAY_NIGHTS + 1),
            ..ScanConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_destinations_rejected() {
        let config = ScanConfig {
            destinations: vec![],
            ..ScanConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_inverted_hour_range_rejected() {
        let filter = FilterConfig {
            inbound_hours: Some(HourRange::new(20, 16)),
            ..FilterConfig::default()
        };
        assert!(filter.validate().is_err());

        let filter = FilterConfig {
            outbound_hours: Some(HourRange::new(15, 24)),
            ..FilterConfig::default()
        };
        assert!(filter.validate().is_err());
    }

    #[test]
    fn test_negative_price_ceiling_rejected() {
        let filter = FilterConfig {
            max_price: Some(-1.0),
            ..FilterConfig::default()
        };
        assert!(filter.validate().is_err());
    }
}
