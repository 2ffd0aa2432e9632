use crate::domain::model::{WeekendPattern, WeekendWindow};
use crate::utils::error::{FareError, Result};
use chrono::{Datelike, Duration, NaiveDate};

#[derive(Debug, Clone, Copy)]
pub struct CalendarRequest {
    pub start_date: NaiveDate,
    pub horizon_weeks: i64,
    pub pattern: WeekendPattern,
    pub stay_nights: Option<i64>,
    /// When `start_date` already falls on the pattern's start weekday, use it
    /// as the first window instead of jumping a week ahead.
    pub include_today_if_match: bool,
}

pub fn generate_windows(request: &CalendarRequest) -> Result<Vec<WeekendWindow>> {
    if request.horizon_weeks <= 0 {
        return Err(FareError::invalid_config(
            "scan.horizon_weeks",
            request.horizon_weeks,
            "Horizon must be at least one week",
        ));
    }
    let stay = request
        .stay_nights
        .unwrap_or_else(|| request.pattern.default_stay_nights());
    if stay <= 0 {
        return Err(FareError::invalid_config(
            "scan.stay_nights",
            stay,
            "Stay must be at least one night",
        ));
    }

    let anchor = first_departure(
        request.start_date,
        request.pattern,
        request.include_today_if_match,
    )
    .ok_or_else(|| out_of_range(request))?;

    let offset = |week: i64| {
        let outbound = Duration::try_weeks(week).and_then(|d| anchor.checked_add_signed(d))?;
        let inbound = Duration::try_days(stay).and_then(|d| outbound.checked_add_signed(d))?;
        Some((outbound, inbound))
    };
    if offset(request.horizon_weeks - 1).is_none() {
        return Err(out_of_range(request));
    }

    (0..request.horizon_weeks)
        .map(|week| {
            let (outbound, inbound) = offset(week).ok_or_else(|| out_of_range(request))?;
            Ok(WeekendWindow::new(outbound, inbound, request.pattern))
        })
        .collect()
}

fn out_of_range(request: &CalendarRequest) -> FareError {
    FareError::invalid_config(
        "scan.horizon_weeks",
        request.horizon_weeks,
        format!(
            "Calendar starting {} runs past the last representable date",
            request.start_date
        ),
    )
}

/// Windows for several patterns merged into one chronological sequence.
pub fn generate_calendar(
    start_date: NaiveDate,
    horizon_weeks: i64,
    patterns: &[WeekendPattern],
    stay_nights: Option<i64>,
    include_today_if_match: bool,
) -> Result<Vec<WeekendWindow>> {
    let mut windows = Vec::new();
    for pattern in patterns {
        windows.extend(generate_windows(&CalendarRequest {
            start_date,
            horizon_weeks,
            pattern: *pattern,
            stay_nights,
            include_today_if_match,
        })?);
    }
    windows.sort_by(|a, b| {
        a.outbound_date
            .cmp(&b.outbound_date)
            .then(a.inbound_date.cmp(&b.inbound_date))
    });
    windows.dedup_by(|a, b| a.label == b.label);
    Ok(windows)
}

fn first_departure(
    start: NaiveDate,
    pattern: WeekendPattern,
    include_today: bool,
) -> Option<NaiveDate> {
    let target = pattern.start_weekday().num_days_from_monday() as i64;
    let today = start.weekday().num_days_from_monday() as i64;
    let mut days_ahead = (target - today + 7) % 7;
    if days_ahead == 0 && !include_today {
        days_ahead = 7;
    }
    start.checked_add_signed(Duration::days(days_ahead))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(start: NaiveDate, weeks: i64, pattern: WeekendPattern) -> CalendarRequest {
        CalendarRequest {
            start_date: start,
            horizon_weeks: weeks,
            pattern,
            stay_nights: None,
            include_today_if_match: false,
        }
    }

    #[test]
    fn test_produces_exactly_horizon_windows_a_week_apart() {
        for weeks in 1..=10 {
            let windows =
                generate_windows(&request(date(2024, 6, 3), weeks, WeekendPattern::FriSun))
                    .unwrap();
            assert_eq!(windows.len() as i64, weeks);
            for pair in windows.windows(2) {
                assert_eq!(pair[1].outbound_date - pair[0].outbound_date, Duration::days(7));
            }
            for w in &windows {
                assert!(w.inbound_date > w.outbound_date);
            }
        }
    }

    #[test]
    fn test_fri_sun_from_monday() {
        let windows =
            generate_windows(&request(date(2024, 6, 3), 2, WeekendPattern::FriSun)).unwrap();
        assert_eq!(windows[0].outbound_date, date(2024, 6, 7));
        assert_eq!(windows[0].inbound_date, date(2024, 6, 9));
        assert_eq!(windows[1].outbound_date, date(2024, 6, 14));
    }

    #[test]
    fn test_sat_sun_stays_one_night() {
        let windows =
            generate_windows(&request(date(2024, 6, 3), 1, WeekendPattern::SatSun)).unwrap();
        assert_eq!(windows[0].outbound_date, date(2024, 6, 8));
        assert_eq!(windows[0].inbound_date, date(2024, 6, 9));
    }

    #[test]
    fn test_matching_start_day_respects_flag() {
        let friday = date(2024, 6, 7);
        let skipped = generate_windows(&request(friday, 1, WeekendPattern::FriSun)).unwrap();
        assert_eq!(skipped[0].outbound_date, date(2024, 6, 14));

        let included = generate_windows(&CalendarRequest {
            include_today_if_match: true,
            ..request(friday, 1, WeekendPattern::FriSun)
        })
        .unwrap();
        assert_eq!(included[0].outbound_date, friday);
    }

    #[test]
    fn test_stay_override() {
        let windows = generate_windows(&CalendarRequest {
            stay_nights: Some(3),
            ..request(date(2024, 6, 3), 1, WeekendPattern::FriSun)
        })
        .unwrap();
        assert_eq!(windows[0].inbound_date, date(2024, 6, 10));
    }

    #[test]
    fn test_non_positive_horizon_fails() {
        assert!(generate_windows(&request(date(2024, 6, 3), 0, WeekendPattern::FriSun)).is_err());
        assert!(generate_windows(&request(date(2024, 6, 3), -1, WeekendPattern::FriSun)).is_err());
    }

    #[test]
    fn test_horizon_past_last_date_is_config_error() {
        let near_end = NaiveDate::MAX - Duration::days(10);
        let err = generate_windows(&request(near_end, 3, WeekendPattern::FriSun)).unwrap_err();
        assert!(matches!(
            err,
            FareError::InvalidConfiguration { ref field, .. } if field == "scan.horizon_weeks"
        ));

        let err = generate_windows(&request(date(2024, 6, 3), i64::MAX, WeekendPattern::FriSun))
            .unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_deterministic() {
        let r = request(date(2024, 12, 20), 5, WeekendPattern::FriSun);
        assert_eq!(generate_windows(&r).unwrap(), generate_windows(&r).unwrap());
    }

    #[test]
    fn test_merged_calendar_is_chronological() {
        let windows = generate_calendar(
            date(2024, 6, 3),
            2,
            &[WeekendPattern::SatSun, WeekendPattern::FriSun],
            None,
            false,
        )
        .unwrap();
        let outbound: Vec<_> = windows.iter().map(|w| w.outbound_date).collect();
        assert_eq!(
            outbound,
            vec![date(2024, 6, 7), date(2024, 6, 8), date(2024, 6, 14), date(2024, 6, 15)]
        );
    }
}
