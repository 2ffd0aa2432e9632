use crate::config::FilterConfig;
use crate::domain::model::{HourRange, Offer, Tier, TimeProfile};
use chrono::Timelike;
use std::fmt;

/// First rule an offer failed, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRejection {
    AboveMaxPrice,
    NotNonstop,
    OutboundOutsideHours,
    InboundOutsideHours,
}

impl fmt::Display for FilterRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterRejection::AboveMaxPrice => "above price ceiling",
            FilterRejection::NotNonstop => "has connections",
            FilterRejection::OutboundOutsideHours => "outbound departure outside hours",
            FilterRejection::InboundOutsideHours => "inbound departure outside hours",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RejectionCounts {
    pub above_max_price: usize,
    pub not_nonstop: usize,
    pub outbound_hours: usize,
    pub inbound_hours: usize,
}

impl RejectionCounts {
    pub fn record(&mut self, rejection: FilterRejection) {
        match rejection {
            FilterRejection::AboveMaxPrice => self.above_max_price += 1,
            FilterRejection::NotNonstop => self.not_nonstop += 1,
            FilterRejection::OutboundOutsideHours => self.outbound_hours += 1,
            FilterRejection::InboundOutsideHours => self.inbound_hours += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.above_max_price + self.not_nonstop + self.outbound_hours + self.inbound_hours
    }
}

fn hours_for(
    filter: &FilterConfig,
    profile: Option<&TimeProfile>,
) -> (Option<HourRange>, Option<HourRange>) {
    match profile {
        Some(p) => (p.outbound_hours, p.inbound_hours),
        None => (filter.outbound_hours, filter.inbound_hours),
    }
}

/// Rules run in a fixed order and stop at the first failure.
pub fn check_offer(
    offer: &Offer,
    filter: &FilterConfig,
    profile: Option<&TimeProfile>,
) -> Result<(), FilterRejection> {
    if let Some(max_price) = filter.max_price {
        if offer.price > max_price {
            return Err(FilterRejection::AboveMaxPrice);
        }
    }

    if filter.nonstop_only && offer.stops != 0 {
        return Err(FilterRejection::NotNonstop);
    }

    let (outbound_hours, inbound_hours) = hours_for(filter, profile);

    if let Some(range) = outbound_hours {
        if !range.contains(offer.outbound_departure.hour()) {
            return Err(FilterRejection::OutboundOutsideHours);
        }
    }

    if let Some(range) = inbound_hours {
        if !range.contains(offer.inbound_departure.hour()) {
            return Err(FilterRejection::InboundOutsideHours);
        }
    }

    Ok(())
}

pub fn apply_filters(
    offers: Vec<Offer>,
    filter: &FilterConfig,
    profile: Option<&TimeProfile>,
) -> (Vec<Offer>, RejectionCounts) {
    let mut counts = RejectionCounts::default();
    let mut kept = Vec::with_capacity(offers.len());

    for offer in offers {
        match check_offer(&offer, filter, profile) {
            Ok(()) => kept.push(offer),
            Err(rejection) => {
                tracing::debug!(
                    "Dropping {} {:.2} {}: {}",
                    offer.destination_code,
                    offer.price,
                    offer.currency,
                    rejection
                );
                counts.record(rejection);
            }
        }
    }

    (kept, counts)
}

pub fn classify(inbound_hour: u32, premium_return_hour: u32) -> Tier {
    if inbound_hour >= premium_return_hour {
        Tier::Premium
    } else {
        Tier::BudgetTiming
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{WeekendPattern, WeekendWindow};
    use chrono::NaiveDate;

    fn offer(price: f64, stops: u32, out_hour: u32, in_hour: u32) -> Offer {
        let out = NaiveDate::from_ymd_opt(2024, 6, 7).unwrap();
        let inb = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        Offer {
            destination_code: "LON".to_string(),
            destination_name: "London".to_string(),
            price,
            currency: "EUR".to_string(),
            carrier: None,
            outbound_departure: out.and_hms_opt(out_hour, 0, 0).unwrap(),
            inbound_departure: inb.and_hms_opt(in_hour, 30, 0).unwrap(),
            stops,
            tier: classify(in_hour, 15),
            source_window: WeekendWindow::new(out, inb, WeekendPattern::FriSun),
        }
    }

    fn filter() -> FilterConfig {
        FilterConfig {
            max_price: Some(100.0),
            nonstop_only: true,
            outbound_hours: Some(HourRange::new(15, 23)),
            inbound_hours: Some(HourRange::new(16, 23)),
            premium_return_hour: 15,
        }
    }

    #[test]
    fn test_price_ceiling_is_inclusive() {
        assert!(check_offer(&offer(100.0, 0, 16, 18), &filter(), None).is_ok());
        assert_eq!(
            check_offer(&offer(100.01, 0, 16, 18), &filter(), None),
            Err(FilterRejection::AboveMaxPrice)
        );
    }

    #[test]
    fn test_rules_short_circuit_in_order() {
        // Fails every rule; price is reported because it is checked first.
        assert_eq!(
            check_offer(&offer(500.0, 2, 6, 6), &filter(), None),
            Err(FilterRejection::AboveMaxPrice)
        );
        assert_eq!(
            check_offer(&offer(50.0, 1, 6, 6), &filter(), None),
            Err(FilterRejection::NotNonstop)
        );
        assert_eq!(
            check_offer(&offer(50.0, 0, 6, 6), &filter(), None),
            Err(FilterRejection::OutboundOutsideHours)
        );
        assert_eq!(
            check_offer(&offer(50.0, 0, 15, 6), &filter(), None),
            Err(FilterRejection::InboundOutsideHours)
        );
    }

    #[test]
    fn test_hour_bounds_are_inclusive() {
        assert!(check_offer(&offer(50.0, 0, 15, 23), &filter(), None).is_ok());
        assert!(check_offer(&offer(50.0, 0, 23, 16), &filter(), None).is_ok());
    }

    #[test]
    fn test_no_ceiling_and_no_ranges_accepts_connections_when_allowed() {
        let open = FilterConfig {
            max_price: None,
            nonstop_only: false,
            outbound_hours: None,
            inbound_hours: None,
            premium_return_hour: 15,
        };
        assert!(check_offer(&offer(9999.0, 3, 5, 5), &open, None).is_ok());
    }

    #[test]
    fn test_profile_overrides_filter_hours() {
        let profile = TimeProfile {
            name: "early".to_string(),
            outbound_hours: None,
            inbound_hours: Some(HourRange::new(6, 12)),
        };
        assert!(check_offer(&offer(50.0, 0, 7, 9), &filter(), Some(&profile)).is_ok());
        assert!(check_offer(&offer(50.0, 0, 7, 9), &filter(), None).is_err());
    }

    #[test]
    fn test_apply_filters_counts_rejections() {
        let offers = vec![
            offer(95.0, 0, 16, 18),
            offer(110.0, 0, 16, 18),
            offer(80.0, 1, 16, 18),
        ];
        let (kept, counts) = apply_filters(offers, &filter(), None);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].price, 95.0);
        assert_eq!(counts.above_max_price, 1);
        assert_eq!(counts.not_nonstop, 1);
        assert_eq!(counts.total(), 2);
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify(15, 15), Tier::Premium);
        assert_eq!(classify(21, 15), Tier::Premium);
        assert_eq!(classify(14, 15), Tier::BudgetTiming);
    }
}
