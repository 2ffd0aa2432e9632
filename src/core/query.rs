use crate::config::FilterConfig;
use crate::domain::model::{SearchQuery, TimeProfile, WeekendWindow};

/// Build the provider-agnostic request for one destination and window.
///
/// Time ranges are copied as given: the profile's ranges when a profile is
/// supplied, the filter's otherwise. Providers may ignore them, so the filter
/// stage re-checks every offer.
pub fn build_query(
    origin: &str,
    destination: &str,
    window: &WeekendWindow,
    filter: &FilterConfig,
    profile: Option<&TimeProfile>,
    currency: &str,
) -> SearchQuery {
    let (outbound_hours, inbound_hours) = match profile {
        Some(p) => (p.outbound_hours, p.inbound_hours),
        None => (filter.outbound_hours, filter.inbound_hours),
    };

    SearchQuery {
        origin: origin.to_ascii_uppercase(),
        destination: destination.to_ascii_uppercase(),
        outbound_date: window.outbound_date,
        inbound_date: window.inbound_date,
        max_price: filter.max_price,
        nonstop_only: filter.nonstop_only,
        outbound_hours,
        inbound_hours,
        currency: currency.to_string(),
        window: window.clone(),
        profile: profile.map(|p| p.name.clone()),
    }
}
