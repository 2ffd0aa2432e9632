use crate::config::{Catalog, FilterConfig};
use crate::core::filter::classify;
use crate::domain::model::{Offer, RawOffer, RawSegment, SearchQuery};
use crate::utils::error::{FareError, Result};
use chrono::{NaiveDateTime, Timelike};
use regex::Regex;
use std::sync::OnceLock;

const DEPARTURE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Price and currency as extracted from a provider record.
#[derive(Debug, Clone, PartialEq)]
pub struct Money {
    pub amount: f64,
    pub currency: Option<String>,
}

fn price_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^\s*(?:(?P<pre>[€$£])|(?P<pre_iso>[A-Z]{3}))?\s*(?P<amount>\d+(?:[.,]\d{1,2})?)\s*(?:(?P<post>[€$£])|(?P<post_iso>[A-Z]{3}))?\s*$",
        )
        .unwrap()
    })
}

fn symbol_currency(symbol: &str) -> Option<&'static str> {
    match symbol {
        "€" => Some("EUR"),
        "$" => Some("USD"),
        "£" => Some("GBP"),
        _ => None,
    }
}

/// Accepts JSON numbers, and strings that are nothing but an amount with at
/// most one currency marker. Anything looser is rejected rather than guessed.
pub fn parse_price(value: &serde_json::Value) -> Result<Money> {
    let money = match value {
        serde_json::Value::Number(n) => Money {
            amount: n
                .as_f64()
                .ok_or_else(|| FareError::normalization(format!("price {} is not representable", n)))?,
            currency: None,
        },
        serde_json::Value::String(s) => {
            let caps = price_pattern().captures(s).ok_or_else(|| {
                FareError::normalization(format!("price '{}' is not a plain amount", s))
            })?;
            if (caps.name("pre").is_some() || caps.name("pre_iso").is_some())
                && (caps.name("post").is_some() || caps.name("post_iso").is_some())
            {
                return Err(FareError::normalization(format!(
                    "price '{}' carries two currency markers",
                    s
                )));
            }
            let amount = caps["amount"].replace(',', ".").parse::<f64>().map_err(|e| {
                FareError::normalization(format!("price '{}' could not be parsed: {}", s, e))
            })?;
            let currency = ["pre", "post"]
                .iter()
                .filter_map(|g| caps.name(g))
                .find_map(|m| symbol_currency(m.as_str()))
                .map(str::to_string)
                .or_else(|| {
                    ["pre_iso", "post_iso"]
                        .iter()
                        .find_map(|g| caps.name(g))
                        .map(|m| m.as_str().to_string())
                });
            Money { amount, currency }
        }
        serde_json::Value::Null => return Err(FareError::normalization("price is missing")),
        other => {
            return Err(FareError::normalization(format!(
                "price has unsupported type: {}",
                other
            )))
        }
    };

    if !money.amount.is_finite() || money.amount < 0.0 {
        return Err(FareError::normalization(format!(
            "price {} is negative or not finite",
            money.amount
        )));
    }
    Ok(money)
}

pub fn parse_departure(raw: &str) -> Result<NaiveDateTime> {
    let raw = raw.trim();
    DEPARTURE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| FareError::normalization(format!("unrecognised departure time '{}'", raw)))
}

fn first_departure(leg: &[RawSegment], leg_name: &str) -> Result<NaiveDateTime> {
    let first = leg
        .first()
        .ok_or_else(|| FareError::normalization(format!("{} leg has no segments", leg_name)))?;
    let departure = first.departure.as_deref().ok_or_else(|| {
        FareError::normalization(format!("{} leg has no departure time", leg_name))
    })?;
    parse_departure(departure)
}

/// Map one provider record to an `Offer`.
pub fn normalize_offer(
    raw: &RawOffer,
    query: &SearchQuery,
    filter: &FilterConfig,
    catalog: &Catalog,
) -> Result<Offer> {
    let money = parse_price(&raw.price)?;

    if query.nonstop_only && (raw.outbound.len() > 1 || raw.inbound.len() > 1) {
        return Err(FareError::normalization(format!(
            "itinerary has {}+{} segments but only nonstop flights were requested",
            raw.outbound.len(),
            raw.inbound.len()
        )));
    }

    let outbound_departure = first_departure(&raw.outbound, "outbound")?;
    let inbound_departure = first_departure(&raw.inbound, "inbound")?;

    let stops = raw.outbound.len().max(raw.inbound.len()).saturating_sub(1) as u32;

    let carrier = raw
        .outbound
        .first()
        .and_then(|s| s.carrier.as_deref())
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| {
            catalog
                .carrier_name(code)
                .map(str::to_string)
                .unwrap_or_else(|| code.to_string())
        });

    let destination_name = catalog
        .destination_name(&query.destination)
        .map(str::to_string)
        .unwrap_or_else(|| query.destination.clone());

    let currency = raw
        .currency
        .clone()
        .filter(|c| !c.trim().is_empty())
        .or(money.currency)
        .unwrap_or_else(|| query.currency.clone());

    Ok(Offer {
        destination_code: query.destination.clone(),
        destination_name,
        price: money.amount,
        currency,
        carrier,
        outbound_departure,
        inbound_departure,
        stops,
        tier: classify(inbound_departure.hour(), filter.premium_return_hour),
        source_window: query.window.clone(),
    })
}
