use crate::domain::model::{HourRange, ProviderResult, RawOffer, RawSegment, SearchQuery};
use crate::domain::ports::FlightProvider;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.tequila.kiwi.com";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    currency: Option<String>,
    #[serde(default)]
    data: Vec<Itinerary>,
}

#[derive(Debug, Deserialize)]
struct Itinerary {
    #[serde(default)]
    price: serde_json::Value,
    #[serde(default)]
    route: Vec<Hop>,
}

#[derive(Debug, Deserialize)]
struct Hop {
    #[serde(rename = "return", default)]
    is_return: u8,
    airline: Option<String>,
    local_departure: Option<String>,
}

impl Itinerary {
    fn into_raw(self, currency: Option<String>) -> RawOffer {
        let (inbound, outbound): (Vec<Hop>, Vec<Hop>) =
            self.route.into_iter().partition(|hop| hop.is_return == 1);
        let to_segments = |hops: Vec<Hop>| {
            hops.into_iter()
                .map(|hop| RawSegment {
                    carrier: hop.airline,
                    departure: hop.local_departure,
                })
                .collect()
        };
        RawOffer {
            price: self.price,
            currency,
            outbound: to_segments(outbound),
            inbound: to_segments(inbound),
        }
    }
}

/// Aggregator search (Tequila-style `/v2/search`). Unlike the GDS adapter it
/// forwards the time-of-day hints, though results are still filtered locally.
pub struct KiwiProvider {
    client: Client,
    endpoint: String,
    api_key: String,
    limit: u32,
}

impl KiwiProvider {
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            limit: 40,
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    fn params(&self, query: &SearchQuery) -> Vec<(&'static str, String)> {
        let outbound = query.outbound_date.format("%d/%m/%Y").to_string();
        let inbound = query.inbound_date.format("%d/%m/%Y").to_string();
        let mut params = vec![
            ("fly_from", query.origin.clone()),
            ("fly_to", query.destination.clone()),
            ("date_from", outbound.clone()),
            ("date_to", outbound),
            ("return_from", inbound.clone()),
            ("return_to", inbound),
            ("curr", query.currency.clone()),
            ("limit", self.limit.to_string()),
            ("sort", "price".to_string()),
        ];
        if query.nonstop_only {
            params.push(("max_stopovers", "0".to_string()));
        }
        if let Some(max_price) = query.max_price {
            params.push(("price_to", (max_price.ceil() as u64).to_string()));
        }
        if let Some(range) = query.outbound_hours {
            let (from, to) = time_bounds(range);
            params.push(("dtime_from", from));
            params.push(("dtime_to", to));
        }
        if let Some(range) = query.inbound_hours {
            let (from, to) = time_bounds(range);
            params.push(("ret_dtime_from", from));
            params.push(("ret_dtime_to", to));
        }
        params
    }
}

/// An inclusive hour range covers every minute of its last hour.
fn time_bounds(range: HourRange) -> (String, String) {
    (
        format!("{:02}:00", range.min),
        format!("{:02}:59", range.max),
    )
}

#[async_trait]
impl FlightProvider for KiwiProvider {
    async fn search(&self, query: &SearchQuery) -> ProviderResult {
        let url = format!("{}/v2/search", self.endpoint.trim_end_matches('/'));
        tracing::debug!("Making Kiwi request to: {}", url);

        let response = match self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .query(&self.params(query))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return ProviderResult::Failure(format!("request failed: {}", e)),
        };

        let status = response.status();
        tracing::debug!("Kiwi response status: {}", status);
        if status == StatusCode::TOO_MANY_REQUESTS {
            return ProviderResult::RateLimited;
        }
        if !status.is_success() {
            return ProviderResult::Failure(format!("HTTP {}", status));
        }

        match response.json::<SearchResponse>().await {
            Ok(body) => {
                let currency = body.currency;
                ProviderResult::Success(
                    body.data
                        .into_iter()
                        .map(|itinerary| itinerary.into_raw(currency.clone()))
                        .collect(),
                )
            }
            Err(e) => ProviderResult::Failure(format!("unreadable response: {}", e)),
        }
    }

    fn name(&self) -> &str {
        "kiwi"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_route_is_split_by_direction() {
        let itinerary: Itinerary = serde_json::from_value(json!({
            "price": 64,
            "route": [
                {"return": 0, "airline": "FR", "local_departure": "2024-06-07T17:10:00.000Z"},
                {"return": 1, "airline": "FR", "local_departure": "2024-06-09T20:45:00.000Z"}
            ]
        }))
        .unwrap();
        let raw = itinerary.into_raw(Some("EUR".to_string()));
        assert_eq!(raw.price, json!(64));
        assert_eq!(raw.outbound.len(), 1);
        assert_eq!(raw.inbound.len(), 1);
        assert_eq!(
            raw.inbound[0].departure.as_deref(),
            Some("2024-06-09T20:45:00.000Z")
        );
    }

    #[test]
    fn test_time_bounds_cover_last_hour() {
        assert_eq!(
            time_bounds(HourRange::new(15, 23)),
            ("15:00".to_string(), "23:59".to_string())
        );
    }
}
