use crate::domain::model::{ProviderResult, RawOffer, RawSegment, SearchQuery};
use crate::domain::ports::FlightProvider;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.amadeus.com";

#[derive(Debug, Deserialize)]
struct FlightOffersResponse {
    #[serde(default)]
    data: Vec<FlightOffer>,
}

#[derive(Debug, Deserialize)]
struct FlightOffer {
    price: Option<Price>,
    #[serde(default)]
    itineraries: Vec<Itinerary>,
}

#[derive(Debug, Deserialize)]
struct Price {
    #[serde(default)]
    total: serde_json::Value,
    currency: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Itinerary {
    #[serde(default)]
    segments: Vec<Segment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Segment {
    carrier_code: Option<String>,
    departure: Option<Endpoint>,
}

#[derive(Debug, Deserialize)]
struct Endpoint {
    at: Option<String>,
}

impl From<FlightOffer> for RawOffer {
    fn from(offer: FlightOffer) -> Self {
        let (price, currency) = match offer.price {
            Some(p) => (p.total, p.currency),
            None => (serde_json::Value::Null, None),
        };
        let mut legs = offer.itineraries.into_iter().map(|itinerary| {
            itinerary
                .segments
                .into_iter()
                .map(|s| RawSegment {
                    carrier: s.carrier_code,
                    departure: s.departure.and_then(|d| d.at),
                })
                .collect::<Vec<_>>()
        });
        RawOffer {
            price,
            currency,
            outbound: legs.next().unwrap_or_default(),
            inbound: legs.next().unwrap_or_default(),
        }
    }
}

/// Flight Offers Search against an Amadeus-compatible endpoint. The token is
/// expected to be valid for the whole cycle.
pub struct AmadeusProvider {
    client: Client,
    endpoint: String,
    access_token: String,
    max_results: u32,
}

impl AmadeusProvider {
    pub fn new(endpoint: impl Into<String>, access_token: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            endpoint: endpoint.into(),
            access_token: access_token.into(),
            max_results: 40,
        }
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    fn params(&self, query: &SearchQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("originLocationCode", query.origin.clone()),
            ("destinationLocationCode", query.destination.clone()),
            ("departureDate", query.outbound_date.format("%Y-%m-%d").to_string()),
            ("returnDate", query.inbound_date.format("%Y-%m-%d").to_string()),
            ("adults", "1".to_string()),
            ("currencyCode", query.currency.clone()),
            ("max", self.max_results.to_string()),
        ];
        if query.nonstop_only {
            params.push(("nonStop", "true".to_string()));
        }
        if let Some(max_price) = query.max_price {
            // The API only takes whole amounts; rounding up keeps the
            // inclusive ceiling for the local filter to decide.
            params.push(("maxPrice", (max_price.ceil() as u64).to_string()));
        }
        params
    }
}

#[async_trait]
impl FlightProvider for AmadeusProvider {
    async fn search(&self, query: &SearchQuery) -> ProviderResult {
        let url = format!(
            "{}/v2/shopping/flight-offers",
            self.endpoint.trim_end_matches('/')
        );
        tracing::debug!("Making Amadeus request to: {}", url);

        let response = match self
            .client
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&self.params(query))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return ProviderResult::Failure(format!("request failed: {}", e)),
        };

        let status = response.status();
        tracing::debug!("Amadeus response status: {}", status);
        if status == StatusCode::TOO_MANY_REQUESTS {
            return ProviderResult::RateLimited;
        }
        if !status.is_success() {
            return ProviderResult::Failure(format!("HTTP {}", status));
        }

        match response.json::<FlightOffersResponse>().await {
            Ok(body) => {
                ProviderResult::Success(body.data.into_iter().map(RawOffer::from).collect())
            }
            Err(e) => ProviderResult::Failure(format!("unreadable response: {}", e)),
        }
    }

    fn name(&self) -> &str {
        "amadeus"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_offer_maps_to_raw_offer() {
        let wire: FlightOffer = serde_json::from_value(json!({
            "price": {"total": "95.50", "currency": "EUR"},
            "itineraries": [
                {"segments": [{"carrierCode": "IB", "departure": {"at": "2024-06-07T16:05:00"}}]},
                {"segments": [
                    {"carrierCode": "IB", "departure": {"at": "2024-06-09T18:30:00"}},
                    {"carrierCode": "IB", "departure": {"at": "2024-06-09T21:00:00"}}
                ]}
            ]
        }))
        .unwrap();

        let raw = RawOffer::from(wire);
        assert_eq!(raw.price, json!("95.50"));
        assert_eq!(raw.currency.as_deref(), Some("EUR"));
        assert_eq!(raw.outbound.len(), 1);
        assert_eq!(raw.inbound.len(), 2);
        assert_eq!(raw.outbound[0].carrier.as_deref(), Some("IB"));
    }

    #[test]
    fn test_missing_price_becomes_null() {
        let wire: FlightOffer = serde_json::from_value(json!({"itineraries": []})).unwrap();
        let raw = RawOffer::from(wire);
        assert!(raw.price.is_null());
        assert!(raw.outbound.is_empty());
    }
}
