use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use wren_agent::adapters::Geocoder;
use wren_core::domain::results::{GeocodeOutcome, Location};
use wren_core::errors::ProviderError;

use crate::http::send_json;

const PROVIDER: &str = "google_geocoding";
const ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";
const OK_STATUS: &str = "OK";

pub struct GoogleGeocoder {
    client: Client,
    api_key: SecretString,
}

impl GoogleGeocoder {
    pub fn new(client: Client, api_key: SecretString) -> Self {
        Self { client, api_key }
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct AddressComponent {
    short_name: String,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Only the first result is used; any status but `OK` means "not found".
fn outcome(response: GeocodeResponse) -> GeocodeOutcome {
    if response.status != OK_STATUS {
        return GeocodeOutcome::NotFound { status: response.status };
    }
    let Some(first) = response.results.into_iter().next() else {
        return GeocodeOutcome::NotFound { status: "ZERO_RESULTS".to_string() };
    };

    let postal_code = first
        .address_components
        .iter()
        .find(|component| component.types.iter().any(|kind| kind == "postal_code"))
        .map(|component| component.short_name.clone());
    GeocodeOutcome::Found(Location {
        short_name: first.address_components.first().map(|component| component.short_name.clone()),
        formatted_address: first.formatted_address,
        latitude: first.geometry.location.lat,
        longitude: first.geometry.location.lng,
        postal_code,
    })
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeocodeOutcome, ProviderError> {
        let request =
            self.client.get(ENDPOINT).query(&[("address", address), ("key", self.api_key.expose_secret())]);
        let response: GeocodeResponse = send_json(PROVIDER, request).await?;
        Ok(outcome(response))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wren_core::domain::results::GeocodeOutcome;

    use super::{outcome, GeocodeResponse};

    fn response(value: serde_json::Value) -> GeocodeResponse {
        match serde_json::from_value(value) {
            Ok(parsed) => parsed,
            Err(error) => panic!("fixture should parse: {error}"),
        }
    }

    #[test]
    fn first_result_becomes_the_location() {
        let parsed = response(json!({
            "status": "OK",
            "results": [{
                "formatted_address": "Darwin, MN 55324, USA",
                "address_components": [
                    {"short_name": "Darwin", "types": ["locality"]},
                    {"short_name": "55324", "types": ["postal_code"]}
                ],
                "geometry": {"location": {"lat": 45.0966, "lng": -94.4108}}
            }]
        }));
        let GeocodeOutcome::Found(location) = outcome(parsed) else {
            panic!("expected a location");
        };
        assert_eq!(location.formatted_address, "Darwin, MN 55324, USA");
        assert_eq!(location.short_name.as_deref(), Some("Darwin"));
        assert_eq!(location.postal_code.as_deref(), Some("55324"));
    }

    #[test]
    fn non_ok_status_is_not_found() {
        let parsed = response(json!({"status": "ZERO_RESULTS", "results": []}));
        assert_eq!(outcome(parsed), GeocodeOutcome::NotFound { status: "ZERO_RESULTS".to_string() });
    }
}
