use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;
use crate::database::models::Coordinate;
use crate::error::AppError;

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the service found no match.
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, AppError>;
}

/// Google Geocoding JSON API client.
#[derive(Clone)]
pub struct GoogleGeocoder {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl GoogleGeocoder {
    pub fn new(config: &Config) -> Self {
        Self {
            endpoint: config.geocoding_url.clone(),
            api_key: config.maps_api_key.clone(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    pub geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
pub struct GeocodeGeometry {
    pub location: Coordinate,
}

/// First candidate wins, whatever its match quality.
pub fn first_candidate(response: GeocodeResponse) -> Option<Coordinate> {
    if response.status != "OK" {
        log::debug!("Geocoding returned status {}", response.status);
        return None;
    }
    response
        .results
        .into_iter()
        .next()
        .map(|result| result.geometry.location)
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, AppError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            log::error!("Geocoding API returned HTTP {}", response.status());
            return Err(AppError::ExternalService(format!(
                "geocoding returned HTTP {}",
                response.status()
            )));
        }

        let body: GeocodeResponse = response.json().await?;
        Ok(first_candidate(body))
    }
}

async fn lookup(geocoder: &dyn Geocoder, address: &str) -> Option<Coordinate> {
    match geocoder.geocode(address).await {
        Ok(Some(coordinate)) => Some(coordinate),
        Ok(None) => {
            log::warn!("No geocoding match for '{}'", address);
            None
        }
        Err(e) => {
            log::warn!("Geocoding '{}' failed: {}", address, e);
            None
        }
    }
}

/// Coordinate for a new customer. Failure never blocks the write.
pub async fn geocode_new_address(geocoder: &dyn Geocoder, address: &str) -> Option<Coordinate> {
    lookup(geocoder, address).await
}

/// Coordinate for an edited customer. An unchanged address keeps the stored
/// value without calling out.
pub async fn geocode_changed_address(
    geocoder: &dyn Geocoder,
    stored_address: &str,
    stored: Option<Coordinate>,
    new_address: &str,
) -> Option<Coordinate> {
    if stored_address == new_address {
        return stored;
    }
    lookup(geocoder, new_address).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_result_is_taken() {
        let response: GeocodeResponse = serde_json::from_str(
            r#"{
                "status": "OK",
                "results": [
                    {"geometry": {"location": {"lat": 50.06, "lng": 19.94}}},
                    {"geometry": {"location": {"lat": 1.0, "lng": 2.0}}}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(
            first_candidate(response),
            Some(Coordinate {
                lat: 50.06,
                lng: 19.94
            })
        );
    }

    #[test]
    fn zero_results_yield_nothing() {
        let response: GeocodeResponse =
            serde_json::from_str(r#"{"status": "ZERO_RESULTS", "results": []}"#).unwrap();
        assert_eq!(first_candidate(response), None);

        let denied: GeocodeResponse =
            serde_json::from_str(r#"{"status": "REQUEST_DENIED"}"#).unwrap();
        assert_eq!(first_candidate(denied), None);
    }
}
