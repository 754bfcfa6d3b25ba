use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;
use crate::database::models::Coordinate;
use crate::error::AppError;

/// Round trip that starts and ends at `origin` and visits every waypoint in
/// whatever order the provider finds shortest.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTripRequest {
    pub origin: String,
    pub waypoints: Vec<String>,
}

impl RoundTripRequest {
    pub fn waypoints_param(&self) -> String {
        std::iter::once("optimize:true")
            .chain(self.waypoints.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join("|")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItineraryLeg {
    pub distance_meters: Option<u64>,
    pub duration_seconds: Option<u64>,
    pub distance_text: Option<String>,
    pub duration_text: Option<String>,
    pub step_end_locations: Vec<Coordinate>,
}

/// The first route of a directions answer. `waypoint_order` stays untyped
/// until route reconstruction validates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Itinerary {
    pub legs: Vec<ItineraryLeg>,
    pub waypoint_order: Option<Value>,
}

#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    /// `Ok(None)` when the provider answered but offered no route.
    async fn round_trip(&self, request: &RoundTripRequest) -> Result<Option<Itinerary>, AppError>;
}

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsRoute {
    #[serde(default)]
    pub legs: Vec<DirectionsLeg>,
    #[serde(default)]
    pub waypoint_order: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsLeg {
    #[serde(default)]
    pub distance: Option<TextValue>,
    #[serde(default)]
    pub duration: Option<TextValue>,
    #[serde(default)]
    pub steps: Vec<DirectionsStep>,
}

#[derive(Debug, Deserialize)]
pub struct TextValue {
    #[serde(default)]
    pub value: Option<u64>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DirectionsStep {
    pub end_location: Coordinate,
}

impl From<DirectionsLeg> for ItineraryLeg {
    fn from(leg: DirectionsLeg) -> Self {
        let (distance_meters, distance_text) = split(leg.distance);
        let (duration_seconds, duration_text) = split(leg.duration);
        Self {
            distance_meters,
            duration_seconds,
            distance_text,
            duration_text,
            step_end_locations: leg.steps.into_iter().map(|s| s.end_location).collect(),
        }
    }
}

fn split(field: Option<TextValue>) -> (Option<u64>, Option<String>) {
    field.map_or((None, None), |f| (f.value, f.text))
}

pub fn into_itinerary(response: DirectionsResponse) -> Result<Option<Itinerary>, AppError> {
    if response.status != "OK" {
        let detail = response.error_message.unwrap_or_default();
        log::error!("Directions API returned {} {}", response.status, detail);
        return Err(AppError::ExternalService(format!(
            "directions returned {}",
            response.status
        )));
    }

    Ok(response.routes.into_iter().next().map(|route| Itinerary {
        legs: route.legs.into_iter().map(ItineraryLeg::from).collect(),
        waypoint_order: route.waypoint_order,
    }))
}

/// Google Directions JSON API client. Every URL is built here from
/// configuration; callers only supply addresses.
#[derive(Clone)]
pub struct GoogleDirectionsClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl GoogleDirectionsClient {
    pub fn new(config: &Config) -> Self {
        Self {
            endpoint: config.directions_url.clone(),
            api_key: config.maps_api_key.clone(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DirectionsProvider for GoogleDirectionsClient {
    async fn round_trip(&self, request: &RoundTripRequest) -> Result<Option<Itinerary>, AppError> {
        let waypoints = request.waypoints_param();
        log::debug!(
            "Requesting round trip from '{}' through {} waypoints",
            request.origin,
            request.waypoints.len()
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("origin", request.origin.as_str()),
                ("destination", request.origin.as_str()),
                ("waypoints", waypoints.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            log::error!("Directions API returned HTTP {}", response.status());
            return Err(AppError::ExternalService(format!(
                "directions returned HTTP {}",
                response.status()
            )));
        }

        let body: DirectionsResponse = response.json().await?;
        into_itinerary(body)
    }
}
