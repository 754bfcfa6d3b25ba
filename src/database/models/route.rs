use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::customer::Coordinate;
use super::visit::Visit;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRouteInput {
    pub team_id: Uuid,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteStop {
    pub visit: Visit,
    pub customer_name: String,
    pub address: String,
    pub geocoordinate: Option<Coordinate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RouteLeg {
    pub from_visit_id: Uuid,
    pub to_visit_id: Uuid,
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub distance_text: Option<String>,
    pub duration_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedRoute {
    pub stops: Vec<RouteStop>,
    pub legs: Vec<RouteLeg>,
    pub total_distance_km: f64,
    pub total_duration_minutes: i64,
    pub stop_count: usize,
    pub path: Vec<Coordinate>,
}

/// `route` is `None` when the directions service offered no usable ordering.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizeRouteResponse {
    pub route: Option<OptimizedRoute>,
}
