use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::models::{Customer, OptimizedRoute, RouteStop, Visit};
use crate::error::AppError;
use crate::services::directions::{DirectionsProvider, RoundTripRequest};
use crate::services::route_reconstruction::{ensure_enough_stops, reconstruct};

#[derive(Clone)]
pub struct RoutePlanner {
    directions: Arc<dyn DirectionsProvider>,
}

impl RoutePlanner {
    pub fn new(directions: Arc<dyn DirectionsProvider>) -> Self {
        Self { directions }
    }

    /// Plans a round trip through `visits` in the given order, with the first
    /// visit as origin and destination. `Ok(None)` when the provider offered
    /// no usable ordering.
    pub async fn optimize(
        &self,
        visits: Vec<Visit>,
        customers: &[Customer],
    ) -> Result<Option<OptimizedRoute>, AppError> {
        ensure_enough_stops(visits.len())?;

        let stops = build_stops(visits, customers)?;
        let request = RoundTripRequest {
            origin: stops[0].address.clone(),
            waypoints: stops[1..].iter().map(|s| s.address.clone()).collect(),
        };

        let Some(itinerary) = self.directions.round_trip(&request).await? else {
            log::info!("Directions offered no route for {} stops", stops.len());
            return Ok(None);
        };

        Ok(reconstruct(&stops, &itinerary))
    }
}

pub fn build_stops(visits: Vec<Visit>, customers: &[Customer]) -> Result<Vec<RouteStop>, AppError> {
    let by_id: HashMap<Uuid, &Customer> = customers.iter().map(|c| (c.id, c)).collect();

    visits
        .into_iter()
        .map(|visit| {
            let customer = by_id.get(&visit.customer_id).ok_or_else(|| {
                AppError::validation(format!(
                    "Visit {} references a missing customer",
                    visit.id
                ))
            })?;
            Ok(RouteStop {
                customer_name: customer.name.clone(),
                address: customer.address.clone(),
                geocoordinate: customer.geocoordinate,
                visit,
            })
        })
        .collect()
}
