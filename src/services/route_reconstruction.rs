//! Maps the directions provider's optimized waypoint order back onto the
//! day's stops and aggregates leg totals.
//!
//! Stop 0 is the fixed origin and destination. The provider only permutes
//! the remaining stops, so an order entry `i` refers to `stops[i + 1]`.

use serde_json::Value;
use std::collections::HashSet;

use crate::database::models::{OptimizedRoute, RouteLeg, RouteStop};
use crate::error::AppError;
use crate::services::directions::{Itinerary, ItineraryLeg};

pub const MIN_STOPS: usize = 2;

pub fn ensure_enough_stops(found: usize) -> Result<(), AppError> {
    if found < MIN_STOPS {
        return Err(AppError::InsufficientStops { found });
    }
    Ok(())
}

/// `None` unless the value is an array of non-negative integers.
pub fn parse_waypoint_order(value: Option<&Value>) -> Option<Vec<usize>> {
    value?
        .as_array()?
        .iter()
        .map(|entry| entry.as_u64().map(|idx| idx as usize))
        .collect()
}

/// `[items[0]] + [items[idx + 1] for idx in order]`, or `None` when `order`
/// is not a permutation of the waypoint indices.
pub fn reconstruct_order<T: Clone>(items: &[T], order: &[usize]) -> Option<Vec<T>> {
    let (origin, waypoints) = items.split_first()?;
    if order.len() != waypoints.len() {
        return None;
    }

    let mut seen = HashSet::with_capacity(order.len());
    let mut ordered = Vec::with_capacity(items.len());
    ordered.push(origin.clone());
    for &idx in order {
        if !seen.insert(idx) {
            return None;
        }
        ordered.push(waypoints.get(idx)?.clone());
    }
    Some(ordered)
}

/// Total kilometers and rounded minutes. Missing values count as zero.
pub fn summarize(legs: &[ItineraryLeg]) -> (f64, i64) {
    let meters: u64 = legs.iter().map(|l| l.distance_meters.unwrap_or(0)).sum();
    let seconds: u64 = legs.iter().map(|l| l.duration_seconds.unwrap_or(0)).sum();
    (meters as f64 / 1000.0, (seconds as f64 / 60.0).round() as i64)
}

/// Leg `i` runs from `ordered[i]` to `ordered[i + 1]`; the last wraps to the
/// origin.
pub fn connect_legs(ordered: &[RouteStop], legs: &[ItineraryLeg]) -> Vec<RouteLeg> {
    let count = ordered.len();
    legs.iter()
        .take(count)
        .enumerate()
        .map(|(i, leg)| RouteLeg {
            from_visit_id: ordered[i].visit.id,
            to_visit_id: ordered[(i + 1) % count].visit.id,
            distance_meters: leg.distance_meters.unwrap_or(0),
            duration_seconds: leg.duration_seconds.unwrap_or(0),
            distance_text: leg.distance_text.clone(),
            duration_text: leg.duration_text.clone(),
        })
        .collect()
}

/// `None` means no optimization is available for this itinerary.
pub fn reconstruct(stops: &[RouteStop], itinerary: &Itinerary) -> Option<OptimizedRoute> {
    let Some(order) = parse_waypoint_order(itinerary.waypoint_order.as_ref()) else {
        log::warn!(
            "Directions answer carried no usable waypoint order: {:?}",
            itinerary.waypoint_order
        );
        return None;
    };

    let Some(ordered) = reconstruct_order(stops, &order) else {
        log::warn!(
            "Waypoint order {:?} does not fit {} stops",
            order,
            stops.len()
        );
        return None;
    };

    let (total_distance_km, total_duration_minutes) = summarize(&itinerary.legs);
    let legs = connect_legs(&ordered, &itinerary.legs);
    let path = itinerary
        .legs
        .iter()
        .flat_map(|leg| leg.step_end_locations.iter().copied())
        .collect();

    Some(OptimizedRoute {
        stop_count: ordered.len(),
        stops: ordered,
        legs,
        total_distance_km,
        total_duration_minutes,
        path,
    })
}
