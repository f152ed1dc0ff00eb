//! Next-stop resolution by route-progress distance.
//!
//! Ranks a direction's stops by how far along the route each one sits and
//! picks the closest one that is not meaningfully behind the vehicle. This
//! is a 1-D heuristic over progress distance, not a shortest-path search;
//! a route that loops back close to itself can mis-rank, which is accepted.

use std::cmp::Ordering;

use crate::models::{DirectionRoute, Stop, VehicleFix};

/// Stops this far behind the vehicle (km) still count as "ahead", absorbing
/// GPS jitter and projection noise right as a stop is passed.
pub const PASSED_STOP_TOLERANCE_KM: f64 = 0.1;

/// The nearest stop ahead of the vehicle on its direction.
///
/// `None` when the direction has no stops or no usable geometry.
pub fn next_stop<'a>(fix: &VehicleFix, route: &'a DirectionRoute) -> Option<&'a Stop> {
    if route.stops.is_empty() || !route.geometry.has_path() {
        return None;
    }

    let vehicle_progress = route.geometry.distance_along(fix.position);

    route
        .stops
        .iter()
        .map(|stop| {
            let delta = route.geometry.distance_along(stop.location) - vehicle_progress;
            (stop, delta)
        })
        .filter(|(_, delta)| *delta > -PASSED_STOP_TOLERANCE_KM)
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
        .map(|(stop, _)| stop)
}
