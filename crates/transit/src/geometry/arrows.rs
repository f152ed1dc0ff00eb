//! Direction-arrow placement along a route.
//!
//! Arrows are a purely visual decoration, so they work off the flattened
//! coordinate list and tolerate the gaps between disjoint segments.

use geo::Point;

use crate::geometry::projection::{bearing_deg, haversine_km};
use crate::models::RouteGeometry;

/// An arrow to render on the route layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrowAnchor {
    pub position: Point,
    /// Degrees clockwise from north, pointing in the direction of travel.
    pub bearing_deg: f64,
}

/// Anchor points for direction arrows, one every `spacing_km` along the
/// flattened geometry. Non-positive spacing or unusable geometry yields an
/// empty list.
pub fn arrow_anchors(geometry: &RouteGeometry, spacing_km: f64) -> Vec<ArrowAnchor> {
    if spacing_km <= 0.0 || !geometry.has_path() {
        return Vec::new();
    }

    let points = geometry.flattened();
    let mut anchors = Vec::new();
    let mut walked = 0.0;
    let mut next_mark = spacing_km;

    for pair in points.windows(2) {
        let (a, b): (Point, Point) = (pair[0].into(), pair[1].into());
        let length = haversine_km(a, b);
        if length == 0.0 {
            continue;
        }

        while next_mark <= walked + length {
            let f = (next_mark - walked) / length;
            anchors.push(ArrowAnchor {
                position: Point::new(
                    a.x() + (b.x() - a.x()) * f,
                    a.y() + (b.y() - a.y()) * f,
                ),
                bearing_deg: bearing_deg(a, b),
            });
            next_mark += spacing_km;
        }
        walked += length;
    }

    anchors
}
