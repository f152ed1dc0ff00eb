//! Projection of a point onto a route polyline.
//!
//! The perpendicular foot on each segment is computed in plain lat/lng space
//! (a local planar approximation, fine at bus-route segment lengths) and
//! clamped to the segment's endpoints; distances between points use the
//! haversine formula so progress values come out in real kilometers.

use geo::{Coord, LineString, Point};

/// Mean Earth radius used for all haversine math.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, in kilometers.
pub fn haversine_km(a: Point, b: Point) -> f64 {
    let (lat1, lat2) = (a.y().to_radians(), b.y().to_radians());
    let dlat = (b.y() - a.y()).to_radians();
    let dlng = (b.x() - a.x()).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Length of a polyline in kilometers. Fewer than 2 points yields 0.0.
pub fn line_length_km(line: &LineString) -> f64 {
    line.lines()
        .map(|seg| haversine_km(seg.start.into(), seg.end.into()))
        .sum()
}

/// Initial great-circle bearing from one point toward another, in degrees
/// clockwise from north.
pub fn bearing_deg(from: Point, to: Point) -> f64 {
    let (lat1, lat2) = (from.y().to_radians(), to.y().to_radians());
    let dlng = (to.x() - from.x()).to_radians();

    let y = dlng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlng.cos();
    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Result of projecting a point onto a polyline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Cumulative distance (km) along the polyline to the projected point.
    pub along_km: f64,
    /// Distance (km) from the query point to its projection on the line.
    pub offset_km: f64,
}

/// Project a point onto the nearest spot of a polyline.
///
/// Every consecutive pair is a candidate segment; the clamped perpendicular
/// foot closest to the point (by haversine) wins, with ties going to the
/// first segment encountered. Zero-length segments act as a single candidate
/// point and contribute no length. Returns `None` for degenerate input
/// (fewer than 2 coordinates).
pub fn project_onto(line: &LineString, point: Point) -> Option<Projection> {
    if line.0.len() < 2 {
        return None;
    }

    let mut best: Option<Projection> = None;
    let mut cumulative = 0.0;

    for seg in line.lines() {
        let start: Point = seg.start.into();
        let length = haversine_km(start, seg.end.into());
        let foot: Point = if length == 0.0 {
            start
        } else {
            clamped_foot(seg.start, seg.end, point.0).into()
        };

        let offset_km = haversine_km(point, foot);
        if best.map_or(true, |b| offset_km < b.offset_km) {
            best = Some(Projection {
                along_km: cumulative + haversine_km(start, foot),
                offset_km,
            });
        }
        cumulative += length;
    }

    best
}

/// Progress distance (km) along a polyline to a point's closest approach.
/// Degenerate input yields 0.0.
pub fn distance_along_route(line: &LineString, point: Point) -> f64 {
    project_onto(line, point).map_or(0.0, |p| p.along_km)
}

/// Perpendicular foot of `p` on segment `a`..`b`, clamped to the endpoints.
/// Plain planar math; the caller guarantees `a != b`.
fn clamped_foot(a: Coord, b: Coord, p: Coord) -> Coord {
    let ab = (b.x - a.x, b.y - a.y);
    let ap = (p.x - a.x, p.y - a.y);

    let ab_ab = ab.0 * ab.0 + ab.1 * ab.1;
    let t = ((ab.0 * ap.0 + ab.1 * ap.1) / ab_ab).clamp(0.0, 1.0);

    Coord {
        x: a.x + t * ab.0,
        y: a.y + t * ab.1,
    }
}
