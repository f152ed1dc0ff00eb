//! Route geometry for one direction of a line.

use geo::{Coord, LineString, Point};

use crate::geometry::projection;
use crate::models::types::{Direction, Stop};

/// The physical path of one direction, as one or more disjoint polyline
/// segments (branch services and depot loops arrive as separate segments).
///
/// Segments are deliberately kept apart for all distance math: joining them
/// would insert a straight "teleport" edge between disjoint endpoints and
/// corrupt progress distances. [`RouteGeometry::flattened`] exists only for
/// uses that tolerate the gaps.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RouteGeometry {
    segments: Vec<LineString>,
}

impl RouteGeometry {
    pub fn new(segments: Vec<LineString>) -> Self {
        Self { segments }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn segments(&self) -> &[LineString] {
        &self.segments
    }

    /// Whether any segment carries a usable path (at least 2 coordinates).
    /// Degenerate decode output leaves this false and downstream features
    /// treat the direction as having no geometry.
    pub fn has_path(&self) -> bool {
        self.segments.iter().any(|s| s.0.len() >= 2)
    }

    /// Total length in kilometers. Gaps between segments contribute nothing.
    pub fn length_km(&self) -> f64 {
        self.segments.iter().map(projection::line_length_km).sum()
    }

    /// Progress distance (km) along this direction to the point's closest
    /// approach. Each segment is projected onto independently and offset by
    /// the summed lengths of the segments before it; ties go to the earliest
    /// segment. Returns 0.0 when no segment has a usable path.
    pub fn distance_along(&self, point: Point) -> f64 {
        let mut best_along = 0.0;
        let mut best_offset = f64::INFINITY;
        let mut cumulative = 0.0;

        for segment in &self.segments {
            if let Some(hit) = projection::project_onto(segment, point) {
                if hit.offset_km < best_offset {
                    best_offset = hit.offset_km;
                    best_along = cumulative + hit.along_km;
                }
            }
            cumulative += projection::line_length_km(segment);
        }

        best_along
    }

    /// All coordinates across all segments, in order. Only valid for
    /// gap-tolerant consumers such as direction-arrow placement; never feed
    /// this back into distance math.
    pub fn flattened(&self) -> Vec<Coord> {
        self.segments.iter().flat_map(|s| s.0.iter().copied()).collect()
    }
}

/// One direction of a line: its geometry plus the ordered stop list.
#[derive(Clone, Debug)]
pub struct DirectionRoute {
    pub direction: Direction,
    pub geometry: RouteGeometry,
    pub stops: Vec<Stop>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn line(coords: &[(f64, f64)]) -> LineString {
        LineString::new(coords.iter().map(|&(x, y)| Coord { x, y }).collect())
    }

    #[test]
    fn empty_geometry_has_no_path() {
        assert!(!RouteGeometry::empty().has_path());
        assert!(!RouteGeometry::new(vec![line(&[(0.0, 0.0)])]).has_path());
        assert!(RouteGeometry::new(vec![line(&[(0.0, 0.0), (1.0, 0.0)])]).has_path());
    }

    #[test]
    fn distance_along_skips_gap_between_segments() {
        // Two disjoint equatorial segments: 0..1 degree and 3..4 degrees of
        // longitude. A point on the second segment must be offset by the
        // first segment's length only, never by the 2-degree gap.
        let geometry = RouteGeometry::new(vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(3.0, 0.0), (4.0, 0.0)]),
        ]);
        let one_degree_km = projection::EARTH_RADIUS_KM * 1.0_f64.to_radians();

        let on_second = Point::new(3.5, 0.0);
        assert_relative_eq!(
            geometry.distance_along(on_second),
            one_degree_km * 1.5,
            max_relative = 1e-9
        );
    }

    #[test]
    fn flattened_crosses_segments() {
        let geometry = RouteGeometry::new(vec![
            line(&[(0.0, 0.0), (1.0, 0.0)]),
            line(&[(3.0, 0.0), (4.0, 0.0)]),
        ]);
        assert_eq!(geometry.flattened().len(), 4);
    }
}
