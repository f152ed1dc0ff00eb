//! GeoJSON route layers for the map widget.
//!
//! One layer per selected line: a LineString feature per geometry segment
//! per direction, plus point features for the direction arrows. Disjoint
//! segments become separate features; only arrow placement walks across
//! the gaps.

use buslive_transit::geometry::{arrow_anchors, ArrowAnchor};
use buslive_transit::identifiers::LineIdentifier;
use buslive_transit::models::{DirectionRoute, LineInfo};
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{json, Map};

/// Spacing between direction arrows along a route.
pub const ARROW_SPACING_KM: f64 = 0.75;

const FALLBACK_COLOR: &str = "#2b6cb0";

pub fn route_layer_id(line: &LineIdentifier) -> String {
    format!("route-{line}")
}

/// Display color for a line, as CSS hex.
pub fn line_color(info: &LineInfo) -> String {
    match &info.color {
        Some(hex) => format!("#{hex}"),
        None => FALLBACK_COLOR.to_string(),
    }
}

pub fn route_feature_collection(
    info: &LineInfo,
    directions: &[DirectionRoute],
) -> FeatureCollection {
    let color = line_color(info);
    let mut features = Vec::new();

    for route in directions {
        for segment in route.geometry.segments() {
            if segment.0.len() < 2 {
                // Degenerate decode output; nothing to draw for it.
                continue;
            }
            features.push(feature(
                Value::LineString(segment.0.iter().map(|c| vec![c.x, c.y]).collect()),
                json_props(&[
                    ("kind", json!("route")),
                    ("line", json!(info.id.as_str())),
                    ("direction", json!(route.direction.as_str())),
                    ("color", json!(color)),
                ]),
            ));
        }

        for ArrowAnchor { position, bearing_deg } in
            arrow_anchors(&route.geometry, ARROW_SPACING_KM)
        {
            features.push(feature(
                Value::Point(vec![position.x(), position.y()]),
                json_props(&[
                    ("kind", json!("arrow")),
                    ("line", json!(info.id.as_str())),
                    ("direction", json!(route.direction.as_str())),
                    ("bearing", json!(bearing_deg)),
                    ("color", json!(color)),
                ]),
            ));
        }
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

fn feature(value: Value, properties: Map<String, serde_json::Value>) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn json_props(entries: &[(&str, serde_json::Value)]) -> Map<String, serde_json::Value> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use buslive_transit::models::{Direction, RouteGeometry, TransitMode};
    use geo::{Coord, LineString};

    fn sample_line() -> LineInfo {
        LineInfo {
            id: LineIdentifier::new("12"),
            short_name: "12".into(),
            long_name: "Terminal - Center".into(),
            mode: TransitMode::Bus,
            color: Some("e4572e".into()),
            text_color: None,
        }
    }

    fn short_route() -> DirectionRoute {
        // Two disjoint segments, each a few hundred meters.
        let seg = |x0: f64| {
            LineString::new(vec![
                Coord { x: x0, y: 0.0 },
                Coord { x: x0 + 0.003, y: 0.0 },
            ])
        };
        DirectionRoute {
            direction: Direction::Outward,
            geometry: RouteGeometry::new(vec![seg(0.0), seg(0.01)]),
            stops: vec![],
        }
    }

    #[test]
    fn one_line_feature_per_segment() {
        let fc = route_feature_collection(&sample_line(), &[short_route()]);
        let line_features = fc
            .features
            .iter()
            .filter(|f| f.property("kind").and_then(|k| k.as_str()) == Some("route"))
            .count();
        assert_eq!(line_features, 2);

        for f in &fc.features {
            assert_eq!(f.property("color").and_then(|c| c.as_str()), Some("#e4572e"));
        }
    }

    #[test]
    fn degenerate_segments_are_skipped() {
        let route = DirectionRoute {
            direction: Direction::Return,
            geometry: RouteGeometry::new(vec![LineString::new(vec![Coord { x: 0.0, y: 0.0 }])]),
            stops: vec![],
        };
        let fc = route_feature_collection(&sample_line(), &[route]);
        assert!(fc.features.is_empty());
    }

    #[test]
    fn fallback_color_without_line_color() {
        let mut info = sample_line();
        info.color = None;
        assert_eq!(line_color(&info), FALLBACK_COLOR);
    }
}
