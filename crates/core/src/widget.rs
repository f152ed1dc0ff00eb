//! The map widget capability interface.
//!
//! The core never talks to a concrete rendering library; it drives whatever
//! implements [`MapWidget`] and receives viewport lifecycle signals through
//! the session. Marker geometry is owned by the engine; the widget is only
//! ever told the current displayed coordinate and must not move markers on
//! its own.

use std::sync::Arc;

use buslive_transit::identifiers::VehicleIdentifier;
use geo::Point;

/// Visual attributes of a vehicle marker. Compared against the previously
/// applied style so unchanged markers cost no widget redraw.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerStyle {
    /// CSS color, e.g. "#e4572e".
    pub color: Arc<str>,
    /// Short display text, e.g. line number plus next stop.
    pub label: Arc<str>,
    /// Degrees clockwise from north.
    pub bearing_deg: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum WidgetError {
    /// The widget no longer knows this marker. Callers skip the operation;
    /// this is a safety guard, not a recoverable failure path.
    #[error("marker already detached: {0}")]
    MarkerDetached(VehicleIdentifier),

    #[error("unknown layer: {0}")]
    UnknownLayer(String),
}

pub type WidgetResult = std::result::Result<(), WidgetError>;

/// Everything the core needs from an interactive map.
pub trait MapWidget: Send + Sync {
    fn place_marker(&self, id: &VehicleIdentifier, at: Point, style: &MarkerStyle) -> WidgetResult;

    fn move_marker(&self, id: &VehicleIdentifier, to: Point) -> WidgetResult;

    fn update_marker(&self, id: &VehicleIdentifier, style: &MarkerStyle) -> WidgetResult;

    fn remove_marker(&self, id: &VehicleIdentifier) -> WidgetResult;

    fn draw_route_layer(&self, layer: &str, features: &geojson::FeatureCollection) -> WidgetResult;

    fn clear_route_layer(&self, layer: &str) -> WidgetResult;
}
