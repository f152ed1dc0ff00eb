//! Route geometry: polyline decoding, projection, arrow placement.

pub mod arrows;
pub mod polyline;
pub mod projection;

pub use arrows::{arrow_anchors, ArrowAnchor};
pub use projection::{distance_along_route, haversine_km, project_onto, Projection};
