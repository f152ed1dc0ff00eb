//! # buslive-transit
//!
//! Data model and route geometry for a live municipal-bus map.
//!
//! ## Features
//!
//! - **Polyline codec**: decode the provider's compact route encoding
//! - **Route projection**: progress distance of any point along a route
//! - **Next-stop resolution**: nearest stop ahead of a realtime fix
//! - **Arrow placement**: direction-arrow anchors for the route layer
//!
//! ## Example
//!
//! ```
//! use buslive_transit::prelude::*;
//! use buslive_transit::geometry::polyline;
//! use geo::Point;
//!
//! // Decode a direction's geometry and locate a vehicle along it.
//! let geometry = RouteGeometry::new(vec![polyline::decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@")]);
//! assert!(geometry.has_path());
//!
//! let progress = geometry.distance_along(Point::new(-120.5, 39.5));
//! assert!(progress > 0.0);
//! ```

pub mod geometry;
pub mod identifiers;
pub mod models;
pub mod next_stop;

// Re-exports for convenience
pub mod prelude {
    pub use crate::geometry::{arrow_anchors, distance_along_route, haversine_km, ArrowAnchor};
    pub use crate::identifiers::*;
    pub use crate::models::{
        Direction, DirectionRoute, LineInfo, RouteGeometry, Stop, TransitError, TransitMode,
        VehicleFix,
    };
    pub use crate::next_stop::next_stop;
}

pub use prelude::*;
