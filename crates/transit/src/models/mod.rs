//! Transit data models for the live map.

pub mod route;
pub mod types;

// Re-exports for convenience
pub use route::{DirectionRoute, RouteGeometry};
pub use types::{Direction, LineInfo, Result, Stop, TransitError, TransitMode, VehicleFix};
