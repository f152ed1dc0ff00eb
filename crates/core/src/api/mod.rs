//! The upstream transit data provider.
//!
//! A read-only JSON collection, abstracted behind [`TransitApi`] so tests
//! and alternative providers can plug in. Vehicle positions are requested
//! one line and one direction at a time: a combined multi-line query cannot
//! be reliably attributed back to its line when identifiers share prefixes,
//! so per-direction requests are the tagging guarantee.

pub mod http;

use std::future::Future;
use std::pin::Pin;

use buslive_transit::identifiers::LineIdentifier;
use buslive_transit::models::{Direction, DirectionRoute, LineInfo, VehicleFix};

use crate::error::Result;

pub use http::HttpTransitApi;

pub trait TransitApi: Send + Sync {
    /// All lines the provider knows about: identity and display attributes.
    fn line_directory<'a>(
        &'a self,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<LineInfo>>> + Send + 'a>>;

    /// Per-direction geometry and ordered stop list for one line.
    fn direction_routes<'a>(
        &'a self,
        line: &'a LineIdentifier,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DirectionRoute>>> + Send + 'a>>;

    /// Current vehicle fixes for one line in one direction. Every returned
    /// fix is tagged with exactly this line and direction.
    fn vehicle_positions<'a>(
        &'a self,
        line: &'a LineIdentifier,
        direction: Direction,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<VehicleFix>>> + Send + 'a>>;
}
