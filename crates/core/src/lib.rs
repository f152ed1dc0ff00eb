//! # buslive-core
//!
//! Session layer for a live municipal-bus map. It polls a transit API for
//! vehicle fixes and reconciles them into animated markers and route
//! layers, all against whatever map widget the host plugs in behind the
//! [`widget::MapWidget`] capability trait.
//!
//! The host owns the event loop: it schedules poll cycles
//! ([`session::MapSession::poll_once`]), forwards viewport lifecycle
//! signals, and pumps the animation from its display-refresh callback
//! ([`session::MapSession::tick`]).

pub mod api;
pub mod engine;
pub mod error;
pub mod layers;
pub mod session;
pub mod widget;

// Re-export the data-model crate under a short name.
pub use buslive_transit as transit;

pub use api::{HttpTransitApi, TransitApi};
pub use engine::{Animation, MarkerEngine, VehicleUpdate, MARKER_ANIMATION_DURATION};
pub use error::{Error, Result};
pub use session::{
    drive_polling, MapSession, PollCycle, SessionStatus, DEFAULT_LINE_LIMIT,
    DEFAULT_POLL_INTERVAL,
};
pub use widget::{MapWidget, MarkerStyle, WidgetError};
