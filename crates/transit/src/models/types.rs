//! Core data types for the live bus map.

use std::sync::Arc;

use geo::Point;

use crate::identifiers::*;

// ============================================================================
// Enums
// ============================================================================

/// Travel direction of a line. A line has one or two directions, each with
/// its own geometry and ordered stop list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Outward,
    Return,
}

impl Direction {
    /// Parse the direction tag used by the upstream provider.
    pub fn from_api(value: &str) -> Option<Self> {
        match value {
            "outward" => Some(Self::Outward),
            "return" => Some(Self::Return),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Outward => "outward",
            Self::Return => "return",
        }
    }
}

/// Mode of a line within the municipal network.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitMode {
    Bus,
    Trolleybus,
    Tram,
    NightBus,
}

impl TransitMode {
    pub fn from_api(value: &str) -> Option<Self> {
        match value {
            "bus" => Some(Self::Bus),
            "trolleybus" => Some(Self::Trolleybus),
            "tram" => Some(Self::Tram),
            "night" => Some(Self::NightBus),
            _ => None,
        }
    }
}

// ============================================================================
// Data Structures
// ============================================================================

/// A stop on one direction of a line.
///
/// A physical stop served by both directions appears as two separate `Stop`
/// records, one per direction's stop list.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub name: Arc<str>,
    pub location: Point,
}

impl Stop {
    pub fn new(name: impl AsRef<str>, location: Point) -> Self {
        Self {
            name: name.as_ref().into(),
            location,
        }
    }
}

/// Directory entry for a line: identity and display attributes only.
/// Geometry and stops are fetched separately per direction.
#[derive(Clone, Debug)]
pub struct LineInfo {
    pub id: LineIdentifier,
    pub short_name: Arc<str>,
    pub long_name: Arc<str>,
    pub mode: TransitMode,
    /// Hex RGB without '#', e.g. "e4572e".
    pub color: Option<Arc<str>>,
    pub text_color: Option<Arc<str>>,
}

/// An ephemeral realtime position report for one vehicle.
///
/// Created each poll cycle and superseded by the next cycle's fix for the
/// same identifier. Ordering between fixes is implicit in poll order; no
/// server timestamp is trusted.
#[derive(Clone, Debug)]
pub struct VehicleFix {
    pub vehicle: VehicleIdentifier,
    pub line: LineIdentifier,
    pub direction: Direction,
    pub position: Point,
    /// Degrees clockwise from north.
    pub bearing_deg: f64,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("unknown direction tag: {0:?}")]
    UnknownDirection(String),

    #[error("unknown transit mode: {0:?}")]
    UnknownMode(String),
}

pub type Result<T> = std::result::Result<T, TransitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_from_api() {
        assert_eq!(Direction::from_api("outward"), Some(Direction::Outward));
        assert_eq!(Direction::from_api("return"), Some(Direction::Return));
        assert_eq!(Direction::from_api("loop"), None);
    }

    #[test]
    fn direction_round_trip() {
        for dir in [Direction::Outward, Direction::Return] {
            assert_eq!(Direction::from_api(dir.as_str()), Some(dir));
        }
    }

    #[test]
    fn mode_from_api() {
        assert_eq!(TransitMode::from_api("bus"), Some(TransitMode::Bus));
        assert_eq!(TransitMode::from_api("tram"), Some(TransitMode::Tram));
        assert_eq!(TransitMode::from_api("ferry"), None);
    }
}
