//! The viewport-busy gate.
//!
//! While the map widget animates a pan or zoom it owns the marker DOM;
//! mutating markers underneath it corrupts the widget's own transforms.
//! The gate enforces strict mutual exclusion: while Busy, the engine
//! buffers the latest vehicle snapshot instead of applying it, and the
//! buffered snapshot replays the moment the viewport settles.

use crate::engine::VehicleUpdate;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum GateState {
    Idle,
    Busy,
}

#[derive(Debug)]
pub(crate) struct ViewportGate {
    state: GateState,
    buffered: Option<Vec<VehicleUpdate>>,
}

impl ViewportGate {
    pub(crate) fn new() -> Self {
        Self {
            state: GateState::Idle,
            buffered: None,
        }
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.state == GateState::Busy
    }

    pub(crate) fn transition_started(&mut self) {
        if self.state == GateState::Idle {
            tracing::debug!("viewport busy, suspending marker mutation");
            self.state = GateState::Busy;
        }
    }

    /// Leave Busy, handing back whatever snapshot arrived in the meantime.
    pub(crate) fn transition_ended(&mut self) -> Option<Vec<VehicleUpdate>> {
        if self.state == GateState::Busy {
            tracing::debug!("viewport settled");
            self.state = GateState::Idle;
        }
        self.buffered.take()
    }

    /// Stash the latest snapshot while Busy. Only the most recent one
    /// matters, so a newer snapshot replaces any previously buffered one.
    pub(crate) fn buffer(&mut self, updates: Vec<VehicleUpdate>) {
        self.buffered = Some(updates);
    }
}
