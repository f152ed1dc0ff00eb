//! The shared animation clock and interpolation math.
//!
//! One clock drives every marker: a single start instant, a fixed duration
//! and an ease-out-quadratic curve. Entries each lerp between their own
//! source and destination using the shared progress value.

use std::time::{Duration, Instant};

use geo::Point;

/// How long a marker takes to glide from one fix to the next.
pub const MARKER_ANIMATION_DURATION: Duration = Duration::from_millis(1800);

#[derive(Debug, Default)]
pub(crate) struct AnimationClock {
    started: Option<Instant>,
}

impl AnimationClock {
    /// (Re)start the clock. Restarting mid-flight is how a new snapshot
    /// retargets in-flight markers: their sources have already been reset
    /// to the displayed position, so progress restarts cleanly from there.
    pub(crate) fn start(&mut self, now: Instant) {
        self.started = Some(now);
    }

    pub(crate) fn halt(&mut self) {
        self.started = None;
    }

    pub(crate) fn is_running(&self) -> bool {
        self.started.is_some()
    }

    /// Raw progress `t` in [0, 1], or `None` when the clock is stopped.
    pub(crate) fn progress(&self, now: Instant) -> Option<f64> {
        let started = self.started?;
        let elapsed = now.saturating_duration_since(started).as_secs_f64();
        Some((elapsed / MARKER_ANIMATION_DURATION.as_secs_f64()).min(1.0))
    }
}

/// Ease-out quadratic: fast start, gentle arrival.
pub(crate) fn ease_out_quad(t: f64) -> f64 {
    t * (2.0 - t)
}

pub(crate) fn lerp(from: Point, to: Point, f: f64) -> Point {
    Point::new(
        from.x() + (to.x() - from.x()) * f,
        from.y() + (to.y() - from.y()) * f,
    )
}
