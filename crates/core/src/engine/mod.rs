//! Marker reconciliation and animation.
//!
//! The engine exclusively owns per-vehicle marker state. Each poll cycle
//! hands it a full snapshot; the engine diffs it against the registry,
//! instructs the widget (place / update / remove), and glides every moved
//! marker toward its latest fix on a single shared clock. All of it is
//! gated on the viewport: while the widget animates a pan or zoom, nothing
//! here touches a marker.

pub mod animation;
pub mod gate;

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use buslive_transit::identifiers::VehicleIdentifier;
use buslive_transit::models::VehicleFix;
use geo::Point;

use crate::widget::{MapWidget, MarkerStyle, WidgetError, WidgetResult};
use animation::{AnimationClock, ease_out_quad, lerp};
use gate::ViewportGate;

pub use animation::MARKER_ANIMATION_DURATION;

/// One vehicle's slice of a poll snapshot: the fix plus the display style
/// the session derived for it (line color, next-stop label, bearing).
#[derive(Clone, Debug)]
pub struct VehicleUpdate {
    pub fix: VehicleFix,
    pub style: MarkerStyle,
}

/// Whether the clock still needs frames after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Animation {
    Running,
    Settled,
}

#[derive(Debug)]
struct MarkerState {
    /// Where the glide started: the displayed position at the moment the
    /// current destination superseded the previous one.
    source: Point,
    /// Always the most recently received fix.
    destination: Point,
    displayed: Point,
    style: MarkerStyle,
    settled: bool,
}

pub struct MarkerEngine {
    widget: Arc<dyn MapWidget>,
    registry: HashMap<VehicleIdentifier, MarkerState>,
    clock: AnimationClock,
    gate: ViewportGate,
}

impl MarkerEngine {
    pub fn new(widget: Arc<dyn MapWidget>) -> Self {
        Self {
            widget,
            registry: HashMap::new(),
            clock: AnimationClock::default(),
            gate: ViewportGate::new(),
        }
    }

    pub fn marker_count(&self) -> usize {
        self.registry.len()
    }

    pub fn is_animating(&self) -> bool {
        self.clock.is_running()
    }

    pub fn is_viewport_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Reconcile a full vehicle snapshot against the registry.
    ///
    /// While the viewport is busy the snapshot is buffered (replacing any
    /// previously buffered one) and nothing is mutated; the buffered
    /// snapshot replays on settle.
    pub fn sync(&mut self, updates: Vec<VehicleUpdate>, now: Instant) {
        if self.gate.is_busy() {
            self.gate.buffer(updates);
            return;
        }
        self.apply(updates, now);
    }

    fn apply(&mut self, updates: Vec<VehicleUpdate>, now: Instant) {
        let mut seen: HashSet<VehicleIdentifier> = HashSet::with_capacity(updates.len());
        let mut placed = 0usize;
        let mut retargeted = 0usize;

        for update in updates {
            let id = update.fix.vehicle.clone();
            let position = update.fix.position;
            seen.insert(id.clone());

            match self.registry.entry(id.clone()) {
                Entry::Occupied(mut entry) => {
                    // Retarget: an in-flight glide continues from wherever
                    // the marker is currently displayed, never restarting
                    // from its original source.
                    let state = entry.get_mut();
                    state.source = state.displayed;
                    state.destination = position;
                    state.settled = state.source == state.destination;
                    if !state.settled {
                        retargeted += 1;
                    }
                    if state.style != update.style {
                        Self::widget_op(self.widget.update_marker(&id, &update.style));
                        state.style = update.style;
                    }
                }
                Entry::Vacant(entry) => {
                    Self::widget_op(self.widget.place_marker(&id, position, &update.style));
                    entry.insert(MarkerState {
                        source: position,
                        destination: position,
                        displayed: position,
                        style: update.style,
                        settled: true,
                    });
                    placed += 1;
                }
            }
        }

        let stale: Vec<VehicleIdentifier> = self
            .registry
            .keys()
            .filter(|id| !seen.contains(*id))
            .cloned()
            .collect();
        for id in &stale {
            Self::widget_op(self.widget.remove_marker(id));
            self.registry.remove(id);
        }

        tracing::debug!(
            placed,
            retargeted,
            removed = stale.len(),
            total = self.registry.len(),
            "reconciled vehicle snapshot"
        );

        if self.registry.values().any(|s| !s.settled) {
            self.clock.start(now);
        }
    }

    /// Advance the shared clock one frame, moving every unsettled marker.
    ///
    /// The host calls this from its display-refresh callback and stops
    /// scheduling frames once [`Animation::Settled`] comes back.
    pub fn tick(&mut self, now: Instant) -> Animation {
        if self.gate.is_busy() {
            // Halt without applying a partial frame; displayed coordinates
            // stay wherever they were.
            self.clock.halt();
            return Animation::Settled;
        }

        let Some(t) = self.clock.progress(now) else {
            return Animation::Settled;
        };
        let eased = ease_out_quad(t);
        let finishing = t >= 1.0;

        for (id, state) in &mut self.registry {
            if state.settled {
                continue;
            }
            state.displayed = if finishing {
                // Snap exactly onto the destination so no floating-point
                // residue accumulates across animations.
                state.destination
            } else {
                lerp(state.source, state.destination, eased)
            };
            state.settled = finishing;
            Self::widget_op(self.widget.move_marker(id, state.displayed));
        }

        if finishing {
            self.clock.halt();
            Animation::Settled
        } else {
            Animation::Running
        }
    }

    /// Viewport transition began: suspend everything immediately.
    pub fn viewport_transition_started(&mut self) {
        self.gate.transition_started();
        self.clock.halt();
    }

    /// Viewport settled: replay the buffered snapshot, if any.
    pub fn viewport_transition_ended(&mut self, now: Instant) {
        if let Some(buffered) = self.gate.transition_ended() {
            self.apply(buffered, now);
        }
    }

    /// Remove every marker and stop the clock (map view teardown).
    pub fn clear(&mut self) {
        for id in self.registry.keys() {
            Self::widget_op(self.widget.remove_marker(id));
        }
        self.registry.clear();
        self.clock.halt();
    }

    /// Widget marker operations are best-effort: a marker the widget has
    /// already dropped is skipped silently.
    fn widget_op(result: WidgetResult) {
        if let Err(WidgetError::MarkerDetached(id)) = result {
            tracing::debug!(%id, "marker already detached, skipping");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::testing::{RecordingWidget, WidgetCall};
    use buslive_transit::identifiers::LineIdentifier;
    use buslive_transit::models::Direction;

    fn update(vehicle: &str, lng: f64, lat: f64) -> VehicleUpdate {
        VehicleUpdate {
            fix: VehicleFix {
                vehicle: VehicleIdentifier::new(vehicle),
                line: LineIdentifier::new("12"),
                direction: Direction::Outward,
                position: Point::new(lng, lat),
                bearing_deg: 0.0,
            },
            style: MarkerStyle {
                color: "#2b6cb0".into(),
                label: "12".into(),
                bearing_deg: 0.0,
            },
        }
    }

    fn engine() -> (MarkerEngine, Arc<RecordingWidget>) {
        let widget = Arc::new(RecordingWidget::default());
        (MarkerEngine::new(widget.clone()), widget)
    }

    fn moves_for(calls: &[WidgetCall], vehicle: &str) -> usize {
        calls
            .iter()
            .filter(|c| matches!(c, WidgetCall::Move(id, _) if id.as_str() == vehicle))
            .count()
    }

    #[test]
    fn first_snapshot_places_markers() {
        let (mut engine, widget) = engine();
        let now = Instant::now();

        engine.sync(vec![update("veh1", 0.0, 0.0)], now);

        let calls = widget.take_calls();
        assert_eq!(calls.len(), 1);
        assert!(matches!(&calls[0], WidgetCall::Place(id, _) if id.as_str() == "veh1"));
        // A freshly placed marker starts settled; nothing to animate.
        assert!(!engine.is_animating());
    }

    #[test]
    fn second_snapshot_moves_and_places() {
        let (mut engine, widget) = engine();
        let now = Instant::now();

        engine.sync(vec![update("veh1", 0.0, 0.0)], now);
        widget.take_calls();

        engine.sync(vec![update("veh1", 0.0, 1.0), update("veh2", 1.0, 1.0)], now);
        assert!(engine.is_animating());
        // Run the animation to completion in one frame.
        engine.tick(now + MARKER_ANIMATION_DURATION);

        let calls = widget.take_calls();
        assert_eq!(moves_for(&calls, "veh1"), 1);
        assert_eq!(moves_for(&calls, "veh2"), 0);
        assert_eq!(
            calls
                .iter()
                .filter(|c| matches!(c, WidgetCall::Place(id, _) if id.as_str() == "veh2"))
                .count(),
            1
        );
        assert!(!calls.iter().any(|c| matches!(c, WidgetCall::Remove(_))));
    }

    #[test]
    fn vanished_vehicle_is_removed() {
        let (mut engine, widget) = engine();
        let now = Instant::now();

        engine.sync(vec![update("veh1", 0.0, 0.0), update("veh2", 1.0, 1.0)], now);
        widget.take_calls();

        engine.sync(vec![update("veh1", 0.0, 0.0)], now);

        let calls = widget.take_calls();
        let removes: Vec<_> = calls
            .iter()
            .filter(|c| matches!(c, WidgetCall::Remove(id) if id.as_str() == "veh2"))
            .collect();
        assert_eq!(removes.len(), 1);
        assert_eq!(engine.marker_count(), 1);
    }

    #[test]
    fn displayed_equals_destination_at_full_duration() {
        let (mut engine, widget) = engine();
        let now = Instant::now();

        engine.sync(vec![update("veh1", 0.0, 0.0)], now);
        engine.sync(vec![update("veh1", 26.0963, 44.4395)], now);
        widget.take_calls();

        assert_eq!(engine.tick(now + MARKER_ANIMATION_DURATION), Animation::Settled);

        let calls = widget.take_calls();
        let last_move = calls.iter().rev().find_map(|c| match c {
            WidgetCall::Move(_, to) => Some(*to),
            _ => None,
        });
        // Exact equality: the final frame snaps, it does not interpolate.
        assert_eq!(last_move, Some(Point::new(26.0963, 44.4395)));
        assert!(!engine.is_animating());
    }

    #[test]
    fn midflight_retarget_continues_from_displayed_position() {
        let (mut engine, widget) = engine();
        let now = Instant::now();

        engine.sync(vec![update("veh1", 0.0, 0.0)], now);
        engine.sync(vec![update("veh1", 0.0, 1.0)], now);
        widget.take_calls();

        let halfway = now + MARKER_ANIMATION_DURATION / 2;
        assert_eq!(engine.tick(halfway), Animation::Running);
        let calls = widget.take_calls();
        let displayed_at_half = match calls.last() {
            Some(WidgetCall::Move(_, to)) => *to,
            other => panic!("expected a move, got {other:?}"),
        };

        // New fix arrives mid-glide: the glide restarts from the displayed
        // position, not from the original source.
        engine.sync(vec![update("veh1", 1.0, 1.0)], halfway);
        engine.tick(halfway); // t = 0 of the restarted clock
        let calls = widget.take_calls();
        let first_frame = match calls.last() {
            Some(WidgetCall::Move(_, to)) => *to,
            other => panic!("expected a move, got {other:?}"),
        };
        assert_eq!(first_frame, displayed_at_half);
    }

    #[test]
    fn busy_gate_buffers_and_replays() {
        let (mut engine, widget) = engine();
        let now = Instant::now();

        engine.sync(vec![update("veh1", 0.0, 0.0), update("veh2", 1.0, 1.0)], now);
        widget.take_calls();

        engine.viewport_transition_started();
        // Two snapshots while busy: only the latest survives.
        engine.sync(vec![update("veh1", 0.5, 0.5)], now);
        engine.sync(vec![update("veh1", 0.0, 1.0), update("veh3", 2.0, 2.0)], now);
        assert!(widget.take_calls().is_empty());
        assert_eq!(engine.marker_count(), 2);

        engine.viewport_transition_ended(now);
        let calls = widget.take_calls();
        // Exactly what the buffered snapshot produces: place veh3, remove
        // veh2, retarget veh1 (no widget call until the next frame).
        assert_eq!(
            calls
                .iter()
                .filter(|c| matches!(c, WidgetCall::Place(id, _) if id.as_str() == "veh3"))
                .count(),
            1
        );
        assert_eq!(
            calls
                .iter()
                .filter(|c| matches!(c, WidgetCall::Remove(id) if id.as_str() == "veh2"))
                .count(),
            1
        );
        assert!(engine.is_animating());
    }

    #[test]
    fn busy_gate_halts_clock_mid_tick() {
        let (mut engine, widget) = engine();
        let now = Instant::now();

        engine.sync(vec![update("veh1", 0.0, 0.0)], now);
        engine.sync(vec![update("veh1", 0.0, 1.0)], now);
        widget.take_calls();

        engine.viewport_transition_started();
        assert_eq!(engine.tick(now + MARKER_ANIMATION_DURATION / 2), Animation::Settled);
        // No frame was applied.
        assert!(widget.take_calls().is_empty());
        assert!(!engine.is_animating());
    }

    #[test]
    fn detached_markers_are_skipped_silently() {
        let (mut engine, widget) = engine();
        let now = Instant::now();

        engine.sync(vec![update("veh1", 0.0, 0.0)], now);
        widget.take_calls();
        widget.detach(&VehicleIdentifier::new("veh1"));

        // Removal hits the detached guard; the registry still forgets it.
        engine.sync(vec![], now);
        assert_eq!(engine.marker_count(), 0);
        assert!(widget.take_calls().is_empty());
    }

    #[test]
    fn clear_removes_everything() {
        let (mut engine, widget) = engine();
        let now = Instant::now();

        engine.sync(vec![update("veh1", 0.0, 0.0), update("veh2", 1.0, 1.0)], now);
        engine.sync(vec![update("veh1", 2.0, 2.0), update("veh2", 3.0, 3.0)], now);
        widget.take_calls();

        engine.clear();
        let calls = widget.take_calls();
        assert_eq!(calls.iter().filter(|c| matches!(c, WidgetCall::Remove(_))).count(), 2);
        assert_eq!(engine.marker_count(), 0);
        assert!(!engine.is_animating());
    }
}
