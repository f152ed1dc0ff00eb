//! The map session: everything alive while one map view is on screen.
//!
//! A session owns the marker engine, the current line selection and the
//! route layers. It is constructed when the view mounts and torn down when
//! the view goes away; nothing here is global. All mutation funnels
//! through `&mut self`, so completions of concurrent fetches apply one at
//! a time and no locking is needed.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use buslive_transit::identifiers::LineIdentifier;
use buslive_transit::models::{DirectionRoute, LineInfo};
use buslive_transit::next_stop::next_stop;
use chrono::{DateTime, Utc};
use geojson::FeatureCollection;

use crate::api::TransitApi;
use crate::engine::{Animation, MarkerEngine, VehicleUpdate};
use crate::error::{Error, Result};
use crate::layers;
use crate::widget::{MapWidget, MarkerStyle};

/// How often the host should call [`MapSession::poll_once`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(6);

/// How many lines can be watched at once.
pub const DEFAULT_LINE_LIMIT: usize = 3;

/// What the chrome shows about the session's health.
#[derive(Clone, Debug, Default)]
pub struct SessionStatus {
    pub last_update: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// A fetched-but-not-yet-applied vehicle snapshot, tagged with its cycle's
/// sequence number.
#[derive(Debug)]
pub struct PollCycle {
    seq: u64,
    updates: Vec<VehicleUpdate>,
}

struct SelectedLine {
    info: LineInfo,
    directions: Vec<DirectionRoute>,
}

pub struct MapSession {
    api: Arc<dyn TransitApi>,
    widget: Arc<dyn MapWidget>,
    engine: MarkerEngine,
    directory: Option<Vec<LineInfo>>,
    selection: Vec<SelectedLine>,
    /// Route layers that arrived while the viewport was busy, drawn on settle.
    deferred_layers: HashMap<String, FeatureCollection>,
    line_limit: usize,
    /// Monotonic poll numbering; a cycle older than the newest applied one
    /// is discarded instead of moving markers backward.
    next_poll: u64,
    applied_poll: Option<u64>,
    status: SessionStatus,
    torn_down: bool,
}

impl MapSession {
    pub fn new(api: Arc<dyn TransitApi>, widget: Arc<dyn MapWidget>) -> Self {
        Self {
            api,
            engine: MarkerEngine::new(widget.clone()),
            widget,
            directory: None,
            selection: Vec::new(),
            deferred_layers: HashMap::new(),
            line_limit: DEFAULT_LINE_LIMIT,
            next_poll: 0,
            applied_poll: None,
            status: SessionStatus::default(),
            torn_down: false,
        }
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn selected_lines(&self) -> impl Iterator<Item = &LineInfo> {
        self.selection.iter().map(|s| &s.info)
    }

    /// The provider's line list, fetched once and cached for the session.
    pub async fn line_directory(&mut self) -> Result<&[LineInfo]> {
        if self.directory.is_none() {
            self.directory = Some(self.api.line_directory().await?);
        }
        Ok(self.directory.as_deref().unwrap_or_default())
    }

    /// Start watching a line: fetch its per-direction geometry and stops,
    /// then draw its route layer. Already-selected lines are a no-op.
    pub async fn select_line(&mut self, id: &LineIdentifier) -> Result<()> {
        if self.selection.iter().any(|s| &s.info.id == id) {
            return Ok(());
        }
        if self.selection.len() >= self.line_limit {
            return Err(Error::SelectionFull(self.line_limit));
        }

        let info = self
            .line_directory()
            .await?
            .iter()
            .find(|l| &l.id == id)
            .cloned()
            .ok_or_else(|| Error::UnknownLine(id.clone()))?;

        let directions = self.api.direction_routes(id).await?;
        tracing::debug!(line = %id, directions = directions.len(), "selected line");

        let features = layers::route_feature_collection(&info, &directions);
        self.draw_layer(layers::route_layer_id(id), features);
        self.selection.push(SelectedLine { info, directions });
        Ok(())
    }

    /// Stop watching a line. Its markers disappear on the next poll cycle's
    /// reconciliation; a position response still in flight for it is
    /// discarded because the snapshot is rebuilt from the current selection.
    pub fn deselect_line(&mut self, id: &LineIdentifier) -> Result<()> {
        let index = self
            .selection
            .iter()
            .position(|s| &s.info.id == id)
            .ok_or_else(|| Error::NotSelected(id.clone()))?;
        self.selection.remove(index);

        let layer = layers::route_layer_id(id);
        self.deferred_layers.remove(&layer);
        if let Err(err) = self.widget.clear_route_layer(&layer) {
            tracing::debug!(%layer, %err, "route layer already gone");
        }
        Ok(())
    }

    /// One poll cycle: fetch fixes for every selected line and direction,
    /// resolve next stops for their labels, and hand the snapshot to the
    /// engine.
    ///
    /// Any fetch failure drops the whole cycle (syncing a partial snapshot
    /// would erase the failed line's markers) and the last-known state
    /// stays on screen. The error is logged and kept in [`SessionStatus`].
    pub async fn poll_once(&mut self, now: Instant) -> Result<()> {
        let seq = self.begin_cycle();
        match self.fetch_cycle(seq).await {
            Ok(cycle) => {
                self.apply_cycle(cycle, now);
            }
            Err(err) => {
                tracing::warn!(%err, "poll cycle failed, keeping last known state");
                self.status.last_error = Some(err.to_string());
            }
        }
        Ok(())
    }

    /// Claim the sequence number for a new poll cycle. Cycles apply in
    /// sequence order regardless of the order their fetches complete.
    pub fn begin_cycle(&mut self) -> u64 {
        let seq = self.next_poll;
        self.next_poll += 1;
        seq
    }

    /// Build the snapshot for one cycle. Takes `&self`, so a host may run
    /// several fetches concurrently and apply them as they complete.
    pub async fn fetch_cycle(&self, seq: u64) -> Result<PollCycle> {
        let mut updates = Vec::new();
        for selected in &self.selection {
            let color: Arc<str> = layers::line_color(&selected.info).into();
            for route in &selected.directions {
                let fixes = self
                    .api
                    .vehicle_positions(&selected.info.id, route.direction)
                    .await?;

                for fix in fixes {
                    let label: Arc<str> = match next_stop(&fix, route) {
                        Some(stop) => format!("{} > {}", selected.info.short_name, stop.name).into(),
                        None => selected.info.short_name.clone(),
                    };
                    let style = MarkerStyle {
                        color: color.clone(),
                        label,
                        bearing_deg: fix.bearing_deg,
                    };
                    updates.push(VehicleUpdate { fix, style });
                }
            }
        }
        Ok(PollCycle { seq, updates })
    }

    /// Hand a fetched snapshot to the engine, unless a newer cycle is
    /// already on screen: a slow response must never move markers backward.
    /// Returns whether the cycle was applied.
    pub fn apply_cycle(&mut self, cycle: PollCycle, now: Instant) -> bool {
        if self.applied_poll.is_some_and(|applied| cycle.seq < applied) {
            tracing::debug!(seq = cycle.seq, "discarding stale poll cycle");
            return false;
        }

        self.engine.sync(cycle.updates, now);
        self.applied_poll = Some(cycle.seq);
        self.status.last_update = Some(Utc::now());
        self.status.last_error = None;
        true
    }

    /// Forwarded from the host's display-refresh callback.
    pub fn tick(&mut self, now: Instant) -> Animation {
        self.engine.tick(now)
    }

    /// The map widget began a pan/zoom transition.
    pub fn handle_viewport_started(&mut self) {
        self.engine.viewport_transition_started();
    }

    /// The map widget's viewport settled: replay the buffered snapshot and
    /// flush any route layers drawn into the gap.
    ///
    /// Replaying can restart the animation; the returned state tells a host
    /// that stopped scheduling frames whether to resume.
    pub fn handle_viewport_ended(&mut self, now: Instant) -> Animation {
        self.engine.viewport_transition_ended(now);
        for (layer, features) in std::mem::take(&mut self.deferred_layers) {
            if let Err(err) = self.widget.draw_route_layer(&layer, &features) {
                tracing::debug!(%layer, %err, "deferred route layer draw failed");
            }
        }
        if self.engine.is_animating() {
            Animation::Running
        } else {
            Animation::Settled
        }
    }

    /// Whether any marker still needs frames. Lets hosts that stopped their
    /// frame timer on [`Animation::Settled`] know a poll restarted the glide.
    pub fn is_animating(&self) -> bool {
        self.engine.is_animating()
    }

    /// Tear the view down: every marker and layer goes, the clock stops.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.engine.clear();
        for selected in &self.selection {
            let layer = layers::route_layer_id(&selected.info.id);
            if let Err(err) = self.widget.clear_route_layer(&layer) {
                tracing::debug!(%layer, %err, "route layer already gone");
            }
        }
        self.selection.clear();
        self.deferred_layers.clear();
        self.torn_down = true;
    }

    fn draw_layer(&mut self, layer: String, features: FeatureCollection) {
        if self.engine.is_viewport_busy() {
            self.deferred_layers.insert(layer, features);
            return;
        }
        if let Err(err) = self.widget.draw_route_layer(&layer, &features) {
            tracing::debug!(%layer, %err, "route layer draw failed");
        }
    }
}

impl Drop for MapSession {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Drive a session's poll cycles on a fixed cadence. Useful for headless
/// hosts; interactive hosts usually own the timer themselves so they can
/// interleave frame ticks and viewport events.
pub async fn drive_polling(session: &mut MapSession, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Err(err) = session.poll_once(Instant::now()).await {
            tracing::warn!(%err, "poll cycle failed");
        }
    }
}
