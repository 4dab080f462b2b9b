//! The viewport engine: wires application state, the scene runtime and the
//! overlay host together.
//!
//! Three flows run independently of each other:
//! - state changes resolve a target and maybe start a flight,
//! - weather changes replace the atmosphere,
//! - every rendered frame re-projects the overlay anchors.

use foundation::Time;
use runtime::metrics::{
    ATMOSPHERE_APPLIED, FLIGHT_STARTED, FLIGHT_SUPPRESSED, FLIGHT_UNAVAILABLE,
};
use runtime::{EventBus, EventKind, Frame, Metrics};
use serde::Serialize;
use tracing::debug;

use crate::atmosphere::{AtmosphereMapper, AtmosphereOutcome};
use crate::config::ViewportConfig;
use crate::controls::{ControlOutcome, SceneControls};
use crate::flight::{FlightController, FlightDecision};
use crate::handle::SceneHandle;
use crate::overlay::{AnchorDiff, AnchorKey, AnchorSpec, FrameOutcome, OverlayHost, OverlayProjector};
use crate::state::AppSnapshot;
use crate::targeting::{TargetRule, TargetSelection, resolve_target};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StateOutcome {
    pub selection: TargetSelection,
    pub flight: FlightDecision,
    pub atmosphere: AtmosphereOutcome,
    pub anchors: AnchorDiff,
}

/// Work deferred because the scene was unavailable when the state arrived.
#[derive(Debug, Clone, Default)]
struct Pending {
    flight: Option<(TargetSelection, u64)>,
    weather: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportStatus {
    pub rule: Option<TargetRule>,
    pub flying: bool,
    pub anchors: usize,
    pub weather: Option<&'static str>,
}

#[derive(Debug)]
pub struct Viewport {
    config: ViewportConfig,
    flight: FlightController,
    atmosphere: AtmosphereMapper,
    overlay: OverlayProjector,
    controls: SceneControls,
    selection: Option<TargetSelection>,
    pending: Pending,
    now: Time,
    frame_index: u64,
    skipping: bool,
    bus: EventBus,
    metrics: Metrics,
}

impl Viewport {
    pub fn new(config: ViewportConfig) -> Self {
        Self {
            flight: FlightController::new(config.flight.duration_s),
            atmosphere: AtmosphereMapper::new(),
            overlay: OverlayProjector::new(config.overlay),
            controls: SceneControls::new(&config.flight),
            config,
            selection: None,
            pending: Pending::default(),
            now: Time(0.0),
            frame_index: 0,
            skipping: false,
            bus: EventBus::with_limit(config.events.limit),
            metrics: Metrics::new(),
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// The most recently resolved target.
    pub fn selection(&self) -> Option<&TargetSelection> {
        self.selection.as_ref()
    }

    pub fn overlay(&self) -> &OverlayProjector {
        &self.overlay
    }

    pub fn flight(&self) -> &FlightController {
        &self.flight
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn status(&self) -> ViewportStatus {
        ViewportStatus {
            rule: self.selection.map(|s| s.rule),
            flying: self.flight.active(self.now).is_some(),
            anchors: self.overlay.anchor_count(),
            weather: self
                .atmosphere
                .applied()
                .map(|w| crate::atmosphere::WeatherClass::parse(w).as_str()),
        }
    }

    /// Reacts to a new application-state snapshot.
    pub fn apply_state(
        &mut self,
        snapshot: &AppSnapshot,
        scene: &mut dyn SceneHandle,
        host: &mut dyn OverlayHost,
    ) -> StateOutcome {
        let selection = resolve_target(snapshot, self.flight.recenter_seen(), &self.config);
        self.selection = Some(selection);
        let flight = self.fly(selection, snapshot.recenter_counter, scene);
        let atmosphere = self.apply_weather(&snapshot.weather, scene);
        let anchors = self
            .overlay
            .set_anchors(anchors_for(snapshot, &self.config), host);
        if anchors != AnchorDiff::default() {
            self.bus.emit(
                self.frame_index,
                EventKind::Overlay,
                format!(
                    "anchors +{} ~{} -{} skipped {}",
                    anchors.added, anchors.updated, anchors.removed, anchors.skipped
                ),
            );
        }

        StateOutcome {
            selection,
            flight,
            atmosphere,
            anchors,
        }
    }

    /// Post-render hook: retries deferred work, then re-projects overlays.
    pub fn on_post_render(
        &mut self,
        frame: Frame,
        scene: &mut dyn SceneHandle,
        host: &mut dyn OverlayHost,
    ) -> FrameOutcome {
        self.now = frame.time;
        self.frame_index = frame.index;

        if scene.is_active() {
            if let Some((selection, counter)) = self.pending.flight.take() {
                self.fly(selection, counter, scene);
            }
            if let Some(weather) = self.pending.weather.take() {
                self.apply_weather(&weather, scene);
            }
        }

        let outcome = self
            .overlay
            .on_post_render(frame, &*scene, host, &mut self.metrics);
        let skipped = outcome == FrameOutcome::Skipped;
        if skipped && !self.skipping {
            self.bus.emit_at(frame, EventKind::Overlay, "frames skipped: no scene");
        }
        self.skipping = skipped;
        outcome
    }

    pub fn toggle_overlay(&mut self, key: AnchorKey) -> Option<bool> {
        let expanded = self.overlay.toggle_expanded(key)?;
        self.bus.emit(
            self.frame_index,
            EventKind::Overlay,
            format!("{key} {}", if expanded { "expanded" } else { "collapsed" }),
        );
        Some(expanded)
    }

    pub fn zoom_in(&mut self, scene: &mut dyn SceneHandle) -> ControlOutcome {
        let outcome = self.controls.zoom_in(scene);
        self.after_control("zoom in", outcome)
    }

    pub fn zoom_out(&mut self, scene: &mut dyn SceneHandle) -> ControlOutcome {
        let outcome = self.controls.zoom_out(scene);
        self.after_control("zoom out", outcome)
    }

    pub fn reset_compass(&mut self, scene: &mut dyn SceneHandle) -> ControlOutcome {
        let outcome = self.controls.reset_compass(scene);
        self.after_control("reset compass", outcome)
    }

    /// Scene teardown: releases every per-frame registration and forgets the
    /// last flown target, so the next state after a re-created scene flies.
    pub fn teardown(&mut self, host: &mut dyn OverlayHost) -> usize {
        let released = self.overlay.teardown(host);
        self.atmosphere.reset();
        self.pending = Pending::default();
        // A re-created scene starts from its own default pose.
        self.flight.reset_target();
        self.bus.emit(
            self.frame_index,
            EventKind::Overlay,
            format!("teardown released {released} anchors"),
        );
        released
    }

    fn after_control(&mut self, what: &str, outcome: ControlOutcome) -> ControlOutcome {
        if outcome == ControlOutcome::Applied {
            // The camera no longer heads for the live target.
            self.flight.supersede();
            self.bus.emit(self.frame_index, EventKind::Control, what);
        }
        outcome
    }

    fn fly(
        &mut self,
        selection: TargetSelection,
        recenter_counter: u64,
        scene: &mut dyn SceneHandle,
    ) -> FlightDecision {
        let decision = self
            .flight
            .on_selection(&selection, recenter_counter, self.now, scene);
        match decision {
            FlightDecision::Started => {
                self.pending.flight = None;
                self.metrics.inc(FLIGHT_STARTED);
                self.bus.emit(
                    self.frame_index,
                    EventKind::Flight,
                    format!("started {:?}", selection.rule),
                );
            }
            FlightDecision::Unchanged => {
                self.pending.flight = None;
                self.metrics.inc(FLIGHT_SUPPRESSED);
            }
            FlightDecision::SceneUnavailable => {
                debug!(rule = ?selection.rule, "no scene, flight deferred");
                self.pending.flight = Some((selection, recenter_counter));
                self.metrics.inc(FLIGHT_UNAVAILABLE);
            }
        }
        decision
    }

    fn apply_weather(&mut self, weather: &str, scene: &mut dyn SceneHandle) -> AtmosphereOutcome {
        let outcome = self.atmosphere.on_classification(weather, scene);
        match outcome {
            AtmosphereOutcome::Applied(_) => {
                self.pending.weather = None;
                self.metrics.inc(ATMOSPHERE_APPLIED);
                self.bus
                    .emit(self.frame_index, EventKind::Atmosphere, format!("applied {weather}"));
            }
            AtmosphereOutcome::Unchanged => self.pending.weather = None,
            AtmosphereOutcome::SceneUnavailable => {
                self.pending.weather = Some(weather.to_string());
            }
        }
        outcome
    }
}

/// Overlay anchors for a snapshot: the origin first, then candidates in rank order.
///
/// Nothing is anchored while layers are hidden.
pub fn anchors_for(snapshot: &AppSnapshot, config: &ViewportConfig) -> Vec<AnchorSpec> {
    if !snapshot.layers_visible {
        return Vec::new();
    }
    let overlay = &config.overlay;
    let origin = snapshot.valid_origin().map(|position| AnchorSpec {
        key: AnchorKey::Origin,
        position,
        altitude_m: overlay.origin_altitude_m,
        title: "Origin".to_string(),
        rating: None,
        body: String::new(),
    });
    let candidates = snapshot.candidates.iter().filter_map(|c| {
        Some(AnchorSpec {
            key: AnchorKey::Candidate(c.id),
            position: c.valid_position()?,
            altitude_m: overlay.anchor_altitude_m,
            title: c.name.clone(),
            rating: c.rating,
            body: c.description.clone(),
        })
    });
    origin.into_iter().chain(candidates).collect()
}
