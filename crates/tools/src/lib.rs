//! Scenario replay against the headless scene.
//!
//! A scenario is a JSON document:
//!
//! ```json
//! { "viewport": [1280, 720],
//!   "steps": [ { "state": { ... }, "actions": ["zoom_in"], "frames": 30 } ] }
//! ```
//!
//! Each step applies its state, runs its actions, then renders `frames`
//! frames. One JSON line is written per frame, followed by a final metrics line.

use std::fs;
use std::io::Write;
use std::path::Path;

use foundation::{CandidateId, Time};
use layers::markers::MarkerLayer;
use layers::routes::RouteLayer;
use runtime::{Event, Frame, MetricsSnapshot};
use scene::overlay::FrameOutcome;
use scene::{
    AnchorKey, AppSnapshot, HeadlessScene, OverlayHost, OverlayPlacement, TargetRule, Viewport,
    ViewportConfig,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug)]
pub enum ReplayError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Config(String),
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayError::Io(e) => write!(f, "replay i/o error: {e}"),
            ReplayError::Parse(e) => write!(f, "replay input is not valid: {e}"),
            ReplayError::Config(msg) => write!(f, "replay configuration error: {msg}"),
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReplayError::Io(e) => Some(e),
            ReplayError::Parse(e) => Some(e),
            ReplayError::Config(_) => None,
        }
    }
}

impl From<std::io::Error> for ReplayError {
    fn from(e: std::io::Error) -> Self {
        ReplayError::Io(e)
    }
}

impl From<serde_json::Error> for ReplayError {
    fn from(e: serde_json::Error) -> Self {
        ReplayError::Parse(e)
    }
}

/// User input between a state change and the following frames.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    ZoomIn,
    ZoomOut,
    ResetCompass,
    /// Expand or collapse a candidate's overlay.
    Toggle(u64),
    /// Destroys the scene and releases every overlay.
    Teardown,
    /// Recreates the scene after a teardown.
    Restore,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    pub state: AppSnapshot,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default = "default_frames")]
    pub frames: u32,
}

fn default_frames() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Scenario {
    pub viewport: [f64; 2],
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn from_json(text: &str) -> Result<Self, ReplayError> {
        let scenario: Scenario = serde_json::from_str(text)?;
        let [w, h] = scenario.viewport;
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(ReplayError::Config(format!("viewport must be positive, got {w}x{h}")));
        }
        Ok(scenario)
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

/// Reads a config file, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<ViewportConfig, ReplayError> {
    let Some(path) = path else {
        return Ok(ViewportConfig::default());
    };
    let config: ViewportConfig = serde_json::from_str(&fs::read_to_string(path)?)?;
    if !(config.flight.duration_s >= 0.0) {
        return Err(ReplayError::Config(format!(
            "flight.duration_s must be non-negative, got {}",
            config.flight.duration_s
        )));
    }
    Ok(config)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementRecord {
    pub anchor: AnchorKey,
    pub x: f64,
    pub y: f64,
    pub width_px: f64,
    pub expanded: bool,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameRecord {
    pub frame: u64,
    pub time_s: f64,
    pub rule: Option<TargetRule>,
    pub flying: bool,
    pub skipped: bool,
    pub markers: usize,
    pub routes: usize,
    pub overlays: Vec<PlacementRecord>,
    pub hidden: Vec<AnchorKey>,
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub frames: u64,
    pub metrics: MetricsSnapshot,
}

/// Collects what the engine asked the host to draw during one frame.
#[derive(Debug, Default)]
struct FrameHost {
    placed: Vec<PlacementRecord>,
    hidden: Vec<AnchorKey>,
}

impl OverlayHost for FrameHost {
    fn place(&mut self, p: &OverlayPlacement<'_>) {
        self.placed.push(PlacementRecord {
            anchor: p.anchor,
            x: p.bottom_center.x,
            y: p.bottom_center.y,
            width_px: p.width_px,
            expanded: p.expanded,
            title: p.content.title.clone(),
        });
    }

    fn hide(&mut self, anchor: AnchorKey) {
        self.hidden.push(anchor);
    }

    fn remove(&mut self, anchor: AnchorKey) {
        debug!(%anchor, "overlay removed");
    }
}

/// Runs `scenario` and writes one JSON line per frame to `out`.
pub fn replay<W: Write>(
    scenario: &Scenario,
    config: ViewportConfig,
    fps: f64,
    out: &mut W,
) -> Result<ReplaySummary, ReplayError> {
    if !(fps.is_finite() && fps > 0.0) {
        return Err(ReplayError::Config(format!("fps must be positive, got {fps}")));
    }
    let dt = 1.0 / fps;
    let [w, h] = scenario.viewport;
    let mut scene = HeadlessScene::new(w, h);
    let mut viewport = Viewport::new(config);
    let markers = MarkerLayer::new(1);
    let routes = RouteLayer::new(2);
    let mut host = FrameHost::default();
    let mut frame = Frame::at(0, Time(0.0), dt);

    for (i, step) in scenario.steps.iter().enumerate() {
        let outcome = viewport.apply_state(&step.state, &mut scene, &mut host);
        info!(step = i, rule = ?outcome.selection.rule, flight = ?outcome.flight, "state applied");

        for action in &step.actions {
            run_action(*action, scenario.viewport, &mut viewport, &mut scene, &mut host);
        }

        let marker_count = markers.extract(&step.state).markers.len();
        let route_count = routes.extract(&step.state).routes.len();

        for _ in 0..step.frames {
            frame = frame.next();
            scene.tick(frame);
            host.placed.clear();
            host.hidden.clear();
            let outcome = viewport.on_post_render(frame, &mut scene, &mut host);
            let status = viewport.status();

            let record = FrameRecord {
                frame: frame.index,
                time_s: frame.time.0,
                rule: status.rule,
                flying: status.flying,
                skipped: outcome == FrameOutcome::Skipped,
                markers: marker_count,
                routes: route_count,
                overlays: std::mem::take(&mut host.placed),
                hidden: std::mem::take(&mut host.hidden),
                events: viewport.events_mut().drain(),
            };
            serde_json::to_writer(&mut *out, &record)?;
            writeln!(out)?;
        }
    }

    let summary = ReplaySummary {
        frames: frame.index,
        metrics: viewport.metrics().snapshot(),
    };
    serde_json::to_writer(&mut *out, &summary)?;
    writeln!(out)?;
    Ok(summary)
}

fn run_action(
    action: Action,
    [w, h]: [f64; 2],
    viewport: &mut Viewport,
    scene: &mut HeadlessScene,
    host: &mut FrameHost,
) {
    match action {
        Action::ZoomIn => {
            viewport.zoom_in(scene);
        }
        Action::ZoomOut => {
            viewport.zoom_out(scene);
        }
        Action::ResetCompass => {
            viewport.reset_compass(scene);
        }
        Action::Toggle(id) => {
            viewport.toggle_overlay(AnchorKey::Candidate(CandidateId::new(id)));
        }
        Action::Teardown => {
            scene.set_active(false);
            viewport.teardown(host);
        }
        Action::Restore => {
            let now = scene.now();
            *scene = HeadlessScene::new(w, h);
            scene.tick(Frame::at(0, now, 0.0));
        }
    }
}
