//! Screen-space annotation overlays that track world anchors.
//!
//! Each anchor owns exactly one post-render registration for its lifetime.
//! Changes to the anchor set update registrations in place; nothing is
//! re-registered per frame or per state change.

use std::collections::BTreeMap;

use foundation::{CandidateId, GeoPoint};
use runtime::metrics::{
    FRAME_SKIPPED, OVERLAY_ANCHORS, OVERLAY_HIDDEN, OVERLAY_VISIBLE, OVERLAY_VISIBLE_PER_FRAME,
};
use runtime::{Frame, ListenerId, Metrics, PostRenderHub};
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::OverlayConfig;
use crate::handle::SceneHandle;
use crate::projection::{ScreenPoint, WorldPoint, to_world};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum AnchorKey {
    Origin,
    Candidate(CandidateId),
}

impl std::fmt::Display for AnchorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnchorKey::Origin => f.write_str("origin"),
            AnchorKey::Candidate(id) => write!(f, "{id}"),
        }
    }
}

/// What an overlay is attached to and what it shows.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorSpec {
    pub key: AnchorKey,
    pub position: GeoPoint,
    /// Height of the anchor above the ellipsoid; the position's own altitude is ignored.
    pub altitude_m: f64,
    pub title: String,
    pub rating: Option<f64>,
    pub body: String,
}

/// One anchor's projection for one frame.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct AnchorProjection {
    pub anchor: AnchorKey,
    pub screen_x: f64,
    pub screen_y: f64,
    pub visible: bool,
}

/// Where the host should draw an overlay this frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OverlayPlacement<'a> {
    pub anchor: AnchorKey,
    /// The overlay's bottom-centre, lifted above the projected point.
    pub bottom_center: ScreenPoint,
    pub width_px: f64,
    /// Whether the body text is shown.
    pub expanded: bool,
    pub content: &'a AnchorSpec,
}

impl OverlayPlacement<'_> {
    pub fn top_left(&self, height_px: f64) -> ScreenPoint {
        ScreenPoint::new(
            self.bottom_center.x - self.width_px * 0.5,
            self.bottom_center.y - height_px,
        )
    }
}

/// The DOM-like surface overlays are drawn on.
pub trait OverlayHost {
    fn place(&mut self, placement: &OverlayPlacement<'_>);
    fn hide(&mut self, anchor: AnchorKey);
    /// The anchor is gone; its element can be destroyed.
    fn remove(&mut self, anchor: AnchorKey);
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct AnchorDiff {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
    pub skipped: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameOutcome {
    /// No scene to project against.
    Skipped,
    Projected { visible: usize, hidden: usize },
}

#[derive(Debug)]
struct AnchorState {
    spec: AnchorSpec,
    world: WorldPoint,
    expanded: bool,
    /// Visibility last reported to the host, if any.
    shown: Option<bool>,
}

#[derive(Debug)]
pub struct OverlayProjector {
    config: OverlayConfig,
    hub: PostRenderHub<AnchorState>,
    by_key: BTreeMap<AnchorKey, ListenerId>,
    projections: Vec<AnchorProjection>,
}

impl OverlayProjector {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            hub: PostRenderHub::new(),
            by_key: BTreeMap::new(),
            projections: Vec::new(),
        }
    }

    pub fn anchor_count(&self) -> usize {
        self.hub.len()
    }

    pub fn anchors(&self) -> impl Iterator<Item = &AnchorSpec> + '_ {
        self.hub.iter().map(|(_, s)| &s.spec)
    }

    pub fn is_expanded(&self, key: AnchorKey) -> Option<bool> {
        let id = self.by_key.get(&key)?;
        self.hub.get(*id).map(|s| s.expanded)
    }

    /// Projections computed by the most recent projected frame.
    pub fn projections(&self) -> &[AnchorProjection] {
        &self.projections
    }

    /// Replaces the anchor set.
    ///
    /// Anchors with invalid coordinates are skipped. For a repeated key the
    /// first entry wins. Anchors that survive keep their registration and
    /// their expand state.
    pub fn set_anchors<I>(&mut self, specs: I, host: &mut dyn OverlayHost) -> AnchorDiff
    where
        I: IntoIterator<Item = AnchorSpec>,
    {
        let mut diff = AnchorDiff::default();
        let mut live = BTreeMap::new();

        for spec in specs {
            if live.contains_key(&spec.key) {
                diff.skipped += 1;
                continue;
            }
            let Ok(world) = to_world(spec.position, spec.altitude_m) else {
                diff.skipped += 1;
                continue;
            };
            let key = spec.key;
            let id = match self.by_key.get(&key).copied() {
                Some(id) => {
                    if let Some(state) = self.hub.get_mut(id) {
                        state.spec = spec;
                        state.world = world;
                    }
                    diff.updated += 1;
                    id
                }
                None => {
                    diff.added += 1;
                    debug!(anchor = %key, "overlay anchor subscribed");
                    self.hub.subscribe(AnchorState {
                        spec,
                        world,
                        expanded: false,
                        shown: None,
                    })
                }
            };
            live.insert(key, id);
        }

        for (key, id) in std::mem::replace(&mut self.by_key, live) {
            if self.by_key.contains_key(&key) {
                continue;
            }
            if self.hub.unsubscribe(id).is_some() {
                host.remove(key);
                diff.removed += 1;
                debug!(anchor = %key, "overlay anchor released");
            }
        }
        diff
    }

    /// Flips an overlay between collapsed and expanded. Returns the new state.
    pub fn toggle_expanded(&mut self, key: AnchorKey) -> Option<bool> {
        let id = self.by_key.get(&key)?;
        let state = self.hub.get_mut(*id)?;
        state.expanded = !state.expanded;
        Some(state.expanded)
    }

    /// Re-projects every anchor after a rendered frame.
    pub fn on_post_render(
        &mut self,
        frame: Frame,
        scene: &dyn SceneHandle,
        host: &mut dyn OverlayHost,
        metrics: &mut Metrics,
    ) -> FrameOutcome {
        if !scene.is_active() {
            metrics.inc(FRAME_SKIPPED);
            trace!(frame = frame.index, "no active scene, overlay frame skipped");
            return FrameOutcome::Skipped;
        }

        let config = &self.config;
        let projections = &mut self.projections;
        projections.clear();
        let (mut visible, mut hidden) = (0usize, 0usize);

        self.hub.notify(frame, |_, _, state| {
            let key = state.spec.key;
            match scene.project_to_screen(state.world) {
                Some(p) => {
                    let width_px = if state.expanded {
                        config.expanded_width_px
                    } else {
                        config.collapsed_width_px
                    };
                    host.place(&OverlayPlacement {
                        anchor: key,
                        bottom_center: ScreenPoint::new(p.x, p.y - config.lift_px),
                        width_px,
                        expanded: state.expanded,
                        content: &state.spec,
                    });
                    state.shown = Some(true);
                    visible += 1;
                    projections.push(AnchorProjection {
                        anchor: key,
                        screen_x: p.x,
                        screen_y: p.y,
                        visible: true,
                    });
                }
                None => {
                    if state.shown != Some(false) {
                        host.hide(key);
                        state.shown = Some(false);
                    }
                    hidden += 1;
                    projections.push(AnchorProjection {
                        anchor: key,
                        screen_x: f64::NAN,
                        screen_y: f64::NAN,
                        visible: false,
                    });
                }
            }
        });

        metrics.inc_by(OVERLAY_VISIBLE, visible as u64);
        metrics.inc_by(OVERLAY_HIDDEN, hidden as u64);
        metrics.set_gauge(OVERLAY_ANCHORS, self.hub.len() as i64);
        metrics.record(OVERLAY_VISIBLE_PER_FRAME, visible as i64);
        FrameOutcome::Projected { visible, hidden }
    }

    /// Releases every registration and removes every overlay. Returns how many were live.
    pub fn teardown(&mut self, host: &mut dyn OverlayHost) -> usize {
        for key in self.by_key.keys() {
            host.remove(*key);
        }
        self.by_key.clear();
        self.projections.clear();
        let released = self.hub.clear();
        if released > 0 {
            debug!(released, "overlay anchors torn down");
        }
        released
    }
}
