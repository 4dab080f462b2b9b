//! Decides whether a resolved target warrants a new camera flight.
//!
//! The interpolation itself belongs to the scene runtime. The controller only
//! remembers what it last flew to, so repeated resolutions of the same target
//! trigger at most one flight.

use foundation::{Time, TimeSpan};
use tracing::debug;

use crate::camera::CameraPose;
use crate::handle::SceneHandle;
use crate::targeting::{FlightKey, TargetRule, TargetSelection};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FlightDecision {
    Started,
    /// Same target as the last flight and no new recenter request.
    Unchanged,
    /// A flight was warranted but no scene exists; nothing was recorded.
    SceneUnavailable,
}

/// The single flight currently considered live.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ActiveFlight {
    pub key: FlightKey,
    pub rule: TargetRule,
    pub pose: CameraPose,
    pub span: TimeSpan,
}

#[derive(Debug, Clone)]
pub struct FlightController {
    duration_s: f64,
    last_key: Option<FlightKey>,
    recenter_seen: u64,
    active: Option<ActiveFlight>,
}

impl FlightController {
    pub fn new(duration_s: f64) -> Self {
        Self {
            duration_s,
            last_key: None,
            recenter_seen: 0,
            active: None,
        }
    }

    /// Recenter counter value observed by the last started flight.
    pub fn recenter_seen(&self) -> u64 {
        self.recenter_seen
    }

    pub fn last_key(&self) -> Option<FlightKey> {
        self.last_key
    }

    /// The live flight, if it has not yet run its full duration at `now`.
    pub fn active(&self, now: Time) -> Option<&ActiveFlight> {
        self.active
            .as_ref()
            .filter(|f| f.span.progress(now) < 1.0)
    }

    pub fn on_selection(
        &mut self,
        selection: &TargetSelection,
        recenter_counter: u64,
        now: Time,
        scene: &mut dyn SceneHandle,
    ) -> FlightDecision {
        if recenter_counter < self.recenter_seen {
            // The counter only grows within a session; a smaller value means a new one.
            self.recenter_seen = recenter_counter;
        }
        let recenter = recenter_counter > self.recenter_seen;
        let changed = !self
            .last_key
            .is_some_and(|last| last.matches(&selection.key));
        if !recenter && !changed {
            return FlightDecision::Unchanged;
        }
        if !scene.is_active() {
            return FlightDecision::SceneUnavailable;
        }

        scene.fly_to(&selection.pose, self.duration_s);
        if let Some(previous) = self.active(now) {
            debug!(previous = ?previous.rule, "superseding flight in progress");
        }
        debug!(rule = ?selection.rule, recenter, duration_s = self.duration_s, "flight started");

        self.last_key = Some(selection.key);
        self.recenter_seen = recenter_counter;
        self.active = Some(ActiveFlight {
            key: selection.key,
            rule: selection.rule,
            pose: selection.pose,
            span: TimeSpan::starting_at(now, self.duration_s),
        });
        FlightDecision::Started
    }

    /// Drops the live flight after the camera was moved by something else.
    ///
    /// The last key is kept, so the abandoned target is not flown to again
    /// until the resolved target changes.
    pub fn supersede(&mut self) {
        self.active = None;
    }

    /// Forgets the last flown target so the next selection flies again.
    ///
    /// Used when the scene goes away: a re-created scene starts at its own
    /// default pose. The recenter bookkeeping is kept.
    pub fn reset_target(&mut self) {
        self.active = None;
        self.last_key = None;
    }
}
