//! Camera target resolution.
//!
//! Rules are evaluated in priority order and the first match wins:
//!
//! 1. a recenter request (counter above the last observed value)
//! 2. the user-selected candidate
//! 3. the origin location
//! 4. the top-ranked candidate
//! 5. an explicit bounding viewport
//! 6. the fixed overview pose
//!
//! Resolution is a pure function of the snapshot, the last observed recenter
//! counter and the configuration. It never looks at the live camera.

use foundation::math::within_tolerance;
use serde::Serialize;

use crate::camera::CameraPose;
use crate::config::{FlightKeyConfig, ViewportConfig};
use crate::state::AppSnapshot;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRule {
    Recenter,
    Selected,
    Origin,
    TopCandidate,
    BoundingViewport,
    Overview,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum PoseShape {
    Point,
    Region,
}

/// Structural identity of a pose.
///
/// Two keys match when they have the same shape and every component lies
/// within the configured tolerance of its counterpart, so float noise never
/// produces a second flight.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FlightKey {
    shape: PoseShape,
    values: [f64; 6],
    tolerances: [f64; 6],
}

impl FlightKey {
    pub fn for_pose(pose: &CameraPose, tolerance: &FlightKeyConfig) -> Self {
        let deg = tolerance.position_tolerance_deg;
        let rad = tolerance.angle_tolerance_rad;
        match pose {
            CameraPose::Point {
                position,
                orientation,
            } => Self {
                shape: PoseShape::Point,
                values: [
                    position.latitude,
                    position.longitude,
                    position.altitude,
                    orientation.heading,
                    orientation.pitch,
                    orientation.roll,
                ],
                tolerances: [deg, deg, tolerance.altitude_tolerance_m, rad, rad, rad],
            },
            CameraPose::Region { bounds } => Self {
                shape: PoseShape::Region,
                values: [
                    bounds.low.latitude,
                    bounds.low.longitude,
                    bounds.high.latitude,
                    bounds.high.longitude,
                    0.0,
                    0.0,
                ],
                tolerances: [deg, deg, deg, deg, 0.0, 0.0],
            },
        }
    }

    pub fn matches(&self, other: &Self) -> bool {
        self.shape == other.shape
            && self
                .values
                .iter()
                .zip(&other.values)
                .zip(&self.tolerances)
                .all(|((a, b), tol)| within_tolerance(*a, *b, *tol))
    }
}

/// The resolver's output. Always replaced, never mutated.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TargetSelection {
    pub pose: CameraPose,
    pub rule: TargetRule,
    pub key: FlightKey,
}

impl TargetSelection {
    fn new(pose: CameraPose, rule: TargetRule, tolerance: &FlightKeyConfig) -> Self {
        Self {
            pose,
            rule,
            key: FlightKey::for_pose(&pose, tolerance),
        }
    }

    /// Same destination, regardless of which rule produced it.
    pub fn same_target(&self, other: &Self) -> bool {
        self.key.matches(&other.key)
    }
}

pub fn resolve_target(
    snapshot: &AppSnapshot,
    last_recenter_seen: u64,
    config: &ViewportConfig,
) -> TargetSelection {
    let t = &config.targeting;
    let tol = &config.flight_key;

    if snapshot.recenter_counter > last_recenter_seen {
        let center = snapshot.valid_origin().unwrap_or(t.fallback_location);
        return TargetSelection::new(t.neighborhood.pose_for(center), TargetRule::Recenter, tol);
    }

    if let Some(pos) = snapshot.selected.as_ref().and_then(|c| c.valid_position()) {
        return TargetSelection::new(t.hero.pose_for(pos), TargetRule::Selected, tol);
    }

    if let Some(origin) = snapshot.valid_origin() {
        return TargetSelection::new(t.neighborhood.pose_for(origin), TargetRule::Origin, tol);
    }

    // Only the top-ranked result is considered; a later candidate never stands in for it.
    if let Some(pos) = snapshot.candidates.first().and_then(|c| c.valid_position()) {
        return TargetSelection::new(t.hero.pose_for(pos), TargetRule::TopCandidate, tol);
    }

    if let Some(bounds) = snapshot.bounding_viewport.and_then(|r| r.validate().ok()) {
        return TargetSelection::new(
            CameraPose::region(bounds),
            TargetRule::BoundingViewport,
            tol,
        );
    }

    TargetSelection::new(t.overview.pose(), TargetRule::Overview, tol)
}

#[cfg(test)]
mod tests {
    use super::{TargetRule, resolve_target};
    use crate::camera::{CameraPose, Orientation};
    use crate::config::ViewportConfig;
    use crate::state::{AppSnapshot, Candidate};
    use foundation::{GeoPoint, GeoRect};
    use pretty_assertions::assert_eq;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn origin() -> GeoPoint {
        GeoPoint::new(40.73, -73.995)
    }

    fn candidates() -> Vec<Candidate> {
        vec![
            Candidate::new(1, GeoPoint::new(40.731, -73.994)),
            Candidate::new(2, GeoPoint::new(40.735, -73.990)),
            Candidate::new(3, GeoPoint::new(40.728, -74.001)),
        ]
    }

    fn point_of(pose: CameraPose) -> (GeoPoint, Orientation) {
        match pose {
            CameraPose::Point {
                position,
                orientation,
            } => (position, orientation),
            CameraPose::Region { .. } => panic!("expected a point pose"),
        }
    }

    #[test]
    fn empty_state_resolves_to_overview() {
        let cfg = ViewportConfig::default();
        let sel = resolve_target(&AppSnapshot::default(), 0, &cfg);
        assert_eq!(sel.rule, TargetRule::Overview);
        assert_eq!(sel.pose, cfg.targeting.overview.pose());

        let (pos, o) = point_of(sel.pose);
        assert_eq!(pos, GeoPoint::new(40.73, -73.995).with_altitude(1200.0));
        assert_close(o.heading, 30f64.to_radians(), 1e-15);
        assert_close(o.pitch, (-25f64).to_radians(), 1e-15);
    }

    #[test]
    fn origin_wins_over_top_candidate() {
        let cfg = ViewportConfig::default();
        let snap = AppSnapshot {
            origin: Some(origin()),
            candidates: candidates(),
            ..AppSnapshot::default()
        };
        let sel = resolve_target(&snap, 0, &cfg);
        assert_eq!(sel.rule, TargetRule::Origin);

        let (pos, o) = point_of(sel.pose);
        assert_close(pos.latitude, 40.724, 1e-12);
        assert_close(pos.longitude, -73.995, 1e-12);
        assert_eq!(pos.altitude, 400.0);
        assert_close(o.pitch, (-35f64).to_radians(), 1e-15);
        assert_eq!(o.heading, 0.0);
    }

    #[test]
    fn selection_wins_over_origin() {
        let cfg = ViewportConfig::default();
        let snap = AppSnapshot {
            origin: Some(origin()),
            candidates: candidates(),
            selected: Some(candidates()[1].clone()),
            ..AppSnapshot::default()
        };
        let sel = resolve_target(&snap, 0, &cfg);
        assert_eq!(sel.rule, TargetRule::Selected);

        let (pos, o) = point_of(sel.pose);
        assert_close(pos.latitude, 40.734, 1e-12);
        assert_close(pos.longitude, -73.990, 1e-12);
        assert_eq!(pos.altitude, 40.0);
        assert_close(o.pitch, (-15f64).to_radians(), 1e-15);
    }

    #[test]
    fn recenter_beats_everything() {
        let cfg = ViewportConfig::default();
        let snap = AppSnapshot {
            origin: Some(origin()),
            candidates: candidates(),
            selected: Some(candidates()[2].clone()),
            bounding_viewport: Some(GeoRect::new(
                GeoPoint::new(40.70, -74.02),
                GeoPoint::new(40.76, -73.96),
            )),
            recenter_counter: 1,
            ..AppSnapshot::default()
        };
        let sel = resolve_target(&snap, 0, &cfg);
        assert_eq!(sel.rule, TargetRule::Recenter);
        assert_eq!(sel.pose, cfg.targeting.neighborhood.pose_for(origin()));

        // Once observed, the same counter no longer forces a recenter.
        let sel = resolve_target(&snap, 1, &cfg);
        assert_eq!(sel.rule, TargetRule::Selected);
    }

    #[test]
    fn recenter_without_origin_uses_fallback() {
        let cfg = ViewportConfig::default();
        let snap = AppSnapshot {
            origin: Some(GeoPoint::new(f64::NAN, 0.0)),
            recenter_counter: 3,
            ..AppSnapshot::default()
        };
        let sel = resolve_target(&snap, 2, &cfg);
        assert_eq!(sel.rule, TargetRule::Recenter);
        assert_eq!(
            sel.pose,
            cfg.targeting
                .neighborhood
                .pose_for(cfg.targeting.fallback_location)
        );
    }

    #[test]
    fn invalid_selection_falls_through() {
        let cfg = ViewportConfig::default();
        let snap = AppSnapshot {
            selected: Some(Candidate::without_position(9)),
            candidates: candidates(),
            ..AppSnapshot::default()
        };
        let sel = resolve_target(&snap, 0, &cfg);
        assert_eq!(sel.rule, TargetRule::TopCandidate);
        let (pos, _) = point_of(sel.pose);
        assert_close(pos.latitude, 40.730, 1e-12);
        assert_close(pos.longitude, -73.994, 1e-12);
    }

    #[test]
    fn invalid_top_candidate_is_not_replaced_by_the_next() {
        let cfg = ViewportConfig::default();
        let mut list = candidates();
        list[0] = Candidate::without_position(1);
        let rect = GeoRect::new(GeoPoint::new(40.70, -74.02), GeoPoint::new(40.76, -73.96));
        let snap = AppSnapshot {
            candidates: list,
            bounding_viewport: Some(rect),
            ..AppSnapshot::default()
        };
        let sel = resolve_target(&snap, 0, &cfg);
        assert_eq!(sel.rule, TargetRule::BoundingViewport);
        assert_eq!(sel.pose, CameraPose::region(rect));
    }

    #[test]
    fn invalid_bounding_viewport_falls_back_to_overview() {
        let cfg = ViewportConfig::default();
        let snap = AppSnapshot {
            bounding_viewport: Some(GeoRect::new(
                GeoPoint::new(-100.0, 0.0),
                GeoPoint::new(10.0, 10.0),
            )),
            ..AppSnapshot::default()
        };
        assert_eq!(resolve_target(&snap, 0, &cfg).rule, TargetRule::Overview);
    }

    #[test]
    fn resolution_is_deterministic_and_structural() {
        let cfg = ViewportConfig::default();
        let snap = AppSnapshot {
            origin: Some(origin()),
            candidates: candidates(),
            ..AppSnapshot::default()
        };
        let a = resolve_target(&snap, 0, &cfg);
        let b = resolve_target(&snap.clone(), 0, &cfg);
        assert_eq!(a, b);
        assert!(a.same_target(&b));
    }

    #[test]
    fn float_noise_does_not_change_the_key() {
        let cfg = ViewportConfig::default();
        let a = AppSnapshot {
            origin: Some(GeoPoint::new(40.73, -73.995)),
            ..AppSnapshot::default()
        };
        let b = AppSnapshot {
            origin: Some(GeoPoint::new(40.73 + 1e-12, -73.995 - 1e-12)),
            ..AppSnapshot::default()
        };
        let ka = resolve_target(&a, 0, &cfg);
        let kb = resolve_target(&b, 0, &cfg);
        assert_ne!(ka.pose, kb.pose);
        assert!(ka.same_target(&kb));
    }

    #[test]
    fn nearby_poses_match_across_rounding_boundaries() {
        let cfg = ViewportConfig::default();
        let at = |lat: f64| AppSnapshot {
            origin: Some(GeoPoint::new(lat, -73.995)),
            ..AppSnapshot::default()
        };
        let below = resolve_target(&at(40.736_000_05 - 1e-13), 0, &cfg);
        let above = resolve_target(&at(40.736_000_05 + 1e-13), 0, &cfg);
        assert!(below.same_target(&above));

        let moved = resolve_target(&at(40.736_001), 0, &cfg);
        assert!(!below.same_target(&moved));
    }

    #[test]
    fn point_and_region_keys_never_match() {
        let cfg = ViewportConfig::default();
        let rect = GeoRect::new(GeoPoint::new(40.70, -74.02), GeoPoint::new(40.76, -73.96));
        let region = resolve_target(
            &AppSnapshot {
                bounding_viewport: Some(rect),
                ..AppSnapshot::default()
            },
            0,
            &cfg,
        );
        let overview = resolve_target(&AppSnapshot::default(), 0, &cfg);
        assert!(!region.same_target(&overview));
        assert!(region.same_target(&region));
    }

    #[test]
    fn recenter_and_origin_rules_share_a_key() {
        let cfg = ViewportConfig::default();
        let snap = AppSnapshot {
            origin: Some(origin()),
            recenter_counter: 1,
            ..AppSnapshot::default()
        };
        let recenter = resolve_target(&snap, 0, &cfg);
        let plain = resolve_target(&snap, 1, &cfg);
        assert_eq!(recenter.rule, TargetRule::Recenter);
        assert_eq!(plain.rule, TargetRule::Origin);
        assert!(recenter.same_target(&plain));
    }
}
