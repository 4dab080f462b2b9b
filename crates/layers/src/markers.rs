//! Point markers for the origin and the candidates.

use foundation::math::Vec3;
use foundation::{CandidateId, GeoPoint};
use scene::AppSnapshot;
use scene::projection::to_world;

use crate::layer::{Layer, LayerId};
use crate::symbology::{Color, MarkerStyle};

/// Origin marker: rose, larger than candidates.
const ORIGIN_ROSE: Color = Color([244.0 / 255.0, 63.0 / 255.0, 94.0 / 255.0, 1.0]);

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MarkerKind {
    Origin,
    /// Drawn around the origin while there are no candidates yet.
    OriginHalo,
    Candidate(CandidateId),
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Marker {
    pub kind: MarkerKind,
    pub position: GeoPoint,
    pub world: Vec3,
    pub style: MarkerStyle,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct MarkerLayerSnapshot {
    pub markers: Vec<Marker>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct MarkerLayer {
    id: LayerId,
    pub origin: MarkerStyle,
    pub origin_halo: MarkerStyle,
    pub candidate: MarkerStyle,
    pub origin_altitude_m: f64,
    pub candidate_altitude_m: f64,
}

impl MarkerLayer {
    pub fn new(id: u64) -> Self {
        Self {
            id: LayerId(id),
            origin: MarkerStyle::new(ORIGIN_ROSE, 20.0, Color::WHITE, 3.0),
            origin_halo: MarkerStyle::new(Color::WHITE, 12.0, Color::CYAN, 2.0),
            candidate: MarkerStyle::new(Color::CYAN, 14.0, Color::WHITE, 3.0),
            origin_altitude_m: 0.0,
            candidate_altitude_m: 20.0,
        }
    }

    /// Candidates in rank order, then the origin and its halo.
    pub fn extract(&self, snapshot: &AppSnapshot) -> MarkerLayerSnapshot {
        let mut out = MarkerLayerSnapshot::default();
        if !self.is_shown(snapshot) {
            return out;
        }

        for c in &snapshot.candidates {
            if let Some(p) = c.valid_position() {
                let kind = MarkerKind::Candidate(c.id);
                self.push(&mut out, kind, p, self.candidate_altitude_m, self.candidate);
            }
        }
        if let Some(origin) = snapshot.valid_origin() {
            let (alt, style) = (self.origin_altitude_m, self.origin);
            self.push(&mut out, MarkerKind::Origin, origin, alt, style);
            if snapshot.candidates.is_empty() {
                self.push(
                    &mut out,
                    MarkerKind::OriginHalo,
                    origin,
                    self.candidate_altitude_m,
                    self.origin_halo,
                );
            }
        }
        out
    }

    fn push(
        &self,
        out: &mut MarkerLayerSnapshot,
        kind: MarkerKind,
        position: GeoPoint,
        altitude_m: f64,
        style: MarkerStyle,
    ) {
        let Ok(world) = to_world(position, altitude_m) else {
            return;
        };
        out.markers.push(Marker {
            kind,
            position: position.with_altitude(altitude_m),
            world,
            style,
        });
    }
}

impl Layer for MarkerLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}
