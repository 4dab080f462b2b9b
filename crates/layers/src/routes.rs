//! Routing polylines, one per candidate with a usable path.

use foundation::CandidateId;
use foundation::math::Vec3;
use scene::AppSnapshot;
use scene::projection::to_world;

use crate::layer::{Layer, LayerId};
use crate::symbology::LineStyle;

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub candidate: CandidateId,
    pub vertices: Vec<Vec3>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RouteLayerSnapshot {
    pub style: LineStyle,
    pub routes: Vec<Route>,
}

/// One polyline per candidate, from its routing path.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RouteLayer {
    id: LayerId,
    pub style: LineStyle,
}

impl RouteLayer {
    pub fn new(id: u64) -> Self {
        Self {
            id: LayerId(id),
            style: LineStyle::default(),
        }
    }

    pub fn extract(&self, snapshot: &AppSnapshot) -> RouteLayerSnapshot {
        let mut out = RouteLayerSnapshot {
            style: self.style,
            routes: Vec::new(),
        };
        if !self.is_shown(snapshot) {
            return out;
        }

        for c in &snapshot.candidates {
            // Routes hang off their candidate; no position, no route.
            if c.valid_position().is_none() {
                continue;
            }
            let vertices: Vec<Vec3> = c
                .routing_path
                .iter()
                .filter_map(|p| to_world(*p, 0.0).ok())
                .collect();
            if vertices.len() >= 2 {
                out.routes.push(Route {
                    candidate: c.id,
                    vertices,
                });
            }
        }
        out
    }
}

impl Layer for RouteLayer {
    fn id(&self) -> LayerId {
        self.id
    }
}
