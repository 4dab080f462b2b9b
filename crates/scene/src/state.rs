//! Read-only application-state snapshot the viewport reacts to.

use foundation::{CandidateId, GeoPoint, GeoRect};
use serde::{Deserialize, Serialize};

/// A ranked point of interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: CandidateId,
    #[serde(default)]
    pub name: String,
    /// Missing when the upstream search result had no coordinates.
    #[serde(default)]
    pub position: Option<GeoPoint>,
    #[serde(default)]
    pub routing_path: Vec<GeoPoint>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub description: String,
}

impl Candidate {
    pub fn new(id: u64, position: GeoPoint) -> Self {
        Self {
            id: CandidateId::new(id),
            name: String::new(),
            position: Some(position),
            routing_path: Vec::new(),
            rating: None,
            description: String::new(),
        }
    }

    pub fn without_position(id: u64) -> Self {
        Self {
            position: None,
            ..Self::new(id, GeoPoint::new(0.0, 0.0))
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_route(mut self, path: Vec<GeoPoint>) -> Self {
        self.routing_path = path;
        self
    }

    /// The position, if present and inside the valid lat/lon ranges.
    pub fn valid_position(&self) -> Option<GeoPoint> {
        self.position.and_then(|p| p.validate().ok())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSnapshot {
    pub origin: Option<GeoPoint>,
    pub selected: Option<Candidate>,
    pub candidates: Vec<Candidate>,
    pub bounding_viewport: Option<GeoRect>,
    /// Bumped by the "recenter" control; only increases matter.
    pub recenter_counter: u64,
    pub weather: String,
    pub layers_visible: bool,
}

impl Default for AppSnapshot {
    fn default() -> Self {
        Self {
            origin: None,
            selected: None,
            candidates: Vec::new(),
            bounding_viewport: None,
            recenter_counter: 0,
            weather: "clear".to_string(),
            layers_visible: true,
        }
    }
}

impl AppSnapshot {
    pub fn valid_origin(&self) -> Option<GeoPoint> {
        self.origin.and_then(|p| p.validate().ok())
    }
}
