//! Viewport tuning. Defaults reproduce the shipped viewer.

use foundation::GeoPoint;
use runtime::DEFAULT_EVENT_LIMIT;
use serde::{Deserialize, Serialize};

use crate::camera::{CameraPose, Orientation};

/// A camera framing relative to a ground target.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Framing {
    pub altitude_m: f64,
    /// The camera sits this many degrees of latitude south of the target so
    /// the tilted view has the target ahead of it.
    pub south_offset_deg: f64,
    pub heading_deg: f64,
    pub pitch_deg: f64,
}

impl Framing {
    /// Wide view of an area around an origin.
    pub const NEIGHBORHOOD: Framing = Framing {
        altitude_m: 400.0,
        south_offset_deg: 0.006,
        heading_deg: 0.0,
        pitch_deg: -35.0,
    };

    /// Close, low view featuring a single point of interest.
    pub const HERO: Framing = Framing {
        altitude_m: 40.0,
        south_offset_deg: 0.001,
        heading_deg: 0.0,
        pitch_deg: -15.0,
    };

    pub fn orientation(&self) -> Orientation {
        Orientation::from_degrees(self.heading_deg, self.pitch_deg, 0.0)
    }

    pub fn pose_for(&self, target: GeoPoint) -> CameraPose {
        CameraPose::point(
            target
                .offset_south(self.south_offset_deg)
                .with_altitude(self.altitude_m),
            self.orientation(),
        )
    }
}

/// Fixed idle-state pose.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overview {
    pub location: GeoPoint,
    pub altitude_m: f64,
    pub heading_deg: f64,
    pub pitch_deg: f64,
}

impl Overview {
    pub fn pose(&self) -> CameraPose {
        CameraPose::point(
            self.location.with_altitude(self.altitude_m),
            Orientation::from_degrees(self.heading_deg, self.pitch_deg, 0.0),
        )
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    /// Used by an explicit recenter when no origin is known.
    pub fallback_location: GeoPoint,
    pub neighborhood: Framing,
    pub hero: Framing,
    pub overview: Overview,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        let nyc = GeoPoint::new(40.7300, -73.9950);
        Self {
            fallback_location: nyc,
            neighborhood: Framing::NEIGHBORHOOD,
            hero: Framing::HERO,
            overview: Overview {
                location: nyc,
                altitude_m: 1200.0,
                heading_deg: 30.0,
                pitch_deg: -25.0,
            },
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub duration_s: f64,
    pub compass_reset_duration_s: f64,
    pub zoom_step_m: f64,
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            duration_s: 3.5,
            compass_reset_duration_s: 1.0,
            zoom_step_m: 500.0,
        }
    }
}

/// Per-component tolerances used when deciding whether two targets are the same.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightKeyConfig {
    pub position_tolerance_deg: f64,
    pub altitude_tolerance_m: f64,
    pub angle_tolerance_rad: f64,
}

impl Default for FlightKeyConfig {
    fn default() -> Self {
        Self {
            position_tolerance_deg: 1e-7,
            altitude_tolerance_m: 1e-3,
            angle_tolerance_rad: 1e-6,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Altitude of candidate anchors above the ellipsoid.
    pub anchor_altitude_m: f64,
    pub origin_altitude_m: f64,
    /// Gap between the projected point and the overlay's bottom edge.
    pub lift_px: f64,
    pub collapsed_width_px: f64,
    pub expanded_width_px: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            anchor_altitude_m: 20.0,
            origin_altitude_m: 0.0,
            lift_px: 40.0,
            collapsed_width_px: 200.0,
            expanded_width_px: 320.0,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    /// Events buffered before the oldest are dropped.
    pub limit: usize,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_EVENT_LIMIT,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub targeting: TargetingConfig,
    pub flight: FlightConfig,
    pub flight_key: FlightKeyConfig,
    pub overlay: OverlayConfig,
    pub events: EventConfig,
}
