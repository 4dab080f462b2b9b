//! Camera poses and the pinhole camera built from them in the local ENU frame.

use foundation::bounds::Aabb2;
use foundation::math::{Enu, Vec3, ecef_direction_to_enu, enu_direction_to_ecef};
use foundation::{GeoPoint, GeoRect};
use serde::{Deserialize, Serialize};

/// Camera orientation in radians.
///
/// - `heading`: clockwise from true north.
/// - `pitch`: above the local horizon (negative looks down).
/// - `roll`: about the view direction.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Orientation {
    pub const fn new(heading: f64, pitch: f64, roll: f64) -> Self {
        Self {
            heading,
            pitch,
            roll,
        }
    }

    pub fn from_degrees(heading_deg: f64, pitch_deg: f64, roll_deg: f64) -> Self {
        Self::new(
            heading_deg.to_radians(),
            pitch_deg.to_radians(),
            roll_deg.to_radians(),
        )
    }
}

/// Where the camera should end up.
///
/// A `Region` carries no orientation; the runtime frames it with its own default.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CameraPose {
    Point {
        position: GeoPoint,
        orientation: Orientation,
    },
    Region {
        bounds: GeoRect,
    },
}

impl CameraPose {
    pub fn point(position: GeoPoint, orientation: Orientation) -> Self {
        CameraPose::Point {
            position,
            orientation,
        }
    }

    pub fn region(bounds: GeoRect) -> Self {
        CameraPose::Region { bounds }
    }

    /// Ground point the pose is about: the camera position, or the region center.
    pub fn focus(&self) -> GeoPoint {
        match self {
            CameraPose::Point { position, .. } => *position,
            CameraPose::Region { bounds } => bounds.center(),
        }
    }

    pub fn orientation(&self) -> Option<Orientation> {
        match self {
            CameraPose::Point { orientation, .. } => Some(*orientation),
            CameraPose::Region { .. } => None,
        }
    }
}

/// Live pinhole camera in ECEF space.
///
/// `forward`, `right` and `up` form an orthonormal right-handed basis
/// (`right x forward = up`).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraState {
    pub eye: Vec3,
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
    pub fov_y_rad: f64,
    pub near_m: f64,
    pub viewport: Aabb2,
}

/// Default vertical field of view, matching the globe viewer.
pub const DEFAULT_FOV_Y_DEG: f64 = 45.0;
/// Points closer than this along the view axis are treated as behind the camera.
pub const DEFAULT_NEAR_M: f64 = 0.1;

impl CameraState {
    pub fn looking_from(position: GeoPoint, orientation: Orientation, viewport: Aabb2) -> Self {
        let origin = position.to_geodetic();
        let (sin_h, cos_h) = orientation.heading.sin_cos();
        let (sin_p, cos_p) = orientation.pitch.sin_cos();
        let (sin_r, cos_r) = orientation.roll.sin_cos();

        let forward = Enu::new(sin_h * cos_p, cos_h * cos_p, sin_p);
        let level_right = Enu::new(cos_h, -sin_h, 0.0);
        // right x forward, expanded in ENU components.
        let level_up = Enu::new(
            level_right.north * forward.up - level_right.up * forward.north,
            level_right.up * forward.east - level_right.east * forward.up,
            level_right.east * forward.north - level_right.north * forward.east,
        );

        let forward = enu_direction_to_ecef(forward, origin);
        let level_right = enu_direction_to_ecef(level_right, origin);
        let level_up = enu_direction_to_ecef(level_up, origin);

        let right = level_right.scale(cos_r) + level_up.scale(sin_r);
        let up = level_up.scale(cos_r) - level_right.scale(sin_r);

        Self {
            eye: position.to_ecef().as_vec3(),
            forward,
            right,
            up,
            fov_y_rad: DEFAULT_FOV_Y_DEG.to_radians(),
            near_m: DEFAULT_NEAR_M,
            viewport,
        }
    }

    pub fn aspect(&self) -> f64 {
        let h = self.viewport.height();
        if h <= 0.0 {
            return 1.0;
        }
        (self.viewport.width() / h).max(1e-6)
    }

    pub fn position(&self) -> GeoPoint {
        GeoPoint::from_ecef(foundation::math::Ecef::from_vec3(self.eye))
    }

    /// Recovers heading/pitch/roll relative to the local horizon at the eye.
    pub fn orientation(&self) -> Orientation {
        let origin = self.position().to_geodetic();
        let f = ecef_direction_to_enu(self.forward, origin);
        let pitch = f.up.clamp(-1.0, 1.0).asin();

        let heading = if (f.east * f.east + f.north * f.north) > 1e-12 {
            f.east.atan2(f.north)
        } else {
            // Looking straight up or down: the top of the screen points along the heading.
            let u = ecef_direction_to_enu(self.up, origin);
            let h = u.east.atan2(u.north);
            if f.up > 0.0 { h + std::f64::consts::PI } else { h }
        };

        let level = Self::looking_from(
            self.position(),
            Orientation::new(heading, pitch, 0.0),
            self.viewport,
        );
        let roll = self.right.dot(level.up).atan2(self.right.dot(level.right));

        Orientation::new(wrap_two_pi(heading), pitch, roll)
    }

    /// Same camera moved `meters` along the view direction (negative backs away).
    pub fn moved_forward(&self, meters: f64) -> Self {
        Self {
            eye: self.eye + self.forward.scale(meters),
            ..*self
        }
    }
}

pub(crate) fn wrap_two_pi(mut a: f64) -> f64 {
    let tau = std::f64::consts::TAU;
    a %= tau;
    if a < 0.0 {
        a += tau;
    }
    a
}
