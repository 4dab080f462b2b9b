//! Geodetic <-> world <-> screen conversions.
//!
//! World space is ECEF in meters. Screen space is pixels with the origin at the
//! top-left of the viewport and `y` growing downwards.

use foundation::math::{Ecef, Vec2, Vec3};
use foundation::{CoordinateError, GeoPoint};
use serde::Serialize;

use crate::camera::CameraState;

/// A point in ECEF world space (meters).
pub type WorldPoint = Vec3;

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ScreenProjection {
    Visible(ScreenPoint),
    /// Behind the camera, or outside the viewport.
    NotVisible,
}

impl ScreenProjection {
    pub fn visible(self) -> Option<ScreenPoint> {
        match self {
            ScreenProjection::Visible(p) => Some(p),
            ScreenProjection::NotVisible => None,
        }
    }
}

/// Converts a lat/lon to world space at `altitude_m` above the ellipsoid.
///
/// The point's own altitude is ignored in favour of `altitude_m`.
pub fn to_world(point: GeoPoint, altitude_m: f64) -> Result<WorldPoint, CoordinateError> {
    let point = point.with_altitude(altitude_m).validate()?;
    Ok(point.to_ecef().as_vec3())
}

pub fn from_world(world: WorldPoint) -> GeoPoint {
    GeoPoint::from_ecef(Ecef::from_vec3(world))
}

/// Projects a world point through `camera` onto the viewport.
///
/// Runs on every anchor every frame, so it stays allocation-free.
pub fn to_screen(world: WorldPoint, camera: &CameraState) -> ScreenProjection {
    let rel = world - camera.eye;
    let depth = rel.dot(camera.forward);
    if !depth.is_finite() || depth <= camera.near_m {
        return ScreenProjection::NotVisible;
    }

    let focal = 1.0 / (0.5 * camera.fov_y_rad).tan();
    let ndc_x = rel.dot(camera.right) * focal / (camera.aspect() * depth);
    let ndc_y = rel.dot(camera.up) * focal / depth;

    let vp = camera.viewport;
    let screen = Vec2::new(
        vp.min[0] + (ndc_x * 0.5 + 0.5) * vp.width(),
        vp.min[1] + (1.0 - (ndc_y * 0.5 + 0.5)) * vp.height(),
    );
    if !screen.is_finite() || !vp.contains(screen) {
        return ScreenProjection::NotVisible;
    }
    ScreenProjection::Visible(ScreenPoint::new(screen.x, screen.y))
}

#[cfg(test)]
mod tests {
    use super::{ScreenProjection, from_world, to_screen, to_world};
    use crate::camera::{CameraState, Orientation};
    use foundation::bounds::Aabb2;
    use foundation::{CoordinateError, GeoPoint};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn camera_over_manhattan() -> CameraState {
        CameraState::looking_from(
            GeoPoint::new(40.724, -73.995).with_altitude(400.0),
            Orientation::from_degrees(0.0, -35.0, 0.0),
            Aabb2::from_size(1280.0, 720.0),
        )
    }

    #[test]
    fn to_world_rejects_invalid_coordinates() {
        assert_eq!(
            to_world(GeoPoint::new(95.0, 0.0), 0.0),
            Err(CoordinateError::LatitudeOutOfRange(95.0))
        );
        assert!(to_world(GeoPoint::new(40.73, -73.995), 20.0).is_ok());
    }

    #[test]
    fn world_round_trip_uses_explicit_altitude() {
        let p = GeoPoint::new(40.731, -73.994).with_altitude(999.0);
        let back = from_world(to_world(p, 20.0).unwrap());
        assert_close(back.latitude, 40.731, 1e-9);
        assert_close(back.longitude, -73.994, 1e-9);
        assert_close(back.altitude, 20.0, 1e-6);
    }

    #[test]
    fn point_along_view_axis_lands_at_center() {
        let cam = camera_over_manhattan();
        let ahead = cam.eye + cam.forward.scale(250.0);
        let Some(p) = to_screen(ahead, &cam).visible() else {
            panic!("point ahead of the camera must be visible");
        };
        assert_close(p.x, 640.0, 1e-6);
        assert_close(p.y, 360.0, 1e-6);
    }

    #[test]
    fn point_behind_camera_is_not_visible() {
        let cam = camera_over_manhattan();
        let behind = cam.eye - cam.forward.scale(250.0);
        assert_eq!(to_screen(behind, &cam), ScreenProjection::NotVisible);
        assert_eq!(to_screen(cam.eye, &cam), ScreenProjection::NotVisible);
    }

    #[test]
    fn point_outside_frustum_is_not_visible() {
        let cam = camera_over_manhattan();
        let far_right = cam.eye + cam.forward.scale(10.0) + cam.right.scale(1_000.0);
        assert_eq!(to_screen(far_right, &cam), ScreenProjection::NotVisible);
    }

    #[test]
    fn up_and_right_map_to_screen_axes() {
        let cam = camera_over_manhattan();
        let base = cam.eye + cam.forward.scale(100.0);
        let r = to_screen(base + cam.right.scale(5.0), &cam).visible().unwrap();
        let u = to_screen(base + cam.up.scale(5.0), &cam).visible().unwrap();
        assert!(r.x > 640.0);
        assert_close(r.y, 360.0, 1e-6);
        assert!(u.y < 360.0);
        assert_close(u.x, 640.0, 1e-6);
    }

    #[test]
    fn target_south_offset_keeps_target_on_screen() {
        // Neighborhood framing: camera 0.006 deg south of the target, pitched down 35 deg.
        let cam = camera_over_manhattan();
        let target = to_world(GeoPoint::new(40.73, -73.995), 0.0).unwrap();
        let p = to_screen(target, &cam).visible().unwrap();
        assert_close(p.x, 640.0, 1.0);
    }
}
