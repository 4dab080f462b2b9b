//! Zoom and compass buttons, driven through an injected scene handle.

use tracing::debug;

use crate::camera::{CameraPose, Orientation};
use crate::config::FlightConfig;
use crate::handle::SceneHandle;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ControlOutcome {
    Applied,
    SceneUnavailable,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneControls {
    zoom_step_m: f64,
    compass_reset_duration_s: f64,
}

impl SceneControls {
    pub fn new(config: &FlightConfig) -> Self {
        Self {
            zoom_step_m: config.zoom_step_m,
            compass_reset_duration_s: config.compass_reset_duration_s,
        }
    }

    pub fn zoom_in(&self, scene: &mut dyn SceneHandle) -> ControlOutcome {
        self.zoom(scene, self.zoom_step_m)
    }

    pub fn zoom_out(&self, scene: &mut dyn SceneHandle) -> ControlOutcome {
        self.zoom(scene, -self.zoom_step_m)
    }

    fn zoom(&self, scene: &mut dyn SceneHandle, meters: f64) -> ControlOutcome {
        if !scene.is_active() {
            return ControlOutcome::SceneUnavailable;
        }
        scene.move_forward(meters);
        debug!(meters, "zoom");
        ControlOutcome::Applied
    }

    /// Turns the camera back to north in place, keeping its pitch and levelling roll.
    pub fn reset_compass(&self, scene: &mut dyn SceneHandle) -> ControlOutcome {
        let Some(camera) = scene.camera() else {
            return ControlOutcome::SceneUnavailable;
        };
        let pitch = camera.orientation().pitch;
        let pose = CameraPose::point(camera.position(), Orientation::new(0.0, pitch, 0.0));
        scene.fly_to(&pose, self.compass_reset_duration_s);
        debug!(pitch, "compass reset");
        ControlOutcome::Applied
    }
}

#[cfg(test)]
mod tests {
    use super::{ControlOutcome, SceneControls};
    use crate::camera::Orientation;
    use crate::config::FlightConfig;
    use crate::handle::SceneHandle;
    use crate::headless::HeadlessScene;
    use foundation::{GeoPoint, Time};
    use runtime::Frame;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn looking_east() -> HeadlessScene {
        HeadlessScene::looking_from(
            GeoPoint::new(40.73, -73.995).with_altitude(1000.0),
            Orientation::from_degrees(90.0, -30.0, 5.0),
            800.0,
            600.0,
        )
    }

    #[test]
    fn zoom_moves_along_view_direction() {
        let controls = SceneControls::new(&FlightConfig::default());
        let mut scene = looking_east();

        assert_eq!(controls.zoom_in(&mut scene), ControlOutcome::Applied);
        let alt = scene.camera().expect("camera").position().altitude;
        assert_close(alt, 1000.0 - 500.0 * 0.5, 1.0);

        controls.zoom_out(&mut scene);
        let alt = scene.camera().expect("camera").position().altitude;
        assert_close(alt, 1000.0, 1e-3);
    }

    #[test]
    fn reset_compass_faces_north_in_place() {
        let controls = SceneControls::new(&FlightConfig::default());
        let mut scene = looking_east();

        assert_eq!(controls.reset_compass(&mut scene), ControlOutcome::Applied);
        scene.tick(Frame::at(1, Time(1.0), 1.0));

        let cam = scene.camera().expect("camera");
        let o = cam.orientation();
        assert_close(o.heading.sin(), 0.0, 1e-6);
        assert_close(o.heading.cos(), 1.0, 1e-6);
        assert_close(o.pitch, (-30f64).to_radians(), 1e-6);
        assert_close(o.roll, 0.0, 1e-6);
        assert_close(cam.position().latitude, 40.73, 1e-7);
    }

    #[test]
    fn controls_are_noops_without_a_scene() {
        let controls = SceneControls::new(&FlightConfig::default());
        let mut scene = looking_east();
        scene.set_active(false);
        assert_eq!(controls.zoom_in(&mut scene), ControlOutcome::SceneUnavailable);
        assert_eq!(controls.reset_compass(&mut scene), ControlOutcome::SceneUnavailable);
        assert_eq!(scene.flights_started(), 0);
    }
}
