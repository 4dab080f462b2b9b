//! In-process scene runtime without a renderer.
//!
//! Holds a pinhole camera and animates flights linearly in time as frames are
//! ticked. Used by the replay tool and by tests.

use foundation::bounds::Aabb2;
use foundation::{GeoPoint, Time, TimeSpan};
use runtime::Frame;

use crate::atmosphere::AtmosphereParams;
use crate::camera::{CameraPose, CameraState, Orientation, wrap_two_pi};
use crate::config::TargetingConfig;
use crate::handle::SceneHandle;

/// Regions are framed from this multiple of their diagonal, looking straight down.
const REGION_ALTITUDE_FACTOR: f64 = 1.2;
const MIN_REGION_ALTITUDE_M: f64 = 100.0;

#[derive(Debug, Copy, Clone, PartialEq)]
struct Pose {
    position: GeoPoint,
    orientation: Orientation,
}

#[derive(Debug, Copy, Clone, PartialEq)]
struct Transition {
    from: Pose,
    to: Pose,
    span: TimeSpan,
}

#[derive(Debug, Clone)]
pub struct HeadlessScene {
    active: bool,
    camera: CameraState,
    transition: Option<Transition>,
    now: Time,
    atmosphere: AtmosphereParams,
    atmosphere_writes: u64,
    flights_started: u64,
}

impl HeadlessScene {
    /// A scene whose camera starts at the default overview pose.
    pub fn new(width_px: f64, height_px: f64) -> Self {
        let overview = TargetingConfig::default().overview;
        Self::looking_from(
            overview.location.with_altitude(overview.altitude_m),
            Orientation::from_degrees(overview.heading_deg, overview.pitch_deg, 0.0),
            width_px,
            height_px,
        )
    }

    pub fn looking_from(
        position: GeoPoint,
        orientation: Orientation,
        width_px: f64,
        height_px: f64,
    ) -> Self {
        Self {
            active: true,
            camera: CameraState::looking_from(
                position,
                orientation,
                Aabb2::from_size(width_px, height_px),
            ),
            transition: None,
            now: Time(0.0),
            atmosphere: AtmosphereParams::default(),
            atmosphere_writes: 0,
            flights_started: 0,
        }
    }

    /// Simulates scene creation and teardown.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active {
            self.transition = None;
        }
    }

    pub fn set_viewport(&mut self, width_px: f64, height_px: f64) {
        self.camera.viewport = Aabb2::from_size(width_px, height_px);
    }

    /// Advances the clock to the frame's time and steps any flight in progress.
    pub fn tick(&mut self, frame: Frame) {
        self.now = frame.time;
        let Some(t) = self.transition else {
            return;
        };
        let progress = t.span.progress(self.now);
        let pose = interpolate(&t.from, &t.to, progress);
        self.camera =
            CameraState::looking_from(pose.position, pose.orientation, self.camera.viewport);
        if progress >= 1.0 {
            self.transition = None;
        }
    }

    pub fn now(&self) -> Time {
        self.now
    }

    pub fn is_flying(&self) -> bool {
        self.transition.is_some()
    }

    /// Destination of the flight in progress.
    pub fn flight_target(&self) -> Option<(GeoPoint, Orientation)> {
        self.transition.map(|t| (t.to.position, t.to.orientation))
    }

    pub fn flights_started(&self) -> u64 {
        self.flights_started
    }

    pub fn atmosphere(&self) -> AtmosphereParams {
        self.atmosphere
    }

    pub fn atmosphere_writes(&self) -> u64 {
        self.atmosphere_writes
    }

    fn current_pose(&self) -> Pose {
        Pose {
            position: self.camera.position(),
            orientation: self.camera.orientation(),
        }
    }
}

impl SceneHandle for HeadlessScene {
    fn is_active(&self) -> bool {
        self.active
    }

    fn camera(&self) -> Option<CameraState> {
        self.active.then_some(self.camera)
    }

    fn fly_to(&mut self, pose: &CameraPose, duration_s: f64) {
        if !self.active {
            return;
        }
        let to = destination(pose);
        self.flights_started += 1;
        // Last writer wins: the new flight starts from wherever the camera is now.
        self.transition = Some(Transition {
            from: self.current_pose(),
            to,
            span: TimeSpan::starting_at(self.now, duration_s),
        });
        if duration_s <= 0.0 {
            self.tick(Frame::at(0, self.now, 0.0));
        }
    }

    fn set_atmosphere(&mut self, params: &AtmosphereParams) {
        if !self.active {
            return;
        }
        self.atmosphere = *params;
        self.atmosphere_writes += 1;
    }

    fn move_forward(&mut self, meters: f64) {
        if !self.active {
            return;
        }
        self.transition = None;
        self.camera = self.camera.moved_forward(meters);
    }
}

fn destination(pose: &CameraPose) -> Pose {
    match *pose {
        CameraPose::Point {
            position,
            orientation,
        } => Pose {
            position,
            orientation,
        },
        CameraPose::Region { bounds } => {
            let altitude = (bounds.approx_diagonal_m() * REGION_ALTITUDE_FACTOR)
                .max(MIN_REGION_ALTITUDE_M);
            Pose {
                position: bounds.center().with_altitude(altitude),
                orientation: Orientation::from_degrees(0.0, -90.0, 0.0),
            }
        }
    }
}

fn interpolate(from: &Pose, to: &Pose, t: f64) -> Pose {
    let lerp = |a: f64, b: f64| a + (b - a) * t;
    let (a, b) = (from.position, to.position);
    let (oa, ob) = (from.orientation, to.orientation);
    Pose {
        position: GeoPoint::new(
            lerp(a.latitude, b.latitude),
            a.longitude + shortest_delta_deg(a.longitude, b.longitude) * t,
        )
        .with_altitude(lerp(a.altitude, b.altitude)),
        orientation: Orientation::new(
            wrap_two_pi(oa.heading + shortest_delta_rad(oa.heading, ob.heading) * t),
            lerp(oa.pitch, ob.pitch),
            oa.roll + shortest_delta_rad(oa.roll, ob.roll) * t,
        ),
    }
    .normalized()
}

impl Pose {
    fn normalized(mut self) -> Self {
        let lon = self.position.longitude;
        if lon > 180.0 {
            self.position.longitude = lon - 360.0;
        } else if lon < -180.0 {
            self.position.longitude = lon + 360.0;
        }
        self
    }
}

fn shortest_delta_rad(from: f64, to: f64) -> f64 {
    let d = wrap_two_pi(to - from);
    if d > std::f64::consts::PI {
        d - std::f64::consts::TAU
    } else {
        d
    }
}

fn shortest_delta_deg(from: f64, to: f64) -> f64 {
    shortest_delta_rad(from.to_radians(), to.to_radians()).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::HeadlessScene;
    use crate::atmosphere::AtmosphereParams;
    use crate::camera::{CameraPose, Orientation};
    use crate::handle::SceneHandle;
    use foundation::{GeoPoint, GeoRect, Time};
    use runtime::Frame;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn frame_at(index: u64, t: f64) -> Frame {
        Frame::at(index, Time(t), 0.0)
    }

    #[test]
    fn flight_reaches_target_after_duration() {
        let mut scene = HeadlessScene::new(1280.0, 720.0);
        let target = GeoPoint::new(40.734, -73.990).with_altitude(40.0);
        scene.fly_to(
            &CameraPose::point(target, Orientation::from_degrees(0.0, -15.0, 0.0)),
            2.0,
        );
        assert!(scene.is_flying());

        scene.tick(frame_at(1, 1.0));
        assert!(scene.is_flying());
        let mid = scene.camera().map(|c| c.position().altitude).unwrap_or_default();
        assert!(mid > 40.0 && mid < 1200.0, "mid-flight altitude {mid}");

        scene.tick(frame_at(2, 2.0));
        assert!(!scene.is_flying());
        let cam = scene.camera().expect("active scene has a camera");
        let pos = cam.position();
        assert_close(pos.latitude, 40.734, 1e-7);
        assert_close(pos.longitude, -73.990, 1e-7);
        assert_close(pos.altitude, 40.0, 1e-3);
        assert_close(cam.orientation().pitch, (-15f64).to_radians(), 1e-6);
    }

    #[test]
    fn new_flight_overrides_the_one_in_progress() {
        let mut scene = HeadlessScene::new(1280.0, 720.0);
        let pitch = Orientation::from_degrees(0.0, -35.0, 0.0);
        let first = GeoPoint::new(41.0, -74.0).with_altitude(400.0);
        scene.fly_to(&CameraPose::point(first, pitch), 4.0);
        scene.tick(frame_at(1, 1.0));
        let second = GeoPoint::new(40.5, -73.5).with_altitude(300.0);
        scene.fly_to(&CameraPose::point(second, pitch), 1.0);
        assert_eq!(scene.flights_started(), 2);
        assert_eq!(scene.flight_target().map(|(p, _)| p), Some(second));

        scene.tick(frame_at(2, 2.0));
        let pos = scene.camera().expect("camera").position();
        assert_close(pos.latitude, 40.5, 1e-7);
        assert_close(pos.longitude, -73.5, 1e-7);
    }

    #[test]
    fn region_is_framed_from_above() {
        let mut scene = HeadlessScene::new(800.0, 600.0);
        let rect = GeoRect::new(GeoPoint::new(40.70, -74.02), GeoPoint::new(40.76, -73.96));
        scene.fly_to(&CameraPose::region(rect), 0.0);
        assert!(!scene.is_flying());
        let cam = scene.camera().expect("camera");
        assert_close(cam.position().latitude, 40.73, 1e-6);
        assert_close(cam.orientation().pitch, (-90f64).to_radians(), 1e-6);
        assert!(cam.position().altitude > rect.approx_diagonal_m());
    }

    #[test]
    fn inactive_scene_ignores_commands() {
        let mut scene = HeadlessScene::new(800.0, 600.0);
        scene.set_active(false);
        assert!(scene.camera().is_none());
        let pose = CameraPose::point(GeoPoint::new(0.0, 0.0), Orientation::default());
        scene.fly_to(&pose, 1.0);
        scene.set_atmosphere(&AtmosphereParams::SNOW);
        scene.move_forward(100.0);
        assert_eq!(scene.flights_started(), 0);
        assert_eq!(scene.atmosphere(), AtmosphereParams::CLEAR);
        let world = GeoPoint::new(40.73, -73.995).to_ecef().as_vec3();
        assert!(scene.project_to_screen(world).is_none());
    }

    #[test]
    fn move_forward_cancels_flight() {
        let mut scene = HeadlessScene::new(800.0, 600.0);
        let before = scene.camera().expect("camera").position().altitude;
        let pose = CameraPose::point(GeoPoint::new(41.0, -74.0), Orientation::default());
        scene.fly_to(&pose, 3.0);
        scene.move_forward(500.0);
        assert!(!scene.is_flying());
        let after = scene.camera().expect("camera").position().altitude;
        // Pitched down 25 degrees: moving forward loses height.
        assert_close(before - after, 500.0 * 25f64.to_radians().sin(), 1.0);
    }
}
