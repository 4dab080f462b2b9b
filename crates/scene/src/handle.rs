//! The seam between the engine and whichever 3D runtime draws the scene.

use crate::atmosphere::AtmosphereParams;
use crate::camera::{CameraPose, CameraState};
use crate::projection::{ScreenPoint, WorldPoint, to_screen};

/// The external 3D scene runtime, as seen by the engine.
///
/// Injected into every operation that needs it; the engine keeps no global
/// handle. While `is_active` is false every mutating call is expected to be
/// ignored by the implementation, and the engine avoids issuing them.
pub trait SceneHandle {
    fn is_active(&self) -> bool;

    /// Current live camera, or `None` while no scene exists.
    fn camera(&self) -> Option<CameraState>;

    /// Starts a timed transition to `pose`, overriding any transition in progress.
    fn fly_to(&mut self, pose: &CameraPose, duration_s: f64);

    /// Replaces the scene's fog and sky atmosphere parameters wholesale.
    fn set_atmosphere(&mut self, params: &AtmosphereParams);

    /// Moves the camera along its view direction; negative values back away.
    fn move_forward(&mut self, meters: f64);

    fn project_to_screen(&self, world: WorldPoint) -> Option<ScreenPoint> {
        let camera = self.camera()?;
        to_screen(world, &camera).visible()
    }
}
