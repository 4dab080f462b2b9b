pub mod atmosphere;
pub mod camera;
pub mod config;
pub mod controls;
pub mod flight;
pub mod handle;
pub mod headless;
pub mod overlay;
pub mod projection;
pub mod state;
pub mod targeting;
pub mod viewport;

pub use camera::{CameraPose, CameraState, Orientation};
pub use config::ViewportConfig;
pub use handle::SceneHandle;
pub use headless::HeadlessScene;
pub use overlay::{AnchorKey, AnchorProjection, OverlayHost, OverlayPlacement};
pub use state::{AppSnapshot, Candidate};
pub use targeting::{TargetRule, TargetSelection, resolve_target};
pub use viewport::*;
