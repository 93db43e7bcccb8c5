pub mod orbit;
pub mod view;

use bevy::prelude::*;

pub use orbit::{orbit_damping_system, orbit_input_system, OrbitController};
pub use view::{CameraView, Lens, PickRay, Projected, Viewport};

pub const CAMERA_EYE: Vec3 = Vec3::new(6.0, 5.0, 8.0);

/// Marker for the explorer's rendering camera.
#[derive(Component)]
pub struct ExplorerCamera;

/// Camera view for the current frame, or `None` before mount.
pub fn current_view(
    cameras: &Query<&OrbitController, With<ExplorerCamera>>,
    viewport: Option<&Viewport>,
    lens: Lens,
) -> Option<CameraView> {
    let controller = cameras.get_single().ok()?;
    let viewport = viewport?;
    Some(CameraView::new(
        controller.eye(),
        controller.target,
        lens,
        viewport,
    ))
}
