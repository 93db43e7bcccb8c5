//! Viewport and perspective math shared by picking and label projection.

use bevy::prelude::*;

/// Pixel size of the region the explorer renders into.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// `None` for empty or non-finite sizes: the container is not ready yet.
    pub fn new(width: f32, height: f32) -> Option<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        (valid(width) && valid(height)).then_some(Self { width, height })
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    /// Pixel (origin top-left, +Y down) to normalized device coordinates (+Y up).
    pub fn pixel_to_ndc(&self, pixel: Vec2) -> Vec2 {
        Vec2::new(
            pixel.x / self.width * 2.0 - 1.0,
            -(pixel.y / self.height) * 2.0 + 1.0,
        )
    }

    pub fn ndc_to_pixel(&self, ndc: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x * 0.5 + 0.5) * self.width,
            (ndc.y * -0.5 + 0.5) * self.height,
        )
    }
}

/// Perspective lens parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lens {
    /// Vertical field of view in radians.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Lens {
    fn default() -> Self {
        Self {
            fov_y: 45.0_f32.to_radians(),
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Lens {
    pub fn projection(&self, aspect: f32) -> PerspectiveProjection {
        PerspectiveProjection {
            fov: self.fov_y,
            aspect_ratio: aspect,
            near: self.near,
            far: self.far,
        }
    }
}

/// World-space ray with a unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickRay {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Result of projecting a world point into the view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projected {
    pub ndc: Vec3,
    pub in_front: bool,
}

/// A camera pose plus lens, frozen for one frame.
#[derive(Clone, Copy, Debug)]
pub struct CameraView {
    pub eye: Vec3,
    pub target: Vec3,
    pub lens: Lens,
    pub aspect: f32,
}

impl CameraView {
    pub fn new(eye: Vec3, target: Vec3, lens: Lens, viewport: &Viewport) -> Self {
        Self {
            eye,
            target,
            lens,
            aspect: viewport.aspect(),
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        let projection =
            Mat4::perspective_rh(self.lens.fov_y, self.aspect, self.lens.near, self.lens.far);
        let view = Mat4::look_at_rh(self.eye, self.target, Vec3::Y);
        projection * view
    }

    /// Ray from the eye through the point at `ndc`.
    pub fn ray_through(&self, ndc: Vec2) -> Option<PickRay> {
        let inverse = self.view_projection().inverse();
        let on_frustum = inverse.project_point3(ndc.extend(0.5));
        let direction = (on_frustum - self.eye).try_normalize()?;
        Some(PickRay {
            origin: self.eye,
            direction,
        })
    }

    pub fn project(&self, world: Vec3) -> Projected {
        let clip = self.view_projection() * world.extend(1.0);
        if clip.w <= f32::EPSILON {
            return Projected {
                ndc: Vec3::ZERO,
                in_front: false,
            };
        }
        let ndc = clip.truncate() / clip.w;
        Projected {
            ndc,
            in_front: ndc.z < 1.0,
        }
    }
}
