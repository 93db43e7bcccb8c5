//! Damped orbit controls: drag to rotate around the target, wheel to zoom.

use std::f32::consts::{PI, TAU};

use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;

use crate::camera::view::Viewport;
use crate::camera::ExplorerCamera;
use crate::host::PointerCapture;

const POLAR_EPSILON: f32 = 1e-6;
const PIXELS_PER_WHEEL_LINE: f32 = 100.0;

/// Spherical-coordinate camera rig. Input accumulates deltas; [`update`]
/// applies a damped share of them once per frame.
///
/// [`update`]: OrbitController::update
#[derive(Component, Clone, Debug, PartialEq)]
pub struct OrbitController {
    pub target: Vec3,
    pub damping: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub rotate_speed: f32,
    /// Radius multiplier per wheel line toward the target.
    pub zoom_step: f32,
    radius: f32,
    theta: f32,
    phi: f32,
    delta_theta: f32,
    delta_phi: f32,
    scale: f32,
}

impl OrbitController {
    pub fn looking_from(eye: Vec3, target: Vec3) -> Self {
        let offset = eye - target;
        let radius = offset.length();
        let (theta, phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, 0.0)
        };
        Self {
            target,
            damping: 0.05,
            min_distance: 3.0,
            max_distance: 15.0,
            rotate_speed: 1.0,
            zoom_step: 0.95,
            radius,
            theta,
            phi,
            delta_theta: 0.0,
            delta_phi: 0.0,
            scale: 1.0,
        }
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Current eye position.
    pub fn eye(&self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        self.target
            + Vec3::new(
                sin_phi_radius * self.theta.sin(),
                self.phi.cos() * self.radius,
                sin_phi_radius * self.theta.cos(),
            )
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.target, Vec3::Y)
    }

    /// Queues rotation for a pointer drag of `pixels`; a drag across the full
    /// viewport height turns the camera once around.
    pub fn rotate(&mut self, pixels: Vec2, viewport_height: f32) {
        if viewport_height <= 0.0 {
            return;
        }
        self.delta_theta -= TAU * pixels.x / viewport_height * self.rotate_speed;
        self.delta_phi -= TAU * pixels.y / viewport_height * self.rotate_speed;
    }

    /// Queues a zoom; positive `lines` move toward the target.
    pub fn zoom(&mut self, lines: f32) {
        self.scale *= self.zoom_step.powf(lines);
    }

    /// Applies one damped step and returns the new eye position.
    pub fn update(&mut self) -> Vec3 {
        self.theta += self.delta_theta * self.damping;
        self.phi = (self.phi + self.delta_phi * self.damping).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);
        self.radius = (self.radius * self.scale).clamp(self.min_distance, self.max_distance);

        self.delta_theta *= 1.0 - self.damping;
        self.delta_phi *= 1.0 - self.damping;
        self.scale = 1.0;

        self.eye()
    }

    pub fn is_settled(&self) -> bool {
        self.delta_theta.abs() < 1e-5 && self.delta_phi.abs() < 1e-5
    }
}

/// Feeds raw drag and wheel input into the controller. Runs only while listeners are attached.
pub fn orbit_input_system(
    mouse: Res<ButtonInput<MouseButton>>,
    mut motion: EventReader<MouseMotion>,
    mut wheel: EventReader<MouseWheel>,
    capture: Res<PointerCapture>,
    viewport: Option<Res<Viewport>>,
    mut controllers: Query<&mut OrbitController, With<ExplorerCamera>>,
) {
    let drag: Vec2 = motion.read().map(|m| m.delta).sum();
    let lines: f32 = wheel
        .read()
        .map(|w| match w.unit {
            MouseScrollUnit::Line => w.y,
            MouseScrollUnit::Pixel => w.y / PIXELS_PER_WHEEL_LINE,
        })
        .sum();

    if capture.captured {
        return;
    }
    let (Some(viewport), Ok(mut controller)) = (viewport, controllers.get_single_mut()) else {
        return;
    };

    if mouse.pressed(MouseButton::Left) && drag != Vec2::ZERO {
        controller.rotate(drag, viewport.height);
    }
    if lines != 0.0 {
        controller.zoom(lines);
    }
}

/// Tick step 1: advance damping and move the camera.
pub fn orbit_damping_system(
    mut cameras: Query<(&mut OrbitController, &mut Transform), With<ExplorerCamera>>,
) {
    for (mut controller, mut transform) in &mut cameras {
        controller.update();
        *transform = controller.transform();
    }
}
