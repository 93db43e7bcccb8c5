//! Pointer picking against the layer surfaces.
//!
//! Rays are cast on the CPU against the shared surface triangles, moved into
//! each layer's current local space, rather than through Bevy's mesh picking:
//! the layers all instance one mesh and the egui panel must be able to claim
//! the pointer first.

use bevy::prelude::*;
use bevy::window::{PrimaryWindow, SystemCursorIcon};
use bevy::winit::cursor::CursorIcon;

use crate::camera::{current_view, ExplorerCamera, OrbitController, PickRay, Viewport};
use crate::host::{LayerSelected, PointerClicked, PointerMoved, SelectionListeners};
use crate::layers::{CursorAffordance, LayerId, LayerStack};
use crate::scene::setup::{SceneSettings, SharedSurface};
use crate::scene::surface::SurfaceGeometry;

const TRIANGLE_EPSILON: f32 = 1e-7;
const AABB_PADDING: f32 = 1e-3;

/// Nearest intersection of a pick ray with a layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayerHit {
    pub layer: LayerId,
    /// Ray parameter; the ray direction is unit length so this is a world distance.
    pub distance: f32,
    pub point: Vec3,
}

/// Casts `ray` against every layer at its current height. Ties keep the
/// earlier layer in stack order.
pub fn pick_layer(ray: &PickRay, stack: &LayerStack, surface: &SurfaceGeometry) -> Option<LayerHit> {
    let (bounds_min, bounds_max) = surface.bounds();
    let mut nearest: Option<LayerHit> = None;

    for layer in stack.layers() {
        // Layer transforms are rigid, so distances survive the change of space.
        let to_local = layer.world_matrix().inverse();
        let origin = to_local.transform_point3(ray.origin);
        let direction = to_local.transform_vector3(ray.direction);

        let Some(enter) = ray_aabb_intersect(
            origin,
            direction,
            bounds_min - Vec3::splat(AABB_PADDING),
            bounds_max + Vec3::splat(AABB_PADDING),
        ) else {
            continue;
        };
        if nearest.is_some_and(|hit| enter > hit.distance) {
            continue;
        }

        let closest = surface
            .triangles()
            .filter_map(|triangle| ray_triangle_intersect(origin, direction, triangle))
            .min_by(f32::total_cmp);

        if let Some(distance) = closest {
            if nearest.is_none_or(|hit| distance < hit.distance) {
                nearest = Some(LayerHit {
                    layer: layer.id,
                    distance,
                    point: ray.origin + ray.direction * distance,
                });
            }
        }
    }

    nearest
}

/// Slab test. Returns the entry distance, clamped to zero when the origin is inside.
fn ray_aabb_intersect(origin: Vec3, dir: Vec3, aabb_min: Vec3, aabb_max: Vec3) -> Option<f32> {
    let inv_dir = 1.0 / dir;
    let t1 = (aabb_min - origin) * inv_dir;
    let t2 = (aabb_max - origin) * inv_dir;
    let t_min = t1.min(t2);
    let t_max = t1.max(t2);
    let t_enter = t_min.x.max(t_min.y).max(t_min.z);
    let t_exit = t_max.x.min(t_max.y).min(t_max.z);
    if t_enter <= t_exit && t_exit > 0.0 {
        Some(t_enter.max(0.0))
    } else {
        None
    }
}

/// Möller–Trumbore, double-sided.
fn ray_triangle_intersect(origin: Vec3, dir: Vec3, [a, b, c]: [Vec3; 3]) -> Option<f32> {
    let edge1 = b - a;
    let edge2 = c - a;
    let p = dir.cross(edge2);
    let det = edge1.dot(p);
    if det.abs() < TRIANGLE_EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;

    let s = origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = dir.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(q) * inv_det;
    (t > TRIANGLE_EPSILON).then_some(t)
}

fn ray_at(
    position: Vec2,
    viewport: Option<&Viewport>,
    cameras: &Query<&OrbitController, With<ExplorerCamera>>,
    settings: &SceneSettings,
) -> Option<PickRay> {
    let viewport = viewport?;
    let view = current_view(cameras, Some(viewport), settings.lens)?;
    view.ray_through(viewport.pixel_to_ndc(position))
}

fn hit_at(
    position: Vec2,
    stack: &LayerStack,
    surface: Option<&SharedSurface>,
    viewport: Option<&Viewport>,
    cameras: &Query<&OrbitController, With<ExplorerCamera>>,
    settings: &SceneSettings,
) -> Option<LayerId> {
    let surface = surface?;
    let ray = ray_at(position, viewport, cameras, settings)?;
    pick_layer(&ray, stack, &surface.geometry).map(|hit| hit.layer)
}

/// Hover highlight and cursor affordance from the latest pointer position.
pub fn hover_system(
    mut moved: EventReader<PointerMoved>,
    mut stack: ResMut<LayerStack>,
    surface: Option<Res<SharedSurface>>,
    viewport: Option<Res<Viewport>>,
    settings: Res<SceneSettings>,
    cameras: Query<&OrbitController, With<ExplorerCamera>>,
    mut cursor: ResMut<CursorAffordance>,
) {
    let Some(last) = moved.read().last().copied() else {
        return;
    };
    let hit = hit_at(
        last.position,
        &stack,
        surface.as_deref(),
        viewport.as_deref(),
        &cameras,
        &settings,
    );
    let affordance = stack.hover(hit);
    if *cursor != affordance {
        *cursor = affordance;
    }
}

/// Applies every click to the selection and reports it to the host.
#[allow(clippy::too_many_arguments)]
pub fn select_system(
    mut clicked: EventReader<PointerClicked>,
    mut stack: ResMut<LayerStack>,
    surface: Option<Res<SharedSurface>>,
    viewport: Option<Res<Viewport>>,
    settings: Res<SceneSettings>,
    cameras: Query<&OrbitController, With<ExplorerCamera>>,
    listeners: Res<SelectionListeners>,
    mut selected: EventWriter<LayerSelected>,
) {
    for click in clicked.read() {
        let hit = hit_at(
            click.position,
            &stack,
            surface.as_deref(),
            viewport.as_deref(),
            &cameras,
            &settings,
        );
        let selection = stack.select(hit);
        let event = LayerSelected(selection);
        info!("layer explorer: selected {:?}", event.wire_name());
        selected.send(event);
        listeners.notify(selection);
    }
}

/// Mirrors [`CursorAffordance`] onto the primary window's cursor.
pub fn apply_cursor_system(
    mut commands: Commands,
    affordance: Res<CursorAffordance>,
    windows: Query<Entity, With<PrimaryWindow>>,
) {
    if !affordance.is_changed() {
        return;
    }
    let Ok(window) = windows.get_single() else {
        return;
    };
    let icon = match *affordance {
        CursorAffordance::Default => SystemCursorIcon::Default,
        CursorAffordance::Pointer => SystemCursorIcon::Pointer,
    };
    commands.entity(window).insert(CursorIcon::from(icon));
}
