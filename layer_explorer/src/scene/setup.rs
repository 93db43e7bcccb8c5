//! Builds the explorer scene once the mount container has a usable size.

use bevy::pbr::wireframe::{Wireframe, WireframeColor};
use bevy::prelude::*;

use crate::camera::{ExplorerCamera, Lens, OrbitController, Viewport, CAMERA_EYE};
use crate::host::{ExplodeAmount, MountTarget, ViewportResized};
use crate::layers::{color_from_hex, LayerCatalog, LayerId, LayerStack, RenderStyle};
use crate::lifecycle::{InputListeners, MountState, RenderLoop};
use crate::scene::appearance::{appearance, base_material, wire_color};
use crate::scene::labels::spawn_labels;
use crate::scene::surface::{SurfaceGeometry, DEFAULT_SEGMENTS};

pub const BACKGROUND_HEX: u32 = 0x1a202c;
const FOG_DENSITY: f32 = 0.05;
const SPOT_HEX: u32 = 0x63b3ed;

/// Scene construction knobs, fixed at mount time.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct SceneSettings {
    pub surface_segments: u32,
    pub lens: Lens,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            surface_segments: DEFAULT_SEGMENTS,
            lens: Lens::default(),
        }
    }
}

/// Everything spawned by the explorer carries this marker; teardown removes it all.
#[derive(Component)]
pub struct ExplorerSurface;

/// Parent of the four layer meshes.
#[derive(Component)]
pub struct LayerGroup;

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerMesh(pub LayerId);

/// The one surface geometry every layer instances.
#[derive(Resource)]
pub struct SharedSurface {
    pub geometry: SurfaceGeometry,
    pub mesh: Handle<Mesh>,
}

/// Per-layer material handles, in stack order.
#[derive(Resource)]
pub struct LayerMaterials([Handle<StandardMaterial>; 4]);

impl LayerMaterials {
    pub fn get(&self, id: LayerId) -> &Handle<StandardMaterial> {
        &self.0[id.index()]
    }

    pub fn handles(&self) -> impl Iterator<Item = &Handle<StandardMaterial>> {
        self.0.iter()
    }
}

/// Mounts the explorer: geometry, materials, layers, lights, camera and labels.
/// Stays pending while the container has no measurable size.
#[allow(clippy::too_many_arguments)]
pub fn mount_explorer_system(
    mut commands: Commands,
    target: Res<MountTarget>,
    settings: Res<SceneSettings>,
    catalog: Res<LayerCatalog>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut state: ResMut<MountState>,
    mut render_loop: ResMut<RenderLoop>,
    mut listeners: ResMut<InputListeners>,
) {
    let Some(viewport) = target.viewport() else {
        return;
    };

    let geometry = SurfaceGeometry::with_segments(settings.surface_segments);
    let mesh = meshes.add(geometry.to_mesh());
    let stack = LayerStack::new();
    let layer_materials =
        LayerMaterials(LayerId::ALL.map(|id| materials.add(base_material(stack.get(id)))));

    commands
        .spawn((
            LayerGroup,
            ExplorerSurface,
            Transform::default(),
            Visibility::default(),
        ))
        .with_children(|group| {
            for layer in stack.layers() {
                let mut entity = group.spawn((
                    LayerMesh(layer.id),
                    Mesh3d(mesh.clone()),
                    MeshMaterial3d(layer_materials.get(layer.id).clone()),
                    layer.transform(),
                ));
                if layer.style == RenderStyle::Wireframe {
                    entity.insert((
                        Wireframe,
                        WireframeColor {
                            color: wire_color(appearance(layer, false)),
                        },
                    ));
                }
            }
        });

    spawn_lights(&mut commands);

    let controller = OrbitController::looking_from(CAMERA_EYE, Vec3::ZERO);
    commands.spawn((
        ExplorerCamera,
        ExplorerSurface,
        Camera3d::default(),
        Projection::Perspective(settings.lens.projection(viewport.aspect())),
        controller.transform(),
        DistanceFog {
            color: color_from_hex(BACKGROUND_HEX),
            falloff: FogFalloff::Exponential {
                density: FOG_DENSITY,
            },
            ..default()
        },
        controller,
    ));

    spawn_labels(&mut commands, &catalog);

    info!(
        width = viewport.width,
        height = viewport.height,
        segments = geometry.segments(),
        "layer explorer mounted"
    );

    commands.insert_resource(viewport);
    commands.insert_resource(SharedSurface { geometry, mesh });
    commands.insert_resource(layer_materials);
    commands.insert_resource(stack);

    render_loop.mark_mounted();
    render_loop.start();
    listeners.attached = true;
    *state = MountState::Mounted;
}

fn spawn_lights(commands: &mut Commands) {
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 400.0,
    });
    commands.spawn((
        ExplorerSurface,
        DirectionalLight {
            illuminance: 8_000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(5.0, 10.0, 7.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        ExplorerSurface,
        SpotLight {
            color: color_from_hex(SPOT_HEX),
            intensity: 400_000.0,
            range: 30.0,
            ..default()
        },
        Transform::from_xyz(-5.0, 2.0, -5.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

/// Re-measures the viewport and updates the camera aspect. Ignored unless mounted.
pub fn resize_system(
    mut resized: EventReader<ViewportResized>,
    state: Res<MountState>,
    mut viewport: Option<ResMut<Viewport>>,
    mut projections: Query<&mut Projection, With<ExplorerCamera>>,
) {
    let Some(last) = resized.read().last().copied() else {
        return;
    };
    if *state != MountState::Mounted {
        return;
    }
    let Some(measured) = Viewport::new(last.width, last.height) else {
        return;
    };
    let Some(viewport) = viewport.as_mut() else {
        return;
    };

    **viewport = measured;
    for mut projection in &mut projections {
        if let Projection::Perspective(perspective) = projection.as_mut() {
            perspective.aspect_ratio = measured.aspect();
        }
    }
    debug!(width = measured.width, height = measured.height, "viewport resized");
}

/// Tick step 2: ease every layer toward its exploded height.
pub fn explode_system(
    explode: Res<ExplodeAmount>,
    mut stack: ResMut<LayerStack>,
    mut layers: Query<(&LayerMesh, &mut Transform)>,
) {
    stack.advance(explode.get());
    for (layer_mesh, mut transform) in &mut layers {
        *transform = stack.get(layer_mesh.0).transform();
    }
}
