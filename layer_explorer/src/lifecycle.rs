//! Mount state, the frame-loop state machine, and ordered teardown.

use bevy::prelude::*;

use crate::camera::Viewport;
use crate::scene::labels::LayerLabel;
use crate::scene::setup::{ExplorerSurface, LayerMaterials, SharedSurface};

/// Where the explorer is in its one-way lifecycle.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MountState {
    /// Waiting for a container with a measurable, non-zero size.
    #[default]
    Pending,
    Mounted,
    TornDown,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopPhase {
    #[default]
    Stopped,
    Running,
}

/// Frame-loop state machine. The loop can only enter `Running` while the
/// explorer is mounted; unmounting stops it for good.
#[derive(Resource, Debug, Default)]
pub struct RenderLoop {
    phase: LoopPhase,
    mounted: bool,
    frames: u64,
}

impl RenderLoop {
    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_running(&self) -> bool {
        self.mounted && self.phase == LoopPhase::Running
    }

    pub fn mark_mounted(&mut self) {
        self.mounted = true;
    }

    /// Starts the loop. Returns `false` when not mounted or already running.
    pub fn start(&mut self) -> bool {
        if !self.mounted || self.phase == LoopPhase::Running {
            return false;
        }
        self.phase = LoopPhase::Running;
        true
    }

    /// Stops the loop and clears the mounted guard so it cannot restart.
    pub fn stop(&mut self) {
        self.phase = LoopPhase::Stopped;
        self.mounted = false;
    }

    pub fn record_tick(&mut self) {
        if self.is_running() {
            self.frames += 1;
        }
    }
}

/// Whether pointer/resize input reaches the explorer.
#[derive(Resource, Debug, Default)]
pub struct InputListeners {
    pub attached: bool,
}

/// Host request to unmount the explorer.
#[derive(Event, Clone, Copy, Debug, Default)]
pub struct UnmountExplorer;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TeardownStep {
    StopLoop,
    DetachListeners,
    ReleaseGpuResources,
    RemoveSurface,
    ClearLabels,
}

pub const TEARDOWN_ORDER: [TeardownStep; 5] = [
    TeardownStep::StopLoop,
    TeardownStep::DetachListeners,
    TeardownStep::ReleaseGpuResources,
    TeardownStep::RemoveSurface,
    TeardownStep::ClearLabels,
];

/// Steps executed by the last teardown, in order.
#[derive(Resource, Debug, Default)]
pub struct TeardownLog(pub Vec<TeardownStep>);

pub fn loop_running(render_loop: Res<RenderLoop>) -> bool {
    render_loop.is_running()
}

pub fn listeners_attached(listeners: Res<InputListeners>) -> bool {
    listeners.attached
}

pub fn mount_pending(state: Res<MountState>) -> bool {
    *state == MountState::Pending
}

/// Last tick step: count the frame.
pub fn record_tick_system(mut render_loop: ResMut<RenderLoop>) {
    render_loop.record_tick();
}

#[allow(clippy::too_many_arguments)]
pub fn teardown_system(
    mut commands: Commands,
    mut requests: EventReader<UnmountExplorer>,
    mut state: ResMut<MountState>,
    mut render_loop: ResMut<RenderLoop>,
    mut listeners: ResMut<InputListeners>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    surface: Option<Res<SharedSurface>>,
    layer_materials: Option<Res<LayerMaterials>>,
    scene_roots: Query<Entity, With<ExplorerSurface>>,
    labels: Query<Entity, With<LayerLabel>>,
    mut log: ResMut<TeardownLog>,
) {
    if requests.read().count() == 0 {
        return;
    }
    if *state != MountState::Mounted {
        debug!("layer explorer: unmount requested while {:?}, ignoring", *state);
        return;
    }

    log.0.clear();
    for step in TEARDOWN_ORDER {
        match step {
            TeardownStep::StopLoop => {
                render_loop.stop();
            }
            TeardownStep::DetachListeners => {
                listeners.attached = false;
            }
            TeardownStep::ReleaseGpuResources => {
                if let Some(surface) = surface.as_ref() {
                    meshes.remove(&surface.mesh);
                }
                if let Some(layer_materials) = layer_materials.as_ref() {
                    for handle in layer_materials.handles() {
                        materials.remove(handle);
                    }
                }
                commands.remove_resource::<SharedSurface>();
                commands.remove_resource::<LayerMaterials>();
            }
            TeardownStep::RemoveSurface => {
                for entity in &scene_roots {
                    commands.entity(entity).despawn_recursive();
                }
                commands.insert_resource(AmbientLight::default());
                commands.remove_resource::<Viewport>();
            }
            TeardownStep::ClearLabels => {
                for entity in &labels {
                    commands.entity(entity).despawn_recursive();
                }
            }
        }
        info!("layer explorer teardown: {step:?}");
        log.0.push(step);
    }

    *state = MountState::TornDown;
}
