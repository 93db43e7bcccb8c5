//! SDK entry points and builder for composing the layer explorer app.

use bevy::pbr::wireframe::WireframePlugin;
use bevy::prelude::*;
use bevy::render::settings::{WgpuFeatures, WgpuSettings};
use bevy::render::RenderPlugin;

use crate::camera::{orbit_damping_system, orbit_input_system};
use crate::config::ExplorerConfig;
use crate::host::{
    pointer_bridge_system, register_input_events, sync_mount_target_system,
    unmount_on_close_system, ExplodeAmount, LayerSelected, MountTarget, PointerCapture,
    PointerClicked, PointerMoved, SelectionListener, SelectionListeners, ViewportResized,
};
use crate::layers::{color_from_hex, CursorAffordance, LayerCatalog, LayerStack};
use crate::lifecycle::{
    listeners_attached, loop_running, mount_pending, record_tick_system, teardown_system,
    InputListeners, MountState, RenderLoop, TeardownLog, UnmountExplorer,
};
use crate::picking::{apply_cursor_system, hover_system, select_system};
use crate::scene::{
    appearance_system, explode_system, leader_line_plugin, mount_explorer_system,
    project_labels_system, resize_system, LabelPlacements, SceneSettings, BACKGROUND_HEX,
};
use crate::ui::info_panel_plugin;

/// Frame phases, run in this order every update.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExplorerSet {
    /// Mount, unmount and window bookkeeping.
    Lifecycle,
    /// Pointer and resize handling; mutates selection state only.
    Input,
    /// Orbit damping, explode smoothing, label projection, material sync.
    Tick,
}

/// Core explorer: state, events and the per-frame systems. Needs no window,
/// so it also runs under `MinimalPlugins`.
pub fn explorer_plugin(app: &mut App) {
    app.init_resource::<ExplodeAmount>()
        .init_resource::<LayerCatalog>()
        .init_resource::<SceneSettings>()
        .init_resource::<MountTarget>()
        .init_resource::<MountState>()
        .init_resource::<RenderLoop>()
        .init_resource::<InputListeners>()
        .init_resource::<TeardownLog>()
        .init_resource::<PointerCapture>()
        .init_resource::<SelectionListeners>()
        .init_resource::<LayerStack>()
        .init_resource::<LabelPlacements>()
        .init_resource::<CursorAffordance>()
        .add_event::<LayerSelected>()
        .add_event::<PointerMoved>()
        .add_event::<PointerClicked>()
        .add_event::<ViewportResized>()
        .add_event::<UnmountExplorer>();

    register_input_events(app);

    app.configure_sets(
        Update,
        (ExplorerSet::Lifecycle, ExplorerSet::Input, ExplorerSet::Tick).chain(),
    )
    .add_systems(
        Update,
        (
            sync_mount_target_system,
            mount_explorer_system.run_if(mount_pending),
            unmount_on_close_system,
            teardown_system,
        )
            .chain()
            .in_set(ExplorerSet::Lifecycle),
    )
    .add_systems(
        Update,
        (
            pointer_bridge_system.run_if(listeners_attached),
            resize_system.run_if(listeners_attached),
            orbit_input_system.run_if(listeners_attached),
            hover_system.run_if(listeners_attached),
            select_system.run_if(listeners_attached),
        )
            .chain()
            .in_set(ExplorerSet::Input),
    )
    .add_systems(
        Update,
        (
            orbit_damping_system,
            explode_system,
            project_labels_system,
            appearance_system,
            record_tick_system,
        )
            .chain()
            .in_set(ExplorerSet::Tick)
            .run_if(loop_running),
    )
    .add_systems(Update, apply_cursor_system.after(ExplorerSet::Tick));
}

/// Builder for constructing the explorer app with customizable plugins.
pub struct LayerExplorerBuilder {
    window_title: String,
    window_resolution: (f32, f32),
    clear_color: Color,
    explode: ExplodeAmount,
    settings: SceneSettings,
    catalog: LayerCatalog,
    listeners: SelectionListeners,
    enable_info_panel: bool,
    enable_leader_lines: bool,
    enable_wireframes: bool,
}

impl Default for LayerExplorerBuilder {
    fn default() -> Self {
        Self {
            window_title: "GRC Layer Explorer".to_string(),
            window_resolution: crate::config::DEFAULT_WINDOW,
            clear_color: color_from_hex(BACKGROUND_HEX),
            explode: ExplodeAmount::default(),
            settings: SceneSettings::default(),
            catalog: LayerCatalog::default(),
            listeners: SelectionListeners::default(),
            enable_info_panel: true,
            enable_leader_lines: true,
            enable_wireframes: true,
        }
    }
}

impl LayerExplorerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply env-derived settings. A catalog file that fails to load is
    /// reported and the built-in catalog is kept.
    pub fn config(mut self, config: ExplorerConfig) -> Self {
        self.explode = ExplodeAmount::new(config.explode);
        self.settings.surface_segments = config.surface_segments;
        self.window_resolution = config.window_resolution;
        if let Some(path) = config.catalog_path {
            match LayerCatalog::from_path(&path) {
                Ok(catalog) => self.catalog = catalog,
                Err(err) => eprintln!("grc: keeping built-in layer catalog: {err}"),
            }
        }
        self
    }

    pub fn window_title(mut self, title: impl Into<String>) -> Self {
        self.window_title = title.into();
        self
    }

    pub fn window_resolution(mut self, width: f32, height: f32) -> Self {
        self.window_resolution = (width, height);
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Initial explode amount, clamped to `[0, 2]`.
    pub fn explode(mut self, amount: f32) -> Self {
        self.explode = ExplodeAmount::new(amount);
        self
    }

    pub fn surface_segments(mut self, segments: u32) -> Self {
        self.settings.surface_segments = segments;
        self
    }

    pub fn catalog(mut self, catalog: LayerCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Register a host callback for selection changes. May be called repeatedly.
    pub fn on_layer_selected(mut self, listener: impl SelectionListener) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn disable_info_panel(mut self) -> Self {
        self.enable_info_panel = false;
        self
    }

    pub fn disable_leader_lines(mut self) -> Self {
        self.enable_leader_lines = false;
        self
    }

    /// For adapters without line polygon mode; the mesh layer is then not drawn.
    pub fn disable_wireframes(mut self) -> Self {
        self.enable_wireframes = false;
        self
    }

    /// Build the Bevy app with the selected configuration and plugins.
    pub fn build(self) -> App {
        let mut wgpu = WgpuSettings::default();
        if self.enable_wireframes {
            wgpu.features |= WgpuFeatures::POLYGON_MODE_LINE;
        }

        let mut app = App::new();
        app.add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: self.window_title,
                        resolution: self.window_resolution.into(),
                        ..default()
                    }),
                    ..default()
                })
                .set(RenderPlugin {
                    render_creation: wgpu.into(),
                    ..default()
                }),
        )
        .insert_resource(ClearColor(self.clear_color))
        .insert_resource(self.explode)
        .insert_resource(self.settings)
        .insert_resource(self.catalog)
        .insert_resource(self.listeners)
        .add_plugins(explorer_plugin);

        if self.enable_wireframes {
            app.add_plugins(WireframePlugin);
        }
        if self.enable_leader_lines {
            app.add_plugins(leader_line_plugin);
        }
        if self.enable_info_panel {
            app.add_plugins(info_panel_plugin);
        }

        app
    }
}
