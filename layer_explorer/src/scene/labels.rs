//! Screen-space layer labels pinned to a point just past the surface edge.

use bevy::prelude::*;

use crate::camera::{current_view, CameraView, ExplorerCamera, OrbitController, Viewport};
use crate::host::ExplodeAmount;
use crate::layers::{color_from_hex, LayerCatalog, LayerId, LayerStack, LayerState};
use crate::lifecycle::loop_running;
use crate::scene::setup::SceneSettings;
use crate::scene::surface::{surface_height, SURFACE_WIDTH};
use crate::ExplorerSet;

/// How far past the surface edge the label anchor sits, along local +X.
pub const LEADER_LENGTH: f32 = 1.5;
/// Pixel offset of the label box from its projected anchor.
pub const LABEL_OFFSET: Vec2 = Vec2::new(10.0, -10.0);

const DASH_LENGTH: f32 = 0.2;
const GAP_LENGTH: f32 = 0.1;
const LEADER_ALPHA: f32 = 0.6;
const ACCENT_HEX: u32 = 0x63b3ed;

#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerLabel(pub LayerId);

/// Surface-local point where the leader line leaves the surface edge.
pub fn leader_attach() -> Vec3 {
    let x = SURFACE_WIDTH / 2.0;
    Vec3::new(x, 0.0, surface_height(x, 0.0))
}

/// Surface-local label anchor.
pub fn label_anchor() -> Vec3 {
    leader_attach() + Vec3::X * LEADER_LENGTH
}

/// Where a label goes this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LabelPlacement {
    pub layer: LayerId,
    /// Anchor in viewport pixels (before [`LABEL_OFFSET`]).
    pub pixel: Vec2,
    pub visible: bool,
}

/// Placements from the last tick, in stack order.
#[derive(Resource, Default, Debug)]
pub struct LabelPlacements(pub Vec<LabelPlacement>);

pub fn place_label(
    layer: &LayerState,
    view: &CameraView,
    viewport: &Viewport,
    explode: f32,
) -> LabelPlacement {
    let world = layer.world_matrix().transform_point3(label_anchor());
    let projected = view.project(world);
    LabelPlacement {
        layer: layer.id,
        pixel: viewport.ndc_to_pixel(projected.ndc.truncate()),
        visible: projected.in_front && explode > 0.0,
    }
}

/// Spawns one hidden label per layer; projection reveals them.
pub fn spawn_labels(commands: &mut Commands, catalog: &LayerCatalog) {
    for id in LayerId::ALL {
        commands.spawn((
            LayerLabel(id),
            Text::new(catalog.get(id).title.clone()),
            TextFont {
                font_size: 13.0,
                ..default()
            },
            TextColor(Color::WHITE),
            Node {
                position_type: PositionType::Absolute,
                padding: UiRect::axes(Val::Px(12.0), Val::Px(4.0)),
                border: UiRect::left(Val::Px(3.0)),
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
            BorderColor(color_from_hex(ACCENT_HEX)),
            Visibility::Hidden,
        ));
    }
}

/// Tick step 3: project anchors through this frame's camera and layer heights.
#[allow(clippy::too_many_arguments)]
pub fn project_labels_system(
    stack: Res<LayerStack>,
    explode: Res<ExplodeAmount>,
    settings: Res<SceneSettings>,
    viewport: Option<Res<Viewport>>,
    cameras: Query<&OrbitController, With<ExplorerCamera>>,
    mut placements: ResMut<LabelPlacements>,
    mut labels: Query<(&LayerLabel, &mut Node, &mut Visibility)>,
) {
    let Some(viewport) = viewport.as_deref() else {
        return;
    };
    let Some(view) = current_view(&cameras, Some(viewport), settings.lens) else {
        return;
    };

    placements.0 = stack
        .layers()
        .iter()
        .map(|layer| place_label(layer, &view, viewport, explode.get()))
        .collect();

    for (label, mut node, mut visibility) in &mut labels {
        let placement = placements.0[label.0.index()];
        if placement.visible {
            let corner = placement.pixel + LABEL_OFFSET;
            node.left = Val::Px(corner.x);
            node.top = Val::Px(corner.y);
            *visibility = Visibility::Inherited;
        } else {
            *visibility = Visibility::Hidden;
        }
    }
}

/// Segments of a dashed line from `from` to `to`.
pub fn dashes(from: Vec3, to: Vec3, dash: f32, gap: f32) -> Vec<(Vec3, Vec3)> {
    let length = from.distance(to);
    let period = dash + gap;
    if length <= 0.0 || dash <= 0.0 || period <= 0.0 {
        return Vec::new();
    }
    let direction = (to - from) / length;
    // Nudge so a length that is an exact multiple of the period does not gain a sliver.
    let count = (length / period - 1e-4).ceil().max(1.0) as usize;
    (0..count)
        .map(|i| {
            let start = i as f32 * period;
            let end = (start + dash).min(length);
            (from + direction * start, from + direction * end)
        })
        .collect()
}

fn draw_leader_lines_system(
    mut gizmos: Gizmos,
    stack: Res<LayerStack>,
    placements: Res<LabelPlacements>,
) {
    let color = Color::srgba(1.0, 1.0, 1.0, LEADER_ALPHA);
    let segments = dashes(leader_attach(), label_anchor(), DASH_LENGTH, GAP_LENGTH);
    for placement in placements.0.iter().filter(|p| p.visible) {
        let world = stack.get(placement.layer).world_matrix();
        for (start, end) in &segments {
            gizmos.line(
                world.transform_point3(*start),
                world.transform_point3(*end),
                color,
            );
        }
    }
}

/// Dashed leader lines from the surface edge to each visible label.
pub fn leader_line_plugin(app: &mut App) {
    app.add_systems(
        Update,
        draw_leader_lines_system
            .after(ExplorerSet::Tick)
            .run_if(loop_running),
    );
}
