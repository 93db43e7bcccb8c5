//! Material parameters per render style and highlight state.

use bevy::color::Mix;
use bevy::pbr::wireframe::WireframeColor;
use bevy::prelude::*;

use crate::layers::{color_from_hex, HighlightState, LayerStack, LayerState, RenderStyle};
use crate::scene::setup::{LayerMaterials, LayerMesh, BACKGROUND_HEX};

const HOVER_WIRE_HEX: u32 = 0x6b9ac4;
const SELECTED_WIRE_HEX: u32 = 0x63b3ed;
const HOVER_GLOW_HEX: u32 = 0x1a5490;
const SELECTED_GLOW_HEX: u32 = 0x3182ce;
const GLOW_STRENGTH: f32 = 4.0;

pub const DIMMED_OPACITY: f32 = 0.25;
const WIREFRAME_OPACITY: f32 = 0.8;
const TRANSLUCENT_OPACITY: f32 = 0.7;

/// Resolved look of one layer for the current highlight state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
    /// Surface color for solid/translucent layers, line color for wireframes.
    pub color: u32,
    pub emissive: Option<u32>,
    pub opacity: f32,
}

pub fn appearance(layer: &LayerState, selection_active: bool) -> Appearance {
    let resting_opacity = match layer.style {
        RenderStyle::Solid => 1.0,
        RenderStyle::Wireframe => WIREFRAME_OPACITY,
        RenderStyle::Translucent => TRANSLUCENT_OPACITY,
    };
    let opacity = match layer.highlight {
        HighlightState::Selected => 1.0,
        HighlightState::Dimmed => DIMMED_OPACITY,
        HighlightState::Hovered if selection_active => DIMMED_OPACITY,
        HighlightState::Hovered | HighlightState::Normal => resting_opacity,
    };

    match layer.style {
        RenderStyle::Wireframe => Appearance {
            color: match layer.highlight {
                HighlightState::Hovered => HOVER_WIRE_HEX,
                HighlightState::Selected => SELECTED_WIRE_HEX,
                HighlightState::Normal | HighlightState::Dimmed => layer.base_color,
            },
            emissive: None,
            opacity,
        },
        RenderStyle::Solid | RenderStyle::Translucent => Appearance {
            color: layer.base_color,
            emissive: match layer.highlight {
                HighlightState::Hovered => Some(HOVER_GLOW_HEX),
                HighlightState::Selected => Some(SELECTED_GLOW_HEX),
                HighlightState::Normal | HighlightState::Dimmed => None,
            },
            opacity,
        },
    }
}

fn alpha_mode(opacity: f32) -> AlphaMode {
    if opacity < 1.0 {
        AlphaMode::Blend
    } else {
        AlphaMode::Opaque
    }
}

fn apply(material: &mut StandardMaterial, style: RenderStyle, look: Appearance) {
    match style {
        RenderStyle::Wireframe => {
            // Only the wireframe lines are visible; the fill stays transparent.
            material.base_color = color_from_hex(look.color).with_alpha(0.0);
            material.alpha_mode = AlphaMode::Blend;
            material.unlit = true;
        }
        RenderStyle::Solid | RenderStyle::Translucent => {
            material.base_color = color_from_hex(look.color).with_alpha(look.opacity);
            material.alpha_mode = alpha_mode(look.opacity);
            material.emissive = look
                .emissive
                .map(|hex| color_from_hex(hex).to_linear() * GLOW_STRENGTH)
                .unwrap_or(LinearRgba::BLACK);
        }
    }
}

/// Line color for a wireframe layer. Wireframe lines are drawn opaque, so
/// opacity is expressed as a fade toward the background.
pub fn wire_color(look: Appearance) -> Color {
    let line = color_from_hex(look.color).to_srgba();
    let background = color_from_hex(BACKGROUND_HEX).to_srgba();
    line.mix(&background, 1.0 - look.opacity.clamp(0.0, 1.0))
        .with_alpha(1.0)
        .into()
}

/// Material a layer is created with.
pub fn base_material(layer: &LayerState) -> StandardMaterial {
    let mut material = StandardMaterial {
        perceptual_roughness: 0.4,
        metallic: 0.1,
        double_sided: true,
        cull_mode: None,
        ..default()
    };
    apply(&mut material, layer.style, appearance(layer, false));
    material
}

/// Pushes highlight changes into the layer materials. Geometry is never touched.
pub fn appearance_system(
    stack: Res<LayerStack>,
    layer_materials: Option<Res<LayerMaterials>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut wires: Query<(&LayerMesh, &mut WireframeColor)>,
    mut applied: Local<Option<[HighlightState; 4]>>,
) {
    let highlights = stack.highlights();
    if *applied == Some(highlights) {
        return;
    }
    let Some(layer_materials) = layer_materials else {
        return;
    };

    let selection_active = stack.selected().is_some();
    for layer in stack.layers() {
        if let Some(material) = materials.get_mut(layer_materials.get(layer.id)) {
            apply(material, layer.style, appearance(layer, selection_active));
        }
    }
    for (layer_mesh, mut wire) in &mut wires {
        wire.color = wire_color(appearance(stack.get(layer_mesh.0), selection_active));
    }

    *applied = Some(highlights);
}
