//! The four GRC layers: fixed configuration table and per-frame layer state.

pub mod catalog;

use std::f32::consts::FRAC_PI_2;
use std::fmt;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

pub use catalog::{CatalogError, LayerCatalog, LayerInfo};

/// Fraction of the remaining gap to the target height closed each tick.
pub const EXPLODE_SMOOTHING: f32 = 0.1;

/// Identity of a layer, in physical stack order (base → finish).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerId {
    Gfcr,
    Mesh,
    Filling,
    Finishing,
}

impl LayerId {
    pub const ALL: [LayerId; 4] = [
        LayerId::Gfcr,
        LayerId::Mesh,
        LayerId::Filling,
        LayerId::Finishing,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LayerId::Gfcr => "gfcr",
            LayerId::Mesh => "mesh",
            LayerId::Filling => "filling",
            LayerId::Finishing => "finishing",
        }
    }

    /// Position in [`LayerId::ALL`]; also the layer's stack offset.
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a layer's material is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderStyle {
    Solid,
    Wireframe,
    Translucent,
}

/// Transient interaction state of a layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HighlightState {
    #[default]
    Normal,
    Hovered,
    Selected,
    Dimmed,
}

/// Static construction parameters for one layer.
#[derive(Clone, Copy, Debug)]
pub struct LayerSpec {
    pub id: LayerId,
    pub style: RenderStyle,
    /// sRGB hex, `0xRRGGBB`.
    pub base_color: u32,
    pub stack_offset: u8,
}

pub const LAYER_SPECS: [LayerSpec; 4] = [
    LayerSpec {
        id: LayerId::Gfcr,
        style: RenderStyle::Solid,
        base_color: 0xe2e8f0,
        stack_offset: 0,
    },
    LayerSpec {
        id: LayerId::Mesh,
        style: RenderStyle::Wireframe,
        base_color: 0x4a5568,
        stack_offset: 1,
    },
    LayerSpec {
        id: LayerId::Filling,
        style: RenderStyle::Translucent,
        base_color: 0xa0aec0,
        stack_offset: 2,
    },
    LayerSpec {
        id: LayerId::Finishing,
        style: RenderStyle::Solid,
        base_color: 0xffffff,
        stack_offset: 3,
    },
];

/// Converts `0xRRGGBB` into a Bevy color.
pub fn color_from_hex(hex: u32) -> Color {
    let [_, r, g, b] = hex.to_be_bytes();
    Color::srgb_u8(r, g, b)
}

/// Live state of a single layer.
#[derive(Clone, Debug)]
pub struct LayerState {
    pub id: LayerId,
    pub style: RenderStyle,
    pub base_color: u32,
    pub stack_offset: u8,
    pub current_y: f32,
    pub highlight: HighlightState,
}

impl LayerState {
    fn from_spec(spec: &LayerSpec) -> Self {
        Self {
            id: spec.id,
            style: spec.style,
            base_color: spec.base_color,
            stack_offset: spec.stack_offset,
            current_y: 0.0,
            highlight: HighlightState::Normal,
        }
    }

    pub fn target_y(&self, explode: f32) -> f32 {
        self.stack_offset as f32 * explode
    }

    /// Transform of the layer mesh: lifted by `current_y`, surface laid flat in XZ.
    pub fn transform(&self) -> Transform {
        Transform::from_xyz(0.0, self.current_y, 0.0)
            .with_rotation(Quat::from_rotation_x(-FRAC_PI_2))
    }

    pub fn world_matrix(&self) -> Mat4 {
        self.transform().compute_matrix()
    }
}

/// Cursor shape the host should show over the viewport.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorAffordance {
    #[default]
    Default,
    Pointer,
}

/// The four layer render states: read by the frame loop, written by pointer handlers.
#[derive(Resource, Clone, Debug)]
pub struct LayerStack {
    layers: [LayerState; 4],
    hovered: Option<LayerId>,
    selected: Option<LayerId>,
}

impl Default for LayerStack {
    fn default() -> Self {
        Self {
            layers: LAYER_SPECS.map(|spec| LayerState::from_spec(&spec)),
            hovered: None,
            selected: None,
        }
    }
}

impl LayerStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[LayerState] {
        &self.layers
    }

    pub fn get(&self, id: LayerId) -> &LayerState {
        &self.layers[id.index()]
    }

    fn get_mut(&mut self, id: LayerId) -> &mut LayerState {
        &mut self.layers[id.index()]
    }

    pub fn hovered(&self) -> Option<LayerId> {
        self.hovered
    }

    pub fn selected(&self) -> Option<LayerId> {
        self.selected
    }

    /// Moves every layer one smoothing step toward `stack_offset × explode`.
    pub fn advance(&mut self, explode: f32) {
        for layer in &mut self.layers {
            let target = layer.target_y(explode);
            layer.current_y = smooth_toward(layer.current_y, target, EXPLODE_SMOOTHING);
        }
    }

    /// State a layer returns to when it is neither hovered nor selected.
    fn rest_state(&self) -> HighlightState {
        if self.selected.is_some() {
            HighlightState::Dimmed
        } else {
            HighlightState::Normal
        }
    }

    /// Applies a pointer-move hit result. Returns the cursor the host should show.
    pub fn hover(&mut self, hit: Option<LayerId>) -> CursorAffordance {
        if self.hovered != hit {
            let rest = self.rest_state();
            if let Some(previous) = self.hovered.filter(|&id| Some(id) != self.selected) {
                self.get_mut(previous).highlight = rest;
            }
            if let Some(next) = hit.filter(|&id| Some(id) != self.selected) {
                self.get_mut(next).highlight = HighlightState::Hovered;
            }
            self.hovered = hit;
        }

        if hit.is_some() {
            CursorAffordance::Pointer
        } else {
            CursorAffordance::Default
        }
    }

    /// Applies a click hit result and returns the selection to report to the host.
    ///
    /// A hit selects that layer and dims the rest; a miss clears the selection
    /// and restores every layer.
    pub fn select(&mut self, hit: Option<LayerId>) -> Option<LayerId> {
        if let Some(previous) = self.selected.take() {
            self.get_mut(previous).highlight = HighlightState::Normal;
        }

        match hit {
            Some(id) => {
                for layer in &mut self.layers {
                    layer.highlight = if layer.id == id {
                        HighlightState::Selected
                    } else {
                        HighlightState::Dimmed
                    };
                }
                self.selected = Some(id);
            }
            None => {
                for layer in &mut self.layers {
                    layer.highlight = HighlightState::Normal;
                }
                // Forget the hover so the next pointer move highlights again.
                self.hovered = None;
            }
        }

        self.selected
    }

    /// Snapshot of every layer's highlight, in stack order.
    pub fn highlights(&self) -> [HighlightState; 4] {
        [
            self.layers[0].highlight,
            self.layers[1].highlight,
            self.layers[2].highlight,
            self.layers[3].highlight,
        ]
    }
}

/// One exponential-smoothing step: closes `factor` of the gap, never overshoots.
pub fn smooth_toward(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(stack: &mut LayerStack, explode: f32, frames: usize) {
        for _ in 0..frames {
            stack.advance(explode);
        }
    }

    #[test]
    fn stack_offsets_are_increasing_permutation() {
        let offsets: Vec<u8> = LAYER_SPECS.iter().map(|s| s.stack_offset).collect();
        assert_eq!(offsets, vec![0, 1, 2, 3]);
        for (spec, id) in LAYER_SPECS.iter().zip(LayerId::ALL) {
            assert_eq!(spec.id, id);
            assert_eq!(spec.stack_offset as usize, id.index());
        }
    }

    #[test]
    fn wire_names_match_ids() {
        let names: Vec<String> = LayerId::ALL
            .iter()
            .map(|id| serde_json::to_string(id).unwrap())
            .collect();
        assert_eq!(
            names,
            vec!["\"gfcr\"", "\"mesh\"", "\"filling\"", "\"finishing\""]
        );
        let parsed: LayerId = serde_json::from_str("\"filling\"").unwrap();
        assert_eq!(parsed, LayerId::Filling);
    }

    #[test]
    fn current_y_converges_without_overshoot() {
        for explode in [0.0, 0.37, 1.0, 2.0] {
            let mut stack = LayerStack::new();
            // Start from a different explode so some layers move down.
            settle(&mut stack, 2.0 - explode, 200);

            let mut previous: Vec<f32> = stack.layers().iter().map(|l| l.current_y).collect();
            for _ in 0..120 {
                stack.advance(explode);
                for (layer, prev) in stack.layers().iter().zip(previous.iter_mut()) {
                    let target = layer.target_y(explode);
                    let before = (target - *prev).abs();
                    let after = (target - layer.current_y).abs();
                    assert!(after <= before, "{} moved away from target", layer.id);
                    assert!(
                        (layer.current_y - *prev) * (target - *prev) >= 0.0,
                        "{} overshot",
                        layer.id
                    );
                    *prev = layer.current_y;
                }
            }

            for layer in stack.layers() {
                assert!((layer.current_y - layer.target_y(explode)).abs() < 0.01);
            }
        }
    }

    #[test]
    fn single_step_closes_ten_percent() {
        let mut stack = LayerStack::new();
        stack.advance(2.0);
        let finishing = stack.get(LayerId::Finishing);
        assert!((finishing.current_y - 0.6).abs() < 1e-6);
        assert_eq!(stack.get(LayerId::Gfcr).current_y, 0.0);
    }

    #[test]
    fn selecting_dims_others_and_replaces_previous() {
        let mut stack = LayerStack::new();

        assert_eq!(stack.select(Some(LayerId::Mesh)), Some(LayerId::Mesh));
        assert_eq!(
            stack.highlights(),
            [
                HighlightState::Dimmed,
                HighlightState::Selected,
                HighlightState::Dimmed,
                HighlightState::Dimmed,
            ]
        );

        assert_eq!(stack.select(Some(LayerId::Finishing)), Some(LayerId::Finishing));
        let selected: Vec<LayerId> = stack
            .layers()
            .iter()
            .filter(|l| l.highlight == HighlightState::Selected)
            .map(|l| l.id)
            .collect();
        assert_eq!(selected, vec![LayerId::Finishing]);
        assert_eq!(stack.get(LayerId::Mesh).highlight, HighlightState::Dimmed);
    }

    #[test]
    fn clicking_empty_space_twice_is_idempotent() {
        let mut stack = LayerStack::new();
        stack.select(Some(LayerId::Filling));

        assert_eq!(stack.select(None), None);
        let first = stack.highlights();
        assert_eq!(stack.select(None), None);

        assert_eq!(stack.highlights(), first);
        assert_eq!(first, [HighlightState::Normal; 4]);
        assert_eq!(stack.selected(), None);
    }

    #[test]
    fn clearing_selection_restores_hovered_layer_too() {
        let mut stack = LayerStack::new();
        stack.hover(Some(LayerId::Gfcr));
        stack.select(Some(LayerId::Mesh));
        assert_eq!(stack.get(LayerId::Gfcr).highlight, HighlightState::Dimmed);

        stack.select(None);
        assert_eq!(stack.highlights(), [HighlightState::Normal; 4]);
        assert_eq!(stack.hovered(), None);

        assert_eq!(stack.hover(Some(LayerId::Gfcr)), CursorAffordance::Pointer);
        assert_eq!(stack.get(LayerId::Gfcr).highlight, HighlightState::Hovered);
    }

    #[test]
    fn hover_skips_selected_layer_and_restores_previous() {
        let mut stack = LayerStack::new();

        assert_eq!(stack.hover(Some(LayerId::Gfcr)), CursorAffordance::Pointer);
        assert_eq!(stack.get(LayerId::Gfcr).highlight, HighlightState::Hovered);

        stack.hover(Some(LayerId::Mesh));
        assert_eq!(stack.get(LayerId::Gfcr).highlight, HighlightState::Normal);
        assert_eq!(stack.get(LayerId::Mesh).highlight, HighlightState::Hovered);

        stack.select(Some(LayerId::Mesh));
        stack.hover(Some(LayerId::Filling));
        assert_eq!(stack.get(LayerId::Mesh).highlight, HighlightState::Selected);
        assert_eq!(stack.get(LayerId::Filling).highlight, HighlightState::Hovered);

        assert_eq!(stack.hover(None), CursorAffordance::Default);
        assert_eq!(stack.get(LayerId::Filling).highlight, HighlightState::Dimmed);
        assert_eq!(stack.get(LayerId::Mesh).highlight, HighlightState::Selected);
    }

    #[test]
    fn world_matrix_follows_current_y() {
        let mut stack = LayerStack::new();
        settle(&mut stack, 1.0, 300);
        let origin = stack
            .get(LayerId::Finishing)
            .world_matrix()
            .transform_point3(Vec3::ZERO);
        assert!((origin.y - 3.0).abs() < 1e-3);
        // Surface-local +Z (height) maps to world +Y.
        let up = stack
            .get(LayerId::Gfcr)
            .world_matrix()
            .transform_vector3(Vec3::Z);
        assert!((up - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn color_from_hex_splits_channels() {
        let color = color_from_hex(0x63b3ed).to_srgba();
        assert!((color.red - 0x63 as f32 / 255.0).abs() < 1e-6);
        assert!((color.green - 0xb3 as f32 / 255.0).abs() < 1e-6);
        assert!((color.blue - 0xed as f32 / 255.0).abs() < 1e-6);
    }
}
