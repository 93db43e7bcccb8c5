//! Host-side egui panel: explode slider and details of the selected layer.

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPlugin};

use crate::host::{ExplodeAmount, PointerCapture};
use crate::layers::{LayerCatalog, LayerInfo, LayerStack};
use crate::lifecycle::loop_running;
use crate::ExplorerSet;

const ACCENT: egui::Color32 = egui::Color32::from_rgb(99, 179, 237);
const MUTED: egui::Color32 = egui::Color32::from_rgb(160, 174, 192);

pub fn info_panel_plugin(app: &mut App) {
    app.add_plugins(EguiPlugin)
        .add_systems(
            Update,
            pointer_capture_system.before(ExplorerSet::Input),
        )
        .add_systems(
            Update,
            info_panel_system
                .after(ExplorerSet::Tick)
                .run_if(loop_running),
        );
}

/// Keeps scene picking and orbiting off while egui owns the pointer.
fn pointer_capture_system(mut contexts: EguiContexts, mut capture: ResMut<PointerCapture>) {
    let ctx = contexts.ctx_mut();
    let captured = ctx.wants_pointer_input() || ctx.is_pointer_over_area();
    if capture.captured != captured {
        capture.captured = captured;
    }
}

fn info_panel_system(
    mut contexts: EguiContexts,
    mut explode: ResMut<ExplodeAmount>,
    stack: Res<LayerStack>,
    catalog: Res<LayerCatalog>,
) {
    egui::SidePanel::right("layer_info")
        .default_width(280.0)
        .frame(
            egui::Frame::default()
                .fill(egui::Color32::from_rgba_premultiplied(26, 32, 44, 230))
                .inner_margin(egui::Margin::same(14)),
        )
        .show(contexts.ctx_mut(), |ui| {
            ui.visuals_mut().override_text_color = Some(egui::Color32::from_rgb(226, 232, 240));

            ui.label(egui::RichText::new("Layer Explorer").size(18.0).color(ACCENT));
            ui.add_space(8.0);

            let mut value = explode.get();
            let slider = egui::Slider::new(&mut value, ExplodeAmount::MIN..=ExplodeAmount::MAX)
                .step_by(f64::from(ExplodeAmount::STEP))
                .text("Explode");
            if ui.add(slider).changed() {
                explode.set(value);
            }
            ui.add_space(12.0);
            ui.separator();

            match stack.selected() {
                Some(id) => layer_details(ui, catalog.get(id)),
                None => {
                    ui.label(
                        egui::RichText::new("Click a layer to inspect it")
                            .size(12.0)
                            .color(MUTED),
                    );
                }
            }
        });
}

fn layer_details(ui: &mut egui::Ui, info: &LayerInfo) {
    ui.label(egui::RichText::new(&info.title).size(16.0).color(ACCENT));
    ui.add_space(6.0);
    for (heading, text) in [
        ("Material", &info.material),
        ("Function", &info.function),
        ("Characteristic", &info.characteristic),
    ] {
        ui.label(egui::RichText::new(heading).size(11.0).color(MUTED));
        ui.label(text.as_str());
        ui.add_space(4.0);
    }
}
