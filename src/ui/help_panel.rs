// src/ui/help_panel.rs

use super::UiSet;
use crate::components::{CloudPoint, count_by_kind};
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};

/// A resource to control the visibility of the help window.
#[derive(Resource, Default)]
struct HelpPanelState {
    is_open: bool,
}

pub struct HelpPanelPlugin;

impl Plugin for HelpPanelPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<HelpPanelState>()
            .add_systems(Update, toggle_help_visibility.in_set(UiSet))
            .add_systems(EguiPrimaryContextPass, help_panel_egui_system);
    }
}

/// 'H' toggles the help window, unless a text field has focus.
fn toggle_help_visibility(
    keys: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    mut help_state: ResMut<HelpPanelState>,
) {
    if !keys.just_pressed(KeyCode::KeyH) {
        return;
    }
    if let Ok(ctx) = contexts.ctx_mut() {
        if ctx.wants_keyboard_input() {
            return;
        }
    }
    help_state.is_open = !help_state.is_open;
}

fn help_panel_egui_system(
    mut contexts: EguiContexts,
    mut panel_state: ResMut<HelpPanelState>,
    points: Query<&CloudPoint>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    if panel_state.is_open {
        egui::Window::new("Help")
            .open(&mut panel_state.is_open)
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(-10.0, -10.0))
            .resizable(false)
            .show(ctx, |ui| {
                egui::Grid::new("help_grid")
                    .num_columns(2)
                    .spacing([20.0, 4.0])
                    .striped(true)
                    .show(ui, |ui| {
                        ui.label("h");
                        ui.label("Toggle this help window");
                        ui.end_row();

                        ui.label("Ctrl+S");
                        ui.label("Save configuration");
                        ui.end_row();

                        ui.label("Ctrl+O");
                        ui.label("Load configuration");
                        ui.end_row();

                        ui.label("LMB Drag");
                        ui.label("Rotate Camera");
                        ui.end_row();

                        ui.label("RMB Drag");
                        ui.label("Pan Camera");
                        ui.end_row();

                        ui.label("Scroll");
                        ui.label("Zoom Camera");
                        ui.end_row();

                        if !points.is_empty() {
                            ui.separator();
                            ui.end_row();

                            ui.label("F");
                            ui.label("Focus camera on the point cloud");
                            ui.end_row();

                            let (atoms, electrons) = count_by_kind(&points);
                            ui.label("On screen");
                            ui.label(format!("{atoms} atoms, {electrons} electrons"));
                            ui.end_row();
                        }
                    });

                ui.separator();
                ui.label("View → Visualize Data opens a saved simulation output.");
            });
    } else {
        egui::Area::new(egui::Id::new("Help Opener Area"))
            .anchor(egui::Align2::RIGHT_BOTTOM, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    let response = ui.button("❔ Help (H)");
                    if response.clicked() {
                        panel_state.is_open = true;
                    }
                    response.on_hover_text("Click or press 'H' to open the help panel.");
                });
            });
    }
}
