// src/ui/config_form.rs

use crate::resources::ConfigEditor;
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};

pub struct ConfigFormPlugin;

impl Plugin for ConfigFormPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(EguiPrimaryContextPass, config_form_egui_system);
    }
}

/// Dragging keeps `dt` positive; a value loaded from a file is shown as-is
/// and never clamped.
fn time_step_drag_value(time_step: &mut f64) -> egui::DragValue<'_> {
    egui::DragValue::new(time_step)
        .speed(0.001)
        .range(f64::MIN_POSITIVE..=f64::MAX)
        .clamp_existing_to_range(false)
        .max_decimals(9)
}

/// The configuration form, docked on the left. Edits go straight into the
/// [`ConfigEditor`]; problems with the molecule text are flagged live.
pub(super) fn config_form_egui_system(mut contexts: EguiContexts, mut editor: ResMut<ConfigEditor>) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    egui::SidePanel::left("configuration_form")
        .default_width(380.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.heading("Simulation Configuration");
            ui.add_space(6.0);

            egui::Grid::new("configuration_grid")
                .num_columns(2)
                .spacing([12.0, 6.0])
                .show(ui, |ui| {
                    ui.label("MongoDB URI:");
                    ui.text_edit_singleline(&mut editor.connection_uri);
                    ui.end_row();

                    ui.label("Database Name:");
                    ui.text_edit_singleline(&mut editor.database_name);
                    ui.end_row();

                    ui.label("Collection Name:");
                    ui.text_edit_singleline(&mut editor.collection_name);
                    ui.end_row();

                    ui.label("Number of Steps:");
                    ui.add(egui::DragValue::new(&mut editor.step_count).range(0..=u64::MAX));
                    ui.end_row();

                    ui.label("Time Step (dt):");
                    ui.add(time_step_drag_value(&mut editor.time_step));
                    ui.end_row();
                });

            ui.separator();
            ui.label("Molecule Configuration (JSON):");

            let status = editor.to_configuration().map(|c| c.molecules.len());
            egui::ScrollArea::vertical()
                .max_height(ui.available_height() - 40.0)
                .show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut editor.molecules_json)
                            .code_editor()
                            .desired_rows(16)
                            .desired_width(f32::INFINITY),
                    );
                });

            match status {
                Ok(count) => {
                    ui.label(format!("{count} molecule(s) defined."));
                }
                Err(e) => {
                    ui.colored_label(egui::Color32::from_rgb(220, 80, 80), e.to_string());
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draw_once(time_step: &mut f64) {
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.add(time_step_drag_value(time_step));
            });
        });
    }

    #[test]
    fn drawing_the_form_leaves_extreme_time_steps_alone() {
        for loaded in [1e-12, 5e6, 1e300, f64::MIN_POSITIVE] {
            let mut time_step = loaded;
            draw_once(&mut time_step);
            assert_eq!(time_step, loaded);
        }
    }
}
