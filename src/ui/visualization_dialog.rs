// src/ui/visualization_dialog.rs

use crate::resources::{ThumbnailStatus, VisualizationDialog, VisualizationOutcome};
use crate::visualization::VisualizeFileEvent;
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};
use egui_plot::{Legend, Plot, PlotPoints, Points};
use std::path::PathBuf;

/// Text typed into the "add file" field; kept out of the dialog resource
/// since nothing else reads it.
#[derive(Resource, Default)]
struct NewFileEntry(String);

pub struct VisualizationDialogPlugin;

impl Plugin for VisualizationDialogPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NewFileEntry>()
            .add_systems(EguiPrimaryContextPass, visualization_dialog_egui_system);
    }
}

fn visualization_dialog_egui_system(
    mut contexts: EguiContexts,
    mut dialog: ResMut<VisualizationDialog>,
    mut new_file: ResMut<NewFileEntry>,
    mut visualize_writer: EventWriter<VisualizeFileEvent>,
) {
    if !dialog.open {
        return;
    }
    let Ok(ctx) = contexts.ctx_mut() else { return };
    let dialog = &mut *dialog;

    let mut open = dialog.open;
    egui::Window::new("Visualization")
        .open(&mut open)
        .anchor(egui::Align2::RIGHT_TOP, egui::vec2(-10.0, 40.0))
        .default_width(360.0)
        .show(ctx, |ui| {
            if dialog.files.is_empty() {
                ui.label("No data files listed.");
            } else {
                let files = &dialog.files;
                egui::ComboBox::from_label("Data file").show_index(
                    ui,
                    &mut dialog.selected,
                    files.len(),
                    |i| files[i].clone(),
                );
            }

            ui.horizontal(|ui| {
                ui.text_edit_singleline(&mut new_file.0);
                let entry = new_file.0.trim().to_string();
                if ui.button("Add").clicked() && !entry.is_empty() {
                    let mut files = dialog.files.clone();
                    if !files.contains(&entry) {
                        files.push(entry.clone());
                    }
                    dialog.populate_files(files);
                    dialog.selected = dialog.files.iter().position(|f| *f == entry).unwrap_or(0);
                    new_file.0.clear();
                }
            });

            let can_visualize = !dialog.pending && dialog.selected_file().is_some();
            if ui
                .add_enabled(can_visualize, egui::Button::new("Visualize"))
                .clicked()
            {
                if let Some(file) = dialog.selected_file() {
                    visualize_writer.write(VisualizeFileEvent(PathBuf::from(file)));
                }
            }
            if dialog.pending {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading...");
                });
            }

            ui.separator();
            match &dialog.outcome {
                None => {
                    ui.label("Pick a file and press Visualize.");
                }
                Some(VisualizationOutcome::NoData) => {
                    ui.label("No atom or electron positions found.");
                }
                Some(VisualizationOutcome::Failed(message)) => {
                    ui.colored_label(egui::Color32::from_rgb(220, 80, 80), message);
                }
                Some(VisualizationOutcome::Rendered {
                    atoms,
                    electrons,
                    skipped,
                }) => {
                    ui.label(format!("{atoms} atoms, {electrons} electrons"));
                    if !skipped.is_empty() {
                        egui::CollapsingHeader::new(format!("{} entries skipped", skipped.len()))
                            .show(ui, |ui| {
                                for entry in skipped {
                                    ui.label(entry.to_string());
                                }
                            });
                    }
                }
            }

            if !dialog.preview.is_empty() {
                let atoms = Points::new(
                    "Atoms",
                    PlotPoints::from_iter(
                        dialog
                            .preview
                            .atoms
                            .iter()
                            .map(|p| [f64::from(p[0]), f64::from(p[1])]),
                    ),
                )
                .color(egui::Color32::GREEN)
                .radius(3.0);
                let electrons = Points::new(
                    "Electrons",
                    PlotPoints::from_iter(
                        dialog
                            .preview
                            .electrons
                            .iter()
                            .map(|p| [f64::from(p[0]), f64::from(p[1])]),
                    ),
                )
                .color(egui::Color32::RED)
                .radius(1.5);

                Plot::new("xy_projection")
                    .legend(Legend::default())
                    .data_aspect(1.0)
                    .height(220.0)
                    .x_axis_label("x")
                    .y_axis_label("y")
                    .show(ui, |plot_ui| {
                        plot_ui.points(atoms);
                        plot_ui.points(electrons);
                    });
            }

            match &dialog.thumbnail {
                Some(ThumbnailStatus::Capturing(_)) => {
                    ui.label("Capturing thumbnail...");
                }
                Some(ThumbnailStatus::Saved(path)) => {
                    ui.label(format!("Thumbnail: {}", path.display()));
                }
                Some(ThumbnailStatus::Failed(reason)) => {
                    ui.colored_label(egui::Color32::from_rgb(220, 80, 80), reason.as_str());
                }
                None => {}
            }
        });
    dialog.open = open;
}
