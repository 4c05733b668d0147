// src/ui/mod.rs

mod config_form;
mod dialogs;
mod help_panel;
mod visualization_dialog;

use crate::interaction::InteractionSet;
use crate::resources::{FilePrompt, FilePromptKind, LastSaveTime, VisualizationDialog};
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};

use config_form::ConfigFormPlugin;
use dialogs::DialogsPlugin;
use help_panel::HelpPanelPlugin;
use visualization_dialog::VisualizationDialogPlugin;

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct UiSet;

pub struct UIPlugin;

impl Plugin for UIPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(Update, UiSet.after(InteractionSet))
            // The menu bar must claim its strip before the side panel lays out.
            .add_systems(
                EguiPrimaryContextPass,
                menu_bar_egui_system.before(config_form::config_form_egui_system),
            )
            .add_plugins((
                ConfigFormPlugin,
                DialogsPlugin,
                HelpPanelPlugin,
                VisualizationDialogPlugin,
            ))
            .add_systems(Update, handle_file_shortcuts.in_set(UiSet));
    }
}

fn menu_bar_egui_system(
    mut contexts: EguiContexts,
    mut prompt: ResMut<FilePrompt>,
    mut vis_dialog: ResMut<VisualizationDialog>,
    last_save_time: Res<LastSaveTime>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
        egui::menu::bar(ui, |ui| {
            ui.menu_button("File", |ui| {
                if ui.button("Save Configuration").clicked() {
                    prompt.open(FilePromptKind::Save);
                    ui.close_menu();
                }
                if ui.button("Load Configuration").clicked() {
                    prompt.open(FilePromptKind::Load);
                    ui.close_menu();
                }
            });
            ui.menu_button("View", |ui| {
                if ui.button("Visualize Data").clicked() {
                    vis_dialog.open = true;
                    ui.close_menu();
                }
            });
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(&last_save_time.display_text);
            });
        });
    });
}

/// Ctrl+S / Ctrl+O open the save and load prompts.
fn handle_file_shortcuts(keys: Res<ButtonInput<KeyCode>>, mut prompt: ResMut<FilePrompt>) {
    let ctrl = keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);
    if !ctrl {
        return;
    }
    if keys.just_pressed(KeyCode::KeyS) {
        prompt.open(FilePromptKind::Save);
    } else if keys.just_pressed(KeyCode::KeyO) {
        prompt.open(FilePromptKind::Load);
    }
}
