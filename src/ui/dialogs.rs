// src/ui/dialogs.rs

use crate::persistence::{LoadConfigEvent, SaveConfigEvent};
use crate::resources::{ErrorDialog, FilePrompt, FilePromptKind};
use bevy::prelude::*;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};
use std::path::PathBuf;

pub struct DialogsPlugin;

impl Plugin for DialogsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            EguiPrimaryContextPass,
            (file_prompt_egui_system, error_dialog_egui_system).chain(),
        );
    }
}

/// Asks for the path to save to or load from.
fn file_prompt_egui_system(
    mut contexts: EguiContexts,
    mut prompt: ResMut<FilePrompt>,
    mut save_writer: EventWriter<SaveConfigEvent>,
    mut load_writer: EventWriter<LoadConfigEvent>,
) {
    let Some(kind) = prompt.kind else { return };
    let Ok(ctx) = contexts.ctx_mut() else { return };

    let (title, action) = match kind {
        FilePromptKind::Save => ("Save Configuration", "Save"),
        FilePromptKind::Load => ("Load Configuration", "Load"),
    };

    let mut open = true;
    let mut confirmed = false;
    let mut cancelled = false;
    egui::Window::new(title)
        .open(&mut open)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label("JSON Files (*.json)");
            let response = ui.text_edit_singleline(&mut prompt.path);
            let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            ui.horizontal(|ui| {
                if ui.button(action).clicked() || submitted {
                    confirmed = true;
                }
                if ui.button("Cancel").clicked() {
                    cancelled = true;
                }
            });
        });

    if confirmed {
        let path = prompt.path.trim();
        if path.is_empty() {
            return;
        }
        let path = PathBuf::from(path);
        match kind {
            FilePromptKind::Save => {
                save_writer.write(SaveConfigEvent(path));
            }
            FilePromptKind::Load => {
                load_writer.write(LoadConfigEvent(path));
            }
        }
        prompt.kind = None;
    } else if cancelled || !open {
        prompt.kind = None;
    }
}

fn error_dialog_egui_system(mut contexts: EguiContexts, mut error_dialog: ResMut<ErrorDialog>) {
    let Some(message) = error_dialog.message.clone() else {
        return;
    };
    let Ok(ctx) = contexts.ctx_mut() else { return };

    let mut dismissed = false;
    egui::Window::new("Error")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(message);
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });

    if dismissed {
        error_dialog.message = None;
    }
}
