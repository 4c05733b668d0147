// src/main.rs

mod components;
mod config;
mod error;
mod interaction;
mod persistence;
mod resources;
mod setup;
mod spawning;
mod spawning_utils;
mod ui;
mod visualization;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use bevy_panorbit_camera::PanOrbitCameraPlugin;
use clap::Parser;
use interaction::InteractionPlugin;
use persistence::PersistencePlugin;
use resources::*;
use setup::{SetupPlugin, StartupConfigFile};
use spawning::SpawningPlugin;
use std::path::PathBuf;
use ui::UIPlugin;
use visualization::VisualizationPlugin;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct CliArgs {
    /// Configuration file to load on startup.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulation output file offered in the visualization dialog. May be repeated.
    #[arg(short, long = "data", default_value = DEFAULT_DATA_FILE)]
    data_files: Vec<String>,

    /// Default path suggested when saving or loading a configuration.
    #[arg(long, default_value = DEFAULT_SAVE_PATH)]
    save_path: String,
}

pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ConfigEditor>()
            .init_resource::<ActiveConfigFile>()
            .init_resource::<LastSaveTime>()
            .init_resource::<ErrorDialog>()
            .init_resource::<FilePrompt>()
            .init_resource::<VisualizationDialog>();
    }
}

fn main() {
    let args = CliArgs::parse();

    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Molecular Simulation Control".into(),
            ..default()
        }),
        ..default()
    }))
    .add_plugins(CorePlugin)
    .insert_resource(FilePrompt::new(args.save_path.clone()))
    .insert_resource(VisualizationDialog::new(args.data_files.clone()))
    .insert_resource(StartupConfigFile(args.config.clone()))
    .add_plugins((
        PanOrbitCameraPlugin,
        EguiPlugin::default(),
        SetupPlugin,
        UIPlugin,
        VisualizationPlugin,
        InteractionPlugin,
        SpawningPlugin,
        PersistencePlugin,
    ));

    info!(
        "CLI arguments parsed. Startup config: {:?}, data files: {:?}",
        args.config, args.data_files
    );
    app.run();
}
