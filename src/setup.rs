// src/setup.rs

use super::resources::*;
use crate::components::PointKind;
use crate::persistence::LoadConfigEvent;
use crate::spawning_utils::get_point_visuals;
use bevy::prelude::*;
use bevy_panorbit_camera::PanOrbitCamera;
use std::path::PathBuf;

/// Configuration file to open once the app is up, if any.
#[derive(Resource, Default)]
pub struct StartupConfigFile(pub Option<PathBuf>);

pub struct SetupPlugin;

impl Plugin for SetupPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<StartupConfigFile>().add_systems(
            Startup,
            (setup_scene, setup_shared_assets, trigger_startup_load).chain(),
        );
    }
}

fn setup_scene(mut commands: Commands) {
    info!("Setting up scene: Camera, Light");
    commands.spawn((
        PanOrbitCamera::default(),
        Transform::from_xyz(-3.0, 4.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight::default(),
        Transform::from_xyz(10.0, 20.0, 10.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
}

fn setup_shared_assets(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let (atom_radius, atom_color) = get_point_visuals(PointKind::Atom);
    let (electron_radius, electron_color) = get_point_visuals(PointKind::Electron);

    commands.insert_resource(SharedAssetHandles {
        atom_mesh: meshes.add(Sphere::new(atom_radius)),
        atom_material: materials.add(atom_color),
        electron_mesh: meshes.add(Sphere::new(electron_radius)),
        electron_material: materials.add(electron_color),
    });
}

fn trigger_startup_load(
    startup_file: Res<StartupConfigFile>,
    mut load_writer: EventWriter<LoadConfigEvent>,
) {
    if let Some(path) = &startup_file.0 {
        info!("Loading startup configuration from {}", path.display());
        load_writer.write(LoadConfigEvent(path.clone()));
    }
}
