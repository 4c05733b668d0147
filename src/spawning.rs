// src/spawning.rs

use crate::components::{CloudPoint, PointCloudRoot, PointKind};
use crate::resources::SharedAssetHandles;
use crate::visualization::{
    CaptureThumbnailEvent, PointCloudReadyEvent, VisualizationSet, thumbnail_path,
};
use bevy::prelude::*;
use bevy_panorbit_camera::PanOrbitCamera;

pub struct SpawningPlugin;

impl Plugin for SpawningPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            spawn_point_cloud
                .run_if(on_event::<PointCloudReadyEvent>)
                .after(VisualizationSet),
        );
    }
}

/// Replaces the rendered cloud with the newest one and re-centres the camera
/// on it.
fn spawn_point_cloud(
    mut commands: Commands,
    mut events: EventReader<PointCloudReadyEvent>,
    assets: Res<SharedAssetHandles>,
    existing: Query<Entity, With<PointCloudRoot>>,
    mut camera_query: Query<&mut PanOrbitCamera>,
    mut thumbnail_writer: EventWriter<CaptureThumbnailEvent>,
) {
    let Some(event) = events.read().last() else {
        return;
    };

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    if event.cloud.is_empty() {
        info!(
            "[VIS] {} holds no positions; nothing to draw.",
            event.source.display()
        );
        return;
    }

    commands
        .spawn((
            PointCloudRoot,
            Name::new(format!("Point Cloud ({})", event.source.display())),
            Transform::default(),
            Visibility::default(),
        ))
        .with_children(|parent| {
            for (kind, position) in event.cloud.points() {
                let (mesh, material) = match kind {
                    PointKind::Atom => (&assets.atom_mesh, &assets.atom_material),
                    PointKind::Electron => (&assets.electron_mesh, &assets.electron_material),
                };
                parent.spawn((
                    CloudPoint(kind),
                    Name::new(kind.to_string()),
                    Mesh3d(mesh.clone()),
                    MeshMaterial3d(material.clone()),
                    Transform::from_translation(position),
                ));
            }
        });
    info!(
        "[VIS] Spawned {} atoms and {} electrons.",
        event.cloud.atoms.len(),
        event.cloud.electrons.len()
    );

    if let (Some(centroid), Ok(mut camera)) = (event.cloud.centroid(), camera_query.single_mut()) {
        camera.target_focus = centroid;
    }

    thumbnail_writer.write(CaptureThumbnailEvent(thumbnail_path(&event.source)));
}
