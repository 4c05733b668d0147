// src/visualization.rs

use crate::components::PointKind;
use crate::error::VisualizationError;
use crate::resources::{ThumbnailStatus, VisualizationDialog, VisualizationOutcome};
use bevy::prelude::*;
use bevy::render::view::screenshot::{Screenshot, ScreenshotCaptured};
use bevy::tasks::{AsyncComputeTaskPool, Task};
use futures_lite::future;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Atom and electron positions pulled out of a simulation output file, in
/// file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub atoms: Vec<[f32; 3]>,
    pub electrons: Vec<[f32; 3]>,
    pub skipped: Vec<SkippedEntry>,
}

/// An entry that could not contribute a point.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedEntry {
    pub location: String,
    pub reason: String,
}

impl fmt::Display for SkippedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.reason)
    }
}

impl PointCloud {
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty() && self.electrons.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = (PointKind, Vec3)> + '_ {
        let atoms = self.atoms.iter().map(|p| (PointKind::Atom, Vec3::from(*p)));
        let electrons = self
            .electrons
            .iter()
            .map(|p| (PointKind::Electron, Vec3::from(*p)));
        atoms.chain(electrons)
    }

    pub fn centroid(&self) -> Option<Vec3> {
        let count = self.atoms.len() + self.electrons.len();
        if count == 0 {
            return None;
        }
        let sum: Vec3 = self.points().map(|(_, p)| p).sum();
        Some(sum / count as f32)
    }

    pub fn outcome(&self) -> VisualizationOutcome {
        if self.is_empty() {
            VisualizationOutcome::NoData
        } else {
            VisualizationOutcome::Rendered {
                atoms: self.atoms.len(),
                electrons: self.electrons.len(),
                skipped: self.skipped.clone(),
            }
        }
    }
}

/// Collects `atoms[*].position` and `electrons[*].position` across all
/// molecules. Malformed entries are skipped and recorded, never fatal; only a
/// missing or non-list `molecules` key fails the whole pass.
pub fn extract_point_cloud(data: &Value) -> Result<PointCloud, VisualizationError> {
    let molecules = match data.get("molecules") {
        None => return Err(VisualizationError::MissingMolecules),
        Some(Value::Array(molecules)) => molecules,
        Some(_) => {
            return Err(VisualizationError::InvalidShape {
                field: "molecules".into(),
                expected: "an array",
            });
        }
    };

    let mut cloud = PointCloud::default();
    for (m, molecule) in molecules.iter().enumerate() {
        let location = format!("molecules[{m}]");
        let Some(molecule) = molecule.as_object() else {
            cloud.skip(location, "molecule is not an object");
            continue;
        };
        for (key, kind) in [("atoms", PointKind::Atom), ("electrons", PointKind::Electron)] {
            let Some(entries) = molecule.get(key) else {
                continue;
            };
            let list_location = format!("{location}.{key}");
            let Some(entries) = entries.as_array() else {
                cloud.skip(list_location, "not a list");
                continue;
            };
            for (i, entry) in entries.iter().enumerate() {
                match parse_position(entry) {
                    Ok(position) => match kind {
                        PointKind::Atom => cloud.atoms.push(position),
                        PointKind::Electron => cloud.electrons.push(position),
                    },
                    Err(reason) => cloud.skip(format!("{list_location}[{i}]"), reason),
                }
            }
        }
    }
    Ok(cloud)
}

pub fn load_point_cloud(path: &Path) -> Result<PointCloud, VisualizationError> {
    let text = std::fs::read_to_string(path).map_err(|source| VisualizationError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let data: Value = serde_json::from_str(&text).map_err(|source| VisualizationError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    extract_point_cloud(&data)
}

/// `runs/sim.json` -> `runs/sim_thumbnail.png`
pub fn thumbnail_path(data_file: &Path) -> PathBuf {
    let stem = data_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "visualization".to_string());
    data_file.with_file_name(format!("{stem}_thumbnail.png"))
}

/// Encodes a captured frame as an RGB PNG at `path`.
pub fn write_thumbnail(image: &Image, path: &Path) -> Result<(), VisualizationError> {
    let failed = |reason: String| VisualizationError::Thumbnail {
        path: path.to_path_buf(),
        reason,
    };
    let frame = image
        .clone()
        .try_into_dynamic()
        .map_err(|e| failed(e.to_string()))?;
    frame
        .to_rgb8()
        .save(path)
        .map_err(|e| failed(e.to_string()))
}

impl PointCloud {
    fn skip(&mut self, location: String, reason: impl Into<String>) {
        self.skipped.push(SkippedEntry {
            location,
            reason: reason.into(),
        });
    }
}

fn parse_position(entry: &Value) -> Result<[f32; 3], String> {
    let Some(entry) = entry.as_object() else {
        return Err("entry is not an object".into());
    };
    let Some(position) = entry.get("position") else {
        return Err("missing 'position'".into());
    };
    let coords = position
        .as_array()
        .filter(|c| c.len() == 3)
        .ok_or_else(|| "'position' is not a 3-element list".to_string())?;
    let mut out = [0.0f32; 3];
    for (slot, value) in out.iter_mut().zip(coords) {
        *slot = value
            .as_f64()
            .ok_or_else(|| "'position' has a non-numeric coordinate".to_string())?
            as f32;
    }
    Ok(out)
}

// --- Events ---

/// Request to read a data file and render it.
#[derive(Event, Debug)]
pub struct VisualizeFileEvent(pub PathBuf);

/// A parsed cloud ready to replace whatever is currently rendered.
#[derive(Event, Debug)]
pub struct PointCloudReadyEvent {
    pub source: PathBuf,
    pub cloud: PointCloud,
}

/// Grab the primary window into the given PNG once the cloud is on screen.
#[derive(Event, Debug)]
pub struct CaptureThumbnailEvent(pub PathBuf);

type LoadResult = (PathBuf, Result<PointCloud, VisualizationError>);

#[derive(Component)]
struct VisualizationTask(Option<Task<LoadResult>>);

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct VisualizationSet;

pub struct VisualizationPlugin;

impl Plugin for VisualizationPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<VisualizeFileEvent>()
            .add_event::<PointCloudReadyEvent>()
            .add_event::<CaptureThumbnailEvent>()
            .add_systems(
                Update,
                (
                    trigger_visualization,
                    handle_visualization_result,
                    capture_thumbnail,
                )
                    .chain()
                    .in_set(VisualizationSet),
            );
    }
}

fn trigger_visualization(
    mut commands: Commands,
    mut events: EventReader<VisualizeFileEvent>,
    mut dialog: ResMut<VisualizationDialog>,
    mut existing_tasks: Query<(Entity, &mut VisualizationTask)>,
) {
    let Some(VisualizeFileEvent(path)) = events.read().last() else {
        return;
    };

    for (entity, mut task) in &mut existing_tasks {
        info!("[VIS] Cancelling previous visualization task.");
        // Dropping the handle cancels the task.
        drop(task.0.take());
        commands.entity(entity).despawn();
    }

    info!("[VIS] Loading point cloud from {}", path.display());
    dialog.pending = true;
    let path = path.clone();
    let task = AsyncComputeTaskPool::get().spawn(async move {
        let result = load_point_cloud(&path);
        (path, result)
    });
    commands.spawn(VisualizationTask(Some(task)));
}

fn handle_visualization_result(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut VisualizationTask)>,
    mut dialog: ResMut<VisualizationDialog>,
    mut ready_writer: EventWriter<PointCloudReadyEvent>,
) {
    for (entity, mut task_component) in &mut tasks {
        let Some(task) = task_component.0.as_mut() else {
            continue;
        };
        let Some((source, result)) = future::block_on(future::poll_once(task)) else {
            continue;
        };
        commands.entity(entity).despawn();
        dialog.pending = false;

        match result {
            Ok(cloud) => {
                for skipped in &cloud.skipped {
                    warn!("[VIS] Skipped {}", skipped);
                }
                info!(
                    "[VIS] Loaded {} atoms and {} electrons from {} ({} skipped).",
                    cloud.atoms.len(),
                    cloud.electrons.len(),
                    source.display(),
                    cloud.skipped.len()
                );
                dialog.outcome = Some(cloud.outcome());
                dialog.preview = cloud.clone();
                dialog.thumbnail = None;
                ready_writer.write(PointCloudReadyEvent { source, cloud });
            }
            Err(e) => {
                error!("[VIS] FAILED to visualize {}: {}", source.display(), e);
                dialog.outcome = Some(VisualizationOutcome::Failed(e.to_string()));
                dialog.preview = PointCloud::default();
            }
        }
    }
}

fn capture_thumbnail(
    mut commands: Commands,
    mut events: EventReader<CaptureThumbnailEvent>,
    mut dialog: ResMut<VisualizationDialog>,
) {
    let Some(CaptureThumbnailEvent(path)) = events.read().last() else {
        return;
    };
    info!("[VIS] Capturing thumbnail to {}", path.display());
    commands
        .spawn(Screenshot::primary_window())
        .observe(store_thumbnail(path.clone()));
    dialog.thumbnail = Some(ThumbnailStatus::Capturing(path.clone()));
}

/// Observer for a screenshot entity: writes the frame and records the result
/// in the dialog.
fn store_thumbnail(
    path: PathBuf,
) -> impl FnMut(Trigger<ScreenshotCaptured>, ResMut<VisualizationDialog>) {
    move |captured, mut dialog| {
        // A newer capture owns the dialog now.
        if dialog.thumbnail != Some(ThumbnailStatus::Capturing(path.clone())) {
            return;
        }
        dialog.thumbnail = Some(match write_thumbnail(&captured.event().0, &path) {
            Ok(()) => {
                info!("[VIS] Saved thumbnail to {}", path.display());
                ThumbnailStatus::Saved(path.clone())
            }
            Err(e) => {
                error!("[VIS] FAILED to save thumbnail: {}", e);
                ThumbnailStatus::Failed(e.to_string())
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn collects_positions_across_molecules_in_order() {
        let data = json!({
            "molecules": [
                {
                    "name": "H2",
                    "atoms": [{"position": [0, 0, 0]}, {"position": [0.74, 0, 0]}],
                    "electrons": [{"position": [0.37, 0.1, 0.0]}]
                },
                {
                    "name": "He",
                    "atoms": [{"position": [5.0, 5.0, 5.0], "element": "He"}],
                    "electrons": []
                }
            ]
        });
        let cloud = extract_point_cloud(&data).unwrap();
        assert_eq!(
            cloud.atoms,
            vec![[0.0, 0.0, 0.0], [0.74, 0.0, 0.0], [5.0, 5.0, 5.0]]
        );
        assert_eq!(cloud.electrons, vec![[0.37, 0.1, 0.0]]);
        assert!(cloud.skipped.is_empty());
    }

    #[test]
    fn molecules_without_particle_lists_contribute_nothing() {
        let data = json!({"molecules": [{"name": "ghost"}]});
        let cloud = extract_point_cloud(&data).unwrap();
        assert!(cloud.is_empty());
        assert!(cloud.skipped.is_empty());
        assert!(matches!(cloud.outcome(), VisualizationOutcome::NoData));
    }

    #[test]
    fn malformed_entries_are_skipped_and_reported() {
        let data = json!({
            "molecules": [
                {
                    "atoms": [
                        {"position": [1, 2, 3]},
                        {"element": "C"},
                        {"position": [1, 2]},
                        {"position": [1, "y", 3]},
                        "not-an-object"
                    ],
                    "electrons": {"position": [0, 0, 0]}
                },
                17
            ]
        });
        let cloud = extract_point_cloud(&data).unwrap();
        assert_eq!(cloud.atoms, vec![[1.0, 2.0, 3.0]]);
        assert!(cloud.electrons.is_empty());

        let locations: Vec<_> = cloud.skipped.iter().map(|s| s.location.as_str()).collect();
        assert_eq!(
            locations,
            [
                "molecules[0].atoms[1]",
                "molecules[0].atoms[2]",
                "molecules[0].atoms[3]",
                "molecules[0].atoms[4]",
                "molecules[0].electrons",
                "molecules[1]",
            ]
        );
        assert_eq!(
            cloud.skipped[0].to_string(),
            "molecules[0].atoms[1]: missing 'position'"
        );

        match cloud.outcome() {
            VisualizationOutcome::Rendered {
                atoms,
                electrons,
                skipped,
            } => {
                assert_eq!((atoms, electrons), (1, 0));
                assert_eq!(skipped.len(), 6);
            }
            other => panic!("expected a rendered outcome, got {other:?}"),
        }
    }

    #[test]
    fn missing_or_malformed_molecule_list_fails() {
        assert!(matches!(
            extract_point_cloud(&json!({"simulation": {}})),
            Err(VisualizationError::MissingMolecules)
        ));
        assert!(matches!(
            extract_point_cloud(&json!({"molecules": "H2O"})),
            Err(VisualizationError::InvalidShape { ref field, .. }) if field == "molecules"
        ));
    }

    #[test]
    fn centroid_averages_every_point() {
        let cloud = PointCloud {
            atoms: vec![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0]],
            electrons: vec![[1.0, 3.0, 0.0]],
            skipped: Vec::new(),
        };
        assert_eq!(cloud.centroid(), Some(Vec3::new(1.0, 1.0, 0.0)));
        assert_eq!(PointCloud::default().centroid(), None);
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_point_cloud(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, VisualizationError::Io { .. }));
    }

    #[test]
    fn load_reports_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{\"molecules\": [").unwrap();
        let err = load_point_cloud(file.path()).unwrap_err();
        assert!(matches!(err, VisualizationError::Json { .. }));
    }

    #[test]
    fn load_reads_saved_output() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"molecules": [{{"name": "H", "atoms": [{{"position": [1, 1, 1]}}], "electrons": [{{"position": [1.5, 1, 1]}}]}}]}}"#
        )
        .unwrap();
        let cloud = load_point_cloud(file.path()).unwrap();
        assert_eq!(cloud.atoms, vec![[1.0, 1.0, 1.0]]);
        assert_eq!(cloud.electrons, vec![[1.5, 1.0, 1.0]]);
    }

    fn solid_frame() -> Image {
        use bevy::asset::RenderAssetUsages;
        use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
        Image::new_fill(
            Extent3d {
                width: 4,
                height: 3,
                depth_or_array_layers: 1,
            },
            TextureDimension::D2,
            &[40, 200, 40, 255],
            TextureFormat::Rgba8UnormSrgb,
            RenderAssetUsages::default(),
        )
    }

    fn deliver_frame(path: &Path) -> VisualizationDialog {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.world_mut().insert_resource(VisualizationDialog {
            thumbnail: Some(ThumbnailStatus::Capturing(path.to_path_buf())),
            ..VisualizationDialog::default()
        });
        let screenshot = app
            .world_mut()
            .spawn_empty()
            .observe(store_thumbnail(path.to_path_buf()))
            .id();
        app.world_mut()
            .trigger_targets(ScreenshotCaptured(solid_frame()), screenshot);
        app.world_mut().flush();
        app.world_mut()
            .remove_resource::<VisualizationDialog>()
            .unwrap()
    }

    #[test]
    fn thumbnail_is_reported_once_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run_thumbnail.png");

        let dialog = deliver_frame(&path);

        assert_eq!(dialog.thumbnail, Some(ThumbnailStatus::Saved(path.clone())));
        assert!(std::fs::metadata(&path).unwrap().len() > 0);
    }

    #[test]
    fn unwritable_thumbnail_is_reported_as_failed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no_such_dir").join("run_thumbnail.png");

        assert!(matches!(
            write_thumbnail(&solid_frame(), &path),
            Err(VisualizationError::Thumbnail { .. })
        ));
        let dialog = deliver_frame(&path);

        assert!(matches!(dialog.thumbnail, Some(ThumbnailStatus::Failed(_))));
        assert!(!path.exists());
    }

    #[test]
    fn thumbnail_sits_next_to_data_file() {
        assert_eq!(
            thumbnail_path(Path::new("runs/simulation_data.json")),
            PathBuf::from("runs/simulation_data_thumbnail.png")
        );
    }
}
