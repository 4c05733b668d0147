// src/persistence.rs

use crate::config::Configuration;
use crate::error::ConfigError;
use crate::resources::{ActiveConfigFile, ConfigEditor, ErrorDialog, LastSaveTime};
use bevy::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Writes the configuration as pretty-printed JSON, replacing any existing
/// file.
pub fn save_configuration(path: &Path, config: &Configuration) -> Result<(), ConfigError> {
    std::fs::write(path, config.to_json_pretty()).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_configuration(path: &Path) -> Result<Configuration, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let value: Value = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    match value {
        Value::Object(doc) => Configuration::from_document(&doc),
        _ => Err(ConfigError::InvalidShape {
            field: "<root>".into(),
            expected: "an object",
        }),
    }
}

pub struct PersistencePlugin;

impl Plugin for PersistencePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<SaveConfigEvent>()
            .add_event::<LoadConfigEvent>()
            .add_systems(
                Update,
                (
                    save_config_on_event,
                    load_config_on_event,
                    update_save_time_display,
                ),
            );
    }
}

// --- Events ---
#[derive(Event, Debug)]
pub struct SaveConfigEvent(pub PathBuf);

#[derive(Event, Debug)]
pub struct LoadConfigEvent(pub PathBuf);

// --- Systems ---

fn save_config_on_event(
    mut events: EventReader<SaveConfigEvent>,
    editor: Res<ConfigEditor>,
    mut active_file: ResMut<ActiveConfigFile>,
    mut error_dialog: ResMut<ErrorDialog>,
) {
    let Some(SaveConfigEvent(path)) = events.read().last() else {
        return;
    };

    let config = match editor.to_configuration() {
        Ok(config) => config,
        Err(e) => {
            error!("[SAVE] Refusing to save an invalid configuration: {}", e);
            error_dialog.show(match e {
                ConfigError::InvalidMoleculeJson(_) => {
                    "Invalid molecule configuration JSON.".to_string()
                }
                other => format!("Error saving configuration: {other}"),
            });
            return;
        }
    };

    match save_configuration(path, &config) {
        Ok(()) => {
            info!(
                "[SAVE] Wrote configuration with {} molecules to {}.",
                config.molecules.len(),
                path.display()
            );
            active_file.0 = Some(path.clone());
        }
        Err(e) => {
            error!("[SAVE] FAILED to write configuration: {}", e);
            error_dialog.show(format!("Error saving configuration: {e}"));
        }
    }
}

fn load_config_on_event(
    mut events: EventReader<LoadConfigEvent>,
    mut editor: ResMut<ConfigEditor>,
    mut active_file: ResMut<ActiveConfigFile>,
    mut error_dialog: ResMut<ErrorDialog>,
) {
    let Some(LoadConfigEvent(path)) = events.read().last() else {
        return;
    };

    match load_configuration(path) {
        Ok(config) => {
            info!(
                "[LOAD] Loaded configuration with {} molecules from {}.",
                config.molecules.len(),
                path.display()
            );
            *editor = ConfigEditor::from_configuration(&config);
            active_file.0 = Some(path.clone());
        }
        Err(e) => {
            error!("[LOAD] FAILED to load configuration: {}", e);
            error_dialog.show(format!("Error loading configuration: {e}"));
        }
    }
}

fn update_save_time_display(
    mut last_save_time: ResMut<LastSaveTime>,
    active_file: Res<ActiveConfigFile>,
    // Runs on a timer to avoid hitting the file system every frame.
    time: Res<Time>,
    mut timer: Local<Timer>,
) {
    timer.set_duration(Duration::from_secs(1));
    timer.tick(time.delta());
    if !timer.finished() && !active_file.is_changed() {
        return;
    }

    let Some(path) = &active_file.0 else {
        last_save_time.display_text = "No save file".to_string();
        return;
    };

    last_save_time.display_text = match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified_time) => match SystemTime::now().duration_since(modified_time) {
            Ok(elapsed) => format_time_ago(elapsed.as_secs()),
            Err(_) => "Last save: just now".to_string(),
        },
        Err(_) => "No save file".to_string(),
    };
}

fn format_time_ago(seconds: u64) -> String {
    if seconds < 2 {
        return "Last save: just now".to_string();
    }
    if seconds < 60 {
        return format!("Last save: {}s ago", seconds);
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("Last save: {}m ago", minutes);
    }

    let hours = minutes / 60;
    if hours < 24 {
        return format!("Last save: {}h ago", hours);
    }

    format!("Last save: {}d ago", hours / 24)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MoleculeConfig;
    use serde_json::json;

    fn test_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .add_event::<SaveConfigEvent>()
            .add_event::<LoadConfigEvent>()
            .init_resource::<ConfigEditor>()
            .init_resource::<ActiveConfigFile>()
            .init_resource::<ErrorDialog>()
            .add_systems(Update, (save_config_on_event, load_config_on_event));
        app
    }

    #[test]
    fn file_round_trip_preserves_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let atom = json!({"position": [0.0, 0.0, 0.0]}).as_object().cloned().unwrap();
        let config = Configuration {
            database_name: "other".into(),
            step_count: 12,
            molecules: vec![MoleculeConfig::new("H", vec![atom], vec![])],
            ..Configuration::default()
        };

        save_configuration(&path, &config).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n    \"simulation\": {"));
        assert_eq!(load_configuration(&path).unwrap(), config);
    }

    #[test]
    fn saved_time_step_reloads_bit_for_bit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dt.json");
        for time_step in [0.014805878740494919, 1e-12, 5e6, 0.1 + 0.2, f64::MIN_POSITIVE] {
            let config = Configuration {
                time_step,
                ..Configuration::default()
            };
            save_configuration(&path, &config).unwrap();
            let loaded = load_configuration(&path).unwrap();
            assert_eq!(
                loaded.time_step.to_bits(),
                time_step.to_bits(),
                "dt {time_step:e} came back as {:e}",
                loaded.time_step
            );
        }
    }

    #[test]
    fn loading_reports_distinct_failures() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_configuration(&missing),
            Err(ConfigError::Io { .. })
        ));

        let garbled = dir.path().join("garbled.json");
        std::fs::write(&garbled, "{ not json").unwrap();
        assert!(matches!(
            load_configuration(&garbled),
            Err(ConfigError::Json { .. })
        ));

        let list = dir.path().join("list.json");
        std::fs::write(&list, "[]").unwrap();
        assert!(matches!(
            load_configuration(&list),
            Err(ConfigError::InvalidShape { ref field, .. }) if field == "<root>"
        ));

        let incomplete = dir.path().join("incomplete.json");
        std::fs::write(&incomplete, r#"{"molecules": [{"name": "H2"}]}"#).unwrap();
        assert!(matches!(
            load_configuration(&incomplete),
            Err(ConfigError::MissingField { .. })
        ));
    }

    #[test]
    fn empty_file_object_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "{}").unwrap();
        assert_eq!(load_configuration(&path).unwrap(), Configuration::default());
    }

    #[test]
    fn save_event_writes_editor_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.json");
        let mut app = test_app();
        app.world_mut().resource_mut::<ConfigEditor>().step_count = 77;

        app.world_mut().send_event(SaveConfigEvent(path.clone()));
        app.update();

        assert_eq!(load_configuration(&path).unwrap().step_count, 77);
        assert_eq!(
            app.world().resource::<ActiveConfigFile>().0.as_deref(),
            Some(path.as_path())
        );
        assert!(app.world().resource::<ErrorDialog>().message.is_none());
    }

    #[test]
    fn save_event_with_bad_molecule_json_shows_error_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("never.json");
        let mut app = test_app();
        app.world_mut().resource_mut::<ConfigEditor>().molecules_json = "[oops".into();

        app.world_mut().send_event(SaveConfigEvent(path.clone()));
        app.update();

        assert!(!path.exists());
        assert_eq!(
            app.world().resource::<ErrorDialog>().message.as_deref(),
            Some("Invalid molecule configuration JSON.")
        );
    }

    #[test]
    fn load_event_repopulates_the_editor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.json");
        std::fs::write(
            &path,
            r#"{"mongodb": {"uri": "mongodb://x/"}, "simulation": {"dt": 0.5}}"#,
        )
        .unwrap();
        let mut app = test_app();

        app.world_mut().send_event(LoadConfigEvent(path));
        app.update();

        let editor = app.world().resource::<ConfigEditor>();
        assert_eq!(editor.connection_uri, "mongodb://x/");
        assert_eq!(editor.time_step, 0.5);
        assert_eq!(editor.database_name, "qed_adamant");
    }

    #[test]
    fn load_event_failure_keeps_editor_and_shows_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = test_app();
        app.world_mut().resource_mut::<ConfigEditor>().step_count = 5;

        app.world_mut()
            .send_event(LoadConfigEvent(dir.path().join("absent.json")));
        app.update();

        assert_eq!(app.world().resource::<ConfigEditor>().step_count, 5);
        let message = app.world().resource::<ErrorDialog>().message.clone();
        assert!(message.unwrap().starts_with("Error loading configuration:"));
        assert!(app.world().resource::<ActiveConfigFile>().0.is_none());
    }

    #[test]
    fn time_ago_formatting() {
        assert_eq!(format_time_ago(0), "Last save: just now");
        assert_eq!(format_time_ago(12), "Last save: 12s ago");
        assert_eq!(format_time_ago(125), "Last save: 2m ago");
        assert_eq!(format_time_ago(3 * 3600 + 5), "Last save: 3h ago");
        assert_eq!(format_time_ago(49 * 3600), "Last save: 2d ago");
    }
}
