// src/resources.rs

use crate::config::{
    self, Configuration, molecules_from_value, molecules_to_value, validate_time_step,
};
use crate::error::ConfigError;
use crate::visualization::{PointCloud, SkippedEntry};
use bevy::prelude::*;
use std::path::PathBuf;

pub const DEFAULT_SAVE_PATH: &str = "config.json";
pub const DEFAULT_DATA_FILE: &str = "simulation_data.json";

/// The live edit session. Field values mirror the configuration form; a
/// [`Configuration`] is only built from them on save.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ConfigEditor {
    pub connection_uri: String,
    pub database_name: String,
    pub collection_name: String,
    pub step_count: u64,
    pub time_step: f64,
    /// JSON array of molecule documents, edited as free text.
    pub molecules_json: String,
}

impl Default for ConfigEditor {
    fn default() -> Self {
        Self::from_configuration(&Configuration::default())
    }
}

impl ConfigEditor {
    pub fn from_configuration(config: &Configuration) -> Self {
        Self {
            connection_uri: config.connection_uri.clone(),
            database_name: config.database_name.clone(),
            collection_name: config.collection_name.clone(),
            step_count: config.step_count,
            time_step: config.time_step,
            molecules_json: config::to_pretty_json(&molecules_to_value(&config.molecules)),
        }
    }

    /// Builds a fresh configuration from the form. Blank molecule text means
    /// no molecules.
    pub fn to_configuration(&self) -> Result<Configuration, ConfigError> {
        validate_time_step(self.time_step)?;

        let molecules = if self.molecules_json.trim().is_empty() {
            Vec::new()
        } else {
            let value: serde_json::Value = serde_json::from_str(&self.molecules_json)
                .map_err(ConfigError::InvalidMoleculeJson)?;
            molecules_from_value(&value)?
        };

        Ok(Configuration {
            connection_uri: self.connection_uri.clone(),
            database_name: self.database_name.clone(),
            collection_name: self.collection_name.clone(),
            step_count: self.step_count,
            time_step: self.time_step,
            molecules,
        })
    }
}

/// The file the current session was last saved to or loaded from.
#[derive(Resource, Default, Debug)]
pub struct ActiveConfigFile(pub Option<PathBuf>);

#[derive(Resource, Default)]
pub struct LastSaveTime {
    pub display_text: String,
}

/// A modal error message waiting to be acknowledged by the user.
#[derive(Resource, Default, Debug)]
pub struct ErrorDialog {
    pub message: Option<String>,
}

impl ErrorDialog {
    pub fn show(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }
}

/// Which path prompt, if any, is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilePromptKind {
    Save,
    Load,
}

#[derive(Resource, Debug)]
pub struct FilePrompt {
    pub kind: Option<FilePromptKind>,
    pub path: String,
}

impl FilePrompt {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            kind: None,
            path: path.into(),
        }
    }

    pub fn open(&mut self, kind: FilePromptKind) {
        self.kind = Some(kind);
    }
}

impl Default for FilePrompt {
    fn default() -> Self {
        Self::new(DEFAULT_SAVE_PATH)
    }
}

#[derive(Debug, Clone)]
pub enum VisualizationOutcome {
    Rendered {
        atoms: usize,
        electrons: usize,
        skipped: Vec<SkippedEntry>,
    },
    NoData,
    Failed(String),
}

/// Where the last thumbnail capture stands. The path is only reported as
/// `Saved` once the PNG is on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum ThumbnailStatus {
    Capturing(PathBuf),
    Saved(PathBuf),
    Failed(String),
}

#[derive(Resource, Debug)]
pub struct VisualizationDialog {
    pub open: bool,
    pub files: Vec<String>,
    pub selected: usize,
    pub pending: bool,
    pub outcome: Option<VisualizationOutcome>,
    pub preview: PointCloud,
    pub thumbnail: Option<ThumbnailStatus>,
}

impl VisualizationDialog {
    pub fn new(files: Vec<String>) -> Self {
        Self {
            open: false,
            files,
            selected: 0,
            pending: false,
            outcome: None,
            preview: PointCloud::default(),
            thumbnail: None,
        }
    }

    /// Replaces the file list, keeping the selection in range.
    pub fn populate_files(&mut self, files: Vec<String>) {
        self.files = files;
        if self.selected >= self.files.len() {
            self.selected = 0;
        }
    }

    pub fn selected_file(&self) -> Option<&str> {
        self.files
            .get(self.selected)
            .map(String::as_str)
            .filter(|f| !f.is_empty())
    }
}

impl Default for VisualizationDialog {
    fn default() -> Self {
        Self::new(vec![DEFAULT_DATA_FILE.to_string()])
    }
}

#[derive(Resource)]
pub struct SharedAssetHandles {
    pub atom_mesh: Handle<Mesh>,
    pub atom_material: Handle<StandardMaterial>,
    pub electron_mesh: Handle<Mesh>,
    pub electron_material: Handle<StandardMaterial>,
}
