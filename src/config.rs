// src/config.rs

//! The simulation configuration record and its document form.
//!
//! Everything in here is plain data: no Bevy types, no file access. The
//! persistence and UI layers own I/O and user feedback.

use crate::error::ConfigError;
use serde_json::{Map, Value};
use std::fmt;

/// A string-keyed JSON object, the exchanged form of every record here.
pub type Document = Map<String, Value>;

pub const DEFAULT_CONNECTION_URI: &str = "mongodb://localhost:27017/";
pub const DEFAULT_DATABASE_NAME: &str = "qed_adamant";
pub const DEFAULT_COLLECTION_NAME: &str = "simulation_results";
pub const DEFAULT_STEP_COUNT: u64 = 1000;
pub const DEFAULT_TIME_STEP: f64 = 0.01;

/// One molecule definition. Atom and electron entries are opaque documents
/// that are carried through untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeConfig {
    pub name: String,
    pub atoms: Vec<Document>,
    pub electrons: Vec<Document>,
}

impl MoleculeConfig {
    pub fn new(name: impl Into<String>, atoms: Vec<Document>, electrons: Vec<Document>) -> Self {
        Self {
            name: name.into(),
            atoms,
            electrons,
        }
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert("name".into(), Value::String(self.name.clone()));
        doc.insert("atoms".into(), documents_to_value(&self.atoms));
        doc.insert("electrons".into(), documents_to_value(&self.electrons));
        doc
    }

    /// Unlike [`Configuration::from_document`], every key is required here.
    pub fn from_document(doc: &Document) -> Result<Self, ConfigError> {
        Self::from_document_at(doc, "")
    }

    fn from_document_at(doc: &Document, prefix: &str) -> Result<Self, ConfigError> {
        let name_path = join_path(prefix, "name");
        let name = required(doc, "name", &name_path)?
            .as_str()
            .ok_or_else(|| invalid_shape(&name_path, "a string"))?
            .to_owned();

        let atoms_path = join_path(prefix, "atoms");
        let atoms = value_to_documents(required(doc, "atoms", &atoms_path)?, &atoms_path)?;

        let electrons_path = join_path(prefix, "electrons");
        let electrons =
            value_to_documents(required(doc, "electrons", &electrons_path)?, &electrons_path)?;

        Ok(Self::new(name, atoms, electrons))
    }
}

/// Settings for a single simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub connection_uri: String,
    pub database_name: String,
    pub collection_name: String,
    pub step_count: u64,
    pub time_step: f64,
    pub molecules: Vec<MoleculeConfig>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            connection_uri: DEFAULT_CONNECTION_URI.to_owned(),
            database_name: DEFAULT_DATABASE_NAME.to_owned(),
            collection_name: DEFAULT_COLLECTION_NAME.to_owned(),
            step_count: DEFAULT_STEP_COUNT,
            time_step: DEFAULT_TIME_STEP,
            molecules: Vec::new(),
        }
    }
}

impl Configuration {
    pub fn to_document(&self) -> Document {
        let mut mongodb = Document::new();
        mongodb.insert("uri".into(), Value::String(self.connection_uri.clone()));
        mongodb.insert("database".into(), Value::String(self.database_name.clone()));
        mongodb.insert(
            "collection".into(),
            Value::String(self.collection_name.clone()),
        );

        let mut simulation = Document::new();
        simulation.insert("num_steps".into(), Value::from(self.step_count));
        simulation.insert("dt".into(), Value::from(self.time_step));

        let mut doc = Document::new();
        doc.insert("mongodb".into(), Value::Object(mongodb));
        doc.insert("simulation".into(), Value::Object(simulation));
        doc.insert("molecules".into(), molecules_to_value(&self.molecules));
        doc
    }

    /// Absent sections and fields fall back to their defaults. Present values
    /// of the wrong type are rejected with the offending field path.
    pub fn from_document(doc: &Document) -> Result<Self, ConfigError> {
        let mongodb = section(doc, "mongodb")?;
        let simulation = section(doc, "simulation")?;

        let connection_uri = string_or(mongodb, "uri", "mongodb.uri", DEFAULT_CONNECTION_URI)?;
        let database_name =
            string_or(mongodb, "database", "mongodb.database", DEFAULT_DATABASE_NAME)?;
        let collection_name = string_or(
            mongodb,
            "collection",
            "mongodb.collection",
            DEFAULT_COLLECTION_NAME,
        )?;

        let step_count = match simulation.and_then(|s| s.get("num_steps")) {
            None => DEFAULT_STEP_COUNT,
            Some(value) => value
                .as_u64()
                .ok_or_else(|| invalid_shape("simulation.num_steps", "a non-negative integer"))?,
        };

        let time_step = match simulation.and_then(|s| s.get("dt")) {
            None => DEFAULT_TIME_STEP,
            Some(value) => {
                let dt = value
                    .as_f64()
                    .ok_or_else(|| invalid_shape("simulation.dt", "a number"))?;
                validate_time_step(dt)?;
                dt
            }
        };

        let molecules = match doc.get("molecules") {
            None => Vec::new(),
            Some(value) => molecules_from_value(value)?,
        };

        Ok(Self {
            connection_uri,
            database_name,
            collection_name,
            step_count,
            time_step,
            molecules,
        })
    }

    /// Pretty JSON with a four-space indent, the on-disk layout.
    pub fn to_json_pretty(&self) -> String {
        to_pretty_json(&Value::Object(self.to_document()))
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_pretty())
    }
}

/// Parses the value of a `molecules` key: an array of molecule documents.
pub fn molecules_from_value(value: &Value) -> Result<Vec<MoleculeConfig>, ConfigError> {
    let entries = value
        .as_array()
        .ok_or_else(|| invalid_shape("molecules", "an array"))?;
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let path = format!("molecules[{i}]");
            let doc = entry
                .as_object()
                .ok_or_else(|| invalid_shape(&path, "an object"))?;
            MoleculeConfig::from_document_at(doc, &path)
        })
        .collect()
}

pub fn molecules_to_value(molecules: &[MoleculeConfig]) -> Value {
    Value::Array(
        molecules
            .iter()
            .map(|m| Value::Object(m.to_document()))
            .collect(),
    )
}

pub fn validate_time_step(dt: f64) -> Result<(), ConfigError> {
    if dt.is_finite() && dt > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field: "simulation.dt".into(),
            reason: format!("time step must be a positive finite number, got {dt}"),
        })
    }
}

pub fn to_pretty_json(value: &Value) -> String {
    use serde::Serialize;

    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    // Serializing a `Value` into memory cannot fail and always yields UTF-8.
    if value.serialize(&mut ser).is_err() {
        return value.to_string();
    }
    String::from_utf8(buf).unwrap_or_else(|_| value.to_string())
}

fn section<'a>(doc: &'a Document, key: &str) -> Result<Option<&'a Document>, ConfigError> {
    match doc.get(key) {
        None => Ok(None),
        Some(Value::Object(inner)) => Ok(Some(inner)),
        Some(_) => Err(invalid_shape(key, "an object")),
    }
}

fn string_or(
    section: Option<&Document>,
    key: &str,
    path: &str,
    default: &str,
) -> Result<String, ConfigError> {
    match section.and_then(|s| s.get(key)) {
        None => Ok(default.to_owned()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(invalid_shape(path, "a string")),
    }
}

fn required<'a>(doc: &'a Document, key: &str, path: &str) -> Result<&'a Value, ConfigError> {
    doc.get(key).ok_or_else(|| ConfigError::MissingField {
        field: path.to_owned(),
    })
}

fn value_to_documents(value: &Value, path: &str) -> Result<Vec<Document>, ConfigError> {
    let entries = value
        .as_array()
        .ok_or_else(|| invalid_shape(path, "an array"))?;
    entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            entry
                .as_object()
                .cloned()
                .ok_or_else(|| invalid_shape(&format!("{path}[{i}]"), "an object"))
        })
        .collect()
}

fn documents_to_value(docs: &[Document]) -> Value {
    Value::Array(docs.iter().cloned().map(Value::Object).collect())
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_owned()
    } else {
        format!("{prefix}.{key}")
    }
}

fn invalid_shape(field: &str, expected: &'static str) -> ConfigError {
    ConfigError::InvalidShape {
        field: field.to_owned(),
        expected,
    }
}
