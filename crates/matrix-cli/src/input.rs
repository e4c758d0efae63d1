use std::fs;
use std::path::Path;

use matrix_core::RecordShape;
use matrix_generate::GenerateOptions;
use serde::Deserialize;
use serde_json::Value;

use crate::CliError;

/// Dimension table read from disk.
///
/// ```toml
/// name = "meals"
///
/// [options]
/// max_combinations = 100
///
/// [[dimensions]]
/// field = "who"
/// values = ["Priyanka", "Pedro"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct MatrixFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub options: GenerateOptions,
    #[serde(default)]
    pub dimensions: Vec<DimensionEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DimensionEntry {
    pub field: String,
    /// Kept untyped so a non-sequence reaches the engine's shape check.
    pub values: Value,
}

impl MatrixFile {
    /// Load a `.json` file as JSON and anything else as TOML.
    pub(crate) fn load(path: &Path) -> Result<Self, CliError> {
        let contents = fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Ok(serde_json::from_str(&contents)?)
        } else {
            Ok(toml::from_str(&contents)?)
        }
    }

    /// Record layout implied by the dimension list.
    pub(crate) fn shape(&self) -> RecordShape {
        let name = self.name.clone().unwrap_or_else(|| "matrix".to_string());
        RecordShape::new(
            name,
            self.dimensions.iter().map(|entry| entry.field.clone()),
        )
    }

    pub(crate) fn dimension_values(&self) -> Vec<Value> {
        self.dimensions
            .iter()
            .map(|entry| entry.values.clone())
            .collect()
    }
}
