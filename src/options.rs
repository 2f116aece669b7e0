use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::GpsLogError;

/// Options for GPS log to GPX conversion.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOptions {
    /// XML-escape lat/lon/date/time text inside track points (default: false)
    #[serde(default)]
    pub escape_text: bool,

    /// Template file with `{time}`, `{name}` and `{trackpoints}` slots
    /// (default: the embedded GPX 1.1 template)
    #[serde(default)]
    pub template_path: Option<PathBuf>,

    /// Directory receiving the .gpx and map files (default: current directory)
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Re-read the written document and render a map page (default: false)
    #[serde(default)]
    pub generate_map: bool,
}

impl ConvertOptions {
    /// Load options from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, GpsLogError> {
        let text = std::fs::read_to_string(path).map_err(|e| GpsLogError::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| GpsLogError::InvalidConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn output_dir(&self) -> &Path {
        self.output_dir.as_deref().unwrap_or_else(|| Path::new("."))
    }
}
