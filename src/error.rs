use std::path::PathBuf;

use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error)]
pub enum GpsLogError {
    #[error("Log contains no lines")]
    EmptyLog,

    #[error("Line {line}: segment '{segment}' must contain exactly one '>'")]
    MalformedLine { line: usize, segment: String },

    #[error("Line {line}: missing required field '{key}'")]
    MissingField { line: usize, key: &'static str },

    #[error("Malformed value '{value}' for field '{field}'")]
    MalformedField { field: &'static str, value: String },

    #[error("Log {} is not valid UTF-8 text", .path.display())]
    InvalidEncoding { path: PathBuf },

    #[error("GPX template unavailable at {}: {source}", .path.display())]
    TemplateUnavailable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O failure on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid options file {}: {source}", .path.display())]
    InvalidConfig {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML parse error: {0}")]
    XmlParse(#[from] quick_xml::Error),

    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("Invalid value '{value}' for attribute '{attribute}' on <{element}>")]
    InvalidAttribute {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    #[error("Track has no points to draw")]
    EmptyTrack,
}

impl GpsLogError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures caused by the content of the input log rather than
    /// the environment (missing template, unwritable output).
    pub fn is_incompatible_input(&self) -> bool {
        matches!(
            self,
            Self::EmptyLog
                | Self::InvalidEncoding { .. }
                | Self::MalformedLine { .. }
                | Self::MissingField { .. }
                | Self::MalformedField { .. }
        )
    }
}

impl From<GpsLogError> for JsValue {
    fn from(e: GpsLogError) -> Self {
        JsValue::from_str(&e.to_string())
    }
}
