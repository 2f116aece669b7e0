use std::path::Path;

use tracing::debug;

use crate::error::GpsLogError;
use crate::log_parser::ParsedLog;
use crate::options::ConvertOptions;
use crate::waypoint::Waypoint;

type Result<T> = std::result::Result<T, GpsLogError>;

const EMBEDDED_TEMPLATE: &str = include_str!("../templates/gpx_template");

/// A GPX document skeleton with `{time}`, `{name}` and `{trackpoints}` slots.
///
/// Any other `{...}` text is copied through untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpxTemplate {
    text: String,
}

impl GpxTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The GPX 1.1 template shipped with the crate.
    pub fn embedded() -> Self {
        Self::new(EMBEDDED_TEMPLATE)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| {
            GpsLogError::TemplateUnavailable {
                path: path.to_path_buf(),
                source,
            }
        })?;
        debug!(path = %path.display(), "loaded GPX template");
        Ok(Self::new(text))
    }

    /// The configured template file, or the embedded one.
    pub fn from_options(opts: &ConvertOptions) -> Result<Self> {
        match &opts.template_path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::embedded()),
        }
    }

    /// Fill the slots in a single pass, so substituted values are never
    /// rescanned for slot names.
    pub fn render(&self, name: &str, trackpoints: &str) -> String {
        let slots = [
            ("{time}", name),
            ("{name}", name),
            ("{trackpoints}", trackpoints),
        ];

        let mut out = String::with_capacity(self.text.len() + trackpoints.len());
        let mut rest = self.text.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let tail = &rest[open..];
            match slots.iter().find(|(slot, _)| tail.starts_with(*slot)) {
                Some((slot, value)) => {
                    out.push_str(value);
                    rest = &tail[slot.len()..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }
        out.push_str(rest);
        out
    }
}

/// Render every waypoint as a `<trkpt>` fragment, in order.
pub fn render_trackpoints(waypoints: &[Waypoint], escape_text: bool) -> Vec<String> {
    waypoints
        .iter()
        .map(|wpt| {
            if escape_text {
                wpt.render_escaped()
            } else {
                wpt.render()
            }
        })
        .collect()
}

/// Concatenate the fragments and substitute them into the template.
pub fn build_document(template: &GpxTemplate, fragments: &[String], name: &str) -> String {
    template.render(name, &fragments.concat())
}

pub fn serialize_track(template: &GpxTemplate, log: &ParsedLog, escape_text: bool) -> String {
    let fragments = render_trackpoints(&log.waypoints, escape_text);
    build_document(template, &fragments, &log.document_name)
}
