use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info};

use crate::distance::total_trip_distance;
use crate::error::GpsLogError;
use crate::gpx_reader::extract_track_coordinates;
use crate::log_parser::parse_log;
use crate::map::render_map_html;
use crate::options::ConvertOptions;
use crate::serializer::{GpxTemplate, serialize_track};

type Result<T> = std::result::Result<T, GpsLogError>;

/// `strftime` layout of the prefix on every output file name.
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%y%m%d_%H%M%S";

/// Source of the wall-clock time used to name output files.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Result of converting one log.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversion {
    pub document: String,
    pub distance_km: f64,
    pub name: String,
}

/// Files written by [`run`].
///
/// The map is drawn after the document is written, so its failure is kept
/// apart from the document result.
#[derive(Debug)]
pub struct RunOutput {
    pub conversion: Conversion,
    pub gpx_path: PathBuf,
    /// `None` when no map was requested.
    pub map: Option<Result<PathBuf>>,
}

/// `<YYMMDD_HHMMSS>-<input_stem>`, reading the clock once.
pub fn output_stem(input_stem: &str, clock: &dyn Clock) -> String {
    format!("{}-{input_stem}", clock.now().format(OUTPUT_TIMESTAMP_FORMAT))
}

/// Parse, serialize and measure a log held in memory.
pub fn convert_log(
    text: &str,
    template: &GpxTemplate,
    opts: &ConvertOptions,
) -> Result<Conversion> {
    let log = parse_log(text)?;
    let document = serialize_track(template, &log, opts.escape_text);
    let distance_km = total_trip_distance(&log.waypoints)?;
    Ok(Conversion {
        document,
        distance_km,
        name: log.document_name,
    })
}

/// Read the log at `input` and convert it. Nothing is written.
pub fn process_log(input: &Path, opts: &ConvertOptions) -> Result<Conversion> {
    let text = std::fs::read_to_string(input).map_err(|e| match e.kind() {
        ErrorKind::InvalidData => GpsLogError::InvalidEncoding {
            path: input.to_path_buf(),
        },
        _ => GpsLogError::io(input, e),
    })?;
    let template = GpxTemplate::from_options(opts)?;
    let conversion = convert_log(&text, &template, opts)?;
    debug!(
        input = %input.display(),
        name = %conversion.name,
        distance_km = conversion.distance_km,
        "converted log"
    );
    Ok(conversion)
}

/// Write `<dir>/<stem>.gpx`.
pub fn write_document(dir: &Path, stem: &str, document: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{stem}.gpx"));
    std::fs::write(&path, document).map_err(|e| GpsLogError::io(&path, e))?;
    info!(path = %path.display(), "wrote GPX document");
    Ok(path)
}

/// Re-read a written GPX document and write `<dir>/<stem>.html` showing
/// its track.
pub fn write_map(gpx_path: &Path, dir: &Path, stem: &str) -> Result<PathBuf> {
    let xml = std::fs::read_to_string(gpx_path).map_err(|e| GpsLogError::io(gpx_path, e))?;
    let coords = extract_track_coordinates(&xml)?;
    let html = render_map_html(&coords, stem)?;
    let path = dir.join(format!("{stem}.html"));
    std::fs::write(&path, html).map_err(|e| GpsLogError::io(&path, e))?;
    info!(path = %path.display(), points = coords.len(), "wrote map");
    Ok(path)
}

/// Convert `input` and write the document (and map, if enabled) into the
/// configured output directory. The log is fully converted before any file
/// is created; a map failure does not undo the written document.
pub fn run(input: &Path, opts: &ConvertOptions, clock: &dyn Clock) -> Result<RunOutput> {
    let input_stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = output_stem(&input_stem, clock);

    let conversion = process_log(input, opts)?;
    let dir = opts.output_dir();
    let gpx_path = write_document(dir, &stem, &conversion.document)?;
    let map = opts.generate_map.then(|| write_map(&gpx_path, dir, &stem));

    Ok(RunOutput {
        conversion,
        gpx_path,
        map,
    })
}
