pub mod distance;
pub mod error;
pub mod gpx_reader;
pub mod log_parser;
pub mod map;
pub mod options;
pub mod pipeline;
pub mod serializer;
pub mod waypoint;

use wasm_bindgen::prelude::*;

pub use crate::error::GpsLogError;
pub use crate::log_parser::{ParsedLog, parse_log};
pub use crate::options::ConvertOptions;
pub use crate::pipeline::{Clock, Conversion, FixedClock, SystemClock, process_log, run};
pub use crate::waypoint::Waypoint;

use crate::serializer::GpxTemplate;

/// Convert a tracker log to GPX, returned as a JS object
/// `{ document, distanceKm, name }`.
#[wasm_bindgen(js_name = gpsLogToGpx)]
pub fn gps_log_to_gpx(log_text: &str, options: JsValue) -> Result<JsValue, JsValue> {
    console_error_panic_hook::set_once();

    let conversion = convert(log_text, options)?;
    serde_wasm_bindgen::to_value(&conversion).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Convert a tracker log to GPX, returned as a JSON string.
#[wasm_bindgen(js_name = gpsLogToGpxString)]
pub fn gps_log_to_gpx_string(log_text: &str, options: JsValue) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let conversion = convert(log_text, options)?;
    serde_json::to_string(&conversion).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Read the track of a GPX document back as a GeoJSON string for display.
#[wasm_bindgen(js_name = gpxToTrackGeoJson)]
pub fn gpx_to_track_geojson(gpx_text: &str) -> Result<String, JsValue> {
    console_error_panic_hook::set_once();

    let coords = gpx_reader::extract_track_coordinates(gpx_text)?;
    let fc = map::track_feature_collection(&coords)?;
    serde_json::to_string(&fc).map_err(|e| JsValue::from_str(&e.to_string()))
}

// No filesystem in the browser, so only the embedded template is used.
fn convert(log_text: &str, options: JsValue) -> Result<Conversion, JsValue> {
    let opts = parse_options(options)?;
    Ok(pipeline::convert_log(log_text, &GpxTemplate::embedded(), &opts)?)
}

fn parse_options(options: JsValue) -> Result<ConvertOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        Ok(ConvertOptions::default())
    } else {
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}
