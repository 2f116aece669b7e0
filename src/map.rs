use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{Map, Value as JsonValue};

use crate::error::GpsLogError;

/// Zoom level the map page opens at.
pub const MAP_ZOOM: u8 = 16;

/// Average of all points, as `(lat, lon)`.
pub fn track_center(coords: &[(f64, f64)]) -> Result<(f64, f64), GpsLogError> {
    if coords.is_empty() {
        return Err(GpsLogError::EmptyTrack);
    }
    let n = coords.len() as f64;
    let lat = coords.iter().map(|c| c.0).sum::<f64>() / n;
    let lon = coords.iter().map(|c| c.1).sum::<f64>() / n;
    Ok((lat, lon))
}

/// Convert `(lat, lon)` track coordinates to a GeoJSON FeatureCollection.
///
/// Two or more points become a LineString, a single point a Point.
pub fn track_feature_collection(coords: &[(f64, f64)]) -> Result<FeatureCollection, GpsLogError> {
    let (center_lat, center_lon) = track_center(coords)?;

    let geometry = if coords.len() == 1 {
        Geometry::new(Value::Point(point_coords(coords[0])))
    } else {
        Geometry::new(Value::LineString(
            coords.iter().copied().map(point_coords).collect(),
        ))
    };

    let mut props = Map::new();
    props.insert("gpxType".to_string(), JsonValue::String("track".to_string()));
    props.insert(
        "pointCount".to_string(),
        JsonValue::Number(coords.len().into()),
    );
    props.insert(
        "center".to_string(),
        JsonValue::Array(vec![JsonValue::from(center_lat), JsonValue::from(center_lon)]),
    );

    Ok(FeatureCollection {
        bbox: None,
        features: vec![Feature {
            bbox: None,
            geometry: Some(geometry),
            id: None,
            properties: Some(props),
            foreign_members: None,
        }],
        foreign_members: None,
    })
}

/// A standalone Leaflet page drawing the track as a blue line, centered on
/// the average point.
pub fn render_map_html(coords: &[(f64, f64)], title: &str) -> Result<String, GpsLogError> {
    let (center_lat, center_lon) = track_center(coords)?;
    let fc = track_feature_collection(coords)?;
    let geojson = serde_json::to_string(&fc)?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>html, body, #map {{ height: 100%; margin: 0; }}</style>
</head>
<body>
<div id="map"></div>
<script>
var map = L.map('map').setView([{center_lat}, {center_lon}], {MAP_ZOOM});
L.tileLayer('https://tile.openstreetmap.org/{{z}}/{{x}}/{{y}}.png', {{
  maxZoom: 19,
  attribution: '&copy; OpenStreetMap contributors'
}}).addTo(map);
L.geoJSON({geojson}, {{ style: {{ color: 'blue' }} }}).addTo(map);
</script>
</body>
</html>
"#,
        title = quick_xml::escape::escape(title),
    ))
}

/// GeoJSON coordinate order is `[lon, lat]`.
fn point_coords(coord: (f64, f64)) -> Vec<f64> {
    vec![coord.1, coord.0]
}
