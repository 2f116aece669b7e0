use quick_xml::escape::escape;

use crate::distance::geodesic_distance_km;
use crate::error::GpsLogError;

type Result<T> = std::result::Result<T, GpsLogError>;

/// Raw altitude units per meter as reported by the tracker.
pub const M_FT_CONVERSION: f64 = 3.28084;

/// The eight text fields of one tracker log line, before conversion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFix {
    pub lat: String,
    pub lon: String,
    pub sats: String,
    pub alti: String,
    pub date: String,
    pub time: String,
    pub course: String,
    pub speed: String,
}

/// One GPS fix. Derived fields are computed once in [`Waypoint::new`] and
/// the value is never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    latitude: String,
    longitude: String,
    satellite_count: String,
    elevation_feet_raw: String,
    elevation_meters: i64,
    date: String,
    time_raw: String,
    time_formatted: String,
    course: String,
    speed: String,
}

impl Waypoint {
    pub fn new(raw: RawFix) -> Result<Self> {
        let elevation_meters = elevation_to_meters(&raw.alti)?;
        let time_formatted = format_time(&raw.time);
        Ok(Self {
            latitude: raw.lat,
            longitude: raw.lon,
            satellite_count: raw.sats,
            elevation_feet_raw: raw.alti,
            elevation_meters,
            date: raw.date,
            time_raw: raw.time,
            time_formatted,
            course: raw.course,
            speed: raw.speed,
        })
    }

    pub fn latitude(&self) -> &str {
        &self.latitude
    }

    pub fn longitude(&self) -> &str {
        &self.longitude
    }

    pub fn satellite_count(&self) -> &str {
        &self.satellite_count
    }

    pub fn elevation_feet_raw(&self) -> &str {
        &self.elevation_feet_raw
    }

    pub fn elevation_meters(&self) -> i64 {
        self.elevation_meters
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn time_raw(&self) -> &str {
        &self.time_raw
    }

    /// `T<time>Z`. The device clock is taken to be UTC already.
    pub fn time_formatted(&self) -> &str {
        &self.time_formatted
    }

    pub fn course(&self) -> &str {
        &self.course
    }

    pub fn speed(&self) -> &str {
        &self.speed
    }

    /// Render as a `<trkpt>` element, embedding the text fields verbatim.
    pub fn render(&self) -> String {
        self.render_fragment(false)
    }

    /// Render as a `<trkpt>` element with XML special characters escaped.
    pub fn render_escaped(&self) -> String {
        self.render_fragment(true)
    }

    fn render_fragment(&self, escape_text: bool) -> String {
        let text = |s: &str| -> String {
            if escape_text {
                escape(s).into_owned()
            } else {
                s.to_string()
            }
        };
        format!(
            r#"<trkpt lat="{lat}" lon="{lon}"><ele>{ele}</ele><time>{date}{time}</time></trkpt>"#,
            lat = text(&self.latitude),
            lon = text(&self.longitude),
            ele = self.elevation_meters,
            date = text(&self.date),
            time = text(&self.time_formatted),
        )
    }

    /// Numeric `(lat, lon)` in decimal degrees.
    pub fn coordinates(&self) -> Result<(f64, f64)> {
        Ok((
            parse_degrees("lat", &self.latitude)?,
            parse_degrees("lon", &self.longitude)?,
        ))
    }

    /// Ellipsoidal distance in kilometers from this fix to the given point.
    pub fn distance_to(&self, other_lat: &str, other_lon: &str) -> Result<f64> {
        let start = self.coordinates()?;
        let end = (
            parse_degrees("lat", other_lat)?,
            parse_degrees("lon", other_lon)?,
        );
        Ok(geodesic_distance_km(start, end))
    }
}

/// Truncating conversion of raw altitude units to whole meters.
pub fn elevation_to_meters(raw: &str) -> Result<i64> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| GpsLogError::MalformedField {
            field: "alti",
            value: raw.to_string(),
        })?;
    Ok((value as f64 / M_FT_CONVERSION) as i64)
}

pub fn format_time(raw: &str) -> String {
    format!("T{raw}Z")
}

/// Longitude wraps around, so only latitude is range-checked.
fn parse_degrees(field: &'static str, value: &str) -> Result<f64> {
    let malformed = || GpsLogError::MalformedField {
        field,
        value: value.to_string(),
    };
    let degrees = value.trim().parse::<f64>().map_err(|_| malformed())?;
    if !degrees.is_finite() || (field == "lat" && degrees.abs() > 90.0) {
        return Err(malformed());
    }
    Ok(degrees)
}
