use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::GpsLogError;

type Result<T> = std::result::Result<T, GpsLogError>;

/// Read every `<trkpt>` of every `<trk>/<trkseg>` in document order and
/// return its `(lat, lon)`.
///
/// Unlike a general GPX reader this is strict: a track point without usable
/// coordinates is an error, since the documents read here are ones this
/// crate wrote.
pub fn extract_track_coordinates(xml: &str) -> Result<Vec<(f64, f64)>> {
    let mut reader = Reader::from_str(xml);
    let mut coords = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"trk" => {
                parse_track(&mut reader, &mut coords)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpsLogError::XmlParse(e)),
            _ => {}
        }
    }

    Ok(coords)
}

/// Parse lat/lon attributes from a `<trkpt>` start tag.
fn parse_lat_lon(e: &BytesStart<'_>) -> Result<(f64, f64)> {
    let mut lat: Option<f64> = None;
    let mut lon: Option<f64> = None;

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| GpsLogError::XmlParse(e.into()))?;
        let key = attr.key.local_name();
        let val = std::str::from_utf8(&attr.value).unwrap_or_default();
        match key.as_ref() {
            b"lat" => lat = Some(parse_coordinate("lat", val)?),
            b"lon" => lon = Some(parse_coordinate("lon", val)?),
            _ => {}
        }
    }

    let lat = lat.ok_or(GpsLogError::MissingAttribute {
        element: "trkpt",
        attribute: "lat",
    })?;
    let lon = lon.ok_or(GpsLogError::MissingAttribute {
        element: "trkpt",
        attribute: "lon",
    })?;

    Ok((lat, lon))
}

fn parse_coordinate(attribute: &'static str, val: &str) -> Result<f64> {
    val.trim()
        .parse::<f64>()
        .map_err(|_| GpsLogError::InvalidAttribute {
            element: "trkpt",
            attribute,
            value: val.to_string(),
        })
}

/// Called after receiving Event::Start for `<trk>`.
fn parse_track<'a>(reader: &mut Reader<&'a [u8]>, coords: &mut Vec<(f64, f64)>) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"trkseg" => parse_segment(reader, coords)?,
                _ => {
                    reader
                        .read_to_end(e.name())
                        .map_err(GpsLogError::XmlParse)?;
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trk" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpsLogError::XmlParse(e)),
            _ => {}
        }
    }
    Ok(())
}

fn parse_segment<'a>(reader: &mut Reader<&'a [u8]>, coords: &mut Vec<(f64, f64)>) -> Result<()> {
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    coords.push(parse_lat_lon(&e)?);
                }
                // Point children (ele, time, extensions) carry nothing we need
                reader
                    .read_to_end(e.name())
                    .map_err(GpsLogError::XmlParse)?;
            }
            Ok(Event::Empty(e)) => {
                if e.local_name().as_ref() == b"trkpt" {
                    coords.push(parse_lat_lon(&e)?);
                }
            }
            Ok(Event::End(e)) if e.local_name().as_ref() == b"trkseg" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(GpsLogError::XmlParse(e)),
            _ => {}
        }
    }
    Ok(())
}
