use std::collections::HashMap;

use tracing::debug;

use crate::error::GpsLogError;
use crate::waypoint::{RawFix, Waypoint};

type Result<T> = std::result::Result<T, GpsLogError>;

/// Separates `key>value` segments within a line.
pub const DATA_SEPARATOR: char = ',';
/// Separates a key from its value.
pub const KEY_SEPARATOR: char = '>';

/// Waypoints in log order plus the name derived from the first fix.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLog {
    pub waypoints: Vec<Waypoint>,
    pub document_name: String,
}

/// Parse a whole tracker log. Any bad line aborts the parse.
pub fn parse_log(text: &str) -> Result<ParsedLog> {
    let waypoints = split_lines(text)
        .enumerate()
        .map(|(idx, line)| parse_line(line, idx + 1))
        .collect::<Result<Vec<_>>>()?;

    let first = waypoints.first().ok_or(GpsLogError::EmptyLog)?;
    let document_name = format!("{}{}", first.date(), first.time_raw());

    debug!(
        points = waypoints.len(),
        name = %document_name,
        "parsed tracker log"
    );

    Ok(ParsedLog {
        waypoints,
        document_name,
    })
}

/// Lines ended by `\n`, `\r\n` or a bare `\r`. A final terminator does not
/// start another line.
fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let Some(end) = rest.find(['\r', '\n']) else {
            return Some(std::mem::take(&mut rest));
        };
        let line = &rest[..end];
        let skip = if rest[end..].starts_with("\r\n") { 2 } else { 1 };
        rest = &rest[end + skip..];
        Some(line)
    })
}

/// Parse one `key>value,key>value,...` line. `line_no` is 1-based and only
/// used for error reporting.
pub fn parse_line(line: &str, line_no: usize) -> Result<Waypoint> {
    let fields = split_fields(line, line_no)?;

    let take = |key: &'static str| -> Result<String> {
        fields
            .get(key)
            .map(|v| v.to_string())
            .ok_or(GpsLogError::MissingField { line: line_no, key })
    };

    Waypoint::new(RawFix {
        lat: take("lat")?,
        lon: take("lon")?,
        sats: take("sats")?,
        alti: take("alti")?,
        date: take("date")?,
        time: take("time")?,
        course: take("course")?,
        speed: take("speed")?,
    })
}

/// Build the key -> value map for a line. Later duplicates overwrite
/// earlier ones.
fn split_fields(line: &str, line_no: usize) -> Result<HashMap<&str, &str>> {
    let mut fields = HashMap::new();
    for segment in line.trim().split(DATA_SEPARATOR) {
        let (key, value) = match segment.split_once(KEY_SEPARATOR) {
            Some((k, v)) if !v.contains(KEY_SEPARATOR) => (k, v),
            _ => {
                return Err(GpsLogError::MalformedLine {
                    line: line_no,
                    segment: segment.to_string(),
                });
            }
        };
        fields.insert(key, value);
    }
    Ok(fields)
}
