use geo::{Distance, Geodesic, Point};

use crate::error::GpsLogError;
use crate::waypoint::Waypoint;

/// Distance in kilometers between two `(lat, lon)` pairs on the WGS84
/// ellipsoid.
pub fn geodesic_distance_km(start: (f64, f64), end: (f64, f64)) -> f64 {
    let a = Point::new(start.1, start.0);
    let b = Point::new(end.1, end.0);
    Geodesic.distance(a, b) / 1000.0
}

/// Sum of the distances between consecutive waypoints, in kilometers.
///
/// Fewer than two waypoints have no legs, so the total is `0.0`.
pub fn total_trip_distance(waypoints: &[Waypoint]) -> Result<f64, GpsLogError> {
    if waypoints.len() < 2 {
        return Ok(0.0);
    }
    waypoints.windows(2).try_fold(0.0, |total, pair| {
        let leg = pair[0].distance_to(pair[1].latitude(), pair[1].longitude())?;
        Ok(total + leg)
    })
}
