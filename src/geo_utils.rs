//! Distance and time metrics between track points.

use geo::{Distance, Haversine, Point};

use crate::TrackPoint;

/// Metres per kilometre.
const METERS_PER_KM: f64 = 1000.0;

/// Metres per nautical mile.
const METERS_PER_NAUTICAL_MILE: f64 = 1852.0;

/// Great-circle distance between two coordinates in meters.
pub fn haversine_distance(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let point1 = Point::new(lng1, lat1);
    let point2 = Point::new(lng2, lat2);
    Haversine::distance(point1, point2)
}

/// Great-circle distance between two track points in kilometres.
///
/// Symmetric, and zero exactly when both points share the same coordinates.
pub fn distance(p: &TrackPoint, q: &TrackPoint) -> f64 {
    haversine_distance(p.latitude, p.longitude, q.latitude, q.longitude) / METERS_PER_KM
}

/// Absolute difference between two timestamps, in the timestamps' own unit (seconds).
pub fn time_gap(t1: f64, t2: f64) -> f64 {
    (t1 - t2).abs()
}

/// Convert a distance in meters covered over `seconds` into knots.
///
/// Returns 0 for a non-positive interval.
pub fn speed_knots(meters: f64, seconds: f64) -> f64 {
    if seconds <= 0.0 {
        return 0.0;
    }
    (meters / METERS_PER_NAUTICAL_MILE) / (seconds / 3600.0)
}
