//! Per-step speed computation and speed filtering.
//!
//! Stop detection consumes a precomputed `speed` for every point. When a source
//! does not report speed over ground, it can be derived here from the first
//! difference of consecutive positions of the same object.

use log::debug;

use crate::geo_utils::{haversine_distance, speed_knots};
use crate::segmentation::group_by_object;
use crate::{Result, TrackPoint};

/// Speed in knots of each point relative to its predecessor.
///
/// The first point, and any point sharing its predecessor's timestamp, gets 0.
fn step_speeds(track: &[TrackPoint]) -> Vec<f64> {
    let mut speeds = Vec::with_capacity(track.len());
    if track.is_empty() {
        return speeds;
    }

    speeds.push(0.0);
    for pair in track.windows(2) {
        let meters = haversine_distance(
            pair[0].latitude,
            pair[0].longitude,
            pair[1].latitude,
            pair[1].longitude,
        );
        speeds.push(speed_knots(meters, pair[1].timestamp - pair[0].timestamp));
    }
    speeds
}

/// Replace every point's speed with the speed derived from consecutive positions.
///
/// Points come back grouped by object (ascending id) and sorted by timestamp.
pub fn compute_speeds(points: &[TrackPoint]) -> Result<Vec<TrackPoint>> {
    let groups = group_by_object(points)?;

    let mut out = Vec::with_capacity(points.len());
    for (_, track) in groups {
        let speeds = step_speeds(&track);
        out.extend(track.into_iter().zip(speeds).map(|(mut p, speed)| {
            p.speed = speed;
            p
        }));
    }
    Ok(out)
}

/// Drop points whose derived speed exceeds `speed_limit` knots.
///
/// Removes position glitches (teleporting fixes) before segmentation. Reported
/// speeds of the kept points are left untouched. Points come back grouped by
/// object and sorted by timestamp.
pub fn filter_by_speed(points: &[TrackPoint], speed_limit: f64) -> Result<Vec<TrackPoint>> {
    let groups = group_by_object(points)?;

    let mut out = Vec::with_capacity(points.len());
    for (id, track) in groups {
        let speeds = step_speeds(&track);
        let before = out.len();
        out.extend(
            track
                .iter()
                .zip(speeds)
                .filter(|(_, speed)| *speed <= speed_limit)
                .map(|(p, _)| p.clone()),
        );
        debug!(
            "[Preprocessing] Object {}: dropped {} points above {} kn",
            id,
            track.len() - (out.len() - before),
            speed_limit
        );
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One nautical mile in degrees of latitude (mean earth radius).
    const NM_DEG: f64 = 1.852 / 111.195;

    fn ping(id: &str, timestamp: f64, nm: f64) -> TrackPoint {
        TrackPoint::new(id, timestamp, 0.0, nm * NM_DEG, 99.0)
    }

    #[test]
    fn test_compute_speeds() {
        // One nautical mile per hour, then stationary
        let points = vec![
            ping("a", 3600.0, 1.0),
            ping("a", 0.0, 0.0),
            ping("a", 7200.0, 1.0),
        ];
        let out = compute_speeds(&points).unwrap();

        assert_eq!(out[0].timestamp, 0.0);
        assert_eq!(out[0].speed, 0.0);
        assert!((out[1].speed - 1.0).abs() < 1e-3);
        assert!(out[2].speed.abs() < 1e-9);
    }

    #[test]
    fn test_speeds_reset_per_object() {
        let points = vec![ping("a", 0.0, 0.0), ping("b", 60.0, 10.0)];
        let out = compute_speeds(&points).unwrap();
        assert!(out.iter().all(|p| p.speed == 0.0));
    }

    #[test]
    fn test_filter_by_speed_drops_glitch() {
        let points = vec![
            ping("a", 0.0, 0.0),
            ping("a", 3600.0, 10.0),
            // 500 nm in one minute
            ping("a", 3660.0, 510.0),
        ];
        let out = filter_by_speed(&points, 50.0).unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[1].timestamp, 3600.0);
        // Reported speed untouched
        assert_eq!(out[1].speed, 99.0);
    }
}
