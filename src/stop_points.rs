//! Stop-point detection for a single object's trajectory.
//!
//! Low speed alone does not make a stop: a vessel crawling through a channel is
//! slow but still travelling. A candidate (speed at or below the threshold) is
//! accepted only when the object stayed within `distance_threshold` of it for at
//! least `time_threshold`.
//!
//! ## Algorithm
//! 1. Collect candidate indices (speed <= speed_threshold), ascending
//! 2. For the candidate under the cursor, side-search the points before and after it
//! 3. No boundary on either side: reject
//! 4. Boundary on one side only: accept if the time between the candidate and
//!    that boundary reaches `time_threshold`
//! 5. Boundaries on both sides: accept if the time between them reaches
//!    `time_threshold`
//! 6. After accepting, resume at the first candidate past the next point that
//!    moves faster than `speed_threshold`; stop scanning if there is none

use log::debug;

use crate::geo_utils::time_gap;
use crate::side_search::{side_search, time_windows};
use crate::{SegmentationConfig, TrackPoint};

/// Stop points found in one trajectory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopDetection {
    /// Ascending trajectory indices judged to be stop points
    pub stop_indices: Vec<usize>,
    /// Number of candidates evaluated (for diagnostics)
    pub candidates_evaluated: usize,
}

/// Detect stop points in a trajectory sorted ascending by timestamp.
///
/// The sort order is a precondition and is not re-checked here.
pub fn detect_stop_points(points: &[TrackPoint], config: &SegmentationConfig) -> StopDetection {
    let bounds = config.search_bounds();
    let candidates: Vec<usize> = points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.speed <= config.speed_threshold)
        .map(|(i, _)| i)
        .collect();

    let mut detection = StopDetection::default();
    let mut cursor = 0;

    while cursor < candidates.len() {
        let center_idx = candidates[cursor];
        let center = &points[center_idx];
        detection.candidates_evaluated += 1;

        let (before, after) = time_windows(points, center_idx, bounds.max_time_gap);
        let left = side_search(&points[before.clone()], before.start, center, &bounds);
        let right = side_search(&points[after.clone()], after.start, center, &bounds);

        // Elapsed dwell time and the index after which scanning resumes
        let (elapsed, resume_after) = match (left, right) {
            (None, None) => {
                cursor += 1;
                continue;
            }
            (Some(li), None) => (time_gap(center.timestamp, points[li].timestamp), center_idx),
            (None, Some(ri)) => (time_gap(points[ri].timestamp, center.timestamp), ri),
            (Some(li), Some(ri)) => (points[ri].timestamp - points[li].timestamp, ri),
        };

        if elapsed < config.time_threshold {
            cursor += 1;
            continue;
        }

        debug!(
            "[StopDetector] Stop at index {} (left={:?}, right={:?}, dwell={:.0}s)",
            center_idx, left, right, elapsed
        );
        detection.stop_indices.push(center_idx);

        // Skip the rest of this stationary cluster
        let resume_at = points
            .iter()
            .enumerate()
            .skip(resume_after + 1)
            .find(|(_, p)| p.speed > config.speed_threshold)
            .map(|(i, _)| i);

        match resume_at {
            Some(next) => cursor = candidates.partition_point(|&i| i < next),
            None => break,
        }
    }

    detection
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SegmentationConfig {
        SegmentationConfig::default()
    }

    /// Point `km` kilometres north of the equator on the prime meridian.
    fn ping(timestamp: f64, km: f64, speed: f64) -> TrackPoint {
        TrackPoint::new("a", timestamp, 0.0, km / 111.195, speed)
    }

    #[test]
    fn test_empty_trajectory() {
        let detection = detect_stop_points(&[], &config());
        assert!(detection.stop_indices.is_empty());
        assert_eq!(detection.candidates_evaluated, 0);
    }

    #[test]
    fn test_no_candidates() {
        let points: Vec<TrackPoint> = (0..10)
            .map(|i| ping(i as f64 * 60.0, i as f64 * 2.0, 12.0))
            .collect();
        let detection = detect_stop_points(&points, &config());
        assert!(detection.stop_indices.is_empty());
        assert_eq!(detection.candidates_evaluated, 0);
    }

    #[test]
    fn test_three_point_dwell() {
        let points = vec![ping(0.0, 0.0, 0.5), ping(400.0, 1.0, 0.3), ping(1000.0, 2.0, 0.4)];
        let detection = detect_stop_points(&points, &config());
        assert_eq!(detection.stop_indices, vec![0]);
    }

    #[test]
    fn test_isolated_slow_point_rejected() {
        // Slow point with every neighbour far away
        let points = vec![
            ping(0.0, 0.0, 10.0),
            ping(600.0, 20.0, 0.5),
            ping(1200.0, 40.0, 10.0),
        ];
        let detection = detect_stop_points(&points, &config());
        assert!(detection.stop_indices.is_empty());
        assert_eq!(detection.candidates_evaluated, 1);
    }

    #[test]
    fn test_short_slowdown_rejected() {
        // Both boundaries found but only 120s apart
        let points = vec![
            ping(0.0, 0.0, 10.0),
            ping(60.0, 0.5, 1.0),
            ping(120.0, 1.0, 10.0),
            ping(1200.0, 30.0, 10.0),
        ];
        let detection = detect_stop_points(&points, &config());
        assert!(detection.stop_indices.is_empty());
    }

    #[test]
    fn test_single_sided_requires_dwell() {
        // Only a right boundary, 100s away: rejected
        let points = vec![ping(0.0, 0.0, 1.0), ping(100.0, 1.0, 10.0)];
        assert!(detect_stop_points(&points, &config()).stop_indices.is_empty());

        // Only a left boundary, 500s away: accepted
        let points = vec![ping(0.0, 0.0, 10.0), ping(500.0, 1.0, 1.0)];
        assert_eq!(detect_stop_points(&points, &config()).stop_indices, vec![1]);
    }

    #[test]
    fn test_two_sided_stop_resumes_past_right_boundary() {
        let points = vec![
            ping(0.0, 0.0, 8.0),
            ping(60.0, 1.0, 0.5),
            ping(400.0, 1.1, 0.2),
            ping(800.0, 1.2, 0.2),
            ping(900.0, 30.0, 9.0),
            ping(1000.0, 31.0, 0.3),
        ];
        let detection = detect_stop_points(&points, &config());

        // Boundaries 0 and 3; candidates 2 and 3 are skipped, 5 is evaluated and rejected
        assert_eq!(detection.stop_indices, vec![1]);
        assert_eq!(detection.candidates_evaluated, 2);
    }

    #[test]
    fn test_two_sided_dwell_spans_both_boundaries() {
        // Center to right boundary is only 100s, left to right boundary is 350s
        let points = vec![
            ping(0.0, 1.0, 8.0),
            ping(250.0, 0.0, 0.5),
            ping(350.0, 0.1, 8.0),
            ping(450.0, 30.0, 8.0),
        ];
        assert_eq!(detect_stop_points(&points, &config()).stop_indices, vec![1]);

        // Same shape, 250s between the boundaries: rejected
        let points = vec![
            ping(100.0, 1.0, 8.0),
            ping(250.0, 0.0, 0.5),
            ping(350.0, 0.1, 8.0),
            ping(450.0, 30.0, 8.0),
        ];
        assert!(detect_stop_points(&points, &config()).stop_indices.is_empty());
    }

    #[test]
    fn test_long_mooring_beyond_search_window() {
        // Eight hours without moving, dwell threshold above the search window
        let points: Vec<TrackPoint> = (0..50).map(|i| ping(i as f64 * 600.0, 0.0, 0.1)).collect();
        let config = SegmentationConfig {
            time_threshold: 7200.0,
            search_time_window: 3600.0,
            ..Default::default()
        };

        assert_eq!(detect_stop_points(&points, &config).stop_indices, vec![0]);
    }

    #[test]
    fn test_two_separate_stops() {
        let mut points = Vec::new();
        // Anchored near km 0 for 20 minutes
        for i in 0..5 {
            points.push(ping(i as f64 * 300.0, i as f64 * 0.1, 0.2));
        }
        // Transit north at speed
        for i in 0..5 {
            points.push(ping(1500.0 + i as f64 * 600.0, 10.0 + i as f64 * 10.0, 12.0));
        }
        // Anchored near km 100 for 20 minutes
        for i in 0..5 {
            points.push(ping(5000.0 + i as f64 * 300.0, 100.0 + i as f64 * 0.1, 0.2));
        }

        let detection = detect_stop_points(&points, &config());
        assert_eq!(detection.stop_indices, vec![0, 10]);
    }

    #[test]
    fn test_stop_indices_ascending() {
        let points: Vec<TrackPoint> = (0..60)
            .map(|i| {
                let speed = if (i / 10) % 2 == 0 { 0.3 } else { 9.0 };
                ping(i as f64 * 120.0, (i / 10) as f64 * 20.0 + (i % 10) as f64 * 0.05, speed)
            })
            .collect();
        let detection = detect_stop_points(&points, &config());
        assert!(!detection.stop_indices.is_empty());
        assert!(detection.stop_indices.windows(2).all(|w| w[0] < w[1]));
    }
}
