//! One-sided boundary search around a candidate stop point.
//!
//! Given the points strictly before (or strictly after) a candidate, the search
//! returns the point that is farthest from the candidate while still inside the
//! distance and time bounds. That point marks the edge of the local stationary
//! cluster, which is what the dwell-time test needs.

use std::ops::Range;

use crate::geo_utils::{distance, time_gap};
use crate::TrackPoint;

/// Distance and time limits for a side search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchBounds {
    /// Maximum great-circle distance from the center (kilometres)
    pub max_distance: f64,
    /// Maximum absolute time gap from the center (seconds)
    pub max_time_gap: f64,
}

/// Find the farthest point of `window` that lies within `bounds` of `center`.
///
/// `offset` is the trajectory index of `window[0]`; the returned index is in
/// trajectory coordinates. Returns `None` for an empty window or when no point
/// is within bounds. Ties on distance resolve to the point farthest in time from
/// the center, so a motionless cluster still reports its outer edge.
pub fn side_search(
    window: &[TrackPoint],
    offset: usize,
    center: &TrackPoint,
    bounds: &SearchBounds,
) -> Option<usize> {
    let mut best: Option<(usize, f64, f64)> = None;

    for (i, point) in window.iter().enumerate() {
        let d = distance(point, center);
        let gap = time_gap(point.timestamp, center.timestamp);
        if d > bounds.max_distance || gap > bounds.max_time_gap {
            continue;
        }
        match best {
            Some((_, best_d, best_gap)) if d < best_d || (d == best_d && gap <= best_gap) => {}
            _ => best = Some((offset + i, d, gap)),
        }
    }

    best.map(|(idx, _, _)| idx)
}

/// Index ranges of the points before and after `center_idx` whose time gap to
/// the center is within `max_time_gap`.
///
/// `points` must be sorted by timestamp. Points outside these ranges can never
/// pass a side search, so scanning only the ranges gives the same result.
pub fn time_windows(
    points: &[TrackPoint],
    center_idx: usize,
    max_time_gap: f64,
) -> (Range<usize>, Range<usize>) {
    let center_time = points[center_idx].timestamp;

    let left_start = points[..center_idx]
        .partition_point(|p| time_gap(p.timestamp, center_time) > max_time_gap);
    let right_end = center_idx
        + 1
        + points[center_idx + 1..]
            .partition_point(|p| time_gap(p.timestamp, center_time) <= max_time_gap);

    (left_start..center_idx, center_idx + 1..right_end)
}
