//! Trip segmentation over a batch of objects.
//!
//! Rows are grouped by object id, each group is sorted by timestamp, stop points
//! are detected, and the group is cut into trips. Groups are processed in
//! ascending object id order; trip ids are global and strictly increasing in
//! that order.
//!
//! Groups are independent apart from the trip id sequence, so the parallel
//! variant assigns group-local ids and renumbers them once every group is done.
//! Both variants produce identical output.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::stop_points::detect_stop_points;
use crate::trips::{split_into_trips, AnnotatedPoint, Trip, TripIdCounter};
use crate::{Result, SegmentError, SegmentationConfig, TrackPoint};

/// Output of a segmentation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SegmentationResult {
    /// Trips in (object order, trip order)
    pub trips: Vec<Trip>,
    /// Total number of stop points across all objects
    pub stop_count: usize,
    /// Number of distinct objects processed
    pub object_count: usize,
}

impl SegmentationResult {
    /// All annotated rows in output order.
    pub fn rows(&self) -> impl Iterator<Item = &AnnotatedPoint> {
        self.trips.iter().flat_map(|t| t.points.iter())
    }

    /// Trips belonging to one object.
    pub fn trips_for<'a>(&'a self, object_id: &'a str) -> impl Iterator<Item = &'a Trip> {
        self.trips.iter().filter(move |t| t.object_id == object_id)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Group points by object id and sort each group by timestamp.
///
/// Fails before any grouping happens if a point has a non-finite timestamp or
/// invalid values. Groups come back in ascending object id order; points with
/// equal timestamps keep their input order.
pub fn group_by_object(points: &[TrackPoint]) -> Result<Vec<(String, Vec<TrackPoint>)>> {
    for (row, point) in points.iter().enumerate() {
        if !point.timestamp.is_finite() {
            return Err(SegmentError::UnorderedTimestamps {
                object_id: point.object_id.clone(),
                message: format!("row {} has timestamp {}", row, point.timestamp),
            });
        }
        if !point.is_valid() {
            return Err(SegmentError::InvalidValue {
                row,
                field: "coordinates/speed".to_string(),
                message: format!(
                    "lat={}, lng={}, speed={}",
                    point.latitude, point.longitude, point.speed
                ),
            });
        }
    }

    let mut groups: BTreeMap<String, Vec<TrackPoint>> = BTreeMap::new();
    for point in points {
        groups
            .entry(point.object_id.clone())
            .or_default()
            .push(point.clone());
    }

    Ok(groups
        .into_iter()
        .map(|(id, mut track)| {
            track.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
            (id, track)
        })
        .collect())
}

/// Detect stops in one sorted group and cut it into trips.
fn segment_group(
    object_id: &str,
    track: Vec<TrackPoint>,
    config: &SegmentationConfig,
    counter: &mut TripIdCounter,
) -> (Vec<Trip>, usize) {
    let detection = detect_stop_points(&track, config);
    let stop_count = detection.stop_indices.len();
    let trips = split_into_trips(track, &detection.stop_indices, counter);

    debug!(
        "[Segmenter] Object {}: {} candidates evaluated, {} stops, {} trips",
        object_id,
        detection.candidates_evaluated,
        stop_count,
        trips.len()
    );

    (trips, stop_count)
}

fn run(
    points: &[TrackPoint],
    config: &SegmentationConfig,
    cancel: Option<&AtomicBool>,
) -> Result<SegmentationResult> {
    config.validate()?;
    let groups = group_by_object(points)?;

    info!(
        "[Segmenter] Segmenting {} points across {} objects",
        points.len(),
        groups.len()
    );

    let mut counter = TripIdCounter::new();
    let mut result = SegmentationResult::default();

    for (id, track) in groups {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            info!(
                "[Segmenter] Cancelled after {} objects",
                result.object_count
            );
            return Err(SegmentError::Cancelled {
                groups_completed: result.object_count,
            });
        }

        let (trips, stops) = segment_group(&id, track, config, &mut counter);
        result.trips.extend(trips);
        result.stop_count += stops;
        result.object_count += 1;
    }

    info!(
        "[Segmenter] Produced {} trips with {} stop points",
        result.trips.len(),
        result.stop_count
    );

    Ok(result)
}

/// Segment every object's trajectory into trips.
///
/// # Example
/// ```
/// use trip_segmenter::{segment_trajectories, SegmentationConfig, TrackPoint};
///
/// let points = vec![
///     TrackPoint::new("a", 0.0, 0.0, 0.0, 12.0),
///     TrackPoint::new("a", 60.0, 0.01, 0.0, 12.0),
/// ];
/// let result = segment_trajectories(&points, &SegmentationConfig::default()).unwrap();
/// assert_eq!(result.trips.len(), 1);
/// assert_eq!(result.trips[0].trip_id, 1);
/// ```
pub fn segment_trajectories(
    points: &[TrackPoint],
    config: &SegmentationConfig,
) -> Result<SegmentationResult> {
    run(points, config, None)
}

/// Same as [`segment_trajectories`], checking `cancel` before each object.
///
/// Returns [`SegmentError::Cancelled`] if the flag is set at a group boundary.
pub fn segment_trajectories_with_cancel(
    points: &[TrackPoint],
    config: &SegmentationConfig,
    cancel: &AtomicBool,
) -> Result<SegmentationResult> {
    run(points, config, Some(cancel))
}

/// Segment objects in parallel.
///
/// Uses rayon to process groups concurrently. Output is identical to
/// [`segment_trajectories`]. Recommended for large fleets (100+ objects).
#[cfg(feature = "parallel")]
pub fn segment_trajectories_parallel(
    points: &[TrackPoint],
    config: &SegmentationConfig,
) -> Result<SegmentationResult> {
    use rayon::prelude::*;

    config.validate()?;
    let groups = group_by_object(points)?;
    let object_count = groups.len();

    info!(
        "[Segmenter] Segmenting {} points across {} objects (parallel)",
        points.len(),
        object_count
    );

    let per_group: Vec<(Vec<Trip>, usize)> = groups
        .into_par_iter()
        .map(|(id, track)| {
            let mut local = TripIdCounter::new();
            segment_group(&id, track, config, &mut local)
        })
        .collect();

    // Renumber group-local ids into the global sequence (sequential - fast enough)
    let mut counter = TripIdCounter::new();
    let mut result = SegmentationResult {
        object_count,
        ..Default::default()
    };
    for (trips, stops) in per_group {
        for mut trip in trips {
            let id = counter.next_id();
            trip.trip_id = id;
            for p in &mut trip.points {
                p.trip_id = id;
            }
            result.trips.push(trip);
        }
        result.stop_count += stops;
    }

    info!(
        "[Segmenter] Produced {} trips with {} stop points",
        result.trips.len(),
        result.stop_count
    );

    Ok(result)
}
