//! Cutting a marked trajectory into trips.
//!
//! A stop point is the last point of the trip it ends; the next trip starts at
//! the point after it. A trajectory with `k` stop points therefore yields `k + 1`
//! trips, except when it ends exactly on a stop point: the empty trailing trip
//! is not emitted and does not consume an id.

use serde::{Deserialize, Serialize};

use crate::TrackPoint;

/// Process-wide trip id sequence, advanced in group-processing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripIdCounter {
    next: u64,
}

impl TripIdCounter {
    /// Counter whose first id is 1.
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Take the next id.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to [`next_id`](Self::next_id) returns.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for TripIdCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// A track point annotated with its stop flag and trip id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedPoint {
    #[serde(flatten)]
    pub point: TrackPoint,
    /// Whether this point was detected as a stop point
    #[serde(rename = "stop")]
    pub is_stop: bool,
    pub trip_id: u64,
}

/// A maximal contiguous run of points between stop points or trajectory ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub trip_id: u64,
    pub object_id: String,
    /// Points in timestamp order
    pub points: Vec<AnnotatedPoint>,
}

impl Trip {
    /// Timestamp of the first point.
    pub fn start_time(&self) -> Option<f64> {
        self.points.first().map(|p| p.point.timestamp)
    }

    /// Timestamp of the last point.
    pub fn end_time(&self) -> Option<f64> {
        self.points.last().map(|p| p.point.timestamp)
    }

    /// Whether this trip ends on a detected stop point.
    pub fn ends_at_stop(&self) -> bool {
        self.points.last().is_some_and(|p| p.is_stop)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Split one object's sorted trajectory at ascending `stop_indices`.
///
/// Every point lands in exactly one trip. Ids come from `counter` in trip order.
pub fn split_into_trips(
    points: Vec<TrackPoint>,
    stop_indices: &[usize],
    counter: &mut TripIdCounter,
) -> Vec<Trip> {
    if points.is_empty() {
        return Vec::new();
    }

    let object_id = points[0].object_id.clone();
    let mut trips = Vec::with_capacity(stop_indices.len() + 1);
    let mut stops = stop_indices.iter().copied().peekable();
    let mut current: Vec<AnnotatedPoint> = Vec::new();
    let mut trip_id = 0;

    for (i, point) in points.into_iter().enumerate() {
        if current.is_empty() {
            trip_id = counter.next_id();
        }

        let is_stop = stops.next_if_eq(&i).is_some();
        current.push(AnnotatedPoint {
            point,
            is_stop,
            trip_id,
        });

        if is_stop {
            trips.push(Trip {
                trip_id,
                object_id: object_id.clone(),
                points: std::mem::take(&mut current),
            });
        }
    }

    // Trailing trip after the last stop (or the whole trajectory)
    if !current.is_empty() {
        trips.push(Trip {
            trip_id,
            object_id,
            points: current,
        });
    }

    trips
}
