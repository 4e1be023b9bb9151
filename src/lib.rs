//! # Trip Segmenter
//!
//! Stop-point detection and trip segmentation for time-ordered position tracks
//! (AIS pings, vehicle GPS logs).
//!
//! This library provides:
//! - Stop-point detection from speed, radius and dwell-time thresholds
//! - Segmentation of each object's track into trips between stop points
//! - Validation of loosely-typed input tables and per-step speed preprocessing
//! - Parallel processing of independent objects
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel processing with rayon
//!
//! ## Quick Start
//!
//! ```rust
//! use trip_segmenter::{segment_trajectories, SegmentationConfig, TrackPoint};
//!
//! // A vessel drifting in port for 1000 seconds
//! let points = vec![
//!     TrackPoint::new("244660000", 0.0, 4.2800, 51.9000, 0.5),
//!     TrackPoint::new("244660000", 400.0, 4.2805, 51.9002, 0.3),
//!     TrackPoint::new("244660000", 1000.0, 4.2810, 51.9004, 0.4),
//! ];
//!
//! let result = segment_trajectories(&points, &SegmentationConfig::default()).unwrap();
//! assert_eq!(result.stop_count, 1);
//! assert_eq!(result.trips.len(), 2);
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{OptionExt, Result, SegmentError};

// Great-circle distance and time metrics
pub mod geo_utils;
pub use geo_utils::{distance, time_gap};

// One-sided boundary search around a candidate stop
pub mod side_search;
pub use side_search::{side_search, SearchBounds};

// Stop-point detection for a single trajectory
pub mod stop_points;
pub use stop_points::{detect_stop_points, StopDetection};

// Cutting a marked trajectory into trips
pub mod trips;
pub use trips::{split_into_trips, AnnotatedPoint, Trip, TripIdCounter};

// Grouping by object and running the full pipeline
pub mod segmentation;
pub use segmentation::{
    group_by_object, segment_trajectories, segment_trajectories_with_cancel, SegmentationResult,
};
#[cfg(feature = "parallel")]
pub use segmentation::segment_trajectories_parallel;

// Input table validation with column mapping
pub mod table;
pub use table::{annotated_rows_to_json, parse_rows, ColumnMapping};

// Per-step speed computation and speed filtering
pub mod preprocessing;
pub use preprocessing::{compute_speeds, filter_by_speed};

// ============================================================================
// Core Types
// ============================================================================

/// A single position report of a moving object.
///
/// # Example
/// ```
/// use trip_segmenter::TrackPoint;
/// let ping = TrackPoint::new("244660000", 1_700_000_000.0, 4.28, 51.90, 0.4);
/// assert!(ping.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    /// Identifier of the moving object (MMSI, vehicle id, ...)
    pub object_id: String,
    /// Timestamp in seconds
    pub timestamp: f64,
    pub longitude: f64,
    pub latitude: f64,
    /// Precomputed speed (knots when produced by [`compute_speeds`])
    pub speed: f64,
}

impl TrackPoint {
    /// Create a new track point.
    pub fn new(
        object_id: impl Into<String>,
        timestamp: f64,
        longitude: f64,
        latitude: f64,
        speed: f64,
    ) -> Self {
        Self {
            object_id: object_id.into(),
            timestamp,
            longitude,
            latitude,
            speed,
        }
    }

    /// Check if the point has finite values and valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.timestamp.is_finite()
            && self.speed.is_finite()
            && self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Configuration for stop-point detection and trip segmentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentationConfig {
    /// Name of the column that groups rows into objects.
    /// Default: "mmsi"
    pub identifier: String,

    /// Points at or below this speed are candidate stop points.
    /// Default: 1.5 (knots)
    pub speed_threshold: f64,

    /// Radius around a candidate within which the object counts as stationary.
    /// Default: 5.0 kilometres
    pub distance_threshold: f64,

    /// Minimum dwell time inside the radius for a candidate to become a stop point.
    /// Default: 300.0 seconds
    pub time_threshold: f64,

    /// Maximum time gap between a candidate and the points its side search considers.
    /// Never narrower than `time_threshold`. Default: 3600.0 seconds
    pub search_time_window: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            identifier: "mmsi".to_string(),
            speed_threshold: 1.5,
            distance_threshold: 5.0,
            time_threshold: 300.0,
            search_time_window: 3600.0,
        }
    }
}

impl SegmentationConfig {
    /// Check that every threshold is usable.
    pub fn validate(&self) -> Result<()> {
        if self.identifier.trim().is_empty() {
            return Err(SegmentError::ConfigError {
                message: "identifier must not be empty".to_string(),
            });
        }

        let thresholds = [
            ("speed_threshold", self.speed_threshold),
            ("distance_threshold", self.distance_threshold),
            ("time_threshold", self.time_threshold),
            ("search_time_window", self.search_time_window),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(SegmentError::ConfigError {
                    message: format!("{} must be a finite non-negative number, got {}", name, value),
                });
            }
        }

        Ok(())
    }

    /// Bounds used by the side search around each candidate.
    ///
    /// The time bound is widened to `time_threshold` when the search window is
    /// shorter, otherwise dwells longer than the window could never be accepted.
    pub fn search_bounds(&self) -> SearchBounds {
        SearchBounds {
            max_distance: self.distance_threshold,
            max_time_gap: self.search_time_window.max(self.time_threshold),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
