//! Unified error handling for the trip-segmenter library.
//!
//! Only input and configuration problems surface as errors. A side search that
//! finds no boundary, or a scan that runs out of candidates, is ordinary control
//! flow and is modelled with `Option` / loop exit inside the algorithm modules.

use thiserror::Error;

/// Unified error type for segmentation operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SegmentError {
    /// Input row lacks a required column
    #[error("Row {row} is missing required field '{field}'")]
    MissingField { row: usize, field: String },

    /// Input row has a value that cannot be used (non-numeric, non-finite, out of range)
    #[error("Row {row} has invalid '{field}': {message}")]
    InvalidValue {
        row: usize,
        field: String,
        message: String,
    },

    /// Timestamps of an object cannot be totally ordered
    #[error("Object '{object_id}' has unorderable timestamps: {message}")]
    UnorderedTimestamps { object_id: String, message: String },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Processing stopped at a group boundary because cancellation was requested
    #[error("Segmentation cancelled after {groups_completed} objects")]
    Cancelled { groups_completed: usize },
}

/// Result type alias for segmentation operations.
pub type Result<T> = std::result::Result<T, SegmentError>;

/// Extension trait for converting Option to SegmentError.
pub trait OptionExt<T> {
    /// Convert Option to Result with a missing field error.
    fn ok_or_missing_field(self, row: usize, field: &str) -> Result<T>;

    /// Convert Option to Result with an invalid value error.
    fn ok_or_invalid(self, row: usize, field: &str, message: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_missing_field(self, row: usize, field: &str) -> Result<T> {
        self.ok_or_else(|| SegmentError::MissingField {
            row,
            field: field.to_string(),
        })
    }

    fn ok_or_invalid(self, row: usize, field: &str, message: &str) -> Result<T> {
        self.ok_or_else(|| SegmentError::InvalidValue {
            row,
            field: field.to_string(),
            message: message.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SegmentError::MissingField {
            row: 3,
            field: "latitude".to_string(),
        };
        assert!(err.to_string().contains("Row 3"));
        assert!(err.to_string().contains("latitude"));

        let err = SegmentError::Cancelled {
            groups_completed: 2,
        };
        assert_eq!(err.to_string(), "Segmentation cancelled after 2 objects");
    }

    #[test]
    fn test_option_ext() {
        let none: Option<i32> = None;
        let result = none.ok_or_missing_field(0, "timestamp");
        assert!(matches!(result, Err(SegmentError::MissingField { .. })));

        let some = Some(1.5).ok_or_invalid(0, "speed", "not a number");
        assert_eq!(some, Ok(1.5));
    }
}
