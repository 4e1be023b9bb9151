//! Loosely-typed input tables.
//!
//! Position data usually arrives as rows of named columns whose names vary by
//! source (`mmsi`, `uid`, `lon`, `lng`...). This module maps those columns onto
//! [`TrackPoint`] fields, rejecting rows with missing or non-numeric values, and
//! writes annotated results back out with the same column names.
//!
//! Validation is fail-fast: the first bad row aborts the whole batch, before any
//! object is segmented.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::segmentation::SegmentationResult;
use crate::{OptionExt, Result, SegmentError, SegmentationConfig, TrackPoint};

/// Column names used to read and write track rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub object_id: String,
    pub timestamp: String,
    pub longitude: String,
    pub latitude: String,
    /// Speed column. `None` when speed is computed afterwards with
    /// [`compute_speeds`](crate::compute_speeds); rows are then read with speed 0.
    pub speed: Option<String>,
}

impl Default for ColumnMapping {
    fn default() -> Self {
        Self {
            object_id: "uid".to_string(),
            timestamp: "timestamp".to_string(),
            longitude: "longitude".to_string(),
            latitude: "latitude".to_string(),
            speed: Some("speed".to_string()),
        }
    }
}

impl ColumnMapping {
    /// Default mapping grouped by the configured identifier column.
    pub fn from_config(config: &SegmentationConfig) -> Self {
        Self {
            object_id: config.identifier.clone(),
            ..Default::default()
        }
    }

    /// Mapping for tables without a speed column.
    pub fn without_speed(mut self) -> Self {
        self.speed = None;
        self
    }
}

fn numeric_field(row: &Map<String, Value>, index: usize, field: &str) -> Result<f64> {
    let value = row.get(field).ok_or_missing_field(index, field)?;
    let number = value
        .as_f64()
        .ok_or_invalid(index, field, &format!("expected a number, got {}", value))?;
    if !number.is_finite() {
        return Err(SegmentError::InvalidValue {
            row: index,
            field: field.to_string(),
            message: format!("{} is not finite", number),
        });
    }
    Ok(number)
}

fn object_id_field(row: &Map<String, Value>, index: usize, field: &str) -> Result<String> {
    match row.get(field).ok_or_missing_field(index, field)? {
        Value::String(s) if !s.is_empty() => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(SegmentError::InvalidValue {
            row: index,
            field: field.to_string(),
            message: format!("expected a string or integer id, got {}", other),
        }),
    }
}

fn parse_row(value: &Value, index: usize, mapping: &ColumnMapping) -> Result<TrackPoint> {
    let row = value
        .as_object()
        .ok_or_invalid(index, "<row>", "expected an object")?;

    let object_id = object_id_field(row, index, &mapping.object_id)?;
    let timestamp = numeric_field(row, index, &mapping.timestamp)?;
    let longitude = numeric_field(row, index, &mapping.longitude)?;
    let latitude = numeric_field(row, index, &mapping.latitude)?;
    let speed = match &mapping.speed {
        Some(column) => numeric_field(row, index, column)?,
        None => 0.0,
    };

    if !(-180.0..=180.0).contains(&longitude) {
        return Err(SegmentError::InvalidValue {
            row: index,
            field: mapping.longitude.clone(),
            message: format!("{} is outside [-180, 180]", longitude),
        });
    }
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(SegmentError::InvalidValue {
            row: index,
            field: mapping.latitude.clone(),
            message: format!("{} is outside [-90, 90]", latitude),
        });
    }

    Ok(TrackPoint {
        object_id,
        timestamp,
        longitude,
        latitude,
        speed,
    })
}

/// Parse JSON object rows into track points.
///
/// # Example
/// ```
/// use serde_json::json;
/// use trip_segmenter::{parse_rows, ColumnMapping};
///
/// let rows = vec![json!({"uid": 1, "timestamp": 0, "longitude": 4.2, "latitude": 51.9, "speed": 0.4})];
/// let points = parse_rows(&rows, &ColumnMapping::default()).unwrap();
/// assert_eq!(points[0].object_id, "1");
/// ```
pub fn parse_rows(rows: &[Value], mapping: &ColumnMapping) -> Result<Vec<TrackPoint>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| parse_row(row, i, mapping))
        .collect()
}

fn number(value: f64) -> Value {
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

/// Write segmented rows back out as JSON objects with `stop` and `trip_id` columns.
///
/// Rows are in output order: object, then trip, then timestamp. Object ids are
/// always written as strings, since [`parse_rows`] normalises integer ids
/// (`244660000` becomes `"244660000"`).
pub fn annotated_rows_to_json(result: &SegmentationResult, mapping: &ColumnMapping) -> Value {
    let rows = result
        .rows()
        .map(|row| {
            let mut obj = Map::new();
            obj.insert(
                mapping.object_id.clone(),
                Value::String(row.point.object_id.clone()),
            );
            obj.insert(mapping.timestamp.clone(), number(row.point.timestamp));
            obj.insert(mapping.longitude.clone(), number(row.point.longitude));
            obj.insert(mapping.latitude.clone(), number(row.point.latitude));
            let speed_column = mapping.speed.as_deref().unwrap_or("speed");
            obj.insert(speed_column.to_string(), number(row.point.speed));
            obj.insert("stop".to_string(), Value::Bool(row.is_stop));
            obj.insert("trip_id".to_string(), Value::from(row.trip_id));
            Value::Object(obj)
        })
        .collect();

    Value::Array(rows)
}
