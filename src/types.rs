//! Core data types for gauge-trace
//!
//! This module contains the small value types shared by the evaluator,
//! the window buffer and the session pipeline.
//!
//! # Main Types
//!
//! - [`Sample`] - A single timestamped value accepted into the buffer
//! - [`TracePoint`] - A vertex of the polyline handed to the renderer
//! - [`ValueRange`] - Auto-scaled axis bounds for the buffered values
//! - [`TraceSnapshot`] - Everything the rendering layer consumes per frame
//!
//! Messages themselves are opaque nested values and are represented as
//! [`serde_json::Value`], re-exported here as [`MessageValue`].

use serde::{Deserialize, Serialize};

/// An opaque nested message body (null, bool, number, text, list or mapping)
pub type MessageValue = serde_json::Value;

/// A single data point with timestamp and value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Receive time of the message that produced this sample, in milliseconds
    pub timestamp_ms: i64,
    /// The stored value
    pub value: f64,
}

impl Sample {
    /// Create a new sample
    pub fn new(timestamp_ms: i64, value: f64) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }
}

/// A vertex of the rendered trace
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    pub timestamp_ms: i64,
    pub value: f64,
}

impl TracePoint {
    pub fn new(timestamp_ms: i64, value: f64) -> Self {
        Self {
            timestamp_ms,
            value,
        }
    }

    /// A vertex on the zero baseline
    pub fn baseline(timestamp_ms: i64) -> Self {
        Self::new(timestamp_ms, 0.0)
    }
}

impl From<Sample> for TracePoint {
    fn from(sample: Sample) -> Self {
        Self::new(sample.timestamp_ms, sample.value)
    }
}

/// Value bounds used to auto-scale the plot axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    /// Range used when nothing has been buffered yet
    pub const DEFAULT: ValueRange = ValueRange {
        min: -10.0,
        max: 10.0,
    };

    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Default for ValueRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Output of a session for one rendering frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSnapshot {
    /// Surviving samples, oldest first
    pub samples: Vec<Sample>,
    /// Polyline vertices with gap and staleness drops applied
    pub trace: Vec<TracePoint>,
    /// Most recently stored value (0 before the first sample)
    pub current_value: f64,
    /// Auto-scaled value range
    pub range: ValueRange,
    /// Whether the newest sample is recent enough to count as live
    pub live: bool,
    /// Start of the visible time span, in milliseconds
    pub window_start_ms: Option<i64>,
    /// "Now": the latest known receive time, in milliseconds
    pub now_ms: Option<i64>,
}

impl TraceSnapshot {
    /// Check if the snapshot holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
