//! Time-windowed sample storage
//!
//! [`TimeWindowBuffer`] keeps the samples of the trailing time window for
//! one signal. Each ingest may:
//!
//! 1. clear the buffer when the stream jumps backwards or skips ahead by
//!    more than [`DISCONTINUITY_JUMP_MS`] (seeking in a replay, long silence),
//! 2. smooth the incoming value with a first-order low-pass filter,
//! 3. append it and evict everything older than the window.
//!
//! The buffer also derives what the renderer needs: an auto-scaled value
//! range and a polyline that drops to the zero baseline across gaps and
//! after the signal goes stale.

use crate::types::{Sample, TracePoint, ValueRange};
use std::collections::VecDeque;

/// Forward jump (ms) beyond which the buffer is treated as discontinuous
pub const DISCONTINUITY_JUMP_MS: i64 = 1000;

/// Spacing (ms) between two samples beyond which the trace shows a gap
pub const GAP_THRESHOLD_MS: i64 = 200;

/// Age (ms) of the newest sample beyond which the signal counts as stale
pub const STALE_THRESHOLD_MS: i64 = 100;

/// Fraction of the value span added above and below the auto-scaled range
const RANGE_MARGIN: f64 = 0.1;

/// What happened during a single ingest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestOutcome {
    /// The buffer was cleared before appending
    pub reset: bool,
    /// Number of samples dropped for falling out of the window
    pub evicted: usize,
}

/// Ordered sample buffer covering a trailing time window
#[derive(Debug, Clone, Default)]
pub struct TimeWindowBuffer {
    samples: VecDeque<Sample>,
    /// Low-pass coefficient in [0, 1]; 0 disables smoothing
    filter_alpha: f64,
}

impl TimeWindowBuffer {
    /// Create an empty buffer with smoothing disabled
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with the given low-pass coefficient
    pub fn with_filter_alpha(alpha: f64) -> Self {
        let mut buffer = Self::new();
        buffer.set_filter_alpha(alpha);
        buffer
    }

    /// Current low-pass coefficient
    pub fn filter_alpha(&self) -> f64 {
        self.filter_alpha
    }

    /// Set the low-pass coefficient, clamped to [0, 1]; NaN disables it
    pub fn set_filter_alpha(&mut self, alpha: f64) {
        self.filter_alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
    }

    /// Add a sample and evict everything older than `window_ms` before it.
    ///
    /// Returns whether a discontinuity cleared the buffer first and how many
    /// samples were evicted.
    pub fn ingest(&mut self, sample: Sample, window_ms: i64) -> IngestOutcome {
        let mut outcome = IngestOutcome::default();

        if let Some(last) = self.samples.back() {
            let jump = sample.timestamp_ms.saturating_sub(last.timestamp_ms);
            if jump < 0 || jump > DISCONTINUITY_JUMP_MS {
                tracing::debug!(
                    "Discontinuity at {} ms (last {} ms), clearing {} samples",
                    sample.timestamp_ms,
                    last.timestamp_ms,
                    self.samples.len()
                );
                self.samples.clear();
                outcome.reset = true;
            }
        }

        let value = if self.filter_alpha > 0.0 {
            let last_value = self.samples.back().map(|s| s.value).unwrap_or(0.0);
            last_value * self.filter_alpha + sample.value * (1.0 - self.filter_alpha)
        } else {
            sample.value
        };
        self.samples.push_back(Sample::new(sample.timestamp_ms, value));

        let cutoff = sample.timestamp_ms.saturating_sub(window_ms);
        while self
            .samples
            .front()
            .is_some_and(|s| s.timestamp_ms < cutoff)
        {
            self.samples.pop_front();
            outcome.evicted += 1;
        }

        outcome
    }

    /// Number of buffered samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Check if no samples are buffered
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterate over buffered samples, oldest first
    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// Copy the buffered samples out, oldest first
    pub fn to_vec(&self) -> Vec<Sample> {
        self.samples.iter().copied().collect()
    }

    /// Get the newest sample
    pub fn last(&self) -> Option<&Sample> {
        self.samples.back()
    }

    /// Get the time range of the data
    pub fn time_range(&self) -> Option<(i64, i64)> {
        let first = self.samples.front()?.timestamp_ms;
        let last = self.samples.back()?.timestamp_ms;
        Some((first, last))
    }

    /// Auto-scaled value range.
    ///
    /// Always includes zero and adds a 10% margin on both sides, or a unit
    /// margin when all values are equal. An empty buffer yields
    /// [`ValueRange::DEFAULT`].
    pub fn value_range(&self) -> ValueRange {
        if self.samples.is_empty() {
            return ValueRange::DEFAULT;
        }

        let (min, max) = self
            .samples
            .iter()
            .fold((0.0f64, 0.0f64), |(min, max), s| (min.min(s.value), max.max(s.value)));

        let span = max - min;
        if span == 0.0 {
            ValueRange::new(min - 1.0, max + 1.0)
        } else {
            let margin = span * RANGE_MARGIN;
            ValueRange::new(min - margin, max + margin)
        }
    }

    /// Whether the newest sample is at most [`STALE_THRESHOLD_MS`] older than `now_ms`
    pub fn is_live(&self, now_ms: i64) -> bool {
        self.samples
            .back()
            .is_some_and(|last| now_ms.saturating_sub(last.timestamp_ms) <= STALE_THRESHOLD_MS)
    }

    /// Build the polyline for rendering up to `now_ms`.
    ///
    /// Consecutive samples more than [`GAP_THRESHOLD_MS`] apart are joined
    /// along the zero baseline instead of by a slope. The tail runs flat to
    /// `now_ms` while live, and along the baseline once stale.
    pub fn trace(&self, now_ms: i64) -> Vec<TracePoint> {
        let mut points = Vec::with_capacity(self.samples.len() + 2);
        let mut previous: Option<&Sample> = None;

        for sample in &self.samples {
            if let Some(prev) = previous {
                if sample.timestamp_ms.saturating_sub(prev.timestamp_ms) > GAP_THRESHOLD_MS {
                    points.push(TracePoint::baseline(prev.timestamp_ms));
                    points.push(TracePoint::baseline(sample.timestamp_ms));
                }
            }
            points.push(TracePoint::from(*sample));
            previous = Some(sample);
        }

        if let Some(last) = previous {
            if self.is_live(now_ms) {
                points.push(TracePoint::new(now_ms, last.value));
            } else {
                points.push(TracePoint::baseline(last.timestamp_ms));
                points.push(TracePoint::baseline(now_ms));
            }
        }

        points
    }
}
