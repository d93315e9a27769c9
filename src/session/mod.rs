//! Signal sessions
//!
//! A [`SignalSession`] is the pipeline for one configured path expression:
//! it owns the parsed path, the evaluation context and the window buffer.
//! All of that state belongs to exactly one expression. Changing the
//! expression rebuilds the session instead of mixing samples from two
//! different signals.
//!
//! # Processing
//!
//! For each message on the session topic:
//!
//! 1. the receive time becomes the latest known "now",
//! 2. the path is evaluated against the previous committed sample,
//! 3. unresolved or non-finite results are counted and skipped,
//! 4. otherwise the inputs of `delta`/`derivative` are committed to the
//!    context and the sample is ingested into the buffer.
//!
//! Batches are processed message by message in arrival order, so `delta`
//! and `derivative` never skip history.

pub mod replay;
pub mod types;

pub use replay::{group_into_frames, ReplayReader};
pub use types::{
    BatchPolicy, MessageEvent, ReceiveTime, SessionSettings, SessionStats, DEFAULT_WINDOW_MS,
};

use crate::eval::{evaluate, EvaluationContext};
use crate::path::{parse_message_path, ParsedPath};
use crate::types::{MessageValue, Sample, TraceSnapshot};
use crate::window::TimeWindowBuffer;

/// Per-expression processing pipeline
#[derive(Debug, Clone)]
pub struct SignalSession {
    expression: String,
    path: ParsedPath,
    settings: SessionSettings,
    context: EvaluationContext,
    buffer: TimeWindowBuffer,
    current_value: f64,
    latest_timestamp_ms: Option<i64>,
    stats: SessionStats,
}

impl SignalSession {
    /// Create a session for `expression`
    pub fn new(expression: &str, settings: SessionSettings) -> Self {
        let expression = expression.trim().to_string();
        let path = parse_message_path(&expression);
        tracing::debug!("New session for '{}' -> {:?}", expression, path);

        Self {
            expression,
            path,
            settings,
            context: EvaluationContext::new(),
            buffer: TimeWindowBuffer::with_filter_alpha(settings.filter_alpha),
            current_value: 0.0,
            latest_timestamp_ms: None,
            stats: SessionStats::default(),
        }
    }

    /// The (trimmed) expression this session was built for
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// The parsed expression
    pub fn path(&self) -> &ParsedPath {
        &self.path
    }

    /// Topic the session listens to (empty if none)
    pub fn topic(&self) -> &str {
        &self.path.topic
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    pub fn buffer(&self) -> &TimeWindowBuffer {
        &self.buffer
    }

    /// Most recently stored value (0 until the first sample)
    pub fn current_value(&self) -> f64 {
        self.current_value
    }

    /// Latest receive time seen on the session topic
    pub fn latest_timestamp_ms(&self) -> Option<i64> {
        self.latest_timestamp_ms
    }

    /// Switch to a new expression.
    ///
    /// Returns `true` if the expression changed, in which case every piece
    /// of derived state (buffer, context, current value, statistics) starts
    /// over. Settings are kept.
    pub fn set_path_expression(&mut self, expression: &str) -> bool {
        if expression.trim() == self.expression {
            return false;
        }
        tracing::info!(
            "Path expression changed from '{}' to '{}', resetting session",
            self.expression,
            expression.trim()
        );
        *self = Self::new(expression, self.settings);
        true
    }

    /// Change the window length; applies from the next ingest on
    pub fn set_window_ms(&mut self, window_ms: i64) {
        self.settings.window_ms = window_ms;
    }

    /// Change the low-pass coefficient; buffered samples are kept
    pub fn set_filter_alpha(&mut self, alpha: f64) {
        self.buffer.set_filter_alpha(alpha);
        self.settings.filter_alpha = self.buffer.filter_alpha();
    }

    /// Evaluate one message already known to be on the session topic.
    ///
    /// Returns the stored sample, or `None` if the message produced no update.
    pub fn process_message(&mut self, message: &MessageValue, timestamp_ms: i64) -> Option<Sample> {
        if self.path.is_empty() {
            return None;
        }

        self.stats.messages_seen += 1;
        self.latest_timestamp_ms = Some(timestamp_ms);

        let Some(evaluation) = evaluate(message, &self.path, &self.context, timestamp_ms) else {
            self.stats.unresolved += 1;
            tracing::trace!("No value for '{}' at {} ms", self.expression, timestamp_ms);
            return None;
        };

        let value = evaluation.value;
        if !value.is_finite() {
            self.stats.non_finite += 1;
            tracing::trace!(
                "Discarding non-finite value {} for '{}' at {} ms",
                value,
                self.expression,
                timestamp_ms
            );
            return None;
        }

        self.context.commit(&evaluation);

        let outcome = self
            .buffer
            .ingest(Sample::new(timestamp_ms, value), self.settings.window_ms);
        if outcome.reset {
            self.stats.resets += 1;
        }

        let stored = *self.buffer.last()?;
        self.current_value = stored.value;
        self.stats.samples_accepted += 1;
        Some(stored)
    }

    /// Process a host batch: keep messages on the session topic and
    /// evaluate them in arrival order.
    ///
    /// Returns the number of samples stored.
    pub fn process_batch(&mut self, events: &[MessageEvent]) -> usize {
        if self.path.is_empty() {
            return 0;
        }

        let topic = self.path.topic.clone();
        let mut on_topic = events.iter().filter(|e| e.topic == topic);

        match self.effective_policy() {
            BatchPolicy::EveryMessage => on_topic
                .filter_map(|e| self.process_message(&e.message, e.timestamp_ms()))
                .count(),
            BatchPolicy::LatestOnly => on_topic
                .next_back()
                .and_then(|e| self.process_message(&e.message, e.timestamp_ms()))
                .map_or(0, |_| 1),
        }
    }

    /// The batch policy actually applied for this path
    pub fn effective_policy(&self) -> BatchPolicy {
        if self.path.has_stateful_modifiers() {
            BatchPolicy::EveryMessage
        } else {
            self.settings.batch_policy
        }
    }

    /// Output for the rendering layer, using the latest known receive time as "now"
    pub fn snapshot(&self) -> TraceSnapshot {
        let now_ms = self
            .latest_timestamp_ms
            .or_else(|| self.buffer.last().map(|s| s.timestamp_ms));

        TraceSnapshot {
            samples: self.buffer.to_vec(),
            trace: now_ms.map(|now| self.buffer.trace(now)).unwrap_or_default(),
            current_value: self.current_value,
            range: self.buffer.value_range(),
            live: now_ms.is_some_and(|now| self.buffer.is_live(now)),
            window_start_ms: now_ms.map(|now| now.saturating_sub(self.settings.window_ms)),
            now_ms,
        }
    }
}
