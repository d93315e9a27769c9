//! Expression evaluation against a single message
//!
//! Evaluation resolves the field path inside the message, coerces the leaf
//! to a number and runs the modifier chain. Every failure is soft: the
//! result is `None` and the caller keeps showing the previous value.
//!
//! Stateful modifiers compare against what they saw on the previous
//! message. An [`Evaluation`] records the value entering each `delta` or
//! `derivative` in the chain, and committing it into the
//! [`EvaluationContext`] makes those the previous samples for the next
//! message. The evaluator never writes to the context; callers evaluate
//! first and commit afterwards, otherwise `delta` and `derivative` would
//! always see the current sample and yield zero.

use crate::path::ParsedPath;
use crate::types::{MessageValue, Sample};

/// History needed by stateful modifiers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationContext {
    /// Input each stateful modifier saw on the last commit, in chain order
    previous_inputs: Vec<Sample>,
}

impl EvaluationContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Previous input of the first stateful modifier in the chain
    pub fn previous_sample(&self) -> Option<&Sample> {
        self.previous_inputs.first()
    }

    /// Previous input of the `ordinal`-th stateful modifier (0-based)
    pub fn previous_input(&self, ordinal: usize) -> Option<&Sample> {
        self.previous_inputs.get(ordinal)
    }

    /// Record the stateful inputs of a just-produced evaluation
    pub fn commit(&mut self, evaluation: &Evaluation) {
        self.previous_inputs = evaluation
            .stateful_inputs
            .iter()
            .map(|&value| Sample::new(evaluation.timestamp_ms, value))
            .collect();
    }

    /// Check if nothing has been committed
    pub fn is_empty(&self) -> bool {
        self.previous_inputs.is_empty()
    }

    /// Forget all history
    pub fn reset(&mut self) {
        self.previous_inputs.clear();
    }
}

/// Result of evaluating a path against one message
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Output of the whole modifier chain
    pub value: f64,
    /// Receive time of the evaluated message
    pub timestamp_ms: i64,
    /// Value entering each stateful modifier, in chain order
    pub stateful_inputs: Vec<f64>,
}

/// Walk `message` along a dotted field path.
///
/// Empty segments are ignored, so an empty path returns the message itself.
/// Returns `None` as soon as a key is missing or the current value is not
/// an object.
pub fn resolve_field<'a>(message: &'a MessageValue, field_path: &str) -> Option<&'a MessageValue> {
    field_path
        .split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(message, |current, segment| current.as_object()?.get(segment))
}

/// Convert a resolved leaf into a number.
///
/// Numbers pass through. Text is trimmed and parsed strictly; empty text,
/// unparsable text and `NaN` fail. Every other type fails.
pub fn coerce_numeric(value: &MessageValue) -> Option<f64> {
    match value {
        MessageValue::Number(n) => n.as_f64(),
        MessageValue::String(s) => {
            let text = s.trim();
            if text.is_empty() {
                return None;
            }
            text.parse::<f64>().ok().filter(|v| !v.is_nan())
        }
        _ => None,
    }
}

/// Evaluate a parsed path against one message received at `timestamp_ms`.
///
/// The value may be `NaN` or infinite when a modifier hits a domain
/// error; callers decide whether to accept it.
pub fn evaluate(
    message: &MessageValue,
    path: &ParsedPath,
    context: &EvaluationContext,
    timestamp_ms: i64,
) -> Option<Evaluation> {
    let leaf = resolve_field(message, &path.field_path)?;
    let raw = coerce_numeric(leaf)?;
    Some(apply_modifiers(raw, path, context, timestamp_ms))
}

/// Run the modifier chain of `path` over an already-extracted value
pub fn apply_modifiers(
    raw: f64,
    path: &ParsedPath,
    context: &EvaluationContext,
    timestamp_ms: i64,
) -> Evaluation {
    let mut stateful_inputs = Vec::new();
    let value = path.modifiers.iter().fold(raw, |value, modifier| {
        if modifier.is_stateful() {
            let previous = context.previous_input(stateful_inputs.len());
            stateful_inputs.push(value);
            modifier.apply(value, timestamp_ms, previous)
        } else {
            modifier.apply(value, timestamp_ms, None)
        }
    });

    Evaluation {
        value,
        timestamp_ms,
        stateful_inputs,
    }
}
