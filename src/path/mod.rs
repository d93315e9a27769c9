//! Message-path expressions
//!
//! A message path selects a topic, an optional nested field and a chain of
//! modifiers:
//!
//! ```text
//! <topic>[.<field>[.<field>...]][.@<modifier>[(<operand>)]][.@<modifier>...]
//! ```
//!
//! For example `/odom.twist.linear.x.@abs.@mul(3.6)` reads
//! `twist.linear.x` from messages on `/odom`, takes the absolute value and
//! scales it by 3.6.
//!
//! Parsing is lenient. Unknown modifiers and arithmetic modifiers without a
//! valid finite operand are dropped; the rest of the expression still
//! parses. Modifier tokens never leak into the field path.

pub mod modifier;

pub use modifier::{ArithmeticOp, Modifier, SimpleOp};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of parsing a message-path expression
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedPath {
    /// Topic name (empty only for an empty expression)
    pub topic: String,
    /// Dotted field path; empty means the whole message body
    pub field_path: String,
    /// Modifiers in textual order
    pub modifiers: Vec<Modifier>,
}

impl ParsedPath {
    /// Check if the expression selected no topic
    pub fn is_empty(&self) -> bool {
        self.topic.is_empty()
    }

    /// Returns true if any modifier needs the previous sample
    pub fn has_stateful_modifiers(&self) -> bool {
        self.modifiers.iter().any(Modifier::is_stateful)
    }
}

impl fmt::Display for ParsedPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.topic)?;
        if !self.field_path.is_empty() {
            write!(f, ".{}", self.field_path)?;
        }
        for modifier in &self.modifiers {
            write!(f, ".@{}", modifier)?;
        }
        Ok(())
    }
}

/// Parse a message-path expression into topic, field path and modifiers.
///
/// Never fails. Empty or whitespace-only input (or an expression whose
/// topic is empty, such as `.x`) yields an empty [`ParsedPath`].
pub fn parse_message_path(expression: &str) -> ParsedPath {
    let trimmed = expression.trim();

    let (topic, rest) = match trimmed.split_once('.') {
        Some((topic, rest)) => (topic, rest),
        None => (trimmed, ""),
    };
    if topic.is_empty() {
        return ParsedPath::default();
    }

    let mut fields = Vec::new();
    let mut modifiers = Vec::new();

    for segment in split_segments(rest) {
        if let Some(token) = segment.strip_prefix('@') {
            match parse_modifier(token) {
                Some(modifier) => modifiers.push(modifier),
                None => {
                    tracing::debug!("Dropping modifier '@{}' in path '{}'", token, trimmed);
                }
            }
        } else if !segment.is_empty() {
            fields.push(segment);
        }
    }

    ParsedPath {
        topic: topic.to_string(),
        field_path: fields.join("."),
        modifiers,
    }
}

/// Split on `.` outside parentheses so `@mul(2.5)` stays one segment
fn split_segments(rest: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;

    for (idx, ch) in rest.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            '.' if depth == 0 => {
                segments.push(&rest[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    segments.push(&rest[start..]);
    segments
}

/// Parse the text after `@`, e.g. `abs` or `mul(2.5)`
fn parse_modifier(token: &str) -> Option<Modifier> {
    let (name, argument) = match token.find('(') {
        Some(open) => {
            let inner = token[open + 1..].strip_suffix(')')?;
            (&token[..open], Some(inner.trim()))
        }
        None => (token, None),
    };

    if let Some(op) = SimpleOp::from_name(name) {
        return match argument {
            None | Some("") => Some(Modifier::Simple(op)),
            Some(_) => None,
        };
    }

    let op = ArithmeticOp::from_name(name)?;
    let operand = parse_operand(argument?)?;
    Some(Modifier::Parameterized(op, operand))
}

fn parse_operand(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|v| v.is_finite())
}
