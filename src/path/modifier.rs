//! Modifier operations applied to an extracted value
//!
//! Simple modifiers take no operand. Most are plain real functions; `delta`
//! and `derivative` need the previous sample on the same path. Arithmetic
//! modifiers carry a finite operand.

use crate::types::Sample;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Operand-free modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimpleOp {
    Abs,
    Acos,
    Asin,
    Atan,
    Ceil,
    Cos,
    /// Natural logarithm
    Log,
    Log1p,
    Log2,
    Log10,
    Negative,
    Round,
    Sign,
    Sin,
    Sqrt,
    Tan,
    Trunc,
    /// Difference to the previous sample's value
    Delta,
    /// Rate of change per second against the previous sample
    Derivative,
}

impl SimpleOp {
    /// Get all simple modifiers
    pub fn all() -> &'static [SimpleOp] {
        &[
            SimpleOp::Abs,
            SimpleOp::Acos,
            SimpleOp::Asin,
            SimpleOp::Atan,
            SimpleOp::Ceil,
            SimpleOp::Cos,
            SimpleOp::Log,
            SimpleOp::Log1p,
            SimpleOp::Log2,
            SimpleOp::Log10,
            SimpleOp::Negative,
            SimpleOp::Round,
            SimpleOp::Sign,
            SimpleOp::Sin,
            SimpleOp::Sqrt,
            SimpleOp::Tan,
            SimpleOp::Trunc,
            SimpleOp::Delta,
            SimpleOp::Derivative,
        ]
    }

    /// Name as written after `@` in a path expression
    pub fn name(&self) -> &'static str {
        match self {
            SimpleOp::Abs => "abs",
            SimpleOp::Acos => "acos",
            SimpleOp::Asin => "asin",
            SimpleOp::Atan => "atan",
            SimpleOp::Ceil => "ceil",
            SimpleOp::Cos => "cos",
            SimpleOp::Log => "log",
            SimpleOp::Log1p => "log1p",
            SimpleOp::Log2 => "log2",
            SimpleOp::Log10 => "log10",
            SimpleOp::Negative => "negative",
            SimpleOp::Round => "round",
            SimpleOp::Sign => "sign",
            SimpleOp::Sin => "sin",
            SimpleOp::Sqrt => "sqrt",
            SimpleOp::Tan => "tan",
            SimpleOp::Trunc => "trunc",
            SimpleOp::Delta => "delta",
            SimpleOp::Derivative => "derivative",
        }
    }

    /// Look up a modifier by its expression name
    pub fn from_name(name: &str) -> Option<SimpleOp> {
        SimpleOp::all().iter().copied().find(|op| op.name() == name)
    }

    /// Returns true if this modifier depends on the previous sample
    pub fn is_stateful(&self) -> bool {
        matches!(self, SimpleOp::Delta | SimpleOp::Derivative)
    }
}

/// Modifiers that take a numeric operand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithmeticOp {
    pub fn name(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Sub => "sub",
            ArithmeticOp::Mul => "mul",
            ArithmeticOp::Div => "div",
        }
    }

    pub fn from_name(name: &str) -> Option<ArithmeticOp> {
        match name {
            "add" => Some(ArithmeticOp::Add),
            "sub" => Some(ArithmeticOp::Sub),
            "mul" => Some(ArithmeticOp::Mul),
            "div" => Some(ArithmeticOp::Div),
            _ => None,
        }
    }
}

/// A single transform in a path expression's modifier chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Modifier {
    Simple(SimpleOp),
    /// The operand is always finite
    Parameterized(ArithmeticOp, f64),
}

impl Modifier {
    /// Returns true if this modifier depends on the previous sample
    pub fn is_stateful(&self) -> bool {
        match self {
            Modifier::Simple(op) => op.is_stateful(),
            Modifier::Parameterized(..) => false,
        }
    }

    /// Apply this modifier to `value`.
    ///
    /// `timestamp_ms` is the receive time of the message being evaluated and
    /// `previous` the last committed sample on the same path. Domain errors
    /// come out as `NaN`; a zero divisor, a missing previous sample or a
    /// non-positive elapsed time leave the value unchanged.
    pub fn apply(&self, value: f64, timestamp_ms: i64, previous: Option<&Sample>) -> f64 {
        match *self {
            Modifier::Simple(op) => match op {
                SimpleOp::Abs => value.abs(),
                SimpleOp::Acos => value.acos(),
                SimpleOp::Asin => value.asin(),
                SimpleOp::Atan => value.atan(),
                SimpleOp::Ceil => value.ceil(),
                SimpleOp::Cos => value.cos(),
                SimpleOp::Log => value.ln(),
                SimpleOp::Log1p => value.ln_1p(),
                SimpleOp::Log2 => value.log2(),
                SimpleOp::Log10 => value.log10(),
                SimpleOp::Negative => -value,
                SimpleOp::Round => value.round(),
                SimpleOp::Sign => sign(value),
                SimpleOp::Sin => value.sin(),
                SimpleOp::Sqrt => value.sqrt(),
                SimpleOp::Tan => value.tan(),
                SimpleOp::Trunc => value.trunc(),
                SimpleOp::Delta => match previous {
                    Some(prev) => value - prev.value,
                    None => value,
                },
                SimpleOp::Derivative => match previous {
                    Some(prev) => {
                        let elapsed_secs = timestamp_ms.saturating_sub(prev.timestamp_ms) as f64 / 1000.0;
                        if elapsed_secs > 0.0 {
                            (value - prev.value) / elapsed_secs
                        } else {
                            value
                        }
                    }
                    None => value,
                },
            },
            Modifier::Parameterized(op, operand) => match op {
                ArithmeticOp::Add => value + operand,
                ArithmeticOp::Sub => value - operand,
                ArithmeticOp::Mul => value * operand,
                ArithmeticOp::Div => {
                    if operand == 0.0 {
                        value
                    } else {
                        value / operand
                    }
                }
            },
        }
    }
}

/// -1, 0 or 1; zero (either sign) and NaN pass through.
/// `f64::signum` maps +0.0 to 1.0, which is not what a gauge wants.
fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        value
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Modifier::Simple(op) => write!(f, "{}", op.name()),
            Modifier::Parameterized(op, operand) => write!(f, "{}({})", op.name(), operand),
        }
    }
}
