//! # gauge-trace: message-path signals for live gauges
//!
//! Extracts a single numeric signal from a stream of arbitrarily structured,
//! timestamped messages, runs it through a chain of modifiers and keeps a
//! time-windowed buffer of the results for real-time plotting.
//!
//! ## Architecture
//!
//! - **Path**: parses expressions such as `/odom.twist.linear.x.@abs.@mul(3.6)`
//!   into topic, field path and modifier chain
//! - **Eval**: resolves the field inside a message and applies the modifiers,
//!   comparing `delta` and `derivative` against their previous input
//! - **Window**: trailing-window buffer with discontinuity resets, low-pass
//!   smoothing, eviction, auto-scaling and gap-aware trace vertices
//! - **Session**: the per-expression pipeline tying the three together,
//!   plus a reader for recorded message logs
//! - **Config**: the persisted panel configuration
//!
//! Rendering, topic subscription and the settings UI belong to the host.
//!
//! ## Example
//!
//! ```ignore
//! use gauge_trace::{MessageEvent, SessionSettings, SignalSession};
//! use serde_json::json;
//!
//! let mut session = SignalSession::new("/odom.speed.@abs", SessionSettings::default());
//! session.process_batch(&[MessageEvent::new("/odom", 1_000, json!({"speed": -2.0}))]);
//! let snapshot = session.snapshot();
//! assert_eq!(snapshot.current_value, 2.0);
//! ```

pub mod config;
pub mod error;
pub mod eval;
pub mod path;
pub mod session;
pub mod types;
pub mod window;

// Re-export commonly used types
pub use config::PanelConfig;
pub use error::{GaugeError, Result};
pub use eval::{evaluate, Evaluation, EvaluationContext};
pub use path::{parse_message_path, Modifier, ParsedPath};
pub use session::{BatchPolicy, MessageEvent, SessionSettings, SignalSession};
pub use types::{MessageValue, Sample, TracePoint, TraceSnapshot, ValueRange};
pub use window::TimeWindowBuffer;
