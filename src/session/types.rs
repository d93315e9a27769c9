//! Session data types

use serde::{Deserialize, Serialize};

use crate::types::MessageValue;

/// Default trailing window in milliseconds
pub const DEFAULT_WINDOW_MS: i64 = 10_000;

/// Nanoseconds per second; `nsec` must stay below this
pub const NANOS_PER_SEC: u32 = 1_000_000_000;

/// Receive time split into seconds and nanoseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawReceiveTime")]
pub struct ReceiveTime {
    pub sec: i64,
    pub nsec: u32,
}

/// Receive time as written in a log, before validation
#[derive(Deserialize)]
struct RawReceiveTime {
    sec: i64,
    nsec: u32,
}

impl TryFrom<RawReceiveTime> for ReceiveTime {
    type Error = String;

    fn try_from(raw: RawReceiveTime) -> Result<Self, Self::Error> {
        if raw.nsec >= NANOS_PER_SEC {
            return Err(format!("nsec {} is not below {}", raw.nsec, NANOS_PER_SEC));
        }
        Ok(Self::new(raw.sec, raw.nsec))
    }
}

impl ReceiveTime {
    pub fn new(sec: i64, nsec: u32) -> Self {
        Self { sec, nsec }
    }

    /// Build from milliseconds
    pub fn from_millis(ms: i64) -> Self {
        Self {
            sec: ms.div_euclid(1000),
            nsec: (ms.rem_euclid(1000) * 1_000_000) as u32,
        }
    }

    /// Whole milliseconds, truncating sub-millisecond precision.
    /// Saturates at the `i64` bounds.
    pub fn as_millis(&self) -> i64 {
        self.sec
            .saturating_mul(1000)
            .saturating_add(i64::from(self.nsec / 1_000_000))
    }
}

/// A message delivered on a topic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEvent {
    /// Topic the message arrived on
    pub topic: String,
    /// When the message was received
    pub receive_time: ReceiveTime,
    /// Opaque message body
    pub message: MessageValue,
}

impl MessageEvent {
    pub fn new(topic: impl Into<String>, receive_time_ms: i64, message: MessageValue) -> Self {
        Self {
            topic: topic.into(),
            receive_time: ReceiveTime::from_millis(receive_time_ms),
            message,
        }
    }

    /// Receive time in milliseconds
    pub fn timestamp_ms(&self) -> i64 {
        self.receive_time.as_millis()
    }
}

/// Which messages of a batch a session evaluates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BatchPolicy {
    /// Every message of the topic, in arrival order
    #[default]
    EveryMessage,
    /// Only the newest message of the topic per batch.
    /// Paths with `delta`/`derivative` always use `EveryMessage`.
    LatestOnly,
}

/// Tunables of a session that can change without rebuilding it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Trailing window length in milliseconds
    pub window_ms: i64,
    /// Low-pass coefficient in [0, 1]; 0 disables smoothing
    pub filter_alpha: f64,
    pub batch_policy: BatchPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            filter_alpha: 0.0,
            batch_policy: BatchPolicy::EveryMessage,
        }
    }
}

impl SessionSettings {
    /// Set the window length in seconds
    pub fn with_window_secs(mut self, secs: f64) -> Self {
        self.window_ms = (secs * 1000.0).round() as i64;
        self
    }

    /// Set the low-pass coefficient
    pub fn with_filter_alpha(mut self, alpha: f64) -> Self {
        self.filter_alpha = alpha;
        self
    }

    /// Set the batch policy
    pub fn with_batch_policy(mut self, policy: BatchPolicy) -> Self {
        self.batch_policy = policy;
        self
    }
}

/// Counters describing what a session did with its input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Messages on the session topic that were looked at
    pub messages_seen: u64,
    /// Messages that produced a stored sample
    pub samples_accepted: u64,
    /// Messages where the field was missing or not numeric
    pub unresolved: u64,
    /// Messages whose evaluated value was NaN or infinite
    pub non_finite: u64,
    /// Discontinuity resets of the window buffer
    pub resets: u64,
}

impl SessionStats {
    /// Share of seen messages that produced a sample, as a percentage
    pub fn acceptance_rate(&self) -> f64 {
        if self.messages_seen == 0 {
            100.0
        } else {
            (self.samples_accepted as f64 / self.messages_seen as f64) * 100.0
        }
    }
}
