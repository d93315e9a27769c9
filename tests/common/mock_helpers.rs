//! Synthetic message streams and on-disk logs

use std::io::Write;

use gauge_trace::MessageEvent;
use serde_json::json;
use tempfile::NamedTempFile;

/// `count` messages on `topic` carrying `{"value": f(t)}`, `step_ms` apart
pub fn value_stream(
    topic: &str,
    start_ms: i64,
    step_ms: i64,
    count: usize,
    f: impl Fn(i64) -> f64,
) -> Vec<MessageEvent> {
    (0..count as i64)
        .map(|i| {
            let t = start_ms + i * step_ms;
            MessageEvent::new(topic, t, json!({ "value": f(t) }))
        })
        .collect()
}

/// A sine wave of the given frequency and amplitude
pub fn sine_stream(topic: &str, start_ms: i64, step_ms: i64, count: usize) -> Vec<MessageEvent> {
    value_stream(topic, start_ms, step_ms, count, |t| {
        100.0 * (2.0 * std::f64::consts::PI * t as f64 / 1000.0).sin()
    })
}

/// Write events as a JSON Lines log to a temporary file
pub fn write_log(events: &[MessageEvent]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp log");
    for event in events {
        let line = serde_json::to_string(event).expect("serialize event");
        writeln!(file, "{}", line).expect("write event");
    }
    file.flush().expect("flush log");
    file
}
