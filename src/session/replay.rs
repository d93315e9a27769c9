//! Recorded message logs
//!
//! A log is a JSON Lines file with one [`MessageEvent`] per line:
//!
//! ```text
//! {"topic":"/odom","receive_time":{"sec":12,"nsec":500000000},"message":{"twist":{"linear":{"x":1.2}}}}
//! ```
//!
//! Blank lines are skipped. [`group_into_frames`] chops the event stream
//! into the batches a host would deliver per render frame.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{GaugeError, Result, ResultExt};

use super::types::MessageEvent;

/// Streaming reader over a JSON Lines message log
#[derive(Debug)]
pub struct ReplayReader<R> {
    reader: R,
    line_number: usize,
    buf: String,
}

impl ReplayReader<BufReader<File>> {
    /// Open a log file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(GaugeError::from)
            .with_context(|| format!("Failed to open message log {:?}", path))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ReplayReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            buf: String::new(),
        }
    }
}

impl<R: BufRead> Iterator for ReplayReader<R> {
    type Item = Result<MessageEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(GaugeError::Io(e))),
            }
            self.line_number += 1;

            let line = self.buf.trim();
            if line.is_empty() {
                continue;
            }

            return Some(serde_json::from_str(line).map_err(|e| GaugeError::Replay {
                line: self.line_number,
                message: e.to_string(),
            }));
        }
    }
}

/// Group events into frames of at most `frame_ms` milliseconds.
///
/// A frame starts at its first event; later events join it while their
/// receive time is within `frame_ms` of that start. A timestamp going
/// backwards always starts a new frame.
pub fn group_into_frames(events: Vec<MessageEvent>, frame_ms: i64) -> Vec<Vec<MessageEvent>> {
    let mut frames: Vec<Vec<MessageEvent>> = Vec::new();
    let mut frame_start: Option<i64> = None;
    let mut last_ts: Option<i64> = None;

    for event in events {
        let ts = event.timestamp_ms();
        let fits = match (frame_start, last_ts) {
            (Some(start), Some(last)) => ts >= last && ts - start < frame_ms.max(1),
            _ => false,
        };

        if fits {
            if let Some(frame) = frames.last_mut() {
                frame.push(event);
            }
        } else {
            frame_start = Some(ts);
            frames.push(vec![event]);
        }
        last_ts = Some(ts);
    }

    frames
}
