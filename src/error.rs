//! Error handling for gauge-trace
//!
//! The signal core (parsing, evaluation, buffering) never fails: bad input
//! simply produces no update. Errors only arise at the edges of the crate,
//! when loading configuration files or reading recorded message logs.

use thiserror::Error;

/// Main error type for gauge-trace operations
#[derive(Error, Debug)]
pub enum GaugeError {
    /// Errors related to configuration loading/saving
    #[error("Configuration error: {0}")]
    Config(String),

    /// A malformed line in a recorded message log
    #[error("Replay error on line {line}: {message}")]
    Replay { line: usize, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A config could not be written out in the requested format
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Another error with a description of what was being attempted
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<GaugeError>,
    },
}

impl GaugeError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        GaugeError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Result type alias for gauge-trace operations
pub type Result<T> = std::result::Result<T, GaugeError>;

/// Attach context to a failed [`Result`]
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}
