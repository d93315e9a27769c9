//! Panel settings persisted by the host
//!
//! Field names follow the host's saved panel state (camelCase keys), so a
//! saved panel state can be loaded directly.
//!
//! # Main Types
//!
//! - [`DataSettings`] - Path expression, window, filter and styling
//! - [`ViewSettings`] - Which display component renders the signal
//!
//! # Bounds
//!
//! The window length is kept within [`MIN_TIME_WINDOW_SECS`] and
//! [`MAX_TIME_WINDOW_SECS`], the filter coefficient within [0, 1] and the
//! line width within [`MIN_LINE_WIDTH`] and [`MAX_LINE_WIDTH`].

use serde::{Deserialize, Serialize};

/// Default trailing window in seconds
pub const DEFAULT_TIME_WINDOW_SECS: f64 = 10.0;

/// Smallest accepted window in seconds
pub const MIN_TIME_WINDOW_SECS: f64 = 1.0;

/// Largest accepted window in seconds
pub const MAX_TIME_WINDOW_SECS: f64 = 300.0;

pub const DEFAULT_LINE_WIDTH: f64 = 2.0;
pub const MIN_LINE_WIDTH: f64 = 1.0;
pub const MAX_LINE_WIDTH: f64 = 10.0;

pub const DEFAULT_LINE_COLOR: &str = "#0066cc";

pub const DEFAULT_GAUGE_MIN: f64 = 0.0;
pub const DEFAULT_GAUGE_MAX: f64 = 120.0;

/// Where the chart shows the current value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueDisplayMode {
    /// Next to the newest point of the trace
    #[default]
    Dynamic,
    /// Large, centered in the panel
    Center,
}

/// Display component rendering the signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DisplayComponent {
    #[default]
    Speedometer,
    SteeringWheel,
    TimeSeriesChart,
}

impl DisplayComponent {
    /// Get display name for this component
    pub fn display_name(&self) -> &'static str {
        match self {
            DisplayComponent::Speedometer => "Speedometer",
            DisplayComponent::SteeringWheel => "Steering Wheel",
            DisplayComponent::TimeSeriesChart => "Time Series Chart",
        }
    }

    /// Returns true if this component draws a time-windowed trace
    pub fn uses_window(&self) -> bool {
        matches!(self, DisplayComponent::TimeSeriesChart)
    }
}

/// Data source and trace settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSettings {
    /// Path expression selecting topic, field and modifiers
    /// `None` when the saved state has no `messagePath` key at all
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_path: Option<String>,

    /// Lower bound of the speedometer scale
    #[serde(default = "default_gauge_min")]
    pub min: f64,

    /// Upper bound of the speedometer scale
    #[serde(default = "default_gauge_max")]
    pub max: f64,

    /// Trailing window in seconds
    #[serde(default = "default_time_window")]
    pub time_window: f64,

    #[serde(default = "default_true")]
    pub show_grid: bool,

    #[serde(default)]
    pub value_display_mode: ValueDisplayMode,

    /// Show the numeric angle on the steering wheel
    #[serde(default)]
    pub show_angle: bool,

    #[serde(default = "default_line_color")]
    pub line_color: String,

    #[serde(default = "default_line_width")]
    pub line_width: f64,

    /// Low-pass coefficient, 0 disables smoothing
    #[serde(default)]
    pub alpha: f64,

    /// Older saved states stored the topic separately
    #[serde(default, rename = "topic", skip_serializing)]
    pub legacy_topic: Option<String>,

    /// Older saved states stored the field path separately
    #[serde(default, rename = "fieldPath", skip_serializing)]
    pub legacy_field_path: Option<String>,
}

fn default_true() -> bool {
    true
}

fn default_gauge_min() -> f64 {
    DEFAULT_GAUGE_MIN
}

fn default_gauge_max() -> f64 {
    DEFAULT_GAUGE_MAX
}

fn default_time_window() -> f64 {
    DEFAULT_TIME_WINDOW_SECS
}

fn default_line_color() -> String {
    DEFAULT_LINE_COLOR.to_string()
}

fn default_line_width() -> f64 {
    DEFAULT_LINE_WIDTH
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            message_path: None,
            min: DEFAULT_GAUGE_MIN,
            max: DEFAULT_GAUGE_MAX,
            time_window: DEFAULT_TIME_WINDOW_SECS,
            show_grid: true,
            value_display_mode: ValueDisplayMode::Dynamic,
            show_angle: false,
            line_color: DEFAULT_LINE_COLOR.to_string(),
            line_width: DEFAULT_LINE_WIDTH,
            alpha: 0.0,
            legacy_topic: None,
            legacy_field_path: None,
        }
    }
}

impl DataSettings {
    /// The path expression, empty if none is set
    pub fn message_path(&self) -> &str {
        self.message_path.as_deref().unwrap_or_default()
    }

    pub fn set_message_path(&mut self, expression: impl Into<String>) {
        self.message_path = Some(expression.into());
    }

    /// Fold the legacy topic/field pair into `message_path`.
    ///
    /// Only applies when the saved state has no `messagePath` key and a
    /// non-empty legacy topic exists; an explicitly empty path stays empty.
    /// Returns true if the path was migrated.
    pub fn migrate_legacy(&mut self) -> bool {
        let topic = self.legacy_topic.take().unwrap_or_default();
        let field_path = self.legacy_field_path.take().unwrap_or_default();

        if self.message_path.is_some() || topic.is_empty() {
            return false;
        }

        self.message_path = Some(if field_path.is_empty() {
            topic
        } else {
            format!("{}.{}", topic, field_path)
        });
        true
    }

    /// Clamp numeric settings into their accepted ranges
    pub fn normalize(&mut self) {
        self.time_window = clamp_or(
            self.time_window,
            MIN_TIME_WINDOW_SECS,
            MAX_TIME_WINDOW_SECS,
            DEFAULT_TIME_WINDOW_SECS,
        );
        self.alpha = clamp_or(self.alpha, 0.0, 1.0, 0.0);
        self.line_width = clamp_or(
            self.line_width,
            MIN_LINE_WIDTH,
            MAX_LINE_WIDTH,
            DEFAULT_LINE_WIDTH,
        );
        if !self.min.is_finite() {
            self.min = DEFAULT_GAUGE_MIN;
        }
        if !self.max.is_finite() {
            self.max = DEFAULT_GAUGE_MAX;
        }
    }

    /// Window length in milliseconds
    pub fn time_window_ms(&self) -> i64 {
        (self.time_window * 1000.0).round() as i64
    }
}

fn clamp_or(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Display settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSettings {
    #[serde(default)]
    pub component: DisplayComponent,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let data = DataSettings::default();
        assert_eq!(data.time_window, 10.0);
        assert_eq!(data.max, 120.0);
        assert_eq!(data.line_color, "#0066cc");
        assert_eq!(data.time_window_ms(), 10_000);
    }

    #[test]
    fn test_normalize_clamps() {
        let mut data = DataSettings {
            time_window: 1000.0,
            alpha: 1.7,
            line_width: 0.1,
            min: f64::NAN,
            ..Default::default()
        };
        data.normalize();
        assert_eq!(data.time_window, MAX_TIME_WINDOW_SECS);
        assert_eq!(data.alpha, 1.0);
        assert_eq!(data.line_width, MIN_LINE_WIDTH);
        assert_eq!(data.min, DEFAULT_GAUGE_MIN);

        data.time_window = f64::INFINITY;
        data.alpha = -0.5;
        data.normalize();
        assert_eq!(data.time_window, DEFAULT_TIME_WINDOW_SECS);
        assert_eq!(data.alpha, 0.0);
    }

    #[test]
    fn test_migrate_legacy_topic_and_field() {
        let mut data: DataSettings =
            serde_json::from_str(r#"{"topic":"/odom","fieldPath":"twist.linear.x"}"#).unwrap();
        assert!(data.migrate_legacy());
        assert_eq!(data.message_path(), "/odom.twist.linear.x");
        assert_eq!(data.legacy_topic, None);
    }

    #[test]
    fn test_migrate_legacy_topic_only() {
        let mut data: DataSettings = serde_json::from_str(r#"{"topic":"/speed"}"#).unwrap();
        assert!(data.migrate_legacy());
        assert_eq!(data.message_path(), "/speed");
    }

    #[test]
    fn test_message_path_wins_over_legacy() {
        let mut data: DataSettings =
            serde_json::from_str(r#"{"messagePath":"/a.v","topic":"/b"}"#).unwrap();
        assert!(!data.migrate_legacy());
        assert_eq!(data.message_path(), "/a.v");
    }

    #[test]
    fn test_explicit_empty_path_is_not_migrated() {
        let mut data: DataSettings =
            serde_json::from_str(r#"{"messagePath":"","topic":"/b","fieldPath":"x"}"#).unwrap();
        assert!(!data.migrate_legacy());
        assert_eq!(data.message_path, Some(String::new()));
        assert_eq!(data.message_path(), "");
        assert_eq!(data.legacy_topic, None);
    }

    #[test]
    fn test_unset_path_is_not_serialized() {
        let json = serde_json::to_string(&DataSettings::default()).unwrap();
        assert!(!json.contains("messagePath"));
        assert_eq!(DataSettings::default().message_path(), "");
    }

    #[test]
    fn test_camel_case_keys() {
        let data: DataSettings = serde_json::from_str(
            r#"{"messagePath":"/a.v","timeWindow":30,"valueDisplayMode":"center","lineWidth":3.5}"#,
        )
        .unwrap();
        assert_eq!(data.time_window, 30.0);
        assert_eq!(data.value_display_mode, ValueDisplayMode::Center);
        assert_eq!(data.line_width, 3.5);

        let json = serde_json::to_string(&data).unwrap();
        assert!(json.contains("\"timeWindow\":30.0"));
        assert!(!json.contains("fieldPath"));
    }

    #[test]
    fn test_component_names() {
        let view: ViewSettings = serde_json::from_str(r#"{"component":"timeSeriesChart"}"#).unwrap();
        assert_eq!(view.component, DisplayComponent::TimeSeriesChart);
        assert!(view.component.uses_window());
        assert!(!DisplayComponent::Speedometer.uses_window());
        assert_eq!(DisplayComponent::SteeringWheel.display_name(), "Steering Wheel");
    }
}
