//! Integration tests for panel config persistence

use gauge_trace::config::{DisplayComponent, PanelConfig, ValueDisplayMode};
use gauge_trace::SignalSession;
use tempfile::tempdir;

#[test]
fn test_json_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("panel.json");

    let mut config = PanelConfig::new("/odom.twist.linear.x.@abs");
    config.data.time_window = 30.0;
    config.data.value_display_mode = ValueDisplayMode::Center;
    config.view.component = DisplayComponent::TimeSeriesChart;
    config.save(&path).unwrap();

    let loaded = PanelConfig::load(&path).unwrap();
    assert_eq!(loaded, config);

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"messagePath\""));
    assert!(text.contains("\"timeSeriesChart\""));
}

#[test]
fn test_toml_save_and_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("panel.toml");

    let mut config = PanelConfig::new("/steering.angle");
    config.data.alpha = 0.2;
    config.view.component = DisplayComponent::SteeringWheel;
    config.save(&path).unwrap();

    let loaded = PanelConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_legacy_saved_state_feeds_session() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("legacy.json");
    std::fs::write(
        &path,
        r#"{"data": {"topic": "/odom", "fieldPath": "pose.x", "timeWindow": 5, "alpha": 3}}"#,
    )
    .unwrap();

    let config = PanelConfig::load(&path).unwrap();
    assert_eq!(config.data.message_path(), "/odom.pose.x");
    assert_eq!(config.data.alpha, 1.0);

    let session = SignalSession::new(config.data.message_path(), config.session_settings());
    assert_eq!(session.topic(), "/odom");
    assert_eq!(session.path().field_path, "pose.x");
    assert_eq!(session.settings().window_ms, 5_000);
}

#[test]
fn test_load_missing_and_corrupt_files() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.json");
    assert!(PanelConfig::load(&missing).is_err());
    assert_eq!(PanelConfig::load_or_default(&missing), PanelConfig::default());

    let corrupt = dir.path().join("corrupt.json");
    std::fs::write(&corrupt, "{\"data\": ").unwrap();
    let err = PanelConfig::load(&corrupt).unwrap_err();
    assert!(err.to_string().contains("corrupt.json"));
}

#[test]
fn test_saved_empty_path_ignores_legacy_topic() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("cleared.json");
    std::fs::write(
        &path,
        r#"{"data": {"messagePath": "", "topic": "/odom", "fieldPath": "pose.x"}}"#,
    )
    .unwrap();

    let config = PanelConfig::load(&path).unwrap();
    assert_eq!(config.data.message_path(), "");

    // Saving drops the legacy keys and keeps the empty path
    config.save(&path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("\"messagePath\": \"\""));
    assert!(!text.contains("/odom"));
}
