//! Configuration system tests
//!
//! Tests for config paths and editor config loading.

use plotedit::config::EditorConfig;
use plotedit::config_paths;

// ========================================================================
// Config Paths Tests
// ========================================================================

#[test]
fn test_config_dir_returns_some() {
    assert!(config_paths::config_dir().is_some());
}

#[test]
fn test_config_dir_contains_app_name() {
    let dir = config_paths::config_dir().unwrap();
    assert!(dir.to_string_lossy().contains("plotedit"));
}

#[test]
fn test_config_file_ends_with_yaml() {
    let path = config_paths::config_file().unwrap();
    assert!(path.to_string_lossy().ends_with("config.yaml"));
}

#[test]
fn test_logs_and_dumps_are_subdirs_of_config() {
    let config = config_paths::config_dir().unwrap();
    assert!(config_paths::logs_dir().unwrap().starts_with(&config));
    assert!(config_paths::dumps_dir().unwrap().starts_with(&config));
}

#[test]
fn test_latest_log_picks_newest_daily_file() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(
        config_paths::latest_log_in(dir.path()),
        dir.path().join(config_paths::LOG_FILE_PREFIX)
    );

    for name in ["plotedit.log.2026-01-06", "plotedit.log.2026-01-07", "other.txt"] {
        std::fs::write(dir.path().join(name), "").unwrap();
    }
    assert_eq!(
        config_paths::latest_log_in(dir.path()),
        dir.path().join("plotedit.log.2026-01-07")
    );
}

#[test]
fn test_log_file_lives_in_logs_dir() {
    let logs = config_paths::logs_dir().unwrap();
    assert!(config_paths::log_file().unwrap().starts_with(&logs));
}

// ========================================================================
// Editor Config Tests
// ========================================================================

#[test]
fn test_default_config() {
    let config = EditorConfig::default();
    assert_eq!(config.snap_threshold_px, 10.0);
    assert_eq!(config.active_threshold_px, 1.0);
    assert_eq!(config.dpi, 100.0);
    assert!(config.snapping);
}

#[test]
fn test_empty_yaml_gives_defaults() {
    let config = EditorConfig::from_yaml("{}").unwrap();
    assert_eq!(config, EditorConfig::default());
}

#[test]
fn test_config_serialize_deserialize() {
    let config = EditorConfig {
        snap_threshold_px: 4.0,
        dpi: 150.0,
        history_limit: 20,
        snapping: false,
        ..Default::default()
    };

    let yaml = config.to_yaml().unwrap();
    assert!(yaml.contains("snap_threshold_px: 4.0"));
    let parsed = EditorConfig::from_yaml(&yaml).unwrap();
    assert_eq!(parsed, config);
}

#[test]
fn test_invalid_yaml_is_an_error() {
    assert!(EditorConfig::from_yaml("dpi: [not, a, number]").is_err());
}
