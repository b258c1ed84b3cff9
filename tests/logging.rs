//! Logging setup tests
//!
//! Kept in their own test binary: they point the config directory at a temp
//! dir through the environment and install the global subscriber.

#[cfg(not(target_os = "windows"))]
#[test]
fn test_init_creates_log_dir_under_config_home() {
    use plotedit::config_paths;

    let home = tempfile::tempdir().unwrap();
    std::env::set_var("XDG_CONFIG_HOME", home.path());

    plotedit::tracing::init();
    // A second call keeps the first subscriber
    plotedit::tracing::init();

    let logs = home.path().join("plotedit").join("logs");
    assert!(logs.is_dir());
    assert_eq!(config_paths::logs_dir().unwrap(), logs);
    assert!(config_paths::log_file().unwrap().starts_with(&logs));
}
