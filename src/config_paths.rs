//! Centralized configuration paths for plotedit
//!
//! All config files live under:
//! - Unix/macOS: `~/.config/plotedit/`
//! - Windows: `%APPDATA%\plotedit\`

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::Context;

const APP_DIR: &str = "plotedit";

/// File name of the YAML config inside [`config_dir`]
pub const CONFIG_FILE: &str = "config.yaml";

/// Prefix of the daily-rotated log files
pub const LOG_FILE_PREFIX: &str = "plotedit.log";

/// Base config directory for plotedit
///
/// Unix/macOS:
///   - If XDG_CONFIG_HOME is set: `$XDG_CONFIG_HOME/plotedit`
///   - Else: `~/.config/plotedit`
///
/// Windows:
///   - `%APPDATA%\plotedit`
pub fn config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .ok()
            .map(|appdata| PathBuf::from(appdata).join(APP_DIR))
    }

    #[cfg(not(target_os = "windows"))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .map(|config| config.join(APP_DIR))
    }
}

/// `~/.config/plotedit/config.yaml`
pub fn config_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// `~/.config/plotedit/logs/`
pub fn logs_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("logs"))
}

/// `~/.config/plotedit/dumps/`
pub fn dumps_dir() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("dumps"))
}

/// Most recent log file in `~/.config/plotedit/logs/`
/// (e.g., `plotedit.log.2026-01-07`)
pub fn log_file() -> Option<PathBuf> {
    logs_dir().map(|dir| latest_log_in(&dir))
}

/// Newest daily log in `logs_dir`, or the undated name when none was written yet
pub fn latest_log_in(logs_dir: &Path) -> PathBuf {
    let mut log_files: Vec<PathBuf> = fs::read_dir(logs_dir)
        .into_iter()
        .flatten()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX))
        })
        .collect();

    // YYYY-MM-DD suffixes sort naturally, newest first
    log_files.sort_by(|a, b| b.cmp(a));

    log_files
        .into_iter()
        .next()
        .unwrap_or_else(|| logs_dir.join(LOG_FILE_PREFIX))
}

fn ensure_dir(path: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory {}", path.display()))
}

/// Ensure the base config dir exists, returning it
pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
    let dir = config_dir().context("No config directory available")?;
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Ensure logs dir exists, returning it
pub fn ensure_logs_dir() -> anyhow::Result<PathBuf> {
    let logs = ensure_config_dir()?.join("logs");
    ensure_dir(&logs)?;
    Ok(logs)
}

/// Ensure dumps dir exists, returning it
pub fn ensure_dumps_dir() -> anyhow::Result<PathBuf> {
    let dumps = ensure_config_dir()?.join("dumps");
    ensure_dir(&dumps)?;
    Ok(dumps)
}
