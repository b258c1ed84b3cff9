//! Editor configuration persistence
//!
//! Stores user preferences in `~/.config/plotedit/config.yaml`

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::manipulate::SnapSettings;

/// Editor configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Guides closer than this (device pixels) pull a drag onto them
    #[serde(default = "default_snap_threshold")]
    pub snap_threshold_px: f64,
    /// Guides closer than this are drawn
    #[serde(default = "default_active_threshold")]
    pub active_threshold_px: f64,
    /// Resolution used to convert figure units to device pixels
    #[serde(default = "default_dpi")]
    pub dpi: f64,
    /// Maximum number of undo entries kept
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    #[serde(default = "default_snapping")]
    pub snapping: bool,
}

fn default_snap_threshold() -> f64 {
    10.0
}

fn default_active_threshold() -> f64 {
    1.0
}

fn default_dpi() -> f64 {
    100.0
}

fn default_history_limit() -> usize {
    1000
}

fn default_snapping() -> bool {
    true
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_threshold_px: default_snap_threshold(),
            active_threshold_px: default_active_threshold(),
            dpi: default_dpi(),
            history_limit: default_history_limit(),
            snapping: default_snapping(),
        }
    }
}

impl EditorConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };

        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse a YAML document; missing keys take their defaults
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let dir = crate::config_paths::ensure_config_dir()?;
        let path = dir.join(crate::config_paths::CONFIG_FILE);

        let content = self.to_yaml().context("Failed to serialize config")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn snap_settings(&self) -> SnapSettings {
        SnapSettings {
            enabled: self.snapping,
            threshold_px: self.snap_threshold_px,
            active_threshold_px: self.active_threshold_px,
        }
    }
}
