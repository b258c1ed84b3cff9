//! Debug tracing infrastructure for development diagnostics
//!
//! # Usage
//!
//! Configure via RUST_LOG environment variable:
//! - `RUST_LOG=debug` - all debug logs
//! - `RUST_LOG=plotedit::ledger=debug` - module-level filtering
//! - `RUST_LOG=message=debug,session=debug` - dispatcher targets
//!
//! # Log Files
//!
//! Logs are written to `~/.config/plotedit/logs/plotedit.log` with daily rotation.
//! File logging uses debug level by default for more verbose troubleshooting.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::model::{AppModel, ElementId};

/// Initialize tracing subscriber with console and file logging
///
/// Console output respects RUST_LOG and defaults to `warn`. File logging
/// writes to `~/.config/plotedit/logs/` with daily rotation. Calling this twice
/// is harmless; the second call keeps the first subscriber.
pub fn init() {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Console layer - respects RUST_LOG
    let console_layer = fmt::layer()
        .with_target(true)
        .with_line_number(true)
        .with_filter(console_filter);

    // File layer - always debug level for troubleshooting
    let file_layer = match crate::config_paths::ensure_logs_dir() {
        Ok(logs_dir) => {
            let file_appender =
                tracing_appender::rolling::daily(logs_dir, crate::config_paths::LOG_FILE_PREFIX);
            Some(
                fmt::layer()
                    .with_writer(file_appender)
                    .with_ansi(false)
                    .with_target(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new("debug")),
            )
        }
        Err(e) => {
            eprintln!("Warning: Could not initialize file logging: {:#}", e);
            None
        }
    };

    let _ = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

/// Lightweight snapshot of session state for diffing around an update
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub selection: Vec<ElementId>,
    pub changes: usize,
    pub saved: bool,
    pub undo_cursor: Option<usize>,
    pub dragging: bool,
}

impl SessionSnapshot {
    pub fn from_model(model: &AppModel) -> Self {
        Self {
            selection: model.selection.ids(),
            changes: model.ledger.len(),
            saved: model.ledger.is_saved(),
            undo_cursor: model.history.cursor(),
            dragging: model.grabber.is_dragging(),
        }
    }

    /// Generate a diff description between two snapshots
    pub fn diff(&self, other: &SessionSnapshot) -> Option<String> {
        let mut changes = Vec::new();
        if self.selection != other.selection {
            changes.push(format!(
                "selection: {} → {}",
                self.selection.len(),
                other.selection.len()
            ));
        }
        if self.changes != other.changes {
            changes.push(format!("changes: {} → {}", self.changes, other.changes));
        }
        if self.saved != other.saved {
            changes.push(format!("saved: {} → {}", self.saved, other.saved));
        }
        if self.undo_cursor != other.undo_cursor {
            changes.push(format!(
                "undo cursor: {:?} → {:?}",
                self.undo_cursor, other.undo_cursor
            ));
        }
        if self.dragging != other.dragging {
            let status = if other.dragging { "started" } else { "ended" };
            changes.push(format!("drag {}", status));
        }

        if changes.is_empty() {
            None
        } else {
            Some(changes.join("; "))
        }
    }
}
