//! Session state dump for troubleshooting
//!
//! Serializes a snapshot of the session to JSON: the block the ledger would
//! write right now, the selection, and the undo position.

use std::path::PathBuf;

use anyhow::Context;
use serde::Serialize;

use crate::model::AppModel;

#[derive(Debug, Serialize)]
pub struct SessionDump {
    pub timestamp: u64,
    pub document: Option<DocumentDump>,
    pub figure: FigureDump,
    pub ledger: LedgerDump,
    pub selection: Vec<SelectedDump>,
    pub history: HistoryDump,
    pub dragging: bool,
    /// Where the file logger writes, to attach alongside the dump
    pub log_file: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentDump {
    pub path: String,
    pub anchor_line: usize,
    pub has_region: bool,
}

#[derive(Debug, Serialize)]
pub struct FigureDump {
    pub number: u32,
    pub size_cm: (f64, f64),
    pub elements: usize,
}

#[derive(Debug, Serialize)]
pub struct LedgerDump {
    pub saved: bool,
    pub changes: usize,
    pub preserved_lines: usize,
    /// Body of the generated block as it would be saved
    pub rendered: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SelectedDump {
    pub id: u64,
    pub path: Option<String>,
    pub bounds: Option<[f64; 4]>,
}

#[derive(Debug, Serialize)]
pub struct HistoryDump {
    pub len: usize,
    pub cursor: Option<usize>,
    pub last_label: Option<String>,
}

impl SessionDump {
    pub fn from_model(model: &AppModel) -> Self {
        let tree = &model.tree;
        let size = tree.figure_size_cm();

        Self {
            timestamp: unix_timestamp(),
            document: model.document.as_ref().map(|doc| DocumentDump {
                path: doc.path.display().to_string(),
                anchor_line: doc.anchor_line,
                has_region: doc.region().is_some(),
            }),
            figure: FigureDump {
                number: tree.figure_number(),
                size_cm: (size.width, size.height),
                elements: tree.len(),
            },
            ledger: LedgerDump {
                saved: model.ledger.is_saved(),
                changes: model.ledger.len(),
                preserved_lines: model.ledger.preserved_lines().len(),
                rendered: model.ledger.render(tree),
            },
            selection: model
                .selection
                .targets()
                .iter()
                .map(|t| SelectedDump {
                    id: t.id.0,
                    path: crate::reference::resolve(tree, t.id)
                        .ok()
                        .map(String::from),
                    bounds: t
                        .bounds(tree)
                        .ok()
                        .map(|b| [b.x, b.y, b.width, b.height]),
                })
                .collect(),
            history: HistoryDump {
                len: model.history.len(),
                cursor: model.history.cursor(),
                last_label: model.history.last_label().map(str::to_string),
            },
            dragging: model.grabber.is_dragging(),
            log_file: crate::config_paths::log_file().map(|p| p.display().to_string()),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
    }

    /// Write the dump to `~/.config/plotedit/dumps/<timestamp>-session.json`
    pub fn save_to_file(&self) -> anyhow::Result<PathBuf> {
        let dir = crate::config_paths::ensure_dumps_dir()?;
        let path = dir.join(format!("{}-session.json", self.timestamp));
        std::fs::write(&path, self.to_json())
            .with_context(|| format!("Failed to write dump to {}", path.display()))?;
        tracing::info!("Wrote session dump to {}", path.display());
        Ok(path)
    }
}

fn unix_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
