//! Application model - the complete state of an editing session
//!
//! This module contains all the state types following the Elm Architecture pattern.

pub mod document;
pub mod element;
pub mod geometry;

pub use document::{Region, SourceDocument, END_MARKER, START_MARKER};
pub use element::{
    Capabilities, Children, Element, ElementId, ElementKind, ElementState, ElementTree, Geometry,
};
pub use geometry::{
    cm_to_px, px_to_cm, round_coord, Affine, Axis, Bounds, Edge, Edges, Frame, Point, Size,
};

use std::path::PathBuf;

use crate::config::EditorConfig;
use crate::error::Result;
use crate::history::{EditRecorder, UndoStack};
use crate::ledger::{ChangeLedger, LoadReport};
use crate::manipulate::{GrabberState, Selection, SnapSettings};

/// The complete session model
#[derive(Debug)]
pub struct AppModel {
    /// The figure being edited
    pub tree: ElementTree,
    pub ledger: ChangeLedger,
    pub history: UndoStack,
    pub selection: Selection,
    pub grabber: GrabberState,
    /// State captured at press, turned into an undo entry on release
    pub pending_edit: Option<EditRecorder>,
    /// Script the generated block is written to; `None` for a detached session
    pub document: Option<SourceDocument>,
    pub config: EditorConfig,
}

impl AppModel {
    /// Session over `tree` with no backing script
    pub fn new(tree: ElementTree, config: EditorConfig) -> Self {
        Self {
            tree,
            ledger: ChangeLedger::new(),
            history: UndoStack::with_max_size(config.history_limit),
            selection: Selection::new(),
            grabber: GrabberState::Idle,
            pending_edit: None,
            document: None,
            config,
        }
    }

    /// Attach `document` and rebuild the ledger from its generated block
    pub fn with_document(mut self, document: SourceDocument) -> Self {
        self.ledger.load(&document, &self.tree);
        self.document = Some(document);
        self
    }

    /// Open the script at `path`, recording `anchor_line` as the insertion point
    pub fn open(
        tree: ElementTree,
        path: impl Into<PathBuf>,
        anchor_line: usize,
        config: EditorConfig,
    ) -> Result<Self> {
        let document = SourceDocument::open(path, anchor_line)?;
        Ok(Self::new(tree, config).with_document(document))
    }

    /// Re-read the script from disk and rebuild the ledger from it
    ///
    /// Undo entries hold ledger snapshots of the previous block, so the history
    /// is cleared. Returns `None` for a session without a document.
    pub fn reload(&mut self) -> Result<Option<LoadReport>> {
        let Some(current) = &self.document else {
            return Ok(None);
        };
        let document = SourceDocument::open(current.path.clone(), current.anchor_line)?;
        let report = self.ledger.load(&document, &self.tree);
        self.document = Some(document);
        self.history.clear();
        Ok(Some(report))
    }

    /// Figure extent in device pixels at the configured dpi
    pub fn frame(&self) -> Frame {
        self.tree.frame(self.config.dpi)
    }

    pub fn snap_settings(&self) -> SnapSettings {
        self.config.snap_settings()
    }

    /// True when the ledger has changes not yet written to the script
    pub fn is_dirty(&self) -> bool {
        !self.ledger.is_saved()
    }
}
