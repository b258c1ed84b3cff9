//! Command types for the Elm-style architecture
//!
//! Commands are the notifications a front end consumes after an update.

use crate::model::ElementId;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cmd {
    /// No command - do nothing
    #[default]
    None,
    /// The set of selected elements changed
    SelectionChanged(Vec<ElementId>),
    /// These elements moved, resized or changed a property and need repainting
    GeometryChanged(Vec<ElementId>),
    /// The ledger went from saved to unsaved (`true`) or back
    LedgerDirtyChanged(bool),
    /// An operation failed; the message is meant for the status bar
    Error(String),
    /// Execute multiple commands
    Batch(Vec<Cmd>),
}

impl Cmd {
    /// Create a batch of commands, collapsing trivial cases
    pub fn batch(cmds: Vec<Cmd>) -> Self {
        let mut cmds: Vec<Cmd> = cmds.into_iter().filter(|c| *c != Cmd::None).collect();
        match cmds.len() {
            0 => Cmd::None,
            1 => cmds.remove(0),
            _ => Cmd::Batch(cmds),
        }
    }

    /// Flatten nested batches into a list of leaf commands
    pub fn flatten(self) -> Vec<Cmd> {
        match self {
            Cmd::None => Vec::new(),
            Cmd::Batch(cmds) => cmds.into_iter().flat_map(Cmd::flatten).collect(),
            other => vec![other],
        }
    }

    pub fn is_error(&self) -> bool {
        match self {
            Cmd::Error(_) => true,
            Cmd::Batch(cmds) => cmds.iter().any(Cmd::is_error),
            _ => false,
        }
    }
}
