//! Edit history (undo/redo) for element edits
//!
//! An [`Edit`] is plain data: the before/after state of every element it
//! touched plus the ledger entries of those elements on both sides. A single
//! generic function applies either side, so entries stay valid when unrelated
//! elements are added or deleted in between.

use crate::ledger::{ChangeLedger, LedgerSnapshot};
use crate::model::{ElementId, ElementState, ElementTree};

/// Before/after state of one element
#[derive(Debug, Clone, PartialEq)]
pub struct TargetEdit {
    pub id: ElementId,
    pub before: ElementState,
    pub after: ElementState,
}

/// A single undoable user action
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub label: String,
    pub targets: Vec<TargetEdit>,
    pub ledger_before: LedgerSnapshot,
    pub ledger_after: LedgerSnapshot,
}

impl Edit {
    /// Restore the post-edit state; returns the elements that were updated
    pub fn redo(&self, tree: &mut ElementTree, ledger: &mut ChangeLedger) -> Vec<ElementId> {
        apply(
            tree,
            ledger,
            self.targets.iter().map(|t| (t.id, &t.after)),
            &self.ledger_after,
        )
    }

    /// Restore the pre-edit state; returns the elements that were updated
    pub fn undo(&self, tree: &mut ElementTree, ledger: &mut ChangeLedger) -> Vec<ElementId> {
        apply(
            tree,
            ledger,
            self.targets.iter().map(|t| (t.id, &t.before)),
            &self.ledger_before,
        )
    }

    pub fn ids(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.targets.iter().map(|t| t.id)
    }
}

fn apply<'a>(
    tree: &mut ElementTree,
    ledger: &mut ChangeLedger,
    states: impl Iterator<Item = (ElementId, &'a ElementState)>,
    snapshot: &LedgerSnapshot,
) -> Vec<ElementId> {
    let mut touched = Vec::new();
    for (id, state) in states {
        if tree.set_state(id, state.clone()) {
            touched.push(id);
        } else {
            tracing::warn!(%id, "undo target no longer exists, skipping");
        }
    }
    ledger.restore(snapshot, tree);
    touched
}

/// Captures element and ledger state around a mutation
///
/// Call [`begin`](Self::begin) before changing anything and
/// [`finish`](Self::finish) afterwards to obtain the [`Edit`].
#[derive(Debug, Clone)]
pub struct EditRecorder {
    label: String,
    before: Vec<(ElementId, ElementState)>,
    ledger_before: LedgerSnapshot,
}

impl EditRecorder {
    pub fn begin(
        label: impl Into<String>,
        ids: &[ElementId],
        tree: &ElementTree,
        ledger: &ChangeLedger,
    ) -> Self {
        let before = ids
            .iter()
            .filter_map(|&id| tree.state(id).map(|s| (id, s.clone())))
            .collect();
        Self {
            label: label.into(),
            before,
            ledger_before: ledger.snapshot(ids),
        }
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.before.iter().map(|(id, _)| *id).collect()
    }

    /// Build the edit, or `None` when nothing actually changed
    pub fn finish(self, tree: &ElementTree, ledger: &ChangeLedger) -> Option<Edit> {
        let ids = self.ids();
        let targets: Vec<TargetEdit> = self
            .before
            .into_iter()
            .filter_map(|(id, before)| {
                tree.state(id).map(|after| TargetEdit {
                    id,
                    before,
                    after: after.clone(),
                })
            })
            .collect();
        let ledger_after = ledger.snapshot(&ids);

        let unchanged = targets.iter().all(|t| t.before == t.after)
            && ledger_after == self.ledger_before;
        if unchanged || targets.is_empty() {
            return None;
        }
        Some(Edit {
            label: self.label,
            targets,
            ledger_before: self.ledger_before,
            ledger_after,
        })
    }
}

/// Linear undo history: a flat list of edits and a cursor
///
/// Pushing after an undo discards the undone edits; there is no branching.
#[derive(Debug, Clone)]
pub struct UndoStack {
    edits: Vec<Edit>,
    /// Number of edits currently applied; `edits[applied - 1]` is the last one
    applied: usize,
    max_size: usize,
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoStack {
    /// Create a history with default max size
    pub fn new() -> Self {
        Self::with_max_size(1000)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            edits: Vec::new(),
            applied: 0,
            max_size: max_size.max(1),
        }
    }

    /// Record an edit that has already been applied
    pub fn push(&mut self, edit: Edit) {
        self.edits.truncate(self.applied);
        tracing::debug!(label = %edit.label, targets = edit.targets.len(), "pushing edit");
        self.edits.push(edit);

        // Trim if exceeded max size
        if self.edits.len() > self.max_size {
            let excess = self.edits.len() - self.max_size;
            self.edits.drain(..excess);
        }
        self.applied = self.edits.len();
    }

    /// Revert the last applied edit; `None` when there is nothing to undo
    pub fn undo(&mut self, tree: &mut ElementTree, ledger: &mut ChangeLedger) -> Option<Vec<ElementId>> {
        if self.applied == 0 {
            return None;
        }
        self.applied -= 1;
        let edit = &self.edits[self.applied];
        tracing::debug!(label = %edit.label, "undo");
        Some(edit.undo(tree, ledger))
    }

    /// Re-apply the next undone edit; `None` when there is nothing to redo
    pub fn redo(&mut self, tree: &mut ElementTree, ledger: &mut ChangeLedger) -> Option<Vec<ElementId>> {
        let edit = self.edits.get(self.applied)?;
        tracing::debug!(label = %edit.label, "redo");
        let touched = edit.redo(tree, ledger);
        self.applied += 1;
        Some(touched)
    }

    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    pub fn can_redo(&self) -> bool {
        self.applied < self.edits.len()
    }

    /// Index of the last applied edit
    pub fn cursor(&self) -> Option<usize> {
        self.applied.checked_sub(1)
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn last_label(&self) -> Option<&str> {
        self.cursor().map(|i| self.edits[i].label.as_str())
    }

    pub fn clear(&mut self) {
        self.edits.clear();
        self.applied = 0;
    }
}
