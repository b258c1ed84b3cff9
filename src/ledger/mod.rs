//! Change ledger and source synthesizer
//!
//! The ledger maps "which property of which element" to "the statement that
//! reproduces its current value". Entries are keyed by element handle and
//! property selector, so a later edit of the same property replaces the earlier
//! statement instead of appending to it.
//!
//! Rendering resolves every handle to its reference path at the moment the
//! block is written, which keeps the output correct when sibling order changes
//! between the edit and the save.

pub mod parser;
pub mod statement;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

use crate::error::{EditError, Result};
use crate::model::{ElementId, ElementKind, ElementTree, SourceDocument};
use crate::reference::{self, ReferencePath};
use crate::util::natural_cmp;

use parser::ParsedLine;

// ============================================================================
// Keys and entries
// ============================================================================

/// Property a change sets; `New` marks an element the editor created
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChangeKey {
    New,
    Property(String),
}

impl ChangeKey {
    /// Derive the key from the leading selector of a command text
    pub fn from_command(command: &str) -> Result<Self> {
        parser::leading_selector(command)
            .map(|selector| ChangeKey::Property(selector.to_string()))
            .ok_or_else(|| EditError::MalformedCommand(command.to_string()))
    }

    pub fn property(selector: &str) -> Self {
        ChangeKey::Property(selector.to_string())
    }

    pub fn is_new(&self) -> bool {
        matches!(self, ChangeKey::New)
    }
}

impl fmt::Display for ChangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKey::New => f.write_str("new"),
            ChangeKey::Property(selector) => f.write_str(selector),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LedgerKey {
    /// Element the property belongs to
    pub reference: ElementId,
    pub key: ChangeKey,
}

impl LedgerKey {
    pub fn new(reference: ElementId, key: ChangeKey) -> Self {
        Self { reference, key }
    }
}

/// The latest statement recorded for one property of one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    /// Element whose path prefixes the statement
    pub target: ElementId,
    /// Statement text starting at the property selector
    pub command: String,
}

/// What [`ChangeLedger::remove_element`] did with the element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Editor-created element: dropped from the tree with all of its changes
    Deleted,
    /// Pre-existing element: kept in the tree and hidden
    Hidden,
}

/// Ledger entries of a set of elements, captured by value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LedgerSnapshot {
    ids: Vec<ElementId>,
    entries: Vec<(LedgerKey, Change)>,
}

impl LedgerSnapshot {
    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A change with its paths resolved against the live tree
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedChange {
    pub reference: ReferencePath,
    pub target: ReferencePath,
    pub key: ChangeKey,
    pub statement: String,
}

/// Counts reported by [`ChangeLedger::load`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub recognized: usize,
    pub preserved: usize,
}

// ============================================================================
// Ledger
// ============================================================================

#[derive(Debug, Clone)]
pub struct ChangeLedger {
    changes: HashMap<LedgerKey, Change>,
    /// Region lines outside the grammar, re-emitted verbatim
    preserved: Vec<String>,
    saved: bool,
}

impl Default for ChangeLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeLedger {
    pub fn new() -> Self {
        Self {
            changes: HashMap::new(),
            preserved: Vec::new(),
            saved: true,
        }
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// True when the ledger matches what is on disk
    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn preserved_lines(&self) -> &[String] {
        &self.preserved
    }

    pub fn get(&self, reference: ElementId, key: &ChangeKey) -> Option<&Change> {
        self.changes.get(&LedgerKey::new(reference, key.clone()))
    }

    /// Every change recorded for `reference`, ordered by key
    pub fn changes_for(&self, reference: ElementId) -> Vec<(&ChangeKey, &Change)> {
        let mut out: Vec<_> = self
            .changes
            .iter()
            .filter(|(k, _)| k.reference == reference)
            .map(|(k, c)| (&k.key, c))
            .collect();
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }

    /// Record `command` for `target`, keyed by its leading selector
    ///
    /// Returns the change this one superseded, if any.
    pub fn add_change(&mut self, target: ElementId, command: impl Into<String>) -> Result<Option<Change>> {
        self.add_change_with(target, command, target, None)
    }

    /// Record a change whose reference element or key differ from the defaults
    pub fn add_change_with(
        &mut self,
        target: ElementId,
        command: impl Into<String>,
        reference: ElementId,
        key: Option<ChangeKey>,
    ) -> Result<Option<Change>> {
        let command = command.into();
        // A command always needs a selector, even when the key is explicit
        let derived = ChangeKey::from_command(&command)?;
        let key = key.unwrap_or(derived);

        tracing::debug!(%reference, %key, %command, "recording change");
        let previous = self
            .changes
            .insert(LedgerKey::new(reference, key), Change { target, command });
        if let Some(old) = &previous {
            tracing::trace!(superseded = %old.command, "change superseded");
        }
        self.saved = false;
        Ok(previous)
    }

    /// Record that `created` was made by the editor with `command` on `owner`
    pub fn record_creation(
        &mut self,
        created: ElementId,
        owner: ElementId,
        command: impl Into<String>,
    ) -> Result<()> {
        self.add_change_with(owner, command, created, Some(ChangeKey::New))?;
        Ok(())
    }

    pub fn is_created(&self, id: ElementId) -> bool {
        self.changes
            .contains_key(&LedgerKey::new(id, ChangeKey::New))
    }

    /// Drop every change keyed to or targeting one of `ids`
    fn forget(&mut self, ids: &[ElementId]) {
        let before = self.changes.len();
        self.changes
            .retain(|k, c| !ids.contains(&k.reference) && !ids.contains(&c.target));
        if self.changes.len() != before {
            self.saved = false;
        }
    }

    /// Remove an element from the figure
    ///
    /// Elements the editor created are deleted outright and leave no trace in
    /// the ledger. Elements from the user's own code are hidden instead, so the
    /// regenerated block still refers to something the script defines.
    pub fn remove_element(&mut self, tree: &mut ElementTree, id: ElementId) -> Result<Removal> {
        let el = tree.element(id)?;
        if el.kind == ElementKind::Root {
            return Err(EditError::NotATarget(id));
        }

        if self.is_created(id) {
            let removed = tree.remove(id)?;
            self.forget(&removed);
            tracing::debug!(%id, dropped = removed.len(), "deleted created element");
            Ok(Removal::Deleted)
        } else {
            // Resolve first so a detached element leaves the ledger untouched
            reference::resolve(tree, id)?;
            tree.set_visible(id, false)?;
            self.add_change(id, statement::hide())?;
            tracing::debug!(%id, "hid pre-existing element");
            Ok(Removal::Hidden)
        }
    }

    /// Capture the entries of `ids` so they can be restored later
    pub fn snapshot(&self, ids: &[ElementId]) -> LedgerSnapshot {
        let mut entries: Vec<(LedgerKey, Change)> = self
            .changes
            .iter()
            .filter(|(k, _)| ids.contains(&k.reference))
            .map(|(k, c)| (k.clone(), c.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        LedgerSnapshot {
            ids: ids.to_vec(),
            entries,
        }
    }

    /// Replace the entries of the snapshot's elements with the captured ones
    ///
    /// Entries whose elements no longer exist are skipped.
    pub fn restore(&mut self, snapshot: &LedgerSnapshot, tree: &ElementTree) {
        self.changes
            .retain(|k, _| !snapshot.ids.contains(&k.reference));
        for (key, change) in &snapshot.entries {
            if tree.contains(key.reference) && tree.contains(change.target) {
                self.changes.insert(key.clone(), change.clone());
            } else {
                tracing::debug!(reference = %key.reference, "skipping restore of removed element");
            }
        }
        self.saved = false;
    }

    // ------------------------------------------------------------------------
    // Ordering and rendering
    // ------------------------------------------------------------------------

    /// Changes in deterministic output order
    ///
    /// Figure changes come first, then container changes by container path,
    /// then everything else by (owner path, element path, creation before
    /// update, selector). Paths compare with numeric awareness. Entries that
    /// no longer resolve are skipped.
    pub fn sorted_changes(&self, tree: &ElementTree) -> Vec<RenderedChange> {
        let mut rows: Vec<(SortKey, RenderedChange)> = Vec::with_capacity(self.changes.len());

        for (key, change) in &self.changes {
            let row = (|| -> Result<(SortKey, RenderedChange)> {
                let reference = reference::resolve(tree, key.reference)?;
                let target = reference::resolve(tree, change.target)?;
                let sort_key = SortKey::new(tree, key, &reference)?;
                let mut statement = format!("{}{}", target, change.command);
                if key.key.is_new() {
                    statement.push_str(&statement::creation_tag(&reference));
                }
                Ok((
                    sort_key,
                    RenderedChange {
                        reference,
                        target,
                        key: key.key.clone(),
                        statement,
                    },
                ))
            })();

            match row {
                Ok(row) => rows.push(row),
                Err(err) => tracing::warn!(reference = %key.reference, %err, "dropping unresolvable change"),
            }
        }

        rows.sort_by(|a, b| a.0.cmp(&b.0));
        rows.into_iter().map(|(_, change)| change).collect()
    }

    /// Lines of the managed region, without markers
    pub fn render(&self, tree: &ElementTree) -> Vec<String> {
        let changes = self.sorted_changes(tree);
        let mut lines = Vec::with_capacity(changes.len() + self.preserved.len() + 1);
        if changes
            .iter()
            .any(|c| c.target.uses_label_lookup() || c.reference.uses_label_lookup())
        {
            lines.push(statement::label_table_header(&reference::root_path(
                tree.figure_number(),
            )));
        }
        lines.extend(self.preserved.iter().cloned());
        lines.extend(changes.into_iter().map(|c| c.statement));
        lines
    }

    // ------------------------------------------------------------------------
    // Document round trip
    // ------------------------------------------------------------------------

    /// Rebuild the ledger from the managed region of `document`
    ///
    /// Recognized statements become authoritative entries. Lines outside the
    /// grammar, and statements naming elements the live tree does not have, are
    /// preserved verbatim.
    pub fn load(&mut self, document: &SourceDocument, tree: &ElementTree) -> LoadReport {
        self.changes.clear();
        self.preserved.clear();

        let header = statement::label_table_header(&reference::root_path(tree.figure_number()));
        let mut report = LoadReport::default();

        for (idx, line) in document.region_lines().iter().enumerate() {
            match parser::parse_line(line, &header) {
                ParsedLine::Blank | ParsedLine::Header => {}
                ParsedLine::Opaque(text) => {
                    tracing::debug!(line = idx, "preserving unrecognized line");
                    self.preserved.push(text.to_string());
                    report.preserved += 1;
                }
                ParsedLine::Statement(stmt) => {
                    let keyed = (|| -> Result<(LedgerKey, Change)> {
                        let target = reference::evaluate(tree, stmt.object)?;
                        let key = match stmt.created {
                            Some(created) => {
                                LedgerKey::new(reference::evaluate(tree, created)?, ChangeKey::New)
                            }
                            None => LedgerKey::new(target, ChangeKey::property(stmt.selector)),
                        };
                        Ok((
                            key,
                            Change {
                                target,
                                command: stmt.command.to_string(),
                            },
                        ))
                    })();

                    match keyed {
                        Ok((key, change)) => {
                            self.changes.insert(key, change);
                            report.recognized += 1;
                        }
                        Err(err) => {
                            tracing::warn!(line = idx, %err, "statement does not match the figure, preserving it");
                            self.preserved.push(line.trim().to_string());
                            report.preserved += 1;
                        }
                    }
                }
            }
        }

        self.saved = true;
        tracing::info!(
            path = %document.path.display(),
            recognized = report.recognized,
            preserved = report.preserved,
            "loaded generated block"
        );
        report
    }

    /// Write the rendered block into `document` and mark the ledger clean
    ///
    /// On failure the file on disk is left in its prior state and the ledger
    /// stays dirty.
    pub fn save(&mut self, document: &mut SourceDocument, tree: &ElementTree) -> Result<()> {
        let lines = self.render(tree);
        document.write_block(&lines)?;
        self.saved = true;
        tracing::info!(
            path = %document.path.display(),
            statements = lines.len(),
            "saved generated block"
        );
        Ok(())
    }
}

// ============================================================================
// Sort key
// ============================================================================

/// Total order used for deterministic output
#[derive(Debug, Clone, PartialEq, Eq)]
struct SortKey {
    tier: u8,
    owner: String,
    element: String,
    class: u8,
    selector: String,
}

impl SortKey {
    fn new(tree: &ElementTree, key: &LedgerKey, reference: &ReferencePath) -> Result<Self> {
        let el = tree.element(key.reference)?;
        let (tier, owner) = match el.kind {
            ElementKind::Root => (0, String::new()),
            ElementKind::Container => (1, reference.to_string()),
            ElementKind::Shape | ElementKind::TextLabel | ElementKind::Legend => {
                let owner = el.parent.ok_or(EditError::DetachedElement(key.reference))?;
                (2, reference::resolve(tree, owner)?.into())
            }
        };
        Ok(Self {
            tier,
            owner,
            element: reference.to_string(),
            class: if key.key.is_new() { 0 } else { 1 },
            selector: key.key.to_string(),
        })
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tier
            .cmp(&other.tier)
            .then_with(|| natural_cmp(&self.owner, &other.owner))
            .then_with(|| natural_cmp(&self.element, &other.element))
            .then_with(|| self.class.cmp(&other.class))
            .then_with(|| natural_cmp(&self.selector, &other.selector))
    }
}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
