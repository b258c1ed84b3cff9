//! The set of elements manipulated together

use super::target::TargetWrapper;
use crate::error::{EditError, Result};
use crate::ledger::ChangeLedger;
use crate::model::{Affine, Bounds, ElementId, ElementTree, Point};

/// Selected targets plus the state captured when a manipulation began
#[derive(Debug, Clone, Default)]
pub struct Selection {
    targets: Vec<TargetWrapper>,
    /// Defining points of each target at the start of the manipulation
    start: Vec<Vec<Point>>,
    start_outline: Option<Bounds>,
    outline: Option<Bounds>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn targets(&self) -> &[TargetWrapper] {
        &self.targets
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.targets.iter().map(|t| t.id).collect()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.targets.iter().any(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Add an element; returns false when it was already selected
    ///
    /// The figure and elements marked non-pickable are rejected.
    pub fn add(&mut self, tree: &ElementTree, id: ElementId) -> Result<bool> {
        if self.contains(id) {
            return Ok(false);
        }
        let target = TargetWrapper::new(tree, id)?;
        if !tree.element(id)?.pickable {
            return Err(EditError::NotATarget(id));
        }
        self.targets.push(target);
        self.end();
        Ok(true)
    }

    pub fn remove(&mut self, id: ElementId) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| t.id != id);
        self.end();
        self.targets.len() != before
    }

    /// Add or remove `id`; returns whether it is selected afterwards
    pub fn toggle(&mut self, tree: &ElementTree, id: ElementId) -> Result<bool> {
        if self.remove(id) {
            Ok(false)
        } else {
            self.add(tree, id)
        }
    }

    pub fn clear(&mut self) {
        self.targets.clear();
        self.end();
    }

    /// Drop targets whose elements no longer exist
    pub fn prune(&mut self, tree: &ElementTree) -> bool {
        let before = self.targets.len();
        self.targets.retain(|t| tree.contains(t.id));
        if self.targets.len() != before {
            self.end();
            true
        } else {
            false
        }
    }

    /// Outline enclosing every target, figure units
    pub fn bounds(&self, tree: &ElementTree) -> Option<Bounds> {
        self.targets
            .iter()
            .filter_map(|t| t.bounds(tree).ok())
            .reduce(|a, b| a.union(&b))
    }

    /// The outline as last transformed, or the live bounds outside a manipulation
    pub fn outline(&self, tree: &ElementTree) -> Option<Bounds> {
        self.outline.or_else(|| self.bounds(tree))
    }

    /// Resizing keeps proportions only when every target asks for it
    pub fn fixed_aspect(&self) -> bool {
        !self.targets.is_empty() && self.targets.iter().all(|t| t.fixed_aspect)
    }

    pub fn is_manipulating(&self) -> bool {
        self.start_outline.is_some()
    }

    /// Capture the current geometry as the origin of a manipulation
    pub fn begin(&mut self, tree: &ElementTree) -> Result<Bounds> {
        let start = self
            .targets
            .iter()
            .map(|t| t.get_positions(tree))
            .collect::<Result<Vec<_>>>()?;
        let outline = self
            .bounds(tree)
            .ok_or_else(|| EditError::NotATarget(tree.root()))?;
        self.start = start;
        self.start_outline = Some(outline);
        self.outline = Some(outline);
        Ok(outline)
    }

    /// Map every target and the outline from their start geometry through
    /// `transform`
    ///
    /// One transform for the whole group, so members scale with the group
    /// outline rather than each with its own.
    pub fn apply(&mut self, tree: &mut ElementTree, transform: &Affine) -> Result<Vec<ElementId>> {
        let Some(start_outline) = self.start_outline else {
            return Ok(Vec::new());
        };
        for (target, start) in self.targets.iter().zip(&self.start) {
            target.place_transformed(tree, start, transform)?;
        }
        self.outline = Some(transform.apply_bounds(&start_outline).rounded());
        Ok(self.ids())
    }

    /// Record the final geometry of every target and end the manipulation
    pub fn commit(&mut self, tree: &ElementTree, ledger: &mut ChangeLedger) -> Result<()> {
        let result = self
            .targets
            .iter()
            .try_for_each(|t| t.record(tree, ledger));
        self.end();
        result
    }

    /// Forget the captured start geometry
    pub fn end(&mut self) {
        self.start.clear();
        self.start_outline = None;
        self.outline = None;
    }
}
