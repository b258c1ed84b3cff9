//! Per-kind geometry adapter
//!
//! Everything that knows how a given element kind stores its position lives
//! here. The rest of the engine only sees an ordered list of defining points.

use crate::error::{EditError, Result};
use crate::ledger::{statement, ChangeLedger};
use crate::model::{Affine, Bounds, ElementId, ElementKind, ElementTree, Geometry, Point, Size};

/// Uniform geometry access to one selected element
#[derive(Debug, Clone, PartialEq)]
pub struct TargetWrapper {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Whether a resize scales all defining points or only moves the first one
    pub do_scale: bool,
    pub fixed_aspect: bool,
}

impl TargetWrapper {
    /// Wrap an element; the figure itself is not a target
    pub fn new(tree: &ElementTree, id: ElementId) -> Result<Self> {
        let el = tree.element(id)?;
        let do_scale = match el.kind {
            ElementKind::Root => return Err(EditError::NotATarget(id)),
            ElementKind::Container | ElementKind::Shape => true,
            ElementKind::TextLabel => el.is_annotation(),
            ElementKind::Legend => false,
        };
        Ok(Self {
            id,
            kind: el.kind,
            do_scale,
            fixed_aspect: el.fixed_aspect,
        })
    }

    /// Defining points of the element
    ///
    /// Boxes give their two corners, annotations their anchor and label
    /// position, plain text and legends their origin and far corner.
    pub fn get_positions(&self, tree: &ElementTree) -> Result<Vec<Point>> {
        let el = tree.element(self.id)?;
        let points = match el.state.geometry {
            Geometry::Box { bounds } => vec![bounds.origin(), bounds.far_corner()],
            Geometry::Text {
                position,
                anchor: Some(anchor),
                ..
            } => vec![anchor, position],
            Geometry::Text {
                position, extent, ..
            }
            | Geometry::Legend { position, extent } => {
                vec![position, position.offset(extent.width, extent.height)]
            }
            Geometry::Figure { .. } => return Err(EditError::NotATarget(self.id)),
        };
        Ok(points)
    }

    pub fn bounds(&self, tree: &ElementTree) -> Result<Bounds> {
        let points = self.get_positions(tree)?;
        Bounds::enclosing(&points).ok_or(EditError::NotATarget(self.id))
    }

    /// Move the element to `points` without touching the ledger
    pub fn place(&self, tree: &mut ElementTree, points: &[Point]) -> Result<()> {
        let [first, second] = match points {
            [a, b] => [a.rounded(), b.rounded()],
            _ => {
                return Err(EditError::PositionCount {
                    id: self.id,
                    expected: 2,
                    got: points.len(),
                })
            }
        };
        let el = tree
            .get_mut(self.id)
            .ok_or(EditError::DetachedElement(self.id))?;

        match &mut el.state.geometry {
            Geometry::Box { bounds } => {
                *bounds = Bounds::from_corners(first, second).rounded();
            }
            Geometry::Text {
                position,
                anchor: Some(anchor),
                ..
            } => {
                *anchor = first;
                *position = second;
            }
            Geometry::Text {
                position, extent, ..
            }
            | Geometry::Legend { position, extent } => {
                *position = first;
                // Only the host can re-measure text; keep the extent unless it was scaled
                if self.do_scale {
                    *extent = Size::new(
                        (second.x - first.x).abs(),
                        (second.y - first.y).abs(),
                    );
                }
            }
            Geometry::Figure { .. } => return Err(EditError::NotATarget(self.id)),
        }
        Ok(())
    }

    /// Write the statements reproducing the element's current geometry
    pub fn record(&self, tree: &ElementTree, ledger: &mut ChangeLedger) -> Result<()> {
        let el = tree.element(self.id)?;
        let commands = match el.state.geometry {
            Geometry::Box { bounds } => match self.kind {
                ElementKind::Shape => vec![
                    statement::set_xy(bounds.origin()),
                    statement::set_width(bounds.width),
                    statement::set_height(bounds.height),
                ],
                _ => vec![statement::set_position(&bounds)],
            },
            Geometry::Text {
                position, anchor, ..
            } => {
                let mut commands = vec![statement::set_text_position(position)];
                if let Some(anchor) = anchor {
                    commands.push(statement::set_anchor(anchor));
                }
                commands
            }
            Geometry::Legend { position, .. } => vec![statement::set_legend_loc(position)],
            Geometry::Figure { .. } => return Err(EditError::NotATarget(self.id)),
        };
        for command in commands {
            ledger.add_change(self.id, command)?;
        }
        Ok(())
    }

    /// Move the element to `points` and record the result
    pub fn set_positions(
        &self,
        tree: &mut ElementTree,
        ledger: &mut ChangeLedger,
        points: &[Point],
    ) -> Result<()> {
        self.place(tree, points)?;
        self.record(tree, ledger)
    }

    /// Map `start` through `transform` and place the element there
    ///
    /// Non-scaling targets follow the transformed first point rigidly.
    pub fn place_transformed(
        &self,
        tree: &mut ElementTree,
        start: &[Point],
        transform: &Affine,
    ) -> Result<()> {
        let moved: Vec<Point> = if self.do_scale {
            start.iter().map(|&p| transform.apply(p)).collect()
        } else {
            let Some(&first) = start.first() else {
                return Err(EditError::PositionCount {
                    id: self.id,
                    expected: 2,
                    got: 0,
                });
            };
            let target = transform.apply(first);
            let (dx, dy) = (target.x - first.x, target.y - first.y);
            start.iter().map(|p| p.offset(dx, dy)).collect()
        };
        self.place(tree, &moved)
    }
}
