//! Snap guides: transient alignment constraints against sibling containers
//!
//! Guides are collected once when a drag starts and evaluated on every motion.
//! All values are device pixels. A guide's distance along an axis is the amount
//! that has to be subtracted from the dragged offset to satisfy it; guides that
//! do not constrain an axis report an infinite distance there.

use crate::model::{Axis, Bounds, Edge, Edges, ElementId, ElementKind, ElementTree, Frame};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapGuide {
    /// Target edge lines up with the same edge of another container
    SameEdge {
        other: ElementId,
        edge: Edge,
        value: f64,
    },
    /// Target centre lines up with another container's centre (moves only)
    SameCenter {
        other: ElementId,
        axis: Axis,
        value: f64,
    },
    /// Target width or height matches another container's (resizes only)
    SameDimension {
        other: ElementId,
        /// The edge being dragged
        edge: Edge,
        length: f64,
    },
    /// Target keeps the same gap to a neighbour as two other containers have
    /// between each other
    SameBorder {
        neighbour: ElementId,
        edge: Edge,
        gap: f64,
        value: f64,
    },
}

impl SnapGuide {
    pub fn axis(&self) -> Axis {
        match *self {
            SnapGuide::SameEdge { edge, .. }
            | SnapGuide::SameDimension { edge, .. }
            | SnapGuide::SameBorder { edge, .. } => edge.axis(),
            SnapGuide::SameCenter { axis, .. } => axis,
        }
    }

    /// Correction needed along `axis` for `bounds` to satisfy the guide
    pub fn distance(&self, bounds: &Bounds, axis: Axis) -> f64 {
        if axis != self.axis() {
            return f64::INFINITY;
        }
        match *self {
            SnapGuide::SameEdge { edge, value, .. } | SnapGuide::SameBorder { edge, value, .. } => {
                bounds.edge(edge) - value
            }
            SnapGuide::SameCenter { axis, value, .. } => bounds.center(axis) - value,
            SnapGuide::SameDimension { edge, length, .. } => {
                let excess = bounds.length(edge.axis()) - length;
                // Pulling the leading edge back grows the box
                if edge.is_leading() {
                    -excess
                } else {
                    excess
                }
            }
        }
    }

    /// Smallest absolute distance over both axes
    pub fn min_distance(&self, bounds: &Bounds) -> f64 {
        Axis::BOTH
            .into_iter()
            .map(|axis| self.distance(bounds, axis).abs())
            .fold(f64::INFINITY, f64::min)
    }

    pub fn is_active(&self, bounds: &Bounds, threshold_px: f64) -> bool {
        self.min_distance(bounds) < threshold_px
    }
}

/// Whether dragging `edges` moves `edge`
fn drags(edges: Edges, edge: Edge) -> bool {
    edges.translates(edge.axis()) || edges.resizing_edge(edge.axis()) == Some(edge)
}

/// Enumerate the guides a drag of `edges` can snap to
///
/// Every visible container that is not part of `selected` contributes.
pub fn collect_guides(
    tree: &ElementTree,
    frame: &Frame,
    selected: &[ElementId],
    edges: Edges,
) -> Vec<SnapGuide> {
    let others: Vec<(ElementId, Bounds)> = tree
        .containers()
        .iter()
        .filter(|id| !selected.contains(id))
        .filter_map(|&id| {
            let el = tree.get(id)?;
            if el.kind != ElementKind::Container || !el.is_visible() {
                return None;
            }
            el.bounds().map(|b| (id, frame.bounds_to_px(&b)))
        })
        .collect();

    let mut guides = Vec::new();

    for &(other, b) in &others {
        for edge in Edge::ALL {
            if drags(edges, edge) {
                guides.push(SnapGuide::SameEdge {
                    other,
                    edge,
                    value: b.edge(edge),
                });
            }
        }
        for axis in Axis::BOTH {
            if edges.translates(axis) {
                guides.push(SnapGuide::SameCenter {
                    other,
                    axis,
                    value: b.center(axis),
                });
            } else if let Some(edge) = edges.resizing_edge(axis) {
                guides.push(SnapGuide::SameDimension {
                    other,
                    edge,
                    length: b.length(axis),
                });
            }
        }
    }

    // Gaps between pairs of other containers that sit side by side
    for axis in Axis::BOTH {
        let (lead, trail) = match axis {
            Axis::X => (Edge::Left, Edge::Right),
            Axis::Y => (Edge::Bottom, Edge::Top),
        };
        let mut gaps: Vec<f64> = Vec::new();
        for (i, &(_, a)) in others.iter().enumerate() {
            for &(_, b) in &others[i + 1..] {
                for (first, second) in [(a, b), (b, a)] {
                    let gap = second.edge(lead) - first.edge(trail);
                    if gap > 0.0 && !gaps.iter().any(|g| (g - gap).abs() < 1e-9) {
                        gaps.push(gap);
                    }
                }
            }
        }

        for &gap in &gaps {
            for &(neighbour, n) in &others {
                // Target after the neighbour: its leading edge sits one gap past it
                if drags(edges, lead) {
                    guides.push(SnapGuide::SameBorder {
                        neighbour,
                        edge: lead,
                        gap,
                        value: n.edge(trail) + gap,
                    });
                }
                // Target before the neighbour
                if drags(edges, trail) {
                    guides.push(SnapGuide::SameBorder {
                        neighbour,
                        edge: trail,
                        gap,
                        value: n.edge(lead) - gap,
                    });
                }
            }
        }
    }

    tracing::trace!(count = guides.len(), "collected snap guides");
    guides
}

/// Best correction per axis: the guide distance of smallest magnitude below
/// `threshold_px`, independently for x and y
pub fn best_offsets(guides: &[SnapGuide], bounds: &Bounds, threshold_px: f64) -> [Option<f64>; 2] {
    let mut best = [None::<f64>; 2];
    for guide in guides {
        let axis = guide.axis();
        let d = guide.distance(bounds, axis);
        if d.abs() >= threshold_px {
            continue;
        }
        let slot = &mut best[axis.index()];
        if slot.map_or(true, |current| d.abs() < current.abs()) {
            *slot = Some(d);
        }
    }
    best
}

/// Guides satisfied to within `threshold_px`, for rendering
pub fn active_guides(guides: &[SnapGuide], bounds: &Bounds, threshold_px: f64) -> Vec<SnapGuide> {
    guides
        .iter()
        .filter(|g| g.is_active(bounds, threshold_px))
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Size;

    // 100 x 100 px figure so figure units map to pixels by a factor of 100
    fn frame() -> Frame {
        Frame::new(100.0, 100.0)
    }

    fn tree_with(boxes: &[Bounds]) -> (ElementTree, Vec<ElementId>) {
        let mut tree = ElementTree::new(1, Size::new(2.54, 2.54));
        let ids = boxes
            .iter()
            .map(|b| tree.add_container(*b, None))
            .collect();
        (tree, ids)
    }

    #[test]
    fn test_same_edge_distance() {
        let guide = SnapGuide::SameEdge {
            other: ElementId(2),
            edge: Edge::Left,
            value: 20.0,
        };
        let b = Bounds::new(21.0, 0.0, 10.0, 10.0);
        assert_eq!(guide.distance(&b, Axis::X), 1.0);
        assert_eq!(guide.distance(&b, Axis::Y), f64::INFINITY);
    }

    #[test]
    fn test_same_dimension_sign_follows_dragged_edge() {
        let b = Bounds::new(10.0, 0.0, 32.0, 10.0);
        let right = SnapGuide::SameDimension {
            other: ElementId(2),
            edge: Edge::Right,
            length: 30.0,
        };
        let left = SnapGuide::SameDimension {
            other: ElementId(2),
            edge: Edge::Left,
            length: 30.0,
        };
        // Right edge moves back by 2; left edge moves forward by 2
        assert_eq!(right.distance(&b, Axis::X), 2.0);
        assert_eq!(left.distance(&b, Axis::X), -2.0);
        assert_eq!(b.moved_edges(Edges::LEFT, 2.0, 0.0).width, 30.0);
    }

    #[test]
    fn test_collect_excludes_selected_and_filters_by_edges() {
        let (tree, ids) = tree_with(&[
            Bounds::new(0.1, 0.1, 0.2, 0.2),
            Bounds::new(0.5, 0.1, 0.2, 0.2),
        ]);
        let guides = collect_guides(&tree, &frame(), &[ids[0]], Edges::RIGHT);
        assert!(!guides.is_empty());
        assert!(guides.iter().all(|g| g.axis() == Axis::X));
        assert!(guides.iter().all(|g| match g {
            SnapGuide::SameEdge { other, edge, .. } => *other == ids[1] && *edge == Edge::Right,
            SnapGuide::SameDimension { edge, .. } => *edge == Edge::Right,
            SnapGuide::SameCenter { .. } => false,
            SnapGuide::SameBorder { edge, .. } => *edge == Edge::Right,
        }));
    }

    #[test]
    fn test_best_offsets_per_axis() {
        let guides = [
            SnapGuide::SameEdge {
                other: ElementId(2),
                edge: Edge::Left,
                value: 20.0,
            },
            SnapGuide::SameEdge {
                other: ElementId(3),
                edge: Edge::Left,
                value: 24.0,
            },
            SnapGuide::SameEdge {
                other: ElementId(3),
                edge: Edge::Bottom,
                value: 50.0,
            },
        ];
        let b = Bounds::new(23.0, 10.0, 10.0, 10.0);
        assert_eq!(best_offsets(&guides, &b, 10.0), [Some(-1.0), None]);
    }

    #[test]
    fn test_equal_gap_chaining() {
        // Two containers 10 px apart; a third placed 11 px right of the second
        let (tree, ids) = tree_with(&[
            Bounds::new(0.0, 0.0, 0.2, 0.2),
            Bounds::new(0.3, 0.0, 0.2, 0.2),
            Bounds::new(0.61, 0.0, 0.2, 0.2),
        ]);
        let frame = frame();
        let guides = collect_guides(&tree, &frame, &[ids[2]], Edges::MOVE);
        let target = frame.bounds_to_px(&tree.get(ids[2]).unwrap().bounds().unwrap());
        let chained = guides.iter().find(|g| {
            matches!(g, SnapGuide::SameBorder { neighbour, edge: Edge::Left, .. } if *neighbour == ids[1])
        });
        let d = chained.map(|g| g.distance(&target, Axis::X)).unwrap();
        assert!((d - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_active_guides() {
        let guide = SnapGuide::SameCenter {
            other: ElementId(2),
            axis: Axis::Y,
            value: 15.0,
        };
        let b = Bounds::new(0.0, 10.0, 10.0, 10.5);
        assert_eq!(active_guides(&[guide], &b, 1.0), vec![guide]);
        assert!(active_guides(&[guide], &b, 0.1).is_empty());
    }
}
