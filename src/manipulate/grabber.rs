//! Grabber state machine: `Idle -> Dragging -> Idle`
//!
//! Transitions are pure. They take pointer events by value and return the next
//! state plus the transform the caller should apply to the selection; the
//! caller performs every geometry and ledger side effect.

use super::snap::{self, SnapGuide};
use crate::model::{Affine, Axis, Bounds, Edges, Frame, Point};

/// Keyboard modifiers held during a drag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub disable_snapping: bool,
    pub keep_aspect: bool,
}

/// Pointer position in device pixels plus the held modifiers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub at: Point,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            at: Point::new(x, y),
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapSettings {
    pub enabled: bool,
    /// Guides closer than this pull the drag onto them
    pub threshold_px: f64,
    /// Guides closer than this are reported for rendering
    pub active_threshold_px: f64,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_px: 10.0,
            active_threshold_px: 1.0,
        }
    }
}

/// An ongoing drag
#[derive(Debug, Clone, PartialEq)]
pub struct Drag {
    pub edges: Edges,
    pub frame: Frame,
    /// Pointer position at press
    pub press_px: Point,
    /// Selection outline at press, figure units
    pub start: Bounds,
    start_px: Bounds,
    /// Selection outline after the last motion, device pixels
    pub current_px: Bounds,
    pub guides: Vec<SnapGuide>,
    pub fixed_aspect: bool,
}

impl Drag {
    /// Outline in device pixels for the pointer at `event`
    fn resolve(&self, event: &PointerEvent, settings: &SnapSettings) -> Bounds {
        let mut dx = event.at.x - self.press_px.x;
        let mut dy = event.at.y - self.press_px.y;
        let mut moved = self.start_px.moved_edges(self.edges, dx, dy);

        if settings.enabled && !event.modifiers.disable_snapping {
            let [snap_x, snap_y] = snap::best_offsets(&self.guides, &moved, settings.threshold_px);
            if snap_x.is_some() || snap_y.is_some() {
                dx -= snap_x.unwrap_or(0.0);
                dy -= snap_y.unwrap_or(0.0);
                moved = self.start_px.moved_edges(self.edges, dx, dy);
            }
        }

        if event.modifiers.keep_aspect && self.fixed_aspect {
            moved = lock_aspect(&self.start_px, &moved, self.edges);
        }
        moved
    }

    /// Transform taking the start outline onto `outline_px`
    fn transform_to(&self, outline_px: &Bounds) -> Affine {
        let target = self.frame.bounds_from_px(outline_px).rounded();
        if self.edges.is_move() {
            Affine::translation(target.x - self.start.x, target.y - self.start.y)
        } else {
            Affine::between(&self.start, &target)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum GrabberState {
    #[default]
    Idle,
    Dragging(Drag),
}

/// What the caller should do after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum GrabOutcome {
    /// The event does not apply in the current state
    Ignored,
    /// Show the selection mapped through the transform
    Preview(Affine),
    /// Apply the transform, record it and push one undo entry
    Commit(Affine),
}

impl GrabberState {
    /// Start dragging `edges` of a selection whose outline is `start`
    pub fn press(
        edges: Edges,
        at: Point,
        start: Bounds,
        frame: Frame,
        guides: Vec<SnapGuide>,
        fixed_aspect: bool,
    ) -> Self {
        let start_px = frame.bounds_to_px(&start);
        tracing::debug!(?edges, guides = guides.len(), "drag started");
        GrabberState::Dragging(Drag {
            edges,
            frame,
            press_px: at,
            start,
            start_px,
            current_px: start_px,
            guides,
            fixed_aspect,
        })
    }

    pub fn motion(self, event: PointerEvent, settings: &SnapSettings) -> (Self, GrabOutcome) {
        match self {
            GrabberState::Idle => (GrabberState::Idle, GrabOutcome::Ignored),
            GrabberState::Dragging(mut drag) => {
                drag.current_px = drag.resolve(&event, settings);
                let transform = drag.transform_to(&drag.current_px);
                (GrabberState::Dragging(drag), GrabOutcome::Preview(transform))
            }
        }
    }

    /// Finish the drag; guides are dropped with the drag state
    pub fn release(self, event: PointerEvent, settings: &SnapSettings) -> (Self, GrabOutcome) {
        match self {
            GrabberState::Idle => (GrabberState::Idle, GrabOutcome::Ignored),
            GrabberState::Dragging(drag) => {
                let outline = drag.resolve(&event, settings);
                let transform = drag.transform_to(&outline);
                tracing::debug!(?transform, "drag released");
                (GrabberState::Idle, GrabOutcome::Commit(transform))
            }
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, GrabberState::Dragging(_))
    }

    pub fn drag(&self) -> Option<&Drag> {
        match self {
            GrabberState::Dragging(drag) => Some(drag),
            GrabberState::Idle => None,
        }
    }

    /// Guides the current outline satisfies, for the front end to draw
    pub fn active_guides(&self, settings: &SnapSettings) -> Vec<SnapGuide> {
        match self {
            GrabberState::Dragging(drag) => snap::active_guides(
                &drag.guides,
                &drag.current_px,
                settings.active_threshold_px,
            ),
            GrabberState::Idle => Vec::new(),
        }
    }
}

/// Keep the width:height proportion of `start` while resizing
///
/// The dragged dimension wins; the other is derived from it and grows away from
/// the edge that is held in place.
pub fn lock_aspect(start: &Bounds, moved: &Bounds, edges: Edges) -> Bounds {
    if edges.is_move() || start.width <= f64::EPSILON || start.height <= f64::EPSILON {
        return *moved;
    }
    let ratio = start.width / start.height;
    let mut out = *moved;

    if edges.resizing_edge(Axis::X).is_some() {
        out.height = out.width / ratio;
        if edges.contains(Edges::BOTTOM) {
            out.y = moved.y1() - out.height;
        }
    } else if edges.resizing_edge(Axis::Y).is_some() {
        out.width = out.height * ratio;
        if edges.contains(Edges::LEFT) {
            out.x = moved.x1() - out.width;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> Frame {
        Frame::new(100.0, 100.0)
    }

    #[test]
    fn test_idle_ignores_motion_and_release() {
        let settings = SnapSettings::default();
        let (state, outcome) = GrabberState::Idle.motion(PointerEvent::at(1.0, 1.0), &settings);
        assert_eq!(state, GrabberState::Idle);
        assert_eq!(outcome, GrabOutcome::Ignored);
        let (_, outcome) = GrabberState::Idle.release(PointerEvent::at(1.0, 1.0), &settings);
        assert_eq!(outcome, GrabOutcome::Ignored);
    }

    #[test]
    fn test_move_then_release_commits_translation() {
        let settings = SnapSettings::default();
        let start = Bounds::new(0.1, 0.1, 0.2, 0.2);
        let state = GrabberState::press(Edges::MOVE, Point::new(20.0, 20.0), start, frame(), vec![], false);

        let (state, outcome) = state.motion(PointerEvent::at(25.0, 20.0), &settings);
        assert!(state.is_dragging());
        assert!(matches!(outcome, GrabOutcome::Preview(_)));

        let (state, outcome) = state.release(PointerEvent::at(30.0, 30.0), &settings);
        assert_eq!(state, GrabberState::Idle);
        let GrabOutcome::Commit(t) = outcome else {
            panic!("expected commit");
        };
        assert_eq!(t.apply(start.origin()).rounded(), Point::new(0.2, 0.2));
    }

    #[test]
    fn test_snapping_can_be_disabled() {
        let guides = vec![SnapGuide::SameEdge {
            other: crate::model::ElementId(9),
            edge: crate::model::Edge::Left,
            value: 20.0,
        }];
        let start = Bounds::new(0.1, 0.1, 0.2, 0.2);
        let settings = SnapSettings::default();
        let press = || GrabberState::press(Edges::MOVE, Point::new(0.0, 0.0), start, frame(), guides.clone(), false);

        let (_, snapped) = press().release(PointerEvent::at(13.0, 0.0), &settings);
        let (_, free) = press().release(
            PointerEvent::at(13.0, 0.0).with_modifiers(Modifiers {
                disable_snapping: true,
                ..Default::default()
            }),
            &settings,
        );
        let x = |o: GrabOutcome| match o {
            GrabOutcome::Commit(t) => t.apply(start.origin()).rounded().x,
            _ => panic!("expected commit"),
        };
        assert_eq!(x(snapped), 0.2);
        assert_eq!(x(free), 0.23);
    }

    #[test]
    fn test_active_guides_follow_current_outline() {
        let guides = vec![SnapGuide::SameEdge {
            other: crate::model::ElementId(9),
            edge: crate::model::Edge::Bottom,
            value: 10.0,
        }];
        let settings = SnapSettings::default();
        let state = GrabberState::press(
            Edges::MOVE,
            Point::new(0.0, 0.0),
            Bounds::new(0.5, 0.5, 0.1, 0.1),
            frame(),
            guides,
            false,
        );
        assert!(state.active_guides(&settings).is_empty());
        let (state, _) = state.motion(PointerEvent::at(0.0, -38.0), &settings);
        assert_eq!(state.active_guides(&settings).len(), 1);
    }

    #[test]
    fn test_lock_aspect_derives_height_from_width() {
        let start = Bounds::new(10.0, 10.0, 20.0, 10.0);
        let moved = start.moved_edges(Edges::RIGHT, 20.0, 0.0);
        let locked = lock_aspect(&start, &moved, Edges::RIGHT);
        assert_eq!(locked, Bounds::new(10.0, 10.0, 40.0, 20.0));

        let moved = start.moved_edges(Edges::BOTTOM, 0.0, -10.0);
        let locked = lock_aspect(&start, &moved, Edges::BOTTOM);
        assert_eq!(locked, Bounds::new(10.0, 0.0, 40.0, 20.0));
    }

    #[test]
    fn test_lock_aspect_ignores_moves() {
        let start = Bounds::new(10.0, 10.0, 20.0, 10.0);
        let moved = start.moved_edges(Edges::MOVE, 5.0, 5.0);
        assert_eq!(lock_aspect(&start, &moved, Edges::MOVE), moved);
    }
}
