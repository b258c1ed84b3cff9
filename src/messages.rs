//! Message types for the Elm-style architecture
//!
//! All state changes flow through these message types.

use crate::manipulate::{Modifiers, PointerEvent};
use crate::model::{Bounds, Edges, ElementId, Point, Size};

/// Direction for keyboard nudges
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit step in device pixels; y grows upwards like figure coordinates
    pub fn unit(self) -> (f64, f64) {
        match self {
            Direction::Up => (0.0, 1.0),
            Direction::Down => (0.0, -1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }
}

/// Selection messages (picking elements in the figure)
#[derive(Debug, Clone)]
pub enum SelectionMsg {
    /// Replace the selection with a single element
    Pick(ElementId),
    /// Add the element, or remove it when already selected (shift-click)
    Toggle(ElementId),
    /// Deselect everything (Escape)
    Clear,
}

/// Grabber messages (dragging handles and the selection body)
#[derive(Debug, Clone)]
pub enum GrabMsg {
    /// Pointer pressed on a handle; `edges` is empty for the body
    Press { at: Point, edges: Edges },
    Motion(PointerEvent),
    Release(PointerEvent),
    /// Move the selection by a fixed pixel step (arrow keys)
    Nudge { direction: Direction, large: bool },
}

/// Property edits and structural changes
#[derive(Debug, Clone)]
pub enum EditMsg {
    SetText { id: ElementId, text: String },
    SetRotation { id: ElementId, degrees: f64 },
    /// New figure size in centimetres
    SetFigureSize(Size),
    Remove(ElementId),
    RemoveSelected,
    AddText {
        owner: ElementId,
        position: Point,
        text: String,
    },
    AddAnnotation {
        owner: ElementId,
        text: String,
        anchor: Point,
        position: Point,
    },
    AddRectangle { owner: ElementId, bounds: Bounds },
}

/// Application-level messages (file operations, history)
#[derive(Debug, Clone)]
pub enum AppMsg {
    /// Write the generated block into the document
    Save,
    Undo,
    Redo,
    /// Re-read the generated block from disk, discarding unsaved changes
    Reload,
}

/// Top-level message type
#[derive(Debug, Clone)]
pub enum Msg {
    Selection(SelectionMsg),
    Grab(GrabMsg),
    Edit(EditMsg),
    App(AppMsg),
}

impl Msg {
    pub fn pick(id: ElementId) -> Self {
        Msg::Selection(SelectionMsg::Pick(id))
    }

    pub fn toggle(id: ElementId) -> Self {
        Msg::Selection(SelectionMsg::Toggle(id))
    }

    pub fn press(x: f64, y: f64, edges: Edges) -> Self {
        Msg::Grab(GrabMsg::Press {
            at: Point::new(x, y),
            edges,
        })
    }

    pub fn motion(x: f64, y: f64) -> Self {
        Msg::Grab(GrabMsg::Motion(PointerEvent::at(x, y)))
    }

    pub fn motion_with(x: f64, y: f64, modifiers: Modifiers) -> Self {
        Msg::Grab(GrabMsg::Motion(
            PointerEvent::at(x, y).with_modifiers(modifiers),
        ))
    }

    pub fn release(x: f64, y: f64) -> Self {
        Msg::Grab(GrabMsg::Release(PointerEvent::at(x, y)))
    }

    pub fn release_with(x: f64, y: f64, modifiers: Modifiers) -> Self {
        Msg::Grab(GrabMsg::Release(
            PointerEvent::at(x, y).with_modifiers(modifiers),
        ))
    }

    pub fn nudge(direction: Direction) -> Self {
        Msg::Grab(GrabMsg::Nudge {
            direction,
            large: false,
        })
    }

    pub fn save() -> Self {
        Msg::App(AppMsg::Save)
    }

    pub fn undo() -> Self {
        Msg::App(AppMsg::Undo)
    }

    pub fn redo() -> Self {
        Msg::App(AppMsg::Redo)
    }
}
