//! Element model - the drawable tree the editor manipulates
//!
//! Elements live in an arena keyed by [`ElementId`]. Handles are never reused,
//! so a handle held by a stale undo entry or a ledger snapshot can only ever
//! point at the element it was taken from, or at nothing.

use std::collections::HashMap;
use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::geometry::{Axis, Bounds, Frame, Point, Size};
use crate::error::{EditError, Result};

// ============================================================================
// Identifiers and kinds
// ============================================================================

/// Stable handle of an element in the arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// The figure itself
    Root,
    /// A set of axes
    Container,
    /// A rectangle patch
    Shape,
    /// Free text, an annotation, or an axis label
    TextLabel,
    Legend,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        const POSITION = 1;
        const SIZE = 1 << 1;
        const TEXT = 1 << 2;
        const CHILDREN = 1 << 3;
    }
}

impl ElementKind {
    pub fn capabilities(self) -> Capabilities {
        match self {
            ElementKind::Root => Capabilities::SIZE | Capabilities::CHILDREN,
            ElementKind::Container => {
                Capabilities::POSITION | Capabilities::SIZE | Capabilities::CHILDREN
            }
            ElementKind::Shape => Capabilities::POSITION | Capabilities::SIZE,
            ElementKind::TextLabel => Capabilities::POSITION | Capabilities::TEXT,
            ElementKind::Legend => Capabilities::POSITION,
        }
    }

    /// Whether texts, shapes and legends can be attached to this kind
    pub fn can_own(self) -> bool {
        matches!(self, ElementKind::Root | ElementKind::Container)
    }
}

// ============================================================================
// Mutable element state
// ============================================================================

/// Kind-specific geometry, all in figure-relative units except the figure size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Figure {
        size_cm: Size,
    },
    Box {
        bounds: Bounds,
    },
    Text {
        position: Point,
        /// Rendered extent, as measured by the host
        extent: Size,
        rotation: f64,
        /// Point the annotation arrow refers to; `None` for plain text
        anchor: Option<Point>,
    },
    Legend {
        position: Point,
        extent: Size,
    },
}

/// Everything an edit can change on one element, captured by value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementState {
    pub geometry: Geometry,
    pub text: Option<String>,
    pub visible: bool,
}

impl ElementState {
    fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            text: None,
            visible: true,
        }
    }
}

/// Ordered child lists; the order is what reference paths index into
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Children {
    pub containers: Vec<ElementId>,
    pub texts: Vec<ElementId>,
    pub shapes: Vec<ElementId>,
    pub legends: Vec<ElementId>,
    pub x_label: Option<ElementId>,
    pub y_label: Option<ElementId>,
}

impl Children {
    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.containers
            .iter()
            .chain(&self.texts)
            .chain(&self.shapes)
            .chain(&self.legends)
            .chain(self.x_label.iter())
            .chain(self.y_label.iter())
            .copied()
    }

    /// Unlink `id` from whichever list holds it
    fn detach(&mut self, id: ElementId) -> bool {
        for list in [
            &mut self.containers,
            &mut self.texts,
            &mut self.shapes,
            &mut self.legends,
        ] {
            if let Some(idx) = list.iter().position(|&c| c == id) {
                list.remove(idx);
                return true;
            }
        }
        if self.x_label == Some(id) {
            self.x_label = None;
            return true;
        }
        if self.y_label == Some(id) {
            self.y_label = None;
            return true;
        }
        false
    }
}

/// A node of the drawable tree
#[derive(Debug, Clone)]
pub struct Element {
    pub id: ElementId,
    pub kind: ElementKind,
    /// Navigation only; the arena owns every element
    pub parent: Option<ElementId>,
    pub children: Children,
    /// User label of a container, used for label-keyed reference paths
    pub label: Option<String>,
    pub pickable: bool,
    /// Resizing keeps the width:height proportion when the aspect modifier is held
    pub fixed_aspect: bool,
    pub state: ElementState,
}

impl Element {
    pub fn bounds(&self) -> Option<Bounds> {
        match self.state.geometry {
            Geometry::Box { bounds } => Some(bounds),
            Geometry::Text {
                position, extent, ..
            }
            | Geometry::Legend { position, extent } => Some(Bounds::new(
                position.x,
                position.y,
                extent.width,
                extent.height,
            )),
            Geometry::Figure { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.state.text.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    pub fn is_annotation(&self) -> bool {
        matches!(
            self.state.geometry,
            Geometry::Text {
                anchor: Some(_),
                ..
            }
        )
    }
}

// ============================================================================
// Arena
// ============================================================================

/// The figure and everything attached to it
#[derive(Debug, Clone)]
pub struct ElementTree {
    elements: HashMap<ElementId, Element>,
    root: ElementId,
    figure_number: u32,
    next_id: u64,
}

impl ElementTree {
    /// Create a tree holding only a figure of the given physical size
    pub fn new(figure_number: u32, size_cm: Size) -> Self {
        let root = ElementId(1);
        let mut elements = HashMap::new();
        elements.insert(
            root,
            Element {
                id: root,
                kind: ElementKind::Root,
                parent: None,
                children: Children::default(),
                label: None,
                pickable: false,
                fixed_aspect: false,
                state: ElementState::new(Geometry::Figure { size_cm }),
            },
        );
        Self {
            elements,
            root,
            figure_number,
            next_id: 2,
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn figure_number(&self) -> u32 {
        self.figure_number
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    /// Like [`get`](Self::get), failing with `DetachedElement` for unknown handles
    pub fn element(&self, id: ElementId) -> Result<&Element> {
        self.elements.get(&id).ok_or(EditError::DetachedElement(id))
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element> {
        self.elements
            .get_mut(&id)
            .ok_or(EditError::DetachedElement(id))
    }

    pub fn root_element(&self) -> &Element {
        &self.elements[&self.root]
    }

    pub fn containers(&self) -> &[ElementId] {
        &self.root_element().children.containers
    }

    pub fn figure_size_cm(&self) -> Size {
        match self.root_element().state.geometry {
            Geometry::Figure { size_cm } => size_cm,
            _ => Size::default(),
        }
    }

    pub fn set_figure_size_cm(&mut self, size_cm: Size) -> Result<()> {
        if !size_cm.is_positive() {
            return Err(EditError::InvalidFigureSize(size_cm));
        }
        let root = self.root;
        if let Some(el) = self.elements.get_mut(&root) {
            el.state.geometry = Geometry::Figure { size_cm };
        }
        Ok(())
    }

    /// Pixel frame of the figure rendered at `dpi`
    pub fn frame(&self, dpi: f64) -> Frame {
        Frame::from_figure_size(self.figure_size_cm(), dpi)
    }

    pub fn state(&self, id: ElementId) -> Option<&ElementState> {
        self.elements.get(&id).map(|el| &el.state)
    }

    /// Overwrite an element's state; returns false when the element is gone
    pub fn set_state(&mut self, id: ElementId, state: ElementState) -> bool {
        match self.elements.get_mut(&id) {
            Some(el) => {
                el.state = state;
                true
            }
            None => false,
        }
    }

    pub fn set_text(&mut self, id: ElementId, text: &str) -> Result<()> {
        let el = self.element_mut(id)?;
        if !el.kind.capabilities().contains(Capabilities::TEXT) {
            return Err(EditError::NotATarget(id));
        }
        el.state.text = Some(text.to_string());
        Ok(())
    }

    pub fn set_rotation(&mut self, id: ElementId, degrees: f64) -> Result<()> {
        let el = self.element_mut(id)?;
        match &mut el.state.geometry {
            Geometry::Text { rotation, .. } => {
                *rotation = degrees;
                Ok(())
            }
            _ => Err(EditError::NotATarget(id)),
        }
    }

    /// Record the extent the host measured for a text or legend
    pub fn set_extent(&mut self, id: ElementId, size: Size) -> Result<()> {
        let el = self.element_mut(id)?;
        match &mut el.state.geometry {
            Geometry::Text { extent, .. } | Geometry::Legend { extent, .. } => {
                *extent = size;
                Ok(())
            }
            _ => Err(EditError::NotATarget(id)),
        }
    }

    pub fn set_visible(&mut self, id: ElementId, visible: bool) -> Result<()> {
        self.element_mut(id)?.state.visible = visible;
        Ok(())
    }

    pub fn set_pickable(&mut self, id: ElementId, pickable: bool) -> Result<()> {
        self.element_mut(id)?.pickable = pickable;
        Ok(())
    }

    pub fn set_fixed_aspect(&mut self, id: ElementId, fixed: bool) -> Result<()> {
        self.element_mut(id)?.fixed_aspect = fixed;
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    fn next_id(&mut self) -> ElementId {
        let id = ElementId(self.next_id);
        self.next_id += 1;
        id
    }

    fn insert(
        &mut self,
        kind: ElementKind,
        parent: ElementId,
        geometry: Geometry,
        text: Option<String>,
    ) -> ElementId {
        let id = self.next_id();
        let mut state = ElementState::new(geometry);
        state.text = text;
        self.elements.insert(
            id,
            Element {
                id,
                kind,
                parent: Some(parent),
                children: Children::default(),
                label: None,
                pickable: true,
                fixed_aspect: false,
                state,
            },
        );
        id
    }

    fn owner_children(&mut self, owner: ElementId) -> Result<&mut Children> {
        let el = self.element_mut(owner)?;
        if !el.kind.can_own() {
            return Err(EditError::InvalidOwner(owner));
        }
        Ok(&mut el.children)
    }

    /// Append a container (axes) to the figure
    pub fn add_container(&mut self, bounds: Bounds, label: Option<&str>) -> ElementId {
        let root = self.root;
        let id = self.insert(ElementKind::Container, root, Geometry::Box { bounds }, None);
        if let Some(el) = self.elements.get_mut(&id) {
            el.label = label.filter(|l| !l.is_empty()).map(str::to_string);
        }
        if let Some(root_el) = self.elements.get_mut(&root) {
            root_el.children.containers.push(id);
        }
        id
    }

    /// Append a text to the text list of the figure or of a container
    pub fn add_text(&mut self, owner: ElementId, position: Point, text: &str) -> Result<ElementId> {
        self.owner_children(owner)?;
        let id = self.insert(
            ElementKind::TextLabel,
            owner,
            Geometry::Text {
                position,
                extent: Size::default(),
                rotation: 0.0,
                anchor: None,
            },
            Some(text.to_string()),
        );
        self.owner_children(owner)?.texts.push(id);
        Ok(id)
    }

    /// Append an annotation: a text at `position` pointing at `anchor`
    pub fn add_annotation(
        &mut self,
        owner: ElementId,
        text: &str,
        anchor: Point,
        position: Point,
    ) -> Result<ElementId> {
        self.owner_children(owner)?;
        let id = self.insert(
            ElementKind::TextLabel,
            owner,
            Geometry::Text {
                position,
                extent: Size::default(),
                rotation: 0.0,
                anchor: Some(anchor),
            },
            Some(text.to_string()),
        );
        self.owner_children(owner)?.texts.push(id);
        Ok(id)
    }

    /// Create (or replace) the x or y axis label of a container
    pub fn set_axis_label(
        &mut self,
        container: ElementId,
        axis: Axis,
        text: &str,
        position: Point,
    ) -> Result<ElementId> {
        if self.element(container)?.kind != ElementKind::Container {
            return Err(EditError::InvalidOwner(container));
        }
        let id = self.insert(
            ElementKind::TextLabel,
            container,
            Geometry::Text {
                position,
                extent: Size::default(),
                rotation: 0.0,
                anchor: None,
            },
            Some(text.to_string()),
        );
        let children = self.owner_children(container)?;
        let slot = match axis {
            Axis::X => &mut children.x_label,
            Axis::Y => &mut children.y_label,
        };
        let previous = slot.replace(id);
        if let Some(old) = previous {
            self.elements.remove(&old);
        }
        Ok(id)
    }

    /// Append a rectangle to the shape list of the figure or of a container
    pub fn add_shape(&mut self, owner: ElementId, bounds: Bounds) -> Result<ElementId> {
        self.owner_children(owner)?;
        let id = self.insert(ElementKind::Shape, owner, Geometry::Box { bounds }, None);
        self.owner_children(owner)?.shapes.push(id);
        Ok(id)
    }

    pub fn add_legend(&mut self, owner: ElementId, position: Point, extent: Size) -> Result<ElementId> {
        self.owner_children(owner)?;
        let id = self.insert(
            ElementKind::Legend,
            owner,
            Geometry::Legend { position, extent },
            None,
        );
        self.owner_children(owner)?.legends.push(id);
        Ok(id)
    }

    /// Detach an element and drop it together with its subtree
    ///
    /// Returns the handles of every element that was dropped. The figure
    /// itself cannot be removed.
    pub fn remove(&mut self, id: ElementId) -> Result<Vec<ElementId>> {
        if id == self.root {
            return Err(EditError::NotATarget(id));
        }
        let parent = self.element(id)?.parent;
        if let Some(parent_el) = parent.and_then(|p| self.elements.get_mut(&p)) {
            parent_el.children.detach(id);
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(el) = self.elements.remove(&next) {
                stack.extend(el.children.iter());
                removed.push(next);
            }
        }
        Ok(removed)
    }
}
