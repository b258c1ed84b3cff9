//! Geometry primitives shared by the element model and the manipulation engine
//!
//! Element geometry lives in figure-relative units: 0..1 along each axis with the
//! origin in the bottom-left corner of the figure. Device pixels only appear in
//! the interactive transform math (see [`Frame`]), centimetres only at the
//! figure-size boundary.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Centimetres per inch, used when serializing figure sizes
pub const CM_PER_INCH: f64 = 2.54;

/// Decimal places kept for every committed coordinate
pub const COORD_DECIMALS: i32 = 6;

/// Round a figure-relative coordinate to the precision the generated code carries
///
/// Committed geometry always goes through this, so the live tree holds exactly
/// the values the saved statements will reproduce.
#[inline]
pub fn round_coord(v: f64) -> f64 {
    let scale = 10f64.powi(COORD_DECIMALS);
    let rounded = (v * scale).round() / scale;
    // Avoid writing "-0.000000"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

// ============================================================================
// Points and sizes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn along(self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    pub fn rounded(self) -> Self {
        Self::new(round_coord(self.x), round_coord(self.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Both dimensions finite and strictly positive
    pub fn is_positive(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Horizontal or vertical axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const BOTH: [Axis; 2] = [Axis::X, Axis::Y];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

// ============================================================================
// Edges
// ============================================================================

/// One side of a bounding box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Left,
    Bottom,
    Right,
    Top,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::Left, Edge::Bottom, Edge::Right, Edge::Top];

    pub fn axis(self) -> Axis {
        match self {
            Edge::Left | Edge::Right => Axis::X,
            Edge::Bottom | Edge::Top => Axis::Y,
        }
    }

    pub fn flag(self) -> Edges {
        match self {
            Edge::Left => Edges::LEFT,
            Edge::Bottom => Edges::BOTTOM,
            Edge::Right => Edges::RIGHT,
            Edge::Top => Edges::TOP,
        }
    }

    /// The edge at the low end of the axis (left or bottom)
    pub fn is_leading(self) -> bool {
        matches!(self, Edge::Left | Edge::Bottom)
    }
}

bitflags! {
    /// Edge-direction bitmask a grabber drags
    ///
    /// A handle dragging every edge moves the box; any other subset resizes it.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Edges: u8 {
        const LEFT = 1;
        const BOTTOM = 1 << 1;
        const RIGHT = 1 << 2;
        const TOP = 1 << 3;
    }
}

impl Edges {
    /// Handle that translates the box instead of resizing it
    pub const MOVE: Edges = Edges::all();

    pub fn is_move(self) -> bool {
        self == Self::MOVE
    }

    /// Edges of this mask lying on `axis`
    pub fn on_axis(self, axis: Axis) -> Edges {
        match axis {
            Axis::X => self & (Edges::LEFT | Edges::RIGHT),
            Axis::Y => self & (Edges::BOTTOM | Edges::TOP),
        }
    }

    /// Both edges of `axis` are dragged, so the box translates along it
    pub fn translates(self, axis: Axis) -> bool {
        self.on_axis(axis).bits().count_ones() == 2
    }

    /// The single dragged edge on `axis`, if the handle resizes along it
    pub fn resizing_edge(self, axis: Axis) -> Option<Edge> {
        let on_axis = self.on_axis(axis);
        Edge::ALL
            .into_iter()
            .find(|edge| edge.axis() == axis && on_axis == edge.flag())
    }
}

// ============================================================================
// Bounds
// ============================================================================

/// Axis-aligned box stored as origin plus extent, the layout `set_position` takes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Box spanned by two opposite corners, in any order
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self::from_edges(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    pub fn from_edges(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (y0, y1) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Smallest box containing every point, `None` for an empty slice
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut x0, mut y0, mut x1, mut y1) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            x0 = x0.min(p.x);
            y0 = y0.min(p.y);
            x1 = x1.max(p.x);
            y1 = y1.max(p.y);
        }
        Some(Self::from_edges(x0, y0, x1, y1))
    }

    pub fn x1(&self) -> f64 {
        self.x + self.width
    }

    pub fn y1(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn far_corner(&self) -> Point {
        Point::new(self.x1(), self.y1())
    }

    pub fn edge(&self, edge: Edge) -> f64 {
        match edge {
            Edge::Left => self.x,
            Edge::Bottom => self.y,
            Edge::Right => self.x1(),
            Edge::Top => self.y1(),
        }
    }

    pub fn center(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.x + self.width / 2.0,
            Axis::Y => self.y + self.height / 2.0,
        }
    }

    pub fn length(&self, axis: Axis) -> f64 {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
        }
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds::from_edges(
            self.x.min(other.x),
            self.y.min(other.y),
            self.x1().max(other.x1()),
            self.y1().max(other.y1()),
        )
    }

    /// Shift the given edges by `(dx, dy)`, leaving the others in place
    pub fn moved_edges(&self, edges: Edges, dx: f64, dy: f64) -> Bounds {
        let mut x0 = self.x;
        let mut y0 = self.y;
        let mut x1 = self.x1();
        let mut y1 = self.y1();
        if edges.contains(Edges::LEFT) {
            x0 += dx;
        }
        if edges.contains(Edges::RIGHT) {
            x1 += dx;
        }
        if edges.contains(Edges::BOTTOM) {
            y0 += dy;
        }
        if edges.contains(Edges::TOP) {
            y1 += dy;
        }
        Bounds::from_edges(x0, y0, x1, y1)
    }

    pub fn rounded(&self) -> Bounds {
        Bounds::new(
            round_coord(self.x),
            round_coord(self.y),
            round_coord(self.width),
            round_coord(self.height),
        )
    }
}

// ============================================================================
// Affine transform
// ============================================================================

/// Scale-and-translate map, the only transform a grab can produce
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub sx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        sx: 1.0,
        sy: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            tx: dx,
            ty: dy,
            ..Self::IDENTITY
        }
    }

    /// Map taking `from` onto `to`
    ///
    /// A degenerate extent on `from` keeps scale 1 on that axis so points are
    /// only translated.
    pub fn between(from: &Bounds, to: &Bounds) -> Self {
        let sx = if from.width.abs() > f64::EPSILON {
            to.width / from.width
        } else {
            1.0
        };
        let sy = if from.height.abs() > f64::EPSILON {
            to.height / from.height
        } else {
            1.0
        };
        Self {
            sx,
            sy,
            tx: to.x - from.x * sx,
            ty: to.y - from.y * sy,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.sx + self.tx, p.y * self.sy + self.ty)
    }

    pub fn apply_bounds(&self, b: &Bounds) -> Bounds {
        Bounds::from_corners(self.apply(b.origin()), self.apply(b.far_corner()))
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

// ============================================================================
// Frame: unit conversion
// ============================================================================

/// Pixel extent of the figure, for converting between figure-relative units and
/// device pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    pub width_px: f64,
    pub height_px: f64,
}

impl Frame {
    pub fn new(width_px: f64, height_px: f64) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    /// Frame of a figure measured in centimetres, rendered at `dpi`
    pub fn from_figure_size(size_cm: Size, dpi: f64) -> Self {
        Self::new(
            size_cm.width / CM_PER_INCH * dpi,
            size_cm.height / CM_PER_INCH * dpi,
        )
    }

    /// False when a pixel extent is zero, negative or not finite
    pub fn is_usable(&self) -> bool {
        Size::new(self.width_px, self.height_px).is_positive()
    }

    pub fn to_px(&self, p: Point) -> Point {
        Point::new(p.x * self.width_px, p.y * self.height_px)
    }

    pub fn from_px(&self, p: Point) -> Point {
        Point::new(p.x / self.width_px, p.y / self.height_px)
    }

    pub fn bounds_to_px(&self, b: &Bounds) -> Bounds {
        Bounds::from_corners(self.to_px(b.origin()), self.to_px(b.far_corner()))
    }

    pub fn bounds_from_px(&self, b: &Bounds) -> Bounds {
        Bounds::from_corners(self.from_px(b.origin()), self.from_px(b.far_corner()))
    }
}

/// Device pixels at `dpi` to centimetres
pub fn px_to_cm(px: f64, dpi: f64) -> f64 {
    px / dpi * CM_PER_INCH
}

pub fn cm_to_px(cm: f64, dpi: f64) -> f64 {
    cm / CM_PER_INCH * dpi
}
