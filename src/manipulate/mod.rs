//! Geometric manipulation engine
//!
//! - [`target`]: per-kind geometry adapter
//! - [`selection`]: the group of targets moved and resized together
//! - [`snap`]: alignment guides against sibling containers
//! - [`grabber`]: the press/motion/release state machine

pub mod grabber;
pub mod selection;
pub mod snap;
pub mod target;

pub use grabber::{lock_aspect, Drag, GrabOutcome, GrabberState, Modifiers, PointerEvent, SnapSettings};
pub use selection::Selection;
pub use snap::{active_guides, best_offsets, collect_guides, SnapGuide};
pub use target::TargetWrapper;
