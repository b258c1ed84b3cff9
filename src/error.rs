//! Error taxonomy for the edit engine
//!
//! Every variant is scoped to the single operation that raised it: the ledger,
//! the element tree and the undo stack are left exactly as they were before the
//! failing call. Lines of the managed region that do not parse are not errors at
//! all; they are carried through verbatim (see `ledger::parser`).

use std::path::PathBuf;

use thiserror::Error;

use crate::model::{ElementId, Size};

#[derive(Debug, Error)]
pub enum EditError {
    /// The element is not reachable from the figure root
    #[error("element {0} is not reachable from the figure root")]
    DetachedElement(ElementId),

    /// A reference path did not name any element of the live tree
    #[error("reference path `{0}` does not name an element")]
    UnresolvedPath(String),

    /// A command text without a leading `.selector(` was handed to the ledger
    #[error("command `{0}` does not start with a property selector")]
    MalformedCommand(String),

    /// The element kind cannot be grabbed, moved or removed (e.g. the figure itself)
    #[error("element {0} cannot be manipulated")]
    NotATarget(ElementId),

    /// New elements can only be attached to the figure or to a container
    #[error("element {0} cannot own texts, shapes or legends")]
    InvalidOwner(ElementId),

    #[error("element {id} takes {expected} positions, got {got}")]
    PositionCount {
        id: ElementId,
        expected: usize,
        got: usize,
    },

    #[error("figure size {}x{} cm is not positive", .0.width, .0.height)]
    InvalidFigureSize(Size),

    /// The figure has no pixel extent to map pointer motion onto
    #[error("figure has no usable pixel extent")]
    DegenerateFrame,

    /// Reading or writing the source document failed
    #[error("I/O failure on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EditError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = EditError> = std::result::Result<T, E>;
