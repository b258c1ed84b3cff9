//! Update functions for the Elm-style architecture
//!
//! All state transformations flow through these functions.

mod app;
mod edit;
mod grab;
mod select;

use std::fmt;

use crate::commands::Cmd;
use crate::messages::Msg;
use crate::model::AppModel;

#[cfg(debug_assertions)]
use crate::tracing::SessionSnapshot;
#[cfg(debug_assertions)]
use tracing::{debug, span, Level};

pub use app::update_app;
pub use edit::update_edit;
pub use grab::{update_grab, NUDGE_LARGE_STEP_PX, NUDGE_STEP_PX};
pub use select::update_selection;

/// Main update function - dispatches to sub-handlers
///
/// In debug builds, this wraps with tracing instrumentation.
/// In release builds, it's a direct dispatch with zero overhead.
#[inline]
pub fn update(model: &mut AppModel, msg: Msg) -> Option<Cmd> {
    #[cfg(debug_assertions)]
    {
        update_traced(model, msg)
    }
    #[cfg(not(debug_assertions))]
    {
        update_inner(model, msg)
    }
}

/// Inner update logic (no tracing)
fn update_inner(model: &mut AppModel, msg: Msg) -> Option<Cmd> {
    let was_dirty = model.is_dirty();

    let result = match msg {
        Msg::Selection(m) => select::update_selection(model, m),
        Msg::Grab(m) => grab::update_grab(model, m),
        Msg::Edit(m) => edit::update_edit(model, m),
        Msg::App(m) => app::update_app(model, m),
    };

    let is_dirty = model.is_dirty();
    if is_dirty == was_dirty {
        return result;
    }
    Some(Cmd::batch(vec![
        result.unwrap_or_default(),
        Cmd::LedgerDirtyChanged(is_dirty),
    ]))
}

/// Log a failed operation and turn it into a notification for the front end
pub(crate) fn report(action: &str, err: impl fmt::Display) -> Option<Cmd> {
    tracing::warn!(%err, "{} failed", action);
    Some(Cmd::Error(format!("{}: {}", action, err)))
}

/// Traced update wrapper (debug builds only)
///
/// Captures before/after session state and logs diffs for debugging.
/// Pointer motion is not logged; it arrives at display rate.
#[cfg(debug_assertions)]
fn update_traced(model: &mut AppModel, msg: Msg) -> Option<Cmd> {
    use crate::messages::GrabMsg;

    let is_noisy = matches!(&msg, Msg::Grab(GrabMsg::Motion(_)));

    let msg_name = msg_type_name(&msg);
    let _span = if is_noisy {
        None
    } else {
        Some(span!(Level::DEBUG, "update", msg = %msg_name).entered())
    };

    let before = SessionSnapshot::from_model(model);

    if !is_noisy {
        debug!(target: "message", msg = %msg_name, "processing");
    }

    let result = update_inner(model, msg);

    let after = SessionSnapshot::from_model(model);
    if let Some(diff) = before.diff(&after) {
        debug!(target: "session", %diff, "state changed");
    }

    result
}

/// Get a display name for a message type
///
/// Uses Debug formatting to include variant names and arguments.
/// Example outputs:
/// - `Selection::Pick(ElementId(3))`
/// - `App::Undo`
#[cfg(debug_assertions)]
fn msg_type_name(msg: &Msg) -> String {
    match msg {
        Msg::Selection(m) => format!("Selection::{:?}", m),
        Msg::Grab(m) => format!("Grab::{:?}", m),
        Msg::Edit(m) => format!("Edit::{:?}", m),
        Msg::App(m) => format!("App::{:?}", m),
    }
}
