//! Selection message handlers

use crate::commands::Cmd;
use crate::manipulate::Selection;
use crate::messages::SelectionMsg;
use crate::model::AppModel;

use super::report;

/// Handle selection messages
///
/// The selection is frozen while a drag is in progress.
pub fn update_selection(model: &mut AppModel, msg: SelectionMsg) -> Option<Cmd> {
    if model.grabber.is_dragging() {
        tracing::debug!(?msg, "ignoring selection change during drag");
        return None;
    }

    match msg {
        SelectionMsg::Pick(id) => {
            if model.selection.ids() == [id] {
                return None;
            }
            let mut selection = Selection::new();
            if let Err(err) = selection.add(&model.tree, id) {
                return report("Select", err);
            }
            model.selection = selection;
            Some(Cmd::SelectionChanged(model.selection.ids()))
        }

        SelectionMsg::Toggle(id) => match model.selection.toggle(&model.tree, id) {
            Ok(_) => Some(Cmd::SelectionChanged(model.selection.ids())),
            Err(err) => report("Select", err),
        },

        SelectionMsg::Clear => {
            if model.selection.is_empty() {
                return None;
            }
            model.selection.clear();
            Some(Cmd::SelectionChanged(Vec::new()))
        }
    }
}
