//! Application message handlers (save, undo/redo, reload)

use crate::commands::Cmd;
use crate::messages::AppMsg;
use crate::model::{AppModel, ElementId};

use super::report;

/// Handle application messages
pub fn update_app(model: &mut AppModel, msg: AppMsg) -> Option<Cmd> {
    if model.grabber.is_dragging() {
        tracing::debug!(?msg, "ignoring app message during drag");
        return None;
    }

    match msg {
        AppMsg::Save => {
            let Some(document) = model.document.as_mut() else {
                return report("Save", "no document attached");
            };
            match model.ledger.save(document, &model.tree) {
                Ok(()) => None,
                Err(err) => report("Save", err),
            }
        }

        AppMsg::Undo => {
            let touched = model.history.undo(&mut model.tree, &mut model.ledger)?;
            Some(after_history(model, touched))
        }

        AppMsg::Redo => {
            let touched = model.history.redo(&mut model.tree, &mut model.ledger)?;
            Some(after_history(model, touched))
        }

        AppMsg::Reload => match model.reload() {
            Ok(Some(loaded)) => {
                tracing::info!(
                    recognized = loaded.recognized,
                    preserved = loaded.preserved,
                    "reloaded generated block"
                );
                None
            }
            Ok(None) => None,
            Err(err) => report("Reload", err),
        },
    }
}

fn after_history(model: &mut AppModel, touched: Vec<ElementId>) -> Cmd {
    // Outline captured by an earlier manipulation no longer matches the tree
    model.selection.end();
    let mut cmds = vec![Cmd::GeometryChanged(touched)];
    if model.selection.prune(&model.tree) {
        cmds.push(Cmd::SelectionChanged(model.selection.ids()));
    }
    Cmd::batch(cmds)
}
