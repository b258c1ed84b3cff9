//! Property edit, creation and removal handlers

use crate::commands::Cmd;
use crate::error::Result;
use crate::history::EditRecorder;
use crate::ledger::statement;
use crate::messages::EditMsg;
use crate::model::{AppModel, ElementId, ElementTree};
use crate::reference;

use super::report;

/// Handle edit messages
pub fn update_edit(model: &mut AppModel, msg: EditMsg) -> Option<Cmd> {
    if model.grabber.is_dragging() {
        tracing::debug!(?msg, "ignoring edit during drag");
        return None;
    }

    match msg {
        EditMsg::SetText { id, text } => {
            let result = edit_property(model, "Set text", id, |tree| {
                tree.set_text(id, &text)?;
                Ok(statement::set_text(&text))
            });
            geometry_or_error(result, "Set text")
        }

        EditMsg::SetRotation { id, degrees } => {
            let result = edit_property(model, "Rotate", id, |tree| {
                tree.set_rotation(id, degrees)?;
                Ok(statement::set_rotation(degrees))
            });
            geometry_or_error(result, "Rotate")
        }

        EditMsg::SetFigureSize(size) => {
            let root = model.tree.root();
            let result = edit_property(model, "Resize figure", root, |tree| {
                tree.set_figure_size_cm(size)?;
                Ok(statement::set_figure_size(size))
            });
            geometry_or_error(result, "Resize figure")
        }

        EditMsg::Remove(id) => remove(model, &[id]),

        EditMsg::RemoveSelected => {
            let ids = model.selection.ids();
            if ids.is_empty() {
                return None;
            }
            remove(model, &ids)
        }

        EditMsg::AddText {
            owner,
            position,
            text,
        } => {
            let position = position.rounded();
            let result = create(model, owner, |tree, root| {
                let id = tree.add_text(owner, position, &text)?;
                Ok((id, statement::create_text(root, position, &text)))
            });
            geometry_or_error(result, "Add text")
        }

        EditMsg::AddAnnotation {
            owner,
            text,
            anchor,
            position,
        } => {
            let (anchor, position) = (anchor.rounded(), position.rounded());
            let result = create(model, owner, |tree, root| {
                let id = tree.add_annotation(owner, &text, anchor, position)?;
                Ok((
                    id,
                    statement::create_annotation(root, &text, anchor, position),
                ))
            });
            geometry_or_error(result, "Add annotation")
        }

        EditMsg::AddRectangle { owner, bounds } => {
            let bounds = bounds.rounded();
            let result = create(model, owner, |tree, root| {
                let id = tree.add_shape(owner, bounds)?;
                Ok((id, statement::create_rectangle(root, &bounds)))
            });
            geometry_or_error(result, "Add rectangle")
        }
    }
}

fn geometry_or_error(result: Result<Vec<ElementId>>, action: &str) -> Option<Cmd> {
    match result {
        Ok(ids) => Some(Cmd::GeometryChanged(ids)),
        Err(err) => report(action, err),
    }
}

/// Change one property of `id` as a single undoable edit
///
/// `apply` mutates the tree and returns the command that reproduces the new
/// value. The element must resolve before anything is touched.
fn edit_property(
    model: &mut AppModel,
    label: &str,
    id: ElementId,
    apply: impl FnOnce(&mut ElementTree) -> Result<String>,
) -> Result<Vec<ElementId>> {
    reference::resolve(&model.tree, id)?;
    let recorder = EditRecorder::begin(label, &[id], &model.tree, &model.ledger);
    let command = apply(&mut model.tree)?;
    model.ledger.add_change(id, command)?;
    if let Some(edit) = recorder.finish(&model.tree, &model.ledger) {
        model.history.push(edit);
    }
    Ok(vec![id])
}

/// Attach a new element to `owner` and record its creation statement
///
/// Creation is not undoable; removing the element again leaves no trace.
fn create(
    model: &mut AppModel,
    owner: ElementId,
    build: impl FnOnce(&mut ElementTree, &reference::ReferencePath) -> Result<(ElementId, String)>,
) -> Result<Vec<ElementId>> {
    reference::resolve(&model.tree, owner)?;
    let root = reference::root_path(model.tree.figure_number());
    let (id, command) = build(&mut model.tree, &root)?;

    if let Err(err) = model.ledger.record_creation(id, owner, command) {
        model.tree.remove(id)?;
        return Err(err);
    }
    tracing::debug!(%id, %owner, "created element");
    Ok(vec![id])
}

/// Remove `ids`: created elements are deleted, pre-existing ones hidden
///
/// Hiding is one undoable edit covering every hidden element. Elements that
/// fail to resolve are skipped and reported.
fn remove(model: &mut AppModel, ids: &[ElementId]) -> Option<Cmd> {
    let recorder = EditRecorder::begin("Remove", ids, &model.tree, &model.ledger);

    let mut touched = Vec::new();
    let mut errors = Vec::new();
    for &id in ids {
        match model.ledger.remove_element(&mut model.tree, id) {
            Ok(removal) => {
                tracing::debug!(%id, ?removal, "removed");
                touched.push(id);
            }
            Err(err) => errors.push(err),
        }
    }

    if let Some(edit) = recorder.finish(&model.tree, &model.ledger) {
        model.history.push(edit);
    }

    let mut cmds = Vec::new();
    if !touched.is_empty() {
        cmds.push(Cmd::GeometryChanged(touched.clone()));
    }

    let before = model.selection.len();
    for id in &touched {
        model.selection.remove(*id);
    }
    model.selection.prune(&model.tree);
    if model.selection.len() != before {
        cmds.push(Cmd::SelectionChanged(model.selection.ids()));
    }

    if errors.len() > 1 {
        tracing::warn!(failed = errors.len(), "several removals failed");
    }
    if let Some(err) = errors.into_iter().next() {
        cmds.push(report("Remove", err).unwrap_or_default());
    }
    Some(Cmd::batch(cmds))
}
