//! Grabber message handlers: drags and keyboard nudges
//!
//! The grabber transitions are pure; this is where their outcome is applied to
//! the tree, the ledger and the undo history.

use std::mem;

use crate::commands::Cmd;
use crate::error::{EditError, Result};
use crate::history::EditRecorder;
use crate::manipulate::{collect_guides, GrabOutcome, GrabberState};
use crate::messages::{Direction, GrabMsg};
use crate::model::{Affine, AppModel, Edges, ElementId, Point};

use super::report;

/// Arrow key step in device pixels
pub const NUDGE_STEP_PX: f64 = 1.0;
/// Arrow key step with the large-step modifier held
pub const NUDGE_LARGE_STEP_PX: f64 = 10.0;

/// Handle grabber messages
pub fn update_grab(model: &mut AppModel, msg: GrabMsg) -> Option<Cmd> {
    match msg {
        GrabMsg::Press { at, edges } => press(model, at, edges),

        GrabMsg::Motion(event) => {
            let settings = model.snap_settings();
            let (next, outcome) = mem::take(&mut model.grabber).motion(event, &settings);
            model.grabber = next;
            match outcome {
                GrabOutcome::Preview(transform) => {
                    match model.selection.apply(&mut model.tree, &transform) {
                        Ok(ids) => Some(Cmd::GeometryChanged(ids)),
                        Err(err) => report("Drag", err),
                    }
                }
                GrabOutcome::Ignored | GrabOutcome::Commit(_) => None,
            }
        }

        GrabMsg::Release(event) => {
            let settings = model.snap_settings();
            let (next, outcome) = mem::take(&mut model.grabber).release(event, &settings);
            model.grabber = next;
            let recorder = model.pending_edit.take();
            match (outcome, recorder) {
                (GrabOutcome::Commit(transform), Some(recorder)) => {
                    commit(model, recorder, &transform, "Drag")
                }
                _ => None,
            }
        }

        GrabMsg::Nudge { direction, large } => nudge(model, direction, large),
    }
}

fn press(model: &mut AppModel, at: Point, edges: Edges) -> Option<Cmd> {
    if model.grabber.is_dragging() || model.selection.is_empty() {
        return None;
    }

    let start = match model.selection.begin(&model.tree) {
        Ok(start) => start,
        Err(err) => return report("Drag", err),
    };
    let frame = model.frame();
    if !frame.is_usable() {
        model.selection.end();
        return report("Drag", EditError::DegenerateFrame);
    }
    let ids = model.selection.ids();
    let guides = collect_guides(&model.tree, &frame, &ids, edges);
    let label = if edges.is_move() { "Move" } else { "Resize" };

    model.pending_edit = Some(EditRecorder::begin(label, &ids, &model.tree, &model.ledger));
    model.grabber = GrabberState::press(
        edges,
        at,
        start,
        frame,
        guides,
        model.selection.fixed_aspect(),
    );
    None
}

fn nudge(model: &mut AppModel, direction: Direction, large: bool) -> Option<Cmd> {
    if model.grabber.is_dragging() || model.selection.is_empty() {
        return None;
    }

    let step = if large {
        NUDGE_LARGE_STEP_PX
    } else {
        NUDGE_STEP_PX
    };
    let (ux, uy) = direction.unit();
    let frame = model.frame();
    if !frame.is_usable() {
        return report("Nudge", EditError::DegenerateFrame);
    }
    let transform = Affine::translation(ux * step / frame.width_px, uy * step / frame.height_px);

    let ids = model.selection.ids();
    let recorder = EditRecorder::begin("Nudge", &ids, &model.tree, &model.ledger);
    if let Err(err) = model.selection.begin(&model.tree) {
        return report("Nudge", err);
    }
    commit(model, recorder, &transform, "Nudge")
}

/// Apply `transform` to the selection, record the result and push one undo entry
///
/// On failure every target is put back where the recorder found it.
fn commit(
    model: &mut AppModel,
    recorder: EditRecorder,
    transform: &Affine,
    action: &str,
) -> Option<Cmd> {
    if transform.is_identity() {
        // Undo any preview; nothing is recorded
        let restored = model.selection.apply(&mut model.tree, transform);
        model.selection.end();
        return restored
            .ok()
            .filter(|ids| !ids.is_empty())
            .map(Cmd::GeometryChanged);
    }

    match apply_and_record(model, transform) {
        Ok(ids) => {
            if let Some(edit) = recorder.finish(&model.tree, &model.ledger) {
                model.history.push(edit);
            }
            Some(Cmd::GeometryChanged(ids))
        }
        Err(err) => {
            model.selection.end();
            let ids = recorder.ids();
            if let Some(edit) = recorder.finish(&model.tree, &model.ledger) {
                edit.undo(&mut model.tree, &mut model.ledger);
            }
            Some(Cmd::batch(vec![
                Cmd::GeometryChanged(ids),
                report(action, err).unwrap_or_default(),
            ]))
        }
    }
}

fn apply_and_record(model: &mut AppModel, transform: &Affine) -> Result<Vec<ElementId>> {
    let ids = model.selection.apply(&mut model.tree, transform)?;
    model.selection.commit(&model.tree, &mut model.ledger)?;
    Ok(ids)
}
