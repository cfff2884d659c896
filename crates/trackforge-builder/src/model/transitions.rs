//! Pure transition function of the segment model
//!
//! `transition` never touches the world. It returns the next state and the
//! effects the dispatcher has to run; effects that talk to the world answer
//! with a follow-up input.

use tracing::{debug, warn};

use trackforge_core::{Message, ModelEvent, PieceType, PlacementMode, Segment, SlotKind};
use trackforge_settings::ConstructionSettings;

use super::state::{Effect, ModelInput, ModelState};
use crate::rules::{BuildRules, SuggestionStrategy};

/// Collaborators a transition may consult
pub struct TransitionContext<'a> {
    pub rules: &'a dyn BuildRules,
    pub suggestion: &'a dyn SuggestionStrategy,
    pub settings: &'a ConstructionSettings,
}

/// Apply `input` to `state`
pub fn transition(
    state: &ModelState,
    input: ModelInput,
    ctx: &TransitionContext<'_>,
) -> (ModelState, Vec<Effect>) {
    let mut next = state.clone();
    let mut effects = Vec::new();

    match input {
        ModelInput::SelectSegment(segment) => {
            select_segment(&mut next, &mut effects, segment, ctx);
        }
        ModelInput::SetBuildDirection(direction) => {
            if next.build_direction != direction {
                next.build_direction = direction;
                effects.push(Effect::Publish(ModelEvent::BuildDirectionChanged { direction }));
                refresh_buildable(&mut next, &mut effects, ctx);
            }
        }
        ModelInput::SelectBuild(piece) => match piece {
            Some(piece) if !next.buildable.contains(&piece) => {
                warn!("{} cannot be built here, keeping {:?}", piece, next.selected_build);
            }
            _ => {
                set_selected_build(&mut next, &mut effects, piece);
                request_preview(&mut next, &mut effects);
            }
        },
        ModelInput::SlotProbed { piece, kind } => {
            slot_probed(&mut next, &mut effects, piece, kind);
        }
        ModelInput::PreviewPlaced(segment) => {
            set_preview(&mut next, &mut effects, Some(segment));
        }
        ModelInput::PreviewFailed { piece, reason } => {
            debug!("Preview of {} cancelled: {}", piece, reason);
            drop_preview(&mut next, &mut effects);
            effects.push(Effect::Publish(ModelEvent::BuildFailed {
                piece,
                mode: PlacementMode::Ghost,
                reason,
            }));
        }
        ModelInput::Commit => commit(&mut next, &mut effects, ctx),
        ModelInput::Committed(segment) => {
            effects.push(Effect::Publish(ModelEvent::PieceBuilt {
                segment: segment.clone(),
                mode: PlacementMode::Real,
            }));
            select_segment(&mut next, &mut effects, Some(segment), ctx);
        }
        ModelInput::CommitFailed {
            piece,
            reason,
            ghost_removed,
        } => {
            effects.push(Effect::Publish(ModelEvent::BuildFailed {
                piece,
                mode: PlacementMode::Real,
                reason: reason.clone(),
            }));
            effects.push(Effect::Notify(Message::error(
                "Build failed",
                format!("{} could not be built: {}", piece, reason),
            )));
            if ghost_removed && ctx.settings.restore_ghost_on_failed_commit {
                if let (Some(segment), Some(direction)) = (next.selected.clone(), next.build_direction)
                {
                    effects.push(Effect::PlaceGhost {
                        segment,
                        direction,
                        piece,
                    });
                }
            }
        }
        ModelInput::Close => close(&mut next, &mut effects),
        ModelInput::Recover { selected, preview } => {
            next.selected = selected;
            next.preview = preview;
        }
    }

    (next, effects)
}

fn select_segment(
    next: &mut ModelState,
    effects: &mut Vec<Effect>,
    segment: Option<Segment>,
    ctx: &TransitionContext<'_>,
) {
    next.selected = segment.clone();
    effects.push(match &segment {
        Some(segment) => Effect::Paint(segment.clone()),
        None => Effect::RestorePaint,
    });
    effects.push(Effect::PersistSelected(segment.clone()));
    effects.push(Effect::Publish(ModelEvent::SelectedSegmentChanged { segment }));
    refresh_buildable(next, effects, ctx);
}

/// Recompute the buildable set and the suggested build, then re-preview
fn refresh_buildable(next: &mut ModelState, effects: &mut Vec<Effect>, ctx: &TransitionContext<'_>) {
    let previous_choice = next.selected_build;
    let (buildable, current) = match (&next.selected, next.build_direction) {
        (Some(selected), Some(direction)) => (
            ctx.rules.buildable_pieces(
                selected.structure_type(),
                selected.piece_type(),
                direction,
            ),
            Some(selected.piece_type()),
        ),
        _ => (Vec::new(), None),
    };

    if next.buildable != buildable {
        next.buildable = buildable.clone();
        effects.push(Effect::Publish(ModelEvent::BuildableTypesChanged {
            pieces: buildable,
        }));
    }

    let suggestion = if next.buildable.is_empty() {
        None
    } else {
        ctx.suggestion.suggest(
            current,
            previous_choice,
            &next.buildable,
            next.build_direction.unwrap_or_default(),
        )
    };
    set_selected_build(next, effects, suggestion);
    request_preview(next, effects);
}

fn request_preview(next: &mut ModelState, effects: &mut Vec<Effect>) {
    match (next.selected.clone(), next.build_direction, next.selected_build) {
        (Some(segment), Some(direction), Some(piece)) => effects.push(Effect::ProbeSlot {
            segment,
            direction,
            piece,
        }),
        _ => drop_preview(next, effects),
    }
}

fn slot_probed(next: &mut ModelState, effects: &mut Vec<Effect>, piece: PieceType, kind: SlotKind) {
    if next.selected_build != Some(piece) {
        debug!("Probe for {} superseded by {:?}", piece, next.selected_build);
        return;
    }
    let (Some(segment), Some(direction)) = (next.selected.clone(), next.build_direction) else {
        return;
    };

    match kind {
        SlotKind::Real => {
            debug!("{} slot of {} is taken", direction, segment);
            set_selected_build(next, effects, None);
            drop_preview(next, effects);
        }
        SlotKind::Ghost => {
            drop_preview(next, effects);
            effects.push(Effect::ReplaceGhost {
                segment,
                direction,
                piece,
            });
        }
        SlotKind::Empty => {
            drop_preview(next, effects);
            effects.push(Effect::PlaceGhost {
                segment,
                direction,
                piece,
            });
        }
    }
}

fn commit(next: &mut ModelState, effects: &mut Vec<Effect>, ctx: &TransitionContext<'_>) {
    match (next.selected.clone(), next.build_direction, next.selected_build) {
        (Some(segment), Some(direction), Some(piece)) => {
            let remove_ghost = ctx.settings.remove_ghost_before_commit;
            if remove_ghost {
                set_preview(next, effects, None);
            }
            effects.push(Effect::CommitBuild {
                segment,
                direction,
                piece,
                remove_ghost,
            });
        }
        (selected, direction, _) => {
            let reason = if selected.is_none() {
                "no segment is selected"
            } else if direction.is_none() {
                "no build direction is set"
            } else {
                "no piece is selected for building"
            };
            effects.push(Effect::Notify(Message::error("Cannot build", reason)));
            effects.push(Effect::RejectCommit {
                reason: reason.to_string(),
            });
        }
    }
}

fn close(next: &mut ModelState, effects: &mut Vec<Effect>) {
    effects.push(Effect::RestorePaint);
    drop_preview(next, effects);

    if next.selected.take().is_some() {
        effects.push(Effect::Publish(ModelEvent::SelectedSegmentChanged { segment: None }));
    }
    effects.push(Effect::PersistSelected(None));
    set_selected_build(next, effects, None);
    if !next.buildable.is_empty() {
        next.buildable.clear();
        effects.push(Effect::Publish(ModelEvent::BuildableTypesChanged {
            pieces: Vec::new(),
        }));
    }
    effects.push(Effect::Publish(ModelEvent::Closed));
}

fn set_selected_build(next: &mut ModelState, effects: &mut Vec<Effect>, piece: Option<PieceType>) {
    if next.selected_build != piece {
        next.selected_build = piece;
        if piece.is_none() {
            effects.push(Effect::Highlight(None));
        }
        effects.push(Effect::Publish(ModelEvent::SelectedBuildChanged { piece }));
    }
}

/// Record the ghost; the highlight follows it
///
/// Only call with `None` when the ghost leaves the world by other means,
/// otherwise use [`drop_preview`].
fn set_preview(next: &mut ModelState, effects: &mut Vec<Effect>, preview: Option<Segment>) {
    if next.preview != preview {
        next.preview = preview.clone();
        effects.push(Effect::PersistPreview(preview.clone()));
        effects.push(Effect::Highlight(preview.clone()));
        effects.push(Effect::Publish(ModelEvent::PreviewSegmentChanged {
            segment: preview,
        }));
    }
}

/// Queue removal of the current ghost; at most one ghost exists at a time
fn drop_preview(next: &mut ModelState, effects: &mut Vec<Effect>) {
    if let Some(old) = next.preview.clone() {
        effects.push(Effect::RemovePreview(old));
        set_preview(next, effects, None);
    }
}
