//! Action execution against the simulated world
//!
//! Every action yields to the runtime once before it is applied, so
//! callers observe the same out-of-line completion as with a real host.

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use trackforge_core::{
    ActionErrorKind, ActionExecutor, ActionResult, Location, PermissionFlags, PieceType,
    PlaceParams, RemoveParams, StructureId, TrackAction, TrackColour, GHOST_FLAG,
};

use crate::world::{base_offset, PieceId, SimPiece, SimState, SimWorld};

/// One executed action as seen by the world
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord {
    pub action: TrackAction,
    pub result: ActionResult,
    /// Permission flags in effect while the action ran
    pub permissions: PermissionFlags,
}

#[derive(Debug, Clone)]
pub(crate) struct InjectedFailure {
    action: String,
    result: ActionResult,
}

impl SimWorld {
    /// Fail the next action named `action` (e.g. `trackplace`)
    pub fn fail_next_action(
        &self,
        action: impl Into<String>,
        kind: ActionErrorKind,
        message: impl Into<String>,
    ) {
        self.state.write().failures.push(InjectedFailure {
            action: action.into(),
            result: ActionResult::failed(kind, message),
        });
    }
}

#[async_trait]
impl ActionExecutor for SimWorld {
    async fn execute(&self, action: TrackAction) -> ActionResult {
        tokio::task::yield_now().await;

        let mut state = self.state.write();
        let injected = state
            .failures
            .iter()
            .position(|failure| failure.action == action.name());
        let result = match injected {
            Some(index) => state.failures.remove(index).result,
            None => state.apply(&action),
        };

        debug!("{} -> {:?}", action.name(), result.error);
        let permissions = state.permissions;
        state.log.push(ActionRecord {
            action,
            result: result.clone(),
            permissions,
        });
        result
    }
}

impl SimState {
    fn apply(&mut self, action: &TrackAction) -> ActionResult {
        match action {
            TrackAction::Place(params) => self.place(params),
            TrackAction::Remove(params) => self.remove(params),
            TrackAction::SetColourScheme {
                location,
                piece_type,
                colour_scheme,
            } => self.set_colour_scheme(*location, *piece_type, *colour_scheme),
            TrackAction::SetStructureColours {
                structure_id,
                scheme,
                colours,
            } => self.set_structure_colours(*structure_id, *scheme, *colours),
        }
    }

    fn place(&mut self, params: &PlaceParams) -> ActionResult {
        let Some(structure) = self.structures.get(&params.structure_id) else {
            return ActionResult::failed(
                ActionErrorKind::InvalidParameters,
                format!("Unknown structure {}", params.structure_id),
            );
        };
        if !structure.structure_type.supports(params.piece_type) {
            return ActionResult::failed(
                ActionErrorKind::Disallowed,
                format!("{} cannot be built on {}", params.piece_type, structure.structure_type),
            );
        }
        if params.structure_type != structure.structure_type
            && !self.permissions.arbitrary_structure_type_changes
        {
            return ActionResult::failed(
                ActionErrorKind::Disallowed,
                "Structure type does not match",
            );
        }
        if self.paused && !self.permissions.build_in_pause {
            return ActionResult::failed(
                ActionErrorKind::Disallowed,
                "Cannot build while paused",
            );
        }

        let heights = params.piece_type.heights();
        let piece = SimPiece {
            id: PieceId(0),
            structure_id: params.structure_id,
            structure_type: structure.structure_type,
            piece_type: params.piece_type,
            origin: params
                .location
                .with_z(params.location.z - base_offset(heights)),
            base_z: params.location.z,
            colour_scheme: params.colour.min(3),
            is_ghost: params.flags & GHOST_FLAG != 0,
        };

        if let Some(blocking) = self.pieces.values().find(|other| other.overlaps(&piece)) {
            return ActionResult::failed(
                ActionErrorKind::Collision,
                format!("There's something in the way ({})", blocking.piece_type),
            );
        }

        let is_ghost = piece.is_ghost;
        let id = self.insert(piece);
        ActionResult::ok_with(serde_json::json!({ "id": id.0, "ghost": is_ghost }))
    }

    fn remove(&mut self, params: &RemoveParams) -> ActionResult {
        let tile = params.location.map_coords().tile_index();
        let ghost = params.flags & GHOST_FLAG != 0;
        let found = self.pieces.values().find(|piece| {
            piece.piece_type == params.piece_type
                && piece.base_z == params.location.z
                && piece.origin.facing == params.location.facing
                && piece.is_ghost == ghost
                && piece.sequence_on(tile) == Some(params.sequence)
        });

        match found.map(|piece| piece.id) {
            Some(id) => {
                self.pieces.remove(&id);
                ActionResult::ok_with(serde_json::json!({ "id": id.0 }))
            }
            None => ActionResult::failed(
                ActionErrorKind::NotFound,
                format!("No {} at {}", params.piece_type, params.location),
            ),
        }
    }

    fn set_colour_scheme(
        &mut self,
        location: Location,
        piece_type: PieceType,
        colour_scheme: u8,
    ) -> ActionResult {
        if colour_scheme > 3 {
            return ActionResult::failed(
                ActionErrorKind::InvalidParameters,
                format!("Colour scheme {} out of range", colour_scheme),
            );
        }
        let tile = location.map_coords().tile_index();
        let found = self.pieces.values_mut().find(|piece| {
            piece.piece_type == piece_type
                && piece.base_z == location.z
                && piece.sequence_on(tile).is_some()
        });
        match found {
            Some(piece) => {
                piece.colour_scheme = colour_scheme;
                ActionResult::ok()
            }
            None => ActionResult::failed(
                ActionErrorKind::NotFound,
                format!("No {} at {}", piece_type, location),
            ),
        }
    }

    fn set_structure_colours(
        &mut self,
        structure_id: StructureId,
        scheme: u8,
        colours: TrackColour,
    ) -> ActionResult {
        let slot = self
            .structures
            .get_mut(&structure_id)
            .and_then(|structure| structure.colour_schemes.get_mut(scheme as usize));
        match slot {
            Some(slot) => {
                *slot = colours;
                ActionResult::ok()
            }
            None => ActionResult::failed(
                ActionErrorKind::InvalidParameters,
                format!("No colour scheme {} on {}", scheme, structure_id),
            ),
        }
    }
}
