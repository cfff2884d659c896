//! World actions and their results

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::{Location, PieceType, StructureId, StructureType, TrackColour};
use crate::error::BuildError;

/// Host flag bit marking an action as a ghost (preview) action
pub const GHOST_FLAG: u32 = 1 << 6;

/// Whether a piece is a preview or a committed placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlacementMode {
    Ghost,
    Real,
}

impl fmt::Display for PlacementMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementMode::Ghost => write!(f, "ghost"),
            PlacementMode::Real => write!(f, "real"),
        }
    }
}

/// Parameters of a place action, as dispatched to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceParams {
    /// Placement location; `z` is already height-normalized
    pub location: Location,
    pub structure_id: StructureId,
    pub piece_type: PieceType,
    pub structure_type: StructureType,
    pub brake_speed: u8,
    pub colour: u8,
    /// 4 leaves the seat rotation unchanged
    pub seat_rotation: u8,
    pub track_place_flags: u32,
    pub is_from_track_design: bool,
    pub flags: u32,
}

/// Parameters of a remove action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveParams {
    /// Location of the element's base
    pub location: Location,
    pub piece_type: PieceType,
    pub sequence: u8,
    pub flags: u32,
}

/// An action dispatched to the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum TrackAction {
    /// Place a piece
    #[serde(rename = "trackplace")]
    Place(PlaceParams),
    /// Remove a piece
    #[serde(rename = "trackremove")]
    Remove(RemoveParams),
    /// Switch the colour scheme index of a piece
    #[serde(rename = "ridesetcolourscheme")]
    SetColourScheme {
        location: Location,
        piece_type: PieceType,
        colour_scheme: u8,
    },
    /// Change the colours of one of a structure's schemes
    #[serde(rename = "ridesetappearance")]
    SetStructureColours {
        structure_id: StructureId,
        scheme: u8,
        colours: TrackColour,
    },
}

impl TrackAction {
    /// Host action name
    pub fn name(&self) -> &'static str {
        match self {
            TrackAction::Place(_) => "trackplace",
            TrackAction::Remove(_) => "trackremove",
            TrackAction::SetColourScheme { .. } => "ridesetcolourscheme",
            TrackAction::SetStructureColours { .. } => "ridesetappearance",
        }
    }

    /// Whether the action carries the ghost flag
    pub fn is_ghost(&self) -> bool {
        match self {
            TrackAction::Place(params) => params.flags & GHOST_FLAG != 0,
            TrackAction::Remove(params) => params.flags & GHOST_FLAG != 0,
            _ => false,
        }
    }
}

/// Failure category reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionErrorKind {
    /// Something is in the way
    Collision,
    /// Not enough money
    InsufficientFunds,
    /// Not allowed in the current world state
    Disallowed,
    /// Bad parameters (including unknown structure ids)
    InvalidParameters,
    /// Nothing to act on at the location
    NotFound,
    /// Anything else
    Unknown,
}

/// Structured result of a world action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Set when the action failed
    pub error: Option<ActionErrorKind>,
    /// Host message, mostly for failures
    pub message: Option<String>,
    /// Action-specific payload
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl ActionResult {
    /// A successful result without payload
    pub fn ok() -> Self {
        Self {
            error: None,
            message: None,
            payload: serde_json::Value::Null,
        }
    }

    /// A successful result with payload
    pub fn ok_with(payload: serde_json::Value) -> Self {
        Self {
            payload,
            ..Self::ok()
        }
    }

    /// A failed result
    pub fn failed(kind: ActionErrorKind, message: impl Into<String>) -> Self {
        Self {
            error: Some(kind),
            message: Some(message.into()),
            payload: serde_json::Value::Null,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Convert a failed result into a `BuildError` for `action`
    pub fn into_result(self, action: &str) -> Result<Self, BuildError> {
        match self.error {
            None => Ok(self),
            Some(kind) => Err(BuildError::ActionFailed {
                action: action.to_string(),
                kind,
                message: self.message.unwrap_or_default(),
            }),
        }
    }
}

/// Executes world actions out of line
///
/// Completion is asynchronous relative to the caller; callers must await
/// the result before assuming the world changed.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Dispatch an action and wait for its result
    async fn execute(&self, action: TrackAction) -> ActionResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Facing;

    fn place(flags: u32) -> TrackAction {
        TrackAction::Place(PlaceParams {
            location: Location::new(132, 100, 0, Facing::NORTH_EAST),
            structure_id: StructureId(4),
            piece_type: PieceType::FlatToUp25,
            structure_type: StructureType::WoodenRollerCoaster,
            brake_speed: 0,
            colour: 0,
            seat_rotation: 4,
            track_place_flags: 0,
            is_from_track_design: false,
            flags,
        })
    }

    #[test]
    fn test_action_names_and_ghost_flag() {
        assert_eq!(place(0).name(), "trackplace");
        assert!(place(104).is_ghost());
        assert!(!place(0).is_ghost());
    }

    #[test]
    fn test_action_serializes_with_host_name() {
        let json = serde_json::to_value(place(0)).expect("serialize action");
        assert_eq!(json["action"], "trackplace");
    }

    #[test]
    fn test_failed_result_converts_to_build_error() {
        let result = ActionResult::failed(ActionErrorKind::Collision, "in the way");
        assert!(!result.is_success());
        let err = result.into_result("trackplace").unwrap_err();
        assert!(matches!(
            err,
            BuildError::ActionFailed {
                kind: ActionErrorKind::Collision,
                ..
            }
        ));
        assert!(ActionResult::ok().into_result("trackremove").is_ok());
    }
}
