//! Error handling for trackforge
//!
//! Provides error types for each layer of the builder:
//! - Resolve errors (identifying a piece on the world grid)
//! - Build errors (placing/removing pieces through the action executor)
//! - Storage errors (cold storage snapshots used for crash recovery)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::data::{Location, MapCoords, StructureId};
use crate::world::{ActionErrorKind, PlacementMode};

/// Resolve error type
///
/// Raised when a location cannot be mapped to a single track element.
/// Ambiguity is never an error here; it is collapsed by tie-breaks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// No track element of the structure exists at the location
    #[error("No track element of structure {structure_id} at {location}")]
    NotFound {
        /// Structure that was searched for.
        structure_id: StructureId,
        /// Location that was searched.
        location: Location,
    },

    /// The structure id is unknown to the world
    #[error("Unknown structure {structure_id}")]
    UnknownStructure {
        /// The unknown structure id.
        structure_id: StructureId,
    },

    /// The host could not position a chain cursor on the element
    #[error("No chain cursor at ({}, {}) index {index}", coords.x, coords.y)]
    CursorUnavailable {
        /// Tile the cursor was requested for.
        coords: MapCoords,
        /// Element index within the tile.
        index: usize,
    },
}

/// Build error type
///
/// Represents failures while placing or removing pieces.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The action executor reported a failure
    #[error("{action} failed ({kind:?}): {message}")]
    ActionFailed {
        /// Name of the dispatched action.
        action: String,
        /// Failure category reported by the host.
        kind: ActionErrorKind,
        /// Host-provided message.
        message: String,
    },

    /// The piece kind has no height information in the host
    #[error("No height data for piece {piece}")]
    MissingPieceHeights {
        /// The piece kind.
        piece: String,
    },

    /// A real piece already occupies the target slot
    #[error("Slot at {location} is occupied")]
    SlotOccupied {
        /// Location of the occupied slot.
        location: Location,
    },

    /// There is no selection or no buildable piece to act on
    #[error("Nothing to build: {reason}")]
    NothingToBuild {
        /// Why the build cannot proceed.
        reason: String,
    },

    /// The piece at the location is not of the requested placement mode
    #[error("Piece at {location} is not a {expected} piece")]
    ModeMismatch {
        /// Location of the piece.
        location: Location,
        /// Mode the caller asked to remove.
        expected: PlacementMode,
    },

    /// The chain ends in the build direction
    #[error("No following position from {location}")]
    NoFollowingPosition {
        /// Location of the segment being extended.
        location: Location,
    },
}

/// Storage error type
///
/// Represents failures of the cold storage collaborator.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Snapshot could not be encoded or decoded
    #[error("Snapshot serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Backing store failed
    #[error("Storage backend error: {reason}")]
    Backend {
        /// The reason for the failure.
        reason: String,
    },
}

/// Main error type for trackforge
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Resolve error
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// Build error
    #[error(transparent)]
    Build(#[from] BuildError),

    /// Storage error
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a missing element or unknown structure
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::Resolve(ResolveError::NotFound { .. })
                | Error::Resolve(ResolveError::UnknownStructure { .. })
        )
    }

    /// Check if the host rejected a world action
    pub fn is_action_failure(&self) -> bool {
        matches!(self, Error::Build(BuildError::ActionFailed { .. }))
    }

    /// Check if this is a resolve error
    pub fn is_resolve_error(&self) -> bool {
        matches!(self, Error::Resolve(_))
    }

    /// Check if this is a storage error
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Error::Storage(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
