//! The `Segment` value entity
//!
//! A segment is an immutable snapshot of one track piece's identity. Its
//! chain adjacency is looked up the first time it is asked for and kept for
//! the lifetime of the snapshot; representing a moved piece needs a new
//! `Segment`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::{Location, PieceType, StructureId, StructureType};

/// Locations adjacent to a piece along its chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Adjacency {
    /// Where the following piece starts, if the chain continues
    pub next: Option<Location>,
    /// Where the preceding piece starts, if the chain continues backwards
    pub previous: Option<Location>,
}

/// Computes chain adjacency for a segment
///
/// Implemented by whatever can position a chain cursor on a segment (the
/// track element resolver in practice).
pub trait ChainLookup {
    /// Look up the next/previous locations of a segment
    fn adjacency(&self, segment: &Segment) -> Adjacency;

    /// Whether a committed (non-ghost) piece follows the segment in a direction
    fn has_real_neighbour(&self, segment: &Segment, direction: super::BuildDirection) -> bool;
}

/// Snapshot of one track piece
#[derive(Clone, Serialize, Deserialize)]
pub struct Segment {
    location: Location,
    structure_id: StructureId,
    piece_type: PieceType,
    structure_type: StructureType,
    #[serde(skip)]
    adjacency: OnceLock<Adjacency>,
}

impl Segment {
    /// Create a segment snapshot
    pub fn new(
        location: Location,
        structure_id: StructureId,
        piece_type: PieceType,
        structure_type: StructureType,
    ) -> Self {
        Self {
            location,
            structure_id,
            piece_type,
            structure_type,
            adjacency: OnceLock::new(),
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn structure_id(&self) -> StructureId {
        self.structure_id
    }

    pub fn piece_type(&self) -> PieceType {
        self.piece_type
    }

    pub fn structure_type(&self) -> StructureType {
        self.structure_type
    }

    /// Location where the following piece starts
    ///
    /// Computed through `chain` on first access and memoized.
    pub fn next_location(&self, chain: &dyn ChainLookup) -> Option<Location> {
        self.adjacency
            .get_or_init(|| chain.adjacency(self))
            .next
    }

    /// Location where the preceding piece starts
    ///
    /// Computed through `chain` on first access and memoized.
    pub fn previous_location(&self, chain: &dyn ChainLookup) -> Option<Location> {
        self.adjacency
            .get_or_init(|| chain.adjacency(self))
            .previous
    }

    /// Adjacent location in a build direction
    pub fn following_location(
        &self,
        chain: &dyn ChainLookup,
        direction: super::BuildDirection,
    ) -> Option<Location> {
        match direction {
            super::BuildDirection::Next => self.next_location(chain),
            super::BuildDirection::Previous => self.previous_location(chain),
        }
    }

    /// Whether adjacency has already been computed
    pub fn is_adjacency_cached(&self) -> bool {
        self.adjacency.get().is_some()
    }

    /// Whether a committed piece follows in `direction`; ghosts count as absent
    pub fn has_real_neighbour(
        &self,
        chain: &dyn ChainLookup,
        direction: super::BuildDirection,
    ) -> bool {
        chain.has_real_neighbour(self, direction)
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.location == other.location
            && self.structure_id == other.structure_id
            && self.piece_type == other.piece_type
            && self.structure_type == other.structure_type
    }
}

impl Eq for Segment {}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Segment")
            .field("location", &self.location)
            .field("structure_id", &self.structure_id)
            .field("piece_type", &self.piece_type)
            .field("structure_type", &self.structure_type)
            .finish()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} at {}",
            self.piece_type, self.structure_id, self.location
        )
    }
}
