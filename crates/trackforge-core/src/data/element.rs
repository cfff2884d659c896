//! Tile element views
//!
//! Read-only snapshots of what the host world reports for a tile. Elements
//! are ordered; the position of an element in its tile is the index the
//! host's chain cursor is addressed by.

use serde::{Deserialize, Serialize};

use super::{Facing, PieceType, StructureId, StructureType};

/// A track element on a tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackElement {
    pub structure_id: StructureId,
    pub structure_type: StructureType,
    pub piece_type: PieceType,
    /// Height of the element's base in map units
    pub base_height: i32,
    pub facing: Facing,
    /// Index into the structure's colour schemes (0..=3)
    pub colour_scheme: u8,
    /// Which tile of a multi-tile piece this element is
    pub sequence: u8,
    pub is_ghost: bool,
}

/// A terrain surface element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceElement {
    pub base_height: i32,
}

/// Any element found on a tile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TileElement {
    Surface(SurfaceElement),
    Track(TrackElement),
    /// Scenery, paths and everything else irrelevant to track building
    Other,
}

impl TileElement {
    /// The track element, if this is one
    pub fn as_track(&self) -> Option<&TrackElement> {
        match self {
            TileElement::Track(track) => Some(track),
            _ => None,
        }
    }
}
