//! Data models for world locations, track pieces and segments
//!
//! This module provides:
//! - World coordinates (map units, 32 per tile) with a facing
//! - Track piece catalogue with canonical heights and footprints
//! - Structure (ride) kinds and colour schemes
//! - Tile element views as reported by the host world
//! - The immutable `Segment` snapshot and its cached adjacency

pub mod element;
pub mod piece;
pub mod segment;
pub mod structure;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use element::{SurfaceElement, TileElement, TrackElement};
pub use piece::{PieceDefinition, PieceHeights, PieceType, Slope};
pub use segment::{Adjacency, ChainLookup, Segment};
pub use structure::{StructureClassification, StructureInfo, StructureType, TrackColour};

/// Size of one tile edge in map units
pub const TILE_SIZE: i32 = 32;

/// Identifier of a parent structure (ride) in the host world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructureId(pub u16);

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One of the four 90° rotation states a piece can be oriented in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Facing(u8);

impl Facing {
    /// Facing 0
    pub const NORTH_EAST: Facing = Facing(0);
    /// Facing 1
    pub const SOUTH_EAST: Facing = Facing(1);
    /// Facing 2
    pub const SOUTH_WEST: Facing = Facing(2);
    /// Facing 3
    pub const NORTH_WEST: Facing = Facing(3);

    /// Create a facing, rejecting values outside 0..=3
    pub fn new(value: u8) -> Option<Self> {
        (value < 4).then_some(Facing(value))
    }

    /// Create a facing from any integer, wrapping into 0..=3
    pub fn wrapping(value: i32) -> Self {
        Facing(value.rem_euclid(4) as u8)
    }

    /// Raw facing value (0..=3)
    pub fn value(self) -> u8 {
        self.0
    }

    /// Rotate by a number of quarter turns (negative turns counter-rotate)
    pub fn rotated(self, quarter_turns: i32) -> Self {
        Facing::wrapping(self.0 as i32 + quarter_turns)
    }

    /// The facing that undoes this one
    pub fn inverse(self) -> Self {
        Facing::wrapping(-(self.0 as i32))
    }

    /// All four facings in order
    pub fn all() -> [Facing; 4] {
        [Facing(0), Facing(1), Facing(2), Facing(3)]
    }
}

impl TryFrom<u8> for Facing {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Facing::new(value).ok_or_else(|| format!("facing must be 0..=3, got {}", value))
    }
}

impl From<Facing> for u8 {
    fn from(facing: Facing) -> Self {
        facing.0
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Map coordinates of a tile column (map units, not tile indices)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapCoords {
    /// X in map units
    pub x: i32,
    /// Y in map units
    pub y: i32,
}

impl MapCoords {
    /// Create map coordinates
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Tile index (x, y) this coordinate falls into
    pub fn tile_index(self) -> (i32, i32) {
        (self.x.div_euclid(TILE_SIZE), self.y.div_euclid(TILE_SIZE))
    }
}

/// Absolute world coordinate without a facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldCoord {
    /// X in map units
    pub x: i32,
    /// Y in map units
    pub y: i32,
    /// Height in map units
    pub z: i32,
}

impl WorldCoord {
    /// Create a world coordinate
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The tile column containing this coordinate
    pub fn map_coords(self) -> MapCoords {
        MapCoords::new(self.x, self.y)
    }
}

/// World location of a piece: position plus facing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// X in map units
    pub x: i32,
    /// Y in map units
    pub y: i32,
    /// Height in map units
    pub z: i32,
    /// Facing of the piece
    pub facing: Facing,
}

impl Location {
    /// Create a location
    pub fn new(x: i32, y: i32, z: i32, facing: Facing) -> Self {
        Self { x, y, z, facing }
    }

    /// The tile column containing this location
    pub fn map_coords(&self) -> MapCoords {
        MapCoords::new(self.x, self.y)
    }

    /// Position without the facing
    pub fn coord(&self) -> WorldCoord {
        WorldCoord::new(self.x, self.y, self.z)
    }

    /// Copy of this location at another height
    pub fn with_z(&self, z: i32) -> Self {
        Self { z, ..*self }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, facing {})",
            self.x, self.y, self.z, self.facing
        )
    }
}

/// Direction in which the chain is extended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BuildDirection {
    /// Build after the selected piece
    #[default]
    Next,
    /// Build before the selected piece
    Previous,
}

impl BuildDirection {
    /// The opposite direction
    pub fn reversed(self) -> Self {
        match self {
            BuildDirection::Next => BuildDirection::Previous,
            BuildDirection::Previous => BuildDirection::Next,
        }
    }
}

impl fmt::Display for BuildDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildDirection::Next => write!(f, "next"),
            BuildDirection::Previous => write!(f, "previous"),
        }
    }
}

/// What occupies the slot following a piece in some direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    /// Nothing of this structure is at the slot
    Empty,
    /// A ghost (preview) piece is at the slot
    Ghost,
    /// A committed piece is at the slot
    Real,
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotKind::Empty => write!(f, "empty"),
            SlotKind::Ghost => write!(f, "ghost"),
            SlotKind::Real => write!(f, "real"),
        }
    }
}
