//! Track piece catalogue
//!
//! Every piece kind has a canonical definition in local space (facing 0):
//! the tiles it covers, where the following piece starts, how much it
//! turns, and its begin/end heights as the host encodes them. Down-sloping
//! pieces are encoded with a positive begin height and a zero end height.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::TILE_SIZE;

/// Pitch of a track piece's leading or trailing edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Slope {
    Flat,
    Up25,
    Up60,
    Down25,
    Down60,
}

/// Canonical begin/end heights of a piece, as the host encodes them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieceHeights {
    /// Height offset of the leading edge
    pub begin_z: i32,
    /// Height offset of the trailing edge
    pub end_z: i32,
}

impl PieceHeights {
    /// Create a height pair
    pub const fn new(begin_z: i32, end_z: i32) -> Self {
        Self { begin_z, end_z }
    }
}

/// Local-space definition of a piece kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceDefinition {
    /// Canonical heights
    pub heights: PieceHeights,
    /// Slope at the leading edge
    pub begin_slope: Slope,
    /// Slope at the trailing edge
    pub end_slope: Slope,
    /// Tiles covered, as offsets from local (0,0) at facing 0
    pub footprint: &'static [(i32, i32)],
    /// Offset where the following piece starts, at facing 0
    pub exit: (i32, i32),
    /// Quarter turns applied to the facing by the time the piece ends
    pub turn: i32,
    /// Whether this is a station platform piece
    pub is_station: bool,
}

const T: i32 = TILE_SIZE;

const SINGLE_TILE: &[(i32, i32)] = &[(0, 0)];
const LEFT_TURN_3: &[(i32, i32)] = &[(0, 0), (T, 0), (0, -T), (T, -T)];
const RIGHT_TURN_3: &[(i32, i32)] = &[(0, 0), (T, 0), (0, T), (T, T)];
const S_BEND_LEFT: &[(i32, i32)] = &[(0, 0), (T, 0), (T, -T), (2 * T, -T)];
const S_BEND_RIGHT: &[(i32, i32)] = &[(0, 0), (T, 0), (T, T), (2 * T, T)];

/// Enumerated track piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PieceType {
    Flat,
    EndStation,
    BeginStation,
    MiddleStation,
    Up25,
    Up60,
    FlatToUp25,
    Up25ToUp60,
    Up60ToUp25,
    Up25ToFlat,
    Down25,
    Down60,
    FlatToDown25,
    Down25ToDown60,
    Down60ToDown25,
    Down25ToFlat,
    LeftQuarterTurn1Tile,
    RightQuarterTurn1Tile,
    LeftQuarterTurn3Tiles,
    RightQuarterTurn3Tiles,
    SBendLeft,
    SBendRight,
}

impl PieceType {
    /// Every piece kind, in catalogue order
    pub const ALL: [PieceType; 22] = [
        PieceType::Flat,
        PieceType::EndStation,
        PieceType::BeginStation,
        PieceType::MiddleStation,
        PieceType::Up25,
        PieceType::Up60,
        PieceType::FlatToUp25,
        PieceType::Up25ToUp60,
        PieceType::Up60ToUp25,
        PieceType::Up25ToFlat,
        PieceType::Down25,
        PieceType::Down60,
        PieceType::FlatToDown25,
        PieceType::Down25ToDown60,
        PieceType::Down60ToDown25,
        PieceType::Down25ToFlat,
        PieceType::LeftQuarterTurn1Tile,
        PieceType::RightQuarterTurn1Tile,
        PieceType::LeftQuarterTurn3Tiles,
        PieceType::RightQuarterTurn3Tiles,
        PieceType::SBendLeft,
        PieceType::SBendRight,
    ];

    /// Canonical definition of this piece kind
    pub fn definition(self) -> PieceDefinition {
        let straight = |begin_z, end_z, begin_slope, end_slope| PieceDefinition {
            heights: PieceHeights::new(begin_z, end_z),
            begin_slope,
            end_slope,
            footprint: SINGLE_TILE,
            exit: (T, 0),
            turn: 0,
            is_station: false,
        };

        match self {
            PieceType::Flat => straight(0, 0, Slope::Flat, Slope::Flat),
            PieceType::EndStation | PieceType::BeginStation | PieceType::MiddleStation => PieceDefinition {
                is_station: true,
                ..straight(0, 0, Slope::Flat, Slope::Flat)
            },
            PieceType::Up25 => straight(0, 16, Slope::Up25, Slope::Up25),
            PieceType::Up60 => straight(0, 64, Slope::Up60, Slope::Up60),
            PieceType::FlatToUp25 => straight(0, 8, Slope::Flat, Slope::Up25),
            PieceType::Up25ToUp60 => straight(0, 32, Slope::Up25, Slope::Up60),
            PieceType::Up60ToUp25 => straight(0, 32, Slope::Up60, Slope::Up25),
            PieceType::Up25ToFlat => straight(0, 8, Slope::Up25, Slope::Flat),
            PieceType::Down25 => straight(16, 0, Slope::Down25, Slope::Down25),
            PieceType::Down60 => straight(64, 0, Slope::Down60, Slope::Down60),
            PieceType::FlatToDown25 => straight(8, 0, Slope::Flat, Slope::Down25),
            PieceType::Down25ToDown60 => straight(32, 0, Slope::Down25, Slope::Down60),
            PieceType::Down60ToDown25 => straight(32, 0, Slope::Down60, Slope::Down25),
            PieceType::Down25ToFlat => straight(8, 0, Slope::Down25, Slope::Flat),
            PieceType::LeftQuarterTurn1Tile => PieceDefinition {
                exit: (0, -T),
                turn: 1,
                ..straight(0, 0, Slope::Flat, Slope::Flat)
            },
            PieceType::RightQuarterTurn1Tile => PieceDefinition {
                exit: (0, T),
                turn: 3,
                ..straight(0, 0, Slope::Flat, Slope::Flat)
            },
            PieceType::LeftQuarterTurn3Tiles => PieceDefinition {
                footprint: LEFT_TURN_3,
                exit: (T, -2 * T),
                turn: 1,
                ..straight(0, 0, Slope::Flat, Slope::Flat)
            },
            PieceType::RightQuarterTurn3Tiles => PieceDefinition {
                footprint: RIGHT_TURN_3,
                exit: (T, 2 * T),
                turn: 3,
                ..straight(0, 0, Slope::Flat, Slope::Flat)
            },
            PieceType::SBendLeft => PieceDefinition {
                footprint: S_BEND_LEFT,
                exit: (3 * T, -T),
                ..straight(0, 0, Slope::Flat, Slope::Flat)
            },
            PieceType::SBendRight => PieceDefinition {
                footprint: S_BEND_RIGHT,
                exit: (3 * T, T),
                ..straight(0, 0, Slope::Flat, Slope::Flat)
            },
        }
    }

    /// Canonical begin/end heights
    pub fn heights(self) -> PieceHeights {
        self.definition().heights
    }

    /// Whether the piece changes height at all
    pub fn is_sloped(self) -> bool {
        let def = self.definition();
        def.begin_slope != Slope::Flat || def.end_slope != Slope::Flat
    }

    /// Whether the piece uses a 60° slope on either edge
    pub fn is_steep(self) -> bool {
        let def = self.definition();
        matches!(def.begin_slope, Slope::Up60 | Slope::Down60)
            || matches!(def.end_slope, Slope::Up60 | Slope::Down60)
    }

    /// Whether the piece turns or shifts sideways
    pub fn is_curved(self) -> bool {
        let def = self.definition();
        def.turn != 0 || def.exit.1 != 0
    }
}

impl fmt::Display for PieceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}
