//! Structure (ride) metadata

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{PieceType, StructureId};

/// Coarse classification of a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureClassification {
    /// A tracked ride
    Ride,
    /// A stall or shop; its track elements are not part of any chain
    Stall,
    /// Facilities such as toilets or information kiosks
    Facility,
}

/// Enumerated kind of parent structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureType {
    WoodenRollerCoaster,
    SteelRollerCoaster,
    MiniatureRailway,
    Monorail,
    FoodStall,
    InformationKiosk,
}

impl StructureType {
    /// Default classification for this kind
    pub fn classification(self) -> StructureClassification {
        match self {
            StructureType::FoodStall => StructureClassification::Stall,
            StructureType::InformationKiosk => StructureClassification::Facility,
            _ => StructureClassification::Ride,
        }
    }

    /// Whether a piece kind can be built for this structure kind
    pub fn supports(self, piece: PieceType) -> bool {
        match self {
            StructureType::WoodenRollerCoaster | StructureType::SteelRollerCoaster => true,
            StructureType::MiniatureRailway | StructureType::Monorail => !piece.is_steep(),
            StructureType::FoodStall | StructureType::InformationKiosk => false,
        }
    }
}

impl fmt::Display for StructureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A main/additional/supports colour triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TrackColour {
    pub main: u8,
    pub additional: u8,
    pub supports: u8,
}

impl TrackColour {
    /// Create a colour triple
    pub fn new(main: u8, additional: u8, supports: u8) -> Self {
        Self {
            main,
            additional,
            supports,
        }
    }
}

/// Structure metadata as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureInfo {
    pub id: StructureId,
    pub name: String,
    pub structure_type: StructureType,
    pub classification: StructureClassification,
    /// Track colour schemes, indexed by an element's colour scheme index (0..=3)
    pub colour_schemes: [TrackColour; 4],
}

impl StructureInfo {
    /// Create structure metadata with the type's default classification
    pub fn new(id: StructureId, name: impl Into<String>, structure_type: StructureType) -> Self {
        Self {
            id,
            name: name.into(),
            structure_type,
            classification: structure_type.classification(),
            colour_schemes: [TrackColour::default(); 4],
        }
    }

    /// Whether this structure is a stall
    pub fn is_stall(&self) -> bool {
        self.classification == StructureClassification::Stall
    }

    /// Colours of a scheme index, if in range
    pub fn colour_scheme(&self, index: u8) -> Option<TrackColour> {
        self.colour_schemes.get(index as usize).copied()
    }
}
