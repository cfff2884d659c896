//! Event type definitions for the model event bus.
//!
//! Every observable store of the segment model publishes a change event
//! here; build outcomes are published as well. Events are cloneable and
//! serializable for logging/replay.

use serde::{Deserialize, Serialize};

use crate::data::{BuildDirection, PieceType, Segment};
use crate::world::PlacementMode;

/// Events published by the segment model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelEvent {
    /// The selected segment changed
    SelectedSegmentChanged {
        segment: Option<Segment>,
    },
    /// The preview (ghost) segment changed
    PreviewSegmentChanged {
        segment: Option<Segment>,
    },
    /// The set of buildable pieces changed
    BuildableTypesChanged {
        pieces: Vec<PieceType>,
    },
    /// The build direction changed
    BuildDirectionChanged {
        direction: Option<BuildDirection>,
    },
    /// The piece selected for building changed
    SelectedBuildChanged {
        piece: Option<PieceType>,
    },
    /// A piece was placed in the world
    PieceBuilt {
        segment: Segment,
        mode: PlacementMode,
    },
    /// A placement was rejected by the world
    BuildFailed {
        piece: PieceType,
        mode: PlacementMode,
        reason: String,
    },
    /// The model was torn down
    Closed,
}

impl ModelEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            ModelEvent::SelectedSegmentChanged { .. }
            | ModelEvent::BuildableTypesChanged { .. }
            | ModelEvent::BuildDirectionChanged { .. }
            | ModelEvent::SelectedBuildChanged { .. } => EventCategory::Selection,
            ModelEvent::PreviewSegmentChanged { .. } => EventCategory::Preview,
            ModelEvent::PieceBuilt { .. } | ModelEvent::BuildFailed { .. } => {
                EventCategory::Construction
            }
            ModelEvent::Closed => EventCategory::Lifecycle,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            ModelEvent::SelectedSegmentChanged { segment } => match segment {
                Some(segment) => format!("Selected {}", segment),
                None => "Selection cleared".to_string(),
            },
            ModelEvent::PreviewSegmentChanged { segment } => match segment {
                Some(segment) => format!("Preview {}", segment),
                None => "Preview cleared".to_string(),
            },
            ModelEvent::BuildableTypesChanged { pieces } => {
                format!("{} buildable pieces", pieces.len())
            }
            ModelEvent::BuildDirectionChanged { direction } => match direction {
                Some(direction) => format!("Building {}", direction),
                None => "No build direction".to_string(),
            },
            ModelEvent::SelectedBuildChanged { piece } => match piece {
                Some(piece) => format!("Selected build {}", piece),
                None => "No build selected".to_string(),
            },
            ModelEvent::PieceBuilt { segment, mode } => format!("Built {} {}", mode, segment),
            ModelEvent::BuildFailed {
                piece,
                mode,
                reason,
            } => format!("Failed to build {} {}: {}", mode, piece, reason),
            ModelEvent::Closed => "Model closed".to_string(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Selection, direction and buildable set changes.
    Selection,
    /// Ghost preview changes.
    Preview,
    /// Placement outcomes.
    Construction,
    /// Teardown.
    Lifecycle,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Selection => write!(f, "Selection"),
            EventCategory::Preview => write!(f, "Preview"),
            EventCategory::Construction => write!(f, "Construction"),
            EventCategory::Lifecycle => write!(f, "Lifecycle"),
        }
    }
}
