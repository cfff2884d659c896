use trackforge_core::{BuildDirection, Message, ModelEvent, PieceType, Segment, SlotKind};

/// Observable state of the segment model
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelState {
    /// Piece the user is building from
    pub selected: Option<Segment>,
    /// Ghost currently shown for the selected build
    pub preview: Option<Segment>,
    pub build_direction: Option<BuildDirection>,
    pub selected_build: Option<PieceType>,
    pub buildable: Vec<PieceType>,
}

impl ModelState {
    pub fn new(build_direction: Option<BuildDirection>) -> Self {
        Self {
            build_direction,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_none()
            && self.preview.is_none()
            && self.selected_build.is_none()
            && self.buildable.is_empty()
    }
}

/// Inputs driving the model
///
/// User inputs come from the public API; the rest are results of effects
/// fed back by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelInput {
    SelectSegment(Option<Segment>),
    SetBuildDirection(Option<BuildDirection>),
    SelectBuild(Option<PieceType>),
    Commit,
    Close,
    /// Seed selection and preview from a previous session
    Recover {
        selected: Option<Segment>,
        preview: Option<Segment>,
    },
    SlotProbed {
        piece: PieceType,
        kind: SlotKind,
    },
    PreviewPlaced(Segment),
    PreviewFailed {
        piece: PieceType,
        reason: String,
    },
    Committed(Segment),
    CommitFailed {
        piece: PieceType,
        reason: String,
        ghost_removed: bool,
    },
}

/// Side effects requested by a transition, run in order by the dispatcher
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Paint(Segment),
    RestorePaint,
    Highlight(Option<Segment>),
    PersistSelected(Option<Segment>),
    PersistPreview(Option<Segment>),
    /// Probe the slot after `segment`; answers with `SlotProbed`
    ProbeSlot {
        segment: Segment,
        direction: BuildDirection,
        piece: PieceType,
    },
    /// Place a ghost; answers with `PreviewPlaced` or `PreviewFailed`
    PlaceGhost {
        segment: Segment,
        direction: BuildDirection,
        piece: PieceType,
    },
    /// Remove the ghost in the slot, then place a new one
    ReplaceGhost {
        segment: Segment,
        direction: BuildDirection,
        piece: PieceType,
    },
    /// Remove a ghost; a missing or already committed piece is ignored
    RemovePreview(Segment),
    /// Answers with `Committed` or `CommitFailed`
    CommitBuild {
        segment: Segment,
        direction: BuildDirection,
        piece: PieceType,
        remove_ghost: bool,
    },
    RejectCommit {
        reason: String,
    },
    Publish(ModelEvent),
    Notify(Message),
}
