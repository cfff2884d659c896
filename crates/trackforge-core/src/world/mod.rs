//! Host world collaborators
//!
//! The builder never talks to a concrete game or map. Everything it needs
//! from the host is expressed as a trait here and injected at construction:
//! - [`WorldQuery`]: tile lookup, structure metadata, piece heights and
//!   chain cursor construction
//! - [`TrackCursor`]: the host's index-addressed chain cursor
//! - [`ActionExecutor`]: asynchronous world actions (place, remove, paint)
//! - [`BuildPermissions`]: the global build permission flags
//! - [`ColdStorage`]: snapshots kept across sessions for crash recovery
//! - [`Highlighter`]: viewport emphasis of a segment

pub mod action;
pub mod permissions;
pub mod storage;

pub use action::{
    ActionErrorKind, ActionExecutor, ActionResult, PlaceParams, PlacementMode, RemoveParams,
    TrackAction, GHOST_FLAG,
};
pub use permissions::{BuildPermissions, PermissionFlags};
pub use storage::{ColdSnapshot, ColdStorage, MemoryColdStorage, PaintedSegmentDetails};

use crate::data::{
    Location, MapCoords, PieceHeights, PieceType, Segment, StructureId, StructureInfo,
    TileElement, TrackElement,
};

/// Read-only query capability over the host world
pub trait WorldQuery: Send + Sync {
    /// All elements on the tile containing `coords`, in host order
    fn tile_elements(&self, coords: MapCoords) -> Vec<TileElement>;

    /// Metadata of a structure, `None` for unknown ids
    fn structure(&self, id: StructureId) -> Option<StructureInfo>;

    /// Canonical begin/end heights of a piece kind
    fn piece_heights(&self, piece: PieceType) -> Option<PieceHeights>;

    /// Chain cursor positioned on the element at `index` of the tile at `coords`
    fn track_cursor(&self, coords: MapCoords, index: usize) -> Option<Box<dyn TrackCursor>>;

    /// Track elements on a tile together with their index in the tile
    fn track_elements(&self, coords: MapCoords) -> Vec<(usize, TrackElement)> {
        self.tile_elements(coords)
            .into_iter()
            .enumerate()
            .filter_map(|(index, element)| match element {
                TileElement::Track(track) => Some((index, track)),
                _ => None,
            })
            .collect()
    }
}

/// The host's cursor over one structure's piece chain
///
/// Positions are piece origins: the leading edge of the piece at its
/// starting tile, with the piece's facing.
pub trait TrackCursor: Send {
    /// Origin of the piece under the cursor
    fn position(&self) -> Location;

    /// Kind of the piece under the cursor
    fn piece(&self) -> PieceType;

    /// Where the following piece starts (or would start)
    fn next_position(&self) -> Option<Location>;

    /// Origin of the preceding piece, if there is one
    fn previous_position(&self) -> Option<Location>;

    /// Step to the following piece; false (and unmoved) at the chain end
    fn next(&mut self) -> bool;

    /// Step to the preceding piece; false (and unmoved) at the chain start
    fn previous(&mut self) -> bool;
}

/// Viewport emphasis collaborator
pub trait Highlighter: Send + Sync {
    /// Emphasize the ground under a segment, or clear emphasis with `None`
    fn highlight(&self, segment: Option<&Segment>);
}

/// Highlighter that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHighlighter;

impl Highlighter for NoopHighlighter {
    fn highlight(&self, _segment: Option<&Segment>) {}
}
