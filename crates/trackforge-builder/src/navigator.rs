//! Chain navigator
//!
//! Walks one structure's piece chain. The host cursor is addressed by
//! tile and element index, so a navigator is always created through the
//! resolver, which finds the element index first.

use trackforge_core::{
    BoxedCursor, BuildDirection, Location, PieceType, ResolveError, Segment, SlotKind, StructureId,
};

use crate::resolver::TrackElementResolver;

/// Cursor over a structure's chain with slot probing
pub struct ChainNavigator {
    resolver: TrackElementResolver,
    structure_id: StructureId,
    cursor: BoxedCursor,
}

impl ChainNavigator {
    /// Navigator positioned on the element of `structure_id` at `location`
    pub fn at(
        resolver: &TrackElementResolver,
        structure_id: StructureId,
        location: Location,
    ) -> Result<Self, ResolveError> {
        let cursor = resolver.cursor_at(structure_id, location)?;
        Ok(Self {
            resolver: resolver.clone(),
            structure_id,
            cursor,
        })
    }

    /// Navigator positioned on a segment
    pub fn at_segment(
        resolver: &TrackElementResolver,
        segment: &Segment,
    ) -> Result<Self, ResolveError> {
        Self::at(resolver, segment.structure_id(), segment.location())
    }

    pub fn structure_id(&self) -> StructureId {
        self.structure_id
    }

    /// Origin of the piece under the cursor
    pub fn position(&self) -> Location {
        self.cursor.position()
    }

    pub fn piece(&self) -> PieceType {
        self.cursor.piece()
    }

    /// Step forward; false when the chain ends here
    pub fn next(&mut self) -> bool {
        self.cursor.next()
    }

    /// Step backward; false when the chain starts here
    pub fn previous(&mut self) -> bool {
        self.cursor.previous()
    }

    pub fn step(&mut self, direction: BuildDirection) -> bool {
        match direction {
            BuildDirection::Next => self.next(),
            BuildDirection::Previous => self.previous(),
        }
    }

    /// Where the adjacent piece in `direction` starts, without moving
    pub fn following_position(&self, direction: BuildDirection) -> Option<Location> {
        match direction {
            BuildDirection::Next => self.cursor.next_position(),
            BuildDirection::Previous => self.cursor.previous_position(),
        }
    }

    /// What occupies the slot in `direction`, without moving
    pub fn peek(&self, direction: BuildDirection) -> SlotKind {
        self.resolver
            .next_or_previous_kind(self.structure_id, self.cursor.as_ref(), direction)
    }

    pub fn peek_next(&self) -> SlotKind {
        self.peek(BuildDirection::Next)
    }

    pub fn peek_previous(&self) -> SlotKind {
        self.peek(BuildDirection::Previous)
    }

    /// Segment snapshot of the piece under the cursor
    pub fn segment(&self) -> Result<Segment, ResolveError> {
        self.resolver
            .segment_at_cursor(self.structure_id, self.cursor.as_ref())
    }
}

impl std::fmt::Debug for ChainNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainNavigator")
            .field("structure_id", &self.structure_id)
            .field("position", &self.cursor.position())
            .field("piece", &self.cursor.piece())
            .finish()
    }
}
