//! In-memory world state
//!
//! Pieces are stored by id; tile contents are derived from piece
//! footprints on every query, surfaces first and pieces in id order, so
//! element indices are stable for a given set of pieces.

use std::collections::{BTreeMap, HashMap};

use trackforge_core::{
    geometry, thread_safe_rw, BuildPermissions, Highlighter, Location, MapCoords, PermissionFlags,
    PieceHeights, PieceType, Segment, StructureId, StructureInfo, StructureType, SurfaceElement,
    ThreadSafeRw, TileElement, TrackColour, TrackCursor, TrackElement, WorldQuery,
};

use crate::cursor::SimCursor;
use crate::executor::{ActionRecord, InjectedFailure};

/// Height every piece occupies above its highest edge
pub const CLEARANCE: i32 = 16;

/// Identifier of a piece in the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PieceId(pub u32);

/// A placed piece
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimPiece {
    pub id: PieceId,
    pub structure_id: StructureId,
    pub structure_type: StructureType,
    pub piece_type: PieceType,
    /// Leading edge of the piece
    pub origin: Location,
    /// Lowest point, as reported on tile elements
    pub base_z: i32,
    pub colour_scheme: u8,
    pub is_ghost: bool,
}

impl SimPiece {
    /// Where the following piece starts
    pub fn exit(&self) -> Location {
        geometry::exit_location(self.origin, self.piece_type)
    }

    /// Tiles covered, with the element sequence on each
    pub fn tiles(&self) -> Vec<((i32, i32), u8)> {
        geometry::footprint(self.origin, self.piece_type)
            .into_iter()
            .enumerate()
            .map(|(sequence, coord)| (coord.map_coords().tile_index(), sequence as u8))
            .collect()
    }

    /// Sequence of the element on a tile, if the piece covers it
    pub fn sequence_on(&self, tile: (i32, i32)) -> Option<u8> {
        self.tiles()
            .into_iter()
            .find(|(covered, _)| *covered == tile)
            .map(|(_, sequence)| sequence)
    }

    /// Vertical range `[bottom, top)` the piece occupies
    pub fn span(&self) -> (i32, i32) {
        let heights = self.piece_type.heights();
        (
            self.base_z,
            self.base_z + heights.begin_z.max(heights.end_z) + CLEARANCE,
        )
    }

    pub fn overlaps(&self, other: &SimPiece) -> bool {
        let (bottom, top) = self.span();
        let (other_bottom, other_top) = other.span();
        bottom < other_top
            && other_bottom < top
            && self
                .tiles()
                .iter()
                .any(|(tile, _)| other.sequence_on(*tile).is_some())
    }

    pub fn segment(&self) -> Segment {
        Segment::new(
            self.origin,
            self.structure_id,
            self.piece_type,
            self.structure_type,
        )
    }

    fn element_on(&self, tile: (i32, i32)) -> Option<TrackElement> {
        Some(TrackElement {
            structure_id: self.structure_id,
            structure_type: self.structure_type,
            piece_type: self.piece_type,
            base_height: self.base_z,
            facing: self.origin.facing,
            colour_scheme: self.colour_scheme,
            sequence: self.sequence_on(tile)?,
            is_ghost: self.is_ghost,
        })
    }
}

/// Element of a tile together with the piece it came from
#[derive(Debug, Clone)]
pub(crate) enum TileEntry {
    Surface(i32),
    Piece(PieceId, TrackElement),
}

#[derive(Debug, Default)]
pub(crate) struct SimState {
    pub structures: BTreeMap<StructureId, StructureInfo>,
    pub pieces: BTreeMap<PieceId, SimPiece>,
    pub surfaces: HashMap<(i32, i32), i32>,
    pub next_id: u32,
    pub paused: bool,
    pub permissions: PermissionFlags,
    pub log: Vec<ActionRecord>,
    pub failures: Vec<InjectedFailure>,
    pub highlighted: Option<Segment>,
}

impl SimState {
    pub fn tile_entries(&self, coords: MapCoords) -> Vec<TileEntry> {
        let tile = coords.tile_index();
        let mut entries: Vec<TileEntry> = self
            .surfaces
            .get(&tile)
            .map(|z| TileEntry::Surface(*z))
            .into_iter()
            .collect();
        entries.extend(self.pieces.values().filter_map(|piece| {
            piece
                .element_on(tile)
                .map(|element| TileEntry::Piece(piece.id, element))
        }));
        entries
    }

    pub fn insert(&mut self, mut piece: SimPiece) -> PieceId {
        self.next_id += 1;
        let id = PieceId(self.next_id);
        piece.id = id;
        self.pieces.insert(id, piece);
        id
    }

    /// First piece of the structure starting exactly at `origin`
    pub fn piece_starting_at(
        &self,
        structure_id: StructureId,
        origin: Location,
    ) -> Option<&SimPiece> {
        self.pieces
            .values()
            .find(|piece| piece.structure_id == structure_id && piece.origin == origin)
    }

    /// First piece of the structure ending exactly at `exit`
    pub fn piece_ending_at(
        &self,
        structure_id: StructureId,
        exit: Location,
    ) -> Option<&SimPiece> {
        self.pieces
            .values()
            .find(|piece| piece.structure_id == structure_id && piece.exit() == exit)
    }
}

/// In-memory host world
///
/// Implements [`WorldQuery`], [`trackforge_core::ActionExecutor`],
/// [`BuildPermissions`] and [`Highlighter`]. Cheap to clone; clones share
/// the same world.
#[derive(Clone, Default)]
pub struct SimWorld {
    pub(crate) state: ThreadSafeRw<SimState>,
}

impl SimWorld {
    pub fn new() -> Self {
        Self {
            state: thread_safe_rw(SimState::default()),
        }
    }

    pub fn add_structure(
        &self,
        id: StructureId,
        name: impl Into<String>,
        structure_type: StructureType,
    ) -> StructureId {
        self.state
            .write()
            .structures
            .insert(id, StructureInfo::new(id, name, structure_type));
        id
    }

    /// Overwrite the colours of one of a structure's schemes
    pub fn set_scheme_colours(&self, id: StructureId, scheme: u8, colours: TrackColour) {
        if let Some(structure) = self.state.write().structures.get_mut(&id) {
            if let Some(slot) = structure.colour_schemes.get_mut(scheme as usize) {
                *slot = colours;
            }
        }
    }

    pub fn add_surface(&self, x: i32, y: i32, z: i32) {
        self.state
            .write()
            .surfaces
            .insert(MapCoords::new(x, y).tile_index(), z);
    }

    /// Put a piece into the world directly, without any checks
    ///
    /// `origin` is the leading edge of the piece.
    pub fn place_piece(
        &self,
        structure_id: StructureId,
        piece_type: PieceType,
        origin: Location,
        is_ghost: bool,
    ) -> PieceId {
        let mut state = self.state.write();
        let structure_type = state
            .structures
            .get(&structure_id)
            .map(|structure| structure.structure_type)
            .unwrap_or(StructureType::SteelRollerCoaster);
        let base_z = origin.z + base_offset(piece_type.heights());
        state.insert(SimPiece {
            id: PieceId(0),
            structure_id,
            structure_type,
            piece_type,
            origin,
            base_z,
            colour_scheme: 0,
            is_ghost,
        })
    }

    /// Lay a chain of pieces starting at `origin`; returns their ids in order
    pub fn place_chain(
        &self,
        structure_id: StructureId,
        origin: Location,
        pieces: &[PieceType],
    ) -> Vec<PieceId> {
        let mut location = origin;
        pieces
            .iter()
            .map(|piece| {
                let id = self.place_piece(structure_id, *piece, location, false);
                location = geometry::exit_location(location, *piece);
                id
            })
            .collect()
    }

    pub fn piece(&self, id: PieceId) -> Option<SimPiece> {
        self.state.read().pieces.get(&id).cloned()
    }

    pub fn pieces(&self) -> Vec<SimPiece> {
        self.state.read().pieces.values().cloned().collect()
    }

    pub fn ghosts(&self) -> Vec<SimPiece> {
        self.state
            .read()
            .pieces
            .values()
            .filter(|piece| piece.is_ghost)
            .cloned()
            .collect()
    }

    pub fn real_pieces(&self) -> Vec<SimPiece> {
        self.state
            .read()
            .pieces
            .values()
            .filter(|piece| !piece.is_ghost)
            .cloned()
            .collect()
    }

    /// Pieces whose leading edge is at `origin`
    pub fn pieces_at(&self, origin: Location) -> Vec<SimPiece> {
        self.state
            .read()
            .pieces
            .values()
            .filter(|piece| piece.origin == origin)
            .cloned()
            .collect()
    }

    pub fn action_log(&self) -> Vec<ActionRecord> {
        self.state.read().log.clone()
    }

    pub fn clear_action_log(&self) {
        self.state.write().log.clear();
    }

    pub fn set_paused(&self, paused: bool) {
        self.state.write().paused = paused;
    }

    /// Segment last passed to the highlighter
    pub fn highlighted(&self) -> Option<Segment> {
        self.state.read().highlighted.clone()
    }

    /// Segment snapshot of the piece with `id`
    pub fn segment_of(&self, id: PieceId) -> Option<Segment> {
        self.piece(id).map(|piece| piece.segment())
    }
}

/// Offset from the leading edge down to the piece's lowest point
pub(crate) fn base_offset(heights: PieceHeights) -> i32 {
    if heights.begin_z > 0 {
        -heights.begin_z
    } else {
        0
    }
}

impl WorldQuery for SimWorld {
    fn tile_elements(&self, coords: MapCoords) -> Vec<TileElement> {
        self.state
            .read()
            .tile_entries(coords)
            .into_iter()
            .map(|entry| match entry {
                TileEntry::Surface(base_height) => {
                    TileElement::Surface(SurfaceElement { base_height })
                }
                TileEntry::Piece(_, element) => TileElement::Track(element),
            })
            .collect()
    }

    fn structure(&self, id: StructureId) -> Option<StructureInfo> {
        self.state.read().structures.get(&id).cloned()
    }

    fn piece_heights(&self, piece: PieceType) -> Option<PieceHeights> {
        Some(piece.heights())
    }

    fn track_cursor(&self, coords: MapCoords, index: usize) -> Option<Box<dyn TrackCursor>> {
        let piece = {
            let state = self.state.read();
            match state.tile_entries(coords).into_iter().nth(index)? {
                TileEntry::Piece(id, _) => state.pieces.get(&id)?.clone(),
                TileEntry::Surface(_) => return None,
            }
        };
        Some(Box::new(SimCursor::new(self.state.clone(), piece)))
    }
}

impl BuildPermissions for SimWorld {
    fn flags(&self) -> PermissionFlags {
        self.state.read().permissions
    }

    fn set_flags(&self, flags: PermissionFlags) {
        self.state.write().permissions = flags;
    }
}

impl Highlighter for SimWorld {
    fn highlight(&self, segment: Option<&Segment>) {
        self.state.write().highlighted = segment.cloned();
    }
}

impl std::fmt::Debug for SimWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("SimWorld")
            .field("structures", &state.structures.len())
            .field("pieces", &state.pieces.len())
            .field("paused", &state.paused)
            .finish()
    }
}
