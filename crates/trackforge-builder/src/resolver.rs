//! Track element resolver
//!
//! Several track elements can share one tile (an elevated piece crossing
//! another, diagonal overlaps, multi-level layouts). The resolver maps a
//! `(structure, location)` pair to the one element it refers to:
//!
//! 1. Collect the tile's track elements, ignoring stall structures.
//! 2. Keep the structure's elements. A single one is the answer.
//! 3. Otherwise break the tie against each candidate's piece origin:
//!    a. exact height and facing;
//!    b. if nothing is exact, same x/y/height with any facing (logged);
//!    c. if several remain, identical pieces collapse to the first;
//!       different pieces are narrowed to the same x/y and the first is
//!       taken (logged as unresolved ambiguity).
//! 4. Nothing for the structure is `NotFound`.

use tracing::{debug, error, warn};

use trackforge_core::{
    geometry, Adjacency, BoxedCursor, BuildDirection, ChainLookup, Location, MapCoords, PieceType,
    ResolveError, Segment, SharedWorld, SlotKind, StructureId, TrackColour, TrackCursor,
    TrackElement,
};

/// A track element together with where it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedElement {
    pub element: TrackElement,
    /// Index of the element within its tile
    pub index: usize,
    /// Coordinates the tile was queried with
    pub coords: MapCoords,
    /// Segment of the piece the element belongs to, when a cursor was available
    pub segment: Option<Segment>,
    /// Origin of the piece the element belongs to
    pub origin: Location,
}

/// Resolves locations to track elements on an injected world
#[derive(Clone)]
pub struct TrackElementResolver {
    world: SharedWorld,
}

impl TrackElementResolver {
    pub fn new(world: SharedWorld) -> Self {
        Self { world }
    }

    pub fn world(&self) -> &SharedWorld {
        &self.world
    }

    fn begin_height(&self, piece: PieceType) -> i32 {
        self.world
            .piece_heights(piece)
            .map(|heights| heights.begin_z)
            .unwrap_or(0)
    }

    fn is_stall(&self, structure_id: StructureId) -> bool {
        self.world
            .structure(structure_id)
            .is_some_and(|structure| structure.is_stall())
    }

    /// Track elements on the tile at `coords`, stalls excluded
    pub fn track_elements_at(&self, coords: MapCoords) -> Vec<ResolvedElement> {
        self.world
            .track_elements(coords)
            .into_iter()
            .filter(|(_, element)| !self.is_stall(element.structure_id))
            .map(|(index, element)| self.describe(coords, index, element))
            .collect()
    }

    fn describe(&self, coords: MapCoords, index: usize, element: TrackElement) -> ResolvedElement {
        let segment = match self.world.track_cursor(coords, index) {
            Some(cursor) => Some(Segment::new(
                cursor.position(),
                element.structure_id,
                cursor.piece(),
                element.structure_type,
            )),
            None => {
                debug!(
                    "No cursor for element {} at ({}, {}), using its own height and facing",
                    index, coords.x, coords.y
                );
                None
            }
        };
        let origin = segment.as_ref().map(Segment::location).unwrap_or_else(|| {
            Location::new(
                coords.x,
                coords.y,
                element.base_height + self.begin_height(element.piece_type),
                element.facing,
            )
        });

        ResolvedElement {
            element,
            index,
            coords,
            segment,
            origin,
        }
    }

    /// Resolve the element of `structure_id` at `location`
    pub fn resolve(
        &self,
        structure_id: StructureId,
        location: Location,
    ) -> Result<ResolvedElement, ResolveError> {
        if self.world.structure(structure_id).is_none() {
            return Err(ResolveError::UnknownStructure { structure_id });
        }

        let mut candidates: Vec<ResolvedElement> = self
            .track_elements_at(location.map_coords())
            .into_iter()
            .filter(|candidate| candidate.element.structure_id == structure_id)
            .collect();

        match candidates.len() {
            0 => {
                debug!("No element of {} at {}", structure_id, location);
                Err(ResolveError::NotFound {
                    structure_id,
                    location,
                })
            }
            1 => Ok(candidates.remove(0)),
            _ => self.break_tie(structure_id, location, candidates),
        }
    }

    fn break_tie(
        &self,
        structure_id: StructureId,
        location: Location,
        candidates: Vec<ResolvedElement>,
    ) -> Result<ResolvedElement, ResolveError> {
        debug!(
            "{} candidates of {} at {}",
            candidates.len(),
            structure_id,
            location
        );

        let (exact, rest): (Vec<_>, Vec<_>) = candidates.into_iter().partition(|candidate| {
            candidate.origin.z == location.z && candidate.origin.facing == location.facing
        });

        let mut chosen = if exact.is_empty() {
            let same_position: Vec<_> = rest
                .into_iter()
                .filter(|candidate| candidate.origin.coord() == location.coord())
                .collect();
            if !same_position.is_empty() {
                warn!(
                    "No exact height/facing match at {}; {} candidates match x, y and height only",
                    location,
                    same_position.len()
                );
            }
            same_position
        } else {
            exact
        };

        match chosen.len() {
            0 => {
                error!(
                    "Overlapping elements of {} at {} but none matches its height",
                    structure_id, location
                );
                Err(ResolveError::NotFound {
                    structure_id,
                    location,
                })
            }
            1 => Ok(chosen.remove(0)),
            _ => {
                let first_piece = chosen[0].element.piece_type;
                if chosen
                    .iter()
                    .all(|candidate| candidate.element.piece_type == first_piece)
                {
                    return Ok(chosen.remove(0));
                }

                let pieces: Vec<PieceType> = chosen.iter().map(|c| c.element.piece_type).collect();
                warn!(
                    "Unresolved overlap at {}: {:?} share height and facing, narrowing by x/y",
                    location, pieces
                );
                let pick = match chosen
                    .iter()
                    .position(|c| c.origin.x == location.x && c.origin.y == location.y)
                {
                    Some(pick) => pick,
                    None => {
                        warn!(
                            "No overlapping piece starts at ({}, {}), taking element {}",
                            location.x, location.y, chosen[0].index
                        );
                        0
                    }
                };
                Ok(chosen.swap_remove(pick))
            }
        }
    }

    /// Resolve the element a segment refers to
    pub fn resolve_segment(&self, segment: &Segment) -> Result<ResolvedElement, ResolveError> {
        self.resolve(segment.structure_id(), segment.location())
    }

    /// Chain cursor positioned on the element of `structure_id` at `location`
    ///
    /// The host cursor is index-addressed, so the element's index within
    /// its tile is resolved first.
    pub fn cursor_at(
        &self,
        structure_id: StructureId,
        location: Location,
    ) -> Result<BoxedCursor, ResolveError> {
        let resolved = self.resolve(structure_id, location)?;
        self.world
            .track_cursor(resolved.coords, resolved.index)
            .ok_or(ResolveError::CursorUnavailable {
                coords: resolved.coords,
                index: resolved.index,
            })
    }

    /// Chain cursor positioned on a segment
    pub fn cursor_at_segment(&self, segment: &Segment) -> Result<BoxedCursor, ResolveError> {
        self.cursor_at(segment.structure_id(), segment.location())
    }

    /// What occupies the slot following the cursor in `direction`
    ///
    /// Only the cursor's look-ahead positions are read; the cursor itself
    /// never moves.
    pub fn next_or_previous_kind(
        &self,
        structure_id: StructureId,
        cursor: &dyn TrackCursor,
        direction: BuildDirection,
    ) -> SlotKind {
        let following = match direction {
            BuildDirection::Next => cursor.next_position(),
            BuildDirection::Previous => cursor.previous_position(),
        };
        let Some(position) = following else {
            debug!("No {} position from {}", direction, cursor.position());
            return SlotKind::Empty;
        };

        let elements: Vec<TrackElement> = self
            .world
            .track_elements(position.map_coords())
            .into_iter()
            .map(|(_, element)| element)
            .filter(|element| element.structure_id == structure_id)
            .collect();
        if elements.is_empty() {
            return SlotKind::Empty;
        }

        let matching: Vec<&TrackElement> = elements
            .iter()
            .filter(|element| {
                let begin = self.begin_height(element.piece_type);
                element.facing == position.facing
                    && (element.base_height + begin == position.z
                        || element.base_height - begin == position.z
                        || element.base_height == position.z)
            })
            .collect();

        let found = matching
            .iter()
            .find(|element| element.base_height == position.z)
            .or_else(|| matching.first());
        match found {
            Some(element) if element.is_ghost => SlotKind::Ghost,
            Some(_) => SlotKind::Real,
            None => {
                debug!(
                    "{} elements of {} at {} but none at height {} facing {}",
                    elements.len(),
                    structure_id,
                    position,
                    position.z,
                    position.facing
                );
                SlotKind::Empty
            }
        }
    }

    /// Current position adjacent to a segment, read from a fresh cursor
    pub fn following_position(
        &self,
        segment: &Segment,
        direction: BuildDirection,
    ) -> Result<Option<Location>, ResolveError> {
        let cursor = self.cursor_at_segment(segment)?;
        Ok(match direction {
            BuildDirection::Next => cursor.next_position(),
            BuildDirection::Previous => cursor.previous_position(),
        })
    }

    /// Segment snapshot of the piece under a cursor
    pub fn segment_at_cursor(
        &self,
        structure_id: StructureId,
        cursor: &dyn TrackCursor,
    ) -> Result<Segment, ResolveError> {
        let position = cursor.position();
        let resolved = self.resolve(structure_id, position)?;
        Ok(Segment::new(
            position,
            structure_id,
            resolved.element.piece_type,
            resolved.element.structure_type,
        ))
    }

    /// Every element covered by a segment, one per footprint tile
    pub fn all_segment_elements(&self, segment: &Segment) -> Vec<ResolvedElement> {
        let location = segment.location();
        geometry::footprint(location, segment.piece_type())
            .into_iter()
            .filter_map(|coord| {
                let tile = Location::new(coord.x, coord.y, coord.z, location.facing);
                match self.resolve(segment.structure_id(), tile) {
                    Ok(resolved) => Some(resolved),
                    Err(err) => {
                        debug!("Footprint tile of {} not resolved: {}", segment, err);
                        None
                    }
                }
            })
            .collect()
    }

    /// Colours of the scheme the segment's element uses
    pub fn track_colours(&self, segment: Option<&Segment>) -> Option<TrackColour> {
        let segment = segment?;
        let resolved = self.resolve_segment(segment).ok()?;
        self.world
            .structure(segment.structure_id())?
            .colour_scheme(resolved.element.colour_scheme)
    }
}

impl ChainLookup for TrackElementResolver {
    fn adjacency(&self, segment: &Segment) -> Adjacency {
        match self.cursor_at_segment(segment) {
            Ok(cursor) => Adjacency {
                next: cursor.next_position(),
                previous: cursor.previous_position(),
            },
            Err(err) => {
                debug!("No adjacency for {}: {}", segment, err);
                Adjacency::default()
            }
        }
    }

    fn has_real_neighbour(&self, segment: &Segment, direction: BuildDirection) -> bool {
        let Ok(mut cursor) = self.cursor_at_segment(segment) else {
            return false;
        };
        let moved = match direction {
            BuildDirection::Next => cursor.next(),
            BuildDirection::Previous => cursor.previous(),
        };
        moved
            && self
                .resolve(segment.structure_id(), cursor.position())
                .is_ok_and(|resolved| !resolved.element.is_ghost)
    }
}

impl std::fmt::Debug for TrackElementResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackElementResolver").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use trackforge_core::{
        Facing, PieceHeights, StructureInfo, StructureType, SurfaceElement, TileElement,
        WorldQuery,
    };

    /// Fixed tile snapshot; cursors report a scripted origin per element
    #[derive(Default)]
    struct Snapshot {
        tiles: HashMap<(i32, i32), Vec<TileElement>>,
        origins: HashMap<((i32, i32), usize), Location>,
        structures: Vec<StructureInfo>,
    }

    struct FixedCursor {
        position: Location,
        piece: PieceType,
        next: Option<Location>,
    }

    impl TrackCursor for FixedCursor {
        fn position(&self) -> Location {
            self.position
        }
        fn piece(&self) -> PieceType {
            self.piece
        }
        fn next_position(&self) -> Option<Location> {
            self.next
        }
        fn previous_position(&self) -> Option<Location> {
            None
        }
        fn next(&mut self) -> bool {
            false
        }
        fn previous(&mut self) -> bool {
            false
        }
    }

    impl WorldQuery for Snapshot {
        fn tile_elements(&self, coords: MapCoords) -> Vec<TileElement> {
            self.tiles
                .get(&coords.tile_index())
                .cloned()
                .unwrap_or_default()
        }

        fn structure(&self, id: StructureId) -> Option<StructureInfo> {
            self.structures.iter().find(|s| s.id == id).cloned()
        }

        fn piece_heights(&self, piece: PieceType) -> Option<PieceHeights> {
            Some(piece.heights())
        }

        fn track_cursor(&self, coords: MapCoords, index: usize) -> Option<Box<dyn TrackCursor>> {
            let tile = coords.tile_index();
            let position = *self.origins.get(&(tile, index))?;
            let element = self.tiles.get(&tile)?.get(index)?.as_track()?.clone();
            Some(Box::new(FixedCursor {
                position,
                piece: element.piece_type,
                next: Some(geometry::exit_location(position, element.piece_type)),
            }))
        }
    }

    fn track(structure: u16, piece: PieceType, base: i32, facing: Facing, ghost: bool) -> TrackElement {
        TrackElement {
            structure_id: StructureId(structure),
            structure_type: StructureType::SteelRollerCoaster,
            piece_type: piece,
            base_height: base,
            facing,
            colour_scheme: 0,
            sequence: 0,
            is_ghost: ghost,
        }
    }

    impl Snapshot {
        fn with_structures() -> Self {
            Self {
                structures: vec![
                    StructureInfo::new(StructureId(4), "Coaster", StructureType::SteelRollerCoaster),
                    StructureInfo::new(StructureId(7), "Burger Bar", StructureType::FoodStall),
                ],
                ..Default::default()
            }
        }

        fn push(&mut self, x: i32, y: i32, element: TrackElement) -> usize {
            let tile = MapCoords::new(x, y).tile_index();
            let elements = self.tiles.entry(tile).or_default();
            let index = elements.len();
            let begin = element.piece_type.heights().begin_z;
            self.origins.insert(
                (tile, index),
                Location::new(x, y, element.base_height + begin, element.facing),
            );
            elements.push(TileElement::Track(element));
            index
        }
    }

    fn resolver(snapshot: Snapshot) -> TrackElementResolver {
        TrackElementResolver::new(Arc::new(snapshot))
    }

    #[test]
    fn test_single_candidate_is_returned() {
        let mut snapshot = Snapshot::with_structures();
        snapshot
            .tiles
            .entry((3, 3))
            .or_default()
            .push(TileElement::Surface(SurfaceElement { base_height: 0 }));
        snapshot.push(100, 100, track(4, PieceType::Flat, 0, Facing::NORTH_EAST, false));

        let resolver = resolver(snapshot);
        let resolved = resolver
            .resolve(StructureId(4), Location::new(100, 100, 0, Facing::NORTH_EAST))
            .expect("resolved");
        assert_eq!(resolved.index, 1);
        assert_eq!(resolved.element.piece_type, PieceType::Flat);
    }

    #[test]
    fn test_stalls_are_ignored() {
        let mut snapshot = Snapshot::with_structures();
        snapshot.push(100, 100, track(7, PieceType::Flat, 0, Facing::NORTH_EAST, false));

        let resolver = resolver(snapshot);
        assert!(resolver.track_elements_at(MapCoords::new(100, 100)).is_empty());
        assert!(matches!(
            resolver.resolve(StructureId(7), Location::new(100, 100, 0, Facing::NORTH_EAST)),
            Err(ResolveError::NotFound { .. })
        ));
    }

    #[test]
    fn test_unknown_structure_is_reported() {
        let resolver = resolver(Snapshot::with_structures());
        assert_eq!(
            resolver.resolve(StructureId(99), Location::new(0, 0, 0, Facing::NORTH_EAST)),
            Err(ResolveError::UnknownStructure {
                structure_id: StructureId(99)
            })
        );
    }

    #[test]
    fn test_exact_height_and_facing_wins() {
        let mut snapshot = Snapshot::with_structures();
        snapshot.push(64, 64, track(4, PieceType::Flat, 0, Facing::NORTH_EAST, false));
        snapshot.push(64, 64, track(4, PieceType::Flat, 48, Facing::SOUTH_EAST, false));
        let resolver = resolver(snapshot);

        let low = resolver
            .resolve(StructureId(4), Location::new(64, 64, 0, Facing::NORTH_EAST))
            .expect("low piece");
        let high = resolver
            .resolve(StructureId(4), Location::new(64, 64, 48, Facing::SOUTH_EAST))
            .expect("high piece");
        assert_eq!(low.index, 0);
        assert_eq!(high.index, 1);
    }

    #[test]
    fn test_position_fallback_ignores_facing() {
        let mut snapshot = Snapshot::with_structures();
        snapshot.push(64, 64, track(4, PieceType::Flat, 0, Facing::NORTH_EAST, false));
        snapshot.push(64, 64, track(4, PieceType::Up25, 32, Facing::SOUTH_EAST, false));
        let resolver = resolver(snapshot);

        let resolved = resolver
            .resolve(StructureId(4), Location::new(64, 64, 32, Facing::SOUTH_WEST))
            .expect("matched on position");
        assert_eq!(resolved.element.piece_type, PieceType::Up25);
    }

    #[test]
    fn test_no_height_match_is_not_found() {
        let mut snapshot = Snapshot::with_structures();
        snapshot.push(64, 64, track(4, PieceType::Flat, 0, Facing::NORTH_EAST, false));
        snapshot.push(64, 64, track(4, PieceType::Flat, 48, Facing::NORTH_EAST, false));
        let resolver = resolver(snapshot);

        assert!(resolver
            .resolve(StructureId(4), Location::new(64, 64, 16, Facing::NORTH_EAST))
            .is_err());
    }

    #[test]
    fn test_identical_pieces_collapse_to_first() {
        let mut snapshot = Snapshot::with_structures();
        snapshot.push(64, 64, track(4, PieceType::Flat, 0, Facing::NORTH_EAST, true));
        snapshot.push(64, 64, track(4, PieceType::Flat, 0, Facing::NORTH_EAST, false));
        let resolver = resolver(snapshot);

        let resolved = resolver
            .resolve(StructureId(4), Location::new(64, 64, 0, Facing::NORTH_EAST))
            .expect("resolved");
        assert_eq!(resolved.index, 0);
    }

    #[test]
    fn test_mixed_overlap_narrows_by_position() {
        let mut snapshot = Snapshot::with_structures();
        snapshot.push(64, 64, track(4, PieceType::Flat, 0, Facing::NORTH_EAST, false));
        snapshot.push(70, 64, track(4, PieceType::Up25, 0, Facing::NORTH_EAST, false));
        let resolver = resolver(snapshot);

        let resolved = resolver
            .resolve(StructureId(4), Location::new(70, 64, 0, Facing::NORTH_EAST))
            .expect("narrowed by x/y");
        assert_eq!(resolved.index, 1);
        assert_eq!(resolved.element.piece_type, PieceType::Up25);

        let resolved = resolver
            .resolve(StructureId(4), Location::new(64, 64, 0, Facing::NORTH_EAST))
            .expect("narrowed by x/y");
        assert_eq!(resolved.element.piece_type, PieceType::Flat);

        // neither piece starts here, the first one is taken
        let resolved = resolver
            .resolve(StructureId(4), Location::new(80, 64, 0, Facing::NORTH_EAST))
            .expect("first candidate");
        assert_eq!(resolved.index, 0);
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let mut snapshot = Snapshot::with_structures();
        snapshot.push(64, 64, track(4, PieceType::Flat, 0, Facing::NORTH_EAST, false));
        snapshot.push(70, 64, track(4, PieceType::Up25, 0, Facing::NORTH_EAST, true));
        snapshot.push(64, 64, track(4, PieceType::Flat, 48, Facing::SOUTH_EAST, false));
        snapshot.push(64, 64, track(7, PieceType::Flat, 0, Facing::NORTH_EAST, false));
        let resolver = resolver(snapshot);

        for location in [
            Location::new(64, 64, 0, Facing::NORTH_EAST),
            Location::new(70, 64, 0, Facing::NORTH_EAST),
            Location::new(80, 64, 0, Facing::NORTH_EAST),
            Location::new(64, 64, 48, Facing::NORTH_WEST),
        ] {
            let first = resolver.resolve(StructureId(4), location);
            for _ in 0..5 {
                assert_eq!(resolver.resolve(StructureId(4), location), first);
            }
            assert!(first.is_ok(), "{} resolves", location);
        }
    }

    #[test]
    fn test_probe_reports_ghost_and_real() {
        let mut snapshot = Snapshot::with_structures();
        snapshot.push(100, 100, track(4, PieceType::Flat, 0, Facing::NORTH_EAST, false));
        snapshot.push(132, 100, track(4, PieceType::FlatToUp25, 0, Facing::NORTH_EAST, true));
        snapshot.push(132, 100, track(4, PieceType::Flat, 96, Facing::SOUTH_WEST, false));
        let resolver = resolver(snapshot);

        let cursor = resolver
            .cursor_at(StructureId(4), Location::new(100, 100, 0, Facing::NORTH_EAST))
            .expect("cursor");
        let before = cursor.position();
        assert_eq!(
            resolver.next_or_previous_kind(StructureId(4), cursor.as_ref(), BuildDirection::Next),
            SlotKind::Ghost
        );
        assert_eq!(
            resolver.next_or_previous_kind(
                StructureId(4),
                cursor.as_ref(),
                BuildDirection::Previous
            ),
            SlotKind::Empty
        );
        assert_eq!(cursor.position(), before);
    }

    #[test]
    fn test_probe_ignores_pieces_at_other_heights() {
        let mut snapshot = Snapshot::with_structures();
        snapshot.push(100, 100, track(4, PieceType::Flat, 0, Facing::NORTH_EAST, false));
        snapshot.push(132, 100, track(4, PieceType::Flat, 96, Facing::NORTH_EAST, false));
        let resolver = resolver(snapshot);

        let cursor = resolver
            .cursor_at(StructureId(4), Location::new(100, 100, 0, Facing::NORTH_EAST))
            .expect("cursor");
        assert_eq!(
            resolver.next_or_previous_kind(StructureId(4), cursor.as_ref(), BuildDirection::Next),
            SlotKind::Empty
        );
    }

    #[test]
    fn test_track_colours() {
        let mut snapshot = Snapshot::with_structures();
        snapshot.structures[0].colour_schemes[1] = TrackColour::new(9, 8, 7);
        let mut element = track(4, PieceType::Flat, 0, Facing::NORTH_EAST, false);
        element.colour_scheme = 1;
        snapshot.push(100, 100, element);
        let resolver = resolver(snapshot);

        let segment = Segment::new(
            Location::new(100, 100, 0, Facing::NORTH_EAST),
            StructureId(4),
            PieceType::Flat,
            StructureType::SteelRollerCoaster,
        );
        assert_eq!(
            resolver.track_colours(Some(&segment)),
            Some(TrackColour::new(9, 8, 7))
        );
        assert_eq!(resolver.track_colours(None), None);
    }
}
