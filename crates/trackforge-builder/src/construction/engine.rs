use tracing::{debug, warn};

use trackforge_core::{
    geometry, ActionResult, BuildDirection, BuildError, Location, PieceType, PlaceParams,
    PlacementMode, RemoveParams, Result, Segment, SharedExecutor, SharedPermissions, StructureId,
    StructureType, TrackAction, GHOST_FLAG,
};
use trackforge_settings::ConstructionSettings;

use super::normalize::normalize_heights;
use super::permissions::PermissionElevator;
use crate::resolver::TrackElementResolver;

/// What to place and where
///
/// `location` is the origin of the new piece (leading edge height). Unset
/// optional fields fall back to the construction settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementSpec {
    pub location: Location,
    pub structure_id: StructureId,
    pub piece_type: PieceType,
    pub structure_type: StructureType,
    pub brake_speed: Option<u8>,
    pub colour: Option<u8>,
    /// 4 leaves the seats unchanged
    pub seat_rotation: Option<u8>,
    pub track_place_flags: u32,
    /// Extra action flags; the ghost bit is controlled by the placement mode
    pub flags: Option<u32>,
    pub is_from_track_design: bool,
}

impl PlacementSpec {
    pub fn new(
        location: Location,
        structure_id: StructureId,
        piece_type: PieceType,
        structure_type: StructureType,
    ) -> Self {
        Self {
            location,
            structure_id,
            piece_type,
            structure_type,
            brake_speed: None,
            colour: None,
            seat_rotation: None,
            track_place_flags: 0,
            flags: None,
            is_from_track_design: false,
        }
    }

    /// Placement of `piece` at `location` on the same structure as `segment`
    pub fn following(segment: &Segment, location: Location, piece_type: PieceType) -> Self {
        Self::new(
            location,
            segment.structure_id(),
            piece_type,
            segment.structure_type(),
        )
    }

    pub fn with_brake_speed(mut self, brake_speed: u8) -> Self {
        self.brake_speed = Some(brake_speed);
        self
    }

    pub fn with_colour(mut self, colour: u8) -> Self {
        self.colour = Some(colour);
        self
    }

    pub fn with_seat_rotation(mut self, seat_rotation: u8) -> Self {
        self.seat_rotation = Some(seat_rotation);
        self
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = Some(flags);
        self
    }

    pub fn from_track_design(mut self) -> Self {
        self.is_from_track_design = true;
        self
    }
}

/// Result of a successful construction action
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutcome {
    pub result: ActionResult,
    /// The placed piece, or the removed one when it could be resolved
    pub segment: Option<Segment>,
}

/// Places and removes pieces through the action executor
#[derive(Clone)]
pub struct ConstructionEngine {
    resolver: TrackElementResolver,
    executor: SharedExecutor,
    elevator: PermissionElevator,
    settings: ConstructionSettings,
}

impl ConstructionEngine {
    pub fn new(
        resolver: TrackElementResolver,
        executor: SharedExecutor,
        permissions: SharedPermissions,
        settings: ConstructionSettings,
    ) -> Self {
        Self {
            resolver,
            executor,
            elevator: PermissionElevator::new(permissions),
            settings,
        }
    }

    pub fn resolver(&self) -> &TrackElementResolver {
        &self.resolver
    }

    pub fn elevator(&self) -> &PermissionElevator {
        &self.elevator
    }

    pub fn settings(&self) -> &ConstructionSettings {
        &self.settings
    }

    fn action_flags(&self, mode: PlacementMode, extra: Option<u32>) -> u32 {
        let extra = extra.unwrap_or(0);
        match mode {
            PlacementMode::Ghost => self.settings.ghost_place_flags | GHOST_FLAG | extra,
            PlacementMode::Real => extra & !GHOST_FLAG,
        }
    }

    async fn execute(&self, action: TrackAction) -> Result<ActionResult> {
        let name = action.name();
        let result = {
            let _elevation = self.elevator.elevate();
            self.executor.execute(action).await
        };
        Ok(result.into_result(name)?)
    }

    /// Place a piece
    pub async fn place(&self, spec: &PlacementSpec, mode: PlacementMode) -> Result<BuildOutcome> {
        let heights = self
            .resolver
            .world()
            .piece_heights(spec.piece_type)
            .ok_or_else(|| BuildError::MissingPieceHeights {
                piece: spec.piece_type.to_string(),
            })?;
        let normalized = normalize_heights(heights);
        let location = spec.location.with_z(spec.location.z + normalized.begin_z);

        let params = PlaceParams {
            location,
            structure_id: spec.structure_id,
            piece_type: spec.piece_type,
            structure_type: spec.structure_type,
            brake_speed: spec.brake_speed.unwrap_or(self.settings.default_brake_speed),
            colour: spec.colour.unwrap_or(self.settings.default_colour),
            seat_rotation: spec
                .seat_rotation
                .unwrap_or(self.settings.default_seat_rotation),
            track_place_flags: spec.track_place_flags,
            is_from_track_design: spec.is_from_track_design,
            flags: self.action_flags(mode, spec.flags),
        };

        debug!(
            "Placing {} {} at {} (dispatched at height {})",
            mode, spec.piece_type, spec.location, location.z
        );
        match self.execute(TrackAction::Place(params)).await {
            Ok(result) => Ok(BuildOutcome {
                result,
                segment: Some(Segment::new(
                    spec.location,
                    spec.structure_id,
                    spec.piece_type,
                    spec.structure_type,
                )),
            }),
            Err(err) => {
                match mode {
                    PlacementMode::Ghost => {
                        debug!("Ghost {} not placed: {}", spec.piece_type, err)
                    }
                    PlacementMode::Real => {
                        warn!("{} not placed at {}: {}", spec.piece_type, spec.location, err)
                    }
                }
                Err(err)
            }
        }
    }

    /// Remove the piece of `structure_id` at `location`
    ///
    /// The piece must match `mode`: a ghost removal never touches a real
    /// piece and the other way round.
    pub async fn remove(
        &self,
        structure_id: StructureId,
        location: Location,
        mode: PlacementMode,
    ) -> Result<BuildOutcome> {
        let resolved = self.resolver.resolve(structure_id, location)?;
        let is_ghost = resolved.element.is_ghost;
        if is_ghost != (mode == PlacementMode::Ghost) {
            return Err(BuildError::ModeMismatch {
                location,
                expected: mode,
            }
            .into());
        }

        let params = RemoveParams {
            location: location.with_z(resolved.element.base_height),
            piece_type: resolved.element.piece_type,
            sequence: resolved.element.sequence,
            flags: self.action_flags(mode, None),
        };
        debug!(
            "Removing {} {} at {}",
            mode, resolved.element.piece_type, location
        );
        let result = self.execute(TrackAction::Remove(params)).await?;

        Ok(BuildOutcome {
            result,
            segment: resolved.segment,
        })
    }

    pub async fn remove_segment(
        &self,
        segment: &Segment,
        mode: PlacementMode,
    ) -> Result<BuildOutcome> {
        self.remove(segment.structure_id(), segment.location(), mode)
            .await
    }

    /// Origin for `piece` adjacent to `selected` in `direction`
    ///
    /// Building forward starts where the selected piece ends. Building
    /// backward places `piece` so that it ends where the selected piece
    /// starts.
    pub fn following_build_location(
        &self,
        selected: &Segment,
        direction: BuildDirection,
        piece: PieceType,
    ) -> Result<Location> {
        match direction {
            BuildDirection::Next => self
                .resolver
                .following_position(selected, BuildDirection::Next)?
                .ok_or_else(|| {
                    BuildError::NoFollowingPosition {
                        location: selected.location(),
                    }
                    .into()
                }),
            BuildDirection::Previous => Ok(geometry::entry_location(selected.location(), piece)),
        }
    }

    /// Place `piece` next to `selected`
    pub async fn build_at_following_position(
        &self,
        selected: &Segment,
        direction: BuildDirection,
        piece: PieceType,
        mode: PlacementMode,
    ) -> Result<BuildOutcome> {
        let location = self.following_build_location(selected, direction, piece)?;
        let spec = PlacementSpec::following(selected, location, piece);
        self.place(&spec, mode).await
    }

    /// Remove the piece next to `selected`, if there is one
    pub async fn remove_at_following_position(
        &self,
        selected: &Segment,
        direction: BuildDirection,
        mode: PlacementMode,
    ) -> Result<Option<BuildOutcome>> {
        let Some(location) = self.resolver.following_position(selected, direction)? else {
            return Ok(None);
        };
        match self.remove(selected.structure_id(), location, mode).await {
            Ok(outcome) => Ok(Some(outcome)),
            Err(err) if err.is_not_found() => {
                debug!("Nothing to remove {} of {}", direction, selected);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

impl std::fmt::Debug for ConstructionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructionEngine")
            .field("elevator", &self.elevator)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
