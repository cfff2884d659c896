#![allow(dead_code)]

use std::sync::Arc;

use trackforge_builder::{Collaborators, SegmentModel, TrackElementResolver};
use trackforge_core::{
    ColdStorage, Facing, Location, MemoryColdStorage, PieceType, Segment, StructureId,
    StructureType,
};
use trackforge_settings::BuilderConfig;
use trackforge_sim::SimWorld;

pub const COASTER: StructureId = StructureId(4);

pub fn at(x: i32, y: i32, z: i32) -> Location {
    Location::new(x, y, z, Facing::NORTH_EAST)
}

/// A world with one steel coaster and nothing built
pub fn coaster_world() -> Arc<SimWorld> {
    let world = Arc::new(SimWorld::new());
    world.add_structure(COASTER, "Steel Twister", StructureType::SteelRollerCoaster);
    world
}

pub fn segment(location: Location, piece: PieceType) -> Segment {
    Segment::new(location, COASTER, piece, StructureType::SteelRollerCoaster)
}

pub fn collaborators(world: &Arc<SimWorld>, storage: Arc<dyn ColdStorage>) -> Collaborators {
    Collaborators {
        world: world.clone(),
        executor: world.clone(),
        permissions: world.clone(),
        storage,
        highlighter: world.clone(),
    }
}

pub fn model(world: &Arc<SimWorld>) -> SegmentModel {
    model_with_storage(world, Arc::new(MemoryColdStorage::new()))
}

pub fn model_with_storage(world: &Arc<SimWorld>, storage: Arc<dyn ColdStorage>) -> SegmentModel {
    SegmentModel::new(collaborators(world, storage), &BuilderConfig::default())
}

pub fn resolver(world: &Arc<SimWorld>) -> TrackElementResolver {
    TrackElementResolver::new(world.clone())
}
