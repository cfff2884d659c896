//! Geometry transform
//!
//! Maps piece-local offsets (facing 0) to absolute world coordinates. Each
//! facing step is a fixed 90° rotation:
//!
//! | facing | (dx, dy) becomes |
//! |--------|------------------|
//! | 0      | (dx, dy)         |
//! | 1      | (dy, -dx)        |
//! | 2      | (-dx, -dy)       |
//! | 3      | (-dy, dx)        |
//!
//! Heights are never rotated.

use crate::data::{Facing, Location, PieceType, WorldCoord};

/// Rotate a local offset into a facing
pub fn rotate(offset: (i32, i32), facing: Facing) -> (i32, i32) {
    let (dx, dy) = offset;
    match facing.value() {
        0 => (dx, dy),
        1 => (dy, -dx),
        2 => (-dx, -dy),
        _ => (-dy, dx),
    }
}

/// Undo [`rotate`] for the same facing
pub fn inverse_rotate(offset: (i32, i32), facing: Facing) -> (i32, i32) {
    rotate(offset, facing.inverse())
}

/// Absolute coordinates of local offsets placed at `origin` with `facing`
pub fn project(origin: Location, facing: Facing, offsets: &[(i32, i32)]) -> Vec<WorldCoord> {
    offsets
        .iter()
        .map(|&offset| {
            let (dx, dy) = rotate(offset, facing);
            WorldCoord::new(origin.x + dx, origin.y + dy, origin.z)
        })
        .collect()
}

/// Every coordinate a piece covers when its origin is at `location`
pub fn footprint(location: Location, piece: PieceType) -> Vec<WorldCoord> {
    project(location, location.facing, piece.definition().footprint)
}

/// Where the piece following `piece` starts
///
/// `location` is the piece's origin (leading edge height). The exit height
/// follows the canonical begin/end encoding, so a down slope exits below
/// its leading edge.
pub fn exit_location(location: Location, piece: PieceType) -> Location {
    let def = piece.definition();
    let (dx, dy) = rotate(def.exit, location.facing);
    Location::new(
        location.x + dx,
        location.y + dy,
        location.z - def.heights.begin_z + def.heights.end_z,
        location.facing.rotated(def.turn),
    )
}

/// Origin a piece must have so that it exits exactly at `connection`
pub fn entry_location(connection: Location, piece: PieceType) -> Location {
    let def = piece.definition();
    let facing = connection.facing.rotated(-def.turn);
    let (dx, dy) = rotate(def.exit, facing);
    Location::new(
        connection.x - dx,
        connection.y - dy,
        connection.z + def.heights.begin_z - def.heights.end_z,
        facing,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use crate::data::TILE_SIZE;

    #[test]
    fn test_rotation_table() {
        let offset = (32, 64);
        assert_eq!(rotate(offset, Facing::NORTH_EAST), (32, 64));
        assert_eq!(rotate(offset, Facing::SOUTH_EAST), (64, -32));
        assert_eq!(rotate(offset, Facing::SOUTH_WEST), (-32, -64));
        assert_eq!(rotate(offset, Facing::NORTH_WEST), (-64, 32));
    }

    #[test]
    fn test_project_keeps_height() {
        let origin = Location::new(1000, 2000, 48, Facing::SOUTH_EAST);
        let coords = project(origin, origin.facing, &[(0, 0), (32, 0), (0, -32)]);
        assert_eq!(
            coords,
            vec![
                WorldCoord::new(1000, 2000, 48),
                WorldCoord::new(1000, 1968, 48),
                WorldCoord::new(968, 2000, 48),
            ]
        );
    }

    #[test]
    fn test_flat_exit_is_one_tile_forward() {
        let origin = Location::new(100, 100, 0, Facing::NORTH_EAST);
        assert_eq!(
            exit_location(origin, PieceType::Flat),
            Location::new(100 + TILE_SIZE, 100, 0, Facing::NORTH_EAST)
        );
    }

    #[test]
    fn test_slopes_change_exit_height() {
        let origin = Location::new(0, 0, 64, Facing::SOUTH_WEST);
        assert_eq!(exit_location(origin, PieceType::Up25).z, 80);
        assert_eq!(exit_location(origin, PieceType::Down25).z, 48);
        assert_eq!(exit_location(origin, PieceType::FlatToDown25).z, 56);
    }

    #[test]
    fn test_left_turn_changes_facing() {
        let origin = Location::new(0, 0, 0, Facing::NORTH_EAST);
        let exit = exit_location(origin, PieceType::LeftQuarterTurn1Tile);
        assert_eq!(exit.facing, Facing::SOUTH_EAST);
        assert_eq!((exit.x, exit.y), (0, -32));
    }

    #[test]
    fn test_entry_location_inverts_exit() {
        for piece in PieceType::ALL {
            for facing in Facing::all() {
                let origin = Location::new(320, -96, 40, facing);
                let exit = exit_location(origin, piece);
                assert_eq!(entry_location(exit, piece), origin, "{} at {}", piece, facing);
            }
        }
    }

    proptest! {
        #[test]
        fn project_then_inverse_rotate_round_trips(
            facing in 0u8..4,
            offsets in prop::collection::vec((-4096i32..4096, -4096i32..4096), 0..16),
            ox in -10_000i32..10_000,
            oy in -10_000i32..10_000,
        ) {
            let facing = Facing::new(facing).expect("facing in range");
            let origin = Location::new(ox, oy, 0, facing);
            let projected = project(origin, facing, &offsets);
            let recovered: Vec<(i32, i32)> = projected
                .iter()
                .map(|c| inverse_rotate((c.x - ox, c.y - oy), facing))
                .collect();
            prop_assert_eq!(recovered, offsets);
        }
    }
}
