//! Construction engine
//!
//! Places and removes ghost and real pieces through the host's action
//! executor. Placement normalizes down-slope heights first, and every
//! action runs with build permissions elevated for its whole duration.

mod engine;
mod normalize;
mod permissions;

pub use engine::{BuildOutcome, ConstructionEngine, PlacementSpec};
pub use normalize::normalize_heights;
pub use permissions::{ElevationGuard, PermissionElevator};
