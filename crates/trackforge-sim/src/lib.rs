//! # Trackforge Sim
//!
//! An in-memory host world for trackforge. [`SimWorld`] answers tile,
//! structure and cursor queries, executes place/remove/colour actions
//! with collision and permission checks, and records every action with
//! the permission flags it ran under.

mod cursor;
mod executor;
mod world;

pub use cursor::SimCursor;
pub use executor::ActionRecord;
pub use world::{PieceId, SimPiece, SimWorld, CLEARANCE};
