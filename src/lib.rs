//! # Trackforge
//!
//! Incremental track construction for tile-based worlds:
//! - Resolving one track element out of overlapping pieces on a tile
//! - Walking a structure's piece chain in both directions
//! - Ghost previews that follow the selection and the chosen piece
//! - Committing real pieces with height normalization and scoped permissions
//! - Painting the selected piece and recovering after an unclean shutdown
//!
//! ## Architecture
//!
//! Trackforge is organized as a workspace with multiple crates:
//!
//! 1. **trackforge-core** - Data model, geometry, host collaborator traits, errors, events
//! 2. **trackforge-settings** - Configuration files and file-backed cold storage
//! 3. **trackforge-builder** - Resolver, navigator, construction engine, painter, segment model
//! 4. **trackforge-sim** - In-memory host world used by the demo and the tests
//! 5. **trackforge** - Logging setup and the demo binary

pub mod demo;

pub use trackforge_builder as builder;
pub use trackforge_core::{data, geometry};
pub use trackforge_settings as settings;
pub use trackforge_sim as sim;

pub use trackforge_core::{
    BuildDirection, BuildError, Error, Facing, Location, Message, MessageDispatcher, MessageLevel,
    ModelEvent, PieceType, PlacementMode, ResolveError, Result, Segment, SlotKind, StructureId,
    StructureType,
};

pub use trackforge_builder::{
    ChainNavigator, Collaborators, ConstructionEngine, SegmentModel, TrackElementResolver,
};

pub use trackforge_settings::{BuilderConfig, JsonFileColdStorage};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging
///
/// `RUST_LOG` wins when set; otherwise `default_level` (usually the
/// configured `general.log_level`) is used as the filter.
pub fn init_logging(default_level: &str) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_thread_names(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
