//! # Trackforge Builder
//!
//! Incremental track construction on top of the host collaborators from
//! `trackforge-core`:
//! - [`geometry`]: local footprints and exits to world coordinates
//! - [`resolver`]: one element out of overlapping pieces on a tile
//! - [`navigator`]: walking a structure's piece chain
//! - [`construction`]: ghost and real placement with permission elevation
//! - [`rules`]: buildable pieces and the suggested one
//! - [`painter`]: highlight colours on the selected piece
//! - [`model`]: the segment model state machine and its dispatcher

pub mod construction;
pub mod model;
pub mod navigator;
pub mod painter;
pub mod resolver;
pub mod rules;

pub use trackforge_core::geometry;

pub use construction::{
    normalize_heights, BuildOutcome, ConstructionEngine, ElevationGuard, PermissionElevator,
    PlacementSpec,
};
pub use model::{
    Collaborators, DispatchReport, Effect, ModelInput, ModelState, SegmentModel, TransitionContext,
};
pub use navigator::ChainNavigator;
pub use painter::SegmentPainter;
pub use resolver::{ResolvedElement, TrackElementResolver};
pub use rules::{BuildRules, ContinuationSuggestion, SlopeContinuityRules, SuggestionStrategy};
