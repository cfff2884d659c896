//! Scripted build session against the simulated world

use anyhow::Context;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use trackforge_builder::{Collaborators, SegmentModel};
use trackforge_core::{Facing, Location, PieceType, Segment, StructureId, StructureType};
use trackforge_settings::{cold_storage_from_config, BuilderConfig};
use trackforge_sim::SimWorld;

/// Structure the demo builds on
pub const DEMO_STRUCTURE: StructureId = StructureId(4);

/// What the demo session left behind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemoSummary {
    /// Committed pieces in build order
    pub built: Vec<Segment>,
    /// Preview ghost when the session ended, before teardown
    pub last_preview: Option<Segment>,
    /// Pieces in the world after teardown
    pub pieces_left: usize,
    /// Ghosts in the world after teardown
    pub ghosts_left: usize,
    /// Whether cold storage still held markers from an earlier session
    pub recovered: bool,
}

/// Build a short climb off a flat piece and tear the session down
///
/// The flat sits at (100, 100, 0) facing north-east. The session selects
/// it, builds a flat-to-up transition and one up slope, then closes.
pub async fn run(config: &BuilderConfig) -> anyhow::Result<DemoSummary> {
    let world = Arc::new(SimWorld::new());
    world.add_structure(DEMO_STRUCTURE, "Steel Twister", StructureType::SteelRollerCoaster);
    world.add_surface(100, 100, 0);
    let start = world.place_piece(
        DEMO_STRUCTURE,
        PieceType::Flat,
        Location::new(100, 100, 0, Facing::NORTH_EAST),
        false,
    );

    let collaborators = Collaborators {
        world: world.clone(),
        executor: world.clone(),
        permissions: world.clone(),
        storage: cold_storage_from_config(config),
        highlighter: world.clone(),
    };
    let model = SegmentModel::new(collaborators, config);

    let recovered = model
        .clean_up_from_improper_close()
        .await
        .context("recovering the previous session")?;

    model.select_segment(world.segment_of(start)).await;
    info!(
        "Selected {:?}, suggested {:?}",
        model.selected_segment(),
        model.selected_build()
    );

    let mut built = Vec::new();
    for piece in [PieceType::FlatToUp25, PieceType::Up25] {
        model.select_build(Some(piece)).await;
        let outcome = model
            .build_selected_piece()
            .await
            .with_context(|| format!("building {}", piece))?;
        if let Some(segment) = outcome.segment {
            info!("Built {}", segment);
            built.push(segment);
        }
    }

    let last_preview = model.preview_segment();
    model.close().await;

    Ok(DemoSummary {
        built,
        last_preview,
        pieces_left: world.pieces().len(),
        ghosts_left: world.ghosts().len(),
        recovered,
    })
}
