mod common;

use std::sync::Arc;

use tempfile::TempDir;
use trackforge_builder::SegmentPainter;
use trackforge_core::{ColdStorage, MemoryColdStorage, PieceType, TrackColour, WorldQuery};
use trackforge_settings::{JsonFileColdStorage, PaintingSettings};

use common::*;

const ORIGINAL: TrackColour = TrackColour {
    main: 7,
    additional: 8,
    supports: 9,
};

#[tokio::test]
async fn test_painter_paints_and_restores() {
    let world = coaster_world();
    world.set_scheme_colours(COASTER, 3, ORIGINAL);
    let first = world.place_piece(COASTER, PieceType::Flat, at(0, 0, 0), false);
    let second = world.place_piece(COASTER, PieceType::Flat, at(32, 0, 0), false);
    let storage = Arc::new(MemoryColdStorage::new());
    let painter = SegmentPainter::new(
        resolver(&world),
        world.clone(),
        storage.clone(),
        PaintingSettings::default(),
    );

    let first = world.segment_of(first).expect("first");
    painter.paint_selected_segment(&first).await.expect("painted");
    assert_eq!(world.pieces()[0].colour_scheme, 3);
    assert_eq!(
        world.structure(COASTER).map(|s| s.colour_schemes[3]),
        Some(TrackColour::new(2, 2, 2))
    );
    let painted = painter.painted().expect("remembered");
    assert_eq!(painted.segment, first);
    assert_eq!(painted.highlight_colours, ORIGINAL);
    assert_eq!(storage.painted_segment_details().ok().flatten(), Some(painted));

    let second = world.segment_of(second).expect("second");
    painter.paint_selected_segment(&second).await.expect("painted");
    assert_eq!(world.pieces()[0].colour_scheme, 0);
    assert_eq!(world.pieces()[1].colour_scheme, 3);

    painter.restore_initial_colour().await.expect("restored");
    assert!(world.pieces().iter().all(|piece| piece.colour_scheme == 0));
    assert_eq!(
        world.structure(COASTER).map(|s| s.colour_schemes[3]),
        Some(ORIGINAL)
    );
    assert_eq!(painter.painted(), None);
    assert_eq!(storage.painted_segment_details().ok().flatten(), None);
}

#[tokio::test]
async fn test_disabled_painting_touches_nothing() {
    let world = coaster_world();
    let flat = world.place_piece(COASTER, PieceType::Flat, at(0, 0, 0), false);
    let painter = SegmentPainter::new(
        resolver(&world),
        world.clone(),
        Arc::new(MemoryColdStorage::new()),
        PaintingSettings {
            enabled: false,
            ..PaintingSettings::default()
        },
    );

    let flat = world.segment_of(flat).expect("flat");
    painter.paint_selected_segment(&flat).await.expect("no-op");
    assert!(world.action_log().is_empty());
    assert_eq!(painter.painted(), None);
}

#[tokio::test]
async fn test_clean_up_after_improper_close() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("cold.json");
    let world = coaster_world();
    world.set_scheme_colours(COASTER, 3, ORIGINAL);
    let flat = world.place_piece(COASTER, PieceType::Flat, at(100, 100, 0), false);

    {
        let model = model_with_storage(&world, Arc::new(JsonFileColdStorage::new(&path)));
        model.select_segment(world.segment_of(flat)).await;
        assert_eq!(world.ghosts().len(), 1);
        // dropped without close
    }
    assert!(path.exists());

    let storage = Arc::new(JsonFileColdStorage::new(&path));
    let snapshot = storage.load().expect("snapshot");
    assert_eq!(snapshot.selected, world.segment_of(flat));
    assert_eq!(
        snapshot.preview.map(|preview| preview.location()),
        Some(at(132, 100, 0))
    );
    assert!(snapshot.painted.is_some());

    let model = model_with_storage(&world, storage.clone());
    assert!(model.clean_up_from_improper_close().await.expect("cleaned up"));

    assert!(world.ghosts().is_empty());
    assert_eq!(world.real_pieces().len(), 1);
    assert_eq!(world.real_pieces()[0].colour_scheme, 0);
    assert_eq!(
        world.structure(COASTER).map(|s| s.colour_schemes[3]),
        Some(ORIGINAL)
    );
    assert!(storage.load().expect("snapshot").is_empty());
    assert_eq!(model.selected_segment(), None);

    assert!(!model.clean_up_from_improper_close().await.expect("nothing left"));
}

#[tokio::test]
async fn test_clean_up_tolerates_vanished_pieces() {
    let world = coaster_world();
    let storage = Arc::new(MemoryColdStorage::new());
    let ghost = world.place_piece(COASTER, PieceType::Flat, at(132, 100, 0), true);
    storage
        .set_preview_segment(world.segment_of(ghost).as_ref())
        .expect("stored");

    // the host already dropped the ghost
    let other = coaster_world();
    let model = model_with_storage(&other, storage.clone());
    assert!(model.clean_up_from_improper_close().await.expect("cleaned up"));
    assert!(storage.load().expect("snapshot").is_empty());
}
