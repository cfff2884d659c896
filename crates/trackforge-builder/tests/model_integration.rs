mod common;

use std::sync::Arc;

use parking_lot::Mutex;
use trackforge_core::{
    ActionErrorKind, BuildDirection, BuildPermissions, EventFilter, MessageLevel, ModelEvent,
    PermissionFlags, PieceType, TrackAction,
};

use common::*;

#[tokio::test]
async fn test_full_build_scenario() {
    let world = coaster_world();
    let flat = world.place_piece(COASTER, PieceType::Flat, at(100, 100, 0), false);
    let model = model(&world);

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    model.subscribe(EventFilter::All, move |event| sink.lock().push(event));

    model.select_segment(world.segment_of(flat)).await;
    assert_eq!(model.selected_build(), Some(PieceType::Flat));
    let ghosts = world.ghosts();
    assert_eq!(ghosts.len(), 1);
    assert_eq!(ghosts[0].piece_type, PieceType::Flat);
    assert_eq!(ghosts[0].origin, at(132, 100, 0));
    assert_eq!(
        model.preview_segment(),
        Some(segment(at(132, 100, 0), PieceType::Flat))
    );

    model.select_build(Some(PieceType::FlatToUp25)).await;
    let ghosts = world.ghosts();
    assert_eq!(ghosts.len(), 1);
    assert_eq!(ghosts[0].piece_type, PieceType::FlatToUp25);
    assert_eq!(ghosts[0].origin, at(132, 100, 0));

    world.clear_action_log();
    let outcome = model.build_selected_piece().await.expect("commit succeeds");
    let built = segment(at(132, 100, 0), PieceType::FlatToUp25);
    assert_eq!(outcome.segment, Some(built.clone()));

    let real_place = world
        .action_log()
        .into_iter()
        .find_map(|record| match record.action {
            TrackAction::Place(params) if params.flags & trackforge_core::GHOST_FLAG == 0 => {
                Some(params)
            }
            _ => None,
        })
        .expect("real placement dispatched");
    assert_eq!(real_place.flags, 0);
    assert_eq!(real_place.location, at(132, 100, 0));
    assert_eq!(real_place.piece_type, PieceType::FlatToUp25);

    assert_eq!(model.selected_segment(), Some(built));
    assert!(model.buildable_pieces().contains(&PieceType::Up25));
    assert!(!model.buildable_pieces().contains(&PieceType::Flat));
    assert_eq!(model.selected_build(), Some(PieceType::Up25));

    let ghosts = world.ghosts();
    assert_eq!(ghosts.len(), 1);
    assert_eq!(ghosts[0].piece_type, PieceType::Up25);
    assert_eq!(ghosts[0].origin, at(164, 100, 8));
    assert_eq!(world.real_pieces().len(), 2);

    let events = events.lock();
    assert!(events.iter().any(|event| matches!(
        event,
        ModelEvent::PieceBuilt { segment, .. } if segment.piece_type() == PieceType::FlatToUp25
    )));
    assert!(events
        .iter()
        .any(|event| matches!(event, ModelEvent::SelectedBuildChanged { piece: Some(PieceType::Up25) })));
}

#[tokio::test]
async fn test_only_one_ghost_while_switching_builds() {
    let world = coaster_world();
    let flat = world.place_piece(COASTER, PieceType::Flat, at(100, 100, 0), false);
    let model = model(&world);
    model.select_segment(world.segment_of(flat)).await;

    for piece in [
        PieceType::FlatToUp25,
        PieceType::LeftQuarterTurn1Tile,
        PieceType::FlatToDown25,
        PieceType::LeftQuarterTurn3Tiles,
        PieceType::Flat,
    ] {
        model.select_build(Some(piece)).await;
        let ghosts = world.ghosts();
        assert_eq!(ghosts.len(), 1, "ghosts after selecting {}", piece);
        assert_eq!(ghosts[0].piece_type, piece);
        assert_eq!(
            model.preview_segment().map(|preview| preview.piece_type()),
            Some(piece)
        );
    }

    model.select_build(None).await;
    assert!(world.ghosts().is_empty());
    assert_eq!(model.preview_segment(), None);
}

#[tokio::test]
async fn test_unbuildable_piece_keeps_current_choice() {
    let world = coaster_world();
    let flat = world.place_piece(COASTER, PieceType::Flat, at(100, 100, 0), false);
    let model = model(&world);
    model.select_segment(world.segment_of(flat)).await;

    model.select_build(Some(PieceType::Down60)).await;
    assert_eq!(model.selected_build(), Some(PieceType::Flat));
    assert_eq!(world.ghosts().len(), 1);
}

#[tokio::test]
async fn test_building_backwards() {
    let world = coaster_world();
    let flat = world.place_piece(COASTER, PieceType::Flat, at(100, 100, 16), false);
    let model = model(&world);
    model.set_build_direction(Some(BuildDirection::Previous)).await;
    model.select_segment(world.segment_of(flat)).await;

    model.select_build(Some(PieceType::Up25ToFlat)).await;
    let ghosts = world.ghosts();
    assert_eq!(ghosts.len(), 1);
    assert_eq!(ghosts[0].origin, at(68, 100, 8));

    let outcome = model.build_selected_piece().await.expect("commit succeeds");
    let built = outcome.segment.expect("built segment");
    assert_eq!(built.location(), at(68, 100, 8));
    assert_eq!(model.selected_segment(), Some(built));
    assert!(world.ghosts().iter().all(|ghost| ghost.origin.x < 68));
}

#[tokio::test]
async fn test_failed_commit_restores_ghost_and_reports() {
    let world = coaster_world();
    let flat = world.place_piece(COASTER, PieceType::Flat, at(100, 100, 0), false);
    let model = model(&world);
    let mut messages = model.messages().subscribe();
    model.select_segment(world.segment_of(flat)).await;

    world.fail_next_action("trackplace", ActionErrorKind::InsufficientFunds, "Not enough cash");
    let err = model.build_selected_piece().await.expect_err("commit fails");
    assert!(err.is_action_failure());

    let message = messages.try_recv().expect("failure reported");
    assert_eq!(message.level, MessageLevel::Error);
    assert!(message.text.contains("Not enough cash"));

    assert_eq!(world.real_pieces().len(), 1);
    let ghosts = world.ghosts();
    assert_eq!(ghosts.len(), 1);
    assert_eq!(ghosts[0].origin, at(132, 100, 0));
    assert_eq!(model.selected_segment(), world.segment_of(flat));
    assert_eq!(model.selected_build(), Some(PieceType::Flat));

    let outcome = model.build_selected_piece().await.expect("retry succeeds");
    assert_eq!(outcome.segment.map(|s| s.location()), Some(at(132, 100, 0)));
}

#[tokio::test]
async fn test_commit_without_selection_is_rejected() {
    let world = coaster_world();
    let model = model(&world);
    let mut messages = model.messages().subscribe();

    let err = model.build_selected_piece().await.expect_err("nothing to build");
    assert!(err.to_string().contains("no segment is selected"));
    assert_eq!(
        messages.try_recv().map(|message| message.level).ok(),
        Some(MessageLevel::Error)
    );
    assert!(world.action_log().is_empty());
}

#[tokio::test]
async fn test_occupied_slot_has_no_ghost() {
    let world = coaster_world();
    let ids = world.place_chain(COASTER, at(0, 0, 0), &[PieceType::Flat, PieceType::Flat]);
    let model = model(&world);

    model.select_segment(world.segment_of(ids[0])).await;
    assert_eq!(model.selected_build(), None);
    assert!(world.ghosts().is_empty());
}

#[tokio::test]
async fn test_move_to_next_segment() {
    let world = coaster_world();
    let ids = world.place_chain(
        COASTER,
        at(0, 0, 0),
        &[PieceType::Flat, PieceType::Flat, PieceType::Flat],
    );
    let model = model(&world);

    assert!(!model.move_to_next_segment(BuildDirection::Next).await);

    model.select_segment(world.segment_of(ids[0])).await;
    assert!(model.move_to_next_segment(BuildDirection::Next).await);
    assert_eq!(model.selected_segment(), world.segment_of(ids[1]));
    assert!(model.move_to_next_segment(BuildDirection::Next).await);
    assert_eq!(model.selected_segment(), world.segment_of(ids[2]));

    // the chain ends in the preview ghost, which is not selectable
    assert_eq!(world.ghosts().len(), 1);
    assert!(!model.move_to_next_segment(BuildDirection::Next).await);
    assert_eq!(model.selected_segment(), world.segment_of(ids[2]));

    assert!(model.move_to_next_segment(BuildDirection::Previous).await);
    assert_eq!(model.selected_segment(), world.segment_of(ids[1]));
    assert!(world.ghosts().is_empty());
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let world = coaster_world();
    let flat = world.place_piece(COASTER, PieceType::Flat, at(100, 100, 0), false);
    let model = model(&world);
    model.select_segment(world.segment_of(flat)).await;
    assert!(model.painter().painted().is_some());
    assert_eq!(world.highlighted(), model.preview_segment());
    assert!(world.highlighted().is_some());

    model.close().await;
    assert!(world.ghosts().is_empty());
    assert_eq!(model.selected_segment(), None);
    assert_eq!(model.preview_segment(), None);
    assert!(model.buildable_pieces().is_empty());
    assert_eq!(world.highlighted(), None);
    assert_eq!(model.painter().painted(), None);
    let pieces = world.pieces();

    model.close().await;
    assert_eq!(world.pieces(), pieces);
    assert_eq!(model.state().selected_build, None);
}

#[tokio::test]
async fn test_unresolvable_selection_removes_previous_ghost() {
    let world = coaster_world();
    let flat = world.place_piece(COASTER, PieceType::Flat, at(100, 100, 0), false);
    let model = model(&world);

    model.select_segment(world.segment_of(flat)).await;
    assert_eq!(world.ghosts().len(), 1);

    // nothing is built out there, so the slot cannot be probed
    model
        .select_segment(Some(segment(at(640, 640, 0), PieceType::Flat)))
        .await;
    assert!(world.ghosts().is_empty());
    assert_eq!(model.preview_segment(), None);
    assert_eq!(world.highlighted(), None);

    model.close().await;
    assert!(world.ghosts().is_empty());
    assert_eq!(world.real_pieces().len(), 1);
}

#[tokio::test]
async fn test_highlight_follows_preview() {
    let world = coaster_world();
    let flat = world.place_piece(COASTER, PieceType::Flat, at(100, 100, 0), false);
    let model = model(&world);

    model.select_segment(world.segment_of(flat)).await;
    assert_eq!(
        world.highlighted(),
        Some(segment(at(132, 100, 0), PieceType::Flat))
    );

    model.select_build(Some(PieceType::FlatToUp25)).await;
    assert_eq!(
        world.highlighted(),
        Some(segment(at(132, 100, 0), PieceType::FlatToUp25))
    );

    model.select_build(None).await;
    assert_eq!(world.highlighted(), None);
    assert!(world.ghosts().is_empty());
}

#[tokio::test]
async fn test_build_while_paused_restores_permissions() {
    let world = coaster_world();
    world.set_paused(true);
    let flat = world.place_piece(COASTER, PieceType::Flat, at(100, 100, 0), false);
    let model = model(&world);

    model.select_segment(world.segment_of(flat)).await;
    assert_eq!(world.ghosts().len(), 1);
    model.build_selected_piece().await.expect("commit while paused");
    assert_eq!(world.real_pieces().len(), 2);

    assert_eq!(world.flags(), PermissionFlags::default());
    assert!(world
        .action_log()
        .iter()
        .filter(|record| matches!(record.action, TrackAction::Place(_)))
        .all(|record| record.permissions == PermissionFlags::elevated()));
}
