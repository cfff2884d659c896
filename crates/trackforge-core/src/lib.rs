//! # Trackforge Core
//!
//! Core types, collaborator traits and utilities for trackforge.
//! Provides the data model (locations, pieces, segments, tile elements),
//! piece geometry, the host world interfaces, errors, model events and
//! user messages.

pub mod core;
pub mod data;
pub mod error;
pub mod event_bus;
pub mod geometry;
pub mod types;
pub mod world;

pub use crate::core::message::{Message, MessageDispatcher, MessageLevel};

pub use data::{
    Adjacency, BuildDirection, ChainLookup, Facing, Location, MapCoords, PieceDefinition,
    PieceHeights, PieceType, Segment, SlotKind, Slope, StructureClassification, StructureId,
    StructureInfo, StructureType, SurfaceElement, TileElement, TrackColour, TrackElement,
    WorldCoord, TILE_SIZE,
};

pub use error::{BuildError, Error, ResolveError, Result, StorageError};

pub use event_bus::{
    EventBusConfig, EventCategory, EventFilter, ModelEvent, ModelEventBus, RecordedEvent,
    SubscriptionId,
};

pub use types::{
    thread_safe_rw, BoxedCursor, SharedColdStorage, SharedExecutor, SharedHighlighter,
    SharedPermissions, SharedWorld, ThreadSafeRw,
};

pub use world::{
    ActionErrorKind, ActionExecutor, ActionResult, BuildPermissions, ColdSnapshot, ColdStorage,
    Highlighter, MemoryColdStorage, NoopHighlighter, PaintedSegmentDetails, PermissionFlags,
    PlaceParams, PlacementMode, RemoveParams, TrackAction, TrackCursor, WorldQuery, GHOST_FLAG,
};
