//! Cold storage of builder state
//!
//! The builder persists its selected and preview segments and what it
//! painted, so that a session closed without teardown can be repaired on
//! the next start.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::data::{Segment, TrackColour};
use crate::error::StorageError;

/// What the painter changed on a segment, and the values to restore
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaintedSegmentDetails {
    /// The painted segment
    pub segment: Segment,
    /// Colour scheme index the element used before painting
    pub colour_scheme: u8,
    /// Colours of that scheme before painting
    pub colours: TrackColour,
    /// Scheme index used for highlighting
    pub highlight_scheme: u8,
    /// Colours of the highlight scheme before it was overwritten
    pub highlight_colours: TrackColour,
}

/// Everything kept in cold storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColdSnapshot {
    pub selected: Option<Segment>,
    pub preview: Option<Segment>,
    pub painted: Option<PaintedSegmentDetails>,
}

impl ColdSnapshot {
    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.selected.is_none() && self.preview.is_none() && self.painted.is_none()
    }
}

/// Get/set access to persisted builder state
pub trait ColdStorage: Send + Sync {
    /// Load the whole snapshot
    fn load(&self) -> Result<ColdSnapshot, StorageError>;

    /// Replace the whole snapshot
    fn store(&self, snapshot: &ColdSnapshot) -> Result<(), StorageError>;

    fn selected_segment(&self) -> Result<Option<Segment>, StorageError> {
        Ok(self.load()?.selected)
    }

    fn set_selected_segment(&self, segment: Option<&Segment>) -> Result<(), StorageError> {
        let mut snapshot = self.load()?;
        snapshot.selected = segment.cloned();
        self.store(&snapshot)
    }

    fn preview_segment(&self) -> Result<Option<Segment>, StorageError> {
        Ok(self.load()?.preview)
    }

    fn set_preview_segment(&self, segment: Option<&Segment>) -> Result<(), StorageError> {
        let mut snapshot = self.load()?;
        snapshot.preview = segment.cloned();
        self.store(&snapshot)
    }

    fn painted_segment_details(&self) -> Result<Option<PaintedSegmentDetails>, StorageError> {
        Ok(self.load()?.painted)
    }

    fn set_painted_segment_details(
        &self,
        details: Option<&PaintedSegmentDetails>,
    ) -> Result<(), StorageError> {
        let mut snapshot = self.load()?;
        snapshot.painted = details.cloned();
        self.store(&snapshot)
    }
}

/// In-memory cold storage
#[derive(Debug, Default)]
pub struct MemoryColdStorage {
    snapshot: RwLock<ColdSnapshot>,
}

impl MemoryColdStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-filled with a snapshot, as left by an earlier session
    pub fn with_snapshot(snapshot: ColdSnapshot) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
        }
    }
}

impl ColdStorage for MemoryColdStorage {
    fn load(&self) -> Result<ColdSnapshot, StorageError> {
        Ok(self.snapshot.read().clone())
    }

    fn store(&self, snapshot: &ColdSnapshot) -> Result<(), StorageError> {
        *self.snapshot.write() = snapshot.clone();
        Ok(())
    }
}
