//! Handle types for the host collaborators.
//!
//! Builder components are wired from trait objects owned by the embedding
//! application; these names keep the constructors in every crate uniform.

use parking_lot::RwLock;
use std::sync::Arc;

use crate::world::{
    ActionExecutor, BuildPermissions, ColdStorage, Highlighter, TrackCursor, WorldQuery,
};

/// Read-mostly state shared between a world and its cursors.
///
/// `parking_lot` guards must not be held across `.await`.
pub type ThreadSafeRw<T> = Arc<RwLock<T>>;

pub type SharedWorld = Arc<dyn WorldQuery>;
pub type SharedExecutor = Arc<dyn ActionExecutor>;
pub type SharedPermissions = Arc<dyn BuildPermissions>;
pub type SharedColdStorage = Arc<dyn ColdStorage>;
pub type SharedHighlighter = Arc<dyn Highlighter>;

/// A cursor is owned by whoever walks the chain
pub type BoxedCursor = Box<dyn TrackCursor>;

#[inline]
pub fn thread_safe_rw<T>(value: T) -> ThreadSafeRw<T> {
    Arc::new(RwLock::new(value))
}
