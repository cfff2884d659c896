//! Scoped build permission elevation
//!
//! World actions may need "build during pause" and "arbitrary structure
//! type changes". The flags are elevated when the first guard is taken and
//! the saved flags come back when the last guard drops, so overlapping
//! actions on the runtime share one elevation.

use parking_lot::Mutex;
use std::sync::Arc;

use trackforge_core::{PermissionFlags, SharedPermissions};

#[derive(Debug, Default)]
struct ElevationState {
    count: usize,
    saved: Option<PermissionFlags>,
}

/// Hands out [`ElevationGuard`]s over one permission collaborator
#[derive(Clone)]
pub struct PermissionElevator {
    permissions: SharedPermissions,
    state: Arc<Mutex<ElevationState>>,
}

impl PermissionElevator {
    pub fn new(permissions: SharedPermissions) -> Self {
        Self {
            permissions,
            state: Arc::new(Mutex::new(ElevationState::default())),
        }
    }

    /// Elevate the flags until the returned guard is dropped
    pub fn elevate(&self) -> ElevationGuard {
        let mut state = self.state.lock();
        if state.count == 0 {
            let current = self.permissions.flags();
            state.saved = Some(current);
            self.permissions.set_flags(PermissionFlags::elevated());
            tracing::trace!("Build permissions elevated from {:?}", current);
        }
        state.count += 1;

        ElevationGuard {
            permissions: self.permissions.clone(),
            state: self.state.clone(),
        }
    }

    /// Whether any guard is alive
    pub fn is_elevated(&self) -> bool {
        self.state.lock().count > 0
    }
}

impl std::fmt::Debug for PermissionElevator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermissionElevator")
            .field("state", &*self.state.lock())
            .finish()
    }
}

/// Restores the saved permission flags when the last guard drops
#[must_use = "permissions are restored as soon as the guard is dropped"]
pub struct ElevationGuard {
    permissions: SharedPermissions,
    state: Arc<Mutex<ElevationState>>,
}

impl Drop for ElevationGuard {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        state.count = state.count.saturating_sub(1);
        if state.count == 0 {
            if let Some(saved) = state.saved.take() {
                self.permissions.set_flags(saved);
                tracing::trace!("Build permissions restored to {:?}", saved);
            }
        }
    }
}
