//! Global build permission flags

use serde::{Deserialize, Serialize};

/// Host-wide permissions that relax build restrictions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PermissionFlags {
    /// Allow building while the game is paused
    pub build_in_pause: bool,
    /// Allow pieces of another structure type to be placed
    pub arbitrary_structure_type_changes: bool,
}

impl PermissionFlags {
    /// Both flags set
    pub fn elevated() -> Self {
        Self {
            build_in_pause: true,
            arbitrary_structure_type_changes: true,
        }
    }
}

/// Access to the host's permission flags
pub trait BuildPermissions: Send + Sync {
    /// Current flags
    fn flags(&self) -> PermissionFlags;

    /// Replace the flags
    fn set_flags(&self, flags: PermissionFlags);
}
