//! Per-node dirty state

use bitflags::bitflags;

use super::DirtyTracker;

bitflags! {
    /// Which derived values of a node are stale
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DirtyFlags: u8 {
        /// Position, rotation or scale changed since the local matrix was composed
        const LOCAL_TRANSFORM = 1 << 0;
        /// World matrix is stale; implied by `LOCAL_TRANSFORM` and by any ancestor moving
        const WORLD_TRANSFORM = 1 << 1;
        /// Bounding box and sphere are stale
        const BOUNDS = 1 << 2;
    }
}

/// Dirty-tracking component installed on a node by attachment
#[derive(Debug, Clone)]
pub struct DirtyState {
    pub(crate) flags: DirtyFlags,
    tracker: DirtyTracker,
}

impl DirtyState {
    pub(crate) fn new(tracker: DirtyTracker) -> Self {
        Self {
            flags: DirtyFlags::empty(),
            tracker,
        }
    }

    /// Current flags
    pub fn flags(&self) -> DirtyFlags {
        self.flags
    }

    /// Tracker bound at attachment time
    pub fn tracker(&self) -> &DirtyTracker {
        &self.tracker
    }
}
