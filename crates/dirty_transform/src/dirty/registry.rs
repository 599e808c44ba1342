//! Active-tracker registry
//!
//! Holds the tracker that [`attach`](super::attach) binds new nodes to. The slot
//! starts out holding [`default_tracker`] and is never empty. Trackers are
//! `!Send`, so the registry is per thread; all dirty-tracking work for a scene
//! has to happen on one thread anyway.
//!
//! Prefer passing a tracker explicitly ([`attach_with`](super::attach_with),
//! [`attach_subtree`](super::attach_subtree)); the registry is a fallback.

use std::cell::RefCell;

use super::DirtyTracker;

thread_local! {
    static DEFAULT_TRACKER: DirtyTracker = DirtyTracker::new();
    static ACTIVE_TRACKER: RefCell<DirtyTracker> = RefCell::new(default_tracker());
}

/// The default tracker for this thread
pub fn default_tracker() -> DirtyTracker {
    DEFAULT_TRACKER.with(DirtyTracker::clone)
}

/// The tracker newly attached nodes bind to
pub fn active_tracker() -> DirtyTracker {
    ACTIVE_TRACKER.with(|active| active.borrow().clone())
}

/// Make `tracker` active, returning the previously active tracker
pub fn set_active_tracker(tracker: DirtyTracker) -> DirtyTracker {
    ACTIVE_TRACKER.with(|active| active.replace(tracker))
}

/// Scoped swap of the active tracker
///
/// The previous tracker is restored when the scope is dropped, including on
/// early return and unwinding.
#[must_use = "the previous tracker is restored as soon as the scope is dropped"]
#[derive(Debug)]
pub struct ActiveTrackerScope {
    previous: Option<DirtyTracker>,
}

impl ActiveTrackerScope {
    /// Make `tracker` active until the returned scope is dropped
    pub fn enter(tracker: DirtyTracker) -> Self {
        Self {
            previous: Some(set_active_tracker(tracker)),
        }
    }
}

impl Drop for ActiveTrackerScope {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            set_active_tracker(previous);
        }
    }
}
