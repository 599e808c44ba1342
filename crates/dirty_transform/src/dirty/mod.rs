//! Dirty-transform and dirty-bounds tracking
//!
//! Tracks which nodes have stale local/world transforms or stale bounds and
//! defers recomputation until a [`DirtyTracker`] is flushed.
//!
//! ## Architecture
//!
//! ```text
//! setter on SceneGraph
//!      ↓
//! mark_* (flags + enqueue once)
//!      ↓
//! DirtyTracker queues
//!      ↓
//! update_all (transforms, then bounds)
//! ```
//!
//! - [`attach`], [`attach_with`] and [`attach_subtree`] install a [`DirtyState`]
//!   on nodes and bind them to a tracker
//! - the registry ([`active_tracker`], [`set_active_tracker`],
//!   [`ActiveTrackerScope`]) decides which tracker plain [`attach`] binds to

mod attach;
mod error;
mod propagation;
mod registry;
mod state;
mod tracker;

pub use attach::{attach, attach_subtree, attach_with};
pub use error::DirtyError;
pub use registry::{active_tracker, default_tracker, set_active_tracker, ActiveTrackerScope};
pub use state::{DirtyFlags, DirtyState};
pub use tracker::{DirtyObserver, DirtyTracker, FlushStats};
