//! # Dirty Transform
//!
//! Deferred recomputation of world transforms and bounding volumes for a
//! retained-mode scene graph.
//!
//! Mutating a node marks it dirty and enqueues it with a tracker; nothing is
//! recomputed until the caller flushes. Deeply nested moves therefore cost
//! O(1) at mutation time plus one pass over the affected nodes per flush.
//!
//! ## Quick Start
//!
//! ```rust
//! use dirty_transform::prelude::*;
//!
//! let mut graph = SceneGraph::new();
//! let root = graph.create_node("root");
//! let child = graph.create_node_with("child", Transform::from_position(Vec3::new(0.0, 1.0, 0.0)));
//! graph.add_child(root, child)?;
//!
//! let tracker = DirtyTracker::new();
//! attach_subtree(&mut graph, root, Some(tracker.clone()))?;
//!
//! graph.set_position_x(root, 10.0)?;
//! assert_eq!(tracker.dirty_transform_count(), 2);
//!
//! tracker.update_all(&mut graph);
//! assert!(tracker.is_clean());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Threading
//!
//! Trackers are reference counted without synchronization and the active
//! tracker registry is thread-local. Keep a scene graph and its trackers on a
//! single thread.

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod dirty;
pub mod foundation;
pub mod scene;

/// Common imports for users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, DirtyConfig, TrackerConfig},
        dirty::{
            active_tracker, attach, attach_subtree, attach_with, default_tracker,
            set_active_tracker, ActiveTrackerScope, DirtyError, DirtyFlags, DirtyObserver,
            DirtyTracker, FlushStats,
        },
        foundation::{
            bounds::{expand_by_transformed_box, BoundingSphere, AABB},
            math::{Mat4, Quat, Transform, Vec3},
        },
        scene::{Geometry, NodeId, SceneError, SceneGraph, SceneNode},
    };
}
