//! # Dirty Tracker
//!
//! Collects nodes whose transforms or bounds went stale and recomputes them in
//! bulk when the caller flushes.
//!
//! A [`DirtyTracker`] is a cheap, clonable handle: every clone refers to the
//! same pair of queues, which is how nodes keep a reference to the tracker they
//! were attached to. Handles are `!Send`; a tracker and the nodes bound to it
//! stay on the thread that created them.
//!
//! ## Queues
//!
//! Both queues keep insertion order. A node is only enqueued when its flag goes
//! from clean to dirty, so each node appears at most once per queue between
//! flushes. The tracker itself does not deduplicate.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::config::TrackerConfig;
use crate::scene::{NodeId, SceneGraph};

/// Extra bookkeeping invoked whenever a node is enqueued
///
/// Observers run after the default enqueue, so they cannot suppress it.
pub trait DirtyObserver {
    /// A node's world transform went stale
    fn on_transform_dirty(&mut self, _node: NodeId) {}

    /// A node's bounds went stale
    fn on_bounds_dirty(&mut self, _node: NodeId) {}
}

/// Result of a flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Queued nodes whose transform update ran
    pub transforms_updated: usize,
    /// Queued nodes whose bounds update ran
    pub bounds_updated: usize,
    /// Wall time spent flushing
    pub elapsed: Duration,
}

struct TrackerState {
    dirty_transforms: Vec<NodeId>,
    dirty_bounds: Vec<NodeId>,
    observer: Option<Box<dyn DirtyObserver>>,
    config: TrackerConfig,
}

/// Shared collector of dirty nodes
#[derive(Clone)]
pub struct DirtyTracker {
    state: Rc<RefCell<TrackerState>>,
}

impl DirtyTracker {
    /// Create a tracker with default configuration
    pub fn new() -> Self {
        Self::with_config(TrackerConfig::default())
    }

    /// Create a tracker from configuration
    pub fn with_config(config: TrackerConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(TrackerState {
                dirty_transforms: Vec::with_capacity(config.queue_capacity),
                dirty_bounds: Vec::with_capacity(config.queue_capacity),
                observer: None,
                config,
            })),
        }
    }

    /// Builder pattern: install an observer
    pub fn with_observer(self, observer: impl DirtyObserver + 'static) -> Self {
        self.set_observer(Some(Box::new(observer)));
        self
    }

    /// Replace the observer, returning the previous one
    pub fn set_observer(
        &self,
        observer: Option<Box<dyn DirtyObserver>>,
    ) -> Option<Box<dyn DirtyObserver>> {
        std::mem::replace(&mut self.state.borrow_mut().observer, observer)
    }

    /// Whether two handles refer to the same tracker
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    /// Configuration this tracker was built with
    pub fn config(&self) -> TrackerConfig {
        self.state.borrow().config.clone()
    }

    /// Enqueue a node whose world transform went stale
    pub fn on_transform_dirty(&self, node: NodeId) {
        self.state.borrow_mut().dirty_transforms.push(node);
        self.notify(|observer| observer.on_transform_dirty(node));
    }

    /// Enqueue a node whose bounds went stale
    pub fn on_bounds_dirty(&self, node: NodeId) {
        self.state.borrow_mut().dirty_bounds.push(node);
        self.notify(|observer| observer.on_bounds_dirty(node));
    }

    // The observer is taken out for the call so it may use this tracker.
    fn notify(&self, call: impl FnOnce(&mut dyn DirtyObserver)) {
        let Some(mut observer) = self.state.borrow_mut().observer.take() else {
            return;
        };
        call(observer.as_mut());
        let mut state = self.state.borrow_mut();
        if state.observer.is_none() {
            state.observer = Some(observer);
        }
    }

    /// Snapshot of the transform queue
    pub fn dirty_transforms(&self) -> Vec<NodeId> {
        self.state.borrow().dirty_transforms.clone()
    }

    /// Snapshot of the bounds queue
    pub fn dirty_bounds(&self) -> Vec<NodeId> {
        self.state.borrow().dirty_bounds.clone()
    }

    /// Length of the transform queue
    pub fn dirty_transform_count(&self) -> usize {
        self.state.borrow().dirty_transforms.len()
    }

    /// Length of the bounds queue
    pub fn dirty_bounds_count(&self) -> usize {
        self.state.borrow().dirty_bounds.len()
    }

    /// True if both queues are empty
    pub fn is_clean(&self) -> bool {
        let state = self.state.borrow();
        state.dirty_transforms.is_empty() && state.dirty_bounds.is_empty()
    }

    /// Update the transform of every queued node, then clear the queue.
    ///
    /// A node may already have been brought current while updating a later
    /// descendant's ancestors; the repeated update is a no-op. Nodes removed
    /// from the graph since they were queued are skipped. Returns the number
    /// of nodes updated.
    pub fn update_all_transforms(&self, graph: &mut SceneGraph) -> usize {
        let mut queue = std::mem::take(&mut self.state.borrow_mut().dirty_transforms);
        let mut updated = 0;
        for &node in &queue {
            match graph.update_transform(node) {
                Ok(()) => updated += 1,
                Err(e) => trace!("Skipping queued transform: {}", e),
            }
        }
        queue.clear();
        self.recycle(queue, |state| &mut state.dirty_transforms);
        updated
    }

    /// Update the bounds of every queued node, then clear the queue.
    ///
    /// Returns the number of nodes updated.
    pub fn update_all_bounds(&self, graph: &mut SceneGraph) -> usize {
        let mut queue = std::mem::take(&mut self.state.borrow_mut().dirty_bounds);
        let mut updated = 0;
        for &node in &queue {
            match graph.update_bounds(node) {
                Ok(()) => updated += 1,
                Err(e) => trace!("Skipping queued bounds: {}", e),
            }
        }
        queue.clear();
        self.recycle(queue, |state| &mut state.dirty_bounds);
        updated
    }

    // Hands the drained buffer back unless something was enqueued meanwhile.
    fn recycle(
        &self,
        queue: Vec<NodeId>,
        slot: impl FnOnce(&mut TrackerState) -> &mut Vec<NodeId>,
    ) {
        let mut state = self.state.borrow_mut();
        let current = slot(&mut *state);
        if current.is_empty() {
            *current = queue;
        }
    }

    /// Flush transforms, then bounds.
    ///
    /// Bounds aggregation reads children's local matrices, so transforms must
    /// be current first.
    pub fn update_all(&self, graph: &mut SceneGraph) -> FlushStats {
        let start = Instant::now();
        let transforms_updated = self.update_all_transforms(graph);
        let bounds_updated = self.update_all_bounds(graph);
        let stats = FlushStats {
            transforms_updated,
            bounds_updated,
            elapsed: start.elapsed(),
        };

        if self.state.borrow().config.log_flushes {
            debug!(
                "Flushed {} transforms and {} bounds in {:?}",
                stats.transforms_updated, stats.bounds_updated, stats.elapsed
            );
        }
        stats
    }
}

impl Default for DirtyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for DirtyTracker {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for DirtyTracker {}

impl fmt::Debug for DirtyTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state.try_borrow() {
            Ok(state) => f
                .debug_struct("DirtyTracker")
                .field("dirty_transforms", &state.dirty_transforms.len())
                .field("dirty_bounds", &state.dirty_bounds.len())
                .field("has_observer", &state.observer.is_some())
                .finish(),
            Err(_) => f.debug_struct("DirtyTracker").finish_non_exhaustive(),
        }
    }
}
