//! Attachment of dirty tracking to existing nodes
//!
//! Attaching installs a [`DirtyState`] on the node, bound to a tracker, and
//! brings the node's matrices and bounds current so it starts out clean. A
//! node attached under a parent whose world matrix is stale starts out
//! world-dirty instead, and its parent's aggregate bounds are marked stale.

use log::{debug, warn};

use super::registry::{active_tracker, ActiveTrackerScope};
use super::{DirtyError, DirtyState, DirtyTracker};
use crate::foundation::math::Transform;
use crate::scene::{NodeId, SceneGraph};

/// Attach dirty tracking to one node, bound to the active tracker
pub fn attach(graph: &mut SceneGraph, id: NodeId) -> Result<(), DirtyError> {
    attach_with(graph, id, active_tracker())
}

/// Attach dirty tracking to one node, bound to `tracker`.
///
/// Fails with [`DirtyError::AlreadyTracked`] if the node is tracked already;
/// its existing state is left untouched.
pub fn attach_with(
    graph: &mut SceneGraph,
    id: NodeId,
    tracker: DirtyTracker,
) -> Result<(), DirtyError> {
    install(graph, id, tracker)?;
    graph.recompute_bounds(id)?;
    mark_parent_bounds(graph, id)
}

/// Attach dirty tracking to every node of the subtree rooted at `root`.
///
/// Nodes bind to `tracker`, or to the active tracker when `None`. The active
/// tracker is swapped for the duration of the call and restored on every exit
/// path. Stops at the first node that fails to attach; the nodes attached
/// before it keep their tracking and still get their bounds computed. Returns
/// the number of nodes attached.
pub fn attach_subtree(
    graph: &mut SceneGraph,
    root: NodeId,
    tracker: Option<DirtyTracker>,
) -> Result<usize, DirtyError> {
    let _scope = ActiveTrackerScope::enter(tracker.unwrap_or_else(active_tracker));

    let nodes = graph.traverse(root)?;
    let mut installed = 0;
    let result = nodes.iter().try_for_each(|&id| {
        install(graph, id, active_tracker())?;
        installed += 1;
        Ok::<(), DirtyError>(())
    });

    // Reverse pre-order visits every node after all of its descendants.
    for &id in nodes[..installed].iter().rev() {
        graph.recompute_bounds(id)?;
    }
    if installed > 0 {
        mark_parent_bounds(graph, root)?;
    }
    result?;

    debug!("Attached dirty tracking to {} nodes under {:?}", installed, root);
    Ok(installed)
}

fn install(graph: &mut SceneGraph, id: NodeId, tracker: DirtyTracker) -> Result<(), DirtyError> {
    let (parent_world, parent_stale) = match graph.parent(id)? {
        Some(parent) => {
            let parent = graph.node(parent)?;
            (Some(*parent.world_matrix()), parent.world_transform_dirty())
        }
        None => (None, false),
    };

    let node = graph.node_mut(id)?;
    if node.dirty.is_some() {
        warn!("Ignoring repeated attach of {:?} ({})", id, node.name);
        return Err(DirtyError::AlreadyTracked(id));
    }

    node.local_matrix = node.transform.to_matrix();
    node.world_matrix = match parent_world {
        Some(parent_world) => parent_world * node.local_matrix,
        None => node.local_matrix,
    };
    node.dirty = Some(DirtyState::new(tracker));

    // The world matrix above came from a stale parent.
    if parent_stale {
        graph.mark_world_transform_dirty(id)?;
    }
    Ok(())
}

// The attached node's bounds changed, so the parent's aggregate is stale.
fn mark_parent_bounds(graph: &mut SceneGraph, id: NodeId) -> Result<(), DirtyError> {
    if let Some(parent) = graph.parent(id)? {
        graph.mark_bounds_dirty(parent)?;
    }
    Ok(())
}

impl SceneGraph {
    /// Create a root node that is dirty-tracked from the start, bound to the
    /// active tracker
    pub fn spawn_tracked(
        &mut self,
        name: impl Into<String>,
        transform: Transform,
    ) -> Result<NodeId, DirtyError> {
        let id = self.create_node_with(name, transform);
        attach(self, id)?;
        Ok(id)
    }
}
