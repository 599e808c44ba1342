//! Dirty propagation and deferred recomputation
//!
//! Marking is cheap and eager: flags are set and nodes are enqueued the moment
//! something changes. Recomputation is lazy and runs only when a node (or its
//! tracker) is asked to update.
//!
//! Rules:
//! - a moved node dirties its own local and world transform, the world
//!   transform of every descendant, and the bounds of every ancestor;
//! - world recomputation first brings stale ancestors current;
//! - bounds recomputation first brings children's transforms and bounds current.
//!
//! Every mark stops at nodes that are already dirty, which keeps each node in
//! its tracker's queues at most once. Untracked nodes are neither marked nor
//! propagated through.

use log::trace;

use super::DirtyFlags;
use crate::foundation::bounds::{expand_by_transformed_box, AABB};
use crate::scene::{NodeId, SceneError, SceneGraph};

impl SceneGraph {
    /// Mark a node's local transform inputs as changed.
    ///
    /// Also marks its world transform (and so its descendants') and its
    /// parent's bounds. The node's own bounds are local and unaffected.
    pub fn mark_local_transform_dirty(&mut self, id: NodeId) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        let Some(state) = node.dirty.as_mut() else {
            return Ok(());
        };
        if state.flags.contains(DirtyFlags::LOCAL_TRANSFORM) {
            return Ok(());
        }
        state.flags.insert(DirtyFlags::LOCAL_TRANSFORM);
        let parent = node.parent;
        trace!("Local transform dirty: {:?}", id);

        self.mark_world_transform_dirty(id)?;
        match parent {
            Some(parent) => self.mark_bounds_dirty(parent),
            None => Ok(()),
        }
    }

    /// Mark a node's world transform, and every descendant's, as stale
    pub fn mark_world_transform_dirty(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.node(id)?;
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get_mut(current) else {
                continue;
            };
            let Some(state) = node.dirty.as_mut() else {
                continue;
            };
            if state.flags.contains(DirtyFlags::WORLD_TRANSFORM) {
                continue;
            }
            state.flags.insert(DirtyFlags::WORLD_TRANSFORM);
            state.tracker().on_transform_dirty(current);
            stack.extend(node.children.iter().rev().copied());
        }
        Ok(())
    }

    /// Mark a node's bounds, and every ancestor's, as stale
    pub fn mark_bounds_dirty(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.node(id)?;
        let mut next = Some(id);
        while let Some(current) = next {
            let Some(node) = self.nodes.get_mut(current) else {
                break;
            };
            let Some(state) = node.dirty.as_mut() else {
                break;
            };
            if state.flags.contains(DirtyFlags::BOUNDS) {
                break;
            }
            state.flags.insert(DirtyFlags::BOUNDS);
            state.tracker().on_bounds_dirty(current);
            next = node.parent;
        }
        Ok(())
    }

    /// Recompute whatever is stale of a node's local and world matrices.
    ///
    /// A stale world matrix needs the parent's world matrix, so the parent is
    /// updated first (recursively). Calling this on a clean or untracked node
    /// does nothing.
    pub fn update_transform(&mut self, id: NodeId) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        let Some(state) = node.dirty.as_mut() else {
            return Ok(());
        };

        if state.flags.contains(DirtyFlags::LOCAL_TRANSFORM) {
            state.flags.remove(DirtyFlags::LOCAL_TRANSFORM);
            node.local_matrix = node.transform.to_matrix();
        }

        if !node.world_transform_dirty() {
            return Ok(());
        }

        let parent = node.parent;
        let local = node.local_matrix;
        let world = match parent {
            Some(parent) => {
                self.update_transform(parent)?;
                self.node(parent)?.world_matrix * local
            }
            None => local,
        };

        let node = self.node_mut(id)?;
        node.world_matrix = world;
        if let Some(state) = node.dirty.as_mut() {
            state.flags.remove(DirtyFlags::WORLD_TRANSFORM);
        }
        Ok(())
    }

    /// Recompute a node's bounds from its children if they are stale.
    ///
    /// Each child's transform and bounds are brought current first, then the
    /// child's box is merged through the child's local matrix. A node without
    /// children collapses to a point at the origin. Geometry-bearing nodes keep
    /// their geometry's bounds. The flag is cleared in every case.
    pub fn update_bounds(&mut self, id: NodeId) -> Result<(), SceneError> {
        let node = self.node(id)?;
        if !node.is_tracked() {
            return Ok(());
        }

        if node.geometry.is_none() && node.bounds_dirty() {
            let child_count = node.children.len();
            let mut bounding_box = if child_count == 0 { AABB::point() } else { AABB::empty() };

            for index in 0..child_count {
                let child = self.node(id)?.children[index];
                self.update_transform(child)?;
                self.update_bounds(child)?;
                let child_node = self.node(child)?;
                expand_by_transformed_box(
                    &mut bounding_box,
                    child_node.bounding_box(),
                    &child_node.local_matrix,
                );
            }

            let node = self.node_mut(id)?;
            node.bounding_box = bounding_box;
            node.bounding_sphere = bounding_box.bounding_sphere();
            trace!("Bounds recomputed: {:?} -> {:?}", id, bounding_box);
        }

        if let Some(state) = self.node_mut(id)?.dirty.as_mut() {
            state.flags.remove(DirtyFlags::BOUNDS);
        }
        Ok(())
    }

    /// Force a bounds recomputation regardless of the current flag, without
    /// enqueueing anything
    pub(crate) fn recompute_bounds(&mut self, id: NodeId) -> Result<(), SceneError> {
        if let Some(state) = self.node_mut(id)?.dirty.as_mut() {
            state.flags.insert(DirtyFlags::BOUNDS);
        }
        self.update_bounds(id)
    }
}
