//! Arena-backed scene hierarchy
//!
//! Nodes live in a [`SlotMap`]; parents own their children through ordered id
//! lists and children keep a non-owning parent id. Every mutation of a local
//! transform input or of the parent link goes through the graph so tracked
//! nodes can be marked dirty.

use slotmap::SlotMap;

use super::node::{Geometry, NodeId, SceneNode};
use super::SceneError;
use crate::foundation::bounds::{BoundingSphere, AABB};
use crate::foundation::math::{Mat4, Quat, Transform, Vec3};

/// Retained-mode scene hierarchy
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    pub(crate) nodes: SlotMap<NodeId, SceneNode>,
}

impl SceneGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }

    /// Create a root node with an identity transform
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        self.create_node_with(name, Transform::identity())
    }

    /// Create a root node with the given transform
    pub fn create_node_with(&mut self, name: impl Into<String>, transform: Transform) -> NodeId {
        self.nodes.insert(SceneNode::new(name.into(), transform))
    }

    /// Look up a node
    pub fn node(&self, id: NodeId) -> Result<&SceneNode, SceneError> {
        self.nodes.get(id).ok_or(SceneError::NodeNotFound(id))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut SceneNode, SceneError> {
        self.nodes.get_mut(id).ok_or(SceneError::NodeNotFound(id))
    }

    /// Whether `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.node(id)?.parent)
    }

    /// Children of a node in insertion order
    pub fn children(&self, id: NodeId) -> Result<&[NodeId], SceneError> {
        Ok(&self.node(id)?.children)
    }

    /// Append `child` to `parent`, detaching it from any previous parent
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.set_parent(child, Some(parent))
    }

    /// Detach a node from its parent, making it a root
    pub fn detach(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.set_parent(id, None)
    }

    /// Change a node's parent.
    ///
    /// Setting the current parent again does nothing. Otherwise the old and new
    /// parents' bounds are marked dirty, the link is moved, and the node's world
    /// transform is marked dirty.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) -> Result<(), SceneError> {
        let old_parent = self.node(id)?.parent;
        if old_parent == parent {
            return Ok(());
        }

        if let Some(new_parent) = parent {
            self.node(new_parent)?;
            let mut ancestor = Some(new_parent);
            while let Some(current) = ancestor {
                if current == id {
                    return Err(SceneError::CycleDetected { node: id, parent: new_parent });
                }
                ancestor = self.node(current)?.parent;
            }
        }

        if let Some(old) = old_parent {
            self.mark_bounds_dirty(old)?;
        }
        if let Some(new_parent) = parent {
            self.mark_bounds_dirty(new_parent)?;
        }

        if let Some(old) = old_parent {
            self.node_mut(old)?.children.retain(|&child| child != id);
        }
        if let Some(new_parent) = parent {
            self.node_mut(new_parent)?.children.push(id);
        }
        self.node_mut(id)?.parent = parent;

        self.mark_world_transform_dirty(id)
    }

    /// Remove a node and its whole subtree
    pub fn remove(&mut self, id: NodeId) -> Result<(), SceneError> {
        self.detach(id)?;
        for node in self.traverse(id)? {
            self.nodes.remove(node);
        }
        Ok(())
    }

    /// All nodes of the subtree rooted at `root`, parents before children
    pub fn traverse(&self, root: NodeId) -> Result<Vec<NodeId>, SceneError> {
        self.node(root)?;
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(current) = stack.pop() {
            order.push(current);
            stack.extend(self.node(current)?.children.iter().rev().copied());
        }
        Ok(order)
    }

    /// Replace all local transform inputs
    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> Result<(), SceneError> {
        self.node_mut(id)?.transform = transform;
        self.mark_local_transform_dirty(id)
    }

    /// Set the position relative to the parent
    pub fn set_position(&mut self, id: NodeId, position: Vec3) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.position = position;
        self.mark_local_transform_dirty(id)
    }

    /// Set the x component of the position
    pub fn set_position_x(&mut self, id: NodeId, x: f32) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.position.x = x;
        self.mark_local_transform_dirty(id)
    }

    /// Set the y component of the position
    pub fn set_position_y(&mut self, id: NodeId, y: f32) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.position.y = y;
        self.mark_local_transform_dirty(id)
    }

    /// Set the z component of the position
    pub fn set_position_z(&mut self, id: NodeId, z: f32) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.position.z = z;
        self.mark_local_transform_dirty(id)
    }

    /// Set the scale relative to the parent
    pub fn set_scale(&mut self, id: NodeId, scale: Vec3) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.scale = scale;
        self.mark_local_transform_dirty(id)
    }

    /// Set the x component of the scale
    pub fn set_scale_x(&mut self, id: NodeId, x: f32) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.scale.x = x;
        self.mark_local_transform_dirty(id)
    }

    /// Set the y component of the scale
    pub fn set_scale_y(&mut self, id: NodeId, y: f32) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.scale.y = y;
        self.mark_local_transform_dirty(id)
    }

    /// Set the z component of the scale
    pub fn set_scale_z(&mut self, id: NodeId, z: f32) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.scale.z = z;
        self.mark_local_transform_dirty(id)
    }

    /// Set the orientation
    pub fn set_rotation(&mut self, id: NodeId, rotation: Quat) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.rotation = rotation;
        self.mark_local_transform_dirty(id)
    }

    /// Set the orientation from Euler angles in radians (roll, pitch, yaw)
    pub fn set_rotation_euler(
        &mut self,
        id: NodeId,
        roll: f32,
        pitch: f32,
        yaw: f32,
    ) -> Result<(), SceneError> {
        self.set_rotation(id, Quat::from_euler_angles(roll, pitch, yaw))
    }

    /// Attach or clear content geometry.
    ///
    /// The geometry's own bounds are taken as-is; only the parent's aggregate
    /// is invalidated.
    pub fn set_geometry(
        &mut self,
        id: NodeId,
        geometry: Option<Geometry>,
    ) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        node.geometry = geometry;
        let parent = node.parent;
        if geometry.is_none() {
            self.mark_bounds_dirty(id)?;
        }
        match parent {
            Some(parent) => self.mark_bounds_dirty(parent),
            None => Ok(()),
        }
    }

    /// Last composed local matrix
    pub fn local_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        Ok(self.node(id)?.local_matrix)
    }

    /// Last composed world matrix
    pub fn world_matrix(&self, id: NodeId) -> Result<Mat4, SceneError> {
        Ok(self.node(id)?.world_matrix)
    }

    /// Local-space bounding box (geometry bounds for content-bearing nodes)
    pub fn bounding_box(&self, id: NodeId) -> Result<AABB, SceneError> {
        Ok(*self.node(id)?.bounding_box())
    }

    /// Local-space bounding sphere (geometry bounds for content-bearing nodes)
    pub fn bounding_sphere(&self, id: NodeId) -> Result<BoundingSphere, SceneError> {
        Ok(*self.node(id)?.bounding_sphere())
    }

    /// Bring a node's matrices up to date.
    ///
    /// Tracked nodes recompute only what is dirty via
    /// [`update_transform`](Self::update_transform). Untracked nodes have no
    /// flags, so their whole subtree is recomposed from the stored parent world
    /// matrix.
    pub fn update_matrix_world(&mut self, id: NodeId) -> Result<(), SceneError> {
        if self.node(id)?.is_tracked() {
            return self.update_transform(id);
        }

        for current in self.traverse(id)? {
            let parent_world = match self.node(current)?.parent {
                Some(parent) => Some(self.node(parent)?.world_matrix),
                None => None,
            };
            if self.node(current)?.is_tracked() {
                // An untracked ancestor moved without marking anything below it.
                self.mark_world_transform_dirty(current)?;
                self.update_transform(current)?;
                continue;
            }
            let node = self.node_mut(current)?;
            node.local_matrix = node.transform.to_matrix();
            node.world_matrix = match parent_world {
                Some(parent_world) => parent_world * node.local_matrix,
                None => node.local_matrix,
            };
        }
        Ok(())
    }
}
