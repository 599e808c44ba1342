//! Scene node storage

use slotmap::new_key_type;

use crate::dirty::{DirtyFlags, DirtyState, DirtyTracker};
use crate::foundation::bounds::{BoundingSphere, AABB};
use crate::foundation::math::{Mat4, Quat, Transform, Vec3};

new_key_type! {
    /// Stable handle to a node in a [`SceneGraph`](super::SceneGraph)
    pub struct NodeId;
}

/// Content-bearing geometry with precomputed bounds
///
/// Nodes carrying geometry report these bounds as-is. They are owned by the
/// host and never invalidated by dirty tracking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    bounding_box: AABB,
    bounding_sphere: BoundingSphere,
}

impl Geometry {
    /// Geometry with the given local-space box; the sphere is derived from it
    pub fn new(bounding_box: AABB) -> Self {
        Self {
            bounding_box,
            bounding_sphere: bounding_box.bounding_sphere(),
        }
    }

    /// Compute bounds from vertex positions, `None` if there are none
    pub fn from_points(points: &[Vec3]) -> Option<Self> {
        AABB::from_points(points).map(Self::new)
    }

    /// Local-space bounding box
    pub fn bounding_box(&self) -> &AABB {
        &self.bounding_box
    }

    /// Local-space bounding sphere
    pub fn bounding_sphere(&self) -> &BoundingSphere {
        &self.bounding_sphere
    }
}

/// A node in the scene graph
///
/// Holds the local transform inputs, the derived matrices, the bounds, and
/// the optional dirty-tracking state installed by [`attach`](crate::dirty::attach).
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub(crate) name: String,
    pub(crate) transform: Transform,
    pub(crate) local_matrix: Mat4,
    pub(crate) world_matrix: Mat4,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) geometry: Option<Geometry>,
    pub(crate) bounding_box: AABB,
    pub(crate) bounding_sphere: BoundingSphere,
    pub(crate) dirty: Option<DirtyState>,
}

impl SceneNode {
    pub(crate) fn new(name: String, transform: Transform) -> Self {
        let local_matrix = transform.to_matrix();
        Self {
            name,
            transform,
            local_matrix,
            world_matrix: local_matrix,
            parent: None,
            children: Vec::new(),
            geometry: None,
            bounding_box: AABB::point(),
            bounding_sphere: BoundingSphere::default(),
            dirty: None,
        }
    }

    /// Debug name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local transform inputs
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Position relative to the parent
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    /// Rotation relative to the parent
    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    /// Scale relative to the parent
    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    /// Last composed local matrix
    pub fn local_matrix(&self) -> &Mat4 {
        &self.local_matrix
    }

    /// Last composed world matrix
    pub fn world_matrix(&self) -> &Mat4 {
        &self.world_matrix
    }

    /// Parent node, if any
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Attached geometry, if any
    pub fn geometry(&self) -> Option<&Geometry> {
        self.geometry.as_ref()
    }

    /// Local-space bounding box; forwards to the geometry when present
    pub fn bounding_box(&self) -> &AABB {
        match &self.geometry {
            Some(geometry) => geometry.bounding_box(),
            None => &self.bounding_box,
        }
    }

    /// Local-space bounding sphere; forwards to the geometry when present
    pub fn bounding_sphere(&self) -> &BoundingSphere {
        match &self.geometry {
            Some(geometry) => geometry.bounding_sphere(),
            None => &self.bounding_sphere,
        }
    }

    /// Whether dirty tracking has been attached
    pub fn is_tracked(&self) -> bool {
        self.dirty.is_some()
    }

    /// Current dirty flags, `None` when untracked
    pub fn dirty_flags(&self) -> Option<DirtyFlags> {
        self.dirty.as_ref().map(DirtyState::flags)
    }

    /// Tracker this node reports to, `None` when untracked
    pub fn tracker(&self) -> Option<&DirtyTracker> {
        self.dirty.as_ref().map(DirtyState::tracker)
    }

    /// Position, rotation or scale changed since the last compose
    pub fn local_transform_dirty(&self) -> bool {
        self.has_flag(DirtyFlags::LOCAL_TRANSFORM)
    }

    /// World matrix is stale
    pub fn world_transform_dirty(&self) -> bool {
        self.has_flag(DirtyFlags::WORLD_TRANSFORM)
    }

    /// Bounds are stale
    pub fn bounds_dirty(&self) -> bool {
        self.has_flag(DirtyFlags::BOUNDS)
    }

    fn has_flag(&self, flag: DirtyFlags) -> bool {
        self.dirty_flags().is_some_and(|flags| flags.contains(flag))
    }
}
