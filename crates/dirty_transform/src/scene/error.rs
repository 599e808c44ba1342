//! Host scene graph errors

use thiserror::Error;

use super::NodeId;

/// Errors raised by scene graph structure operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    /// The id does not refer to a live node
    #[error("Node not found: {0:?}")]
    NodeNotFound(NodeId),

    /// Parenting would make a node its own ancestor
    #[error("Cannot parent {node:?} under {parent:?}: would create a cycle")]
    CycleDetected {
        /// Node being re-parented
        node: NodeId,
        /// Requested parent (the node itself or one of its descendants)
        parent: NodeId,
    },
}
