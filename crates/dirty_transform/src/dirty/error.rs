//! Dirty-tracking errors

use thiserror::Error;

use crate::scene::{NodeId, SceneError};

/// Errors raised by attachment
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyError {
    /// The node already carries dirty-tracking state
    #[error("Node {0:?} is already dirty-tracked")]
    AlreadyTracked(NodeId),

    /// Underlying scene graph failure
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),
}
