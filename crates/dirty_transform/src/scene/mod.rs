//! Host scene graph
//!
//! A minimal retained-mode hierarchy that the dirty-tracking core attaches to.
//! It owns the nodes, their transform inputs and derived matrices, optional
//! geometry, and the parent/child links.

mod error;
mod graph;
mod node;

pub use error::SceneError;
pub use graph::SceneGraph;
pub use node::{Geometry, NodeId, SceneNode};
