//! Scene state: a hierarchical node graph, the camera that views it, and the
//! factories that produce the stock floor and light nodes.
//!
//! # Invariants
//! - Every node except the root has exactly one parent.
//! - The graph never contains a cycle; `add` and `reparent` reject them.
//! - Renderers only read the scene; all mutations go through `SceneGraph`.

pub mod camera;
pub mod factory;
pub mod graph;
pub mod scene;

pub use camera::PerspectiveCamera;
pub use factory::{Floor, HelperFactory, HelperParts, Light, NoHelpers, StandardHelpers};
pub use graph::{
    BoxMesh, DirectionalLight, DirectionalLightHelper, HelperPart, LightParams, Node, NodeKind,
    NodeRole, SceneGraph,
};
pub use scene::Scene;

use worldscene_common::NodeId;

/// Errors from scene graph operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("node {0:?} not found")]
    NodeNotFound(NodeId),
    #[error("node {0:?} is already attached to the graph")]
    AlreadyAttached(NodeId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { child: NodeId, parent: NodeId },
    #[error("the root node cannot be moved or removed")]
    RootImmutable,
}
