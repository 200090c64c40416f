use crate::graph::{Node, SceneGraph};
use crate::SceneError;
use std::sync::Arc;
use worldscene_assets::Texture;
use worldscene_common::NodeId;

/// Scene root: the node graph plus background and environment state.
#[derive(Debug, Clone)]
pub struct Scene {
    pub graph: SceneGraph,
    /// Backdrop drawn behind all geometry. `None` renders the clear color.
    pub background: Option<Arc<Texture>>,
    /// Image-based lighting source. `None` disables environment lighting.
    pub environment: Option<Arc<Texture>>,
    pub background_intensity: f32,
    pub environment_intensity: f32,
}

impl Default for Scene {
    fn default() -> Self {
        Self::create()
    }
}

impl Scene {
    /// An empty scene: root node only, no background or environment.
    pub fn create() -> Self {
        Self {
            graph: SceneGraph::new(),
            background: None,
            environment: None,
            background_intensity: 1.0,
            environment_intensity: 1.0,
        }
    }

    pub fn root(&self) -> NodeId {
        self.graph.root()
    }

    /// Attach a node directly under the root.
    pub fn add(&mut self, node: Node) -> Result<NodeId, SceneError> {
        self.graph.add(self.graph.root(), node)
    }

    pub fn has_background(&self) -> bool {
        self.background.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodeRole;

    #[test]
    fn new_scene_is_empty() {
        let scene = Scene::create();
        assert!(scene.graph.is_empty());
        assert!(scene.background.is_none());
        assert!(scene.environment.is_none());
        assert_eq!(scene.background_intensity, 1.0);
    }

    #[test]
    fn add_attaches_under_root() {
        let mut scene = Scene::create();
        let group = scene.add(Node::group("main")).unwrap();
        assert_eq!(scene.graph.get(group).unwrap().parent(), Some(scene.root()));
        assert_eq!(scene.graph.count_role(NodeRole::Group), 1);
    }
}
