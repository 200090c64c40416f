use crate::SceneError;
use glam::{Mat4, Vec3};
use std::collections::BTreeMap;
use worldscene_common::{Color, NodeId, Transform};

/// Color and strength shared by every light kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightParams {
    pub color: Color,
    intensity: f32,
}

impl LightParams {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity: intensity.max(0.0),
        }
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    /// Negative intensities are clamped to zero.
    pub fn set_intensity(&mut self, intensity: f32) {
        self.intensity = intensity.max(0.0);
    }

    /// Color premultiplied by intensity, as shaders consume it.
    pub fn radiance(&self) -> Vec3 {
        self.color.scaled(self.intensity)
    }
}

/// A light that shines from its node position towards `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub params: LightParams,
    pub target: Vec3,
    pub cast_shadow: bool,
}

impl DirectionalLight {
    /// Normalized direction the light travels in, given its world position.
    pub fn direction_from(&self, position: Vec3) -> Vec3 {
        let dir = self.target - position;
        if dir.length_squared() > f32::EPSILON {
            dir.normalize()
        } else {
            Vec3::NEG_Y
        }
    }
}

/// Axis-aligned box centred on its node origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxMesh {
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub color: Color,
    pub roughness: f32,
    pub metalness: f32,
}

impl BoxMesh {
    pub fn extents(&self) -> Vec3 {
        Vec3::new(self.width, self.height, self.depth)
    }
}

/// Visibility of one sub-part of a helper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HelperPart {
    pub visible: bool,
}

/// Debug visual showing a directional light's plane and direction.
///
/// Both sub-parts are always present; use `Light::create_directional_light_helper`
/// to build one from possibly partial factory output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLightHelper {
    pub light: NodeId,
    pub size: f32,
    pub light_plane: HelperPart,
    pub cone: HelperPart,
}

/// Payload carried by a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Root,
    Group,
    Mesh(BoxMesh),
    AmbientLight(LightParams),
    DirectionalLight(DirectionalLight),
    DirectionalLightHelper(DirectionalLightHelper),
}

/// Tag identifying what a node is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeRole {
    Root,
    Group,
    Floor,
    Mesh,
    AmbientLight,
    DirectionalLight,
    Helper,
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Root => "root",
            Self::Group => "group",
            Self::Floor => "floor",
            Self::Mesh => "mesh",
            Self::AmbientLight => "ambient-light",
            Self::DirectionalLight => "directional-light",
            Self::Helper => "helper",
        };
        f.write_str(s)
    }
}

/// A node in the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: NodeId,
    pub name: String,
    pub role: NodeRole,
    pub kind: NodeKind,
    pub transform: Transform,
    pub visible: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Create a detached node with a fresh id.
    pub fn new(name: impl Into<String>, role: NodeRole, kind: NodeKind) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            role,
            kind,
            transform: Transform::default(),
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeRole::Group, NodeKind::Group)
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn light_params(&self) -> Option<&LightParams> {
        match &self.kind {
            NodeKind::AmbientLight(p) => Some(p),
            NodeKind::DirectionalLight(d) => Some(&d.params),
            _ => None,
        }
    }

    pub fn light_params_mut(&mut self) -> Option<&mut LightParams> {
        match &mut self.kind {
            NodeKind::AmbientLight(p) => Some(p),
            NodeKind::DirectionalLight(d) => Some(&mut d.params),
            _ => None,
        }
    }

    pub fn as_helper_mut(&mut self) -> Option<&mut DirectionalLightHelper> {
        match &mut self.kind {
            NodeKind::DirectionalLightHelper(h) => Some(h),
            _ => None,
        }
    }
}

/// Arena-backed scene graph rooted at a single `Root` node.
///
/// Nodes live in a BTreeMap keyed by id; ordering between siblings is kept in
/// each parent's child list, so traversal is deterministic.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, Node>,
    root: NodeId,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = Node::new("scene", NodeRole::Root, NodeKind::Root);
        let root_id = root.id;
        let mut nodes = BTreeMap::new();
        nodes.insert(root_id, root);
        Self {
            nodes,
            root: root_id,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root is present.
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Attach a detached node (and take ownership of it) under `parent`.
    pub fn add(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, SceneError> {
        let id = node.id;
        if self.nodes.contains_key(&id) {
            return Err(SceneError::AlreadyAttached(id));
        }
        let parent_node = self
            .nodes
            .get_mut(&parent)
            .ok_or(SceneError::NodeNotFound(parent))?;
        parent_node.children.push(id);
        node.parent = Some(parent);
        node.children.clear();
        tracing::debug!(node = %id.short(), role = %node.role, parent = %parent.short(), "attached node");
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Move an attached node (with its subtree) under a new parent.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> Result<(), SceneError> {
        if id == self.root {
            return Err(SceneError::RootImmutable);
        }
        if !self.nodes.contains_key(&id) {
            return Err(SceneError::NodeNotFound(id));
        }
        if !self.nodes.contains_key(&new_parent) {
            return Err(SceneError::NodeNotFound(new_parent));
        }
        if new_parent == id || self.ancestors(new_parent).contains(&id) {
            return Err(SceneError::Cycle {
                child: id,
                parent: new_parent,
            });
        }

        if let Some(old_parent) = self.nodes.get(&id).and_then(|n| n.parent) {
            if let Some(p) = self.nodes.get_mut(&old_parent) {
                p.children.retain(|c| *c != id);
            }
        }
        if let Some(p) = self.nodes.get_mut(&new_parent) {
            p.children.push(id);
        }
        if let Some(n) = self.nodes.get_mut(&id) {
            n.parent = Some(new_parent);
        }
        Ok(())
    }

    /// Detach and return a node and all of its descendants, parent first.
    pub fn remove(&mut self, id: NodeId) -> Result<Vec<Node>, SceneError> {
        if id == self.root {
            return Err(SceneError::RootImmutable);
        }
        let parent = self
            .nodes
            .get(&id)
            .ok_or(SceneError::NodeNotFound(id))?
            .parent;
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            p.children.retain(|c| *c != id);
        }

        let mut removed = Vec::new();
        for node_id in self.descendants(id) {
            if let Some(mut node) = self.nodes.remove(&node_id) {
                if node_id == id {
                    node.parent = None;
                }
                removed.push(node);
            }
        }
        Ok(removed)
    }

    /// Ids from the node's parent up to the root.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.nodes.get(&id).and_then(|n| n.parent);
        while let Some(p) = current {
            out.push(p);
            current = self.nodes.get(&p).and_then(|n| n.parent);
        }
        out
    }

    /// Pre-order ids of the subtree rooted at `id`, including `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(&current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Pre-order traversal of the whole graph.
    pub fn traverse(&self) -> Vec<NodeId> {
        self.descendants(self.root)
    }

    /// Attached nodes carrying `role`, in traversal order.
    pub fn find_by_role(&self, role: NodeRole) -> Vec<NodeId> {
        self.traverse()
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(|n| n.role == role))
            .collect()
    }

    pub fn count_role(&self, role: NodeRole) -> usize {
        self.nodes.values().filter(|n| n.role == role).count()
    }

    /// Local-to-world matrix: the product of every ancestor transform.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let mut matrix = self
            .nodes
            .get(&id)
            .map(|n| n.transform.matrix())
            .unwrap_or(Mat4::IDENTITY);
        for ancestor in self.ancestors(id) {
            if let Some(node) = self.nodes.get(&ancestor) {
                matrix = node.transform.matrix() * matrix;
            }
        }
        matrix
    }

    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.world_matrix(id).transform_point3(Vec3::ZERO)
    }

    /// A node is drawn only if it and all of its ancestors are visible.
    pub fn is_effectively_visible(&self, id: NodeId) -> bool {
        self.nodes.get(&id).is_some_and(|n| n.visible)
            && self
                .ancestors(id)
                .iter()
                .all(|a| self.nodes.get(a).is_some_and(|n| n.visible))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_starts_with_root() {
        let graph = SceneGraph::new();
        assert_eq!(graph.len(), 1);
        assert!(graph.is_empty());
        let root = graph.get(graph.root()).unwrap();
        assert_eq!(root.role, NodeRole::Root);
        assert!(root.parent().is_none());
    }

    #[test]
    fn add_sets_parent_and_child_links() {
        let mut graph = SceneGraph::new();
        let group = graph.add(graph.root(), Node::group("main")).unwrap();
        let child = graph.add(group, Node::group("child")).unwrap();

        assert_eq!(graph.get(child).unwrap().parent(), Some(group));
        assert_eq!(graph.get(group).unwrap().children(), &[child]);
        assert_eq!(graph.ancestors(child), vec![group, graph.root()]);
    }

    #[test]
    fn add_to_unknown_parent_fails() {
        let mut graph = SceneGraph::new();
        let stray = NodeId::new();
        let err = graph.add(stray, Node::group("orphan")).unwrap_err();
        assert_eq!(err, SceneError::NodeNotFound(stray));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn adding_same_node_twice_fails() {
        let mut graph = SceneGraph::new();
        let node = Node::group("twice");
        let copy = node.clone();
        graph.add(graph.root(), node).unwrap();
        assert!(matches!(
            graph.add(graph.root(), copy),
            Err(SceneError::AlreadyAttached(_))
        ));
    }

    #[test]
    fn reparent_rejects_cycles() {
        let mut graph = SceneGraph::new();
        let a = graph.add(graph.root(), Node::group("a")).unwrap();
        let b = graph.add(a, Node::group("b")).unwrap();
        let c = graph.add(b, Node::group("c")).unwrap();

        assert!(matches!(graph.reparent(a, c), Err(SceneError::Cycle { .. })));
        assert!(matches!(graph.reparent(a, a), Err(SceneError::Cycle { .. })));
        assert_eq!(graph.reparent(graph.root(), a), Err(SceneError::RootImmutable));

        graph.reparent(c, a).unwrap();
        assert_eq!(graph.get(a).unwrap().children(), &[b, c]);
        assert!(graph.get(b).unwrap().children().is_empty());
    }

    #[test]
    fn remove_takes_subtree() {
        let mut graph = SceneGraph::new();
        let a = graph.add(graph.root(), Node::group("a")).unwrap();
        let b = graph.add(a, Node::group("b")).unwrap();
        graph.add(b, Node::group("c")).unwrap();

        let removed = graph.remove(a).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(removed[0].id(), a);
        assert!(removed[0].parent().is_none());
        assert_eq!(graph.len(), 1);
        assert!(graph.get(graph.root()).unwrap().children().is_empty());
    }

    #[test]
    fn traversal_is_preorder() {
        let mut graph = SceneGraph::new();
        let a = graph.add(graph.root(), Node::group("a")).unwrap();
        let a1 = graph.add(a, Node::group("a1")).unwrap();
        let b = graph.add(graph.root(), Node::group("b")).unwrap();
        assert_eq!(graph.traverse(), vec![graph.root(), a, a1, b]);
    }

    #[test]
    fn world_matrix_composes_ancestors() {
        let mut graph = SceneGraph::new();
        let group = graph
            .add(
                graph.root(),
                Node::group("g").with_transform(Transform::from_position(Vec3::new(1.0, 0.0, 0.0))),
            )
            .unwrap();
        let child = graph
            .add(
                group,
                Node::group("c").with_transform(Transform::from_position(Vec3::new(0.0, 2.0, 0.0))),
            )
            .unwrap();
        assert_eq!(graph.world_position(child), Vec3::new(1.0, 2.0, 0.0));
    }

    #[test]
    fn hidden_ancestor_hides_subtree() {
        let mut graph = SceneGraph::new();
        let group = graph.add(graph.root(), Node::group("g")).unwrap();
        let child = graph.add(group, Node::group("c")).unwrap();
        assert!(graph.is_effectively_visible(child));
        graph.get_mut(group).unwrap().visible = false;
        assert!(!graph.is_effectively_visible(child));
    }

    #[test]
    fn light_intensity_is_never_negative() {
        let mut params = LightParams::new(Color::WHITE, -1.0);
        assert_eq!(params.intensity(), 0.0);
        params.set_intensity(2.5);
        assert_eq!(params.intensity(), 2.5);
        params.set_intensity(-3.0);
        assert_eq!(params.intensity(), 0.0);
    }

    #[test]
    fn directional_light_direction() {
        let light = DirectionalLight {
            params: LightParams::new(Color::WHITE, 1.0),
            target: Vec3::ZERO,
            cast_shadow: false,
        };
        assert_eq!(light.direction_from(Vec3::new(0.0, 5.0, 0.0)), Vec3::NEG_Y);
        assert_eq!(light.direction_from(Vec3::ZERO), Vec3::NEG_Y);
    }
}
