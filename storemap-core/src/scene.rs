//! Arena-backed scene graph produced by the asset readers
//!
//! A [`SceneGraph`] always has a single root group. Nodes are addressed by
//! [`NodeId`] handles and keep their children in insertion order, so a
//! depth-first pre-order walk is deterministic for a given graph.

use crate::color::Tint;
use crate::mesh::TriangleMesh;
use crate::traits::Tintable;
use crate::transform::Transform3D;
use nalgebra::Matrix4;

/// Opaque handle to a node in a [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Surface appearance of a mesh node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub base_color: Tint,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color: Tint::WHITE,
        }
    }
}

/// Renderable geometry owned by a mesh node
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    pub primitives: Vec<TriangleMesh>,
    pub material: Material,
}

impl MeshData {
    pub fn new(primitives: Vec<TriangleMesh>, material: Material) -> Self {
        Self {
            primitives,
            material,
        }
    }

    pub fn single(mesh: TriangleMesh, material: Material) -> Self {
        Self::new(vec![mesh], material)
    }
}

/// What a node represents
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh(MeshData),
    Camera,
    Light,
}

/// A single node of the scene graph
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform3D,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: Transform3D::identity(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, mesh: MeshData) -> Self {
        Self::new(name, NodeKind::Mesh(mesh))
    }

    pub fn with_transform(mut self, transform: Transform3D) -> Self {
        self.transform = transform;
        self
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.kind, NodeKind::Mesh(_))
    }

    pub fn mesh_data(&self) -> Option<&MeshData> {
        match &self.kind {
            NodeKind::Mesh(data) => Some(data),
            _ => None,
        }
    }

    /// Current tint of a mesh node
    pub fn tint(&self) -> Option<Tint> {
        self.mesh_data().map(|data| data.material.base_color)
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Hierarchical collection of nodes representing a loaded asset
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
    root: NodeId,
}

impl SceneGraph {
    /// Create a graph containing only a root group
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![SceneNode::group(root_name)],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A graph is empty when it holds nothing but its root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Append `node` as the last child of `parent`
    ///
    /// # Panics
    ///
    /// Panics if `parent` was not issued by this graph.
    pub fn add_child(&mut self, parent: NodeId, mut node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    /// Replace the root's local transform (model placement in the world)
    pub fn set_root_transform(&mut self, transform: Transform3D) {
        self.nodes[self.root.0].transform = transform;
    }

    /// Visit every node exactly once, depth-first pre-order from the root
    pub fn traverse<F>(&self, mut visit: F)
    where
        F: FnMut(NodeId, &SceneNode),
    {
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.0];
            visit(id, node);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Node ids in traversal order
    pub fn traversal_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        self.traverse(|id, _| order.push(id));
        order
    }

    /// Mesh nodes in traversal order
    pub fn mesh_nodes(&self) -> Vec<NodeId> {
        let mut meshes = Vec::new();
        self.traverse(|id, node| {
            if node.is_mesh() {
                meshes.push(id);
            }
        });
        meshes
    }

    /// Find the first node with the given name in traversal order
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.traversal_order()
            .into_iter()
            .find(|id| self.nodes[id.0].name == name)
    }

    /// Accumulated transform from the root down to `id`, `None` for an id
    /// this graph did not issue
    pub fn world_transform(&self, id: NodeId) -> Option<Transform3D> {
        let mut matrix = Matrix4::identity();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = self.nodes.get(node_id.0)?;
            matrix = node.transform.matrix * matrix;
            current = node.parent;
        }
        Some(Transform3D::from(matrix))
    }
}

impl Tintable for SceneGraph {
    fn set_tint(&mut self, id: NodeId, tint: Tint) -> bool {
        match self.nodes.get_mut(id.0).map(|node| &mut node.kind) {
            Some(NodeKind::Mesh(data)) => {
                data.material.base_color = tint;
                true
            }
            _ => false,
        }
    }

    fn tint(&self, id: NodeId) -> Option<Tint> {
        self.node(id).and_then(SceneNode::tint)
    }
}
