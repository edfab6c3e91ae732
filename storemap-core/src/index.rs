//! Name index over the store-section meshes of a loaded scene

use crate::scene::{NodeId, SceneGraph};
use std::collections::HashMap;

/// Name prefix store sections are authored with
pub const DEFAULT_SECTION_PREFIX: &str = "Cube";

/// Mapping from section mesh name to its node, built once after a load.
///
/// Only mesh nodes whose name starts with the section prefix are
/// included. When two meshes share a name the one visited last in
/// traversal order wins.
#[derive(Debug, Clone, Default)]
pub struct NodeIndex {
    entries: HashMap<String, NodeId>,
}

impl NodeIndex {
    /// Index every mesh whose name starts with [`DEFAULT_SECTION_PREFIX`]
    pub fn build(scene: &SceneGraph) -> Self {
        Self::build_with_prefix(scene, DEFAULT_SECTION_PREFIX)
    }

    /// Index every mesh whose name starts with `prefix`
    pub fn build_with_prefix(scene: &SceneGraph, prefix: &str) -> Self {
        let mut entries = HashMap::new();
        scene.traverse(|id, node| {
            if !node.is_mesh() {
                return;
            }
            log::debug!("Mesh name: {}", node.name);
            if node.name.starts_with(prefix) {
                if let Some(previous) = entries.insert(node.name.clone(), id) {
                    log::debug!(
                        "Duplicate section name {}: {:?} replaced by {:?}",
                        node.name,
                        previous,
                        id
                    );
                }
            }
        });
        Self { entries }
    }

    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.entries.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|(name, id)| (name.as_str(), *id))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }

    /// Every indexed node, in no particular order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.values().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::TriangleMesh;
    use crate::scene::{Material, MeshData, NodeKind, SceneNode};

    fn mesh(name: &str) -> SceneNode {
        SceneNode::mesh(name, MeshData::single(TriangleMesh::new(), Material::default()))
    }

    #[test]
    fn test_only_prefixed_meshes_are_indexed() {
        let mut scene = SceneGraph::new("Scene");
        let root = scene.root();
        let cube = scene.add_child(root, mesh("Cube001"));
        scene.add_child(root, mesh("Plane"));
        scene.add_child(root, SceneNode::group("CubeGroup"));
        scene.add_child(root, SceneNode::new("CubeLight", NodeKind::Light));
        scene.add_child(root, SceneNode::new("CubeCam", NodeKind::Camera));

        let index = NodeIndex::build(&scene);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("Cube001"), Some(cube));
        assert!(!index.contains("CubeGroup"));
        assert!(!index.contains("Plane"));
    }

    #[test]
    fn test_prefix_is_case_sensitive() {
        let mut scene = SceneGraph::new("Scene");
        let root = scene.root();
        scene.add_child(root, mesh("cube001"));
        assert!(NodeIndex::build(&scene).is_empty());
    }

    #[test]
    fn test_nested_meshes_are_found() {
        let mut scene = SceneGraph::new("Scene");
        let root = scene.root();
        let aisle = scene.add_child(root, SceneNode::group("Aisle"));
        let nested = scene.add_child(aisle, mesh("Cube004"));
        assert_eq!(NodeIndex::build(&scene).get("Cube004"), Some(nested));
    }

    #[test]
    fn test_duplicate_names_last_write_wins() {
        let mut scene = SceneGraph::new("Scene");
        let root = scene.root();
        let group = scene.add_child(root, SceneNode::group("Group"));
        let _first = scene.add_child(group, mesh("Cube001"));
        let second = scene.add_child(root, mesh("Cube001"));
        let index = NodeIndex::build(&scene);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get("Cube001"), Some(second));
    }

    #[test]
    fn test_empty_scene_gives_empty_index() {
        assert!(NodeIndex::build(&SceneGraph::new("Scene")).is_empty());
        assert!(NodeIndex::default().is_empty());
    }

    #[test]
    fn test_custom_prefix() {
        let mut scene = SceneGraph::new("Scene");
        let root = scene.root();
        scene.add_child(root, mesh("Cube001"));
        let shelf = scene.add_child(root, mesh("Shelf_A"));
        let index = NodeIndex::build_with_prefix(&scene, "Shelf");
        assert_eq!(index.iter().collect::<Vec<_>>(), vec![("Shelf_A", shelf)]);
    }

    #[test]
    fn test_building_does_not_touch_tints() {
        use crate::{color::Tint, traits::Tintable};
        let mut scene = SceneGraph::new("Scene");
        let root = scene.root();
        let cube = scene.add_child(root, mesh("Cube001"));
        let _ = NodeIndex::build(&scene);
        assert_eq!(scene.tint(cube), Some(Tint::WHITE));
    }
}
