//! Store map session: the loaded scene, its section index and the search inputs

use crate::category::CategoryTable;
use crate::color::Tint;
use crate::config::StoreMapConfig;
use crate::error::Result;
use crate::highlight::{resolve_and_highlight, HighlightPolicy, Resolution};
use crate::index::{NodeIndex, DEFAULT_SECTION_PREFIX};
use crate::query::SearchInputs;
use crate::scene::{NodeId, SceneGraph};
use crate::traits::Tintable;
use crate::transform::Transform3D;

/// Result of an asset load, delivered once
pub type LoadOutcome = Result<SceneGraph>;

/// Where the asset load stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Pending,
    Loaded { sections: usize },
    Failed(String),
}

/// State behind the search UI.
///
/// The index is built exactly once, when the first load outcome arrives.
/// Searching before that is allowed and simply matches nothing.
#[derive(Debug)]
pub struct StoreMap {
    scene: Option<SceneGraph>,
    index: NodeIndex,
    categories: CategoryTable,
    policy: HighlightPolicy,
    section_prefix: String,
    model_transform: Transform3D,
    inputs: SearchInputs,
    status: LoadStatus,
    last_resolution: Option<Resolution>,
}

impl StoreMap {
    pub fn new(categories: CategoryTable, policy: HighlightPolicy) -> Self {
        Self {
            scene: None,
            index: NodeIndex::default(),
            categories,
            policy,
            section_prefix: DEFAULT_SECTION_PREFIX.to_string(),
            model_transform: Transform3D::identity(),
            inputs: SearchInputs::default(),
            status: LoadStatus::Pending,
            last_resolution: None,
        }
    }

    /// Build a session from configuration
    pub fn from_config(config: &StoreMapConfig) -> Result<Self> {
        Ok(Self::new(config.category_table()?, config.highlight)
            .with_prefix(config.asset.section_prefix.clone())
            .with_model_transform(config.model.transform()))
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.section_prefix = prefix.into();
        self
    }

    /// Transform applied to the scene root when the load completes
    pub fn with_model_transform(mut self, transform: Transform3D) -> Self {
        self.model_transform = transform;
        self
    }

    /// Consume the load outcome. Only the first call has any effect.
    pub fn complete_load(&mut self, outcome: LoadOutcome) {
        if self.status != LoadStatus::Pending {
            log::warn!("Ignoring load completion, status is already {:?}", self.status);
            return;
        }

        match outcome {
            Ok(mut scene) => {
                scene.set_root_transform(self.model_transform);
                let index = NodeIndex::build_with_prefix(&scene, &self.section_prefix);
                log::info!(
                    "Scene loaded: {} nodes, {} store sections indexed",
                    scene.len(),
                    index.len()
                );
                self.status = LoadStatus::Loaded {
                    sections: index.len(),
                };
                self.index = index;
                self.scene = Some(scene);
            }
            Err(e) => {
                log::error!("An error occurred loading the model: {}", e);
                self.status = LoadStatus::Failed(e.to_string());
            }
        }
    }

    /// Search using the current input values. Mutates section tints only.
    pub fn search_product(&mut self) {
        let inputs = self.inputs.clone();
        self.resolve(&inputs.text, &inputs.selection);
    }

    /// Search with explicit inputs and report the outcome
    pub fn resolve(&mut self, text: &str, selection: &str) -> Resolution {
        let resolution = match self.scene.as_mut() {
            Some(scene) => resolve_and_highlight(
                text,
                selection,
                &self.index,
                &self.categories,
                &self.policy,
                scene,
            ),
            None => resolve_and_highlight(
                text,
                selection,
                &self.index,
                &self.categories,
                &self.policy,
                &mut Unloaded,
            ),
        };
        self.last_resolution = Some(resolution.clone());
        resolution
    }

    pub fn inputs(&self) -> &SearchInputs {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut SearchInputs {
        &mut self.inputs
    }

    pub fn scene(&self) -> Option<&SceneGraph> {
        self.scene.as_ref()
    }

    pub fn index(&self) -> &NodeIndex {
        &self.index
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    pub fn policy(&self) -> &HighlightPolicy {
        &self.policy
    }

    pub fn load_status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn last_resolution(&self) -> Option<&Resolution> {
        self.last_resolution.as_ref()
    }
}

/// Tint target standing in for a scene that has not arrived yet
struct Unloaded;

impl Tintable for Unloaded {
    fn set_tint(&mut self, _id: NodeId, _tint: Tint) -> bool {
        false
    }

    fn tint(&self, _id: NodeId) -> Option<Tint> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mesh::TriangleMesh;
    use crate::scene::{Material, MeshData, SceneNode};

    fn scene_with(names: &[&str]) -> SceneGraph {
        let mut scene = SceneGraph::new("Scene");
        let root = scene.root();
        for name in names {
            scene.add_child(
                root,
                SceneNode::mesh(*name, MeshData::single(TriangleMesh::new(), Material::default())),
            );
        }
        scene
    }

    fn session() -> StoreMap {
        StoreMap::new(CategoryTable::default(), HighlightPolicy::default())
    }

    #[test]
    fn test_search_before_load_is_no_match() {
        let mut map = session();
        map.inputs_mut().text = "games".to_string();
        map.search_product();
        assert!(matches!(map.last_resolution(), Some(Resolution::NoMatch { .. })));
        assert_eq!(map.load_status(), &LoadStatus::Pending);
    }

    #[test]
    fn test_search_product_reads_current_inputs() {
        let mut map = session();
        map.complete_load(Ok(scene_with(&["Cube001", "Cube002"])));
        *map.inputs_mut() = SearchInputs::new("", "Beauty");
        map.search_product();

        let scene = map.scene().unwrap();
        let beauty = map.index().get("Cube002").unwrap();
        let games = map.index().get("Cube001").unwrap();
        assert_eq!(scene.tint(beauty), Some(map.policy().highlight_tint));
        assert_eq!(scene.tint(games), Some(map.policy().default_tint));
    }

    #[test]
    fn test_failed_load_leaves_index_empty() {
        let mut map = session();
        map.complete_load(Err(Error::Asset("storemap.glb: not found".to_string())));
        assert!(matches!(map.load_status(), LoadStatus::Failed(msg) if msg.contains("not found")));
        assert!(map.index().is_empty());
        assert_eq!(map.resolve("games", "").highlighted_node(), None);
    }

    #[test]
    fn test_second_completion_is_ignored() {
        let mut map = session();
        map.complete_load(Ok(scene_with(&["Cube001"])));
        map.complete_load(Ok(scene_with(&["Cube001", "Cube002", "Cube003"])));
        assert_eq!(map.index().len(), 1);
        assert_eq!(map.load_status(), &LoadStatus::Loaded { sections: 1 });
    }

    #[test]
    fn test_model_transform_is_applied_to_root() {
        let config = StoreMapConfig::default();
        let mut map = StoreMap::from_config(&config).unwrap();
        map.complete_load(Ok(scene_with(&["Cube001"])));
        let scene = map.scene().unwrap();
        let root = scene.node(scene.root()).unwrap();
        assert_eq!(root.transform, config.model.transform());
    }

    #[test]
    fn test_custom_prefix_from_session() {
        let mut map = session().with_prefix("Shelf");
        map.complete_load(Ok(scene_with(&["Cube001", "Shelf001"])));
        assert!(map.index().contains("Shelf001"));
        assert!(!map.index().contains("Cube001"));
    }
}
