//! Core data structures for storemap
//!
//! This crate provides the scene graph produced by the asset readers, the
//! index of store-section meshes built once a scene has loaded, the fixed
//! category vocabulary, and the search that highlights one section:
//!
//! ```rust
//! use storemap_core::*;
//!
//! let mut scene = SceneGraph::new("Scene");
//! let root = scene.root();
//! scene.add_child(root, SceneNode::mesh("Cube002", MeshData::single(TriangleMesh::new(), Material::default())));
//!
//! let mut map = StoreMap::new(CategoryTable::default(), HighlightPolicy::default());
//! map.complete_load(Ok(scene));
//! map.inputs_mut().selection = "beauty".to_string();
//! map.search_product();
//! ```

pub mod point;
pub mod mesh;
pub mod transform;
pub mod color;
pub mod scene;
pub mod traits;
pub mod index;
pub mod category;
pub mod query;
pub mod highlight;
pub mod store_map;
pub mod config;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use transform::*;
pub use color::*;
pub use scene::*;
pub use traits::*;
pub use index::*;
pub use category::*;
pub use query::*;
pub use highlight::*;
pub use store_map::*;
pub use config::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, UnitQuaternion, Vector3};

/// Common result type for storemap operations
pub type Result<T> = std::result::Result<T, Error>;
