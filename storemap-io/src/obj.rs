//! Wavefront OBJ scene support
//!
//! Each `o` object or `g` group with faces becomes one mesh node under the
//! root. A group keeps its own name; the unnamed default group takes the
//! object's name. Polygons are fan triangulated and vertices are re-indexed
//! per node.

use crate::{sanitize_node_name, IoError, SceneReader};
use ::obj::{Group, ObjData};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use storemap_core::{Material, MeshData, Point3f, Result, SceneGraph, SceneNode, TriangleMesh};

/// Group name the obj crate gives faces outside any `g` statement
const DEFAULT_GROUP: &str = "default";

pub struct ObjReader;

impl SceneReader for ObjReader {
    fn read_scene(&self, path: &Path) -> Result<SceneGraph> {
        let file = File::open(path)?;
        let root_name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(sanitize_node_name)
            .unwrap_or_else(|| "Scene".to_string());
        read_scene_named(BufReader::new(file), root_name)
    }

    fn can_read(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|s| s.eq_ignore_ascii_case("obj"))
            .unwrap_or(false)
    }

    fn format_name(&self) -> &'static str {
        "OBJ"
    }
}

/// Read OBJ text from memory
pub fn read_scene_from_slice(bytes: &[u8]) -> Result<SceneGraph> {
    read_scene_named(bytes, "Scene".to_string())
}

fn read_scene_named<R: Read>(input: R, root_name: String) -> Result<SceneGraph> {
    let data = ObjData::load_buf(input).map_err(|e| IoError::Obj {
        message: e.to_string(),
    })?;

    let mut graph = SceneGraph::new(root_name);
    let root = graph.root();
    for object in &data.objects {
        for group in &object.groups {
            let name = if group.name.is_empty() || group.name == DEFAULT_GROUP {
                &object.name
            } else {
                &group.name
            };
            let mesh = group_mesh(name, group, &data.position)?;
            if mesh.is_empty() {
                log::debug!("Skipping OBJ group '{}' without faces", name);
                continue;
            }
            graph.add_child(
                root,
                SceneNode::mesh(sanitize_node_name(name), MeshData::single(mesh, Material::default())),
            );
        }
    }
    Ok(graph)
}

fn group_mesh(name: &str, group: &Group, positions: &[[f32; 3]]) -> Result<TriangleMesh> {
    let mut mesh = TriangleMesh::new();
    let mut remap: HashMap<usize, usize> = HashMap::new();

    for poly in &group.polys {
        let mut corners = Vec::with_capacity(poly.0.len());
        for tuple in &poly.0 {
            let global = tuple.0;
            let local = match remap.get(&global) {
                Some(&local) => local,
                None => {
                    let [x, y, z] = *positions.get(global).ok_or_else(|| IoError::ParseError {
                        message: format!("vertex index {} out of range in '{}'", global + 1, name),
                    })?;
                    let local = mesh.add_vertex(Point3f::new(x, y, z));
                    remap.insert(global, local);
                    local
                }
            };
            corners.push(local);
        }

        for i in 1..corners.len().saturating_sub(1) {
            mesh.add_face([corners[0], corners[i], corners[i + 1]]);
        }
    }

    if mesh.face_count() > 0 {
        mesh.ensure_normals();
    }
    Ok(mesh)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_SECTIONS: &str = "\
o Cube.001
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
f 1 2 3 4
o Cube.002
v 2 0 0
v 3 0 0
v 3 1 0
f 5 6 7
";

    #[test]
    fn test_objects_become_mesh_nodes() {
        let scene = read_scene_from_slice(TWO_SECTIONS.as_bytes()).unwrap();
        assert_eq!(scene.len(), 3);

        let first = scene.find_by_name("Cube001").unwrap();
        let second = scene.find_by_name("Cube002").unwrap();
        assert_eq!(scene.node(first).unwrap().parent(), Some(scene.root()));
        assert!(scene.node(second).unwrap().is_mesh());
    }

    #[test]
    fn test_quads_are_fan_triangulated_and_reindexed() {
        let scene = read_scene_from_slice(TWO_SECTIONS.as_bytes()).unwrap();

        let quad = scene.node(scene.find_by_name("Cube001").unwrap()).unwrap();
        let quad = &quad.mesh_data().unwrap().primitives[0];
        assert_eq!(quad.vertex_count(), 4);
        assert_eq!(quad.faces, vec![[0, 1, 2], [0, 2, 3]]);

        let tri = scene.node(scene.find_by_name("Cube002").unwrap()).unwrap();
        let tri = &tri.mesh_data().unwrap().primitives[0];
        assert_eq!(tri.vertex_count(), 3);
        assert_eq!(tri.faces, vec![[0, 1, 2]]);
        assert_eq!(tri.vertices[0], Point3f::new(2.0, 0.0, 0.0));
        assert!(tri.normals.is_some());
    }

    #[test]
    fn test_default_material_is_white() {
        let scene = read_scene_from_slice(TWO_SECTIONS.as_bytes()).unwrap();
        let node = scene.node(scene.find_by_name("Cube002").unwrap()).unwrap();
        assert_eq!(node.tint(), Some(storemap_core::Tint::WHITE));
    }

    #[test]
    fn test_groups_become_separate_sections() {
        let text = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 2 0 0
v 3 0 0
v 3 1 0
f 1 2 3
g Cube.003
f 4 5 6
";
        let scene = read_scene_from_slice(text.as_bytes()).unwrap();
        assert_eq!(scene.len(), 3);

        let section = scene.find_by_name("Cube003").unwrap();
        let mesh = &scene.node(section).unwrap().mesh_data().unwrap().primitives[0];
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.vertices[0], Point3f::new(2.0, 0.0, 0.0));

        let index = storemap_core::NodeIndex::build(&scene);
        assert_eq!(index.get("Cube003"), Some(section));
    }

    #[test]
    fn test_can_read() {
        assert!(ObjReader.can_read(Path::new("store.OBJ")));
        assert!(!ObjReader.can_read(Path::new("store.glb")));
    }
}
