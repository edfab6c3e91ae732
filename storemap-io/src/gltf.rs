//! glTF 2.0 / GLB scene support

use crate::{sanitize_node_name, IoError, SceneReader};
use ::gltf::buffer::Data as BufferData;
use ::gltf::mesh::Mode;
use ::gltf::{Document, Node};
use std::path::Path;
use storemap_core::{
    Material, MeshData, NodeId, NodeKind, Point3f, Result, SceneGraph, SceneNode, Tint,
    Transform3D, TriangleMesh, Vector3f,
};

pub struct GltfReader;

impl SceneReader for GltfReader {
    fn read_scene(&self, path: &Path) -> Result<SceneGraph> {
        let (document, buffers, _images) = ::gltf::import(path).map_err(IoError::from)?;
        build_scene(&document, &buffers)
    }

    fn can_read(&self, path: &Path) -> bool {
        matches!(
            path.extension().and_then(|s| s.to_str()).map(|s| s.to_ascii_lowercase()).as_deref(),
            Some("gltf") | Some("glb")
        )
    }

    fn format_name(&self) -> &'static str {
        "glTF"
    }
}

/// Read a glTF JSON document or GLB container from memory.
///
/// Buffers must be embedded (GLB binary chunk or data URIs).
pub fn read_scene_from_slice(bytes: &[u8]) -> Result<SceneGraph> {
    let (document, buffers, _images) = ::gltf::import_slice(bytes).map_err(IoError::from)?;
    build_scene(&document, &buffers)
}

fn build_scene(document: &Document, buffers: &[BufferData]) -> Result<SceneGraph> {
    let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        log::warn!("glTF document has no scenes");
        return Ok(SceneGraph::new("Scene"));
    };

    let root_name = scene
        .name()
        .map(sanitize_node_name)
        .unwrap_or_else(|| "Scene".to_string());
    let mut graph = SceneGraph::new(root_name);
    let root = graph.root();
    for node in scene.nodes() {
        add_node(&mut graph, root, &node, buffers)?;
    }

    log::debug!(
        "glTF scene '{}' has {} nodes",
        graph.node(root).map(|n| n.name.as_str()).unwrap_or_default(),
        graph.len()
    );
    Ok(graph)
}

fn add_node(graph: &mut SceneGraph, parent: NodeId, node: &Node, buffers: &[BufferData]) -> Result<()> {
    let name = node
        .name()
        .or_else(|| node.mesh().and_then(|mesh| mesh.name()))
        .map(sanitize_node_name)
        .unwrap_or_else(|| format!("node_{}", node.index()));

    let kind = if let Some(mesh) = node.mesh() {
        NodeKind::Mesh(read_mesh(&mesh, buffers)?)
    } else if node.camera().is_some() {
        NodeKind::Camera
    } else if node.light().is_some() {
        NodeKind::Light
    } else {
        NodeKind::Group
    };

    let transform = Transform3D::from(node.transform().matrix());
    let id = graph.add_child(parent, SceneNode::new(name, kind).with_transform(transform));

    for child in node.children() {
        add_node(graph, id, &child, buffers)?;
    }
    Ok(())
}

fn read_mesh(mesh: &::gltf::Mesh, buffers: &[BufferData]) -> Result<MeshData> {
    let mut primitives = Vec::new();
    let mut material = Material::default();

    for (i, primitive) in mesh.primitives().enumerate() {
        if primitive.mode() != Mode::Triangles {
            log::debug!("Skipping non-triangle primitive {} ({:?})", primitive.index(), primitive.mode());
            continue;
        }

        let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
        let vertices: Vec<Point3f> = match reader.read_positions() {
            Some(positions) => positions.map(|[x, y, z]| Point3f::new(x, y, z)).collect(),
            None => {
                log::warn!("Primitive {} has no positions", primitive.index());
                continue;
            }
        };

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            None => (0..vertices.len() as u32).collect(),
        };

        let mut faces = Vec::with_capacity(indices.len() / 3);
        for tri in indices.chunks_exact(3) {
            let face = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if face.iter().any(|&v| v >= vertices.len()) {
                return Err(IoError::ParseError {
                    message: format!("index out of range in primitive {}", primitive.index()),
                }
                .into());
            }
            faces.push(face);
        }

        let mut triangles = TriangleMesh::from_vertices_and_faces(vertices, faces);
        if let Some(normals) = reader.read_normals() {
            let normals: Vec<Vector3f> = normals.map(|[x, y, z]| Vector3f::new(x, y, z)).collect();
            if normals.len() == triangles.vertex_count() {
                triangles.set_normals(normals);
            }
        }
        triangles.ensure_normals();

        if i == 0 {
            let [r, g, b, _] = primitive.material().pbr_metallic_roughness().base_color_factor();
            material.base_color = Tint::from_linear(r, g, b);
        }
        primitives.push(triangles);
    }

    Ok(MeshData::new(primitives, material))
}
