//! Loading store assets from disk and searching them end to end

use std::fs;
use std::path::PathBuf;
use storemap_core::{CategoryTable, HighlightPolicy, LoadStatus, StoreMap};
use storemap_io::{read_scene, AssetLoader};

fn temp_asset(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("storemap_io_{}_{}", std::process::id(), name));
    fs::write(&path, contents).unwrap();
    path
}

/// Two section meshes sharing one zero-area triangle
fn store_gltf() -> String {
    let data = "A".repeat(48);
    format!(
        r#"{{
  "asset": {{ "version": "2.0" }},
  "scene": 0,
  "scenes": [{{ "nodes": [0, 3] }}],
  "nodes": [
    {{ "name": "Aisles", "children": [1, 2] }},
    {{ "name": "Cube.001", "mesh": 0 }},
    {{ "name": "Cube.002", "mesh": 0, "translation": [4.0, 0.0, 0.0] }},
    {{ "name": "Main Camera", "camera": 0 }}
  ],
  "cameras": [{{ "type": "perspective", "perspective": {{ "yfov": 1.0, "znear": 0.1 }} }}],
  "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }} }}] }}],
  "accessors": [{{
    "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
    "min": [0.0, 0.0, 0.0], "max": [0.0, 0.0, 0.0]
  }}],
  "bufferViews": [{{ "buffer": 0, "byteLength": 36 }}],
  "buffers": [{{ "byteLength": 36, "uri": "data:application/octet-stream;base64,{data}" }}]
}}"#
    )
}

const STORE_OBJ: &str = "\
o Cube.001
v 0 0 0
v 1 0 0
v 1 1 0
f 1 2 3
o Cube.002
v 2 0 0
v 3 0 0
v 3 1 0
f 4 5 6
o Floor
v 0 0 0
v 9 0 0
v 9 0 9
v 0 0 9
f 7 8 9 10
";

fn search_loaded(path: &PathBuf) -> StoreMap {
    let mut map = StoreMap::new(CategoryTable::default(), HighlightPolicy::default());
    map.complete_load(AssetLoader::spawn(path).wait());
    map
}

#[test]
fn test_gltf_file_sections_are_indexed() {
    let path = temp_asset("store.gltf", &store_gltf());
    let scene = read_scene(&path).unwrap();
    let _ = fs::remove_file(&path);

    assert!(scene.find_by_name("Cube001").is_some());
    assert!(scene.find_by_name("Cube002").is_some());
    assert!(scene.find_by_name("Main_Camera").is_some());
    assert_eq!(scene.mesh_nodes().len(), 2);
}

#[test]
fn test_gltf_search_highlights_beauty() {
    let path = temp_asset("search.gltf", &store_gltf());
    let mut map = search_loaded(&path);
    let _ = fs::remove_file(&path);

    assert_eq!(map.load_status(), &LoadStatus::Loaded { sections: 2 });
    let resolution = map.resolve("", "beauty");
    let beauty = map.index().get("Cube002").unwrap();
    assert_eq!(resolution.highlighted_node(), Some(beauty));

    let scene = map.scene().unwrap();
    assert_eq!(scene.node(beauty).unwrap().tint(), Some(map.policy().highlight_tint));
    let games = map.index().get("Cube001").unwrap();
    assert_eq!(scene.node(games).unwrap().tint(), Some(map.policy().default_tint));
}

#[test]
fn test_obj_file_sections_are_indexed() {
    let path = temp_asset("store.obj", STORE_OBJ);
    let mut map = search_loaded(&path);
    let _ = fs::remove_file(&path);

    assert_eq!(map.load_status(), &LoadStatus::Loaded { sections: 2 });
    assert!(!map.index().contains("Floor"));
    assert!(map.resolve("games", "").highlighted_node().is_some());
}

#[test]
fn test_missing_asset_fails_the_load() {
    let path = std::env::temp_dir().join("storemap_io_definitely_missing.glb");
    let map = search_loaded(&path);
    assert!(matches!(map.load_status(), LoadStatus::Failed(_)));
    assert!(map.index().is_empty());
}
