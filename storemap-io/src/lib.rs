//! Scene asset loading for storemap
//!
//! Readers turn a glTF/GLB or OBJ file into a [`SceneGraph`] whose node
//! names are sanitized the same way for every format, so a section exported
//! as `Cube.001` is found under `Cube001`. [`AssetLoader`] runs a read on a
//! background thread and hands the outcome back exactly once.

pub mod error;
pub mod gltf;
pub mod obj;
pub mod loader;

pub use error::*;
pub use loader::{AssetLoader, LoadHandle};

use std::path::Path;
use storemap_core::{Result, SceneGraph};

/// Trait for reading a scene graph from a file
pub trait SceneReader {
    fn read_scene(&self, path: &Path) -> Result<SceneGraph>;

    /// Whether this reader handles the extension of `path`
    fn can_read(&self, path: &Path) -> bool;

    fn format_name(&self) -> &'static str;
}

/// Supported scene formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneFormat {
    Gltf,
    Obj,
}

impl SceneFormat {
    /// Detect the format from a file extension, ignoring case
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "gltf" | "glb" => Some(SceneFormat::Gltf),
            "obj" => Some(SceneFormat::Obj),
            _ => None,
        }
    }

    fn reader(self) -> Box<dyn SceneReader> {
        match self {
            SceneFormat::Gltf => Box::new(crate::gltf::GltfReader),
            SceneFormat::Obj => Box::new(crate::obj::ObjReader),
        }
    }
}

/// Auto-detect format and read a scene
pub fn read_scene<P: AsRef<Path>>(path: P) -> Result<SceneGraph> {
    let path = path.as_ref();
    let format = SceneFormat::from_path(path).ok_or_else(|| {
        storemap_core::Error::UnsupportedFormat(format!(
            "Unsupported scene format: {:?}",
            path.extension()
        ))
    })?;

    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.display().to_string(),
        }
        .into());
    }

    let reader = format.reader();
    log::info!("Loading {} scene from {}", reader.format_name(), path.display());
    reader.read_scene(path)
}

/// Read a scene held in memory
pub fn read_scene_from_slice(bytes: &[u8], format: SceneFormat) -> Result<SceneGraph> {
    match format {
        SceneFormat::Gltf => crate::gltf::read_scene_from_slice(bytes),
        SceneFormat::Obj => crate::obj::read_scene_from_slice(bytes),
    }
}

/// Make an exported node name usable as a lookup key.
///
/// Whitespace becomes `_`; the characters `[ ] . : /` are dropped.
pub fn sanitize_node_name(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '[' | ']' | '.' | ':' | '/'))
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}
