//! Store map configuration loaded from TOML
//!
//! Every section falls back to its defaults, so a file only needs the
//! values it changes. The defaults reproduce the stock store layout.

use crate::category::{default_category_entries, CategoryEntry, CategoryTable};
use crate::color::Tint;
use crate::error::{Error, Result};
use crate::highlight::HighlightPolicy;
use crate::index::DEFAULT_SECTION_PREFIX;
use crate::transform::Transform3D;
use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Scene asset to load
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub path: PathBuf,
    /// Mesh name prefix marking store sections
    pub section_prefix: String,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("storemap.glb"),
            section_prefix: DEFAULT_SECTION_PREFIX.to_string(),
        }
    }
}

/// Placement of the loaded model in the world
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub scale: [f32; 3],
    pub position: [f32; 3],
}

impl ModelConfig {
    pub fn transform(&self) -> Transform3D {
        Transform3D::from_trs(
            Vector3::from(self.position),
            UnitQuaternion::identity(),
            Vector3::from(self.scale),
        )
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            scale: [4.0, 4.0, 4.0],
            position: [0.0, 15.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: [30.0, 30.0, 30.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 1.0,
            max_distance: 500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AmbientLightConfig {
    pub color: Tint,
    pub intensity: f32,
}

impl Default for AmbientLightConfig {
    fn default() -> Self {
        Self {
            color: Tint::from_hex(0x404040),
            intensity: 2.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLightConfig {
    pub color: Tint,
    pub intensity: f32,
    /// Light shines from this position towards the origin
    pub position: [f32; 3],
}

impl Default for DirectionalLightConfig {
    fn default() -> Self {
        Self {
            color: Tint::from_hex(0xffffff),
            intensity: 1.0,
            position: [10.0, 10.0, 10.0],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub ambient: AmbientLightConfig,
    pub directional: DirectionalLightConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub background: Tint,
    pub enable_multisampling: bool,
    pub enable_backface_culling: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            background: Tint::from_hex(0xffffff),
            enable_multisampling: true,
            enable_backface_culling: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Store Map".to_string(),
            width: 1200,
            height: 800,
        }
    }
}

/// Complete viewer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreMapConfig {
    pub asset: AssetConfig,
    pub model: ModelConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub lighting: LightingConfig,
    pub render: RenderSettings,
    pub highlight: HighlightPolicy,
    pub window: WindowConfig,
    pub categories: Vec<CategoryEntry>,
}

impl Default for StoreMapConfig {
    fn default() -> Self {
        Self {
            asset: AssetConfig::default(),
            model: ModelConfig::default(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            lighting: LightingConfig::default(),
            render: RenderSettings::default(),
            highlight: HighlightPolicy::default(),
            window: WindowConfig::default(),
            categories: default_category_entries(),
        }
    }
}

impl StoreMapConfig {
    /// Read and validate a TOML configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that serde cannot
    pub fn validate(&self) -> Result<()> {
        self.category_table()?;
        if !(0.0..=1.0).contains(&self.controls.damping_factor) {
            return Err(Error::Config(format!(
                "controls.damping_factor must be within 0..=1, got {}",
                self.controls.damping_factor
            )));
        }
        if self.camera.near <= 0.0 || self.camera.far <= self.camera.near {
            return Err(Error::Config(format!(
                "camera clip planes must satisfy 0 < near < far, got {}..{}",
                self.camera.near, self.camera.far
            )));
        }
        if self.controls.min_distance > self.controls.max_distance {
            return Err(Error::Config(
                "controls.min_distance exceeds controls.max_distance".to_string(),
            ));
        }
        Ok(())
    }

    /// The category table described by this configuration
    pub fn category_table(&self) -> Result<CategoryTable> {
        CategoryTable::from_entries(self.categories.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_reproduce_stock_layout() {
        let config = StoreMapConfig::default();
        assert_eq!(config.asset.path, PathBuf::from("storemap.glb"));
        assert_eq!(config.asset.section_prefix, "Cube");
        assert_eq!(config.model.scale, [4.0, 4.0, 4.0]);
        assert_eq!(config.camera.position, [30.0, 30.0, 30.0]);
        assert_eq!(config.highlight.default_tint.to_hex(), 0x999999);
        assert_eq!(config.highlight.highlight_tint.to_hex(), 0x4dff4d);
        assert_eq!(config.category_table().unwrap(), CategoryTable::default());
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(StoreMapConfig::from_toml_str("").unwrap(), StoreMapConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = StoreMapConfig::from_toml_str(
            r#"
            [asset]
            path = "maps/downtown.glb"

            [highlight]
            highlight_tint = 0xff0000

            [controls]
            enable_damping = false
            "#,
        )
        .unwrap();
        assert_eq!(config.asset.path, PathBuf::from("maps/downtown.glb"));
        assert_eq!(config.asset.section_prefix, "Cube");
        assert_eq!(config.highlight.highlight_tint.to_hex(), 0xff0000);
        assert_eq!(config.highlight.default_tint.to_hex(), 0x999999);
        assert!(!config.controls.enable_damping);
        assert_eq!(config.controls.damping_factor, 0.05);
    }

    #[test]
    fn test_categories_replace_default_table() {
        let config = StoreMapConfig::from_toml_str(
            r#"
            [[categories]]
            category = "Bakery"
            node = "Cube020"

            [[categories]]
            category = "deli"
            node = "Cube021"
            "#,
        )
        .unwrap();
        let table = config.category_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("bakery"), Some("Cube020"));
        assert_eq!(table.lookup("games"), None);
    }

    #[test]
    fn test_duplicate_categories_fail_validation() {
        let result = StoreMapConfig::from_toml_str(
            r#"
            [[categories]]
            category = "deli"
            node = "Cube020"

            [[categories]]
            category = "Deli "
            node = "Cube021"
            "#,
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_invalid_toml_is_a_config_error() {
        let result = StoreMapConfig::from_toml_str("[asset\npath = 3");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_bad_damping_factor_rejected() {
        let result = StoreMapConfig::from_toml_str("[controls]\ndamping_factor = 1.5");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_reads_file() {
        let path = std::env::temp_dir().join("storemap_config_test.toml");
        std::fs::write(&path, "[window]\ntitle = \"Downtown\"\n").unwrap();
        let config = StoreMapConfig::load(&path).unwrap();
        assert_eq!(config.window.title, "Downtown");
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let result = StoreMapConfig::load("/nonexistent/storemap.toml");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
