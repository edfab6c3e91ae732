//! Interactive store map viewer
//!
//! This crate opens a window showing the store model, lets the user orbit,
//! pan and zoom around it with the mouse, and overlays a search panel that
//! highlights the section for a product or department:
//! - Orbit camera controls with damping
//! - Background asset loading with status in the panel
//! - egui search panel drawn in the same frame as the scene

pub mod camera;
pub mod input;
pub mod overlay;
pub mod search_panel;
pub mod viewer;

pub use camera::*;
pub use input::*;
pub use search_panel::*;
pub use viewer::*;

use storemap_core::{Result, StoreMapConfig};

/// Open the store map viewer and block until its window is closed
pub fn show_store_map(config: StoreMapConfig) -> Result<()> {
    StoreMapViewer::new(config)?.run()
}
