//! # storemap GPU
//!
//! wgpu rendering for store map scenes.
//!
//! [`SceneRenderer`] owns the window surface and draws every mesh node of a
//! [`storemap_core::SceneGraph`] with ambient plus directional lighting.
//! A frame is split into [`SceneRenderer::begin_frame`],
//! [`SceneRenderer::render_scene`] and [`SceneRenderer::present`] so an
//! overlay (the search panel) can record into the same encoder in between.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use storemap_gpu::{SceneRenderConfig, SceneRenderer};
//!
//! async fn example(window: Arc<winit::window::Window>, scene: &storemap_core::SceneGraph) -> storemap_core::Result<()> {
//!     let mut renderer = SceneRenderer::new(window, SceneRenderConfig::default()).await?;
//!     renderer.upload_scene(scene);
//!     if let Some(mut frame) = renderer.begin_frame()? {
//!         renderer.render_scene(&mut frame, Some(scene));
//!         renderer.present(frame);
//!     }
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod scene_renderer;

pub use device::GpuContext;
pub use scene_renderer::{
    clear_color, scene_vertices, CameraUniform, Frame, LightingUniform, NodeUniform,
    SceneRenderConfig, SceneRenderer, SceneVertex,
};
