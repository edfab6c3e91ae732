//! Interactive store map viewer
//!
//! One thread owns the window, the renderer, the egui overlay and the
//! session. The asset load is the only work done elsewhere.

use std::sync::Arc;
use winit::{
    dpi::LogicalSize,
    event::{ElementState, Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::Key,
    window::WindowBuilder,
};

use crate::camera::{Camera, OrbitControls};
use crate::input::{scroll_steps, DragAction, PointerState};
use crate::overlay::Overlay;
use crate::search_panel::SearchPanel;
use storemap_core::{Error, Result, StoreMap, StoreMapConfig};
use storemap_gpu::{SceneRenderConfig, SceneRenderer};
use storemap_io::AssetLoader;

/// Window showing the store model with orbit controls and the search panel
pub struct StoreMapViewer {
    config: StoreMapConfig,
}

impl StoreMapViewer {
    pub fn new(config: StoreMapConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StoreMapConfig {
        &self.config
    }

    /// Open the window and run until it is closed
    pub fn run(self) -> Result<()> {
        let config = self.config;
        let mut map = StoreMap::from_config(&config)?;
        let mut loader = AssetLoader::spawn(&config.asset.path);
        log::info!("Loading store model from {}", config.asset.path.display());

        let event_loop = EventLoop::new()
            .map_err(|e| Error::Visualization(format!("Failed to create event loop: {}", e)))?;
        let window = Arc::new(
            WindowBuilder::new()
                .with_title(config.window.title.as_str())
                .with_inner_size(LogicalSize::new(config.window.width as f64, config.window.height as f64))
                .build(&event_loop)
                .map_err(|e| Error::Visualization(format!("Failed to create window: {}", e)))?,
        );

        let mut renderer = pollster::block_on(SceneRenderer::new(
            window.clone(),
            SceneRenderConfig::from(&config),
        ))?;
        let mut overlay = Overlay::new(&window, &renderer);

        let mut camera = Camera::from_config(&config.camera, renderer.aspect_ratio());
        let mut controls = OrbitControls::new(&camera, &config.controls);
        let mut pointer = PointerState::default();
        let mut panel = SearchPanel::new();

        event_loop
            .run(move |event, target| {
                target.set_control_flow(ControlFlow::Poll);

                match event {
                    Event::WindowEvent { event, window_id } if window_id == window.id() => {
                        let response = overlay.on_window_event(&window, &event);

                        match event {
                            WindowEvent::CloseRequested => target.exit(),
                            WindowEvent::Resized(size) => {
                                renderer.resize(size.width, size.height);
                                camera.set_aspect(size.width, size.height);
                            }
                            WindowEvent::MouseInput { state, button, .. } => {
                                if !response.consumed || state == ElementState::Released {
                                    pointer.on_button(button, state);
                                }
                            }
                            WindowEvent::CursorMoved { position, .. } => {
                                let action = pointer.on_cursor_moved(position);
                                if overlay.wants_pointer() {
                                    return;
                                }
                                let height = renderer.size().1 as f32;
                                match action {
                                    Some(DragAction::Rotate { dx, dy }) => controls.rotate(dx, dy, height),
                                    Some(DragAction::Pan { dx, dy }) => controls.pan(&camera, dx, dy, height),
                                    None => {}
                                }
                            }
                            WindowEvent::CursorLeft { .. } => pointer.on_cursor_left(),
                            WindowEvent::MouseWheel { delta, .. } => {
                                if !response.consumed {
                                    controls.zoom(scroll_steps(delta));
                                }
                            }
                            WindowEvent::KeyboardInput { event, .. } => {
                                if response.consumed || event.state != ElementState::Pressed {
                                    return;
                                }
                                if let Key::Character(c) = &event.logical_key {
                                    if c.eq_ignore_ascii_case("r") {
                                        controls.reset(&mut camera);
                                        log::info!("Camera reset");
                                    }
                                }
                            }
                            WindowEvent::RedrawRequested => {
                                if let Some(outcome) = loader.poll() {
                                    map.complete_load(outcome);
                                    if let Some(scene) = map.scene() {
                                        renderer.upload_scene(scene);
                                    }
                                }

                                let ui = overlay.run(&window, |ctx| {
                                    panel.show(ctx, &mut map);
                                });

                                controls.update(&mut camera);
                                renderer.update_camera(camera.view_projection(), camera.position);

                                match renderer.begin_frame() {
                                    Ok(Some(mut frame)) => {
                                        renderer.render_scene(&mut frame, map.scene());
                                        overlay.paint(&renderer, &mut frame, ui);
                                        renderer.present(frame);
                                    }
                                    Ok(None) => {}
                                    Err(e) => {
                                        log::error!("Render error: {}", e);
                                        target.exit();
                                    }
                                }
                            }
                            _ => {}
                        }
                    }
                    Event::AboutToWait => window.request_redraw(),
                    _ => {}
                }
            })
            .map_err(|e| Error::Visualization(format!("Event loop error: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = StoreMapConfig::default();
        config.controls.min_distance = 10.0;
        config.controls.max_distance = 1.0;
        assert!(matches!(StoreMapViewer::new(config), Err(Error::Config(_))));
    }

    #[test]
    fn test_default_config_is_accepted() {
        let viewer = StoreMapViewer::new(StoreMapConfig::default()).unwrap();
        assert_eq!(viewer.config().window.title, "Store Map");
    }
}
