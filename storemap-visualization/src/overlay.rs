//! egui overlay drawn on top of the scene in the same frame

use storemap_gpu::{Frame, SceneRenderer};
use winit::event::WindowEvent;
use winit::window::Window;

/// Tessellated UI waiting to be painted
pub struct PreparedUi {
    primitives: Vec<egui::ClippedPrimitive>,
    pixels_per_point: f32,
}

pub struct Overlay {
    context: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
    pending_textures: egui::TexturesDelta,
}

impl Overlay {
    pub fn new(window: &Window, scene: &SceneRenderer) -> Self {
        let context = egui::Context::default();
        let state = egui_winit::State::new(
            context.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
        );
        let renderer = egui_wgpu::Renderer::new(&scene.gpu().device, scene.surface_format(), None, 1);

        Self {
            context,
            state,
            renderer,
            pending_textures: egui::TexturesDelta::default(),
        }
    }

    /// Feed a window event to egui
    pub fn on_window_event(&mut self, window: &Window, event: &WindowEvent) -> egui_winit::EventResponse {
        self.state.on_window_event(window, event)
    }

    pub fn wants_pointer(&self) -> bool {
        self.context.wants_pointer_input()
    }

    /// Run one UI pass. Texture updates are kept until the next paint.
    pub fn run(&mut self, window: &Window, build_ui: impl FnMut(&egui::Context)) -> PreparedUi {
        let raw_input = self.state.take_egui_input(window);
        let output = self.context.run(raw_input, build_ui);

        self.state.handle_platform_output(window, output.platform_output);
        self.pending_textures.append(output.textures_delta);

        let primitives = self.context.tessellate(output.shapes, output.pixels_per_point);
        PreparedUi {
            primitives,
            pixels_per_point: output.pixels_per_point,
        }
    }

    /// Paint prepared UI over whatever the frame already holds
    pub fn paint(&mut self, scene: &SceneRenderer, frame: &mut Frame, ui: PreparedUi) {
        let gpu = scene.gpu();
        let (width, height) = scene.size();
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: ui.pixels_per_point,
        };

        let textures = std::mem::take(&mut self.pending_textures);
        for (id, delta) in &textures.set {
            self.renderer.update_texture(&gpu.device, &gpu.queue, *id, delta);
        }
        let callback_commands = self.renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut frame.encoder,
            &ui.primitives,
            &screen,
        );

        {
            let mut render_pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Overlay Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer.render(&mut render_pass, &ui.primitives, &screen);
        }

        for id in &textures.free {
            self.renderer.free_texture(id);
        }
        if !callback_commands.is_empty() {
            gpu.queue.submit(callback_commands);
        }
    }
}
