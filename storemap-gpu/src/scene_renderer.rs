//! Scene rendering: one lit, tinted draw per mesh node
//!
//! Geometry is uploaded once per loaded scene. Tints are re-read from the
//! scene graph every frame, so highlighting only touches the scene data.

use crate::GpuContext;
use bytemuck::{Pod, Zeroable};
use nalgebra::{Matrix4, Point3};
use std::sync::Arc;
use storemap_core::{
    LightingConfig, NodeId, Result, SceneGraph, StoreMapConfig, Tint, Tintable, Transform3D,
    TriangleMesh,
};
use winit::window::Window;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const MSAA_SAMPLES: u32 = 4;

/// Vertex layout shared by every scene mesh
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SceneVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl SceneVertex {
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SceneVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                // Position
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                // Normal
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Interleave positions and normals, computing normals when the mesh has none
pub fn scene_vertices(mesh: &TriangleMesh) -> Vec<SceneVertex> {
    let computed;
    let normals = match &mesh.normals {
        Some(normals) if normals.len() == mesh.vertices.len() => normals,
        _ => {
            computed = mesh.calculate_vertex_normals();
            &computed
        }
    };

    mesh.vertices
        .iter()
        .zip(normals.iter())
        .map(|(p, n)| SceneVertex {
            position: [p.x, p.y, p.z],
            normal: [n.x, n.y, n.z],
        })
        .collect()
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub view_pos: [f32; 4],
}

impl CameraUniform {
    pub fn new(view_proj: Matrix4<f32>, eye: Point3<f32>) -> Self {
        Self {
            view_proj: view_proj.into(),
            view_pos: [eye.x, eye.y, eye.z, 1.0],
        }
    }
}

/// Ambient plus one directional light
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LightingUniform {
    pub ambient: [f32; 4],
    /// Unit vector pointing towards the light
    pub direction: [f32; 4],
    pub color: [f32; 4],
}

impl LightingUniform {
    pub fn from_config(lighting: &LightingConfig) -> Self {
        let [ar, ag, ab] = lighting.ambient.color.scaled(lighting.ambient.intensity);
        let [dr, dg, db] = lighting.directional.color.scaled(lighting.directional.intensity);
        let [x, y, z] = lighting.directional.position;
        let direction = nalgebra::Vector3::new(x, y, z)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(nalgebra::Vector3::y);

        Self {
            ambient: [ar, ag, ab, 1.0],
            direction: [direction.x, direction.y, direction.z, 0.0],
            color: [dr, dg, db, 1.0],
        }
    }
}

/// Per-node model matrix and tint
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct NodeUniform {
    pub model: [[f32; 4]; 4],
    pub normal_matrix: [[f32; 4]; 4],
    pub tint: [f32; 4],
}

impl NodeUniform {
    pub fn new(world: &Transform3D, tint: Tint) -> Self {
        let mut normal_matrix = Matrix4::identity();
        normal_matrix
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&world.normal_matrix());
        let [r, g, b] = tint.to_array();

        Self {
            model: world.matrix.into(),
            normal_matrix: normal_matrix.into(),
            tint: [r, g, b, 1.0],
        }
    }
}

/// Linear clear color for an sRGB surface
pub fn clear_color(background: Tint) -> wgpu::Color {
    wgpu::Color {
        r: background.r as f64,
        g: background.g as f64,
        b: background.b as f64,
        a: 1.0,
    }
}

/// Rendering options taken from the viewer configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneRenderConfig {
    pub background: Tint,
    pub lighting: LightingUniform,
    pub enable_multisampling: bool,
    pub enable_backface_culling: bool,
}

impl From<&StoreMapConfig> for SceneRenderConfig {
    fn from(config: &StoreMapConfig) -> Self {
        Self {
            background: config.render.background,
            lighting: LightingUniform::from_config(&config.lighting),
            enable_multisampling: config.render.enable_multisampling,
            enable_backface_culling: config.render.enable_backface_culling,
        }
    }
}

impl Default for SceneRenderConfig {
    fn default() -> Self {
        Self::from(&StoreMapConfig::default())
    }
}

struct GpuPrimitive {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

struct GpuSceneMesh {
    node: NodeId,
    world: Transform3D,
    primitives: Vec<GpuPrimitive>,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// A surface texture being drawn this frame
pub struct Frame {
    pub output: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}

/// Renders a [`SceneGraph`] into a window surface
pub struct SceneRenderer {
    gpu: GpuContext,
    surface: wgpu::Surface<'static>,
    surface_config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    camera_buffer: wgpu::Buffer,
    lighting_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    node_layout: wgpu::BindGroupLayout,
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    sample_count: u32,
    config: SceneRenderConfig,
    meshes: Vec<GpuSceneMesh>,
}

impl SceneRenderer {
    pub async fn new(window: Arc<Window>, config: SceneRenderConfig) -> Result<Self> {
        let size = window.inner_size();
        let (gpu, surface) = GpuContext::for_window(window).await?;

        let surface_caps = surface.get_capabilities(&gpu.adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| storemap_core::Error::Gpu("Surface reports no formats".to_string()))?;

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&gpu.device, &surface_config);

        let sample_count = if config.enable_multisampling {
            let flags = gpu.adapter.get_texture_format_features(surface_format).flags;
            if flags.sample_count_supported(MSAA_SAMPLES) {
                MSAA_SAMPLES
            } else {
                log::warn!("{}x multisampling unsupported for {:?}, rendering without it", MSAA_SAMPLES, surface_format);
                1
            }
        } else {
            1
        };

        let camera_buffer = gpu.create_buffer_init(
            "Camera Buffer",
            &[CameraUniform::new(Matrix4::identity(), Point3::origin())],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );
        let lighting_buffer = gpu.create_buffer_init(
            "Lighting Buffer",
            &[config.lighting],
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let globals_layout = gpu.create_uniform_layout(
            "scene_globals_layout",
            &[
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                wgpu::ShaderStages::FRAGMENT,
            ],
        );
        let node_layout = gpu.create_uniform_layout(
            "scene_node_layout",
            &[wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT],
        );
        let globals_bind_group = gpu.create_uniform_bind_group(
            "scene_globals_bind_group",
            &globals_layout,
            &[&camera_buffer, &lighting_buffer],
        );

        let shader = gpu.create_shader_module("Scene Shader", include_str!("shaders/scene.wgsl"));
        let pipeline = Self::create_render_pipeline(
            &gpu.device,
            &[&globals_layout, &node_layout],
            &shader,
            surface_format,
            sample_count,
            &config,
        );

        let (depth_view, msaa_view) =
            Self::create_attachments(&gpu.device, &surface_config, sample_count);

        log::info!(
            "Scene renderer ready: {}x{} {:?}, {} sample(s)",
            surface_config.width,
            surface_config.height,
            surface_format,
            sample_count
        );

        Ok(Self {
            gpu,
            surface,
            surface_config,
            pipeline,
            camera_buffer,
            lighting_buffer,
            globals_bind_group,
            node_layout,
            depth_view,
            msaa_view,
            sample_count,
            config,
            meshes: Vec::new(),
        })
    }

    fn create_render_pipeline(
        device: &wgpu::Device,
        bind_group_layouts: &[&wgpu::BindGroupLayout],
        shader: &wgpu::ShaderModule,
        surface_format: wgpu::TextureFormat,
        sample_count: u32,
        config: &SceneRenderConfig,
    ) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Render Pipeline Layout"),
            bind_group_layouts,
            push_constant_ranges: &[],
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Scene Render Pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: "vs_main",
                buffers: &[SceneVertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: if config.enable_backface_culling {
                    Some(wgpu::Face::Back)
                } else {
                    None
                },
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        })
    }

    /// Depth buffer and, when multisampling, the color target resolved into the surface
    fn create_attachments(
        device: &wgpu::Device,
        surface_config: &wgpu::SurfaceConfiguration,
        sample_count: u32,
    ) -> (wgpu::TextureView, Option<wgpu::TextureView>) {
        let size = wgpu::Extent3d {
            width: surface_config.width,
            height: surface_config.height,
            depth_or_array_layers: 1,
        };

        let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let msaa_view = (sample_count > 1).then(|| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("MSAA Texture"),
                    size,
                    mip_level_count: 1,
                    sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format: surface_config.format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        (depth_view, msaa_view)
    }

    pub fn gpu(&self) -> &GpuContext {
        &self.gpu
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_config.format
    }

    /// Current surface size in physical pixels
    pub fn size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.surface_config.width as f32 / self.surface_config.height.max(1) as f32
    }

    /// Number of mesh nodes with geometry on the GPU
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Upload every mesh node of `scene`, replacing what was there
    pub fn upload_scene(&mut self, scene: &SceneGraph) {
        self.meshes.clear();

        for id in scene.mesh_nodes() {
            let Some(data) = scene.node(id).and_then(|node| node.mesh_data()) else {
                continue;
            };

            let primitives: Vec<GpuPrimitive> = data
                .primitives
                .iter()
                .filter(|mesh| mesh.face_count() > 0)
                .map(|mesh| GpuPrimitive {
                    vertex_buffer: self.gpu.create_buffer_init(
                        "Scene Vertex Buffer",
                        &scene_vertices(mesh),
                        wgpu::BufferUsages::VERTEX,
                    ),
                    index_buffer: self.gpu.create_buffer_init(
                        "Scene Index Buffer",
                        &mesh.triangle_indices(),
                        wgpu::BufferUsages::INDEX,
                    ),
                    index_count: (mesh.face_count() * 3) as u32,
                })
                .collect();
            if primitives.is_empty() {
                continue;
            }

            let Some(world) = scene.world_transform(id) else {
                continue;
            };
            let uniform_buffer = self.gpu.create_buffer_init(
                "Node Uniform Buffer",
                &[NodeUniform::new(&world, data.material.base_color)],
                wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            );
            let bind_group = self.gpu.create_uniform_bind_group(
                "scene_node_bind_group",
                &self.node_layout,
                &[&uniform_buffer],
            );

            self.meshes.push(GpuSceneMesh {
                node: id,
                world,
                primitives,
                uniform_buffer,
                bind_group,
            });
        }

        log::info!("Uploaded {} scene meshes to the GPU", self.meshes.len());
    }

    pub fn update_camera(&self, view_proj: Matrix4<f32>, eye: Point3<f32>) {
        self.gpu.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform::new(view_proj, eye)),
        );
    }

    pub fn update_lighting(&mut self, lighting: LightingUniform) {
        self.config.lighting = lighting;
        self.gpu
            .queue
            .write_buffer(&self.lighting_buffer, 0, bytemuck::bytes_of(&lighting));
    }

    /// Resize the surface and its attachments. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.gpu.device, &self.surface_config);

        let (depth_view, msaa_view) =
            Self::create_attachments(&self.gpu.device, &self.surface_config, self.sample_count);
        self.depth_view = depth_view;
        self.msaa_view = msaa_view;
    }

    /// Acquire the next surface texture.
    ///
    /// Returns `Ok(None)` when the frame should be skipped; a lost or
    /// outdated surface is reconfigured before returning.
    pub fn begin_frame(&mut self) -> Result<Option<Frame>> {
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                log::warn!("Surface lost or outdated, reconfiguring");
                self.surface.configure(&self.gpu.device, &self.surface_config);
                return Ok(None);
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Timed out acquiring surface texture");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Scene Render Encoder"),
            });

        Ok(Some(Frame {
            output,
            view,
            encoder,
        }))
    }

    /// Clear the frame and draw every uploaded mesh with its current tint
    pub fn render_scene(&self, frame: &mut Frame, scene: Option<&SceneGraph>) {
        if let Some(scene) = scene {
            for mesh in &self.meshes {
                let tint = scene.tint(mesh.node).unwrap_or(Tint::WHITE);
                self.gpu.queue.write_buffer(
                    &mesh.uniform_buffer,
                    0,
                    bytemuck::bytes_of(&NodeUniform::new(&mesh.world, tint)),
                );
            }
        }

        let (target, resolve_target) = match &self.msaa_view {
            Some(msaa_view) => (msaa_view, Some(&frame.view)),
            None => (&frame.view, None),
        };

        let mut render_pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Scene Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear_color(self.config.background)),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if scene.is_none() {
            return;
        }

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.globals_bind_group, &[]);
        for mesh in &self.meshes {
            render_pass.set_bind_group(1, &mesh.bind_group, &[]);
            for primitive in &mesh.primitives {
                render_pass.set_vertex_buffer(0, primitive.vertex_buffer.slice(..));
                render_pass.set_index_buffer(primitive.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..primitive.index_count, 0, 0..1);
            }
        }
    }

    /// Submit the frame's commands and show it
    pub fn present(&self, frame: Frame) {
        self.gpu.queue.submit(std::iter::once(frame.encoder.finish()));
        frame.output.present();
    }
}
