use anyhow::Context;
use log::{debug, info};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::blur::BlurPass;
use crate::buffer::Topology;
use crate::camera::SceneUniform;
use crate::config::CLEAR_COLOR;
use crate::error::RenderError;
use crate::vertex::Vertex;

/// The device-side half of the draw pipeline: allocates vertex memory and
/// rasterizes one primitive per frame.
pub trait RenderBackend {
    type Buffer;

    /// Whether a frame can be submitted right now.
    fn is_ready(&self) -> bool;

    /// How the rasterizer joins vertices. Vertex counts are validated against this.
    fn topology(&self) -> Topology;

    fn upload(&self, vertices: &[Vertex]) -> Self::Buffer;

    /// Draws `vertex_count` vertices from `buffer`, transforming positions by `scene`.
    fn draw(
        &mut self,
        buffer: &Self::Buffer,
        vertex_count: u32,
        scene: &SceneUniform,
    ) -> Result<(), RenderError>;
}

pub struct WgpuBackend {
    window_surface: wgpu::Surface,
    device: wgpu::Device,
    command_queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    configured: bool,
    topology: Topology,
    render_pipeline: wgpu::RenderPipeline,
    blur: Option<BlurPass>,
    scene_buffer: wgpu::Buffer,
    scene_bind_group: wgpu::BindGroup,
}

impl WgpuBackend {
    /// `blur_sigma` is in pixels; zero or less draws straight to the surface.
    pub async fn new(window: &Window, topology: Topology, blur_sigma: f32) -> anyhow::Result<Self> {
        // Instance - Handle to the GPU. Use this to get adapter and surface
        let wgpu_instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let size = window.inner_size();

        // --SAFETY--
        // The surface needs to live as long as the window that created it.
        // The application drops the pipeline (and with it this backend) before the window.
        let window_surface = unsafe { wgpu_instance.create_surface(window) }
            .context("failed to create a surface for the window")?;

        let adapter = wgpu_instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&window_surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no graphics adapter is compatible with the window surface")?;
        info!("using adapter {:?}", adapter.get_info());

        let (device, command_queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("call_gradient::device"),
                    features: wgpu::Features::empty(),
                    limits: wgpu::Limits::downlevel_defaults(),
                },
                None,
            )
            .await
            .context("failed to open the graphics device")?;

        let surface_caps = window_surface.get_capabilities(&adapter);
        // The palette is given in sRGB, so prefer an sRGB surface and let the
        // hardware do the conversion on write.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("the surface reports no texture formats")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
        };

        let scene_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("call_gradient::scene_buffer"),
            contents: bytemuck::cast_slice(&[SceneUniform::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let scene_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("call_gradient::scene_bind_group_layout"),
            });

        let scene_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &scene_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: scene_buffer.as_entire_binding(),
            }],
            label: Some("call_gradient::scene_bind_group"),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("call_gradient::pipeline_layout"),
                bind_group_layouts: &[&scene_bind_group_layout],
                push_constant_ranges: &[],
            });

        let shader = wgpu::ShaderModuleDescriptor {
            label: Some("call_gradient::rotation_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        };
        let render_pipeline = create_render_pipeline(
            &device,
            &render_pipeline_layout,
            config.format,
            &[Vertex::desc()],
            shader,
            topology.to_wgpu(),
        );

        let blur = (blur_sigma > 0.0).then(|| {
            BlurPass::new(&device, config.format, size.width, size.height, blur_sigma)
        });

        let mut backend = Self {
            window_surface,
            device,
            command_queue,
            config,
            configured: false,
            topology,
            render_pipeline,
            blur,
            scene_buffer,
            scene_bind_group,
        };
        backend.resize(size.width, size.height);

        Ok(backend)
    }

    /// Reconfigures the surface. A zero-sized surface leaves the backend not ready.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.window_surface.configure(&self.device, &self.config);
            if let Some(blur) = self.blur.as_mut() {
                blur.resize(&self.device, &self.command_queue, width, height);
            }
            self.configured = true;
            debug!("surface configured at {}x{}", width, height);
        } else {
            self.configured = false;
            debug!("surface is zero-sized, pausing");
        }
    }

    /// Applies the last known size again, e.g. after the surface was lost.
    pub fn reconfigure(&mut self) {
        self.resize(self.config.width, self.config.height);
    }
}

impl RenderBackend for WgpuBackend {
    type Buffer = wgpu::Buffer;

    fn is_ready(&self) -> bool {
        self.configured
    }

    fn topology(&self) -> Topology {
        self.topology
    }

    fn upload(&self, vertices: &[Vertex]) -> wgpu::Buffer {
        debug!("uploading {} vertices", vertices.len());
        self.device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("call_gradient::vertex_buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            })
    }

    fn draw(
        &mut self,
        buffer: &wgpu::Buffer,
        vertex_count: u32,
        scene: &SceneUniform,
    ) -> Result<(), RenderError> {
        // Waits for the surface to hand out the next texture to draw into
        let output = self.window_surface.get_current_texture()?;

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // queued writes land before the commands submitted below
        self.command_queue
            .write_buffer(&self.scene_buffer, 0, bytemuck::cast_slice(&[*scene]));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("call_gradient::render_encoder"),
            });

        // with blur on, the primitive goes offscreen first
        let scene_view = match &self.blur {
            Some(blur) => blur.scene_view(),
            None => &view,
        };

        // begin_render_pass borrows the encoder, so the pass has to end before finish()
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("call_gradient::render_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: scene_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.scene_bind_group, &[]);
            render_pass.set_vertex_buffer(0, buffer.slice(..));
            render_pass.draw(0..vertex_count, 0..1);
        }

        if let Some(blur) = &self.blur {
            blur.encode(&mut encoder, &view);
        }

        self.command_queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

fn create_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    shader: wgpu::ShaderModuleDescriptor,
    topology: wgpu::PrimitiveTopology,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(shader);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("call_gradient::render_pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "rotation_vertex",
            buffers: vertex_layouts,
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "rotation_fragment",
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            // strips alternate winding, and the shape spins, so draw both faces
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            // Requires Features::DEPTH_CLIP_CONTROL
            unclipped_depth: false,
            // Requires Features::CONSERVATIVE_RASTERIZATION
            conservative: false,
        },
        depth_stencil: None,
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}
