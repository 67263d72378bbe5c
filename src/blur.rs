use log::debug;
use wgpu::util::DeviceExt;

/// Taps on one side of the center, center included. Must match `blur.wgsl`.
pub const MAX_TAPS: usize = 32;

/// Normalized one-sided Gaussian kernel: `weights[0]` is the center tap,
/// `weights[i]` is applied at both `+i` and `-i`. The radius is `ceil(3σ)`,
/// capped at `MAX_TAPS - 1`.
pub fn gaussian_weights(sigma: f32) -> Vec<f32> {
    if !(sigma.is_finite() && sigma > 0.0) {
        return vec![1.0];
    }

    let radius = ((sigma * 3.0).ceil() as usize).min(MAX_TAPS - 1);
    let mut weights: Vec<f32> = (0..=radius)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();

    let total = weights[0] + 2.0 * weights[1..].iter().sum::<f32>();
    for w in &mut weights {
        *w /= total;
    }

    weights
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlurUniform {
    pub direction: [f32; 2],
    pub radius: u32,
    pub _padding: u32,
    // vec4-packed so the array stride is 16 bytes on the shader side
    pub weights: [[f32; 4]; MAX_TAPS / 4],
}

impl BlurUniform {
    /// `direction` is one texel step along the blur axis in uv units.
    pub fn new(direction: [f32; 2], sigma: f32) -> Self {
        let kernel = gaussian_weights(sigma);
        let mut weights = [[0.0; 4]; MAX_TAPS / 4];
        for (i, w) in kernel.iter().enumerate() {
            weights[i / 4][i % 4] = *w;
        }

        Self {
            direction,
            radius: (kernel.len() - 1) as u32,
            _padding: 0,
            weights,
        }
    }

    pub fn horizontal(width: u32, sigma: f32) -> Self {
        Self::new([1.0 / width.max(1) as f32, 0.0], sigma)
    }

    pub fn vertical(height: u32, sigma: f32) -> Self {
        Self::new([0.0, 1.0 / height.max(1) as f32], sigma)
    }
}

/// Offscreen color target plus the bind group that samples it.
struct Target {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    bind_group: wgpu::BindGroup,
}

/// Separable Gaussian blur: the scene is drawn into an offscreen texture,
/// blurred horizontally into a second one, then vertically into the surface.
pub struct BlurPass {
    sigma: f32,
    format: wgpu::TextureFormat,
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    horizontal_buffer: wgpu::Buffer,
    vertical_buffer: wgpu::Buffer,
    scene: Target,
    intermediate: Target,
}

impl BlurPass {
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sigma: f32,
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
            label: Some("call_gradient::blur_bind_group_layout"),
        });

        // clamp so the edges do not pull in black from outside the frame
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("call_gradient::blur_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let horizontal_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("call_gradient::blur_horizontal"),
            contents: bytemuck::cast_slice(&[BlurUniform::horizontal(width, sigma)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let vertical_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("call_gradient::blur_vertical"),
            contents: bytemuck::cast_slice(&[BlurUniform::vertical(height, sigma)]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("call_gradient::blur_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("call_gradient::blur_shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("blur.wgsl").into()),
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("call_gradient::blur_pipeline"),
            layout: Some(&layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "fullscreen_vertex",
                buffers: &[],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "blur_fragment",
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState::default(),
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let scene = create_target(
            device,
            &bind_group_layout,
            &sampler,
            &horizontal_buffer,
            format,
            width,
            height,
            "call_gradient::blur_scene",
        );
        let intermediate = create_target(
            device,
            &bind_group_layout,
            &sampler,
            &vertical_buffer,
            format,
            width,
            height,
            "call_gradient::blur_intermediate",
        );

        Self {
            sigma,
            format,
            pipeline,
            bind_group_layout,
            sampler,
            horizontal_buffer,
            vertical_buffer,
            scene,
            intermediate,
        }
    }

    /// The texture the primitive is rasterized into before blurring.
    pub fn scene_view(&self) -> &wgpu::TextureView {
        &self.scene.view
    }

    pub fn resize(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        debug!("blur targets resized to {}x{}", width, height);

        queue.write_buffer(
            &self.horizontal_buffer,
            0,
            bytemuck::cast_slice(&[BlurUniform::horizontal(width, self.sigma)]),
        );
        queue.write_buffer(
            &self.vertical_buffer,
            0,
            bytemuck::cast_slice(&[BlurUniform::vertical(height, self.sigma)]),
        );

        self.scene = create_target(
            device,
            &self.bind_group_layout,
            &self.sampler,
            &self.horizontal_buffer,
            self.format,
            width,
            height,
            "call_gradient::blur_scene",
        );
        self.intermediate = create_target(
            device,
            &self.bind_group_layout,
            &self.sampler,
            &self.vertical_buffer,
            self.format,
            width,
            height,
            "call_gradient::blur_intermediate",
        );
    }

    /// Blurs the scene texture into `output`: horizontal pass, then vertical.
    pub fn encode(&self, encoder: &mut wgpu::CommandEncoder, output: &wgpu::TextureView) {
        self.encode_pass(encoder, &self.scene, &self.intermediate.view, "horizontal");
        self.encode_pass(encoder, &self.intermediate, output, "vertical");
    }

    fn encode_pass(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        source: &Target,
        output: &wgpu::TextureView,
        label: &str,
    ) {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: output,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &source.bind_group, &[]);
        render_pass.draw(0..3, 0..1);
    }
}

// Each target samples with the uniform of the pass that reads it.
#[allow(clippy::too_many_arguments)]
fn create_target(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    uniform: &wgpu::Buffer,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
    label: &str,
) -> Target {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(sampler),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: uniform.as_entire_binding(),
            },
        ],
        label: Some(label),
    });

    Target {
        _texture: texture,
        view,
        bind_group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_is_normalized() {
        let weights = gaussian_weights(10.0);
        assert_eq!(weights.len(), 31);

        let total = weights[0] + 2.0 * weights[1..].iter().sum::<f32>();
        assert!((total - 1.0).abs() < 1e-5, "total = {total}");

        for pair in weights.windows(2) {
            assert!(pair[0] > pair[1]);
        }
    }

    #[test]
    fn test_kernel_radius_is_capped() {
        assert_eq!(gaussian_weights(50.0).len(), MAX_TAPS);
    }

    #[test]
    fn test_no_sigma_is_passthrough() {
        assert_eq!(gaussian_weights(0.0), vec![1.0]);
        assert_eq!(gaussian_weights(f32::NAN), vec![1.0]);

        let uniform = BlurUniform::new([0.5, 0.0], 0.0);
        assert_eq!(uniform.radius, 0);
        assert_eq!(uniform.weights[0], [1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_uniform_layout() {
        // 16-byte multiple, weights start on a vec4 boundary
        assert_eq!(std::mem::size_of::<BlurUniform>(), 16 + 16 * 8);

        let uniform = BlurUniform::horizontal(400, 10.0);
        assert_eq!(uniform.direction, [1.0 / 400.0, 0.0]);
        assert_eq!(uniform.radius, 30);

        let kernel = gaussian_weights(10.0);
        assert_eq!(uniform.weights[0][0], kernel[0]);
        assert_eq!(uniform.weights[7][2], kernel[30]);
        assert_eq!(uniform.weights[7][3], 0.0);
    }
}
