//! wgpu backend for the particle field.

pub mod camera;

use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::controller::FrameRenderer;
use crate::error::GpuError;
use crate::shader::{location, FRAGMENT_ENTRY, PARTICLE_SHADER, VERTEX_ENTRY, VERTICES_PER_PARTICLE};
use crate::spawn::ParticleBuffers;
use crate::uniforms::Uniforms;
use crate::viewport::ViewportState;

/// Static attribute buffers on the GPU, one per shader location.
struct AttributeBuffers {
    position: wgpu::Buffer,
    random: wgpu::Buffer,
    color: wgpu::Buffer,
    count: u32,
}

/// Renders the particle field into a window surface.
pub struct GpuRenderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    render_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    attributes: Option<AttributeBuffers>,
    clear_color: wgpu::Color,
    released: bool,
}

impl GpuRenderer {
    /// Create the surface, device and pipeline for `window`.
    pub async fn new(window: Arc<Window>, background: glam::Vec3) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Particle Field Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // Palette colors are sRGB already; write them unconverted like a canvas would
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoAdapter)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Uniform Buffer"),
            size: std::mem::size_of::<Uniforms>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Both stages read the uniforms: size/motion in vertex, time/mask in fragment
        let uniform_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Uniform Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Particle Shader"),
            source: wgpu::ShaderSource::Wgsl(PARTICLE_SHADER.into()),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some(VERTEX_ENTRY),
                buffers: &[
                    instance_layout(&POSITION_ATTRIBUTES),
                    instance_layout(&RANDOM_ATTRIBUTES),
                    instance_layout(&COLOR_ATTRIBUTES),
                ],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some(FRAGMENT_ENTRY),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            // No depth buffer: particles overdraw in buffer order
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Ok(Self {
            surface,
            device,
            queue,
            config,
            render_pipeline,
            uniform_buffer,
            uniform_bind_group,
            attributes: None,
            clear_color: wgpu::Color {
                r: background.x as f64,
                g: background.y as f64,
                b: background.z as f64,
                a: 1.0,
            },
            released: false,
        })
    }

    fn create_attribute_buffer(&self, label: &str, data: &[u8], stride: usize) -> wgpu::Buffer {
        // Zero-particle fields still bind a buffer; give it one zeroed element
        let placeholder;
        let contents = if data.is_empty() {
            placeholder = vec![0u8; stride];
            &placeholder[..]
        } else {
            data
        };
        self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage: wgpu::BufferUsages::VERTEX,
        })
    }
}

/// Particles that fit in one attribute buffer of `max_buffer_size` bytes.
///
/// The seed buffer has the widest stride, so it sets the limit.
pub fn max_particles_for(max_buffer_size: u64) -> u32 {
    let widest = std::mem::size_of::<[f32; 4]>() as u64;
    (max_buffer_size / widest).min(u64::from(u32::MAX)) as u32
}

static POSITION_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];
static RANDOM_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x4];
static COLOR_ATTRIBUTES: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x3];

/// Tightly packed per-instance buffer holding a single attribute.
fn instance_layout(
    attributes: &'static [wgpu::VertexAttribute],
) -> wgpu::VertexBufferLayout<'static> {
    wgpu::VertexBufferLayout {
        array_stride: attributes[0].format.size(),
        step_mode: wgpu::VertexStepMode::Instance,
        attributes,
    }
}

impl FrameRenderer for GpuRenderer {
    fn upload(&mut self, buffers: &ParticleBuffers) -> Result<(), GpuError> {
        // wgpu's default error handler panics on oversized buffers
        let limit = self.max_particles();
        if buffers.len() as u64 > u64::from(limit) {
            return Err(GpuError::TooManyParticles {
                count: buffers.len() as u64,
                limit: u64::from(limit),
            });
        }

        let position = self.create_attribute_buffer(
            "Particle Positions",
            bytemuck::cast_slice(&buffers.positions),
            std::mem::size_of::<[f32; 3]>(),
        );
        let random = self.create_attribute_buffer(
            "Particle Randoms",
            bytemuck::cast_slice(&buffers.randoms),
            std::mem::size_of::<[f32; 4]>(),
        );
        let color = self.create_attribute_buffer(
            "Particle Colors",
            bytemuck::cast_slice(&buffers.colors),
            std::mem::size_of::<[f32; 3]>(),
        );

        self.attributes = Some(AttributeBuffers {
            position,
            random,
            color,
            count: buffers.len() as u32,
        });
        Ok(())
    }

    fn resize(&mut self, viewport: ViewportState) {
        if viewport.is_empty() || self.released {
            return;
        }
        self.config.width = viewport.width;
        self.config.height = viewport.height;
        self.surface.configure(&self.device, &self.config);
    }

    fn draw(&mut self, uniforms: &Uniforms) -> Result<(), GpuError> {
        let Some(attributes) = &self.attributes else {
            return Err(GpuError::FrameSkipped("particle buffers not uploaded".into()));
        };

        self.queue
            .write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::OutOfMemory) => {
                return Err(GpuError::ContextLost);
            }
            Err(e) => return Err(GpuError::FrameSkipped(e.to_string())),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(location::POSITION, attributes.position.slice(..));
            render_pass.set_vertex_buffer(location::RANDOM, attributes.random.slice(..));
            render_pass.set_vertex_buffer(location::COLOR, attributes.color.slice(..));
            render_pass.draw(0..VERTICES_PER_PARTICLE, 0..attributes.count);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        if let Some(attributes) = self.attributes.take() {
            attributes.position.destroy();
            attributes.random.destroy();
            attributes.color.destroy();
        }
        self.uniform_buffer.destroy();
        self.released = true;
    }

    fn max_particles(&self) -> u32 {
        max_particles_for(self.device.limits().max_buffer_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_particles_from_webgl2_limits() {
        let limits = wgpu::Limits::downlevel_webgl2_defaults();
        let max = max_particles_for(limits.max_buffer_size);
        assert_eq!(u64::from(max) * 16, limits.max_buffer_size);
        assert!(max < 50_000_000);
    }

    #[test]
    fn test_max_particles_caps_at_u32() {
        assert_eq!(max_particles_for(u64::MAX), u32::MAX);
        assert_eq!(max_particles_for(0), 0);
        assert_eq!(max_particles_for(31), 1);
    }
}
