//! # Pipeline — GPU Resources for Sprite Drawing
//!
//! [`SpriteRenderer`] owns everything the sprite pipeline binds that is not
//! per-texture:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │ SpriteRenderer                                               │
//! │                                                              │
//! │  group 0: frame uniforms { view_proj, time }  (uniform buf)  │
//! │  group 1: texture + sampler layout            (per texture)  │
//! │                                                              │
//! │  vertex_buffer ─── replaced wholesale every frame            │
//! │  build_pipeline ── vertex + fragment modules → RenderPipeline│
//! │                    alpha blending, TriangleList, no culling  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Vertex Buffer Lifetime
//!
//! Each [`SpriteBatch::end`](super::SpriteBatch::end) creates a brand-new
//! buffer sized to the frame's vertices instead of writing into last frame's.
//! The old buffer is dropped; wgpu keeps it alive until the GPU finishes
//! reading it, so the CPU never waits on in-flight work. This is the wgpu
//! equivalent of orphaning a GL buffer with `glBufferData(.., nullptr, ..)`.
//!
//! ## Why No Depth Buffer
//!
//! Depth here is only a CPU sort key. Drawing order comes from the batch's
//! sort, and blended sprites need to composite over whatever is behind them,
//! which a depth test would prevent.

use wgpu::util::DeviceExt;

use super::shader::UniformLocation;
use super::vertex::{FrameUniforms, Vertex};
use crate::render::GpuContext;

/// Shared GPU state for the sprite renderer.
pub struct SpriteRenderer {
    pub frame_bind_group_layout: wgpu::BindGroupLayout,
    pub texture_bind_group_layout: wgpu::BindGroupLayout,
    pub uniform_buffer: wgpu::Buffer,
    pub frame_bind_group: wgpu::BindGroup,
    pub sampler: wgpu::Sampler,
    pub vertex_buffer: Option<wgpu::Buffer>,
}

impl SpriteRenderer {
    pub fn new(gpu: &GpuContext) -> Self {
        let device = &gpu.device;

        // Bind group layout 0: frame uniforms
        let frame_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("frame uniforms layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        // Bind group layout 1: texture + sampler
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("sprite texture layout"),
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
                ],
            });

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("frame uniform buffer"),
            contents: bytemuck::cast_slice(&[FrameUniforms::default()]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("frame uniforms bind group"),
            layout: &frame_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        // Shared sampler for all sprite textures: tiling UVs, smooth scaling.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("sprite sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            frame_bind_group_layout,
            texture_bind_group_layout,
            uniform_buffer,
            frame_bind_group,
            sampler,
            vertex_buffer: None,
        }
    }

    /// Build the sprite pipeline from compiled vertex and fragment modules.
    pub fn build_pipeline(
        &self,
        gpu: &GpuContext,
        vertex: &wgpu::ShaderModule,
        fragment: &wgpu::ShaderModule,
    ) -> wgpu::RenderPipeline {
        let pipeline_layout = gpu.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sprite pipeline layout"),
            bind_group_layouts: &[&self.frame_bind_group_layout, &self.texture_bind_group_layout],
            push_constant_ranges: &[],
        });

        gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("sprite pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: vertex,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::LAYOUT],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: fragment,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: gpu.surface_format(),
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None, // 2D sprites are double-sided
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        })
    }

    /// Write raw bytes to a uniform resolved by
    /// [`ShaderProgram::uniform_location`](super::ShaderProgram::uniform_location).
    pub fn write_uniform(&self, queue: &wgpu::Queue, location: UniformLocation, bytes: &[u8]) {
        match location {
            UniformLocation::Buffer { offset, size } => {
                debug_assert_eq!(bytes.len() as u64, size, "uniform size mismatch");
                queue.write_buffer(&self.uniform_buffer, offset, bytes);
            }
            UniformLocation::Sampler { group, binding } => {
                // Samplers are bound per texture; there is nothing to write.
                log::warn!("ignoring write to sampler uniform at group {group} binding {binding}");
            }
        }
    }

    pub fn set_uniform_mat4(&self, queue: &wgpu::Queue, location: UniformLocation, value: glam::Mat4) {
        self.write_uniform(queue, location, bytemuck::cast_slice(&value.to_cols_array()));
    }

    pub fn set_uniform_f32(&self, queue: &wgpu::Queue, location: UniformLocation, value: f32) {
        self.write_uniform(queue, location, bytemuck::bytes_of(&value));
    }
}
