//! # Draw — wgpu Implementations of the Batch Seams
//!
//! [`SpriteBatch`] knows nothing about wgpu. It talks to two small traits,
//! and this module implements them:
//!
//! - [`GpuUpload`] ([`VertexUpload`]): swaps in a fresh vertex buffer holding
//!   the frame's stream, or drops the buffer when the frame is empty.
//! - [`PassDraw`] ([`BatchDraw`]): binds a texture's bind group and records a
//!   non-indexed draw over a vertex range inside an open render pass.
//!
//! [`render_sprites_2d`] opens the pass, binds the program, and lets the
//! batch drive `PassDraw`.
//!
//! ```text
//! render_sprites_2d(frame, ..)
//!   ├─ begin pass, clear with ClearColor
//!   ├─ program.use_program ── pipeline + group 0
//!   ├─ set_vertex_buffer(0, frame's buffer)
//!   └─ batch.render_batch(PassDraw)
//!        ├─ bind_texture ── set_bind_group(1, texture)
//!        └─ draw ───────── draw(offset..offset+count, 0..1)
//! ```

use std::ops::Range;

use wgpu::util::DeviceExt;

use super::batch::{BatchDraw, SpriteBatch, VertexUpload};
use super::pipeline::SpriteRenderer;
use super::shader::ShaderProgram;
use super::texture::{GpuTexture, TextureCache, TextureHandle};
use super::vertex::Vertex;
use crate::render::{ClearColor, FrameContext, GpuContext};

/// Uploads the batch's vertex stream into a new GPU buffer.
pub(crate) struct GpuUpload<'a> {
    pub gpu: &'a GpuContext,
    pub renderer: &'a mut SpriteRenderer,
}

impl VertexUpload for GpuUpload<'_> {
    fn upload(&mut self, vertices: &[Vertex]) {
        if vertices.is_empty() {
            self.renderer.vertex_buffer = None;
            return;
        }
        let buffer = self
            .gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("sprite vertex buffer"),
                contents: bytemuck::cast_slice(vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
        self.renderer.vertex_buffer = Some(buffer);
    }
}

/// Records batch draws into an open render pass.
pub(crate) struct PassDraw<'a, 'p> {
    pass: &'a mut wgpu::RenderPass<'p>,
    textures: &'a TextureCache<GpuTexture>,
    bound: bool,
}

impl<'a, 'p> PassDraw<'a, 'p> {
    pub fn new(pass: &'a mut wgpu::RenderPass<'p>, textures: &'a TextureCache<GpuTexture>) -> Self {
        Self {
            pass,
            textures,
            bound: false,
        }
    }
}

impl BatchDraw for PassDraw<'_, '_> {
    fn bind_texture(&mut self, texture: TextureHandle) {
        match self.textures.resource(texture) {
            Some(gpu_texture) => {
                self.pass.set_bind_group(1, &gpu_texture.bind_group, &[]);
                self.bound = true;
            }
            None => {
                log::warn!("no texture for handle {}; skipping batch", texture.id());
                self.bound = false;
            }
        }
    }

    fn draw(&mut self, vertices: Range<u32>) {
        if self.bound {
            self.pass.draw(vertices, 0..1);
        }
    }
}

/// Record the sprite pass for this frame: clear, then draw every batch.
pub(crate) fn render_sprites_2d(
    frame: &mut FrameContext<'_>,
    renderer: &SpriteRenderer,
    program: &ShaderProgram,
    batch: &SpriteBatch,
    textures: &TextureCache<GpuTexture>,
    clear_color: ClearColor,
) {
    let mut render_pass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("sprite render pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: &frame.view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(clear_color.to_wgpu()),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    let Some(vertex_buffer) = &renderer.vertex_buffer else {
        return;
    };

    program.use_program(&mut render_pass, renderer);
    render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));

    batch.render_batch(&mut PassDraw::new(&mut render_pass, textures));
}
