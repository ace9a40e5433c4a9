//! # Render2d — Batched Sprite Rendering
//!
//! A sprite is a textured rectangle: a *quad*, drawn as two triangles. The
//! naive way to draw N sprites is N draw calls, each with its own texture
//! bind. Every draw call carries driver overhead, so a frame of a few
//! thousand sprites spends most of its time talking to the driver rather
//! than drawing. This module turns N sprites into as few draw calls as there
//! are texture changes.
//!
//! ## Per-Frame Flow
//!
//! ```text
//!   game code                    SpriteBatch                     GPU
//!  ───────────            ─────────────────────────        ─────────────
//!   begin(mode) ────────► clear glyphs + batches
//!   draw(..) × N ───────► push Glyph (4 corners, CPU)
//!   end() ──────────────► stable sort by mode
//!                          merge equal-texture runs
//!                          6 vertices per quad ──────────► fresh vertex buffer
//!   render_batch() ─────► per RenderBatch:
//!                            bind texture ───────────────► set_bind_group(1)
//!                            draw range ─────────────────► draw(offset..end)
//! ```
//!
//! ## Modules
//!
//! - [`vertex`]: the per-corner [`Vertex`] and its fixed attribute slots.
//! - [`batch`]: [`SpriteBatch`], the sort-and-merge engine.
//! - [`camera`]: [`Camera2d`], the lazily recomputed view-projection.
//! - [`texture`]: [`TextureCache`], path-keyed texture deduplication.
//! - [`shader`]: [`ShaderProgram`], WGSL loading and uniform lookup.
//! - `pipeline` / `draw`: the wgpu resources and the render pass glue.
//!
//! ## Comparison
//!
//! - **Love2D**: the C++ backend batches consecutive same-texture draws
//!   automatically. Same idea, but the ordering is whatever the user
//!   submitted; we let the caller pick a sort.
//! - **XNA / MonoGame `SpriteBatch`**: the direct ancestor of this API.
//!   `Begin(SpriteSortMode)`, `Draw(..)`, `End()` with the same four sort
//!   modes (`Deferred`, `Texture`, `FrontToBack`, `BackToFront`).
//! - **Bevy**: instanced rendering with a per-instance buffer. Scales
//!   further, but requires a much larger pipeline.

pub mod batch;
pub mod camera;
pub(crate) mod draw;
pub(crate) mod pipeline;
pub mod shader;
pub mod texture;
pub mod vertex;

pub use batch::{BatchDraw, RenderBatch, SortMode, SpriteBatch, VertexUpload};
pub use camera::Camera2d;
pub use pipeline::SpriteRenderer;
pub use shader::{ShaderProgram, UniformLocation};
pub use texture::{
    DecodedImage, FileDecoder, GpuTexture, ImageDecoder, Texture, TextureCache, TextureHandle,
    TextureUploader,
};
pub use vertex::{Vertex, VertexAttribute};

/// An RGBA color with 8-bit channels.
///
/// Stored as bytes because that is what reaches the GPU: the vertex color
/// attribute is `Unorm8x4`, so each channel is normalized to [0, 1] by the
/// vertex fetcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Create a color from RGB (alpha = 255).
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Create a color from RGBA.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}
