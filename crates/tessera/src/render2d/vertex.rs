//! # Vertex — Per-Corner Data Sent to the GPU
//!
//! Every quad the batch emits is six of these (two triangles). Each vertex
//! carries a world-space position, a tint color, and a texture coordinate.
//!
//! ## Memory Layout
//!
//! ```text
//! Vertex (20 bytes per vertex)
//! ┌────────────────┬──────────────┬────────────────┐
//! │ position       │ color        │ uv             │
//! │ [f32; 2]       │ [u8; 4]      │ [f32; 2]       │
//! │ 8 bytes        │ 4 bytes      │ 8 bytes        │
//! │ offset 0       │ offset 8     │ offset 12      │
//! │ location(0)    │ location(1)  │ location(2)    │
//! └────────────────┴──────────────┴────────────────┘
//! ```
//!
//! `#[repr(C)]` fixes the field order and `bytemuck::Pod` lets a
//! `&[Vertex]` be viewed as `&[u8]` for upload without copying. The color is
//! four bytes instead of four floats: the vertex fetcher normalizes
//! `Unorm8x4` to `vec4<f32>` for free, and the vertex shrinks from 32 to 20
//! bytes.
//!
//! ## Attribute Slots
//!
//! The slot each field binds to is spelled out once, in [`VertexAttribute`].
//! The buffer layout is derived from it, and the same list is handed to
//! [`ShaderProgram::compile`](super::ShaderProgram::compile), which refuses
//! a list that disagrees. The WGSL `@location(N)` numbers must match.

use bytemuck::{Pod, Zeroable};

use super::Color;

/// One corner of a quad.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [u8; 4],
    pub uv: [f32; 2],
}

impl Vertex {
    pub fn new(x: f32, y: f32, color: Color, u: f32, v: f32) -> Self {
        Self {
            position: [x, y],
            color: color.to_array(),
            uv: [u, v],
        }
    }

    const ATTRIBUTES: [wgpu::VertexAttribute; 3] = [
        VertexAttribute::Position.descriptor(),
        VertexAttribute::Color.descriptor(),
        VertexAttribute::Uv.descriptor(),
    ];

    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &Self::ATTRIBUTES,
    };
}

/// The vertex attributes and the shader slot each one is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexAttribute {
    Position,
    Color,
    Uv,
}

impl VertexAttribute {
    /// Every attribute, in slot order.
    pub const ALL: [Self; 3] = [Self::Position, Self::Color, Self::Uv];

    /// The `@location(N)` this attribute is bound to.
    pub const fn location(self) -> u32 {
        match self {
            Self::Position => 0,
            Self::Color => 1,
            Self::Uv => 2,
        }
    }

    /// Name of the matching field in the WGSL vertex input.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Color => "color",
            Self::Uv => "uv",
        }
    }

    const fn offset(self) -> wgpu::BufferAddress {
        (match self {
            Self::Position => std::mem::offset_of!(Vertex, position),
            Self::Color => std::mem::offset_of!(Vertex, color),
            Self::Uv => std::mem::offset_of!(Vertex, uv),
        }) as wgpu::BufferAddress
    }

    const fn format(self) -> wgpu::VertexFormat {
        match self {
            Self::Position | Self::Uv => wgpu::VertexFormat::Float32x2,
            Self::Color => wgpu::VertexFormat::Unorm8x4,
        }
    }

    pub const fn descriptor(self) -> wgpu::VertexAttribute {
        wgpu::VertexAttribute {
            format: self.format(),
            offset: self.offset(),
            shader_location: self.location(),
        }
    }
}

/// Per-frame shader parameters, uploaded as a single uniform buffer.
///
/// The WGSL struct is `{ view_proj: mat4x4<f32>, time: f32 }`, which WGSL
/// rounds up to 80 bytes; `_padding` makes the Rust side match.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct FrameUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub time: f32,
    pub _padding: [f32; 3],
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
            time: 0.0,
            _padding: [0.0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_twenty_bytes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 20);
        assert_eq!(Vertex::LAYOUT.array_stride, 20);
    }

    #[test]
    fn layout_follows_attribute_slots() {
        let attrs = Vertex::LAYOUT.attributes;
        assert_eq!(attrs.len(), VertexAttribute::ALL.len());
        for (slot, attr) in VertexAttribute::ALL.iter().enumerate() {
            assert_eq!(attr.location() as usize, slot);
            assert_eq!(attrs[slot].shader_location, attr.location());
        }
        assert_eq!(attrs[0].offset, 0);
        assert_eq!(attrs[1].offset, 8);
        assert_eq!(attrs[2].offset, 12);
        assert_eq!(attrs[1].format, wgpu::VertexFormat::Unorm8x4);
    }

    #[test]
    fn frame_uniforms_match_wgsl_size() {
        assert_eq!(std::mem::size_of::<FrameUniforms>(), 80);
    }
}
