//! # Shader — Loading the Sprite Program
//!
//! The sprite program is two WGSL files: a vertex stage (`vs_main`) and a
//! fragment stage (`fs_main`). [`ShaderProgram::compile`] reads both, checks
//! the vertex attribute list against [`Vertex::LAYOUT`](super::Vertex::LAYOUT),
//! compiles them inside a wgpu validation error scope, and builds the render
//! pipeline.
//!
//! Failures are reported as [`RenderError`]s rather than logged and ignored:
//! a sprite program that does not compile is a broken build, and the driver
//! treats it as fatal.
//!
//! ## Uniforms
//!
//! wgpu has no runtime reflection, so uniform "locations" come from a fixed
//! table that mirrors the WGSL declarations:
//!
//! | name             | where                                  |
//! |------------------|----------------------------------------|
//! | `view_proj`      | frame uniform buffer, bytes 0..64      |
//! | `time`           | frame uniform buffer, bytes 64..68     |
//! | `sprite_sampler` | group 1, binding 1 (bound per texture) |
//!
//! Asking for any other name is a programming error and fails with
//! [`RenderError::UnknownUniform`].

use std::path::{Path, PathBuf};

use super::pipeline::SpriteRenderer;
use super::vertex::VertexAttribute;
use crate::error::RenderError;
use crate::render::GpuContext;

/// Where a named uniform lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformLocation {
    /// A byte range of the frame uniform buffer.
    Buffer { offset: u64, size: u64 },
    /// A sampler slot, bound together with each texture.
    Sampler { group: u32, binding: u32 },
}

const UNIFORMS: &[(&str, UniformLocation)] = &[
    ("view_proj", UniformLocation::Buffer { offset: 0, size: 64 }),
    ("time", UniformLocation::Buffer { offset: 64, size: 4 }),
    ("sprite_sampler", UniformLocation::Sampler { group: 1, binding: 1 }),
];

/// Resolve a uniform name against the sprite program's declarations.
pub fn lookup_uniform(name: &str) -> Result<UniformLocation, RenderError> {
    UNIFORMS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|&(_, location)| location)
        .ok_or_else(|| RenderError::UnknownUniform(name.to_owned()))
}

/// Check that `attributes` lists every vertex attribute exactly once, in slot
/// order.
pub fn check_attributes(attributes: &[VertexAttribute]) -> Result<(), RenderError> {
    if attributes.len() != VertexAttribute::ALL.len() {
        return Err(RenderError::AttributeLayout(format!(
            "expected {} attributes, got {}",
            VertexAttribute::ALL.len(),
            attributes.len()
        )));
    }
    for (slot, attr) in attributes.iter().enumerate() {
        if attr.location() as usize != slot {
            return Err(RenderError::AttributeLayout(format!(
                "'{}' is bound to slot {} but listed at position {slot}",
                attr.name(),
                attr.location()
            )));
        }
    }
    Ok(())
}

/// A compiled sprite program: its pipeline and the files it came from.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    vertex_path: PathBuf,
    fragment_path: PathBuf,
}

impl ShaderProgram {
    /// Read, validate, and compile the sprite program.
    pub fn compile(
        gpu: &GpuContext,
        renderer: &SpriteRenderer,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
        attributes: &[VertexAttribute],
    ) -> Result<Self, RenderError> {
        let vertex_path = vertex_path.as_ref();
        let fragment_path = fragment_path.as_ref();

        check_attributes(attributes)?;
        for attr in attributes {
            log::debug!("vertex attribute '{}' -> slot {}", attr.name(), attr.location());
        }

        let vertex_source = read_source(vertex_path)?;
        let fragment_source = read_source(fragment_path)?;

        gpu.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: vertex_path.to_str(),
            source: wgpu::ShaderSource::Wgsl(vertex_source.into()),
        });
        let fragment = gpu.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: fragment_path.to_str(),
            source: wgpu::ShaderSource::Wgsl(fragment_source.into()),
        });
        let pipeline = renderer.build_pipeline(gpu, &vertex, &fragment);

        if let Some(err) = pollster::block_on(gpu.device.pop_error_scope()) {
            return Err(RenderError::ShaderCompile {
                vertex: vertex_path.display().to_string(),
                fragment: fragment_path.display().to_string(),
                message: err.to_string(),
            });
        }

        log::info!(
            "compiled sprite program: {} + {}",
            vertex_path.display(),
            fragment_path.display()
        );

        Ok(Self {
            pipeline,
            vertex_path: vertex_path.to_owned(),
            fragment_path: fragment_path.to_owned(),
        })
    }

    /// Bind the program and the frame uniforms for the draws that follow.
    ///
    /// There is no matching "unuse": the bindings end with the render pass.
    pub fn use_program(&self, pass: &mut wgpu::RenderPass<'_>, renderer: &SpriteRenderer) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &renderer.frame_bind_group, &[]);
    }

    pub fn uniform_location(&self, name: &str) -> Result<UniformLocation, RenderError> {
        lookup_uniform(name)
    }

    pub fn vertex_path(&self) -> &Path {
        &self.vertex_path
    }

    pub fn fragment_path(&self) -> &Path {
        &self.fragment_path
    }
}

fn read_source(path: &Path) -> Result<String, RenderError> {
    std::fs::read_to_string(path).map_err(|source| RenderError::ShaderRead {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_uniforms_resolve() {
        assert_eq!(
            lookup_uniform("view_proj").unwrap(),
            UniformLocation::Buffer { offset: 0, size: 64 }
        );
        assert_eq!(
            lookup_uniform("time").unwrap(),
            UniformLocation::Buffer { offset: 64, size: 4 }
        );
        assert_eq!(
            lookup_uniform("sprite_sampler").unwrap(),
            UniformLocation::Sampler { group: 1, binding: 1 }
        );
    }

    #[test]
    fn unknown_uniform_is_an_error() {
        let err = lookup_uniform("mySampler").unwrap_err();
        assert!(matches!(err, RenderError::UnknownUniform(ref name) if name == "mySampler"));
        assert_eq!(err.to_string(), "uniform 'mySampler' not found in shader");
    }

    #[test]
    fn buffer_uniforms_fit_frame_uniforms() {
        let size = std::mem::size_of::<super::super::vertex::FrameUniforms>() as u64;
        for (name, location) in UNIFORMS {
            if let UniformLocation::Buffer { offset, size: len } = location {
                assert!(offset + len <= size, "{name} overruns the uniform buffer");
            }
        }
    }

    #[test]
    fn slot_ordered_attributes_pass() {
        check_attributes(&VertexAttribute::ALL).unwrap();
    }

    #[test]
    fn reordered_attributes_fail() {
        let err = check_attributes(&[
            VertexAttribute::Position,
            VertexAttribute::Uv,
            VertexAttribute::Color,
        ])
        .unwrap_err();
        assert!(matches!(err, RenderError::AttributeLayout(_)));
    }

    #[test]
    fn missing_attribute_fails() {
        let err = check_attributes(&[VertexAttribute::Position, VertexAttribute::Color]).unwrap_err();
        assert!(matches!(err, RenderError::AttributeLayout(_)));
    }

    #[test]
    fn unreadable_shader_reports_path() {
        let err = read_source(Path::new("no/such/shader.wgsl")).unwrap_err();
        assert!(matches!(err, RenderError::ShaderRead { ref path, .. } if path.ends_with("shader.wgsl")));
    }

    #[test]
    fn bundled_shaders_declare_attribute_locations() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("shaders");
        let vertex = read_source(&dir.join("sprite.vert.wgsl")).unwrap();
        for attr in VertexAttribute::ALL {
            let decl = format!("@location({}) {}:", attr.location(), attr.name());
            assert!(vertex.contains(&decl), "vertex shader is missing `{decl}`");
        }
        let fragment = read_source(&dir.join("sprite.frag.wgsl")).unwrap();
        assert!(fragment.contains("fn fs_main"));
        assert!(vertex.contains("fn vs_main"));
    }
}
