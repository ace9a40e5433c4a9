//! Error types for resource loading and GPU setup.
//!
//! Everything here is fatal at startup: a missing texture or a shader that
//! fails to compile has no recovery path, so the driver logs the error and
//! terminates. The sprite batch and camera never produce errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to decode image '{path}': {source}")]
    ImageDecode {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to upload texture '{label}': {reason}")]
    TextureUpload { label: String, reason: String },

    #[error("failed to read shader '{}': {source}", path.display())]
    ShaderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("shader program ({vertex} + {fragment}) failed to compile: {message}")]
    ShaderCompile {
        vertex: String,
        fragment: String,
        message: String,
    },

    #[error("uniform '{0}' not found in shader")]
    UnknownUniform(String),

    #[error("vertex attribute list does not match the vertex layout: {0}")]
    AttributeLayout(String),

    #[error("failed to load config '{}': {reason}", path.display())]
    Config { path: PathBuf, reason: String },

    #[error("window error: {0}")]
    Window(String),

    #[error("GPU initialization failed: {0}")]
    Gpu(String),
}
