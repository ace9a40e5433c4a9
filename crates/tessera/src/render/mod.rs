//! Rendering infrastructure shared by the 2D renderer: the wgpu device and
//! surface ([`gpu`]) and per-frame pass orchestration ([`pass`]).

pub mod gpu;
pub mod pass;

pub use gpu::GpuContext;
pub use pass::{ClearColor, FrameContext, render_frame};
