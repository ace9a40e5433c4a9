//! Frame orchestration: acquire the surface texture, let the renderer record
//! its passes, then submit and present.

use crate::render::gpu::GpuContext;

/// The clear color. Set this in config to change the background.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ClearColor(pub [f64; 4]);

impl Default for ClearColor {
    fn default() -> Self {
        // A pleasant dark blue, like a night sky.
        Self([0.1, 0.1, 0.15, 1.0])
    }
}

impl ClearColor {
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.0[0],
            g: self.0[1],
            b: self.0[2],
            a: self.0[3],
        }
    }
}

/// Per-frame render context handed to the renderer.
///
/// Created by [`render_frame`], which acquires the surface texture and
/// encoder. Submit/present happens after the callback returns.
pub struct FrameContext<'a> {
    pub encoder: wgpu::CommandEncoder,
    pub view: wgpu::TextureView,
    pub gpu: &'a GpuContext,
}

/// Render a single frame.
///
/// `record` adds render passes to the frame's encoder. Surface errors are
/// returned before `record` runs; the caller decides whether to reconfigure
/// or give up.
pub fn render_frame(
    gpu: &GpuContext,
    record: impl FnOnce(&mut FrameContext<'_>),
) -> Result<(), wgpu::SurfaceError> {
    let output = gpu.surface.get_current_texture()?;
    let view = output
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());
    let encoder = gpu
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("tessera frame encoder"),
        });

    let mut frame = FrameContext { encoder, view, gpu };
    record(&mut frame);

    gpu.queue.submit(std::iter::once(frame.encoder.finish()));
    output.present();

    Ok(())
}
