//! Window management via winit.
//!
//! Implements [`winit::application::ApplicationHandler`] to drive the event
//! loop: window and GPU creation on `resumed`, input forwarding, resize, and
//! the per-frame update, batch, render, and pacing sequence on each redraw.
//!
//! Fatal errors (window, GPU, shader, or anything `Game::setup` returns) are
//! logged, stored, and end the event loop; [`App::run`](crate::app::App::run)
//! hands the stored error back to the caller.

use std::sync::Arc;

use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::ActiveEventLoop;
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowId};

use crate::app::{Context, Game, Graphics};
use crate::config::AppConfig;
use crate::error::RenderError;
use crate::render::{GpuContext, render_frame};
use crate::render2d::draw::{GpuUpload, render_sprites_2d};
use crate::render2d::{ShaderProgram, SpriteBatch, SpriteRenderer, VertexAttribute};

/// Frames between FPS log lines.
const FPS_LOG_INTERVAL: u64 = 60;

/// The application state that winit drives.
pub(crate) struct WinitApp<G> {
    config: AppConfig,
    game: G,
    ctx: Context,
    batch: SpriteBatch,
    started: bool,
    error: Option<RenderError>,
}

impl<G: Game> WinitApp<G> {
    pub fn new(config: AppConfig, game: G) -> Self {
        let ctx = Context::new(&config);
        Self {
            config,
            game,
            ctx,
            batch: SpriteBatch::new(),
            started: false,
            error: None,
        }
    }

    /// The error that stopped the loop, if any.
    pub fn finish(self) -> Result<(), RenderError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: RenderError) {
        log::error!("{err}");
        self.error.get_or_insert(err);
        event_loop.exit();
    }

    fn window_attributes(&self) -> winit::window::WindowAttributes {
        let flags = self.config.window;
        let mut attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                self.config.width,
                self.config.height,
            ))
            .with_visible(!flags.hidden)
            .with_decorations(!flags.borderless);
        if flags.fullscreen {
            attrs = attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }
        attrs
    }

    /// Create the window, GPU context, and sprite program.
    fn init_graphics(&self, event_loop: &ActiveEventLoop) -> Result<Graphics, RenderError> {
        let window = Arc::new(
            event_loop
                .create_window(self.window_attributes())
                .map_err(|e| RenderError::Window(e.to_string()))?,
        );

        let gpu = GpuContext::new(window.clone(), self.config.vsync)?;
        let renderer = SpriteRenderer::new(&gpu);
        let program = ShaderProgram::compile(
            &gpu,
            &renderer,
            &self.config.vertex_shader,
            &self.config.fragment_shader,
            &VertexAttribute::ALL,
        )?;

        let view_proj = program.uniform_location("view_proj")?;
        let time = program.uniform_location("time")?;
        let sampler = program.uniform_location("sprite_sampler")?;
        log::debug!("uniforms: view_proj {view_proj:?}, time {time:?}, sampler {sampler:?}");

        Ok(Graphics {
            window,
            gpu,
            renderer,
            program,
            view_proj,
            time,
        })
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        // Minimized windows report 0x0; keep the last usable projection.
        if width > 0 && height > 0 {
            self.ctx.camera.set_viewport(width, height);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.ctx.pacer.begin_frame();

        let dt = self.ctx.pacer.frame_time().as_secs_f32();
        self.game.update(&mut self.ctx, dt);
        self.ctx.input.clear_just();
        self.ctx.camera.update();

        if let Some(graphics) = &self.ctx.graphics {
            let queue = &graphics.gpu.queue;
            graphics
                .renderer
                .set_uniform_mat4(queue, graphics.view_proj, self.ctx.camera.transform());
            graphics
                .renderer
                .set_uniform_f32(queue, graphics.time, self.ctx.elapsed().as_secs_f32());
        }

        self.batch.begin(self.config.sort_mode);
        self.game.draw(&self.ctx, &mut self.batch);

        let ctx = &mut self.ctx;
        let Some(graphics) = ctx.graphics.as_mut() else {
            return;
        };

        self.batch.end(&mut GpuUpload {
            gpu: &graphics.gpu,
            renderer: &mut graphics.renderer,
        });

        let clear_color = self.config.clear_color;
        let result = render_frame(&graphics.gpu, |frame| {
            render_sprites_2d(
                frame,
                &graphics.renderer,
                &graphics.program,
                &self.batch,
                &ctx.textures,
                clear_color,
            );
        });

        match result {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                graphics.gpu.reconfigure();
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                self.fail(event_loop, RenderError::Gpu("out of GPU memory".into()));
                return;
            }
            Err(e) => {
                log::warn!("surface error: {e:?}");
            }
        }

        let fps = ctx.pacer.end_frame();
        ctx.frame_count += 1;
        if ctx.frame_count % FPS_LOG_INTERVAL == 0 {
            log::debug!(
                "{fps:.1} fps, {} quads in {} batches",
                self.batch.quad_count(),
                self.batch.batches().len()
            );
        }

        if ctx.exit_requested {
            log::info!("exit requested, leaving event loop");
            event_loop.exit();
            return;
        }

        graphics.window.request_redraw();
    }
}

impl<G: Game> ApplicationHandler for WinitApp<G> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.ctx.graphics.is_none() {
            match self.init_graphics(event_loop) {
                Ok(graphics) => {
                    let (width, height) = graphics.gpu.surface_size();
                    self.ctx.graphics = Some(graphics);
                    self.set_viewport(width, height);
                }
                Err(err) => {
                    self.fail(event_loop, err);
                    return;
                }
            }
        }

        // Run setup once.
        if !self.started {
            self.started = true;
            if let Err(err) = self.game.setup(&mut self.ctx) {
                self.fail(event_loop, err);
                return;
            }
        }

        if let Some(graphics) = &self.ctx.graphics {
            graphics.window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("window close requested, exiting");
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if let Some(graphics) = self.ctx.graphics.as_mut() {
                    graphics.gpu.resize(size.width, size.height);
                }
                self.set_viewport(size.width, size.height);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key_code) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => {
                            self.ctx.input.keys.press(key_code);
                            if key_code == KeyCode::Escape {
                                log::info!("escape pressed, exiting");
                                event_loop.exit();
                            }
                        }
                        ElementState::Released => self.ctx.input.keys.release(key_code),
                    }
                }
            }

            WindowEvent::MouseInput { button, state, .. } => match state {
                ElementState::Pressed => {
                    self.ctx.input.mouse.press(button);
                    if button == MouseButton::Left {
                        let world = self.ctx.cursor_world();
                        log::debug!("click at world ({:.1}, {:.1})", world.x, world.y);
                    }
                }
                ElementState::Released => self.ctx.input.mouse.release(button),
            },

            WindowEvent::CursorMoved { position, .. } => {
                self.ctx.input.cursor.x = position.x as f32;
                self.ctx.input.cursor.y = position.y as f32;
            }

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}
