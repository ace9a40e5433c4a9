//! App entry point and the [`Game`] trait.
//!
//! [`App`] owns the configuration and runs the winit event loop. User code
//! implements [`Game`]; the driver calls it once for setup after the window
//! and GPU exist, then twice per frame:
//!
//! ```text
//! per frame
//!   pacer.begin_frame
//!   game.update(ctx, dt) ── move the camera, react to input
//!   camera.update ───────── recompute the transform if it moved
//!   batch.begin(sort_mode)
//!   game.draw(ctx, batch) ─ submit sprites
//!   batch.end ───────────── sort, merge, upload
//!   render pass ─────────── batch.render_batch
//!   present, pacer.end_frame
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use tessera::prelude::*;
//!
//! struct Demo { player: Option<Texture> }
//!
//! impl Game for Demo {
//!     fn setup(&mut self, ctx: &mut Context) -> Result<(), RenderError> {
//!         self.player = Some(ctx.load_texture("assets/player.png")?);
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, ctx: &mut Context, dt: f32) {
//!         if ctx.input.keys.pressed(KeyCode::KeyD) {
//!             let p = ctx.camera.position();
//!             ctx.camera.set_position(p + Vec2::new(200.0 * dt, 0.0));
//!         }
//!     }
//!
//!     fn draw(&mut self, _ctx: &Context, batch: &mut SpriteBatch) {
//!         if let Some(tex) = self.player {
//!             let dest = Rect::new(0.0, 0.0, 64.0, 64.0);
//!             batch.draw(dest, Rect::FULL_UV, tex.handle, 0.0, Color::WHITE);
//!         }
//!     }
//! }
//!
//! fn main() -> Result<(), RenderError> {
//!     App::new(AppConfig::default()).run(Demo { player: None })
//! }
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant};

use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::Window;

use crate::config::AppConfig;
use crate::error::RenderError;
use crate::input::InputState;
use crate::logging::init_logger;
use crate::math::Vec2;
use crate::render::GpuContext;
use crate::render2d::{
    Camera2d, FileDecoder, GpuTexture, ShaderProgram, SpriteBatch, SpriteRenderer, Texture,
    TextureCache, TextureHandle, UniformLocation,
};
use crate::render2d::texture::GpuTextureUploader;
use crate::time::FramePacer;
use crate::window::WinitApp;

/// A game driven by [`App::run`].
pub trait Game {
    /// Called once the window and GPU are ready. Load textures here.
    fn setup(&mut self, ctx: &mut Context) -> Result<(), RenderError> {
        let _ = ctx;
        Ok(())
    }

    /// Advance the simulation by `dt` seconds.
    fn update(&mut self, ctx: &mut Context, dt: f32);

    /// Submit this frame's sprites. The batch is already inside `begin`.
    fn draw(&mut self, ctx: &Context, batch: &mut SpriteBatch);
}

/// GPU objects that exist only while a window is open.
pub(crate) struct Graphics {
    pub window: Arc<Window>,
    pub gpu: GpuContext,
    pub renderer: SpriteRenderer,
    pub program: ShaderProgram,
    pub view_proj: UniformLocation,
    pub time: UniformLocation,
}

/// Everything a [`Game`] can see and touch.
pub struct Context {
    pub camera: Camera2d,
    pub input: InputState,
    pub(crate) textures: TextureCache<GpuTexture>,
    pub(crate) graphics: Option<Graphics>,
    pub(crate) pacer: FramePacer,
    pub(crate) started: Instant,
    pub(crate) frame_count: u64,
    pub(crate) exit_requested: bool,
}

impl Context {
    pub(crate) fn new(config: &AppConfig) -> Self {
        Self {
            camera: Camera2d::new(config.width, config.height),
            input: InputState::new(),
            textures: TextureCache::new(),
            graphics: None,
            pacer: FramePacer::new(config.max_fps),
            started: Instant::now(),
            frame_count: 0,
            exit_requested: false,
        }
    }

    /// Load a texture from disk, or return the cached one for `path`.
    ///
    /// Fails before the window exists, i.e. outside [`Game::setup`] and later.
    pub fn load_texture(&mut self, path: &str) -> Result<Texture, RenderError> {
        let graphics = self.graphics.as_ref().ok_or_else(|| {
            RenderError::Gpu(format!("cannot load '{path}' before the GPU is initialized"))
        })?;
        let mut uploader = GpuTextureUploader {
            gpu: &graphics.gpu,
            renderer: &graphics.renderer,
        };
        self.textures.get(path, &mut FileDecoder, &mut uploader)
    }

    /// Size and handle of an already-loaded texture.
    pub fn texture(&self, handle: TextureHandle) -> Option<Texture> {
        self.textures.texture(handle)
    }

    /// Smoothed frames per second.
    pub fn fps(&self) -> f32 {
        self.pacer.fps()
    }

    /// Duration of the previous frame.
    pub fn frame_time(&self) -> Duration {
        self.pacer.frame_time()
    }

    /// Time since the app started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The cursor in world coordinates, through the camera's current transform.
    pub fn cursor_world(&self) -> Vec2 {
        let (_, height) = self.camera.viewport();
        self.camera.screen_to_world(self.input.cursor.to_screen(height))
    }

    /// Leave the event loop after the current frame.
    pub fn exit(&mut self) {
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }
}

/// The app runner. Configure, then call [`run()`](App::run).
pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Run the event loop until the game exits.
    ///
    /// Returns the first fatal error: window or GPU creation, shader
    /// compilation, or anything [`Game::setup`] returns.
    pub fn run<G: Game>(self, game: G) -> Result<(), RenderError> {
        init_logger(&self.config.logging);

        let event_loop = EventLoop::new().map_err(|e| RenderError::Window(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = WinitApp::new(self.config, game);
        event_loop
            .run_app(&mut app)
            .map_err(|e| RenderError::Window(e.to_string()))?;

        app.finish()
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}
