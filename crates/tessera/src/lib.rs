//! # Tessera — Minimal 2D Sprite Engine
//!
//! A small 2D renderer built on wgpu and winit. Sprites are submitted as
//! textured quads to a [`SpriteBatch`](render2d::SpriteBatch), which sorts
//! them, merges runs that share a texture, and draws each run with a single
//! GPU command. A [`Camera2d`](render2d::Camera2d) maps world units to the
//! screen and a [`FramePacer`](time::FramePacer) caps the frame rate.
//!
//! Start with `use tessera::prelude::*`, implement [`Game`](app::Game), and
//! hand it to [`App::run`](app::App::run).

pub mod app;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod math;
pub mod prelude;
pub mod render;
pub mod render2d;
pub mod time;
pub(crate) mod window;
