//! Sprites — a grid of batched quads over two generated textures.
//!
//! WASD pans the camera, Q/E zoom, left click logs the world position at
//! `debug`, Escape quits. Pass a JSON config path as the first argument to
//! override window size, frame cap, or sort mode:
//!
//! ```text
//! RUST_LOG=tessera=debug cargo run --example sprites -- sprites.json
//! ```

use std::path::Path;

use tessera::prelude::*;

const GRID: i32 = 12;
const CELL: f32 = 48.0;
const PAN_SPEED: f32 = 400.0;
const ZOOM_SPEED: f32 = 1.5;
const MIN_SCALE: f32 = 0.1;

fn main() {
    let config = match std::env::args().nth(1) {
        Some(path) => match AppConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                init_logger(&LoggingConfig::default());
                log::error!("{err}");
                std::process::exit(1);
            }
        },
        None => AppConfig {
            title: String::from("tessera — sprites"),
            ..AppConfig::default()
        },
    };

    if let Err(err) = App::new(config).run(Sprites::default()) {
        log::error!("{err}");
        std::process::exit(1);
    }
}

#[derive(Default)]
struct Sprites {
    checker: Option<Texture>,
    ring: Option<Texture>,
}

impl Game for Sprites {
    fn setup(&mut self, ctx: &mut Context) -> Result<(), RenderError> {
        let (checker, ring) = write_textures()?;
        self.checker = Some(ctx.load_texture(&checker)?);
        self.ring = Some(ctx.load_texture(&ring)?);

        // Loading the same path again is served from the cache.
        let again = ctx.load_texture(&checker)?;
        log::info!("checker handle {} reused: {}", again.handle.id(), Some(again) == self.checker);
        Ok(())
    }

    fn update(&mut self, ctx: &mut Context, dt: f32) {
        let keys = &ctx.input.keys;
        let mut pan = Vec2::ZERO;
        if keys.pressed(KeyCode::KeyW) {
            pan.y += 1.0;
        }
        if keys.pressed(KeyCode::KeyS) {
            pan.y -= 1.0;
        }
        if keys.pressed(KeyCode::KeyA) {
            pan.x -= 1.0;
        }
        if keys.pressed(KeyCode::KeyD) {
            pan.x += 1.0;
        }

        let mut scale = ctx.camera.scale();
        if keys.pressed(KeyCode::KeyQ) {
            scale *= 1.0 + ZOOM_SPEED * dt;
        }
        if keys.pressed(KeyCode::KeyE) {
            scale = (scale * (1.0 - ZOOM_SPEED * dt)).max(MIN_SCALE);
        }

        if pan != Vec2::ZERO {
            let position = ctx.camera.position() + pan * PAN_SPEED * dt / scale;
            ctx.camera.set_position(position);
        }
        if scale != ctx.camera.scale() {
            ctx.camera.set_scale(scale);
        }
    }

    fn draw(&mut self, ctx: &Context, batch: &mut SpriteBatch) {
        let (Some(checker), Some(ring)) = (self.checker, self.ring) else {
            return;
        };

        let pulse = (ctx.elapsed().as_secs_f32() * 2.0).sin() * 0.5 + 0.5;
        let half = GRID as f32 * CELL * 0.5;

        for row in 0..GRID {
            for col in 0..GRID {
                let texture = if (row + col) % 2 == 0 { checker } else { ring };
                let dest = Rect::new(
                    col as f32 * CELL - half,
                    row as f32 * CELL - half,
                    CELL * 0.9,
                    CELL * 0.9,
                );
                let depth = ((row * GRID + col) % 3) as f32;
                let tint = Color::rgba(
                    255,
                    (128.0 + 127.0 * pulse) as u8,
                    (255 * col / GRID) as u8,
                    255,
                );
                batch.draw(dest, Rect::FULL_UV, texture.handle, depth, tint);
            }
        }

        // One large sprite underneath, tiled via UVs past 1.0.
        let backdrop = Rect::new(-half - CELL, -half - CELL, half * 2.0 + CELL * 2.0, half * 2.0 + CELL * 2.0);
        batch.draw(backdrop, Rect::new(0.0, 0.0, 4.0, 4.0), checker.handle, -1.0, Color::rgba(80, 80, 120, 255));
    }
}

/// Generate the demo textures into the temp directory and return their paths.
fn write_textures() -> Result<(String, String), RenderError> {
    let dir = std::env::temp_dir();
    let checker_path = dir.join("tessera-checker.png");
    let ring_path = dir.join("tessera-ring.png");

    let checker = image::RgbaImage::from_fn(32, 32, |x, y| {
        if (x / 8 + y / 8) % 2 == 0 {
            image::Rgba([240, 240, 240, 255])
        } else {
            image::Rgba([60, 60, 60, 255])
        }
    });
    save(&checker, &checker_path)?;

    let ring = image::RgbaImage::from_fn(32, 32, |x, y| {
        let dx = x as f32 - 15.5;
        let dy = y as f32 - 15.5;
        let r = (dx * dx + dy * dy).sqrt();
        if (9.0..14.0).contains(&r) {
            image::Rgba([255, 200, 60, 255])
        } else {
            image::Rgba([0, 0, 0, 0])
        }
    });
    save(&ring, &ring_path)?;

    Ok((display(&checker_path), display(&ring_path)))
}

fn save(img: &image::RgbaImage, path: &Path) -> Result<(), RenderError> {
    img.save(path).map_err(|source| RenderError::ImageDecode {
        path: display(path),
        source,
    })
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
