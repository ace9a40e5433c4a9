//! # Camera2d — World-to-Screen Transform
//!
//! The camera maps world units onto the output surface: a translation that
//! puts [`position`](Camera2d::position) at the center of the viewport, a
//! uniform zoom, and an orthographic projection into clip space.
//!
//! ```text
//!  world p ──► p − position ──► × scale ──► + viewport/2 ──► ortho(0..w, 0..h) ──► clip
//!              └────────────── screen pixels (origin bottom-left, Y up) ───────┘
//! ```
//!
//! ## Lazy Recomputation
//!
//! Setters only record the new value and mark the transform
//! [`Dirty`](TransformState::Dirty). [`update`](Camera2d::update) rebuilds the
//! matrix once and marks it clean; further calls do nothing until the next
//! setter. The projection part is rebuilt only by
//! [`set_viewport`](Camera2d::set_viewport).
//!
//! ## Screen Space
//!
//! Screen coordinates here are pixels with the origin at the bottom-left.
//! Window systems report the cursor from the top-left, so the driver flips Y
//! before calling [`screen_to_world`](Camera2d::screen_to_world).

use glam::{Mat4, Vec2, Vec3};

/// Whether the cached transform reflects the current camera parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformState {
    Clean,
    Dirty,
}

/// A 2D camera: position, zoom, and viewport.
#[derive(Debug, Clone)]
pub struct Camera2d {
    position: Vec2,
    scale: f32,
    viewport: (u32, u32),
    projection: Mat4,
    transform: Mat4,
    state: TransformState,
    recomputes: u64,
}

impl Camera2d {
    /// Create a camera for a viewport of `width` × `height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        let mut camera = Self::default();
        camera.set_viewport(width, height);
        camera
    }

    /// Set the output size and rebuild the projection.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
        self.projection =
            Mat4::orthographic_rh(0.0, width as f32, 0.0, height as f32, -1.0, 1.0);
        self.state = TransformState::Dirty;
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.state = TransformState::Dirty;
    }

    /// Set the zoom factor. Must be positive; callers clamp.
    pub fn set_scale(&mut self, scale: f32) {
        debug_assert!(scale > 0.0, "camera scale must be positive, got {scale}");
        self.scale = scale;
        self.state = TransformState::Dirty;
    }

    /// Rebuild the transform if any parameter changed since the last call.
    pub fn update(&mut self) {
        if self.state == TransformState::Clean {
            return;
        }

        let center = Vec3::new(self.half_viewport().x, self.half_viewport().y, 0.0);
        self.transform = self.projection
            * Mat4::from_translation(center)
            * Mat4::from_scale(Vec3::new(self.scale, self.scale, 1.0))
            * Mat4::from_translation(Vec3::new(-self.position.x, -self.position.y, 0.0));

        self.state = TransformState::Clean;
        self.recomputes += 1;
    }

    /// The view-projection matrix as of the last [`update`](Self::update).
    pub fn transform(&self) -> Mat4 {
        self.transform
    }

    /// Map a screen point (pixels, origin bottom-left) to world space.
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.half_viewport()) / self.scale + self.position
    }

    /// Map a world point to screen pixels (origin bottom-left).
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.position) * self.scale + self.half_viewport()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn state(&self) -> TransformState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state == TransformState::Dirty
    }

    /// How many times [`update`](Self::update) actually rebuilt the matrix.
    pub fn recompute_count(&self) -> u64 {
        self.recomputes
    }

    fn half_viewport(&self) -> Vec2 {
        Vec2::new(self.viewport.0 as f32, self.viewport.1 as f32) * 0.5
    }
}

impl Default for Camera2d {
    fn default() -> Self {
        let viewport = (500, 500);
        Self {
            position: Vec2::ZERO,
            scale: 1.0,
            viewport,
            projection: Mat4::orthographic_rh(
                0.0,
                viewport.0 as f32,
                0.0,
                viewport.1 as f32,
                -1.0,
                1.0,
            ),
            transform: Mat4::IDENTITY,
            state: TransformState::Dirty,
            recomputes: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Push a world point through the matrix and convert clip space back to
    /// screen pixels.
    fn project(camera: &Camera2d, world: Vec2) -> Vec2 {
        let clip = camera.transform().project_point3(Vec3::new(world.x, world.y, 0.0));
        let (w, h) = camera.viewport();
        Vec2::new((clip.x + 1.0) * 0.5 * w as f32, (clip.y + 1.0) * 0.5 * h as f32)
    }

    fn moved_camera() -> Camera2d {
        let mut camera = Camera2d::new(1024, 768);
        camera.set_position(Vec2::new(150.0, -40.0));
        camera.set_scale(2.5);
        camera.update();
        camera
    }

    #[test]
    fn camera_position_lands_at_viewport_center() {
        let camera = moved_camera();
        let screen = project(&camera, Vec2::new(150.0, -40.0));
        assert_relative_eq!(screen.x, 512.0, epsilon = 1e-3);
        assert_relative_eq!(screen.y, 384.0, epsilon = 1e-3);
    }

    #[test]
    fn matrix_agrees_with_world_to_screen() {
        let camera = moved_camera();
        for p in [Vec2::ZERO, Vec2::new(300.0, 200.0), Vec2::new(-75.5, 12.25)] {
            let via_matrix = project(&camera, p);
            let direct = camera.world_to_screen(p);
            assert_relative_eq!(via_matrix.x, direct.x, epsilon = 1e-2);
            assert_relative_eq!(via_matrix.y, direct.y, epsilon = 1e-2);
        }
    }

    #[test]
    fn screen_to_world_inverts_world_to_screen() {
        let mut camera = Camera2d::new(800, 600);
        for (pos, scale) in [
            (Vec2::ZERO, 1.0),
            (Vec2::new(-320.0, 45.0), 0.25),
            (Vec2::new(1000.0, 1000.0), 4.0),
        ] {
            camera.set_position(pos);
            camera.set_scale(scale);
            camera.update();
            for p in [Vec2::new(0.0, 0.0), Vec2::new(12.5, -99.0), Vec2::new(640.0, 480.0)] {
                let back = camera.screen_to_world(camera.world_to_screen(p));
                assert_relative_eq!(back.x, p.x, epsilon = 1e-3);
                assert_relative_eq!(back.y, p.y, epsilon = 1e-3);
            }
        }
    }

    #[test]
    fn screen_center_maps_to_camera_position() {
        let mut camera = Camera2d::new(800, 600);
        camera.set_position(Vec2::new(5.0, 7.0));
        camera.set_scale(3.0);
        assert_eq!(camera.screen_to_world(Vec2::new(400.0, 300.0)), Vec2::new(5.0, 7.0));
        assert_eq!(camera.screen_to_world(Vec2::new(430.0, 300.0)), Vec2::new(15.0, 7.0));
    }

    #[test]
    fn update_is_lazy() {
        let mut camera = Camera2d::new(640, 480);
        assert!(camera.is_dirty());

        camera.update();
        let first = camera.transform();
        assert_eq!(camera.state(), TransformState::Clean);
        assert_eq!(camera.recompute_count(), 1);

        camera.update();
        assert_eq!(camera.recompute_count(), 1);
        assert_eq!(
            camera.transform().to_cols_array().map(f32::to_bits),
            first.to_cols_array().map(f32::to_bits)
        );
    }

    #[test]
    fn every_setter_marks_dirty() {
        let mut camera = Camera2d::new(640, 480);
        camera.update();

        camera.set_position(Vec2::new(1.0, 2.0));
        assert!(camera.is_dirty());
        camera.update();

        camera.set_scale(0.5);
        assert!(camera.is_dirty());
        camera.update();

        camera.set_viewport(320, 240);
        assert!(camera.is_dirty());
        camera.update();

        assert_eq!(camera.recompute_count(), 4);
        assert!(!camera.is_dirty());
    }

    #[test]
    fn viewport_change_rebuilds_projection() {
        let mut camera = Camera2d::new(640, 480);
        camera.update();
        camera.set_viewport(1280, 720);
        camera.update();
        let screen = project(&camera, Vec2::ZERO);
        assert_relative_eq!(screen.x, 640.0, epsilon = 1e-3);
        assert_relative_eq!(screen.y, 360.0, epsilon = 1e-3);
    }
}
