//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. [`Rect`] is the axis-aligned rectangle used for
//! both sprite destinations (world units) and texture sub-regions (UV space).

pub use glam::{Mat4, Vec2, Vec3, Vec4};

/// An axis-aligned rectangle given by its bottom-left corner and size.
///
/// The same type describes where a sprite lands in the world and which part
/// of its texture it samples. In UV space, `(0, 0, 1, 1)` is the whole image.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// The full texture, (0,0) to (1,1).
    pub const FULL_UV: Self = Self {
        x: 0.0,
        y: 0.0,
        w: 1.0,
        h: 1.0,
    };

    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Build a rectangle of the given size centered on `center`.
    pub fn centered(center: Vec2, size: Vec2) -> Self {
        let min = center - size * 0.5;
        Self::new(min.x, min.y, size.x, size.y)
    }

    /// Build a UV rectangle from pixel coordinates and texture dimensions.
    pub fn from_pixels(x: f32, y: f32, w: f32, h: f32, tex_w: f32, tex_h: f32) -> Self {
        Self::new(x / tex_w, y / tex_h, w / tex_w, h / tex_h)
    }

    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn max(&self) -> Vec2 {
        Vec2::new(self.x + self.w, self.y + self.h)
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::FULL_UV
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_is_symmetric() {
        let r = Rect::centered(Vec2::new(10.0, 20.0), Vec2::new(4.0, 6.0));
        assert_eq!(r.min(), Vec2::new(8.0, 17.0));
        assert_eq!(r.max(), Vec2::new(12.0, 23.0));
    }

    #[test]
    fn from_pixels_normalizes() {
        let r = Rect::from_pixels(16.0, 0.0, 16.0, 32.0, 64.0, 32.0);
        assert_eq!(r, Rect::new(0.25, 0.0, 0.25, 1.0));
    }
}
