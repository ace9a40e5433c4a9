//! Keyboard and mouse input state.
//!
//! [`InputState`] bundles an [`Input`] set for keys, another for mouse
//! buttons, and the cursor position. The window event handler feeds it;
//! games read it from [`Context`](crate::app::Context) during `update`.
//!
//! Per-frame edges (`just_pressed`, `just_released`) are cleared once the
//! game has seen them, after `update` and before the next frame's events.

use std::collections::HashSet;
use std::hash::Hash;

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;

use crate::math::Vec2;

/// Tracks the state of a set of inputs (keys or mouse buttons).
///
/// - `pressed`: currently held down
/// - `just_pressed`: pressed this frame (not held last frame)
/// - `just_released`: released this frame
#[derive(Debug, Clone)]
pub struct Input<T: Eq + Hash + Copy> {
    pressed: HashSet<T>,
    just_pressed: HashSet<T>,
    just_released: HashSet<T>,
}

impl<T: Eq + Hash + Copy> Input<T> {
    pub fn new() -> Self {
        Self {
            pressed: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    /// Returns `true` if the input is currently held down.
    pub fn pressed(&self, input: T) -> bool {
        self.pressed.contains(&input)
    }

    /// Returns `true` if the input was pressed this frame.
    pub fn just_pressed(&self, input: T) -> bool {
        self.just_pressed.contains(&input)
    }

    /// Returns `true` if the input was released this frame.
    pub fn just_released(&self, input: T) -> bool {
        self.just_released.contains(&input)
    }

    /// Returns `true` if any of `inputs` is held down.
    pub fn any_pressed(&self, inputs: impl IntoIterator<Item = T>) -> bool {
        inputs.into_iter().any(|input| self.pressed(input))
    }

    /// Key repeat arrives as repeated presses; only the first one counts.
    pub(crate) fn press(&mut self, input: T) {
        if self.pressed.insert(input) {
            self.just_pressed.insert(input);
        }
    }

    pub(crate) fn release(&mut self, input: T) {
        if self.pressed.remove(&input) {
            self.just_released.insert(input);
        }
    }

    pub(crate) fn clear_just(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl<T: Eq + Hash + Copy> Default for Input<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Mouse cursor position in window pixels, origin top-left, Y down.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorPosition {
    pub x: f32,
    pub y: f32,
}

impl CursorPosition {
    /// The same point with Y flipped to a bottom-left origin, which is the
    /// screen space [`Camera2d::screen_to_world`](crate::render2d::Camera2d::screen_to_world)
    /// expects.
    pub fn to_screen(self, window_height: u32) -> Vec2 {
        Vec2::new(self.x, window_height as f32 - self.y)
    }
}

/// Everything the game can ask about input this frame.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub keys: Input<KeyCode>,
    pub mouse: Input<MouseButton>,
    pub cursor: CursorPosition,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear_just(&mut self) {
        self.keys.clear_just();
        self.mouse.clear_just();
    }
}
