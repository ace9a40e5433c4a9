//! Convenience re-exports. `use tessera::prelude::*` for the common items.

pub use crate::app::{App, Context, Game};
pub use crate::config::{AppConfig, WindowFlags};
pub use crate::error::RenderError;
pub use crate::input::{CursorPosition, Input, InputState, KeyCode, MouseButton};
pub use crate::logging::{LoggingConfig, init_logger};
pub use crate::math::{Mat4, Rect, Vec2, Vec3, Vec4};
pub use crate::render::ClearColor;
pub use crate::render2d::{Camera2d, Color, RenderBatch, SortMode, SpriteBatch, Texture, TextureHandle};
pub use crate::time::FramePacer;
