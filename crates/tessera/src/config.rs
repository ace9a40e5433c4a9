//! Application configuration.
//!
//! [`AppConfig`] collects everything the driver needs before the first
//! frame: window settings, the frame cap, the sprite sort mode, which shader
//! files to compile, and logger filters. Every field has a default, so a
//! config file only needs the keys it changes:
//!
//! ```json
//! {
//!   "title": "sprites",
//!   "width": 1024,
//!   "height": 768,
//!   "max_fps": 144,
//!   "sort_mode": "back_to_front",
//!   "logging": { "filter": "tessera=debug,wgpu=warn" }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use crate::logging::LoggingConfig;
use crate::render::ClearColor;
use crate::render2d::SortMode;

/// Window creation flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowFlags {
    pub hidden: bool,
    pub fullscreen: bool,
    pub borderless: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub window: WindowFlags,
    pub vsync: bool,
    /// Frame cap enforced by sleeping. Zero or negative disables the cap.
    pub max_fps: f32,
    pub clear_color: ClearColor,
    pub sort_mode: SortMode,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: String::from("tessera"),
            width: 1024,
            height: 768,
            window: WindowFlags::default(),
            vsync: false,
            max_fps: 60.0,
            clear_color: ClearColor::default(),
            sort_mode: SortMode::default(),
            vertex_shader: PathBuf::from(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/shaders/sprite.vert.wgsl"
            )),
            fragment_shader: PathBuf::from(concat!(
                env!("CARGO_MANIFEST_DIR"),
                "/shaders/sprite.frag.wgsl"
            )),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| RenderError::Config {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        Self::parse(path, &text)
    }

    /// Parse a config from a JSON string.
    pub fn from_json_str(text: &str) -> Result<Self, RenderError> {
        Self::parse(Path::new("<inline>"), text)
    }

    fn parse(path: &Path, text: &str) -> Result<Self, RenderError> {
        let config: Self = serde_json::from_str(text).map_err(|e| RenderError::Config {
            path: path.to_owned(),
            reason: e.to_string(),
        })?;
        if config.width == 0 || config.height == 0 {
            return Err(RenderError::Config {
                path: path.to_owned(),
                reason: format!("window size {}x{} is empty", config.width, config.height),
            });
        }
        Ok(config)
    }
}
