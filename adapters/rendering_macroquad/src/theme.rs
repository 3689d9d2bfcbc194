//! Window and palette configuration loaded from a TOML manifest.

use std::{fs, path::Path};

use serde::Deserialize;
use spire_defence_rendering::Color;
use thiserror::Error;

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

/// Errors raised while loading a theme manifest.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// The manifest file could not be read from disk.
    #[error("failed to read theme manifest from {path}")]
    Io {
        /// Path that failed to load.
        path: String,
        /// Underlying IO failure.
        #[source]
        source: std::io::Error,
    },
    /// The manifest contents were not valid TOML for the expected schema.
    #[error("failed to parse theme manifest")]
    Parse(#[from] toml::de::Error),
    /// The manifest declares a schema version this build does not understand.
    #[error("unsupported theme manifest version {version}, expected {SUPPORTED_MANIFEST_VERSION}")]
    UnsupportedVersion {
        /// Version found in the manifest.
        version: u32,
    },
}

/// Visual configuration for the macroquad backend.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    /// Initial window width in pixels.
    pub window_width: i32,
    /// Initial window height in pixels.
    pub window_height: i32,
    /// Color used to clear each frame.
    pub clear_color: Color,
    /// Color used for tile grid lines.
    pub grid_line_color: Color,
    /// Fill color of the enemy lane strip.
    pub lane_color: Color,
    /// Fill color of enemy health bars.
    pub health_bar_color: Color,
    /// Color of HUD text.
    pub text_color: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 800,
            clear_color: Color::from_rgb_u8(0xe8, 0xe3, 0xd4),
            grid_line_color: Color::from_rgb_u8(0xb8, 0xb2, 0xa0),
            lane_color: Color::from_rgb_u8(0xcf, 0xc5, 0xa8),
            health_bar_color: Color::from_rgb_u8(0x3f, 0xa3, 0x4d),
            text_color: Color::from_rgb_u8(0x28, 0x24, 0x1e),
        }
    }
}

impl Theme {
    /// Loads a theme manifest from the provided path.
    pub fn load(path: &Path) -> Result<Self, ThemeError> {
        let contents = fs::read_to_string(path).map_err(|source| ThemeError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_manifest_str(&contents)
    }

    /// Parses a theme manifest from TOML text.
    pub fn from_manifest_str(contents: &str) -> Result<Self, ThemeError> {
        let manifest: ThemeManifest = toml::from_str(contents)?;
        if manifest.version != SUPPORTED_MANIFEST_VERSION {
            return Err(ThemeError::UnsupportedVersion {
                version: manifest.version,
            });
        }

        let defaults = Theme::default();
        let window = manifest.window.unwrap_or_default();
        let palette = manifest.palette.unwrap_or_default();

        Ok(Self {
            window_width: window.width.unwrap_or(defaults.window_width),
            window_height: window.height.unwrap_or(defaults.window_height),
            clear_color: rgb_or(palette.clear, defaults.clear_color),
            grid_line_color: rgb_or(palette.grid_lines, defaults.grid_line_color),
            lane_color: rgb_or(palette.lane, defaults.lane_color),
            health_bar_color: rgb_or(palette.health_bar, defaults.health_bar_color),
            text_color: rgb_or(palette.text, defaults.text_color),
        })
    }
}

fn rgb_or(channel: Option<[u8; 3]>, fallback: Color) -> Color {
    channel
        .map(|[red, green, blue]| Color::from_rgb_u8(red, green, blue))
        .unwrap_or(fallback)
}

#[derive(Debug, Deserialize)]
struct ThemeManifest {
    version: u32,
    window: Option<WindowSection>,
    palette: Option<PaletteSection>,
}

#[derive(Debug, Default, Deserialize)]
struct WindowSection {
    width: Option<i32>,
    height: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
struct PaletteSection {
    clear: Option<[u8; 3]>,
    grid_lines: Option<[u8; 3]>,
    lane: Option<[u8; 3]>,
    health_bar: Option<[u8; 3]>,
    text: Option<[u8; 3]>,
}
