#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Spire Defence adapters.

pub mod hud;
pub mod visuals;

use anyhow::Result as AnyResult;
use glam::Vec2;
use spire_defence_core::{EnemyId, ProjectileId, TileCoord, TowerId, TowerKind};
use std::{error::Error, fmt, time::Duration};

use hud::HudModel;

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with a replaced alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }

    /// Returns a new color lightened towards white by the provided amount.
    #[must_use]
    pub fn lighten(self, amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);

        Self {
            red: lighten_channel(self.red, amount),
            green: lighten_channel(self.green, amount),
            blue: lighten_channel(self.blue, amount),
            alpha: self.alpha,
        }
    }

    /// Blends an overlay onto a base color weighted by the overlay's alpha.
    ///
    /// The base alpha is preserved; only the color channels move toward the
    /// overlay. A fully opaque overlay replaces the base color, a fully
    /// transparent one leaves it untouched.
    #[must_use]
    pub fn blend(base: Color, overlay: Color) -> Color {
        let weight = overlay.alpha.clamp(0.0, 1.0);

        Color {
            red: base.red + (overlay.red - base.red) * weight,
            green: base.green + (overlay.green - base.green) * weight,
            blue: base.blue + (overlay.blue - base.blue) * weight,
            alpha: base.alpha,
        }
    }
}

fn lighten_channel(channel: f32, amount: f32) -> f32 {
    channel + (1.0 - channel) * amount
}

/// Describes a square tile grid that can be rendered by adapters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileGridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single tile expressed in world units.
    pub tile_length: f32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
}

impl TileGridPresentation {
    /// Creates a new tile grid descriptor.
    ///
    /// Returns an error when `tile_length` is not positive.
    pub fn new(
        columns: u32,
        rows: u32,
        tile_length: f32,
        line_color: Color,
    ) -> std::result::Result<Self, RenderingError> {
        if tile_length <= 0.0 {
            return Err(RenderingError::InvalidTileLength { tile_length });
        }

        Ok(Self {
            columns,
            rows,
            tile_length,
            line_color,
        })
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns as f32 * self.tile_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows as f32 * self.tile_length
    }

    /// World-space center of the provided tile.
    #[must_use]
    pub fn tile_center(&self, tile: TileCoord) -> Vec2 {
        Vec2::new(
            (tile.column() as f32 + 0.5) * self.tile_length,
            (tile.row() as f32 + 0.5) * self.tile_length,
        )
    }

    /// Converts a world-space position into the tile that contains it.
    ///
    /// Mirrors the authoritative grid's floor semantics: `None` outside the
    /// grid, including negative coordinates.
    #[must_use]
    pub fn world_to_tile(&self, position: Vec2) -> Option<TileCoord> {
        if position.x < 0.0 || position.y < 0.0 {
            return None;
        }

        let column = (position.x / self.tile_length).floor();
        let row = (position.y / self.tile_length).floor();
        if column >= self.columns as f32 || row >= self.rows as f32 {
            return None;
        }

        Some(TileCoord::new(column as u32, row as u32))
    }

    /// Clamps a world-space position to the grid bounds.
    #[must_use]
    pub fn clamp_world_position(&self, position: Vec2) -> Vec2 {
        if self.columns == 0 || self.rows == 0 {
            return Vec2::ZERO;
        }

        Vec2::new(
            position.x.clamp(0.0, self.width()),
            position.y.clamp(0.0, self.height()),
        )
    }
}

/// Describes the enemy lane strip rendered across the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LanePresentation {
    /// Grid row the lane occupies.
    pub row: u32,
    /// Fill color of the lane strip.
    pub color: Color,
}

impl LanePresentation {
    /// Creates a new lane descriptor.
    #[must_use]
    pub const fn new(row: u32, color: Color) -> Self {
        Self { row, color }
    }
}

/// Immutable snapshot describing a tower placed within the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneTower {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Kind of tower placed at the associated tile.
    pub kind: TowerKind,
    /// Level the tower stands at.
    pub level: u8,
    /// Tile hosting the tower.
    pub tile: TileCoord,
    /// Whether the tower is currently selected.
    pub selected: bool,
}

impl SceneTower {
    /// Creates a new scene tower descriptor.
    #[must_use]
    pub const fn new(id: TowerId, kind: TowerKind, level: u8, tile: TileCoord, selected: bool) -> Self {
        Self {
            id,
            kind,
            level,
            tile,
            selected,
        }
    }
}

/// Enemy rendered as a filled circle at an interpolated world position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneEnemy {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Interpolated world-space position for this frame.
    pub position: Vec2,
    /// Body fill color.
    pub color: Color,
    /// Remaining health as a fraction of spawn health, in 0.0..=1.0.
    pub health_fraction: f32,
}

/// Projectile rendered as a small filled circle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneProjectile {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Interpolated world-space position for this frame.
    pub position: Vec2,
}

/// Translucent range disc anchored on a tower.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangeRingPresentation {
    /// World-space center of the disc.
    pub center: Vec2,
    /// Radius of the disc in world units.
    pub radius: f32,
}

/// Ghost preview of the tower that would be placed at the hovered tile.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementPreview {
    /// Kind of tower armed for placement.
    pub kind: TowerKind,
    /// Tile the preview is anchored on.
    pub tile: TileCoord,
    /// Whether the world would accept the placement.
    pub placeable: bool,
}

/// Input snapshot gathered by adapters before updating the scene.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Cursor position in world units, when the cursor is over the grid.
    pub cursor_world_space: Option<Vec2>,
    /// Tile under the cursor, when the cursor is over the grid.
    pub cursor_tile: Option<TileCoord>,
    /// Left button released this frame: place or select.
    pub confirm_released: bool,
    /// Right button released this frame: sell the hovered or selected tower.
    pub sell_released: bool,
    /// Upgrade key released this frame.
    pub upgrade_released: bool,
    /// Range-ring visibility toggle pressed this frame.
    pub toggle_range_pressed: bool,
    /// Tower kind hotkey pressed this frame, if any.
    pub arm_kind: Option<TowerKind>,
}

/// Scene description combining the battlefield and HUD for one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Tile grid that composes the play area.
    pub tile_grid: TileGridPresentation,
    /// Lane strip the enemies march along.
    pub lane: LanePresentation,
    /// Towers currently standing on the battlefield.
    pub towers: Vec<SceneTower>,
    /// Enemies currently visible, at interpolated positions.
    pub enemies: Vec<SceneEnemy>,
    /// Projectiles currently in flight, at interpolated positions.
    pub projectiles: Vec<SceneProjectile>,
    /// Range disc for the selected or hovered tower, if visible.
    pub range_ring: Option<RangeRingPresentation>,
    /// Ghost preview for the armed tower kind at the hovered tile.
    pub placement_preview: Option<PlacementPreview>,
    /// HUD readout for the frame.
    pub hud: HudModel,
}

impl Scene {
    /// Creates a scene with no inhabitants on the provided grid.
    #[must_use]
    pub fn empty(tile_grid: TileGridPresentation, lane: LanePresentation) -> Self {
        Self {
            tile_grid,
            lane,
            towers: Vec::new(),
            enemies: Vec::new(),
            projectiles: Vec::new(),
            range_ring: None,
            placement_preview: None,
            hud: HudModel::default(),
        }
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Spire Defence scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta and the
    /// per-frame input captured by the adapter, and may mutate the scene
    /// before it is rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// Tile length must be positive to avoid a zero-sized grid.
    InvalidTileLength {
        /// Provided tile length that failed validation.
        tile_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTileLength { tile_length } => {
                write!(f, "tile_length must be positive (received {tile_length})")
            }
        }
    }
}

impl Error for RenderingError {}
