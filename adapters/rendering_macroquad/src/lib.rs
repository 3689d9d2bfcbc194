#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Spire Defence.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature. Consumers that need sound playback can opt back
//! in by enabling `macroquad/audio` in their own `Cargo.toml` dependency
//! specification.

mod theme;

pub use theme::{Theme, ThemeError};

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{
    is_key_pressed, is_key_released, is_mouse_button_released, mouse_position, KeyCode,
    MouseButton,
};
use spire_defence_core::TowerKind;
use spire_defence_rendering::{
    visuals::{leveled_layer_colors, RangeRingStyle, SelectionOutline, TOWER_LAYER_FRACTIONS},
    Color, FrameInput, PlacementPreview, Presentation, RangeRingPresentation, RenderingBackend,
    Scene, SceneEnemy, SceneProjectile, SceneTower, TileGridPresentation,
};
use std::time::{Duration, Instant};

/// Snapshot of edge-triggered keyboard shortcuts observed during a single frame.
#[derive(Clone, Copy, Debug, Default)]
struct KeyboardShortcuts {
    /// `Q` or `Escape` to quit the game loop.
    quit_requested: bool,
    /// `U` released to upgrade the selected tower.
    upgrade_released: bool,
    /// `R` toggles range ring visibility.
    toggle_range: bool,
    /// `1` arms the pulse tower for placement.
    arm_pulse: bool,
    /// `2` arms the cannon tower for placement.
    arm_cannon: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
            upgrade_released: is_key_released(KeyCode::U),
            toggle_range: is_key_pressed(KeyCode::R),
            arm_pulse: is_key_pressed(KeyCode::Key1),
            arm_cannon: is_key_pressed(KeyCode::Key2),
        }
    }

    fn armed_kind(&self) -> Option<TowerKind> {
        if self.arm_pulse {
            Some(TowerKind::Pulse)
        } else if self.arm_cannon {
            Some(TowerKind::Cannon)
        } else {
            None
        }
    }
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    theme: Theme,
}

impl Default for MacroquadBackend {
    fn default() -> Self {
        Self {
            swap_interval: None,
            show_fps: false,
            theme: Theme::default(),
        }
    }
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend prints frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Replaces the theme used for window setup and drawing.
    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }
}

#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    simulation_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    avg_simulation: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns averages once one second elapsed.
    fn record_frame(
        &mut self,
        frame: Duration,
        simulation: Duration,
        render: Duration,
    ) -> Option<FpsMetrics> {
        self.elapsed += frame;
        self.frames = self.frames.saturating_add(1);
        self.simulation_accum += simulation;
        self.render_accum += render;

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames.max(1);
        let metrics = FpsMetrics {
            per_second: self.frames as f32 / seconds.max(f32::EPSILON),
            avg_simulation: self.simulation_accum / frames,
            avg_render: self.render_accum / frames,
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.simulation_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;

        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            theme,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: theme.window_width,
            window_height: theme.window_height,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();
                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let metrics = SceneMetrics::from_layout(&scene.tile_grid, screen_width, screen_height);
                let frame_input = gather_frame_input(&scene, &metrics, keyboard);

                let simulation_start = Instant::now();
                update_scene(frame_dt, frame_input, &mut scene);
                let simulation_elapsed = simulation_start.elapsed();

                // The closure may have reconfigured the grid; recompute the
                // layout before drawing.
                let metrics = SceneMetrics::from_layout(&scene.tile_grid, screen_width, screen_height);

                let render_start = Instant::now();
                draw_lane(&scene, &metrics, &theme);
                draw_tile_grid(&scene.tile_grid, &metrics);
                if let Some(ring) = scene.range_ring {
                    draw_range_ring(ring, &metrics);
                }
                draw_towers(&scene.towers, &scene.tile_grid, &metrics);
                if let Some(preview) = scene.placement_preview {
                    draw_placement_preview(preview, &scene.tile_grid, &metrics);
                }
                draw_enemies(&scene.enemies, &metrics, &theme);
                draw_projectiles(&scene.projectiles, &metrics);
                draw_hud(&scene, &theme);
                let render_elapsed = render_start.elapsed();

                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        avg_simulation,
                        avg_render,
                    }) = fps_counter.record_frame(frame_dt, simulation_elapsed, render_elapsed)
                    {
                        println!(
                            "FPS: {:.2} | sim: {:>6.2}ms render: {:>6.2}ms",
                            per_second,
                            avg_simulation.as_secs_f64() * 1_000.0,
                            avg_render.as_secs_f64() * 1_000.0,
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Letterboxed mapping between scene world units and screen pixels.
#[doc(hidden)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    tile_step: f32,
}

impl SceneMetrics {
    /// Computes the mapping that centers the grid inside the screen.
    #[must_use]
    pub fn from_layout(tile_grid: &TileGridPresentation, screen_width: f32, screen_height: f32) -> Self {
        let world_width = tile_grid.width();
        let world_height = tile_grid.height();

        let scale = if world_width <= f32::EPSILON || world_height <= f32::EPSILON {
            1.0
        } else {
            (screen_width / world_width).min(screen_height / world_height)
        };

        Self {
            scale,
            offset_x: (screen_width - world_width * scale) * 0.5,
            offset_y: (screen_height - world_height * scale) * 0.5,
            tile_step: tile_grid.tile_length * scale,
        }
    }

    fn world_to_screen(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            self.offset_x + position.x * self.scale,
            self.offset_y + position.y * self.scale,
        )
    }

    fn screen_to_world(&self, position: Vec2) -> Vec2 {
        Vec2::new(
            (position.x - self.offset_x) / self.scale,
            (position.y - self.offset_y) / self.scale,
        )
    }
}

fn gather_frame_input(scene: &Scene, metrics: &SceneMetrics, keyboard: KeyboardShortcuts) -> FrameInput {
    let (cursor_x, cursor_y) = mouse_position();
    gather_frame_input_from_observations(
        &scene.tile_grid,
        metrics,
        Vec2::new(cursor_x, cursor_y),
        is_mouse_button_released(MouseButton::Left),
        is_mouse_button_released(MouseButton::Right),
        keyboard.upgrade_released,
        keyboard.toggle_range,
        keyboard.armed_kind(),
    )
}

/// Maps raw cursor and button observations onto a [`FrameInput`].
///
/// Kept free of macroquad calls so input mapping stays testable.
#[doc(hidden)]
#[allow(clippy::too_many_arguments)]
#[must_use]
pub fn gather_frame_input_from_observations(
    tile_grid: &TileGridPresentation,
    metrics: &SceneMetrics,
    cursor_position: Vec2,
    confirm_released: bool,
    sell_released: bool,
    upgrade_released: bool,
    toggle_range_pressed: bool,
    arm_kind: Option<TowerKind>,
) -> FrameInput {
    let mut input = FrameInput {
        upgrade_released,
        toggle_range_pressed,
        arm_kind,
        ..FrameInput::default()
    };

    if metrics.scale <= f32::EPSILON {
        return input;
    }

    let world_position = metrics.screen_to_world(cursor_position);
    let inside = world_position.x >= 0.0
        && world_position.y >= 0.0
        && world_position.x < tile_grid.width()
        && world_position.y < tile_grid.height();

    if inside {
        input.cursor_world_space = Some(world_position);
        input.cursor_tile = tile_grid.world_to_tile(world_position);
        input.confirm_released = confirm_released;
        input.sell_released = sell_released;
    }

    input
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

fn draw_lane(scene: &Scene, metrics: &SceneMetrics, theme: &Theme) {
    let top_left = metrics.world_to_screen(Vec2::new(
        0.0,
        scene.lane.row as f32 * scene.tile_grid.tile_length,
    ));
    macroquad::shapes::draw_rectangle(
        top_left.x,
        top_left.y,
        scene.tile_grid.width() * metrics.scale,
        metrics.tile_step,
        to_macroquad_color(theme.lane_color),
    );
}

fn draw_tile_grid(tile_grid: &TileGridPresentation, metrics: &SceneMetrics) {
    let color = to_macroquad_color(tile_grid.line_color);
    let width_scaled = tile_grid.width() * metrics.scale;
    let height_scaled = tile_grid.height() * metrics.scale;

    for column in 0..=tile_grid.columns {
        let x = metrics.offset_x + column as f32 * metrics.tile_step;
        macroquad::shapes::draw_line(
            x,
            metrics.offset_y,
            x,
            metrics.offset_y + height_scaled,
            1.0,
            color,
        );
    }
    for row in 0..=tile_grid.rows {
        let y = metrics.offset_y + row as f32 * metrics.tile_step;
        macroquad::shapes::draw_line(
            metrics.offset_x,
            y,
            metrics.offset_x + width_scaled,
            y,
            1.0,
            color,
        );
    }
}

fn draw_range_ring(ring: RangeRingPresentation, metrics: &SceneMetrics) {
    let style = RangeRingStyle::default_style();
    let center = metrics.world_to_screen(ring.center);
    let radius = ring.radius * metrics.scale;

    macroquad::shapes::draw_circle(center.x, center.y, radius, to_macroquad_color(style.fill));
    macroquad::shapes::draw_circle_lines(
        center.x,
        center.y,
        radius,
        style.thickness * metrics.scale.max(0.5),
        to_macroquad_color(style.outline),
    );
}

fn draw_tower_layers(center: Vec2, colors: [Color; 3], tile_step: f32) {
    for (fraction, color) in TOWER_LAYER_FRACTIONS.iter().zip(colors) {
        let size = fraction * tile_step;
        macroquad::shapes::draw_rectangle(
            center.x - size * 0.5,
            center.y - size * 0.5,
            size,
            size,
            to_macroquad_color(color),
        );
    }
}

fn draw_towers(towers: &[SceneTower], tile_grid: &TileGridPresentation, metrics: &SceneMetrics) {
    for tower in towers {
        let center = metrics.world_to_screen(tile_grid.tile_center(tower.tile));
        draw_tower_layers(
            center,
            leveled_layer_colors(tower.kind, tower.level),
            metrics.tile_step,
        );

        if tower.selected {
            let style = SelectionOutline::default_style();
            let size = TOWER_LAYER_FRACTIONS[0] * metrics.tile_step;
            macroquad::shapes::draw_rectangle_lines(
                center.x - size * 0.5,
                center.y - size * 0.5,
                size,
                size,
                style.thickness * metrics.scale.max(0.5),
                to_macroquad_color(style.color),
            );
        }
    }
}

fn draw_placement_preview(
    preview: PlacementPreview,
    tile_grid: &TileGridPresentation,
    metrics: &SceneMetrics,
) {
    let center = metrics.world_to_screen(tile_grid.tile_center(preview.tile));
    let blocked_tint = Color::new(0.86, 0.2, 0.2, 0.6);

    let colors = leveled_layer_colors(preview.kind, 0).map(|color| {
        let color = if preview.placeable {
            color
        } else {
            Color::blend(color, blocked_tint)
        };
        color.with_alpha(0.45)
    });

    draw_tower_layers(center, colors, metrics.tile_step);
}

fn draw_enemies(enemies: &[SceneEnemy], metrics: &SceneMetrics, theme: &Theme) {
    let radius = metrics.tile_step * 0.3;
    let bar_width = metrics.tile_step * 0.6;
    let bar_height = (metrics.tile_step * 0.06).max(1.0);

    for enemy in enemies {
        let center = metrics.world_to_screen(enemy.position);
        macroquad::shapes::draw_circle(
            center.x,
            center.y,
            radius,
            to_macroquad_color(enemy.color),
        );

        if enemy.health_fraction < 1.0 {
            let fraction = enemy.health_fraction.clamp(0.0, 1.0);
            let left = center.x - bar_width * 0.5;
            let top = center.y - radius - bar_height * 2.0;
            macroquad::shapes::draw_rectangle(
                left,
                top,
                bar_width,
                bar_height,
                to_macroquad_color(Color::new(0.0, 0.0, 0.0, 0.35)),
            );
            macroquad::shapes::draw_rectangle(
                left,
                top,
                bar_width * fraction,
                bar_height,
                to_macroquad_color(theme.health_bar_color),
            );
        }
    }
}

fn draw_projectiles(projectiles: &[SceneProjectile], metrics: &SceneMetrics) {
    let radius = (metrics.tile_step * 0.08).max(1.5);
    let color = to_macroquad_color(Color::from_rgb_u8(0x20, 0x20, 0x20));

    for projectile in projectiles {
        let center = metrics.world_to_screen(projectile.position);
        macroquad::shapes::draw_circle(center.x, center.y, radius, color);
    }
}

fn draw_hud(scene: &Scene, theme: &Theme) {
    let color = to_macroquad_color(theme.text_color);
    let mut y = 24.0;

    macroquad::text::draw_text(&scene.hud.status_line(), 16.0, y, 24.0, color);

    if let Some(entry) = &scene.hud.selected {
        for line in entry.lines() {
            y += 22.0;
            macroquad::text::draw_text(&line, 16.0, y, 20.0, color);
        }
    }
}
