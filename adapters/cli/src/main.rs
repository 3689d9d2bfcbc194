#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Spire Defence experience.

mod session;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use spire_defence_core::Gold;
use spire_defence_rendering::{
    LanePresentation, Presentation, RenderingBackend, Scene, TileGridPresentation,
};
use spire_defence_rendering_macroquad::{MacroquadBackend, Theme};

use session::{Session, SessionConfig};

/// Command-line options for the Spire Defence session.
#[derive(Debug, Parser)]
#[command(name = "spire-defence", about = "2D tower defence on a tile grid")]
struct Args {
    /// Number of tile columns in the battlefield grid.
    #[arg(long, default_value_t = 12)]
    columns: u32,

    /// Number of tile rows in the battlefield grid.
    #[arg(long, default_value_t = 8)]
    rows: u32,

    /// Side length of a single tile in world units.
    #[arg(long, default_value_t = 100.0)]
    tile_length: f32,

    /// Gold available at session start.
    #[arg(long, default_value_t = 200)]
    starting_gold: u32,

    /// Lives available before the session is lost.
    #[arg(long, default_value_t = 10)]
    starting_lives: u32,

    /// Milliseconds between enemy spawns.
    #[arg(long, default_value_t = 2_000)]
    spawn_interval_ms: u64,

    /// Seed for the spawn jitter stream.
    #[arg(long, default_value_t = 0x5d1e_7a0b)]
    spawn_seed: u64,

    /// Let towers shoot enemies that are already covered by shots in flight.
    #[arg(long)]
    allow_overkill: bool,

    /// Render as fast as possible instead of syncing to the display.
    #[arg(long)]
    no_vsync: bool,

    /// Print frame timing metrics once per second.
    #[arg(long)]
    show_fps: bool,

    /// Path to a TOML theme manifest overriding the built-in palette.
    #[arg(long)]
    theme: Option<PathBuf>,
}

/// Entry point for the Spire Defence command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();

    let theme = match &args.theme {
        Some(path) => Theme::load(path)
            .with_context(|| format!("failed to load theme manifest {}", path.display()))?,
        None => Theme::default(),
    };

    let mut session = Session::new(SessionConfig {
        columns: args.columns,
        rows: args.rows,
        tile_length: args.tile_length,
        starting_gold: Gold::new(args.starting_gold),
        starting_lives: args.starting_lives,
        spawn_interval: Duration::from_millis(args.spawn_interval_ms),
        spawn_seed: args.spawn_seed,
        avoid_overkill: !args.allow_overkill,
    });

    let tile_grid = TileGridPresentation::new(
        args.columns,
        args.rows,
        args.tile_length,
        theme.grid_line_color,
    )
    .context("invalid battlefield grid configuration")?;
    let lane = LanePresentation::new(session.lane_row(), theme.lane_color);
    let scene = Scene::empty(tile_grid, lane);

    println!("{}", session.banner());

    let backend = MacroquadBackend::new()
        .with_vsync(!args.no_vsync)
        .with_show_fps(args.show_fps)
        .with_theme(theme);

    backend.run(
        Presentation::new("Spire Defence", theme.clear_color, scene),
        move |frame_dt, frame_input, scene| {
            session.handle_input(&frame_input);
            session.advance(frame_dt);
            session.populate_scene(scene);
        },
    )
}
