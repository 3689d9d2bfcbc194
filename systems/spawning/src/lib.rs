#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for emitting enemy spawn commands.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use spire_defence_core::{Command, EnemyColor, Event};

const SPAWN_COLORS: [EnemyColor; 4] = [
    EnemyColor::from_rgb(0x2f, 0x95, 0x32),
    EnemyColor::from_rgb(0xc8, 0x2a, 0x36),
    EnemyColor::from_rgb(0xff, 0xc1, 0x07),
    EnemyColor::from_rgb(0x58, 0x47, 0xff),
];

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    spawn_interval: Duration,
    rng_seed: u64,
    base_health: u32,
    base_speed: f32,
    jitter: f32,
}

impl Config {
    /// Creates a new configuration using the provided cadence and stats.
    ///
    /// `jitter` is the variation fraction applied to health and speed;
    /// `0.15` spreads each stat uniformly within 15% of its base value.
    #[must_use]
    pub fn new(
        spawn_interval: Duration,
        rng_seed: u64,
        base_health: u32,
        base_speed: f32,
        jitter: f32,
    ) -> Self {
        Self {
            spawn_interval,
            rng_seed,
            base_health,
            base_speed,
            jitter: jitter.clamp(0.0, 1.0),
        }
    }
}

/// Pure system that deterministically emits spawn commands over time.
#[derive(Debug)]
pub struct Spawning {
    spawn_interval: Duration,
    accumulator: Duration,
    rng: ChaCha8Rng,
    base_health: u32,
    base_speed: f32,
    jitter: f32,
    color_index: usize,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            spawn_interval: config.spawn_interval,
            accumulator: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            base_health: config.base_health,
            base_speed: config.base_speed,
            jitter: config.jitter,
            color_index: 0,
        }
    }

    /// Consumes events to emit spawn commands for elapsed simulated time.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        if self.spawn_interval.is_zero() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                accumulated = accumulated.saturating_add(*dt);
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(accumulated);
        while self.accumulator >= self.spawn_interval {
            self.accumulator -= self.spawn_interval;

            let health_factor = self.variation();
            let speed_factor = self.variation();
            let health = ((self.base_health as f32 * health_factor).round() as u32).max(1);
            let speed = (self.base_speed * speed_factor).max(1.0);

            out.push(Command::SpawnEnemy {
                health,
                speed,
                color: self.next_color(),
            });
        }
    }

    /// Draws a multiplicative variation factor in `[1 - jitter, 1 + jitter]`.
    fn variation(&mut self) -> f32 {
        if self.jitter <= f32::EPSILON {
            return 1.0;
        }
        self.rng.gen_range(1.0 - self.jitter..=1.0 + self.jitter)
    }

    fn next_color(&mut self) -> EnemyColor {
        let color = SPAWN_COLORS[self.color_index % SPAWN_COLORS.len()];
        self.color_index = (self.color_index + 1) % SPAWN_COLORS.len();
        color
    }
}
