#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that turns targeting data into projectile firing commands.

use spire_defence_core::{
    predict_intercept, Command, TowerCooldownSnapshot, TowerCooldownView, TowerId, TowerTarget,
};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct Combat {
    scratch: Vec<Command>,
}

impl Combat {
    /// Creates a new combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireProjectile` entries for towers ready to fire.
    ///
    /// Each shot leads its target: the aim point is the predicted intercept
    /// of the enemy's current velocity against the tower's projectile
    /// speed. When the enemy cannot be intercepted the shot falls back to
    /// the enemy's current position rather than holding fire.
    pub fn handle(
        &mut self,
        tower_cooldowns: &TowerCooldownView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if tower_targets.is_empty() {
            return;
        }

        let cooldowns: Vec<TowerCooldownSnapshot> = tower_cooldowns.iter().copied().collect();
        if cooldowns.is_empty() {
            return;
        }

        self.scratch.clear();

        for target in tower_targets {
            let Some(snapshot) = find_cooldown(&cooldowns, target.tower) else {
                continue;
            };
            if !snapshot.ready_in.is_zero() {
                continue;
            }

            let aim = predict_intercept(
                target.tower_center,
                target.enemy_position,
                target.enemy_velocity,
                target.projectile_speed,
            )
            .unwrap_or(target.enemy_position);

            self.scratch.push(Command::FireProjectile {
                tower: target.tower,
                target: target.enemy,
                aim,
            });
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn find_cooldown(
    cooldowns: &[TowerCooldownSnapshot],
    tower: TowerId,
) -> Option<&TowerCooldownSnapshot> {
    cooldowns
        .binary_search_by_key(&tower, |snapshot| snapshot.tower)
        .ok()
        .map(|index| &cooldowns[index])
}
