#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that computes deterministic tower targets from world snapshots.

use spire_defence_core::{
    EnemyId, EnemyView, TileAnchor, TileGrid, TowerId, TowerTarget, TowerView, WorldPoint,
    WorldVec,
};

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct Targeting {
    tower_workspace: Vec<TowerWorkspace>,
    enemy_workspace: Vec<EnemyCandidate>,
}

impl Targeting {
    /// Creates a new targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes tower targets for the provided world snapshot.
    ///
    /// Each tower receives at most one target: the closest living enemy
    /// within its current level's range. When `avoid_overkill` is set,
    /// enemies whose remaining health is already covered by projectiles in
    /// flight are skipped so towers spread damage instead of wasting shots.
    /// The output buffer is cleared before being populated.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        enemies: &EnemyView,
        tile_grid: &TileGrid,
        avoid_overkill: bool,
        out: &mut Vec<TowerTarget>,
    ) {
        out.clear();

        if towers.iter().next().is_none() || enemies.iter().next().is_none() {
            return;
        }

        self.prepare_tower_workspace(towers, tile_grid);
        if self.tower_workspace.is_empty() {
            return;
        }

        self.prepare_enemy_workspace(enemies, avoid_overkill);
        if self.enemy_workspace.is_empty() {
            return;
        }

        for tower in &self.tower_workspace {
            let max_distance = tower.range * tower.range;
            let mut best: Option<BestCandidate> = None;

            for candidate in &self.enemy_workspace {
                let distance_squared = tower.center.distance_squared(candidate.position);
                if distance_squared > max_distance {
                    continue;
                }

                let current = BestCandidate {
                    distance_squared,
                    enemy: candidate.id,
                    position: candidate.position,
                    velocity: candidate.velocity,
                };

                match &mut best {
                    Some(existing) => {
                        if current.precedes(existing) {
                            *existing = current;
                        }
                    }
                    None => best = Some(current),
                }
            }

            if let Some(best_candidate) = best {
                out.push(TowerTarget {
                    tower: tower.id,
                    enemy: best_candidate.enemy,
                    tower_center: tower.center,
                    enemy_position: best_candidate.position,
                    enemy_velocity: best_candidate.velocity,
                    projectile_speed: tower.projectile_speed,
                });
            }
        }
    }

    fn prepare_tower_workspace(&mut self, towers: &TowerView, tile_grid: &TileGrid) {
        self.tower_workspace.clear();
        let (lower, _) = towers.iter().size_hint();
        self.tower_workspace.reserve(lower);

        for snapshot in towers.iter() {
            // A stale snapshot may carry a level past the attribute table;
            // such towers simply do not target anything this frame.
            let Some(attributes) = snapshot.kind.attributes(snapshot.level) else {
                continue;
            };

            self.tower_workspace.push(TowerWorkspace {
                id: snapshot.id,
                center: tile_grid.tile_to_world(snapshot.tile, TileAnchor::Center),
                range: attributes.range,
                projectile_speed: attributes.projectile_speed,
            });
        }
    }

    fn prepare_enemy_workspace(&mut self, enemies: &EnemyView, avoid_overkill: bool) {
        self.enemy_workspace.clear();
        let (lower, _) = enemies.iter().size_hint();
        self.enemy_workspace.reserve(lower);

        for snapshot in enemies.iter() {
            if snapshot.health == 0 {
                continue;
            }
            if avoid_overkill && snapshot.health <= snapshot.incoming_damage {
                continue;
            }

            self.enemy_workspace.push(EnemyCandidate {
                id: snapshot.id,
                position: snapshot.position,
                velocity: snapshot.velocity,
            });
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TowerWorkspace {
    id: TowerId,
    center: WorldPoint,
    range: f32,
    projectile_speed: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EnemyId,
    position: WorldPoint,
    velocity: WorldVec,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct BestCandidate {
    distance_squared: f32,
    enemy: EnemyId,
    position: WorldPoint,
    velocity: WorldVec,
}

impl BestCandidate {
    fn precedes(&self, other: &Self) -> bool {
        if self.distance_squared != other.distance_squared {
            return self.distance_squared < other.distance_squared;
        }

        self.enemy < other.enemy
    }
}
