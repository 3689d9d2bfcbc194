#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Spire Defence.
//!
//! The world owns every mutable gameplay fact: the tile grid, the enemy
//! lane, the player economy, towers, enemies, and projectiles in flight.
//! All mutation flows through [`apply`], which consumes [`Command`] values
//! and reports what happened through [`Event`] values. Systems never touch
//! the world directly; they read snapshots from [`query`] and answer with
//! new commands.

mod enemies;
mod projectiles;
mod towers;

use std::time::Duration;

use spire_defence_core::{
    Command, EnemyId, Event, Gold, PlacementError, ProjectileId, SellError, TileAnchor, TileCoord,
    TileGrid, TowerId, UpgradeError, WorldPoint, WorldVec, WELCOME_BANNER,
};

use enemies::EnemyRoster;
use projectiles::ProjectileStore;
use towers::TowerRegistry;

const DEFAULT_GRID_COLUMNS: u32 = 12;
const DEFAULT_GRID_ROWS: u32 = 8;
const DEFAULT_TILE_LENGTH: f32 = 100.0;

const DEFAULT_STARTING_GOLD: Gold = Gold::new(200);
const DEFAULT_STARTING_LIVES: u32 = 10;

/// Fraction of the invested cost refunded when a tower is sold.
const SELL_REFUND_PERCENT: u64 = 70;

/// Flight time budget before an unexploded projectile is discarded.
const PROJECTILE_LIFETIME: Duration = Duration::from_secs(3);

/// Distance at which a projectile detonates against an enemy.
const PROJECTILE_HIT_RADIUS: f32 = 12.0;

/// Straight lane the enemies march along, aligned with one grid row.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lane {
    row: u32,
    entry: WorldPoint,
    exit: WorldPoint,
    direction: WorldVec,
}

impl Lane {
    fn aligned_with_grid(grid: &TileGrid) -> Self {
        let row = if grid.rows() == 0 {
            0
        } else {
            (grid.rows() - 1) / 2
        };
        let center_y = (row as f32 + 0.5) * grid.tile_length();

        // Enemies enter half a tile off-screen and leave half a tile past
        // the far edge so spawn and despawn never pop inside the grid.
        Self {
            row,
            entry: WorldPoint::new(-grid.tile_length() * 0.5, center_y),
            exit: WorldPoint::new(grid.width() + grid.tile_length() * 0.5, center_y),
            direction: WorldVec::new(1.0, 0.0),
        }
    }

    /// Grid row the lane occupies; towers may not be placed here.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// World-space point where enemies enter the lane.
    #[must_use]
    pub const fn entry(&self) -> WorldPoint {
        self.entry
    }

    /// World-space point past which enemies count as escaped.
    #[must_use]
    pub const fn exit(&self) -> WorldPoint {
        self.exit
    }

    /// Unit direction of travel along the lane.
    #[must_use]
    pub const fn direction(&self) -> WorldVec {
        self.direction
    }
}

/// Represents the authoritative Spire Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    tile_grid: TileGrid,
    lane: Lane,
    gold: Gold,
    lives: u32,
    selected: Option<TowerId>,
    towers: TowerRegistry,
    enemies: EnemyRoster,
    projectiles: ProjectileStore,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates a new Spire Defence world ready for simulation.
    #[must_use]
    pub fn new() -> Self {
        let tile_grid = TileGrid::new(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS, DEFAULT_TILE_LENGTH);
        let lane = Lane::aligned_with_grid(&tile_grid);
        Self {
            banner: WELCOME_BANNER,
            tile_grid,
            lane,
            gold: DEFAULT_STARTING_GOLD,
            lives: DEFAULT_STARTING_LIVES,
            selected: None,
            towers: TowerRegistry::new(),
            enemies: EnemyRoster::new(),
            projectiles: ProjectileStore::new(),
        }
    }

    fn reset_battlefield(&mut self) {
        self.towers.clear();
        self.enemies.clear();
        self.projectiles.clear();
        self.selected = None;
    }

    fn advance_enemies(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for enemy in self.enemies.iter_mut() {
            enemy.advance(dt);
        }

        let exit_x = self.lane.exit().x();
        let escaped: Vec<EnemyId> = self
            .enemies
            .iter()
            .filter(|enemy| enemy.position.x() >= exit_x)
            .map(|enemy| enemy.id)
            .collect();

        if escaped.is_empty() {
            return;
        }

        self.enemies
            .retain(|enemy| enemy.position.x() < exit_x);
        for enemy in escaped {
            self.lives = self.lives.saturating_sub(1);
            out_events.push(Event::EnemyEscaped { enemy });
            out_events.push(Event::LifeLost {
                remaining: self.lives,
            });
        }
    }

    fn advance_projectiles(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        for projectile in self.projectiles.iter_mut() {
            projectile.advance(dt);
        }

        #[derive(Clone, Copy)]
        struct Flight {
            id: ProjectileId,
            from: WorldPoint,
            to: WorldPoint,
            damage: u32,
            aimed_at: EnemyId,
            expired: bool,
        }

        let flights: Vec<Flight> = self
            .projectiles
            .iter()
            .map(|projectile| Flight {
                id: projectile.id,
                from: projectile.previous_position,
                to: projectile.position,
                damage: projectile.damage,
                aimed_at: projectile.aimed_at,
                expired: projectile.expired(),
            })
            .collect();

        let mut finished: Vec<ProjectileId> = Vec::new();
        for flight in flights {
            if let Some(enemy_id) =
                self.nearest_enemy_on_segment(flight.from, flight.to, PROJECTILE_HIT_RADIUS)
            {
                if let Some(enemy) = self.enemies.get_mut(enemy_id) {
                    enemy.absorb(flight.damage);
                }
                if let Some(aimed) = self.enemies.get_mut(flight.aimed_at) {
                    aimed.release_incoming(flight.damage);
                }
                out_events.push(Event::ProjectileHit {
                    projectile: flight.id,
                    enemy: enemy_id,
                    damage: flight.damage,
                });
                finished.push(flight.id);
            } else if flight.expired {
                if let Some(aimed) = self.enemies.get_mut(flight.aimed_at) {
                    aimed.release_incoming(flight.damage);
                }
                out_events.push(Event::ProjectileExpired {
                    projectile: flight.id,
                });
                finished.push(flight.id);
            }
        }

        if !finished.is_empty() {
            self.projectiles
                .retain(|projectile| !finished.contains(&projectile.id));
        }
    }

    /// Finds the enemy closest to the swept projectile path.
    ///
    /// Collision uses the full segment a projectile travelled during the
    /// tick so that fast shots cannot tunnel through an enemy between two
    /// integration steps.
    fn nearest_enemy_on_segment(
        &self,
        from: WorldPoint,
        to: WorldPoint,
        radius: f32,
    ) -> Option<EnemyId> {
        let radius_squared = radius * radius;
        let mut best: Option<(f32, EnemyId)> = None;

        for enemy in self.enemies.iter() {
            if enemy.health == 0 {
                continue;
            }

            let distance_squared = segment_distance_squared(from, to, enemy.position);
            if distance_squared > radius_squared {
                continue;
            }

            let closer = match best {
                Some((best_distance, best_id)) => {
                    distance_squared < best_distance
                        || (distance_squared == best_distance && enemy.id < best_id)
                }
                None => true,
            };
            if closer {
                best = Some((distance_squared, enemy.id));
            }
        }

        best.map(|(_, id)| id)
    }

    fn sweep_dead_enemies(&mut self, out_events: &mut Vec<Event>) {
        let dead: Vec<(EnemyId, u32)> = self
            .enemies
            .iter()
            .filter(|enemy| enemy.health == 0)
            .map(|enemy| (enemy.id, enemy.max_health))
            .collect();

        if dead.is_empty() {
            return;
        }

        self.enemies.retain(|enemy| enemy.health > 0);
        for (enemy, max_health) in dead {
            let bounty = bounty_for(max_health);
            self.gold = self.gold.saturating_add(bounty);
            out_events.push(Event::EnemyDied { enemy, bounty });
            out_events.push(Event::GoldChanged { balance: self.gold });
        }
    }
}

/// Gold awarded for killing an enemy that spawned with the given health.
fn bounty_for(max_health: u32) -> Gold {
    Gold::new(max_health / 10 + 5)
}

/// Gold refunded when selling a tower of the given kind and level.
fn refund_for(kind: spire_defence_core::TowerKind, level: u8) -> Gold {
    let invested = kind.invested_cost(level);
    Gold::new((u64::from(invested.get()) * SELL_REFUND_PERCENT / 100) as u32)
}

/// Squared distance from a point to the segment between `a` and `b`.
fn segment_distance_squared(a: WorldPoint, b: WorldPoint, point: WorldPoint) -> f32 {
    let span = b - a;
    let length_squared = span.length_squared();
    if length_squared <= f32::EPSILON {
        return a.distance_squared(point);
    }

    let t = ((point - a).dot(span) / length_squared).clamp(0.0, 1.0);
    let closest = a + span * t;
    closest.distance_squared(point)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureTileGrid {
            columns,
            rows,
            tile_length,
        } => {
            world.tile_grid = TileGrid::new(columns, rows, tile_length);
            world.lane = Lane::aligned_with_grid(&world.tile_grid);
            world.reset_battlefield();
        }
        Command::ConfigureEconomy {
            starting_gold,
            starting_lives,
        } => {
            world.gold = starting_gold;
            world.lives = starting_lives;
            out_events.push(Event::GoldChanged {
                balance: world.gold,
            });
        }
        Command::Tick { dt } => {
            out_events.push(Event::TimeAdvanced { dt });
            world.advance_enemies(dt, out_events);
            world.advance_projectiles(dt, out_events);
            world.sweep_dead_enemies(out_events);
            world.towers.tick(dt);
        }
        Command::SpawnEnemy {
            health,
            speed,
            color,
        } => {
            // Malformed spawn requests are dropped rather than creating
            // enemies that can never move or never die.
            if health == 0 || speed <= 0.0 {
                return;
            }

            let velocity = world.lane.direction() * speed;
            let position = world.lane.entry();
            let enemy = world.enemies.spawn(position, velocity, health, color);
            out_events.push(Event::EnemySpawned {
                enemy,
                position,
                health,
            });
        }
        Command::PlaceTower { kind, tile } => {
            let rejection = if !world.tile_grid.contains(tile) {
                Some(PlacementError::OutOfBounds)
            } else if tile.row() == world.lane.row() {
                Some(PlacementError::BlocksLane)
            } else if world.towers.occupies(tile) {
                Some(PlacementError::Occupied)
            } else if !world.gold.covers(kind.purchase_cost()) {
                Some(PlacementError::InsufficientGold)
            } else {
                None
            };

            if let Some(reason) = rejection {
                out_events.push(Event::TowerPlacementRejected { kind, tile, reason });
                return;
            }

            world.gold = world.gold.saturating_sub(kind.purchase_cost());
            let tower = world.towers.place(kind, tile);
            out_events.push(Event::TowerPlaced { tower, kind, tile });
            out_events.push(Event::GoldChanged {
                balance: world.gold,
            });
        }
        Command::UpgradeTower { tower } => {
            let Some(state) = world.towers.get(tower) else {
                out_events.push(Event::TowerUpgradeRejected {
                    tower,
                    reason: UpgradeError::MissingTower,
                });
                return;
            };

            let kind = state.kind;
            let level = state.level;
            if level >= kind.max_level() {
                out_events.push(Event::TowerUpgradeRejected {
                    tower,
                    reason: UpgradeError::MaxLevel,
                });
                return;
            }

            let next_level = level + 1;
            let Some(next_attributes) = kind.attributes(next_level) else {
                out_events.push(Event::TowerUpgradeRejected {
                    tower,
                    reason: UpgradeError::MaxLevel,
                });
                return;
            };

            if !world.gold.covers(next_attributes.cost) {
                out_events.push(Event::TowerUpgradeRejected {
                    tower,
                    reason: UpgradeError::InsufficientGold,
                });
                return;
            }

            world.gold = world.gold.saturating_sub(next_attributes.cost);
            if let Some(state) = world.towers.get_mut(tower) {
                state.level = next_level;
            }
            out_events.push(Event::TowerUpgraded {
                tower,
                level: next_level,
            });
            out_events.push(Event::GoldChanged {
                balance: world.gold,
            });
        }
        Command::SellTower { tower } => {
            let Some(state) = world.towers.remove(tower) else {
                out_events.push(Event::TowerSaleRejected {
                    tower,
                    reason: SellError::MissingTower,
                });
                return;
            };

            let refund = refund_for(state.kind, state.level);
            world.gold = world.gold.saturating_add(refund);
            out_events.push(Event::TowerSold { tower, refund });
            out_events.push(Event::GoldChanged {
                balance: world.gold,
            });

            if world.selected == Some(tower) {
                world.selected = None;
                out_events.push(Event::TowerSelected { tower: None });
            }
        }
        Command::SelectTower { tower } => {
            let resolved = tower.filter(|id| world.towers.get(*id).is_some());
            if world.selected != resolved {
                world.selected = resolved;
                out_events.push(Event::TowerSelected { tower: resolved });
            }
        }
        Command::FireProjectile { tower, target, aim } => {
            // Firing data is computed from the previous snapshot, so a tower
            // or target may have vanished in between. Stale requests are
            // dropped without an event.
            let Some(state) = world.towers.get(tower) else {
                return;
            };
            if !state.cooldown.is_zero() {
                return;
            }
            let Some(attributes) = state.kind.attributes(state.level) else {
                return;
            };
            if !world.enemies.contains(target) {
                return;
            }

            let muzzle = world
                .tile_grid
                .tile_to_world(state.tile, TileAnchor::Center);
            let direction = (aim - muzzle).normalize();
            if direction == WorldVec::ZERO {
                return;
            }

            let damage = attributes.damage;
            let velocity = direction * attributes.projectile_speed;
            let fire_interval = attributes.fire_interval;

            let projectile =
                world
                    .projectiles
                    .launch(muzzle, velocity, damage, target, PROJECTILE_LIFETIME);
            if let Some(enemy) = world.enemies.get_mut(target) {
                enemy.incoming_damage = enemy.incoming_damage.saturating_add(damage);
            }
            if let Some(state) = world.towers.get_mut(tower) {
                state.cooldown = fire_interval;
            }
            out_events.push(Event::ProjectileFired {
                projectile,
                tower,
                target,
                origin: muzzle,
                velocity,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{Lane, World};
    use spire_defence_core::{
        EnemySnapshot, EnemyView, Gold, ProjectileSnapshot, ProjectileView, TileCoord, TileGrid,
        TowerCooldownSnapshot, TowerCooldownView, TowerId, TowerSnapshot, TowerView,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the world's tile grid definition.
    #[must_use]
    pub fn tile_grid(world: &World) -> &TileGrid {
        &world.tile_grid
    }

    /// Provides read-only access to the enemy lane.
    #[must_use]
    pub fn lane(world: &World) -> &Lane {
        &world.lane
    }

    /// Current gold balance of the player.
    #[must_use]
    pub fn gold(world: &World) -> Gold {
        world.gold
    }

    /// Lives remaining before the session is lost.
    #[must_use]
    pub fn lives(world: &World) -> u32 {
        world.lives
    }

    /// Tower currently selected by the player, if any.
    #[must_use]
    pub fn selected_tower(world: &World) -> Option<TowerId> {
        world.selected
    }

    /// Finds the tower hosted on the provided tile, if any.
    #[must_use]
    pub fn tower_at(world: &World, tile: TileCoord) -> Option<TowerId> {
        world.towers.tower_at(tile).map(|state| state.id)
    }

    /// Gold the player would receive for selling the provided tower now.
    #[must_use]
    pub fn sell_refund(world: &World, tower: TowerId) -> Option<Gold> {
        world
            .towers
            .get(tower)
            .map(|state| super::refund_for(state.kind, state.level))
    }

    /// Captures a read-only view of every tower on the battlefield.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(
            world
                .towers
                .iter()
                .map(|state| TowerSnapshot {
                    id: state.id,
                    kind: state.kind,
                    level: state.level,
                    tile: state.tile,
                    cooldown_remaining: state.cooldown,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of every enemy on the lane.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .map(|enemy| EnemySnapshot {
                    id: enemy.id,
                    position: enemy.position,
                    previous_position: enemy.previous_position,
                    velocity: enemy.velocity,
                    health: enemy.health,
                    max_health: enemy.max_health,
                    incoming_damage: enemy.incoming_damage,
                    color: enemy.color,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of every projectile in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        ProjectileView::from_snapshots(
            world
                .projectiles
                .iter()
                .map(|projectile| ProjectileSnapshot {
                    id: projectile.id,
                    position: projectile.position,
                    previous_position: projectile.previous_position,
                    velocity: projectile.velocity,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of every tower's firing cooldown.
    #[must_use]
    pub fn tower_cooldown_view(world: &World) -> TowerCooldownView {
        TowerCooldownView::from_snapshots(
            world
                .towers
                .iter()
                .map(|state| TowerCooldownSnapshot {
                    tower: state.id,
                    kind: state.kind,
                    level: state.level,
                    ready_in: state.cooldown,
                })
                .collect(),
        )
    }
}

/// Test-only helpers for constructing worlds in specific states.
///
/// Systems exercise their logic against live worlds in integration tests;
/// these helpers let those tests plant enemies and cooldowns directly
/// instead of replaying long command sequences.
#[cfg(feature = "enemy_scaffolding")]
pub mod scaffolding {
    use std::time::Duration;

    use super::World;
    use spire_defence_core::{EnemyColor, EnemyId, Gold, TowerId, WorldPoint, WorldVec};

    /// Plants an enemy at an arbitrary position with explicit velocity and
    /// incoming-damage bookkeeping.
    pub fn seed_enemy(
        world: &mut World,
        position: WorldPoint,
        velocity: WorldVec,
        health: u32,
        incoming_damage: u32,
    ) -> EnemyId {
        let id = world.enemies.spawn(
            position,
            velocity,
            health,
            EnemyColor::from_rgb(0xc8, 0x2a, 0x36),
        );
        if let Some(enemy) = world.enemies.get_mut(id) {
            enemy.incoming_damage = incoming_damage;
        }
        id
    }

    /// Overwrites a tower's remaining cooldown.
    pub fn set_tower_cooldown(world: &mut World, tower: TowerId, cooldown: Duration) {
        if let Some(state) = world.towers.get_mut(tower) {
            state.cooldown = cooldown;
        }
    }

    /// Overwrites the player's gold balance.
    pub fn set_gold(world: &mut World, gold: Gold) {
        world.gold = gold;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spire_defence_core::{EnemyColor, TowerKind};

    fn configured_world() -> World {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureEconomy {
                starting_gold: Gold::new(500),
                starting_lives: 3,
            },
            &mut events,
        );
        world
    }

    fn spawn_enemy(world: &mut World, health: u32, speed: f32) -> EnemyId {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnEnemy {
                health,
                speed,
                color: EnemyColor::from_rgb(200, 40, 40),
            },
            &mut events,
        );
        match events.first() {
            Some(Event::EnemySpawned { enemy, .. }) => *enemy,
            other => panic!("expected EnemySpawned, got {other:?}"),
        }
    }

    fn place_tower(world: &mut World, kind: TowerKind, tile: TileCoord) -> TowerId {
        let mut events = Vec::new();
        apply(world, Command::PlaceTower { kind, tile }, &mut events);
        match events.first() {
            Some(Event::TowerPlaced { tower, .. }) => *tower,
            other => panic!("expected TowerPlaced, got {other:?}"),
        }
    }

    #[test]
    fn placement_debits_gold_and_occupies_tile() {
        let mut world = configured_world();
        let tile = TileCoord::new(2, 1);
        let tower = place_tower(&mut world, TowerKind::Pulse, tile);

        assert_eq!(query::tower_at(&world, tile), Some(tower));
        assert_eq!(
            query::gold(&world),
            Gold::new(500).saturating_sub(TowerKind::Pulse.purchase_cost())
        );
    }

    #[test]
    fn placement_rejects_out_of_bounds_tiles() {
        let mut world = configured_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Pulse,
                tile: TileCoord::new(99, 0),
            },
            &mut events,
        );

        assert!(matches!(
            events.first(),
            Some(Event::TowerPlacementRejected {
                reason: PlacementError::OutOfBounds,
                ..
            })
        ));
        assert_eq!(query::gold(&world), Gold::new(500));
    }

    #[test]
    fn placement_rejects_the_lane_row() {
        let mut world = configured_world();
        let lane_row = query::lane(&world).row();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Pulse,
                tile: TileCoord::new(2, lane_row),
            },
            &mut events,
        );

        assert!(matches!(
            events.first(),
            Some(Event::TowerPlacementRejected {
                reason: PlacementError::BlocksLane,
                ..
            })
        ));
    }

    #[test]
    fn placement_rejects_occupied_tiles() {
        let mut world = configured_world();
        let tile = TileCoord::new(2, 1);
        let _ = place_tower(&mut world, TowerKind::Pulse, tile);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Cannon,
                tile,
            },
            &mut events,
        );

        assert!(matches!(
            events.first(),
            Some(Event::TowerPlacementRejected {
                reason: PlacementError::Occupied,
                ..
            })
        ));
    }

    #[test]
    fn placement_rejects_insufficient_gold() {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureEconomy {
                starting_gold: Gold::new(10),
                starting_lives: 3,
            },
            &mut events,
        );

        events.clear();
        apply(
            &mut world,
            Command::PlaceTower {
                kind: TowerKind::Pulse,
                tile: TileCoord::new(2, 1),
            },
            &mut events,
        );

        assert!(matches!(
            events.first(),
            Some(Event::TowerPlacementRejected {
                reason: PlacementError::InsufficientGold,
                ..
            })
        ));
    }

    #[test]
    fn upgrade_gates_on_gold_for_the_next_level() {
        let mut world = configured_world();
        let tower = place_tower(&mut world, TowerKind::Pulse, TileCoord::new(2, 1));

        // Drain gold below the level-one price, then retry after a refill.
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureEconomy {
                starting_gold: Gold::new(10),
                starting_lives: 3,
            },
            &mut events,
        );

        events.clear();
        apply(&mut world, Command::UpgradeTower { tower }, &mut events);
        assert!(matches!(
            events.first(),
            Some(Event::TowerUpgradeRejected {
                reason: UpgradeError::InsufficientGold,
                ..
            })
        ));

        apply(
            &mut world,
            Command::ConfigureEconomy {
                starting_gold: Gold::new(500),
                starting_lives: 3,
            },
            &mut events,
        );
        events.clear();
        apply(&mut world, Command::UpgradeTower { tower }, &mut events);

        assert!(matches!(
            events.first(),
            Some(Event::TowerUpgraded { level: 1, .. })
        ));
        let level_one_cost = TowerKind::Pulse
            .attributes(1)
            .expect("level one exists")
            .cost;
        assert_eq!(
            query::gold(&world),
            Gold::new(500).saturating_sub(level_one_cost)
        );
    }

    #[test]
    fn upgrade_stops_at_max_level() {
        let mut world = configured_world();
        let tower = place_tower(&mut world, TowerKind::Pulse, TileCoord::new(2, 1));

        let mut events = Vec::new();
        for _ in 0..TowerKind::Pulse.max_level() {
            apply(&mut world, Command::UpgradeTower { tower }, &mut events);
        }
        events.clear();

        apply(&mut world, Command::UpgradeTower { tower }, &mut events);
        assert!(matches!(
            events.first(),
            Some(Event::TowerUpgradeRejected {
                reason: UpgradeError::MaxLevel,
                ..
            })
        ));
    }

    #[test]
    fn upgrade_of_missing_tower_is_rejected() {
        let mut world = configured_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::UpgradeTower {
                tower: TowerId::new(99),
            },
            &mut events,
        );

        assert!(matches!(
            events.first(),
            Some(Event::TowerUpgradeRejected {
                reason: UpgradeError::MissingTower,
                ..
            })
        ));
    }

    #[test]
    fn selling_refunds_a_fraction_of_invested_gold() {
        let mut world = configured_world();
        let tile = TileCoord::new(2, 1);
        let tower = place_tower(&mut world, TowerKind::Cannon, tile);
        let balance_after_purchase = query::gold(&world);

        let mut events = Vec::new();
        apply(&mut world, Command::SellTower { tower }, &mut events);

        let expected_refund =
            Gold::new(TowerKind::Cannon.purchase_cost().get() * SELL_REFUND_PERCENT as u32 / 100);
        assert!(matches!(
            events.first(),
            Some(Event::TowerSold { refund, .. }) if *refund == expected_refund
        ));
        assert_eq!(
            query::gold(&world),
            balance_after_purchase.saturating_add(expected_refund)
        );
        assert_eq!(query::tower_at(&world, tile), None);
    }

    #[test]
    fn selling_a_missing_tower_is_rejected() {
        let mut world = configured_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SellTower {
                tower: TowerId::new(7),
            },
            &mut events,
        );

        assert!(matches!(
            events.first(),
            Some(Event::TowerSaleRejected {
                reason: SellError::MissingTower,
                ..
            })
        ));
    }

    #[test]
    fn selling_the_selected_tower_clears_the_selection() {
        let mut world = configured_world();
        let tower = place_tower(&mut world, TowerKind::Pulse, TileCoord::new(2, 1));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SelectTower {
                tower: Some(tower),
            },
            &mut events,
        );
        assert_eq!(query::selected_tower(&world), Some(tower));

        events.clear();
        apply(&mut world, Command::SellTower { tower }, &mut events);
        assert_eq!(query::selected_tower(&world), None);
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::TowerSelected { tower: None })));
    }

    #[test]
    fn selecting_a_missing_tower_clears_the_selection() {
        let mut world = configured_world();
        let tower = place_tower(&mut world, TowerKind::Pulse, TileCoord::new(2, 1));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SelectTower {
                tower: Some(tower),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SelectTower {
                tower: Some(TowerId::new(99)),
            },
            &mut events,
        );

        assert_eq!(query::selected_tower(&world), None);
    }

    #[test]
    fn enemies_spawn_at_the_lane_entry() {
        let mut world = configured_world();
        let _ = spawn_enemy(&mut world, 30, 40.0);

        let view = query::enemy_view(&world);
        let snapshot = view.iter().next().expect("one enemy");
        assert_eq!(snapshot.position, query::lane(&world).entry());
        assert_eq!(snapshot.health, 30);
        assert_eq!(snapshot.incoming_damage, 0);
    }

    #[test]
    fn malformed_spawn_requests_are_dropped() {
        let mut world = configured_world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnEnemy {
                health: 0,
                speed: 40.0,
                color: EnemyColor::from_rgb(0, 0, 0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnEnemy {
                health: 10,
                speed: 0.0,
                color: EnemyColor::from_rgb(0, 0, 0),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::enemy_view(&world).iter().count(), 0);
    }

    #[test]
    fn ticking_moves_enemies_along_the_lane() {
        let mut world = configured_world();
        let _ = spawn_enemy(&mut world, 30, 40.0);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(500),
            },
            &mut events,
        );

        let view = query::enemy_view(&world);
        let snapshot = view.iter().next().expect("one enemy");
        let entry = query::lane(&world).entry();
        assert_eq!(snapshot.previous_position, entry);
        assert!((snapshot.position.x() - (entry.x() + 20.0)).abs() < 1e-3);
    }

    #[test]
    fn escaping_enemies_cost_lives() {
        let mut world = configured_world();
        let enemy = spawn_enemy(&mut world, 30, 10_000.0);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(1),
            },
            &mut events,
        );

        assert!(events
            .iter()
            .any(|event| matches!(event, Event::EnemyEscaped { enemy: escaped } if *escaped == enemy)));
        assert!(events
            .iter()
            .any(|event| matches!(event, Event::LifeLost { remaining: 2 })));
        assert_eq!(query::lives(&world), 2);
        assert_eq!(query::enemy_view(&world).iter().count(), 0);
    }

    #[test]
    fn firing_launches_a_projectile_and_books_incoming_damage() {
        let mut world = configured_world();
        let tower = place_tower(&mut world, TowerKind::Pulse, TileCoord::new(2, 2));
        let enemy = spawn_enemy(&mut world, 100, 40.0);

        let enemy_position = query::enemy_view(&world)
            .iter()
            .next()
            .expect("enemy exists")
            .position;

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::FireProjectile {
                tower,
                target: enemy,
                aim: enemy_position,
            },
            &mut events,
        );

        assert!(matches!(events.first(), Some(Event::ProjectileFired { .. })));
        assert_eq!(query::projectile_view(&world).iter().count(), 1);

        let view = query::enemy_view(&world);
        let snapshot = view.iter().next().expect("enemy exists");
        let expected_damage = TowerKind::Pulse.attributes(0).expect("level zero").damage;
        assert_eq!(snapshot.incoming_damage, expected_damage);

        let cooldowns = query::tower_cooldown_view(&world);
        let cooldown = cooldowns.iter().next().expect("tower exists");
        assert_eq!(
            cooldown.ready_in,
            TowerKind::Pulse.attributes(0).expect("level zero").fire_interval
        );
    }

    #[test]
    fn firing_is_ignored_while_the_tower_cools_down() {
        let mut world = configured_world();
        let tower = place_tower(&mut world, TowerKind::Pulse, TileCoord::new(2, 2));
        let enemy = spawn_enemy(&mut world, 100, 40.0);
        let aim = query::lane(&world).entry();

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::FireProjectile {
                tower,
                target: enemy,
                aim,
            },
            &mut events,
        );
        events.clear();
        apply(
            &mut world,
            Command::FireProjectile {
                tower,
                target: enemy,
                aim,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::projectile_view(&world).iter().count(), 1);
    }

    #[test]
    fn firing_at_a_missing_enemy_is_ignored() {
        let mut world = configured_world();
        let tower = place_tower(&mut world, TowerKind::Pulse, TileCoord::new(2, 2));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::FireProjectile {
                tower,
                target: EnemyId::new(42),
                aim: WorldPoint::new(100.0, 100.0),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::projectile_view(&world).iter().count(), 0);
    }

    #[test]
    fn projectile_hits_damage_enemies_and_release_incoming() {
        let mut world = configured_world();
        // Tower adjacent to the lane so the shot closes quickly.
        let lane_row = query::lane(&world).row();
        let tower_tile = TileCoord::new(2, lane_row + 1);
        let tower = place_tower(&mut world, TowerKind::Pulse, tower_tile);
        let enemy = spawn_enemy(&mut world, 100, 1.0);

        // Walk the enemy onto the tower's column before firing.
        let mut events = Vec::new();
        let tile_length = query::tile_grid(&world).tile_length();
        let lane_entry = query::lane(&world).entry();
        let target_x = (tower_tile.column() as f32 + 0.5) * tile_length;
        let distance = target_x - lane_entry.x();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs_f32(distance / 1.0),
            },
            &mut events,
        );

        let enemy_position = query::enemy_view(&world)
            .iter()
            .next()
            .expect("enemy exists")
            .position;

        events.clear();
        apply(
            &mut world,
            Command::FireProjectile {
                tower,
                target: enemy,
                aim: enemy_position,
            },
            &mut events,
        );
        assert!(matches!(events.first(), Some(Event::ProjectileFired { .. })));

        // The muzzle sits one tile from the lane; a pulse shot covers that
        // distance well within a quarter second.
        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(250),
            },
            &mut events,
        );

        let expected_damage = TowerKind::Pulse.attributes(0).expect("level zero").damage;
        assert!(events.iter().any(|event| matches!(
            event,
            Event::ProjectileHit { enemy: hit, damage, .. }
                if *hit == enemy && *damage == expected_damage
        )));

        let view = query::enemy_view(&world);
        let snapshot = view.iter().next().expect("enemy survives");
        assert_eq!(snapshot.health, 100 - expected_damage);
        assert_eq!(snapshot.incoming_damage, 0);
        assert_eq!(query::projectile_view(&world).iter().count(), 0);
    }

    #[test]
    fn lethal_hits_pay_a_bounty() {
        let mut world = configured_world();
        let lane_row = query::lane(&world).row();
        let tower = place_tower(&mut world, TowerKind::Cannon, TileCoord::new(0, lane_row + 1));
        let enemy = spawn_enemy(&mut world, 10, 1.0);

        let mut events = Vec::new();
        let tile_length = query::tile_grid(&world).tile_length();
        let lane_entry = query::lane(&world).entry();
        let target_x = 0.5 * tile_length;
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs_f32((target_x - lane_entry.x()) / 1.0),
            },
            &mut events,
        );

        let enemy_position = query::enemy_view(&world)
            .iter()
            .next()
            .expect("enemy exists")
            .position;
        let gold_before = query::gold(&world);

        events.clear();
        apply(
            &mut world,
            Command::FireProjectile {
                tower,
                target: enemy,
                aim: enemy_position,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(400),
            },
            &mut events,
        );

        let expected_bounty = bounty_for(10);
        assert!(events.iter().any(|event| matches!(
            event,
            Event::EnemyDied { enemy: died, bounty }
                if *died == enemy && *bounty == expected_bounty
        )));
        assert_eq!(
            query::gold(&world),
            gold_before.saturating_add(expected_bounty)
        );
        assert_eq!(query::enemy_view(&world).iter().count(), 0);
    }

    #[test]
    fn expired_projectiles_release_incoming_damage() {
        let mut world = configured_world();
        let tower = place_tower(&mut world, TowerKind::Pulse, TileCoord::new(11, 0));
        let enemy = spawn_enemy(&mut world, 1_000, 1.0);

        // Aim away from the enemy so the shot can never connect.
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::FireProjectile {
                tower,
                target: enemy,
                aim: WorldPoint::new(1_200.0, 0.0),
            },
            &mut events,
        );
        assert!(matches!(events.first(), Some(Event::ProjectileFired { .. })));

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: PROJECTILE_LIFETIME,
            },
            &mut events,
        );

        assert!(events
            .iter()
            .any(|event| matches!(event, Event::ProjectileExpired { .. })));
        let view = query::enemy_view(&world);
        let snapshot = view.iter().next().expect("enemy survives");
        assert_eq!(snapshot.incoming_damage, 0);
    }

    #[test]
    fn configure_tile_grid_resets_the_battlefield() {
        let mut world = configured_world();
        let _ = place_tower(&mut world, TowerKind::Pulse, TileCoord::new(2, 1));
        let _ = spawn_enemy(&mut world, 30, 40.0);

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::ConfigureTileGrid {
                columns: 6,
                rows: 5,
                tile_length: 64.0,
            },
            &mut events,
        );

        assert_eq!(query::tile_grid(&world).columns(), 6);
        assert_eq!(query::lane(&world).row(), 2);
        assert_eq!(query::tower_view(&world).iter().count(), 0);
        assert_eq!(query::enemy_view(&world).iter().count(), 0);
        assert_eq!(query::selected_tower(&world), None);
    }
}
