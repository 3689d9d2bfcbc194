//! Frame-by-frame orchestration of the world, systems, and scene.
//!
//! The session runs the simulation on a fixed timestep and lets the
//! renderer interpolate entity positions between the last two steps, so
//! gameplay stays deterministic regardless of the display refresh rate.

use std::time::Duration;

use glam::Vec2;
use spire_defence_core::{
    Command, Gold, TileCoord, TowerId, TowerKind, TowerTarget, WorldPoint,
};
use spire_defence_rendering::{
    hud::{HudModel, TowerHudEntry},
    FrameInput, PlacementPreview, RangeRingPresentation, Scene, SceneEnemy, SceneProjectile,
    SceneTower,
};
use spire_defence_system_combat::Combat;
use spire_defence_system_spawning::{Config as SpawnConfig, Spawning};
use spire_defence_system_targeting::Targeting;
use spire_defence_world::{self as world, query, World};

/// Simulation step: 60 updates per simulated second.
const FIXED_STEP: Duration = Duration::from_micros(16_667);

/// Upper bound on buffered frame time, so a stalled window does not make
/// the simulation spiral through hundreds of catch-up steps.
const MAX_FRAME_DEBT: Duration = Duration::from_millis(250);

/// Settings captured from the command line.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SessionConfig {
    pub(crate) columns: u32,
    pub(crate) rows: u32,
    pub(crate) tile_length: f32,
    pub(crate) starting_gold: Gold,
    pub(crate) starting_lives: u32,
    pub(crate) spawn_interval: Duration,
    pub(crate) spawn_seed: u64,
    pub(crate) avoid_overkill: bool,
}

/// Live game session driving the world and systems each frame.
pub(crate) struct Session {
    world: World,
    targeting: Targeting,
    combat: Combat,
    spawning: Spawning,
    avoid_overkill: bool,
    armed_kind: TowerKind,
    show_ranges: bool,
    hovered_tile: Option<TileCoord>,
    accumulator: Duration,
    events: Vec<spire_defence_core::Event>,
    commands: Vec<Command>,
    targets: Vec<TowerTarget>,
}

impl Session {
    pub(crate) fn new(config: SessionConfig) -> Self {
        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::ConfigureTileGrid {
                columns: config.columns,
                rows: config.rows,
                tile_length: config.tile_length,
            },
            &mut events,
        );
        world::apply(
            &mut world,
            Command::ConfigureEconomy {
                starting_gold: config.starting_gold,
                starting_lives: config.starting_lives,
            },
            &mut events,
        );

        Self {
            world,
            targeting: Targeting::new(),
            combat: Combat::new(),
            spawning: Spawning::new(SpawnConfig::new(
                config.spawn_interval,
                config.spawn_seed,
                40,
                60.0,
                0.15,
            )),
            avoid_overkill: config.avoid_overkill,
            armed_kind: TowerKind::Pulse,
            show_ranges: true,
            hovered_tile: None,
            accumulator: Duration::ZERO,
            events: Vec::new(),
            commands: Vec::new(),
            targets: Vec::new(),
        }
    }

    /// Row occupied by the enemy lane.
    pub(crate) fn lane_row(&self) -> u32 {
        query::lane(&self.world).row()
    }

    /// Welcome banner sourced from the world.
    pub(crate) fn banner(&self) -> &'static str {
        query::welcome_banner(&self.world)
    }

    /// Translates edge-triggered frame input into world commands.
    pub(crate) fn handle_input(&mut self, input: &FrameInput) {
        if let Some(kind) = input.arm_kind {
            self.armed_kind = kind;
        }
        if input.toggle_range_pressed {
            self.show_ranges = !self.show_ranges;
        }
        self.hovered_tile = input.cursor_tile;

        self.events.clear();

        if input.confirm_released {
            if let Some(tile) = input.cursor_tile {
                match query::tower_at(&self.world, tile) {
                    Some(tower) => world::apply(
                        &mut self.world,
                        Command::SelectTower {
                            tower: Some(tower),
                        },
                        &mut self.events,
                    ),
                    None => {
                        if query::selected_tower(&self.world).is_some() {
                            world::apply(
                                &mut self.world,
                                Command::SelectTower { tower: None },
                                &mut self.events,
                            );
                        }
                        world::apply(
                            &mut self.world,
                            Command::PlaceTower {
                                kind: self.armed_kind,
                                tile,
                            },
                            &mut self.events,
                        );
                    }
                }
            }
        }

        if input.sell_released {
            let target = input
                .cursor_tile
                .and_then(|tile| query::tower_at(&self.world, tile))
                .or_else(|| query::selected_tower(&self.world));
            if let Some(tower) = target {
                world::apply(&mut self.world, Command::SellTower { tower }, &mut self.events);
            }
        }

        if input.upgrade_released {
            if let Some(tower) = query::selected_tower(&self.world) {
                world::apply(
                    &mut self.world,
                    Command::UpgradeTower { tower },
                    &mut self.events,
                );
            }
        }
    }

    /// Buffers elapsed frame time and runs the due fixed steps.
    pub(crate) fn advance(&mut self, frame_dt: Duration) {
        self.accumulator = (self.accumulator + frame_dt).min(MAX_FRAME_DEBT);
        while self.accumulator >= FIXED_STEP {
            self.accumulator -= FIXED_STEP;
            self.step();
        }
    }

    fn step(&mut self) {
        self.events.clear();
        world::apply(
            &mut self.world,
            Command::Tick { dt: FIXED_STEP },
            &mut self.events,
        );

        self.commands.clear();
        self.spawning.handle(&self.events, &mut self.commands);
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }

        self.targeting.handle(
            &query::tower_view(&self.world),
            &query::enemy_view(&self.world),
            query::tile_grid(&self.world),
            self.avoid_overkill,
            &mut self.targets,
        );

        self.commands.clear();
        self.combat.handle(
            &query::tower_cooldown_view(&self.world),
            &self.targets,
            &mut self.commands,
        );
        for command in self.commands.drain(..) {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }

    /// Rebuilds the scene from the current world state.
    ///
    /// Positions are interpolated between the previous and current fixed
    /// step using the leftover frame-time fraction.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        let alpha =
            (self.accumulator.as_secs_f32() / FIXED_STEP.as_secs_f32()).clamp(0.0, 1.0);
        let selected = query::selected_tower(&self.world);

        scene.towers.clear();
        for snapshot in query::tower_view(&self.world).iter() {
            scene.towers.push(SceneTower::new(
                snapshot.id,
                snapshot.kind,
                snapshot.level,
                snapshot.tile,
                selected == Some(snapshot.id),
            ));
        }

        scene.enemies.clear();
        for snapshot in query::enemy_view(&self.world).iter() {
            let position = snapshot.previous_position.lerp(snapshot.position, alpha);
            let health_fraction = if snapshot.max_health == 0 {
                0.0
            } else {
                snapshot.health as f32 / snapshot.max_health as f32
            };
            scene.enemies.push(SceneEnemy {
                id: snapshot.id,
                position: to_screen_vec(position),
                color: spire_defence_rendering::Color::from_rgb_u8(
                    snapshot.color.red(),
                    snapshot.color.green(),
                    snapshot.color.blue(),
                ),
                health_fraction,
            });
        }

        scene.projectiles.clear();
        for snapshot in query::projectile_view(&self.world).iter() {
            let position = snapshot.previous_position.lerp(snapshot.position, alpha);
            scene.projectiles.push(SceneProjectile {
                id: snapshot.id,
                position: to_screen_vec(position),
            });
        }

        scene.range_ring = self.range_ring(selected);
        scene.placement_preview = self.placement_preview();
        scene.hud = self.hud_model(selected);
    }

    fn range_ring(&self, selected: Option<TowerId>) -> Option<RangeRingPresentation> {
        if !self.show_ranges {
            return None;
        }

        let focus = selected.or_else(|| {
            self.hovered_tile
                .and_then(|tile| query::tower_at(&self.world, tile))
        })?;

        let view = query::tower_view(&self.world);
        let snapshot = view.iter().find(|snapshot| snapshot.id == focus)?;
        let attributes = snapshot.kind.attributes(snapshot.level)?;
        let center = query::tile_grid(&self.world)
            .tile_to_world(snapshot.tile, spire_defence_core::TileAnchor::Center);

        Some(RangeRingPresentation {
            center: to_screen_vec(center),
            radius: attributes.range,
        })
    }

    fn placement_preview(&self) -> Option<PlacementPreview> {
        let tile = self.hovered_tile?;
        if query::tower_at(&self.world, tile).is_some() {
            return None;
        }

        let placeable = tile.row() != query::lane(&self.world).row()
            && query::gold(&self.world).covers(self.armed_kind.purchase_cost());

        Some(PlacementPreview {
            kind: self.armed_kind,
            tile,
            placeable,
        })
    }

    fn hud_model(&self, selected: Option<TowerId>) -> HudModel {
        let selected_entry = selected.and_then(|tower| {
            let view = query::tower_view(&self.world);
            let snapshot = view.iter().find(|snapshot| snapshot.id == tower)?;
            let attributes = snapshot.kind.attributes(snapshot.level)?;

            Some(TowerHudEntry {
                kind: snapshot.kind,
                level: snapshot.level,
                max_level: snapshot.kind.max_level(),
                range: attributes.range,
                damage: attributes.damage,
                upgrade_cost: snapshot
                    .kind
                    .attributes(snapshot.level + 1)
                    .map(|next| next.cost),
                sell_refund: query::sell_refund(&self.world, tower).unwrap_or(Gold::ZERO),
            })
        });

        HudModel {
            gold: query::gold(&self.world),
            lives: query::lives(&self.world),
            armed_kind: Some(self.armed_kind),
            selected: selected_entry,
        }
    }
}

fn to_screen_vec(point: WorldPoint) -> Vec2 {
    Vec2::new(point.x(), point.y())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spire_defence_rendering::{Color, LanePresentation, TileGridPresentation};

    fn config() -> SessionConfig {
        SessionConfig {
            columns: 12,
            rows: 8,
            tile_length: 100.0,
            starting_gold: Gold::new(500),
            starting_lives: 10,
            spawn_interval: Duration::from_millis(100),
            spawn_seed: 7,
            avoid_overkill: true,
        }
    }

    fn empty_scene() -> Scene {
        Scene::empty(
            TileGridPresentation::new(12, 8, 100.0, Color::from_rgb_u8(0, 0, 0))
                .expect("valid grid"),
            LanePresentation::new(3, Color::from_rgb_u8(90, 90, 90)),
        )
    }

    fn click_on(tile: TileCoord) -> FrameInput {
        FrameInput {
            cursor_tile: Some(tile),
            confirm_released: true,
            ..FrameInput::default()
        }
    }

    #[test]
    fn fixed_steps_fire_once_enough_frame_time_accumulates() {
        let mut session = Session::new(config());

        // Six exact steps cross the 100ms spawn interval once.
        session.advance(FIXED_STEP * 6);

        assert_eq!(query::enemy_view(&session.world).iter().count(), 1);
    }

    #[test]
    fn frame_debt_is_capped() {
        let mut session = Session::new(config());

        // Ten buffered seconds collapse to the debt cap; the spawner sees
        // at most 250ms of simulated time.
        session.advance(Duration::from_secs(10));

        assert!(query::enemy_view(&session.world).iter().count() <= 3);
    }

    #[test]
    fn clicking_empty_ground_places_the_armed_tower() {
        let mut session = Session::new(config());
        let tile = TileCoord::new(2, 1);

        session.handle_input(&click_on(tile));

        assert!(query::tower_at(&session.world, tile).is_some());
        assert_eq!(
            query::gold(&session.world),
            Gold::new(500).saturating_sub(TowerKind::Pulse.purchase_cost())
        );
    }

    #[test]
    fn clicking_a_tower_selects_it_and_upgrade_key_levels_it() {
        let mut session = Session::new(config());
        let tile = TileCoord::new(2, 1);

        session.handle_input(&click_on(tile));
        session.handle_input(&click_on(tile));

        let tower = query::tower_at(&session.world, tile).expect("tower placed");
        assert_eq!(query::selected_tower(&session.world), Some(tower));

        session.handle_input(&FrameInput {
            upgrade_released: true,
            ..FrameInput::default()
        });

        let view = query::tower_view(&session.world);
        let snapshot = view.iter().next().expect("tower exists");
        assert_eq!(snapshot.level, 1);
    }

    #[test]
    fn arming_a_kind_changes_what_gets_placed() {
        let mut session = Session::new(config());
        let tile = TileCoord::new(4, 1);

        session.handle_input(&FrameInput {
            arm_kind: Some(TowerKind::Cannon),
            ..FrameInput::default()
        });
        session.handle_input(&click_on(tile));

        let view = query::tower_view(&session.world);
        let snapshot = view.iter().next().expect("tower exists");
        assert_eq!(snapshot.kind, TowerKind::Cannon);
    }

    #[test]
    fn right_release_sells_the_hovered_tower() {
        let mut session = Session::new(config());
        let tile = TileCoord::new(2, 1);
        session.handle_input(&click_on(tile));

        session.handle_input(&FrameInput {
            cursor_tile: Some(tile),
            sell_released: true,
            ..FrameInput::default()
        });

        assert!(query::tower_at(&session.world, tile).is_none());
    }

    #[test]
    fn scene_population_reflects_selection_and_preview() {
        let mut session = Session::new(config());
        let tower_tile = TileCoord::new(2, 1);
        session.handle_input(&click_on(tower_tile));
        session.handle_input(&click_on(tower_tile));

        // Hover an empty tile so the preview appears.
        let empty_tile = TileCoord::new(5, 5);
        session.handle_input(&FrameInput {
            cursor_tile: Some(empty_tile),
            ..FrameInput::default()
        });

        let mut scene = empty_scene();
        session.populate_scene(&mut scene);

        assert_eq!(scene.towers.len(), 1);
        assert!(scene.towers[0].selected);
        assert!(scene.range_ring.is_some());

        let preview = scene.placement_preview.expect("preview on empty tile");
        assert_eq!(preview.tile, empty_tile);
        assert!(preview.placeable);

        assert_eq!(scene.hud.lives, 10);
        let entry = scene.hud.selected.as_ref().expect("selected tower entry");
        assert_eq!(entry.level, 0);
        assert!(entry.upgrade_cost.is_some());
    }

    #[test]
    fn lane_tiles_preview_as_blocked() {
        let mut session = Session::new(config());
        let lane_tile = TileCoord::new(5, session.lane_row());

        session.handle_input(&FrameInput {
            cursor_tile: Some(lane_tile),
            ..FrameInput::default()
        });

        let mut scene = empty_scene();
        session.populate_scene(&mut scene);

        let preview = scene.placement_preview.expect("preview on lane tile");
        assert!(!preview.placeable);
    }
}
