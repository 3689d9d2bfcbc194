use std::time::Duration;

use spire_defence_core::{
    Command, EnemyColor, Gold, TileCoord, TowerKind, TowerTarget,
};
use spire_defence_system_targeting::Targeting;
use spire_defence_world::{self as world, query, scaffolding, World};

const STEP: Duration = Duration::from_millis(100);

#[derive(Debug, PartialEq)]
struct TargetRecord {
    tower: u32,
    enemy: u32,
}

fn replay() -> Vec<Vec<TargetRecord>> {
    let mut world = World::new();
    let mut targeting = Targeting::new();
    let mut events = Vec::new();
    let mut targets: Vec<TowerTarget> = Vec::new();
    let mut assignments = Vec::new();

    world::apply(
        &mut world,
        Command::ConfigureEconomy {
            starting_gold: Gold::new(1_000),
            starting_lives: 10,
        },
        &mut events,
    );

    let lane_row = query::lane(&world).row();
    world::apply(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Pulse,
            tile: TileCoord::new(2, lane_row + 1),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::SpawnEnemy {
            health: 60,
            speed: 80.0,
            color: EnemyColor::from_rgb(200, 40, 40),
        },
        &mut events,
    );

    for _ in 0..100 {
        events.clear();
        world::apply(&mut world, Command::Tick { dt: STEP }, &mut events);

        targeting.handle(
            &query::tower_view(&world),
            &query::enemy_view(&world),
            query::tile_grid(&world),
            true,
            &mut targets,
        );

        assignments.push(
            targets
                .iter()
                .map(|target| TargetRecord {
                    tower: target.tower.get(),
                    enemy: target.enemy.get(),
                })
                .collect(),
        );
    }

    assignments
}

#[test]
fn replay_produces_identical_assignments() {
    let first = replay();
    let second = replay();

    assert_eq!(first, second, "replay diverged between runs");

    // The enemy starts outside the tower's range, walks through it, and
    // leaves again; the assignment timeline must reflect all three phases.
    assert!(first.first().expect("snapshots recorded").is_empty());
    assert!(first.iter().any(|snapshot| !snapshot.is_empty()));
    assert!(first.last().expect("snapshots recorded").is_empty());
}

#[test]
fn doomed_enemies_are_skipped_against_a_live_world() {
    let mut world = World::new();
    let mut targeting = Targeting::new();
    let mut events = Vec::new();
    let mut targets = Vec::new();

    world::apply(
        &mut world,
        Command::ConfigureEconomy {
            starting_gold: Gold::new(1_000),
            starting_lives: 10,
        },
        &mut events,
    );
    let lane_row = query::lane(&world).row();
    world::apply(
        &mut world,
        Command::PlaceTower {
            kind: TowerKind::Pulse,
            tile: TileCoord::new(2, lane_row + 1),
        },
        &mut events,
    );

    let tile_grid = *query::tile_grid(&world);
    let lane_y = query::lane(&world).entry().y();
    let near = spire_defence_core::WorldPoint::new(240.0, lane_y);
    let far = spire_defence_core::WorldPoint::new(300.0, lane_y);

    // The nearer enemy is already covered by in-flight damage.
    let _doomed = scaffolding::seed_enemy(
        &mut world,
        near,
        spire_defence_core::WorldVec::new(80.0, 0.0),
        10,
        10,
    );
    let healthy = scaffolding::seed_enemy(
        &mut world,
        far,
        spire_defence_core::WorldVec::new(80.0, 0.0),
        60,
        0,
    );

    targeting.handle(
        &query::tower_view(&world),
        &query::enemy_view(&world),
        &tile_grid,
        true,
        &mut targets,
    );

    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].enemy, healthy);
}
