use std::time::Duration;

use spire_defence_core::{Command, Event};
use spire_defence_system_spawning::{Config, Spawning};
use spire_defence_world::{self as world, query, World};

const STEP: Duration = Duration::from_millis(100);

#[test]
fn spawned_commands_populate_the_world_lane() {
    let mut world = World::new();
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(500), 11, 40, 60.0, 0.1));

    let mut events = Vec::new();
    let mut commands = Vec::new();

    for _ in 0..20 {
        events.clear();
        world::apply(&mut world, Command::Tick { dt: STEP }, &mut events);

        commands.clear();
        spawning.handle(&events, &mut commands);
        for command in commands.drain(..) {
            world::apply(&mut world, command, &mut events);
        }
    }

    // Two seconds at a 500ms cadence puts four enemies on the lane.
    let view = query::enemy_view(&world);
    assert_eq!(view.iter().count(), 4);

    let entry_x = query::lane(&world).entry().x();
    for snapshot in view.iter() {
        assert!(snapshot.health >= 36 && snapshot.health <= 44);
        assert!(snapshot.position.x() >= entry_x);
        assert!(snapshot.velocity.x() > 0.0);
    }
}

#[test]
fn spawn_events_are_reported_for_every_command() {
    let mut world = World::new();
    let mut spawning = Spawning::new(Config::new(Duration::from_millis(250), 3, 25, 80.0, 0.0));

    let mut tick_events = Vec::new();
    world::apply(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(1),
        },
        &mut tick_events,
    );

    let mut commands = Vec::new();
    spawning.handle(&tick_events, &mut commands);
    assert_eq!(commands.len(), 4);

    let mut spawn_events = Vec::new();
    for command in commands {
        world::apply(&mut world, command, &mut spawn_events);
    }

    let spawned = spawn_events
        .iter()
        .filter(|event| matches!(event, Event::EnemySpawned { .. }))
        .count();
    assert_eq!(spawned, 4);
}
