use bevy_ecs::system::RunSystemOnce;
use glam::IVec2;
use pachorman::constants::timing;
use pachorman::map::Maze;
use pachorman::systems::{
    pellet_system, Archetype, DeferredAction, DeferredActions, GameRng, MoveClock, PelletKind, PelletManager, Player,
    SessionState,
};
use pretty_assertions::assert_eq;
use speculoos::prelude::*;

mod common;

fn generate(rate: f32, seed: u64) -> (Maze, PelletManager) {
    let maze = Maze::new(800, 600, 32);
    let mut rng = GameRng::new(Some(seed));
    let pellets = PelletManager::generate(&maze, rate, &mut rng.0);
    (maze, pellets)
}

#[test]
fn test_one_pellet_per_walkable_tile() {
    let (maze, pellets) = generate(1.0, 7);
    let walkable = maze.positions().filter(|tile| maze.is_walkable_at(*tile)).count();

    assert_eq!(pellets.total(), walkable);
    assert_eq!(pellets.remaining(), walkable);
    for pellet in pellets.pellets() {
        assert_that(&maze.is_walkable_at(pellet.tile)).is_true();
        assert_eq!(pellet.position, maze.tile_center(pellet.tile));
        assert_eq!(pellet.value, pellet.kind.value());
        assert_that(&pellet.active).is_true();
    }
}

#[test]
fn test_zero_rate_places_only_normal_pellets() {
    let (_, pellets) = generate(0.0, 7);
    assert_that(&pellets.pellets().iter().all(|p| p.kind == PelletKind::Normal)).is_true();
}

#[test]
fn test_same_seed_same_layout() {
    let (_, a) = generate(1.0, 99);
    let (_, b) = generate(1.0, 99);
    let kinds_a: Vec<PelletKind> = a.pellets().iter().map(|p| p.kind).collect();
    let kinds_b: Vec<PelletKind> = b.pellets().iter().map(|p| p.kind).collect();
    assert_eq!(kinds_a, kinds_b);
}

#[test]
fn test_eat_is_once_per_pellet() {
    let (_, mut pellets) = generate(0.0, 7);
    let total = pellets.total();
    let tile = IVec2::new(5, 5);

    let eaten = pellets.eat(tile);
    assert_that(&eaten.map(|p| p.value)).is_equal_to(Some(10));
    assert_eq!(pellets.remaining(), total - 1);

    assert_that(&pellets.eat(tile)).is_none();
    assert_eq!(pellets.remaining(), total - 1);

    // Walls never hold a pellet
    assert_that(&pellets.eat(IVec2::new(0, 0))).is_none();
}

#[test]
fn test_remaining_matches_active_count() {
    let (maze, mut pellets) = generate(1.0, 3);
    for tile in maze.positions().step_by(3) {
        pellets.eat(tile);
    }
    let active = pellets.pellets().iter().filter(|p| p.active).count();
    assert_eq!(pellets.remaining(), active);
}

#[test]
fn test_power_pellet_slows_enemies() {
    let (_, pellets) = generate(1.0, 42);
    let power_tile = pellets
        .pellets()
        .iter()
        .find(|p| p.kind == PelletKind::Power)
        .map(|p| p.tile)
        .expect("A full special rate should place at least one power pellet");

    let mut world = common::create_test_world();
    world.insert_resource(pellets);
    let player = common::spawn_test_player(&mut world, power_tile);
    let ghost = common::spawn_test_ghost(&mut world, Archetype::Red, IVec2::new(12, 9));
    let boss = common::spawn_test_boss(&mut world, IVec2::new(2, 2));

    world.run_system_once(pellet_system).expect("System should run successfully");

    let player = world.get::<Player>(player).unwrap();
    assert_that(&player.is_powered()).is_true();
    assert_eq!(player.power_remaining(), timing::POWER_DURATION);
    assert_eq!(player.score, 50);
    assert_eq!(player.pellets_eaten, 1);

    assert_eq!(world.get::<MoveClock>(ghost).unwrap().modifier, timing::POWER_SLOWDOWN);
    assert_eq!(world.get::<MoveClock>(boss).unwrap().modifier, timing::POWER_SLOWDOWN);

    let session = world.resource::<SessionState>();
    assert_eq!(session.power_epoch, 1);
    assert_eq!(session.enemy_speed_modifier, timing::POWER_SLOWDOWN);

    let deferred = world.resource::<DeferredActions>();
    assert_eq!(deferred.len(), 1);
    assert_eq!(deferred.pending()[0].action, DeferredAction::RestoreEnemySpeed { epoch: 1 });
    assert_eq!(deferred.pending()[0].remaining, timing::POWER_DURATION);
}

#[test]
fn test_normal_pellet_leaves_enemies_alone() {
    let (_, pellets) = generate(0.0, 42);

    let mut world = common::create_test_world();
    world.insert_resource(pellets);
    let player = common::spawn_test_player(&mut world, IVec2::new(5, 5));
    let ghost = common::spawn_test_ghost(&mut world, Archetype::Red, IVec2::new(12, 9));

    world.run_system_once(pellet_system).expect("System should run successfully");
    world.run_system_once(pellet_system).expect("System should run successfully");

    assert_eq!(world.get::<Player>(player).unwrap().score, 10);
    assert_eq!(world.get::<MoveClock>(ghost).unwrap().modifier, 1.0);
    assert_that(&world.resource::<DeferredActions>().is_empty()).is_true();
}
