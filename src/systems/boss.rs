use bevy_ecs::{
    bundle::Bundle,
    component::Component,
    query::{With, Without},
    system::{Commands, NonSendMut, Query, Res, ResMut},
};
use glam::Vec2;
use tracing::{info, warn};

use crate::{
    constants::{color, size, spawn, timing},
    map::maze::Maze,
    systems::{
        components::{DeltaTime, EntityType, GameRng, PlayerControlled, Settings, SpawnPoint},
        ghost::{pursue_step, AiClock, AiMode, AiState},
        movement::{Heading, MoveClock, TilePosition},
        player::Player,
        render::{RendererResource, Shape, Visual},
        state::SessionState,
    },
};

/// The elite chaser that shows up when the player is down to its last lives.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Boss {
    /// Whether the boss shared the player's tile on the previous collision check.
    pub in_contact: bool,
}

#[derive(Bundle)]
pub struct BossBundle {
    pub boss: Boss,
    pub entity_type: EntityType,
    pub position: TilePosition,
    pub spawn: SpawnPoint,
    pub heading: Heading,
    pub clock: MoveClock,
    pub ai: AiState,
    pub ai_clock: AiClock,
    pub visual: Visual,
}

/// Whether a player with `lives` left should be facing the boss.
pub fn should_spawn(settings: &Settings, lives: u32) -> bool {
    settings.0.difficulty.boss_enabled && lives > 0 && lives <= settings.0.boss_trigger_lives
}

/// Spawns the boss once the player's lives reach the trigger.
///
/// Runs every active tick but only acts while no boss is present.
pub fn boss_spawn_system(
    mut commands: Commands,
    maze: Res<Maze>,
    settings: Res<Settings>,
    mut session: ResMut<SessionState>,
    mut renderer: NonSendMut<RendererResource>,
    players: Query<(&Player, &TilePosition), With<PlayerControlled>>,
) {
    if session.boss_active {
        return;
    }

    let Ok((player, player_position)) = players.single() else {
        warn!("No single player found for boss spawn check");
        return;
    };

    if !should_spawn(&settings, player.lives) {
        return;
    }

    let tile = maze.nearest_walkable_tile(spawn::BOSS_TILE);
    let handle = renderer
        .0
        .create_visual(Shape::Circle, maze.tile_center(tile), Vec2::splat(size::BOSS), color::BOSS);

    commands.spawn(BossBundle {
        boss: Boss::default(),
        entity_type: EntityType::Boss,
        position: TilePosition(tile),
        spawn: SpawnPoint(tile),
        heading: Heading::default(),
        clock: MoveClock::new(settings.player_move_delay()).with_modifier(session.enemy_speed_modifier),
        ai: AiState {
            mode: AiMode::Chase,
            target: player_position.0,
        },
        ai_clock: AiClock::new(timing::BOSS_AI_DELAY),
        visual: Visual(handle),
    });
    session.boss_active = true;

    info!(tile = ?tile, lives = player.lives, level = session.level, "Boss spawned");
}

/// Points the boss at the player's current tile whenever its AI clock elapses.
pub fn boss_ai_system(
    delta_time: Res<DeltaTime>,
    players: Query<&TilePosition, With<PlayerControlled>>,
    mut bosses: Query<(&mut AiState, &mut AiClock), (With<Boss>, Without<PlayerControlled>)>,
) {
    let Ok(player) = players.single() else {
        return;
    };

    for (mut state, mut clock) in bosses.iter_mut() {
        if clock.tick(delta_time.millis) {
            *state = AiState {
                mode: AiMode::Chase,
                target: player.0,
            };
        }
    }
}

/// Steps the boss with the same rule the ghosts use.
pub fn boss_movement_system(
    maze: Res<Maze>,
    delta_time: Res<DeltaTime>,
    mut rng: ResMut<GameRng>,
    mut bosses: Query<(&mut TilePosition, &mut Heading, &mut MoveClock, &mut AiState), (With<Boss>, Without<PlayerControlled>)>,
) {
    for (mut position, mut heading, mut clock, mut state) in bosses.iter_mut() {
        if clock.tick(delta_time.millis) {
            pursue_step(&maze, &mut position, &mut heading, &mut state, &mut rng.0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Difficulty, GameConfig};

    #[test]
    fn test_spawn_trigger() {
        let settings = Settings(GameConfig::default());
        assert!(should_spawn(&settings, 1));
        assert!(!should_spawn(&settings, 2));
        assert!(!should_spawn(&settings, 0));

        let easy = Settings(GameConfig::with_difficulty(Difficulty::Easy));
        assert!(!should_spawn(&easy, 1));
    }
}
