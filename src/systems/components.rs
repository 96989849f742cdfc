use bevy_ecs::{component::Component, resource::Resource};
use glam::IVec2;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::config::GameConfig;
use crate::constants::timing;

/// A tag component denoting the type of actor.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Player,
    Ghost,
    Boss,
}

/// Marks the entity driven by the directional input.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PlayerControlled;

/// The tile an actor returns to on every level start (and when eaten).
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnPoint(pub IVec2);

#[derive(Resource)]
pub struct DeltaTime {
    /// Simulated time since the previous tick, in milliseconds
    pub millis: f32,
}

impl DeltaTime {
    pub fn from_millis(millis: f32) -> Self {
        Self { millis }
    }
}

/// The configuration the running session was started with.
#[derive(Resource, Debug, Clone)]
pub struct Settings(pub GameConfig);

impl Settings {
    /// Milliseconds between two player steps.
    pub fn player_move_delay(&self) -> f32 {
        timing::PLAYER_MOVE_DELAY / self.0.difficulty.player_speed_multiplier
    }

    /// Milliseconds between two ghost steps on `level`.
    ///
    /// Ghosts speed up by `speed_increment` per level but never step faster than the player.
    pub fn enemy_move_delay(&self, level: u32) -> f32 {
        let exponent = level.saturating_sub(1) as i32;
        let scaled = timing::ENEMY_MOVE_DELAY / self.0.speed_increment.powi(exponent);
        scaled.max(self.player_move_delay())
    }
}

/// The single source of randomness for the simulation.
#[derive(Resource)]
pub struct GameRng(pub SmallRng);

impl GameRng {
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self(SmallRng::seed_from_u64(seed)),
            None => Self(SmallRng::from_os_rng()),
        }
    }
}
