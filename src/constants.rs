//! This module contains all the constants used in the game.

use std::time::Duration;

use glam::UVec2;

pub const LOOP_TIME: Duration = Duration::from_nanos((1_000_000_000.0 / 60.0) as u64);

/// The size of each tile, in pixels.
pub const TILE_SIZE: u32 = 32;
/// The size of the play field, in pixels.
pub const CANVAS_SIZE: UVec2 = UVec2::new(800, 600);

/// An enum representing the different types of tiles in the maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MapTile {
    /// A walkable corridor tile.
    #[default]
    Path,
    /// A wall tile.
    Wall,
}

/// Movement and decision cadences, in milliseconds.
pub mod timing {
    /// Time between two player steps at a speed multiplier of 1.0.
    pub const PLAYER_MOVE_DELAY: f32 = 150.0;
    /// Time between two enemy steps on level 1.
    pub const ENEMY_MOVE_DELAY: f32 = 180.0;
    /// Time between two enemy re-target decisions.
    pub const ENEMY_AI_DELAY: f32 = 400.0;
    /// Time between two boss re-target decisions.
    pub const BOSS_AI_DELAY: f32 = 300.0;
    /// Length of the invulnerability window after being hit.
    pub const INVULNERABILITY_DURATION: f32 = 2000.0;
    /// Duration of a power pellet's effect.
    pub const POWER_DURATION: f32 = 8000.0;
    /// Duration of an invincibility pellet's effect.
    pub const INVINCIBILITY_DURATION: f32 = 6000.0;
    /// Delay between the level-complete banner and the next level.
    pub const LEVEL_TRANSITION_DELAY: f32 = 2000.0;
    /// Delay between the game-over banner and the session restart.
    pub const GAME_OVER_RESTART_DELAY: f32 = 3000.0;
    /// Factor applied to enemy and boss move delays while a power-up is active.
    pub const POWER_SLOWDOWN: f32 = 1.5;
}

/// Score values awarded for collectibles and takedowns.
pub mod score {
    pub const PELLET: u32 = 10;
    pub const POWER_PELLET: u32 = 50;
    pub const INVINCIBILITY_PELLET: u32 = 100;
    /// Bonus for eating a ghost while invincible.
    pub const GHOST_BONUS: u32 = 200;
    /// Bonus for touching the boss while invincible.
    pub const BOSS_BONUS: u32 = 500;
}

/// Pellet classification and sizes.
pub mod pellet {
    /// Base probability of an invincibility pellet, before the special pellet rate is applied.
    pub const INVINCIBILITY_THRESHOLD: f32 = 0.05;
    /// Base cumulative probability of a power pellet, before the special pellet rate is applied.
    pub const POWER_THRESHOLD: f32 = 0.10;

    pub const NORMAL_RADIUS: f32 = 2.0;
    pub const POWER_RADIUS: f32 = 4.0;
    pub const INVINCIBILITY_RADIUS: f32 = 5.0;
}

/// Enemy AI tuning.
pub mod ai {
    /// Tile distance under which an enemy switches to chase mode (300px at 32px tiles).
    pub const CHASE_DISTANCE: f32 = 9.0;
    /// How far ahead an enemy retargets after a blocked step.
    pub const DETOUR_LENGTH: i32 = 3;
    /// Radius of the erratic archetype's random target around the player.
    pub const JITTER_RADIUS: i32 = 3;
}

/// Spawn layout, expressed in pixels of the play field.
pub mod spawn {
    use glam::Vec2;

    /// Where the player is placed at the start of every level.
    pub const PLAYER: Vec2 = Vec2::new(400.0, 500.0);
    /// Where the boss appears, in tiles.
    pub const BOSS_TILE: glam::IVec2 = glam::IVec2::new(2, 2);
    /// Ghost spawn tiles relative to the maze center, cycled when there are more ghosts.
    pub const GHOST_OFFSETS: [glam::IVec2; 4] = [
        glam::IVec2::new(0, -1),
        glam::IVec2::new(-2, 0),
        glam::IVec2::new(2, 0),
        glam::IVec2::new(0, 1),
    ];
    /// Half extents of the enemy spawn room, in tiles.
    pub const ROOM_HALF_WIDTH: i32 = 3;
    pub const ROOM_HALF_HEIGHT: i32 = 2;
}

/// Visual sizes handed to the render collaborator, in pixels.
pub mod size {
    pub const PLAYER: f32 = 24.0;
    pub const GHOST: f32 = 24.0;
    pub const BOSS: f32 = 28.0;
}

/// Colors handed to the render collaborator, as 0xRRGGBB.
pub mod color {
    pub const WALL: u32 = 0x0033FF;
    pub const PLAYER: u32 = 0xFFFF00;
    pub const BOSS: u32 = 0x000000;
    pub const PELLET: u32 = 0xFFB897;
    pub const POWER_PELLET: u32 = 0xFF6B9D;
    pub const INVINCIBILITY_PELLET: u32 = 0x00FFFF;
}
