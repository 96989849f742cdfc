//! Session configuration and difficulty presets.

use std::str::FromStr;

use strum_macros::{Display, EnumIter, EnumString};

use crate::constants::{CANVAS_SIZE, TILE_SIZE};
use crate::error::ConfigError;

/// Smallest grid (in tiles, per axis) a session can be played on.
pub const MIN_GRID_TILES: u32 = 5;

/// Largest grid (in tiles, per axis); keeps tile coordinates and the tile count well inside `i32`.
pub const MAX_GRID_TILES: u32 = 1024;

/// Named difficulty presets selectable before a session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                player_speed_multiplier: 1.2,
                enemy_count: 2,
                lives: 5,
                boss_enabled: false,
                special_pellet_rate: 1.0,
            },
            Difficulty::Normal => DifficultyProfile {
                player_speed_multiplier: 1.0,
                enemy_count: 4,
                lives: 3,
                boss_enabled: true,
                special_pellet_rate: 1.0,
            },
            Difficulty::Hard => DifficultyProfile {
                player_speed_multiplier: 0.9,
                enemy_count: 4,
                lives: 1,
                boss_enabled: true,
                special_pellet_rate: 0.5,
            },
        }
    }

    /// Parses a preset name, reporting unknown names as a configuration error.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        Difficulty::from_str(name.trim()).map_err(|_| ConfigError::UnknownDifficulty(name.to_string()))
    }
}

/// Tuning knobs that stay fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    /// Scales the player's step rate; 1.0 is one tile every 150ms.
    pub player_speed_multiplier: f32,
    /// Number of ghosts, drawn from the archetype table in order.
    pub enemy_count: usize,
    /// Starting lives, also the cap for the per-level life refund.
    pub lives: u32,
    /// Whether the boss may appear at all.
    pub boss_enabled: bool,
    /// Multiplier in `[0, 1]` applied to the power and invincibility pellet odds.
    pub special_pellet_rate: f32,
}

impl Default for DifficultyProfile {
    fn default() -> Self {
        Difficulty::default().profile()
    }
}

/// Everything needed to start a session.
#[derive(Debug, Clone, PartialEq)]
pub struct GameConfig {
    /// Play field width, in pixels.
    pub width: u32,
    /// Play field height, in pixels.
    pub height: u32,
    /// Edge length of a tile, in pixels.
    pub tile_size: u32,
    pub difficulty: DifficultyProfile,
    /// Per-level growth of enemy speed (1.05 is 5% faster each level).
    pub speed_increment: f32,
    /// The boss appears once the player's lives drop to this value.
    pub boss_trigger_lives: u32,
    /// Seed for the simulation RNG; `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: CANVAS_SIZE.x,
            height: CANVAS_SIZE.y,
            tile_size: TILE_SIZE,
            difficulty: DifficultyProfile::default(),
            speed_increment: 1.05,
            boss_trigger_lives: 1,
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn with_difficulty(difficulty: Difficulty) -> Self {
        Self {
            difficulty: difficulty.profile(),
            ..Self::default()
        }
    }

    pub fn seeded(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks every field, returning the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tile_size == 0 {
            return Err(ConfigError::ZeroTileSize);
        }

        let cols = self.width / self.tile_size;
        let rows = self.height / self.tile_size;
        if cols < MIN_GRID_TILES || rows < MIN_GRID_TILES {
            return Err(ConfigError::FieldTooSmall {
                width: self.width,
                height: self.height,
                cols,
                rows,
                min: MIN_GRID_TILES,
            });
        }
        if cols > MAX_GRID_TILES || rows > MAX_GRID_TILES {
            return Err(ConfigError::FieldTooLarge {
                width: self.width,
                height: self.height,
                cols,
                rows,
                max: MAX_GRID_TILES,
            });
        }

        let profile = &self.difficulty;
        if !(profile.player_speed_multiplier.is_finite() && profile.player_speed_multiplier > 0.0) {
            return Err(ConfigError::InvalidSpeedMultiplier(profile.player_speed_multiplier));
        }
        if !(0.0..=1.0).contains(&profile.special_pellet_rate) {
            return Err(ConfigError::InvalidSpecialRate(profile.special_pellet_rate));
        }
        if profile.lives == 0 {
            return Err(ConfigError::NoLives);
        }
        if !(self.speed_increment.is_finite() && self.speed_increment >= 1.0) {
            return Err(ConfigError::InvalidSpeedIncrement(self.speed_increment));
        }

        Ok(())
    }
}
