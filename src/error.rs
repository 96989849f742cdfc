//! Centralized error types for the maze chase.
//!
//! Gameplay itself has no failure paths (every odd situation has a defined
//! fallback), so errors only surface while validating a configuration or
//! while bootstrapping the simulation.

/// Main error type for the game.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while validating a [`GameConfig`](crate::config::GameConfig).
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Tile size must be non-zero")]
    ZeroTileSize,

    #[error("Play field of {width}x{height}px holds a {cols}x{rows} grid, at least {min}x{min} tiles are required")]
    FieldTooSmall {
        width: u32,
        height: u32,
        cols: u32,
        rows: u32,
        min: u32,
    },

    #[error("Play field of {width}x{height}px holds a {cols}x{rows} grid, at most {max}x{max} tiles are supported")]
    FieldTooLarge {
        width: u32,
        height: u32,
        cols: u32,
        rows: u32,
        max: u32,
    },

    #[error("Player speed multiplier must be positive and finite, got {0}")]
    InvalidSpeedMultiplier(f32),

    #[error("Special pellet rate must lie within [0, 1], got {0}")]
    InvalidSpecialRate(f32),

    #[error("Speed increment must be at least 1.0, got {0}")]
    InvalidSpeedIncrement(f32),

    #[error("Starting lives must be at least 1")]
    NoLives,

    #[error("Unknown difficulty preset: {0}")]
    UnknownDifficulty(String),
}

/// Result type for game operations.
pub type GameResult<T> = Result<T, GameError>;
