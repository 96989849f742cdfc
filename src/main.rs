use std::env;

use anyhow::{Context, Result};
use pachorman::app::{App, RunLimits};
use pachorman::config::{Difficulty, GameConfig};
use pachorman::constants::LOOP_TIME;
use pachorman::formatter::CustomFormatter;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

fn setup_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .event_format(CustomFormatter)
        .with_env_filter(filter)
        .finish()
        .with(ErrorLayer::default());

    tracing::subscriber::set_global_default(subscriber).context("Could not set global default subscriber")
}

/// Builds the session configuration from `PACHORMAN_DIFFICULTY` and `PACHORMAN_SEED`.
fn config_from_env() -> Result<GameConfig> {
    let difficulty = match env::var("PACHORMAN_DIFFICULTY") {
        Ok(name) => Difficulty::parse(&name)?,
        Err(_) => Difficulty::default(),
    };

    let mut config = GameConfig::with_difficulty(difficulty);
    if let Ok(seed) = env::var("PACHORMAN_SEED") {
        config = config.seeded(seed.parse().with_context(|| format!("Invalid PACHORMAN_SEED: {seed}"))?);
    }

    info!(%difficulty, seed = ?config.seed, "Configuration loaded");
    Ok(config)
}

fn limits_from_env() -> Result<RunLimits> {
    let mut limits = RunLimits::default();
    if let Ok(sessions) = env::var("PACHORMAN_SESSIONS") {
        limits.sessions = sessions
            .parse()
            .with_context(|| format!("Invalid PACHORMAN_SESSIONS: {sessions}"))?;
    }
    Ok(limits)
}

pub fn main() -> Result<()> {
    setup_tracing()?;

    let config = config_from_env()?;
    let limits = limits_from_env()?;
    let mut app = App::new(config, limits)?;

    info!(loop_time = ?LOOP_TIME, "Starting game loop");
    while app.run() {}

    Ok(())
}
