use std::time::{Duration, Instant};

use anyhow::Result;
use rand::rngs::SmallRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::{event, info};

use crate::config::GameConfig;
use crate::constants::LOOP_TIME;
use crate::formatter;
use crate::game::Game;
use crate::map::direction::Direction;
use crate::systems::InputSnapshot;

/// How long the autopilot holds a direction before reconsidering, in milliseconds.
const AUTOPILOT_HOLD: std::ops::Range<f32> = 300.0..1200.0;

/// Feeds random directional input, standing in for a keyboard.
struct Autopilot {
    rng: SmallRng,
    held: Direction,
    remaining: f32,
}

impl Autopilot {
    fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            // Offset so the autopilot does not mirror the simulation's own draws
            Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(1)),
            None => SmallRng::from_os_rng(),
        };
        Self {
            rng,
            held: Direction::Left,
            remaining: 0.0,
        }
    }

    fn next_input(&mut self, delta_ms: f32) -> InputSnapshot {
        self.remaining -= delta_ms;
        if self.remaining <= 0.0 {
            self.held = *Direction::DIRECTIONS.choose(&mut self.rng).unwrap_or(&Direction::Left);
            self.remaining = self.rng.random_range(AUTOPILOT_HOLD);
        }
        InputSnapshot::from(self.held)
    }
}

/// Limits for a headless run.
#[derive(Debug, Clone, Copy)]
pub struct RunLimits {
    /// Stop once this many sessions ended in a game over.
    pub sessions: u64,
    /// Stop after this many ticks regardless.
    pub max_ticks: u64,
}

impl Default for RunLimits {
    fn default() -> Self {
        Self {
            sessions: 1,
            max_ticks: 60 * 60 * 10,
        }
    }
}

/// Drives a headless game at a fixed 60 Hz with autopilot input.
pub struct App {
    pub game: Game,
    autopilot: Autopilot,
    limits: RunLimits,
    ticks: u64,
    generation: u64,
    last_tick: Instant,
}

impl App {
    pub fn new(config: GameConfig, limits: RunLimits) -> Result<Self> {
        let autopilot = Autopilot::new(config.seed);
        let game = Game::headless(config)?;
        let generation = game.session().generation;

        Ok(Self {
            game,
            autopilot,
            limits,
            ticks: 0,
            generation,
            last_tick: Instant::now(),
        })
    }

    /// Runs one tick and sleeps out the rest of the frame. Returns false once a limit is hit.
    pub fn run(&mut self) -> bool {
        let start = Instant::now();

        let dt = self.last_tick.elapsed().as_secs_f32() * 1000.0;
        self.last_tick = start;

        let input = self.autopilot.next_input(dt);
        self.game.set_input(input);
        self.game.tick(dt);

        self.ticks += 1;
        formatter::increment_tick();
        formatter::set_level(self.game.level());

        let generation = self.game.session().generation;
        if generation != self.generation {
            self.generation = generation;
            self.limits.sessions = self.limits.sessions.saturating_sub(1);
            if self.limits.sessions == 0 {
                info!(ticks = self.ticks, "Session limit reached. Exiting...");
                return false;
            }
        }
        if self.ticks >= self.limits.max_ticks {
            info!(ticks = self.ticks, "Tick limit reached. Exiting...");
            return false;
        }

        if start.elapsed() < LOOP_TIME {
            let time = LOOP_TIME.saturating_sub(start.elapsed());
            if time != Duration::ZERO {
                spin_sleep::sleep(time);
            }
        } else {
            event!(
                tracing::Level::WARN,
                "Game loop behind schedule by: {:?}",
                start.elapsed() - LOOP_TIME
            );
        }

        true
    }
}
