//! Score, lives and banner notifications for whatever displays them.

pub mod log;

pub use self::log::*;

use bevy_ecs::{
    query::With,
    system::{Local, NonSendMut, Query},
};

use crate::systems::{components::PlayerControlled, player::Player};

/// The on-screen HUD, as seen by the simulation.
pub trait Hud {
    fn update_score(&mut self, score: u32);
    fn update_level(&mut self, level: u32);
    fn update_lives(&mut self, lives: u32);
    fn show_level_complete(&mut self, next_level: u32);
    fn show_game_over(&mut self, final_score: u32);
}

/// A non-send resource wrapping the active HUD.
pub struct HudResource(pub Box<dyn Hud>);

/// Pushes score and lives to the HUD when they differ from what it last received.
pub fn hud_system(
    mut hud: NonSendMut<HudResource>,
    mut last: Local<Option<(u32, u32)>>,
    players: Query<&Player, With<PlayerControlled>>,
) {
    let Ok(player) = players.single() else {
        return;
    };

    let (last_score, last_lives) = match *last {
        Some((score, lives)) => (Some(score), Some(lives)),
        None => (None, None),
    };

    if last_score != Some(player.score) {
        hud.0.update_score(player.score);
    }
    if last_lives != Some(player.lives) {
        hud.0.update_lives(player.lives);
    }

    *last = Some((player.score, player.lives));
}
