use bevy_ecs::{
    bundle::Bundle,
    component::Component,
    query::With,
    system::{Query, Res},
};
use bitflags::bitflags;
use tracing::{debug, trace};

use crate::{
    constants::timing,
    map::maze::Maze,
    systems::{
        components::{DeltaTime, EntityType, PlayerControlled, SpawnPoint},
        movement::{try_step, Heading, MoveClock, TilePosition},
        render::Visual,
    },
};

bitflags! {
    /// Timed effects currently applied to the player. Empty means normal.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct PlayerStatus: u8 {
        /// Recently hit; further hits are ignored.
        const INVULNERABLE = 1 << 0;
        /// A power pellet is active.
        const POWERED = 1 << 1;
        /// An invincibility pellet is active; ghosts can be eaten.
        const INVINCIBLE = 1 << 2;
    }
}

/// Score, lives and timed effects of the player.
///
/// Each effect is a countdown in milliseconds; the effect is active while its
/// countdown is above zero. Activating an effect refills it, it never stacks.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Player {
    pub score: u32,
    pub lives: u32,
    pub pellets_eaten: u32,
    invulnerable_ms: f32,
    powered_ms: f32,
    invincible_ms: f32,
}

impl Player {
    pub fn new(lives: u32) -> Self {
        Self {
            score: 0,
            lives,
            pellets_eaten: 0,
            invulnerable_ms: 0.0,
            powered_ms: 0.0,
            invincible_ms: 0.0,
        }
    }

    pub fn status(&self) -> PlayerStatus {
        let mut status = PlayerStatus::empty();
        status.set(PlayerStatus::INVULNERABLE, self.invulnerable_ms > 0.0);
        status.set(PlayerStatus::POWERED, self.powered_ms > 0.0);
        status.set(PlayerStatus::INVINCIBLE, self.invincible_ms > 0.0);
        status
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_ms > 0.0
    }

    pub fn is_powered(&self) -> bool {
        self.powered_ms > 0.0
    }

    pub fn is_invincible(&self) -> bool {
        self.invincible_ms > 0.0
    }

    /// Remaining power time, in milliseconds.
    pub fn power_remaining(&self) -> f32 {
        self.powered_ms
    }

    pub fn eat_pellet(&mut self, value: u32) {
        self.score += value;
        self.pellets_eaten += 1;
    }

    pub fn add_bonus(&mut self, value: u32) {
        self.score += value;
    }

    /// Applies an enemy hit. Returns whether the player is still alive.
    ///
    /// While invulnerable the hit is ignored. Otherwise a life is lost and a
    /// fresh invulnerability window starts.
    pub fn hit_by_enemy(&mut self) -> bool {
        if self.is_invulnerable() {
            return true;
        }

        self.lives = self.lives.saturating_sub(1);
        self.invulnerable_ms = timing::INVULNERABILITY_DURATION;
        debug!(lives = self.lives, "Player hit");
        self.lives > 0
    }

    pub fn activate_power(&mut self, duration: f32) {
        self.powered_ms = duration;
    }

    pub fn activate_invincibility(&mut self, duration: f32) {
        self.invincible_ms = duration;
    }

    /// Grants one life unless the player already holds `cap` or more.
    pub fn grant_life(&mut self, cap: u32) -> bool {
        if self.lives < cap {
            self.lives += 1;
            true
        } else {
            false
        }
    }

    /// Counts every active effect down by `delta` milliseconds.
    pub fn tick_timers(&mut self, delta: f32) {
        for timer in [&mut self.invulnerable_ms, &mut self.powered_ms, &mut self.invincible_ms] {
            if *timer > 0.0 {
                *timer = (*timer - delta).max(0.0);
            }
        }
    }

    /// Clears every timed effect; score and lives are kept.
    pub fn reset_for_level(&mut self) {
        self.invulnerable_ms = 0.0;
        self.powered_ms = 0.0;
        self.invincible_ms = 0.0;
    }
}

#[derive(Bundle)]
pub struct PlayerBundle {
    pub player: Player,
    pub controlled: PlayerControlled,
    pub entity_type: EntityType,
    pub position: TilePosition,
    pub spawn: SpawnPoint,
    pub heading: Heading,
    pub clock: MoveClock,
    pub visual: Visual,
}

/// Steps the player one tile whenever its move clock elapses.
///
/// The buffered turn is taken if the tile in that direction is walkable,
/// otherwise the player keeps going the way it was heading, otherwise it waits.
pub fn player_movement_system(
    maze: Res<Maze>,
    delta_time: Res<DeltaTime>,
    mut players: Query<(&mut TilePosition, &mut Heading, &mut MoveClock), With<PlayerControlled>>,
) {
    for (mut position, mut heading, mut clock) in players.iter_mut() {
        if !clock.tick(delta_time.millis) {
            continue;
        }

        if let Some(next) = heading.next {
            if try_step(&maze, &mut position, next) {
                heading.current = Some(next);
                continue;
            }
        }

        if let Some(current) = heading.current {
            if try_step(&maze, &mut position, current) {
                continue;
            }
        }

        trace!(tile = ?position.0, "Player blocked");
    }
}

/// Counts down the player's invulnerability, power and invincibility windows.
pub fn player_timer_system(delta_time: Res<DeltaTime>, mut players: Query<&mut Player>) {
    for mut player in players.iter_mut() {
        let before = player.status();
        player.tick_timers(delta_time.millis);
        let expired = before.difference(player.status());
        if !expired.is_empty() {
            debug!(?expired, "Player effect expired");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_while_invulnerable_is_ignored() {
        let mut player = Player::new(3);
        assert!(player.hit_by_enemy());
        assert_eq!(player.lives, 2);
        assert!(player.hit_by_enemy());
        assert_eq!(player.lives, 2);
    }

    #[test]
    fn test_last_life_reports_death() {
        let mut player = Player::new(1);
        assert!(!player.hit_by_enemy());
        assert_eq!(player.lives, 0);
    }

    #[test]
    fn test_power_refills_instead_of_stacking() {
        let mut player = Player::new(3);
        player.activate_power(8000.0);
        player.tick_timers(5000.0);
        player.activate_power(8000.0);
        assert_eq!(player.power_remaining(), 8000.0);
        player.tick_timers(8000.0);
        assert!(!player.is_powered());
    }

    #[test]
    fn test_status_flags() {
        let mut player = Player::new(3);
        assert_eq!(player.status(), PlayerStatus::empty());
        player.activate_invincibility(100.0);
        player.hit_by_enemy();
        assert_eq!(player.status(), PlayerStatus::INVINCIBLE | PlayerStatus::INVULNERABLE);
    }
}
