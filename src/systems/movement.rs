use bevy_ecs::component::Component;
use glam::{IVec2, Vec2};

use crate::map::maze::Maze;
use crate::map::direction::Direction;

/// Position of an actor on the tile grid.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TilePosition(pub IVec2);

impl TilePosition {
    pub fn new(col: i32, row: i32) -> Self {
        Self(IVec2::new(col, row))
    }

    /// Pixel center of the tile, for the render collaborator.
    pub fn pixel(&self, maze: &Maze) -> Vec2 {
        maze.tile_center(self.0)
    }
}

/// The direction an actor is travelling in, plus a queued turn.
///
/// `current` is `None` while the actor has never moved. `next` holds the
/// buffered turn that is taken at the first tile boundary where it is legal.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Heading {
    pub current: Option<Direction>,
    pub next: Option<Direction>,
}

/// Fixed-interval stepping clock. An actor moves at most one tile per elapsed delay.
///
/// The effective delay is `base_delay * modifier`; the modifier is set (never
/// accumulated) by power-ups so restoring it is always exact.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct MoveClock {
    pub timer: f32,
    pub base_delay: f32,
    pub modifier: f32,
}

impl MoveClock {
    pub fn new(base_delay: f32) -> Self {
        Self {
            timer: 0.0,
            base_delay,
            modifier: 1.0,
        }
    }

    pub fn with_modifier(mut self, modifier: f32) -> Self {
        self.modifier = modifier;
        self
    }

    /// The current time between two steps, in milliseconds.
    pub fn delay(&self) -> f32 {
        self.base_delay * self.modifier
    }

    /// Advances the clock, returning true when a step is due.
    ///
    /// The delay is subtracted rather than the timer zeroed, so the leftover
    /// time carries into the next interval.
    pub fn tick(&mut self, delta: f32) -> bool {
        self.timer += delta;
        let delay = self.delay();
        if self.timer >= delay {
            self.timer -= delay;
            true
        } else {
            false
        }
    }
}

/// Moves `position` one tile towards `direction` if the destination is walkable.
pub fn try_step(maze: &Maze, position: &mut TilePosition, direction: Direction) -> bool {
    if maze.can_step(position.0, direction) {
        position.0 += direction.as_ivec2();
        true
    } else {
        false
    }
}
