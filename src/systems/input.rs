use bevy_ecs::{
    query::With,
    system::{Query, Res},
};
use bitflags::bitflags;

use crate::map::direction::Direction;
use crate::systems::components::PlayerControlled;
use crate::systems::movement::Heading;

bitflags! {
    /// Directional keys held during the current tick.
    #[derive(bevy_ecs::resource::Resource, Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct InputSnapshot: u8 {
        const LEFT = 1 << 0;
        const RIGHT = 1 << 1;
        const UP = 1 << 2;
        const DOWN = 1 << 3;
    }
}

impl InputSnapshot {
    /// The direction the player asked for, resolving simultaneous keys left, right, up, then down.
    pub fn intent(self) -> Option<Direction> {
        [
            (InputSnapshot::LEFT, Direction::Left),
            (InputSnapshot::RIGHT, Direction::Right),
            (InputSnapshot::UP, Direction::Up),
            (InputSnapshot::DOWN, Direction::Down),
        ]
        .into_iter()
        .find(|(flag, _)| self.contains(*flag))
        .map(|(_, direction)| direction)
    }
}

impl From<Direction> for InputSnapshot {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Left => InputSnapshot::LEFT,
            Direction::Right => InputSnapshot::RIGHT,
            Direction::Up => InputSnapshot::UP,
            Direction::Down => InputSnapshot::DOWN,
        }
    }
}

/// Latches the held direction into the player's buffered turn.
///
/// With no key held the previous buffered turn is kept.
pub fn input_system(input: Res<InputSnapshot>, mut players: Query<&mut Heading, With<PlayerControlled>>) {
    let Some(direction) = input.intent() else {
        return;
    };

    for mut heading in players.iter_mut() {
        if heading.next != Some(direction) {
            heading.next = Some(direction);
        }
    }
}
