use glam::IVec2;
use strum_macros::AsRefStr;

/// The four cardinal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AsRefStr)]
#[repr(usize)]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    #[default]
    Right,
}

impl Direction {
    /// The four cardinal directions.
    /// This is just a convenience constant for iterating over the directions.
    pub const DIRECTIONS: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Returns the opposite direction. Constant time.
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Returns the direction as a unit tile offset (rows grow downwards).
    pub fn as_ivec2(self) -> IVec2 {
        self.into()
    }

    /// The direction of a unit axis-aligned offset, if it is one.
    pub fn from_offset(offset: IVec2) -> Option<Direction> {
        match (offset.x, offset.y) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }
}

impl From<Direction> for IVec2 {
    fn from(dir: Direction) -> Self {
        match dir {
            Direction::Up => -IVec2::Y,
            Direction::Down => IVec2::Y,
            Direction::Left => -IVec2::X,
            Direction::Right => IVec2::X,
        }
    }
}
