//! This module defines the maze and provides functions for interacting with it.

pub mod maze;
pub mod direction;

pub use maze::Maze;
pub use direction::Direction;
