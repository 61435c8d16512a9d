//! Board positions and the two word directions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A position on the board, `(x, y)` with `x` the column and `y` the row.
/// Boards in this engine have no fixed size, so unlike a classic 15x15
/// Scrabble board a `Pos` carries its coordinates directly rather than a
/// flat index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    /// Horizontal coordinate, increasing to the right.
    pub x: i64,
    /// Vertical coordinate, increasing downwards.
    pub y: i64,
}
impl Pos {
    /// Creates a new position.
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
    /// Checks whether `self` lies within a board of the given
    /// `width` x `height`.
    pub fn in_bounds(&self, width: u32, height: u32) -> bool {
        (0..width as i64).contains(&self.x) && (0..height as i64).contains(&self.y)
    }
    /// The position offset by one step in `dir`.
    pub fn step(&self, dir: Direction) -> Self {
        match dir {
            Direction::Right => Pos::new(self.x + 1, self.y),
            Direction::Down => Pos::new(self.x, self.y + 1),
        }
    }
}
impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// The direction a [`crate::board::BoardWord`] is read in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    /// Reads left to right, `y` fixed.
    Right,
    /// Reads top to bottom, `x` fixed.
    Down,
}
