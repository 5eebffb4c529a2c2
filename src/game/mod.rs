//! # Game Module
//!
//! Runtime model of a dungeon run and the rules that resolve it.
//!
//! This module contains the building blocks of a Delve session:
//! - The room graph ([`Map`], [`Room`]) and the explorer's state
//! - Items and the content that occupies rooms
//! - Combat and event resolution
//! - The [`ExplorerEngine`] that drives movement, exploration and pathing
//! - Plain-data snapshots of a session

pub mod combat;
pub mod content;
pub mod engine;
pub mod events;
pub mod explorer;
pub mod items;
pub mod map;
pub mod snapshot;

pub use combat::*;
pub use content::*;
pub use engine::*;
pub use events::*;
pub use explorer::*;
pub use items::*;
pub use map::*;
pub use snapshot::*;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Represents an integer cell coordinate on the dungeon grid.
///
/// # Examples
///
/// ```
/// use delve::Position;
///
/// let pos = Position::new(3, 2);
/// assert_eq!(pos.x, 3);
/// assert_eq!(pos.y, 2);
///
/// let neighbors = pos.cardinal_adjacent_positions();
/// assert_eq!(neighbors.len(), 4);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Returns the position one step away in `direction`.
    pub fn step(self, direction: Direction) -> Position {
        self + direction.to_delta()
    }

    /// Returns the 4 cardinal adjacent positions, in [`Direction::ALL`] order.
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        Direction::ALL.iter().map(|&d| self.step(d)).collect()
    }

    /// Whether this position lies inside a `width` x `height` grid.
    pub fn in_bounds(self, width: u32, height: u32) -> bool {
        self.x >= 0 && self.y >= 0 && (self.x as u32) < width && (self.y as u32) < height
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal directions a room can connect through.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All four directions in a fixed order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Converts a direction to a position delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Direction, Position};
    ///
    /// let delta = Direction::North.to_delta();
    /// assert_eq!(delta, Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::South => Position::new(0, 1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
        }
    }

    /// Converts a unit position delta to a direction.
    ///
    /// Returns None if the delta doesn't correspond to a cardinal step.
    pub fn from_delta(delta: Position) -> Option<Direction> {
        match (delta.x, delta.y) {
            (0, -1) => Some(Direction::North),
            (0, 1) => Some(Direction::South),
            (1, 0) => Some(Direction::East),
            (-1, 0) => Some(Direction::West),
            _ => None,
        }
    }

    /// The direction pointing back the way this one came.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        };
        f.write_str(name)
    }
}
