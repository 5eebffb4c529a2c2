//! # Map
//!
//! The dungeon room graph. Rooms are addressed by grid coordinate and link to
//! their neighbors by direction; every link is stored on both ends.

use crate::{ContentEntity, DelveError, DelveResult, Direction, Position};
use pathfinding::prelude::bfs_reach;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A node of the dungeon graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    /// Unique identifier, assigned in placement order
    pub id: u32,
    /// Grid coordinate of the room
    pub position: Position,
    /// Whether the explorer starts here
    pub spawn: bool,
    /// Whether the explorer has been here
    pub visited: bool,
    /// The encounter occupying this room, if any
    pub content: Option<ContentEntity>,
    /// Neighbor coordinate reachable through each direction
    pub connections: BTreeMap<Direction, Position>,
}

impl Room {
    /// Creates an empty, unvisited, unconnected room.
    pub fn new(id: u32, position: Position) -> Self {
        Self {
            id,
            position,
            spawn: false,
            visited: false,
            content: None,
            connections: BTreeMap::new(),
        }
    }

    /// Creates the spawn room.
    pub fn spawn(id: u32, position: Position) -> Self {
        Self {
            spawn: true,
            ..Self::new(id, position)
        }
    }

    /// The neighbor coordinate in `direction`, if connected.
    pub fn neighbor(&self, direction: Direction) -> Option<Position> {
        self.connections.get(&direction).copied()
    }
}

/// Summary counts over a map's rooms.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapStats {
    pub total: usize,
    pub empty: usize,
    pub treasures: usize,
    pub monsters: usize,
    pub bosses: usize,
    pub events: usize,
    pub average_connections: f64,
}

/// The dungeon: a bounded grid holding a connected set of rooms.
#[derive(Debug, Clone, PartialEq)]
pub struct Map {
    pub width: u32,
    pub height: u32,
    rooms: BTreeMap<Position, Room>,
    spawn: Position,
}

impl Map {
    /// Creates a map holding only its spawn room.
    pub fn new(width: u32, height: u32, spawn: Position) -> Self {
        let mut rooms = BTreeMap::new();
        rooms.insert(spawn, Room::spawn(0, spawn));
        Self {
            width,
            height,
            rooms,
            spawn,
        }
    }

    /// Coordinate of the spawn room.
    pub fn spawn(&self) -> Position {
        self.spawn
    }

    /// The spawn room.
    pub fn spawn_room(&self) -> Option<&Room> {
        self.rooms.get(&self.spawn)
    }

    pub fn room(&self, position: Position) -> Option<&Room> {
        self.rooms.get(&position)
    }

    pub fn room_mut(&mut self, position: Position) -> Option<&mut Room> {
        self.rooms.get_mut(&position)
    }

    pub fn contains(&self, position: Position) -> bool {
        self.rooms.contains_key(&position)
    }

    /// Iterates rooms in coordinate order.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn rooms_mut(&mut self) -> impl Iterator<Item = &mut Room> {
        self.rooms.values_mut()
    }

    /// Room coordinates in coordinate order.
    pub fn positions(&self) -> Vec<Position> {
        self.rooms.keys().copied().collect()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Adds an unconnected room. Fails if the coordinate is outside the grid
    /// or already taken.
    pub fn insert_room(&mut self, room: Room) -> DelveResult<()> {
        if !room.position.in_bounds(self.width, self.height) {
            return Err(DelveError::InvalidState(format!(
                "room {} lies outside the {}x{} grid",
                room.position, self.width, self.height
            )));
        }
        if self.rooms.contains_key(&room.position) {
            return Err(DelveError::InvalidState(format!(
                "a room already exists at {}",
                room.position
            )));
        }
        self.rooms.insert(room.position, room);
        Ok(())
    }

    /// Links the room at `from` to its neighbor in `direction`, and the
    /// neighbor back through the opposite direction.
    pub fn connect(&mut self, from: Position, direction: Direction) -> DelveResult<()> {
        let to = from.step(direction);
        if !self.rooms.contains_key(&to) {
            return Err(DelveError::NoRoom(to));
        }
        let origin = self.rooms.get_mut(&from).ok_or(DelveError::NoRoom(from))?;
        origin.connections.insert(direction, to);
        if let Some(target) = self.rooms.get_mut(&to) {
            target.connections.insert(direction.opposite(), from);
        }
        Ok(())
    }

    /// Removes the link in `direction` from both ends. Returns whether a link
    /// existed.
    pub fn disconnect(&mut self, from: Position, direction: Direction) -> bool {
        let Some(to) = self
            .rooms
            .get_mut(&from)
            .and_then(|room| room.connections.remove(&direction))
        else {
            return false;
        };
        if let Some(target) = self.rooms.get_mut(&to) {
            if target.connections.get(&direction.opposite()) == Some(&from) {
                target.connections.remove(&direction.opposite());
            }
        }
        true
    }

    /// Connected neighbors of the room at `position`.
    pub fn neighbors(&self, position: Position) -> Vec<(Direction, Position)> {
        self.rooms
            .get(&position)
            .map(|room| room.connections.iter().map(|(&d, &p)| (d, p)).collect())
            .unwrap_or_default()
    }

    /// Every coordinate reachable from `start` following connections.
    pub fn reachable_from(&self, start: Position) -> Vec<Position> {
        if !self.contains(start) {
            return Vec::new();
        }
        bfs_reach(start, |&p| {
            self.neighbors(p).into_iter().map(|(_, next)| next)
        })
        .collect()
    }

    /// Breadth-first check that every room is reachable from spawn.
    pub fn is_fully_reachable(&self) -> bool {
        self.reachable_from(self.spawn).len() == self.rooms.len()
    }

    /// Whether every link has a matching reverse link.
    pub fn connections_are_symmetric(&self) -> bool {
        self.rooms.values().all(|room| {
            room.connections.iter().all(|(&direction, &to)| {
                to == room.position.step(direction)
                    && self
                        .rooms
                        .get(&to)
                        .and_then(|other| other.neighbor(direction.opposite()))
                        == Some(room.position)
            })
        })
    }

    /// Counts rooms by content category and averages their link count.
    pub fn stats(&self) -> MapStats {
        let mut stats = MapStats {
            total: self.rooms.len(),
            ..MapStats::default()
        };
        let mut links = 0usize;
        for room in self.rooms.values() {
            links += room.connections.len();
            match &room.content {
                None => stats.empty += 1,
                Some(ContentEntity::Treasure(_)) => stats.treasures += 1,
                Some(ContentEntity::Monster(_)) => stats.monsters += 1,
                Some(ContentEntity::Boss(_)) => stats.bosses += 1,
                Some(ContentEntity::Event(_)) => stats.events += 1,
            }
        }
        if stats.total > 0 {
            stats.average_connections = links as f64 / stats.total as f64;
        }
        stats
    }

    pub(crate) fn from_parts(
        width: u32,
        height: u32,
        rooms: BTreeMap<Position, Room>,
        spawn: Position,
    ) -> Self {
        Self {
            width,
            height,
            rooms,
            spawn,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_map() -> Map {
        let mut map = Map::new(4, 1, Position::new(0, 0));
        for x in 1..4 {
            map.insert_room(Room::new(x as u32, Position::new(x, 0))).unwrap();
        }
        map
    }

    #[test]
    fn test_connect_is_symmetric() {
        let mut map = line_map();
        map.connect(Position::new(0, 0), Direction::East).unwrap();

        let a = map.room(Position::new(0, 0)).unwrap();
        let b = map.room(Position::new(1, 0)).unwrap();
        assert_eq!(a.neighbor(Direction::East), Some(Position::new(1, 0)));
        assert_eq!(b.neighbor(Direction::West), Some(Position::new(0, 0)));
        assert!(map.connections_are_symmetric());
    }

    #[test]
    fn test_connect_to_missing_room_fails() {
        let mut map = line_map();
        let result = map.connect(Position::new(0, 0), Direction::North);
        assert!(matches!(result, Err(DelveError::NoRoom(_))));
    }

    #[test]
    fn test_disconnect_removes_both_ends() {
        let mut map = line_map();
        map.connect(Position::new(1, 0), Direction::East).unwrap();
        assert!(map.disconnect(Position::new(2, 0), Direction::West));
        assert!(map.room(Position::new(1, 0)).unwrap().connections.is_empty());
        assert!(!map.disconnect(Position::new(2, 0), Direction::West));
    }

    #[test]
    fn test_reachability() {
        let mut map = line_map();
        map.connect(Position::new(0, 0), Direction::East).unwrap();
        map.connect(Position::new(1, 0), Direction::East).unwrap();
        assert!(!map.is_fully_reachable());
        assert_eq!(map.reachable_from(Position::new(0, 0)).len(), 3);

        map.connect(Position::new(2, 0), Direction::East).unwrap();
        assert!(map.is_fully_reachable());
    }

    #[test]
    fn test_insert_room_rejects_duplicates_and_out_of_bounds() {
        let mut map = line_map();
        assert!(map.insert_room(Room::new(9, Position::new(1, 0))).is_err());
        assert!(map.insert_room(Room::new(9, Position::new(4, 0))).is_err());
    }

    #[test]
    fn test_stats() {
        let mut map = line_map();
        map.connect(Position::new(0, 0), Direction::East).unwrap();
        let stats = map.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.empty, 4);
        assert!((stats.average_connections - 0.5).abs() < f64::EPSILON);
    }
}
