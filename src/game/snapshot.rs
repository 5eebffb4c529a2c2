//! # Snapshots
//!
//! Plain-data capture of a session. Links are stored as neighbor coordinates
//! and rebuilt on restore, so the encoded form has no cycles.

use crate::{
    config, generation::utils::rng_from_seed, Buff, ContentEntity, DelveError, DelveResult,
    Direction, Explorer, ExplorerEngine, Item, Map, Position, Room,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: u32,
    pub position: Position,
    pub spawn: bool,
    pub visited: bool,
    pub connections: BTreeMap<Direction, Position>,
    pub content: Option<ContentEntity>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    pub width: u32,
    pub height: u32,
    pub rooms: Vec<RoomSnapshot>,
    pub spawn: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorerSnapshot {
    pub hp: u32,
    pub position: Position,
    pub inventory: Vec<Item>,
    #[serde(default = "default_base_attack")]
    pub base_attack: i32,
    #[serde(default)]
    pub equipped: BTreeMap<String, Item>,
    #[serde(default)]
    pub buffs: Vec<Buff>,
}

fn default_base_attack() -> i32 {
    config::DEFAULT_BASE_ATTACK
}

/// A full session: the map and the explorer walking it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub map: MapSnapshot,
    pub explorer: ExplorerSnapshot,
}

impl Snapshot {
    pub fn capture(map: &Map, explorer: &Explorer) -> Self {
        Self {
            map: map.snapshot(),
            explorer: explorer.snapshot(),
        }
    }

    /// Rebuilds the map and explorer, validating the room graph.
    pub fn restore(self) -> DelveResult<(Map, Explorer)> {
        let map = Map::from_snapshot(self.map)?;
        if !map.contains(self.explorer.position) {
            return Err(DelveError::InvalidState(format!(
                "explorer stands at {}, where there is no room",
                self.explorer.position
            )));
        }
        Ok((map, Explorer::from_snapshot(self.explorer)))
    }

    pub fn to_json(&self) -> DelveResult<String> {
        serde_json::to_string_pretty(self).map_err(DelveError::from)
    }

    pub fn from_json(json: &str) -> DelveResult<Self> {
        serde_json::from_str(json).map_err(DelveError::from)
    }
}

impl Map {
    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            width: self.width,
            height: self.height,
            rooms: self
                .rooms()
                .map(|room| RoomSnapshot {
                    id: room.id,
                    position: room.position,
                    spawn: room.spawn,
                    visited: room.visited,
                    connections: room.connections.clone(),
                    content: room.content.clone(),
                })
                .collect(),
            spawn: self.spawn(),
        }
    }

    /// Rebuilds a map from its snapshot.
    ///
    /// Every recorded link must point at an adjacent room that exists; links
    /// are re-established on both ends.
    pub fn from_snapshot(snapshot: MapSnapshot) -> DelveResult<Map> {
        let mut rooms = BTreeMap::new();
        let mut links = Vec::new();
        for entry in snapshot.rooms {
            if !entry.position.in_bounds(snapshot.width, snapshot.height) {
                return Err(DelveError::InvalidState(format!(
                    "room {} lies outside the {}x{} grid",
                    entry.position, snapshot.width, snapshot.height
                )));
            }
            links.extend(entry.connections.into_iter().map(|(d, to)| (entry.position, d, to)));
            let room = Room {
                id: entry.id,
                position: entry.position,
                spawn: entry.spawn,
                visited: entry.visited,
                content: entry.content,
                connections: BTreeMap::new(),
            };
            if rooms.insert(entry.position, room).is_some() {
                return Err(DelveError::InvalidState(format!(
                    "duplicate room at {}",
                    entry.position
                )));
            }
        }
        if !rooms.contains_key(&snapshot.spawn) {
            return Err(DelveError::InvalidState(format!(
                "spawn {} has no room",
                snapshot.spawn
            )));
        }

        let mut map = Map::from_parts(snapshot.width, snapshot.height, rooms, snapshot.spawn);
        for (from, direction, to) in links {
            if from.step(direction) != to {
                return Err(DelveError::InvalidState(format!(
                    "link {} from {} does not lead to {}",
                    direction, from, to
                )));
            }
            map.connect(from, direction)?;
        }
        Ok(map)
    }
}

impl Explorer {
    pub fn snapshot(&self) -> ExplorerSnapshot {
        ExplorerSnapshot {
            hp: self.hp,
            position: self.position,
            inventory: self.inventory.clone(),
            base_attack: self.base_attack,
            equipped: self.equipped.clone(),
            buffs: self.buffs.clone(),
        }
    }

    pub fn from_snapshot(snapshot: ExplorerSnapshot) -> Explorer {
        Explorer {
            position: snapshot.position,
            hp: snapshot.hp,
            base_attack: snapshot.base_attack,
            inventory: snapshot.inventory,
            equipped: snapshot.equipped,
            buffs: snapshot.buffs,
        }
    }
}

impl ExplorerEngine {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self.map(), self.explorer())
    }

    /// Resumes a captured session. The random stream is not part of the
    /// snapshot, so play continues from `seed`.
    pub fn restore(snapshot: Snapshot, seed: u64) -> DelveResult<Self> {
        let (map, explorer) = snapshot.restore()?;
        Ok(ExplorerEngine::with_explorer(map, explorer, rng_from_seed(seed)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExplorerConfig, Monster};

    fn small_map() -> Map {
        let mut map = Map::new(2, 2, Position::new(0, 0));
        map.insert_room(Room::new(1, Position::new(1, 0))).unwrap();
        map.insert_room(Room::new(2, Position::new(1, 1))).unwrap();
        map.connect(Position::new(0, 0), Direction::East).unwrap();
        map.connect(Position::new(1, 0), Direction::South).unwrap();
        map.room_mut(Position::new(1, 1)).unwrap().content =
            Some(ContentEntity::Monster(Monster::new("Bat", 4, 1)));
        map
    }

    #[test]
    fn test_map_snapshot_round_trip() {
        let map = small_map();
        let restored = Map::from_snapshot(map.snapshot()).unwrap();
        assert_eq!(restored, map);
    }

    #[test]
    fn test_one_sided_link_is_made_symmetric() {
        let mut snapshot = small_map().snapshot();
        for room in &mut snapshot.rooms {
            if room.position == Position::new(1, 0) {
                room.connections.remove(&Direction::West);
            }
        }
        let map = Map::from_snapshot(snapshot).unwrap();
        assert!(map.connections_are_symmetric());
        assert_eq!(
            map.room(Position::new(1, 0)).unwrap().neighbor(Direction::West),
            Some(Position::new(0, 0))
        );
    }

    #[test]
    fn test_non_adjacent_link_is_rejected() {
        let mut snapshot = small_map().snapshot();
        snapshot.rooms[0]
            .connections
            .insert(Direction::North, Position::new(1, 1));
        assert!(Map::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn test_missing_spawn_is_rejected() {
        let mut snapshot = small_map().snapshot();
        snapshot.spawn = Position::new(0, 1);
        assert!(Map::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn test_explorer_fields_default_when_absent() {
        let json = r#"{"hp":5,"position":{"x":0,"y":0},"inventory":[]}"#;
        let snapshot: ExplorerSnapshot = serde_json::from_str(json).unwrap();
        let explorer = Explorer::from_snapshot(snapshot);
        assert_eq!(explorer.base_attack, config::DEFAULT_BASE_ATTACK);
        assert!(explorer.equipped.is_empty());
        assert!(explorer.buffs.is_empty());
    }

    #[test]
    fn test_explorer_off_map_is_rejected() {
        let map = small_map();
        let explorer = Explorer::new(Position::new(0, 1), ExplorerConfig::default());
        assert!(Snapshot::capture(&map, &explorer).restore().is_err());
    }
}
