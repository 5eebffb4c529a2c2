//! # Explorer Engine
//!
//! The play-time coordination point. The engine owns the [`Map`], the
//! [`Explorer`] and the session's random stream, and is the only thing that
//! mutates them once a run has started. Renderers and command layers read
//! state through the accessors.

use crate::{
    config, generation::utils::create_rng, ContentAllocator, DelveError, DelveResult, Direction,
    Explorer, ExplorerConfig, GenerationConfig, Generator, GridTopologyBuilder,
    InteractionContext, ItemCategory, Map, Position, Room,
};
use log::{debug, info};
use pathfinding::prelude::bfs;
use rand::{rngs::StdRng, seq::SliceRandom};

/// One hop of a path: the direction taken and the room it leads to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathStep {
    pub direction: Direction,
    pub position: Position,
}

/// A running dungeon session.
#[derive(Debug, Clone)]
pub struct ExplorerEngine {
    map: Map,
    explorer: Explorer,
    rng: StdRng,
}

impl ExplorerEngine {
    /// Starts a session with a fresh explorer standing on the spawn room.
    pub fn new(map: Map, explorer_config: ExplorerConfig, rng: StdRng) -> Self {
        let explorer = Explorer::new(map.spawn(), explorer_config);
        Self::with_explorer(map, explorer, rng)
    }

    /// Resumes a session with an existing explorer.
    pub fn with_explorer(map: Map, explorer: Explorer, rng: StdRng) -> Self {
        Self { map, explorer, rng }
    }

    /// Generates, populates and starts a dungeon from one seeded stream.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{ExplorerConfig, ExplorerEngine, GenerationConfig};
    ///
    /// let engine = ExplorerEngine::from_config(
    ///     &GenerationConfig::new(42),
    ///     ExplorerConfig::default(),
    /// ).unwrap();
    /// assert_eq!(engine.explorer().position, engine.map().spawn());
    /// ```
    pub fn from_config(
        config: &GenerationConfig,
        explorer_config: ExplorerConfig,
    ) -> DelveResult<Self> {
        let mut rng = create_rng(config);
        let mut map = GridTopologyBuilder::new().generate(config, &mut rng)?;
        ContentAllocator::from_config(config).distribute(&mut map, &mut rng);
        Ok(Self::new(map, explorer_config, rng))
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn explorer(&self) -> &Explorer {
        &self.explorer
    }

    /// The room the explorer is standing in.
    pub fn current_room(&self) -> Option<&Room> {
        self.map.room(self.explorer.position)
    }

    /// Directions with a passage out of the current room.
    pub fn available_directions(&self) -> Vec<Direction> {
        self.current_room()
            .map(|room| room.connections.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Moves one room through `direction`.
    ///
    /// The destination is marked visited and every active buff loses one room
    /// of duration.
    pub fn move_in(&mut self, direction: Direction) -> DelveResult<Position> {
        let here = self.explorer.position;
        let room = self.map.room(here).ok_or(DelveError::NoRoom(here))?;
        let destination = room
            .neighbor(direction)
            .ok_or(DelveError::NoConnection(direction))?;
        let target = self
            .map
            .room_mut(destination)
            .ok_or(DelveError::NoRoom(destination))?;

        target.visited = true;
        self.explorer.position = destination;
        self.explorer.tick_buffs();

        debug!("Explorer moved {} from {} to {}", direction, here, destination);
        Ok(destination)
    }

    /// Resolves whatever occupies the current room and returns the narrative.
    pub fn explore_room(&mut self) -> String {
        self.explore_at_depth(0)
    }

    fn explore_at_depth(&mut self, depth: u32) -> String {
        let here = self.explorer.position;
        let Some(room) = self.map.room_mut(here) else {
            return "There is no room here.".to_string();
        };
        // The entity stays in the room while it resolves so chained
        // teleports can land on it.
        let Some(mut content) = room.content.clone() else {
            if room.visited {
                return "You already explored this room; it is empty.".to_string();
            }
            room.visited = true;
            return "The room is empty.".to_string();
        };

        debug!("Exploring {} at {} (depth {})", content.type_tag(), here, depth);
        let narrative = content.interact(self, depth);

        if let Some(room) = self.map.room_mut(here) {
            room.content = if content.is_resolved() {
                None
            } else {
                Some(content)
            };
            room.visited = true;
        }
        narrative
    }

    /// Moves an inventory item into its equipment slot.
    ///
    /// Whatever occupied the slot goes back to the inventory.
    pub fn equip(&mut self, item_name: &str) -> DelveResult<String> {
        let index = self
            .explorer
            .find_item(item_name)
            .ok_or_else(|| DelveError::NotInInventory(item_name.to_string()))?;
        if self.explorer.inventory[index].category != ItemCategory::Equipable {
            return Err(DelveError::NotEquipable(item_name.to_string()));
        }

        let item = self.explorer.inventory.remove(index);
        let slot = item.slot().unwrap_or(config::DEFAULT_EQUIP_SLOT).to_string();
        let mut message = format!("You equip {} ({}).", item.name, slot);
        if let Some(previous) = self.explorer.equipped.insert(slot, item) {
            message.push_str(&format!(" {} goes back to your pack.", previous.name));
            self.explorer.inventory.push(previous);
        }
        Ok(message)
    }

    /// Consumes an inventory item, applying its heal and attack effects.
    pub fn use_item(&mut self, item_name: &str) -> DelveResult<String> {
        let index = self
            .explorer
            .find_item(item_name)
            .ok_or_else(|| DelveError::NotInInventory(item_name.to_string()))?;
        if self.explorer.inventory[index].category != ItemCategory::Consumable {
            return Err(DelveError::NotConsumable(item_name.to_string()));
        }

        let item = self.explorer.inventory.remove(index);
        let mut effects = Vec::new();
        if let Some(delta) = item.effect.attack {
            match item.effect.rooms {
                Some(rooms) => {
                    self.explorer.add_buff(delta, rooms);
                    effects.push(format!("{:+} attack for {} rooms", delta, rooms.max(1)));
                }
                None => {
                    self.explorer.base_attack = self.explorer.base_attack.saturating_add(delta);
                    effects.push(format!("{:+} attack permanently", delta));
                }
            }
        }
        if let Some(amount) = item.effect.heal {
            self.explorer.heal(amount);
            effects.push(format!("{} hp restored", amount));
        }

        Ok(if effects.is_empty() {
            format!("You use {}. Nothing happens.", item.name)
        } else {
            format!("You use {}: {}.", item.name, effects.join(", "))
        })
    }

    /// Shortest sequence of moves from the current room to `destination`.
    ///
    /// Empty when already there or when no route exists.
    pub fn find_path(&self, destination: Position) -> Vec<PathStep> {
        let start = self.explorer.position;
        if start == destination || !self.map.contains(start) || !self.map.contains(destination) {
            return Vec::new();
        }

        let nodes = bfs(
            &start,
            |&p| self.map.neighbors(p).into_iter().map(|(_, next)| next),
            |&p| p == destination,
        )
        .unwrap_or_default();

        nodes
            .windows(2)
            .filter_map(|pair| {
                Direction::from_delta(pair[1] - pair[0]).map(|direction| PathStep {
                    direction,
                    position: pair[1],
                })
            })
            .collect()
    }

    /// Walks to `destination`, exploring every room on the way.
    ///
    /// Stops with an error as soon as a move fails or the explorer drops to
    /// 0 hp; returns the narrative of each room on success.
    pub fn move_along(&mut self, destination: Position) -> DelveResult<Vec<String>> {
        if !self.map.contains(destination) {
            return Err(DelveError::NoRoom(destination));
        }
        if !self.explorer.is_alive() {
            return Err(DelveError::ExplorerDefeated);
        }
        let path = self.find_path(destination);
        if path.is_empty() && self.explorer.position != destination {
            return Err(DelveError::Unreachable(destination));
        }

        info!("Walking {} steps to {}", path.len(), destination);
        let mut narrative = Vec::with_capacity(path.len());
        for step in path {
            self.move_in(step.direction)?;
            narrative.push(self.explore_room());
            if !self.explorer.is_alive() {
                info!("Explorer fell at {}", self.explorer.position);
                return Err(DelveError::ExplorerDefeated);
            }
            if self.explorer.position != step.position {
                return Err(DelveError::InvalidAction(format!(
                    "walk to {} interrupted: explorer was moved to {}",
                    destination, self.explorer.position
                )));
            }
        }
        Ok(narrative)
    }

    /// Splits the engine back into its parts.
    pub fn into_parts(self) -> (Map, Explorer) {
        (self.map, self.explorer)
    }
}

impl InteractionContext for ExplorerEngine {
    fn explorer_and_rng(&mut self) -> (&mut Explorer, &mut StdRng) {
        (&mut self.explorer, &mut self.rng)
    }

    fn teleport_to_random_room(&mut self) -> Option<Position> {
        let here = self.explorer.position;
        let choices: Vec<Position> = self
            .map
            .positions()
            .into_iter()
            .filter(|&p| p != here)
            .collect();
        let destination = *choices.choose(&mut self.rng)?;

        self.explorer.position = destination;
        if let Some(room) = self.map.room_mut(destination) {
            room.visited = true;
        }
        debug!("Teleported from {} to {}", here, destination);
        Some(destination)
    }

    fn explore_chained(&mut self, depth: u32) -> String {
        self.explore_at_depth(depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Boss, ContentEntity, Event, EventEffect, Item, ItemEffect, Monster, Treasure,
    };
    use rand::SeedableRng;

    /// A 3x1 corridor: spawn (0,0) - (1,0) - (2,0).
    fn corridor() -> Map {
        let mut map = Map::new(3, 1, Position::new(0, 0));
        map.insert_room(Room::new(1, Position::new(1, 0))).unwrap();
        map.insert_room(Room::new(2, Position::new(2, 0))).unwrap();
        map.connect(Position::new(0, 0), Direction::East).unwrap();
        map.connect(Position::new(1, 0), Direction::East).unwrap();
        map
    }

    fn engine(map: Map) -> ExplorerEngine {
        ExplorerEngine::new(
            map,
            ExplorerConfig {
                hp: 20,
                base_attack: 2,
            },
            StdRng::seed_from_u64(11),
        )
    }

    fn place(map: &mut Map, at: Position, content: ContentEntity) {
        map.room_mut(at).unwrap().content = Some(content);
    }

    #[test]
    fn test_move_marks_visited_and_ticks_buffs() {
        let mut e = engine(corridor());
        e.explorer.add_buff(2, 1);

        let to = e.move_in(Direction::East).unwrap();
        assert_eq!(to, Position::new(1, 0));
        assert!(e.map().room(to).unwrap().visited);
        assert!(e.explorer().buffs.is_empty());
    }

    #[test]
    fn test_move_without_connection_fails() {
        let mut e = engine(corridor());
        let result = e.move_in(Direction::West);
        assert!(matches!(result, Err(DelveError::NoConnection(Direction::West))));
        assert_eq!(e.explorer().position, Position::new(0, 0));
    }

    #[test]
    fn test_move_from_missing_room_fails() {
        let mut e = engine(corridor());
        e.explorer.position = Position::new(5, 5);
        assert!(matches!(e.move_in(Direction::East), Err(DelveError::NoRoom(_))));
        assert_eq!(e.explore_room(), "There is no room here.");
    }

    #[test]
    fn test_explore_empty_room_twice() {
        let mut e = engine(corridor());
        assert_eq!(e.explore_room(), "The room is empty.");
        assert!(e.explore_room().contains("already explored"));
    }

    #[test]
    fn test_treasure_cleared_after_pickup() {
        let mut map = corridor();
        place(
            &mut map,
            Position::new(1, 0),
            ContentEntity::Treasure(Treasure {
                reward: Item::new("Gem", 12, ""),
            }),
        );
        let mut e = engine(map);
        e.move_in(Direction::East).unwrap();
        e.explore_room();
        assert_eq!(e.explorer().inventory.len(), 1);
        assert!(e.current_room().unwrap().content.is_none());
    }

    #[test]
    fn test_surviving_monster_stays_in_room() {
        let mut map = corridor();
        place(
            &mut map,
            Position::new(1, 0),
            ContentEntity::Monster(Monster::new("Golem", 1_000, 30)),
        );
        let mut e = engine(map);
        e.move_in(Direction::East).unwrap();
        e.explore_room();
        assert_eq!(e.explorer().hp, 0);
        match &e.current_room().unwrap().content {
            Some(ContentEntity::Monster(m)) => assert!(m.hp > 0),
            other => panic!("monster should remain, found {other:?}"),
        }
    }

    #[test]
    fn test_defeated_boss_is_cleared() {
        let mut map = corridor();
        place(
            &mut map,
            Position::new(1, 0),
            ContentEntity::Boss(Boss {
                monster: Monster::new("Warden", 3, 1),
                special_reward: Item::equipable("Key", 50, "belt", 1),
            }),
        );
        let mut e = engine(map);
        e.explorer.hp = 1_000;
        e.move_in(Direction::East).unwrap();
        e.explore_room();
        assert!(e.current_room().unwrap().content.is_none());
        assert!(e.explorer().find_item("Key").is_some());
    }

    #[test]
    fn test_equip_swaps_previous_item_back() {
        let mut e = engine(corridor());
        e.explorer.inventory.push(Item::equipable("Dagger", 5, "weapon", 1));
        e.explorer.inventory.push(Item::equipable("Sword", 15, "weapon", 3));

        e.equip("Dagger").unwrap();
        assert_eq!(e.explorer().compute_attack(), 3);
        let message = e.equip("Sword").unwrap();
        assert!(message.contains("Dagger"));
        assert_eq!(e.explorer().compute_attack(), 5);
        assert_eq!(e.explorer().inventory.len(), 1);
        assert_eq!(e.explorer().inventory[0].name, "Dagger");
    }

    #[test]
    fn test_equip_without_slot_uses_default() {
        let mut e = engine(corridor());
        let mut ring = Item::equipable("Ring", 5, "x", 1);
        ring.effect.slot = None;
        e.explorer.inventory.push(ring);
        e.equip("Ring").unwrap();
        assert!(e.explorer().equipped.contains_key(config::DEFAULT_EQUIP_SLOT));
    }

    #[test]
    fn test_equip_rejects_non_equipable() {
        let mut e = engine(corridor());
        e.explorer.inventory.push(Item::new("Gem", 10, ""));
        let before = e.explorer().clone();

        let result = e.equip("Gem");
        assert!(matches!(result, Err(DelveError::NotEquipable(_))));
        assert_eq!(e.explorer().inventory, before.inventory);
        assert_eq!(e.explorer().equipped, before.equipped);
    }

    #[test]
    fn test_use_item_applies_and_consumes() {
        let mut e = engine(corridor());
        e.explorer.inventory.push(Item::consumable(
            "Elixir",
            10,
            ItemEffect {
                heal: Some(5),
                attack: Some(2),
                rooms: Some(2),
                ..ItemEffect::default()
            },
        ));
        e.explorer.inventory.push(Item::consumable(
            "Tonic",
            10,
            ItemEffect {
                attack: Some(1),
                ..ItemEffect::default()
            },
        ));

        e.use_item("Elixir").unwrap();
        e.use_item("Tonic").unwrap();
        assert_eq!(e.explorer().hp, 25);
        assert_eq!(e.explorer().base_attack, 3);
        assert_eq!(e.explorer().compute_attack(), 5);
        assert!(e.explorer().inventory.is_empty());
    }

    #[test]
    fn test_use_item_failures() {
        let mut e = engine(corridor());
        assert!(matches!(e.use_item("Nothing"), Err(DelveError::NotInInventory(_))));
        e.explorer.inventory.push(Item::equipable("Sword", 15, "weapon", 3));
        assert!(matches!(e.use_item("Sword"), Err(DelveError::NotConsumable(_))));
        assert_eq!(e.explorer().inventory.len(), 1);
    }

    #[test]
    fn test_attack_effects_saturate_at_extremes() {
        let mut map = corridor();
        place(
            &mut map,
            Position::new(1, 0),
            ContentEntity::Event(Event {
                name: "Shrine".to_string(),
                description: String::new(),
                effect: EventEffect::ModifyAttack {
                    delta: 1,
                    mode: crate::AttackMode::Permanent,
                    rooms: 0,
                },
            }),
        );
        place(
            &mut map,
            Position::new(2, 0),
            ContentEntity::Monster(Monster::new("Rat", 3, 1)),
        );
        let mut e = engine(map);
        e.explorer.base_attack = i32::MAX;
        e.explorer.inventory.push(Item::consumable(
            "Tonic",
            10,
            ItemEffect {
                attack: Some(5),
                ..ItemEffect::default()
            },
        ));

        e.use_item("Tonic").unwrap();
        e.move_along(Position::new(2, 0)).unwrap();
        assert_eq!(e.explorer().base_attack, i32::MAX);
        assert!(e.current_room().unwrap().content.is_none());
    }

    #[test]
    fn test_find_path() {
        let e = engine(corridor());
        let path = e.find_path(Position::new(2, 0));
        assert_eq!(
            path,
            vec![
                PathStep {
                    direction: Direction::East,
                    position: Position::new(1, 0)
                },
                PathStep {
                    direction: Direction::East,
                    position: Position::new(2, 0)
                },
            ]
        );
        assert!(e.find_path(Position::new(0, 0)).is_empty());
    }

    #[test]
    fn test_find_path_unreachable() {
        let mut map = corridor();
        map.disconnect(Position::new(1, 0), Direction::East);
        let mut e = engine(map);
        assert!(e.find_path(Position::new(2, 0)).is_empty());
        assert!(matches!(
            e.move_along(Position::new(2, 0)),
            Err(DelveError::Unreachable(_))
        ));
    }

    #[test]
    fn test_move_along_resolves_content() {
        let mut map = corridor();
        place(
            &mut map,
            Position::new(1, 0),
            ContentEntity::Event(Event {
                name: "Fountain".to_string(),
                description: String::new(),
                effect: EventEffect::Heal { amount: 3 },
            }),
        );
        let mut e = engine(map);
        let log = e.move_along(Position::new(2, 0)).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(e.explorer().hp, 23);
        assert_eq!(e.explorer().position, Position::new(2, 0));
        assert!(e.map().room(Position::new(1, 0)).unwrap().content.is_none());
    }

    #[test]
    fn test_move_along_aborts_on_defeat() {
        let mut map = corridor();
        place(
            &mut map,
            Position::new(1, 0),
            ContentEntity::Event(Event {
                name: "Pit".to_string(),
                description: String::new(),
                effect: EventEffect::Trap { damage: 100 },
            }),
        );
        let mut e = engine(map);
        let result = e.move_along(Position::new(2, 0));
        assert!(matches!(result, Err(DelveError::ExplorerDefeated)));
        assert_eq!(e.explorer().position, Position::new(1, 0));
    }

    #[test]
    fn test_teleport_marks_destination_visited() {
        let mut e = engine(corridor());
        let destination = e.teleport_to_random_room().unwrap();
        assert_ne!(destination, Position::new(0, 0));
        assert_eq!(e.explorer().position, destination);
        assert!(e.map().room(destination).unwrap().visited);
    }

    #[test]
    fn test_available_directions() {
        let mut e = engine(corridor());
        assert_eq!(e.available_directions(), vec![Direction::East]);
        e.move_in(Direction::East).unwrap();
        assert_eq!(e.available_directions(), vec![Direction::East, Direction::West]);
    }
}
