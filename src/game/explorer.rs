//! # Explorer
//!
//! The explorer's mutable state: position, health, attack and belongings.

use crate::{config, Item, Position};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A timed additive attack modifier, counted down by rooms traveled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buff {
    pub attack_delta: i32,
    pub rooms_remaining: u32,
}

/// Starting stats for a new explorer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplorerConfig {
    pub hp: u32,
    pub base_attack: i32,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            hp: config::DEFAULT_EXPLORER_HP,
            base_attack: config::DEFAULT_BASE_ATTACK,
        }
    }
}

/// The agent walking the dungeon.
#[derive(Debug, Clone, PartialEq)]
pub struct Explorer {
    pub position: Position,
    pub hp: u32,
    pub base_attack: i32,
    /// Carried items in pickup order; duplicates allowed
    pub inventory: Vec<Item>,
    /// At most one item per slot
    pub equipped: BTreeMap<String, Item>,
    pub buffs: Vec<Buff>,
}

impl Explorer {
    /// Creates an explorer at `position` with the given starting stats.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Explorer, ExplorerConfig, Position};
    ///
    /// let explorer = Explorer::new(Position::new(0, 0), ExplorerConfig::default());
    /// assert!(explorer.is_alive());
    /// assert!(explorer.inventory.is_empty());
    /// ```
    pub fn new(position: Position, config: ExplorerConfig) -> Self {
        Self {
            position,
            hp: config.hp,
            base_attack: config.base_attack,
            inventory: Vec::new(),
            equipped: BTreeMap::new(),
            buffs: Vec::new(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Base attack plus equipment bonuses plus active buffs, floored at 1.
    pub fn compute_attack(&self) -> u32 {
        let equipment: i64 = self.equipped.values().map(|i| i64::from(i.attack_bonus())).sum();
        let buffs: i64 = self.buffs.iter().map(|b| i64::from(b.attack_delta)).sum();
        let total = i64::from(self.base_attack) + equipment + buffs;
        total.clamp(1, i64::from(u32::MAX)) as u32
    }

    /// Applies damage, flooring hp at 0. Returns the damage actually taken.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.hp);
        self.hp -= taken;
        taken
    }

    pub fn heal(&mut self, amount: u32) {
        self.hp = self.hp.saturating_add(amount);
    }

    /// Adds a timed attack buff. A zero duration still lasts one room.
    pub fn add_buff(&mut self, attack_delta: i32, rooms: u32) {
        self.buffs.push(Buff {
            attack_delta,
            rooms_remaining: rooms.max(1),
        });
    }

    /// Counts every buff down by one room and drops the expired ones.
    pub fn tick_buffs(&mut self) {
        for buff in &mut self.buffs {
            buff.rooms_remaining = buff.rooms_remaining.saturating_sub(1);
        }
        self.buffs.retain(|b| b.rooms_remaining > 0);
    }

    /// Index of the first inventory item named `name`.
    pub fn find_item(&self, name: &str) -> Option<usize> {
        self.inventory.iter().position(|item| item.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn explorer() -> Explorer {
        Explorer::new(
            Position::new(0, 0),
            ExplorerConfig {
                hp: 10,
                base_attack: 2,
            },
        )
    }

    #[test]
    fn test_compute_attack_sums_sources() {
        let mut e = explorer();
        assert_eq!(e.compute_attack(), 2);

        e.equipped
            .insert("weapon".to_string(), Item::equipable("Sword", 10, "weapon", 3));
        e.add_buff(1, 2);
        assert_eq!(e.compute_attack(), 6);
    }

    #[test]
    fn test_compute_attack_floor() {
        let mut e = explorer();
        e.base_attack = -4;
        assert_eq!(e.compute_attack(), 1);
    }

    #[test]
    fn test_compute_attack_does_not_overflow() {
        let mut e = explorer();
        e.base_attack = i32::MAX;
        e.equipped
            .insert("weapon".to_string(), Item::equipable("Sword", 10, "weapon", i32::MAX));
        e.add_buff(i32::MAX, 3);
        assert_eq!(e.compute_attack(), u32::MAX);

        e.base_attack = i32::MIN;
        e.equipped.clear();
        e.buffs.clear();
        e.add_buff(i32::MIN, 3);
        assert_eq!(e.compute_attack(), 1);
    }

    #[test]
    fn test_damage_floors_at_zero() {
        let mut e = explorer();
        assert_eq!(e.take_damage(4), 4);
        assert_eq!(e.hp, 6);
        assert_eq!(e.take_damage(50), 6);
        assert_eq!(e.hp, 0);
        assert!(!e.is_alive());
    }

    #[test]
    fn test_buffs_expire() {
        let mut e = explorer();
        e.add_buff(2, 2);
        e.add_buff(1, 1);
        e.tick_buffs();
        assert_eq!(e.buffs.len(), 1);
        assert_eq!(e.buffs[0].rooms_remaining, 1);
        e.tick_buffs();
        assert!(e.buffs.is_empty());
    }

    #[test]
    fn test_zero_duration_buff_lasts_one_room() {
        let mut e = explorer();
        e.add_buff(3, 0);
        assert_eq!(e.compute_attack(), 5);
        e.tick_buffs();
        assert_eq!(e.compute_attack(), 2);
    }
}
