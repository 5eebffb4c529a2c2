//! # Item Generation
//!
//! Loot rolled for treasures and boss rewards. Values and bonuses grow with
//! the room's distance from spawn.

use crate::{Item, ItemEffect};
use rand::{rngs::StdRng, seq::SliceRandom, Rng};

const GEM_NAMES: &[&str] = &["Garnet", "Opal", "Topaz", "Amber", "Jade"];
const WEAPON_NAMES: &[&str] = &["Short sword", "Hand axe", "Spiked mace"];

/// Rolls items for content placement.
#[derive(Debug, Clone, Copy, Default)]
pub struct ItemGenerator;

impl ItemGenerator {
    /// A treasure reward worth `10 + 2d`.
    ///
    /// Most rewards are plain gems; the rest are equipment or potions.
    pub fn treasure_for_distance(&self, distance: u32, rng: &mut StdRng) -> Item {
        let value = 10 + 2 * distance;
        match rng.gen_range(0..10) {
            0..=5 => {
                let name = GEM_NAMES.choose(rng).copied().unwrap_or("Gem");
                Item::new(name, value, format!("A gem found {} rooms from the entrance", distance))
            }
            6 => {
                let name = WEAPON_NAMES.choose(rng).copied().unwrap_or("Blade");
                Item::equipable(name, value, "weapon", 1 + (distance / 5) as i32)
                    .with_description("A serviceable weapon")
            }
            7 => Item::equipable("Warding charm", value, "neck", 1)
                .with_description("Hums faintly when danger is near"),
            8 => Item::consumable(
                "Healing potion",
                value,
                ItemEffect {
                    heal: Some(3 + distance / 2),
                    ..ItemEffect::default()
                },
            )
            .with_description("Restores health"),
            _ => Item::consumable(
                "Fury draught",
                value,
                ItemEffect {
                    attack: Some(2),
                    rooms: Some(3 + distance / 4),
                    ..ItemEffect::default()
                },
            )
            .with_description("Sharpens your strikes for a while"),
        }
    }

    /// The weapon a boss drops: worth `50 + 5d` with a `1 + d/6` attack bonus.
    pub fn boss_reward_for_distance(&self, distance: u32) -> Item {
        Item::equipable(
            format!("Trophy blade (d{})", distance),
            50 + 5 * distance,
            "weapon",
            1 + (distance / 6) as i32,
        )
        .with_description("Taken from a fallen boss")
    }
}
