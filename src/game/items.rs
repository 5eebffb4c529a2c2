//! # Items
//!
//! Items carried by the explorer and the effect data that consumers interpret.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// How an item can be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    /// Valuables with no active use
    #[default]
    Normal,
    /// Can be placed in an equipment slot
    Equipable,
    /// Used up on activation
    Consumable,
}

/// Effect data attached to an item.
///
/// Each field is optional; consumers read only the keys they understand and
/// any other keys are carried along in `extra`. An `attack` delta with `rooms` is a timed buff, without `rooms` it is
/// permanent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemEffect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heal: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rooms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ItemEffect {
    pub fn is_empty(&self) -> bool {
        *self == ItemEffect::default()
    }
}

/// An item in the world or in the explorer's inventory.
///
/// # Examples
///
/// ```
/// use delve::{Item, ItemCategory};
///
/// let sword = Item::equipable("Short sword", 15, "weapon", 2);
/// assert_eq!(sword.category, ItemCategory::Equipable);
/// assert_eq!(sword.attack_bonus(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub value: u32,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: ItemCategory,
    #[serde(default, skip_serializing_if = "ItemEffect::is_empty")]
    pub effect: ItemEffect,
}

impl Item {
    /// Creates a plain valuable.
    pub fn new(name: impl Into<String>, value: u32, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            description: description.into(),
            category: ItemCategory::Normal,
            effect: ItemEffect::default(),
        }
    }

    /// Creates an equipable item bound to `slot` with a flat attack bonus.
    pub fn equipable(name: impl Into<String>, value: u32, slot: impl Into<String>, attack: i32) -> Self {
        Self {
            category: ItemCategory::Equipable,
            effect: ItemEffect {
                attack: Some(attack),
                slot: Some(slot.into()),
                ..ItemEffect::default()
            },
            ..Self::new(name, value, "")
        }
    }

    /// Creates a consumable item with the given effect.
    pub fn consumable(name: impl Into<String>, value: u32, effect: ItemEffect) -> Self {
        Self {
            category: ItemCategory::Consumable,
            effect,
            ..Self::new(name, value, "")
        }
    }

    /// Sets the description, builder style.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attack bonus granted while equipped.
    pub fn attack_bonus(&self) -> i32 {
        self.effect.attack.unwrap_or(0)
    }

    /// The equipment slot this item occupies, if it names one.
    pub fn slot(&self) -> Option<&str> {
        self.effect.slot.as_deref()
    }
}
