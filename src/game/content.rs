//! # Room Content
//!
//! The encounters that can occupy a room and the shared interaction contract
//! they fulfil when the explorer explores that room.

use crate::{
    resolve_combat, resolve_event, CombatOutcome, CombatStyle, EventEffect, Explorer, Item,
    ItemCategory, Position,
};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// What an encounter needs from the session while it resolves.
///
/// [`crate::ExplorerEngine`] is the production implementation; the map is not
/// exposed directly, only the operations an encounter may trigger.
pub trait InteractionContext {
    /// Disjoint access to the explorer and the session's random stream.
    fn explorer_and_rng(&mut self) -> (&mut Explorer, &mut StdRng);

    fn explorer(&mut self) -> &mut Explorer {
        self.explorer_and_rng().0
    }

    /// Moves the explorer to a uniformly chosen room other than the current
    /// one and marks it visited. Returns the destination, or None when the
    /// map has no other room.
    fn teleport_to_random_room(&mut self) -> Option<Position>;

    /// Explores the explorer's current room as a nested step of an event
    /// chain at `depth`.
    fn explore_chained(&mut self, depth: u32) -> String;
}

/// A treasure holding one reward item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Treasure {
    pub reward: Item,
}

/// A regular monster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub name: String,
    pub hp: u32,
    pub attack: u32,
}

impl Monster {
    pub fn new(name: impl Into<String>, hp: u32, attack: u32) -> Self {
        Self {
            name: name.into(),
            hp,
            attack,
        }
    }

    fn fight(
        &mut self,
        explorer: &mut Explorer,
        rng: &mut StdRng,
        style: CombatStyle,
    ) -> (CombatOutcome, Vec<String>) {
        resolve_combat(explorer, &self.name, &mut self.hp, self.attack, style, rng)
    }
}

/// A monster core with a special reward and a different turn bias.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    #[serde(flatten)]
    pub monster: Monster,
    pub special_reward: Item,
}

/// A one-shot room event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub effect: EventEffect,
}

/// Whatever occupies a room.
///
/// # Examples
///
/// ```
/// use delve::{ContentEntity, Monster};
///
/// let rat = ContentEntity::Monster(Monster::new("Rat", 4, 1));
/// assert_eq!(rat.type_tag(), "monster");
/// assert!(!rat.is_resolved());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentEntity {
    Treasure(Treasure),
    Monster(Monster),
    Boss(Boss),
    Event(Event),
}

impl ContentEntity {
    /// Discriminator used in snapshots and summaries.
    pub fn type_tag(&self) -> &'static str {
        match self {
            ContentEntity::Treasure(_) => "treasure",
            ContentEntity::Monster(_) => "monster",
            ContentEntity::Boss(_) => "boss",
            ContentEntity::Event(_) => "event",
        }
    }

    /// One-line description for status displays.
    pub fn description(&self) -> String {
        match self {
            ContentEntity::Treasure(t) => {
                format!("A treasure: {} (value {})", t.reward.name, t.reward.value)
            }
            ContentEntity::Monster(m) => {
                format!("Monster {} (hp {}, atk {})", m.name, m.hp, m.attack)
            }
            ContentEntity::Boss(b) => format!(
                "Boss {} (hp {}, atk {}) guarding {}",
                b.monster.name, b.monster.hp, b.monster.attack, b.special_reward.name
            ),
            ContentEntity::Event(e) => format!("{}: {}", e.name, e.description),
        }
    }

    /// Whether the room should be emptied after the last interaction.
    ///
    /// Treasures and events are always consumed; monsters and bosses only
    /// once their hp reaches 0.
    pub fn is_resolved(&self) -> bool {
        match self {
            ContentEntity::Treasure(_) | ContentEntity::Event(_) => true,
            ContentEntity::Monster(m) => m.hp == 0,
            ContentEntity::Boss(b) => b.monster.hp == 0,
        }
    }

    /// Resolves the encounter against the explorer and returns the narrative.
    ///
    /// `depth` is the current event chain depth, passed through to events so
    /// nested teleports stay bounded.
    pub fn interact(&mut self, ctx: &mut dyn InteractionContext, depth: u32) -> String {
        match self {
            ContentEntity::Treasure(treasure) => {
                let reward = treasure.reward.clone();
                let message = match reward.category {
                    ItemCategory::Equipable => format!(
                        "You found equipment: {}. It is in your inventory; equip it to use it.",
                        reward.name
                    ),
                    ItemCategory::Consumable => format!(
                        "You found a consumable: {}. It is in your inventory; use it when needed.",
                        reward.name
                    ),
                    ItemCategory::Normal => {
                        format!("You picked up {} (value {}).", reward.name, reward.value)
                    }
                };
                ctx.explorer().inventory.push(reward);
                message
            }
            ContentEntity::Monster(monster) => {
                let (explorer, rng) = ctx.explorer_and_rng();
                let mut log = vec![format!(
                    "You fight {} ({} hp).",
                    monster.name, monster.hp
                )];
                let (outcome, turns) = monster.fight(explorer, rng, CombatStyle::MONSTER);
                log.extend(turns);
                log.push(match outcome {
                    CombatOutcome::Victory => format!("You defeated {}.", monster.name),
                    CombatOutcome::Defeat => "You have been defeated.".to_string(),
                });
                log.join("\n")
            }
            ContentEntity::Boss(boss) => {
                let (explorer, rng) = ctx.explorer_and_rng();
                let mut log = vec![format!(
                    "You face the boss {} ({} hp).",
                    boss.monster.name, boss.monster.hp
                )];
                let (outcome, turns) = boss.monster.fight(explorer, rng, CombatStyle::BOSS);
                log.extend(turns);
                match outcome {
                    CombatOutcome::Victory => {
                        explorer.inventory.push(boss.special_reward.clone());
                        log.push(format!(
                            "You defeated the boss {} and claim {}!",
                            boss.monster.name, boss.special_reward.name
                        ));
                    }
                    CombatOutcome::Defeat => {
                        log.push("The boss has defeated you.".to_string());
                    }
                }
                log.join("\n")
            }
            ContentEntity::Event(event) => resolve_event(&event.effect, ctx, depth),
        }
    }
}
