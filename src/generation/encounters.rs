//! # Encounter Placement
//!
//! Assigns treasures, monsters, one boss and events to the non-spawn rooms of
//! a generated map. Counts are sampled from percentage bands and stats scale
//! with Manhattan distance from spawn.

use crate::{
    Boss, ContentEntity, Event, EventEffect, GenerationConfig, ItemGenerator, Map,
    Monster, PercentBand, Position, Treasure,
};
use log::info;
use rand::{rngs::StdRng, seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

const MONSTER_NAMES: &[&str] = &["Goblin", "Skeleton", "Giant rat", "Cultist", "Slime"];
const BOSS_NAMES: &[&str] = &["Bone Tyrant", "Mire Queen", "Iron Warden"];

/// How many entities of each category were placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllocationSummary {
    pub bosses: usize,
    pub monsters: usize,
    pub treasures: usize,
    pub events: usize,
}

impl AllocationSummary {
    pub fn total(&self) -> usize {
        self.bosses + self.monsters + self.treasures + self.events
    }
}

/// Places encounter content on a map.
#[derive(Debug, Clone)]
pub struct ContentAllocator {
    pub monster_band: PercentBand,
    pub treasure_band: PercentBand,
    pub event_band: PercentBand,
    pub auto_explore_portals: bool,
    items: ItemGenerator,
}

impl Default for ContentAllocator {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

impl ContentAllocator {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            monster_band: config.monster_band,
            treasure_band: config.treasure_band,
            event_band: config.event_band,
            auto_explore_portals: config.auto_explore_portals,
            items: ItemGenerator,
        }
    }

    /// Samples per-category counts for `available` rooms.
    ///
    /// When the sampled total does not fit, monsters are reduced first, then
    /// treasures, then events. The single boss is never dropped.
    pub fn plan_counts(&self, available: usize, rng: &mut StdRng) -> AllocationSummary {
        if available == 0 {
            return AllocationSummary::default();
        }

        let mut sample = |band: PercentBand| {
            let (low, high) = band.count_range(available);
            rng.gen_range(low..=high)
        };
        let mut plan = AllocationSummary {
            bosses: 1,
            monsters: sample(self.monster_band),
            treasures: sample(self.treasure_band),
            events: sample(self.event_band),
        };

        let mut excess = plan.total().saturating_sub(available);
        for count in [&mut plan.monsters, &mut plan.treasures, &mut plan.events] {
            let cut = excess.min(*count);
            *count -= cut;
            excess -= cut;
        }
        plan
    }

    /// Populates every non-spawn room of `map` that the plan covers; the rest
    /// stay empty. Returns what was actually placed.
    pub fn distribute(&self, map: &mut Map, rng: &mut StdRng) -> AllocationSummary {
        let spawn = map.spawn();
        let mut free: Vec<Position> = map.positions().into_iter().filter(|&p| p != spawn).collect();
        let plan = self.plan_counts(free.len(), rng);
        free.shuffle(rng);

        let mut slots = free.into_iter();
        let mut placed = AllocationSummary::default();

        for _ in 0..plan.bosses {
            let Some(at) = slots.next() else { break };
            let boss = self.boss_for_distance(at.manhattan_distance(spawn), rng);
            Self::put(map, at, ContentEntity::Boss(boss));
            placed.bosses += 1;
        }
        for _ in 0..plan.monsters {
            let Some(at) = slots.next() else { break };
            let monster = self.monster_for_distance(at.manhattan_distance(spawn), rng);
            Self::put(map, at, ContentEntity::Monster(monster));
            placed.monsters += 1;
        }
        for _ in 0..plan.treasures {
            let Some(at) = slots.next() else { break };
            let reward = self.items.treasure_for_distance(at.manhattan_distance(spawn), rng);
            Self::put(map, at, ContentEntity::Treasure(Treasure { reward }));
            placed.treasures += 1;
        }
        for _ in 0..plan.events {
            let Some(at) = slots.next() else { break };
            let event = self.event_for_distance(at.manhattan_distance(spawn), rng);
            Self::put(map, at, ContentEntity::Event(event));
            placed.events += 1;
        }

        info!(
            "Placed {} bosses, {} monsters, {} treasures, {} events across {} rooms",
            placed.bosses,
            placed.monsters,
            placed.treasures,
            placed.events,
            map.room_count()
        );
        placed
    }

    fn put(map: &mut Map, at: Position, content: ContentEntity) {
        if let Some(room) = map.room_mut(at) {
            room.content = Some(content);
        }
    }

    /// hp `4..=5 + d/2`, attack `1 + d/4`.
    pub fn monster_for_distance(&self, distance: u32, rng: &mut StdRng) -> Monster {
        let name = MONSTER_NAMES.choose(rng).copied().unwrap_or("Monster");
        let hp = rng.gen_range(4..=5) + distance / 2;
        Monster::new(name, hp, 1 + distance / 4)
    }

    /// hp `8..=12 + d`, attack `3 + d/3`, plus a distance-scaled reward.
    pub fn boss_for_distance(&self, distance: u32, rng: &mut StdRng) -> Boss {
        let name = BOSS_NAMES.choose(rng).copied().unwrap_or("Boss");
        let hp = rng.gen_range(8..=12) + distance;
        Boss {
            monster: Monster::new(name, hp, 3 + distance / 3),
            special_reward: self.items.boss_reward_for_distance(distance),
        }
    }

    /// One of trap, fountain, portal or blessing, with magnitudes scaled by
    /// distance.
    pub fn event_for_distance(&self, distance: u32, rng: &mut StdRng) -> Event {
        let (name, description, effect) = match rng.gen_range(0..4) {
            0 => (
                "Trap",
                "A pressure plate clicks underfoot".to_string(),
                EventEffect::Trap {
                    damage: 1 + distance / 3,
                },
            ),
            1 => (
                "Fountain",
                "Clear water that mends wounds".to_string(),
                EventEffect::Heal {
                    amount: 1 + distance / 4,
                },
            ),
            2 => (
                "Portal",
                "A shimmering doorway to somewhere else".to_string(),
                EventEffect::Teleport {
                    auto_explore: self.auto_explore_portals,
                },
            ),
            _ => {
                let attack = 1 + (distance / 5) as i32;
                let rooms = 2 + distance / 6;
                (
                    "Blessing",
                    format!("+{} attack for {} rooms", attack, rooms),
                    EventEffect::BuffByRooms { attack, rooms },
                )
            }
        };
        Event {
            name: name.to_string(),
            description,
            effect,
        }
    }
}
