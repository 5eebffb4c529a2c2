//! # Events
//!
//! Effect dispatch for room events, including teleports that chain into
//! further exploration.

use crate::{config, InteractionContext};
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Whether an attack modification sticks or wears off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackMode {
    #[default]
    Permanent,
    /// Expires after `rooms` moves
    Temporal,
}

/// What an event does to the explorer.
///
/// Encoded as a map keyed by `kind`. Kinds this engine does not know are
/// kept verbatim in [`EventEffect::Other`] so they survive a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "EffectRepr", into = "EffectRepr")]
pub enum EventEffect {
    Heal {
        amount: u32,
    },
    Trap {
        damage: u32,
    },
    /// Sends the explorer to another room; with `auto_explore` that room is
    /// explored on arrival.
    Teleport {
        auto_explore: bool,
    },
    BuffByRooms {
        attack: i32,
        rooms: u32,
    },
    ModifyAttack {
        delta: i32,
        mode: AttackMode,
        rooms: u32,
    },
    /// An effect kind this engine does not resolve, with its other fields
    Other {
        kind: String,
        extra: BTreeMap<String, Value>,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum EffectRepr {
    Known(KnownEffect),
    Other {
        kind: String,
        #[serde(flatten)]
        extra: BTreeMap<String, Value>,
    },
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum KnownEffect {
    Heal {
        amount: u32,
    },
    Trap {
        damage: u32,
    },
    Teleport {
        #[serde(default)]
        auto_explore: bool,
    },
    BuffByRooms {
        attack: i32,
        rooms: u32,
    },
    ModifyAttack {
        delta: i32,
        #[serde(default)]
        mode: AttackMode,
        #[serde(default)]
        rooms: u32,
    },
}

impl From<EffectRepr> for EventEffect {
    fn from(repr: EffectRepr) -> Self {
        match repr {
            EffectRepr::Known(KnownEffect::Heal { amount }) => EventEffect::Heal { amount },
            EffectRepr::Known(KnownEffect::Trap { damage }) => EventEffect::Trap { damage },
            EffectRepr::Known(KnownEffect::Teleport { auto_explore }) => {
                EventEffect::Teleport { auto_explore }
            }
            EffectRepr::Known(KnownEffect::BuffByRooms { attack, rooms }) => {
                EventEffect::BuffByRooms { attack, rooms }
            }
            EffectRepr::Known(KnownEffect::ModifyAttack { delta, mode, rooms }) => {
                EventEffect::ModifyAttack { delta, mode, rooms }
            }
            EffectRepr::Other { kind, extra } => EventEffect::Other { kind, extra },
        }
    }
}

impl From<EventEffect> for EffectRepr {
    fn from(effect: EventEffect) -> Self {
        let known = match effect {
            EventEffect::Heal { amount } => KnownEffect::Heal { amount },
            EventEffect::Trap { damage } => KnownEffect::Trap { damage },
            EventEffect::Teleport { auto_explore } => KnownEffect::Teleport { auto_explore },
            EventEffect::BuffByRooms { attack, rooms } => KnownEffect::BuffByRooms { attack, rooms },
            EventEffect::ModifyAttack { delta, mode, rooms } => {
                KnownEffect::ModifyAttack { delta, mode, rooms }
            }
            EventEffect::Other { kind, extra } => return EffectRepr::Other { kind, extra },
        };
        EffectRepr::Known(known)
    }
}

/// Applies `effect` through `ctx`. `depth` is how many auto-explored
/// teleports are already on the stack.
pub fn resolve_event(effect: &EventEffect, ctx: &mut dyn InteractionContext, depth: u32) -> String {
    debug!("Resolving event {:?} at chain depth {}", effect, depth);

    match *effect {
        EventEffect::Heal { amount } => {
            ctx.explorer().heal(amount);
            format!("A friendly spirit restores {} hp.", amount)
        }
        EventEffect::Trap { damage } => {
            let taken = ctx.explorer().take_damage(damage);
            format!("You fall into a trap and take {} damage.", taken)
        }
        EventEffect::Teleport { auto_explore } => {
            let Some(destination) = ctx.teleport_to_random_room() else {
                return "The portal flickers, but there is nowhere else to go.".to_string();
            };
            let mut message = format!("A portal pulls you to {}.", destination);
            if auto_explore {
                if depth >= config::MAX_CHAIN_DEPTH {
                    message.push_str(" Chain limit reached; the room is not explored automatically.");
                } else {
                    let chained = ctx.explore_chained(depth + 1);
                    if !chained.is_empty() {
                        message.push('\n');
                        message.push_str(&chained);
                    }
                }
            }
            message
        }
        EventEffect::BuffByRooms { attack, rooms } => {
            let rooms = rooms.max(1);
            ctx.explorer().add_buff(attack, rooms);
            format!("Blessing: {:+} attack for {} rooms.", attack, rooms)
        }
        EventEffect::ModifyAttack { delta, mode, rooms } => match mode {
            AttackMode::Permanent => {
                let explorer = ctx.explorer();
                explorer.base_attack = explorer.base_attack.saturating_add(delta);
                format!("Your attack changes by {:+} permanently.", delta)
            }
            AttackMode::Temporal => {
                let rooms = rooms.max(1);
                ctx.explorer().add_buff(delta, rooms);
                format!("Your attack changes by {:+} for {} rooms.", delta, rooms)
            }
        },
        EventEffect::Other { ref kind, .. } => {
            debug!("No resolution for event kind '{}'", kind);
            "Something strange happens, but nothing seems to change.".to_string()
        }
    }
}
