//! # Combat
//!
//! Turn-based damage exchange between the explorer and a monster or boss.

use crate::Explorer;
use log::debug;
use rand::{rngs::StdRng, Rng};

/// How the explorer's hits are rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplorerDamage {
    /// `[max(1, atk - 1), atk + 1]` using the explorer's computed attack
    FromAttack,
    /// `[1, 2 + enemy_attack / 2]`, independent of the explorer's gear
    Fixed,
}

/// Turn-order bias and damage rolls for one kind of opponent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombatStyle {
    /// Chance the explorer acts first
    pub explorer_first_chance: f64,
    pub explorer_damage: ExplorerDamage,
}

impl CombatStyle {
    pub const MONSTER: CombatStyle = CombatStyle {
        explorer_first_chance: 0.5,
        explorer_damage: ExplorerDamage::FromAttack,
    };

    pub const BOSS: CombatStyle = CombatStyle {
        explorer_first_chance: 0.35,
        explorer_damage: ExplorerDamage::Fixed,
    };
}

/// Who came out of a fight standing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatOutcome {
    Victory,
    Defeat,
}

/// Runs the exchange until one side drops to 0 hp.
///
/// `enemy_hp` is updated in place and never goes below 0. Returns the outcome
/// and the per-turn log lines.
pub fn resolve_combat(
    explorer: &mut Explorer,
    enemy_name: &str,
    enemy_hp: &mut u32,
    enemy_attack: u32,
    style: CombatStyle,
    rng: &mut StdRng,
) -> (CombatOutcome, Vec<String>) {
    let mut log = Vec::new();
    let enemy_attack = enemy_attack.max(1);
    let mut explorer_turn = rng.gen_bool(style.explorer_first_chance);

    debug!(
        "Combat vs {} (hp {}, atk {}), explorer first: {}",
        enemy_name, enemy_hp, enemy_attack, explorer_turn
    );

    while *enemy_hp > 0 && explorer.is_alive() {
        if explorer_turn {
            let damage = match style.explorer_damage {
                ExplorerDamage::FromAttack => {
                    let attack = explorer.compute_attack();
                    rng.gen_range(attack.saturating_sub(1).max(1)..=attack.saturating_add(1))
                }
                ExplorerDamage::Fixed => rng.gen_range(1..=2 + enemy_attack / 2),
            };
            *enemy_hp = enemy_hp.saturating_sub(damage);
            log.push(format!(
                "You strike for {} damage ({} has {} hp left).",
                damage, enemy_name, enemy_hp
            ));
        } else {
            let damage = rng.gen_range(1..=enemy_attack);
            explorer.take_damage(damage);
            log.push(format!(
                "{} hits you for {} damage (you have {} hp left).",
                enemy_name, damage, explorer.hp
            ));
        }
        explorer_turn = !explorer_turn;
    }

    let outcome = if *enemy_hp == 0 {
        CombatOutcome::Victory
    } else {
        CombatOutcome::Defeat
    };
    (outcome, log)
}
