//! Battle resolution - pure combat arithmetic.
//!
//! `resolve_battle` computes the outcome of one monster attacking another
//! and returns life-point deltas plus the set of destroyed instances. It
//! never touches zones or life points; the session applies the result.
//!
//! ## Rules
//!
//! Defender in attack stance (attack vs attack):
//! - attacker higher: defender takes the difference and is destroyed
//! - defender higher: attacker takes the difference and is destroyed
//! - equal: both destroyed, no damage
//!
//! Defender in defense stance (attack vs defense):
//! - attacker higher: defender destroyed, no damage to either side
//! - defender higher: attacker takes the difference, defender survives
//! - equal: nothing happens (explicit standoff)

use serde::{Deserialize, Serialize};

use crate::cards::{BattleStance, CardInstance, InstanceId};

/// Result of one battle between two monsters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// Life points the attacking player loses.
    pub attacker_damage: i32,

    /// Life points the defending player loses.
    pub defender_damage: i32,

    /// Instances destroyed by this battle, to be moved to their owners'
    /// graveyards.
    pub destroyed: Vec<InstanceId>,

    /// Set when the stats were exactly equal.
    pub tie: bool,
}

/// Compute the outcome of `attacker` striking `defender`.
///
/// Pure and deterministic: identical inputs yield identical outcomes.
#[must_use]
pub fn resolve_battle(attacker: &CardInstance, defender: &CardInstance) -> BattleOutcome {
    // Stats come from the external catalog; saturate rather than trust
    // them to stay in range.
    match defender.battle_stance {
        BattleStance::Attack => {
            let diff = attacker.attack().saturating_sub(defender.attack());
            if diff > 0 {
                BattleOutcome {
                    attacker_damage: 0,
                    defender_damage: diff,
                    destroyed: vec![defender.instance_id.clone()],
                    tie: false,
                }
            } else if diff < 0 {
                BattleOutcome {
                    attacker_damage: diff.saturating_abs(),
                    defender_damage: 0,
                    destroyed: vec![attacker.instance_id.clone()],
                    tie: false,
                }
            } else {
                BattleOutcome {
                    attacker_damage: 0,
                    defender_damage: 0,
                    destroyed: vec![
                        attacker.instance_id.clone(),
                        defender.instance_id.clone(),
                    ],
                    tie: true,
                }
            }
        }
        BattleStance::Defense => {
            let diff = attacker.attack().saturating_sub(defender.defense());
            if diff > 0 {
                BattleOutcome {
                    attacker_damage: 0,
                    defender_damage: 0,
                    destroyed: vec![defender.instance_id.clone()],
                    tie: false,
                }
            } else if diff < 0 {
                BattleOutcome {
                    attacker_damage: diff.saturating_abs(),
                    defender_damage: 0,
                    destroyed: Vec::new(),
                    tie: false,
                }
            } else {
                BattleOutcome {
                    attacker_damage: 0,
                    defender_damage: 0,
                    destroyed: Vec::new(),
                    tie: true,
                }
            }
        }
    }
}

/// Tributes required to summon a monster of the given level.
///
/// Level 4 and below summon without tribute; 5-6 take one; 7 and up take
/// two.
#[must_use]
pub fn required_tributes(level: u8) -> usize {
    match level {
        0..=4 => 0,
        5..=6 => 1,
        _ => 2,
    }
}
