//! Card instances - one physical copy in a duel.
//!
//! `CardInstance` pairs an immutable `CardDefinition` with the mutable
//! battle state of a single copy: its current position tag, battle stance,
//! and the attack-once-per-turn flag. The `InstanceId` is assigned once
//! when the copy enters a session and never reused within it.
//!
//! The `position` tag always matches the zone collection holding the
//! instance; `PlayerBoard` rewrites it on every move.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::definition::{CardDefinition, CardType};

/// Session-unique identifier for one physical card copy.
///
/// Opaque string token. Two copies of the same catalog card get distinct
/// instance IDs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(String);

impl InstanceId {
    /// Wrap an existing token (tests, replay).
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh collision-free token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Get the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which zone tag an instance currently carries.
///
/// Wire names match the catalog protocol (`monster_zone` etc.).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardPosition {
    Deck,
    Hand,
    MonsterZone,
    SpellTrapZone,
    GraveZone,
}

/// Orientation of a fielded monster, selecting which combat stat applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleStance {
    Attack,
    Defense,
}

/// One card copy inside a duel session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Immutable catalog data.
    #[serde(flatten)]
    pub definition: CardDefinition,

    /// Session-unique copy identifier.
    pub instance_id: InstanceId,

    /// Zone tag, kept consistent with the containing collection.
    pub position: CardPosition,

    /// Battle orientation. Meaningful only on the monster field.
    pub battle_stance: BattleStance,

    /// Set after this monster attacks; cleared at the start of its
    /// controller's next turn.
    pub has_attacked: bool,
}

impl CardInstance {
    /// Create an instance with an explicit ID, starting in the deck.
    #[must_use]
    pub fn new(definition: CardDefinition, instance_id: InstanceId) -> Self {
        Self {
            definition,
            instance_id,
            position: CardPosition::Deck,
            battle_stance: BattleStance::Attack,
            has_attacked: false,
        }
    }

    /// Create an instance with a freshly generated ID.
    #[must_use]
    pub fn fresh(definition: CardDefinition) -> Self {
        Self::new(definition, InstanceId::generate())
    }

    /// Check whether this copy is a monster.
    #[must_use]
    pub fn is_monster(&self) -> bool {
        self.definition.is_monster()
    }

    /// The card's category.
    #[must_use]
    pub fn card_type(&self) -> CardType {
        self.definition.card_type
    }

    /// Attack stat.
    #[must_use]
    pub fn attack(&self) -> i32 {
        self.definition.attack
    }

    /// Defense stat.
    #[must_use]
    pub fn defense(&self) -> i32 {
        self.definition.defense
    }

    /// Monster level.
    #[must_use]
    pub fn level(&self) -> u8 {
        self.definition.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CatalogId;

    fn dragon() -> CardDefinition {
        CardDefinition::monster(CatalogId::new(1), "Test Dragon", 3000, 2500, 8)
    }

    #[test]
    fn test_instance_starts_in_deck() {
        let card = CardInstance::new(dragon(), InstanceId::new("a"));

        assert_eq!(card.position, CardPosition::Deck);
        assert_eq!(card.battle_stance, BattleStance::Attack);
        assert!(!card.has_attacked);
        assert_eq!(card.attack(), 3000);
    }

    #[test]
    fn test_fresh_ids_are_unique() {
        let a = CardInstance::fresh(dragon());
        let b = CardInstance::fresh(dragon());

        assert_eq!(a.definition.catalog_id, b.definition.catalog_id);
        assert_ne!(a.instance_id, b.instance_id);
    }

    #[test]
    fn test_position_wire_names() {
        assert_eq!(
            serde_json::to_string(&CardPosition::MonsterZone).unwrap(),
            "\"monster_zone\""
        );
        assert_eq!(
            serde_json::to_string(&CardPosition::SpellTrapZone).unwrap(),
            "\"spell_trap_zone\""
        );
        assert_eq!(
            serde_json::to_string(&CardPosition::GraveZone).unwrap(),
            "\"grave_zone\""
        );
    }

    #[test]
    fn test_instance_serialization_roundtrip() {
        let mut card = CardInstance::new(dragon(), InstanceId::new("copy-1"));
        card.position = CardPosition::MonsterZone;
        card.battle_stance = BattleStance::Defense;
        card.has_attacked = true;

        let json = serde_json::to_string(&card).unwrap();
        let back: CardInstance = serde_json::from_str(&json).unwrap();

        assert_eq!(card, back);
    }
}
