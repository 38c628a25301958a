//! Card definitions - static catalog data.
//!
//! `CardDefinition` holds the immutable properties a card carries in the
//! external catalog: name, combat stats, level, and descriptive text.
//! Per-copy battle state (position, stance, attack flag) is stored
//! separately in `CardInstance`.

use serde::{Deserialize, Serialize};

use crate::zones::ZoneKind;

/// Unique identifier for a card in the external catalog.
///
/// Identifies the card "type" (e.g., "Blue-Eyes White Dragon"), not a
/// specific copy in a duel. Multiple copies in a deck share a `CatalogId`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogId(pub u32);

impl CatalogId {
    /// Create a new catalog ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CatalogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// The three card categories the engine routes on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardType {
    Monster,
    Spell,
    Trap,
}

impl CardType {
    /// The field zone a card of this type is summoned to.
    ///
    /// Monsters go to the monster field; spells and traps share the
    /// spell/trap field. Resolved once here and reused everywhere.
    #[must_use]
    pub fn destination_zone(self) -> ZoneKind {
        match self {
            CardType::Monster => ZoneKind::MonsterField,
            CardType::Spell | CardType::Trap => ZoneKind::SpellTrapField,
        }
    }
}

/// Static card definition as supplied by the catalog collaborator.
///
/// `effect_ref` is stored but never interpreted - effect scripting is
/// outside this engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Catalog identifier. May repeat across copies in one deck.
    pub catalog_id: CatalogId,

    /// Card name (for display/debugging).
    pub name: String,

    /// Monster, spell, or trap.
    #[serde(rename = "type")]
    pub card_type: CardType,

    /// Elemental attribute (catalog metadata, opaque to the engine).
    #[serde(default)]
    pub attribute: String,

    /// Archetype tag (catalog metadata, opaque to the engine).
    #[serde(default)]
    pub archetype: String,

    /// Attack stat. Zero for spells and traps.
    #[serde(default)]
    pub attack: i32,

    /// Defense stat. Zero for spells and traps.
    #[serde(default)]
    pub defense: i32,

    /// Monster level. Zero for spells and traps.
    #[serde(default)]
    pub level: u8,

    /// Tribute count as listed in the catalog.
    ///
    /// Informational only - summoning rules derive the required count
    /// from `level`.
    #[serde(default)]
    pub tribute_count: u8,

    /// Rules/flavor text.
    #[serde(default)]
    pub description: String,

    /// Reference to the card art.
    #[serde(default)]
    pub image_ref: String,

    /// Opaque reference to the card's scripted effect, if any.
    #[serde(default)]
    pub effect_ref: String,
}

impl CardDefinition {
    /// Create a monster definition with the given combat stats.
    #[must_use]
    pub fn monster(
        catalog_id: CatalogId,
        name: impl Into<String>,
        attack: i32,
        defense: i32,
        level: u8,
    ) -> Self {
        Self {
            catalog_id,
            name: name.into(),
            card_type: CardType::Monster,
            attribute: String::new(),
            archetype: String::new(),
            attack,
            defense,
            level,
            tribute_count: 0,
            description: String::new(),
            image_ref: String::new(),
            effect_ref: String::new(),
        }
    }

    /// Create a spell definition.
    #[must_use]
    pub fn spell(catalog_id: CatalogId, name: impl Into<String>) -> Self {
        Self {
            card_type: CardType::Spell,
            ..Self::monster(catalog_id, name, 0, 0, 0)
        }
    }

    /// Create a trap definition.
    #[must_use]
    pub fn trap(catalog_id: CatalogId, name: impl Into<String>) -> Self {
        Self {
            card_type: CardType::Trap,
            ..Self::monster(catalog_id, name, 0, 0, 0)
        }
    }

    /// Check whether this card is a monster.
    #[must_use]
    pub fn is_monster(&self) -> bool {
        self.card_type == CardType::Monster
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_id() {
        let id = CatalogId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(format!("{}", id), "Card(42)");
    }

    #[test]
    fn test_destination_zone() {
        assert_eq!(CardType::Monster.destination_zone(), ZoneKind::MonsterField);
        assert_eq!(CardType::Spell.destination_zone(), ZoneKind::SpellTrapField);
        assert_eq!(CardType::Trap.destination_zone(), ZoneKind::SpellTrapField);
    }

    #[test]
    fn test_monster_definition() {
        let dragon = CardDefinition::monster(CatalogId::new(1), "Test Dragon", 3000, 2500, 8);

        assert!(dragon.is_monster());
        assert_eq!(dragon.attack, 3000);
        assert_eq!(dragon.defense, 2500);
        assert_eq!(dragon.level, 8);
    }

    #[test]
    fn test_spell_and_trap_definitions() {
        let spell = CardDefinition::spell(CatalogId::new(2), "Test Spell");
        let trap = CardDefinition::trap(CatalogId::new(3), "Test Trap");

        assert!(!spell.is_monster());
        assert!(!trap.is_monster());
        assert_eq!(spell.card_type, CardType::Spell);
        assert_eq!(trap.card_type, CardType::Trap);
    }

    #[test]
    fn test_card_type_wire_names() {
        assert_eq!(serde_json::to_string(&CardType::Monster).unwrap(), "\"monster\"");
        assert_eq!(serde_json::to_string(&CardType::Spell).unwrap(), "\"spell\"");
        assert_eq!(serde_json::to_string(&CardType::Trap).unwrap(), "\"trap\"");
    }

    #[test]
    fn test_definition_deserializes_catalog_json() {
        // Descriptive fields may be missing from a minimal catalog row.
        let json = r#"{
            "catalog_id": 7,
            "name": "Summoned Skull",
            "type": "monster",
            "attack": 2500,
            "defense": 1200,
            "level": 6
        }"#;

        let def: CardDefinition = serde_json::from_str(json).unwrap();
        assert_eq!(def.catalog_id, CatalogId::new(7));
        assert!(def.is_monster());
        assert_eq!(def.level, 6);
        assert!(def.description.is_empty());
    }
}
