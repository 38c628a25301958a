//! Per-player zone collections.
//!
//! `PlayerBoard` owns the five zones of one player and is the only code
//! that moves instances between them. It maintains two invariants:
//! - an instance lives in exactly one zone, and its `position` tag always
//!   names that zone;
//! - the two field zones never exceed `FIELD_CAPACITY`.
//!
//! Removal returns the index the card occupied so callers can undo a move
//! exactly (tribute-summon rollback restores original field order).

use serde::{Deserialize, Serialize};

use crate::cards::{CardInstance, CardPosition, InstanceId};

/// Maximum cards on the monster field or spell/trap field.
pub const FIELD_CAPACITY: usize = 5;

/// The five zones a card can occupy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    Deck,
    Hand,
    MonsterField,
    SpellTrapField,
    Graveyard,
}

impl ZoneKind {
    /// The position tag instances in this zone carry.
    #[must_use]
    pub fn position(self) -> CardPosition {
        match self {
            ZoneKind::Deck => CardPosition::Deck,
            ZoneKind::Hand => CardPosition::Hand,
            ZoneKind::MonsterField => CardPosition::MonsterZone,
            ZoneKind::SpellTrapField => CardPosition::SpellTrapZone,
            ZoneKind::Graveyard => CardPosition::GraveZone,
        }
    }

    /// Capacity limit, if this zone has one.
    #[must_use]
    pub fn capacity(self) -> Option<usize> {
        match self {
            ZoneKind::MonsterField | ZoneKind::SpellTrapField => Some(FIELD_CAPACITY),
            _ => None,
        }
    }
}

/// One player's card collections.
///
/// The deck is ordered front-to-back: index 0 is the next card drawn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerBoard {
    deck: Vec<CardInstance>,
    hand: Vec<CardInstance>,
    monster_field: Vec<CardInstance>,
    spell_trap_field: Vec<CardInstance>,
    graveyard: Vec<CardInstance>,
}

impl PlayerBoard {
    /// Create an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn zone_vec(&self, kind: ZoneKind) -> &Vec<CardInstance> {
        match kind {
            ZoneKind::Deck => &self.deck,
            ZoneKind::Hand => &self.hand,
            ZoneKind::MonsterField => &self.monster_field,
            ZoneKind::SpellTrapField => &self.spell_trap_field,
            ZoneKind::Graveyard => &self.graveyard,
        }
    }

    fn zone_vec_mut(&mut self, kind: ZoneKind) -> &mut Vec<CardInstance> {
        match kind {
            ZoneKind::Deck => &mut self.deck,
            ZoneKind::Hand => &mut self.hand,
            ZoneKind::MonsterField => &mut self.monster_field,
            ZoneKind::SpellTrapField => &mut self.spell_trap_field,
            ZoneKind::Graveyard => &mut self.graveyard,
        }
    }

    /// Cards in a zone, in order.
    #[must_use]
    pub fn zone(&self, kind: ZoneKind) -> &[CardInstance] {
        self.zone_vec(kind)
    }

    /// Number of cards in a zone.
    #[must_use]
    pub fn zone_len(&self, kind: ZoneKind) -> usize {
        self.zone_vec(kind).len()
    }

    /// Check whether a capacity-limited zone is at its limit.
    ///
    /// Always false for zones without a capacity.
    #[must_use]
    pub fn is_zone_full(&self, kind: ZoneKind) -> bool {
        kind.capacity()
            .is_some_and(|cap| self.zone_vec(kind).len() >= cap)
    }

    /// Check whether any zone holds the given instance.
    #[must_use]
    pub fn contains(&self, id: &InstanceId) -> bool {
        self.locate(id).is_some()
    }

    /// Find which zone holds an instance, and at what index.
    #[must_use]
    pub fn locate(&self, id: &InstanceId) -> Option<(ZoneKind, usize)> {
        for kind in [
            ZoneKind::Deck,
            ZoneKind::Hand,
            ZoneKind::MonsterField,
            ZoneKind::SpellTrapField,
            ZoneKind::Graveyard,
        ] {
            if let Some(idx) = self.index_of(kind, id) {
                return Some((kind, idx));
            }
        }
        None
    }

    /// Index of an instance within a zone.
    #[must_use]
    pub fn index_of(&self, kind: ZoneKind, id: &InstanceId) -> Option<usize> {
        self.zone_vec(kind).iter().position(|c| &c.instance_id == id)
    }

    /// Borrow an instance in a zone.
    #[must_use]
    pub fn find(&self, kind: ZoneKind, id: &InstanceId) -> Option<&CardInstance> {
        self.zone_vec(kind).iter().find(|c| &c.instance_id == id)
    }

    /// Mutably borrow an instance in a zone.
    pub fn find_mut(&mut self, kind: ZoneKind, id: &InstanceId) -> Option<&mut CardInstance> {
        self.zone_vec_mut(kind)
            .iter_mut()
            .find(|c| &c.instance_id == id)
    }

    /// Append a card to a zone, rewriting its position tag.
    ///
    /// Callers must check `is_zone_full` first for capacity-limited zones.
    pub fn push(&mut self, kind: ZoneKind, mut card: CardInstance) {
        debug_assert!(
            !self.contains(&card.instance_id),
            "instance {} already on board",
            card.instance_id
        );
        debug_assert!(!self.is_zone_full(kind), "{kind:?} over capacity");

        card.position = kind.position();
        self.zone_vec_mut(kind).push(card);
    }

    /// Re-insert a card at a specific index, rewriting its position tag.
    ///
    /// Used to undo a removal while preserving zone order.
    pub fn insert(&mut self, kind: ZoneKind, index: usize, mut card: CardInstance) {
        card.position = kind.position();
        let zone = self.zone_vec_mut(kind);
        let index = index.min(zone.len());
        zone.insert(index, card);
    }

    /// Remove a card from a zone by instance ID.
    ///
    /// Returns the card and the index it occupied, or `None` if absent.
    pub fn take(&mut self, kind: ZoneKind, id: &InstanceId) -> Option<(usize, CardInstance)> {
        let idx = self.index_of(kind, id)?;
        Some((idx, self.zone_vec_mut(kind).remove(idx)))
    }

    /// Remove the front card of a zone (the next deck draw).
    pub fn take_front(&mut self, kind: ZoneKind) -> Option<CardInstance> {
        let zone = self.zone_vec_mut(kind);
        if zone.is_empty() {
            None
        } else {
            Some(zone.remove(0))
        }
    }

    /// Replace the deck wholesale, tagging every card.
    pub fn install_deck(&mut self, cards: Vec<CardInstance>) {
        self.deck = cards;
        for card in &mut self.deck {
            card.position = CardPosition::Deck;
        }
    }

    /// Iterate mutably over a zone (clearing attack flags at turn end).
    pub fn zone_iter_mut(&mut self, kind: ZoneKind) -> std::slice::IterMut<'_, CardInstance> {
        self.zone_vec_mut(kind).iter_mut()
    }

    /// Mutable access to the deck for shuffling.
    pub(crate) fn deck_mut(&mut self) -> &mut [CardInstance] {
        &mut self.deck
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CatalogId};

    fn card(n: u32) -> CardInstance {
        CardInstance::new(
            CardDefinition::monster(CatalogId::new(n), format!("M{n}"), 1000, 1000, 4),
            InstanceId::new(format!("i{n}")),
        )
    }

    fn id(n: u32) -> InstanceId {
        InstanceId::new(format!("i{n}"))
    }

    #[test]
    fn test_push_sets_position() {
        let mut board = PlayerBoard::new();
        board.push(ZoneKind::Hand, card(1));

        let held = board.find(ZoneKind::Hand, &id(1)).unwrap();
        assert_eq!(held.position, CardPosition::Hand);
    }

    #[test]
    fn test_take_returns_index() {
        let mut board = PlayerBoard::new();
        board.push(ZoneKind::MonsterField, card(1));
        board.push(ZoneKind::MonsterField, card(2));
        board.push(ZoneKind::MonsterField, card(3));

        let (idx, taken) = board.take(ZoneKind::MonsterField, &id(2)).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(taken.instance_id, id(2));
        assert_eq!(board.zone_len(ZoneKind::MonsterField), 2);
    }

    #[test]
    fn test_insert_restores_order() {
        let mut board = PlayerBoard::new();
        board.push(ZoneKind::MonsterField, card(1));
        board.push(ZoneKind::MonsterField, card(2));
        board.push(ZoneKind::MonsterField, card(3));

        let (idx, taken) = board.take(ZoneKind::MonsterField, &id(2)).unwrap();
        board.insert(ZoneKind::MonsterField, idx, taken);

        let order: Vec<_> = board
            .zone(ZoneKind::MonsterField)
            .iter()
            .map(|c| c.instance_id.clone())
            .collect();
        assert_eq!(order, vec![id(1), id(2), id(3)]);
    }

    #[test]
    fn test_field_capacity() {
        let mut board = PlayerBoard::new();
        for n in 0..FIELD_CAPACITY as u32 {
            board.push(ZoneKind::MonsterField, card(n));
        }

        assert!(board.is_zone_full(ZoneKind::MonsterField));
        assert!(!board.is_zone_full(ZoneKind::SpellTrapField));
        // Unlimited zones are never full.
        assert!(!board.is_zone_full(ZoneKind::Graveyard));
    }

    #[test]
    fn test_take_front_consumes_deck_in_order() {
        let mut board = PlayerBoard::new();
        board.install_deck(vec![card(1), card(2), card(3)]);

        assert_eq!(board.take_front(ZoneKind::Deck).unwrap().instance_id, id(1));
        assert_eq!(board.take_front(ZoneKind::Deck).unwrap().instance_id, id(2));
        assert_eq!(board.take_front(ZoneKind::Deck).unwrap().instance_id, id(3));
        assert!(board.take_front(ZoneKind::Deck).is_none());
    }

    #[test]
    fn test_install_deck_tags_positions() {
        let mut board = PlayerBoard::new();
        let mut fielded = card(1);
        fielded.position = CardPosition::MonsterZone;
        board.install_deck(vec![fielded, card(2)]);

        assert!(board
            .zone(ZoneKind::Deck)
            .iter()
            .all(|c| c.position == CardPosition::Deck));
    }

    #[test]
    fn test_locate_across_zones() {
        let mut board = PlayerBoard::new();
        board.push(ZoneKind::Hand, card(1));
        board.push(ZoneKind::Graveyard, card(2));

        assert_eq!(board.locate(&id(1)), Some((ZoneKind::Hand, 0)));
        assert_eq!(board.locate(&id(2)), Some((ZoneKind::Graveyard, 0)));
        assert_eq!(board.locate(&id(99)), None);
        assert!(board.contains(&id(1)));
        assert!(!board.contains(&id(99)));
    }

    #[test]
    fn test_zone_kind_positions() {
        assert_eq!(ZoneKind::Deck.position(), CardPosition::Deck);
        assert_eq!(ZoneKind::MonsterField.position(), CardPosition::MonsterZone);
        assert_eq!(ZoneKind::Graveyard.position(), CardPosition::GraveZone);
    }
}
