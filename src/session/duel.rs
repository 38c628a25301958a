//! The duel session state machine.
//!
//! `DuelSession` is the authoritative state for one two-player room: both
//! players' zones and life points, turn ownership, phase, and the winner.
//! Every rule of the duel is enforced here; callers reach a session only
//! through the registry, which guarantees exclusive access during each
//! operation.
//!
//! Mutation discipline: every operation validates fully before touching
//! state, or (tribute summon) records enough to roll back exactly. Once
//! `winner` is set the session is terminal and all state-changing
//! operations fail `InvalidState`.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cards::{BattleStance, CardInstance, InstanceId};
use crate::core::{DuelError, DuelRng, PlayerId, PlayerRole, PlayerState, Result, RoomId};
use crate::session::battle::{required_tributes, resolve_battle, BattleOutcome};
use crate::session::snapshot::{PlayerSnapshot, SessionSnapshot};
use crate::zones::ZoneKind;

/// Number of cards in the opening hand.
pub const INITIAL_HAND_SIZE: usize = 5;

/// Duel phases within one turn, plus the pre-game `Waiting` state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Waiting,
    Draw,
    Main1,
    Battle,
    Main2,
    End,
}

/// Authoritative state for one duel room.
#[derive(Debug)]
pub struct DuelSession {
    room_id: RoomId,
    player1: PlayerState,
    player2: Option<PlayerState>,
    current_turn: Option<PlayerRole>,
    phase: Phase,
    turn_count: u32,
    winner: Option<PlayerRole>,
    created_at: DateTime<Utc>,
    last_activity: Instant,
    rng: DuelRng,
}

impl DuelSession {
    /// Open a room with its first player.
    #[must_use]
    pub fn new(room_id: RoomId, player1_id: PlayerId, rng: DuelRng) -> Self {
        Self {
            room_id,
            player1: PlayerState::new(player1_id),
            player2: None,
            current_turn: None,
            phase: Phase::Waiting,
            turn_count: 0,
            winner: None,
            created_at: Utc::now(),
            last_activity: Instant::now(),
            rng,
        }
    }

    // === Accessors ===

    #[must_use]
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn current_turn(&self) -> Option<PlayerRole> {
        self.current_turn
    }

    #[must_use]
    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    #[must_use]
    pub fn winner(&self) -> Option<PlayerRole> {
        self.winner
    }

    /// Identifiers of every player in the room.
    #[must_use]
    pub fn player_ids(&self) -> Vec<PlayerId> {
        let mut ids = vec![self.player1.player_id.clone()];
        if let Some(p2) = &self.player2 {
            ids.push(p2.player_id.clone());
        }
        ids
    }

    /// The seat a player occupies, if they are in this room.
    #[must_use]
    pub fn role_of(&self, player_id: &PlayerId) -> Option<PlayerRole> {
        if self.player1.player_id == *player_id {
            Some(PlayerRole::Player1)
        } else if self
            .player2
            .as_ref()
            .is_some_and(|p| p.player_id == *player_id)
        {
            Some(PlayerRole::Player2)
        } else {
            None
        }
    }

    /// Borrow a seat's state.
    #[must_use]
    pub fn player(&self, role: PlayerRole) -> Option<&PlayerState> {
        match role {
            PlayerRole::Player1 => Some(&self.player1),
            PlayerRole::Player2 => self.player2.as_ref(),
        }
    }

    fn player_mut(&mut self, role: PlayerRole) -> Option<&mut PlayerState> {
        match role {
            PlayerRole::Player1 => Some(&mut self.player1),
            PlayerRole::Player2 => self.player2.as_mut(),
        }
    }

    /// Mutably borrow a seat and its opponent together.
    fn pair_mut(&mut self, role: PlayerRole) -> Result<(&mut PlayerState, &mut PlayerState)> {
        let p2 = self.player2.as_mut().ok_or(DuelError::PlayerNotFound)?;
        match role {
            PlayerRole::Player1 => Ok((&mut self.player1, p2)),
            PlayerRole::Player2 => Ok((p2, &mut self.player1)),
        }
    }

    // === Lifecycle ===

    /// Record caller activity. The registry's idle sweep keys off this.
    pub fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Check whether the room has been inactive past `timeout` as of `now`.
    #[must_use]
    pub fn is_idle(&self, now: Instant, timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_activity) > timeout
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Seat the second player.
    pub fn join(&mut self, player_id: PlayerId) -> Result<()> {
        if self.player1.player_id == player_id {
            return Err(DuelError::AlreadyInRoom);
        }
        if self.player2.is_some() {
            return Err(DuelError::RoomFull);
        }
        self.player2 = Some(PlayerState::new(player_id));
        self.touch();
        Ok(())
    }

    /// Forfeit: the leaving player's opponent wins a still-live duel.
    ///
    /// Acknowledged even after the duel has ended, so a loser can leave a
    /// finished room.
    pub fn forfeit(&mut self, player_id: &PlayerId) -> Result<()> {
        let role = self.role_of(player_id).ok_or(DuelError::PlayerNotFound)?;
        if self.winner.is_none() && self.player2.is_some() {
            self.winner = Some(role.opponent());
            info!(room = %self.room_id, loser = %player_id, "player forfeited");
        }
        self.touch();
        Ok(())
    }

    fn ensure_live(&self) -> Result<()> {
        if self.winner.is_some() {
            return Err(DuelError::InvalidState);
        }
        Ok(())
    }

    fn ensure_turn(&self, role: PlayerRole) -> Result<()> {
        if self.current_turn != Some(role) {
            return Err(DuelError::NotYourTurn);
        }
        Ok(())
    }

    // === Deck initialization ===

    /// Install a player's fetched deck: shuffle, mark ready, and start the
    /// duel once both sides are ready.
    ///
    /// The starting player is chosen uniformly at random.
    pub fn install_deck(&mut self, player_id: &PlayerId, cards: Vec<CardInstance>) -> Result<()> {
        self.ensure_live()?;
        let role = self.role_of(player_id).ok_or(DuelError::PlayerNotFound)?;

        let player = match self.player_mut(role) {
            Some(p) => p,
            None => return Err(DuelError::PlayerNotFound),
        };
        player.board.install_deck(cards);
        player.is_ready = true;

        let rng = &mut self.rng;
        match role {
            PlayerRole::Player1 => rng.shuffle(self.player1.board.deck_mut()),
            PlayerRole::Player2 => {
                if let Some(p2) = self.player2.as_mut() {
                    rng.shuffle(p2.board.deck_mut());
                }
            }
        }

        let both_ready = self.player1.is_ready
            && self.player2.as_ref().is_some_and(|p| p.is_ready);
        if both_ready && self.phase == Phase::Waiting {
            let starter = if self.rng.coin_flip() {
                PlayerRole::Player1
            } else {
                PlayerRole::Player2
            };
            self.current_turn = Some(starter);
            self.phase = Phase::Draw;
            self.turn_count = 1;
            info!(room = %self.room_id, starter = %starter, "duel started");
        }

        self.touch();
        Ok(())
    }

    /// Move the opening hand from deck to hand, in deck order.
    pub fn draw_initial_hand(&mut self, player_id: &PlayerId) -> Result<()> {
        self.ensure_live()?;
        let role = self.role_of(player_id).ok_or(DuelError::PlayerNotFound)?;
        let player = self.player_mut(role).ok_or(DuelError::PlayerNotFound)?;

        if player.board.zone_len(ZoneKind::Deck) < INITIAL_HAND_SIZE {
            return Err(DuelError::InsufficientCards);
        }
        for _ in 0..INITIAL_HAND_SIZE {
            if let Some(card) = player.board.take_front(ZoneKind::Deck) {
                player.board.push(ZoneKind::Hand, card);
            }
        }
        self.touch();
        Ok(())
    }

    // === Turn operations ===

    /// Draw the front card of the deck into the hand.
    ///
    /// Returns `None` on deck-out: the opponent wins and the session goes
    /// terminal. The turn's first draw advances the phase to `main1`.
    pub fn draw_card(&mut self, player_id: &PlayerId) -> Result<Option<InstanceId>> {
        self.ensure_live()?;
        let role = self.role_of(player_id).ok_or(DuelError::PlayerNotFound)?;
        self.ensure_turn(role)?;

        let player = self.player_mut(role).ok_or(DuelError::PlayerNotFound)?;
        let Some(card) = player.board.take_front(ZoneKind::Deck) else {
            // Deck-out is the sole automatic loss besides life depletion.
            self.winner = Some(role.opponent());
            info!(room = %self.room_id, loser = %role, "deck-out");
            self.touch();
            return Ok(None);
        };

        let drawn = card.instance_id.clone();
        player.board.push(ZoneKind::Hand, card);
        if self.phase == Phase::Draw {
            self.phase = Phase::Main1;
        }
        self.touch();
        Ok(Some(drawn))
    }

    /// Step the turn owner's phase: draw, main1, battle, main2, end.
    pub fn advance_phase(&mut self, player_id: &PlayerId) -> Result<Phase> {
        self.ensure_live()?;
        let role = self.role_of(player_id).ok_or(DuelError::PlayerNotFound)?;
        self.ensure_turn(role)?;

        self.phase = match self.phase {
            Phase::Draw => Phase::Main1,
            Phase::Main1 => Phase::Battle,
            Phase::Battle => Phase::Main2,
            Phase::Main2 => Phase::End,
            Phase::Waiting | Phase::End => return Err(DuelError::InvalidState),
        };
        self.touch();
        Ok(self.phase)
    }

    /// Pass the turn to the opponent.
    ///
    /// Clears the ending player's per-monster attack flags (each monster
    /// attacks once per its controller's turn) and both players'
    /// normal-summon flags.
    pub fn end_turn(&mut self, player_id: &PlayerId) -> Result<()> {
        self.ensure_live()?;
        let role = self.role_of(player_id).ok_or(DuelError::PlayerNotFound)?;
        self.ensure_turn(role)?;

        if let Some(player) = self.player_mut(role) {
            for monster in player.board.zone_iter_mut(ZoneKind::MonsterField) {
                monster.has_attacked = false;
            }
        }
        self.player1.normal_summon_used = false;
        if let Some(p2) = self.player2.as_mut() {
            p2.normal_summon_used = false;
        }

        self.current_turn = Some(role.opponent());
        self.phase = Phase::Draw;
        self.turn_count += 1;
        self.touch();
        debug!(room = %self.room_id, turn = self.turn_count, "turn passed");
        Ok(())
    }

    // === Summoning ===

    /// Play a card from hand to its field: monsters to the monster field,
    /// spells and traps to the spell/trap field.
    ///
    /// On `ZoneFull` the card stays in hand untouched.
    pub fn summon_card(&mut self, player_id: &PlayerId, instance_id: &InstanceId) -> Result<()> {
        self.ensure_live()?;
        let role = self.role_of(player_id).ok_or(DuelError::PlayerNotFound)?;
        self.ensure_turn(role)?;

        let player = self.player_mut(role).ok_or(DuelError::PlayerNotFound)?;
        let card = player
            .board
            .find(ZoneKind::Hand, instance_id)
            .ok_or(DuelError::CardNotInHand)?;
        let destination = card.card_type().destination_zone();

        if player.board.is_zone_full(destination) {
            return Err(DuelError::ZoneFull);
        }

        let (_, mut card) = player
            .board
            .take(ZoneKind::Hand, instance_id)
            .ok_or(DuelError::CardNotInHand)?;
        if card.is_monster() {
            card.battle_stance = BattleStance::Attack;
            card.has_attacked = false;
        }
        player.board.push(destination, card);
        self.touch();
        Ok(())
    }

    /// Tribute-summon a monster from hand, sacrificing fielded monsters.
    ///
    /// The required tribute count is derived from the monster's level.
    /// All tributes are validated before anything moves; if the field is
    /// somehow full after the tributes leave, every tribute is restored to
    /// its original slot and the graveyard is unwound.
    pub fn tribute_summon(
        &mut self,
        player_id: &PlayerId,
        monster_id: &InstanceId,
        tribute_ids: &[InstanceId],
    ) -> Result<()> {
        self.ensure_live()?;
        let role = self.role_of(player_id).ok_or(DuelError::PlayerNotFound)?;
        self.ensure_turn(role)?;

        let player = self.player_mut(role).ok_or(DuelError::PlayerNotFound)?;
        if player.normal_summon_used {
            return Err(DuelError::NormalSummonAlreadyUsed);
        }

        let monster = player
            .board
            .find(ZoneKind::Hand, monster_id)
            .ok_or(DuelError::CardNotInHand)?;
        if !monster.is_monster() {
            return Err(DuelError::NotAMonster);
        }

        let level = monster.level();
        let required = required_tributes(level);
        if tribute_ids.len() != required {
            return Err(DuelError::WrongTributeCount { level, required });
        }

        // All-or-nothing: every tribute must be on the field, and a
        // duplicate id would vanish after the first removal.
        for (i, id) in tribute_ids.iter().enumerate() {
            if tribute_ids[..i].contains(id)
                || player.board.index_of(ZoneKind::MonsterField, id).is_none()
            {
                return Err(DuelError::TributeNotOnField(id.clone()));
            }
        }

        // Move tributes to the graveyard, keeping enough to undo exactly.
        let mut moved: Vec<(usize, InstanceId)> = Vec::with_capacity(tribute_ids.len());
        for id in tribute_ids {
            if let Some((idx, card)) = player.board.take(ZoneKind::MonsterField, id) {
                player.board.push(ZoneKind::Graveyard, card);
                moved.push((idx, id.clone()));
            }
        }

        // The summon occupies the freed capacity only now, so the limit is
        // re-checked after removal.
        if player.board.is_zone_full(ZoneKind::MonsterField) {
            for (idx, id) in moved.into_iter().rev() {
                if let Some((_, card)) = player.board.take(ZoneKind::Graveyard, &id) {
                    player.board.insert(ZoneKind::MonsterField, idx, card);
                }
            }
            return Err(DuelError::ZoneFull);
        }

        let (_, mut card) = player
            .board
            .take(ZoneKind::Hand, monster_id)
            .ok_or(DuelError::CardNotInHand)?;
        card.battle_stance = BattleStance::Attack;
        card.has_attacked = false;
        player.board.push(ZoneKind::MonsterField, card);
        player.normal_summon_used = true;
        self.touch();
        Ok(())
    }

    /// Move a card from a field zone to the graveyard.
    ///
    /// A no-op (not an error) when the card is absent: effect resolution
    /// may race a concurrent zone change.
    pub fn send_to_graveyard(
        &mut self,
        player_id: &PlayerId,
        instance_id: &InstanceId,
        from_zone: ZoneKind,
    ) -> Result<()> {
        self.ensure_live()?;
        let role = self.role_of(player_id).ok_or(DuelError::PlayerNotFound)?;
        let player = self.player_mut(role).ok_or(DuelError::PlayerNotFound)?;

        if matches!(from_zone, ZoneKind::MonsterField | ZoneKind::SpellTrapField) {
            if let Some((_, card)) = player.board.take(from_zone, instance_id) {
                player.board.push(ZoneKind::Graveyard, card);
            }
        }
        self.touch();
        Ok(())
    }

    // === Battle ===

    /// Attack the opponent's monster with one of yours.
    ///
    /// Applies the resolver's life-point deltas and destruction set, then
    /// checks the win condition.
    pub fn attack(
        &mut self,
        player_id: &PlayerId,
        attacker_id: &InstanceId,
        defender_id: &InstanceId,
    ) -> Result<BattleOutcome> {
        self.ensure_live()?;
        let role = self.role_of(player_id).ok_or(DuelError::PlayerNotFound)?;
        self.ensure_turn(role)?;

        let (me, opponent) = self.pair_mut(role)?;

        // A pre-existing zero life total means the room is already decided.
        if me.is_defeated() || opponent.is_defeated() {
            return Err(DuelError::InvalidState);
        }

        let attacker = me
            .board
            .find(ZoneKind::MonsterField, attacker_id)
            .ok_or(DuelError::MonsterNotOnField)?;
        if attacker.has_attacked {
            return Err(DuelError::AlreadyAttacked);
        }
        let defender = opponent
            .board
            .find(ZoneKind::MonsterField, defender_id)
            .ok_or(DuelError::MonsterNotOnField)?;

        let outcome = resolve_battle(attacker, defender);

        if let Some(attacker) = me.board.find_mut(ZoneKind::MonsterField, attacker_id) {
            attacker.has_attacked = true;
        }
        me.apply_damage(outcome.attacker_damage);
        opponent.apply_damage(outcome.defender_damage);

        for destroyed in &outcome.destroyed {
            if let Some((_, card)) = me.board.take(ZoneKind::MonsterField, destroyed) {
                me.board.push(ZoneKind::Graveyard, card);
            } else if let Some((_, card)) = opponent.board.take(ZoneKind::MonsterField, destroyed)
            {
                opponent.board.push(ZoneKind::Graveyard, card);
            }
        }

        let me_defeated = me.is_defeated();
        let opponent_defeated = opponent.is_defeated();
        if opponent_defeated {
            self.winner = Some(role);
            info!(room = %self.room_id, winner = %role, "life points depleted");
        } else if me_defeated {
            self.winner = Some(role.opponent());
            info!(room = %self.room_id, winner = %role.opponent(), "life points depleted");
        }

        self.touch();
        Ok(outcome)
    }

    // === Snapshots ===

    /// Build a serializable view of the room.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        let mut players = vec![self.player_snapshot(PlayerRole::Player1, &self.player1)];
        if let Some(p2) = &self.player2 {
            players.push(self.player_snapshot(PlayerRole::Player2, p2));
        }
        SessionSnapshot {
            room_id: self.room_id.clone(),
            players,
            current_turn: self.current_turn,
            phase: self.phase,
            turn_count: self.turn_count,
            winner: self.winner,
            created_at: self.created_at,
        }
    }

    fn player_snapshot(&self, role: PlayerRole, player: &PlayerState) -> PlayerSnapshot {
        PlayerSnapshot {
            player_id: player.player_id.clone(),
            life_points: player.life_points,
            is_ready: player.is_ready,
            is_my_turn: self.current_turn == Some(role),
            normal_summon_used: player.normal_summon_used,
            deck_count: player.board.zone_len(ZoneKind::Deck),
            hand: player.board.zone(ZoneKind::Hand).to_vec(),
            monster_field: player.board.zone(ZoneKind::MonsterField).to_vec(),
            spell_trap_field: player.board.zone(ZoneKind::SpellTrapField).to_vec(),
            graveyard: player.board.zone(ZoneKind::Graveyard).to_vec(),
        }
    }
}
