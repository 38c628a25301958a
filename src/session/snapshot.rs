//! Serializable room views returned to callers.
//!
//! Every boundary operation hands back a `SessionSnapshot` so the request
//! layer can answer polling clients without re-locking the session. Deck
//! contents stay hidden (only the count is exposed); everything else
//! mirrors the live state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::CardInstance;
use crate::core::{PlayerId, PlayerRole, RoomId};
use crate::session::Phase;

/// One player's visible state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub player_id: PlayerId,
    pub life_points: i32,
    pub is_ready: bool,
    pub is_my_turn: bool,
    pub normal_summon_used: bool,
    pub deck_count: usize,
    pub hand: Vec<CardInstance>,
    pub monster_field: Vec<CardInstance>,
    pub spell_trap_field: Vec<CardInstance>,
    pub graveyard: Vec<CardInstance>,
}

/// Full room view at one point in time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub room_id: RoomId,
    pub players: Vec<PlayerSnapshot>,
    pub current_turn: Option<PlayerRole>,
    pub phase: Phase,
    pub turn_count: u32,
    pub winner: Option<PlayerRole>,
    pub created_at: DateTime<Utc>,
}

impl SessionSnapshot {
    /// Find a player's view by identifier.
    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| &p.player_id == id)
    }
}
