//! Player roles and per-player duel state.
//!
//! ## PlayerRole
//!
//! Which seat a player occupies. Turn ownership and winner are expressed
//! in roles, not raw player identifiers.
//!
//! ## PlayerState
//!
//! One player's aggregate: board, life points, readiness, and the
//! once-per-turn normal-summon flag. Owned exclusively by its session and
//! mutated only through session operations.

use serde::{Deserialize, Serialize};

use super::ids::PlayerId;
use crate::zones::PlayerBoard;

/// Starting life points.
pub const STARTING_LIFE_POINTS: i32 = 8000;

/// Which of the two seats a player occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerRole {
    Player1,
    Player2,
}

impl PlayerRole {
    /// The other seat.
    #[must_use]
    pub fn opponent(self) -> Self {
        match self {
            PlayerRole::Player1 => PlayerRole::Player2,
            PlayerRole::Player2 => PlayerRole::Player1,
        }
    }
}

impl std::fmt::Display for PlayerRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerRole::Player1 => f.write_str("player1"),
            PlayerRole::Player2 => f.write_str("player2"),
        }
    }
}

/// One player's state within a duel session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Caller-supplied identifier.
    pub player_id: PlayerId,

    /// The player's five zones.
    pub board: PlayerBoard,

    /// Life points, never negative.
    pub life_points: i32,

    /// Set once the player's deck has been initialized.
    pub is_ready: bool,

    /// Set by a normal/tribute summon, cleared on turn change.
    pub normal_summon_used: bool,
}

impl PlayerState {
    /// Create a fresh player at full life with empty zones.
    #[must_use]
    pub fn new(player_id: PlayerId) -> Self {
        Self {
            player_id,
            board: PlayerBoard::new(),
            life_points: STARTING_LIFE_POINTS,
            is_ready: false,
            normal_summon_used: false,
        }
    }

    /// Subtract damage, clamping life points at zero.
    pub fn apply_damage(&mut self, damage: i32) {
        debug_assert!(damage >= 0, "damage must be non-negative");
        self.life_points = (self.life_points - damage).max(0);
    }

    /// Check whether this player has been reduced to zero life.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.life_points == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_opponent() {
        assert_eq!(PlayerRole::Player1.opponent(), PlayerRole::Player2);
        assert_eq!(PlayerRole::Player2.opponent(), PlayerRole::Player1);
        assert_eq!(format!("{}", PlayerRole::Player1), "player1");
    }

    #[test]
    fn test_new_player_state() {
        let player = PlayerState::new(PlayerId::new("alice"));

        assert_eq!(player.life_points, STARTING_LIFE_POINTS);
        assert!(!player.is_ready);
        assert!(!player.normal_summon_used);
        assert!(!player.is_defeated());
    }

    #[test]
    fn test_damage_clamps_at_zero() {
        let mut player = PlayerState::new(PlayerId::new("alice"));

        player.apply_damage(7999);
        assert_eq!(player.life_points, 1);
        assert!(!player.is_defeated());

        player.apply_damage(500);
        assert_eq!(player.life_points, 0);
        assert!(player.is_defeated());
    }

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&PlayerRole::Player1).unwrap(), "\"player1\"");
        assert_eq!(serde_json::to_string(&PlayerRole::Player2).unwrap(), "\"player2\"");
    }
}
