//! Engine error kinds.
//!
//! Every failure is recoverable at the caller boundary and leaves the
//! session exactly as it was before the call: operations either validate
//! everything before mutating, or roll mutations back in full.

use thiserror::Error;

use crate::cards::InstanceId;

/// All failures a duel operation can report.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DuelError {
    #[error("room not found")]
    RoomNotFound,

    #[error("player not found")]
    PlayerNotFound,

    #[error("already in a room")]
    AlreadyInRoom,

    #[error("room is full")]
    RoomFull,

    #[error("not your turn")]
    NotYourTurn,

    #[error("card not in hand")]
    CardNotInHand,

    #[error("card is not a monster")]
    NotAMonster,

    #[error("zone is full")]
    ZoneFull,

    #[error("monster level {level} requires {required} tribute(s)")]
    WrongTributeCount { level: u8, required: usize },

    #[error("tribute monster {0} not found on field")]
    TributeNotOnField(InstanceId),

    #[error("monster not on field")]
    MonsterNotOnField,

    #[error("monster has already attacked this turn")]
    AlreadyAttacked,

    #[error("not enough cards in deck")]
    InsufficientCards,

    #[error("already normal summoned this turn")]
    NormalSummonAlreadyUsed,

    #[error("operation not valid in the current game state")]
    InvalidState,

    /// Retryable: the external catalog could not answer within its deadline.
    #[error("card catalog unavailable: {0}")]
    CatalogUnavailable(String),
}

/// Engine-wide result alias.
pub type Result<T> = std::result::Result<T, DuelError>;
