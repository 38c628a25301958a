//! Duel sessions: the per-room state machine, battle resolution, and
//! serializable snapshots.

mod battle;
mod duel;
mod snapshot;

pub use battle::{required_tributes, resolve_battle, BattleOutcome};
pub use duel::{DuelSession, Phase, INITIAL_HAND_SIZE};
pub use snapshot::{PlayerSnapshot, SessionSnapshot};
