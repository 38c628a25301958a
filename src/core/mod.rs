//! Core types: identifiers, player state, errors, RNG.

mod error;
mod ids;
mod player;
mod rng;

pub use error::{DuelError, Result};
pub use ids::{PlayerId, RoomId};
pub use player::{PlayerRole, PlayerState, STARTING_LIFE_POINTS};
pub use rng::DuelRng;
