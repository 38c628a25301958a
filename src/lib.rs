//! Server-side duel engine for a two-player, turn-based card game.
//!
//! The engine is the authoritative rules layer behind a matchmaking or
//! HTTP front end: it owns every live room, enforces turn order, summons,
//! tribute rules, and battle resolution, and hands back serializable
//! snapshots for polling clients.
//!
//! ## Layout
//!
//! - [`cards`]: catalog definitions, per-copy instances, and the external
//!   deck lookup trait.
//! - [`zones`]: per-player zone collections with capacity and position
//!   invariants.
//! - [`core`]: identifiers, player state, errors, and the seeded RNG.
//! - [`session`]: the per-room state machine and battle resolver.
//! - [`registry`]: room lookup, lifecycle, and the idle sweep.
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use duel_engine::cards::{CardCatalog, CardDefinition};
//! use duel_engine::core::{PlayerId, Result};
//! use duel_engine::registry::SessionRegistry;
//!
//! struct EmptyCatalog;
//!
//! impl CardCatalog for EmptyCatalog {
//!     fn fetch_deck(&self, _player: &PlayerId) -> Result<Vec<CardDefinition>> {
//!         Ok(Vec::new())
//!     }
//! }
//!
//! let registry = SessionRegistry::new(Arc::new(EmptyCatalog));
//! let (room_id, _snapshot) = registry.create_room(PlayerId::new("alice"))?;
//! registry.join_room(&room_id, PlayerId::new("bob"))?;
//! # Ok::<(), duel_engine::core::DuelError>(())
//! ```

pub mod cards;
pub mod core;
pub mod registry;
pub mod session;
pub mod zones;

pub use cards::{CardCatalog, CardDefinition, CardInstance, InstanceId};
pub use core::{DuelError, PlayerId, Result, RoomId};
pub use registry::SessionRegistry;
pub use session::{DuelSession, Phase, SessionSnapshot};
