//! Card catalog collaborator interface.
//!
//! The engine never owns card data; decks come from an external lookup
//! service. Implementations are expected to bound their own fetch time
//! (an HTTP client with a deadline, a database query with a timeout) and
//! report any failure as `DuelError::CatalogUnavailable`, which callers
//! may retry.

use crate::cards::CardDefinition;
use crate::core::{PlayerId, Result};

/// External deck lookup.
///
/// `fetch_deck` returns the full card list registered for a player, in
/// catalog order; the session shuffles it on installation.
pub trait CardCatalog: Send + Sync {
    /// Fetch the deck definitions registered for `player`.
    ///
    /// Fails with `CatalogUnavailable` when the backing service cannot
    /// answer within its deadline.
    fn fetch_deck(&self, player: &PlayerId) -> Result<Vec<CardDefinition>>;
}
