//! Card data model: catalog definitions, per-copy instances, and the
//! external catalog interface.

mod catalog;
mod definition;
mod instance;

pub use catalog::CardCatalog;
pub use definition::{CardDefinition, CardType, CatalogId};
pub use instance::{BattleStance, CardInstance, CardPosition, InstanceId};
