//! Zone system: per-player ordered collections with capacity rules.

mod board;

pub use board::{PlayerBoard, ZoneKind, FIELD_CAPACITY};
