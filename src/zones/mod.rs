//! Zones and object locations.
//!
//! ## Key Types
//!
//! - `ZoneKind`: library, hand, battlefield, graveyard, stack, exile
//! - `ZoneId`: a kind plus owning seat for per-player zones
//! - `ZoneManager`: location tracking and ordering
//! - `ZonePosition`: insertion point in a zone's sequence

pub mod manager;
pub mod zone;

pub use manager::{ZoneManager, ZonePosition};
pub use zone::{ZoneId, ZoneKind, ZoneVisibility};
