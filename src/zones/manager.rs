//! Object locations.
//!
//! The `ZoneManager` knows which zone every live object is in and keeps
//! each zone's contents in sequence. For ordered zones the sequence is rules
//! relevant (index 0 is the bottom, the last element is the top). For the
//! battlefield it is simply entry order, which keeps iteration
//! deterministic.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::zone::ZoneId;
use crate::core::{GameRng, ObjectId};

/// Where to insert an object into a zone's sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// On top (end of the sequence).
    Top,
    /// At the bottom (start of the sequence).
    Bottom,
    /// At a specific index, clamped to the zone size.
    Index(usize),
}

/// Tracks the zone and position of every object.
///
/// ## Usage
///
/// ```
/// use duel_rules::core::{ObjectId, PlayerId};
/// use duel_rules::zones::{ZoneId, ZoneManager, ZonePosition};
///
/// let mut zones = ZoneManager::new();
/// let library = ZoneId::library(PlayerId::new(0));
/// assert!(zones.insert(ObjectId(1), library, ZonePosition::Top));
/// assert!(zones.insert(ObjectId(2), library, ZonePosition::Top));
/// assert_eq!(zones.top(library), Some(ObjectId(2)));
/// assert!(!zones.insert(ObjectId(2), library, ZonePosition::Top));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ZoneManager {
    locations: FxHashMap<ObjectId, ZoneId>,
    contents: FxHashMap<ZoneId, Vec<ObjectId>>,
}

impl ZoneManager {
    /// Create an empty manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Place an object into a zone. Returns `false` (and changes nothing) if
    /// the object is already somewhere.
    pub fn insert(&mut self, object: ObjectId, zone: ZoneId, position: ZonePosition) -> bool {
        if self.locations.contains_key(&object) {
            return false;
        }
        self.locations.insert(object, zone);
        let list = self.contents.entry(zone).or_default();
        match position {
            ZonePosition::Top => list.push(object),
            ZonePosition::Bottom => list.insert(0, object),
            ZonePosition::Index(i) => list.insert(i.min(list.len()), object),
        }
        true
    }

    /// Take an object out of whatever zone holds it.
    pub fn remove(&mut self, object: ObjectId) -> Option<ZoneId> {
        let zone = self.locations.remove(&object)?;
        if let Some(list) = self.contents.get_mut(&zone) {
            list.retain(|&o| o != object);
        }
        Some(zone)
    }

    /// Zone currently holding `object`.
    #[must_use]
    pub fn zone_of(&self, object: ObjectId) -> Option<ZoneId> {
        self.locations.get(&object).copied()
    }

    /// Whether the object is anywhere.
    #[must_use]
    pub fn contains(&self, object: ObjectId) -> bool {
        self.locations.contains_key(&object)
    }

    /// Contents of a zone, bottom first.
    #[must_use]
    pub fn contents(&self, zone: ZoneId) -> &[ObjectId] {
        self.contents.get(&zone).map_or(&[], Vec::as_slice)
    }

    /// Number of objects in a zone.
    #[must_use]
    pub fn size(&self, zone: ZoneId) -> usize {
        self.contents(zone).len()
    }

    /// Top object of a zone.
    #[must_use]
    pub fn top(&self, zone: ZoneId) -> Option<ObjectId> {
        self.contents(zone).last().copied()
    }

    /// Randomize the order of a zone.
    pub fn shuffle(&mut self, zone: ZoneId, rng: &mut GameRng) {
        if let Some(list) = self.contents.get_mut(&zone) {
            rng.shuffle(list);
        }
    }

    /// Number of tracked objects across all zones.
    #[must_use]
    pub fn total(&self) -> usize {
        self.locations.len()
    }
}
