//! Stack entries.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{ObjectId, PlayerId, RegistrationId, StackEntryId, Timestamp};
use crate::effects::{Effect, Target, TargetSpec};
use crate::objects::LastKnown;

/// What kind of thing is waiting to resolve.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// A spell; `source` is the card object in the stack zone.
    Spell,
    /// An activated ability of a permanent.
    Activated { ability: usize },
    /// A triggered ability.
    Triggered { registration: RegistrationId },
}

/// A spell or ability awaiting resolution.
///
/// Targets are chosen once, when the entry is put on the stack, and
/// re-validated against `target_specs` on resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackEntry {
    pub id: StackEntryId,
    pub kind: EntryKind,
    pub name: String,
    pub source: ObjectId,
    /// Source as it was when the entry was created. Abilities keep
    /// resolving after their source leaves the battlefield.
    pub source_lki: Option<LastKnown>,
    pub controller: PlayerId,
    pub effects: Vec<Effect>,
    pub target_specs: Vec<TargetSpec>,
    pub targets: SmallVec<[Target; 2]>,
    pub timestamp: Timestamp,
    /// Object named by the event that caused a triggered ability.
    pub triggering: Option<ObjectId>,
    pub triggering_lki: Option<LastKnown>,
}

impl StackEntry {
    /// An entry that is not yet on the stack; `push` assigns id and
    /// timestamp.
    #[must_use]
    pub fn new(kind: EntryKind, name: impl Into<String>, source: ObjectId, controller: PlayerId) -> Self {
        Self {
            id: StackEntryId(0),
            kind,
            name: name.into(),
            source,
            source_lki: None,
            controller,
            effects: Vec::new(),
            target_specs: Vec::new(),
            targets: SmallVec::new(),
            timestamp: Timestamp(0),
            triggering: None,
            triggering_lki: None,
        }
    }

    #[must_use]
    pub fn with_effects(mut self, effects: Vec<Effect>) -> Self {
        self.effects = effects;
        self
    }

    #[must_use]
    pub fn with_targets(mut self, specs: Vec<TargetSpec>, targets: impl IntoIterator<Item = Target>) -> Self {
        self.target_specs = specs;
        self.targets = targets.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_source_lki(mut self, lki: Option<LastKnown>) -> Self {
        self.source_lki = lki;
        self
    }

    #[must_use]
    pub fn with_triggering(mut self, object: Option<ObjectId>, lki: Option<LastKnown>) -> Self {
        self.triggering = object;
        self.triggering_lki = lki;
        self
    }

    #[must_use]
    pub fn is_spell(&self) -> bool {
        self.kind == EntryKind::Spell
    }
}
