//! Continuous effect instances.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{ModificationId, ObjectId, PlayerId, Timestamp};
use crate::objects::{CardType, ColorSet, KeywordSet, ObjectFilter};

/// The seven application categories, in application order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    Copy,
    Control,
    Text,
    Type,
    Color,
    Ability,
    PowerToughness,
}

/// The five ordered sub-steps of the power/toughness layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PtSublayer {
    /// Characteristic-defining abilities.
    CharacteristicDefining,
    /// Effects that set power and/or toughness.
    Setting,
    /// Effects that raise or lower power and/or toughness.
    Modifying,
    /// +1/+1 and -1/-1 counters.
    Counters,
    /// Effects that switch power and toughness.
    Switching,
}

/// A layer, plus the sub-step for the power/toughness layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Stage {
    pub layer: Layer,
    pub sublayer: Option<PtSublayer>,
}

impl Stage {
    const fn plain(layer: Layer) -> Self {
        Self {
            layer,
            sublayer: None,
        }
    }

    const fn pt(sublayer: PtSublayer) -> Self {
        Self {
            layer: Layer::PowerToughness,
            sublayer: Some(sublayer),
        }
    }

    /// Every stage, in application order.
    pub const ALL: [Stage; 11] = [
        Stage::plain(Layer::Copy),
        Stage::plain(Layer::Control),
        Stage::plain(Layer::Text),
        Stage::plain(Layer::Type),
        Stage::plain(Layer::Color),
        Stage::plain(Layer::Ability),
        Stage::pt(PtSublayer::CharacteristicDefining),
        Stage::pt(PtSublayer::Setting),
        Stage::pt(PtSublayer::Modifying),
        Stage::pt(PtSublayer::Counters),
        Stage::pt(PtSublayer::Switching),
    ];
}

/// Characteristic-defining power/toughness.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PtDefinition {
    /// Power and toughness each equal the number of matching permanents.
    CountOf(ObjectFilter),
}

/// What a modification does to each affected object.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModificationKind {
    /// Copiable values become those of another object.
    CopyOf(ObjectId),
    /// The modification's controller gains control.
    TakeControl,
    /// Rewrite one subtype word into another.
    ReplaceSubtype { from: String, to: String },
    AddTypes(SmallVec<[CardType; 2]>),
    SetTypes(SmallVec<[CardType; 2]>),
    AddSubtypes(SmallVec<[String; 2]>),
    SetColors(ColorSet),
    AddColors(ColorSet),
    AddKeywords(KeywordSet),
    RemoveKeywords(KeywordSet),
    RemoveAllAbilities,
    DefinePt(PtDefinition),
    SetPt { power: i32, toughness: i32 },
    ModifyPt { power: i32, toughness: i32 },
    SwitchPt,
}

impl ModificationKind {
    /// Stage this kind is applied in.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            ModificationKind::CopyOf(_) => Stage::plain(Layer::Copy),
            ModificationKind::TakeControl => Stage::plain(Layer::Control),
            ModificationKind::ReplaceSubtype { .. } => Stage::plain(Layer::Text),
            ModificationKind::AddTypes(_)
            | ModificationKind::SetTypes(_)
            | ModificationKind::AddSubtypes(_) => Stage::plain(Layer::Type),
            ModificationKind::SetColors(_) | ModificationKind::AddColors(_) => Stage::plain(Layer::Color),
            ModificationKind::AddKeywords(_)
            | ModificationKind::RemoveKeywords(_)
            | ModificationKind::RemoveAllAbilities => Stage::plain(Layer::Ability),
            ModificationKind::DefinePt(_) => Stage::pt(PtSublayer::CharacteristicDefining),
            ModificationKind::SetPt { .. } => Stage::pt(PtSublayer::Setting),
            ModificationKind::ModifyPt { .. } => Stage::pt(PtSublayer::Modifying),
            ModificationKind::SwitchPt => Stage::pt(PtSublayer::Switching),
        }
    }

    /// Layer this kind belongs to.
    #[must_use]
    pub fn layer(&self) -> Layer {
        self.stage().layer
    }
}

/// Which objects a modification applies to.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AffectedSet {
    /// One specific object. Expires when that object leaves the battlefield.
    Object(ObjectId),
    /// The source itself.
    Source,
    /// The permanent the source is attached to.
    Attached,
    /// Every battlefield permanent matching the filter, evaluated with the
    /// characteristics as computed so far in the current pass.
    Filter(ObjectFilter),
}

/// How long a modification lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Duration {
    /// Generated by a static ability; ends when the source leaves.
    WhileSourceOnBattlefield,
    /// Ends in the cleanup step.
    UntilEndOfTurn,
    /// Never ends on its own.
    Indefinite,
}

/// One continuous effect instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    pub id: ModificationId,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub affected: AffectedSet,
    pub kind: ModificationKind,
    pub timestamp: Timestamp,
    pub duration: Duration,
    /// Modifications this one is declared to depend on, in addition to
    /// dependencies discovered during recomputation.
    pub depends_on: SmallVec<[ModificationId; 2]>,
}

/// The active modification set.
#[derive(Clone, Debug, Default)]
pub struct ContinuousEffects {
    active: Vec<Modification>,
}

impl ContinuousEffects {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a modification. Registration order carries no meaning; only
    /// timestamps and dependencies order application.
    pub fn add(&mut self, modification: Modification) {
        self.active.push(modification);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Modification> {
        self.active.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: ModificationId) -> Option<&Modification> {
        self.active.iter().find(|m| m.id == id)
    }

    /// Remove and return every modification matching `expired`.
    pub fn remove_where(&mut self, mut expired: impl FnMut(&Modification) -> bool) -> Vec<Modification> {
        let mut removed = Vec::new();
        let mut kept = Vec::with_capacity(self.active.len());
        for m in self.active.drain(..) {
            if expired(&m) {
                removed.push(m);
            } else {
                kept.push(m);
            }
        }
        self.active = kept;
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pump(id: u32, ts: u64, duration: Duration) -> Modification {
        Modification {
            id: ModificationId(id),
            source: ObjectId(1),
            controller: PlayerId::new(0),
            affected: AffectedSet::Source,
            kind: ModificationKind::ModifyPt { power: 1, toughness: 1 },
            timestamp: Timestamp(ts),
            duration,
            depends_on: SmallVec::new(),
        }
    }

    #[test]
    fn test_stage_order() {
        let mut sorted = Stage::ALL;
        sorted.sort();
        assert_eq!(sorted, Stage::ALL);
        assert_eq!(ModificationKind::SwitchPt.stage(), Stage::ALL[10]);
        assert_eq!(ModificationKind::TakeControl.layer(), Layer::Control);
    }

    #[test]
    fn test_remove_where() {
        let mut effects = ContinuousEffects::new();
        effects.add(pump(1, 1, Duration::UntilEndOfTurn));
        effects.add(pump(2, 2, Duration::Indefinite));
        let removed = effects.remove_where(|m| m.duration == Duration::UntilEndOfTurn);
        assert_eq!(removed.len(), 1);
        assert_eq!(effects.len(), 1);
        assert!(effects.get(ModificationId(2)).is_some());
    }
}
