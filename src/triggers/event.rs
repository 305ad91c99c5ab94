//! Game events.
//!
//! Events describe transitions that already happened. They are queued on
//! the state while rules actions run and consumed by trigger detection;
//! nothing reacts to an event at the moment it is emitted.

use serde::{Deserialize, Serialize};

use crate::core::{ObjectId, PlayerId, StackEntryId};
use crate::effects::Target;
use crate::objects::CounterKind;
use crate::rules::Step;
use crate::zones::ZoneKind;

/// Category used to index trigger subscriptions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    ZoneChanged,
    SpellCast,
    AttackerDeclared,
    BlockerDeclared,
    DamageDealt,
    LifeGained,
    LifeLost,
    CountersAdded,
    StepBegan,
}

/// A completed state transition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// `object` is the id the object had before the move. `from` is `None`
    /// for objects created in place; `to` is `None` when it ceased to exist.
    ZoneChanged {
        object: ObjectId,
        new_object: Option<ObjectId>,
        from: Option<ZoneKind>,
        to: Option<ZoneKind>,
        controller: PlayerId,
    },
    SpellCast {
        entry: StackEntryId,
        object: ObjectId,
        controller: PlayerId,
    },
    AttackerDeclared {
        attacker: ObjectId,
        controller: PlayerId,
    },
    BlockerDeclared {
        blocker: ObjectId,
        attacker: ObjectId,
        controller: PlayerId,
    },
    DamageDealt {
        source: ObjectId,
        target: Target,
        amount: u32,
        combat: bool,
    },
    LifeGained {
        player: PlayerId,
        amount: u32,
    },
    LifeLost {
        player: PlayerId,
        amount: u32,
    },
    CountersAdded {
        object: ObjectId,
        kind: CounterKind,
        count: u32,
    },
    StepBegan {
        step: Step,
        active: PlayerId,
    },
}

impl GameEvent {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::ZoneChanged { .. } => EventKind::ZoneChanged,
            GameEvent::SpellCast { .. } => EventKind::SpellCast,
            GameEvent::AttackerDeclared { .. } => EventKind::AttackerDeclared,
            GameEvent::BlockerDeclared { .. } => EventKind::BlockerDeclared,
            GameEvent::DamageDealt { .. } => EventKind::DamageDealt,
            GameEvent::LifeGained { .. } => EventKind::LifeGained,
            GameEvent::LifeLost { .. } => EventKind::LifeLost,
            GameEvent::CountersAdded { .. } => EventKind::CountersAdded,
            GameEvent::StepBegan { .. } => EventKind::StepBegan,
        }
    }

    /// Object going from the battlefield to a graveyard.
    #[must_use]
    pub fn died(&self) -> Option<ObjectId> {
        match self {
            GameEvent::ZoneChanged {
                object,
                from: Some(ZoneKind::Battlefield),
                to: Some(ZoneKind::Graveyard),
                ..
            } => Some(*object),
            _ => None,
        }
    }

    /// Object arriving on the battlefield, by its new id.
    #[must_use]
    pub fn entered(&self) -> Option<ObjectId> {
        match self {
            GameEvent::ZoneChanged {
                new_object: Some(new),
                to: Some(ZoneKind::Battlefield),
                from,
                ..
            } if *from != Some(ZoneKind::Battlefield) => Some(*new),
            _ => None,
        }
    }

    /// Object leaving the battlefield, by its old id.
    #[must_use]
    pub fn left_battlefield(&self) -> Option<ObjectId> {
        match self {
            GameEvent::ZoneChanged {
                object,
                from: Some(ZoneKind::Battlefield),
                to,
                ..
            } if *to != Some(ZoneKind::Battlefield) => Some(*object),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moved(from: Option<ZoneKind>, to: Option<ZoneKind>) -> GameEvent {
        GameEvent::ZoneChanged {
            object: ObjectId(1),
            new_object: Some(ObjectId(2)),
            from,
            to,
            controller: PlayerId::new(0),
        }
    }

    #[test]
    fn test_zone_change_classification() {
        let death = moved(Some(ZoneKind::Battlefield), Some(ZoneKind::Graveyard));
        assert_eq!(death.died(), Some(ObjectId(1)));
        assert_eq!(death.left_battlefield(), Some(ObjectId(1)));
        assert_eq!(death.entered(), None);

        let cast = moved(Some(ZoneKind::Stack), Some(ZoneKind::Battlefield));
        assert_eq!(cast.entered(), Some(ObjectId(2)));
        assert_eq!(cast.died(), None);

        let created = moved(None, Some(ZoneKind::Battlefield));
        assert_eq!(created.entered(), Some(ObjectId(2)));
        assert_eq!(created.kind(), EventKind::ZoneChanged);
    }
}
