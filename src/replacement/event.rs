//! Replaceable events.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{GameState, ObjectId, PlayerId};
use crate::effects::Target;
use crate::objects::CounterKind;
use crate::zones::ZoneKind;

/// A state change proposed to the replacement router.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplaceableEvent {
    Damage {
        source: ObjectId,
        target: Target,
        amount: u32,
        combat: bool,
    },
    /// An object moving zones. `from` is `None` for an object being
    /// created directly in `to` (tokens).
    ZoneMove {
        object: ObjectId,
        from: Option<ZoneKind>,
        to: ZoneKind,
        /// Controller the object will have if it enters the battlefield.
        controller: PlayerId,
        enters_tapped: bool,
        counters: SmallVec<[(CounterKind, u32); 2]>,
    },
    /// A single card draw.
    Draw { player: PlayerId },
    LifeGain { player: PlayerId, amount: u32 },
    AddCounters {
        object: ObjectId,
        kind: CounterKind,
        count: u32,
    },
}

impl ReplaceableEvent {
    /// A plain move with no modifications.
    #[must_use]
    pub fn zone_move(object: ObjectId, from: Option<ZoneKind>, to: ZoneKind, controller: PlayerId) -> Self {
        ReplaceableEvent::ZoneMove {
            object,
            from,
            to,
            controller,
            enters_tapped: false,
            counters: SmallVec::new(),
        }
    }

    /// The player who chooses among competing replacements: the damaged
    /// player or the controller of the affected object.
    #[must_use]
    pub fn affected_player(&self, state: &GameState) -> PlayerId {
        match self {
            ReplaceableEvent::Damage { target, .. } => match target {
                Target::Player(p) => *p,
                Target::Object(o) => state.controller_of(*o).unwrap_or(state.active_player()),
            },
            ReplaceableEvent::ZoneMove { controller, .. } => *controller,
            ReplaceableEvent::Draw { player } | ReplaceableEvent::LifeGain { player, .. } => *player,
            ReplaceableEvent::AddCounters { object, .. } => {
                state.controller_of(*object).unwrap_or(state.active_player())
            }
        }
    }

    /// Whether this is an object entering the battlefield.
    #[must_use]
    pub fn is_entry(&self) -> bool {
        matches!(self, ReplaceableEvent::ZoneMove { to: ZoneKind::Battlefield, .. })
    }
}
