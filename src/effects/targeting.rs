//! Target requirements and legality.
//!
//! A [`TargetSpec`] is the legality predicate a target was chosen under.
//! The same predicate is re-evaluated when the stack entry resolves; a
//! target that no longer satisfies it is illegal.

use serde::{Deserialize, Serialize};

use crate::core::{GameState, ObjectId, PlayerId};
use crate::objects::{CardType, ControllerRel, FilterContext, ObjectFilter};
use crate::zones::ZoneKind;

/// A chosen target: a player or an object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Target {
    Player(PlayerId),
    Object(ObjectId),
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Player(p) => write!(f, "{p}"),
            Target::Object(o) => write!(f, "{o}"),
        }
    }
}

/// What may be chosen for one target slot.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetSpec {
    /// A player, a creature or a planeswalker.
    AnyTarget,
    /// A player standing in the given relation to the controller.
    Player(ControllerRel),
    /// A permanent matching the filter.
    Permanent(ObjectFilter),
    /// A spell on the stack.
    Spell,
}

impl TargetSpec {
    /// Target creature.
    #[must_use]
    pub fn creature() -> Self {
        TargetSpec::Permanent(ObjectFilter::creature())
    }

    /// Target opponent.
    #[must_use]
    pub fn opponent() -> Self {
        TargetSpec::Player(ControllerRel::Opponent)
    }

    /// Whether `target` currently satisfies this requirement.
    #[must_use]
    pub fn is_legal(&self, target: Target, state: &GameState, ctx: &FilterContext) -> bool {
        match (self, target) {
            (TargetSpec::AnyTarget, Target::Player(p)) => state.player(p).is_alive(),
            (TargetSpec::AnyTarget, Target::Object(o)) => state.object(o).is_some_and(|obj| {
                obj.is_on_battlefield()
                    && (obj.computed.is_creature() || obj.computed.has_type(CardType::Planeswalker))
            }),
            (TargetSpec::Player(rel), Target::Player(p)) => {
                rel.admits(p, ctx.you) && state.player(p).is_alive()
            }
            (TargetSpec::Permanent(filter), Target::Object(o)) => {
                state.object(o).is_some_and(|obj| {
                    obj.is_on_battlefield() && filter.matches(o, &obj.computed, obj.controller, ctx)
                })
            }
            (TargetSpec::Spell, Target::Object(o)) => {
                ctx.source != Some(o)
                    && state
                        .object(o)
                        .is_some_and(|obj| obj.zone.kind == ZoneKind::Stack)
            }
            _ => false,
        }
    }

    /// Every currently legal choice, players first then objects by id.
    #[must_use]
    pub fn candidates(&self, state: &GameState, ctx: &FilterContext) -> Vec<Target> {
        let players = state.order.starting_from(ctx.you).map(Target::Player);
        let objects = state.objects.keys().map(|&id| Target::Object(id));
        players
            .chain(objects)
            .filter(|&t| self.is_legal(t, state, ctx))
            .collect()
    }

    /// Whether at least one legal choice exists.
    #[must_use]
    pub fn has_candidate(&self, state: &GameState, ctx: &FilterContext) -> bool {
        !self.candidates(state, ctx).is_empty()
    }
}
