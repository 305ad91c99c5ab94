//! Trigger conditions and intervening-if guards.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};

use super::event::{EventKind, GameEvent};
use crate::core::{GameState, ObjectId, PlayerId};
use crate::effects::Target;
use crate::objects::{ControllerRel, ObjectFilter};
use crate::rules::Step;

/// The transition a triggered ability waits for.
///
/// "This" refers to the object the ability is printed on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerCondition {
    ThisEntersBattlefield,
    /// A matching permanent enters the battlefield.
    EntersBattlefield(ObjectFilter),
    ThisDies,
    /// A matching creature dies, judged by its last-known characteristics.
    Dies(ObjectFilter),
    ThisLeavesBattlefield,
    ThisAttacks,
    ThisBlocks,
    ThisDealsCombatDamageToPlayer,
    ThisIsDealtDamage,
    BeginningOfStep { step: Step, whose: ControllerRel },
    SpellCast { by: ControllerRel },
    LifeGained { who: ControllerRel },
    AnyOf(Vec<TriggerCondition>),
}

/// A successful match: which object the event was about, if any.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerMatch {
    pub triggering: Option<ObjectId>,
}

impl TriggerMatch {
    fn about(object: ObjectId) -> Option<Self> {
        Some(Self {
            triggering: Some(object),
        })
    }

    fn nothing() -> Option<Self> {
        Some(Self { triggering: None })
    }
}

impl TriggerCondition {
    /// Event categories this condition subscribes to.
    #[must_use]
    pub fn event_kinds(&self) -> SmallVec<[EventKind; 2]> {
        match self {
            TriggerCondition::ThisEntersBattlefield
            | TriggerCondition::EntersBattlefield(_)
            | TriggerCondition::ThisDies
            | TriggerCondition::Dies(_)
            | TriggerCondition::ThisLeavesBattlefield => smallvec![EventKind::ZoneChanged],
            TriggerCondition::ThisAttacks => smallvec![EventKind::AttackerDeclared],
            TriggerCondition::ThisBlocks => smallvec![EventKind::BlockerDeclared],
            TriggerCondition::ThisDealsCombatDamageToPlayer | TriggerCondition::ThisIsDealtDamage => {
                smallvec![EventKind::DamageDealt]
            }
            TriggerCondition::BeginningOfStep { .. } => smallvec![EventKind::StepBegan],
            TriggerCondition::SpellCast { .. } => smallvec![EventKind::SpellCast],
            TriggerCondition::LifeGained { .. } => smallvec![EventKind::LifeGained],
            TriggerCondition::AnyOf(all) => {
                let mut kinds: SmallVec<[EventKind; 2]> = SmallVec::new();
                for kind in all.iter().flat_map(TriggerCondition::event_kinds) {
                    if !kinds.contains(&kind) {
                        kinds.push(kind);
                    }
                }
                kinds
            }
        }
    }

    /// Check the condition against one event.
    #[must_use]
    pub fn matches(
        &self,
        event: &GameEvent,
        source: ObjectId,
        controller: PlayerId,
        state: &GameState,
    ) -> Option<TriggerMatch> {
        let ctx = state.filter_context(controller, Some(source));
        match (self, event) {
            (TriggerCondition::ThisEntersBattlefield, _) => {
                (event.entered() == Some(source)).then_some(TriggerMatch { triggering: Some(source) })
            }
            (TriggerCondition::EntersBattlefield(filter), _) => {
                let entered = event.entered()?;
                let object = state.object(entered)?;
                filter
                    .matches(entered, &object.computed, object.controller, &ctx)
                    .then_some(TriggerMatch {
                        triggering: Some(entered),
                    })
            }
            (TriggerCondition::ThisDies, _) => (event.died() == Some(source)).then_some(TriggerMatch {
                triggering: Some(source),
            }),
            (TriggerCondition::Dies(filter), _) => {
                let died = event.died()?;
                let lki = state.lki(died)?;
                (lki.characteristics.is_creature()
                    && filter.matches(died, &lki.characteristics, lki.controller, &ctx))
                .then_some(TriggerMatch { triggering: Some(died) })
            }
            (TriggerCondition::ThisLeavesBattlefield, _) => {
                (event.left_battlefield() == Some(source)).then_some(TriggerMatch {
                    triggering: Some(source),
                })
            }
            (TriggerCondition::ThisAttacks, GameEvent::AttackerDeclared { attacker, .. }) if *attacker == source => {
                TriggerMatch::about(source)
            }
            (TriggerCondition::ThisBlocks, GameEvent::BlockerDeclared { blocker, attacker, .. })
                if *blocker == source =>
            {
                TriggerMatch::about(*attacker)
            }
            (
                TriggerCondition::ThisDealsCombatDamageToPlayer,
                GameEvent::DamageDealt {
                    source: dealer,
                    target: Target::Player(_),
                    combat: true,
                    amount,
                },
            ) if *dealer == source && *amount > 0 => TriggerMatch::nothing(),
            (
                TriggerCondition::ThisIsDealtDamage,
                GameEvent::DamageDealt {
                    source: dealer,
                    target: Target::Object(target),
                    amount,
                    ..
                },
            ) if *target == source && *amount > 0 => TriggerMatch::about(*dealer),
            (TriggerCondition::BeginningOfStep { step, whose }, GameEvent::StepBegan { step: began, active })
                if step == began && whose.admits(*active, controller) =>
            {
                TriggerMatch::nothing()
            }
            (
                TriggerCondition::SpellCast { by },
                GameEvent::SpellCast {
                    object,
                    controller: caster,
                    ..
                },
            ) if by.admits(*caster, controller) => TriggerMatch::about(*object),
            (TriggerCondition::LifeGained { who }, GameEvent::LifeGained { player, amount })
                if *amount > 0 && who.admits(*player, controller) =>
            {
                TriggerMatch::nothing()
            }
            (TriggerCondition::AnyOf(all), _) => all
                .iter()
                .find_map(|c| c.matches(event, source, controller, state)),
            _ => None,
        }
    }
}

/// An intervening-if clause: a state predicate checked when the trigger is
/// detected and again when it would be put on the stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StateCondition {
    SourceOnBattlefield,
    ControllerLifeAtMost(i32),
    ControllerLifeAtLeast(i32),
    OpponentLifeAtMost(i32),
    /// The controller controls at least `count` matching permanents.
    ControlsAtLeast { filter: ObjectFilter, count: u32 },
    ControllerHandEmpty,
    All(Vec<StateCondition>),
    Not(Box<StateCondition>),
}

impl StateCondition {
    #[must_use]
    pub fn holds(&self, state: &GameState, controller: PlayerId, source: ObjectId) -> bool {
        match self {
            StateCondition::SourceOnBattlefield => state.object(source).is_some_and(|o| o.is_on_battlefield()),
            StateCondition::ControllerLifeAtMost(n) => state.player(controller).life <= *n,
            StateCondition::ControllerLifeAtLeast(n) => state.player(controller).life >= *n,
            StateCondition::OpponentLifeAtMost(n) => state
                .order
                .opponents_of(controller)
                .any(|p| state.player(p).life <= *n),
            StateCondition::ControlsAtLeast { filter, count } => {
                let ctx = state.filter_context(controller, Some(source));
                let found = state
                    .battlefield()
                    .filter(|o| o.controller == controller)
                    .filter(|o| filter.matches(o.id, &o.computed, o.controller, &ctx))
                    .count();
                found >= *count as usize
            }
            StateCondition::ControllerHandEmpty => state.hand(controller).is_empty(),
            StateCondition::All(all) => all.iter().all(|c| c.holds(state, controller, source)),
            StateCondition::Not(inner) => !inner.holds(state, controller, source),
        }
    }
}
