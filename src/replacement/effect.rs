//! Replacement effect descriptors and the active registry.

use serde::{Deserialize, Serialize};

use super::event::ReplaceableEvent;
use crate::core::{GameState, ObjectId, PlayerId, ReplacementId, Timestamp};
use crate::effects::Target;
use crate::objects::{CounterKind, ObjectFilter};
use crate::zones::ZoneKind;

/// Which proposed events a replacement looks at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplacementCondition {
    /// Damage that would be dealt to one specific player or object.
    DamageTo(Target),
    /// Damage that would be dealt to the effect's controller.
    DamageToController,
    /// Damage that would be dealt to the source permanent.
    DamageToSource,
    /// Damage the source would deal.
    DamageFromSource,
    /// Any combat damage.
    CombatDamage,
    /// A matching object would enter the battlefield.
    Enters(ObjectFilter),
    /// A matching permanent would go from the battlefield to a graveyard.
    WouldDie(ObjectFilter),
    /// Counters would be put on a matching permanent, including counters
    /// it would enter with.
    CountersPlaced(ObjectFilter),
    /// The controller would draw a card.
    ControllerDraws,
    /// The controller would gain life.
    ControllerGainsLife,
}

/// What a replacement does to the event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplacementAction {
    /// The event does not happen.
    Prevent,
    /// Add to the damage or life amount; never below zero.
    ModifyAmount(i32),
    DoubleAmount,
    EnterTapped,
    EnterWithCounters { kind: CounterKind, count: u32 },
    /// Twice as many counters.
    DoubleCounters,
    /// Go to another zone instead.
    ChangeDestination(ZoneKind),
}

impl ReplacementAction {
    /// Whether the action has anything to act on in `event`.
    #[must_use]
    pub fn fits(&self, event: &ReplaceableEvent) -> bool {
        use ReplaceableEvent as E;
        match self {
            ReplacementAction::Prevent => !matches!(event, E::ZoneMove { .. }),
            ReplacementAction::ModifyAmount(_) | ReplacementAction::DoubleAmount => {
                matches!(event, E::Damage { amount, .. } | E::LifeGain { amount, .. } if *amount > 0)
            }
            ReplacementAction::EnterTapped | ReplacementAction::EnterWithCounters { .. } => event.is_entry(),
            ReplacementAction::DoubleCounters => match event {
                E::AddCounters { count, .. } => *count > 0,
                E::ZoneMove {
                    to: ZoneKind::Battlefield,
                    counters,
                    ..
                } => !counters.is_empty(),
                _ => false,
            },
            ReplacementAction::ChangeDestination(zone) => {
                matches!(event, E::ZoneMove { to, .. } if to != zone)
            }
        }
    }

    /// The modified event, or `None` if the event is negated.
    #[must_use]
    pub fn apply(&self, event: ReplaceableEvent) -> Option<ReplaceableEvent> {
        use ReplaceableEvent as E;
        let mut event = event;
        match (self, &mut event) {
            (ReplacementAction::Prevent, _) => return None,
            (ReplacementAction::ModifyAmount(delta), E::Damage { amount, .. } | E::LifeGain { amount, .. }) => {
                *amount = (i64::from(*amount) + i64::from(*delta)).max(0) as u32;
            }
            (ReplacementAction::DoubleAmount, E::Damage { amount, .. } | E::LifeGain { amount, .. }) => {
                *amount = amount.saturating_mul(2);
            }
            (ReplacementAction::EnterTapped, E::ZoneMove { enters_tapped, .. }) => *enters_tapped = true,
            (ReplacementAction::EnterWithCounters { kind, count }, E::ZoneMove { counters, .. }) => {
                match counters.iter_mut().find(|(k, _)| k == kind) {
                    Some((_, n)) => *n += *count,
                    None => counters.push((*kind, *count)),
                }
            }
            (ReplacementAction::DoubleCounters, E::ZoneMove { counters, .. }) => {
                for (_, n) in counters.iter_mut() {
                    *n = n.saturating_mul(2);
                }
            }
            (ReplacementAction::DoubleCounters, E::AddCounters { count, .. }) => {
                *count = count.saturating_mul(2);
            }
            (ReplacementAction::ChangeDestination(zone), E::ZoneMove { to, .. }) => *to = *zone,
            _ => {}
        }
        Some(event)
    }
}

/// How long a registered replacement lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplacementLifetime {
    WhileSourceOnBattlefield,
    UntilEndOfTurn,
}

/// An active replacement effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementEffect {
    pub id: ReplacementId,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub condition: ReplacementCondition,
    pub action: ReplacementAction,
    pub timestamp: Timestamp,
    pub lifetime: ReplacementLifetime,
}

impl ReplacementEffect {
    /// Condition matches and the action has something to act on.
    #[must_use]
    pub fn applies_to(&self, event: &ReplaceableEvent, state: &GameState) -> bool {
        self.action.fits(event) && self.condition_holds(event, state)
    }

    fn object_matches(&self, object: ObjectId, controller: PlayerId, filter: &ObjectFilter, state: &GameState) -> bool {
        let ctx = state.filter_context(self.controller, Some(self.source));
        state
            .object(object)
            .is_some_and(|o| filter.matches(object, &o.computed, controller, &ctx))
    }

    fn condition_holds(&self, event: &ReplaceableEvent, state: &GameState) -> bool {
        use ReplaceableEvent as E;
        use ReplacementCondition as C;
        match (&self.condition, event) {
            (C::DamageTo(t), E::Damage { target, .. }) => t == target,
            (C::DamageToController, E::Damage { target, .. }) => *target == Target::Player(self.controller),
            (C::DamageToSource, E::Damage { target, .. }) => *target == Target::Object(self.source),
            (C::DamageFromSource, E::Damage { source, .. }) => *source == self.source,
            (C::CombatDamage, E::Damage { combat, .. }) => *combat,
            (
                C::Enters(filter),
                E::ZoneMove {
                    object,
                    to: ZoneKind::Battlefield,
                    controller,
                    ..
                },
            ) => self.object_matches(*object, *controller, filter, state),
            (
                C::WouldDie(filter),
                E::ZoneMove {
                    object,
                    from: Some(ZoneKind::Battlefield),
                    to: ZoneKind::Graveyard,
                    controller,
                    ..
                },
            ) => self.object_matches(*object, *controller, filter, state),
            (C::CountersPlaced(filter), E::AddCounters { object, .. }) => state
                .controller_of(*object)
                .is_some_and(|c| self.object_matches(*object, c, filter, state)),
            (
                C::CountersPlaced(filter),
                E::ZoneMove {
                    object,
                    to: ZoneKind::Battlefield,
                    controller,
                    ..
                },
            ) => self.object_matches(*object, *controller, filter, state),
            (C::ControllerDraws, E::Draw { player }) => *player == self.controller,
            (C::ControllerGainsLife, E::LifeGain { player, .. }) => *player == self.controller,
            _ => false,
        }
    }
}

/// Registered replacement effects in registration order.
#[derive(Clone, Debug, Default)]
pub struct ReplacementRegistry {
    effects: Vec<ReplacementEffect>,
}

impl ReplacementRegistry {
    pub fn add(&mut self, effect: ReplacementEffect) {
        self.effects.push(effect);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReplacementEffect> {
        self.effects.iter()
    }

    #[must_use]
    pub fn get(&self, id: ReplacementId) -> Option<&ReplacementEffect> {
        self.effects.iter().find(|e| e.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.effects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }

    /// Drop effects tied to a permanent that left the battlefield.
    pub fn remove_source(&mut self, source: ObjectId) {
        self.effects
            .retain(|e| !(e.source == source && e.lifetime == ReplacementLifetime::WhileSourceOnBattlefield));
    }

    /// Drop effects that end at cleanup; returns how many ended.
    pub fn end_turn(&mut self) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| e.lifetime != ReplacementLifetime::UntilEndOfTurn);
        before - self.effects.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn test_enter_with_counters_merges_kinds() {
        let event = ReplaceableEvent::zone_move(ObjectId(1), Some(ZoneKind::Stack), ZoneKind::Battlefield, PlayerId::new(0));
        let action = ReplacementAction::EnterWithCounters {
            kind: CounterKind::PlusOne,
            count: 2,
        };
        let once = action.apply(event).unwrap();
        let twice = action.apply(once).unwrap();
        match twice {
            ReplaceableEvent::ZoneMove { counters, .. } => {
                assert_eq!(counters.as_slice(), &[(CounterKind::PlusOne, 4)]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_double_counters_needs_counters() {
        let bare = ReplaceableEvent::zone_move(ObjectId(1), None, ZoneKind::Battlefield, PlayerId::new(0));
        assert!(!ReplacementAction::DoubleCounters.fits(&bare));
        let with = ReplaceableEvent::ZoneMove {
            object: ObjectId(1),
            from: None,
            to: ZoneKind::Battlefield,
            controller: PlayerId::new(0),
            enters_tapped: false,
            counters: smallvec![(CounterKind::PlusOne, 1)],
        };
        assert!(ReplacementAction::DoubleCounters.fits(&with));
    }

    #[test]
    fn test_modify_amount_floors_at_zero() {
        let event = ReplaceableEvent::Damage {
            source: ObjectId(1),
            target: Target::Player(PlayerId::new(1)),
            amount: 2,
            combat: false,
        };
        match ReplacementAction::ModifyAmount(-5).apply(event) {
            Some(ReplaceableEvent::Damage { amount, .. }) => assert_eq!(amount, 0),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_prevent_negates() {
        let event = ReplaceableEvent::Draw { player: PlayerId::new(0) };
        assert!(ReplacementAction::Prevent.apply(event).is_none());
    }
}
