//! The replacement router.
//!
//! Given a proposed event, the router applies the affected object's own
//! self-replacements first, then every other applicable replacement one at
//! a time. Whenever more than one remains applicable the affected player
//! picks the next. The candidate set is recomputed after every substitution
//! and each effect applies at most once per event.

use smallvec::SmallVec;
use tracing::debug;

use super::effect::ReplacementAction;
use super::event::ReplaceableEvent;
use crate::core::{EngineResult, GameState, PlayerId, ReplacementId};
use crate::objects::Ability;

/// Chooses the next replacement when several apply.
pub trait ReplacementChooser {
    fn choose_replacement(
        &mut self,
        state: &GameState,
        player: PlayerId,
        event: &ReplaceableEvent,
        options: &[ReplacementId],
    ) -> EngineResult<ReplacementId>;
}

/// Always takes the earliest registered option.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstRegistered;

impl ReplacementChooser for FirstRegistered {
    fn choose_replacement(
        &mut self,
        state: &GameState,
        _player: PlayerId,
        _event: &ReplaceableEvent,
        options: &[ReplacementId],
    ) -> EngineResult<ReplacementId> {
        options
            .first()
            .copied()
            .ok_or_else(|| state.invariant("replacement choice with no options"))
    }
}

/// What is left of an event after routing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Routed {
    /// `None` when a replacement negated the event.
    pub event: Option<ReplaceableEvent>,
    /// Registered effects applied, in order.
    pub applied: SmallVec<[ReplacementId; 2]>,
    /// Self-replacements applied before them.
    pub self_applied: usize,
}

impl Routed {
    #[must_use]
    pub fn negated(&self) -> bool {
        self.event.is_none()
    }
}

/// Self-replacements carried by the object an entry event is about.
fn self_replacements(state: &GameState, event: &ReplaceableEvent) -> Vec<ReplacementAction> {
    let ReplaceableEvent::ZoneMove { object, .. } = event else {
        return Vec::new();
    };
    if !event.is_entry() {
        return Vec::new();
    }
    state
        .object(*object)
        .map(|o| {
            o.definition
                .characteristics
                .abilities
                .iter()
                .filter_map(|a| match a {
                    Ability::EntersWith(action) => Some(action.clone()),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Run `event` through every applicable replacement effect.
pub fn route(
    state: &GameState,
    event: ReplaceableEvent,
    chooser: &mut dyn ReplacementChooser,
) -> EngineResult<Routed> {
    let mut routed = Routed {
        event: None,
        applied: SmallVec::new(),
        self_applied: 0,
    };
    let mut current = event;

    for action in self_replacements(state, &current) {
        if !action.fits(&current) {
            continue;
        }
        routed.self_applied += 1;
        match action.apply(current) {
            Some(next) => current = next,
            None => return Ok(routed),
        }
    }

    loop {
        let options: Vec<ReplacementId> = state
            .replacements
            .iter()
            .filter(|r| !routed.applied.contains(&r.id) && r.applies_to(&current, state))
            .map(|r| r.id)
            .collect();
        let chosen = match options.as_slice() {
            [] => break,
            [only] => *only,
            _ => {
                let player = current.affected_player(state);
                let pick = chooser.choose_replacement(state, player, &current, &options)?;
                if !options.contains(&pick) {
                    return Err(state.illegal_choice(player, format!("{pick} is not an applicable replacement")));
                }
                pick
            }
        };
        let effect = state
            .replacements
            .get(chosen)
            .ok_or_else(|| state.invariant(format!("{chosen} vanished during routing")))?;
        debug!(replacement = %chosen, source = %effect.source, "applying replacement");
        routed.applied.push(chosen);
        match effect.action.apply(current) {
            Some(next) => current = next,
            None => return Ok(routed),
        }
    }

    routed.event = Some(current);
    Ok(routed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MatchConfig, ObjectId};
    use crate::effects::Target;
    use crate::objects::{CardDefinition, CounterKind, ObjectFilter};
    use crate::replacement::{ReplacementCondition, ReplacementEffect, ReplacementLifetime};
    use crate::zones::{ZoneId, ZoneKind, ZonePosition};
    use std::sync::Arc;

    fn register(state: &mut GameState, condition: ReplacementCondition, action: ReplacementAction) -> ReplacementId {
        let id = state.ids.next_replacement();
        let timestamp = state.ids.tick();
        state.replacements.add(ReplacementEffect {
            id,
            source: ObjectId(900),
            controller: PlayerId::new(0),
            condition,
            action,
            timestamp,
            lifetime: ReplacementLifetime::UntilEndOfTurn,
        });
        id
    }

    struct LastRegistered;

    impl ReplacementChooser for LastRegistered {
        fn choose_replacement(
            &mut self,
            _state: &GameState,
            _player: PlayerId,
            _event: &ReplaceableEvent,
            options: &[ReplacementId],
        ) -> EngineResult<ReplacementId> {
            Ok(*options.last().unwrap())
        }
    }

    fn damage(amount: u32) -> ReplaceableEvent {
        ReplaceableEvent::Damage {
            source: ObjectId(1),
            target: Target::Player(PlayerId::new(0)),
            amount,
            combat: true,
        }
    }

    #[test]
    fn test_self_replacement_applies_before_external() {
        let mut state = GameState::new(MatchConfig::default());
        let p0 = PlayerId::new(0);
        let def = CardDefinition::creature("Walker", "2G", 0, 0).with_ability(Ability::EntersWith(
            ReplacementAction::EnterWithCounters {
                kind: CounterKind::PlusOne,
                count: 2,
            },
        ));
        let card = state
            .create_object(Arc::new(def), p0, ZoneId::hand(p0), ZonePosition::Top, false)
            .unwrap();
        register(&mut state, ReplacementCondition::CountersPlaced(ObjectFilter::creature()), ReplacementAction::DoubleCounters);

        let event = ReplaceableEvent::zone_move(card, Some(ZoneKind::Hand), ZoneKind::Battlefield, p0);
        let routed = route(&state, event, &mut FirstRegistered).unwrap();
        assert_eq!(routed.self_applied, 1);
        assert_eq!(routed.applied.len(), 1);
        match routed.event {
            Some(ReplaceableEvent::ZoneMove { counters, .. }) => {
                assert_eq!(counters.as_slice(), &[(CounterKind::PlusOne, 4)]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_affected_player_orders_competing_effects() {
        let mut state = GameState::new(MatchConfig::default());
        register(&mut state, ReplacementCondition::CombatDamage, ReplacementAction::ModifyAmount(1));
        register(&mut state, ReplacementCondition::CombatDamage, ReplacementAction::DoubleAmount);

        let first = route(&state, damage(3), &mut FirstRegistered).unwrap();
        assert_eq!(first.event, Some(damage(8)));
        let last = route(&state, damage(3), &mut LastRegistered).unwrap();
        assert_eq!(last.event, Some(damage(7)));
    }

    #[test]
    fn test_negation_stops_processing() {
        let mut state = GameState::new(MatchConfig::default());
        let shield = register(&mut state, ReplacementCondition::DamageToController, ReplacementAction::Prevent);
        register(&mut state, ReplacementCondition::CombatDamage, ReplacementAction::DoubleAmount);
        let routed = route(&state, damage(3), &mut FirstRegistered).unwrap();
        assert!(routed.negated());
        assert_eq!(routed.applied.as_slice(), &[shield]);
    }

    #[test]
    fn test_substitution_refilters_candidates() {
        let mut state = GameState::new(MatchConfig::default());
        let p0 = PlayerId::new(0);
        let bear = state
            .create_object(
                Arc::new(CardDefinition::creature("Bear", "1G", 2, 2)),
                p0,
                ZoneId::battlefield(),
                ZonePosition::Top,
                false,
            )
            .unwrap();
        let exile = register(
            &mut state,
            ReplacementCondition::WouldDie(ObjectFilter::creature()),
            ReplacementAction::ChangeDestination(ZoneKind::Exile),
        );
        register(
            &mut state,
            ReplacementCondition::WouldDie(ObjectFilter::creature()),
            ReplacementAction::ChangeDestination(ZoneKind::Hand),
        );
        let event = ReplaceableEvent::zone_move(bear, Some(ZoneKind::Battlefield), ZoneKind::Graveyard, p0);
        let routed = route(&state, event, &mut FirstRegistered).unwrap();
        assert_eq!(routed.applied.as_slice(), &[exile]);
        assert!(matches!(routed.event, Some(ReplaceableEvent::ZoneMove { to: ZoneKind::Exile, .. })));
    }

    #[test]
    fn test_no_applicable_effects_passes_event_through() {
        let state = GameState::new(MatchConfig::default());
        let routed = route(&state, damage(2), &mut FirstRegistered).unwrap();
        assert_eq!(routed.event, Some(damage(2)));
        assert!(routed.applied.is_empty());
    }
}
