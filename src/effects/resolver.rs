//! Resolution context: turning effect references into concrete players,
//! objects and numbers.
//!
//! A [`ResolverContext`] is built once per resolving stack entry. Building
//! it re-checks every chosen target against the requirement it was chosen
//! under; a target that fails is kept as `None` so that indices into the
//! target list stay stable.

use crate::core::{GameState, ObjectId, PlayerId};
use crate::objects::{FilterContext, GameObject, LastKnown};
use crate::stack::StackEntry;

use super::effect::{Amount, EffectTarget};
use super::targeting::Target;

/// How a resolution attempt ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Effects applied (to whichever targets were still legal).
    Resolved,
    /// A permanent spell put its card onto the battlefield.
    EnteredBattlefield(ObjectId),
    /// Every target was illegal; nothing happened.
    Fizzled,
}

/// Everything an effect may refer to while its entry resolves.
#[derive(Clone, Debug)]
pub struct ResolverContext {
    pub source: ObjectId,
    pub source_lki: Option<LastKnown>,
    pub controller: PlayerId,
    /// Chosen targets, `None` where the target is no longer legal.
    pub targets: Vec<Option<Target>>,
    pub triggering: Option<ObjectId>,
    pub triggering_lki: Option<LastKnown>,
}

impl ResolverContext {
    /// Context for a stack entry, with its targets re-validated.
    #[must_use]
    pub fn for_entry(entry: &StackEntry, state: &GameState) -> Self {
        let ctx = state.filter_context(entry.controller, Some(entry.source));
        let targets = entry
            .targets
            .iter()
            .enumerate()
            .map(|(i, &target)| {
                let legal = entry
                    .target_specs
                    .get(i)
                    .is_some_and(|spec| spec.is_legal(target, state, &ctx));
                legal.then_some(target)
            })
            .collect();
        Self {
            source: entry.source,
            source_lki: entry.source_lki.clone(),
            controller: entry.controller,
            targets,
            triggering: entry.triggering,
            triggering_lki: entry.triggering_lki.clone(),
        }
    }

    /// Context without targets, for effects applied outside the stack.
    #[must_use]
    pub fn untargeted(source: ObjectId, controller: PlayerId) -> Self {
        Self {
            source,
            source_lki: None,
            controller,
            targets: Vec::new(),
            triggering: None,
            triggering_lki: None,
        }
    }

    /// True when targets were chosen and none of them is legal any more.
    #[must_use]
    pub fn all_targets_illegal(&self) -> bool {
        !self.targets.is_empty() && self.targets.iter().all(Option::is_none)
    }

    #[must_use]
    pub fn filter_context(&self) -> FilterContext {
        FilterContext {
            you: self.controller,
            source: Some(self.source),
        }
    }

    fn chosen(&self, index: usize) -> Option<Target> {
        self.targets.get(index).copied().flatten()
    }

    fn live_source<'a>(&self, state: &'a GameState) -> Option<&'a GameObject> {
        state.object(self.source)
    }

    fn attached_host(&self, state: &GameState) -> Option<ObjectId> {
        let host = match self.live_source(state) {
            Some(source) => source.attached_to(),
            None => self.source_lki.as_ref().and_then(|l| l.attached_to),
        }?;
        state.object(host).is_some_and(GameObject::is_on_battlefield).then_some(host)
    }

    /// Players an effect reference denotes. Only players still in the game
    /// are returned.
    #[must_use]
    pub fn players(&self, state: &GameState, what: &EffectTarget) -> Vec<PlayerId> {
        let found: Vec<PlayerId> = match what {
            EffectTarget::Target(i) => match self.chosen(*i) {
                Some(Target::Player(p)) => vec![p],
                _ => Vec::new(),
            },
            EffectTarget::Controller => vec![self.controller],
            EffectTarget::EachOpponent => state.order.opponents_of(self.controller).collect(),
            EffectTarget::EachPlayer => state.order.starting_from(state.active_player()).collect(),
            EffectTarget::ControllerOfTarget(i) => match self.chosen(*i) {
                Some(Target::Player(p)) => vec![p],
                Some(Target::Object(o)) => state.controller_of(o).into_iter().collect(),
                None => Vec::new(),
            },
            EffectTarget::Source => state.controller_of(self.source).into_iter().collect(),
            EffectTarget::TriggeringObject => self
                .triggering
                .and_then(|o| state.controller_of(o))
                .into_iter()
                .collect(),
            EffectTarget::Each(_) | EffectTarget::Attached => Vec::new(),
        };
        found.into_iter().filter(|&p| state.player(p).is_alive()).collect()
    }

    /// Live objects an effect reference denotes.
    #[must_use]
    pub fn objects(&self, state: &GameState, what: &EffectTarget) -> Vec<ObjectId> {
        match what {
            EffectTarget::Target(i) => match self.chosen(*i) {
                Some(Target::Object(o)) if state.object(o).is_some() => vec![o],
                _ => Vec::new(),
            },
            EffectTarget::Source => self.live_source(state).map(|o| o.id).into_iter().collect(),
            EffectTarget::Each(filter) => {
                let ctx = self.filter_context();
                state
                    .battlefield()
                    .filter(|o| filter.matches(o.id, &o.computed, o.controller, &ctx))
                    .map(|o| o.id)
                    .collect()
            }
            EffectTarget::Attached => self.attached_host(state).into_iter().collect(),
            EffectTarget::TriggeringObject => self
                .triggering
                .filter(|&o| state.object(o).is_some())
                .into_iter()
                .collect(),
            EffectTarget::Controller
            | EffectTarget::EachOpponent
            | EffectTarget::EachPlayer
            | EffectTarget::ControllerOfTarget(_) => Vec::new(),
        }
    }

    /// Players and objects together, players first.
    #[must_use]
    pub fn recipients(&self, state: &GameState, what: &EffectTarget) -> Vec<Target> {
        self.players(state, what)
            .into_iter()
            .map(Target::Player)
            .chain(self.objects(state, what).into_iter().map(Target::Object))
            .collect()
    }

    /// Evaluate a number.
    #[must_use]
    pub fn amount(&self, state: &GameState, amount: &Amount) -> i32 {
        match amount {
            Amount::Fixed(n) => *n,
            Amount::TriggeringPower => self
                .triggering
                .and_then(|o| state.object(o))
                .map(|o| o.computed.power_or_zero())
                .or_else(|| self.triggering_lki.as_ref().map(LastKnown::power))
                .unwrap_or(0),
            Amount::SourcePower => self
                .live_source(state)
                .map(|o| o.computed.power_or_zero())
                .or_else(|| self.source_lki.as_ref().map(LastKnown::power))
                .unwrap_or(0),
            Amount::CountOf(filter) => {
                let ctx = self.filter_context();
                state
                    .battlefield()
                    .filter(|o| filter.matches(o.id, &o.computed, o.controller, &ctx))
                    .count() as i32
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MatchConfig;
    use crate::effects::TargetSpec;
    use crate::objects::{CardDefinition, ObjectFilter};
    use crate::stack::EntryKind;
    use crate::zones::{ZoneId, ZonePosition};
    use std::sync::Arc;

    fn creature(state: &mut GameState, owner: u8, power: i32) -> ObjectId {
        let def = Arc::new(CardDefinition::creature("Beast", "1G", power, 3));
        state
            .create_object(def, PlayerId::new(owner), ZoneId::battlefield(), ZonePosition::Top, false)
            .unwrap()
    }

    #[test]
    fn test_targets_revalidated() {
        let mut state = GameState::new(MatchConfig::default());
        let p0 = PlayerId::new(0);
        let a = creature(&mut state, 1, 2);
        let b = creature(&mut state, 1, 3);
        state.recompute();
        let entry = StackEntry::new(EntryKind::Spell, "Twin Bolt", ObjectId(900), p0).with_targets(
            vec![TargetSpec::creature(), TargetSpec::creature()],
            [Target::Object(a), Target::Object(b)],
        );
        state
            .relocate(a, ZoneId::graveyard(PlayerId::new(1)), ZonePosition::Top, None)
            .unwrap();
        let ctx = ResolverContext::for_entry(&entry, &state);
        assert_eq!(ctx.targets, vec![None, Some(Target::Object(b))]);
        assert!(!ctx.all_targets_illegal());
        assert_eq!(ctx.objects(&state, &EffectTarget::Target(0)), Vec::<ObjectId>::new());
        assert_eq!(ctx.players(&state, &EffectTarget::ControllerOfTarget(1)), vec![PlayerId::new(1)]);
    }

    #[test]
    fn test_triggering_power_uses_last_known() {
        let mut state = GameState::new(MatchConfig::default());
        let dying = creature(&mut state, 0, 4);
        state.recompute();
        let lki = state.snapshot(dying);
        state
            .relocate(dying, ZoneId::graveyard(PlayerId::new(0)), ZonePosition::Top, None)
            .unwrap();
        let mut ctx = ResolverContext::untargeted(ObjectId(900), PlayerId::new(0));
        ctx.triggering = Some(dying);
        ctx.triggering_lki = lki;
        assert_eq!(ctx.amount(&state, &Amount::TriggeringPower), 4);
    }

    #[test]
    fn test_group_references() {
        let mut state = GameState::new(MatchConfig::default());
        creature(&mut state, 0, 1);
        creature(&mut state, 1, 1);
        state.recompute();
        let ctx = ResolverContext::untargeted(ObjectId(900), PlayerId::new(0));
        assert_eq!(ctx.players(&state, &EffectTarget::EachOpponent), vec![PlayerId::new(1)]);
        assert_eq!(ctx.amount(&state, &Amount::CountOf(ObjectFilter::creature())), 2);
        assert_eq!(ctx.objects(&state, &EffectTarget::Each(ObjectFilter::creature())).len(), 2);
    }
}
