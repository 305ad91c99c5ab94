//! Executing priority actions.
//!
//! Every action is checked again right before it runs. A check that fails
//! is a rejection: logged, reported to the caller, and treated by the
//! priority round as a pass.

use tracing::debug;

use super::Game;
use crate::core::{Action, ActionOutcome, EngineResult, ManaCost, ObjectId, PlayerId, RejectReason};
use crate::effects::TargetSpec;
use crate::log::{Rejection, TransitionRecord};
use crate::rules::{activated_ability, available_sources, check_action, plan_payment, PaymentPlan};
use crate::stack::{EntryKind, StackEntry};
use crate::triggers::GameEvent;
use crate::zones::{ZoneId, ZoneKind, ZonePosition};

type Attempt = Result<(), RejectReason>;

impl Game {
    /// Carry out `action` for `player`.
    pub fn take_action(&mut self, player: PlayerId, action: Action) -> EngineResult<ActionOutcome> {
        if let Err(reason) = check_action(&self.state, player, action) {
            return Ok(self.reject(player, reason));
        }
        let attempt = match action {
            Action::Pass => Ok(()),
            Action::PlayLand { card } => self.play_land(player, card)?,
            Action::CastSpell { card } => self.cast_spell(player, card)?,
            Action::ActivateAbility { source, ability } => self.activate(player, source, ability)?,
        };
        Ok(match attempt {
            Ok(()) => ActionOutcome::Accepted,
            Err(reason) => self.reject(player, reason),
        })
    }

    fn reject(&mut self, player: PlayerId, reason: RejectReason) -> ActionOutcome {
        debug!(%player, %reason, "action rejected");
        self.state.record(TransitionRecord::ActionRejected {
            player,
            reason: Rejection::Action(reason.to_string()),
        });
        ActionOutcome::Rejected(reason)
    }

    fn play_land(&mut self, player: PlayerId, card: ObjectId) -> EngineResult<Attempt> {
        self.move_object(card, ZoneKind::Battlefield, Some(player))?;
        self.state.player_mut(player).lands_played += 1;
        Ok(Ok(()))
    }

    fn unmet_requirement(&self, player: PlayerId, source: ObjectId, specs: &[TargetSpec]) -> RejectReason {
        let ctx = self.state.filter_context(player, Some(source));
        let requirement = specs
            .iter()
            .position(|spec| !spec.has_candidate(&self.state, &ctx))
            .unwrap_or(0);
        RejectReason::NoLegalTargets { requirement }
    }

    fn cast_spell(&mut self, player: PlayerId, card: ObjectId) -> EngineResult<Attempt> {
        let object = self.state.require(card)?;
        let name = object.name().to_string();
        let cost = object.computed.mana_cost;
        let specs = object.definition.spell.targets.clone();
        let effects = object.definition.spell.effects.clone();

        let Some(targets) = self.decisions.targets(&self.state, player, card, &specs)? else {
            return Ok(Err(self.unmet_requirement(player, card, &specs)));
        };
        let plan = match self.plan(player, &cost, None) {
            Ok(plan) => plan,
            Err(reason) => return Ok(Err(reason)),
        };
        self.pay(player, plan, &cost)?;

        let moved = self
            .state
            .relocate(card, ZoneId::stack(), ZonePosition::Top, Some(player))?;
        let entry = StackEntry::new(EntryKind::Spell, name.clone(), moved.new, player)
            .with_effects(effects)
            .with_targets(specs, targets.iter().copied());
        let state = &mut self.state;
        let id = state.stack.push(entry, &mut state.ids);
        self.state.record(TransitionRecord::SpellCast {
            entry: id,
            object: moved.new,
            name,
            controller: player,
            targets,
        });
        self.state.emit(GameEvent::SpellCast {
            entry: id,
            object: moved.new,
            controller: player,
        });
        Ok(Ok(()))
    }

    fn activate(&mut self, player: PlayerId, source: ObjectId, index: usize) -> EngineResult<Attempt> {
        let ability = activated_ability(&self.state, source, index)
            .cloned()
            .ok_or_else(|| self.state.invariant(format!("{source} has no activated ability {index}")))?;
        let name = format!("{} ability", self.state.require(source)?.name());

        let Some(targets) = self.decisions.targets(&self.state, player, source, &ability.targets)? else {
            return Ok(Err(self.unmet_requirement(player, source, &ability.targets)));
        };
        let cost = &ability.cost;
        let plan = match self.plan(player, &cost.mana, cost.tap.then_some(source)) {
            Ok(plan) => plan,
            Err(reason) => return Ok(Err(reason)),
        };
        if cost.tap && !self.tap(source)? {
            return Ok(Err(RejectReason::CannotTap));
        }
        self.lose_life(player, cost.life);
        self.pay(player, plan, &cost.mana)?;

        let lki = self.state.snapshot(source);
        if cost.sacrifice_self {
            self.sacrifice(source)?;
        }
        let entry = StackEntry::new(EntryKind::Activated { ability: index }, name, source, player)
            .with_effects(ability.effects.clone())
            .with_targets(ability.targets.clone(), targets.iter().copied())
            .with_source_lki(lki);
        let state = &mut self.state;
        let id = state.stack.push(entry, &mut state.ids);
        self.state.record(TransitionRecord::AbilityActivated {
            entry: id,
            source,
            controller: player,
            targets,
        });
        Ok(Ok(()))
    }

    /// Work out which sources pay `cost` without touching anything.
    fn plan(&self, player: PlayerId, cost: &ManaCost, exclude: Option<ObjectId>) -> Result<PaymentPlan, RejectReason> {
        if cost.is_free() {
            return Ok(PaymentPlan::default());
        }
        let sources = available_sources(&self.state, player, exclude);
        plan_payment(self.state.player(player).mana_pool, &sources, cost)
            .map_err(|missing| RejectReason::CannotPay { missing })
    }

    /// Tap the planned sources into the pool and pay from it.
    fn pay(&mut self, player: PlayerId, plan: PaymentPlan, cost: &ManaCost) -> EngineResult<()> {
        for source in plan.taps {
            self.tap(source.object)?;
            self.state.player_mut(player).mana_pool.add(source.mana, source.amount);
        }
        let paid = self.state.player_mut(player).mana_pool.pay(cost);
        paid.map_err(|missing| self.state.invariant(format!("planned payment fell {missing} short")))
    }
}
