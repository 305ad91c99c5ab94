//! Resolving the top of the stack.
//!
//! Targets are re-checked first. An entry whose targets are all illegal
//! fizzles: none of its effects happen and a spell card goes to its
//! owner's graveyard. Otherwise every effect runs in printed order against
//! whichever targets are still legal.

use smallvec::SmallVec;
use tracing::debug;

use super::Game;
use crate::core::{EngineResult, ObjectId};
use crate::effects::{Effect, EffectTarget, PreventionScope, ResolutionOutcome, ResolverContext, Target};
use crate::layers::{AffectedSet, Duration, Modification, ModificationKind};
use crate::log::TransitionRecord;
use crate::objects::GameObject;
use crate::replacement::{ReplacementAction, ReplacementCondition, ReplacementEffect, ReplacementLifetime};
use crate::stack::StackEntry;
use crate::zones::ZoneKind;

impl Game {
    /// Pop and resolve the top stack entry.
    pub fn resolve_top(&mut self) -> EngineResult<ResolutionOutcome> {
        let Some(entry) = self.state.stack.pop() else {
            return Err(self.state.invariant("resolve requested with an empty stack"));
        };
        let ctx = ResolverContext::for_entry(&entry, &self.state);

        if ctx.all_targets_illegal() {
            debug!(entry = %entry.id, name = %entry.name, "fizzled");
            self.state.record(TransitionRecord::Fizzled { entry: entry.id });
            if entry.is_spell() {
                self.spell_card_to_graveyard(entry.source)?;
            }
            return Ok(ResolutionOutcome::Fizzled);
        }

        let outcome = if entry.is_spell() && self.state.require(entry.source)?.computed.is_permanent() {
            self.resolve_permanent_spell(&entry, &ctx)?
        } else {
            for effect in &entry.effects {
                self.apply_effect(effect, &ctx)?;
            }
            if entry.is_spell() {
                self.spell_card_to_graveyard(entry.source)?;
            }
            ResolutionOutcome::Resolved
        };
        debug!(entry = %entry.id, name = %entry.name, ?outcome, "resolved");
        self.state.record(TransitionRecord::Resolved { entry: entry.id });
        Ok(outcome)
    }

    fn spell_card_to_graveyard(&mut self, card: ObjectId) -> EngineResult<()> {
        let on_stack = self
            .state
            .object(card)
            .is_some_and(|o| o.zone.kind == ZoneKind::Stack);
        if on_stack {
            self.move_object(card, ZoneKind::Graveyard, None)?;
        }
        Ok(())
    }

    fn resolve_permanent_spell(&mut self, entry: &StackEntry, ctx: &ResolverContext) -> EngineResult<ResolutionOutcome> {
        let is_aura = self.state.require(entry.source)?.definition.is_aura();
        let Some(permanent) = self.move_object(entry.source, ZoneKind::Battlefield, Some(entry.controller))? else {
            return Ok(ResolutionOutcome::Resolved);
        };
        let on_battlefield = self.state.object(permanent).is_some_and(GameObject::is_on_battlefield);
        if is_aura && on_battlefield {
            if let Some(Some(Target::Object(host))) = ctx.targets.first() {
                self.state.permanent_mut(permanent)?.attached_to = Some(*host);
            }
        }
        if !on_battlefield {
            return Ok(ResolutionOutcome::Resolved);
        }
        Ok(ResolutionOutcome::EnteredBattlefield(permanent))
    }

    fn live_permanents(&self, ctx: &ResolverContext, what: &EffectTarget) -> Vec<ObjectId> {
        ctx.objects(&self.state, what)
            .into_iter()
            .filter(|id| self.state.object(*id).is_some_and(GameObject::is_on_battlefield))
            .collect()
    }

    /// Perform one effect.
    pub fn apply_effect(&mut self, effect: &Effect, ctx: &ResolverContext) -> EngineResult<()> {
        match effect {
            Effect::DealDamage { amount, to } => {
                let amount = ctx.amount(&self.state, amount).max(0) as u32;
                for target in ctx.recipients(&self.state, to) {
                    self.deal_damage(ctx.source, ctx.source_lki.as_ref(), target, amount, false)?;
                }
            }
            Effect::GainLife { amount, who } => {
                let amount = ctx.amount(&self.state, amount).max(0) as u32;
                for player in ctx.players(&self.state, who) {
                    self.gain_life(player, amount)?;
                }
            }
            Effect::LoseLife { amount, who } => {
                let amount = ctx.amount(&self.state, amount).max(0) as u32;
                for player in ctx.players(&self.state, who) {
                    self.lose_life(player, amount);
                }
            }
            Effect::DrawCards { count, who } => {
                for player in ctx.players(&self.state, who) {
                    for _ in 0..*count {
                        self.draw(player)?;
                    }
                }
            }
            Effect::Discard { count, who } => {
                for player in ctx.players(&self.state, who) {
                    for _ in 0..*count {
                        self.discard(player)?;
                    }
                }
            }
            Effect::Destroy { what } => {
                for id in self.live_permanents(ctx, what) {
                    self.destroy(id)?;
                }
            }
            Effect::Exile { what } => {
                for id in ctx.objects(&self.state, what) {
                    self.move_object(id, ZoneKind::Exile, None)?;
                }
            }
            Effect::ReturnToHand { what } => {
                for id in ctx.objects(&self.state, what) {
                    self.move_object(id, ZoneKind::Hand, None)?;
                }
            }
            Effect::Sacrifice { what } => {
                for id in self.live_permanents(ctx, what) {
                    self.sacrifice(id)?;
                }
            }
            Effect::AddCounters { what, kind, count } => {
                for id in self.live_permanents(ctx, what) {
                    self.add_counters(id, *kind, *count)?;
                }
            }
            Effect::RemoveCounters { what, kind, count } => {
                for id in self.live_permanents(ctx, what) {
                    self.remove_counters(id, *kind, *count)?;
                }
            }
            Effect::AddPoison { who, count } => {
                for player in ctx.players(&self.state, who) {
                    self.add_poison(player, *count);
                }
            }
            Effect::Tap { what } => {
                for id in self.live_permanents(ctx, what) {
                    self.tap(id)?;
                }
            }
            Effect::Untap { what } => {
                for id in self.live_permanents(ctx, what) {
                    self.untap(id)?;
                }
            }
            Effect::Modify { what, kind, duration } => {
                for id in self.live_permanents(ctx, what) {
                    self.add_modification(ctx, id, kind.clone(), *duration);
                }
                self.state.recompute();
            }
            Effect::CreateTokens { token, count } => {
                for _ in 0..*count {
                    self.create_token(token, ctx.controller)?;
                }
            }
            Effect::AddMana { mana, amount } => {
                self.state.player_mut(ctx.controller).mana_pool.add(*mana, *amount);
            }
            Effect::CounterSpell { what } => {
                for id in ctx.objects(&self.state, what) {
                    self.counter_spell(id)?;
                }
            }
            Effect::Attach { to } => {
                let source_live = self
                    .state
                    .object(ctx.source)
                    .is_some_and(GameObject::is_on_battlefield);
                if let (true, Some(host)) = (source_live, self.live_permanents(ctx, to).first().copied()) {
                    self.state.permanent_mut(ctx.source)?.attached_to = Some(host);
                }
            }
            Effect::PreventDamage { scope } => {
                let conditions: Vec<ReplacementCondition> = match scope {
                    PreventionScope::AllCombatDamage => vec![ReplacementCondition::CombatDamage],
                    PreventionScope::DamageTo(what) => ctx
                        .recipients(&self.state, what)
                        .into_iter()
                        .map(ReplacementCondition::DamageTo)
                        .collect(),
                };
                for condition in conditions {
                    let id = self.state.ids.next_replacement();
                    let timestamp = self.state.ids.tick();
                    self.state.replacements.add(ReplacementEffect {
                        id,
                        source: ctx.source,
                        controller: ctx.controller,
                        condition,
                        action: ReplacementAction::Prevent,
                        timestamp,
                        lifetime: ReplacementLifetime::UntilEndOfTurn,
                    });
                }
            }
        }
        Ok(())
    }

    fn add_modification(&mut self, ctx: &ResolverContext, object: ObjectId, kind: ModificationKind, duration: Duration) {
        let id = self.state.ids.next_modification();
        let timestamp = self.state.ids.tick();
        self.state.effects.add(Modification {
            id,
            source: ctx.source,
            controller: ctx.controller,
            affected: AffectedSet::Object(object),
            kind,
            timestamp,
            duration,
            depends_on: SmallVec::new(),
        });
    }

    fn counter_spell(&mut self, card: ObjectId) -> EngineResult<()> {
        let Some(entry) = self.state.stack.spell_for(card).map(|e| e.id) else {
            return Ok(());
        };
        self.state.stack.remove(entry);
        debug!(%entry, "countered");
        self.state.record(TransitionRecord::Countered { entry });
        self.spell_card_to_graveyard(card)
    }
}
