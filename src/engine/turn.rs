//! Steps, priority rounds and whole turns.

use tracing::{debug, trace};

use super::Game;
use crate::core::{EngineResult, ObjectId, Step, TurnContext};
use crate::layers::Duration;
use crate::log::TransitionRecord;
use crate::rules::{legal_actions, turn_steps, CombatState, PassOutcome, PriorityRound};
use crate::triggers::GameEvent;

/// What happened during one priority round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub passes: u32,
    pub actions: u32,
    pub resolved: u32,
}

impl Game {
    /// Hand out priority until every player passes in succession with an
    /// empty stack.
    ///
    /// The state is settled before each grant of priority. After an action
    /// or a resolution the active player receives priority, whoever acted.
    /// A rejected action is asked for again, and only counts as a pass once
    /// the configured number of attempts is used up.
    pub fn priority_round(&mut self) -> EngineResult<RoundSummary> {
        let mut summary = RoundSummary::default();
        let mut round = PriorityRound::new(self.state.order, self.state.active_player());
        let attempts = self.state.config.max_action_attempts;
        self.settle()?;
        loop {
            if self.state.is_over() {
                return Ok(summary);
            }
            let holder = round.holder();
            let legal = legal_actions(&self.state, holder);
            let action = self.decisions.action(&self.state, holder, &legal)?;
            if !action.is_pass() {
                if self.take_action(holder, action)?.is_accepted() {
                    summary.actions += 1;
                    self.settle()?;
                    round.action_taken(holder);
                    continue;
                }
                let again = round
                    .rejected(holder, attempts)
                    .map_err(|e| self.state.invariant(e.to_string()))?;
                if again {
                    continue;
                }
                debug!(player = %holder, attempts, "rejected actions used up, passing");
            }

            summary.passes += 1;
            let outcome = round
                .pass(holder)
                .map_err(|e| self.state.invariant(e.to_string()))?;
            if outcome == PassOutcome::AllPassed {
                if self.state.stack.is_empty() {
                    trace!(passes = summary.passes, "priority round over");
                    return Ok(summary);
                }
                self.resolve_top()?;
                summary.resolved += 1;
                self.settle()?;
                round.action_taken(holder);
            }
        }
    }

    fn skips(&self, step: Step) -> bool {
        if step.needs_attackers() && !self.in_combat() {
            return true;
        }
        step == Step::FirstStrikeDamage
            && !self
                .state
                .combat
                .as_ref()
                .is_some_and(|c| c.has_first_strikers(&self.state))
    }

    /// Run one step: its turn-based actions, then priority if the step
    /// grants it. Mana pools empty when the step ends.
    pub fn run_step(&mut self, step: Step) -> EngineResult<()> {
        let active = self.state.active_player();
        self.state.turn = self.state.turn.at(step);
        if step.starts_phase() {
            self.state.record(TransitionRecord::PhaseBegan { phase: step.phase() });
        }
        self.state.record(TransitionRecord::StepBegan { step });
        self.state.emit(GameEvent::StepBegan { step, active });
        trace!(%step, %active, "step began");

        match step {
            Step::Untap => self.untap_step()?,
            Step::Draw => {
                let skip = self.state.turn_number() == 1 && self.state.config.skip_first_draw;
                if !skip {
                    self.draw(active)?;
                }
            }
            Step::BeginCombat => self.state.combat = Some(CombatState::default()),
            Step::DeclareAttackers => self.declare_attackers()?,
            Step::DeclareBlockers => self.declare_blockers()?,
            Step::FirstStrikeDamage => self.combat_damage(true)?,
            Step::CombatDamage => self.combat_damage(false)?,
            Step::Cleanup => self.cleanup_step()?,
            Step::Upkeep | Step::PrecombatMain | Step::EndCombat | Step::PostcombatMain | Step::End => {}
        }
        if step.grants_priority() && !self.state.is_over() {
            self.priority_round()?;
        }
        if step == Step::EndCombat {
            self.state.combat = None;
        }
        self.clear_mana_pools();
        self.flush_sinks();
        Ok(())
    }

    fn untap_step(&mut self) -> EngineResult<()> {
        let active = self.state.active_player();
        let permanents: Vec<ObjectId> = self
            .state
            .battlefield()
            .filter(|o| o.controller == active)
            .map(|o| o.id)
            .collect();
        for id in permanents {
            self.untap(id)?;
            self.state.permanent_mut(id)?.summoning_sick = false;
        }
        Ok(())
    }

    /// Discard to hand size, remove damage and end "this turn" effects.
    ///
    /// If that produced corrections or triggers, players receive priority
    /// and another cleanup step follows.
    fn cleanup_step(&mut self) -> EngineResult<()> {
        let active = self.state.active_player();
        loop {
            let max = self.state.config.max_hand_size;
            while self.state.hand(active).len() > max {
                if self.discard(active)?.is_none() {
                    break;
                }
            }

            let damaged: Vec<ObjectId> = self
                .state
                .battlefield()
                .filter(|o| o.damage() > 0 || o.permanent.as_ref().is_some_and(|p| p.deathtouch_damage))
                .map(|o| o.id)
                .collect();
            for id in damaged {
                let permanent = self.state.permanent_mut(id)?;
                permanent.damage = 0;
                permanent.deathtouch_damage = false;
            }
            let expired = self
                .state
                .effects
                .remove_where(|m| m.duration == Duration::UntilEndOfTurn);
            for m in expired {
                self.state.record(TransitionRecord::ModificationExpired {
                    modification: m.id,
                    source: m.source,
                });
            }
            let shields = self.state.replacements.end_turn();
            trace!(shields, "turn-scoped replacements ended");

            let report = self.settle()?;
            if self.state.is_over() {
                return Ok(());
            }
            if !report.cleanup.changed_anything() && report.triggers_stacked == 0 && self.state.stack.is_empty() {
                return Ok(());
            }
            debug!("cleanup step repeats after priority");
            self.priority_round()?;
            if self.state.is_over() {
                return Ok(());
            }
            self.state.record(TransitionRecord::StepBegan { step: Step::Cleanup });
        }
    }

    /// Play one full turn for the next player.
    pub fn run_turn(&mut self) -> EngineResult<()> {
        let current = self.state.turn;
        let active = if current.number == 0 {
            current.active
        } else {
            self.state.order.next(current.active)
        };
        self.state.turn = TurnContext {
            number: current.number + 1,
            active,
            step: Step::Untap,
        };
        self.state.record(TransitionRecord::TurnBegan {
            turn: current.number + 1,
            active,
        });
        debug!(turn = current.number + 1, %active, "turn began");
        for (_, player) in self.state.players.iter_mut() {
            player.lands_played = 0;
            player.life_gained_this_turn = 0;
        }

        for step in turn_steps() {
            if self.state.is_over() {
                break;
            }
            if self.skips(step) {
                trace!(%step, "step skipped");
                continue;
            }
            self.run_step(step)?;
        }
        self.state.combat = None;
        Ok(())
    }
}
