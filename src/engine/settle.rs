//! Settling the state before anyone receives priority.
//!
//! The cleanup loop scans for violations, corrects every one found in a
//! scan at the same time, and scans again until nothing is left. Triggers
//! detected along the way are then put on the stack, active player's
//! first, so the non-active player's triggers end up on top.

use std::collections::BTreeSet;

use tracing::{debug, info};

use super::Game;
use crate::agent::{ChoiceKind, OrderKind};
use crate::core::{EndReason, EngineResult, LossReason, ObjectId, PlayerId};
use crate::log::TransitionRecord;
use crate::objects::CounterKind;
use crate::rules::{check_state, CleanupReport, Violation};
use crate::stack::{EntryKind, StackEntry};
use crate::triggers::{detect, group_apnap, PendingTrigger};
use crate::zones::ZoneKind;

/// Scans after which a cleanup loop that keeps finding violations is
/// treated as an engine fault.
const MAX_CLEANUP_PASSES: u32 = 256;

/// What one settle did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettleReport {
    pub cleanup: CleanupReport,
    pub triggers_stacked: usize,
}

/// Corrections gathered from one scan, applied together.
#[derive(Default)]
struct Corrections {
    losses: Vec<(PlayerId, LossReason)>,
    to_graveyard: Vec<ObjectId>,
    annihilate: Vec<(ObjectId, u32)>,
    cease: Vec<ObjectId>,
}

impl Corrections {
    fn bury(&mut self, id: ObjectId) {
        if !self.to_graveyard.contains(&id) {
            self.to_graveyard.push(id);
        }
    }
}

impl Game {
    /// Run the cleanup loop, then put pending triggers on the stack.
    pub fn settle(&mut self) -> EngineResult<SettleReport> {
        let cleanup = self.run_cleanup()?;
        let triggers_stacked = if self.state.is_over() {
            self.state.pending.clear();
            0
        } else {
            self.stack_pending_triggers()?
        };
        Ok(SettleReport {
            cleanup,
            triggers_stacked,
        })
    }

    /// Scan and correct until a scan finds nothing.
    pub fn run_cleanup(&mut self) -> EngineResult<CleanupReport> {
        let mut report = CleanupReport::default();
        loop {
            self.state.recompute();
            detect(&mut self.state);
            report.passes += 1;
            let violations = check_state(&self.state);
            if violations.is_empty() || self.state.is_over() {
                return Ok(report);
            }
            if report.passes >= MAX_CLEANUP_PASSES {
                return Err(self
                    .state
                    .invariant(format!("cleanup still finding violations after {} passes", report.passes)));
            }
            debug!(count = violations.len(), pass = report.passes, "correcting violations");
            report.corrections += violations.len() as u32;
            self.correct(violations)?;
        }
    }

    fn correct(&mut self, violations: Vec<Violation>) -> EngineResult<()> {
        let mut fix = Corrections::default();
        for violation in violations {
            match violation {
                Violation::PlayerLoses { player, reason } => fix.losses.push((player, reason)),
                Violation::ZeroToughness(id)
                | Violation::LethalDamage(id)
                | Violation::ZeroLoyalty(id)
                | Violation::IllegalAttachment(id) => fix.bury(id),
                Violation::LegendRule {
                    controller,
                    name,
                    objects,
                } => {
                    let options: Vec<String> = objects.iter().map(|id| format!("{name} ({id})")).collect();
                    let keep = self
                        .decisions
                        .option(&self.state, controller, ChoiceKind::LegendRule, &options)?;
                    for (i, id) in objects.into_iter().enumerate() {
                        if i != keep {
                            fix.bury(id);
                        }
                    }
                }
                Violation::CounterAnnihilation { object, pairs } => fix.annihilate.push((object, pairs)),
                Violation::TokenOutsideBattlefield(id) => fix.cease.push(id),
            }
        }

        if !fix.losses.is_empty() {
            self.apply_losses(&fix.losses);
            if self.state.is_over() {
                return Ok(());
            }
        }
        let buried: BTreeSet<ObjectId> = fix.to_graveyard.iter().copied().collect();
        for (object, pairs) in fix.annihilate {
            if buried.contains(&object) {
                continue;
            }
            self.remove_counters(object, CounterKind::PlusOne, pairs)?;
            self.remove_counters(object, CounterKind::MinusOne, pairs)?;
        }
        for id in fix.to_graveyard {
            if self.state.object(id).is_some() {
                self.move_object(id, ZoneKind::Graveyard, None)?;
            }
        }
        for id in fix.cease {
            if self.state.object(id).is_some() {
                self.state.cease_to_exist(id)?;
            }
        }
        Ok(())
    }

    fn apply_losses(&mut self, losses: &[(PlayerId, LossReason)]) {
        for &(player, reason) in losses {
            let state = self.state.player_mut(player);
            if state.lost.is_some() {
                continue;
            }
            state.lost = Some(reason);
            info!(%player, %reason, "player lost");
            self.state.record(TransitionRecord::PlayerLost { player, reason });
        }
        let alive: Vec<PlayerId> = self
            .state
            .players
            .iter()
            .filter(|(_, p)| p.is_alive())
            .map(|(player, _)| player)
            .collect();
        match alive.as_slice() {
            [] => self.finish(None, EndReason::Draw),
            [winner] => {
                let reason = losses.first().map_or(EndReason::LifeLoss, |(_, r)| EndReason::from(*r));
                self.finish(Some(*winner), reason);
            }
            _ => {}
        }
    }

    /// Put every pending trigger on the stack in APNAP order. Returns how
    /// many were stacked.
    pub fn stack_pending_triggers(&mut self) -> EngineResult<usize> {
        if self.state.pending.is_empty() {
            return Ok(0);
        }
        let pending = std::mem::take(&mut self.state.pending);
        let groups = group_apnap(pending, self.state.order, self.state.active_player());
        let mut stacked = 0;
        for (controller, group) in groups {
            let group = if group.len() > 1 {
                let names: Vec<String> = group.iter().map(|t| t.source_name.clone()).collect();
                let order = self
                    .decisions
                    .order(&self.state, controller, OrderKind::Triggers, &names)?;
                let mut slots: Vec<Option<PendingTrigger>> = group.into_iter().map(Some).collect();
                order
                    .iter()
                    .filter_map(|&i| slots.get_mut(i).and_then(Option::take))
                    .collect()
            } else {
                group
            };
            for trigger in group {
                if self.push_trigger(trigger)? {
                    stacked += 1;
                }
            }
        }
        Ok(stacked)
    }

    fn push_trigger(&mut self, trigger: PendingTrigger) -> EngineResult<bool> {
        let PendingTrigger {
            registration,
            source,
            source_name,
            controller,
            ability,
            source_lki,
            triggering,
            triggering_lki,
        } = trigger;
        let guard_holds = ability
            .guard
            .as_ref()
            .map_or(true, |guard| guard.holds(&self.state, controller, source));
        let targets = if guard_holds {
            self.decisions.targets(&self.state, controller, source, &ability.targets)?
        } else {
            None
        };
        let Some(targets) = targets else {
            debug!(%source, %controller, "trigger discarded");
            self.state.record(TransitionRecord::TriggerDiscarded { source, controller });
            return Ok(false);
        };

        let entry = StackEntry::new(EntryKind::Triggered { registration }, source_name, source, controller)
            .with_effects(ability.effects)
            .with_targets(ability.targets, targets)
            .with_source_lki(Some(source_lki))
            .with_triggering(triggering, triggering_lki);
        let state = &mut self.state;
        let entry = state.stack.push(entry, &mut state.ids);
        self.state
            .record(TransitionRecord::TriggerStacked { entry, source, controller });
        Ok(true)
    }
}
