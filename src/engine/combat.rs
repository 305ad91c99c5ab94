//! Combat declarations and damage.

use tracing::debug;

use super::Game;
use crate::agent::OrderKind;
use crate::core::{EngineResult, GameState, ObjectId};
use crate::effects::Target;
use crate::log::{Rejection, TransitionRecord};
use crate::objects::{GameObject, Keyword};
use crate::rules::{
    attack_candidates, block_options, lethal_threshold, validate_blocks, AttackingCreature, Block, BlockerSlot,
    CombatState, DamageAssignment, DamageRequest,
};
use crate::triggers::GameEvent;

/// One piece of combat damage, collected before any is dealt.
struct Hit {
    source: ObjectId,
    target: Target,
    amount: u32,
}

fn live(state: &GameState, id: ObjectId) -> Option<&GameObject> {
    state.object(id).filter(|o| o.is_on_battlefield())
}

impl Game {
    /// The active player declares attackers. Every attacker attacks the
    /// next player in turn order.
    pub fn declare_attackers(&mut self) -> EngineResult<()> {
        let active = self.state.active_player();
        let defender = self.state.opponent_of(active);
        let candidates = attack_candidates(&self.state);
        let chosen = self.decisions.attackers(&self.state, active, &candidates)?;

        let mut combat = self.state.combat.take().unwrap_or_default();
        for &attacker in &chosen {
            if !self.state.require(attacker)?.has_keyword(Keyword::Vigilance) {
                self.tap(attacker)?;
            }
            combat.attackers.push(AttackingCreature {
                attacker,
                defender,
                blocked: false,
                blockers: Vec::new(),
            });
            self.state.emit(GameEvent::AttackerDeclared {
                attacker,
                controller: active,
            });
        }
        self.state.combat = Some(combat);
        debug!(player = %active, count = chosen.len(), "attackers declared");
        self.state.record(TransitionRecord::AttackersDeclared {
            player: active,
            attackers: chosen,
        });
        Ok(())
    }

    /// The defending player declares blockers.
    ///
    /// A declaration that breaks a whole-declaration rule is logged and
    /// requested again, up to the configured number of attempts; after
    /// that the defender is treated as declaring no blocks.
    pub fn declare_blockers(&mut self) -> EngineResult<()> {
        let Some(mut combat) = self.state.combat.clone() else {
            return Ok(());
        };
        let active = self.state.active_player();
        let defender = self.state.opponent_of(active);
        let options = block_options(&self.state, &combat, defender);
        let attempts = self.state.config.max_declaration_attempts.max(1);

        let mut blocks: Vec<Block> = Vec::new();
        for attempt in 1..=attempts {
            let proposed = self.decisions.blockers(&self.state, defender, &options)?;
            match validate_blocks(&self.state, &proposed) {
                Ok(()) => {
                    blocks = proposed;
                    break;
                }
                Err(rejection) => {
                    debug!(player = %defender, attempt, %rejection, "block declaration rejected");
                    self.state.record(TransitionRecord::ActionRejected {
                        player: defender,
                        reason: Rejection::Declaration(rejection.to_string()),
                    });
                }
            }
        }

        for attacking in &mut combat.attackers {
            let mut blockers: Vec<ObjectId> = blocks
                .iter()
                .filter(|b| b.attacker == attacking.attacker)
                .map(|b| b.blocker)
                .collect();
            if blockers.len() > 1 {
                let names: Vec<String> = blockers
                    .iter()
                    .map(|id| self.state.object(*id).map_or_else(|| id.to_string(), |o| o.name().to_string()))
                    .collect();
                let order = self.decisions.order(&self.state, active, OrderKind::Blockers, &names)?;
                blockers = order.iter().filter_map(|&i| blockers.get(i).copied()).collect();
            }
            attacking.blocked = !blockers.is_empty();
            attacking.blockers = blockers;
        }
        for block in &blocks {
            self.state.emit(GameEvent::BlockerDeclared {
                blocker: block.blocker,
                attacker: block.attacker,
                controller: defender,
            });
        }
        self.state.combat = Some(combat);
        self.state.record(TransitionRecord::BlockersDeclared {
            player: defender,
            blocks: blocks.iter().map(|b| (b.blocker, b.attacker)).collect(),
        });
        Ok(())
    }

    /// Assign and deal combat damage for one damage step.
    ///
    /// All assignments are made first and then dealt together, so a
    /// creature destroyed by this damage still deals its own.
    pub fn combat_damage(&mut self, first_strike_pass: bool) -> EngineResult<()> {
        let Some(combat) = self.state.combat.clone() else {
            return Ok(());
        };
        let mut hits = Vec::new();
        let mut struck = Vec::new();

        for attacking in &combat.attackers {
            let Some(attacker) = live(&self.state, attacking.attacker) else {
                continue;
            };
            if !combat.deals_damage_now(attacker, first_strike_pass) {
                continue;
            }
            struck.push(attacker.id);
            let power = attacker.computed.power_or_zero().max(0) as u32;
            let controller = attacker.controller;
            let trample = attacker.has_keyword(Keyword::Trample);
            let deathtouch = attacker.has_keyword(Keyword::Deathtouch);
            let to_player = Target::Player(attacking.defender);
            if power == 0 {
                continue;
            }
            let blockers: Vec<&GameObject> = attacking.blockers.iter().filter_map(|&b| live(&self.state, b)).collect();
            if !attacking.blocked {
                hits.push(Hit {
                    source: attacker.id,
                    target: to_player,
                    amount: power,
                });
                continue;
            }
            if blockers.is_empty() {
                if trample {
                    hits.push(Hit {
                        source: attacker.id,
                        target: to_player,
                        amount: power,
                    });
                }
                continue;
            }

            let request = DamageRequest {
                attacker: attacker.id,
                power,
                trample,
                blockers: blockers
                    .iter()
                    .map(|b| BlockerSlot {
                        blocker: b.id,
                        lethal: lethal_threshold(b.remaining_toughness(), deathtouch),
                    })
                    .collect(),
            };
            let assignment = if request.blockers.len() == 1 && !trample {
                DamageAssignment {
                    to_blockers: vec![power],
                    to_player: 0,
                }
            } else {
                self.decisions.damage(&self.state, controller, &request)?
            };
            for (slot, &amount) in request.blockers.iter().zip(&assignment.to_blockers) {
                if amount > 0 {
                    hits.push(Hit {
                        source: request.attacker,
                        target: Target::Object(slot.blocker),
                        amount,
                    });
                }
            }
            if assignment.to_player > 0 {
                hits.push(Hit {
                    source: request.attacker,
                    target: to_player,
                    amount: assignment.to_player,
                });
            }
        }

        for attacking in &combat.attackers {
            for &blocker in &attacking.blockers {
                let Some(object) = live(&self.state, blocker) else {
                    continue;
                };
                if !combat.deals_damage_now(object, first_strike_pass) {
                    continue;
                }
                struck.push(blocker);
                let power = object.computed.power_or_zero().max(0) as u32;
                if power > 0 && live(&self.state, attacking.attacker).is_some() {
                    hits.push(Hit {
                        source: blocker,
                        target: Target::Object(attacking.attacker),
                        amount: power,
                    });
                }
            }
        }

        for hit in hits {
            self.deal_damage(hit.source, None, hit.target, hit.amount, true)?;
        }
        if first_strike_pass {
            if let Some(combat) = self.state.combat.as_mut() {
                combat.dealt_first_strike.extend(struck);
                combat.first_strike_step = true;
            }
        }
        Ok(())
    }

    /// Whether combat currently has attackers.
    #[must_use]
    pub fn in_combat(&self) -> bool {
        self.state.combat.as_ref().is_some_and(CombatState::has_attackers)
    }
}
