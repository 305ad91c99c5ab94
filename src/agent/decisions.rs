//! Asking agents and checking their answers.

use std::collections::BTreeSet;

use tracing::trace;

use super::{Agent, ChoiceKind, GameView, OrderKind};
use crate::core::{Action, EngineResult, GameState, ObjectId, PlayerId, ReplacementId};
use crate::effects::{Target, TargetSpec};
use crate::replacement::{ReplaceableEvent, ReplacementChooser};
use crate::rules::{validate_assignment, Block, BlockOption, DamageAssignment, DamageRequest};

/// One agent per seat, with every answer validated against what was
/// offered.
pub struct Decisions {
    agents: Vec<Box<dyn Agent>>,
}

impl std::fmt::Debug for Decisions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decisions").field("seats", &self.agents.len()).finish()
    }
}

impl Decisions {
    #[must_use]
    pub fn new(agents: Vec<Box<dyn Agent>>) -> Self {
        Self { agents }
    }

    #[must_use]
    pub fn seats(&self) -> usize {
        self.agents.len()
    }

    fn agent(&mut self, state: &GameState, player: PlayerId) -> EngineResult<&mut Box<dyn Agent>> {
        let turn = state.turn_number();
        self.agents
            .get_mut(player.index())
            .ok_or_else(|| crate::core::EngineError::invariant(turn, format!("no agent seated for {player}")))
    }

    /// A priority action from `legal`.
    pub fn action(&mut self, state: &GameState, player: PlayerId, legal: &[Action]) -> EngineResult<Action> {
        let view = GameView::new(state, player);
        let action = self.agent(state, player)?.choose_action(&view, legal);
        if !legal.contains(&action) {
            return Err(state.illegal_choice(player, format!("{action} was not offered")));
        }
        trace!(%player, %action, "action chosen");
        Ok(action)
    }

    /// Targets for an entry with requirements `specs`. `None` when some
    /// requirement has no legal candidate.
    pub fn targets(
        &mut self,
        state: &GameState,
        player: PlayerId,
        source: ObjectId,
        specs: &[TargetSpec],
    ) -> EngineResult<Option<Vec<Target>>> {
        if specs.is_empty() {
            return Ok(Some(Vec::new()));
        }
        let ctx = state.filter_context(player, Some(source));
        let candidates: Vec<Vec<Target>> = specs.iter().map(|s| s.candidates(state, &ctx)).collect();
        if candidates.iter().any(Vec::is_empty) {
            return Ok(None);
        }
        let view = GameView::new(state, player);
        let chosen = self.agent(state, player)?.choose_targets(&view, source, &candidates);
        if chosen.len() != specs.len() {
            return Err(state.illegal_choice(
                player,
                format!("{} targets chosen for {} requirements", chosen.len(), specs.len()),
            ));
        }
        for (i, target) in chosen.iter().enumerate() {
            if !candidates[i].contains(target) {
                return Err(state.illegal_choice(player, format!("{target} is not a legal choice for target {i}")));
            }
        }
        Ok(Some(chosen))
    }

    /// Attackers drawn from `candidates`.
    pub fn attackers(&mut self, state: &GameState, player: PlayerId, candidates: &[ObjectId]) -> EngineResult<Vec<ObjectId>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }
        let view = GameView::new(state, player);
        let chosen = self.agent(state, player)?.choose_attackers(&view, candidates);
        let mut seen = BTreeSet::new();
        for id in &chosen {
            if !candidates.contains(id) || !seen.insert(*id) {
                return Err(state.illegal_choice(player, format!("{id} cannot be declared as an attacker")));
            }
        }
        Ok(chosen)
    }

    /// Blocks whose pairs all come from `options`. Whole-declaration rules
    /// are the caller's concern.
    pub fn blockers(&mut self, state: &GameState, player: PlayerId, options: &[BlockOption]) -> EngineResult<Vec<Block>> {
        if options.is_empty() {
            return Ok(Vec::new());
        }
        let view = GameView::new(state, player);
        let chosen = self.agent(state, player)?.choose_blockers(&view, options);
        for block in &chosen {
            let offered = options
                .iter()
                .any(|o| o.blocker == block.blocker && o.attackers.contains(&block.attacker));
            if !offered {
                return Err(state.illegal_choice(
                    player,
                    format!("{} cannot block {}", block.blocker, block.attacker),
                ));
            }
        }
        Ok(chosen)
    }

    /// A permutation of `items`.
    pub fn order(&mut self, state: &GameState, player: PlayerId, kind: OrderKind, items: &[String]) -> EngineResult<Vec<usize>> {
        if items.len() < 2 {
            return Ok((0..items.len()).collect());
        }
        let view = GameView::new(state, player);
        let order = self.agent(state, player)?.choose_order(&view, kind, items);
        let mut sorted = order.clone();
        sorted.sort_unstable();
        if sorted != (0..items.len()).collect::<Vec<_>>() {
            return Err(state.illegal_choice(player, format!("{order:?} is not an ordering of {} items", items.len())));
        }
        Ok(order)
    }

    /// A combat damage split satisfying the assignment rules.
    pub fn damage(&mut self, state: &GameState, player: PlayerId, request: &DamageRequest) -> EngineResult<DamageAssignment> {
        let view = GameView::new(state, player);
        let assignment = self.agent(state, player)?.assign_combat_damage(&view, request);
        validate_assignment(request, &assignment)
            .map_err(|e| state.illegal_choice(player, format!("damage assignment for {}: {e}", request.attacker)))?;
        Ok(assignment)
    }

    /// An index into `options`.
    pub fn option(&mut self, state: &GameState, player: PlayerId, kind: ChoiceKind, options: &[String]) -> EngineResult<usize> {
        if options.len() < 2 {
            return Ok(0);
        }
        let view = GameView::new(state, player);
        let index = self.agent(state, player)?.choose_option(&view, kind, options);
        if index >= options.len() {
            return Err(state.illegal_choice(player, format!("option {index} of {}", options.len())));
        }
        Ok(index)
    }
}

impl ReplacementChooser for Decisions {
    fn choose_replacement(
        &mut self,
        state: &GameState,
        player: PlayerId,
        _event: &ReplaceableEvent,
        options: &[ReplacementId],
    ) -> EngineResult<ReplacementId> {
        let names: Vec<String> = options
            .iter()
            .map(|id| {
                let source = state.replacements.get(*id).map(|r| r.source);
                let name = source
                    .and_then(|s| state.snapshot(s))
                    .map_or_else(|| "unknown".to_string(), |l| l.characteristics.name);
                format!("{name} ({id})")
            })
            .collect();
        let index = self.option(state, player, ChoiceKind::Replacement, &names)?;
        options
            .get(index)
            .copied()
            .ok_or_else(|| state.invariant("replacement choice with no options"))
    }
}
