//! Built-in agents.

use std::collections::VecDeque;

use tracing::trace;

use super::{Agent, ChoiceKind, GameView, OrderKind};
use crate::core::{Action, GameRng, ObjectId};
use crate::effects::Target;
use crate::rules::{greedy_assignment, Block, BlockOption, DamageAssignment, DamageRequest};

/// Passes every time and otherwise takes the defaults.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassingAgent;

impl Agent for PassingAgent {
    fn choose_action(&mut self, _view: &GameView, _legal: &[Action]) -> Action {
        Action::Pass
    }
}

/// Picks uniformly among the offered options from a seeded stream.
#[derive(Clone, Debug)]
pub struct RandomAgent {
    rng: GameRng,
    /// Probability of attacking with each candidate.
    pub aggression: f64,
}

impl RandomAgent {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
            aggression: 0.5,
        }
    }

    #[must_use]
    pub fn from_rng(rng: GameRng) -> Self {
        Self { rng, aggression: 0.5 }
    }
}

impl Agent for RandomAgent {
    fn choose_action(&mut self, _view: &GameView, legal: &[Action]) -> Action {
        if legal.is_empty() {
            return Action::Pass;
        }
        legal[self.rng.below(legal.len())]
    }

    fn choose_targets(&mut self, _view: &GameView, _source: ObjectId, candidates: &[Vec<Target>]) -> Vec<Target> {
        candidates
            .iter()
            .filter(|c| !c.is_empty())
            .map(|c| c[self.rng.below(c.len())])
            .collect()
    }

    fn choose_attackers(&mut self, _view: &GameView, candidates: &[ObjectId]) -> Vec<ObjectId> {
        let aggression = self.aggression;
        candidates
            .iter()
            .copied()
            .filter(|_| self.rng.chance(aggression))
            .collect()
    }

    fn choose_blockers(&mut self, _view: &GameView, options: &[BlockOption]) -> Vec<Block> {
        let mut blocks = Vec::new();
        for option in options {
            if option.attackers.is_empty() || !self.rng.chance(0.5) {
                continue;
            }
            let attacker = option.attackers[self.rng.below(option.attackers.len())];
            blocks.push(Block {
                blocker: option.blocker,
                attacker,
            });
        }
        blocks
    }

    fn choose_order(&mut self, _view: &GameView, _kind: OrderKind, items: &[String]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..items.len()).collect();
        self.rng.shuffle(&mut order);
        order
    }

    fn choose_option(&mut self, _view: &GameView, _kind: ChoiceKind, options: &[String]) -> usize {
        if options.is_empty() {
            0
        } else {
            self.rng.below(options.len())
        }
    }
}

/// Replays queued answers.
///
/// A queued action is used at the first priority where it is legal; until
/// then the agent passes. Every other queue is consumed in order and falls
/// back to the trait default when empty.
#[derive(Clone, Debug, Default)]
pub struct ScriptedAgent {
    actions: VecDeque<Action>,
    targets: VecDeque<Vec<Target>>,
    attackers: VecDeque<Vec<ObjectId>>,
    blockers: VecDeque<Vec<Block>>,
    orders: VecDeque<Vec<usize>>,
    assignments: VecDeque<DamageAssignment>,
    options: VecDeque<usize>,
}

impl ScriptedAgent {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn then_action(mut self, action: Action) -> Self {
        self.actions.push_back(action);
        self
    }

    #[must_use]
    pub fn then_targets(mut self, targets: Vec<Target>) -> Self {
        self.targets.push_back(targets);
        self
    }

    #[must_use]
    pub fn then_attack(mut self, attackers: Vec<ObjectId>) -> Self {
        self.attackers.push_back(attackers);
        self
    }

    #[must_use]
    pub fn then_block(mut self, blocks: Vec<Block>) -> Self {
        self.blockers.push_back(blocks);
        self
    }

    #[must_use]
    pub fn then_order(mut self, order: Vec<usize>) -> Self {
        self.orders.push_back(order);
        self
    }

    #[must_use]
    pub fn then_assign(mut self, assignment: DamageAssignment) -> Self {
        self.assignments.push_back(assignment);
        self
    }

    #[must_use]
    pub fn then_option(mut self, index: usize) -> Self {
        self.options.push_back(index);
        self
    }

    /// Queued actions not yet used.
    #[must_use]
    pub fn pending_actions(&self) -> usize {
        self.actions.len()
    }
}

impl Agent for ScriptedAgent {
    fn choose_action(&mut self, _view: &GameView, legal: &[Action]) -> Action {
        match self.actions.front() {
            Some(next) if legal.contains(next) => {
                trace!(action = %next, "scripted action");
                self.actions.pop_front().unwrap_or(Action::Pass)
            }
            _ => Action::Pass,
        }
    }

    fn choose_targets(&mut self, _view: &GameView, _source: ObjectId, candidates: &[Vec<Target>]) -> Vec<Target> {
        self.targets
            .pop_front()
            .unwrap_or_else(|| candidates.iter().filter_map(|c| c.first().copied()).collect())
    }

    fn choose_attackers(&mut self, _view: &GameView, _candidates: &[ObjectId]) -> Vec<ObjectId> {
        self.attackers.pop_front().unwrap_or_default()
    }

    fn choose_blockers(&mut self, _view: &GameView, _options: &[BlockOption]) -> Vec<Block> {
        self.blockers.pop_front().unwrap_or_default()
    }

    fn choose_order(&mut self, _view: &GameView, _kind: OrderKind, items: &[String]) -> Vec<usize> {
        self.orders
            .pop_front()
            .unwrap_or_else(|| (0..items.len()).collect())
    }

    fn assign_combat_damage(&mut self, _view: &GameView, request: &DamageRequest) -> DamageAssignment {
        self.assignments
            .pop_front()
            .unwrap_or_else(|| greedy_assignment(request))
    }

    fn choose_option(&mut self, _view: &GameView, _kind: ChoiceKind, _options: &[String]) -> usize {
        self.options.pop_front().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{GameState, MatchConfig, PlayerId};

    fn view() -> GameView {
        GameView::new(&GameState::new(MatchConfig::default()), PlayerId::new(0))
    }

    #[test]
    fn test_scripted_waits_until_legal() {
        let cast = Action::CastSpell { card: ObjectId(4) };
        let mut agent = ScriptedAgent::new().then_action(cast);
        assert_eq!(agent.choose_action(&view(), &[Action::Pass]), Action::Pass);
        assert_eq!(agent.pending_actions(), 1);
        assert_eq!(agent.choose_action(&view(), &[Action::Pass, cast]), cast);
        assert_eq!(agent.pending_actions(), 0);
    }

    #[test]
    fn test_random_agent_is_reproducible() {
        let legal: Vec<Action> = (0..6).map(|i| Action::CastSpell { card: ObjectId(i) }).collect();
        let mut a = RandomAgent::new(11);
        let mut b = RandomAgent::new(11);
        for _ in 0..20 {
            assert_eq!(a.choose_action(&view(), &legal), b.choose_action(&view(), &legal));
        }
    }

    #[test]
    fn test_random_order_is_permutation() {
        let mut agent = RandomAgent::new(3);
        let items: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        let mut order = agent.choose_order(&view(), OrderKind::Triggers, &items);
        order.sort_unstable();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }
}
