//! Decision-making collaborators.
//!
//! The engine never decides anything on a player's behalf. Whenever a
//! choice is needed it builds a [`GameView`] for that player, offers the
//! legal options, and asks the player's [`Agent`]. Answers are checked by
//! [`Decisions`]; anything outside the offered set aborts the match with
//! [`EngineError::IllegalChoice`](crate::core::EngineError).
//!
//! ## Key Types
//!
//! - `Agent`: the trait; only `choose_action` has no default
//! - `GameView`: visibility-filtered snapshot handed to agents
//! - `Decisions`: per-seat agents plus answer validation
//! - `PassingAgent`, `RandomAgent`, `ScriptedAgent`: built-in agents

mod builtin;
mod decisions;
mod view;

pub use builtin::{PassingAgent, RandomAgent, ScriptedAgent};
pub use decisions::Decisions;
pub use view::{GameView, ObjectView, PlayerView, StackView};

use crate::core::{Action, ObjectId};
use crate::effects::Target;
use crate::rules::{greedy_assignment, Block, BlockOption, DamageAssignment, DamageRequest};

/// What an ordering request is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OrderKind {
    /// Simultaneous triggers controlled by one player. Earlier in the
    /// answer goes on the stack first.
    Triggers,
    /// Blockers of one attacker, in damage assignment order.
    Blockers,
}

/// What a single-option request is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChoiceKind {
    /// Which replacement effect applies next.
    Replacement,
    /// Which legendary permanent stays.
    LegendRule,
    /// Which card to discard.
    Discard,
}

/// A player in the match.
///
/// Every method receives a fresh snapshot. Defaults take the first option,
/// declare nothing, keep the offered order and assign combat damage
/// greedily.
pub trait Agent: Send {
    /// Pick one of `legal`. `Action::Pass` is always offered.
    fn choose_action(&mut self, view: &GameView, legal: &[Action]) -> Action;

    /// One target per requirement, each taken from that requirement's
    /// candidates.
    fn choose_targets(&mut self, _view: &GameView, _source: ObjectId, candidates: &[Vec<Target>]) -> Vec<Target> {
        candidates.iter().filter_map(|c| c.first().copied()).collect()
    }

    /// A subset of `candidates` to attack with.
    fn choose_attackers(&mut self, _view: &GameView, _candidates: &[ObjectId]) -> Vec<ObjectId> {
        Vec::new()
    }

    /// Blocks drawn from `options`.
    fn choose_blockers(&mut self, _view: &GameView, _options: &[BlockOption]) -> Vec<Block> {
        Vec::new()
    }

    /// A permutation of `0..items.len()`.
    fn choose_order(&mut self, _view: &GameView, _kind: OrderKind, items: &[String]) -> Vec<usize> {
        (0..items.len()).collect()
    }

    /// Split an attacker's combat damage.
    fn assign_combat_damage(&mut self, _view: &GameView, request: &DamageRequest) -> DamageAssignment {
        greedy_assignment(request)
    }

    /// An index into `options`.
    fn choose_option(&mut self, _view: &GameView, _kind: ChoiceKind, _options: &[String]) -> usize {
        0
    }
}
