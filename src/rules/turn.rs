//! Turn structure.
//!
//! A turn is an ordered list of phases, each an ordered list of steps. The
//! structure is data: the sequencer walks [`TURN_STRUCTURE`] and asks each
//! step whether it grants priority.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// Phases of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Beginning,
    PrecombatMain,
    Combat,
    PostcombatMain,
    Ending,
}

/// Steps of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Step {
    Untap,
    Upkeep,
    Draw,
    PrecombatMain,
    BeginCombat,
    DeclareAttackers,
    DeclareBlockers,
    /// Exists only when a combatant has first strike or double strike.
    FirstStrikeDamage,
    CombatDamage,
    EndCombat,
    PostcombatMain,
    End,
    Cleanup,
}

impl Step {
    /// Whether players normally receive priority during this step.
    #[must_use]
    pub const fn grants_priority(self) -> bool {
        !matches!(self, Step::Untap | Step::Cleanup)
    }

    #[must_use]
    pub const fn is_main(self) -> bool {
        matches!(self, Step::PrecombatMain | Step::PostcombatMain)
    }

    /// Steps that only happen when attackers were declared.
    #[must_use]
    pub const fn needs_attackers(self) -> bool {
        matches!(
            self,
            Step::DeclareBlockers | Step::FirstStrikeDamage | Step::CombatDamage
        )
    }

    /// Phase containing this step.
    #[must_use]
    pub const fn phase(self) -> Phase {
        match self {
            Step::Untap | Step::Upkeep | Step::Draw => Phase::Beginning,
            Step::PrecombatMain => Phase::PrecombatMain,
            Step::BeginCombat
            | Step::DeclareAttackers
            | Step::DeclareBlockers
            | Step::FirstStrikeDamage
            | Step::CombatDamage
            | Step::EndCombat => Phase::Combat,
            Step::PostcombatMain => Phase::PostcombatMain,
            Step::End | Step::Cleanup => Phase::Ending,
        }
    }
}

impl Step {
    /// Whether this is the first step of its phase.
    #[must_use]
    pub fn starts_phase(self) -> bool {
        TURN_STRUCTURE.iter().any(|p| p.steps.first() == Some(&self))
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// One phase and its steps.
#[derive(Clone, Copy, Debug)]
pub struct PhaseSpec {
    pub phase: Phase,
    pub steps: &'static [Step],
}

/// The fixed turn structure.
pub const TURN_STRUCTURE: [PhaseSpec; 5] = [
    PhaseSpec {
        phase: Phase::Beginning,
        steps: &[Step::Untap, Step::Upkeep, Step::Draw],
    },
    PhaseSpec {
        phase: Phase::PrecombatMain,
        steps: &[Step::PrecombatMain],
    },
    PhaseSpec {
        phase: Phase::Combat,
        steps: &[
            Step::BeginCombat,
            Step::DeclareAttackers,
            Step::DeclareBlockers,
            Step::FirstStrikeDamage,
            Step::CombatDamage,
            Step::EndCombat,
        ],
    },
    PhaseSpec {
        phase: Phase::PostcombatMain,
        steps: &[Step::PostcombatMain],
    },
    PhaseSpec {
        phase: Phase::Ending,
        steps: &[Step::End, Step::Cleanup],
    },
];

/// Every step of a turn, in order.
pub fn turn_steps() -> impl Iterator<Item = Step> {
    TURN_STRUCTURE.iter().flat_map(|phase| phase.steps.iter().copied())
}

/// Turn number, active player and current step, passed explicitly to every
/// sequencer-invoked function.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnContext {
    pub number: u32,
    pub active: PlayerId,
    pub step: Step,
}

impl TurnContext {
    /// Context before the first turn starts.
    #[must_use]
    pub fn pregame(first: PlayerId) -> Self {
        Self {
            number: 0,
            active: first,
            step: Step::Untap,
        }
    }

    /// Same turn, another step.
    #[must_use]
    pub fn at(self, step: Step) -> Self {
        Self { step, ..self }
    }
}
