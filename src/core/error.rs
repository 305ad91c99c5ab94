//! Engine error taxonomy.
//!
//! Only two kinds of failure abort a match:
//!
//! - [`EngineError::IllegalChoice`]: an agent answered with something that
//!   was not on offer. The agent broke its contract.
//! - [`EngineError::Invariant`]: the engine itself reached an impossible
//!   state (resolving an empty stack, removing an object twice).
//!
//! Ordinary rules outcomes such as a fizzled spell or a rejected block are
//! values, never errors.

use super::player::PlayerId;

/// A failure that terminates the current match.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// An agent returned an action, target, order or assignment outside the
    /// currently legal set.
    #[error("{player} made an illegal choice on turn {turn}: {detail}")]
    IllegalChoice {
        player: PlayerId,
        turn: u32,
        detail: String,
    },
    /// An internal consistency check failed.
    #[error("rules invariant violated on turn {turn}: {detail}")]
    Invariant { turn: u32, detail: String },
}

impl EngineError {
    /// Build an illegal-choice error.
    pub fn illegal_choice(player: PlayerId, turn: u32, detail: impl Into<String>) -> Self {
        Self::IllegalChoice {
            player,
            turn,
            detail: detail.into(),
        }
    }

    /// Build an invariant-violation error.
    pub fn invariant(turn: u32, detail: impl Into<String>) -> Self {
        Self::Invariant {
            turn,
            detail: detail.into(),
        }
    }

    /// True when an agent, not the engine, is at fault.
    #[must_use]
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::IllegalChoice { .. })
    }

    /// Turn at which the failure was detected.
    #[must_use]
    pub fn turn(&self) -> u32 {
        match self {
            Self::IllegalChoice { turn, .. } | Self::Invariant { turn, .. } => *turn,
        }
    }
}

/// Result alias used throughout the engine.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_turn() {
        let err = EngineError::illegal_choice(PlayerId::new(1), 4, "index 9 of 3");
        assert_eq!(err.to_string(), "Player 1 made an illegal choice on turn 4: index 9 of 3");
        assert!(err.is_contract_violation());

        let err = EngineError::invariant(2, "stack is empty");
        assert_eq!(err.turn(), 2);
        assert!(!err.is_contract_violation());
    }
}
