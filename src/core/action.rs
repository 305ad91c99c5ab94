//! Player actions and their outcomes.
//!
//! An `Action` is what a player does while holding priority. Choices made
//! after an action is picked (targets, cost payment) are separate requests.
//!
//! ## Example
//!
//! ```
//! use duel_rules::core::{Action, ActionOutcome, ObjectId, RejectReason};
//!
//! let cast = Action::CastSpell { card: ObjectId(12) };
//! assert!(!cast.is_pass());
//! assert_eq!(format!("{}", cast), "cast Object(12)");
//!
//! let outcome = ActionOutcome::Rejected(RejectReason::CannotPay { missing: 2 });
//! assert!(!outcome.is_accepted());
//! ```

use serde::{Deserialize, Serialize};

use super::ids::ObjectId;

/// A priority action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Action {
    Pass,
    /// Play a land from hand. Does not use the stack.
    PlayLand { card: ObjectId },
    /// Cast a spell from hand.
    CastSpell { card: ObjectId },
    /// Activate the `ability`-th printed ability of a permanent.
    ActivateAbility { source: ObjectId, ability: usize },
}

impl Action {
    #[must_use]
    pub fn is_pass(self) -> bool {
        matches!(self, Action::Pass)
    }

    /// Object the action is about, if any.
    #[must_use]
    pub fn object(self) -> Option<ObjectId> {
        match self {
            Action::Pass => None,
            Action::PlayLand { card } | Action::CastSpell { card } => Some(card),
            Action::ActivateAbility { source, .. } => Some(source),
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Pass => write!(f, "pass"),
            Action::PlayLand { card } => write!(f, "play {card}"),
            Action::CastSpell { card } => write!(f, "cast {card}"),
            Action::ActivateAbility { source, ability } => write!(f, "activate {source}#{ability}"),
        }
    }
}

/// Why an attempted action did not happen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RejectReason {
    #[error("not allowed at this time")]
    WrongTiming,
    #[error("a land was already played this turn")]
    LandAlreadyPlayed,
    #[error("cost cannot be paid, {missing} mana short")]
    CannotPay { missing: u32 },
    #[error("the source cannot pay its tap cost")]
    CannotTap,
    #[error("no legal target for requirement {requirement}")]
    NoLegalTargets { requirement: usize },
    #[error("object is not where the action needs it")]
    NotAvailable,
}

/// Result of an attempted action. Rejection is a normal outcome, not an
/// error.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    Accepted,
    Rejected(RejectReason),
}

impl ActionOutcome {
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, ActionOutcome::Accepted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_object() {
        assert_eq!(Action::Pass.object(), None);
        assert_eq!(
            Action::ActivateAbility { source: ObjectId(3), ability: 1 }.object(),
            Some(ObjectId(3))
        );
    }

    #[test]
    fn test_action_serialization() {
        let action = Action::PlayLand { card: ObjectId(5) };
        let json = serde_json::to_string(&action).unwrap();
        let back: Action = serde_json::from_str(&json).unwrap();
        assert_eq!(back, action);
    }

    #[test]
    fn test_reject_reason_display() {
        let reason = RejectReason::CannotPay { missing: 1 };
        assert_eq!(reason.to_string(), "cost cannot be paid, 1 mana short");
    }
}
