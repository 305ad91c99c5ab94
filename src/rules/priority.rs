//! Priority protocol.
//!
//! A round tracks who holds priority and which players have passed in
//! succession since the last action. When every player has passed, the
//! round reports `AllPassed` and the caller either resolves the top of the
//! stack or ends the step.
//!
//! Rotation always goes through [`TurnOrder`], never "the other player".
//!
//! ```
//! use duel_rules::core::{PlayerId, TurnOrder};
//! use duel_rules::rules::{PassOutcome, PriorityRound};
//!
//! let active = PlayerId::new(0);
//! let mut round = PriorityRound::new(TurnOrder::new(2), active);
//! assert_eq!(round.pass(active).unwrap(), PassOutcome::Continue);
//! assert_eq!(round.holder(), PlayerId::new(1));
//! assert_eq!(round.pass(PlayerId::new(1)).unwrap(), PassOutcome::AllPassed);
//! ```

use std::collections::BTreeSet;

use crate::core::{PlayerId, TurnOrder};

/// Result of a pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassOutcome {
    /// Every player has passed in succession.
    AllPassed,
    /// Priority moved to the next player.
    Continue,
}

/// Protocol misuse by the caller.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PriorityError {
    #[error("{player} passed while {holder} holds priority")]
    NotHolder { player: PlayerId, holder: PlayerId },
}

/// State of one priority round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriorityRound {
    order: TurnOrder,
    active: PlayerId,
    holder: PlayerId,
    passed: BTreeSet<PlayerId>,
    rejections: u32,
}

impl PriorityRound {
    /// Start a round with the active player holding priority.
    #[must_use]
    pub fn new(order: TurnOrder, active: PlayerId) -> Self {
        Self {
            order,
            active,
            holder: active,
            passed: BTreeSet::new(),
            rejections: 0,
        }
    }

    /// Player holding priority.
    #[must_use]
    pub fn holder(&self) -> PlayerId {
        self.holder
    }

    /// Players who have passed since the last action.
    #[must_use]
    pub fn passed(&self) -> &BTreeSet<PlayerId> {
        &self.passed
    }

    /// Give priority to `player` and forget earlier passes.
    pub fn give(&mut self, player: PlayerId) {
        self.holder = player;
        self.passed.clear();
        self.rejections = 0;
    }

    fn check_holder(&self, player: PlayerId) -> Result<(), PriorityError> {
        if player == self.holder {
            Ok(())
        } else {
            Err(PriorityError::NotHolder {
                player,
                holder: self.holder,
            })
        }
    }

    /// The holder passes.
    pub fn pass(&mut self, player: PlayerId) -> Result<PassOutcome, PriorityError> {
        self.check_holder(player)?;
        self.rejections = 0;
        self.passed.insert(player);
        if self.passed.len() >= self.order.player_count() {
            return Ok(PassOutcome::AllPassed);
        }
        self.holder = self.order.next(player);
        Ok(PassOutcome::Continue)
    }

    /// A player took an action (or an entry resolved): passes reset and the
    /// active player receives priority.
    pub fn action_taken(&mut self, _player: PlayerId) {
        self.give(self.active);
    }

    /// The holder's action was rejected when it was carried out. A rejection
    /// is not a pass: returns `true` while the holder should be asked again,
    /// and `false` once `limit` rejections in a row are used up.
    pub fn rejected(&mut self, player: PlayerId, limit: u32) -> Result<bool, PriorityError> {
        self.check_holder(player)?;
        self.rejections += 1;
        Ok(self.rejections < limit.max(1))
    }
}
