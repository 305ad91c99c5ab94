//! Combat damage assignment.
//!
//! An attacker blocked by several creatures assigns damage along its
//! blocker order: a later blocker receives damage only once every earlier
//! blocker has been assigned its lethal threshold. With trample, damage
//! beyond the sum of thresholds may go to the defending player. Deathtouch
//! lowers each threshold to one.
//!
//! Thresholds ignore prevention: a blocker under a prevention shield still
//! counts as having been assigned lethal damage, and the prevention is
//! applied afterwards when the damage is dealt.
//!
//! ## Example
//!
//! ```
//! use duel_rules::core::ObjectId;
//! use duel_rules::rules::{greedy_assignment, lethal_threshold, BlockerSlot, DamageRequest};
//!
//! let request = DamageRequest {
//!     attacker: ObjectId(1),
//!     power: 5,
//!     trample: true,
//!     blockers: vec![BlockerSlot { blocker: ObjectId(2), lethal: lethal_threshold(4, true) }],
//! };
//! let assignment = greedy_assignment(&request);
//! assert_eq!(assignment.to_blockers, vec![1]);
//! assert_eq!(assignment.to_player, 4);
//! ```

use serde::{Deserialize, Serialize};

use crate::core::ObjectId;

/// Damage needed to count as lethal for a creature with `remaining`
/// toughness left.
#[must_use]
pub fn lethal_threshold(remaining: i32, deathtouch: bool) -> u32 {
    let remaining = remaining.max(0) as u32;
    if deathtouch {
        remaining.min(1)
    } else {
        remaining
    }
}

/// One blocker in the attacker's damage order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockerSlot {
    pub blocker: ObjectId,
    pub lethal: u32,
}

/// What the attacking player must split.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRequest {
    pub attacker: ObjectId,
    pub power: u32,
    pub trample: bool,
    /// In damage assignment order.
    pub blockers: Vec<BlockerSlot>,
}

/// A split of an attacker's damage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageAssignment {
    /// Parallel to `DamageRequest::blockers`.
    pub to_blockers: Vec<u32>,
    pub to_player: u32,
}

/// Why an assignment is not acceptable.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentError {
    #[error("assignment covers {given} blockers, expected {expected}")]
    WrongLength { given: usize, expected: usize },
    #[error("assigned {assigned} damage from a {power}-power attacker")]
    WrongTotal { assigned: u32, power: u32 },
    #[error("blocker {index} received damage before earlier blockers were assigned lethal")]
    OutOfOrder { index: usize },
    #[error("damage assigned to the player without trample or before all blockers had lethal")]
    IllegalExcess,
}

/// Lethal to each blocker in order, the rest to the last blocker, or to
/// the player when trampling.
#[must_use]
pub fn greedy_assignment(request: &DamageRequest) -> DamageAssignment {
    let mut left = request.power;
    let mut to_blockers = Vec::with_capacity(request.blockers.len());
    for slot in &request.blockers {
        let given = slot.lethal.min(left);
        to_blockers.push(given);
        left -= given;
    }
    let mut to_player = 0;
    if left > 0 {
        if request.trample || request.blockers.is_empty() {
            to_player = left;
        } else if let Some(last) = to_blockers.last_mut() {
            *last += left;
        }
    }
    DamageAssignment { to_blockers, to_player }
}

/// Check an assignment against the ordering and trample rules.
pub fn validate_assignment(request: &DamageRequest, assignment: &DamageAssignment) -> Result<(), AssignmentError> {
    if assignment.to_blockers.len() != request.blockers.len() {
        return Err(AssignmentError::WrongLength {
            given: assignment.to_blockers.len(),
            expected: request.blockers.len(),
        });
    }
    let assigned = assignment.to_blockers.iter().sum::<u32>() + assignment.to_player;
    if assigned != request.power {
        return Err(AssignmentError::WrongTotal {
            assigned,
            power: request.power,
        });
    }
    let mut all_lethal = true;
    for (index, (slot, &given)) in request.blockers.iter().zip(&assignment.to_blockers).enumerate() {
        if given > 0 && !all_lethal {
            return Err(AssignmentError::OutOfOrder { index });
        }
        all_lethal &= given >= slot.lethal;
    }
    if assignment.to_player > 0 && !request.blockers.is_empty() && !(request.trample && all_lethal) {
        return Err(AssignmentError::IllegalExcess);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(power: u32, trample: bool, lethals: &[u32]) -> DamageRequest {
        DamageRequest {
            attacker: ObjectId(1),
            power,
            trample,
            blockers: lethals
                .iter()
                .enumerate()
                .map(|(i, &lethal)| BlockerSlot {
                    blocker: ObjectId(10 + i as u32),
                    lethal,
                })
                .collect(),
        }
    }

    #[test]
    fn test_deathtouch_threshold_is_one() {
        assert_eq!(lethal_threshold(4, true), 1);
        assert_eq!(lethal_threshold(4, false), 4);
        assert_eq!(lethal_threshold(0, true), 0);
        assert_eq!(lethal_threshold(-2, false), 0);
    }

    #[test]
    fn test_greedy_without_trample_dumps_on_last_blocker() {
        let assignment = greedy_assignment(&request(7, false, &[2, 3]));
        assert_eq!(assignment.to_blockers, vec![2, 5]);
        assert_eq!(assignment.to_player, 0);
        assert!(validate_assignment(&request(7, false, &[2, 3]), &assignment).is_ok());
    }

    #[test]
    fn test_greedy_short_of_lethal() {
        let assignment = greedy_assignment(&request(3, true, &[2, 3]));
        assert_eq!(assignment.to_blockers, vec![2, 1]);
        assert_eq!(assignment.to_player, 0);
    }

    #[test]
    fn test_unblocked_goes_to_player() {
        let assignment = greedy_assignment(&request(4, false, &[]));
        assert_eq!(assignment.to_player, 4);
        assert!(validate_assignment(&request(4, false, &[]), &assignment).is_ok());
    }

    #[test]
    fn test_validation_rejects_skipping_order() {
        let req = request(4, false, &[2, 2]);
        let skip = DamageAssignment {
            to_blockers: vec![1, 3],
            to_player: 0,
        };
        assert_eq!(validate_assignment(&req, &skip), Err(AssignmentError::OutOfOrder { index: 1 }));
    }

    #[test]
    fn test_validation_rejects_excess_without_trample() {
        let req = request(5, false, &[2]);
        let excess = DamageAssignment {
            to_blockers: vec![2],
            to_player: 3,
        };
        assert_eq!(validate_assignment(&req, &excess), Err(AssignmentError::IllegalExcess));
        let trample = request(5, true, &[2]);
        assert!(validate_assignment(&trample, &excess).is_ok());
    }

    #[test]
    fn test_validation_checks_total() {
        let req = request(3, true, &[1]);
        let short = DamageAssignment {
            to_blockers: vec![1],
            to_player: 1,
        };
        assert_eq!(
            validate_assignment(&req, &short),
            Err(AssignmentError::WrongTotal { assigned: 2, power: 3 })
        );
    }
}
