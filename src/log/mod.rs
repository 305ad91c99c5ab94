//! Append-only transition log.
//!
//! Every externally observable state change is appended as a
//! [`TransitionRecord`], stamped with a sequence number and the turn and
//! step in which it happened. The log never drives rules decisions; it
//! exists for replay consumers, observers and tests.
//!
//! ## Example
//!
//! ```
//! use duel_rules::core::{PlayerId, TurnContext};
//! use duel_rules::log::{TransitionLog, TransitionRecord};
//!
//! let mut log = TransitionLog::default();
//! let turn = TurnContext::pregame(PlayerId::new(0));
//! log.append(turn, TransitionRecord::LifeChange { player: PlayerId::new(1), delta: -3, total: 17 });
//! let bytes = log.encode().unwrap();
//! let decoded = TransitionLog::decode(&bytes).unwrap();
//! assert_eq!(decoded.len(), 1);
//! ```

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::{
    EndReason, LossReason, ModificationId, ObjectId, PlayerId, StackEntryId, TurnContext,
};
use crate::effects::Target;
use crate::objects::CounterKind;
use crate::rules::{Phase, Step};
use crate::zones::ZoneKind;

/// Why an action or declaration was turned down, as logged.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    Action(String),
    Declaration(String),
}

/// One discrete, externally observable state change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionRecord {
    TurnBegan {
        turn: u32,
        active: PlayerId,
    },
    PhaseBegan {
        phase: Phase,
    },
    StepBegan {
        step: Step,
    },
    /// An object moved between zones (or was created or ceased to exist).
    ZoneChange {
        object: ObjectId,
        new_object: Option<ObjectId>,
        name: String,
        from: Option<ZoneKind>,
        to: Option<ZoneKind>,
    },
    LifeChange {
        player: PlayerId,
        delta: i32,
        total: i32,
    },
    DamageDealt {
        source: ObjectId,
        target: Target,
        amount: u32,
        combat: bool,
    },
    DamagePrevented {
        source: ObjectId,
        target: Target,
        amount: u32,
    },
    Tapped {
        object: ObjectId,
    },
    Untapped {
        object: ObjectId,
    },
    CounterChange {
        object: ObjectId,
        kind: CounterKind,
        delta: i32,
    },
    PoisonChange {
        player: PlayerId,
        total: u32,
    },
    SpellCast {
        entry: StackEntryId,
        object: ObjectId,
        name: String,
        controller: PlayerId,
        targets: Vec<Target>,
    },
    AbilityActivated {
        entry: StackEntryId,
        source: ObjectId,
        controller: PlayerId,
        targets: Vec<Target>,
    },
    TriggerStacked {
        entry: StackEntryId,
        source: ObjectId,
        controller: PlayerId,
    },
    /// A queued trigger was dropped: its intervening-if condition no
    /// longer held, or it had no legal targets.
    TriggerDiscarded {
        source: ObjectId,
        controller: PlayerId,
    },
    Resolved {
        entry: StackEntryId,
    },
    Fizzled {
        entry: StackEntryId,
    },
    Countered {
        entry: StackEntryId,
    },
    ActionRejected {
        player: PlayerId,
        reason: Rejection,
    },
    AttackersDeclared {
        player: PlayerId,
        attackers: Vec<ObjectId>,
    },
    BlockersDeclared {
        player: PlayerId,
        blocks: Vec<(ObjectId, ObjectId)>,
    },
    ModificationExpired {
        modification: ModificationId,
        source: ObjectId,
    },
    PlayerLost {
        player: PlayerId,
        reason: LossReason,
    },
    GameEnded {
        winner: Option<PlayerId>,
        reason: EndReason,
        turn: u32,
    },
}

/// A record with its position in the stream.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggedTransition {
    pub seq: u64,
    pub turn: u32,
    pub step: Step,
    pub record: TransitionRecord,
}

/// Failure to encode or decode a log.
#[derive(Debug, thiserror::Error)]
#[error("transition log codec: {0}")]
pub struct LogCodecError(#[from] bincode::Error);

/// The append-only record stream of one match.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransitionLog {
    records: Vector<LoggedTransition>,
}

impl TransitionLog {
    /// Append a record at the given turn position.
    pub fn append(&mut self, turn: TurnContext, record: TransitionRecord) {
        let seq = self.records.len() as u64;
        self.records.push_back(LoggedTransition {
            seq,
            turn: turn.number,
            step: turn.step,
            record,
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LoggedTransition> {
        self.records.iter()
    }

    /// Records with sequence number `seq` or later.
    pub fn since(&self, seq: u64) -> impl Iterator<Item = &LoggedTransition> {
        self.records.iter().skip(seq as usize)
    }

    /// Just the records, in order.
    pub fn records(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.records.iter().map(|r| &r.record)
    }

    /// Encode for external replay consumers.
    pub fn encode(&self) -> Result<Vec<u8>, LogCodecError> {
        let records: Vec<&LoggedTransition> = self.records.iter().collect();
        Ok(bincode::serialize(&records)?)
    }

    /// Decode a stream produced by [`TransitionLog::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, LogCodecError> {
        let records: Vec<LoggedTransition> = bincode::deserialize(bytes)?;
        Ok(Self {
            records: records.into_iter().collect(),
        })
    }
}

/// Observer receiving records in order.
pub trait TransitionSink {
    fn observe(&mut self, transition: &LoggedTransition);
}

/// Sink that keeps everything it sees.
#[derive(Clone, Debug, Default)]
pub struct CollectingSink {
    pub seen: Vec<LoggedTransition>,
}

impl TransitionSink for CollectingSink {
    fn observe(&mut self, transition: &LoggedTransition) {
        self.seen.push(transition.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn() -> TurnContext {
        TurnContext {
            number: 3,
            active: PlayerId::new(1),
            step: Step::Upkeep,
        }
    }

    #[test]
    fn test_sequence_numbers_are_dense() {
        let mut log = TransitionLog::default();
        log.append(turn(), TransitionRecord::StepBegan { step: Step::Upkeep });
        log.append(turn(), TransitionRecord::Tapped { object: ObjectId(4) });
        let seqs: Vec<_> = log.iter().map(|r| r.seq).collect();
        assert_eq!(seqs, vec![0, 1]);
        assert_eq!(log.since(1).count(), 1);
    }

    #[test]
    fn test_records_carry_position() {
        let mut log = TransitionLog::default();
        log.append(turn(), TransitionRecord::Untapped { object: ObjectId(2) });
        let first = log.iter().next().unwrap();
        assert_eq!(first.turn, 3);
        assert_eq!(first.step, Step::Upkeep);
    }

    #[test]
    fn test_bincode_preserves_records() {
        let mut log = TransitionLog::default();
        log.append(
            turn(),
            TransitionRecord::DamageDealt {
                source: ObjectId(1),
                target: Target::Player(PlayerId::new(0)),
                amount: 3,
                combat: false,
            },
        );
        log.append(
            turn(),
            TransitionRecord::GameEnded {
                winner: Some(PlayerId::new(1)),
                reason: EndReason::LifeLoss,
                turn: 3,
            },
        );
        let decoded = TransitionLog::decode(&log.encode().unwrap()).unwrap();
        assert_eq!(decoded, log);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(TransitionLog::decode(&[0xff, 0xff, 0xff]).is_err());
    }
}
