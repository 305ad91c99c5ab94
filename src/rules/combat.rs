//! Combat legality and bookkeeping.
//!
//! Legality is judged against current computed characteristics at the
//! moment of declaration. A block declaration is validated as a whole:
//! individual pairs must come from the offered options (anything else is a
//! broken agent), while whole-declaration rules such as menace produce a
//! rejected declaration that can be asked for again.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::core::{GameState, ObjectId, PlayerId};
use crate::objects::{GameObject, Keyword};

/// An attacking creature and the creatures blocking it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackingCreature {
    pub attacker: ObjectId,
    pub defender: PlayerId,
    /// Stays set even if every blocker leaves combat.
    pub blocked: bool,
    /// In damage assignment order.
    pub blockers: Vec<ObjectId>,
}

/// Combat state for the current turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatState {
    pub attackers: Vec<AttackingCreature>,
    /// Creatures that dealt damage in the first-strike step.
    pub dealt_first_strike: BTreeSet<ObjectId>,
    pub first_strike_step: bool,
}

impl CombatState {
    #[must_use]
    pub fn has_attackers(&self) -> bool {
        !self.attackers.is_empty()
    }

    #[must_use]
    pub fn is_attacking(&self, id: ObjectId) -> bool {
        self.attackers.iter().any(|a| a.attacker == id)
    }

    #[must_use]
    pub fn is_blocking(&self, id: ObjectId) -> bool {
        self.attackers.iter().any(|a| a.blockers.contains(&id))
    }

    /// Attacker a blocker is blocking.
    #[must_use]
    pub fn blocked_by(&self, blocker: ObjectId) -> Option<ObjectId> {
        self.attackers
            .iter()
            .find(|a| a.blockers.contains(&blocker))
            .map(|a| a.attacker)
    }

    /// Every attacker and blocker.
    pub fn participants(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.attackers
            .iter()
            .flat_map(|a| std::iter::once(a.attacker).chain(a.blockers.iter().copied()))
    }

    /// Whether any participant still on the battlefield strikes first.
    #[must_use]
    pub fn has_first_strikers(&self, state: &GameState) -> bool {
        self.participants().any(|id| {
            state
                .object(id)
                .is_some_and(|o| o.has_keyword(Keyword::FirstStrike) || o.has_keyword(Keyword::DoubleStrike))
        })
    }

    /// Whether `object` deals damage in the current damage step.
    #[must_use]
    pub fn deals_damage_now(&self, object: &GameObject, first_strike_pass: bool) -> bool {
        let first = object.has_keyword(Keyword::FirstStrike);
        let double = object.has_keyword(Keyword::DoubleStrike);
        if first_strike_pass {
            first || double
        } else {
            double || !self.dealt_first_strike.contains(&object.id)
        }
    }
}

/// Whether `id` can be declared as an attacker by the active player.
#[must_use]
pub fn can_attack(state: &GameState, id: ObjectId) -> bool {
    state.object(id).is_some_and(|o| {
        o.is_on_battlefield()
            && o.computed.is_creature()
            && o.controller == state.active_player()
            && o.can_tap_for_cost()
            && !o.has_keyword(Keyword::Defender)
    })
}

/// Creatures the active player may attack with.
#[must_use]
pub fn attack_candidates(state: &GameState) -> Vec<ObjectId> {
    state
        .battlefield()
        .map(|o| o.id)
        .filter(|&id| can_attack(state, id))
        .collect()
}

/// Whether `blocker` may block `attacker`.
#[must_use]
pub fn can_block(state: &GameState, blocker: ObjectId, attacker: ObjectId) -> bool {
    let (Some(b), Some(a)) = (state.object(blocker), state.object(attacker)) else {
        return false;
    };
    if !b.is_on_battlefield() || !b.computed.is_creature() || b.is_tapped() || b.controller == a.controller {
        return false;
    }
    if a.has_keyword(Keyword::Flying) {
        return b.has_keyword(Keyword::Flying) || b.has_keyword(Keyword::Reach);
    }
    true
}

/// A blocker and the attackers it could block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockOption {
    pub blocker: ObjectId,
    pub attackers: Vec<ObjectId>,
}

/// One blocking assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Block {
    pub blocker: ObjectId,
    pub attacker: ObjectId,
}

/// Block options for the defending player.
#[must_use]
pub fn block_options(state: &GameState, combat: &CombatState, defender: PlayerId) -> Vec<BlockOption> {
    let attackers: Vec<ObjectId> = combat
        .attackers
        .iter()
        .filter(|a| a.defender == defender)
        .map(|a| a.attacker)
        .collect();
    state
        .battlefield()
        .filter(|o| o.controller == defender)
        .filter_map(|o| {
            let can: Vec<ObjectId> = attackers
                .iter()
                .copied()
                .filter(|&a| can_block(state, o.id, a))
                .collect();
            (!can.is_empty()).then(|| BlockOption {
                blocker: o.id,
                attackers: can,
            })
        })
        .collect()
}

/// Why a whole block declaration was turned down.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum DeclarationRejection {
    #[error("{0} was declared as a blocker more than once")]
    DuplicateBlocker(ObjectId),
    #[error("{0} has menace and needs two or more blockers")]
    Menace(ObjectId),
}

/// Result of a declaration attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeclarationOutcome {
    Accepted,
    Rejected(DeclarationRejection),
}

/// Whole-declaration rules for blocks.
pub fn validate_blocks(state: &GameState, blocks: &[Block]) -> Result<(), DeclarationRejection> {
    let mut seen = BTreeSet::new();
    for block in blocks {
        if !seen.insert(block.blocker) {
            return Err(DeclarationRejection::DuplicateBlocker(block.blocker));
        }
    }
    let mut attackers: Vec<ObjectId> = blocks.iter().map(|b| b.attacker).collect();
    attackers.sort();
    attackers.dedup();
    for attacker in attackers {
        let count = blocks.iter().filter(|b| b.attacker == attacker).count();
        let menace = state.object(attacker).is_some_and(|o| o.has_keyword(Keyword::Menace));
        if menace && count < 2 {
            return Err(DeclarationRejection::Menace(attacker));
        }
    }
    Ok(())
}
