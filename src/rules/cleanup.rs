//! Automatic state checks.
//!
//! [`check`] is a pure scan: it reports every violation present in a state
//! without changing anything. The engine applies all violations from one
//! scan together, then scans again, until a scan comes back empty.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{GameState, LossReason, ObjectId, PlayerId};
use crate::effects::Target;
use crate::objects::{CardType, CounterKind, GameObject, Keyword};

/// One condition the cleanup loop must correct.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Violation {
    PlayerLoses { player: PlayerId, reason: LossReason },
    /// A creature with toughness zero or less. Put into the graveyard even
    /// if indestructible.
    ZeroToughness(ObjectId),
    /// A creature with lethal or deathtouch damage marked. Destroyed.
    LethalDamage(ObjectId),
    ZeroLoyalty(ObjectId),
    /// Two or more legendary permanents with one name under one controller.
    LegendRule {
        controller: PlayerId,
        name: String,
        objects: Vec<ObjectId>,
    },
    /// An aura attached to nothing or to something it can no longer enchant.
    IllegalAttachment(ObjectId),
    /// +1/+1 and -1/-1 counters on the same permanent.
    CounterAnnihilation { object: ObjectId, pairs: u32 },
    /// A token in a zone other than the battlefield.
    TokenOutsideBattlefield(ObjectId),
}

impl Violation {
    /// The object the correction removes or changes, if any.
    #[must_use]
    pub fn object(&self) -> Option<ObjectId> {
        match self {
            Violation::ZeroToughness(id)
            | Violation::LethalDamage(id)
            | Violation::ZeroLoyalty(id)
            | Violation::IllegalAttachment(id)
            | Violation::TokenOutsideBattlefield(id) => Some(*id),
            Violation::CounterAnnihilation { object, .. } => Some(*object),
            Violation::PlayerLoses { .. } | Violation::LegendRule { .. } => None,
        }
    }
}

/// Summary of one cleanup loop.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Scans performed, including the final empty one.
    pub passes: u32,
    /// Violations corrected over all passes.
    pub corrections: u32,
}

impl CleanupReport {
    #[must_use]
    pub fn changed_anything(&self) -> bool {
        self.corrections > 0
    }
}

fn player_losses(state: &GameState) -> Vec<Violation> {
    let threshold = state.config.poison_threshold;
    state
        .players
        .iter()
        .filter(|(_, p)| p.is_alive())
        .filter_map(|(player, p)| {
            let reason = if p.life <= 0 {
                LossReason::ZeroLife
            } else if p.drew_from_empty_library {
                LossReason::EmptyLibraryDraw
            } else if p.poison >= threshold {
                LossReason::PoisonThreshold
            } else {
                return None;
            };
            Some(Violation::PlayerLoses { player, reason })
        })
        .collect()
}

fn creature_deaths(object: &GameObject) -> Option<Violation> {
    if !object.computed.is_creature() {
        return None;
    }
    let toughness = object.computed.toughness_or_zero();
    if toughness <= 0 {
        return Some(Violation::ZeroToughness(object.id));
    }
    let permanent = object.permanent.as_ref()?;
    let lethal = permanent.damage as i32 >= toughness || (permanent.deathtouch_damage && permanent.damage > 0);
    (lethal && !object.has_keyword(Keyword::Indestructible)).then_some(Violation::LethalDamage(object.id))
}

fn zero_loyalty(object: &GameObject) -> Option<Violation> {
    let is_walker = object.computed.has_type(CardType::Planeswalker);
    (is_walker && object.computed.loyalty.unwrap_or(0) <= 0).then_some(Violation::ZeroLoyalty(object.id))
}

fn legend_rule(state: &GameState) -> Vec<Violation> {
    let mut groups: BTreeMap<(PlayerId, String), Vec<ObjectId>> = BTreeMap::new();
    for object in state.battlefield().filter(|o| o.computed.is_legendary()) {
        groups
            .entry((object.controller, object.computed.name.clone()))
            .or_default()
            .push(object.id);
    }
    groups
        .into_iter()
        .filter(|(_, objects)| objects.len() > 1)
        .map(|((controller, name), objects)| Violation::LegendRule {
            controller,
            name,
            objects,
        })
        .collect()
}

fn illegal_attachment(state: &GameState, object: &GameObject) -> Option<Violation> {
    if !object.definition.is_aura() {
        return None;
    }
    let legal = match object.attached_to() {
        None => false,
        Some(host) => match object.definition.spell.targets.first() {
            Some(spec) => {
                let ctx = state.filter_context(object.controller, Some(object.id));
                host != object.id && spec.is_legal(Target::Object(host), state, &ctx)
            }
            None => state.object(host).is_some_and(GameObject::is_on_battlefield),
        },
    };
    (!legal).then_some(Violation::IllegalAttachment(object.id))
}

fn annihilation(object: &GameObject) -> Option<Violation> {
    let counters = object.counters();
    let pairs = counters.get(CounterKind::PlusOne).min(counters.get(CounterKind::MinusOne));
    (pairs > 0).then_some(Violation::CounterAnnihilation {
        object: object.id,
        pairs,
    })
}

/// Every violation present in `state`, grouped in check order: player
/// losses, creature deaths, loyalty, legend rule, attachments, counters,
/// tokens.
#[must_use]
pub fn check(state: &GameState) -> Vec<Violation> {
    let mut found = player_losses(state);
    found.extend(state.battlefield().filter_map(creature_deaths));
    found.extend(state.battlefield().filter_map(zero_loyalty));
    found.extend(legend_rule(state));
    found.extend(state.battlefield().filter_map(|o| illegal_attachment(state, o)));
    found.extend(state.battlefield().filter_map(annihilation));
    found.extend(
        state
            .objects
            .values()
            .filter(|o| o.is_token && !o.is_on_battlefield())
            .map(|o| Violation::TokenOutsideBattlefield(o.id)),
    );
    found
}
