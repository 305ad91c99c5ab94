//! Effect descriptors.
//!
//! Every effect the runtime can perform is one variant of the closed
//! [`Effect`] enum, carrying only the typed parameters it needs. Card data
//! is mapped to these variants when it is loaded, never while resolving.
//!
//! ## Example
//!
//! ```
//! use duel_rules::effects::{Amount, Effect, EffectTarget};
//!
//! let bolt = Effect::damage(3, EffectTarget::Target(0));
//! assert!(matches!(bolt, Effect::DealDamage { amount: Amount::Fixed(3), .. }));
//! assert_eq!(bolt.target_indices(), vec![0]);
//! ```

use serde::{Deserialize, Serialize};

use crate::core::Mana;
use crate::layers::{Duration, ModificationKind};
use crate::objects::{CounterKind, Keyword, KeywordSet, ObjectFilter, TokenSpec};

/// What an effect acts on.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectTarget {
    /// The n-th chosen target.
    Target(usize),
    /// The object the ability belongs to.
    Source,
    /// The controller of the ability.
    Controller,
    /// Each opponent of the controller.
    EachOpponent,
    /// Every player.
    EachPlayer,
    /// Every permanent matching the filter, from the controller's view.
    Each(ObjectFilter),
    /// The permanent the source is attached to.
    Attached,
    /// The object named by the triggering event.
    TriggeringObject,
    /// The controller of the n-th chosen target.
    ControllerOfTarget(usize),
}

/// A number an effect uses.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Amount {
    Fixed(i32),
    /// Power of the triggering object, using last-known information if it
    /// has left its zone.
    TriggeringPower,
    /// Current power of the source.
    SourcePower,
    /// Number of permanents matching the filter.
    CountOf(ObjectFilter),
}

/// What a prevention shield covers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreventionScope {
    /// All combat damage this turn.
    AllCombatDamage,
    /// All damage that would be dealt to the referenced player or permanent
    /// this turn.
    DamageTo(EffectTarget),
}

/// One atomic effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    DealDamage { amount: Amount, to: EffectTarget },
    GainLife { amount: Amount, who: EffectTarget },
    LoseLife { amount: Amount, who: EffectTarget },
    DrawCards { count: u32, who: EffectTarget },
    Discard { count: u32, who: EffectTarget },
    Destroy { what: EffectTarget },
    Exile { what: EffectTarget },
    ReturnToHand { what: EffectTarget },
    Sacrifice { what: EffectTarget },
    AddCounters { what: EffectTarget, kind: CounterKind, count: u32 },
    RemoveCounters { what: EffectTarget, kind: CounterKind, count: u32 },
    AddPoison { who: EffectTarget, count: u32 },
    Tap { what: EffectTarget },
    Untap { what: EffectTarget },
    /// Create a continuous effect on the referenced objects.
    Modify {
        what: EffectTarget,
        kind: ModificationKind,
        duration: Duration,
    },
    CreateTokens { token: TokenSpec, count: u32 },
    AddMana { mana: Mana, amount: u32 },
    /// Counter a spell: remove it from the stack without resolving.
    CounterSpell { what: EffectTarget },
    /// Attach the source to the referenced permanent.
    Attach { to: EffectTarget },
    /// Register a prevention shield until end of turn.
    PreventDamage { scope: PreventionScope },
}

impl Effect {
    /// Deal a fixed amount of damage.
    #[must_use]
    pub fn damage(amount: i32, to: EffectTarget) -> Self {
        Effect::DealDamage {
            amount: Amount::Fixed(amount),
            to,
        }
    }

    /// The controller draws cards.
    #[must_use]
    pub fn draw(count: u32) -> Self {
        Effect::DrawCards {
            count,
            who: EffectTarget::Controller,
        }
    }

    /// The controller gains a fixed amount of life.
    #[must_use]
    pub fn gain_life(amount: i32) -> Self {
        Effect::GainLife {
            amount: Amount::Fixed(amount),
            who: EffectTarget::Controller,
        }
    }

    #[must_use]
    pub fn destroy(what: EffectTarget) -> Self {
        Effect::Destroy { what }
    }

    /// +N/+N until end of turn.
    #[must_use]
    pub fn pump(what: EffectTarget, power: i32, toughness: i32) -> Self {
        Effect::Modify {
            what,
            kind: ModificationKind::ModifyPt { power, toughness },
            duration: Duration::UntilEndOfTurn,
        }
    }

    /// Grant a keyword until end of turn.
    #[must_use]
    pub fn grant_keyword(what: EffectTarget, keyword: Keyword) -> Self {
        let keywords: KeywordSet = [keyword].into_iter().collect();
        Effect::Modify {
            what,
            kind: ModificationKind::AddKeywords(keywords),
            duration: Duration::UntilEndOfTurn,
        }
    }

    /// Every chosen-target index this effect refers to.
    #[must_use]
    pub fn target_indices(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut note = |t: &EffectTarget| match t {
            EffectTarget::Target(i) | EffectTarget::ControllerOfTarget(i) => out.push(*i),
            _ => {}
        };
        match self {
            Effect::DealDamage { to, .. } => note(to),
            Effect::GainLife { who, .. }
            | Effect::LoseLife { who, .. }
            | Effect::DrawCards { who, .. }
            | Effect::Discard { who, .. }
            | Effect::AddPoison { who, .. } => note(who),
            Effect::Destroy { what }
            | Effect::Exile { what }
            | Effect::ReturnToHand { what }
            | Effect::Sacrifice { what }
            | Effect::AddCounters { what, .. }
            | Effect::RemoveCounters { what, .. }
            | Effect::Tap { what }
            | Effect::Untap { what }
            | Effect::Modify { what, .. }
            | Effect::CounterSpell { what } => note(what),
            Effect::Attach { to } => note(to),
            Effect::PreventDamage {
                scope: PreventionScope::DamageTo(t),
            } => note(t),
            Effect::PreventDamage { .. } | Effect::CreateTokens { .. } | Effect::AddMana { .. } => {}
        }
        out
    }
}
