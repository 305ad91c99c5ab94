//! Card definitions and structured ability descriptors.
//!
//! A `CardDefinition` is what the card database hands the runtime: printed
//! characteristics plus abilities in a closed, typed form. The runtime never
//! interprets rules text.
//!
//! ## Example
//!
//! ```
//! use duel_rules::objects::{CardDefinition, Keyword};
//!
//! let angel = CardDefinition::creature("Serra Angel", "3WW", 4, 4)
//!     .with_keywords([Keyword::Flying, Keyword::Vigilance]);
//! assert_eq!(angel.name(), "Serra Angel");
//! assert!(angel.characteristics.has_keyword(Keyword::Flying));
//! assert_eq!(angel.characteristics.mana_cost.mana_value(), 5);
//! ```

use serde::{Deserialize, Serialize};
use smallvec::smallvec;

use super::characteristics::{CardType, Characteristics, ColorSet, Keyword, Supertype};
use crate::core::{Color, Mana, ManaCost};
use crate::effects::{Effect, TargetSpec};
use crate::layers::{AffectedSet, ModificationKind};
use crate::replacement::{ReplacementAction, ReplacementCondition};
use crate::triggers::{StateCondition, TriggerCondition};

/// Costs beyond mana for activated abilities.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityCost {
    pub mana: ManaCost,
    /// `{T}`: tap the source.
    pub tap: bool,
    /// Sacrifice the source.
    pub sacrifice_self: bool,
    /// Life paid.
    pub life: u32,
}

/// `{T}: Add mana.` Resolves immediately, never uses the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaAbility {
    pub mana: Mana,
    pub amount: u32,
}

/// A non-mana activated ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivatedAbility {
    pub cost: AbilityCost,
    pub effects: Vec<Effect>,
    pub targets: Vec<TargetSpec>,
    /// Only when a sorcery could be cast.
    pub sorcery_speed: bool,
}

/// A triggered ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggeredAbility {
    pub condition: TriggerCondition,
    /// Intervening-if clause, checked at detection and again before stacking.
    pub guard: Option<StateCondition>,
    pub effects: Vec<Effect>,
    pub targets: Vec<TargetSpec>,
}

/// A static ability generating a continuous effect while its source is on
/// the battlefield.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticAbility {
    pub affected: AffectedSet,
    pub kind: ModificationKind,
}

/// A replacement effect that is active while its source is on the
/// battlefield.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplacementTemplate {
    pub condition: ReplacementCondition,
    pub action: ReplacementAction,
}

/// One structured ability.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ability {
    Mana(ManaAbility),
    Activated(ActivatedAbility),
    Triggered(TriggeredAbility),
    Static(StaticAbility),
    Replacement(ReplacementTemplate),
    /// Self-replacement applied to this object's own entry event
    /// ("enters tapped", "enters with counters").
    EntersWith(ReplacementAction),
}

/// What an instant or sorcery does, and what an aura enchants.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellAbility {
    pub effects: Vec<Effect>,
    pub targets: Vec<TargetSpec>,
}

/// Printed template for a token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpec {
    pub name: String,
    pub colors: ColorSet,
    pub subtypes: Vec<String>,
    pub power: i32,
    pub toughness: i32,
    pub keywords: Vec<Keyword>,
}

impl TokenSpec {
    /// A vanilla creature token.
    #[must_use]
    pub fn creature(name: impl Into<String>, color: Color, power: i32, toughness: i32) -> Self {
        let name = name.into();
        Self {
            subtypes: vec![name.clone()],
            name,
            colors: [color].into_iter().collect(),
            power,
            toughness,
            keywords: Vec::new(),
        }
    }

    /// Build the definition a token object is created from.
    #[must_use]
    pub fn to_definition(&self) -> CardDefinition {
        let mut chars = Characteristics::named(format!("{} Token", self.name));
        chars.colors = self.colors;
        chars.card_types = smallvec![CardType::Creature];
        chars.subtypes = self.subtypes.iter().cloned().collect();
        chars.power = Some(self.power);
        chars.toughness = Some(self.toughness);
        chars.keywords = self.keywords.iter().copied().collect();
        CardDefinition {
            characteristics: chars,
            spell: SpellAbility::default(),
        }
    }
}

/// Printed characteristics plus spell behaviour.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub characteristics: Characteristics,
    pub spell: SpellAbility,
}

impl CardDefinition {
    /// A card of one type from a cost string such as `"2RR"`. Use this for
    /// descriptors that did not come from source code.
    pub fn try_new(name: &str, cost: &str, card_type: CardType) -> Result<Self, String> {
        let mana_cost: ManaCost = cost.parse()?;
        let mut chars = Characteristics::named(name);
        chars.colors = mana_cost.colors().collect();
        chars.mana_cost = mana_cost;
        chars.card_types = smallvec![card_type];
        Ok(Self {
            characteristics: chars,
            spell: SpellAbility::default(),
        })
    }

    /// A creature card from a cost string that may be malformed.
    pub fn try_creature(name: &str, cost: &str, power: i32, toughness: i32) -> Result<Self, String> {
        let mut def = Self::try_new(name, cost, CardType::Creature)?;
        def.characteristics.power = Some(power);
        def.characteristics.toughness = Some(toughness);
        Ok(def)
    }

    fn base(name: &str, cost: &str, card_type: CardType) -> Self {
        // Builder costs are literals; an unparseable one is a programming error.
        Self::try_new(name, cost, card_type).unwrap_or_else(|e| panic!("invalid mana cost literal: {e}"))
    }

    /// A creature card.
    #[must_use]
    pub fn creature(name: &str, cost: &str, power: i32, toughness: i32) -> Self {
        let mut def = Self::base(name, cost, CardType::Creature);
        def.characteristics.power = Some(power);
        def.characteristics.toughness = Some(toughness);
        def
    }

    /// An instant.
    #[must_use]
    pub fn instant(name: &str, cost: &str) -> Self {
        Self::base(name, cost, CardType::Instant)
    }

    /// A sorcery.
    #[must_use]
    pub fn sorcery(name: &str, cost: &str) -> Self {
        Self::base(name, cost, CardType::Sorcery)
    }

    /// An enchantment.
    #[must_use]
    pub fn enchantment(name: &str, cost: &str) -> Self {
        Self::base(name, cost, CardType::Enchantment)
    }

    /// An artifact.
    #[must_use]
    pub fn artifact(name: &str, cost: &str) -> Self {
        Self::base(name, cost, CardType::Artifact)
    }

    /// A planeswalker with starting loyalty.
    #[must_use]
    pub fn planeswalker(name: &str, cost: &str, loyalty: i32) -> Self {
        let mut def = Self::base(name, cost, CardType::Planeswalker);
        def.characteristics.loyalty = Some(loyalty);
        def.characteristics.supertypes.push(Supertype::Legendary);
        def
    }

    /// A basic land tapping for one mana of `color`.
    #[must_use]
    pub fn basic_land(name: &str, color: Color) -> Self {
        let mut def = Self::base(name, "0", CardType::Land);
        def.characteristics.supertypes.push(Supertype::Basic);
        def.characteristics.subtypes.push(name.to_string());
        def.characteristics.abilities.push(Ability::Mana(ManaAbility {
            mana: Mana::Colored(color),
            amount: 1,
        }));
        def
    }

    /// Card name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.characteristics.name
    }

    #[must_use]
    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = Keyword>) -> Self {
        for keyword in keywords {
            self.characteristics.keywords.insert(keyword);
        }
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: &str) -> Self {
        self.characteristics.subtypes.push(subtype.to_string());
        self
    }

    #[must_use]
    pub fn with_type(mut self, card_type: CardType) -> Self {
        if !self.characteristics.has_type(card_type) {
            self.characteristics.card_types.push(card_type);
        }
        self
    }

    #[must_use]
    pub fn legendary(mut self) -> Self {
        self.characteristics.supertypes.push(Supertype::Legendary);
        self
    }

    #[must_use]
    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.characteristics.abilities.push(ability);
        self
    }

    /// Add an effect to the spell ability.
    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.spell.effects.push(effect);
        self
    }

    /// Add a target requirement to the spell ability.
    #[must_use]
    pub fn with_target(mut self, target: TargetSpec) -> Self {
        self.spell.targets.push(target);
        self
    }

    /// Whether this is an aura (attaches to its first target on resolution).
    #[must_use]
    pub fn is_aura(&self) -> bool {
        self.characteristics.has_subtype("Aura")
    }

    /// Triggered abilities, in printed order.
    pub fn triggered_abilities(&self) -> impl Iterator<Item = &TriggeredAbility> {
        self.characteristics.abilities.iter().filter_map(|a| match a {
            Ability::Triggered(t) => Some(t),
            _ => None,
        })
    }

    /// Activated (non-mana) abilities with their ability index.
    pub fn activated_abilities(&self) -> impl Iterator<Item = (usize, &ActivatedAbility)> {
        self.characteristics
            .abilities
            .iter()
            .enumerate()
            .filter_map(|(i, a)| match a {
                Ability::Activated(act) => Some((i, act)),
                _ => None,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::EffectTarget;

    #[test]
    fn test_colors_follow_cost() {
        let def = CardDefinition::instant("Lightning Bolt", "R");
        assert!(def.characteristics.colors.contains(Color::Red));
        assert!(!def.characteristics.is_permanent());
    }

    #[test]
    fn test_malformed_cost_is_an_error() {
        let err = CardDefinition::try_creature("Odd Golem", "2Q", 2, 2).unwrap_err();
        assert!(err.contains('Q'));
        let ok = CardDefinition::try_creature("Grove Bear", "1G", 2, 2).unwrap();
        assert_eq!(ok.characteristics.mana_cost.mana_value(), 2);
        assert_eq!(ok.characteristics.power, Some(2));
    }

    #[test]
    fn test_basic_land_has_mana_ability() {
        let forest = CardDefinition::basic_land("Forest", Color::Green);
        assert!(forest.characteristics.is_land());
        assert!(forest.characteristics.colors.is_colorless());
        assert!(matches!(
            forest.characteristics.abilities[0],
            Ability::Mana(ManaAbility { mana: Mana::Colored(Color::Green), amount: 1 })
        ));
    }

    #[test]
    fn test_token_definition() {
        let spec = TokenSpec::creature("Soldier", Color::White, 1, 1);
        let def = spec.to_definition();
        assert_eq!(def.name(), "Soldier Token");
        assert!(def.characteristics.has_subtype("Soldier"));
        assert_eq!(def.characteristics.power, Some(1));
    }

    #[test]
    fn test_spell_builder() {
        let def = CardDefinition::instant("Shock", "R")
            .with_target(TargetSpec::AnyTarget)
            .with_effect(Effect::damage(2, EffectTarget::Target(0)));
        assert_eq!(def.spell.targets.len(), 1);
        assert_eq!(def.spell.effects.len(), 1);
    }
}
