//! Sample card pool.
//!
//! A small set of definitions exercising every rules feature the runtime
//! models: keywords, burn, pump, removal, counterspells, anthems, auras,
//! prevention, tokens, triggers, self-replacement and counter doubling.
//! Used by the `simulate` binary, the benches and the integration tests.

use std::sync::Arc;

use crate::core::{Color, ManaCost};
use crate::effects::{Amount, Effect, EffectTarget, PreventionScope, TargetSpec};
use crate::layers::{AffectedSet, ModificationKind};
use crate::objects::{
    Ability, AbilityCost, ActivatedAbility, CardDefinition, CardProvider, CardRegistry, ControllerRel, CounterKind,
    Keyword, ObjectFilter, ReplacementTemplate, StaticAbility, TokenSpec, TriggeredAbility,
};
use crate::replacement::{ReplacementAction, ReplacementCondition};
use crate::triggers::{StateCondition, TriggerCondition};

/// Lands in a generated deck.
pub const DECK_LANDS: usize = 17;
/// Total cards in a generated deck.
pub const DECK_SIZE: usize = 40;

/// Name of the basic land producing `color`.
#[must_use]
pub fn basic_land_name(color: Color) -> &'static str {
    match color {
        Color::White => "Plains",
        Color::Blue => "Island",
        Color::Black => "Swamp",
        Color::Red => "Mountain",
        Color::Green => "Forest",
    }
}

fn mana(generic: u32, color: Color, colored: u32) -> ManaCost {
    let mut cost = ManaCost::default().with_colored(color, colored);
    cost.generic = generic;
    cost
}

fn triggered(condition: TriggerCondition, effects: Vec<Effect>, targets: Vec<TargetSpec>) -> Ability {
    Ability::Triggered(TriggeredAbility {
        condition,
        guard: None,
        effects,
        targets,
    })
}

fn your_creatures() -> ObjectFilter {
    ObjectFilter::creature().controlled_by(ControllerRel::You)
}

fn white() -> Vec<CardDefinition> {
    vec![
        CardDefinition::creature("Dawn Squire", "1W", 2, 2).with_keywords([Keyword::Vigilance]),
        CardDefinition::creature("Skyguard Eagle", "2W", 2, 2).with_keywords([Keyword::Flying]),
        CardDefinition::instant("Holy Aegis", "W")
            .with_target(TargetSpec::creature())
            .with_effect(Effect::PreventDamage {
                scope: PreventionScope::DamageTo(EffectTarget::Target(0)),
            }),
        CardDefinition::instant("Field Truce", "1W").with_effect(Effect::PreventDamage {
            scope: PreventionScope::AllCombatDamage,
        }),
        CardDefinition::enchantment("Valor Mantle", "1W")
            .with_subtype("Aura")
            .with_target(TargetSpec::creature())
            .with_ability(Ability::Static(StaticAbility {
                affected: AffectedSet::Attached,
                kind: ModificationKind::ModifyPt { power: 2, toughness: 2 },
            })),
        CardDefinition::creature("Choir Recruiter", "3W", 2, 2).with_ability(triggered(
            TriggerCondition::ThisEntersBattlefield,
            vec![Effect::CreateTokens {
                token: TokenSpec::creature("Soldier", Color::White, 1, 1),
                count: 2,
            }],
            Vec::new(),
        )),
        CardDefinition::creature("Aurel, Sun Marshal", "2WW", 3, 4)
            .legendary()
            .with_keywords([Keyword::FirstStrike, Keyword::Lifelink]),
    ]
}

fn blue() -> Vec<CardDefinition> {
    vec![
        CardDefinition::creature("Tide Sprite", "1U", 1, 1).with_keywords([Keyword::Flying]),
        CardDefinition::creature("Mist Drake", "3U", 3, 3).with_keywords([Keyword::Flying]),
        CardDefinition::instant("Deny", "1U")
            .with_target(TargetSpec::Spell)
            .with_effect(Effect::CounterSpell {
                what: EffectTarget::Target(0),
            }),
        CardDefinition::instant("Undertow", "1U")
            .with_target(TargetSpec::creature())
            .with_effect(Effect::ReturnToHand {
                what: EffectTarget::Target(0),
            }),
        CardDefinition::creature("Tidal Scholar", "2U", 1, 3)
            .with_ability(triggered(TriggerCondition::ThisEntersBattlefield, vec![Effect::draw(1)], Vec::new())),
        CardDefinition::creature("Reef Serpent", "4U", 5, 5),
    ]
}

fn black() -> Vec<CardDefinition> {
    vec![
        CardDefinition::creature("Venom Fang", "1B", 1, 2).with_keywords([Keyword::Deathtouch]),
        CardDefinition::creature("Night Stalker", "2B", 3, 2).with_keywords([Keyword::Menace]),
        CardDefinition::instant("Final Rites", "1B")
            .with_target(TargetSpec::creature())
            .with_effect(Effect::destroy(EffectTarget::Target(0))),
        CardDefinition::creature("Marsh Wraith", "3B", 3, 3).with_ability(triggered(
            TriggerCondition::Dies(ObjectFilter::creature().other()),
            vec![Effect::gain_life(1)],
            Vec::new(),
        )),
        CardDefinition::creature("Carrion Priest", "2B", 2, 2).with_ability(Ability::Triggered(TriggeredAbility {
            condition: TriggerCondition::ThisDies,
            guard: Some(StateCondition::ControllerLifeAtMost(10)),
            effects: vec![Effect::LoseLife {
                amount: Amount::Fixed(2),
                who: EffectTarget::EachOpponent,
            }],
            targets: Vec::new(),
        })),
        CardDefinition::creature("Vorn, Bone Lord", "2BB", 4, 3)
            .legendary()
            .with_keywords([Keyword::Menace]),
    ]
}

fn red() -> Vec<CardDefinition> {
    vec![
        CardDefinition::creature("Ember Hound", "1R", 2, 1).with_keywords([Keyword::Haste]),
        CardDefinition::creature("Blazing Duelist", "2R", 2, 2).with_keywords([Keyword::FirstStrike]),
        CardDefinition::instant("Spark Bolt", "R")
            .with_target(TargetSpec::AnyTarget)
            .with_effect(Effect::damage(3, EffectTarget::Target(0))),
        CardDefinition::creature("Pyre Shaman", "2R", 1, 1).with_ability(triggered(
            TriggerCondition::ThisEntersBattlefield,
            vec![Effect::damage(1, EffectTarget::Target(0))],
            vec![TargetSpec::AnyTarget],
        )),
        CardDefinition::creature("Cinder Sentry", "1R", 1, 1).with_ability(Ability::Activated(ActivatedAbility {
            cost: AbilityCost {
                mana: mana(1, Color::Red, 1),
                tap: true,
                ..AbilityCost::default()
            },
            effects: vec![Effect::damage(1, EffectTarget::Target(0))],
            targets: vec![TargetSpec::AnyTarget],
            sorcery_speed: false,
        })),
        CardDefinition::enchantment("Warcry Banner", "2R").with_ability(Ability::Static(StaticAbility {
            affected: AffectedSet::Filter(your_creatures()),
            kind: ModificationKind::ModifyPt { power: 1, toughness: 0 },
        })),
        CardDefinition::creature("Cliff Brute", "3R", 4, 3).with_keywords([Keyword::Trample]),
    ]
}

fn green() -> Vec<CardDefinition> {
    vec![
        CardDefinition::creature("Grove Bear", "1G", 2, 2),
        CardDefinition::creature("Canopy Spider", "2G", 1, 4).with_keywords([Keyword::Reach]),
        CardDefinition::instant("Wild Surge", "G")
            .with_target(TargetSpec::creature())
            .with_effect(Effect::pump(EffectTarget::Target(0), 3, 3)),
        CardDefinition::creature("Mossborn Hydra", "2G", 0, 0).with_ability(Ability::EntersWith(
            ReplacementAction::EnterWithCounters {
                kind: CounterKind::PlusOne,
                count: 2,
            },
        )),
        CardDefinition::enchantment("Verdant Abundance", "2G").with_ability(Ability::Replacement(
            ReplacementTemplate {
                condition: ReplacementCondition::CountersPlaced(your_creatures()),
                action: ReplacementAction::DoubleCounters,
            },
        )),
        CardDefinition::creature("Thornback Boar", "3G", 4, 4).with_keywords([Keyword::Trample]),
    ]
}

/// Every sample card plus the five basic lands.
#[must_use]
pub fn registry() -> CardRegistry {
    let mut registry = CardRegistry::new();
    for color in Color::ALL {
        registry.register(CardDefinition::basic_land(basic_land_name(color), color));
    }
    for card in white().into_iter().chain(blue()).chain(black()).chain(red()).chain(green()) {
        registry.register(card);
    }
    registry
}

/// Nonland cards of one color in the sample pool, in printed order.
#[must_use]
pub fn spells_of(color: Color) -> Vec<String> {
    let cards = match color {
        Color::White => white(),
        Color::Blue => blue(),
        Color::Black => black(),
        Color::Red => red(),
        Color::Green => green(),
    };
    cards.into_iter().map(|c| c.name().to_string()).collect()
}

/// A 40-card mono-color deck: basic lands plus the color's spells repeated
/// in printed order.
#[must_use]
pub fn mono_deck(color: Color) -> Vec<Arc<CardDefinition>> {
    let registry = registry();
    let land = basic_land_name(color);
    let spells = spells_of(color);
    let mut deck = Vec::with_capacity(DECK_SIZE);
    deck.extend((0..DECK_LANDS).filter_map(|_| registry.definition(land)));
    deck.extend(
        spells
            .iter()
            .cycle()
            .take(DECK_SIZE - DECK_LANDS)
            .filter_map(|name| registry.definition(name)),
    );
    deck
}
