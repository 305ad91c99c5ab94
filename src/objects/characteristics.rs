//! Printed and computed characteristics.
//!
//! The same [`Characteristics`] struct describes what is printed on a card
//! and what the layer engine computes for it. Printed values never change;
//! computed values are rebuilt from printed values on every recomputation.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::definition::Ability;
use crate::core::{Color, ManaCost};

/// Card types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardType {
    Land,
    Creature,
    Artifact,
    Enchantment,
    Planeswalker,
    Instant,
    Sorcery,
}

impl CardType {
    /// Whether objects of this type stay on the battlefield after resolving.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        !matches!(self, CardType::Instant | CardType::Sorcery)
    }
}

/// Supertypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Supertype {
    Basic,
    Legendary,
}

/// Keyword abilities the combat and cleanup rules understand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Flying,
    Reach,
    FirstStrike,
    DoubleStrike,
    /// Any nonzero damage from this source is lethal.
    Deathtouch,
    /// Excess combat damage carries over to the defending player.
    Trample,
    Lifelink,
    Vigilance,
    Haste,
    Defender,
    Indestructible,
    Menace,
}

impl Keyword {
    /// Every keyword, in declaration order.
    pub const ALL: [Keyword; 12] = [
        Keyword::Flying,
        Keyword::Reach,
        Keyword::FirstStrike,
        Keyword::DoubleStrike,
        Keyword::Deathtouch,
        Keyword::Trample,
        Keyword::Lifelink,
        Keyword::Vigilance,
        Keyword::Haste,
        Keyword::Defender,
        Keyword::Indestructible,
        Keyword::Menace,
    ];

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// A set of keywords stored as a bitmask.
///
/// ```
/// use duel_rules::objects::{Keyword, KeywordSet};
///
/// let set: KeywordSet = [Keyword::Flying, Keyword::Vigilance].into_iter().collect();
/// assert!(set.contains(Keyword::Flying));
/// assert!(!set.contains(Keyword::Reach));
/// assert_eq!(set.len(), 2);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeywordSet(u16);

impl KeywordSet {
    /// The empty set.
    pub const EMPTY: KeywordSet = KeywordSet(0);

    #[must_use]
    pub const fn contains(self, keyword: Keyword) -> bool {
        self.0 & keyword.bit() != 0
    }

    pub fn insert(&mut self, keyword: Keyword) {
        self.0 |= keyword.bit();
    }

    pub fn remove(&mut self, keyword: Keyword) {
        self.0 &= !keyword.bit();
    }

    /// Add every keyword of `other`.
    pub fn extend_from(&mut self, other: KeywordSet) {
        self.0 |= other.0;
    }

    /// Remove every keyword of `other`.
    pub fn remove_all(&mut self, other: KeywordSet) {
        self.0 &= !other.0;
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Keywords in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Keyword> {
        Keyword::ALL.into_iter().filter(move |k| self.contains(*k))
    }
}

impl FromIterator<Keyword> for KeywordSet {
    fn from_iter<I: IntoIterator<Item = Keyword>>(iter: I) -> Self {
        let mut set = KeywordSet::EMPTY;
        for keyword in iter {
            set.insert(keyword);
        }
        set
    }
}

/// A set of colors stored as a bitmask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorSet(u8);

impl ColorSet {
    /// Colorless.
    pub const COLORLESS: ColorSet = ColorSet(0);

    #[must_use]
    pub const fn contains(self, color: Color) -> bool {
        self.0 & (1 << color.index()) != 0
    }

    pub fn insert(&mut self, color: Color) {
        self.0 |= 1 << color.index();
    }

    /// Add every color of `other`.
    pub fn extend_from(&mut self, other: ColorSet) {
        self.0 |= other.0;
    }

    #[must_use]
    pub const fn is_colorless(self) -> bool {
        self.0 == 0
    }

    /// Colors in canonical order.
    pub fn iter(self) -> impl Iterator<Item = Color> {
        Color::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

impl FromIterator<Color> for ColorSet {
    fn from_iter<I: IntoIterator<Item = Color>>(iter: I) -> Self {
        let mut set = ColorSet::COLORLESS;
        for color in iter {
            set.insert(color);
        }
        set
    }
}

/// Everything that describes what an object is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristics {
    pub name: String,
    pub mana_cost: ManaCost,
    pub colors: ColorSet,
    pub card_types: SmallVec<[CardType; 2]>,
    pub supertypes: SmallVec<[Supertype; 1]>,
    pub subtypes: SmallVec<[String; 2]>,
    pub keywords: KeywordSet,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub loyalty: Option<i32>,
    pub abilities: Vec<Ability>,
}

impl Characteristics {
    /// A nameless object with no types.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mana_cost: ManaCost::FREE,
            colors: ColorSet::COLORLESS,
            card_types: SmallVec::new(),
            supertypes: SmallVec::new(),
            subtypes: SmallVec::new(),
            keywords: KeywordSet::EMPTY,
            power: None,
            toughness: None,
            loyalty: None,
            abilities: Vec::new(),
        }
    }

    #[must_use]
    pub fn has_type(&self, card_type: CardType) -> bool {
        self.card_types.contains(&card_type)
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.has_type(CardType::Creature)
    }

    #[must_use]
    pub fn is_land(&self) -> bool {
        self.has_type(CardType::Land)
    }

    /// Whether the object would become a permanent on resolution.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        !self.card_types.is_empty() && self.card_types.iter().all(|t| t.is_permanent())
    }

    #[must_use]
    pub fn is_legendary(&self) -> bool {
        self.supertypes.contains(&Supertype::Legendary)
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(keyword)
    }

    #[must_use]
    pub fn has_subtype(&self, subtype: &str) -> bool {
        self.subtypes.iter().any(|s| s == subtype)
    }

    /// Instants, and anything granting flash-like timing, may be cast any
    /// time their controller holds priority.
    #[must_use]
    pub fn has_instant_timing(&self) -> bool {
        self.has_type(CardType::Instant)
    }

    /// Power, or zero for non-creatures.
    #[must_use]
    pub fn power_or_zero(&self) -> i32 {
        self.power.unwrap_or(0)
    }

    /// Toughness, or zero for non-creatures.
    #[must_use]
    pub fn toughness_or_zero(&self) -> i32 {
        self.toughness.unwrap_or(0)
    }
}
