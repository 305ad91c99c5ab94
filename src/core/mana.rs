//! Colors, mana costs and mana pools.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The five colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    /// All colors in canonical order.
    pub const ALL: [Color; 5] = [Color::White, Color::Blue, Color::Black, Color::Red, Color::Green];

    /// Position in [`Color::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Single-letter mana symbol.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Color::White => 'W',
            Color::Blue => 'U',
            Color::Black => 'B',
            Color::Red => 'R',
            Color::Green => 'G',
        }
    }

    fn from_symbol(symbol: char) -> Option<Self> {
        Color::ALL.into_iter().find(|c| c.symbol() == symbol)
    }
}

/// One unit of mana: a color or colorless.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mana {
    Colored(Color),
    Colorless,
}

/// A printed mana cost: generic plus per-color requirements.
///
/// ```
/// use duel_rules::core::{Color, ManaCost};
///
/// let cost: ManaCost = "2RR".parse().unwrap();
/// assert_eq!(cost.generic, 2);
/// assert_eq!(cost.colored(Color::Red), 2);
/// assert_eq!(cost.mana_value(), 4);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManaCost {
    /// Payable with any mana.
    pub generic: u32,
    colored: [u32; 5],
}

impl ManaCost {
    /// The zero cost.
    pub const FREE: ManaCost = ManaCost {
        generic: 0,
        colored: [0; 5],
    };

    /// Required amount of one color.
    #[must_use]
    pub fn colored(&self, color: Color) -> u32 {
        self.colored[color.index()]
    }

    /// Add a colored requirement.
    #[must_use]
    pub fn with_colored(mut self, color: Color, amount: u32) -> Self {
        self.colored[color.index()] += amount;
        self
    }

    /// Total mana value.
    #[must_use]
    pub fn mana_value(&self) -> u32 {
        self.generic + self.colored.iter().sum::<u32>()
    }

    /// Colors that appear in the cost.
    pub fn colors(&self) -> impl Iterator<Item = Color> + '_ {
        Color::ALL.into_iter().filter(|c| self.colored[c.index()] > 0)
    }

    /// Whether the cost is empty.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.mana_value() == 0
    }
}

impl FromStr for ManaCost {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cost = ManaCost::FREE;
        let mut digits = String::new();
        for ch in s.chars().filter(|c| !matches!(c, '{' | '}' | ' ')) {
            if ch.is_ascii_digit() {
                digits.push(ch);
            } else if let Some(color) = Color::from_symbol(ch) {
                cost.colored[color.index()] += 1;
            } else {
                return Err(format!("unknown mana symbol '{ch}' in \"{s}\""));
            }
        }
        if !digits.is_empty() {
            cost.generic = digits.parse().map_err(|_| format!("bad generic amount in \"{s}\""))?;
        }
        Ok(cost)
    }
}

impl std::fmt::Display for ManaCost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.generic > 0 || self.is_free() {
            write!(f, "{}", self.generic)?;
        }
        for color in Color::ALL {
            for _ in 0..self.colored(color) {
                write!(f, "{}", color.symbol())?;
            }
        }
        Ok(())
    }
}

/// Unspent mana held by a player.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManaPool {
    colored: [u32; 5],
    colorless: u32,
}

impl ManaPool {
    /// Add mana to the pool.
    pub fn add(&mut self, mana: Mana, amount: u32) {
        match mana {
            Mana::Colored(color) => self.colored[color.index()] += amount,
            Mana::Colorless => self.colorless += amount,
        }
    }

    /// Amount of one kind of mana.
    #[must_use]
    pub fn amount(&self, mana: Mana) -> u32 {
        match mana {
            Mana::Colored(color) => self.colored[color.index()],
            Mana::Colorless => self.colorless,
        }
    }

    /// Total mana in the pool.
    #[must_use]
    pub fn total(&self) -> u32 {
        self.colorless + self.colored.iter().sum::<u32>()
    }

    /// Whether the pool alone covers `cost`.
    #[must_use]
    pub fn can_pay(&self, cost: &ManaCost) -> bool {
        let mut scratch = *self;
        scratch.pay(cost).is_ok()
    }

    /// Spend mana for `cost`. Colored requirements are paid first, generic
    /// from colorless and then colors in canonical order. On failure the
    /// pool is left unchanged and the missing amount is returned.
    pub fn pay(&mut self, cost: &ManaCost) -> Result<(), u32> {
        let mut next = *self;
        let mut missing = 0;
        for color in Color::ALL {
            let need = cost.colored(color);
            let have = next.colored[color.index()];
            let used = need.min(have);
            next.colored[color.index()] -= used;
            missing += need - used;
        }
        let mut generic = cost.generic;
        let from_colorless = generic.min(next.colorless);
        next.colorless -= from_colorless;
        generic -= from_colorless;
        for color in Color::ALL {
            let used = generic.min(next.colored[color.index()]);
            next.colored[color.index()] -= used;
            generic -= used;
        }
        missing += generic;
        if missing > 0 {
            return Err(missing);
        }
        *self = next;
        Ok(())
    }

    /// Empty the pool.
    pub fn clear(&mut self) {
        *self = ManaPool::default();
    }
}
