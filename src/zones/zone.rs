//! Zone identities and their fixed attributes.

use serde::{Deserialize, Serialize};

use crate::core::PlayerId;

/// The kinds of zone a match uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Library,
    Hand,
    Battlefield,
    Graveyard,
    Stack,
    Exile,
}

/// Who may see the objects in a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZoneVisibility {
    /// Everyone sees everything.
    Public,
    /// Only the owning player sees the contents.
    OwnerOnly,
    /// Nobody sees the contents.
    Hidden,
}

impl ZoneKind {
    /// Visibility of objects in this kind of zone.
    #[must_use]
    pub const fn visibility(self) -> ZoneVisibility {
        match self {
            ZoneKind::Library => ZoneVisibility::Hidden,
            ZoneKind::Hand => ZoneVisibility::OwnerOnly,
            _ => ZoneVisibility::Public,
        }
    }

    /// Whether the order of objects carries rules meaning.
    #[must_use]
    pub const fn is_ordered(self) -> bool {
        matches!(self, ZoneKind::Library | ZoneKind::Graveyard | ZoneKind::Stack)
    }

    /// Whether one zone of this kind is shared by all players.
    #[must_use]
    pub const fn is_shared(self) -> bool {
        matches!(self, ZoneKind::Battlefield | ZoneKind::Stack | ZoneKind::Exile)
    }
}

impl std::fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ZoneKind::Library => "library",
            ZoneKind::Hand => "hand",
            ZoneKind::Battlefield => "battlefield",
            ZoneKind::Graveyard => "graveyard",
            ZoneKind::Stack => "stack",
            ZoneKind::Exile => "exile",
        };
        f.write_str(name)
    }
}

/// A concrete zone: a kind plus, for per-player kinds, the owning seat.
///
/// ```
/// use duel_rules::core::PlayerId;
/// use duel_rules::zones::{ZoneId, ZoneKind};
///
/// let hand = ZoneId::hand(PlayerId::new(1));
/// assert_eq!(hand.kind, ZoneKind::Hand);
/// assert_eq!(hand.owner, Some(PlayerId::new(1)));
/// assert_eq!(ZoneId::of(ZoneKind::Battlefield, PlayerId::new(1)), ZoneId::battlefield());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneId {
    pub kind: ZoneKind,
    pub owner: Option<PlayerId>,
}

impl ZoneId {
    /// The zone of `kind` that an object owned by `owner` would go to.
    #[must_use]
    pub const fn of(kind: ZoneKind, owner: PlayerId) -> Self {
        if kind.is_shared() {
            Self { kind, owner: None }
        } else {
            Self {
                kind,
                owner: Some(owner),
            }
        }
    }

    #[must_use]
    pub const fn library(owner: PlayerId) -> Self {
        Self::of(ZoneKind::Library, owner)
    }

    #[must_use]
    pub const fn hand(owner: PlayerId) -> Self {
        Self::of(ZoneKind::Hand, owner)
    }

    #[must_use]
    pub const fn graveyard(owner: PlayerId) -> Self {
        Self::of(ZoneKind::Graveyard, owner)
    }

    #[must_use]
    pub const fn battlefield() -> Self {
        Self {
            kind: ZoneKind::Battlefield,
            owner: None,
        }
    }

    #[must_use]
    pub const fn stack() -> Self {
        Self {
            kind: ZoneKind::Stack,
            owner: None,
        }
    }

    #[must_use]
    pub const fn exile() -> Self {
        Self {
            kind: ZoneKind::Exile,
            owner: None,
        }
    }
}

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.owner {
            Some(owner) => write!(f, "{}'s {}", owner, self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes() {
        assert_eq!(ZoneKind::Library.visibility(), ZoneVisibility::Hidden);
        assert_eq!(ZoneKind::Hand.visibility(), ZoneVisibility::OwnerOnly);
        assert_eq!(ZoneKind::Graveyard.visibility(), ZoneVisibility::Public);
        assert!(ZoneKind::Stack.is_ordered());
        assert!(!ZoneKind::Battlefield.is_ordered());
        assert!(ZoneKind::Exile.is_shared());
    }

    #[test]
    fn test_display() {
        assert_eq!(ZoneId::graveyard(PlayerId::new(0)).to_string(), "Player 0's graveyard");
        assert_eq!(ZoneId::stack().to_string(), "stack");
    }
}
