//! Object filters shared by targeting, continuous effects and triggers.

use serde::{Deserialize, Serialize};

use super::characteristics::{CardType, Characteristics, Keyword};
use crate::core::{Color, ObjectId, PlayerId};

/// Relationship between a player and the controller of an ability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerRel {
    #[default]
    Any,
    You,
    Opponent,
}

impl ControllerRel {
    /// Whether `player` stands in this relation to `you`.
    #[must_use]
    pub fn admits(self, player: PlayerId, you: PlayerId) -> bool {
        match self {
            ControllerRel::Any => true,
            ControllerRel::You => player == you,
            ControllerRel::Opponent => player != you,
        }
    }
}

/// Point of view a filter is evaluated from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FilterContext {
    /// The player "you" refers to.
    pub you: PlayerId,
    /// The object "this" refers to, if any.
    pub source: Option<ObjectId>,
}

/// A conjunction of simple object predicates.
///
/// ```
/// use duel_rules::core::PlayerId;
/// use duel_rules::objects::{Characteristics, CardType, ControllerRel, FilterContext, ObjectFilter};
/// use duel_rules::core::ObjectId;
///
/// let filter = ObjectFilter::creature().controlled_by(ControllerRel::You);
/// let mut bear = Characteristics::named("Bear");
/// bear.card_types.push(CardType::Creature);
/// let ctx = FilterContext { you: PlayerId::new(0), source: None };
/// assert!(filter.matches(ObjectId(5), &bear, PlayerId::new(0), &ctx));
/// assert!(!filter.matches(ObjectId(5), &bear, PlayerId::new(1), &ctx));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectFilter {
    pub card_type: Option<CardType>,
    pub subtype: Option<String>,
    pub keyword: Option<Keyword>,
    pub color: Option<Color>,
    pub controller: ControllerRel,
    /// Exclude the source object itself ("another creature").
    pub other: bool,
}

impl ObjectFilter {
    /// Matches every object.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    /// Matches objects with a card type.
    #[must_use]
    pub fn of_type(card_type: CardType) -> Self {
        Self {
            card_type: Some(card_type),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn creature() -> Self {
        Self::of_type(CardType::Creature)
    }

    #[must_use]
    pub fn controlled_by(mut self, rel: ControllerRel) -> Self {
        self.controller = rel;
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keyword = Some(keyword);
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = Some(subtype.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Exclude the source object.
    #[must_use]
    pub fn other(mut self) -> Self {
        self.other = true;
        self
    }

    /// Test one object.
    #[must_use]
    pub fn matches(
        &self,
        id: ObjectId,
        chars: &Characteristics,
        controller: PlayerId,
        ctx: &FilterContext,
    ) -> bool {
        if self.other && ctx.source == Some(id) {
            return false;
        }
        if let Some(t) = self.card_type {
            if !chars.has_type(t) {
                return false;
            }
        }
        if let Some(subtype) = &self.subtype {
            if !chars.has_subtype(subtype) {
                return false;
            }
        }
        if let Some(keyword) = self.keyword {
            if !chars.has_keyword(keyword) {
                return false;
            }
        }
        if let Some(color) = self.color {
            if !chars.colors.contains(color) {
                return false;
            }
        }
        self.controller.admits(controller, ctx.you)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flyer() -> Characteristics {
        let mut chars = Characteristics::named("Bird");
        chars.card_types.push(CardType::Creature);
        chars.keywords.insert(Keyword::Flying);
        chars
    }

    #[test]
    fn test_other_excludes_source() {
        let ctx = FilterContext {
            you: PlayerId::new(0),
            source: Some(ObjectId(3)),
        };
        let filter = ObjectFilter::creature().other();
        assert!(!filter.matches(ObjectId(3), &flyer(), PlayerId::new(0), &ctx));
        assert!(filter.matches(ObjectId(4), &flyer(), PlayerId::new(0), &ctx));
    }

    #[test]
    fn test_keyword_and_opponent() {
        let ctx = FilterContext {
            you: PlayerId::new(0),
            source: None,
        };
        let filter = ObjectFilter::creature()
            .with_keyword(Keyword::Flying)
            .controlled_by(ControllerRel::Opponent);
        assert!(filter.matches(ObjectId(1), &flyer(), PlayerId::new(1), &ctx));
        assert!(!filter.matches(ObjectId(1), &flyer(), PlayerId::new(0), &ctx));
        assert!(!ObjectFilter::of_type(CardType::Land).matches(ObjectId(1), &flyer(), PlayerId::new(0), &ctx));
    }
}
