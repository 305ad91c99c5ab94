//! Card definition lookup.
//!
//! The runtime consumes card data only through [`CardProvider`]. The
//! in-memory [`CardRegistry`] is the provider used by the bundled catalog
//! and tests.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::definition::CardDefinition;

/// Supplies definitions by card name.
pub trait CardProvider {
    /// Definition for `name`, if known.
    fn definition(&self, name: &str) -> Option<Arc<CardDefinition>>;
}

/// In-memory registry of definitions.
///
/// ## Example
///
/// ```
/// use duel_rules::objects::{CardDefinition, CardProvider, CardRegistry};
///
/// let mut registry = CardRegistry::new();
/// registry.register(CardDefinition::creature("Grizzly Bears", "1G", 2, 2));
/// assert!(registry.definition("Grizzly Bears").is_some());
/// assert!(registry.definition("Black Lotus").is_none());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<String, Arc<CardDefinition>>,
    names: Vec<String>,
}

impl CardRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition. A later definition with the same name replaces the
    /// earlier one.
    pub fn register(&mut self, card: CardDefinition) -> Arc<CardDefinition> {
        let name = card.name().to_string();
        let card = Arc::new(card);
        if self.cards.insert(name.clone(), Arc::clone(&card)).is_none() {
            self.names.push(name);
        }
        card
    }

    /// Names in registration order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Resolve a deck list of names into definitions.
    pub fn deck(&self, names: &[&str]) -> Result<Vec<Arc<CardDefinition>>, String> {
        names
            .iter()
            .map(|name| {
                self.definition(name)
                    .ok_or_else(|| format!("unknown card \"{name}\""))
            })
            .collect()
    }
}

impl CardProvider for CardRegistry {
    fn definition(&self, name: &str) -> Option<Arc<CardDefinition>> {
        self.cards.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = CardRegistry::new();
        registry.register(CardDefinition::creature("Bear", "1G", 2, 2));
        registry.register(CardDefinition::creature("Bear", "1G", 3, 3));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names(), &["Bear".to_string()]);
        let bear = registry.definition("Bear").unwrap();
        assert_eq!(bear.characteristics.power, Some(3));
    }

    #[test]
    fn test_deck_reports_unknown_names() {
        let mut registry = CardRegistry::new();
        registry.register(CardDefinition::instant("Shock", "R"));
        assert_eq!(registry.deck(&["Shock", "Shock"]).unwrap().len(), 2);
        assert!(registry.deck(&["Shock", "Nope"]).unwrap_err().contains("Nope"));
    }
}
