//! Counters placed on permanents.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Kinds of counter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CounterKind {
    /// +1/+1. Annihilates with `MinusOne`.
    PlusOne,
    /// -1/-1. Annihilates with `PlusOne`.
    MinusOne,
    Loyalty,
    Charge,
}

impl std::fmt::Display for CounterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CounterKind::PlusOne => "+1/+1",
            CounterKind::MinusOne => "-1/-1",
            CounterKind::Loyalty => "loyalty",
            CounterKind::Charge => "charge",
        };
        f.write_str(name)
    }
}

/// A multiset of counters. Kinds with a zero count are never stored.
///
/// ```
/// use duel_rules::objects::{CounterKind, CounterSet};
///
/// let mut counters = CounterSet::default();
/// counters.add(CounterKind::PlusOne, 2);
/// assert_eq!(counters.remove(CounterKind::PlusOne, 5), 2);
/// assert!(counters.is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSet {
    entries: SmallVec<[(CounterKind, u32); 2]>,
}

impl CounterSet {
    /// Count of one kind.
    #[must_use]
    pub fn get(&self, kind: CounterKind) -> u32 {
        self.entries
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, n)| *n)
    }

    /// Add counters of one kind.
    pub fn add(&mut self, kind: CounterKind, count: u32) {
        if count == 0 {
            return;
        }
        match self.entries.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, n)) => *n += count,
            None => {
                self.entries.push((kind, count));
                self.entries.sort_by_key(|(k, _)| *k);
            }
        }
    }

    /// Remove up to `count` counters of one kind. Returns how many were
    /// actually removed.
    pub fn remove(&mut self, kind: CounterKind, count: u32) -> u32 {
        let Some(pos) = self.entries.iter().position(|(k, _)| *k == kind) else {
            return 0;
        };
        let removed = count.min(self.entries[pos].1);
        self.entries[pos].1 -= removed;
        if self.entries[pos].1 == 0 {
            self.entries.remove(pos);
        }
        removed
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `(kind, count)` pairs in kind order.
    pub fn iter(&self) -> impl Iterator<Item = (CounterKind, u32)> + '_ {
        self.entries.iter().copied()
    }

    /// Net power/toughness adjustment from +1/+1 and -1/-1 counters.
    #[must_use]
    pub fn pt_delta(&self) -> i32 {
        self.get(CounterKind::PlusOne) as i32 - self.get(CounterKind::MinusOne) as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_merges_and_sorts() {
        let mut counters = CounterSet::default();
        counters.add(CounterKind::MinusOne, 1);
        counters.add(CounterKind::PlusOne, 2);
        counters.add(CounterKind::PlusOne, 1);
        counters.add(CounterKind::Charge, 0);
        let all: Vec<_> = counters.iter().collect();
        assert_eq!(all, vec![(CounterKind::PlusOne, 3), (CounterKind::MinusOne, 1)]);
        assert_eq!(counters.pt_delta(), 2);
    }

    #[test]
    fn test_remove_missing_kind() {
        let mut counters = CounterSet::default();
        assert_eq!(counters.remove(CounterKind::Loyalty, 1), 0);
    }
}
