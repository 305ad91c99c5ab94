//! The stack: spells and abilities waiting to resolve.
//!
//! Entries resolve strictly last in, first out. Popping an entry removes it
//! from the stack in the same step as its resolution attempt; resolution
//! itself lives in the engine, which re-validates targets and decides
//! between resolving and fizzling.
//!
//! ## Example
//!
//! ```
//! use duel_rules::core::{IdAllocator, ObjectId, PlayerId};
//! use duel_rules::stack::{EntryKind, Stack, StackEntry};
//!
//! let mut ids = IdAllocator::default();
//! let mut stack = Stack::default();
//! let first = stack.push(StackEntry::new(EntryKind::Spell, "Shock", ObjectId(1), PlayerId::new(0)), &mut ids);
//! let second = stack.push(StackEntry::new(EntryKind::Spell, "Giant Growth", ObjectId(2), PlayerId::new(1)), &mut ids);
//! assert_eq!(stack.pop().map(|e| e.id), Some(second));
//! assert_eq!(stack.pop().map(|e| e.id), Some(first));
//! assert!(stack.is_empty());
//! ```

mod entry;

pub use entry::{EntryKind, StackEntry};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{IdAllocator, ObjectId, StackEntryId};

/// LIFO queue of pending spells and abilities.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    /// Bottom first.
    entries: Vec<StackEntry>,
}

impl Stack {
    /// Put an entry on top with a fresh id and timestamp.
    pub fn push(&mut self, mut entry: StackEntry, ids: &mut IdAllocator) -> StackEntryId {
        entry.id = ids.next_stack_entry();
        entry.timestamp = ids.tick();
        debug!(entry = %entry.id, name = %entry.name, controller = %entry.controller, "pushed onto stack");
        let id = entry.id;
        self.entries.push(entry);
        id
    }

    /// Remove the top entry.
    pub fn pop(&mut self) -> Option<StackEntry> {
        self.entries.pop()
    }

    #[must_use]
    pub fn top(&self) -> Option<&StackEntry> {
        self.entries.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from bottom to top.
    pub fn iter(&self) -> impl Iterator<Item = &StackEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn get(&self, id: StackEntryId) -> Option<&StackEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// The spell entry whose card is `object`.
    #[must_use]
    pub fn spell_for(&self, object: ObjectId) -> Option<&StackEntry> {
        self.entries.iter().find(|e| e.is_spell() && e.source == object)
    }

    /// Take an entry out from anywhere in the stack (countering).
    pub fn remove(&mut self, id: StackEntryId) -> Option<StackEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::PlayerId;

    fn entry(source: u32) -> StackEntry {
        StackEntry::new(EntryKind::Spell, "Spell", ObjectId(source), PlayerId::new(0))
    }

    #[test]
    fn test_push_stamps_fresh_timestamps() {
        let mut ids = IdAllocator::default();
        let mut stack = Stack::default();
        stack.push(entry(1), &mut ids);
        stack.push(entry(2), &mut ids);
        let stamps: Vec<_> = stack.iter().map(|e| e.timestamp).collect();
        assert!(stamps[0] < stamps[1]);
    }

    #[test]
    fn test_remove_from_middle() {
        let mut ids = IdAllocator::default();
        let mut stack = Stack::default();
        stack.push(entry(1), &mut ids);
        let middle = stack.push(entry(2), &mut ids);
        stack.push(entry(3), &mut ids);
        assert_eq!(stack.spell_for(ObjectId(2)).map(|e| e.id), Some(middle));
        assert!(stack.remove(middle).is_some());
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.top().map(|e| e.source), Some(ObjectId(3)));
        assert!(stack.remove(middle).is_none());
    }

    #[test]
    fn test_pop_empty() {
        let mut stack = Stack::default();
        assert!(stack.pop().is_none());
        assert!(stack.top().is_none());
    }
}
