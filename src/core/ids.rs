//! Identifier newtypes.
//!
//! Every game object, stack entry, continuous effect and subscription gets a
//! unique, monotonically allocated id. Ids are never reused within a match,
//! so a stale id (for example the id an object had before it changed zones)
//! can always be told apart from the live object.
//!
//! ## Usage
//!
//! ```
//! use duel_rules::core::{IdAllocator, ObjectId};
//!
//! let mut ids = IdAllocator::default();
//! let first: ObjectId = ids.next_object();
//! let second = ids.next_object();
//! assert!(second > first);
//! assert_eq!(format!("{}", first), "Object(1)");
//! ```

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Create an id from its raw value.
            #[must_use]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Get the raw id value.
            #[must_use]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }
    };
}

id_newtype!(
    /// Identity of a game object. A zone change produces a new object id.
    ObjectId,
    "Object"
);
id_newtype!(
    /// Identity of an entry on the stack.
    StackEntryId,
    "StackEntry"
);
id_newtype!(
    /// Identity of a continuous effect instance.
    ModificationId,
    "Modification"
);
id_newtype!(
    /// Identity of a registered replacement effect.
    ReplacementId,
    "Replacement"
);
id_newtype!(
    /// Identity of a trigger subscription.
    RegistrationId,
    "Registration"
);

/// Global ordering stamp for objects, modifications and stack entries.
///
/// Later events get larger timestamps; layer ordering and APNAP-independent
/// tie breaks compare these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t{}", self.0)
    }
}

/// Allocates every id kind plus the timestamp clock.
///
/// Lives inside `GameState` so a cloned state keeps allocating from where
/// the original left off.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct IdAllocator {
    next_object: u32,
    next_stack_entry: u32,
    next_modification: u32,
    next_replacement: u32,
    next_registration: u32,
    clock: u64,
}

impl IdAllocator {
    /// Allocate a fresh object id.
    pub fn next_object(&mut self) -> ObjectId {
        self.next_object += 1;
        ObjectId(self.next_object)
    }

    /// Allocate a fresh stack entry id.
    pub fn next_stack_entry(&mut self) -> StackEntryId {
        self.next_stack_entry += 1;
        StackEntryId(self.next_stack_entry)
    }

    /// Allocate a fresh modification id.
    pub fn next_modification(&mut self) -> ModificationId {
        self.next_modification += 1;
        ModificationId(self.next_modification)
    }

    /// Allocate a fresh replacement id.
    pub fn next_replacement(&mut self) -> ReplacementId {
        self.next_replacement += 1;
        ReplacementId(self.next_replacement)
    }

    /// Allocate a fresh trigger registration id.
    pub fn next_registration(&mut self) -> RegistrationId {
        self.next_registration += 1;
        RegistrationId(self.next_registration)
    }

    /// Advance the clock and return the new timestamp.
    pub fn tick(&mut self) -> Timestamp {
        self.clock += 1;
        Timestamp(self.clock)
    }

    /// The most recently issued timestamp.
    #[must_use]
    pub fn now(&self) -> Timestamp {
        Timestamp(self.clock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic_per_kind() {
        let mut ids = IdAllocator::default();
        let a = ids.next_object();
        let m = ids.next_modification();
        let b = ids.next_object();
        assert_eq!(a, ObjectId(1));
        assert_eq!(b, ObjectId(2));
        assert_eq!(m, ModificationId(1));
    }

    #[test]
    fn test_clock_ticks() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.now(), Timestamp(0));
        let t1 = ids.tick();
        let t2 = ids.tick();
        assert!(t2 > t1);
        assert_eq!(ids.now(), t2);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", StackEntryId(3)), "StackEntry(3)");
        assert_eq!(format!("{}", Timestamp(9)), "t9");
    }
}
