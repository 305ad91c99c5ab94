//! Game objects: characteristics, definitions, counters and filters.
//!
//! ## Key Types
//!
//! - `Characteristics`: printed or computed values of an object
//! - `CardDefinition`: printed template plus structured abilities
//! - `GameObject`: a live object in a zone
//! - `PermanentState`: tap state, damage, counters, attachment
//! - `LastKnown`: snapshot of an object that left its zone
//! - `ObjectFilter`: predicate over objects
//! - `CardProvider`: descriptor lookup by name

pub mod characteristics;
pub mod counters;
pub mod definition;
pub mod filter;
pub mod object;
pub mod registry;

pub use characteristics::{CardType, Characteristics, ColorSet, Keyword, KeywordSet, Supertype};
pub use counters::{CounterKind, CounterSet};
pub use definition::{
    Ability, AbilityCost, ActivatedAbility, CardDefinition, ManaAbility, ReplacementTemplate,
    SpellAbility, StaticAbility, TokenSpec, TriggeredAbility,
};
pub use filter::{ControllerRel, FilterContext, ObjectFilter};
pub use object::{GameObject, LastKnown, PermanentState};
pub use registry::{CardProvider, CardRegistry};
