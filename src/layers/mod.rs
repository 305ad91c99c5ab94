//! Continuous effect layer engine.
//!
//! Computed characteristics are a pure function of printed characteristics
//! and the active modification set. Modifications are applied in seven
//! fixed layers (the power/toughness layer in five sub-steps); within a
//! stage they apply in timestamp order except where dependencies force a
//! different order.
//!
//! ## Key Types
//!
//! - `Modification`: one continuous effect instance
//! - `ContinuousEffects`: the active set
//! - `Stage`, `Layer`, `PtSublayer`: application order
//! - `compute` / `recompute`: the recomputation pass

pub mod dependency;
pub mod engine;
pub mod modification;

pub use dependency::{order_by_dependencies, DependencyOrder};
pub use engine::{compute, recompute, Computed};
pub use modification::{
    AffectedSet, ContinuousEffects, Duration, Layer, Modification, ModificationKind, PtDefinition,
    PtSublayer, Stage,
};
