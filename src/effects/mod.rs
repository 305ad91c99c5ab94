//! Effect descriptors, targeting and resolution context.
//!
//! - `Effect`: closed set of things an ability can do
//! - `TargetSpec` / `Target`: what may be chosen and what was chosen
//! - `ResolverContext`: maps effect references to players, objects and
//!   numbers while an entry resolves
//!
//! Executing an effect is the engine's job; this module only describes
//! effects and evaluates their references.

mod effect;
mod resolver;
mod targeting;

pub use effect::{Amount, Effect, EffectTarget, PreventionScope};
pub use resolver::{ResolutionOutcome, ResolverContext};
pub use targeting::{Target, TargetSpec};
