//! Replacement effects.
//!
//! A replacement effect watches for a proposed state change and modifies or
//! negates it before it happens. Every damage event, zone move, draw, life
//! gain and counter placement goes through [`route`] first.
//!
//! ## Key Types
//!
//! - `ReplaceableEvent`: a proposed change
//! - `ReplacementEffect`: an active effect with condition and action
//! - `ReplacementRegistry`: the active set
//! - `ReplacementChooser`: who picks between competing effects

mod effect;
mod event;
mod router;

pub use effect::{
    ReplacementAction, ReplacementCondition, ReplacementEffect, ReplacementLifetime, ReplacementRegistry,
};
pub use event::ReplaceableEvent;
pub use router::{route, FirstRegistered, ReplacementChooser, Routed};
