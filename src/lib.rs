//! # duel-rules
//!
//! A deterministic rules-resolution runtime for two-player trading card
//! games.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: one seed, one deck order, one sequence of agent
//!    answers always produce the same match and the same transition log.
//!
//! 2. **Derived characteristics**: nothing stores a computed power or
//!    toughness. Printed values plus continuous effects are re-applied
//!    layer by layer on every recompute.
//!
//! 3. **Rules errors are values**: illegal actions and illegal declarations
//!    are rejected and logged. Only broken invariants end a match early.
//!
//! ## Architecture
//!
//! - **Persistent state**: `GameState` is built on `im-rs` collections, so
//!   snapshots for last-known information and aborted matches are cheap.
//!
//! - **Agents at the edges**: every choice a player makes goes through the
//!   [`agent::Agent`] trait; the engine never guesses on a player's behalf.
//!
//! ## Modules
//!
//! - `core`: ids, players, mana, configuration, errors, RNG, game state
//! - `zones`: zone ownership and ordering
//! - `objects`: card definitions, game objects, counters, filters
//! - `effects`: effect descriptors and targeting
//! - `layers`: continuous effects and the seven-layer recompute
//! - `replacement`: replacement effects and the event router
//! - `stack`: the LIFO stack
//! - `triggers`: trigger registrations, detection and APNAP grouping
//! - `rules`: turn structure, priority, timing, combat, damage, cleanup checks
//! - `agent`: player decision interface and built-in agents
//! - `log`: append-only transition log
//! - `engine`: the match driver tying everything together
//! - `catalog`: sample cards and decks

pub mod core;
pub mod zones;
pub mod objects;
pub mod effects;
pub mod layers;
pub mod replacement;
pub mod stack;
pub mod triggers;
pub mod rules;
pub mod agent;
pub mod log;
pub mod engine;
pub mod catalog;

// Re-export commonly used types
pub use crate::core::{
    Action, ActionOutcome, Color, EngineError, EngineResult, GameResult, GameState, MatchConfig, ObjectId,
    PlayerId, RejectReason,
};

pub use crate::objects::{CardDefinition, CardRegistry};

pub use crate::agent::{Agent, PassingAgent, RandomAgent, ScriptedAgent};

pub use crate::log::{TransitionLog, TransitionRecord};

pub use crate::engine::{run_match, Game, MatchAborted, MatchOutcome};
