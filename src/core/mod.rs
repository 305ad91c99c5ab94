//! Core types: ids, players, configuration, errors, mana, actions and the
//! match state.

pub mod action;
pub mod config;
pub mod error;
pub mod ids;
pub mod mana;
pub mod player;
pub mod rng;
pub mod state;

pub use action::{Action, ActionOutcome, RejectReason};
pub use config::{ConfigError, MatchConfig};
pub use error::{EngineError, EngineResult};
pub use ids::{IdAllocator, ModificationId, ObjectId, RegistrationId, ReplacementId, StackEntryId, Timestamp};
pub use mana::{Color, Mana, ManaCost, ManaPool};
pub use player::{EndReason, LossReason, PlayerId, PlayerMap, PlayerState, TurnOrder};
pub use rng::{GameRng, GameRngState};
pub use state::{GameResult, GameState, ZoneTransition};

pub use crate::rules::{Step, TurnContext};
