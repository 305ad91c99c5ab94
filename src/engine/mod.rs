//! The match driver.
//!
//! [`Game`] owns the state and the seated agents and walks turns until the
//! match ends. Each submodule adds one slice of behavior to `Game`:
//!
//! - `ops`: primitive mutations routed through replacement effects
//! - `actions`: executing priority actions
//! - `resolve`: resolving the top of the stack
//! - `settle`: the cleanup loop and putting triggers on the stack
//! - `combat`: declarations and combat damage
//! - `turn`: steps, priority rounds and whole turns
//!
//! [`run_match`] is the one-call entry point.

mod actions;
mod combat;
mod ops;
mod resolve;
mod settle;
mod turn;

pub use settle::SettleReport;
pub use turn::RoundSummary;

use std::sync::Arc;

use tracing::{info, warn};

use crate::agent::{Agent, Decisions};
use crate::core::{
    EndReason, EngineError, EngineResult, GameResult, GameState, MatchConfig, PlayerId, Step, TurnContext,
};
use crate::log::{TransitionLog, TransitionRecord, TransitionSink};
use crate::objects::CardDefinition;
use crate::zones::{ZoneId, ZonePosition};

/// One match in progress.
pub struct Game {
    pub state: GameState,
    decisions: Decisions,
    sinks: Vec<Box<dyn TransitionSink>>,
    flushed: u64,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("turn", &self.state.turn)
            .field("seats", &self.decisions.seats())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl Game {
    /// A game with empty zones and one agent per seat.
    ///
    /// An invalid configuration is reported as an invariant violation.
    pub fn new(config: MatchConfig, agents: Vec<Box<dyn Agent>>) -> EngineResult<Self> {
        config
            .validate()
            .map_err(|e| EngineError::invariant(0, e.to_string()))?;
        let state = GameState::new(config);
        if agents.len() != state.player_count() {
            return Err(EngineError::invariant(
                0,
                format!("{} agents for {} seats", agents.len(), state.player_count()),
            ));
        }
        Ok(Self {
            state,
            decisions: Decisions::new(agents),
            sinks: Vec::new(),
            flushed: 0,
        })
    }

    /// Stream transition records to `sink` as they are produced.
    pub fn add_sink(&mut self, sink: Box<dyn TransitionSink>) {
        self.sinks.push(sink);
    }

    /// Hand every record not yet seen to the sinks.
    pub fn flush_sinks(&mut self) {
        let total = self.state.log.len() as u64;
        for transition in self.state.log.since(self.flushed) {
            for sink in &mut self.sinks {
                sink.observe(transition);
            }
        }
        self.flushed = total;
    }

    /// Fill and shuffle the libraries, pick the starting player and draw
    /// opening hands.
    pub fn setup(&mut self, decks: [Vec<Arc<CardDefinition>>; 2]) -> EngineResult<()> {
        for (seat, deck) in decks.into_iter().enumerate() {
            let player = PlayerId::new(seat as u8);
            for definition in deck {
                self.state
                    .create_object(definition, player, ZoneId::library(player), ZonePosition::Top, false)?;
            }
            let mut rng = self.state.rng.for_seat(player);
            self.state.zones.shuffle(ZoneId::library(player), &mut rng);
        }

        let first = PlayerId::new(self.state.rng.below(self.state.player_count()) as u8);
        self.state.turn = TurnContext::pregame(first);
        let hand_size = self.state.config.starting_hand_size;
        let seats: Vec<PlayerId> = self.state.order.starting_from(first).collect();
        for player in seats {
            for _ in 0..hand_size {
                self.draw(player)?;
            }
        }
        info!(%first, hand_size, "match set up");
        self.flush_sinks();
        Ok(())
    }

    /// Play turns until the match ends.
    pub fn run(&mut self) -> EngineResult<GameResult> {
        loop {
            if let Some(result) = self.state.result {
                self.flush_sinks();
                return Ok(result);
            }
            if let Some(limit) = self.state.config.turn_limit {
                if self.state.turn_number() >= limit {
                    self.finish(None, EndReason::TurnLimit);
                    continue;
                }
            }
            self.run_turn()?;
        }
    }

    /// End the match. Later calls are ignored.
    pub(crate) fn finish(&mut self, winner: Option<PlayerId>, reason: EndReason) {
        if self.state.result.is_some() {
            return;
        }
        let turn = self.state.turn_number();
        self.state.result = Some(GameResult { winner, reason });
        self.state.record(TransitionRecord::GameEnded { winner, reason, turn });
        info!(?winner, %reason, turn, "match over");
    }

    fn abort(mut self, error: EngineError) -> MatchAborted {
        self.flush_sinks();
        warn!(%error, "match aborted");
        MatchAborted {
            turn: self.state.turn_number(),
            step: self.state.step(),
            error,
            state: Box::new(self.state),
        }
    }
}

/// How a completed match ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchOutcome {
    /// `None` for a draw.
    pub winner: Option<PlayerId>,
    pub reason: EndReason,
    pub turns: u32,
    pub log: TransitionLog,
}

/// A match stopped by an [`EngineError`]. Carries the state at the point
/// of failure for diagnosis.
#[derive(Debug, thiserror::Error)]
#[error("match aborted on turn {turn} in {step}: {error}")]
pub struct MatchAborted {
    #[source]
    pub error: EngineError,
    pub turn: u32,
    pub step: Step,
    pub state: Box<GameState>,
}

/// Play one complete match between two agents.
///
/// `decks` are dealt to seats 0 and 1. The result is deterministic for a
/// given configuration seed, pair of decks and pair of deterministic
/// agents.
pub fn run_match(
    config: MatchConfig,
    decks: [Vec<Arc<CardDefinition>>; 2],
    agents: [Box<dyn Agent>; 2],
) -> Result<MatchOutcome, MatchAborted> {
    let mut game = match Game::new(config.clone(), Vec::from(agents)) {
        Ok(game) => game,
        Err(error) => {
            return Err(MatchAborted {
                turn: 0,
                step: Step::Untap,
                error,
                state: Box::new(GameState::new(config)),
            })
        }
    };
    let played = game.setup(decks).and_then(|()| game.run());
    match played {
        Ok(result) => Ok(MatchOutcome {
            winner: result.winner,
            reason: result.reason,
            turns: game.state.turn_number(),
            log: game.state.log.clone(),
        }),
        Err(error) => Err(game.abort(error)),
    }
}
