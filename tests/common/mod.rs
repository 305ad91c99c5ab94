//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use duel_rules::agent::{Agent, GameView, PassingAgent};
use duel_rules::catalog;
use duel_rules::core::{Action, Color, MatchConfig, ObjectId, PlayerId, Step, TurnContext};
use duel_rules::rules::{Block, BlockOption};
use duel_rules::objects::{CardDefinition, CardProvider};
use duel_rules::zones::{ZoneId, ZonePosition};
use duel_rules::Game;

pub fn p0() -> PlayerId {
    PlayerId::new(0)
}

pub fn p1() -> PlayerId {
    PlayerId::new(1)
}

/// A catalog card by name.
pub fn card(name: &str) -> Arc<CardDefinition> {
    catalog::registry()
        .definition(name)
        .unwrap_or_else(|| panic!("no catalog card named {name}"))
}

/// A game on turn 1, player 0's precombat main phase, with ten basic
/// lands in each library and no pending events.
pub fn game_with(agents: [Box<dyn Agent>; 2]) -> Game {
    game_with_config(MatchConfig::default(), agents)
}

pub fn game_with_config(config: MatchConfig, agents: [Box<dyn Agent>; 2]) -> Game {
    let mut game = Game::new(config, Vec::from(agents)).unwrap();
    for player in [p0(), p1()] {
        let land = Arc::new(CardDefinition::basic_land("Forest", Color::Green));
        for _ in 0..10 {
            game.state
                .create_object(land.clone(), player, ZoneId::library(player), ZonePosition::Top, false)
                .unwrap();
        }
    }
    at_step(&mut game, Step::PrecombatMain);
    quiet(&mut game);
    game
}

/// Both seats pass every time.
pub fn passing_game() -> Game {
    game_with([Box::new(PassingAgent), Box::new(PassingAgent)])
}

/// Move the game to `step` of player 0's first turn.
pub fn at_step(game: &mut Game, step: Step) {
    game.state.turn = TurnContext {
        number: 1,
        active: p0(),
        step,
    };
}

/// Put a permanent onto the battlefield, ready to attack or tap.
pub fn put(game: &mut Game, def: impl Into<Arc<CardDefinition>>, owner: PlayerId) -> ObjectId {
    let id = game
        .state
        .create_object(def.into(), owner, ZoneId::battlefield(), ZonePosition::Top, false)
        .unwrap();
    game.state.permanent_mut(id).unwrap().summoning_sick = false;
    game.state.recompute();
    id
}

/// Put a card into its owner's hand.
pub fn in_hand(game: &mut Game, def: impl Into<Arc<CardDefinition>>, owner: PlayerId) -> ObjectId {
    game.state
        .create_object(def.into(), owner, ZoneId::hand(owner), ZonePosition::Top, false)
        .unwrap()
}

/// Forget queued events and triggers from board setup.
pub fn quiet(game: &mut Game) {
    game.state.events.clear();
    game.state.pending.clear();
}

pub fn life(game: &Game, player: PlayerId) -> i32 {
    game.state.player(player).life
}

pub fn damage_on(game: &Game, id: ObjectId) -> u32 {
    game.state.object(id).map_or(0, |o| o.damage())
}

pub fn on_battlefield(game: &Game, id: ObjectId) -> bool {
    game.state.object(id).is_some_and(|o| o.is_on_battlefield())
}

/// Names of the cards in a player's graveyard.
pub fn graveyard_names(game: &Game, player: PlayerId) -> Vec<String> {
    game.state
        .graveyard(player)
        .iter()
        .filter_map(|id| game.state.object(*id))
        .map(|o| o.name().to_string())
        .collect()
}

/// Attacks with everything it can and otherwise passes.
#[derive(Clone, Copy, Debug, Default)]
pub struct AttackAll;

impl Agent for AttackAll {
    fn choose_action(&mut self, _view: &GameView, _legal: &[Action]) -> Action {
        Action::Pass
    }

    fn choose_attackers(&mut self, _view: &GameView, candidates: &[ObjectId]) -> Vec<ObjectId> {
        candidates.to_vec()
    }
}

/// Blocks the first attacker each of its creatures can block.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockAll;

impl Agent for BlockAll {
    fn choose_action(&mut self, _view: &GameView, _legal: &[Action]) -> Action {
        Action::Pass
    }

    fn choose_blockers(&mut self, _view: &GameView, options: &[BlockOption]) -> Vec<Block> {
        options
            .iter()
            .filter_map(|o| o.attackers.first().map(|&attacker| Block { blocker: o.blocker, attacker }))
            .collect()
    }
}
