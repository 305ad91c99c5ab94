//! Trigger detection, APNAP stacking and intervening-if guards.

mod common;

use std::sync::Arc;

use common::*;
use duel_rules::agent::{PassingAgent, ScriptedAgent};
use duel_rules::effects::{Effect, ResolutionOutcome};
use duel_rules::log::TransitionRecord;
use duel_rules::objects::{Ability, CardDefinition, ObjectFilter, TriggeredAbility};
use duel_rules::triggers::{detect, TriggerCondition};
use duel_rules::Game;

/// A 1/1 that gains its controller 1 life whenever another creature
/// enters.
fn watcher(name: &str) -> Arc<CardDefinition> {
    Arc::new(
        CardDefinition::creature(name, "1W", 1, 1).with_ability(Ability::Triggered(TriggeredAbility {
            condition: TriggerCondition::EntersBattlefield(ObjectFilter::creature().other()),
            guard: None,
            effects: vec![Effect::gain_life(1)],
            targets: Vec::new(),
        })),
    )
}

fn top_name(game: &Game) -> String {
    game.state.stack.top().map(|e| e.name.clone()).unwrap_or_default()
}

#[test]
fn test_nonactive_trigger_ends_on_top() {
    let mut game = passing_game();
    put(&mut game, watcher("Dawn Watcher"), p0());
    put(&mut game, watcher("Dusk Watcher"), p1());
    quiet(&mut game);

    put(&mut game, card("Grove Bear"), p0());
    let report = game.settle().unwrap();

    assert_eq!(report.triggers_stacked, 2);
    assert_eq!(game.state.stack.top().unwrap().controller, p1());
    assert_eq!(top_name(&game), "Dusk Watcher");

    game.resolve_top().unwrap();
    game.resolve_top().unwrap();
    assert_eq!(life(&game, p0()), 21);
    assert_eq!(life(&game, p1()), 21);
}

#[test]
fn test_apnap_follows_active_player() {
    let mut game = passing_game();
    put(&mut game, watcher("Dawn Watcher"), p0());
    put(&mut game, watcher("Dusk Watcher"), p1());
    quiet(&mut game);
    game.state.turn.active = p1();

    put(&mut game, card("Grove Bear"), p1());
    game.settle().unwrap();
    assert_eq!(game.state.stack.top().unwrap().controller, p0());
}

fn top_after_ordering(order: Option<Vec<usize>>) -> String {
    let scripted = match order {
        Some(order) => ScriptedAgent::new().then_order(order),
        None => ScriptedAgent::new(),
    };
    let mut game = game_with([Box::new(scripted), Box::new(PassingAgent)]);
    put(&mut game, watcher("First Watcher"), p0());
    put(&mut game, watcher("Second Watcher"), p0());
    quiet(&mut game);
    put(&mut game, card("Grove Bear"), p0());
    game.settle().unwrap();
    assert_eq!(game.state.stack.len(), 2);
    top_name(&game)
}

#[test]
fn test_controller_orders_own_triggers() {
    assert_eq!(top_after_ordering(None), "Second Watcher");
    assert_eq!(top_after_ordering(Some(vec![1, 0])), "First Watcher");
}

#[test]
fn test_dies_trigger_judges_last_known_information() {
    let mut game = passing_game();
    put(&mut game, card("Marsh Wraith"), p0());
    let bear = put(&mut game, card("Grove Bear"), p1());
    quiet(&mut game);

    game.destroy(bear).unwrap();
    assert_eq!(game.settle().unwrap().triggers_stacked, 1);
    assert_eq!(game.resolve_top().unwrap(), ResolutionOutcome::Resolved);
    assert_eq!(life(&game, p0()), 21);
}

#[test]
fn test_own_death_trigger_resolves_from_graveyard() {
    let mut game = passing_game();
    let priest = put(&mut game, card("Carrion Priest"), p0());
    game.state.player_mut(p0()).life = 10;
    quiet(&mut game);

    game.destroy(priest).unwrap();
    assert_eq!(game.settle().unwrap().triggers_stacked, 1);
    game.resolve_top().unwrap();
    assert_eq!(life(&game, p1()), 18);
}

#[test]
fn test_guard_false_at_detection_never_triggers() {
    let mut game = passing_game();
    let priest = put(&mut game, card("Carrion Priest"), p0());
    quiet(&mut game);

    game.destroy(priest).unwrap();
    assert_eq!(game.settle().unwrap().triggers_stacked, 0);
    assert!(game.state.stack.is_empty());
}

#[test]
fn test_guard_rechecked_when_stacking() {
    let mut game = passing_game();
    let priest = put(&mut game, card("Carrion Priest"), p0());
    game.state.player_mut(p0()).life = 10;
    quiet(&mut game);

    game.destroy(priest).unwrap();
    assert_eq!(detect(&mut game.state), 1);
    game.state.player_mut(p0()).life = 15;

    assert_eq!(game.stack_pending_triggers().unwrap(), 0);
    assert!(game.state.stack.is_empty());
    assert!(game
        .state
        .log
        .records()
        .any(|r| matches!(r, TransitionRecord::TriggerDiscarded { controller, .. } if *controller == p0())));
}

#[test]
fn test_enter_trigger_creates_tokens() {
    let mut game = passing_game();
    put(&mut game, card("Choir Recruiter"), p0());
    game.settle().unwrap();
    assert_eq!(top_name(&game), "Choir Recruiter");

    game.resolve_top().unwrap();
    let soldiers = game
        .state
        .battlefield()
        .filter(|o| o.is_token && o.name() == "Soldier" && o.controller == p0())
        .count();
    assert_eq!(soldiers, 2);
}

#[test]
fn test_departed_source_unsubscribes() {
    let mut game = passing_game();
    let wraith = put(&mut game, card("Marsh Wraith"), p0());
    let bear = put(&mut game, card("Grove Bear"), p0());
    game.settle().unwrap();

    game.destroy(wraith).unwrap();
    game.settle().unwrap();
    assert!(game.state.triggers.is_empty());

    game.destroy(bear).unwrap();
    assert_eq!(game.settle().unwrap().triggers_stacked, 0);
}
