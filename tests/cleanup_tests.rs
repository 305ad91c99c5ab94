//! The cleanup loop: state corrections, player losses and idempotence.

mod common;

use common::*;
use duel_rules::agent::{PassingAgent, ScriptedAgent};
use duel_rules::core::{Color, EndReason, GameResult};
use duel_rules::effects::Target;
use duel_rules::objects::{CardDefinition, CounterKind, TokenSpec};
use duel_rules::zones::ZoneKind;

#[test]
fn test_second_cleanup_finds_nothing() {
    let mut game = passing_game();
    put(&mut game, CardDefinition::creature("Husk", "1B", 0, 0), p0());
    let bear = put(&mut game, CardDefinition::creature("Bear", "1G", 2, 2), p1());
    game.state.permanent_mut(bear).unwrap().damage = 3;

    let first = game.run_cleanup().unwrap();
    assert_eq!(first.corrections, 2);
    assert_eq!(first.passes, 2);

    let second = game.run_cleanup().unwrap();
    assert_eq!(second.passes, 1);
    assert_eq!(second.corrections, 0);
    assert!(game.state.battlefield().next().is_none());
}

#[test]
fn test_deathtouch_damage_is_lethal() {
    let mut game = passing_game();
    let wurm = put(&mut game, CardDefinition::creature("Wurm", "5G", 6, 6), p1());
    let permanent = game.state.permanent_mut(wurm).unwrap();
    permanent.damage = 1;
    permanent.deathtouch_damage = true;
    game.settle().unwrap();
    assert!(!on_battlefield(&game, wurm));
}

#[test]
fn test_one_player_at_zero_life_loses() {
    let mut game = passing_game();
    game.state.player_mut(p1()).life = 0;
    game.settle().unwrap();
    assert_eq!(
        game.state.result,
        Some(GameResult {
            winner: Some(p0()),
            reason: EndReason::LifeLoss,
        })
    );
}

#[test]
fn test_simultaneous_losses_draw() {
    let mut game = passing_game();
    game.state.player_mut(p0()).life = -2;
    game.state.player_mut(p1()).life = 0;
    game.settle().unwrap();
    assert_eq!(
        game.state.result,
        Some(GameResult {
            winner: None,
            reason: EndReason::Draw,
        })
    );
}

#[test]
fn test_drawing_from_empty_library_loses() {
    let mut game = passing_game();
    for _ in 0..10 {
        assert!(game.draw(p1()).unwrap().is_some());
    }
    assert_eq!(game.draw(p1()).unwrap(), None);
    game.settle().unwrap();
    let result = game.state.result.unwrap();
    assert_eq!(result.winner, Some(p0()));
    assert_eq!(result.reason, EndReason::EmptyLibraryDraw);
}

#[test]
fn test_poison_threshold_loses() {
    let mut game = passing_game();
    game.add_poison(p0(), 10);
    game.settle().unwrap();
    let result = game.state.result.unwrap();
    assert_eq!(result.winner, Some(p1()));
    assert_eq!(result.reason, EndReason::PoisonThreshold);
}

#[test]
fn test_legend_rule_keeps_one() {
    let mut game = game_with([Box::new(ScriptedAgent::new().then_option(1)), Box::new(PassingAgent)]);
    let first = put(&mut game, card("Aurel, Sun Marshal"), p0());
    let second = put(&mut game, card("Aurel, Sun Marshal"), p0());
    let report = game.run_cleanup().unwrap();
    assert_eq!(report.corrections, 1);
    let survivors = [first, second].iter().filter(|id| on_battlefield(&game, **id)).count();
    assert_eq!(survivors, 1);
    assert_eq!(graveyard_names(&game, p0()), vec!["Aurel, Sun Marshal"]);
}

#[test]
fn test_legend_rule_ignores_different_controllers() {
    let mut game = passing_game();
    put(&mut game, card("Aurel, Sun Marshal"), p0());
    put(&mut game, card("Aurel, Sun Marshal"), p1());
    assert_eq!(game.run_cleanup().unwrap().corrections, 0);
}

#[test]
fn test_plus_and_minus_counters_annihilate() {
    let mut game = passing_game();
    let bear = put(&mut game, CardDefinition::creature("Bear", "1G", 2, 2), p0());
    game.add_counters(bear, CounterKind::PlusOne, 2).unwrap();
    game.add_counters(bear, CounterKind::MinusOne, 1).unwrap();
    game.settle().unwrap();
    let counters = game.state.object(bear).unwrap().counters();
    assert_eq!(counters.get(CounterKind::PlusOne), 1);
    assert_eq!(counters.get(CounterKind::MinusOne), 0);
}

#[test]
fn test_token_leaving_battlefield_ceases_to_exist() {
    let mut game = passing_game();
    let token = game
        .create_token(&TokenSpec::creature("Soldier", Color::White, 1, 1), p0())
        .unwrap()
        .unwrap();
    let moved = game.move_object(token, ZoneKind::Graveyard, None).unwrap().unwrap();
    assert!(game.state.object(moved).is_some());
    game.settle().unwrap();
    assert!(game.state.object(moved).is_none());
    assert!(game.state.graveyard(p0()).is_empty());
}

#[test]
fn test_planeswalker_without_loyalty_dies() {
    let mut game = passing_game();
    let source = put(&mut game, CardDefinition::creature("Raider", "1R", 3, 1), p1());
    let sage = in_hand(&mut game, CardDefinition::planeswalker("Sage", "2U", 3), p0());
    let sage = game.move_object(sage, ZoneKind::Battlefield, None).unwrap().unwrap();
    assert_eq!(game.state.object(sage).unwrap().counters().get(CounterKind::Loyalty), 3);

    game.deal_damage(source, None, Target::Object(sage), 3, false).unwrap();
    game.settle().unwrap();
    assert!(!on_battlefield(&game, sage));
    assert_eq!(graveyard_names(&game, p0()), vec!["Sage"]);
}
