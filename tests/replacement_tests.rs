//! Replacement routing through the engine operations.

mod common;

use common::*;
use duel_rules::agent::{PassingAgent, ScriptedAgent};
use duel_rules::core::{ObjectId, PlayerId, Step};
use duel_rules::effects::Target;
use duel_rules::log::TransitionRecord;
use duel_rules::objects::{CounterKind, ObjectFilter};
use duel_rules::replacement::{ReplacementAction, ReplacementCondition, ReplacementEffect, ReplacementLifetime};
use duel_rules::zones::ZoneKind;
use duel_rules::Game;

fn register(
    game: &mut Game,
    source: ObjectId,
    controller: PlayerId,
    condition: ReplacementCondition,
    action: ReplacementAction,
) {
    let id = game.state.ids.next_replacement();
    let timestamp = game.state.ids.tick();
    game.state.replacements.add(ReplacementEffect {
        id,
        source,
        controller,
        condition,
        action,
        timestamp,
        lifetime: ReplacementLifetime::UntilEndOfTurn,
    });
}

fn plus_one(game: &Game, id: ObjectId) -> u32 {
    game.state.object(id).map_or(0, |o| o.counters().get(CounterKind::PlusOne))
}

#[test]
fn test_self_replacement_applies_before_doubling() {
    let mut game = passing_game();
    put(&mut game, card("Verdant Abundance"), p0());
    let hydra = in_hand(&mut game, card("Mossborn Hydra"), p0());

    let hydra = game.move_object(hydra, ZoneKind::Battlefield, None).unwrap().unwrap();
    game.state.recompute();

    assert_eq!(plus_one(&game, hydra), 4);
    let computed = &game.state.object(hydra).unwrap().computed;
    assert_eq!((computed.power, computed.toughness), (Some(4), Some(4)));

    game.settle().unwrap();
    assert!(on_battlefield(&game, hydra));
}

#[test]
fn test_hydra_alone_enters_with_two() {
    let mut game = passing_game();
    let hydra = in_hand(&mut game, card("Mossborn Hydra"), p0());
    let hydra = game.move_object(hydra, ZoneKind::Battlefield, None).unwrap().unwrap();
    assert_eq!(plus_one(&game, hydra), 2);
}

#[test]
fn test_doubler_ignores_opponents_creatures() {
    let mut game = passing_game();
    put(&mut game, card("Verdant Abundance"), p0());
    let hydra = in_hand(&mut game, card("Mossborn Hydra"), p1());
    let hydra = game.move_object(hydra, ZoneKind::Battlefield, None).unwrap().unwrap();
    assert_eq!(plus_one(&game, hydra), 2);
}

fn damage_with_competing_replacements(choice: usize) -> i32 {
    let mut game = game_with([Box::new(PassingAgent), Box::new(ScriptedAgent::new().then_option(choice))]);
    let source = put(&mut game, card("Grove Bear"), p0());
    let to_p1 = ReplacementCondition::DamageTo(Target::Player(p1()));
    register(&mut game, source, p0(), to_p1.clone(), ReplacementAction::ModifyAmount(1));
    register(&mut game, source, p0(), to_p1, ReplacementAction::DoubleAmount);

    game.deal_damage(source, None, Target::Player(p1()), 3, false).unwrap();
    20 - life(&game, p1())
}

#[test]
fn test_affected_player_orders_replacements() {
    assert_eq!(damage_with_competing_replacements(0), 8);
    assert_eq!(damage_with_competing_replacements(1), 7);
}

#[test]
fn test_each_replacement_applies_once() {
    let mut game = passing_game();
    put(&mut game, card("Verdant Abundance"), p0());
    put(&mut game, card("Verdant Abundance"), p0());
    let bear = put(&mut game, card("Grove Bear"), p0());

    assert_eq!(game.add_counters(bear, CounterKind::PlusOne, 1).unwrap(), 4);
    assert_eq!(plus_one(&game, bear), 4);
    assert!(game
        .state
        .log
        .records()
        .any(|r| matches!(r, TransitionRecord::CounterChange { object, delta: 4, .. } if *object == bear)));
}

#[test]
fn test_replacement_leaves_with_its_source() {
    let mut game = passing_game();
    let abundance = put(&mut game, card("Verdant Abundance"), p0());
    let bear = put(&mut game, card("Grove Bear"), p0());
    assert_eq!(game.state.replacements.len(), 1);

    game.destroy(abundance).unwrap();
    assert!(game.state.replacements.is_empty());
    assert_eq!(game.add_counters(bear, CounterKind::PlusOne, 1).unwrap(), 1);
}

#[test]
fn test_dying_creature_is_exiled_instead() {
    let mut game = passing_game();
    let bear = put(&mut game, card("Grove Bear"), p1());
    register(
        &mut game,
        bear,
        p0(),
        ReplacementCondition::WouldDie(ObjectFilter::creature()),
        ReplacementAction::ChangeDestination(ZoneKind::Exile),
    );

    let moved = game.destroy(bear).unwrap().unwrap();
    assert_eq!(game.state.object(moved).unwrap().zone.kind, ZoneKind::Exile);
    assert!(game.state.graveyard(p1()).is_empty());
}

#[test]
fn test_prevented_draw_takes_nothing() {
    let mut game = passing_game();
    let source = put(&mut game, card("Grove Bear"), p0());
    register(&mut game, source, p0(), ReplacementCondition::ControllerDraws, ReplacementAction::Prevent);

    assert_eq!(game.draw(p0()).unwrap(), None);
    assert!(game.state.hand(p0()).is_empty());
    assert_eq!(game.state.library(p0()).len(), 10);
    assert!(!game.state.player(p0()).drew_from_empty_library);

    assert!(game.draw(p1()).unwrap().is_some());
}

#[test]
fn test_life_gain_doubled() {
    let mut game = passing_game();
    let source = put(&mut game, card("Grove Bear"), p0());
    register(
        &mut game,
        source,
        p0(),
        ReplacementCondition::ControllerGainsLife,
        ReplacementAction::DoubleAmount,
    );
    assert_eq!(game.gain_life(p0(), 3).unwrap(), 6);
    assert_eq!(life(&game, p0()), 26);
    assert_eq!(game.gain_life(p1(), 3).unwrap(), 3);
}

#[test]
fn test_damage_shield_ends_at_cleanup() {
    let mut game = passing_game();
    let bear = put(&mut game, card("Grove Bear"), p0());
    register(
        &mut game,
        bear,
        p0(),
        ReplacementCondition::DamageToController,
        ReplacementAction::Prevent,
    );
    game.deal_damage(bear, None, Target::Player(p0()), 2, false).unwrap();
    assert_eq!(life(&game, p0()), 20);

    at_step(&mut game, Step::Cleanup);
    game.run_step(Step::Cleanup).unwrap();
    assert!(game.state.replacements.is_empty());
    game.deal_damage(bear, None, Target::Player(p0()), 2, false).unwrap();
    assert_eq!(life(&game, p0()), 18);
}

#[test]
fn test_entering_tapped() {
    let mut game = passing_game();
    let marker = put(&mut game, card("Grove Bear"), p0());
    register(
        &mut game,
        marker,
        p0(),
        ReplacementCondition::Enters(ObjectFilter::creature()),
        ReplacementAction::EnterTapped,
    );
    let spider = in_hand(&mut game, card("Canopy Spider"), p1());
    let spider = game.move_object(spider, ZoneKind::Battlefield, None).unwrap().unwrap();
    assert!(game.state.object(spider).unwrap().is_tapped());
}
