//! Continuous effects through the seven layers.

mod common;

use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use smallvec::{smallvec, SmallVec};

use common::*;
use duel_rules::core::{Color, GameState, MatchConfig, ModificationId, ObjectId, PlayerId, Step, Timestamp};
use duel_rules::effects::{Effect, EffectTarget, Target, TargetSpec};
use duel_rules::layers::{
    compute, AffectedSet, ContinuousEffects, Duration, Modification, ModificationKind, PtDefinition,
};
use duel_rules::objects::{CardDefinition, CardType, ColorSet, Keyword, KeywordSet, ObjectFilter};
use duel_rules::stack::{EntryKind, StackEntry};
use duel_rules::zones::{ZoneId, ZonePosition};

fn board() -> (GameState, Vec<ObjectId>) {
    let mut state = GameState::new(MatchConfig::default());
    let defs = [
        CardDefinition::creature("Bear", "1G", 2, 2),
        CardDefinition::creature("Eagle", "2W", 2, 2).with_keywords([Keyword::Flying]),
        CardDefinition::creature("Serpent", "4U", 5, 5),
        CardDefinition::creature("Spider", "2G", 1, 4).with_keywords([Keyword::Reach]),
    ];
    let ids = defs
        .into_iter()
        .enumerate()
        .map(|(i, def)| {
            state
                .create_object(def.into(), PlayerId::new((i % 2) as u8), ZoneId::battlefield(), ZonePosition::Top, false)
                .unwrap()
        })
        .collect();
    (state, ids)
}

/// One modification drawn from a fixed menu covering every layer.
fn menu(choice: usize, target: ObjectId, other: ObjectId) -> (AffectedSet, ModificationKind) {
    let one = AffectedSet::Object(target);
    match choice % 12 {
        0 => (one, ModificationKind::ModifyPt { power: 1, toughness: 1 }),
        1 => (one, ModificationKind::SetPt { power: 0, toughness: 3 }),
        2 => (one, ModificationKind::SwitchPt),
        3 => (one, ModificationKind::AddKeywords([Keyword::Flying].into_iter().collect::<KeywordSet>())),
        4 => (one, ModificationKind::RemoveKeywords([Keyword::Flying, Keyword::Reach].into_iter().collect::<KeywordSet>())),
        5 => (one, ModificationKind::AddTypes(smallvec![CardType::Artifact])),
        6 => (one, ModificationKind::SetColors([Color::Black].into_iter().collect::<ColorSet>())),
        7 => (one, ModificationKind::TakeControl),
        8 => (
            AffectedSet::Filter(ObjectFilter::of_type(CardType::Artifact)),
            ModificationKind::ModifyPt { power: -1, toughness: 0 },
        ),
        9 => (
            AffectedSet::Filter(ObjectFilter::creature().with_keyword(Keyword::Flying)),
            ModificationKind::ModifyPt { power: 2, toughness: 0 },
        ),
        10 => (one, ModificationKind::DefinePt(PtDefinition::CountOf(ObjectFilter::of_type(CardType::Artifact)))),
        _ => (one, ModificationKind::CopyOf(other)),
    }
}

fn modifications(choices: &[(usize, usize)], ids: &[ObjectId]) -> Vec<Modification> {
    choices
        .iter()
        .enumerate()
        .map(|(i, &(choice, target))| {
            let (affected, kind) = menu(choice, ids[target % ids.len()], ids[(target + 1) % ids.len()]);
            Modification {
                id: ModificationId(i as u32 + 1),
                source: ids[0],
                controller: PlayerId::new((i % 2) as u8),
                affected,
                kind,
                timestamp: Timestamp(i as u64 + 100),
                duration: Duration::Indefinite,
                depends_on: SmallVec::new(),
            }
        })
        .collect()
}

fn effects_in(order: &[Modification]) -> ContinuousEffects {
    let mut effects = ContinuousEffects::new();
    for m in order {
        effects.add(m.clone());
    }
    effects
}

proptest! {
    /// The same modification set yields the same characteristics no matter
    /// the order it was registered in, and recomputing is repeatable.
    #[test]
    fn layer_results_ignore_registration_order(
        choices in prop::collection::vec((0usize..12, 0usize..4), 0..10),
        seed in any::<u64>(),
    ) {
        let (state, ids) = board();
        let mods = modifications(&choices, &ids);
        let mut shuffled = mods.clone();
        shuffled.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));

        let first = compute(&state.objects, &effects_in(&mods));
        let again = compute(&state.objects, &effects_in(&mods));
        let reordered = compute(&state.objects, &effects_in(&shuffled));
        prop_assert_eq!(&first, &again);
        prop_assert_eq!(&first, &reordered);
    }
}

fn pt(game: &duel_rules::Game, id: ObjectId) -> (i32, i32) {
    let c = &game.state.object(id).unwrap().computed;
    (c.power_or_zero(), c.toughness_or_zero())
}

#[test]
fn test_anthem_only_affects_its_controller() {
    let mut game = passing_game();
    let mine = put(&mut game, card("Grove Bear"), p0());
    let theirs = put(&mut game, card("Grove Bear"), p1());
    let banner = put(&mut game, card("Warcry Banner"), p0());
    assert_eq!(pt(&game, mine), (3, 2));
    assert_eq!(pt(&game, theirs), (2, 2));

    game.destroy(banner).unwrap();
    game.state.recompute();
    assert_eq!(pt(&game, mine), (2, 2));
}

#[test]
fn test_aura_pumps_host_and_falls_off() {
    let mut game = passing_game();
    let bear = put(&mut game, card("Grove Bear"), p0());
    let aura = put(&mut game, card("Valor Mantle"), p0());
    game.state.permanent_mut(aura).unwrap().attached_to = Some(bear);
    game.state.recompute();
    assert_eq!(pt(&game, bear), (4, 4));

    game.destroy(bear).unwrap();
    game.settle().unwrap();
    assert!(!on_battlefield(&game, aura));
    assert!(graveyard_names(&game, p0()).contains(&"Valor Mantle".to_string()));
}

#[test]
fn test_pump_ends_at_cleanup() {
    let mut game = passing_game();
    let bear = put(&mut game, card("Grove Bear"), p0());
    let state = &mut game.state;
    state.stack.push(
        StackEntry::new(EntryKind::Activated { ability: 0 }, "surge", bear, p0())
            .with_effects(vec![Effect::pump(EffectTarget::Target(0), 3, 3)])
            .with_targets(vec![TargetSpec::creature()], [Target::Object(bear)]),
        &mut state.ids,
    );
    game.resolve_top().unwrap();
    game.state.recompute();
    assert_eq!(pt(&game, bear), (5, 5));

    at_step(&mut game, Step::Cleanup);
    game.run_step(Step::Cleanup).unwrap();
    assert_eq!(pt(&game, bear), (2, 2));
}

#[test]
fn test_counters_apply_after_setting() {
    let mut game = passing_game();
    let hydra = put(&mut game, CardDefinition::creature("Hydra", "2G", 0, 0), p0());
    game.add_counters(hydra, duel_rules::objects::CounterKind::PlusOne, 3).unwrap();
    game.state.recompute();
    assert_eq!(pt(&game, hydra), (3, 3));
}
