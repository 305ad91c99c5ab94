//! Action timing and availability.
//!
//! Each check returns `Ok(())` when the action can be taken right now and a
//! [`RejectReason`] otherwise. The legal action list offered to agents is
//! exactly the set of actions whose check passes, and the engine runs the
//! same check again when it executes one.

use crate::core::{Action, GameState, ObjectId, PlayerId, RejectReason};
use crate::effects::TargetSpec;
use crate::objects::{Ability, ActivatedAbility};
use crate::zones::ZoneId;

use super::mana::can_afford;

/// Main phase of the player's own turn with an empty stack.
#[must_use]
pub fn sorcery_window(state: &GameState, player: PlayerId) -> bool {
    player == state.active_player() && state.step().is_main() && state.stack.is_empty()
}

fn first_unmet_target(state: &GameState, player: PlayerId, source: ObjectId, specs: &[TargetSpec]) -> Option<usize> {
    let ctx = state.filter_context(player, Some(source));
    specs.iter().position(|spec| !spec.has_candidate(state, &ctx))
}

fn in_hand(state: &GameState, player: PlayerId, card: ObjectId) -> bool {
    state.zones.zone_of(card) == Some(ZoneId::hand(player))
}

/// Whether `player` may play `card` as their land for the turn.
pub fn check_play_land(state: &GameState, player: PlayerId, card: ObjectId) -> Result<(), RejectReason> {
    let object = state.object(card).ok_or(RejectReason::NotAvailable)?;
    if !in_hand(state, player, card) || !object.computed.is_land() {
        return Err(RejectReason::NotAvailable);
    }
    if !sorcery_window(state, player) {
        return Err(RejectReason::WrongTiming);
    }
    if state.player(player).lands_played > 0 {
        return Err(RejectReason::LandAlreadyPlayed);
    }
    Ok(())
}

/// Whether `player` may cast `card` from hand.
pub fn check_cast(state: &GameState, player: PlayerId, card: ObjectId) -> Result<(), RejectReason> {
    let object = state.object(card).ok_or(RejectReason::NotAvailable)?;
    if !in_hand(state, player, card) || object.computed.is_land() {
        return Err(RejectReason::NotAvailable);
    }
    if !object.computed.has_instant_timing() && !sorcery_window(state, player) {
        return Err(RejectReason::WrongTiming);
    }
    if let Some(requirement) = first_unmet_target(state, player, card, &object.definition.spell.targets) {
        return Err(RejectReason::NoLegalTargets { requirement });
    }
    if !can_afford(state, player, &object.computed.mana_cost, None) {
        return Err(RejectReason::CannotPay {
            missing: object.computed.mana_cost.mana_value(),
        });
    }
    Ok(())
}

/// The activated ability at `index` of a permanent's current abilities.
#[must_use]
pub fn activated_ability(state: &GameState, source: ObjectId, index: usize) -> Option<&ActivatedAbility> {
    match state.object(source)?.computed.abilities.get(index)? {
        Ability::Activated(ability) => Some(ability),
        _ => None,
    }
}

/// Whether `player` may activate the `index`-th ability of `source`.
pub fn check_activate(state: &GameState, player: PlayerId, source: ObjectId, index: usize) -> Result<(), RejectReason> {
    let object = state.object(source).ok_or(RejectReason::NotAvailable)?;
    if !object.is_on_battlefield() || object.controller != player {
        return Err(RejectReason::NotAvailable);
    }
    let ability = activated_ability(state, source, index).ok_or(RejectReason::NotAvailable)?;
    if ability.sorcery_speed && !sorcery_window(state, player) {
        return Err(RejectReason::WrongTiming);
    }
    if ability.cost.tap && !object.can_tap_for_cost() {
        return Err(RejectReason::CannotTap);
    }
    if ability.cost.life > 0 && state.player(player).life < ability.cost.life as i32 {
        return Err(RejectReason::CannotPay { missing: 0 });
    }
    if let Some(requirement) = first_unmet_target(state, player, source, &ability.targets) {
        return Err(RejectReason::NoLegalTargets { requirement });
    }
    let exclude = ability.cost.tap.then_some(source);
    if !can_afford(state, player, &ability.cost.mana, exclude) {
        return Err(RejectReason::CannotPay {
            missing: ability.cost.mana.mana_value(),
        });
    }
    Ok(())
}

/// Run the check matching `action`.
pub fn check_action(state: &GameState, player: PlayerId, action: Action) -> Result<(), RejectReason> {
    match action {
        Action::Pass => Ok(()),
        Action::PlayLand { card } => check_play_land(state, player, card),
        Action::CastSpell { card } => check_cast(state, player, card),
        Action::ActivateAbility { source, ability } => check_activate(state, player, source, ability),
    }
}

/// Everything `player` could do while holding priority. `Pass` is always
/// first.
#[must_use]
pub fn legal_actions(state: &GameState, player: PlayerId) -> Vec<Action> {
    let mut actions = vec![Action::Pass];
    if state.is_over() {
        return actions;
    }
    for &card in state.hand(player) {
        let action = match state.object(card) {
            Some(o) if o.computed.is_land() => Action::PlayLand { card },
            Some(_) => Action::CastSpell { card },
            None => continue,
        };
        if check_action(state, player, action).is_ok() {
            actions.push(action);
        }
    }
    let permanents: Vec<(ObjectId, usize)> = state
        .battlefield()
        .filter(|o| o.controller == player)
        .flat_map(|o| {
            o.computed
                .abilities
                .iter()
                .enumerate()
                .filter(|(_, a)| matches!(a, Ability::Activated(_)))
                .map(move |(i, _)| (o.id, i))
        })
        .collect();
    for (source, ability) in permanents {
        if check_activate(state, player, source, ability).is_ok() {
            actions.push(Action::ActivateAbility { source, ability });
        }
    }
    actions
}
