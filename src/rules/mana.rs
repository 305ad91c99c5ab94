//! Mana payment planning.
//!
//! Costs are paid from the pool first, then by tapping the controller's
//! untapped mana sources. Source choice is deterministic: colored
//! requirements are covered first, each by the lowest-id source producing
//! that color, then generic from colorless sources and finally any source
//! left, again lowest id first. Planning never mutates state, so a failed
//! plan leaves nothing half-paid.

use crate::core::{Color, GameState, Mana, ManaCost, ManaPool, ObjectId, PlayerId};
use crate::objects::Ability;

/// A permanent that can tap for mana right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ManaSource {
    pub object: ObjectId,
    pub mana: Mana,
    pub amount: u32,
}

/// Untapped mana sources `player` controls, by id, skipping `exclude`.
#[must_use]
pub fn available_sources(state: &GameState, player: PlayerId, exclude: Option<ObjectId>) -> Vec<ManaSource> {
    state
        .battlefield()
        .filter(|o| o.controller == player && Some(o.id) != exclude && o.can_tap_for_cost())
        .filter_map(|o| {
            o.computed.abilities.iter().find_map(|a| match a {
                Ability::Mana(m) => Some(ManaSource {
                    object: o.id,
                    mana: m.mana,
                    amount: m.amount,
                }),
                _ => None,
            })
        })
        .collect()
}

/// Sources to tap for a cost.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaymentPlan {
    pub taps: Vec<ManaSource>,
}

/// Plan how to pay `cost` from `pool` plus `sources`. On failure returns
/// how much mana is missing.
pub fn plan_payment(pool: ManaPool, sources: &[ManaSource], cost: &ManaCost) -> Result<PaymentPlan, u32> {
    let mut scratch = pool;
    let mut used = vec![false; sources.len()];
    let mut plan = PaymentPlan::default();
    let tap = |index: usize, scratch: &mut ManaPool, used: &mut [bool], plan: &mut PaymentPlan| {
        used[index] = true;
        scratch.add(sources[index].mana, sources[index].amount);
        plan.taps.push(sources[index]);
    };

    for color in Color::ALL {
        while scratch.amount(Mana::Colored(color)) < cost.colored(color) {
            let next = (0..sources.len()).find(|&i| !used[i] && sources[i].mana == Mana::Colored(color));
            match next {
                Some(i) => tap(i, &mut scratch, &mut used, &mut plan),
                None => break,
            }
        }
    }

    let colored_total: u32 = Color::ALL.iter().map(|&c| cost.colored(c)).sum();
    while scratch.total() < colored_total + cost.generic {
        let next = (0..sources.len())
            .find(|&i| !used[i] && sources[i].mana == Mana::Colorless)
            .or_else(|| (0..sources.len()).find(|&i| !used[i]));
        match next {
            Some(i) => tap(i, &mut scratch, &mut used, &mut plan),
            None => break,
        }
    }

    scratch.pay(cost)?;
    Ok(plan)
}

/// Whether `player` can pay `cost` right now.
#[must_use]
pub fn can_afford(state: &GameState, player: PlayerId, cost: &ManaCost, exclude: Option<ObjectId>) -> bool {
    if cost.is_free() {
        return true;
    }
    let sources = available_sources(state, player, exclude);
    plan_payment(state.player(player).mana_pool, &sources, cost).is_ok()
}
