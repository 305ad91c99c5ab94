//! Primitive game operations.
//!
//! Every mutation a replacement effect could modify is proposed to the
//! router first and only the routed result touches state. The rest of the
//! engine never edits life totals, damage, counters or zones directly.

use std::sync::Arc;

use smallvec::SmallVec;
use tracing::debug;

use super::Game;
use crate::agent::ChoiceKind;
use crate::core::{EngineResult, ObjectId, PlayerId};
use crate::effects::Target;
use crate::log::TransitionRecord;
use crate::objects::{CardType, CounterKind, GameObject, Keyword, LastKnown, TokenSpec};
use crate::replacement::{route, ReplaceableEvent};
use crate::triggers::GameEvent;
use crate::zones::{ZoneId, ZoneKind, ZonePosition};

impl Game {
    fn route_event(&mut self, event: ReplaceableEvent) -> EngineResult<Option<ReplaceableEvent>> {
        let routed = route(&self.state, event, &mut self.decisions)?;
        Ok(routed.event)
    }

    /// Deal damage from `source`. Returns the amount actually dealt after
    /// replacement and prevention.
    ///
    /// `source_lki` stands in for a source that has already left its zone.
    pub fn deal_damage(
        &mut self,
        source: ObjectId,
        source_lki: Option<&LastKnown>,
        target: Target,
        amount: u32,
        combat: bool,
    ) -> EngineResult<u32> {
        if amount == 0 {
            return Ok(0);
        }
        let info = self
            .state
            .snapshot(source)
            .or_else(|| source_lki.cloned())
            .ok_or_else(|| self.state.invariant(format!("damage from unknown source {source}")))?;
        let proposed = ReplaceableEvent::Damage {
            source,
            target,
            amount,
            combat,
        };
        let dealt = match self.route_event(proposed)? {
            Some(ReplaceableEvent::Damage { amount, .. }) => amount,
            Some(other) => return Err(self.state.invariant(format!("damage was replaced by {other:?}"))),
            None => 0,
        };
        if dealt < amount {
            self.state.record(TransitionRecord::DamagePrevented {
                source,
                target,
                amount: amount - dealt,
            });
        }
        if dealt == 0 {
            return Ok(0);
        }

        let applied = match target {
            Target::Player(player) => {
                if self.state.player(player).is_alive() {
                    self.lose_life(player, dealt);
                    true
                } else {
                    false
                }
            }
            Target::Object(id) => {
                let deathtouch = info.characteristics.has_keyword(Keyword::Deathtouch);
                self.damage_permanent(id, dealt, deathtouch)?
            }
        };
        if !applied {
            return Ok(0);
        }
        self.state.record(TransitionRecord::DamageDealt {
            source,
            target,
            amount: dealt,
            combat,
        });
        self.state.emit(GameEvent::DamageDealt {
            source,
            target,
            amount: dealt,
            combat,
        });
        if info.characteristics.has_keyword(Keyword::Lifelink) {
            self.gain_life(info.controller, dealt)?;
        }
        Ok(dealt)
    }

    fn damage_permanent(&mut self, id: ObjectId, amount: u32, deathtouch: bool) -> EngineResult<bool> {
        let Some(object) = self.state.object(id).filter(|o| o.is_on_battlefield()) else {
            return Ok(false);
        };
        let creature = object.computed.is_creature();
        let walker = object.computed.has_type(CardType::Planeswalker);
        if !creature && !walker {
            return Ok(false);
        }
        let permanent = self.state.permanent_mut(id)?;
        let mut loyalty_lost = 0;
        if walker {
            loyalty_lost = permanent.counters.remove(CounterKind::Loyalty, amount);
        }
        if creature {
            permanent.damage += amount;
            permanent.deathtouch_damage |= deathtouch;
        }
        if loyalty_lost > 0 {
            self.state.record(TransitionRecord::CounterChange {
                object: id,
                kind: CounterKind::Loyalty,
                delta: -(loyalty_lost as i32),
            });
        }
        Ok(true)
    }

    /// Lose life. Not replaceable.
    pub fn lose_life(&mut self, player: PlayerId, amount: u32) {
        if amount == 0 {
            return;
        }
        let state = self.state.player_mut(player);
        state.life -= amount as i32;
        let total = state.life;
        self.state.record(TransitionRecord::LifeChange {
            player,
            delta: -(amount as i32),
            total,
        });
        self.state.emit(GameEvent::LifeLost { player, amount });
    }

    /// Gain life. Returns the amount gained after replacement.
    pub fn gain_life(&mut self, player: PlayerId, amount: u32) -> EngineResult<u32> {
        if amount == 0 || !self.state.player(player).is_alive() {
            return Ok(0);
        }
        let gained = match self.route_event(ReplaceableEvent::LifeGain { player, amount })? {
            Some(ReplaceableEvent::LifeGain { amount, .. }) => amount,
            _ => 0,
        };
        if gained == 0 {
            return Ok(0);
        }
        let state = self.state.player_mut(player);
        state.life += gained as i32;
        state.life_gained_this_turn += gained as i32;
        let total = state.life;
        self.state.record(TransitionRecord::LifeChange {
            player,
            delta: gained as i32,
            total,
        });
        self.state.emit(GameEvent::LifeGained { player, amount: gained });
        Ok(gained)
    }

    pub fn add_poison(&mut self, player: PlayerId, count: u32) {
        if count == 0 {
            return;
        }
        let state = self.state.player_mut(player);
        state.poison += count;
        let total = state.poison;
        self.state.record(TransitionRecord::PoisonChange { player, total });
    }

    /// Draw one card. Drawing from an empty library flags the player for
    /// the cleanup loop instead of failing.
    pub fn draw(&mut self, player: PlayerId) -> EngineResult<Option<ObjectId>> {
        if self.route_event(ReplaceableEvent::Draw { player })?.is_none() {
            return Ok(None);
        }
        let Some(card) = self.state.zones.top(ZoneId::library(player)) else {
            debug!(%player, "draw from empty library");
            self.state.player_mut(player).drew_from_empty_library = true;
            return Ok(None);
        };
        let moved = self
            .state
            .relocate(card, ZoneId::hand(player), ZonePosition::Top, None)?;
        Ok(Some(moved.new))
    }

    /// Move an object to the `to` zone of its owner (or the shared zone),
    /// through the replacement router.
    ///
    /// `controller` is who controls the object if it enters the
    /// battlefield; it defaults to the current controller. Returns the new
    /// id, or `None` if the move did not happen.
    pub fn move_object(&mut self, id: ObjectId, to: ZoneKind, controller: Option<PlayerId>) -> EngineResult<Option<ObjectId>> {
        let object = self.state.require(id)?;
        let from = object.zone.kind;
        let owner = object.owner;
        let controller = controller.unwrap_or(object.controller);
        let proposed = ReplaceableEvent::zone_move(id, Some(from), to, controller);
        let Some(ReplaceableEvent::ZoneMove {
            to,
            controller,
            enters_tapped,
            counters,
            ..
        }) = self.route_event(proposed)?
        else {
            return Ok(None);
        };
        let moved = self
            .state
            .relocate(id, ZoneId::of(to, owner), ZonePosition::Top, Some(controller))?;
        if to == ZoneKind::Battlefield {
            self.finish_entry(moved.new, enters_tapped, &counters)?;
        }
        Ok(Some(moved.new))
    }

    fn finish_entry(&mut self, id: ObjectId, tapped: bool, counters: &[(CounterKind, u32)]) -> EngineResult<()> {
        let printed = self.state.require(id)?.printed();
        let loyalty = match printed.loyalty {
            Some(n) if n > 0 && printed.has_type(CardType::Planeswalker) => n as u32,
            _ => 0,
        };
        let starting = (loyalty > 0).then_some((CounterKind::Loyalty, loyalty));
        if tapped {
            self.state.permanent_mut(id)?.tapped = true;
            self.state.record(TransitionRecord::Tapped { object: id });
        }
        for &(kind, count) in starting.iter().chain(counters) {
            if count == 0 {
                continue;
            }
            self.state.permanent_mut(id)?.counters.add(kind, count);
            self.state.record(TransitionRecord::CounterChange {
                object: id,
                kind,
                delta: count as i32,
            });
        }
        Ok(())
    }

    /// Destroy a permanent. Indestructible permanents are unaffected.
    pub fn destroy(&mut self, id: ObjectId) -> EngineResult<Option<ObjectId>> {
        let object = self.state.require(id)?;
        if !object.is_on_battlefield() || object.has_keyword(Keyword::Indestructible) {
            return Ok(None);
        }
        self.move_object(id, ZoneKind::Graveyard, None)
    }

    /// Sacrifice a permanent: move it to its owner's graveyard. Not
    /// stopped by indestructible.
    pub fn sacrifice(&mut self, id: ObjectId) -> EngineResult<Option<ObjectId>> {
        if !self.state.require(id)?.is_on_battlefield() {
            return Ok(None);
        }
        self.move_object(id, ZoneKind::Graveyard, None)
    }

    /// Put counters on a permanent. Returns how many were placed.
    pub fn add_counters(&mut self, id: ObjectId, kind: CounterKind, count: u32) -> EngineResult<u32> {
        if count == 0 || !self.state.object(id).is_some_and(GameObject::is_on_battlefield) {
            return Ok(0);
        }
        let placed = match self.route_event(ReplaceableEvent::AddCounters { object: id, kind, count })? {
            Some(ReplaceableEvent::AddCounters { count, .. }) => count,
            _ => 0,
        };
        if placed == 0 {
            return Ok(0);
        }
        self.state.permanent_mut(id)?.counters.add(kind, placed);
        self.state.record(TransitionRecord::CounterChange {
            object: id,
            kind,
            delta: placed as i32,
        });
        self.state.emit(GameEvent::CountersAdded {
            object: id,
            kind,
            count: placed,
        });
        Ok(placed)
    }

    /// Remove up to `count` counters. Returns how many were removed.
    pub fn remove_counters(&mut self, id: ObjectId, kind: CounterKind, count: u32) -> EngineResult<u32> {
        if !self.state.object(id).is_some_and(GameObject::is_on_battlefield) {
            return Ok(0);
        }
        let removed = self.state.permanent_mut(id)?.counters.remove(kind, count);
        if removed > 0 {
            self.state.record(TransitionRecord::CounterChange {
                object: id,
                kind,
                delta: -(removed as i32),
            });
        }
        Ok(removed)
    }

    /// Tap a permanent. Returns `false` if it was already tapped.
    pub fn tap(&mut self, id: ObjectId) -> EngineResult<bool> {
        let permanent = self.state.permanent_mut(id)?;
        if permanent.tapped {
            return Ok(false);
        }
        permanent.tapped = true;
        self.state.record(TransitionRecord::Tapped { object: id });
        Ok(true)
    }

    /// Untap a permanent. Returns `false` if it was already untapped.
    pub fn untap(&mut self, id: ObjectId) -> EngineResult<bool> {
        let permanent = self.state.permanent_mut(id)?;
        if !permanent.tapped {
            return Ok(false);
        }
        permanent.tapped = false;
        self.state.record(TransitionRecord::Untapped { object: id });
        Ok(true)
    }

    /// Create a token on the battlefield under `controller`.
    pub fn create_token(&mut self, spec: &TokenSpec, controller: PlayerId) -> EngineResult<Option<ObjectId>> {
        let definition = Arc::new(spec.to_definition());
        let id = self
            .state
            .create_object(definition, controller, ZoneId::battlefield(), ZonePosition::Top, true)?;
        let proposed = ReplaceableEvent::zone_move(id, None, ZoneKind::Battlefield, controller);
        match self.route_event(proposed)? {
            Some(ReplaceableEvent::ZoneMove {
                to: ZoneKind::Battlefield,
                enters_tapped,
                counters,
                ..
            }) => {
                self.finish_entry(id, enters_tapped, &counters)?;
                Ok(Some(id))
            }
            Some(ReplaceableEvent::ZoneMove { to, .. }) => {
                let moved = self
                    .state
                    .relocate(id, ZoneId::of(to, controller), ZonePosition::Top, None)?;
                Ok(Some(moved.new))
            }
            _ => {
                self.state.cease_to_exist(id)?;
                Ok(None)
            }
        }
    }

    /// `player` discards one card of their choice.
    pub fn discard(&mut self, player: PlayerId) -> EngineResult<Option<ObjectId>> {
        let hand: SmallVec<[ObjectId; 8]> = self.state.hand(player).iter().copied().collect();
        if hand.is_empty() {
            return Ok(None);
        }
        let names: Vec<String> = hand
            .iter()
            .map(|id| self.state.object(*id).map_or_else(String::new, |o| o.name().to_string()))
            .collect();
        let index = self.decisions.option(&self.state, player, ChoiceKind::Discard, &names)?;
        let card = hand
            .get(index)
            .copied()
            .ok_or_else(|| self.state.invariant("discard choice out of range"))?;
        self.move_object(card, ZoneKind::Graveyard, None)
    }

    /// Empty every mana pool.
    pub fn clear_mana_pools(&mut self) {
        for (_, player) in self.state.players.iter_mut() {
            player.mana_pool.clear();
        }
    }
}
