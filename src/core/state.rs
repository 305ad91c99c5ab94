//! Complete match state.
//!
//! `GameState` owns every object, zone, player record, the stack, the
//! continuous-effect and replacement registries, trigger subscriptions and
//! the transition log. It is plain data plus primitive mutations; the rules
//! that sequence those mutations live in `engine`.
//!
//! The object table is an `im::OrdMap`, so cloning a state (for example to
//! attach it to a `MatchAborted` report) is cheap and iteration order is
//! deterministic.

use std::sync::Arc;

use im::OrdMap;
use tracing::trace;

use super::config::MatchConfig;
use super::error::{EngineError, EngineResult};
use super::ids::{IdAllocator, ObjectId};
use super::player::{EndReason, PlayerId, PlayerMap, PlayerState, TurnOrder};
use super::rng::GameRng;
use crate::layers::{self, ContinuousEffects, Duration, Modification};
use crate::log::{TransitionLog, TransitionRecord};
use crate::objects::{Ability, CardDefinition, FilterContext, GameObject, LastKnown, PermanentState};
use crate::replacement::{ReplacementEffect, ReplacementLifetime, ReplacementRegistry};
use crate::rules::{CombatState, Step, TurnContext};
use crate::stack::Stack;
use crate::triggers::{GameEvent, PendingTrigger, TriggerRegistration, TriggerRegistry};
use crate::zones::{ZoneId, ZoneKind, ZoneManager, ZonePosition};

/// How a finished match ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameResult {
    pub winner: Option<PlayerId>,
    pub reason: EndReason,
}

/// Result of moving an object between zones.
#[derive(Clone, Debug)]
pub struct ZoneTransition {
    /// Identity before the move; now only last-known information.
    pub old: ObjectId,
    /// Identity in the destination zone.
    pub new: ObjectId,
    pub from: ZoneId,
    pub to: ZoneId,
    pub lki: LastKnown,
}

/// Complete state of one match.
#[derive(Clone, Debug)]
pub struct GameState {
    pub config: MatchConfig,
    pub order: TurnOrder,
    pub ids: IdAllocator,
    pub turn: TurnContext,
    pub objects: OrdMap<ObjectId, GameObject>,
    pub zones: ZoneManager,
    pub players: PlayerMap<PlayerState>,
    pub stack: Stack,
    pub effects: ContinuousEffects,
    pub replacements: ReplacementRegistry,
    pub triggers: TriggerRegistry,
    /// Triggers detected but not yet put on the stack.
    pub pending: Vec<PendingTrigger>,
    /// Events since the last trigger detection.
    pub events: Vec<GameEvent>,
    pub combat: Option<CombatState>,
    /// Snapshots of objects that left their zone, keyed by their old id.
    pub last_known: OrdMap<ObjectId, LastKnown>,
    pub log: TransitionLog,
    pub rng: GameRng,
    pub result: Option<GameResult>,
}

impl GameState {
    /// A fresh two-player state with empty zones.
    #[must_use]
    pub fn new(config: MatchConfig) -> Self {
        let player_count = 2;
        let life = config.starting_life;
        let rng = GameRng::new(config.seed);
        Self {
            order: TurnOrder::new(player_count),
            ids: IdAllocator::default(),
            turn: TurnContext::pregame(PlayerId::new(0)),
            objects: OrdMap::new(),
            zones: ZoneManager::new(),
            players: PlayerMap::new(player_count, |_| PlayerState::new(life)),
            stack: Stack::default(),
            effects: ContinuousEffects::new(),
            replacements: ReplacementRegistry::default(),
            triggers: TriggerRegistry::default(),
            pending: Vec::new(),
            events: Vec::new(),
            combat: None,
            last_known: OrdMap::new(),
            log: TransitionLog::default(),
            rng,
            result: None,
            config,
        }
    }

    #[must_use]
    pub fn player_count(&self) -> usize {
        self.order.player_count()
    }

    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.turn.active
    }

    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn.number
    }

    #[must_use]
    pub fn step(&self) -> Step {
        self.turn.step
    }

    /// The next player in turn order.
    #[must_use]
    pub fn opponent_of(&self, player: PlayerId) -> PlayerId {
        self.order.next(player)
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }

    /// An invariant-violation error stamped with the current turn.
    #[must_use]
    pub fn invariant(&self, detail: impl Into<String>) -> EngineError {
        EngineError::invariant(self.turn.number, detail)
    }

    /// An illegal-choice error stamped with the current turn.
    #[must_use]
    pub fn illegal_choice(&self, player: PlayerId, detail: impl Into<String>) -> EngineError {
        EngineError::illegal_choice(player, self.turn.number, detail)
    }

    // === Objects ===

    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&GameObject> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        self.objects.get_mut(&id)
    }

    /// Like [`GameState::object`], but a missing object is an invariant
    /// violation.
    pub fn require(&self, id: ObjectId) -> EngineResult<&GameObject> {
        self.objects
            .get(&id)
            .ok_or_else(|| self.invariant(format!("{id} does not exist")))
    }

    /// Permanent state of a battlefield object.
    pub fn permanent_mut(&mut self, id: ObjectId) -> EngineResult<&mut PermanentState> {
        let turn = self.turn.number;
        self.objects
            .get_mut(&id)
            .and_then(|o| o.permanent.as_mut())
            .ok_or_else(|| EngineError::invariant(turn, format!("{id} is not a permanent")))
    }

    /// Objects on the battlefield in id order.
    pub fn battlefield(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.values().filter(|o| o.is_on_battlefield())
    }

    /// Current controller, or last-known controller for an object that
    /// left its zone.
    #[must_use]
    pub fn controller_of(&self, id: ObjectId) -> Option<PlayerId> {
        self.objects
            .get(&id)
            .map(|o| o.controller)
            .or_else(|| self.last_known.get(&id).map(|l| l.controller))
    }

    /// Last-known information for an object id that is no longer live.
    #[must_use]
    pub fn lki(&self, id: ObjectId) -> Option<&LastKnown> {
        self.last_known.get(&id)
    }

    /// The live object's snapshot, or its last-known information.
    #[must_use]
    pub fn snapshot(&self, id: ObjectId) -> Option<LastKnown> {
        self.objects
            .get(&id)
            .map(GameObject::last_known)
            .or_else(|| self.last_known.get(&id).cloned())
    }

    #[must_use]
    pub fn filter_context(&self, you: PlayerId, source: Option<ObjectId>) -> FilterContext {
        FilterContext { you, source }
    }

    // === Players ===

    #[must_use]
    pub fn player(&self, player: PlayerId) -> &PlayerState {
        &self.players[player]
    }

    pub fn player_mut(&mut self, player: PlayerId) -> &mut PlayerState {
        &mut self.players[player]
    }

    #[must_use]
    pub fn hand(&self, player: PlayerId) -> &[ObjectId] {
        self.zones.contents(ZoneId::hand(player))
    }

    #[must_use]
    pub fn library(&self, player: PlayerId) -> &[ObjectId] {
        self.zones.contents(ZoneId::library(player))
    }

    #[must_use]
    pub fn graveyard(&self, player: PlayerId) -> &[ObjectId] {
        self.zones.contents(ZoneId::graveyard(player))
    }

    // === Log and events ===

    /// Append a record to the transition log.
    pub fn record(&mut self, record: TransitionRecord) {
        trace!(?record, "transition");
        self.log.append(self.turn, record);
    }

    /// Queue an event for trigger detection.
    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Rebuild computed characteristics.
    pub fn recompute(&mut self) {
        layers::recompute(self);
    }

    // === Zone transitions ===

    /// Create a new object in `zone`.
    ///
    /// Objects created on the battlefield register their abilities and
    /// produce an entry event, like any other arrival.
    pub fn create_object(
        &mut self,
        definition: Arc<CardDefinition>,
        owner: PlayerId,
        zone: ZoneId,
        position: ZonePosition,
        is_token: bool,
    ) -> EngineResult<ObjectId> {
        let id = self.ids.next_object();
        let timestamp = self.ids.tick();
        let on_battlefield = zone.kind == ZoneKind::Battlefield;
        let object = GameObject {
            id,
            computed: definition.characteristics.clone(),
            definition,
            owner,
            base_controller: owner,
            controller: owner,
            zone,
            timestamp,
            is_token,
            permanent: on_battlefield.then(|| PermanentState::entering(owner)),
        };
        if !self.zones.insert(id, zone, position) {
            return Err(self.invariant(format!("{id} inserted twice")));
        }
        self.record(TransitionRecord::ZoneChange {
            object: id,
            new_object: Some(id),
            name: object.printed().name.clone(),
            from: None,
            to: Some(zone.kind),
        });
        self.objects.insert(id, object);
        if on_battlefield {
            self.register_abilities(id)?;
            self.emit(GameEvent::ZoneChanged {
                object: id,
                new_object: Some(id),
                from: None,
                to: Some(ZoneKind::Battlefield),
                controller: owner,
            });
        }
        Ok(id)
    }

    /// Move an object to another zone.
    ///
    /// The object gets a new id in the destination; the old id keeps only
    /// last-known information. `controller` applies to battlefield
    /// arrivals and defaults to the owner.
    pub fn relocate(
        &mut self,
        id: ObjectId,
        to: ZoneId,
        position: ZonePosition,
        controller: Option<PlayerId>,
    ) -> EngineResult<ZoneTransition> {
        let old = self
            .objects
            .remove(&id)
            .ok_or_else(|| self.invariant(format!("cannot move {id}: it does not exist")))?;
        let from = self
            .zones
            .remove(id)
            .ok_or_else(|| self.invariant(format!("cannot move {id}: it is in no zone")))?;
        let lki = old.last_known();
        self.last_known.insert(id, lki.clone());
        if old.is_on_battlefield() {
            self.replacements.remove_source(id);
        }

        let new_id = self.ids.next_object();
        let timestamp = self.ids.tick();
        let to_battlefield = to.kind == ZoneKind::Battlefield;
        let controller = if to_battlefield {
            controller.unwrap_or(old.owner)
        } else {
            old.owner
        };
        let name = old.printed().name.clone();
        let object = GameObject {
            id: new_id,
            computed: old.definition.characteristics.clone(),
            definition: old.definition,
            owner: old.owner,
            base_controller: controller,
            controller,
            zone: to,
            timestamp,
            is_token: old.is_token,
            permanent: to_battlefield.then(|| PermanentState::entering(controller)),
        };
        if !self.zones.insert(new_id, to, position) {
            return Err(self.invariant(format!("{new_id} inserted twice")));
        }
        self.objects.insert(new_id, object);
        self.record(TransitionRecord::ZoneChange {
            object: id,
            new_object: Some(new_id),
            name,
            from: Some(from.kind),
            to: Some(to.kind),
        });
        self.emit(GameEvent::ZoneChanged {
            object: id,
            new_object: Some(new_id),
            from: Some(from.kind),
            to: Some(to.kind),
            controller: lki.controller,
        });
        if to_battlefield {
            self.register_abilities(new_id)?;
        }
        Ok(ZoneTransition {
            old: id,
            new: new_id,
            from,
            to,
            lki,
        })
    }

    /// Remove an object from the game entirely (not a zone move).
    pub fn cease_to_exist(&mut self, id: ObjectId) -> EngineResult<LastKnown> {
        let old = self
            .objects
            .remove(&id)
            .ok_or_else(|| self.invariant(format!("{id} cannot cease to exist twice")))?;
        let from = self
            .zones
            .remove(id)
            .ok_or_else(|| self.invariant(format!("{id} is in no zone")))?;
        let lki = old.last_known();
        self.last_known.insert(id, lki.clone());
        if old.is_on_battlefield() {
            self.replacements.remove_source(id);
        }
        self.record(TransitionRecord::ZoneChange {
            object: id,
            new_object: None,
            name: old.printed().name.clone(),
            from: Some(from.kind),
            to: None,
        });
        Ok(lki)
    }

    /// Subscribe triggers and start static and replacement effects of a
    /// permanent that just arrived.
    fn register_abilities(&mut self, id: ObjectId) -> EngineResult<()> {
        let (definition, controller, timestamp) = {
            let object = self.require(id)?;
            (Arc::clone(&object.definition), object.controller, object.timestamp)
        };
        for (index, ability) in definition.characteristics.abilities.iter().enumerate() {
            match ability {
                Ability::Triggered(triggered) => {
                    let registration = TriggerRegistration {
                        id: self.ids.next_registration(),
                        source: id,
                        ability_index: index,
                        ability: triggered.clone(),
                    };
                    self.triggers.register(registration);
                }
                Ability::Static(stat) => {
                    let modification = Modification {
                        id: self.ids.next_modification(),
                        source: id,
                        controller,
                        affected: stat.affected.clone(),
                        kind: stat.kind.clone(),
                        timestamp,
                        duration: Duration::WhileSourceOnBattlefield,
                        depends_on: Default::default(),
                    };
                    self.effects.add(modification);
                }
                Ability::Replacement(template) => {
                    let effect = ReplacementEffect {
                        id: self.ids.next_replacement(),
                        source: id,
                        controller,
                        condition: template.condition.clone(),
                        action: template.action.clone(),
                        timestamp,
                        lifetime: ReplacementLifetime::WhileSourceOnBattlefield,
                    };
                    self.replacements.add(effect);
                }
                Ability::Mana(_) | Ability::Activated(_) | Ability::EntersWith(_) => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::{CardDefinition, StaticAbility};
    use crate::layers::{AffectedSet, ModificationKind};

    fn bear() -> Arc<CardDefinition> {
        Arc::new(CardDefinition::creature("Grizzly Bears", "1G", 2, 2))
    }

    #[test]
    fn test_relocate_assigns_new_identity() {
        let mut state = GameState::new(MatchConfig::default());
        let p0 = PlayerId::new(0);
        let id = state
            .create_object(bear(), p0, ZoneId::hand(p0), ZonePosition::Top, false)
            .unwrap();
        let moved = state
            .relocate(id, ZoneId::battlefield(), ZonePosition::Top, None)
            .unwrap();
        assert_ne!(moved.new, id);
        assert!(state.object(id).is_none());
        assert_eq!(state.lki(id).map(|l| l.zone), Some(ZoneId::hand(p0)));
        let live = state.object(moved.new).unwrap();
        assert!(live.is_on_battlefield());
        assert!(live.permanent.as_ref().is_some_and(|p| p.summoning_sick));
    }

    #[test]
    fn test_relocating_missing_object_is_invariant_violation() {
        let mut state = GameState::new(MatchConfig::default());
        let err = state
            .relocate(ObjectId(42), ZoneId::exile(), ZonePosition::Top, None)
            .unwrap_err();
        assert!(!err.is_contract_violation());
    }

    #[test]
    fn test_static_ability_starts_and_expires_with_source() {
        let mut state = GameState::new(MatchConfig::default());
        let p0 = PlayerId::new(0);
        let anthem = CardDefinition::enchantment("Anthem", "2W").with_ability(Ability::Static(StaticAbility {
            affected: AffectedSet::Filter(crate::objects::ObjectFilter::creature()),
            kind: ModificationKind::ModifyPt { power: 1, toughness: 1 },
        }));
        let source = state
            .create_object(Arc::new(anthem), p0, ZoneId::battlefield(), ZonePosition::Top, false)
            .unwrap();
        let creature = state
            .create_object(bear(), p0, ZoneId::battlefield(), ZonePosition::Top, false)
            .unwrap();
        state.recompute();
        assert_eq!(state.object(creature).unwrap().computed.power, Some(3));

        state
            .relocate(source, ZoneId::graveyard(p0), ZonePosition::Top, None)
            .unwrap();
        state.recompute();
        assert!(state.effects.is_empty());
        assert_eq!(state.object(creature).unwrap().computed.power, Some(2));
    }

    #[test]
    fn test_cease_to_exist_logs_removal() {
        let mut state = GameState::new(MatchConfig::default());
        let p0 = PlayerId::new(0);
        let id = state
            .create_object(bear(), p0, ZoneId::graveyard(p0), ZonePosition::Top, true)
            .unwrap();
        state.cease_to_exist(id).unwrap();
        assert!(state.graveyard(p0).is_empty());
        assert!(state.cease_to_exist(id).is_err());
        assert!(matches!(
            state.log.records().last(),
            Some(TransitionRecord::ZoneChange { to: None, .. })
        ));
    }
}
