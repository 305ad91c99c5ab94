//! Trigger subscriptions and detection.
//!
//! Permanents subscribe their triggered abilities when they arrive on the
//! battlefield. Subscriptions are indexed by event kind, so detection only
//! looks at abilities that could care about an event.
//!
//! Detection queues matches; it never puts anything on the stack. A
//! subscription whose source has left the battlefield survives until the
//! detection pass that sees the departure, which is what lets "when this
//! dies" abilities trigger.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::event::{EventKind, GameEvent};
use crate::core::{GameState, ObjectId, PlayerId, RegistrationId};
use crate::objects::{Ability, LastKnown, TriggeredAbility};

/// A triggered ability subscribed on behalf of a permanent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerRegistration {
    pub id: RegistrationId,
    pub source: ObjectId,
    /// Index of the ability among the source's printed abilities.
    pub ability_index: usize,
    pub ability: TriggeredAbility,
}

/// All active subscriptions.
#[derive(Clone, Debug, Default)]
pub struct TriggerRegistry {
    registrations: BTreeMap<RegistrationId, TriggerRegistration>,
    by_kind: FxHashMap<EventKind, Vec<RegistrationId>>,
}

impl TriggerRegistry {
    pub fn register(&mut self, registration: TriggerRegistration) {
        for kind in registration.ability.condition.event_kinds() {
            self.by_kind.entry(kind).or_default().push(registration.id);
        }
        self.registrations.insert(registration.id, registration);
    }

    #[must_use]
    pub fn get(&self, id: RegistrationId) -> Option<&TriggerRegistration> {
        self.registrations.get(&id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Subscriptions for an event kind, oldest first.
    pub fn subscribed(&self, kind: EventKind) -> impl Iterator<Item = &TriggerRegistration> {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flatten()
            .filter_map(|id| self.registrations.get(id))
    }

    /// Subscriptions of one source.
    pub fn for_source(&self, source: ObjectId) -> impl Iterator<Item = &TriggerRegistration> {
        self.registrations.values().filter(move |r| r.source == source)
    }

    /// Keep only subscriptions whose source passes `keep`.
    pub fn retain_sources(&mut self, mut keep: impl FnMut(ObjectId) -> bool) {
        self.registrations.retain(|_, r| keep(r.source));
        let live = &self.registrations;
        for ids in self.by_kind.values_mut() {
            ids.retain(|id| live.contains_key(id));
        }
    }
}

/// A detected trigger waiting to be put on the stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingTrigger {
    pub registration: RegistrationId,
    pub source: ObjectId,
    pub source_name: String,
    pub controller: PlayerId,
    pub ability: TriggeredAbility,
    pub source_lki: LastKnown,
    pub triggering: Option<ObjectId>,
    pub triggering_lki: Option<LastKnown>,
}

fn still_has_ability(lki: &LastKnown, registration: &TriggerRegistration) -> bool {
    matches!(
        lki.characteristics.abilities.get(registration.ability_index),
        Some(Ability::Triggered(t)) if *t == registration.ability
    )
}

/// Check every queued event against the subscriptions, queue matches on
/// `state.pending` and drop subscriptions of departed sources.
///
/// Returns the number of triggers queued.
pub fn detect(state: &mut GameState) -> usize {
    let events = std::mem::take(&mut state.events);
    let mut found = Vec::new();
    for event in &events {
        let leaving = event.left_battlefield().is_some();
        for registration in state.triggers.subscribed(event.kind()) {
            let live = state
                .object(registration.source)
                .is_some_and(|o| o.is_on_battlefield());
            if !live && !leaving {
                continue;
            }
            let Some(source) = state.snapshot(registration.source) else {
                continue;
            };
            if !still_has_ability(&source, registration) {
                continue;
            }
            let controller = source.controller;
            let ability = &registration.ability;
            let Some(hit) = ability.condition.matches(event, registration.source, controller, state) else {
                continue;
            };
            if let Some(guard) = &ability.guard {
                if !guard.holds(state, controller, registration.source) {
                    debug!(source = %registration.source, "trigger guard false at detection");
                    continue;
                }
            }
            found.push(PendingTrigger {
                registration: registration.id,
                source: registration.source,
                source_name: source.characteristics.name.clone(),
                controller,
                ability: ability.clone(),
                triggering: hit.triggering,
                triggering_lki: hit.triggering.and_then(|t| state.snapshot(t)),
                source_lki: source,
            });
        }
    }

    let objects = &state.objects;
    state
        .triggers
        .retain_sources(|source| objects.get(&source).is_some_and(|o| o.is_on_battlefield()));

    let count = found.len();
    if count > 0 {
        debug!(count, "triggers detected");
    }
    state.pending.extend(found);
    count
}
