//! Live game objects and last-known information.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::characteristics::{Characteristics, Keyword};
use super::counters::CounterSet;
use super::definition::CardDefinition;
use crate::core::{ObjectId, PlayerId, Timestamp};
use crate::zones::{ZoneId, ZoneKind};

/// State only a permanent has.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermanentState {
    pub tapped: bool,
    /// Cleared in its controller's untap step; attacking and `{T}` abilities
    /// need it clear unless the permanent has haste.
    pub summoning_sick: bool,
    /// Damage marked this turn.
    pub damage: u32,
    /// Damaged by a deathtouch source since the last cleanup.
    pub deathtouch_damage: bool,
    pub counters: CounterSet,
    /// Non-owning reference to the permanent this one is attached to.
    pub attached_to: Option<ObjectId>,
    /// Controller seen by the previous recomputation; a change marks the
    /// permanent as newly controlled.
    pub last_controller: PlayerId,
}

impl PermanentState {
    /// State of a permanent that just entered under `controller`.
    #[must_use]
    pub fn entering(controller: PlayerId) -> Self {
        Self {
            tapped: false,
            summoning_sick: true,
            damage: 0,
            deathtouch_damage: false,
            counters: CounterSet::default(),
            attached_to: None,
            last_controller: controller,
        }
    }
}

/// A game object in some zone.
///
/// `computed` is owned by the layer engine: it is overwritten wholesale on
/// each recomputation and must not be edited anywhere else.
#[derive(Clone, Debug)]
pub struct GameObject {
    pub id: ObjectId,
    pub definition: Arc<CardDefinition>,
    pub computed: Characteristics,
    pub owner: PlayerId,
    /// Controller before control-changing effects.
    pub base_controller: PlayerId,
    /// Controller after control-changing effects.
    pub controller: PlayerId,
    pub zone: ZoneId,
    pub timestamp: Timestamp,
    pub is_token: bool,
    /// Present exactly while the object is on the battlefield.
    pub permanent: Option<PermanentState>,
}

impl GameObject {
    /// Printed characteristics.
    #[must_use]
    pub fn printed(&self) -> &Characteristics {
        &self.definition.characteristics
    }

    /// Current name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.computed.name
    }

    #[must_use]
    pub fn is_on_battlefield(&self) -> bool {
        self.zone.kind == ZoneKind::Battlefield
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.computed.has_keyword(keyword)
    }

    #[must_use]
    pub fn is_tapped(&self) -> bool {
        self.permanent.as_ref().is_some_and(|p| p.tapped)
    }

    /// Marked damage, zero off the battlefield.
    #[must_use]
    pub fn damage(&self) -> u32 {
        self.permanent.as_ref().map_or(0, |p| p.damage)
    }

    /// Counters, empty off the battlefield.
    #[must_use]
    pub fn counters(&self) -> CounterSet {
        self.permanent
            .as_ref()
            .map(|p| p.counters.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn attached_to(&self) -> Option<ObjectId> {
        self.permanent.as_ref().and_then(|p| p.attached_to)
    }

    /// Toughness minus marked damage.
    #[must_use]
    pub fn remaining_toughness(&self) -> i32 {
        self.computed.toughness_or_zero() - self.damage() as i32
    }

    /// Whether the object can attack or pay `{T}` costs this turn.
    #[must_use]
    pub fn can_tap_for_cost(&self) -> bool {
        match &self.permanent {
            Some(p) => {
                !p.tapped
                    && (!p.summoning_sick
                        || !self.computed.is_creature()
                        || self.has_keyword(Keyword::Haste))
            }
            None => false,
        }
    }

    /// Snapshot of this object as it exists right now.
    #[must_use]
    pub fn last_known(&self) -> LastKnown {
        LastKnown {
            id: self.id,
            characteristics: self.computed.clone(),
            controller: self.controller,
            owner: self.owner,
            zone: self.zone,
            counters: self.counters(),
            damage: self.damage(),
            is_token: self.is_token,
            attached_to: self.attached_to(),
        }
    }
}

/// Characteristics of an object as it last existed in a zone it left.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastKnown {
    pub id: ObjectId,
    pub characteristics: Characteristics,
    pub controller: PlayerId,
    pub owner: PlayerId,
    pub zone: ZoneId,
    pub counters: CounterSet,
    pub damage: u32,
    pub is_token: bool,
    pub attached_to: Option<ObjectId>,
}

impl LastKnown {
    #[must_use]
    pub fn power(&self) -> i32 {
        self.characteristics.power_or_zero()
    }
}
