//! What an agent is allowed to see.

use serde::{Deserialize, Serialize};

use crate::core::{Action, GameState, ManaPool, ObjectId, PlayerId, StackEntryId, TurnContext};
use crate::effects::Target;
use crate::objects::{CardType, CounterKind, GameObject, KeywordSet};
use crate::rules::CombatState;

/// Public facts about one object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectView {
    pub id: ObjectId,
    pub name: String,
    pub owner: PlayerId,
    pub controller: PlayerId,
    pub card_types: Vec<CardType>,
    pub mana_value: u32,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub loyalty: Option<i32>,
    pub keywords: KeywordSet,
    pub tapped: bool,
    pub damage: u32,
    pub counters: Vec<(CounterKind, u32)>,
    pub attached_to: Option<ObjectId>,
}

impl ObjectView {
    fn of(object: &GameObject) -> Self {
        Self {
            id: object.id,
            name: object.computed.name.clone(),
            owner: object.owner,
            controller: object.controller,
            card_types: object.computed.card_types.to_vec(),
            mana_value: object.computed.mana_cost.mana_value(),
            power: object.computed.power,
            toughness: object.computed.toughness,
            loyalty: object.computed.loyalty,
            keywords: object.computed.keywords,
            tapped: object.is_tapped(),
            damage: object.damage(),
            counters: object.counters().iter().collect(),
            attached_to: object.attached_to(),
        }
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.card_types.contains(&CardType::Creature)
    }
}

/// Public facts about a player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub life: i32,
    pub poison: u32,
    pub hand_size: usize,
    pub library_size: usize,
    pub mana_pool: ManaPool,
    pub graveyard: Vec<ObjectView>,
    pub lost: bool,
}

/// A stack entry as seen from outside.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackView {
    pub id: StackEntryId,
    pub name: String,
    pub source: ObjectId,
    pub controller: PlayerId,
    pub targets: Vec<Target>,
}

/// An owned snapshot of the game from one player's seat.
///
/// Hidden information is left out: the viewer sees their own hand but only
/// the size of anyone else's, and no library contents at all.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub viewer: PlayerId,
    pub turn: TurnContext,
    pub players: Vec<PlayerView>,
    pub hand: Vec<ObjectView>,
    pub battlefield: Vec<ObjectView>,
    /// Bottom first.
    pub stack: Vec<StackView>,
    pub combat: Option<CombatState>,
}

impl GameView {
    /// Snapshot `state` for `viewer`.
    #[must_use]
    pub fn new(state: &GameState, viewer: PlayerId) -> Self {
        let view_of = |id: &ObjectId| state.object(*id).map(ObjectView::of);
        let players = state
            .players
            .iter()
            .map(|(id, p)| PlayerView {
                id,
                life: p.life,
                poison: p.poison,
                hand_size: state.hand(id).len(),
                library_size: state.library(id).len(),
                mana_pool: p.mana_pool,
                graveyard: state.graveyard(id).iter().filter_map(view_of).collect(),
                lost: !p.is_alive(),
            })
            .collect();
        Self {
            viewer,
            turn: state.turn,
            players,
            hand: state.hand(viewer).iter().filter_map(view_of).collect(),
            battlefield: state.battlefield().map(ObjectView::of).collect(),
            stack: state
                .stack
                .iter()
                .map(|e| StackView {
                    id: e.id,
                    name: e.name.clone(),
                    source: e.source,
                    controller: e.controller,
                    targets: e.targets.to_vec(),
                })
                .collect(),
            combat: state.combat.clone(),
        }
    }

    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.id == id)
    }

    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&ObjectView> {
        self.battlefield.iter().chain(self.hand.iter()).find(|o| o.id == id)
    }

    /// Name shown for an action, for logs and scripted agents.
    #[must_use]
    pub fn describe(&self, action: Action) -> String {
        match action.object().and_then(|id| self.object(id)) {
            Some(object) => format!("{action} ({})", object.name),
            None => action.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MatchConfig;
    use crate::objects::CardDefinition;
    use crate::zones::{ZoneId, ZonePosition};
    use std::sync::Arc;

    #[test]
    fn test_hidden_hand_and_library() {
        let mut state = GameState::new(MatchConfig::default());
        let (p0, p1) = (PlayerId::new(0), PlayerId::new(1));
        let bear = Arc::new(CardDefinition::creature("Bear", "1G", 2, 2));
        let mine = state
            .create_object(Arc::clone(&bear), p0, ZoneId::hand(p0), ZonePosition::Top, false)
            .unwrap();
        state
            .create_object(Arc::clone(&bear), p1, ZoneId::hand(p1), ZonePosition::Top, false)
            .unwrap();
        state
            .create_object(bear, p1, ZoneId::library(p1), ZonePosition::Top, false)
            .unwrap();

        let view = GameView::new(&state, p0);
        assert_eq!(view.hand.iter().map(|o| o.id).collect::<Vec<_>>(), vec![mine]);
        let theirs = view.player(p1).unwrap();
        assert_eq!(theirs.hand_size, 1);
        assert_eq!(theirs.library_size, 1);
        assert_eq!(view.describe(Action::CastSpell { card: mine }), format!("cast {mine} (Bear)"));
    }
}
