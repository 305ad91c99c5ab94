//! Triggered abilities.
//!
//! Triggering is two-phase. [`detect`] matches queued events against
//! subscriptions and records what fired; the engine later groups the queue
//! by controller in turn order starting with the active player
//! ([`group_apnap`]), lets each controller order their own triggers,
//! re-checks intervening-if guards and only then pushes onto the stack.
//!
//! ## Key Types
//!
//! - `GameEvent`: a completed transition
//! - `TriggerCondition`: what an ability waits for
//! - `StateCondition`: intervening-if guard
//! - `TriggerRegistry`: subscriptions keyed by event kind
//! - `PendingTrigger`: a detected trigger not yet on the stack

mod condition;
mod event;
mod registry;

pub use condition::{StateCondition, TriggerCondition, TriggerMatch};
pub use event::{EventKind, GameEvent};
pub use registry::{detect, PendingTrigger, TriggerRegistration, TriggerRegistry};

use crate::core::{PlayerId, TurnOrder};

/// Group pending triggers by controller, active player first and then in
/// turn order. Detection order is kept within a group.
#[must_use]
pub fn group_apnap(
    pending: Vec<PendingTrigger>,
    order: TurnOrder,
    active: PlayerId,
) -> Vec<(PlayerId, Vec<PendingTrigger>)> {
    let mut groups: Vec<(PlayerId, Vec<PendingTrigger>)> =
        order.starting_from(active).map(|p| (p, Vec::new())).collect();
    for trigger in pending {
        if let Some((_, group)) = groups.iter_mut().find(|(p, _)| *p == trigger.controller) {
            group.push(trigger);
        }
    }
    groups.retain(|(_, group)| !group.is_empty());
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ObjectId, RegistrationId};
    use crate::objects::{Characteristics, LastKnown, TriggeredAbility};
    use crate::zones::ZoneId;

    fn pending(controller: u8, source: u32) -> PendingTrigger {
        let owner = PlayerId::new(controller);
        PendingTrigger {
            registration: RegistrationId(source),
            source: ObjectId(source),
            source_name: "Source".into(),
            controller: owner,
            ability: TriggeredAbility {
                condition: TriggerCondition::ThisDies,
                guard: None,
                effects: Vec::new(),
                targets: Vec::new(),
            },
            source_lki: LastKnown {
                id: ObjectId(source),
                characteristics: Characteristics::named("Source"),
                controller: owner,
                owner,
                zone: ZoneId::battlefield(),
                counters: Default::default(),
                damage: 0,
                is_token: false,
                attached_to: None,
            },
            triggering: None,
            triggering_lki: None,
        }
    }

    #[test]
    fn test_apnap_groups_active_player_first() {
        let queue = vec![pending(1, 1), pending(0, 2), pending(1, 3)];
        let groups = group_apnap(queue, TurnOrder::new(2), PlayerId::new(0));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, PlayerId::new(0));
        let second: Vec<_> = groups[1].1.iter().map(|t| t.source).collect();
        assert_eq!(second, vec![ObjectId(1), ObjectId(3)]);
    }
}
