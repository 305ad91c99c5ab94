//! Characteristic recomputation.
//!
//! [`compute`] is a pure function of the object table and the active
//! modification set. It starts every object from its printed
//! characteristics and replays all modifications stage by stage; nothing is
//! carried over from the previous pass.

use std::collections::BTreeMap;

use im::OrdMap;
use tracing::{debug, trace};

use super::dependency::order_by_dependencies;
use super::modification::{
    AffectedSet, ContinuousEffects, Duration, Modification, ModificationKind, PtDefinition, PtSublayer,
    Stage,
};
use crate::core::{GameState, ObjectId, PlayerId};
use crate::log::TransitionRecord;
use crate::objects::{Characteristics, CounterKind, FilterContext, GameObject, KeywordSet};

/// Output of recomputation for one object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Computed {
    pub characteristics: Characteristics,
    pub controller: PlayerId,
}

type Working = BTreeMap<ObjectId, Computed>;

fn on_battlefield(objects: &OrdMap<ObjectId, GameObject>, id: ObjectId) -> bool {
    objects.get(&id).is_some_and(GameObject::is_on_battlefield)
}

/// The player "you" means for a modification: the source's current
/// controller while it is on the battlefield, else the recorded controller.
fn perspective(m: &Modification, working: &Working, objects: &OrdMap<ObjectId, GameObject>) -> PlayerId {
    if on_battlefield(objects, m.source) {
        working.get(&m.source).map_or(m.controller, |c| c.controller)
    } else {
        m.controller
    }
}

fn affected_objects(m: &Modification, working: &Working, objects: &OrdMap<ObjectId, GameObject>) -> Vec<ObjectId> {
    match &m.affected {
        AffectedSet::Object(id) => {
            if on_battlefield(objects, *id) {
                vec![*id]
            } else {
                Vec::new()
            }
        }
        AffectedSet::Source => {
            if on_battlefield(objects, m.source) {
                vec![m.source]
            } else {
                Vec::new()
            }
        }
        AffectedSet::Attached => objects
            .get(&m.source)
            .filter(|o| o.is_on_battlefield())
            .and_then(GameObject::attached_to)
            .filter(|&host| on_battlefield(objects, host))
            .into_iter()
            .collect(),
        AffectedSet::Filter(filter) => {
            let ctx = FilterContext {
                you: perspective(m, working, objects),
                source: Some(m.source),
            };
            working
                .iter()
                .filter(|(id, _)| on_battlefield(objects, **id))
                .filter(|(id, c)| filter.matches(**id, &c.characteristics, c.controller, &ctx))
                .map(|(id, _)| *id)
                .collect()
        }
    }
}

fn apply(m: &Modification, target: ObjectId, working: &mut Working, objects: &OrdMap<ObjectId, GameObject>) {
    let copied = match &m.kind {
        ModificationKind::CopyOf(original) => objects.get(original).map(|o| o.printed().clone()),
        _ => None,
    };
    let defined = match &m.kind {
        ModificationKind::DefinePt(PtDefinition::CountOf(filter)) => {
            let ctx = FilterContext {
                you: perspective(m, working, objects),
                source: Some(m.source),
            };
            let count = working
                .iter()
                .filter(|(id, _)| on_battlefield(objects, **id))
                .filter(|(id, c)| filter.matches(**id, &c.characteristics, c.controller, &ctx))
                .count();
            Some(count as i32)
        }
        _ => None,
    };
    let you = perspective(m, working, objects);
    let Some(entry) = working.get_mut(&target) else {
        return;
    };
    let chars = &mut entry.characteristics;

    match &m.kind {
        ModificationKind::CopyOf(_) => {
            if let Some(values) = copied {
                *chars = values;
            }
        }
        ModificationKind::TakeControl => entry.controller = you,
        ModificationKind::ReplaceSubtype { from, to } => {
            for subtype in chars.subtypes.iter_mut().filter(|s| *s == from) {
                subtype.clone_from(to);
            }
        }
        ModificationKind::AddTypes(types) => {
            for t in types {
                if !chars.has_type(*t) {
                    chars.card_types.push(*t);
                }
            }
        }
        ModificationKind::SetTypes(types) => chars.card_types = types.clone(),
        ModificationKind::AddSubtypes(subtypes) => {
            for s in subtypes {
                if !chars.has_subtype(s) {
                    chars.subtypes.push(s.clone());
                }
            }
        }
        ModificationKind::SetColors(colors) => chars.colors = *colors,
        ModificationKind::AddColors(colors) => chars.colors.extend_from(*colors),
        ModificationKind::AddKeywords(keywords) => chars.keywords.extend_from(*keywords),
        ModificationKind::RemoveKeywords(keywords) => chars.keywords.remove_all(*keywords),
        ModificationKind::RemoveAllAbilities => {
            chars.keywords = KeywordSet::EMPTY;
            chars.abilities.clear();
        }
        ModificationKind::DefinePt(_) => {
            if let Some(n) = defined {
                chars.power = Some(n);
                chars.toughness = Some(n);
            }
        }
        ModificationKind::SetPt { power, toughness } => {
            chars.power = Some(*power);
            chars.toughness = Some(*toughness);
        }
        ModificationKind::ModifyPt { power, toughness } => {
            if let (Some(p), Some(t)) = (chars.power.as_mut(), chars.toughness.as_mut()) {
                *p += power;
                *t += toughness;
            }
        }
        ModificationKind::SwitchPt => {
            if let (Some(p), Some(t)) = (chars.power, chars.toughness) {
                chars.power = Some(t);
                chars.toughness = Some(p);
            }
        }
    }
}

/// Whether applying `b` first changes the set of objects `a` applies to.
fn applicability_changes(
    a: &Modification,
    b: &Modification,
    working: &Working,
    objects: &OrdMap<ObjectId, GameObject>,
) -> bool {
    if !matches!(a.affected, AffectedSet::Filter(_)) {
        return false;
    }
    let before = affected_objects(a, working, objects);
    let mut trial = working.clone();
    for target in affected_objects(b, &trial, objects) {
        apply(b, target, &mut trial, objects);
    }
    before != affected_objects(a, &trial, objects)
}

fn apply_counters(working: &mut Working, objects: &OrdMap<ObjectId, GameObject>) {
    for (id, entry) in working.iter_mut() {
        let Some(permanent) = objects.get(id).and_then(|o| o.permanent.as_ref()) else {
            continue;
        };
        let delta = permanent.counters.pt_delta();
        let chars = &mut entry.characteristics;
        if let (Some(p), Some(t)) = (chars.power.as_mut(), chars.toughness.as_mut()) {
            *p += delta;
            *t += delta;
        }
        if chars.loyalty.is_some() {
            chars.loyalty = Some(permanent.counters.get(CounterKind::Loyalty) as i32);
        }
    }
}

/// Recompute every object's characteristics and controller.
#[must_use]
pub fn compute(objects: &OrdMap<ObjectId, GameObject>, effects: &ContinuousEffects) -> BTreeMap<ObjectId, Computed> {
    let mut working: Working = objects
        .iter()
        .map(|(id, obj)| {
            (
                *id,
                Computed {
                    characteristics: obj.printed().clone(),
                    controller: obj.base_controller,
                },
            )
        })
        .collect();

    for stage in Stage::ALL {
        if stage.sublayer == Some(PtSublayer::Counters) {
            apply_counters(&mut working, objects);
            continue;
        }
        let group: Vec<&Modification> = effects.iter().filter(|m| m.kind.stage() == stage).collect();
        if group.is_empty() {
            continue;
        }

        let mut edges = Vec::new();
        for (ai, a) in group.iter().enumerate() {
            for (bi, b) in group.iter().enumerate() {
                if ai == bi {
                    continue;
                }
                if a.depends_on.contains(&b.id) || applicability_changes(a, b, &working, objects) {
                    edges.push((bi, ai));
                }
            }
        }
        let timestamps: Vec<_> = group.iter().map(|m| m.timestamp).collect();
        let ordering = order_by_dependencies(&timestamps, &edges);
        if ordering.cycles > 0 {
            debug!(?stage, cycles = ordering.cycles, "dependency cycle, using timestamp order");
        }

        for index in ordering.order {
            let m = group[index];
            for target in affected_objects(m, &working, objects) {
                apply(m, target, &mut working, objects);
            }
        }
    }
    working
}

fn is_expired(m: &Modification, objects: &OrdMap<ObjectId, GameObject>) -> bool {
    let source_gone = !on_battlefield(objects, m.source);
    match (&m.affected, m.duration) {
        (_, Duration::WhileSourceOnBattlefield) if source_gone => true,
        (AffectedSet::Object(id), _) => !on_battlefield(objects, *id),
        _ => false,
    }
}

/// Drop expired modifications, then rebuild computed characteristics for
/// every object in `state`.
pub fn recompute(state: &mut GameState) {
    let objects = &state.objects;
    let expired = state.effects.remove_where(|m| is_expired(m, objects));
    for m in &expired {
        state.record(TransitionRecord::ModificationExpired {
            modification: m.id,
            source: m.source,
        });
    }

    let computed = compute(&state.objects, &state.effects);
    for (id, result) in computed {
        let Some(obj) = state.objects.get_mut(&id) else {
            continue;
        };
        obj.computed = result.characteristics;
        obj.controller = result.controller;
        if let Some(permanent) = obj.permanent.as_mut() {
            if permanent.last_controller != result.controller {
                permanent.last_controller = result.controller;
                permanent.summoning_sick = true;
            }
        }
    }
    trace!(modifications = state.effects.len(), "recomputed characteristics");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{MatchConfig, ModificationId, Timestamp};
    use crate::objects::{CardDefinition, Keyword, ObjectFilter};
    use crate::zones::{ZoneId, ZonePosition};
    use smallvec::{smallvec, SmallVec};
    use std::sync::Arc;

    fn creature(state: &mut GameState, name: &str, p: i32, t: i32, owner: u8) -> ObjectId {
        let def = Arc::new(CardDefinition::creature(name, "1", p, t));
        state
            .create_object(def, PlayerId::new(owner), ZoneId::battlefield(), ZonePosition::Top, false)
            .unwrap()
    }

    fn modification(id: u32, ts: u64, affected: AffectedSet, kind: ModificationKind) -> Modification {
        Modification {
            id: ModificationId(id),
            source: ObjectId(999),
            controller: PlayerId::new(0),
            affected,
            kind,
            timestamp: Timestamp(ts),
            duration: Duration::Indefinite,
            depends_on: SmallVec::new(),
        }
    }

    fn pt(state: &GameState, id: ObjectId) -> (i32, i32) {
        let c = &state.objects[&id].computed;
        (c.power_or_zero(), c.toughness_or_zero())
    }

    #[test]
    fn test_set_then_modify_regardless_of_timestamp() {
        let mut state = GameState::new(MatchConfig::default());
        let bear = creature(&mut state, "Bear", 2, 2, 0);
        state.effects.add(modification(1, 1, AffectedSet::Object(bear), ModificationKind::ModifyPt { power: 3, toughness: 3 }));
        state.effects.add(modification(2, 2, AffectedSet::Object(bear), ModificationKind::SetPt { power: 0, toughness: 1 }));
        recompute(&mut state);
        assert_eq!(pt(&state, bear), (3, 4));
    }

    #[test]
    fn test_counters_then_switch() {
        let mut state = GameState::new(MatchConfig::default());
        let bear = creature(&mut state, "Bear", 1, 4, 0);
        state
            .objects
            .get_mut(&bear)
            .and_then(|o| o.permanent.as_mut())
            .unwrap()
            .counters
            .add(CounterKind::PlusOne, 2);
        state.effects.add(modification(1, 5, AffectedSet::Object(bear), ModificationKind::SwitchPt));
        recompute(&mut state);
        assert_eq!(pt(&state, bear), (6, 3));
    }

    #[test]
    fn test_printed_values_survive_recompute() {
        let mut state = GameState::new(MatchConfig::default());
        let bear = creature(&mut state, "Bear", 2, 2, 0);
        state.effects.add(modification(1, 1, AffectedSet::Object(bear), ModificationKind::ModifyPt { power: 1, toughness: 1 }));
        recompute(&mut state);
        recompute(&mut state);
        assert_eq!(pt(&state, bear), (3, 3));
        assert_eq!(state.objects[&bear].printed().power, Some(2));
    }

    #[test]
    fn test_type_change_feeds_later_filter() {
        let mut state = GameState::new(MatchConfig::default());
        let def = Arc::new(CardDefinition::artifact("Statue", "3"));
        let statue = state
            .create_object(def, PlayerId::new(0), ZoneId::battlefield(), ZonePosition::Top, false)
            .unwrap();
        state.effects.add(modification(1, 1, AffectedSet::Object(statue), ModificationKind::AddTypes(smallvec![crate::objects::CardType::Creature])));
        state.effects.add(modification(2, 2, AffectedSet::Object(statue), ModificationKind::SetPt { power: 3, toughness: 3 }));
        state.effects.add(modification(
            3,
            3,
            AffectedSet::Filter(ObjectFilter::creature()),
            ModificationKind::AddKeywords([Keyword::Flying].into_iter().collect()),
        ));
        recompute(&mut state);
        let chars = &state.objects[&statue].computed;
        assert!(chars.is_creature());
        assert!(chars.has_keyword(Keyword::Flying));
        assert_eq!(pt(&state, statue), (3, 3));
    }

    #[test]
    fn test_dependency_reorders_within_layer() {
        // "Flyers lose defender" (t1) depends on "creatures gain flying and
        // defender" (t2), so t2 applies first.
        let mut state = GameState::new(MatchConfig::default());
        let wall = creature(&mut state, "Wall", 0, 4, 0);
        state.effects.add(modification(
            1,
            1,
            AffectedSet::Filter(ObjectFilter::creature().with_keyword(Keyword::Flying)),
            ModificationKind::RemoveKeywords([Keyword::Defender].into_iter().collect()),
        ));
        state.effects.add(modification(
            2,
            2,
            AffectedSet::Filter(ObjectFilter::creature()),
            ModificationKind::AddKeywords([Keyword::Flying, Keyword::Defender].into_iter().collect()),
        ));
        recompute(&mut state);
        let chars = &state.objects[&wall].computed;
        assert!(chars.has_keyword(Keyword::Flying));
        assert!(!chars.has_keyword(Keyword::Defender));
    }

    #[test]
    fn test_control_change_marks_summoning_sick() {
        let mut state = GameState::new(MatchConfig::default());
        let bear = creature(&mut state, "Bear", 2, 2, 1);
        if let Some(p) = state.objects.get_mut(&bear).and_then(|o| o.permanent.as_mut()) {
            p.summoning_sick = false;
        }
        state.effects.add(modification(1, 1, AffectedSet::Object(bear), ModificationKind::TakeControl));
        recompute(&mut state);
        let obj = &state.objects[&bear];
        assert_eq!(obj.controller, PlayerId::new(0));
        assert!(obj.permanent.as_ref().unwrap().summoning_sick);
    }

    #[test]
    fn test_object_modification_expires_when_object_leaves() {
        let mut state = GameState::new(MatchConfig::default());
        let bear = creature(&mut state, "Bear", 2, 2, 0);
        state.effects.add(modification(1, 1, AffectedSet::Object(bear), ModificationKind::ModifyPt { power: 1, toughness: 1 }));
        recompute(&mut state);
        state
            .relocate(bear, ZoneId::graveyard(PlayerId::new(0)), ZonePosition::Top, None)
            .unwrap();
        recompute(&mut state);
        assert!(state.effects.is_empty());
    }

    #[test]
    fn test_count_defined_pt() {
        let mut state = GameState::new(MatchConfig::default());
        let crowd = creature(&mut state, "Crowd", 0, 0, 0);
        creature(&mut state, "Bear", 2, 2, 0);
        creature(&mut state, "Enemy", 2, 2, 1);
        let mut m = modification(
            1,
            1,
            AffectedSet::Object(crowd),
            ModificationKind::DefinePt(PtDefinition::CountOf(
                ObjectFilter::creature().controlled_by(crate::objects::ControllerRel::You),
            )),
        );
        m.source = crowd;
        state.effects.add(m);
        recompute(&mut state);
        assert_eq!(pt(&state, crowd), (2, 2));
    }
}
