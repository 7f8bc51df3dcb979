//! Follower graph traversal.
//!
//! An actor sides with another when its current behaviour is following or
//! escorting it. Only wander, combat, pursue and breathe packages may come
//! before that follow/escort package. The actor being followed sides with
//! its followers in turn. Traversal is transitive.

use std::collections::{BTreeMap, BTreeSet};

use crate::state::{Actor, ActorId, AiPackage};

/// Registered actors by id, in id order.
pub type ActorMap = BTreeMap<ActorId, Actor>;

/// Allies found during one tick's pairwise pass. Never kept across ticks.
pub type AllyCache = BTreeMap<ActorId, BTreeSet<ActorId>>;

/// Direct (non-transitive) allies of `target`.
///
/// With `exclude_infighting`, a follower currently fighting `target` does not
/// count.
pub fn direct_allies(target: ActorId, actors: &ActorMap, exclude_infighting: bool) -> Vec<ActorId> {
    let mut list = Vec::new();
    for actor in actors.values() {
        if actor.is_player || actor.stats.is_dead() {
            continue;
        }
        let same = actor.id == target;
        for package in actor.stats.ai.iter() {
            if exclude_infighting
                && !same
                && matches!(package, AiPackage::Combat { target: t } if *t == target)
            {
                break;
            }
            if let Some(followed) = package.sides_with() {
                if same {
                    list.push(followed);
                } else if followed == target {
                    list.push(actor.id);
                }
                break;
            }
            if matches!(package, AiPackage::Travel { .. }) {
                break;
            }
        }
    }
    list
}

/// Actors following `target` directly.
pub fn direct_followers(target: ActorId, actors: &ActorMap) -> Vec<ActorId> {
    let mut list = Vec::new();
    for actor in actors.values() {
        if actor.is_player || actor.stats.is_dead() || actor.id == target {
            continue;
        }
        for package in actor.stats.ai.iter() {
            match package {
                AiPackage::Follow { target: followed, .. } => {
                    if *followed == target {
                        list.push(actor.id);
                    }
                    break;
                }
                AiPackage::Combat { .. } | AiPackage::Wander { .. } => {}
                _ => break,
            }
        }
    }
    list
}

/// Every actor transitively siding with `target`.
pub fn get_actors_siding_with(target: ActorId, actors: &ActorMap) -> BTreeSet<ActorId> {
    let mut out = BTreeSet::new();
    collect_siding_with(target, actors, false, &mut out);
    out
}

fn collect_siding_with(
    target: ActorId,
    actors: &ActorMap,
    exclude_infighting: bool,
    out: &mut BTreeSet<ActorId>,
) {
    for ally in direct_allies(target, actors, exclude_infighting) {
        if out.insert(ally) && ally != target {
            collect_siding_with(ally, actors, exclude_infighting, out);
        }
    }
}

/// Like [`get_actors_siding_with`], memoized in `cache` and ignoring
/// followers fighting their leader.
///
/// Every member of a found group shares the same result, so the group is
/// cached under each of them.
pub fn get_actors_siding_with_cached(
    target: ActorId,
    actors: &ActorMap,
    cache: &mut AllyCache,
) -> BTreeSet<ActorId> {
    if let Some(allies) = cache.get(&target) {
        return allies.clone();
    }

    let mut out = BTreeSet::new();
    collect_siding_with(target, actors, true, &mut out);

    for member in &out {
        if *member != target {
            cache.entry(*member).or_insert_with(|| out.clone());
        }
    }
    cache.insert(target, out.clone());
    out
}

/// Every actor transitively following `target`.
pub fn get_actors_following(target: ActorId, actors: &ActorMap) -> BTreeSet<ActorId> {
    let mut out = BTreeSet::new();
    let mut pending = vec![target];
    while let Some(leader) = pending.pop() {
        for follower in direct_followers(leader, actors) {
            if out.insert(follower) {
                pending.push(follower);
            }
        }
    }
    out
}

/// `actor` together with everyone siding with it.
pub fn get_allied_actors(actor: ActorId, actors: &ActorMap) -> BTreeSet<ActorId> {
    let mut allies = get_actors_siding_with(actor, actors);
    allies.insert(actor);
    allies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{CreatureStats, NpcStats, ObjectHandle};
    use crate::stats::{DynamicKind, DynamicStat};

    fn npc(id: i32) -> Actor {
        Actor::npc(
            ActorId(id),
            ObjectHandle(id as u64),
            "guard",
            CreatureStats::default(),
            NpcStats::default(),
        )
    }

    fn follower(id: i32, leader: i32) -> Actor {
        let mut actor = npc(id);
        actor.stats.ai.stack(AiPackage::Follow {
            target: ActorId(leader),
            permanent: false,
        });
        actor
    }

    fn map(actors: impl IntoIterator<Item = Actor>) -> ActorMap {
        actors.into_iter().map(|actor| (actor.id, actor)).collect()
    }

    #[test]
    fn siding_is_transitive_through_follow_chains() {
        let actors = map([npc(0).into_player(), follower(1, 0), follower(2, 1), npc(3)]);
        let allies = get_actors_siding_with(ActorId(0), &actors);
        assert!(allies.contains(&ActorId(1)));
        assert!(allies.contains(&ActorId(2)));
        assert!(!allies.contains(&ActorId(3)));
    }

    #[test]
    fn followed_actor_sides_with_its_follower() {
        let actors = map([npc(1), follower(2, 1)]);
        let allies = get_actors_siding_with(ActorId(2), &actors);
        assert!(allies.contains(&ActorId(1)));
    }

    #[test]
    fn travel_before_follow_breaks_the_relation() {
        let mut busy = follower(1, 0);
        busy.stats.ai.stack(AiPackage::Travel {
            destination: crate::state::Position::ORIGIN,
        });
        let actors = map([npc(0), busy]);
        assert!(get_actors_siding_with(ActorId(0), &actors).is_empty());
    }

    #[test]
    fn dead_followers_are_ignored() {
        let mut corpse = follower(1, 0);
        corpse
            .stats
            .set_dynamic(DynamicKind::Health, DynamicStat::new(10.0).with_current(0.0));
        let actors = map([npc(0), corpse]);
        assert!(get_actors_following(ActorId(0), &actors).is_empty());
    }

    #[test]
    fn cache_is_shared_by_the_whole_group() {
        let mut rebel = follower(2, 0);
        rebel.stats.ai.stack(AiPackage::Combat { target: ActorId(0) });
        let actors = map([npc(0), follower(1, 0), rebel]);
        let mut cache = AllyCache::new();

        let allies = get_actors_siding_with_cached(ActorId(0), &actors, &mut cache);
        assert_eq!(allies, BTreeSet::from([ActorId(0), ActorId(1)]));
        assert_eq!(cache.get(&ActorId(1)), Some(&allies));
        assert!(!cache.contains_key(&ActorId(2)));
    }
}
