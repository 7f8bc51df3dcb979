//! Pairwise combat engagement.
//!
//! [`engage_combat`] decides whether one actor starts fighting another this
//! tick. Rules run in a fixed order and the first decisive one wins:
//!
//! 1. an ally was attacked by, or is already fighting, the candidate: join at once
//! 2. the candidate and one of its allies both fight the initiator: the
//!    initiator's whole group joins
//! 3. player followers may attack on sight those fighting them or the group
//! 4. the candidate must be reachable ([`can_fight`])
//! 5. the player's group triggers the mechanics aggression check
//! 6. guards turn on creatures already in combat within the alarm radius
//!
//! Aggression from rules 3, 5 and 6 still needs line of sight and a passed
//! awareness check before combat starts.

use crate::config::MechanicsConfig;
use crate::env::Env;
use crate::error::MechanicsResult;
use crate::registry::allies::{ActorMap, AllyCache, get_actors_siding_with_cached};
use crate::state::{Actor, ActorId, AiPackage};

use super::reach::can_fight;

/// Combat to start as the result of one engagement check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Engagement {
    /// Actors starting combat, the initiator first.
    pub attackers: Vec<ActorId>,
    pub target: ActorId,
    /// Hit-attempt actor the initiator inherits from an ally.
    pub hit_attempt_actor: Option<ActorId>,
}

impl Engagement {
    fn single(attacker: ActorId, target: ActorId) -> Self {
        Self {
            attackers: vec![attacker],
            target,
            hit_attempt_actor: None,
        }
    }
}

/// Decides whether `actor1` engages `actor2`.
///
/// `allies` caches ally groups for the current tick only.
///
/// # Errors
///
/// Returns an error if a reach setting or a selected spell record is missing.
pub fn engage_combat(
    actor1: ActorId,
    actor2: ActorId,
    actors: &ActorMap,
    allies: &mut AllyCache,
    env: &Env<'_>,
    config: &MechanicsConfig,
) -> MechanicsResult<Option<Engagement>> {
    let (Some(first), Some(second)) = (actors.get(&actor1), actors.get(&actor2)) else {
        return Ok(None);
    };
    if !first.is_mobile() || first.stats.is_dead() || second.stats.is_dead() {
        return Ok(None);
    }
    if first.stats.ai.is_in_combat_with(actor2) {
        return Ok(None);
    }

    let distance_squared = env
        .world
        .position(first.handle)
        .distance_squared(&env.world.position(second.handle));
    if distance_squared >= config.ai_processing_distance_squared() {
        return Ok(None);
    }

    let allies1 = get_actors_siding_with_cached(actor1, actors, allies);
    for ally_id in &allies1 {
        if first.stats.ai.is_in_combat_with(*ally_id) {
            continue;
        }
        let Some(ally) = actors.get(ally_id) else {
            continue;
        };
        let attacked = ally.stats.hit_attempt_actor == actor2;
        if attacked || ally.stats.ai.is_in_combat_with(actor2) {
            tracing::debug!(actor = %actor1, target = %actor2, ally = %ally_id, "joining ally in combat");
            let mut engagement = Engagement::single(actor1, actor2);
            engagement.hit_attempt_actor = Some(ally.stats.hit_attempt_actor).filter(|id| id.is_some());
            return Ok(Some(engagement));
        }
    }

    let player = actors.values().find(|actor| actor.is_player).map(|actor| actor.id);
    let player_allies = player
        .map(|player| get_actors_siding_with_cached(player, actors, allies))
        .unwrap_or_default();
    let player_follower = player_allies.contains(&actor1);

    if !player_follower && second.stats.ai.is_in_combat_with(actor1) {
        let allies2 = get_actors_siding_with_cached(actor2, actors, allies);
        let ally2_fighting = allies2.iter().any(|id| {
            *id != actor2
                && actors
                    .get(id)
                    .is_some_and(|ally| ally.stats.ai.is_in_combat_with(actor1))
        });
        if ally2_fighting {
            tracing::debug!(actor = %actor1, target = %actor2, "group escalation");
            let mut attackers = vec![actor1];
            attackers.extend(
                allies1
                    .iter()
                    .copied()
                    .filter(|id| *id != actor1 && Some(*id) != player),
            );
            return Ok(Some(Engagement {
                attackers,
                target: actor2,
                hit_attempt_actor: None,
            }));
        }
    }

    let mut aggressive = false;
    if player_follower && config.follower_attack_on_sight {
        aggressive = second.stats.ai.is_in_combat_with(actor1)
            || allies1
                .iter()
                .any(|id| *id != actor1 && second.stats.ai.is_in_combat_with(*id));
    }

    if !can_fight(first, second, env)? {
        return Ok(None);
    }

    if !aggressive
        && !player_follower
        && (Some(actor2) == player || player_allies.contains(&actor2))
    {
        aggressive = env.mechanics.is_aggressive(actor1, actor2);
    }

    if !aggressive && first.is_guard() && !second.is_npc() && second.stats.ai.is_in_combat() {
        let alarm_radius = env.float("fAlarmRadius")?;
        if distance_squared > alarm_radius * alarm_radius {
            return Ok(None);
        }
        aggressive = !is_leading_follower(second);
    }

    if aggressive
        && env.world.line_of_sight(first.handle, second.handle)
        && env.mechanics.awareness_check(actor2, actor1)
    {
        tracing::debug!(actor = %actor1, target = %actor2, "engaging");
        return Ok(Some(Engagement::single(actor1, actor2)));
    }
    Ok(None)
}

/// Follows or escorts someone, with only combat packages before that.
fn is_leading_follower(actor: &Actor) -> bool {
    for package in actor.stats.ai.iter() {
        if package.sides_with().is_some() {
            return true;
        }
        if !matches!(package, AiPackage::Combat { .. }) {
            return false;
        }
    }
    false
}

/// Puts `attacker` in combat with `target` and notifies the mechanics manager.
pub fn start_combat(attacker: &mut Actor, target: ActorId, env: &mut Env<'_>) {
    if attacker.stats.ai.is_in_combat_with(target) {
        return;
    }
    attacker.stats.ai.stack(AiPackage::Combat { target });
    env.mechanics.start_combat(attacker.id, target);
    tracing::info!(actor = %attacker.id, target = %target, "combat started");
}
