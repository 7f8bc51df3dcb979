//! Summoned creatures bound to summoning effects.
//!
//! Every active `(effect, source)` pair owns at most one creature. The map on
//! [`CreatureStats::summons`](crate::state::CreatureStats) is reconciled
//! against the live effect set once per modifier pass:
//!
//! 1. pairs no longer active are dismissed,
//! 2. new pairs spawn their creature (a failed spawn still records the pair),
//! 3. creatures that finished dying release their effect so it may summon again.
//!
//! Creatures whose cell is not loaded cannot be deleted yet; their ids wait in
//! the graveyard until the world can find them.

use std::collections::BTreeSet;

use crate::env::Env;
use crate::state::{Actor, ActorId, AiPackage, SummonKey};
use crate::stats::{ActorRoster, ModifierOutcome};

pub const SUMMON_START_VFX: &str = "VFX_Summon_Start";
pub const SUMMON_END_VFX: &str = "VFX_Summon_End";

/// Summoning effects currently backed by an active spell or an equipped item.
pub fn active_summon_keys(actor: &Actor, env: &Env<'_>) -> BTreeSet<SummonKey> {
    let mut keys = BTreeSet::new();

    for spell in actor.stats.active_spells.iter() {
        for effect in &spell.effects {
            if effect.id().is_summon() && effect.magnitude > 0.0 && effect.time_left > 0.0 {
                keys.insert(SummonKey::new(effect.id(), spell.source_id.clone()));
            }
        }
    }

    if actor.has_inventory {
        for equipped in env.inventory.equipped_effects(actor.handle) {
            if equipped.key.id.is_summon() && equipped.magnitude > 0.0 {
                keys.insert(SummonKey::new(equipped.key.id, equipped.source));
            }
        }
    }
    keys
}

/// Reconciles the summon map of `actor` with its active summoning effects.
pub fn update_summoned_creatures(
    actor: &mut Actor,
    env: &mut Env<'_>,
    roster: &ActorRoster,
    outcome: &mut ModifierOutcome,
) {
    let active = active_summon_keys(actor, env);

    let stale: Vec<SummonKey> = actor
        .stats
        .summons
        .keys()
        .filter(|key| !active.contains(*key))
        .cloned()
        .collect();
    for key in stale {
        if let Some(creature) = actor.stats.summons.remove(&key) {
            tracing::info!(summoner = %actor.id, creature = %creature, effect = ?key.effect, "summon expired");
            cleanup_summoned_creature(actor, env, creature, outcome);
        }
    }

    for key in active {
        if actor.stats.summons.contains_key(&key) {
            continue;
        }
        let creature = spawn_summon(actor, env, &key, outcome);
        actor.stats.summons.insert(key, creature);
    }

    let finished: Vec<(SummonKey, ActorId)> = actor
        .stats
        .summons
        .iter()
        .filter(|(_, creature)| creature.is_some() && roster.is_death_finished(**creature))
        .map(|(key, creature)| (key.clone(), *creature))
        .collect();
    for (key, creature) in finished {
        actor
            .stats
            .active_spells
            .purge_effect_from(key.effect, &key.source);
        if actor.has_inventory {
            env.inventory
                .purge_effect(actor.handle, key.effect, Some(&key.source));
        }
        actor.stats.summons.remove(&key);
        tracing::info!(summoner = %actor.id, creature = %creature, "summon died");
        cleanup_summoned_creature(actor, env, creature, outcome);
    }

    sweep_graveyard(actor, env, outcome);
}

/// Spawns the creature for `key`. Returns [`ActorId::NONE`] when nothing
/// could be placed so the pair is not retried every tick.
fn spawn_summon(
    actor: &Actor,
    env: &mut Env<'_>,
    key: &SummonKey,
    outcome: &mut ModifierOutcome,
) -> ActorId {
    let Some(record) = env.tables.summon_creature(key.effect) else {
        return ActorId::NONE;
    };

    match env.world.spawn_near(record, actor.handle) {
        Ok(mut creature) => {
            creature.stats.ai.stack(AiPackage::Follow {
                target: actor.id,
                permanent: true,
            });
            let position = env.world.position(creature.handle);
            env.presentation.spawn_effect(SUMMON_START_VFX, position);
            tracing::info!(
                summoner = %actor.id,
                creature = %creature.id,
                record = %record,
                "summon spawned"
            );
            let id = creature.id;
            outcome.spawned.push(creature);
            id
        }
        Err(err) => {
            tracing::warn!(summoner = %actor.id, effect = ?key.effect, error = %err, "failed to spawn summon");
            ActorId::NONE
        }
    }
}

/// Deletes a dismissed creature, or defers it to the graveyard when the
/// world cannot locate it.
pub fn cleanup_summoned_creature(
    actor: &mut Actor,
    env: &mut Env<'_>,
    creature: ActorId,
    outcome: &mut ModifierOutcome,
) {
    if creature.is_none() {
        return;
    }
    match env.world.find_actor(creature) {
        Some(handle) => {
            let position = env.world.position(handle);
            env.presentation.spawn_effect(SUMMON_END_VFX, position);
            env.world.delete_object(handle);
            outcome.dismissed.push(creature);
        }
        None => {
            tracing::debug!(creature = %creature, "summon not loaded, deferred to the graveyard");
            actor.stats.summon_graveyard.push(creature);
        }
    }
}

fn sweep_graveyard(actor: &mut Actor, env: &mut Env<'_>, outcome: &mut ModifierOutcome) {
    let mut pending = Vec::new();
    for creature in std::mem::take(&mut actor.stats.summon_graveyard) {
        match env.world.find_actor(creature) {
            Some(handle) => {
                let position = env.world.position(handle);
                env.presentation.spawn_effect(SUMMON_END_VFX, position);
                env.world.delete_object(handle);
                outcome.dismissed.push(creature);
                tracing::debug!(creature = %creature, "graveyard summon removed");
            }
            None => pending.push(creature),
        }
    }
    actor.stats.summon_graveyard = pending;
}
