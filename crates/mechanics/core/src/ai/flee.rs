//! Whether a fighting actor would rather run.
//!
//! Formulas:
//! - Flee rating = (1 − health ratio) × fAIFleeHealthMult + Flee × fAIFleeFleeMult
//! - Under-leveled NPC against a werewolf NPC: iWereWolfFleeMod instead
//! - Non-zero ratings add the fight distance bias; anything below 100 is 0

use crate::combat::fight_distance_bias;
use crate::env::Env;
use crate::error::MechanicsResult;
use crate::state::Actor;
use crate::stats::AiSetting;

/// Ratings below this mean the actor keeps fighting.
pub const FLEE_THRESHOLD: f32 = 100.0;

/// Desire of `actor` to flee from `enemy`, 0 or at least [`FLEE_THRESHOLD`].
///
/// # Errors
///
/// Returns an error if a flee or fight distance setting is missing.
pub fn rate_flee(actor: &Actor, enemy: &Actor, env: &Env<'_>) -> MechanicsResult<f32> {
    let flee = actor.stats.ai_setting(AiSetting::Flee).modified() as f32;
    if flee >= FLEE_THRESHOLD {
        return Ok(flee);
    }

    let health_deficit = 1.0 - actor.stats.health().ratio();
    let mut rating =
        health_deficit * env.float("fAIFleeHealthMult")? + flee * env.float("fAIFleeFleeMult")?;

    if actor.is_npc()
        && enemy.is_npc()
        && enemy.is_werewolf()
        && actor.stats.level < env.int("iWereWolfLevelToAttack")?
    {
        rating = env.int("iWereWolfFleeMod")? as f32;
    }

    if rating != 0.0 {
        rating += fight_distance_bias(actor, enemy, env)?;
    }

    Ok(if rating < FLEE_THRESHOLD { 0.0 } else { rating })
}

/// Flee wins over an offensive option rated `anti_flee` by the simple
/// estimate. With nothing to fight with, an actor that just summoned help
/// lets the summon fight.
///
/// # Errors
///
/// Returns an error if a flee or fight distance setting is missing.
pub fn make_flee_decision(
    actor: &Actor,
    enemy: &Actor,
    anti_flee: f32,
    env: &Env<'_>,
) -> MechanicsResult<bool> {
    let flee = rate_flee(actor, enemy, env)?;
    if flee == 0.0 {
        return Ok(false);
    }
    Ok(flee > anti_flee || (anti_flee == 0.0 && actor.stats.has_active_summon()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::ContentTables;
    use crate::env::memory::MemoryServices;
    use crate::state::{ActorId, CreatureStats, NpcStats, ObjectHandle, Position};
    use crate::stats::{DynamicKind, DynamicStat};

    fn npc(id: i32, level: i32, flee: i32) -> Actor {
        let mut stats = CreatureStats::new(level);
        stats.set_dynamic(DynamicKind::Health, DynamicStat::new(100.0));
        stats.set_ai_setting_base(AiSetting::Flee, flee);
        Actor::npc(ActorId(id), ObjectHandle(id as u64), "npc", stats, NpcStats::new("nord", "warrior"))
    }

    /// Places both actors so the fight distance bias is exactly 0.
    fn services(actor: &Actor, enemy: &Actor) -> MemoryServices {
        let mut services = MemoryServices::new(ContentTables::new()).unwrap();
        services.world.place_actor(actor, Position::ORIGIN);
        services
            .world
            .place_actor(enemy, Position::new(2000.0, 0.0, 0.0));
        services
    }

    #[test]
    fn flee_setting_at_threshold_wins_narrowly() {
        let (actor, enemy) = (npc(1, 10, 100), npc(2, 10, 0));
        let mut services = services(&actor, &enemy);
        let env = services.env();

        assert_eq!(rate_flee(&actor, &enemy, &env).unwrap(), 100.0);
        assert!(make_flee_decision(&actor, &enemy, 99.0, &env).unwrap());
        assert!(!make_flee_decision(&actor, &enemy, 100.0, &env).unwrap());
    }

    #[test]
    fn ratings_below_threshold_are_floored() {
        // 99 × 0.3 + distance bias 0 stays far below 100.
        let (actor, enemy) = (npc(1, 10, 99), npc(2, 10, 0));
        let mut services = services(&actor, &enemy);
        let env = services.env();

        assert_eq!(rate_flee(&actor, &enemy, &env).unwrap(), 0.0);
        assert!(!make_flee_decision(&actor, &enemy, 1.0, &env).unwrap());
        assert!(!make_flee_decision(&actor, &enemy, 0.0, &env).unwrap());
    }

    #[test]
    fn low_level_npcs_flee_werewolves() {
        let actor = npc(1, 5, 0);
        let mut enemy = npc(2, 10, 0);
        enemy.stats.werewolf = true;
        let mut services = services(&actor, &enemy);
        let env = services.env();

        assert_eq!(rate_flee(&actor, &enemy, &env).unwrap(), 100.0);

        let veteran = npc(3, 20, 0);
        assert_eq!(rate_flee(&veteran, &enemy, &env).unwrap(), 0.0);
    }

    #[test]
    fn summoner_without_options_lets_the_summon_fight() {
        let mut actor = npc(1, 10, 100);
        actor.stats.summons.insert(
            crate::state::SummonKey::new(crate::magic::EffectId::SummonScamp, "summon_scamp"),
            ActorId(9),
        );
        let enemy = npc(2, 10, 0);
        let mut services = services(&actor, &enemy);
        let env = services.env();

        assert!(make_flee_decision(&actor, &enemy, 0.0, &env).unwrap());
        assert!(!make_flee_decision(&actor, &enemy, 150.0, &env).unwrap());
    }
}
