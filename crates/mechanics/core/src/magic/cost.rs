//! Spell cost, enchantment cast cost and casting success chance.

use crate::env::{EffectEntry, Env, SpellKind, SpellRecord};
use crate::error::MechanicsResult;
use crate::magic::{EffectId, RangeType};
use crate::state::Actor;
use crate::stats::{Attribute, fatigue_term};

/// Magicka cost contributed by one effect entry.
///
/// # Errors
///
/// Returns an error if the effect has no definition or `fEffectCostMult` is missing.
pub fn calc_effect_cost(entry: &EffectEntry, env: &Env<'_>) -> MechanicsResult<f32> {
    let def = env.magic_effect(entry.id())?;

    let (min, max) = if def.has_magnitude() {
        (entry.magnitude_min.max(1) as f32, entry.magnitude_max.max(1) as f32)
    } else {
        (1.0, 1.0)
    };
    let mut duration = if def.has_duration() {
        entry.duration as f32
    } else {
        1.0
    };
    if !def.is_applied_once() {
        duration = duration.max(1.0);
    }

    let cost = 0.5 * (min + max) * 0.1 * def.base_cost * duration
        + 0.05 * entry.area.max(1) as f32 * def.base_cost;
    Ok(cost * env.float("fEffectCostMult")?)
}

/// Magicka cost of casting `spell`; auto-calculated spells derive it from their effects.
///
/// # Errors
///
/// Propagates effect lookup failures from [`calc_effect_cost`].
pub fn calc_spell_cost(spell: &SpellRecord, env: &Env<'_>) -> MechanicsResult<f32> {
    if !spell.auto_calc {
        return Ok(spell.cost as f32);
    }
    let mut cost = 0.0;
    for entry in &spell.effects {
        let mut effect_cost = calc_effect_cost(entry, env)?;
        if entry.range == RangeType::Target {
            effect_cost *= 1.5;
        }
        cost += effect_cost;
    }
    Ok(cost.round())
}

/// Charge consumed by one use of an enchanted item, reduced by the Enchant skill.
pub fn effective_enchantment_cast_cost(cast_cost: f32, enchant_skill: f32) -> i32 {
    let cost = cast_cost - (cast_cost / 100.0) * (enchant_skill - 10.0);
    cost.max(1.0) as i32
}

/// Success chance before fatigue and Sound: the weakest school decides.
///
/// # Errors
///
/// Returns an error if an effect definition or cost setting is missing.
pub fn spell_base_success_chance(
    spell: &SpellRecord,
    actor: &Actor,
    env: &Env<'_>,
) -> MechanicsResult<f32> {
    let cost_mult = env.float("fEffectCostMult")?;
    let mut lowest = f32::MAX;
    let mut lowest_skill = 0.0;

    for entry in &spell.effects {
        let def = env.magic_effect(entry.id())?;

        let mut x = entry.duration as f32;
        if !def.is_applied_once() {
            x = x.max(1.0);
        }
        x *= 0.1 * def.base_cost;
        x *= 0.5 * (entry.magnitude_min + entry.magnitude_max) as f32;
        x += entry.area as f32 * 0.05 * def.base_cost;
        if entry.range == RangeType::Target {
            x *= 1.5;
        }
        x *= cost_mult;

        let s = 2.0 * actor.skill(def.school.skill());
        if s - x < lowest {
            lowest = s - x;
            lowest_skill = s;
        }
    }

    let stats = &actor.stats;
    let willpower = stats.attribute(Attribute::Willpower).modified();
    let luck = stats.attribute(Attribute::Luck).modified();
    Ok(lowest_skill - calc_spell_cost(spell, env)? + 0.2 * willpower + 0.1 * luck)
}

/// Chance in percent (0..=100) that `actor` casts `spell` successfully.
///
/// With `check_magicka`, a spell the actor cannot currently afford has no chance.
///
/// # Errors
///
/// Returns an error if content or settings needed by the formula are missing.
pub fn spell_success_chance(
    spell: &SpellRecord,
    actor: &Actor,
    env: &Env<'_>,
    check_magicka: bool,
) -> MechanicsResult<f32> {
    let stats = &actor.stats;

    if stats.magic_effects.is_active(EffectId::Silence) {
        return Ok(0.0);
    }
    if spell.kind == SpellKind::Power {
        return Ok(100.0);
    }
    if spell.kind != SpellKind::Spell {
        return Ok(100.0);
    }
    if check_magicka {
        let cost = calc_spell_cost(spell, env)?;
        if cost > 0.0 && stats.magicka().current() < cost {
            return Ok(0.0);
        }
    }
    if spell.always_succeeds {
        return Ok(100.0);
    }

    let base = spell_base_success_chance(spell, actor, env)?;
    let sound = stats.magic_effects.magnitude(EffectId::Sound);
    let chance = (base - sound) * fatigue_term(stats, env.settings)?;
    Ok(chance.clamp(0.0, 100.0))
}
