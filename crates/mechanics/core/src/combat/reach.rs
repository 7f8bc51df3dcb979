//! Attack reach, hit chance and the geometric gate on engagement.
//!
//! Formulas:
//! - Melee reach = fCombatDistance × weapon reach (NPC fists: × fHandToHandReach)
//! - Ranged reach = fProjectileMaxSpeed × projectile speed
//! - Hit chance = round((skill + AGI/5 + LCK/10) × fatigue + FortifyAttack − Blind − defense)
//! - Fight distance bias = iFightDistanceBase − fFightDistanceMultiplier × distance

use crate::env::records::range_types;
use crate::env::{EquipmentSlot, Env, WeaponClass, WeaponData};
use crate::error::MechanicsResult;
use crate::magic::{EffectId, RangeTypes};
use crate::state::{Actor, CreatureFlags, DrawState};
use crate::stats::{Attribute, fatigue_term};

/// Chameleon magnitude from which a target counts as hidden.
const HIDDEN_CHAMELEON: f32 = 75.0;

/// Preferred distances for an attack: where to strike from and how close to
/// follow the target beforehand (0 = do not follow).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CombatRange {
    pub attack: f32,
    pub follow: f32,
}

/// Touch effects need contact, target effects a clear line; anything else is
/// cast on oneself from a safe distance.
pub fn suggest_combat_range(types: RangeTypes) -> CombatRange {
    if types.contains(RangeTypes::TOUCH) {
        CombatRange {
            attack: 100.0,
            follow: 300.0,
        }
    } else if types.contains(RangeTypes::TARGET) {
        CombatRange {
            attack: 1000.0,
            follow: 0.0,
        }
    } else {
        CombatRange {
            attack: 600.0,
            follow: 0.0,
        }
    }
}

/// Invisible, or chameleon strong enough to hide the target.
pub fn is_target_magically_hidden(target: &Actor) -> bool {
    let effects = &target.stats.magic_effects;
    effects.magnitude(EffectId::Invisibility) > 0.0
        || effects.magnitude(EffectId::Chameleon) >= HIDDEN_CHAMELEON
}

/// Reach of a melee attack with `weapon`, or with bare hands.
///
/// # Errors
///
/// Returns an error if `fCombatDistance` or `fHandToHandReach` is missing.
pub fn melee_reach(actor: &Actor, weapon: Option<&WeaponData>, env: &Env<'_>) -> MechanicsResult<f32> {
    let combat_distance = env.float("fCombatDistance")?;
    Ok(match weapon {
        Some(weapon) => combat_distance * weapon.reach,
        None if actor.is_npc() => combat_distance * env.float("fHandToHandReach")?,
        None => combat_distance,
    })
}

/// Range of a projectile launched with `weapon`, using `ammo` speed when given.
///
/// # Errors
///
/// Returns an error if `fProjectileMaxSpeed` is missing.
pub fn projectile_reach(
    weapon: &WeaponData,
    ammo: Option<&WeaponData>,
    env: &Env<'_>,
) -> MechanicsResult<f32> {
    let speed = ammo.map_or(weapon.speed, |ammo| ammo.speed);
    Ok(env.float("fProjectileMaxSpeed")? * speed)
}

/// Distance from which `actor` can attack with what it currently holds.
///
/// Spell stance uses the suggested range of the selected spell or enchanted
/// item; otherwise the weapon in the right hand decides.
///
/// # Errors
///
/// Returns an error if a setting or the selected record is missing.
pub fn get_max_attack_distance(actor: &Actor, env: &Env<'_>) -> MechanicsResult<f32> {
    if actor.stats.draw_state == DrawState::Spell {
        if let Some(spell) = actor.stats.spells.selected() {
            let spell = env.spell(spell)?;
            return Ok(suggest_combat_range(range_types(&spell.effects)).attack);
        }
        if actor.has_inventory {
            if let Some(selected) = env.inventory.selected_enchant_item(actor.handle) {
                let enchantment = env
                    .inventory
                    .items(actor.handle)
                    .into_iter()
                    .find(|item| item.handle == selected)
                    .and_then(|item| env.content.item(&item.record))
                    .and_then(|record| record.enchantment.as_ref());
                if let Some(enchantment) = enchantment {
                    let enchantment = env.enchantment(enchantment)?;
                    return Ok(suggest_combat_range(range_types(&enchantment.effects)).attack);
                }
            }
        }
    }

    let weapon = equipped_weapon(actor, EquipmentSlot::CarriedRight, env);
    match weapon {
        Some(weapon) if weapon.kind.class() != WeaponClass::Melee => {
            let ammo = equipped_weapon(actor, EquipmentSlot::Ammunition, env)
                .filter(|ammo| Some(ammo.kind) == weapon.kind.ammo());
            projectile_reach(weapon, ammo, env)
        }
        weapon => melee_reach(actor, weapon, env),
    }
}

fn equipped_weapon<'a>(actor: &Actor, slot: EquipmentSlot, env: &Env<'a>) -> Option<&'a WeaponData> {
    if !actor.has_inventory {
        return None;
    }
    let item = env.inventory.slot(actor.handle, slot)?;
    env.content.item(&item.record)?.weapon()
}

/// Distance between the collision boxes of `a` and `b`.
pub fn distance_minus_half_extents(a: &Actor, b: &Actor, env: &Env<'_>) -> f32 {
    let world = &env.world;
    world.position(a.handle).distance(&world.position(b.handle))
        - world.half_extent_y(a.handle)
        - world.half_extent_y(b.handle)
}

/// Whether `actor` can reach `target` at all.
///
/// Water-bound, land-bound and flying creatures each have targets they cannot
/// follow; a levitating target above an exterior's terrain is out of reach for
/// anything that cannot fly up to it.
///
/// # Errors
///
/// Returns an error if a reach setting or selected record is missing.
pub fn can_fight(actor: &Actor, target: &Actor, env: &Env<'_>) -> MechanicsResult<bool> {
    if is_target_magically_hidden(target) && !env.mechanics.awareness_check(target.id, actor.id) {
        return Ok(false);
    }

    let creature = actor.creature_data();
    if creature.is_some_and(|data| data.is_pure_water_creature())
        && !env.world.is_wading(target.handle)
    {
        return Ok(false);
    }

    let actor_pos = env.world.position(actor.handle);
    let target_pos = env.world.position(target.handle);
    let attack_distance = get_max_attack_distance(actor, env)?;
    if attack_distance > distance_minus_half_extents(actor, target, env)
        && attack_distance > (actor_pos.z - target_pos.z).abs()
        && env.world.line_of_sight(actor.handle, target.handle)
    {
        return Ok(true);
    }

    let pure_land = creature.is_some_and(|data| data.is_pure_land_creature());
    let pure_flying = creature.is_some_and(|data| data.is_pure_flying_creature());
    if pure_land && env.world.is_walking_on_water(target.handle) {
        return Ok(false);
    }
    if (pure_land || pure_flying) && env.world.is_swimming(target.handle) {
        return Ok(false);
    }

    let bipedal = creature.is_none_or(|data| data.flags.contains(CreatureFlags::BIPEDAL));
    if (bipedal || !actor.can_fly())
        && target.stats.magic_effects.magnitude(EffectId::Levitate) > 0.0
        && attack_distance + actor_pos.z < target_pos.z
        && env.world.is_exterior(target.handle)
        && attack_distance < target_pos.z - env.world.terrain_height(target_pos)
    {
        return Ok(false);
    }
    Ok(true)
}

/// Horizontal distance for actors that move freely along Z, full distance otherwise.
pub fn aggro_distance(actor: &Actor, other: &Actor, env: &Env<'_>) -> f32 {
    let from = env.world.position(actor.handle);
    let to = env.world.position(other.handle);
    let moves_by_z = actor.can_fly() || (actor.can_swim() && env.world.is_swimming(actor.handle));
    if moves_by_z {
        from.distance_ignore_z(&to)
    } else {
        from.distance(&to)
    }
}

/// Preference of `actor` for fighting `other` rather than fleeing, by distance.
///
/// # Errors
///
/// Returns an error if a fight distance setting is missing.
pub fn fight_distance_bias(actor: &Actor, other: &Actor, env: &Env<'_>) -> MechanicsResult<f32> {
    let distance = aggro_distance(actor, other, env);
    Ok(env.int("iFightDistanceBase")? as f32 - env.float("fFightDistanceMultiplier")? * distance)
}

/// Evasion term of the defense side of a hit roll.
///
/// # Errors
///
/// Returns an error if a fatigue setting is missing.
pub fn evasion(actor: &Actor, env: &Env<'_>) -> MechanicsResult<f32> {
    let stats = &actor.stats;
    let agility = stats.attribute(Attribute::Agility).modified();
    let luck = stats.attribute(Attribute::Luck).modified();
    Ok((agility / 5.0 + luck / 10.0) * fatigue_term(stats, env.settings)?
        + stats.magic_effects.magnitude(EffectId::Sanctuary))
}

/// Chance in percent that `attacker` using `skill` hits `victim`. May leave 0..=100.
///
/// # Errors
///
/// Returns an error if a fatigue or combat setting is missing.
pub fn hit_chance(attacker: &Actor, victim: &Actor, skill: f32, env: &Env<'_>) -> MechanicsResult<f32> {
    let victim_stats = &victim.stats;
    let mut defense = 0.0;
    if victim_stats.fatigue().current() >= 0.0 {
        let unaware = !victim_stats.ai.is_in_combat()
            && attacker.is_player
            && !env.mechanics.awareness_check(attacker.id, victim.id);
        if !(victim_stats.knocked_down || victim_stats.is_paralyzed() || unaware) {
            defense = evasion(victim, env)?;
        }
        let inviso = env.float("fCombatInvisoMult")?;
        let effects = &victim_stats.magic_effects;
        defense += (inviso * effects.magnitude(EffectId::Chameleon)).min(100.0);
        defense += (inviso * effects.magnitude(EffectId::Invisibility)).min(100.0);
    }

    let stats = &attacker.stats;
    let mut attack = skill
        + stats.attribute(Attribute::Agility).modified() / 5.0
        + stats.attribute(Attribute::Luck).modified() / 10.0;
    attack *= fatigue_term(stats, env.settings)?;
    attack += stats.magic_effects.magnitude(EffectId::FortifyAttack)
        - stats.magic_effects.magnitude(EffectId::Blind);

    Ok((attack - defense).round())
}
