//! Weapon and ammunition rating.
//!
//! Formulas:
//! - Melee damage = (slash² + thrust² + chop²) / (slash + thrust + chop), averages of min/max
//! - Ranged damage = chop (× 2 for thrown weapons, which are both weapon and projectile)
//! - Rating = damage × condition × hit chance (clamped to [0.01, 1]) × speed × class mult
//! - Vanilla = armor × fAIMeleeArmorMult + max damage × skill / 100 × class mult

use crate::combat::{distance_minus_half_extents, get_max_attack_distance, hit_chance};
use crate::env::{EnchantmentKind, Env, InventoryItem, WeaponClass, WeaponData, WeaponFlags, WeaponKind};
use crate::error::MechanicsResult;
use crate::magic::{EffectId, effective_enchantment_cast_cost};
use crate::state::{Actor, ItemHandle};
use crate::stats::Skill;

use super::effect::rate_effects;

/// Best arrow and bolt ratings, folded into launcher ratings.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AmmoRatings {
    pub arrow: f32,
    pub bolt: f32,
}

impl AmmoRatings {
    fn for_launcher(&self, kind: WeaponKind) -> f32 {
        match kind.ammo() {
            Some(WeaponKind::Bolt) => self.bolt,
            _ => self.arrow,
        }
    }
}

/// Highest rated stack of one ammunition kind in the actor's inventory.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BestAmmo {
    pub item: Option<ItemHandle>,
    pub rating: f32,
}

/// Rating of `item` as a weapon for `actor` against `enemy`.
///
/// With `only`, anything but that weapon kind rates 0; without it,
/// ammunition rates 0.
///
/// # Errors
///
/// Returns an error if the item or enchantment record, or a setting, is missing.
pub fn rate_weapon(
    item: &InventoryItem,
    actor: &Actor,
    enemy: Option<&Actor>,
    only: Option<WeaponKind>,
    ammo: AmmoRatings,
    env: &Env<'_>,
) -> MechanicsResult<f32> {
    let Some(enemy) = enemy else { return Ok(0.0) };
    let record = env.item(&item.record)?;
    let Some(weapon) = record.weapon() else {
        return Ok(0.0);
    };
    if weapon.has_health() && item.condition == Some(0) {
        return Ok(0.0);
    }
    let class = weapon.kind.class();
    match only {
        Some(kind) if kind != weapon.kind => return Ok(0.0),
        None if class == WeaponClass::Ammo => return Ok(0.0),
        _ => {}
    }

    let mut class_mult = env.float("fAIMeleeWeaponMult")?;
    if class != WeaponClass::Melee {
        if env.world.is_underwater(actor.handle, 0.75) || env.world.is_underwater(enemy.handle, 0.75) {
            return Ok(0.0);
        }
        // Out of the enemy's reach.
        if distance_minus_half_extents(actor, enemy, env) >= get_max_attack_distance(enemy, env)? {
            class_mult = env.float("fAIRangeMeleeWeaponMult")?;
        }
    }

    let mut rating = base_damage(weapon);
    if weapon.has_health() {
        let condition = item.condition.unwrap_or(weapon.health);
        rating *= condition as f32 / weapon.health as f32;
    }

    if class == WeaponClass::Ranged {
        let ammo_rating = ammo.for_launcher(weapon.kind);
        if ammo_rating <= 0.0 {
            return Ok(0.0);
        }
        rating += ammo_rating;
    } else {
        rating *= damage_mult_against(weapon, enemy, env)?;
    }

    if let Some(enchantment) = &record.enchantment {
        let enchantment = env.enchantment(enchantment)?;
        if enchantment.kind == EnchantmentKind::WhenStrikes {
            let cast_cost =
                effective_enchantment_cast_cost(enchantment.cost as f32, actor.skill(Skill::Enchant));
            if item.has_charge_for(cast_cost as f32)
                || matches!(class, WeaponClass::Thrown | WeaponClass::Ammo)
            {
                rating += rate_effects(&enchantment.effects, actor, Some(enemy), true, env)?;
            }
        }
    }

    // Fists beat a weapon the actor has no skill with.
    let skill = record.equipment_skill().map_or(50.0, |skill| actor.skill(skill));
    if skill <= 0.0 {
        return Ok(0.0);
    }
    // Creatures hit with their combat skill whatever the weapon.
    let hit_skill = actor.creature_data().map_or(skill, |data| data.skills.combat);
    let chance = hit_chance(actor, enemy, hit_skill, env)? / 100.0;
    rating *= chance.clamp(0.01, 1.0);

    if class != WeaponClass::Ammo {
        rating *= weapon.speed;
    }
    Ok(rating * class_mult)
}

/// Best stack of `kind` ammunition `actor` carries, rated against `enemy`.
///
/// # Errors
///
/// Propagates errors from [`rate_weapon`].
pub fn rate_ammo(
    actor: &Actor,
    enemy: Option<&Actor>,
    kind: WeaponKind,
    env: &Env<'_>,
) -> MechanicsResult<BestAmmo> {
    let mut best = BestAmmo::default();
    if !actor.has_inventory {
        return Ok(best);
    }
    for item in env.inventory.items(actor.handle) {
        let rating = rate_weapon(&item, actor, enemy, Some(kind), AmmoRatings::default(), env)?;
        if rating > best.rating {
            best = BestAmmo {
                item: Some(item.handle),
                rating,
            };
        }
    }
    Ok(best)
}

/// Simple estimate of fighting with `weapon` (bare hands when `None`), used
/// only to weigh fleeing.
///
/// A ranged weapon counts only with ammunition and against an enemy that is
/// not swimming.
///
/// # Errors
///
/// Returns an error if the weapon record or a setting is missing.
pub fn vanilla_rate_weapon(
    weapon: Option<&InventoryItem>,
    has_ammo: bool,
    actor: &Actor,
    enemy: &Actor,
    env: &Env<'_>,
) -> MechanicsResult<f32> {
    let armor = if actor.has_inventory {
        env.inventory.armor_rating(actor.handle)
    } else {
        0.0
    };
    let mut rating = armor * env.float("fAIMeleeArmorMult")?;

    let Some(item) = weapon else { return Ok(rating) };
    let Some(data) = env.item(&item.record)?.weapon() else {
        return Ok(rating);
    };

    let mult = match data.kind.class() {
        WeaponClass::Ranged => {
            if !has_ammo || env.world.is_swimming(enemy.handle) {
                return Ok(rating);
            }
            env.float("fAIRangeMeleeWeaponMult")?
        }
        _ => env.float("fAIMeleeWeaponMult")?,
    };
    let max_damage = data.chop[1].max(data.slash[1]).max(data.thrust[1]) as f32;
    rating += max_damage * actor.skill(data.kind.skill()) / 100.0 * mult;
    Ok(rating)
}

fn base_damage(weapon: &WeaponData) -> f32 {
    let average = |pair: [i32; 2]| (pair[0] + pair[1]) as f32 / 2.0;
    let chop = average(weapon.chop);
    match weapon.kind.class() {
        WeaponClass::Thrown => chop * 2.0,
        WeaponClass::Ranged | WeaponClass::Ammo => chop,
        WeaponClass::Melee => {
            let slash = average(weapon.slash);
            let thrust = average(weapon.thrust);
            let total = slash + thrust + chop;
            if total <= 0.0 {
                0.0
            } else {
                (slash * slash + thrust * thrust + chop * chop) / total
            }
        }
    }
}

/// Normal weapon resistance and the silver bonus against werewolves.
fn damage_mult_against(weapon: &WeaponData, enemy: &Actor, env: &Env<'_>) -> MechanicsResult<f32> {
    let mut mult = 1.0;
    if !weapon.flags.intersects(WeaponFlags::MAGICAL | WeaponFlags::SILVER) {
        let effects = &enemy.stats.magic_effects;
        let resistance = effects.magnitude(EffectId::ResistNormalWeapons)
            - effects.magnitude(EffectId::WeaknessToNormalWeapons);
        mult *= 1.0 - resistance.min(100.0) / 100.0;
    }
    if weapon.flags.contains(WeaponFlags::SILVER) && enemy.is_werewolf() {
        mult *= env.float("fWereWolfSilverWeaponDamageMult")?;
    }
    Ok(mult)
}
