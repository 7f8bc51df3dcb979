//! Rating of individual magic effects for combat use.
//!
//! A positive rating means the effect helps `actor`; harmful effects aimed at
//! the enemy come out positive after the final sign flip for non-self ranges.
//!
//! Formulas:
//! - Restore self = (p − 1)/2 × (damage/max + 0.6)^(2p) + p × (heal − 2 × overheal)/max − 0.5
//! - Dispel = ±(majority of effects to remove)/5
//! - Harmful = −rating × (1 − min(resistance, 100)/100)
//! - Final = rating × effect cost, negated unless cast on self

use crate::env::{EffectEntry, Env, EquipmentSlot, ItemKind, SpellKind, WeaponKind};
use crate::error::MechanicsResult;
use crate::magic::{EffectId, RangeType, calc_effect_cost, calc_spell_cost, effect_resistance};
use crate::state::{Actor, DrawState};
use crate::stats::{Attribute, DynamicKind, Skill};

use super::weapon::rate_ammo;

/// Effects with a dispellable lifetime shorter than this are left to expire.
const DISPEL_MIN_TIME_LEFT: f32 = 3.0;

/// Rating of one effect entry cast by `actor`, possibly against `enemy`.
///
/// # Errors
///
/// Returns an error if an effect definition, spell record or setting is missing.
pub fn rate_effect(
    entry: &EffectEntry,
    actor: &Actor,
    enemy: Option<&Actor>,
    env: &Env<'_>,
) -> MechanicsResult<f32> {
    use EffectId::*;

    let id = entry.id();
    let mut rating = 1.0;

    match id {
        // Utility, detection and disposition effects the combat AI has no use for.
        Soultrap | AlmsiviIntervention | DivineIntervention | CalmHumanoid | CalmCreature
        | FrenzyHumanoid | FrenzyCreature | DemoralizeHumanoid | DemoralizeCreature
        | RallyHumanoid | RallyCreature | Charm | DetectAnimal | DetectEnchantment | DetectKey
        | Telekinesis | Mark | Recall | Jump | WaterBreathing | SwiftSwim | WaterWalking
        | SlowFall | Light | Lock | Open | TurnUndead | WeaknessToCommonDisease
        | WeaknessToBlightDisease | WeaknessToCorprusDisease | CureCommonDisease
        | CureBlightDisease | CureCorprusDisease | ResistBlightDisease | ResistCommonDisease
        | ResistCorprusDisease | Invisibility | Chameleon | NightEye | Vampirism
        | StuntedMagicka | ExtraSpell | RemoveCurse | CommandCreature | CommandHumanoid => {
            return Ok(0.0);
        }

        Blind => {
            let Some(enemy) = enemy else { return Ok(0.0) };
            let stats = &enemy.stats;
            if stats.is_paralyzed() || stats.knocked_down || stats.draw_state != DrawState::Weapon {
                return Ok(0.0);
            }
        }

        Sound => {
            let Some(enemy) = enemy else { return Ok(0.0) };
            let stats = &enemy.stats;
            if stats.magic_effects.magnitude(Silence) > 0.0 {
                return Ok(0.0);
            }
            if stats.is_paralyzed() || stats.knocked_down || stats.draw_state != DrawState::Spell {
                return Ok(0.0);
            }
        }

        Silence => {
            let Some(enemy) = enemy else { return Ok(0.0) };
            let stats = &enemy.stats;
            if stats.is_paralyzed() || stats.knocked_down || stats.draw_state != DrawState::Spell {
                return Ok(0.0);
            }
        }

        RestoreAttribute | RestoreSkill => return Ok(0.0),

        // The enemy's next spell is unknown, so pre-emptive resistances are wasted.
        ResistFire | ResistFrost | ResistMagicka | ResistNormalWeapons | ResistParalysis
        | ResistPoison | ResistShock | SpellAbsorption | Reflect => return Ok(0.0),

        // Recast endlessly otherwise.
        FortifyAttribute | FortifyHealth | FortifyMagicka | FortifyFatigue | FortifySkill
        | FortifyMaximumMagicka | FortifyAttack => return Ok(0.0),

        Burden => {
            let Some(enemy) = enemy else { return Ok(0.0) };
            if !enemy.has_inventory {
                return Ok(0.0);
            }
            let burden = env.inventory.encumbrance(enemy.handle) - env.inventory.capacity(enemy.handle);
            if burden > 0.0 {
                return Ok(0.0);
            }
            if entry.average_magnitude() > -burden {
                rating *= 3.0;
            } else {
                return Ok(0.0);
            }
        }

        Feather => {
            if !actor.has_inventory {
                return Ok(0.0);
            }
            let burden = env.inventory.encumbrance(actor.handle) - env.inventory.capacity(actor.handle);
            if burden <= 0.0 {
                return Ok(0.0);
            }
            if entry.average_magnitude() >= burden {
                rating *= 3.0;
            } else {
                return Ok(0.0);
            }
        }

        Levitate => return Ok(0.0),

        BoundBoots | BoundHelm => {
            let Some(npc) = &actor.npc else { return Ok(0.0) };
            if env.race(&npc.race)?.beast {
                return Ok(0.0);
            }
        }

        BoundShield => {
            if !actor.has_inventory {
                return Ok(0.0);
            }
            if !actor.is_npc() && !has_one_handed_weapon(actor, env) {
                return Ok(0.0);
            }
        }

        BoundCuirass | BoundGloves => {
            if !actor.is_npc() {
                return Ok(0.0);
            }
        }

        AbsorbMagicka => {
            if enemy.is_some_and(|enemy| enemy.stats.magicka().current() <= 0.0) {
                rating = 0.5 * restore_magicka_priority(actor, env)?;
            }
        }

        RestoreHealth | RestoreMagicka | RestoreFatigue => {
            if entry.range == RangeType::Caster {
                rating = restore_rating(entry, actor, env)?;
            }
        }

        Dispel => {
            let diff = if entry.range == RangeType::Caster {
                count_dispellable(actor, None, true, env)? as i32
                    - count_dispellable(actor, None, false, env)? as i32
            } else {
                let Some(enemy) = enemy else { return Ok(0.0) };
                rating = -rating;
                count_dispellable(enemy, None, false, env)? as i32
                    - count_dispellable(enemy, None, true, env)? as i32
            };
            if diff <= 0 {
                return Ok(0.0);
            }
            rating *= diff as f32 / 5.0;
        }

        // Cures outrank Dispel, which also strips the helpful effects.
        CureParalyzation => return Ok(1001.0 * count_dispellable(actor, Some(Paralyze), true, env)? as f32),
        CurePoison => return Ok(1001.0 * count_dispellable(actor, Some(Poison), true, env)? as f32),

        DisintegrateArmor => {
            let Some(enemy) = enemy else { return Ok(0.0) };
            if !enemy.has_inventory || !wears_armor(enemy, env) {
                return Ok(0.0);
            }
        }

        DisintegrateWeapon => {
            let Some(enemy) = enemy else { return Ok(0.0) };
            if !enemy.has_inventory {
                return Ok(0.0);
            }
            let wields_weapon = env
                .inventory
                .slot(enemy.handle, EquipmentSlot::CarriedRight)
                .and_then(|item| env.content.item(&item.record))
                .is_some_and(|record| record.weapon().is_some());
            if !wields_weapon {
                return Ok(0.0);
            }
        }

        AbsorbAttribute | DamageAttribute | DrainAttribute => {
            let attribute = entry.key.arg.and_then(Attribute::from_index);
            if let (Some(enemy), Some(attribute)) = (enemy, attribute) {
                if enemy.stats.attribute(attribute).modified() <= 0.0 {
                    return Ok(0.0);
                }
            }
            if let Some(attribute) = attribute {
                rating *= attribute.combat_priority();
            }
        }

        AbsorbSkill | DamageSkill | DrainSkill => {
            let Some(enemy) = enemy.filter(|enemy| enemy.is_npc()) else {
                return Ok(0.0);
            };
            let skill = entry.key.arg.and_then(Skill::from_index);
            if skill.is_none_or(|skill| enemy.skill(skill) <= 0.0) {
                return Ok(0.0);
            }
        }

        _ => {}
    }

    // One summon at a time, but preferred over everything else.
    if id.is_summon() {
        if !actor.stats.summons.is_empty() {
            return Ok(0.0);
        }
        rating = 3.0;
    }

    if id.is_bound_item() {
        rating = 2.0;
        if id.is_bound_weapon() {
            // Bound weapons don't stack; only a bow without arrows is worth replacing.
            for bound in bound_weapons() {
                if actor.stats.magic_effects.magnitude(bound) > 0.0
                    && (bound != BoundLongbow
                        || id == bound
                        || rate_ammo(actor, enemy, WeaponKind::Arrow, env)?.rating <= 0.0)
                {
                    return Ok(0.0);
                }
            }
            let skill = match id {
                BoundLongsword => Skill::LongBlade,
                BoundMace => Skill::BluntWeapon,
                BoundBattleAxe => Skill::Axe,
                BoundSpear => Skill::Spear,
                BoundLongbow => {
                    if rate_ammo(actor, enemy, WeaponKind::Arrow, env)?.rating <= 0.0 {
                        return Ok(0.0);
                    }
                    Skill::Marksman
                }
                _ => Skill::ShortBlade,
            };
            rating *= (50.0 + actor.skill(skill)) / 100.0;
        } else if actor.stats.magic_effects.magnitude(id) > 0.0 {
            return Ok(0.0);
        }
    }

    // No ranged casting underwater.
    if entry.range == RangeType::Target {
        if env.world.is_underwater(actor.handle, 0.75) {
            return Ok(0.0);
        }
        let Some(enemy) = enemy else { return Ok(0.0) };
        if env.world.is_underwater(enemy.handle, 0.75) {
            return Ok(0.0);
        }
    }

    let def = env.magic_effect(id)?;
    if def.is_harmful() {
        rating = -rating;
        let Some(enemy) = enemy else { return Ok(0.0) };
        let resistance = effect_resistance(id, &enemy.stats.magic_effects);
        rating *= 1.0 - resistance.min(100.0) / 100.0;
    }

    // Effects without magnitude do nothing when already present on their recipient.
    if !def.has_magnitude() {
        let recipient = if def.is_harmful() { enemy } else { Some(actor) };
        if recipient.is_some_and(|recipient| recipient.stats.magic_effects.magnitude(entry.key) > 0.0) {
            return Ok(0.0);
        }
    }

    rating *= calc_effect_cost(entry, env)?;

    // Touch and target effects are assumed to hit the enemy.
    if entry.range != RangeType::Caster {
        rating = -rating;
    }
    Ok(rating)
}

/// Sum of [`rate_effect`] over `effects`.
///
/// With `use_spell_mult`, target-range entries are scaled by
/// `fAIRangeMagicSpellMult` and the rest by `fAIMagicSpellMult`.
///
/// # Errors
///
/// Propagates errors from [`rate_effect`] and missing multiplier settings.
pub fn rate_effects(
    effects: &[EffectEntry],
    actor: &Actor,
    enemy: Option<&Actor>,
    use_spell_mult: bool,
    env: &Env<'_>,
) -> MechanicsResult<f32> {
    let (spell_mult, range_mult) = if use_spell_mult {
        (env.float("fAIMagicSpellMult")?, env.float("fAIRangeMagicSpellMult")?)
    } else {
        (1.0, 1.0)
    };

    let mut rating = 0.0;
    for entry in effects {
        let mult = if entry.range == RangeType::Target {
            range_mult
        } else {
            spell_mult
        };
        rating += rate_effect(entry, actor, enemy, env)? * mult;
    }
    Ok(rating)
}

fn bound_weapons() -> [EffectId; 6] {
    use EffectId::*;
    [BoundDagger, BoundLongsword, BoundMace, BoundBattleAxe, BoundSpear, BoundLongbow]
}

/// Priority of restoring magicka: 2 when a known spell is affordable at full
/// magicka but not right now.
fn restore_magicka_priority(actor: &Actor, env: &Env<'_>) -> MechanicsResult<f32> {
    let magicka = actor.stats.magicka();
    for id in actor.stats.spells.iter() {
        let spell = env.spell(id)?;
        if spell.kind != SpellKind::Spell {
            continue;
        }
        let cost = calc_spell_cost(spell, env)?;
        if cost > magicka.current() && cost < magicka.modified() {
            return Ok(2.0);
        }
    }
    Ok(0.0)
}

fn restore_rating(entry: &EffectEntry, actor: &Actor, env: &Env<'_>) -> MechanicsResult<f32> {
    let (kind, priority) = match entry.id() {
        EffectId::RestoreHealth => (DynamicKind::Health, 4.0),
        EffectId::RestoreMagicka => (DynamicKind::Magicka, restore_magicka_priority(actor, env)?),
        _ => (DynamicKind::Fatigue, 2.0),
    };
    let stat = actor.stats.dynamic(kind);
    let max = stat.modified();
    if max <= 0.0 {
        return Ok(0.0);
    }

    let to_heal = entry.average_magnitude() * entry.duration.max(1) as f32;
    let damage = (max - stat.current()).max(0.0);
    let (heal, overheal) = if damage < to_heal && stat.current() > max * 0.5 {
        (damage, to_heal - damage)
    } else {
        (to_heal, 0.0)
    };

    Ok((priority - 1.0) / 2.0 * (damage / max + 0.6).powf(priority * 2.0)
        + priority * (heal - 2.0 * overheal) / max
        - 0.5)
}

/// Active spell effects on `actor` a Dispel or Cure would remove.
///
/// Without a filter only cast spells count, not potions or enchantments.
/// `harmful` selects negative or positive effects.
fn count_dispellable(
    actor: &Actor,
    filter: Option<EffectId>,
    harmful: bool,
    env: &Env<'_>,
) -> MechanicsResult<u32> {
    let mut count = 0;
    for params in actor.stats.active_spells.iter() {
        if filter.is_none() {
            let is_cast_spell = env
                .content
                .spell(&params.source_id)
                .is_some_and(|spell| spell.kind == SpellKind::Spell);
            if !is_cast_spell {
                continue;
            }
        }
        for effect in &params.effects {
            if filter.is_some_and(|filter| effect.id() != filter) {
                continue;
            }
            if effect.time_left <= DISPEL_MIN_TIME_LEFT {
                continue;
            }
            if env.magic_effect(effect.id())?.is_harmful() == harmful {
                count += 1;
            }
        }
    }
    Ok(count)
}

fn wears_armor(actor: &Actor, env: &Env<'_>) -> bool {
    EquipmentSlot::ARMOR.iter().any(|slot| {
        env.inventory
            .slot(actor.handle, *slot)
            .and_then(|item| env.content.item(&item.record))
            .is_some_and(|record| matches!(record.kind, ItemKind::Armor(_)))
    })
}

/// A usable one-handed weapon to pair with a bound shield.
fn has_one_handed_weapon(actor: &Actor, env: &Env<'_>) -> bool {
    env.inventory.items(actor.handle).iter().any(|item| {
        let Some(weapon) = env.content.item(&item.record).and_then(|record| record.weapon()) else {
            return false;
        };
        item.condition.unwrap_or(weapon.health) > 0 && !weapon.kind.is_two_handed()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::memory::MemoryServices;
    use crate::env::{ContentTables, InventoryService, ItemRecord, MagicEffectDef, MagicSchool, SpellRecord};
    use crate::magic::{EffectKey, MagicEffectFlags};
    use crate::state::{ActiveEffect, ActiveSpellParams, ActorId, CreatureStats, NpcStats, ObjectHandle, SourceKind};
    use crate::stats::DynamicStat;

    fn content() -> ContentTables {
        let mut content = ContentTables::new();
        let harmful = MagicEffectFlags::HARMFUL;
        content
            .add_magic_effect(MagicEffectDef::new(EffectId::FireDamage, MagicSchool::Destruction, 5.0, harmful))
            .add_magic_effect(MagicEffectDef::new(EffectId::Paralyze, MagicSchool::Illusion, 40.0, harmful))
            .add_magic_effect(MagicEffectDef::new(
                EffectId::Silence,
                MagicSchool::Illusion,
                40.0,
                harmful | MagicEffectFlags::NO_MAGNITUDE,
            ))
            .add_magic_effect(MagicEffectDef::new(
                EffectId::RestoreHealth,
                MagicSchool::Restoration,
                5.0,
                MagicEffectFlags::empty(),
            ))
            .add_magic_effect(MagicEffectDef::new(
                EffectId::DrainAttribute,
                MagicSchool::Destruction,
                1.0,
                harmful | MagicEffectFlags::TARGET_ATTRIBUTE,
            ))
            .add_magic_effect(MagicEffectDef::new(
                EffectId::SummonScamp,
                MagicSchool::Conjuration,
                10.0,
                MagicEffectFlags::NO_MAGNITUDE,
            ))
            .add_spell(SpellRecord::new(
                "hold",
                SpellKind::Spell,
                20,
                vec![EffectEntry::new(EffectId::Paralyze, RangeType::Target, 1, 10)],
            ));
        content
    }

    fn npc(id: i32) -> Actor {
        let mut stats = CreatureStats::new(5);
        stats.set_dynamic(DynamicKind::Health, DynamicStat::new(100.0));
        stats.set_attribute_base(Attribute::Strength, 40.0);
        Actor::npc(ActorId(id), ObjectHandle(id as u64), "bandit", stats, NpcStats::default())
    }

    #[test]
    fn utility_effects_are_never_worth_casting() {
        let mut services = MemoryServices::new(content()).unwrap();
        let entry = EffectEntry::new(EffectId::Mark, RangeType::Caster, 1, 1);
        let rating = rate_effect(&entry, &npc(1), Some(&npc(2)), &services.env()).unwrap();
        assert_eq!(rating, 0.0);
    }

    #[test]
    fn harmful_target_effect_rates_positive_and_scales_with_resistance() {
        let mut services = MemoryServices::new(content()).unwrap();
        let actor = npc(1);
        let mut enemy = npc(2);
        let entry = EffectEntry::new(EffectId::FireDamage, RangeType::Target, 20, 1);

        let env = services.env();
        let full = rate_effect(&entry, &actor, Some(&enemy), &env).unwrap();
        assert!(full > 0.0);

        enemy.stats.magic_effects.add(EffectId::ResistFire, 50.0);
        let halved = rate_effect(&entry, &actor, Some(&enemy), &env).unwrap();
        assert!((halved - full / 2.0).abs() < 1e-4);
    }

    #[test]
    fn harmful_effect_without_enemy_rates_zero() {
        let mut services = MemoryServices::new(content()).unwrap();
        let entry = EffectEntry::new(EffectId::FireDamage, RangeType::Touch, 20, 1);
        assert_eq!(rate_effect(&entry, &npc(1), None, &services.env()).unwrap(), 0.0);
    }

    #[test]
    fn silence_only_targets_casting_enemies() {
        let mut services = MemoryServices::new(content()).unwrap();
        let actor = npc(1);
        let mut enemy = npc(2);
        let entry = EffectEntry::new(EffectId::Silence, RangeType::Touch, 1, 10);
        let env = services.env();

        enemy.stats.draw_state = DrawState::Weapon;
        assert_eq!(rate_effect(&entry, &actor, Some(&enemy), &env).unwrap(), 0.0);

        enemy.stats.draw_state = DrawState::Spell;
        assert!(rate_effect(&entry, &actor, Some(&enemy), &env).unwrap() > 0.0);

        enemy.stats.magic_effects.add(EffectId::Silence, 1.0);
        assert_eq!(rate_effect(&entry, &actor, Some(&enemy), &env).unwrap(), 0.0);
    }

    #[test]
    fn self_heal_is_wanted_only_when_hurt() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut actor = npc(1);
        let entry = EffectEntry::new(EffectId::RestoreHealth, RangeType::Caster, 10, 5);
        let env = services.env();

        let healthy = rate_effect(&entry, &actor, None, &env).unwrap();
        actor
            .stats
            .update_dynamic(DynamicKind::Health, |health| health.set_current(30.0, false, false));
        let wounded = rate_effect(&entry, &actor, None, &env).unwrap();

        assert!(healthy < 0.0);
        assert!(wounded > 0.0);
    }

    #[test]
    fn drained_attribute_at_zero_is_pointless() {
        let mut services = MemoryServices::new(content()).unwrap();
        let actor = npc(1);
        let mut enemy = npc(2);
        let entry = EffectEntry {
            key: EffectKey::attribute(EffectId::DrainAttribute, Attribute::Strength),
            ..EffectEntry::new(EffectId::DrainAttribute, RangeType::Touch, 10, 10)
        };
        let env = services.env();
        assert!(rate_effect(&entry, &actor, Some(&enemy), &env).unwrap() > 0.0);

        enemy.stats.set_attribute_base(Attribute::Strength, 0.0);
        assert_eq!(rate_effect(&entry, &actor, Some(&enemy), &env).unwrap(), 0.0);
    }

    #[test]
    fn second_summon_is_not_wanted() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut actor = npc(1);
        let entry = EffectEntry::new(EffectId::SummonScamp, RangeType::Caster, 1, 60);
        let env = services.env();
        assert!(rate_effect(&entry, &actor, None, &env).unwrap() > 0.0);

        actor
            .stats
            .summons
            .insert(crate::state::SummonKey::new(EffectId::SummonScamp, "conjure"), ActorId(9));
        assert_eq!(rate_effect(&entry, &actor, None, &env).unwrap(), 0.0);
    }

    #[test]
    fn cure_paralysis_counts_lasting_paralysis() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut actor = npc(1);
        actor.stats.active_spells.add(ActiveSpellParams::new(
            "hold",
            SourceKind::Spell,
            ActorId(2),
            vec![ActiveEffect::new(EffectId::Paralyze, 1.0, 10.0)],
        ));
        let entry = EffectEntry::new(EffectId::CureParalyzation, RangeType::Caster, 1, 1);
        assert_eq!(rate_effect(&entry, &actor, None, &services.env()).unwrap(), 1001.0);
    }

    #[test]
    fn target_effects_are_useless_underwater() {
        let mut services = MemoryServices::new(content()).unwrap();
        let actor = npc(1);
        let enemy = npc(2);
        services
            .world
            .place_actor(&actor, crate::state::Position::ORIGIN)
            .submersion = 1.0;
        let entry = EffectEntry::new(EffectId::FireDamage, RangeType::Target, 20, 1);
        assert_eq!(rate_effect(&entry, &actor, Some(&enemy), &services.env()).unwrap(), 0.0);
    }

    #[test]
    fn spell_mult_scales_target_entries_separately() {
        let mut services = MemoryServices::new(content()).unwrap();
        let actor = npc(1);
        let enemy = npc(2);
        let effects = [EffectEntry::new(EffectId::FireDamage, RangeType::Target, 20, 1)];
        let env = services.env();
        let plain = rate_effects(&effects, &actor, Some(&enemy), false, &env).unwrap();
        let scaled = rate_effects(&effects, &actor, Some(&enemy), true, &env).unwrap();
        assert!((scaled - plain * 25.0).abs() < 1e-3);
    }

    fn with_encumbrance_rules() -> ContentTables {
        let mut content = content();
        content
            .add_magic_effect(MagicEffectDef::new(
                EffectId::Burden,
                MagicSchool::Alteration,
                1.0,
                MagicEffectFlags::HARMFUL,
            ))
            .add_magic_effect(MagicEffectDef::new(
                EffectId::Feather,
                MagicSchool::Alteration,
                1.0,
                MagicEffectFlags::empty(),
            ))
            .add_item(ItemRecord::new("anvil", ItemKind::Misc, 150.0));
        content
    }

    #[test]
    fn burden_is_only_worth_it_when_it_overloads() {
        let mut services = MemoryServices::new(with_encumbrance_rules()).unwrap();
        let actor = npc(1);
        let enemy = npc(2);
        services.inventory.set_capacity(enemy.handle, 100.0);
        let light = EffectEntry::new(EffectId::Burden, RangeType::Touch, 50, 10);
        let heavy = EffectEntry::new(EffectId::Burden, RangeType::Touch, 150, 10);
        {
            let env = services.env();
            assert_eq!(rate_effect(&light, &actor, Some(&enemy), &env).unwrap(), 0.0);
            assert!(rate_effect(&heavy, &actor, Some(&enemy), &env).unwrap() > 0.0);
        }

        // Already over capacity.
        services.inventory.add(enemy.handle, &"anvil".into());
        let env = services.env();
        assert_eq!(rate_effect(&heavy, &actor, Some(&enemy), &env).unwrap(), 0.0);
    }

    #[test]
    fn feather_must_lift_the_whole_overload() {
        let mut services = MemoryServices::new(with_encumbrance_rules()).unwrap();
        let actor = npc(1);
        services.inventory.set_capacity(actor.handle, 100.0);
        let weak = EffectEntry::new(EffectId::Feather, RangeType::Caster, 20, 10);
        let strong = EffectEntry::new(EffectId::Feather, RangeType::Caster, 60, 10);
        assert_eq!(rate_effect(&strong, &actor, None, &services.env()).unwrap(), 0.0);

        services.inventory.add(actor.handle, &"anvil".into());
        let env = services.env();
        assert_eq!(rate_effect(&weak, &actor, None, &env).unwrap(), 0.0);
        assert!(rate_effect(&strong, &actor, None, &env).unwrap() > 0.0);
    }

    #[test]
    fn self_dispel_scales_with_the_harmful_surplus() {
        let mut content = content();
        content.add_magic_effect(MagicEffectDef::new(
            EffectId::Dispel,
            MagicSchool::Mysticism,
            5.0,
            MagicEffectFlags::empty(),
        ));
        let mut services = MemoryServices::new(content).unwrap();
        let entry = EffectEntry::new(EffectId::Dispel, RangeType::Caster, 100, 1);
        let held = |count: usize| {
            let mut actor = npc(1);
            actor.stats.active_spells.add(ActiveSpellParams::new(
                "hold",
                SourceKind::Spell,
                ActorId(2),
                vec![ActiveEffect::new(EffectId::Paralyze, 1.0, 10.0); count],
            ));
            // Potions are not dispelled.
            actor.stats.active_spells.add(ActiveSpellParams::new(
                "paralysis_potion",
                SourceKind::Potion,
                ActorId(2),
                vec![ActiveEffect::new(EffectId::Paralyze, 1.0, 10.0); 5],
            ));
            actor
        };
        let env = services.env();

        assert_eq!(rate_effect(&entry, &held(0), None, &env).unwrap(), 0.0);
        let five = rate_effect(&entry, &held(5), None, &env).unwrap();
        let ten = rate_effect(&entry, &held(10), None, &env).unwrap();
        assert!(five > 0.0);
        assert_eq!(ten, five * 2.0);
        assert_eq!(five, calc_effect_cost(&entry, &env).unwrap());
    }
}
