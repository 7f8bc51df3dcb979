//! Rating of spells, enchanted items and potions.

use crate::env::records::range_types;
use crate::env::{EnchantmentKind, Env, InventoryItem, ItemKind, SpellKind, SpellRecord};
use crate::error::MechanicsResult;
use crate::magic::{RangeType, RangeTypes, effective_enchantment_cast_cost, spell_success_chance};
use crate::state::Actor;
use crate::stats::Skill;

use super::effect::rate_effects;

/// An effect on the enemy with more time left than this is not refreshed.
const REFRESH_TIME_LEFT: f32 = 3.0;

/// Rechargeable items are preferred over spells.
const WHEN_USED_BONUS: f32 = 1.25;

/// Rating of casting `spell`, scaled by the chance of success.
///
/// Racial powers and spells still running from this caster rate 0.
///
/// # Errors
///
/// Returns an error if a record or setting the rating needs is missing.
pub fn rate_spell(
    spell: &SpellRecord,
    actor: &Actor,
    enemy: Option<&Actor>,
    check_magicka: bool,
    env: &Env<'_>,
) -> MechanicsResult<f32> {
    let success = spell_success_chance(spell, actor, env, check_magicka)?;
    if success == 0.0 || spell.kind != SpellKind::Spell {
        return Ok(0.0);
    }

    if let Some(npc) = &actor.npc {
        if env.race(&npc.race)?.powers.contains(&spell.id) {
            return Ok(0.0);
        }
    }

    // Spells don't stack.
    let types = range_types(&spell.effects);
    if types.contains(RangeTypes::CASTER)
        && actor.stats.active_spells.is_spell_active_from(actor.id, &spell.id)
    {
        return Ok(0.0);
    }
    if types.intersects(RangeTypes::TOUCH | RangeTypes::TARGET)
        && enemy.is_some_and(|enemy| enemy.stats.active_spells.is_spell_active_from(actor.id, &spell.id))
    {
        return Ok(0.0);
    }

    Ok(rate_effects(&spell.effects, actor, enemy, true, env)? * (success / 100.0))
}

/// Rating of using the enchantment on `item`.
///
/// Cast-once scrolls rate as their effects; on-use items must be equipped by
/// NPCs and carry enough charge.
///
/// # Errors
///
/// Returns an error if the item or enchantment record is missing.
pub fn rate_magic_item(
    item: &InventoryItem,
    actor: &Actor,
    enemy: Option<&Actor>,
    env: &Env<'_>,
) -> MechanicsResult<f32> {
    let Some(enchantment) = &env.item(&item.record)?.enchantment else {
        return Ok(0.0);
    };
    let enchantment = env.enchantment(enchantment)?;

    let types = range_types(&enchantment.effects);
    if types.contains(RangeTypes::CASTER) && actor.stats.active_spells.is_spell_active(&item.record) {
        return Ok(0.0);
    }
    if types.intersects(RangeTypes::TOUCH | RangeTypes::TARGET)
        && enemy.is_some_and(|enemy| {
            enemy.stats.active_spells.remaining_duration(&item.record) > REFRESH_TIME_LEFT
        })
    {
        return Ok(0.0);
    }

    match enchantment.kind {
        EnchantmentKind::CastOnce => rate_effects(&enchantment.effects, actor, enemy, true, env),
        EnchantmentKind::WhenUsed => {
            // Creatures cannot wear items, so they may use them from the pack.
            if actor.is_npc() && !env.inventory.is_equipped(actor.handle, item.handle) {
                return Ok(0.0);
            }
            let cast_cost =
                effective_enchantment_cast_cost(enchantment.cost as f32, actor.skill(Skill::Enchant));
            if !item.has_charge_for(cast_cost as f32) {
                return Ok(0.0);
            }
            Ok(rate_effects(&enchantment.effects, actor, enemy, true, env)? * WHEN_USED_BONUS)
        }
        EnchantmentKind::WhenStrikes | EnchantmentKind::ConstantEffect => Ok(0.0),
    }
}

/// Rating of drinking `item`; anything but a potion rates 0.
///
/// # Errors
///
/// Returns an error if the item record is missing.
pub fn rate_potion(item: &InventoryItem, actor: &Actor, env: &Env<'_>) -> MechanicsResult<f32> {
    match &env.item(&item.record)?.kind {
        ItemKind::Potion { effects } => rate_effects(effects, actor, None, true, env),
        _ => Ok(0.0),
    }
}

/// Simple estimate of casting `spell`, used only to weigh fleeing.
///
/// # Errors
///
/// Returns an error if a record or setting is missing.
pub fn vanilla_rate_spell(
    spell: &SpellRecord,
    actor: &Actor,
    enemy: &Actor,
    env: &Env<'_>,
) -> MechanicsResult<f32> {
    let mult = if spell.effects.iter().any(|entry| entry.range == RangeType::Target) {
        if env.world.is_swimming(enemy.handle) {
            0.0
        } else {
            env.float("fAIRangeMagicSpellMult")?
        }
    } else {
        env.float("fAIMagicSpellMult")?
    };
    Ok(spell_success_chance(spell, actor, env, true)? * mult)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::memory::MemoryServices;
    use crate::env::{
        ContentTables, EffectEntry, EnchantmentRecord, EquipmentSlot, InventoryService, ItemRecord, MagicEffectDef,
        MagicSchool, RaceRecord,
    };
    use crate::magic::{EffectId, MagicEffectFlags};
    use crate::state::{ActiveEffect, ActiveSpellParams, ActorId, CreatureStats, NpcStats, ObjectHandle, SourceKind};
    use crate::stats::{Attribute, DynamicKind, DynamicStat};

    fn fireball() -> SpellRecord {
        SpellRecord::new(
            "fireball",
            SpellKind::Spell,
            10,
            vec![EffectEntry::new(EffectId::FireDamage, RangeType::Target, 20, 1)],
        )
    }

    fn content() -> ContentTables {
        let mut content = ContentTables::new();
        let mut power = fireball();
        power.id = "dragon_breath".into();
        power.kind = SpellKind::Power;
        content
            .add_magic_effect(MagicEffectDef::new(
                EffectId::FireDamage,
                MagicSchool::Destruction,
                5.0,
                MagicEffectFlags::HARMFUL,
            ))
            .add_magic_effect(MagicEffectDef::new(
                EffectId::RestoreHealth,
                MagicSchool::Restoration,
                5.0,
                MagicEffectFlags::empty(),
            ))
            .add_spell(fireball())
            .add_spell(power)
            .add_race(RaceRecord {
                id: "dunmer".into(),
                beast: false,
                powers: vec!["ancestor_guardian".into()],
            })
            .add_enchantment(EnchantmentRecord::new(
                "fire_strike",
                EnchantmentKind::WhenUsed,
                20,
                100,
                vec![EffectEntry::new(EffectId::FireDamage, RangeType::Target, 20, 1)],
            ))
            .add_item(ItemRecord::new(
                "fire_ring",
                ItemKind::Clothing {
                    slot: EquipmentSlot::LeftRing,
                },
                0.1,
            )
            .with_enchantment("fire_strike"))
            .add_item(ItemRecord::new(
                "healing_potion",
                ItemKind::Potion {
                    effects: vec![EffectEntry::new(EffectId::RestoreHealth, RangeType::Caster, 10, 5)],
                },
                0.5,
            ));
        content
    }

    fn mage(id: i32) -> Actor {
        let mut npc = NpcStats::new("dunmer", "mage");
        npc.set_skill_base(Skill::Destruction, 80.0);
        npc.set_skill_base(Skill::Enchant, 30.0);
        let mut stats = CreatureStats::new(10);
        stats.set_attribute_base(Attribute::Willpower, 50.0);
        stats.set_dynamic(DynamicKind::Health, DynamicStat::new(100.0));
        stats.set_dynamic(DynamicKind::Magicka, DynamicStat::new(100.0));
        stats.set_dynamic(DynamicKind::Fatigue, DynamicStat::new(100.0));
        Actor::npc(ActorId(id), ObjectHandle(id as u64), "mage", stats, npc)
    }

    #[test]
    fn known_attack_spell_rates_positive() {
        let mut services = MemoryServices::new(content()).unwrap();
        let (actor, enemy) = (mage(1), mage(2));
        let rating = rate_spell(&fireball(), &actor, Some(&enemy), true, &services.env()).unwrap();
        assert!(rating > 0.0);
    }

    #[test]
    fn spell_still_burning_on_enemy_is_not_recast() {
        let mut services = MemoryServices::new(content()).unwrap();
        let actor = mage(1);
        let mut enemy = mage(2);
        enemy.stats.active_spells.add(ActiveSpellParams::new(
            "fireball",
            SourceKind::Spell,
            actor.id,
            vec![ActiveEffect::new(EffectId::FireDamage, 20.0, 1.0)],
        ));
        let rating = rate_spell(&fireball(), &actor, Some(&enemy), true, &services.env()).unwrap();
        assert_eq!(rating, 0.0);
    }

    #[test]
    fn unaffordable_spell_rates_zero_when_checking_magicka() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut actor = mage(1);
        actor
            .stats
            .set_dynamic(DynamicKind::Magicka, DynamicStat::new(100.0).with_current(5.0));
        let enemy = mage(2);
        let env = services.env();
        assert_eq!(rate_spell(&fireball(), &actor, Some(&enemy), true, &env).unwrap(), 0.0);
        assert!(rate_spell(&fireball(), &actor, Some(&enemy), false, &env).unwrap() > 0.0);
    }

    #[test]
    fn powers_are_never_rated() {
        let mut services = MemoryServices::new(content()).unwrap();
        let (actor, enemy) = (mage(1), mage(2));
        let env = services.env();
        let power = env.spell(&"dragon_breath".into()).unwrap().clone();
        assert_eq!(rate_spell(&power, &actor, Some(&enemy), true, &env).unwrap(), 0.0);
    }

    #[test]
    fn racial_power_is_left_to_the_race_even_when_cast_as_a_spell() {
        let mut guardian = fireball();
        guardian.id = "ancestor_guardian".into();
        let mut content = content();
        content.add_spell(guardian.clone()).add_race(RaceRecord {
            id: "breton".into(),
            beast: false,
            powers: Vec::new(),
        });
        let mut services = MemoryServices::new(content).unwrap();
        let env = services.env();

        let dunmer = mage(1);
        let mut breton = mage(2);
        breton.npc.as_mut().unwrap().race = "breton".into();
        let enemy = mage(3);

        assert_eq!(rate_spell(&guardian, &dunmer, Some(&enemy), true, &env).unwrap(), 0.0);
        assert!(rate_spell(&guardian, &breton, Some(&enemy), true, &env).unwrap() > 0.0);
    }

    #[test]
    fn on_use_item_needs_equipping_and_charge() {
        let mut services = MemoryServices::new(content()).unwrap();
        let (actor, enemy) = (mage(1), mage(2));
        let handle = services.inventory.add(actor.handle, &"fire_ring".into());
        let mut ring = services.inventory.find_by_record(actor.handle, &"fire_ring".into()).unwrap();

        let unequipped = rate_magic_item(&ring, &actor, Some(&enemy), &services.env()).unwrap();
        assert_eq!(unequipped, 0.0);

        services.inventory.equip(actor.handle, handle);
        let equipped = rate_magic_item(&ring, &actor, Some(&enemy), &services.env()).unwrap();
        let spell = rate_spell(&fireball(), &actor, Some(&enemy), false, &services.env()).unwrap();
        assert!(equipped > spell);

        ring.charge = Some(1.0);
        let drained = rate_magic_item(&ring, &actor, Some(&enemy), &services.env()).unwrap();
        assert_eq!(drained, 0.0);
    }

    #[test]
    fn potion_rating_follows_need() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut actor = mage(1);
        services.inventory.add(actor.handle, &"healing_potion".into());
        let potion = services
            .inventory
            .find_by_record(actor.handle, &"healing_potion".into())
            .unwrap();

        assert!(rate_potion(&potion, &actor, &services.env()).unwrap() < 0.0);
        actor
            .stats
            .update_dynamic(DynamicKind::Health, |health| health.set_current(20.0, false, false));
        assert!(rate_potion(&potion, &actor, &services.env()).unwrap() > 0.0);
    }

    #[test]
    fn vanilla_target_spell_is_useless_against_swimmers() {
        let mut services = MemoryServices::new(content()).unwrap();
        let (actor, enemy) = (mage(1), mage(2));
        services.world.place_actor(&enemy, crate::state::Position::ORIGIN).swimming = true;
        let env = services.env();
        assert_eq!(vanilla_rate_spell(&fireball(), &actor, &enemy, &env).unwrap(), 0.0);
    }
}
