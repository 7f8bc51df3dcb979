//! Rebuilds the authoritative effect snapshot of an actor.
//!
//! Three sources contribute additively: passive spells the actor knows
//! (abilities, diseases, curses), timed active spells, and constant-effect
//! enchantments on equipped items. Nothing else survives a rebuild.

use crate::env::Env;
use crate::error::MechanicsResult;
use crate::magic::MagicEffects;
use crate::state::Actor;

/// Sums every source of `actor` into a fresh snapshot.
///
/// # Errors
///
/// Returns an error if a known spell or one of its effects has no record.
pub fn collect_magic_effects(actor: &Actor, env: &Env<'_>) -> MechanicsResult<MagicEffects> {
    let mut effects = MagicEffects::new();
    let stats = &actor.stats;

    for id in stats.spells.iter() {
        let spell = env.spell(id)?;
        if !spell.is_passive() {
            continue;
        }
        let worsenings = stats.spells.corprus(id).map_or(0, |corprus| corprus.worsenings);
        for entry in &spell.effects {
            let mut magnitude = entry.average_magnitude();
            if worsenings > 0 && env.magic_effect(entry.id())?.is_harmful() {
                magnitude *= (1 + worsenings) as f32;
            }
            effects.add(entry.key, magnitude);
        }
    }

    for spell in stats.active_spells.iter() {
        for effect in spell.effects.iter().filter(|effect| effect.time_left > 0.0) {
            effects.add(effect.key, effect.magnitude);
        }
    }

    if actor.has_inventory {
        for equipped in env.inventory.equipped_effects(actor.handle) {
            effects.add(equipped.key, equipped.magnitude);
        }
    }

    Ok(effects)
}

/// Replaces the snapshot on `actor`. Dead actors keep their last snapshot.
///
/// # Errors
///
/// Propagates content lookup failures from [`collect_magic_effects`].
pub fn update_magic_effects(actor: &mut Actor, env: &Env<'_>) -> MechanicsResult<()> {
    if actor.stats.is_dead() {
        return Ok(());
    }
    actor.stats.magic_effects = collect_magic_effects(actor, env)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::memory::MemoryServices;
    use crate::env::InventoryService;
    use crate::env::{
        ContentTables, EffectEntry, EnchantmentKind, EnchantmentRecord, EquipmentSlot, ItemKind,
        ItemRecord, MagicEffectDef, MagicSchool, SpellKind, SpellRecord,
    };
    use crate::magic::{EffectId, MagicEffectFlags, RangeType};
    use crate::state::{
        ActiveEffect, ActiveSpellParams, ActorId, CreatureStats, GameTime, NpcStats, ObjectHandle,
        SourceKind,
    };
    use crate::stats::{DynamicKind, DynamicStat};

    fn content() -> ContentTables {
        let mut content = ContentTables::new();
        content
            .add_magic_effect(MagicEffectDef::new(
                EffectId::Shield,
                MagicSchool::Alteration,
                2.0,
                MagicEffectFlags::empty(),
            ))
            .add_magic_effect(MagicEffectDef::new(
                EffectId::DrainHealth,
                MagicSchool::Destruction,
                4.0,
                MagicEffectFlags::HARMFUL,
            ))
            .add_spell(SpellRecord::new(
                "thick_skin",
                SpellKind::Ability,
                0,
                vec![EffectEntry::new(EffectId::Shield, RangeType::Caster, 5, 0)],
            ))
            .add_spell(SpellRecord::new(
                "shield_spell",
                SpellKind::Spell,
                5,
                vec![EffectEntry::new(EffectId::Shield, RangeType::Caster, 20, 30)],
            ))
            .add_spell(SpellRecord {
                corprus: true,
                ..SpellRecord::new(
                    "corprus",
                    SpellKind::Disease,
                    0,
                    vec![EffectEntry::new(EffectId::DrainHealth, RangeType::Caster, 2, 0)],
                )
            })
            .add_enchantment(EnchantmentRecord::new(
                "amulet_en",
                EnchantmentKind::ConstantEffect,
                0,
                0,
                vec![EffectEntry::new(EffectId::Shield, RangeType::Caster, 7, 0)],
            ))
            .add_item(
                ItemRecord::new(
                    "amulet",
                    ItemKind::Clothing {
                        slot: EquipmentSlot::Amulet,
                    },
                    1.0,
                )
                .with_enchantment("amulet_en"),
            );
        content
    }

    fn npc() -> Actor {
        let mut stats = CreatureStats::default();
        stats.set_dynamic(DynamicKind::Health, DynamicStat::new(50.0));
        Actor::npc(ActorId(1), ObjectHandle(1), "npc", stats, NpcStats::default())
    }

    #[test]
    fn snapshot_sums_all_three_sources() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut actor = npc();
        actor.stats.spells.add("thick_skin");
        actor.stats.active_spells.add(ActiveSpellParams::new(
            "shield_spell",
            SourceKind::Spell,
            actor.id,
            vec![ActiveEffect::new(EffectId::Shield, 20.0, 30.0)],
        ));
        services.inventory.give_equipped(actor.handle, "amulet");

        update_magic_effects(&mut actor, &services.env()).unwrap();
        assert_eq!(actor.stats.magic_effects.magnitude(EffectId::Shield), 32.0);

        actor.stats.spells.remove(&"thick_skin".into());
        actor.stats.active_spells.clear();
        services.inventory.remove(actor.handle, &"amulet".into(), 1);
        update_magic_effects(&mut actor, &services.env()).unwrap();
        assert!(actor.stats.magic_effects.is_empty());
    }

    #[test]
    fn dead_actors_keep_their_snapshot() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut actor = npc();
        actor.stats.magic_effects.add(EffectId::Shield, 3.0);
        actor
            .stats
            .update_dynamic(DynamicKind::Health, |health| health.set_current(0.0, false, false));

        update_magic_effects(&mut actor, &services.env()).unwrap();
        assert_eq!(actor.stats.magic_effects.magnitude(EffectId::Shield), 3.0);
    }

    #[test]
    fn corprus_harmful_effects_scale_with_worsenings() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut actor = npc();
        actor.stats.spells.add_corprus("corprus", GameTime(0.0));
        actor.stats.spells.worsen_corprus(GameTime(25.0));

        update_magic_effects(&mut actor, &services.env()).unwrap();
        assert_eq!(actor.stats.magic_effects.magnitude(EffectId::DrainHealth), 4.0);
    }

    #[test]
    fn expired_active_effects_do_not_contribute() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut actor = npc();
        let mut effect = ActiveEffect::new(EffectId::Shield, 20.0, 30.0);
        effect.time_left = 0.0;
        actor.stats.active_spells.add(ActiveSpellParams::new(
            "shield_spell",
            SourceKind::Spell,
            actor.id,
            vec![effect],
        ));

        update_magic_effects(&mut actor, &services.env()).unwrap();
        assert!(actor.stats.magic_effects.is_empty());
    }
}
