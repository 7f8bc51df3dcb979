//! Choice of the next combat action.
//!
//! Every candidate source is scanned in a fixed order and the highest rating
//! wins; ties keep the first candidate seen. The order is potions, enchanted
//! items, weapons (with the best arrow and bolt folded in) and then known
//! spells. The winner is then weighed against fleeing using the simple
//! estimates from [`vanilla_rate_weapon`] and [`vanilla_rate_spell`].
//!
//! # Determinism
//!
//! Rating reads only actor state, services and content. Given the same
//! inputs the same action is always chosen.

use crate::env::{EquipmentSlot, Env, InventoryItem, WeaponKind};
use crate::error::MechanicsResult;
use crate::state::{Actor, ItemHandle};

use super::action::{Action, ItemRef};
use super::flee::{make_flee_decision, rate_flee};
use super::rating::{
    AmmoRatings, rate_ammo, rate_magic_item, rate_potion, rate_spell, rate_weapon,
    vanilla_rate_spell, vanilla_rate_weapon,
};

/// The chosen action and the rating it won with.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedAction {
    pub action: Action,
    pub rating: f32,
}

/// Best candidate so far and its anti-flee estimate.
struct Best {
    action: Action,
    rating: f32,
    anti_flee: f32,
}

impl Best {
    fn offer(&mut self, rating: f32, action: impl FnOnce() -> Action) -> bool {
        if rating > self.rating {
            self.rating = rating;
            self.action = action();
            true
        } else {
            false
        }
    }
}

/// Chooses the best action of `actor` against `enemy` and readies it.
///
/// # Errors
///
/// Returns an error if a record or setting needed for rating is missing.
pub fn prepare_next_action(
    actor: &mut Actor,
    enemy: &Actor,
    env: &mut Env<'_>,
) -> MechanicsResult<PlannedAction> {
    let planned = plan_next_action(actor, enemy, env)?;
    planned.action.prepare(actor, env)?;
    Ok(planned)
}

/// Chooses the best action of `actor` against `enemy` without readying it.
///
/// # Errors
///
/// Returns an error if a record or setting needed for rating is missing.
pub fn plan_next_action(actor: &Actor, enemy: &Actor, env: &Env<'_>) -> MechanicsResult<PlannedAction> {
    if actor.is_npc() && actor.is_werewolf() {
        return Ok(PlannedAction {
            action: Action::unarmed(),
            rating: 0.0,
        });
    }

    let mut best = Best {
        action: Action::unarmed(),
        rating: 0.0,
        anti_flee: 0.0,
    };

    tracing::debug!(actor = ?actor.id, enemy = ?enemy.id, "planning combat action");

    if actor.has_inventory {
        let items = env.inventory.items(actor.handle);
        rate_items(&items, actor, enemy, &mut best, env)?;
    }

    for id in actor.stats.spells.iter() {
        let spell = env.spell(id)?;
        let rating = rate_spell(spell, actor, Some(enemy), true, env)?;
        tracing::debug!(spell = %id, rating, "rated spell");
        if best.offer(rating, || Action::Spell { spell: id.clone() }) {
            best.anti_flee = vanilla_rate_spell(spell, actor, enemy, env)?;
        }
    }

    if make_flee_decision(actor, enemy, best.anti_flee, env)? {
        let rating = rate_flee(actor, enemy, env)?;
        tracing::debug!(actor = ?actor.id, rating, anti_flee = best.anti_flee, "fleeing");
        return Ok(PlannedAction {
            action: Action::Flee,
            rating,
        });
    }

    tracing::debug!(
        actor = ?actor.id,
        action = best.action.kind(),
        rating = best.rating,
        anti_flee = best.anti_flee,
        "chose combat action"
    );

    Ok(PlannedAction {
        action: best.action,
        rating: best.rating,
    })
}

fn rate_items(
    items: &[InventoryItem],
    actor: &Actor,
    enemy: &Actor,
    best: &mut Best,
    env: &Env<'_>,
) -> MechanicsResult<()> {
    // Drinking or using an item never loses to fleeing.
    for item in items {
        let rating = rate_potion(item, actor, env)?;
        if best.offer(rating, || Action::Potion(ItemRef::from(item))) {
            best.anti_flee = f32::MAX;
        }
    }
    for item in items {
        let rating = rate_magic_item(item, actor, Some(enemy), env)?;
        if best.offer(rating, || Action::EnchantedItem(ItemRef::from(item))) {
            best.anti_flee = f32::MAX;
        }
    }

    let arrow = rate_ammo(actor, Some(enemy), WeaponKind::Arrow, env)?;
    let bolt = rate_ammo(actor, Some(enemy), WeaponKind::Bolt, env)?;
    let ammo = AmmoRatings {
        arrow: arrow.rating,
        bolt: bolt.rating,
    };

    for item in items {
        let record = env.item(&item.record)?;
        let Some(weapon) = record.weapon() else {
            continue;
        };
        if !record.equipment_slots().contains(&EquipmentSlot::CarriedRight) {
            continue;
        }

        let rating = rate_weapon(item, actor, Some(enemy), None, ammo, env)?;
        tracing::debug!(weapon = %item.record, rating, "rated weapon");
        if rating > best.rating {
            let ammo_item = match weapon.kind {
                WeaponKind::MarksmanBow => arrow.item,
                WeaponKind::MarksmanCrossbow => bolt.item,
                _ => None,
            }
            .and_then(|handle| find(items, handle));

            best.rating = rating;
            best.anti_flee =
                vanilla_rate_weapon(Some(item), ammo_item.is_some(), actor, enemy, env)?;
            best.action = Action::Weapon {
                weapon: Some(ItemRef::from(item)),
                ammo: ammo_item.map(ItemRef::from),
            };
        }
    }
    Ok(())
}

fn find(items: &[InventoryItem], handle: ItemHandle) -> Option<&InventoryItem> {
    items.iter().find(|item| item.handle == handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::memory::MemoryServices;
    use crate::env::{
        ContentTables, EffectEntry, InventoryService, ItemKind, ItemRecord, MagicEffectDef, MagicSchool,
        RaceRecord, SpellKind, SpellRecord, WeaponData,
    };
    use crate::magic::{EffectId, MagicEffectFlags, RangeType};
    use crate::state::{ActorId, CreatureStats, DrawState, NpcStats, ObjectHandle, Position, RefId};
    use crate::stats::{AiSetting, Attribute, DynamicKind, DynamicStat, Skill};

    fn content() -> ContentTables {
        let mut content = ContentTables::new();
        content
            .add_magic_effect(MagicEffectDef::new(
                EffectId::FireDamage,
                MagicSchool::Destruction,
                5.0,
                MagicEffectFlags::HARMFUL,
            ))
            .add_spell(SpellRecord::new(
                "fireball",
                SpellKind::Spell,
                10,
                vec![EffectEntry::new(EffectId::FireDamage, RangeType::Target, 20, 1)],
            ))
            .add_race(RaceRecord {
                id: "nord".into(),
                beast: false,
                powers: Vec::new(),
            })
            .add_item(ItemRecord::new(
                "longsword",
                ItemKind::Weapon(WeaponData::new(
                    WeaponKind::LongBladeOneHand,
                    [2, 12],
                    [2, 14],
                    [1, 10],
                )),
                20.0,
            ))
            .add_item(ItemRecord::new(
                "bow",
                ItemKind::Weapon(WeaponData::new(WeaponKind::MarksmanBow, [1, 20], [0, 0], [0, 0])),
                8.0,
            ))
            .add_item(ItemRecord::new(
                "arrow",
                ItemKind::Weapon(WeaponData::new(WeaponKind::Arrow, [1, 5], [0, 0], [0, 0])),
                0.1,
            ));
        content
    }

    fn fighter(id: i32) -> Actor {
        let mut npc = NpcStats::new("nord", "warrior");
        npc.set_skill_base(Skill::LongBlade, 60.0);
        npc.set_skill_base(Skill::Marksman, 10.0);
        npc.set_skill_base(Skill::Destruction, 60.0);
        let mut stats = CreatureStats::new(10);
        for attribute in [Attribute::Agility, Attribute::Luck, Attribute::Willpower, Attribute::Speed] {
            stats.set_attribute_base(attribute, 50.0);
        }
        stats.set_dynamic(DynamicKind::Health, DynamicStat::new(100.0));
        stats.set_dynamic(DynamicKind::Magicka, DynamicStat::new(100.0));
        stats.set_dynamic(DynamicKind::Fatigue, DynamicStat::new(100.0));
        Actor::npc(ActorId(id), ObjectHandle(id as u64), "fighter", stats, npc)
    }

    fn services(actor: &Actor, enemy: &Actor) -> MemoryServices {
        let mut services = MemoryServices::new(content()).unwrap();
        services.world.place_actor(actor, Position::ORIGIN);
        services
            .world
            .place_actor(enemy, Position::new(100.0, 0.0, 0.0));
        services
    }

    #[test]
    fn empty_handed_actor_fights_unarmed() {
        let (mut actor, enemy) = (fighter(1), fighter(2));
        let mut services = services(&actor, &enemy);
        let planned = prepare_next_action(&mut actor, &enemy, &mut services.env()).unwrap();

        assert_eq!(planned.action, Action::unarmed());
        assert_eq!(planned.rating, 0.0);
        assert_eq!(actor.stats.draw_state, DrawState::Weapon);
    }

    #[test]
    fn carried_sword_is_equipped() {
        let (mut actor, enemy) = (fighter(1), fighter(2));
        let mut services = services(&actor, &enemy);
        services.inventory.add(actor.handle, &"longsword".into());

        let planned = prepare_next_action(&mut actor, &enemy, &mut services.env()).unwrap();

        assert!(matches!(&planned.action, Action::Weapon { weapon: Some(weapon), ammo: None }
            if weapon.record == RefId::from("longsword")));
        assert!(planned.rating > 0.0);
        assert_eq!(
            services.inventory.equipped_record(actor.handle, EquipmentSlot::CarriedRight),
            Some(RefId::from("longsword"))
        );
    }

    #[test]
    fn bow_comes_with_its_arrows() {
        let (mut actor, enemy) = (fighter(1), fighter(2));
        if let Some(npc) = actor.npc.as_mut() {
            npc.set_skill_base(Skill::LongBlade, 5.0);
            npc.set_skill_base(Skill::Marksman, 90.0);
        }
        let mut services = services(&actor, &enemy);
        services.inventory.add(actor.handle, &"longsword".into());
        services.inventory.add(actor.handle, &"bow".into());
        services.inventory.add(actor.handle, &"arrow".into());

        let planned = plan_next_action(&actor, &enemy, &services.env()).unwrap();

        match planned.action {
            Action::Weapon {
                weapon: Some(weapon),
                ammo: Some(ammo),
            } => {
                assert_eq!(weapon.record, RefId::from("bow"));
                assert_eq!(ammo.record, RefId::from("arrow"));
            }
            other => panic!("expected bow and arrows, got {other:?}"),
        }
    }

    #[test]
    fn known_spell_beats_bare_hands() {
        let (mut actor, enemy) = (fighter(1), fighter(2));
        actor.stats.spells.add("fireball");
        let mut services = services(&actor, &enemy);

        let planned = prepare_next_action(&mut actor, &enemy, &mut services.env()).unwrap();

        assert_eq!(
            planned.action,
            Action::Spell {
                spell: "fireball".into()
            }
        );
        assert_eq!(actor.stats.spells.selected(), Some(&RefId::from("fireball")));
        assert_eq!(actor.stats.draw_state, DrawState::Spell);
    }

    #[test]
    fn werewolves_never_weigh_options() {
        let (mut actor, enemy) = (fighter(1), fighter(2));
        actor.stats.werewolf = true;
        actor.stats.spells.add("fireball");
        let mut services = services(&actor, &enemy);

        let planned = prepare_next_action(&mut actor, &enemy, &mut services.env()).unwrap();
        assert_eq!(planned.action, Action::unarmed());
    }

    #[test]
    fn cowardly_actor_flees_from_bare_hands() {
        let (mut actor, enemy) = (fighter(1), fighter(2));
        actor.stats.set_ai_setting_base(AiSetting::Flee, 100);
        let mut services = services(&actor, &enemy);

        let planned = prepare_next_action(&mut actor, &enemy, &mut services.env()).unwrap();
        assert_eq!(planned.action, Action::Flee);
        assert_eq!(planned.rating, 100.0);
    }

    #[test]
    fn planning_is_repeatable() {
        let (actor, enemy) = (fighter(1), fighter(2));
        let mut services = services(&actor, &enemy);
        services.inventory.add(actor.handle, &"longsword".into());
        services.inventory.add(actor.handle, &"bow".into());
        services.inventory.add(actor.handle, &"arrow".into());
        let mut actor = actor;
        actor.stats.spells.add("fireball");

        let env = services.env();
        let first = plan_next_action(&actor, &enemy, &env).unwrap();
        let second = plan_next_action(&actor, &enemy, &env).unwrap();
        assert_eq!(first, second);
    }
}
