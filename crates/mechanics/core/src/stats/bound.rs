//! Conjured equipment that follows the presence of bound-item effects.

use arrayvec::ArrayVec;

use crate::config::MechanicsConfig;
use crate::env::Env;
use crate::error::MechanicsResult;
use crate::magic::EffectId;
use crate::state::{Actor, RefId};

/// Equips items whose bound effect became active and removes items whose
/// effect ended. Actors without an inventory are skipped.
///
/// # Errors
///
/// Returns an error if a bound item id has no item record.
pub fn sync_bound_items(actor: &mut Actor, env: &mut Env<'_>) -> MechanicsResult<()> {
    if !actor.has_inventory {
        return Ok(());
    }

    let active: ArrayVec<EffectId, { MechanicsConfig::MAX_BOUND_ITEMS }> = env
        .tables
        .bound_items()
        .map(|(effect, _)| effect)
        .filter(|effect| actor.stats.magic_effects.is_active(*effect))
        .take(MechanicsConfig::MAX_BOUND_ITEMS)
        .collect();

    let tables = env.tables;
    for (effect, ids) in tables.bound_items() {
        let is_active = active.contains(&effect);
        let was_active = actor.stats.bound_items.contains(&effect);

        if is_active && !was_active {
            add_bound_item(actor, &ids.primary, env)?;
            if let Some(secondary) = &ids.secondary {
                add_bound_item(actor, secondary, env)?;
            }
            actor.stats.bound_items.insert(effect);
            tracing::debug!(actor = %actor.id, effect = ?effect, "bound item conjured");
        } else if !is_active && was_active {
            remove_bound_item(actor, &ids.primary, env)?;
            if let Some(secondary) = &ids.secondary {
                remove_bound_item(actor, secondary, env)?;
            }
            actor.stats.bound_items.remove(&effect);
            tracing::debug!(actor = %actor.id, effect = ?effect, "bound item dismissed");
        }
    }
    Ok(())
}

fn add_bound_item(actor: &mut Actor, item_id: &RefId, env: &mut Env<'_>) -> MechanicsResult<()> {
    let record = env.item(item_id)?;
    let owner = actor.handle;

    let displaced = record
        .equipment_slots()
        .first()
        .and_then(|slot| env.inventory.slot(owner, *slot));

    let item = env.inventory.add(owner, item_id);
    env.inventory.equip(owner, item);

    if actor.is_player {
        if let Some(previous) = displaced {
            actor
                .stats
                .previous_items
                .insert(item_id.clone(), previous.record);
        }
    }
    Ok(())
}

fn remove_bound_item(actor: &mut Actor, item_id: &RefId, env: &mut Env<'_>) -> MechanicsResult<()> {
    let record = env.item(item_id)?;
    let owner = actor.handle;

    let Some(item) = env.inventory.find_by_record(owner, item_id) else {
        actor.stats.previous_items.remove(item_id);
        return Ok(());
    };
    let was_equipped = env.inventory.is_equipped(owner, item.handle);
    if was_equipped {
        if let Some(slot) = record.equipment_slots().first() {
            env.inventory.unequip_slot(owner, *slot);
        }
    }
    env.inventory.remove(owner, item_id, 1);

    if actor.is_player {
        let previous = actor.stats.previous_items.remove(item_id);
        let restored = previous
            .filter(|_| was_equipped)
            .and_then(|previous| env.inventory.find_by_record(owner, &previous));
        if let Some(restored) = restored {
            env.inventory.equip(owner, restored.handle);
        }
    } else if !actor.stats.is_dead() && !actor.is_werewolf() {
        env.inventory.auto_equip(owner);
    }
    Ok(())
}
