//! Combat actions the planner can choose.

use strum::IntoStaticStr;

use crate::combat::{CombatRange, melee_reach, projectile_reach, suggest_combat_range};
use crate::env::records::range_types;
use crate::env::{EquipmentSlot, Env, InventoryItem, ItemKind, WeaponClass};
use crate::error::MechanicsResult;
use crate::state::{ActiveEffect, ActiveSpellParams, Actor, DrawState, ItemHandle, RefId, SourceKind};

/// Using an item takes a moment before the next decision.
const ITEM_COOLDOWN: f32 = 1.0;

/// An inventory stack an action refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemRef {
    pub handle: ItemHandle,
    pub record: RefId,
}

impl From<&InventoryItem> for ItemRef {
    fn from(item: &InventoryItem) -> Self {
        Self {
            handle: item.handle,
            record: item.record.clone(),
        }
    }
}

/// One combat action.
#[derive(Clone, Debug, PartialEq, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    Flee,
    Spell { spell: RefId },
    EnchantedItem(ItemRef),
    Potion(ItemRef),
    /// `weapon: None` fights with bare hands.
    Weapon {
        weapon: Option<ItemRef>,
        ammo: Option<ItemRef>,
    },
}

impl Action {
    /// Bare-handed combat.
    pub const fn unarmed() -> Self {
        Action::Weapon {
            weapon: None,
            ammo: None,
        }
    }

    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Seconds to wait after preparing before acting again.
    pub fn cooldown(&self) -> f32 {
        match self {
            Action::Potion(_) | Action::EnchantedItem(_) => ITEM_COOLDOWN,
            _ => 0.0,
        }
    }

    /// The weapon this action attacks with, if any.
    pub fn weapon(&self) -> Option<&ItemRef> {
        match self {
            Action::Weapon { weapon, .. } => weapon.as_ref(),
            _ => None,
        }
    }

    /// Readies `actor` for the action: selects the spell or item, draws the
    /// weapon, or drinks the potion.
    ///
    /// # Errors
    ///
    /// Returns an error if the potion record is missing.
    pub fn prepare(&self, actor: &mut Actor, env: &mut Env<'_>) -> MechanicsResult<()> {
        match self {
            Action::Flee => {}
            Action::Spell { spell } => {
                actor.stats.spells.set_selected(Some(spell.clone()));
                actor.stats.draw_state = DrawState::Spell;
                if actor.has_inventory {
                    env.inventory.set_selected_enchant_item(actor.handle, None);
                }
            }
            Action::EnchantedItem(item) => {
                actor.stats.spells.set_selected(None);
                env.inventory
                    .set_selected_enchant_item(actor.handle, Some(item.handle));
                actor.stats.draw_state = DrawState::Spell;
            }
            Action::Potion(item) => {
                if let ItemKind::Potion { effects } = &env.item(&item.record)?.kind {
                    let effects = effects
                        .iter()
                        .map(|entry| {
                            ActiveEffect::new(entry.key, entry.average_magnitude(), entry.duration as f32)
                        })
                        .collect();
                    actor.stats.active_spells.add(ActiveSpellParams::new(
                        item.record.clone(),
                        SourceKind::Potion,
                        actor.id,
                        effects,
                    ));
                }
                env.inventory.remove(actor.handle, &item.record, 1);
            }
            Action::Weapon { weapon, ammo } => {
                if actor.has_inventory {
                    match weapon {
                        Some(weapon) => {
                            env.inventory.equip(actor.handle, weapon.handle);
                        }
                        None => env
                            .inventory
                            .unequip_slot(actor.handle, EquipmentSlot::CarriedRight),
                    }
                    if let Some(ammo) = ammo {
                        env.inventory.equip(actor.handle, ammo.handle);
                    }
                }
                actor.stats.draw_state = DrawState::Weapon;
            }
        }
        Ok(())
    }

    /// Distances to attack from and to follow the target at.
    ///
    /// # Errors
    ///
    /// Returns an error if a referenced record or reach setting is missing.
    pub fn combat_range(&self, actor: &Actor, env: &Env<'_>) -> MechanicsResult<CombatRange> {
        let range = match self {
            Action::Flee => CombatRange {
                attack: 0.0,
                follow: 0.0,
            },
            Action::Spell { spell } => suggest_combat_range(range_types(&env.spell(spell)?.effects)),
            Action::EnchantedItem(item) => match &env.item(&item.record)?.enchantment {
                Some(enchantment) => {
                    suggest_combat_range(range_types(&env.enchantment(enchantment)?.effects))
                }
                None => suggest_combat_range(Default::default()),
            },
            // Drinking works at any distance; keep clear of the enemy.
            Action::Potion(_) => suggest_combat_range(Default::default()),
            Action::Weapon { weapon, ammo } => {
                let data = match weapon {
                    Some(weapon) => env.item(&weapon.record)?.weapon(),
                    None => None,
                };
                let attack = match data {
                    Some(data) if data.kind.class() != WeaponClass::Melee => {
                        let ammo = match ammo {
                            Some(ammo) => env.item(&ammo.record)?.weapon(),
                            None => None,
                        };
                        projectile_reach(data, ammo, env)?
                    }
                    data => melee_reach(actor, data, env)?,
                };
                CombatRange { attack, follow: 0.0 }
            }
        };
        Ok(range)
    }

    /// Attacks from a distance with a launched or thrown weapon.
    ///
    /// # Errors
    ///
    /// Returns an error if the weapon record is missing.
    pub fn is_ranged(&self, env: &Env<'_>) -> MechanicsResult<bool> {
        Ok(match self {
            Action::Weapon {
                weapon: Some(weapon),
                ..
            } => env
                .item(&weapon.record)?
                .weapon()
                .is_some_and(|data| data.kind.class() != WeaponClass::Melee),
            _ => false,
        })
    }
}
