//! Injected collaborators and immutable content.
//!
//! The actor layer never reaches for a global. Every rule receives an [`Env`]
//! that bundles the four service traits (world, inventory, presentation,
//! mechanics manager) with the read-only content oracle, game settings and
//! the effect lookup tables built from them.
mod content;
mod error;
pub mod memory;
pub mod records;
mod services;
mod settings;
mod tables;

pub use content::{ContentOracle, ContentTables};
pub use error::{ContentError, SettingsError, SpawnError};
pub use records::{
    ArmorData, EffectEntry, EnchantmentKind, EnchantmentRecord, EquipmentSlot, ItemKind,
    ItemRecord, MagicEffectDef, MagicSchool, RaceRecord, SpellKind, SpellRecord, WeaponClass,
    WeaponData, WeaponFlags, WeaponKind,
};
pub use services::{
    EquippedEffect, InventoryItem, InventoryService, MechanicsService, PresentationService,
    WorldService,
};
pub use settings::{GameSettingValue, GameSettings};
pub use tables::{BoundItemIds, MechanicsTables};

use crate::magic::EffectId;
use crate::state::RefId;

/// Everything a mechanics rule may touch outside the actor it works on.
pub struct Env<'a> {
    pub world: &'a mut dyn WorldService,
    pub inventory: &'a mut dyn InventoryService,
    pub presentation: &'a mut dyn PresentationService,
    pub mechanics: &'a mut dyn MechanicsService,
    pub content: &'a dyn ContentOracle,
    pub settings: &'a GameSettings,
    pub tables: &'a MechanicsTables,
}

impl<'a> Env<'a> {
    pub fn new(
        world: &'a mut dyn WorldService,
        inventory: &'a mut dyn InventoryService,
        presentation: &'a mut dyn PresentationService,
        mechanics: &'a mut dyn MechanicsService,
        content: &'a dyn ContentOracle,
        settings: &'a GameSettings,
        tables: &'a MechanicsTables,
    ) -> Self {
        Self {
            world,
            inventory,
            presentation,
            mechanics,
            content,
            settings,
            tables,
        }
    }

    /// Float game setting.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the setting is missing or not numeric.
    pub fn float(&self, name: &str) -> Result<f32, SettingsError> {
        self.settings.float(name)
    }

    /// Integer game setting.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the setting is missing or not an integer.
    pub fn int(&self, name: &str) -> Result<i32, SettingsError> {
        self.settings.int(name)
    }

    /// Definition of a magic effect.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::EffectNotFound`] if the effect has no definition.
    pub fn magic_effect(&self, id: EffectId) -> Result<&'a MagicEffectDef, ContentError> {
        self.content
            .magic_effect(id)
            .ok_or(ContentError::EffectNotFound(id))
    }

    /// # Errors
    ///
    /// Returns [`ContentError::SpellNotFound`] if no spell has this id.
    pub fn spell(&self, id: &RefId) -> Result<&'a SpellRecord, ContentError> {
        self.content
            .spell(id)
            .ok_or_else(|| ContentError::SpellNotFound(id.clone()))
    }

    /// # Errors
    ///
    /// Returns [`ContentError::EnchantmentNotFound`] if no enchantment has this id.
    pub fn enchantment(&self, id: &RefId) -> Result<&'a EnchantmentRecord, ContentError> {
        self.content
            .enchantment(id)
            .ok_or_else(|| ContentError::EnchantmentNotFound(id.clone()))
    }

    /// # Errors
    ///
    /// Returns [`ContentError::ItemNotFound`] if no item has this id.
    pub fn item(&self, id: &RefId) -> Result<&'a ItemRecord, ContentError> {
        self.content
            .item(id)
            .ok_or_else(|| ContentError::ItemNotFound(id.clone()))
    }

    /// # Errors
    ///
    /// Returns [`ContentError::RaceNotFound`] if no race has this id.
    pub fn race(&self, id: &RefId) -> Result<&'a RaceRecord, ContentError> {
        self.content
            .race(id)
            .ok_or_else(|| ContentError::RaceNotFound(id.clone()))
    }
}
