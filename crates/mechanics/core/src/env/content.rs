//! Static content lookup.

use std::collections::BTreeMap;

use crate::env::records::{
    EnchantmentRecord, ItemRecord, MagicEffectDef, RaceRecord, SpellRecord,
};
use crate::magic::EffectId;
use crate::state::RefId;

/// Read-only access to static content records.
pub trait ContentOracle {
    fn magic_effect(&self, id: EffectId) -> Option<&MagicEffectDef>;
    fn spell(&self, id: &RefId) -> Option<&SpellRecord>;
    fn enchantment(&self, id: &RefId) -> Option<&EnchantmentRecord>;
    fn item(&self, id: &RefId) -> Option<&ItemRecord>;
    fn race(&self, id: &RefId) -> Option<&RaceRecord>;
}

// ============================================================================
// In-memory tables
// ============================================================================

/// Content records held in memory, as produced by the content loaders.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentTables {
    #[cfg_attr(feature = "serde", serde(default))]
    pub magic_effects: BTreeMap<EffectId, MagicEffectDef>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub spells: BTreeMap<RefId, SpellRecord>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub enchantments: BTreeMap<RefId, EnchantmentRecord>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub items: BTreeMap<RefId, ItemRecord>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub races: BTreeMap<RefId, RaceRecord>,
}

impl ContentTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_magic_effect(&mut self, def: MagicEffectDef) -> &mut Self {
        self.magic_effects.insert(def.id, def);
        self
    }

    pub fn add_spell(&mut self, spell: SpellRecord) -> &mut Self {
        self.spells.insert(spell.id.clone(), spell);
        self
    }

    pub fn add_enchantment(&mut self, enchantment: EnchantmentRecord) -> &mut Self {
        self.enchantments.insert(enchantment.id.clone(), enchantment);
        self
    }

    pub fn add_item(&mut self, item: ItemRecord) -> &mut Self {
        self.items.insert(item.id.clone(), item);
        self
    }

    pub fn add_race(&mut self, race: RaceRecord) -> &mut Self {
        self.races.insert(race.id.clone(), race);
        self
    }

    /// Merges records from `other`, replacing entries with the same id.
    pub fn extend(&mut self, other: ContentTables) {
        self.magic_effects.extend(other.magic_effects);
        self.spells.extend(other.spells);
        self.enchantments.extend(other.enchantments);
        self.items.extend(other.items);
        self.races.extend(other.races);
    }
}

impl ContentOracle for ContentTables {
    fn magic_effect(&self, id: EffectId) -> Option<&MagicEffectDef> {
        self.magic_effects.get(&id)
    }

    fn spell(&self, id: &RefId) -> Option<&SpellRecord> {
        self.spells.get(id)
    }

    fn enchantment(&self, id: &RefId) -> Option<&EnchantmentRecord> {
        self.enchantments.get(id)
    }

    fn item(&self, id: &RefId) -> Option<&ItemRecord> {
        self.items.get(id)
    }

    fn race(&self, id: &RefId) -> Option<&RaceRecord> {
        self.races.get(id)
    }
}
