//! Content record loader.

use std::collections::BTreeSet;
use std::path::Path;

use mechanics_core::ContentTables;
use mechanics_core::env::{EnchantmentRecord, ItemRecord, MagicEffectDef, RaceRecord, SpellRecord};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Record catalog structure for RON files. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentCatalog {
    #[serde(default)]
    pub magic_effects: Vec<MagicEffectDef>,
    #[serde(default)]
    pub spells: Vec<SpellRecord>,
    #[serde(default)]
    pub enchantments: Vec<EnchantmentRecord>,
    #[serde(default)]
    pub items: Vec<ItemRecord>,
    #[serde(default)]
    pub races: Vec<RaceRecord>,
}

impl ContentCatalog {
    /// Fails on an id defined twice within the same section.
    fn check_duplicates(&self) -> LoadResult<()> {
        fn unique<'a>(section: &str, ids: impl Iterator<Item = &'a str>) -> LoadResult<()> {
            let mut seen = BTreeSet::new();
            for id in ids {
                if !seen.insert(id) {
                    anyhow::bail!("Duplicate {} id '{}'", section, id);
                }
            }
            Ok(())
        }

        let mut effects = BTreeSet::new();
        for def in &self.magic_effects {
            if !effects.insert(def.id) {
                anyhow::bail!("Duplicate magic effect {:?}", def.id);
            }
        }
        unique("spell", self.spells.iter().map(|r| r.id.as_str()))?;
        unique("enchantment", self.enchantments.iter().map(|r| r.id.as_str()))?;
        unique("item", self.items.iter().map(|r| r.id.as_str()))?;
        unique("race", self.races.iter().map(|r| r.id.as_str()))?;
        Ok(())
    }

    pub fn into_tables(self) -> ContentTables {
        let mut tables = ContentTables::new();
        for def in self.magic_effects {
            tables.add_magic_effect(def);
        }
        for spell in self.spells {
            tables.add_spell(spell);
        }
        for enchantment in self.enchantments {
            tables.add_enchantment(enchantment);
        }
        for item in self.items {
            tables.add_item(item);
        }
        for race in self.races {
            tables.add_race(race);
        }
        tables
    }
}

/// Loader for [`ContentTables`] from RON files.
pub struct ContentLoader;

impl ContentLoader {
    /// Load one catalog file.
    pub fn load(path: &Path) -> LoadResult<ContentTables> {
        let content = read_file(path)?;
        let catalog = Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to load content at {}: {}", path.display(), e))?;
        Ok(catalog.into_tables())
    }

    /// Load several catalogs in order; later files replace records with the
    /// same id.
    pub fn load_all<P: AsRef<Path>>(paths: &[P]) -> LoadResult<ContentTables> {
        let mut tables = ContentTables::new();
        for path in paths {
            let path = path.as_ref();
            tables.extend(Self::load(path)?);
            tracing::debug!(path = %path.display(), "content catalog loaded");
        }
        Ok(tables)
    }

    pub fn parse(content: &str) -> LoadResult<ContentCatalog> {
        let catalog: ContentCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse content RON: {}", e))?;
        catalog.check_duplicates()?;
        Ok(catalog)
    }
}
