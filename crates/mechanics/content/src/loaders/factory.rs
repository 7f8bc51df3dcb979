//! Content factory for building simulation inputs from a data directory.

use std::path::{Path, PathBuf};

use mechanics_core::{ContentTables, GameSettings, MechanicsConfig, MechanicsTables};

use crate::loaders::{ConfigLoader, ContentLoader, LoadResult, SettingsLoader};

/// Everything the simulation needs that comes from data files.
#[derive(Debug, Clone)]
pub struct LoadedContent {
    pub settings: GameSettings,
    pub config: MechanicsConfig,
    pub content: ContentTables,
    pub tables: MechanicsTables,
}

/// Content factory that loads simulation data from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── settings.toml   (optional, overlays the vanilla settings)
/// ├── config.toml     (optional)
/// └── content/
///     ├── effects.ron
///     ├── spells.ron
///     └── items.ron
/// ```
///
/// Catalogs under `content/` load in file-name order.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load game settings, falling back to the defaults without `settings.toml`.
    pub fn load_settings(&self) -> LoadResult<GameSettings> {
        let path = self.data_dir.join("settings.toml");
        if path.exists() {
            SettingsLoader::load_with_defaults(&path)
        } else {
            Ok(GameSettings::with_defaults())
        }
    }

    /// Load the simulation tuning, falling back to the defaults without `config.toml`.
    pub fn load_config(&self) -> LoadResult<MechanicsConfig> {
        let path = self.data_dir.join("config.toml");
        if path.exists() {
            ConfigLoader::load(&path)
        } else {
            Ok(MechanicsConfig::default())
        }
    }

    /// Load every `.ron` catalog under `content/`.
    pub fn load_content(&self) -> LoadResult<ContentTables> {
        let dir = self.data_dir.join("content");
        let entries = std::fs::read_dir(&dir)
            .map_err(|e| anyhow::anyhow!("Failed to read content directory {}: {}", dir.display(), e))?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "ron") {
                paths.push(path);
            }
        }
        paths.sort();
        ContentLoader::load_all(&paths)
    }

    /// Load all inputs and build the lookup tables from the settings.
    pub fn load_all(&self) -> LoadResult<LoadedContent> {
        let settings = self.load_settings()?;
        let tables = MechanicsTables::from_settings(&settings)
            .map_err(|e| anyhow::anyhow!("Failed to build mechanics tables: {}", e))?;
        let loaded = LoadedContent {
            config: self.load_config()?,
            content: self.load_content()?,
            settings,
            tables,
        };
        tracing::info!(
            data_dir = %self.data_dir.display(),
            spells = loaded.content.spells.len(),
            items = loaded.content.items.len(),
            "content loaded"
        );
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
    }
}
