//! Game settings loader.
//!
//! A settings file is a flat TOML table; integers become `Int`, floats become
//! `Float` and strings become `String` settings:
//!
//! ```toml
//! fCombatDistance = 128.0
//! iCrimeThreshold = 1000
//! sMagicBoundDaggerID = "bound_dagger"
//! ```

use std::path::Path;

use mechanics_core::GameSettings;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`GameSettings`] from TOML files.
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load only the settings present in the file.
    pub fn load(path: &Path) -> LoadResult<GameSettings> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse settings TOML at {}: {}", path.display(), e))
    }

    /// Load the file on top of the vanilla defaults.
    pub fn load_with_defaults(path: &Path) -> LoadResult<GameSettings> {
        let overrides = Self::load(path)?;
        tracing::debug!(path = %path.display(), count = overrides.len(), "game settings overridden");
        let mut settings = GameSettings::with_defaults();
        settings.merge(overrides);
        Ok(settings)
    }

    pub fn parse(content: &str) -> LoadResult<GameSettings> {
        let settings: GameSettings = toml::from_str(content)?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_keep_their_toml_types() {
        let settings = SettingsLoader::parse(
            r#"
            fCombatDistance = 150.0
            iCrimeThreshold = 500
            sMagicScampID = "scamp_summon"
            "#,
        )
        .unwrap();

        assert_eq!(settings.float("fCombatDistance").unwrap(), 150.0);
        assert_eq!(settings.int("iCrimeThreshold").unwrap(), 500);
        assert_eq!(settings.string("sMagicScampID").unwrap(), "scamp_summon");
        assert!(settings.int("fCombatDistance").is_err());
    }

    #[test]
    fn nested_tables_are_rejected() {
        assert!(SettingsLoader::parse("[combat]\nfCombatDistance = 1.0").is_err());
    }
}
