//! Simulation tuning loader.

use std::path::Path;

use mechanics_core::MechanicsConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for [`MechanicsConfig`] from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Keys missing from the file keep their defaults.
    pub fn load(path: &Path) -> LoadResult<MechanicsConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<MechanicsConfig> {
        let config: MechanicsConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.ai_processing_distance <= 0.0 {
            anyhow::bail!(
                "ai_processing_distance must be positive, got {}",
                config.ai_processing_distance
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ConfigLoader::parse(
            r#"
            ai_target_interval = 0.5
            follower_attack_on_sight = true
            "#,
        )
        .unwrap();

        assert_eq!(config.ai_target_interval, 0.5);
        assert!(config.follower_attack_on_sight);
        assert_eq!(
            config.ai_processing_distance,
            MechanicsConfig::DEFAULT_AI_PROCESSING_DISTANCE
        );
    }

    #[test]
    fn rejects_non_positive_processing_distance() {
        assert!(ConfigLoader::parse("ai_processing_distance = 0.0").is_err());
    }
}
