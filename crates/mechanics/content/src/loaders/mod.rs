//! Content loaders for reading simulation data from files.
//!
//! Every loader reads one file into a core type; [`ContentFactory`] wires them
//! to a data directory.

pub mod config;
pub mod content;
pub mod factory;
pub mod settings;

pub use config::ConfigLoader;
pub use content::{ContentCatalog, ContentLoader};
pub use factory::{ContentFactory, LoadedContent};
pub use settings::SettingsLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
