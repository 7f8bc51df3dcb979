//! Data-driven inputs for the actor simulation.
//!
//! This crate turns data files into the immutable values `mechanics-core`
//! consumes:
//! - Game settings (TOML, overlaid on the vanilla defaults)
//! - Content records: magic effects, spells, enchantments, items, races (RON)
//! - Runtime tuning of the simulation (TOML)
//!
//! Content never appears in actor state; rules read it through
//! [`mechanics_core::Env`].

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{
    ConfigLoader, ContentCatalog, ContentFactory, ContentLoader, LoadResult, LoadedContent,
    SettingsLoader,
};
