//! Errors raised by the injected environment.
//!
//! Missing settings and records are content-data gaps the engine cannot
//! recover from; spawn failures are transient and handled by the caller.

use crate::error::{ErrorSeverity, GameError};
use crate::magic::EffectId;
use crate::state::RefId;

/// A game setting is absent or has the wrong type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("game setting '{0}' not found")]
    Missing(String),

    #[error("game setting '{name}' is not a {expected}")]
    WrongType { name: String, expected: &'static str },
}

impl GameError for SettingsError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            SettingsError::Missing(_) => "SETTINGS_MISSING",
            SettingsError::WrongType { .. } => "SETTINGS_WRONG_TYPE",
        }
    }
}

/// A referenced content record does not exist.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("spell '{0}' not found")]
    SpellNotFound(RefId),

    #[error("enchantment '{0}' not found")]
    EnchantmentNotFound(RefId),

    #[error("item '{0}' not found")]
    ItemNotFound(RefId),

    #[error("race '{0}' not found")]
    RaceNotFound(RefId),

    #[error("magic effect {0:?} not defined")]
    EffectNotFound(EffectId),
}

impl GameError for ContentError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        use ContentError::*;
        match self {
            SpellNotFound(_) => "CONTENT_SPELL_NOT_FOUND",
            EnchantmentNotFound(_) => "CONTENT_ENCHANTMENT_NOT_FOUND",
            ItemNotFound(_) => "CONTENT_ITEM_NOT_FOUND",
            RaceNotFound(_) => "CONTENT_RACE_NOT_FOUND",
            EffectNotFound(_) => "CONTENT_EFFECT_NOT_FOUND",
        }
    }
}

/// Placing an object in the world failed.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SpawnError {
    #[error("no record '{0}' to spawn")]
    UnknownRecord(RefId),

    #[error("no free space to place '{0}'")]
    NoRoom(RefId),
}

impl GameError for SpawnError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Recoverable
    }

    fn error_code(&self) -> &'static str {
        match self {
            SpawnError::UnknownRecord(_) => "SPAWN_UNKNOWN_RECORD",
            SpawnError::NoRoom(_) => "SPAWN_NO_ROOM",
        }
    }
}
