//! Common error infrastructure for mechanics-core.
//!
//! Rule outcomes degrade by sentinel (zero rating, no action, `false`); only
//! content-data gaps and record decoding failures surface as errors. Each
//! domain error lives next to the code that raises it and implements
//! [`GameError`]; [`MechanicsError`] aggregates them for the registry entry
//! points.

use crate::env::{ContentError, SettingsError, SpawnError};
use crate::registry::RecordError;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: transient, the same call may succeed later
/// - **Validation**: malformed input that should be rejected
/// - **Internal**: state inconsistency that indicates a bug
/// - **Fatal**: content data is missing, the simulation cannot continue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: no room to place a summoned creature.
    Recoverable,

    /// Examples: death-count record with an unknown version.
    Validation,

    /// Examples: registry and world disagree about an actor's handle.
    Internal,

    /// Examples: a game setting the rules read is absent.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an internal bug or broken content.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all mechanics-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Default implementation uses the error type name.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// Any error the actor layer can return to the engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MechanicsError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Spawn(#[from] SpawnError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl GameError for MechanicsError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Settings(err) => err.severity(),
            Self::Content(err) => err.severity(),
            Self::Spawn(err) => err.severity(),
            Self::Record(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Settings(err) => err.error_code(),
            Self::Content(err) => err.error_code(),
            Self::Spawn(err) => err.error_code(),
            Self::Record(err) => err.error_code(),
        }
    }
}

/// Result alias for fallible mechanics entry points.
pub type MechanicsResult<T> = Result<T, MechanicsError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RefId;

    #[test]
    fn aggregate_forwards_classification() {
        let err = MechanicsError::from(SettingsError::Missing("fCombatDistance".into()));
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
        assert_eq!(err.error_code(), "SETTINGS_MISSING");
        assert!(err.severity().is_internal());

        let err = MechanicsError::from(SpawnError::NoRoom(RefId::new("scamp")));
        assert!(err.severity().is_recoverable());
        assert_eq!(err.to_string(), "no free space to place 'scamp'");
    }
}
