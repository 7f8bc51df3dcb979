//! Persisted death counts.
//!
//! The record is an opaque keyed block in a save: a version and one entry per
//! actor record id that has died at least once. Ids that no longer resolve
//! against the loaded content are dropped on read.

use std::collections::BTreeMap;

use crate::error::{ErrorSeverity, GameError};
use crate::state::RefId;

/// Errors raised while encoding or decoding a [`DeathCountRecord`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("failed to encode death counts: {0}")]
    Encode(String),

    #[error("failed to decode death counts: {0}")]
    Decode(String),

    #[error("unsupported death count record version {0}")]
    UnsupportedVersion(u32),
}

impl GameError for RecordError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Encode(_) => "RECORD_ENCODE",
            Self::Decode(_) => "RECORD_DECODE",
            Self::UnsupportedVersion(_) => "RECORD_UNSUPPORTED_VERSION",
        }
    }
}

/// Cumulative deaths per actor record id.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeathCountRecord {
    pub version: u32,
    pub entries: Vec<(String, u32)>,
}

impl DeathCountRecord {
    pub const VERSION: u32 = 1;

    pub fn from_counts(counts: &BTreeMap<RefId, u32>) -> Self {
        Self {
            version: Self::VERSION,
            entries: counts
                .iter()
                .filter(|(_, count)| **count > 0)
                .map(|(id, count)| (id.as_str().to_string(), *count))
                .collect(),
        }
    }

    /// Counts for the ids `resolves` accepts; the rest are dropped.
    pub fn into_counts(self, resolves: impl Fn(&RefId) -> bool) -> BTreeMap<RefId, u32> {
        let mut counts = BTreeMap::new();
        for (id, count) in self.entries {
            let id = RefId::new(id);
            if resolves(&id) {
                counts.insert(id, count);
            } else {
                tracing::debug!(record = %id, "dropping death count for unknown record");
            }
        }
        counts
    }

    /// # Errors
    ///
    /// Returns [`RecordError::Encode`] if serialization fails.
    #[cfg(feature = "serde")]
    pub fn encode(&self) -> Result<Vec<u8>, RecordError> {
        bincode::serialize(self).map_err(|e| RecordError::Encode(e.to_string()))
    }

    /// # Errors
    ///
    /// Returns [`RecordError::Decode`] on malformed bytes and
    /// [`RecordError::UnsupportedVersion`] on a record from a newer format.
    #[cfg(feature = "serde")]
    pub fn decode(bytes: &[u8]) -> Result<Self, RecordError> {
        let record: Self =
            bincode::deserialize(bytes).map_err(|e| RecordError::Decode(e.to_string()))?;
        if record.version != Self::VERSION {
            return Err(RecordError::UnsupportedVersion(record.version));
        }
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts() -> BTreeMap<RefId, u32> {
        BTreeMap::from([
            (RefId::new("mudcrab"), 3),
            (RefId::new("cliff_racer"), 12),
            (RefId::new("never_died"), 0),
        ])
    }

    #[test]
    fn zero_counts_are_not_written() {
        let record = DeathCountRecord::from_counts(&counts());
        assert_eq!(record.version, DeathCountRecord::VERSION);
        assert_eq!(record.entries.len(), 2);
    }

    #[test]
    fn unknown_ids_are_dropped_on_read() {
        let record = DeathCountRecord::from_counts(&counts());
        let restored = record.into_counts(|id| id.as_str() != "cliff_racer");
        assert_eq!(restored, BTreeMap::from([(RefId::new("mudcrab"), 3)]));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn encoded_record_reads_back() {
        let record = DeathCountRecord::from_counts(&counts());
        let bytes = record.encode().unwrap();
        assert_eq!(DeathCountRecord::decode(&bytes).unwrap(), record);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn newer_versions_are_rejected() {
        let record = DeathCountRecord {
            version: 7,
            entries: Vec::new(),
        };
        let bytes = record.encode().unwrap();
        assert_eq!(
            DeathCountRecord::decode(&bytes),
            Err(RecordError::UnsupportedVersion(7))
        );
    }
}
