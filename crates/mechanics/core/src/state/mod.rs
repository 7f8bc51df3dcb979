//! Per-actor simulation state.
//!
//! The registry owns every [`Actor`]; world objects, inventories and records
//! live behind the service traits in [`crate::env`] and are only referenced
//! here by handle or record id.
pub mod types;

pub use types::{
    ActiveEffect, ActiveSpellParams, ActiveSpells, Actor, ActorId, ActorKind, AiPackage,
    AiPackageKind, AiSequence, CellId, CharacterController, CorprusStats, CreatureData,
    CreatureFlags, CreatureKind, CreatureSkills, CreatureStats, DrawState, GameTime, ItemHandle, KillResult,
    NpcStats, ObjectHandle, Position, RefId, SourceKind, Spells, SummonKey,
};
