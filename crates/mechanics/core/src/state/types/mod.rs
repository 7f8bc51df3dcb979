pub mod active_spells;
pub mod actor;
pub mod ai;
pub mod common;
pub mod creature;
pub mod npc;
pub mod spells;

pub use active_spells::{ActiveEffect, ActiveSpellParams, ActiveSpells, SourceKind};
pub use actor::{
    Actor, ActorKind, CharacterController, CreatureData, CreatureFlags, CreatureKind, CreatureSkills,
    KillResult,
};
pub use ai::{AiPackage, AiPackageKind, AiSequence};
pub use common::{ActorId, CellId, GameTime, ItemHandle, ObjectHandle, Position, RefId};
pub use creature::{CreatureStats, DrawState, SummonKey};
pub use npc::NpcStats;
pub use spells::{CorprusStats, Spells};
