//! Per-actor simulation for a single-player RPG world.
//!
//! `mechanics-core` owns the rules that run every frame for every loaded
//! actor: magic effect aggregation, dynamic stats and modifiers, summons,
//! combat engagement, AI action choice and the death state machine. Engine
//! facilities (world queries, inventory, audio and UI, crime and awareness)
//! are injected through the service traits in [`env`], so the whole layer
//! runs against in-memory doubles in tests.
//!
//! All mutation of actor state flows through [`registry::Actors::update`] and
//! the registry's explicit membership operations.
pub mod ai;
pub mod combat;
pub mod config;
pub mod env;
pub mod error;
pub mod magic;
pub mod registry;
pub mod state;
pub mod stats;
pub mod summon;

pub use ai::{Action, PlannedAction, plan_next_action, prepare_next_action};
pub use combat::{CombatRange, Engagement, engage_combat};
pub use config::MechanicsConfig;
pub use env::{
    ContentOracle, ContentTables, Env, GameSettings, InventoryService, MechanicsService,
    MechanicsTables, PresentationService, WorldService,
};
pub use error::{ErrorSeverity, GameError, MechanicsError, MechanicsResult};
pub use magic::{EffectId, EffectKey, MagicEffects};
pub use registry::{Actors, DeathCountRecord, TickReport};
pub use state::{Actor, ActorId, CreatureStats, NpcStats, ObjectHandle, Position, RefId};
