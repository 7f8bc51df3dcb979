//! The set of simulated actors and the per-tick pipeline over it.
//!
//! # Core Types
//!
//! - [`Actors`]: owns every registered [`Actor`], its timers and death counts
//! - [`TickReport`]: what one [`Actors::update`] changed
//! - [`DeathCountRecord`]: the persisted death counts
//!
//! Actors are keyed by [`ActorId`], which survives cell changes; the world
//! handle index is kept alongside and rewritten by [`Actors::update_actor`].

pub mod allies;
mod death;
mod record;
mod timers;
mod update;

use std::collections::{BTreeMap, BTreeSet};

use crate::ai::PlannedAction;
use crate::config::MechanicsConfig;
use crate::env::Env;
use crate::error::MechanicsResult;
use crate::magic::update_magic_effects;
use crate::state::{Actor, ActorId, CellId, ObjectHandle, Position, RefId};
use crate::stats::{
    ActorRoster, calculate_creature_stat_modifiers, calculate_npc_stat_modifiers,
    restore_dynamic_stats,
};

pub use allies::{ActorMap, AllyCache};
pub use record::{DeathCountRecord, RecordError};
pub use timers::{DueTimers, Throttle, UpdateTimers};
pub use update::TickReport;

use update::{CombatPlan, PendingChanges};

/// Registered actors and the registry-wide state of the simulation.
#[derive(Clone, Debug)]
pub struct Actors {
    actors: ActorMap,
    handles: BTreeMap<ObjectHandle, ActorId>,
    death_counts: BTreeMap<RefId, u32>,
    /// Latest combat decision of each fighting actor.
    combat_actions: BTreeMap<ActorId, CombatPlan>,
    timers: UpdateTimers,
    config: MechanicsConfig,
}

impl Actors {
    pub fn new(config: MechanicsConfig) -> Self {
        Self {
            actors: ActorMap::new(),
            handles: BTreeMap::new(),
            death_counts: BTreeMap::new(),
            combat_actions: BTreeMap::new(),
            timers: UpdateTimers::new(&config),
            config,
        }
    }

    pub fn config(&self) -> &MechanicsConfig {
        &self.config
    }

    pub fn timers(&self) -> &UpdateTimers {
        &self.timers
    }

    // ========================================================================
    // Membership
    // ========================================================================

    /// Registers `actor`. An actor loaded already dead skips its death
    /// animation.
    pub fn add_actor(&mut self, mut actor: Actor) {
        if actor.stats.is_dead() {
            actor.skip_death_anim();
        }
        tracing::info!(actor = %actor.id, record = %actor.record, "actor added");
        self.handles.insert(actor.handle, actor.id);
        self.actors.insert(actor.id, actor);
    }

    pub fn remove_actor(&mut self, id: ActorId) -> Option<Actor> {
        let actor = self.actors.remove(&id)?;
        self.handles.remove(&actor.handle);
        self.combat_actions.remove(&id);
        tracing::info!(actor = %id, "actor removed");
        Some(actor)
    }

    /// Moves the actor registered under `old` to the world handle `new`,
    /// keeping its identity and state.
    pub fn update_actor(&mut self, old: ObjectHandle, new: ObjectHandle) -> bool {
        let Some(id) = self.handles.remove(&old) else {
            return false;
        };
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.handle = new;
        }
        self.handles.insert(new, id);
        true
    }

    /// Unregisters every actor in `cell` except the one at `ignore`.
    pub fn drop_actors(&mut self, cell: CellId, ignore: Option<ObjectHandle>, env: &Env<'_>) {
        let dropped: Vec<ActorId> = self
            .actors
            .values()
            .filter(|actor| Some(actor.handle) != ignore && env.world.cell(actor.handle) == cell)
            .map(|actor| actor.id)
            .collect();
        for id in dropped {
            self.remove_actor(id);
        }
    }

    /// Empties the registry and resets its timers. Death counts are kept.
    pub fn clear(&mut self) {
        self.actors.clear();
        self.handles.clear();
        self.combat_actions.clear();
        self.timers.reset();
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn get(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn get_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(&id)
    }

    pub fn by_handle(&self, handle: ObjectHandle) -> Option<&Actor> {
        self.handles.get(&handle).and_then(|id| self.actors.get(id))
    }

    pub fn contains(&self, id: ActorId) -> bool {
        self.actors.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    pub fn actor_map(&self) -> &ActorMap {
        &self.actors
    }

    pub fn player(&self) -> Option<&Actor> {
        self.actors.values().find(|actor| actor.is_player)
    }

    pub fn player_id(&self) -> Option<ActorId> {
        self.player().map(|player| player.id)
    }

    /// The action `id` last prepared in combat.
    pub fn combat_action(&self, id: ActorId) -> Option<&PlannedAction> {
        self.combat_actions.get(&id).map(|plan| &plan.planned)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn is_any_object_in_range(&self, position: Position, radius: f32, env: &Env<'_>) -> bool {
        let radius_squared = radius * radius;
        self.actors
            .values()
            .any(|actor| env.world.position(actor.handle).distance_squared(&position) <= radius_squared)
    }

    pub fn get_actors_in_range(&self, position: Position, radius: f32, env: &Env<'_>) -> Vec<ActorId> {
        let radius_squared = radius * radius;
        self.actors
            .values()
            .filter(|actor| env.world.position(actor.handle).distance_squared(&position) <= radius_squared)
            .map(|actor| actor.id)
            .collect()
    }

    pub fn is_actor_detected(&self, actor: ActorId, observer: ActorId, env: &Env<'_>) -> bool {
        env.mechanics.is_actor_detected(actor, observer)
    }

    pub fn get_actors_siding_with(&self, id: ActorId) -> BTreeSet<ActorId> {
        allies::get_actors_siding_with(id, &self.actors)
    }

    pub fn get_actors_siding_with_cached(&self, id: ActorId, cache: &mut AllyCache) -> BTreeSet<ActorId> {
        allies::get_actors_siding_with_cached(id, &self.actors, cache)
    }

    pub fn get_actors_following(&self, id: ActorId) -> BTreeSet<ActorId> {
        allies::get_actors_following(id, &self.actors)
    }

    pub fn get_allied_actors(&self, id: ActorId) -> BTreeSet<ActorId> {
        allies::get_allied_actors(id, &self.actors)
    }

    /// Living actors within AI range that fight `id`.
    pub fn get_actors_fighting(&self, id: ActorId, env: &Env<'_>) -> Vec<ActorId> {
        let Some(actor) = self.actors.get(&id) else {
            return Vec::new();
        };
        let position = env.world.position(actor.handle);
        let range = self.config.ai_processing_distance_squared();
        self.actors
            .values()
            .filter(|other| {
                other.id != id
                    && !other.stats.is_dead()
                    && env.world.position(other.handle).distance_squared(&position) <= range
                    && other.stats.ai.is_in_combat_with(id)
            })
            .map(|other| other.id)
            .collect()
    }

    /// Living actors within AI range that fight `id` or anyone siding with it.
    pub fn get_enemies_nearby(&self, id: ActorId, env: &Env<'_>) -> Vec<ActorId> {
        let Some(actor) = self.actors.get(&id) else {
            return Vec::new();
        };
        let mut side = self.get_actors_siding_with(id);
        side.insert(id);
        let position = env.world.position(actor.handle);
        let range = self.config.ai_processing_distance_squared();
        self.actors
            .values()
            .filter(|other| {
                !side.contains(&other.id)
                    && !other.stats.is_dead()
                    && env.world.position(other.handle).distance_squared(&position) <= range
                    && other.stats.ai.combat_targets().any(|target| side.contains(&target))
            })
            .map(|other| other.id)
            .collect()
    }

    pub fn is_running(&self, id: ActorId) -> bool {
        self.get(id).is_some_and(|actor| actor.controller.running)
    }

    pub fn is_sneaking(&self, id: ActorId) -> bool {
        self.get(id).is_some_and(|actor| actor.controller.sneaking)
    }

    pub fn is_ready_to_block(&self, id: ActorId) -> bool {
        self.get(id).is_some_and(|actor| actor.controller.ready_to_block)
    }

    pub fn is_attacking_or_spell(&self, id: ActorId) -> bool {
        self.get(id).is_some_and(|actor| actor.controller.attacking_or_spell)
    }

    pub fn is_casting_spell(&self, id: ActorId) -> bool {
        self.get(id).is_some_and(|actor| actor.controller.casting_spell)
    }

    // ========================================================================
    // Deaths
    // ========================================================================

    pub fn count_deaths(&self, record: &RefId) -> u32 {
        self.death_counts.get(record).copied().unwrap_or(0)
    }

    /// Brings a dead actor back with full health and collision.
    pub fn resurrect(&mut self, id: ActorId, env: &mut Env<'_>) -> bool {
        let Some(actor) = self.actors.get_mut(&id) else {
            return false;
        };
        if !actor.stats.is_dead() {
            return false;
        }
        actor.resurrect();
        env.world.set_collision(actor.handle, true);
        tracing::info!(actor = %id, "actor resurrected");
        true
    }

    pub fn write_death_counts(&self) -> DeathCountRecord {
        DeathCountRecord::from_counts(&self.death_counts)
    }

    /// Replaces death counts with those of `record` whose ids still resolve.
    pub fn read_death_counts(&mut self, record: DeathCountRecord, resolves: impl Fn(&RefId) -> bool) {
        self.death_counts = record.into_counts(resolves);
    }

    // ========================================================================
    // Rest
    // ========================================================================

    /// Fast-forwards `hours` of rest, then lets every conscious non-player
    /// actor finish travelling.
    ///
    /// # Errors
    ///
    /// Returns an error if a restoration setting or effect record is missing.
    pub fn rest(&mut self, hours: u32, sleep: bool, env: &mut Env<'_>) -> MechanicsResult<()> {
        let roster = self.roster();
        let ids: Vec<ActorId> = self.actors.keys().copied().collect();
        let mut pending = PendingChanges::default();

        for _ in 0..hours {
            for id in &ids {
                let Some(actor) = self.actors.get_mut(id) else {
                    continue;
                };
                restore_dynamic_stats(actor, env, sleep)?;
                if !sleep && !actor.stats.is_dead() {
                    update_magic_effects(actor, env)?;
                    // Refresh only; nothing integrates over zero time.
                    pending.absorb(calculate_creature_stat_modifiers(actor, env, &roster, 0.0)?);
                    calculate_npc_stat_modifiers(actor);
                }
            }
        }
        let mut report = TickReport::default();
        self.apply_pending(pending, &mut report);

        for actor in self.actors.values_mut() {
            if actor.is_player || !actor.stats.is_conscious() {
                continue;
            }
            if let Some(destination) = actor.stats.ai.complete_travel() {
                env.world.move_to(actor.handle, destination);
                tracing::debug!(actor = %actor.id, "travel completed during rest");
            }
        }
        Ok(())
    }

    /// Facts about other actors the per-actor modifier pass needs.
    fn roster(&self) -> ActorRoster {
        let player = self.player().map_or(ActorId::NONE, |player| player.id);
        let mut roster = ActorRoster::new(player)
            .with_death_finished(
                self.actors
                    .values()
                    .filter(|actor| actor.stats.is_death_anim_finished())
                    .map(|actor| actor.id),
            )
            .with_werewolves(
                self.actors
                    .values()
                    .filter(|actor| actor.is_werewolf())
                    .map(|actor| actor.id),
            );
        if player.is_some() {
            roster = roster.with_player_side(self.get_actors_siding_with(player));
        }
        roster
    }
}

impl Default for Actors {
    fn default() -> Self {
        Self::new(MechanicsConfig::default())
    }
}
