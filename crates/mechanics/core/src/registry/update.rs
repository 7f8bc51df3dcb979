//! One simulation tick over every registered actor.
//!
//! Order within a tick:
//!
//! 1. per actor: magic and stat refresh, AI targets (throttled), head
//!    tracking (throttled), crime pursuit, combat planning, drowning and
//!    equipped light (throttled)
//! 2. queued spawns and dismissals are applied
//! 3. animation gating by distance from the player, paralysis freeze
//! 4. death processing for everyone
//! 5. sneak bookkeeping (throttled)
//!
//! Stats of an actor are always refreshed before its AI runs, and nobody's
//! AI sees a death that started in the same tick.

use crate::ai::{Action, PlannedAction, prepare_next_action};
use crate::combat::{Engagement, engage_combat, start_combat};
use crate::env::{EquipmentSlot, Env, ItemKind};
use crate::error::MechanicsResult;
use crate::magic::{EffectId, update_magic_effects};
use crate::state::{Actor, ActorId, AiPackage, AiPackageKind, Position};
use crate::stats::{
    ActorRoster, DynamicKind, ModifierOutcome, calculate_creature_stat_modifiers, calculate_dynamic_stats,
    calculate_npc_stat_modifiers, calculate_restoration,
};

use super::{Actors, AllyCache, DueTimers};

/// Submersion at which an actor counts as fully underwater.
const SUBMERGED_LEVEL: f32 = 1.0;
/// An unconscious actor drowns at a shallower depth.
const KNOCKED_OUT_SUBMERGED_LEVEL: f32 = 0.25;

/// What one [`Actors::update`] changed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub engagements: Vec<Engagement>,
    /// Actors registered during the tick (summoned creatures).
    pub spawned: Vec<ActorId>,
    /// Summons dismissed during the tick.
    pub dismissed: Vec<ActorId>,
    pub deaths_started: Vec<ActorId>,
    pub deaths_finished: Vec<ActorId>,
    pub soul_trapped: Vec<ActorId>,
}

/// Combat decision of one actor and how long it holds.
#[derive(Clone, Debug, PartialEq)]
pub(super) struct CombatPlan {
    pub(super) planned: PlannedAction,
    target: ActorId,
    cooldown: f32,
}

/// Registry mutations requested while iterating.
#[derive(Default)]
pub(super) struct PendingChanges {
    spawned: Vec<Actor>,
    dismissed: Vec<ActorId>,
    werewolf_kills: u32,
}

impl PendingChanges {
    pub(super) fn absorb(&mut self, outcome: ModifierOutcome) {
        self.spawned.extend(outcome.spawned);
        self.dismissed.extend(outcome.dismissed);
        if outcome.werewolf_kill {
            self.werewolf_kills += 1;
        }
    }
}

impl Actors {
    /// Advances the simulation by `duration` seconds.
    ///
    /// While `paused`, only animation gating and death processing run.
    ///
    /// # Errors
    ///
    /// Returns an error if a game setting or content record the rules read is
    /// missing.
    pub fn update(&mut self, duration: f32, paused: bool, env: &mut Env<'_>) -> MechanicsResult<TickReport> {
        let mut report = TickReport::default();
        let due = if paused { DueTimers::default() } else { self.timers.poll() };

        if !paused {
            let roster = self.roster();
            let ids: Vec<ActorId> = self.actors.keys().copied().collect();
            let mut pending = PendingChanges::default();
            let mut allies = AllyCache::new();

            for &id in &ids {
                self.clear_stale_hit_attempt(id, env);
                self.refresh_actor(id, duration, env, &roster, &mut pending)?;
                if due.ai_targets && self.in_ai_range_of_player(id, env) {
                    self.update_ai_targets(id, &ids, &mut allies, env, &mut report)?;
                }
                if due.head_track {
                    self.update_head_tracking(id, env)?;
                }
                self.update_crime_pursuit(id, env)?;
                self.update_combat_plan(id, duration, env)?;
                self.update_humanoid(id, duration, due, env)?;
            }

            self.apply_pending(pending, &mut report);
            self.timers.advance(duration);
        }

        self.update_animation_gating(env);
        self.kill_dead_actors(duration, env, &mut report)?;
        if due.sneak {
            self.update_sneaking(env);
        }
        Ok(report)
    }

    // ========================================================================
    // Per-actor passes
    // ========================================================================

    /// Forgets an attacker that died, left combat or went out of range.
    fn clear_stale_hit_attempt(&mut self, id: ActorId, env: &Env<'_>) {
        let Some(actor) = self.actors.get(&id) else {
            return;
        };
        let attacker = actor.stats.hit_attempt_actor;
        if attacker.is_none() {
            return;
        }
        let range = self.config.ai_processing_distance_squared();
        let stale = match self.actors.get(&attacker) {
            None => true,
            Some(other) => {
                other.stats.is_dead()
                    || !other.stats.ai.is_in_combat()
                    || env
                        .world
                        .position(other.handle)
                        .distance_squared(&env.world.position(actor.handle))
                        > range
            }
        };
        if stale {
            if let Some(actor) = self.actors.get_mut(&id) {
                actor.stats.hit_attempt_actor = ActorId::NONE;
            }
        }
    }

    fn refresh_actor(
        &mut self,
        id: ActorId,
        duration: f32,
        env: &mut Env<'_>,
        roster: &ActorRoster,
        pending: &mut PendingChanges,
    ) -> MechanicsResult<()> {
        let Some(actor) = self.actors.get_mut(&id) else {
            return Ok(());
        };
        if actor.stats.is_dead() {
            return Ok(());
        }
        update_magic_effects(actor, env)?;
        calculate_dynamic_stats(actor, env)?;
        let outcome = calculate_creature_stat_modifiers(actor, env, roster, duration)?;
        calculate_npc_stat_modifiers(actor);
        if !actor.stats.is_dead() {
            calculate_restoration(actor, env, duration)?;
        }

        pending.absorb(outcome);
        Ok(())
    }

    fn in_ai_range_of_player(&self, id: ActorId, env: &Env<'_>) -> bool {
        let (Some(actor), Some(player)) = (self.actors.get(&id), self.player()) else {
            return false;
        };
        env.world
            .position(actor.handle)
            .distance_squared(&env.world.position(player.handle))
            <= self.config.ai_processing_distance_squared()
    }

    fn update_ai_targets(
        &mut self,
        id: ActorId,
        ids: &[ActorId],
        allies: &mut AllyCache,
        env: &mut Env<'_>,
        report: &mut TickReport,
    ) -> MechanicsResult<()> {
        for &other in ids {
            if other == id {
                continue;
            }
            let Some(engagement) = engage_combat(id, other, &self.actors, allies, env, &self.config)? else {
                continue;
            };
            for attacker in &engagement.attackers {
                if let Some(actor) = self.actors.get_mut(attacker) {
                    start_combat(actor, engagement.target, env);
                }
            }
            if let Some(hit_attempt) = engagement.hit_attempt_actor {
                if let Some(actor) = self.actors.get_mut(&id) {
                    actor.stats.hit_attempt_actor = hit_attempt;
                }
            }
            // Group membership may have changed.
            allies.clear();
            report.engagements.push(engagement);
        }
        Ok(())
    }

    /// Looks at the combat target, else at the nearest aware actor in sight.
    fn update_head_tracking(&mut self, id: ActorId, env: &Env<'_>) -> MechanicsResult<()> {
        let Some(actor) = self.actors.get(&id) else {
            return Ok(());
        };
        if actor.is_player {
            return Ok(());
        }

        let target = if actor.stats.is_dead() {
            None
        } else if let Some(target) = actor.stats.ai.combat_target() {
            Some(target)
        } else {
            let mut max_distance = env.float("fMaxHeadTrackDistance")?;
            if !env.world.is_exterior(actor.handle) {
                max_distance *= env.float("fInteriorHeadTrackMult")?;
            }
            let max_squared = max_distance * max_distance;
            let position = env.world.position(actor.handle);

            let mut nearest: Option<(ActorId, f32)> = None;
            for other in self.actors.values() {
                if other.id == id || other.stats.is_dead() {
                    continue;
                }
                let distance = env.world.position(other.handle).distance_squared(&position);
                if distance > max_squared || nearest.is_some_and(|(_, best)| distance >= best) {
                    continue;
                }
                if env.world.line_of_sight(actor.handle, other.handle)
                    && env.mechanics.awareness_check(other.id, id)
                {
                    nearest = Some((other.id, distance));
                }
            }
            nearest.map(|(other, _)| other)
        };

        if let Some(actor) = self.actors.get_mut(&id) {
            actor.controller.head_track_target = target;
        }
        Ok(())
    }

    /// Guards chase a player whose bounty crosses the crime threshold.
    fn update_crime_pursuit(&mut self, id: ActorId, env: &mut Env<'_>) -> MechanicsResult<()> {
        let Some(player) = self.player() else {
            return Ok(());
        };
        let (player_id, player_handle) = (player.id, player.handle);
        let bounty = player.npc.as_ref().map_or(0, |npc| npc.bounty);

        let Some(guard) = self.actors.get_mut(&id) else {
            return Ok(());
        };
        if guard.is_player || !guard.is_guard() || !guard.stats.is_conscious() {
            return Ok(());
        }

        let threshold = u32::try_from(env.int("iCrimeThreshold")?).unwrap_or(0);
        let pursuing = guard.stats.ai.has_package(AiPackageKind::Pursue);
        if bounty >= threshold {
            if pursuing || guard.stats.ai.is_in_combat_with(player_id) {
                return Ok(());
            }
            if env.world.line_of_sight(guard.handle, player_handle)
                && env.mechanics.awareness_check(player_id, guard.id)
            {
                guard.stats.ai.stack(AiPackage::Pursue { target: player_id });
                env.presentation.play_voice(guard.handle, "thief");
                tracing::info!(guard = %guard.id, bounty, "pursuing criminal");
            }
        } else if pursuing {
            guard.stats.ai.stop_pursuit();
            tracing::debug!(guard = %guard.id, "pursuit dropped");
        }
        Ok(())
    }

    /// Picks the next combat action once the previous one has run its course.
    fn update_combat_plan(&mut self, id: ActorId, duration: f32, env: &mut Env<'_>) -> MechanicsResult<()> {
        let Some(actor) = self.actors.get(&id) else {
            return Ok(());
        };
        let target = match actor.stats.ai.combat_target() {
            Some(target) if !actor.is_player && actor.stats.is_conscious() => target,
            _ => {
                self.combat_actions.remove(&id);
                return Ok(());
            }
        };

        if !self.actors.get(&target).is_some_and(|enemy| !enemy.stats.is_dead()) {
            self.combat_actions.remove(&id);
            if let Some(actor) = self.actors.get_mut(&id) {
                actor.stats.ai.stop_combat_with(target);
                if !actor.stats.ai.is_in_combat() {
                    env.mechanics.stop_combat(id);
                }
                tracing::debug!(actor = %id, target = %target, "combat target gone");
            }
            return Ok(());
        }

        if let Some(plan) = self.combat_actions.get_mut(&id) {
            plan.cooldown -= duration;
            if plan.target == target && plan.cooldown > 0.0 {
                return Ok(());
            }
        }

        let Some(mut actor) = self.actors.remove(&id) else {
            return Ok(());
        };
        let planned = match self.actors.get(&target) {
            Some(enemy) => prepare_next_action(&mut actor, enemy, env),
            None => Ok(PlannedAction {
                action: Action::unarmed(),
                rating: 0.0,
            }),
        };
        self.actors.insert(id, actor);
        let planned = planned?;

        let cooldown = planned.action.cooldown();
        self.combat_actions.insert(
            id,
            CombatPlan {
                planned,
                target,
                cooldown,
            },
        );
        Ok(())
    }

    /// Drowning and lights, which only humanoids care about.
    fn update_humanoid(
        &mut self,
        id: ActorId,
        duration: f32,
        due: DueTimers,
        env: &mut Env<'_>,
    ) -> MechanicsResult<()> {
        let Some(actor) = self.actors.get_mut(&id) else {
            return Ok(());
        };
        if !actor.is_npc() || actor.stats.is_dead() {
            return Ok(());
        }
        update_drowning(actor, duration, env)?;
        if due.light && !actor.is_player {
            update_equipped_light(actor, env)?;
        }
        Ok(())
    }

    // ========================================================================
    // After the pass
    // ========================================================================

    pub(super) fn apply_pending(&mut self, pending: PendingChanges, report: &mut TickReport) {
        for creature in pending.spawned {
            report.spawned.push(creature.id);
            self.add_actor(creature);
        }

        for creature in pending.dismissed {
            for actor in self.actors.values_mut() {
                actor.stats.active_spells.purge_caster(creature);
            }
            self.remove_actor(creature);
            report.dismissed.push(creature);
        }

        if pending.werewolf_kills > 0 {
            if let Some(npc) = self
                .actors
                .values_mut()
                .find(|actor| actor.is_player)
                .and_then(|player| player.npc.as_mut())
            {
                for _ in 0..pending.werewolf_kills {
                    npc.add_werewolf_kill();
                }
            }
        }
    }

    /// Far actors stop animating; paralysed ones freeze in place.
    fn update_animation_gating(&mut self, env: &Env<'_>) {
        let player_position = self.player().map(|player| env.world.position(player.handle));
        let range = self.config.actors_processing_range * self.config.actors_processing_range;

        for actor in self.actors.values_mut() {
            let in_range = actor.is_player
                || player_position.is_none_or(|position: Position| {
                    env.world.position(actor.handle).distance_squared(&position) <= range
                });
            actor.controller.active = in_range;
            actor.controller.visible = in_range;
            actor.controller.frozen = actor.stats.is_paralyzed();
        }
    }

    /// A sneaking player nobody nearby detects trains Sneak.
    fn update_sneaking(&mut self, env: &mut Env<'_>) {
        let Some(player) = self.player() else {
            return;
        };
        if !player.controller.sneaking {
            env.presentation.set_sneak_indicator(false);
            return;
        }

        let position = env.world.position(player.handle);
        let range = self.config.ai_processing_distance_squared();
        let observers: Vec<ActorId> = self
            .actors
            .values()
            .filter(|other| {
                !other.is_player
                    && !other.stats.is_dead()
                    && env.world.position(other.handle).distance_squared(&position) <= range
            })
            .map(|other| other.id)
            .collect();

        let detected = observers
            .iter()
            .any(|observer| env.mechanics.is_actor_detected(player.id, *observer));
        env.presentation.set_sneak_indicator(!detected);
        if !detected && !observers.is_empty() {
            env.mechanics.sneak_skill_used(player.id);
            tracing::debug!(observers = observers.len(), "sneak unnoticed");
        }
    }
}

/// Breath runs out after `fHoldBreathTime`; then suffocation damage is
/// applied every second.
fn update_drowning(actor: &mut Actor, duration: f32, env: &Env<'_>) -> MechanicsResult<()> {
    let submerged = env.world.is_underwater(actor.handle, SUBMERGED_LEVEL)
        || (!actor.stats.is_conscious()
            && env.world.is_underwater(actor.handle, KNOCKED_OUT_SUBMERGED_LEVEL));
    let breathes_water = actor.stats.magic_effects.is_active(EffectId::WaterBreathing)
        || actor
            .creature_data()
            .is_some_and(|data| data.is_pure_water_creature());
    if !submerged || breathes_water {
        actor.controller.time_underwater = 0.0;
        return Ok(());
    }

    actor.controller.time_underwater += duration;
    if actor.controller.time_underwater < env.float("fHoldBreathTime")? {
        return Ok(());
    }
    let damage = env.float("fSuffocationDamage")? * duration;
    actor.stats.update_dynamic(DynamicKind::Health, |health| {
        health.set_current(health.current() - damage, false, false);
    });
    tracing::debug!(actor = %actor.id, damage, "suffocating");
    Ok(())
}

/// Equips a carried light in the dark when the left hand is free; takes it
/// off again once it is light.
fn update_equipped_light(actor: &mut Actor, env: &mut Env<'_>) -> MechanicsResult<()> {
    if !actor.has_inventory {
        return Ok(());
    }
    let left = env.inventory.slot(actor.handle, EquipmentSlot::CarriedLeft);

    if env.world.is_dark(actor.handle) {
        if left.is_some() || actor.controller.light_equipped {
            return Ok(());
        }
        if let Some(right) = env.inventory.slot(actor.handle, EquipmentSlot::CarriedRight) {
            if env
                .item(&right.record)?
                .weapon()
                .is_some_and(|data| data.kind.is_two_handed())
            {
                return Ok(());
            }
        }
        for item in env.inventory.items(actor.handle) {
            if matches!(env.item(&item.record)?.kind, ItemKind::Light)
                && env.inventory.equip(actor.handle, item.handle)
            {
                actor.controller.light_equipped = true;
                tracing::debug!(actor = %actor.id, light = %item.record, "light equipped");
                break;
            }
        }
    } else if actor.controller.light_equipped {
        if let Some(left) = left {
            if matches!(env.item(&left.record)?.kind, ItemKind::Light) {
                env.inventory.unequip_slot(actor.handle, EquipmentSlot::CarriedLeft);
            }
        }
        actor.controller.light_equipped = false;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MechanicsConfig;
    use crate::env::memory::MemoryServices;
    use crate::env::{ContentTables, InventoryService, ItemRecord};
    use crate::state::{CreatureStats, NpcStats, ObjectHandle};
    use crate::stats::DynamicStat;

    const PLAYER: ActorId = ActorId(0);

    fn npc(id: i32) -> Actor {
        let mut stats = CreatureStats::new(5);
        stats.set_dynamic(DynamicKind::Health, DynamicStat::new(50.0));
        Actor::npc(ActorId(id), ObjectHandle(id as u64 + 1), "npc", stats, NpcStats::default())
    }

    fn setup() -> (MemoryServices, Actors) {
        let mut content = ContentTables::new();
        content.add_item(ItemRecord::new("torch", ItemKind::Light, 1.0));
        let services = MemoryServices::new(content).unwrap();
        (services, Actors::new(MechanicsConfig::new()))
    }

    fn register(services: &mut MemoryServices, actors: &mut Actors, actor: Actor, at: Position) {
        services.world.place_actor(&actor, at);
        actors.add_actor(actor);
    }

    #[test]
    fn paused_tick_only_gates_animation() {
        let (mut services, mut actors) = setup();
        register(&mut services, &mut actors, npc(0).into_player(), Position::ORIGIN);
        let before = actors.timers().clone();

        let report = actors.update(0.5, true, &mut services.env()).unwrap();

        assert_eq!(report, TickReport::default());
        assert_eq!(actors.timers(), &before);
    }

    #[test]
    fn head_tracking_prefers_nearest_actor_in_sight() {
        let (mut services, mut actors) = setup();
        register(&mut services, &mut actors, npc(0).into_player(), Position::new(300.0, 0.0, 0.0));
        register(&mut services, &mut actors, npc(1), Position::ORIGIN);
        register(&mut services, &mut actors, npc(2), Position::new(100.0, 0.0, 0.0));

        actors.update(0.3, false, &mut services.env()).unwrap();
        assert_eq!(actors.get(ActorId(1)).unwrap().controller.head_track_target, Some(ActorId(2)));

        services.world.block_sight(ObjectHandle(2), ObjectHandle(3));
        actors.update(0.3, false, &mut services.env()).unwrap();
        assert_eq!(actors.get(ActorId(1)).unwrap().controller.head_track_target, Some(PLAYER));
    }

    #[test]
    fn drowning_starts_after_breath_runs_out() {
        let (mut services, mut actors) = setup();
        register(&mut services, &mut actors, npc(0).into_player(), Position::ORIGIN);
        services.world.object_mut(ObjectHandle(1)).unwrap().submersion = 1.0;

        for _ in 0..19 {
            actors.update(1.0, false, &mut services.env()).unwrap();
        }
        assert_eq!(actors.get(PLAYER).unwrap().stats.health().current(), 50.0);

        actors.update(1.0, false, &mut services.env()).unwrap();
        actors.update(1.0, false, &mut services.env()).unwrap();
        assert!(actors.get(PLAYER).unwrap().stats.health().current() < 50.0);
    }

    #[test]
    fn guards_pursue_wanted_player_in_sight() {
        let (mut services, mut actors) = setup();
        let mut player = npc(0).into_player();
        player.npc.as_mut().unwrap().bounty = 1000;
        register(&mut services, &mut actors, player, Position::ORIGIN);
        let mut guard = npc(1);
        guard.npc = Some(NpcStats::new("imperial", "guard"));
        register(&mut services, &mut actors, guard, Position::new(200.0, 0.0, 0.0));

        actors.update(0.1, false, &mut services.env()).unwrap();

        let guard = actors.get(ActorId(1)).unwrap();
        assert!(guard.stats.ai.has_package(AiPackageKind::Pursue));
        assert!(services.presentation.voices.iter().any(|(_, line)| line == "thief"));

        actors.get_mut(PLAYER).unwrap().npc.as_mut().unwrap().bounty = 0;
        actors.update(0.1, false, &mut services.env()).unwrap();
        assert!(!actors.get(ActorId(1)).unwrap().stats.ai.has_package(AiPackageKind::Pursue));
    }

    #[test]
    fn lights_follow_darkness() {
        let (mut services, mut actors) = setup();
        register(&mut services, &mut actors, npc(0).into_player(), Position::ORIGIN);
        let traveller = npc(1);
        let handle = traveller.handle;
        register(&mut services, &mut actors, traveller, Position::new(50.0, 0.0, 0.0));
        services.inventory.add(handle, &"torch".into());
        services.world.object_mut(handle).unwrap().dark = true;

        actors.update(1.0, false, &mut services.env()).unwrap();
        assert_eq!(
            services.inventory.equipped_record(handle, EquipmentSlot::CarriedLeft),
            Some("torch".into())
        );

        services.world.object_mut(handle).unwrap().dark = false;
        actors.update(1.0, false, &mut services.env()).unwrap();
        assert_eq!(services.inventory.equipped_record(handle, EquipmentSlot::CarriedLeft), None);
    }

    #[test]
    fn unnoticed_sneaking_trains_sneak() {
        let (mut services, mut actors) = setup();
        let mut player = npc(0).into_player();
        player.controller.sneaking = true;
        register(&mut services, &mut actors, player, Position::ORIGIN);
        register(&mut services, &mut actors, npc(1), Position::new(500.0, 0.0, 0.0));

        actors.update(0.2, false, &mut services.env()).unwrap();
        assert_eq!(services.mechanics.sneak_uses, vec![PLAYER]);
        assert_eq!(services.presentation.sneak_indicator, Some(true));

        services.mechanics.set_detected(PLAYER, ActorId(1));
        actors.update(0.2, false, &mut services.env()).unwrap();
        assert_eq!(services.mechanics.sneak_uses.len(), 1);
        assert_eq!(services.presentation.sneak_indicator, Some(false));
    }

    #[test]
    fn far_actors_stop_animating_and_paralysis_freezes() {
        let (mut services, mut actors) = setup();
        register(&mut services, &mut actors, npc(0).into_player(), Position::ORIGIN);
        register(&mut services, &mut actors, npc(1), Position::new(10_000.0, 0.0, 0.0));
        let mut stunned = npc(2);
        stunned.stats.magic_effects.add(EffectId::Paralyze, 1.0);
        register(&mut services, &mut actors, stunned, Position::new(10.0, 0.0, 0.0));

        actors.update(0.0, true, &mut services.env()).unwrap();

        assert!(!actors.get(ActorId(1)).unwrap().controller.active);
        assert!(actors.get(ActorId(2)).unwrap().controller.frozen);
        assert!(actors.get(PLAYER).unwrap().controller.active);
    }
}
