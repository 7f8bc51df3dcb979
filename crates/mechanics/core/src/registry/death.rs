//! Death processing, run after every other per-actor pass of a tick.

use crate::env::Env;
use crate::error::MechanicsResult;
use crate::magic::EffectId;
use crate::state::{Actor, ActorId, KillResult};
use crate::stats::{
    calculate_creature_stat_modifiers, calculate_npc_stat_modifiers, ActorRoster, ModifierOutcome,
};

use super::update::PendingChanges;
use super::{Actors, TickReport};

const SOUL_TRAP_MESSAGE: &str = "#{sSoultrapSuccess}";
const KILLED_ESSENTIAL_MESSAGE: &str = "#{sKilledEssential}";
const DEATH_LINE: &str = "death";

impl Actors {
    /// Advances every death animation and applies the side effects of its
    /// start and end.
    ///
    /// # Errors
    ///
    /// Returns an error if a bound item record of a dying actor is missing.
    pub(super) fn kill_dead_actors(
        &mut self,
        duration: f32,
        env: &mut Env<'_>,
        report: &mut TickReport,
    ) -> MechanicsResult<()> {
        let player = self.player_id();
        let anim_length = self.config.death_anim_length;
        let roster = self.roster();
        let ids: Vec<ActorId> = self.actors.keys().copied().collect();
        let mut pending = PendingChanges::default();

        for id in ids {
            let Some(actor) = self.actors.get_mut(&id) else {
                continue;
            };
            match actor.kill(duration, anim_length) {
                KillResult::DeathAnimStarted => {
                    if on_death_started(actor, player, env) {
                        report.soul_trapped.push(id);
                    }
                    pending.absorb(release_magic(actor, env, &roster)?);
                    self.combat_actions.remove(&id);
                    report.deaths_started.push(id);
                }
                KillResult::DeathAnimJustFinished => {
                    self.on_death_finished(id, env);
                    report.deaths_finished.push(id);
                }
                KillResult::DeathAnimPlaying | KillResult::DeathAnimFinished | KillResult::NoEffect => {}
            }
        }

        self.apply_pending(pending, report);
        Ok(())
    }

    fn on_death_finished(&mut self, id: ActorId, env: &mut Env<'_>) {
        let Some(actor) = self.actors.get_mut(&id) else {
            return;
        };
        actor.stats.active_spells.clear();
        env.world.set_collision(actor.handle, false);
        let is_player = actor.is_player;
        let record = actor.record.clone();

        for other in self.actors.values_mut() {
            other.stats.active_spells.purge_caster(id);
        }

        if is_player {
            tracing::info!(actor = %id, "player died");
            env.presentation.play_death_music();
            env.presentation.request_load_recent_save();
        } else {
            let count = self.death_counts.entry(record).or_insert(0);
            *count += 1;
            tracing::info!(actor = %id, deaths = *count, "death finished");
        }
    }
}

/// Returns whether the soul was trapped.
fn on_death_started(actor: &mut Actor, player: Option<ActorId>, env: &mut Env<'_>) -> bool {
    tracing::info!(actor = %actor.id, record = %actor.record, "actor died");
    env.presentation.play_voice(actor.handle, DEATH_LINE);

    let soul_trapped = !actor.is_npc()
        && player.is_some_and(|player| {
            actor.stats.active_spells.iter().any(|spell| {
                spell.caster == player
                    && spell
                        .effects
                        .iter()
                        .any(|effect| effect.id() == EffectId::Soultrap && effect.time_left > 0.0)
            })
        });
    if soul_trapped {
        env.presentation.message_box(SOUL_TRAP_MESSAGE);
        tracing::info!(creature = %actor.id, "soul trapped");
    }

    if actor.stats.ai.is_in_combat() {
        env.mechanics.stop_combat(actor.id);
    }
    actor.stats.ai.clear();

    if actor.is_essential() {
        env.presentation.message_box(KILLED_ESSENTIAL_MESSAGE);
    }
    soul_trapped
}

/// Drops every spell on the corpse and reruns the modifier pass so summons
/// are dismissed and bound items return.
fn release_magic(
    actor: &mut Actor,
    env: &mut Env<'_>,
    roster: &ActorRoster,
) -> MechanicsResult<ModifierOutcome> {
    actor.stats.active_spells.clear();
    actor.stats.magic_effects.clear();
    let outcome = calculate_creature_stat_modifiers(actor, env, roster, 0.0)?;
    calculate_npc_stat_modifiers(actor);
    Ok(outcome)
}
