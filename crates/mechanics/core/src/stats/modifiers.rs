//! Modifiers - turns the magic effect snapshot into stat changes.
//!
//! Runs once per actor per tick after aggregation. With a positive `duration`
//! it integrates per-second effects over the elapsed time; with zero it only
//! refreshes modifiers (after equipment or effect changes).
//!
//! Formulas:
//! - Dynamic modifier = Fortify<Stat> − Drain<Stat>
//! - Attribute/skill modifier = Fortify − Drain − Absorb
//! - Fight modifier = Frenzy − Calm
//! - Flee modifier = Demoralize − Rally (+ TurnUndead for undead)

use std::collections::BTreeSet;

use strum::IntoEnumIterator;

use crate::env::{Env, SpellKind};
use crate::error::MechanicsResult;
use crate::magic::{EffectId, EffectKey};
use crate::state::{Actor, ActorId, CreatureStats, RefId};
use crate::stats::{sync_bound_items, AiSetting, Attribute, DynamicKind, Skill};
use crate::summon::update_summoned_creatures;

// ============================================================================
// Context and outcome
// ============================================================================

/// What the modifier pass needs to know about actors other than the one it
/// updates. Built by the registry once per tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ActorRoster {
    pub player: ActorId,
    player_side: BTreeSet<ActorId>,
    death_finished: BTreeSet<ActorId>,
    werewolves: BTreeSet<ActorId>,
}

impl ActorRoster {
    pub fn new(player: ActorId) -> Self {
        Self {
            player,
            ..Self::default()
        }
    }

    pub fn with_player_side(mut self, allies: impl IntoIterator<Item = ActorId>) -> Self {
        self.player_side.extend(allies);
        self
    }

    pub fn with_death_finished(mut self, dead: impl IntoIterator<Item = ActorId>) -> Self {
        self.death_finished.extend(dead);
        self
    }

    pub fn with_werewolves(mut self, werewolves: impl IntoIterator<Item = ActorId>) -> Self {
        self.werewolves.extend(werewolves);
        self
    }

    /// The player or one of the player's allies.
    pub fn is_player_side(&self, id: ActorId) -> bool {
        id.is_some() && (id == self.player || self.player_side.contains(&id))
    }

    pub fn is_death_finished(&self, id: ActorId) -> bool {
        self.death_finished.contains(&id)
    }

    /// Currently in werewolf form.
    pub fn is_werewolf(&self, id: ActorId) -> bool {
        self.werewolves.contains(&id)
    }
}

/// Changes the registry must apply after a modifier pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ModifierOutcome {
    /// Creatures placed in the world this pass, to be registered.
    pub spawned: Vec<Actor>,
    /// Summons torn down this pass; their spells are purged everywhere.
    pub dismissed: Vec<ActorId>,
    /// The actor died during this pass.
    pub died: bool,
    /// A player-side werewolf earned a kill.
    pub werewolf_kill: bool,
}

// ============================================================================
// Creature pass
// ============================================================================

/// Applies the snapshot to attributes, dynamic stats and AI settings, then
/// synchronises bound items and summons.
///
/// # Errors
///
/// Returns an error if a spell, effect or bound item record is missing.
pub fn calculate_creature_stat_modifiers(
    actor: &mut Actor,
    env: &mut Env<'_>,
    roster: &ActorRoster,
    duration: f32,
) -> MechanicsResult<ModifierOutcome> {
    let mut outcome = ModifierOutcome::default();
    let was_dead = actor.stats.is_dead();

    if duration > 0.0 && !was_dead {
        apply_tickable_effects(actor, env, duration);
        apply_permanent_abilities(actor, env)?;
        if !env.world.is_levitation_enabled() {
            purge_levitation(actor, env);
        }
    }

    update_dynamic_modifiers(actor);
    update_attribute_modifiers(actor);
    worsen_corprus(actor, env);
    let calmed = update_ai_settings(actor);

    if !was_dead && actor.stats.is_dead() {
        report_death(actor, env, roster, &mut outcome);
    }

    if calmed && actor.stats.ai.is_in_combat() {
        actor.stats.ai.stop_combat();
        env.mechanics.stop_combat(actor.id);
    }

    sync_bound_items(actor, env)?;

    let summoning = actor
        .stats
        .magic_effects
        .iter()
        .any(|(key, params)| key.id.is_summon() && params.magnitude() > 0.0);
    if summoning || !actor.stats.summons.is_empty() || !actor.stats.summon_graveyard.is_empty() {
        update_summoned_creatures(actor, env, roster, &mut outcome);
    }

    if duration > 0.0 {
        actor.stats.active_spells.remove_expired();
    }
    Ok(outcome)
}

/// NPC-only part of the pass: skill modifiers.
pub fn calculate_npc_stat_modifiers(actor: &mut Actor) {
    let effects = &actor.stats.magic_effects;
    let Some(npc) = actor.npc.as_mut() else {
        return;
    };
    for skill in Skill::iter() {
        let modifier = effects.magnitude(EffectKey::skill(EffectId::FortifySkill, skill))
            - effects.magnitude(EffectKey::skill(EffectId::DrainSkill, skill))
            - effects.magnitude(EffectKey::skill(EffectId::AbsorbSkill, skill));
        npc.skill_mut(skill).set_modifier(modifier);
    }
}

// ============================================================================
// Per-second effects
// ============================================================================

/// Integrates every per-second effect over `min(duration, time left)` and
/// counts the active spells down. An effect expiring mid-tick contributes its
/// remaining time exactly once.
fn apply_tickable_effects(actor: &mut Actor, env: &Env<'_>, duration: f32) {
    let mut ticks = Vec::new();
    for spell in actor.stats.active_spells.iter_mut() {
        for effect in &mut spell.effects {
            let elapsed = duration.min(effect.time_left);
            if elapsed > 0.0 && effect.id().is_tickable() {
                ticks.push((effect.key, effect.magnitude * elapsed));
            }
            effect.time_left = (effect.time_left - duration).max(0.0);
        }
    }

    let in_sunlight =
        env.world.is_exterior(actor.handle) && !env.world.is_dark(actor.handle);
    for (key, amount) in ticks {
        apply_tick(actor, key, amount, in_sunlight);
    }
}

fn apply_tick(actor: &mut Actor, key: EffectKey, amount: f32, in_sunlight: bool) {
    use EffectId::*;
    let stats = &mut actor.stats;
    match key.id {
        FireDamage | ShockDamage | FrostDamage | Poison | DamageHealth | AbsorbHealth => {
            damage_dynamic(stats, DynamicKind::Health, amount);
        }
        SunDamage if in_sunlight => damage_dynamic(stats, DynamicKind::Health, amount),
        DamageMagicka | AbsorbMagicka => damage_dynamic(stats, DynamicKind::Magicka, amount),
        DamageFatigue | AbsorbFatigue => damage_dynamic(stats, DynamicKind::Fatigue, amount),
        RestoreHealth | RestoreMagicka | RestoreFatigue => {
            if let Some(kind) = key.id.restored_stat() {
                stats.update_dynamic(kind, |stat| {
                    stat.set_current(stat.current() + amount, false, false)
                });
            }
        }
        DamageAttribute | RestoreAttribute => {
            let Some(attribute) = key.arg.and_then(Attribute::from_index) else {
                return;
            };
            let value = stats.attribute_mut(attribute);
            if key.id == DamageAttribute {
                value.damage_by(amount);
            } else {
                value.restore_by(amount);
            }
        }
        DamageSkill | RestoreSkill => {
            let (Some(skill), Some(npc)) = (key.arg.and_then(Skill::from_index), actor.npc.as_mut())
            else {
                return;
            };
            let value = npc.skill_mut(skill);
            if key.id == DamageSkill {
                value.damage_by(amount);
            } else {
                value.restore_by(amount);
            }
        }
        _ => {}
    }
}

/// Fatigue may go negative (knockdown); health and magicka stop at zero.
fn damage_dynamic(stats: &mut CreatureStats, kind: DynamicKind, amount: f32) {
    let allow_negative = kind == DynamicKind::Fatigue;
    stats.update_dynamic(kind, |stat| {
        stat.set_current(stat.current() - amount, allow_negative, false)
    });
}

// ============================================================================
// Permanent abilities
// ============================================================================

/// Abilities whose effects apply once are folded into the base stats and
/// then forgotten, so they never apply again.
fn apply_permanent_abilities(actor: &mut Actor, env: &mut Env<'_>) -> MechanicsResult<()> {
    let mut permanent = Vec::new();
    let mut spent: Vec<RefId> = Vec::new();

    for id in actor.stats.spells.iter() {
        let spell = env.spell(id)?;
        if spell.kind != SpellKind::Ability {
            continue;
        }
        let before = permanent.len();
        for entry in &spell.effects {
            let magnitude = entry.average_magnitude();
            if magnitude > 0.0 && env.magic_effect(entry.id())?.is_applied_once() {
                permanent.push((entry.key, magnitude));
            }
        }
        if permanent.len() > before {
            spent.push(id.clone());
        }
    }

    for id in &spent {
        actor.stats.spells.remove(id);
    }
    for (key, magnitude) in permanent {
        apply_permanently(actor, key, magnitude);
        actor.stats.magic_effects.add(key, -magnitude);
        actor.stats.active_spells.purge_effect(key.id);
        if actor.has_inventory {
            env.inventory.purge_effect(actor.handle, key.id, None);
        }
        tracing::debug!(actor = %actor.id, effect = ?key.id, magnitude, "applied permanently");
    }
    Ok(())
}

fn apply_permanently(actor: &mut Actor, key: EffectKey, magnitude: f32) {
    use EffectId::*;
    let stats = &mut actor.stats;
    match key.id {
        FortifyHealth | FortifyMagicka | FortifyFatigue => {
            let kind = match key.id {
                FortifyHealth => DynamicKind::Health,
                FortifyMagicka => DynamicKind::Magicka,
                _ => DynamicKind::Fatigue,
            };
            stats.update_dynamic(kind, |stat| stat.set_modified(stat.modified() + magnitude, 0.0));
        }
        RestoreHealth | RestoreMagicka | RestoreFatigue => {
            if let Some(kind) = key.id.restored_stat() {
                stats.update_dynamic(kind, |stat| {
                    stat.set_current(stat.current() + magnitude, false, false)
                });
            }
        }
        FortifyAttribute | DrainAttribute | DamageAttribute | RestoreAttribute => {
            let Some(attribute) = key.arg.and_then(Attribute::from_index) else {
                return;
            };
            let value = stats.attribute_mut(attribute);
            match key.id {
                FortifyAttribute => value.set_base(value.base() + magnitude),
                RestoreAttribute => value.restore_by(magnitude),
                _ => value.set_base((value.base() - magnitude).max(0.0)),
            }
        }
        FortifySkill | DrainSkill | DamageSkill | RestoreSkill => {
            let (Some(skill), Some(npc)) = (key.arg.and_then(Skill::from_index), actor.npc.as_mut())
            else {
                return;
            };
            let value = npc.skill_mut(skill);
            match key.id {
                FortifySkill => value.set_base(value.base() + magnitude),
                RestoreSkill => value.restore_by(magnitude),
                _ => value.set_base((value.base() - magnitude).max(0.0)),
            }
        }
        _ => {}
    }
}

fn purge_levitation(actor: &mut Actor, env: &mut Env<'_>) {
    if !actor.stats.magic_effects.is_active(EffectId::Levitate) {
        return;
    }
    actor.stats.active_spells.purge_effect(EffectId::Levitate);
    actor.stats.magic_effects.remove(EffectId::Levitate);
    if actor.is_player {
        env.presentation.message_box("#{sLevitateDisabled}");
    }
    tracing::warn!(actor = %actor.id, "levitation disabled, effect purged");
}

// ============================================================================
// Modifiers
// ============================================================================

fn update_dynamic_modifiers(actor: &mut Actor) {
    for kind in DynamicKind::iter() {
        let effects = &actor.stats.magic_effects;
        let modifier = effects.magnitude(EffectId::fortify_for(kind))
            - effects.magnitude(EffectId::drain_for(kind));
        let allow_negative = kind != DynamicKind::Health;
        actor
            .stats
            .update_dynamic(kind, |stat| stat.set_current_modifier(modifier, allow_negative));
    }
}

fn update_attribute_modifiers(actor: &mut Actor) {
    for attribute in Attribute::iter() {
        let effects = &actor.stats.magic_effects;
        let modifier = effects.magnitude(EffectKey::attribute(EffectId::FortifyAttribute, attribute))
            - effects.magnitude(EffectKey::attribute(EffectId::DrainAttribute, attribute))
            - effects.magnitude(EffectKey::attribute(EffectId::AbsorbAttribute, attribute));
        actor.stats.attribute_mut(attribute).set_modifier(modifier);
    }
}

fn worsen_corprus(actor: &mut Actor, env: &mut Env<'_>) {
    if actor.stats.spells.corprus_spells().next().is_none() {
        return;
    }
    let worsened = actor.stats.spells.worsen_corprus(env.world.time_stamp());
    if worsened > 0 && actor.is_player {
        env.presentation.message_box("#{sMagicCorprusWorsens}");
    }
}

/// Recomputes Fight and Flee modifiers. Returns whether a calm effect is active.
fn update_ai_settings(actor: &mut Actor) -> bool {
    use EffectId::*;
    let (frenzy, calm, demoralize, rally) = if actor.is_npc() {
        (FrenzyHumanoid, CalmHumanoid, DemoralizeHumanoid, RallyHumanoid)
    } else {
        (FrenzyCreature, CalmCreature, DemoralizeCreature, RallyCreature)
    };
    let undead = actor.is_undead();
    let stats = &mut actor.stats;
    let effects = &stats.magic_effects;

    let calm_magnitude = effects.magnitude(calm);
    let fight = effects.magnitude(frenzy) - calm_magnitude;
    let mut flee = effects.magnitude(demoralize) - effects.magnitude(rally);
    if undead {
        flee += effects.magnitude(TurnUndead);
    }

    stats.ai_setting_mut(AiSetting::Fight).modifier = fight as i32;
    stats.ai_setting_mut(AiSetting::Flee).modifier = flee as i32;
    calm_magnitude > 0.0
}

// ============================================================================
// Death
// ============================================================================

/// Credits a death caused by a damaging spell to its caster's side.
fn report_death(
    actor: &mut Actor,
    env: &mut Env<'_>,
    roster: &ActorRoster,
    outcome: &mut ModifierOutcome,
) {
    outcome.died = true;

    let killer = actor
        .stats
        .active_spells
        .iter()
        .filter(|spell| {
            spell
                .effects
                .iter()
                .any(|effect| effect.id().is_damage() && effect.magnitude > 0.0)
        })
        .map(|spell| spell.caster)
        .find(|caster| roster.is_player_side(*caster));

    tracing::debug!(actor = %actor.id, killer = ?killer, "died from magic");

    let Some(killer) = killer else {
        return;
    };
    env.mechanics.actor_killed(actor.id, roster.player);
    if let Some(crime_id) = actor.npc.as_ref().and_then(|npc| npc.crime_id) {
        env.mechanics.commit_murder(actor.id, crime_id);
    }
    if roster.is_werewolf(killer) && actor.is_npc() {
        outcome.werewolf_kill = true;
    }
    tracing::info!(victim = %actor.id, killer = %killer, "kill credited to the player");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::memory::MemoryServices;
    use crate::env::{ContentTables, EffectEntry, MagicEffectDef, MagicSchool, SpellRecord};
    use crate::magic::{MagicEffectFlags, RangeType};
    use crate::state::{
        ActiveEffect, ActiveSpellParams, AiPackage, CreatureData, CreatureFlags, CreatureKind,
        GameTime, NpcStats, ObjectHandle, SourceKind,
    };
    use crate::stats::DynamicStat;

    const PLAYER: ActorId = ActorId(0);

    fn content() -> ContentTables {
        let mut content = ContentTables::new();
        content
            .add_magic_effect(MagicEffectDef::new(
                EffectId::FortifyAttribute,
                MagicSchool::Restoration,
                1.0,
                MagicEffectFlags::APPLIED_ONCE | MagicEffectFlags::TARGET_ATTRIBUTE,
            ))
            .add_spell(SpellRecord::new(
                "blessing_of_strength",
                SpellKind::Ability,
                0,
                vec![EffectEntry::new(
                    EffectKey::attribute(EffectId::FortifyAttribute, Attribute::Strength),
                    RangeType::Caster,
                    5,
                    0,
                )],
            ));
        content
    }

    fn npc(id: i32) -> Actor {
        let mut stats = CreatureStats::default();
        stats.set_dynamic(DynamicKind::Health, DynamicStat::new(50.0));
        stats.set_dynamic(DynamicKind::Magicka, DynamicStat::new(40.0));
        stats.set_dynamic(DynamicKind::Fatigue, DynamicStat::new(100.0));
        Actor::npc(ActorId(id), ObjectHandle(id as u64), "npc", stats, NpcStats::default())
    }

    fn cast_on(actor: &mut Actor, caster: ActorId, effect: ActiveEffect) {
        actor.stats.active_spells.add(ActiveSpellParams::new(
            "spell",
            SourceKind::Spell,
            caster,
            vec![effect],
        ));
    }

    fn run(services: &mut MemoryServices, actor: &mut Actor, duration: f32) -> ModifierOutcome {
        let roster = ActorRoster::new(PLAYER).with_player_side([ActorId(7)]);
        crate::magic::update_magic_effects(actor, &services.env()).unwrap();
        calculate_creature_stat_modifiers(actor, &mut services.env(), &roster, duration).unwrap()
    }

    #[test]
    fn expiring_effect_applies_only_its_remaining_time() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut actor = npc(1);
        let mut poison = ActiveEffect::new(EffectId::Poison, 10.0, 5.0);
        poison.time_left = 0.5;
        cast_on(&mut actor, ActorId(3), poison);

        run(&mut services, &mut actor, 1.0);
        assert_eq!(actor.stats.health().current(), 45.0);
        assert!(actor.stats.active_spells.is_empty());

        run(&mut services, &mut actor, 1.0);
        assert_eq!(actor.stats.health().current(), 45.0);
    }

    #[test]
    fn drains_may_push_magicka_and_fatigue_negative() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut actor = npc(1);
        cast_on(&mut actor, ActorId(3), ActiveEffect::new(EffectId::DrainMagicka, 60.0, 30.0));
        cast_on(&mut actor, ActorId(3), ActiveEffect::new(EffectId::FortifyHealth, 20.0, 30.0));

        run(&mut services, &mut actor, 0.0);
        assert_eq!(actor.stats.magicka().current(), -20.0);
        assert_eq!(actor.stats.health().modified(), 70.0);
        assert_eq!(actor.stats.health().current(), 70.0);
    }

    #[test]
    fn undead_flee_counts_turn_undead() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut stats = CreatureStats::default();
        stats.set_dynamic(DynamicKind::Health, DynamicStat::new(50.0));
        let mut ghost = Actor::creature(
            ActorId(2),
            ObjectHandle(2),
            "ghost",
            stats,
            CreatureData::new(CreatureKind::Undead, CreatureFlags::FLIES),
        );
        for (effect, magnitude) in [
            (EffectId::DemoralizeCreature, 10.0),
            (EffectId::RallyCreature, 3.0),
            (EffectId::TurnUndead, 20.0),
            (EffectId::DemoralizeHumanoid, 50.0),
        ] {
            cast_on(&mut ghost, ActorId(3), ActiveEffect::new(effect, magnitude, 30.0));
        }

        run(&mut services, &mut ghost, 0.0);
        assert_eq!(ghost.stats.ai_setting(AiSetting::Flee).modifier, 27);
    }

    #[test]
    fn spell_kill_by_player_ally_is_credited() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut victim = npc(1);
        victim.npc.as_mut().unwrap().crime_id = Some(4);
        victim
            .stats
            .set_dynamic(DynamicKind::Health, DynamicStat::new(50.0).with_current(5.0));
        cast_on(&mut victim, ActorId(7), ActiveEffect::new(EffectId::FireDamage, 10.0, 3.0));

        let outcome = run(&mut services, &mut victim, 1.0);
        assert!(outcome.died);
        assert_eq!(services.mechanics.kills, vec![(ActorId(1), PLAYER)]);
        assert_eq!(services.mechanics.murders, vec![(ActorId(1), 4)]);
    }

    #[test]
    fn kill_by_stranger_is_not_credited() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut victim = npc(1);
        victim
            .stats
            .set_dynamic(DynamicKind::Health, DynamicStat::new(50.0).with_current(5.0));
        cast_on(&mut victim, ActorId(9), ActiveEffect::new(EffectId::FireDamage, 10.0, 3.0));

        let outcome = run(&mut services, &mut victim, 1.0);
        assert!(outcome.died);
        assert!(services.mechanics.kills.is_empty());
    }

    #[test]
    fn player_damage_is_credited_behind_a_stranger_poison() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut victim = npc(1);
        victim
            .stats
            .set_dynamic(DynamicKind::Health, DynamicStat::new(50.0).with_current(5.0));
        cast_on(&mut victim, ActorId(9), ActiveEffect::new(EffectId::Poison, 1.0, 10.0));
        cast_on(&mut victim, PLAYER, ActiveEffect::new(EffectId::FireDamage, 20.0, 3.0));

        let outcome = run(&mut services, &mut victim, 1.0);
        assert!(outcome.died);
        assert_eq!(services.mechanics.kills, vec![(ActorId(1), PLAYER)]);
    }

    #[test]
    fn werewolf_credit_follows_the_killing_caster() {
        let mut services = MemoryServices::new(content()).unwrap();
        let dying = |caster: ActorId| {
            let mut victim = npc(1);
            victim
                .stats
                .set_dynamic(DynamicKind::Health, DynamicStat::new(50.0).with_current(5.0));
            cast_on(&mut victim, caster, ActiveEffect::new(EffectId::FireDamage, 20.0, 3.0));
            victim
        };

        // The player is a werewolf but a follower landed the kill.
        let roster = ActorRoster::new(PLAYER)
            .with_player_side([ActorId(7)])
            .with_werewolves([PLAYER]);
        let mut victim = dying(ActorId(7));
        crate::magic::update_magic_effects(&mut victim, &services.env()).unwrap();
        let outcome =
            calculate_creature_stat_modifiers(&mut victim, &mut services.env(), &roster, 1.0).unwrap();
        assert!(outcome.died);
        assert!(!outcome.werewolf_kill);

        let roster = ActorRoster::new(PLAYER)
            .with_player_side([ActorId(7)])
            .with_werewolves([ActorId(7)]);
        let mut victim = dying(ActorId(7));
        crate::magic::update_magic_effects(&mut victim, &services.env()).unwrap();
        let outcome =
            calculate_creature_stat_modifiers(&mut victim, &mut services.env(), &roster, 1.0).unwrap();
        assert!(outcome.werewolf_kill);
    }

    #[test]
    fn calm_stops_combat() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut actor = npc(1);
        actor.stats.ai.stack(AiPackage::Combat { target: PLAYER });
        cast_on(&mut actor, PLAYER, ActiveEffect::new(EffectId::CalmHumanoid, 30.0, 10.0));

        run(&mut services, &mut actor, 0.0);
        assert!(!actor.stats.ai.is_in_combat());
        assert_eq!(services.mechanics.combat_stopped, vec![ActorId(1)]);
    }

    #[test]
    fn disabled_levitation_is_purged_with_a_message() {
        let mut services = MemoryServices::new(content()).unwrap();
        services.world.levitation_enabled = false;
        let mut player = npc(0).into_player();
        cast_on(&mut player, PLAYER, ActiveEffect::new(EffectId::Levitate, 10.0, 60.0));

        run(&mut services, &mut player, 0.1);
        assert!(!player.stats.magic_effects.is_active(EffectId::Levitate));
        assert!(player.stats.active_spells.is_empty());
        assert_eq!(services.presentation.messages, vec!["#{sLevitateDisabled}".to_string()]);
    }

    #[test]
    fn applied_once_ability_becomes_permanent() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut actor = npc(1);
        actor.stats.set_attribute_base(Attribute::Strength, 40.0);
        actor.stats.spells.add("blessing_of_strength");

        run(&mut services, &mut actor, 1.0);
        let strength = actor.stats.attribute(Attribute::Strength);
        assert_eq!(strength.base(), 45.0);
        assert_eq!(strength.modified(), 45.0);
        assert!(actor.stats.spells.is_empty());
    }

    #[test]
    fn corprus_worsening_notifies_the_player() {
        let mut services = MemoryServices::new(content()).unwrap();
        let mut player = npc(0).into_player();
        player.stats.spells.add_corprus("corprus", GameTime(0.0));
        services.world.time = GameTime(24.0);

        let roster = ActorRoster::new(PLAYER);
        calculate_creature_stat_modifiers(&mut player, &mut services.env(), &roster, 0.0).unwrap();
        assert_eq!(services.presentation.messages, vec!["#{sMagicCorprusWorsens}".to_string()]);
    }

    #[test]
    fn npc_skills_follow_fortify_and_drain() {
        let mut actor = npc(1);
        actor.npc.as_mut().unwrap().set_skill_base(Skill::Sneak, 30.0);
        actor
            .stats
            .magic_effects
            .add(EffectKey::skill(EffectId::FortifySkill, Skill::Sneak), 15.0);
        actor
            .stats
            .magic_effects
            .add(EffectKey::skill(EffectId::DrainSkill, Skill::Sneak), 5.0);

        calculate_npc_stat_modifiers(&mut actor);
        assert_eq!(actor.skill(Skill::Sneak), 40.0);
    }
}
