//! Dynamic stats: maximum magicka, rest and fatigue regeneration.
//!
//! Maximum health and fatigue are content data (levelled on the record);
//! only maximum magicka is derived every tick. Current values are game state.
//!
//! Formulas:
//! - Magicka_max = floor((baseMult + 0.1 × FortifyMaximumMagicka) × INT)
//! - Health/hour (sleeping) = 0.1 × END
//! - Magicka/hour (sleeping) = fRestMagicMult × INT
//! - Fatigue/second = (fFatigueReturnBase + fFatigueReturnMult × (1 − encumbrance)) × fEndFatigueMult × END

use crate::env::{Env, GameSettings, SettingsError};
use crate::error::MechanicsResult;
use crate::magic::EffectId;
use crate::state::{Actor, CreatureStats};
use crate::stats::{Attribute, DynamicKind};

const SECONDS_PER_HOUR: f32 = 3600.0;

/// Multiplier fatigue applies to most success rolls.
///
/// # Errors
///
/// Returns [`SettingsError`] if `fFatigueBase` or `fFatigueMult` is missing.
pub fn fatigue_term(stats: &CreatureStats, settings: &GameSettings) -> Result<f32, SettingsError> {
    let fatigue = stats.fatigue();
    let max = fatigue.modified();
    let normalised = if max.floor() == 0.0 {
        1.0
    } else {
        (fatigue.current() / max).max(0.0)
    };
    Ok(settings.float("fFatigueBase")? - settings.float("fFatigueMult")? * (1.0 - normalised))
}

/// Recomputes maximum magicka, keeping the current/base ratio.
///
/// # Errors
///
/// Returns [`SettingsError`] if the base magicka multiplier is missing.
pub fn calculate_dynamic_stats(actor: &mut Actor, env: &Env<'_>) -> MechanicsResult<()> {
    let base_mult = if actor.is_player {
        env.float("fPCbaseMagickaMult")?
    } else {
        env.float("fNPCbaseMagickaMult")?
    };
    let stats = &mut actor.stats;
    let factor = base_mult + 0.1 * stats.magic_effects.magnitude(EffectId::FortifyMaximumMagicka);
    let intelligence = stats.attribute(Attribute::Intelligence).modified();
    let max = (factor * intelligence).floor();

    stats.update_dynamic(DynamicKind::Magicka, |magicka| {
        let ratio = if magicka.base() > 0.0 {
            magicka.current() / magicka.base()
        } else {
            0.0
        };
        magicka.set_base(max);
        magicka.set_current(max * ratio, false, true);
    });
    Ok(())
}

/// Health and magicka restored by one hour of sleep, in that order.
///
/// Stunted magicka blocks the magicka part.
///
/// # Errors
///
/// Returns [`SettingsError`] if `fRestMagicMult` is missing.
pub fn restoration_per_hour_of_sleep(actor: &Actor, env: &Env<'_>) -> MechanicsResult<(f32, f32)> {
    let stats = &actor.stats;
    let endurance = stats.attribute(Attribute::Endurance).modified();
    let intelligence = stats.attribute(Attribute::Intelligence).modified();

    let health = 0.1 * endurance;
    let magicka = if stats.magic_effects.is_active(EffectId::StuntedMagicka) {
        0.0
    } else {
        env.float("fRestMagicMult")? * intelligence
    };
    Ok((health, magicka))
}

fn normalised_encumbrance(actor: &Actor, env: &Env<'_>) -> f32 {
    if !actor.has_inventory {
        return 0.0;
    }
    let capacity = env.inventory.capacity(actor.handle);
    if capacity == 0.0 {
        1.0
    } else {
        env.inventory.encumbrance(actor.handle) / capacity
    }
}

/// Adds `seconds` worth of fatigue regeneration. Fatigue at or above its
/// base (fortified) is left alone.
fn restore_fatigue(actor: &mut Actor, env: &Env<'_>, seconds: f32) -> MechanicsResult<()> {
    let fatigue = *actor.stats.fatigue();
    if fatigue.current() >= fatigue.base() {
        return Ok(());
    }

    let encumbrance = normalised_encumbrance(actor, env).min(1.0);
    let endurance = actor.stats.attribute(Attribute::Endurance).modified();
    let per_second = (env.float("fFatigueReturnBase")?
        + env.float("fFatigueReturnMult")? * (1.0 - encumbrance))
        * env.float("fEndFatigueMult")?
        * endurance;

    actor.stats.update_dynamic(DynamicKind::Fatigue, |fatigue| {
        fatigue.set_current(fatigue.current() + per_second * seconds, false, false)
    });
    Ok(())
}

/// One hour of rest. Sleeping also restores health and magicka.
///
/// # Errors
///
/// Returns [`SettingsError`] if a restoration setting is missing.
pub fn restore_dynamic_stats(actor: &mut Actor, env: &Env<'_>, sleep: bool) -> MechanicsResult<()> {
    if actor.stats.is_dead() {
        return Ok(());
    }

    if sleep {
        let (health, magicka) = restoration_per_hour_of_sleep(actor, env)?;
        actor.stats.update_dynamic(DynamicKind::Health, |stat| {
            stat.set_current(stat.current() + health, false, false)
        });
        actor.stats.update_dynamic(DynamicKind::Magicka, |stat| {
            stat.set_current(stat.current() + magicka, false, false)
        });
    }

    restore_fatigue(actor, env, SECONDS_PER_HOUR)
}

/// Continuous fatigue regeneration over `duration` seconds.
///
/// # Errors
///
/// Returns [`SettingsError`] if a fatigue setting is missing.
pub fn calculate_restoration(actor: &mut Actor, env: &Env<'_>, duration: f32) -> MechanicsResult<()> {
    if actor.stats.is_dead() {
        return Ok(());
    }
    restore_fatigue(actor, env, duration)
}

/// Whole hours (at least one) of sleep needed to refill health and magicka.
///
/// # Errors
///
/// Returns [`SettingsError`] if `fRestMagicMult` is missing.
pub fn get_hours_to_rest(actor: &Actor, env: &Env<'_>) -> MechanicsResult<u32> {
    let (health_per_hour, magicka_per_hour) = restoration_per_hour_of_sleep(actor, env)?;
    let health = actor.stats.health();
    let magicka = actor.stats.magicka();

    let hours_for = |missing: f32, rate: f32| {
        if rate > 0.0 {
            missing.max(0.0) / rate
        } else {
            1.0
        }
    };
    let health_hours = hours_for(health.modified() - health.current(), health_per_hour);
    let magicka_hours = hours_for(magicka.modified() - magicka.current(), magicka_per_hour);

    Ok(health_hours.max(magicka_hours).max(1.0).ceil() as u32)
}
