//! Magic effects: identifiers, the per-actor snapshot and the rules that
//! read it (aggregation, spell cost, success chance, resistance).
mod aggregate;
mod cost;
mod effect;
mod resist;
mod snapshot;

pub use aggregate::{collect_magic_effects, update_magic_effects};
pub use cost::{
    calc_effect_cost, calc_spell_cost, effective_enchantment_cast_cost, spell_base_success_chance,
    spell_success_chance,
};
pub use effect::{EffectId, EffectKey, MagicEffectFlags, RangeType, RangeTypes};
pub use resist::{effect_resistance, resistance_effect, weakness_effect};
pub use snapshot::{EffectParams, MagicEffects};
