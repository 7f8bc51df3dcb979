//! Combat engagement and reach.
//!
//! # Core Functions
//!
//! - [`engage_combat`]: whether one actor starts fighting another this tick
//! - [`can_fight`]: geometric reachability of a target
//! - [`get_max_attack_distance`]: reach of the current weapon, spell or item
//! - [`hit_chance`]: attack vs. defense roll target, in percent
//!
//! Engagement returns an [`Engagement`] instead of mutating actors so the
//! registry can apply it after its pairwise pass.

pub mod engage;
pub mod reach;

pub use engage::{Engagement, engage_combat, start_combat};
pub use reach::{
    CombatRange, aggro_distance, can_fight, distance_minus_half_extents, evasion,
    fight_distance_bias, get_max_attack_distance, hit_chance, is_target_magically_hidden,
    melee_reach, projectile_reach, suggest_combat_range,
};
