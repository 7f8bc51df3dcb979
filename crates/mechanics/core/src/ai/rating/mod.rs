//! Numeric ratings of the options a fighting actor has.
//!
//! Ratings are unitless and only compared with each other. Positive means
//! worth doing; 0 means useless or impossible. `enemy` is `None` when the
//! option is rated without a target (potions).

mod effect;
mod magic;
mod weapon;

pub use effect::{rate_effect, rate_effects};
pub use magic::{rate_magic_item, rate_potion, rate_spell, vanilla_rate_spell};
pub use weapon::{AmmoRatings, BestAmmo, rate_ammo, rate_weapon, vanilla_rate_weapon};
