//! Actor statistics: value types and the per-tick calculators.
//!
//! # Layers
//!
//! 1. **Values** ([`value`]): base/modifier/current containers.
//! 2. **Dynamic stats** ([`dynamic`]): maximum magicka, rest and regeneration.
//! 3. **Modifiers** ([`modifiers`]): magic effect snapshot → stat modifiers,
//!    AI settings, death detection, bound items and summons.
//!
//! Calculators are free functions over an [`Actor`](crate::state::Actor) and
//! the injected [`Env`](crate::env::Env), never methods on stored state.

mod bound;
pub mod dynamic;
pub mod modifiers;
pub mod value;

pub use bound::sync_bound_items;
pub use dynamic::{
    calculate_dynamic_stats, calculate_restoration, fatigue_term, get_hours_to_rest,
    restoration_per_hour_of_sleep, restore_dynamic_stats,
};
pub use modifiers::{
    calculate_creature_stat_modifiers, calculate_npc_stat_modifiers, ActorRoster, ModifierOutcome,
};
pub use value::{AiSettingValue, AttributeValue, DynamicStat, Stat};

use strum::{EnumCount, EnumIter, IntoStaticStr};

/// The eight primary attributes, in record order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumCount, IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Attribute {
    Strength = 0,
    Intelligence = 1,
    Willpower = 2,
    Agility = 3,
    Speed = 4,
    Endurance = 5,
    Personality = 6,
    Luck = 7,
}

impl Attribute {
    pub fn from_index(index: u8) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().nth(index as usize)
    }

    /// Weight of damaging this attribute on an enemy, used by effect rating.
    pub const fn combat_priority(self) -> f32 {
        match self {
            Attribute::Strength => 1.0,
            Attribute::Intelligence => 0.5,
            Attribute::Willpower => 0.6,
            Attribute::Agility => 0.7,
            Attribute::Speed => 0.5,
            Attribute::Endurance => 0.8,
            Attribute::Personality => 0.7,
            Attribute::Luck => 0.3,
        }
    }
}

/// The 27 NPC skills, in record order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumCount, IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Skill {
    Block = 0,
    Armorer = 1,
    MediumArmor = 2,
    HeavyArmor = 3,
    BluntWeapon = 4,
    LongBlade = 5,
    Axe = 6,
    Spear = 7,
    Athletics = 8,
    Enchant = 9,
    Destruction = 10,
    Alteration = 11,
    Illusion = 12,
    Conjuration = 13,
    Mysticism = 14,
    Restoration = 15,
    Alchemy = 16,
    Unarmored = 17,
    Security = 18,
    Sneak = 19,
    Acrobatics = 20,
    LightArmor = 21,
    ShortBlade = 22,
    Marksman = 23,
    Mercantile = 24,
    Speechcraft = 25,
    HandToHand = 26,
}

impl Skill {
    pub fn from_index(index: u8) -> Option<Self> {
        use strum::IntoEnumIterator;
        Self::iter().nth(index as usize)
    }

    pub const fn specialization(self) -> Specialization {
        use Skill::*;
        match self {
            Armorer | Athletics | Axe | Block | BluntWeapon | HeavyArmor | LongBlade
            | MediumArmor | Spear => Specialization::Combat,
            Alchemy | Alteration | Conjuration | Destruction | Enchant | Illusion | Mysticism
            | Restoration | Unarmored => Specialization::Magic,
            Security | Sneak | Acrobatics | LightArmor | ShortBlade | Marksman | Mercantile
            | Speechcraft | HandToHand => Specialization::Stealth,
        }
    }
}

/// Skill specialization; creatures have one value per specialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Specialization {
    Combat,
    Magic,
    Stealth,
}

/// Health, magicka, fatigue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumCount, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DynamicKind {
    Health,
    Magicka,
    Fatigue,
}

/// AI disposition settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, EnumCount, IntoStaticStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AiSetting {
    Hello,
    Fight,
    Flee,
    Alarm,
}
