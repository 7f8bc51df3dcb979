//! Named game-setting constants.
//!
//! Settings are loaded once and never change during a session. Rules look
//! values up by name; a missing or mistyped setting is a content error.

use std::collections::BTreeMap;

use crate::env::SettingsError;

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum GameSettingValue {
    Int(i32),
    Float(f32),
    String(String),
}

/// Immutable name-keyed table of game settings.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct GameSettings {
    values: BTreeMap<String, GameSettingValue>,
}

impl GameSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Vanilla values of every setting the mechanics read.
    pub fn with_defaults() -> Self {
        let mut settings = Self::new();
        for (name, value) in DEFAULT_FLOATS {
            settings.set(*name, GameSettingValue::Float(*value));
        }
        for (name, value) in DEFAULT_INTS {
            settings.set(*name, GameSettingValue::Int(*value));
        }
        for (name, value) in DEFAULT_STRINGS {
            settings.set(*name, GameSettingValue::String((*value).to_string()));
        }
        settings
    }

    pub fn set(&mut self, name: impl Into<String>, value: GameSettingValue) {
        self.values.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: GameSettingValue) -> Self {
        self.set(name, value);
        self
    }

    /// Overlays `other` on top of this table.
    pub fn merge(&mut self, other: GameSettings) {
        self.values.extend(other.values);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn lookup(&self, name: &str) -> Result<&GameSettingValue, SettingsError> {
        self.values
            .get(name)
            .ok_or_else(|| SettingsError::Missing(name.to_string()))
    }

    /// Float setting. Integer settings are widened.
    pub fn float(&self, name: &str) -> Result<f32, SettingsError> {
        match self.lookup(name)? {
            GameSettingValue::Float(value) => Ok(*value),
            GameSettingValue::Int(value) => Ok(*value as f32),
            GameSettingValue::String(_) => Err(SettingsError::WrongType {
                name: name.to_string(),
                expected: "float",
            }),
        }
    }

    pub fn int(&self, name: &str) -> Result<i32, SettingsError> {
        match self.lookup(name)? {
            GameSettingValue::Int(value) => Ok(*value),
            _ => Err(SettingsError::WrongType {
                name: name.to_string(),
                expected: "int",
            }),
        }
    }

    pub fn string(&self, name: &str) -> Result<&str, SettingsError> {
        match self.lookup(name)? {
            GameSettingValue::String(value) => Ok(value),
            _ => Err(SettingsError::WrongType {
                name: name.to_string(),
                expected: "string",
            }),
        }
    }
}

const DEFAULT_FLOATS: &[(&str, f32)] = &[
    ("fPCbaseMagickaMult", 1.0),
    ("fNPCbaseMagickaMult", 2.0),
    ("fRestMagicMult", 0.15),
    ("fFatigueReturnBase", 2.5),
    ("fFatigueReturnMult", 0.02),
    ("fEndFatigueMult", 0.04),
    ("fFatigueBase", 1.25),
    ("fFatigueMult", 0.5),
    ("fEffectCostMult", 1.0),
    ("fCombatDistance", 128.0),
    ("fHandToHandReach", 1.0),
    ("fProjectileMaxSpeed", 3000.0),
    ("fFightDistanceMultiplier", 0.005),
    ("fAIFleeHealthMult", 7.0),
    ("fAIFleeFleeMult", 0.3),
    ("fAIMeleeWeaponMult", 2.0),
    ("fAIRangeMeleeWeaponMult", 5.0),
    ("fAIMeleeArmorMult", 1.0),
    ("fAIMagicSpellMult", 15.0),
    ("fAIRangeMagicSpellMult", 25.0),
    ("fAlarmRadius", 2000.0),
    ("fDamageStrengthBase", 0.5),
    ("fDamageStrengthMult", 0.1),
    ("fCombatInvisoMult", 0.2),
    ("fWereWolfSilverWeaponDamageMult", 1.5),
    ("fSwimHeightScale", 0.9),
    ("fHoldBreathTime", 20.0),
    ("fSuffocationDamage", 3.0),
    ("fMaxHeadTrackDistance", 400.0),
    ("fInteriorHeadTrackMult", 0.5),
];

const DEFAULT_INTS: &[(&str, i32)] = &[
    ("iFightDistanceBase", 10),
    ("iWereWolfFleeMod", 100),
    ("iWereWolfLevelToAttack", 20),
    ("iCrimeThreshold", 1000),
];

const DEFAULT_STRINGS: &[(&str, &str)] = &[
    ("sMagicBoundDaggerID", "bound_dagger"),
    ("sMagicBoundLongswordID", "bound_longsword"),
    ("sMagicBoundMaceID", "bound_mace"),
    ("sMagicBoundBattleAxeID", "bound_battle_axe"),
    ("sMagicBoundSpearID", "bound_spear"),
    ("sMagicBoundLongbowID", "bound_longbow"),
    ("sMagicBoundCuirassID", "bound_cuirass"),
    ("sMagicBoundHelmID", "bound_helm"),
    ("sMagicBoundBootsID", "bound_boots"),
    ("sMagicBoundShieldID", "bound_shield"),
    ("sMagicBoundLeftGauntletID", "bound_gauntlet_left"),
    ("sMagicBoundRightGauntletID", "bound_gauntlet_right"),
    ("sMagicScampID", "scamp_summon"),
    ("sMagicClannfearID", "clannfear_summon"),
    ("sMagicDaedrothID", "daedroth_summon"),
    ("sMagicDremoraID", "dremora_summon"),
    ("sMagicAncestralGhostID", "ancestor_ghost_summon"),
    ("sMagicSkeletalMinionID", "skeleton_summon"),
    ("sMagicBonewalkerID", "bonewalker_summon"),
    ("sMagicGreaterBonewalkerID", "bonewalker_greater_summ"),
    ("sMagicBonelordID", "bonelord_summon"),
    ("sMagicWingedTwilightID", "winged twilight_summon"),
    ("sMagicHungerID", "hunger_summon"),
    ("sMagicGoldenSaintID", "golden saint_summon"),
    ("sMagicFlameAtronachID", "atronach_flame_summon"),
    ("sMagicFrostAtronachID", "atronach_frost_summon"),
    ("sMagicStormAtronachID", "atronach_storm_summon"),
    ("sMagicCenturionSphereID", "centurion_sphere_summon"),
    ("sMagicFabricantID", "fabricant_summon"),
    ("sMagicWolfID", "BM_wolf_grey_summon"),
    ("sMagicBearID", "BM_bear_black_summon"),
    ("sMagicBonewolfID", "BM_wolf_bone_summon"),
    ("sMagicCreature04ID", ""),
    ("sMagicCreature05ID", ""),
];
