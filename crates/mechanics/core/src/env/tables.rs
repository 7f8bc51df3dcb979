//! Effect-to-record lookup tables built once from game settings.

use std::collections::BTreeMap;

use crate::env::{GameSettings, SettingsError};
use crate::magic::EffectId;
use crate::state::RefId;

/// Items conjured by one bound-item effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundItemIds {
    pub primary: RefId,
    /// Second item conjured alongside (the right gauntlet of bound gloves).
    pub secondary: Option<RefId>,
}

const BOUND_ITEM_SETTINGS: [(EffectId, &str, Option<&str>); 11] = [
    (EffectId::BoundBattleAxe, "sMagicBoundBattleAxeID", None),
    (EffectId::BoundBoots, "sMagicBoundBootsID", None),
    (EffectId::BoundCuirass, "sMagicBoundCuirassID", None),
    (EffectId::BoundDagger, "sMagicBoundDaggerID", None),
    (
        EffectId::BoundGloves,
        "sMagicBoundLeftGauntletID",
        Some("sMagicBoundRightGauntletID"),
    ),
    (EffectId::BoundHelm, "sMagicBoundHelmID", None),
    (EffectId::BoundLongbow, "sMagicBoundLongbowID", None),
    (EffectId::BoundLongsword, "sMagicBoundLongswordID", None),
    (EffectId::BoundMace, "sMagicBoundMaceID", None),
    (EffectId::BoundShield, "sMagicBoundShieldID", None),
    (EffectId::BoundSpear, "sMagicBoundSpearID", None),
];

const SUMMON_SETTINGS: [(EffectId, &str); 22] = [
    (EffectId::SummonScamp, "sMagicScampID"),
    (EffectId::SummonClannfear, "sMagicClannfearID"),
    (EffectId::SummonDaedroth, "sMagicDaedrothID"),
    (EffectId::SummonDremora, "sMagicDremoraID"),
    (EffectId::SummonAncestralGhost, "sMagicAncestralGhostID"),
    (EffectId::SummonSkeletalMinion, "sMagicSkeletalMinionID"),
    (EffectId::SummonBonewalker, "sMagicBonewalkerID"),
    (EffectId::SummonGreaterBonewalker, "sMagicGreaterBonewalkerID"),
    (EffectId::SummonBonelord, "sMagicBonelordID"),
    (EffectId::SummonWingedTwilight, "sMagicWingedTwilightID"),
    (EffectId::SummonHunger, "sMagicHungerID"),
    (EffectId::SummonGoldenSaint, "sMagicGoldenSaintID"),
    (EffectId::SummonFlameAtronach, "sMagicFlameAtronachID"),
    (EffectId::SummonFrostAtronach, "sMagicFrostAtronachID"),
    (EffectId::SummonStormAtronach, "sMagicStormAtronachID"),
    (EffectId::SummonCenturionSphere, "sMagicCenturionSphereID"),
    (EffectId::SummonFabricant, "sMagicFabricantID"),
    (EffectId::SummonWolf, "sMagicWolfID"),
    (EffectId::SummonBear, "sMagicBearID"),
    (EffectId::SummonBonewolf, "sMagicBonewolfID"),
    (EffectId::SummonCreature04, "sMagicCreature04ID"),
    (EffectId::SummonCreature05, "sMagicCreature05ID"),
];

/// Immutable bound-item and summon-creature tables.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MechanicsTables {
    bound_items: BTreeMap<EffectId, BoundItemIds>,
    summons: BTreeMap<EffectId, RefId>,
}

impl MechanicsTables {
    /// Resolves every table entry from `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if a referenced setting is missing or not a string.
    pub fn from_settings(settings: &GameSettings) -> Result<Self, SettingsError> {
        let mut bound_items = BTreeMap::new();
        for (effect, primary, secondary) in BOUND_ITEM_SETTINGS {
            let secondary = match secondary {
                Some(name) => Some(RefId::new(settings.string(name)?)),
                None => None,
            };
            bound_items.insert(
                effect,
                BoundItemIds {
                    primary: RefId::new(settings.string(primary)?),
                    secondary,
                },
            );
        }

        let mut summons = BTreeMap::new();
        for (effect, name) in SUMMON_SETTINGS {
            summons.insert(effect, RefId::new(settings.string(name)?));
        }

        Ok(Self {
            bound_items,
            summons,
        })
    }

    pub fn bound_item(&self, effect: EffectId) -> Option<&BoundItemIds> {
        self.bound_items.get(&effect)
    }

    pub fn bound_items(&self) -> impl Iterator<Item = (EffectId, &BoundItemIds)> {
        self.bound_items.iter().map(|(effect, ids)| (*effect, ids))
    }

    /// Creature conjured by `effect`; `None` when unmapped or mapped to an empty id.
    pub fn summon_creature(&self, effect: EffectId) -> Option<&RefId> {
        self.summons.get(&effect).filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_every_entry_from_defaults() {
        let tables = MechanicsTables::from_settings(&GameSettings::with_defaults()).unwrap();
        assert_eq!(tables.bound_items().count(), 11);

        let gloves = tables.bound_item(EffectId::BoundGloves).unwrap();
        assert_eq!(gloves.primary.as_str(), "bound_gauntlet_left");
        assert_eq!(
            gloves.secondary.as_ref().map(RefId::as_str),
            Some("bound_gauntlet_right")
        );

        assert_eq!(
            tables.summon_creature(EffectId::SummonScamp).map(RefId::as_str),
            Some("scamp_summon")
        );
    }

    #[test]
    fn empty_summon_ids_resolve_to_none() {
        let tables = MechanicsTables::from_settings(&GameSettings::with_defaults()).unwrap();
        assert!(tables.summon_creature(EffectId::SummonCreature04).is_none());
    }

    #[test]
    fn missing_setting_fails_the_build() {
        let settings = GameSettings::new();
        assert!(MechanicsTables::from_settings(&settings).is_err());
    }
}
