//! Magic effect identifiers and the keys the effect snapshot is indexed by.

use bitflags::bitflags;
use strum::{EnumCount, EnumIter, IntoStaticStr};

use crate::stats::{Attribute, DynamicKind, Skill};

/// Every magic effect the engine knows about, in record-index order.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumCount, IntoStaticStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum EffectId {
    WaterBreathing = 0,
    SwiftSwim = 1,
    WaterWalking = 2,
    Shield = 3,
    FireShield = 4,
    LightningShield = 5,
    FrostShield = 6,
    Burden = 7,
    Feather = 8,
    Jump = 9,
    Levitate = 10,
    SlowFall = 11,
    Lock = 12,
    Open = 13,
    FireDamage = 14,
    ShockDamage = 15,
    FrostDamage = 16,
    DrainAttribute = 17,
    DrainHealth = 18,
    DrainMagicka = 19,
    DrainFatigue = 20,
    DrainSkill = 21,
    DamageAttribute = 22,
    DamageHealth = 23,
    DamageMagicka = 24,
    DamageFatigue = 25,
    DamageSkill = 26,
    Poison = 27,
    WeaknessToFire = 28,
    WeaknessToFrost = 29,
    WeaknessToShock = 30,
    WeaknessToMagicka = 31,
    WeaknessToCommonDisease = 32,
    WeaknessToBlightDisease = 33,
    WeaknessToCorprusDisease = 34,
    WeaknessToPoison = 35,
    WeaknessToNormalWeapons = 36,
    DisintegrateWeapon = 37,
    DisintegrateArmor = 38,
    Invisibility = 39,
    Chameleon = 40,
    Light = 41,
    Sanctuary = 42,
    NightEye = 43,
    Charm = 44,
    Paralyze = 45,
    Silence = 46,
    Blind = 47,
    Sound = 48,
    CalmHumanoid = 49,
    CalmCreature = 50,
    FrenzyHumanoid = 51,
    FrenzyCreature = 52,
    DemoralizeHumanoid = 53,
    DemoralizeCreature = 54,
    RallyHumanoid = 55,
    RallyCreature = 56,
    Dispel = 57,
    Soultrap = 58,
    Telekinesis = 59,
    Mark = 60,
    Recall = 61,
    DivineIntervention = 62,
    AlmsiviIntervention = 63,
    DetectAnimal = 64,
    DetectEnchantment = 65,
    DetectKey = 66,
    SpellAbsorption = 67,
    Reflect = 68,
    CureCommonDisease = 69,
    CureBlightDisease = 70,
    CureCorprusDisease = 71,
    CurePoison = 72,
    CureParalyzation = 73,
    RestoreAttribute = 74,
    RestoreHealth = 75,
    RestoreMagicka = 76,
    RestoreFatigue = 77,
    RestoreSkill = 78,
    FortifyAttribute = 79,
    FortifyHealth = 80,
    FortifyMagicka = 81,
    FortifyFatigue = 82,
    FortifySkill = 83,
    FortifyMaximumMagicka = 84,
    AbsorbAttribute = 85,
    AbsorbHealth = 86,
    AbsorbMagicka = 87,
    AbsorbFatigue = 88,
    AbsorbSkill = 89,
    ResistFire = 90,
    ResistFrost = 91,
    ResistShock = 92,
    ResistMagicka = 93,
    ResistCommonDisease = 94,
    ResistBlightDisease = 95,
    ResistCorprusDisease = 96,
    ResistPoison = 97,
    ResistNormalWeapons = 98,
    ResistParalysis = 99,
    RemoveCurse = 100,
    TurnUndead = 101,
    SummonScamp = 102,
    SummonClannfear = 103,
    SummonDaedroth = 104,
    SummonDremora = 105,
    SummonAncestralGhost = 106,
    SummonSkeletalMinion = 107,
    SummonBonewalker = 108,
    SummonGreaterBonewalker = 109,
    SummonBonelord = 110,
    SummonWingedTwilight = 111,
    SummonHunger = 112,
    SummonGoldenSaint = 113,
    SummonFlameAtronach = 114,
    SummonFrostAtronach = 115,
    SummonStormAtronach = 116,
    FortifyAttack = 117,
    CommandCreature = 118,
    CommandHumanoid = 119,
    BoundDagger = 120,
    BoundLongsword = 121,
    BoundMace = 122,
    BoundBattleAxe = 123,
    BoundSpear = 124,
    BoundLongbow = 125,
    ExtraSpell = 126,
    BoundCuirass = 127,
    BoundHelm = 128,
    BoundBoots = 129,
    BoundShield = 130,
    BoundGloves = 131,
    Corprus = 132,
    Vampirism = 133,
    SummonCenturionSphere = 134,
    SunDamage = 135,
    StuntedMagicka = 136,
    SummonFabricant = 137,
    SummonWolf = 138,
    SummonBear = 139,
    SummonBonewolf = 140,
    SummonCreature04 = 141,
    SummonCreature05 = 142,
}

impl EffectId {
    #[inline]
    pub const fn index(self) -> u16 {
        self as u16
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Effects that conjure a creature for their caster.
    pub const fn is_summon(self) -> bool {
        use EffectId::*;
        matches!(
            self,
            SummonScamp
                | SummonClannfear
                | SummonDaedroth
                | SummonDremora
                | SummonAncestralGhost
                | SummonSkeletalMinion
                | SummonBonewalker
                | SummonGreaterBonewalker
                | SummonBonelord
                | SummonWingedTwilight
                | SummonHunger
                | SummonGoldenSaint
                | SummonFlameAtronach
                | SummonFrostAtronach
                | SummonStormAtronach
                | SummonCenturionSphere
                | SummonFabricant
                | SummonWolf
                | SummonBear
                | SummonBonewolf
                | SummonCreature04
                | SummonCreature05
        )
    }

    /// Bound weapons: dagger through longbow.
    pub const fn is_bound_weapon(self) -> bool {
        let index = self.index();
        index >= EffectId::BoundDagger.index() && index <= EffectId::BoundLongbow.index()
    }

    /// Every bound item effect, weapons and armour alike.
    pub const fn is_bound_item(self) -> bool {
        use EffectId::*;
        self.is_bound_weapon()
            || matches!(
                self,
                BoundCuirass | BoundHelm | BoundBoots | BoundShield | BoundGloves
            )
    }

    /// Effects whose key carries an attribute argument.
    pub const fn targets_attribute(self) -> bool {
        use EffectId::*;
        matches!(
            self,
            DrainAttribute | DamageAttribute | RestoreAttribute | FortifyAttribute | AbsorbAttribute
        )
    }

    /// Effects whose key carries a skill argument.
    pub const fn targets_skill(self) -> bool {
        use EffectId::*;
        matches!(
            self,
            DrainSkill | DamageSkill | RestoreSkill | FortifySkill | AbsorbSkill
        )
    }

    /// Effects that deal direct health damage and therefore credit a kill to their caster.
    pub const fn is_damage(self) -> bool {
        use EffectId::*;
        matches!(
            self,
            FireDamage | ShockDamage | FrostDamage | Poison | SunDamage | DamageHealth | AbsorbHealth
        )
    }

    /// Effects with a lasting per-second impact that must be integrated over elapsed time.
    pub const fn is_tickable(self) -> bool {
        use EffectId::*;
        matches!(
            self,
            FireDamage
                | ShockDamage
                | FrostDamage
                | Poison
                | SunDamage
                | DamageHealth
                | DamageMagicka
                | DamageFatigue
                | DamageAttribute
                | DamageSkill
                | RestoreHealth
                | RestoreMagicka
                | RestoreFatigue
                | RestoreAttribute
                | RestoreSkill
                | AbsorbHealth
                | AbsorbMagicka
                | AbsorbFatigue
        )
    }

    pub const fn restore_for(kind: DynamicKind) -> Self {
        match kind {
            DynamicKind::Health => EffectId::RestoreHealth,
            DynamicKind::Magicka => EffectId::RestoreMagicka,
            DynamicKind::Fatigue => EffectId::RestoreFatigue,
        }
    }

    pub const fn fortify_for(kind: DynamicKind) -> Self {
        match kind {
            DynamicKind::Health => EffectId::FortifyHealth,
            DynamicKind::Magicka => EffectId::FortifyMagicka,
            DynamicKind::Fatigue => EffectId::FortifyFatigue,
        }
    }

    pub const fn drain_for(kind: DynamicKind) -> Self {
        match kind {
            DynamicKind::Health => EffectId::DrainHealth,
            DynamicKind::Magicka => EffectId::DrainMagicka,
            DynamicKind::Fatigue => EffectId::DrainFatigue,
        }
    }

    /// Dynamic stat restored by a `Restore*` effect.
    pub const fn restored_stat(self) -> Option<DynamicKind> {
        match self {
            EffectId::RestoreHealth => Some(DynamicKind::Health),
            EffectId::RestoreMagicka => Some(DynamicKind::Magicka),
            EffectId::RestoreFatigue => Some(DynamicKind::Fatigue),
            _ => None,
        }
    }
}

/// Key of one entry in a [`MagicEffects`](super::MagicEffects) snapshot.
///
/// `arg` carries the attribute or skill index for effects that target one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectKey {
    pub id: EffectId,
    pub arg: Option<u8>,
}

impl EffectKey {
    pub const fn new(id: EffectId) -> Self {
        Self { id, arg: None }
    }

    pub const fn with_arg(id: EffectId, arg: u8) -> Self {
        Self { id, arg: Some(arg) }
    }

    pub const fn attribute(id: EffectId, attribute: Attribute) -> Self {
        Self::with_arg(id, attribute as u8)
    }

    pub const fn skill(id: EffectId, skill: Skill) -> Self {
        Self::with_arg(id, skill as u8)
    }
}

impl From<EffectId> for EffectKey {
    fn from(id: EffectId) -> Self {
        Self::new(id)
    }
}

/// Spell range of a single effect entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RangeType {
    /// Applied to the caster.
    Caster,
    Touch,
    Target,
}

bitflags! {
    /// Union of the ranges present in an effect list.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct RangeTypes: u8 {
        const CASTER = 0b001;
        const TOUCH = 0b010;
        const TARGET = 0b100;
    }
}

impl From<RangeType> for RangeTypes {
    fn from(range: RangeType) -> Self {
        match range {
            RangeType::Caster => RangeTypes::CASTER,
            RangeType::Touch => RangeTypes::TOUCH,
            RangeType::Target => RangeTypes::TARGET,
        }
    }
}

bitflags! {
    /// Static properties of a magic effect definition.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct MagicEffectFlags: u16 {
        const HARMFUL = 1 << 0;
        const NO_MAGNITUDE = 1 << 1;
        const NO_DURATION = 1 << 2;
        const APPLIED_ONCE = 1 << 3;
        const TARGET_ATTRIBUTE = 1 << 4;
        const TARGET_SKILL = 1 << 5;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn summon_and_bound_sets_have_expected_sizes() {
        assert_eq!(EffectId::iter().filter(|e| e.is_summon()).count(), 22);
        assert_eq!(EffectId::iter().filter(|e| e.is_bound_item()).count(), 11);
        assert_eq!(EffectId::iter().filter(|e| e.is_bound_weapon()).count(), 6);
    }

    #[test]
    fn discriminants_follow_record_order() {
        assert_eq!(EffectId::COUNT, 143);
        for (index, effect) in EffectId::iter().enumerate() {
            assert_eq!(effect.index() as usize, index);
        }
    }
}
