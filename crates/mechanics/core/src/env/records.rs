//! Static content records consumed by the mechanics.
//!
//! # Design: Base + Kind Pattern
//!
//! [`ItemRecord`] carries the fields every item shares; `kind` holds the
//! type-specific data (weapon damage table, armour slot, potion effects).

use crate::magic::{EffectId, EffectKey, MagicEffectFlags, RangeType, RangeTypes};
use crate::state::RefId;
use crate::stats::Skill;

// ============================================================================
// Effects
// ============================================================================

/// One effect entry of a spell, enchantment or potion.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectEntry {
    pub key: EffectKey,
    pub range: RangeType,
    pub area: i32,
    /// Seconds.
    pub duration: i32,
    pub magnitude_min: i32,
    pub magnitude_max: i32,
}

impl EffectEntry {
    pub fn new(key: impl Into<EffectKey>, range: RangeType, magnitude: i32, duration: i32) -> Self {
        Self {
            key: key.into(),
            range,
            area: 0,
            duration,
            magnitude_min: magnitude,
            magnitude_max: magnitude,
        }
    }

    pub fn with_magnitude(mut self, min: i32, max: i32) -> Self {
        self.magnitude_min = min;
        self.magnitude_max = max;
        self
    }

    pub fn with_area(mut self, area: i32) -> Self {
        self.area = area;
        self
    }

    pub fn id(&self) -> EffectId {
        self.key.id
    }

    pub fn average_magnitude(&self) -> f32 {
        (self.magnitude_min + self.magnitude_max) as f32 / 2.0
    }
}

/// Union of the ranges used by `effects`.
pub fn range_types(effects: &[EffectEntry]) -> RangeTypes {
    effects
        .iter()
        .fold(RangeTypes::empty(), |types, effect| types | effect.range.into())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MagicSchool {
    Alteration,
    Conjuration,
    Destruction,
    Illusion,
    Mysticism,
    Restoration,
}

impl MagicSchool {
    pub const fn skill(self) -> Skill {
        match self {
            MagicSchool::Alteration => Skill::Alteration,
            MagicSchool::Conjuration => Skill::Conjuration,
            MagicSchool::Destruction => Skill::Destruction,
            MagicSchool::Illusion => Skill::Illusion,
            MagicSchool::Mysticism => Skill::Mysticism,
            MagicSchool::Restoration => Skill::Restoration,
        }
    }
}

/// Static definition of a magic effect.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MagicEffectDef {
    pub id: EffectId,
    pub school: MagicSchool,
    pub base_cost: f32,
    pub flags: MagicEffectFlags,
}

impl MagicEffectDef {
    pub fn new(id: EffectId, school: MagicSchool, base_cost: f32, flags: MagicEffectFlags) -> Self {
        Self {
            id,
            school,
            base_cost,
            flags,
        }
    }

    pub fn is_harmful(&self) -> bool {
        self.flags.contains(MagicEffectFlags::HARMFUL)
    }

    pub fn has_magnitude(&self) -> bool {
        !self.flags.contains(MagicEffectFlags::NO_MAGNITUDE)
    }

    pub fn has_duration(&self) -> bool {
        !self.flags.contains(MagicEffectFlags::NO_DURATION)
    }

    pub fn is_applied_once(&self) -> bool {
        self.flags.contains(MagicEffectFlags::APPLIED_ONCE)
    }
}

// ============================================================================
// Spells and enchantments
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SpellKind {
    Spell,
    Ability,
    Blight,
    Disease,
    Curse,
    Power,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpellRecord {
    pub id: RefId,
    pub kind: SpellKind,
    pub cost: i32,
    /// Cost is derived from the effect list rather than `cost`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub auto_calc: bool,
    /// Always succeeds (racial and birthsign spells).
    #[cfg_attr(feature = "serde", serde(default))]
    pub always_succeeds: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub corprus: bool,
    pub effects: Vec<EffectEntry>,
}

impl SpellRecord {
    pub fn new(id: impl Into<RefId>, kind: SpellKind, cost: i32, effects: Vec<EffectEntry>) -> Self {
        Self {
            id: id.into(),
            kind,
            cost,
            auto_calc: false,
            always_succeeds: false,
            corprus: false,
            effects,
        }
    }

    /// Abilities, diseases and curses apply permanently while known.
    pub fn is_passive(&self) -> bool {
        matches!(
            self.kind,
            SpellKind::Ability | SpellKind::Blight | SpellKind::Disease | SpellKind::Curse
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EnchantmentKind {
    CastOnce,
    WhenStrikes,
    WhenUsed,
    ConstantEffect,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnchantmentRecord {
    pub id: RefId,
    pub kind: EnchantmentKind,
    pub cost: i32,
    pub charge: i32,
    pub effects: Vec<EffectEntry>,
}

impl EnchantmentRecord {
    pub fn new(
        id: impl Into<RefId>,
        kind: EnchantmentKind,
        cost: i32,
        charge: i32,
        effects: Vec<EffectEntry>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            cost,
            charge,
            effects,
        }
    }
}

// ============================================================================
// Items
// ============================================================================

/// Inventory equipment slots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EquipmentSlot {
    Helmet,
    Cuirass,
    Greaves,
    LeftPauldron,
    RightPauldron,
    LeftGauntlet,
    RightGauntlet,
    Boots,
    Shirt,
    Pants,
    Skirt,
    Robe,
    LeftRing,
    RightRing,
    Amulet,
    Belt,
    CarriedRight,
    CarriedLeft,
    Ammunition,
}

impl EquipmentSlot {
    /// Slots checked when deciding whether an enemy wears armour.
    pub const ARMOR: [EquipmentSlot; 9] = [
        EquipmentSlot::CarriedLeft,
        EquipmentSlot::Cuirass,
        EquipmentSlot::LeftPauldron,
        EquipmentSlot::RightPauldron,
        EquipmentSlot::LeftGauntlet,
        EquipmentSlot::RightGauntlet,
        EquipmentSlot::Helmet,
        EquipmentSlot::Greaves,
        EquipmentSlot::Boots,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WeaponKind {
    ShortBladeOneHand,
    LongBladeOneHand,
    LongBladeTwoHand,
    BluntOneHand,
    BluntTwoClose,
    BluntTwoWide,
    SpearTwoWide,
    AxeOneHand,
    AxeTwoHand,
    MarksmanBow,
    MarksmanCrossbow,
    MarksmanThrown,
    Arrow,
    Bolt,
}

/// Broad weapon class deciding rating and reach rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WeaponClass {
    Melee,
    Ranged,
    Thrown,
    Ammo,
}

impl WeaponKind {
    pub const fn class(self) -> WeaponClass {
        match self {
            WeaponKind::MarksmanBow | WeaponKind::MarksmanCrossbow => WeaponClass::Ranged,
            WeaponKind::MarksmanThrown => WeaponClass::Thrown,
            WeaponKind::Arrow | WeaponKind::Bolt => WeaponClass::Ammo,
            _ => WeaponClass::Melee,
        }
    }

    pub const fn skill(self) -> Skill {
        match self {
            WeaponKind::ShortBladeOneHand => Skill::ShortBlade,
            WeaponKind::LongBladeOneHand | WeaponKind::LongBladeTwoHand => Skill::LongBlade,
            WeaponKind::BluntOneHand | WeaponKind::BluntTwoClose | WeaponKind::BluntTwoWide => {
                Skill::BluntWeapon
            }
            WeaponKind::SpearTwoWide => Skill::Spear,
            WeaponKind::AxeOneHand | WeaponKind::AxeTwoHand => Skill::Axe,
            WeaponKind::MarksmanBow
            | WeaponKind::MarksmanCrossbow
            | WeaponKind::MarksmanThrown
            | WeaponKind::Arrow
            | WeaponKind::Bolt => Skill::Marksman,
        }
    }

    /// Ammunition a launcher needs.
    pub const fn ammo(self) -> Option<WeaponKind> {
        match self {
            WeaponKind::MarksmanBow => Some(WeaponKind::Arrow),
            WeaponKind::MarksmanCrossbow => Some(WeaponKind::Bolt),
            _ => None,
        }
    }

    pub const fn is_two_handed(self) -> bool {
        matches!(
            self,
            WeaponKind::LongBladeTwoHand
                | WeaponKind::BluntTwoClose
                | WeaponKind::BluntTwoWide
                | WeaponKind::SpearTwoWide
                | WeaponKind::AxeTwoHand
                | WeaponKind::MarksmanBow
                | WeaponKind::MarksmanCrossbow
        )
    }
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct WeaponFlags: u8 {
        const MAGICAL = 1 << 0;
        const SILVER = 1 << 1;
    }
}

/// Weapon-specific data. Damage pairs are `[min, max]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WeaponData {
    pub kind: WeaponKind,
    pub chop: [i32; 2],
    pub slash: [i32; 2],
    pub thrust: [i32; 2],
    pub speed: f32,
    pub reach: f32,
    /// Maximum condition; 0 for items without condition (ammo, thrown).
    pub health: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: WeaponFlags,
}

impl WeaponData {
    pub fn new(kind: WeaponKind, chop: [i32; 2], slash: [i32; 2], thrust: [i32; 2]) -> Self {
        Self {
            kind,
            chop,
            slash,
            thrust,
            speed: 1.0,
            reach: 1.0,
            health: 0,
            flags: WeaponFlags::empty(),
        }
    }

    pub fn has_health(&self) -> bool {
        self.health > 0 && !matches!(self.kind.class(), WeaponClass::Thrown | WeaponClass::Ammo)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArmorData {
    pub slot: EquipmentSlot,
    pub rating: f32,
    pub health: i32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ItemKind {
    Weapon(WeaponData),
    Armor(ArmorData),
    Clothing { slot: EquipmentSlot },
    Potion { effects: Vec<EffectEntry> },
    Ingredient,
    Light,
    Book,
    Misc,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemRecord {
    pub id: RefId,
    pub kind: ItemKind,
    pub weight: f32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub enchantment: Option<RefId>,
}

impl ItemRecord {
    pub fn new(id: impl Into<RefId>, kind: ItemKind, weight: f32) -> Self {
        Self {
            id: id.into(),
            kind,
            weight,
            enchantment: None,
        }
    }

    pub fn with_enchantment(mut self, enchantment: impl Into<RefId>) -> Self {
        self.enchantment = Some(enchantment.into());
        self
    }

    pub fn weapon(&self) -> Option<&WeaponData> {
        match &self.kind {
            ItemKind::Weapon(data) => Some(data),
            _ => None,
        }
    }

    /// Slots this item can occupy.
    pub fn equipment_slots(&self) -> Vec<EquipmentSlot> {
        match &self.kind {
            ItemKind::Weapon(data) => match data.kind.class() {
                WeaponClass::Ammo => vec![EquipmentSlot::Ammunition],
                _ => vec![EquipmentSlot::CarriedRight],
            },
            ItemKind::Armor(data) => vec![data.slot],
            ItemKind::Clothing { slot } => vec![*slot],
            ItemKind::Light => vec![EquipmentSlot::CarriedLeft],
            _ => Vec::new(),
        }
    }

    /// Skill governing use of this item, if any.
    pub fn equipment_skill(&self) -> Option<Skill> {
        self.weapon().map(|weapon| weapon.kind.skill())
    }
}

// ============================================================================
// Races
// ============================================================================

#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RaceRecord {
    pub id: RefId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub beast: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub powers: Vec<RefId>,
}
