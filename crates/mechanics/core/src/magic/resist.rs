//! Which effect resists or amplifies which.

use crate::magic::{EffectId, MagicEffects};

/// Effect that resists `effect`, if any.
pub const fn resistance_effect(effect: EffectId) -> Option<EffectId> {
    use EffectId::*;
    match effect {
        DisintegrateArmor | DisintegrateWeapon => Some(Sanctuary),

        DrainAttribute | DrainHealth | DrainMagicka | DrainFatigue | DrainSkill
        | DamageAttribute | DamageHealth | DamageMagicka | DamageFatigue | DamageSkill
        | AbsorbAttribute | AbsorbHealth | AbsorbMagicka | AbsorbFatigue | AbsorbSkill
        | WeaknessToFire | WeaknessToFrost | WeaknessToShock | WeaknessToMagicka
        | WeaknessToCommonDisease | WeaknessToBlightDisease | WeaknessToCorprusDisease
        | WeaknessToPoison | WeaknessToNormalWeapons | Burden | Charm | Silence | Blind
        | Sound | CalmHumanoid | CalmCreature | FrenzyHumanoid | FrenzyCreature
        | DemoralizeHumanoid | DemoralizeCreature | RallyHumanoid | RallyCreature
        | TurnUndead => Some(ResistMagicka),

        FireDamage => Some(ResistFire),
        FrostDamage => Some(ResistFrost),
        ShockDamage => Some(ResistShock),
        Vampirism => Some(ResistCommonDisease),
        Corprus => Some(ResistCorprusDisease),
        Poison => Some(ResistPoison),
        Paralyze => Some(ResistParalysis),
        _ => None,
    }
}

/// Effect that amplifies `effect`, if any.
pub const fn weakness_effect(effect: EffectId) -> Option<EffectId> {
    use EffectId::*;
    match effect {
        DrainAttribute | DrainHealth | DrainMagicka | DrainFatigue | DrainSkill
        | DamageAttribute | DamageHealth | DamageMagicka | DamageFatigue | DamageSkill
        | AbsorbAttribute | AbsorbHealth | AbsorbMagicka | AbsorbFatigue | AbsorbSkill
        | WeaknessToFire | WeaknessToFrost | WeaknessToShock | WeaknessToMagicka
        | WeaknessToCommonDisease | WeaknessToBlightDisease | WeaknessToCorprusDisease
        | WeaknessToPoison | WeaknessToNormalWeapons | Burden | Charm | Silence | Blind
        | Sound | CalmHumanoid | CalmCreature | FrenzyHumanoid | FrenzyCreature
        | DemoralizeHumanoid | DemoralizeCreature | RallyHumanoid | RallyCreature
        | TurnUndead => Some(WeaknessToMagicka),

        FireDamage => Some(WeaknessToFire),
        FrostDamage => Some(WeaknessToFrost),
        ShockDamage => Some(WeaknessToShock),
        Vampirism => Some(WeaknessToCommonDisease),
        Corprus => Some(WeaknessToCorprusDisease),
        Poison => Some(WeaknessToPoison),
        _ => None,
    }
}

/// Net resistance in percent of an actor with `effects` against `effect`.
///
/// Elemental shields add to the matching elemental resistance.
pub fn effect_resistance(effect: EffectId, effects: &MagicEffects) -> f32 {
    let mut resistance = 0.0;
    if let Some(resist) = resistance_effect(effect) {
        resistance += effects.magnitude(resist);
    }
    if let Some(weakness) = weakness_effect(effect) {
        resistance -= effects.magnitude(weakness);
    }
    let shield = match effect {
        EffectId::FireDamage => Some(EffectId::FireShield),
        EffectId::ShockDamage => Some(EffectId::LightningShield),
        EffectId::FrostDamage => Some(EffectId::FrostShield),
        _ => None,
    };
    if let Some(shield) = shield {
        resistance += effects.magnitude(shield);
    }
    resistance
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fire_resistance_stacks_shield_and_weakness() {
        let mut effects = MagicEffects::new();
        effects.add(EffectId::ResistFire, 30.0);
        effects.add(EffectId::FireShield, 20.0);
        effects.add(EffectId::WeaknessToFire, 15.0);
        assert_eq!(effect_resistance(EffectId::FireDamage, &effects), 35.0);
    }

    #[test]
    fn paralysis_has_no_weakness() {
        let mut effects = MagicEffects::new();
        effects.add(EffectId::ResistParalysis, 40.0);
        effects.add(EffectId::WeaknessToMagicka, 100.0);
        assert_eq!(effect_resistance(EffectId::Paralyze, &effects), 40.0);
    }

    #[test]
    fn magicka_group_resisted_by_resist_magicka() {
        let mut effects = MagicEffects::new();
        effects.add(EffectId::ResistMagicka, 25.0);
        assert_eq!(effect_resistance(EffectId::Silence, &effects), 25.0);
        assert_eq!(effect_resistance(EffectId::Levitate, &effects), 0.0);
    }
}
